//! Default value functions for configuration.

/// Plaintext IRC port.
pub fn default_port() -> u16 {
    6667
}

/// Load every built-in plugin.
pub fn default_plugins() -> String {
    "all".to_string()
}

/// Config file used when none is given on the command line.
pub fn default_config_path() -> String {
    "slircbot.toml".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_port_is_6667() {
        assert_eq!(default_port(), 6667);
    }

    #[test]
    fn default_plugins_is_all() {
        assert_eq!(default_plugins(), "all");
    }
}
