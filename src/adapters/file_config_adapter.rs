//! INI file configuration adapter.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| Self::parse_bool(v))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[data]
csv_dir = /var/lib/permafolio/prices

[simulation]
years = 2015-2024
lookback_years = 3
rebalance_days = 100
initial_capital = 100000.0
continue_on_error = yes
"#;

    #[test]
    fn from_string_parses_sections() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(
            adapter.get_string("data", "csv_dir"),
            Some("/var/lib/permafolio/prices".to_string())
        );
        assert_eq!(
            adapter.get_string("simulation", "years"),
            Some("2015-2024".to_string())
        );
    }

    #[test]
    fn typed_getters_with_defaults() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_int("simulation", "lookback_years", 1), 3);
        assert_eq!(adapter.get_int("simulation", "missing", 42), 42);
        assert_eq!(
            adapter.get_double("simulation", "initial_capital", 0.0),
            100000.0
        );
        assert_eq!(adapter.get_double("simulation", "missing", 9.5), 9.5);
        assert!(adapter.get_bool("simulation", "continue_on_error", false));
        assert!(!adapter.get_bool("simulation", "missing", false));
    }

    #[test]
    fn non_numeric_values_fall_back_to_default() {
        let adapter =
            FileConfigAdapter::from_string("[simulation]\nrebalance_days = often\n").unwrap();
        assert_eq!(adapter.get_int("simulation", "rebalance_days", 30), 30);
    }

    #[test]
    fn bool_spellings() {
        let adapter =
            FileConfigAdapter::from_string("[s]\na = true\nb = no\nc = 1\nd = maybe\n").unwrap();
        assert!(adapter.get_bool("s", "a", false));
        assert!(!adapter.get_bool("s", "b", true));
        assert!(adapter.get_bool("s", "c", false));
        assert!(adapter.get_bool("s", "d", false));
    }

    #[test]
    fn from_file_round_trip() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", SAMPLE).unwrap();
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(adapter.get_int("simulation", "rebalance_days", 0), 100);
    }

    #[test]
    fn from_file_missing_path_errors() {
        assert!(FileConfigAdapter::from_file("/nonexistent/permafolio.ini").is_err());
    }
}
