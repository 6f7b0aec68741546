//! INI file configuration adapter.

use crate::domain::error::ScanError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScanError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config.load(path).map_err(|reason| ScanError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[data]
dir = ./prices
symbols = AAPL,MSFT

[analysis]
rsi_window = 14
breakout_mode = momentum
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("data", "dir"),
            Some("./prices".to_string())
        );
        assert_eq!(
            adapter.get_string("analysis", "breakout_mode"),
            Some("momentum".to_string())
        );
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[data]\ndir = ./prices\n").unwrap();
        assert_eq!(adapter.get_string("data", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_returns_value() {
        let adapter = FileConfigAdapter::from_string("[analysis]\nsma_window = 50\n").unwrap();
        assert_eq!(adapter.get_int("analysis", "sma_window", 0), 50);
    }

    #[test]
    fn get_int_returns_default_for_missing() {
        let adapter = FileConfigAdapter::from_string("[analysis]\n").unwrap();
        assert_eq!(adapter.get_int("analysis", "missing", 42), 42);
    }

    #[test]
    fn get_int_returns_default_for_non_numeric() {
        let adapter = FileConfigAdapter::from_string("[analysis]\nsma_window = abc\n").unwrap();
        assert_eq!(adapter.get_int("analysis", "sma_window", 42), 42);
    }

    #[test]
    fn get_double_returns_value() {
        let adapter =
            FileConfigAdapter::from_string("[analysis]\nbollinger_num_stddev = 2.5\n").unwrap();
        assert_eq!(
            adapter.get_double("analysis", "bollinger_num_stddev", 0.0),
            2.5
        );
    }

    #[test]
    fn get_double_returns_default_for_missing() {
        let adapter = FileConfigAdapter::from_string("[analysis]\n").unwrap();
        assert_eq!(adapter.get_double("analysis", "missing", 99.9), 99.9);
    }

    #[test]
    fn get_double_returns_default_for_non_numeric() {
        let adapter =
            FileConfigAdapter::from_string("[analysis]\nrsi_oversold = not_a_number\n").unwrap();
        assert_eq!(adapter.get_double("analysis", "rsi_oversold", 30.0), 30.0);
    }




    #[test]
    fn from_file_reads_config() {
        let content = "[data]\nstart_date = 2023-01-01\n";
        let file = create_temp_config(content);
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("data", "start_date"),
            Some("2023-01-01".to_string())
        );
    }

    #[test]
    fn from_file_returns_config_parse_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(matches!(
            result,
            Err(ScanError::ConfigParse { file, .. }) if file == "/nonexistent/path/config.ini"
        ));
    }
}
