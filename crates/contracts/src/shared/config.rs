use chrono::format::{Item, StrftimeItems};
use serde::Deserialize;

use super::export::ExportOptions;
use super::grid::TableConfig;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub table: TableSettings,
    pub form: FormSettings,
    pub autosave: AutosaveSettings,
    pub export: ExportSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TableSettings {
    pub key_field: String,
    pub page_size: usize,
    pub page_size_options: Vec<usize>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FormSettings {
    pub history_depth: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AutosaveSettings {
    pub ttl_hours: i64,
    pub interval_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ExportSettings {
    pub delimiter: char,
    pub date_format: String,
    pub datetime_format: String,
    pub list_delimiter: String,
    pub utf8_bom: bool,
    pub sheet_name: String,
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[table]
key_field = "key"
page_size = 20
page_size_options = [10, 20, 50, 100]

[form]
history_depth = 50

[autosave]
ttl_hours = 24
interval_secs = 30

[export]
delimiter = ";"
date_format = "%Y-%m-%d"
datetime_format = "%Y-%m-%d %H:%M:%S"
list_delimiter = ", "
utf8_bom = true
sheet_name = "Sheet1"
"#;

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            key_field: "key".to_string(),
            page_size: 20,
            page_size_options: vec![10, 20, 50, 100],
        }
    }
}

impl Default for FormSettings {
    fn default() -> Self {
        Self { history_depth: 50 }
    }
}

impl Default for AutosaveSettings {
    fn default() -> Self {
        Self {
            ttl_hours: 24,
            interval_secs: 30,
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            delimiter: ';',
            date_format: "%Y-%m-%d".to_string(),
            datetime_format: "%Y-%m-%d %H:%M:%S".to_string(),
            list_delimiter: ", ".to_string(),
            utf8_bom: true,
            sheet_name: "Sheet1".to_string(),
        }
    }
}

impl Config {
    /// Load the embedded default configuration
    pub fn load() -> anyhow::Result<Config> {
        log::debug!("Using default embedded configuration");
        Self::from_toml_str(DEFAULT_CONFIG)
    }

    /// Parse caller-provided TOML; missing keys keep their defaults
    pub fn from_toml_str(contents: &str) -> anyhow::Result<Config> {
        let config: Config = toml::from_str(contents)?;
        if !config.export.delimiter.is_ascii() {
            anyhow::bail!(
                "export delimiter must be a single ASCII character, got {:?}",
                config.export.delimiter
            );
        }
        check_strftime("export.date_format", &config.export.date_format)?;
        check_strftime("export.datetime_format", &config.export.datetime_format)?;
        if config.autosave.interval_secs == 0 {
            anyhow::bail!("autosave interval must be at least one second");
        }
        Ok(config)
    }

    pub fn table_config(&self, search_fields: &[&str]) -> TableConfig {
        TableConfig {
            key_field: self.table.key_field.clone(),
            search_fields: search_fields.iter().map(|f| f.to_string()).collect(),
            page_size: self.table.page_size,
        }
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            delimiter: self.export.delimiter as u8,
            date_format: self.export.date_format.clone(),
            datetime_format: self.export.datetime_format.clone(),
            list_delimiter: self.export.list_delimiter.clone(),
            utf8_bom: self.export.utf8_bom,
            sheet_name: self.export.sheet_name.clone(),
        }
    }

    pub fn autosave_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.autosave.ttl_hours)
    }
}

fn check_strftime(key: &str, pattern: &str) -> anyhow::Result<()> {
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        anyhow::bail!("{} is not a valid strftime pattern: {:?}", key, pattern);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config = Config::load().unwrap();
        assert_eq!(config.table.key_field, "key");
        assert_eq!(config.table.page_size, 20);
        assert_eq!(config.form.history_depth, 50);
        assert_eq!(config.autosave.ttl_hours, 24);
        assert_eq!(config.export.delimiter, ';');
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = Config::from_toml_str("[table]\npage_size = 50\n").unwrap();
        assert_eq!(config.table.page_size, 50);
        assert_eq!(config.table.key_field, "key");
        assert_eq!(config.export.date_format, "%Y-%m-%d");
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        assert!(Config::from_toml_str("[export]\ndelimiter = \"；\"\n").is_err());
    }

    #[test]
    fn test_invalid_date_patterns_rejected() {
        assert!(Config::from_toml_str("[export]\ndate_format = \"%Y-%Q\"\n").is_err());
        assert!(Config::from_toml_str("[export]\ndatetime_format = \"%H:%Q\"\n").is_err());
        assert!(Config::from_toml_str("[export]\ndate_format = \"%d.%m.%Y\"\n").is_ok());
    }

    #[test]
    fn test_zero_autosave_interval_rejected() {
        assert!(Config::from_toml_str("[autosave]\ninterval_secs = 0\n").is_err());
    }
}
