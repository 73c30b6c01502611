//! Configuration management for xblstatus.
//!
//! Loads configuration from `${XBLSTATUS_HOME}/config.toml` or an explicit
//! path. Files ending in `.json` are parsed as JSON, everything else as
//! TOML. Fields are checked against [`FIELDS`]: every missing required
//! field is reported in one error before any value is interpreted.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::presence::TitleSettings;
use crate::xbox::DEFAULT_API_URL;

pub mod paths {
    //! Path resolution for xblstatus configuration.
    //!
    //! XBLSTATUS_HOME resolution order:
    //! 1. XBLSTATUS_HOME environment variable (if set)
    //! 2. ~/.config/xblstatus (default)

    use std::path::PathBuf;

    /// Returns the xblstatus home directory.
    pub fn xblstatus_home() -> PathBuf {
        if let Ok(home) = std::env::var("XBLSTATUS_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("xblstatus")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        xblstatus_home().join("config.toml")
    }
}

/// One entry of the config schema.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub required: bool,
    /// Value used when an optional field is absent.
    pub default: Option<fn() -> Value>,
}

impl Field {
    const fn required(name: &'static str) -> Self {
        Self {
            name,
            required: true,
            default: None,
        }
    }

    const fn optional(name: &'static str, default: Option<fn() -> Value>) -> Self {
        Self {
            name,
            required: false,
            default,
        }
    }
}

fn default_update_interval() -> Value {
    Value::from(MonitorConfig::DEFAULT_UPDATE_INTERVAL_SECS)
}

fn default_title_settings() -> Value {
    Value::Object(Map::new())
}

fn default_api_url() -> Value {
    Value::from(DEFAULT_API_URL)
}

/// Config schema, in reporting order.
pub const FIELDS: &[Field] = &[
    Field::required("discord_app_id"),
    Field::required("xbox_live_id"),
    Field::required("xbox_api_key"),
    Field::optional("update_interval", Some(default_update_interval)),
    Field::optional("title_settings", Some(default_title_settings)),
    Field::optional("xbox_api_url", Some(default_api_url)),
    Field::optional("logging", None),
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config from {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("Failed to parse config from {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
    #[error("Configuration missing: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("Config file already exists at {}", path.display())]
    AlreadyExists { path: PathBuf },
    #[error("Failed to write config to {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// A string that never appears in `Debug` or `Display` output.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[HIDDEN]")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[HIDDEN]")
    }
}

/// Logging section of the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, e.g. `info,reqwest=warn`.
    pub filter: Option<String>,
    /// Directory for daily rolling log files. Console only when unset.
    pub directory: Option<PathBuf>,
}

/// Validated monitor configuration.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Discord application id used for Rich Presence.
    pub discord_app_id: i64,
    /// Xbox Live account (XUID) to track.
    pub xbox_live_id: String,
    pub xbox_api_key: Secret,
    /// Seconds between the end of one poll and the start of the next.
    pub update_interval: u64,
    pub title_settings: TitleSettings,
    pub xbox_api_url: String,
    pub logging: Option<LoggingConfig>,
}

impl MonitorConfig {
    pub const DEFAULT_UPDATE_INTERVAL_SECS: u64 = 30;

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// See [`MonitorConfig::load_from`].
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, if required
    /// fields are missing, or if a field has an invalid value.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let table = parse_table(path, &contents).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?;
        Self::from_table(table)
    }

    /// Builds a config from an already parsed table.
    ///
    /// Keys not in [`FIELDS`] are ignored. JSON `null` counts as missing.
    ///
    /// # Errors
    /// Returns [`ConfigError::Missing`] listing every absent required field,
    /// or [`ConfigError::Invalid`] for the first field that fails to decode.
    pub fn from_table(mut table: Map<String, Value>) -> Result<Self, ConfigError> {
        let missing: Vec<&'static str> = FIELDS
            .iter()
            .filter(|field| field.required && is_absent(&table, field.name))
            .map(|field| field.name)
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        for field in FIELDS {
            if let Some(default) = field.default
                && is_absent(&table, field.name)
            {
                table.insert(field.name.to_string(), default());
            }
        }

        let config = Self {
            discord_app_id: take_field(&mut table, "discord_app_id")?,
            xbox_live_id: take_field::<IdValue>(&mut table, "xbox_live_id")?.0,
            xbox_api_key: take_field(&mut table, "xbox_api_key")?,
            update_interval: take_field(&mut table, "update_interval")?,
            title_settings: take_field(&mut table, "title_settings")?,
            xbox_api_url: take_field(&mut table, "xbox_api_url")?,
            logging: take_field(&mut table, "logging")?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.discord_app_id <= 0 {
            return Err(invalid("discord_app_id", "must be a positive application id"));
        }
        if self.xbox_live_id.trim().is_empty() {
            return Err(invalid("xbox_live_id", "must not be empty"));
        }
        if self.xbox_api_key.expose().trim().is_empty() {
            return Err(invalid("xbox_api_key", "must not be empty"));
        }
        if self.update_interval == 0 {
            return Err(invalid(
                "update_interval",
                "must be a positive number of seconds",
            ));
        }
        if !self.xbox_api_url.starts_with("http://") && !self.xbox_api_url.starts_with("https://")
        {
            return Err(invalid("xbox_api_url", "must be an http(s) URL"));
        }
        Ok(())
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval)
    }

    /// Writes the default config template to `path`.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Err(ConfigError::AlreadyExists {
                path: path.to_path_buf(),
            });
        }

        let write_error = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        fs::write(path, default_config_template()).map_err(write_error)
    }
}

impl fmt::Display for MonitorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ discord_app_id: {}, xbox_live_id: {}, xbox_api_key: {}, xbox_api_url: {}, \
             update_interval: {}, title_settings: {} }}",
            self.discord_app_id,
            self.xbox_live_id,
            self.xbox_api_key,
            self.xbox_api_url,
            self.update_interval,
            self.title_settings,
        )
    }
}

/// Returns the default config template with comments.
pub fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

fn parse_table(path: &Path, contents: &str) -> Result<Map<String, Value>, String> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let value = if is_json {
        serde_json::from_str::<Value>(contents).map_err(|err| err.to_string())?
    } else {
        let table = toml::from_str::<toml::Table>(contents).map_err(|err| err.to_string())?;
        serde_json::to_value(table).map_err(|err| err.to_string())?
    };

    match value {
        Value::Object(map) => Ok(map),
        _ => Err("expected a table at the top level".to_string()),
    }
}

fn is_absent(table: &Map<String, Value>, name: &str) -> bool {
    table.get(name).is_none_or(Value::is_null)
}

fn take_field<T: DeserializeOwned>(
    table: &mut Map<String, Value>,
    name: &'static str,
) -> Result<T, ConfigError> {
    let value = table.remove(name).unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|err| invalid(name, err.to_string()))
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Account ids are numeric XUIDs; accept them written as numbers or strings.
struct IdValue(String);

impl<'de> Deserialize<'de> for IdValue {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => IdValue(text.trim().to_string()),
            Raw::Number(number) => IdValue(number.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;
    use tempfile::tempdir;

    use super::*;
    use crate::presence::TitleSetting;

    fn table(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    fn minimal() -> Map<String, Value> {
        table(json!({
            "discord_app_id": 1_383_904_378_154_651_768_i64,
            "xbox_live_id": "2533274800000000",
            "xbox_api_key": "super-secret-key"
        }))
    }

    #[test]
    fn test_missing_required_fields_are_aggregated() {
        let err = MonitorConfig::from_table(table(json!({"update_interval": 10}))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration missing: discord_app_id, xbox_live_id, xbox_api_key"
        );
    }

    #[test]
    fn test_null_counts_as_missing() {
        let mut map = minimal();
        map.insert("xbox_api_key".to_string(), Value::Null);
        let err = MonitorConfig::from_table(map).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ref fields) if fields == &["xbox_api_key"]));
    }

    #[test]
    fn test_defaults_are_applied() {
        let config = MonitorConfig::from_table(minimal()).unwrap();
        assert_eq!(config.update_interval, 30);
        assert_eq!(config.update_interval(), Duration::from_secs(30));
        assert!(config.title_settings.is_empty());
        assert_eq!(config.xbox_api_url, DEFAULT_API_URL);
        assert_eq!(config.logging, None);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let mut map = minimal();
        map.insert("discord_password".to_string(), json!("legacy"));
        assert!(MonitorConfig::from_table(map).is_ok());
    }

    #[test]
    fn test_wrong_type_is_a_field_error() {
        let mut map = minimal();
        map.insert("update_interval".to_string(), json!("soon"));
        let err = MonitorConfig::from_table(map).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "update_interval",
                ..
            }
        ));
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let mut map = minimal();
        map.insert("update_interval".to_string(), json!(0));
        let err = MonitorConfig::from_table(map).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value for update_interval: must be a positive number of seconds"
        );
    }

    #[test]
    fn test_numeric_account_id_is_accepted() {
        let mut map = minimal();
        map.insert("xbox_live_id".to_string(), json!(2_533_274_800_000_000_u64));
        let config = MonitorConfig::from_table(map).unwrap();
        assert_eq!(config.xbox_live_id, "2533274800000000");
    }

    #[test]
    fn test_secret_is_never_printed() {
        let config = MonitorConfig::from_table(minimal()).unwrap();
        let display = config.to_string();
        let debug = format!("{config:?}");

        assert!(!display.contains("super-secret-key"));
        assert!(!debug.contains("super-secret-key"));
        assert!(display.contains("xbox_api_key: [HIDDEN]"));
        assert_eq!(config.xbox_api_key.expose(), "super-secret-key");
    }

    #[test]
    fn test_load_toml_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
discord_app_id = 42
xbox_live_id = "2533274800000000"
xbox_api_key = "key"
update_interval = 60

[title_settings]
"Halo 5: Guardians" = "name-only"
Home = "ignore"

[logging]
filter = "debug"
"#,
        )
        .unwrap();

        let config = MonitorConfig::load_from(&path).unwrap();
        assert_eq!(config.discord_app_id, 42);
        assert_eq!(config.update_interval, 60);
        assert_eq!(
            config.title_settings.get("halo 5: guardians"),
            Some(&TitleSetting::NameOnly)
        );
        assert_eq!(config.title_settings.get("HOME"), Some(&TitleSetting::Ignore));
        assert_eq!(
            config.logging.and_then(|logging| logging.filter).as_deref(),
            Some("debug")
        );
    }

    #[test]
    fn test_load_json_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{
  "discord_app_id": 42,
  "xbox_live_id": "2533274800000000",
  "xbox_api_key": "key",
  "title_settings": {"Forza Horizon 3": "ignore"},
  "logging": null
}"#,
        )
        .unwrap();

        let config = MonitorConfig::load_from(&path).unwrap();
        assert_eq!(config.update_interval, 30);
        assert_eq!(config.title_settings.len(), 1);
        assert_eq!(config.logging, None);
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let dir = tempdir().unwrap();
        let err = MonitorConfig::load_from(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "discord_app_id = [").unwrap();
        let err = MonitorConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_init_writes_template_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("subdir").join("config.toml");

        MonitorConfig::init(&path).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("update_interval = 30"));

        let err = MonitorConfig::init(&path).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_template_lists_required_fields_as_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        MonitorConfig::init(&path).unwrap();

        let err = MonitorConfig::load_from(&path).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration missing: discord_app_id, xbox_live_id, xbox_api_key"
        );
    }
}
