use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer};

use super::types::{Device, RawPresence, Title};

/// Presentation rule for a single title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleSetting {
    /// Never show the title.
    Ignore,
    /// Show the title name but drop its rich presence text.
    NameOnly,
    /// Any other value. Treated like no setting at all.
    Other(String),
}

impl TitleSetting {
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "ignore" => TitleSetting::Ignore,
            "name-only" => TitleSetting::NameOnly,
            _ => TitleSetting::Other(value.to_string()),
        }
    }
}

impl fmt::Display for TitleSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TitleSetting::Ignore => f.write_str("ignore"),
            TitleSetting::NameOnly => f.write_str("name-only"),
            TitleSetting::Other(value) => f.write_str(value),
        }
    }
}

/// Per-title settings keyed by title name, matched case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleSettings(BTreeMap<String, TitleSetting>);

impl TitleSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, title: &str, value: &str) {
        self.0.insert(title.to_lowercase(), TitleSetting::parse(value));
    }

    pub fn get(&self, title: &str) -> Option<&TitleSetting> {
        self.0.get(&title.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for TitleSettings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut settings = TitleSettings::new();
        for (title, value) in iter {
            settings.insert(title.as_ref(), value.as_ref());
        }
        settings
    }
}

impl<'de> Deserialize<'de> for TitleSettings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
        Ok(raw.into_iter().collect())
    }
}

impl fmt::Display for TitleSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (title, setting)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{title:?}: {:?}", setting.to_string())?;
        }
        f.write_str("}")
    }
}

/// Failure reported by the API itself (`success: false`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub code: Option<i64>,
    pub message: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "Xbox API error {code}: {}", self.message),
            None => write!(f, "Xbox API error: {}", self.message),
        }
    }
}

impl std::error::Error for ApiError {}

/// Short device label used as the status prefix.
pub fn device_abbreviation(kind: &str) -> &str {
    match kind {
        "XboxOne" => "XB1",
        "Xbox360" => "360",
        other => other,
    }
}

/// Derives the status line for a presence response.
///
/// Returns `Ok(None)` when nothing should be shown and `Err` when the API
/// reported a failure, in which case no candidate exists for this cycle.
///
/// Only the first device is inspected, and within it the first title that
/// is both in the foreground and active. Titles without a name cannot be
/// shown and are passed over.
pub fn derive_status(
    presence: &RawPresence,
    settings: &TitleSettings,
) -> Result<Option<String>, ApiError> {
    if !presence.success {
        return Err(ApiError {
            code: presence.error_code,
            message: presence
                .error_message
                .clone()
                .unwrap_or_else(|| "unknown error".to_string()),
        });
    }

    if !presence.is_online() {
        return Ok(None);
    }

    let Some(device) = presence.devices.first() else {
        return Ok(None);
    };

    let selected = device
        .titles
        .iter()
        .find(|title| title.name.is_some() && title.is_foreground_active());

    Ok(selected.and_then(|title| status_for_title(device, title, settings)))
}

fn status_for_title(device: &Device, title: &Title, settings: &TitleSettings) -> Option<String> {
    let name = title.name.as_deref()?;
    let setting = settings.get(name);

    if setting == Some(&TitleSetting::Ignore) {
        tracing::info!("Skipping \"{name}\" due to \"ignore\" setting");
        return None;
    }

    let mut status = match device.kind.as_deref().filter(|kind| !kind.is_empty()) {
        Some(kind) => format!("{}: {name}", device_abbreviation(kind)),
        None => name.to_string(),
    };

    if let Some(rich_presence) = title.rich_presence() {
        if setting == Some(&TitleSetting::NameOnly) {
            tracing::info!("Skipping rich presence for \"{name}\" due to \"name-only\" setting");
        } else {
            status = format!("{status} ({rich_presence})");
        }
    }

    Some(status)
}
