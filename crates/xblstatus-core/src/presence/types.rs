use serde::{Deserialize, Deserializer};

const ONLINE: &str = "Online";
const BACKGROUND: &str = "Background";
const ACTIVE: &str = "Active";

/// Decoded response from the presence endpoint.
///
/// Every field is optional on the wire. Error payloads carry
/// `success: false` with `error_code` and `error_message`; regular
/// payloads omit `success` entirely. An explicit `null` is treated the same
/// as a missing key.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RawPresence {
    #[serde(deserialize_with = "null_as_true")]
    pub success: bool,
    pub error_code: Option<i64>,
    pub error_message: Option<String>,
    pub state: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub devices: Vec<Device>,
}

impl Default for RawPresence {
    fn default() -> Self {
        Self {
            success: true,
            error_code: None,
            error_message: None,
            state: None,
            devices: Vec::new(),
        }
    }
}

impl RawPresence {
    pub fn is_online(&self) -> bool {
        self.state.as_deref() == Some(ONLINE)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Device {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub titles: Vec<Title>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Title {
    pub name: Option<String>,
    pub placement: Option<String>,
    pub state: Option<String>,
    pub activity: Option<Activity>,
}

impl Title {
    /// True when the title runs in the foreground and is active.
    pub fn is_foreground_active(&self) -> bool {
        self.placement.as_deref() != Some(BACKGROUND) && self.state.as_deref() == Some(ACTIVE)
    }

    /// Rich presence text, if the title reports a non-empty one.
    pub fn rich_presence(&self) -> Option<&str> {
        self.activity
            .as_ref()
            .and_then(|activity| activity.rich_presence.as_deref())
            .filter(|text| !text.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Activity {
    #[serde(rename = "richPresence")]
    pub rich_presence: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_true<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}
