//! Presence data and the rules that turn it into a status line.

mod format;
mod gate;
mod types;

pub use format::{ApiError, TitleSetting, TitleSettings, derive_status, device_abbreviation};
pub use gate::ChangeGate;
pub use types::{Activity, Device, RawPresence, Title};
