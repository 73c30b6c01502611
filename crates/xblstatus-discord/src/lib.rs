//! Discord Rich Presence sink using discord-sdk.
//!
//! Talks to the local Discord client over its RPC socket. The activity
//! shows as "Playing <application name>" with the status line as details.

use discord_sdk::activity::ActivityBuilder;
use discord_sdk::wheel::{UserSpoke, UserState, Wheel};
use discord_sdk::{Discord, Subscriptions};
use xblstatus_core::monitor::{PresenceSink, SinkError};

/// Discord rejects activity details longer than this.
const MAX_DETAILS_CHARS: usize = 128;

pub struct DiscordSink {
    app_id: i64,
    connection: Option<Connection>,
}

struct Connection {
    discord: Discord,
    user: UserSpoke,
    // Owns the state channels the handler publishes into.
    _wheel: Wheel,
}

impl DiscordSink {
    pub fn new(app_id: i64) -> Self {
        Self {
            app_id,
            connection: None,
        }
    }
}

impl PresenceSink for DiscordSink {
    async fn connect(&mut self) -> Result<(), SinkError> {
        let (wheel, handler) = Wheel::new(Box::new(|err| {
            tracing::warn!("Discord error: {:?}", err);
        }));
        let user = wheel.user();

        let discord = Discord::new(self.app_id, Subscriptions::ACTIVITY, Box::new(handler))
            .map_err(backend)?;

        tracing::info!(app_id = self.app_id, "Discord connecting...");
        self.connection = Some(Connection {
            discord,
            user,
            _wheel: wheel,
        });
        Ok(())
    }

    async fn wait_until_ready(&mut self) -> Result<(), SinkError> {
        let connection = self.connection.as_mut().ok_or(SinkError::NotConnected)?;
        let user = &mut connection.user.0;

        loop {
            let connected = match &*user.borrow_and_update() {
                UserState::Connected(user) => Some(user.username.clone()),
                UserState::Disconnected(err) => {
                    tracing::debug!("Discord not connected yet: {:?}", err);
                    None
                }
            };

            if let Some(username) = connected {
                tracing::info!("Discord logged in as {}", username);
                return Ok(());
            }

            user.changed().await.map_err(|_| SinkError::Closed)?;
        }
    }

    async fn set_status(&mut self, status: Option<&str>) -> Result<(), SinkError> {
        let connection = self.connection.as_ref().ok_or(SinkError::NotConnected)?;

        match status {
            Some(text) => {
                let activity = ActivityBuilder::new().details(truncate_details(text));
                connection
                    .discord
                    .update_activity(activity)
                    .await
                    .map_err(backend)?;
            }
            None => {
                connection.discord.clear_activity().await.map_err(backend)?;
            }
        }
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), SinkError> {
        if let Some(connection) = self.connection.take() {
            connection.discord.disconnect().await;
            tracing::info!("Discord Rich Presence disconnected");
        }
        Ok(())
    }
}

fn backend(err: discord_sdk::Error) -> SinkError {
    SinkError::Backend(format!("Discord: {err}"))
}

fn truncate_details(text: &str) -> String {
    text.chars().take(MAX_DETAILS_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_details_are_unchanged() {
        assert_eq!(
            truncate_details("360: Forza (Racing - Lap 3)"),
            "360: Forza (Racing - Lap 3)"
        );
    }

    #[test]
    fn test_long_details_are_truncated_on_char_boundary() {
        let text = format!("XB1: {}", "é".repeat(200));
        let truncated = truncate_details(&text);
        assert_eq!(truncated.chars().count(), MAX_DETAILS_CHARS);
        assert!(text.starts_with(&truncated));
    }

    #[tokio::test]
    async fn test_calls_before_connect_fail() {
        let mut sink = DiscordSink::new(1);
        assert!(matches!(
            sink.set_status(Some("XB1: Halo 5")).await,
            Err(SinkError::NotConnected)
        ));
        assert!(matches!(
            sink.wait_until_ready().await,
            Err(SinkError::NotConnected)
        ));
        assert!(sink.disconnect().await.is_ok());
    }
}
