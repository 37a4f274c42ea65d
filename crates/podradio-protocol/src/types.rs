//! Command and response types for the PodRadio protocol.

use podradio_core::Podcast;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CodecError, CodecResult};

/// Commands that can be sent from client to service.
///
/// Optional fields left unset are omitted from the wire document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Command {
    /// Get player and selection status.
    GetStatus,

    /// List subscriptions.
    ListPodcasts,

    /// Subscribe to a feed.
    AddPodcast {
        name: String,
        url: String,
        /// Always sent, empty when the caller gave none.
        #[serde(default)]
        description: String,
    },

    /// Unsubscribe by name or URL.
    RemovePodcast { identifier: String },

    /// Play a URL, or the latest episode of the selected podcast.
    PlayPodcast {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },

    /// Pause or stop playback.
    PlayerControl { command: PlayerCommand },

    /// Move the selection.
    NavigatePodcasts { direction: Direction },
}

impl Command {
    /// Creates an AddPodcast command.
    pub fn add_podcast(
        name: impl Into<String>,
        url: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::AddPodcast {
            name: name.into(),
            url: url.into(),
            description: description.into(),
        }
    }

    /// Creates a RemovePodcast command.
    pub fn remove_podcast(identifier: impl Into<String>) -> Self {
        Self::RemovePodcast {
            identifier: identifier.into(),
        }
    }

    /// Creates a PlayPodcast command; `None` plays the current selection.
    pub fn play_podcast(url: Option<impl Into<String>>) -> Self {
        Self::PlayPodcast {
            url: url.map(Into::into),
        }
    }

    /// Creates a PlayerControl command.
    pub fn player_control(command: PlayerCommand) -> Self {
        Self::PlayerControl { command }
    }

    /// Creates a NavigatePodcasts command.
    pub fn navigate(direction: Direction) -> Self {
        Self::NavigatePodcasts { direction }
    }

    /// Wire tag of this command.
    pub fn action(&self) -> &'static str {
        match self {
            Self::GetStatus => "get_status",
            Self::ListPodcasts => "list_podcasts",
            Self::AddPodcast { .. } => "add_podcast",
            Self::RemovePodcast { .. } => "remove_podcast",
            Self::PlayPodcast { .. } => "play_podcast",
            Self::PlayerControl { .. } => "player_control",
            Self::NavigatePodcasts { .. } => "navigate_podcasts",
        }
    }
}

/// Player control commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerCommand {
    Pause,
    Stop,
}

/// Selection movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Next,
    Previous,
}

/// Reply document.
///
/// A document with `success=false` never carries `data`; [`crate::decode_response`]
/// rejects one that does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Whether the service carried out the command.
    pub success: bool,

    /// Command-specific payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Human-readable failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Diagnostic detail attached to some failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl Response {
    /// Creates a success response carrying a payload.
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            details: None,
        }
    }

    /// Creates a success response without a payload.
    pub fn ok_empty() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            details: None,
        }
    }

    /// Creates a failure response.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            details: None,
        }
    }

    /// Builder: attach diagnostic details.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Returns true if the service reported success.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Interprets `data` as `T`.
    ///
    /// A missing payload or one of the wrong shape is a malformed reply.
    pub fn payload<T: DeserializeOwned>(&self) -> CodecResult<T> {
        let data = self
            .data
            .as_ref()
            .ok_or_else(|| CodecError::malformed("response carries no data"))?;
        serde_json::from_value(data.clone()).map_err(|e| {
            CodecError::malformed(format!("unexpected payload shape: {}", e))
        })
    }
}

/// Payload of a `list_podcasts` reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodcastList {
    /// Subscriptions in service order.
    pub podcasts: Vec<Podcast>,

    /// Index of the current selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_index: Option<i64>,
}

/// Payload of a `play_podcast` reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playback {
    /// Episode title, present when playing the selected podcast.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<String>,

    /// Name of the podcast the episode belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub podcast: Option<String>,

    /// Audio URL being played.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Service status message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Payload of a `navigate_podcasts` reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Newly selected podcast.
    pub podcast: Podcast,

    /// Index of the new selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,

    /// Service status message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
