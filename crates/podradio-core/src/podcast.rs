//! Podcast records and player status as reported by a PodRadio service.

use serde::{Deserialize, Serialize};

fn enabled_by_default() -> bool {
    true
}

/// A podcast subscription known to the service.
///
/// Lists preserve the order the service returns them in (insertion and
/// selection order), so nothing here implements `Ord`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Podcast {
    /// Display name of the subscription.
    pub name: String,

    /// Feed URL.
    pub url: String,

    /// Free-form description, empty when none was given.
    #[serde(default)]
    pub description: String,

    /// Whether the subscription is enabled on the service.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,

    /// Whether this is the currently selected podcast.
    #[serde(default)]
    pub is_current: bool,

    /// Position in the service's subscription list, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl Podcast {
    /// Creates an enabled, unselected podcast record.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            description: String::new(),
            enabled: true,
            is_current: false,
            index: None,
        }
    }

    /// Builder: set description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder: mark as the current selection.
    pub fn current(mut self, is_current: bool) -> Self {
        self.is_current = is_current;
        self
    }

    /// Builder: set enabled.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Builder: set the list position.
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

/// Audio player state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Whether audio is currently playing.
    pub playing: bool,
}

/// Service status snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// Player state.
    pub player: PlayerState,

    /// Currently selected podcast, `null` when nothing is selected.
    #[serde(default)]
    pub current_podcast: Option<Podcast>,

    /// Number of subscriptions.
    pub subscription_count: u32,

    /// Index of the current selection; the service reports -1 when there is none.
    pub current_index: i64,

    /// Number of clients connected to the service, this one included.
    pub connected_clients: u32,
}

impl Status {
    /// Returns true if the player is playing.
    pub fn is_playing(&self) -> bool {
        self.player.playing
    }

    /// Returns true if a podcast is selected.
    pub fn has_selection(&self) -> bool {
        self.current_podcast.is_some()
    }
}
