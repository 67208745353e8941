//! Application state
//!
//! Owned by the [`Store`](crate::store::Store) for the lifetime of one share
//! session. Subscribers only ever see snapshots.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::content::Content;
use crate::navigation::NavigationState;

/// Root state of a share session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    /// Items shared by the host so far
    pub content: Content,

    /// Pending scene transition
    pub navigation: NavigationState,

    /// Servers offered on the server picker
    pub servers: Vec<Server>,

    /// Index into `servers`
    pub selected_server: Option<usize>,

    /// Rooms of the selected server
    pub rooms: Vec<Room>,

    /// Destination room picked on the room list
    pub current_room: Option<Room>,

    /// Message text typed in the composer
    pub compose_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub name: String,
    pub url: Url,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub name: String,
}

impl AppState {
    /// Create state for a fresh session
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_server(&self) -> Option<&Server> {
        self.selected_server.and_then(|index| self.servers.get(index))
    }

    /// A message can be sent once a room is chosen and there is something to send
    pub fn can_send(&self) -> bool {
        self.current_room.is_some()
            && (!self.content.is_empty() || !self.compose_text.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentItem;

    fn room() -> Room {
        Room {
            id: "GENERAL".to_string(),
            name: "general".to_string(),
        }
    }

    #[test]
    fn test_new_state_is_empty() {
        let state = AppState::new();
        assert!(state.content.is_empty());
        assert!(state.servers.is_empty());
        assert!(state.selected_server().is_none());
        assert!(!state.navigation.finished);
    }

    #[test]
    fn test_cannot_send_without_room() {
        let state = AppState {
            content: Content::from(vec![ContentItem::text("hi")]),
            ..AppState::new()
        };
        assert!(!state.can_send());
    }

    #[test]
    fn test_can_send_with_room_and_text() {
        let state = AppState {
            current_room: Some(room()),
            compose_text: "look at this".to_string(),
            ..AppState::new()
        };
        assert!(state.can_send());
    }

    #[test]
    fn test_whitespace_only_message_is_not_sendable() {
        let state = AppState {
            current_room: Some(room()),
            compose_text: "   ".to_string(),
            ..AppState::new()
        };
        assert!(!state.can_send());
    }
}
