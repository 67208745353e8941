//! Actions for the reducer pattern
//!
//! Every state change in a share session is one of these. Screens, the
//! navigation controller and the ingestion pipeline all go through
//! [`Store::dispatch`](crate::store::Store::dispatch) with an action; there
//! is no other mutation path.

use crate::content::Content;
use crate::navigation::SceneTransition;

use super::state::{Room, Server};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // === Content ===
    /// Replace the composition verbatim. Callers compute the new sequence.
    SetContent(Content),

    // === Navigation ===
    /// Replace the pending scene transition
    MakeSceneTransition(SceneTransition),

    // === Session domains ===
    /// Servers the user can share to
    SetServers(Vec<Server>),

    /// Pick a server by index into `servers`
    SelectServer(usize),

    /// Rooms of the selected server
    SetRooms(Vec<Room>),

    /// Destination room
    SetCurrentRoom(Room),

    /// Message typed in the composer
    SetComposeText(String),
}

impl Action {
    /// Stable action name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Action::SetContent(_) => "set_content",
            Action::MakeSceneTransition(_) => "make_scene_transition",
            Action::SetServers(_) => "set_servers",
            Action::SelectServer(_) => "select_server",
            Action::SetRooms(_) => "set_rooms",
            Action::SetCurrentRoom(_) => "set_current_room",
            Action::SetComposeText(_) => "set_compose_text",
        }
    }
}
