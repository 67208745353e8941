//! Pure reducer function for state transitions
//!
//! `(State, Action) -> State`, with no side effects. Stack mutations, host
//! callbacks and attachment loading all happen outside, in response to the
//! state this produces.

use super::actions::Action;
use super::state::AppState;
use crate::navigation::{NavigationState, SceneTransition};

/// Pure reducer function
///
/// Total over [`Action`]: the match is exhaustive, so an action the reducer
/// does not understand cannot be constructed.
pub fn reduce(state: AppState, action: Action) -> AppState {
    match action {
        // === Content ===
        Action::SetContent(content) => AppState { content, ..state },

        // === Navigation ===
        Action::MakeSceneTransition(scene_transition) => {
            let finished =
                state.navigation.finished || scene_transition == SceneTransition::Finish;
            AppState {
                navigation: NavigationState {
                    scene_transition,
                    revision: state.navigation.revision.wrapping_add(1),
                    finished,
                },
                ..state
            }
        }

        // === Session domains ===
        Action::SetServers(servers) => {
            let selected_server = state
                .selected_server
                .filter(|index| *index < servers.len());
            AppState {
                servers,
                selected_server,
                ..state
            }
        }

        Action::SelectServer(index) if index < state.servers.len() => AppState {
            selected_server: Some(index),
            rooms: Vec::new(),
            current_room: None,
            ..state
        },

        // Out of range: nothing to select
        Action::SelectServer(_) => state,

        Action::SetRooms(rooms) => AppState { rooms, ..state },

        Action::SetCurrentRoom(room) => AppState {
            current_room: Some(room),
            ..state
        },

        Action::SetComposeText(compose_text) => AppState {
            compose_text,
            ..state
        },
    }
}
