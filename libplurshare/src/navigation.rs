//! Scenes and the pending scene transition
//!
//! The navigation state never records history. It holds a single pending
//! instruction for the view layer, which the navigation controller consumes
//! and resets to [`SceneTransition::None`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Screen identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scene {
    /// Room picker
    Rooms,

    /// Server picker
    Servers,

    /// Message composer
    Compose,
}

impl FromStr for Scene {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rooms" => Ok(Scene::Rooms),
            "servers" => Ok(Scene::Servers),
            "compose" => Ok(Scene::Compose),
            _ => Err(format!(
                "Invalid scene: '{}'. Valid options: rooms, servers, compose",
                s
            )),
        }
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scene::Rooms => write!(f, "rooms"),
            Scene::Servers => write!(f, "servers"),
            Scene::Compose => write!(f, "compose"),
        }
    }
}

/// The next thing the navigation layer must do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SceneTransition {
    #[default]
    None,
    Pop,
    Push(Scene),
    /// Hand control back to the host. Terminal for the session.
    Finish,
}

impl FromStr for SceneTransition {
    type Err = String;

    /// Parses `none`, `pop`, `finish` or `push:<scene>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let step = s.trim().to_lowercase();
        match step.as_str() {
            "none" => Ok(SceneTransition::None),
            "pop" => Ok(SceneTransition::Pop),
            "finish" => Ok(SceneTransition::Finish),
            _ => match step.strip_prefix("push:") {
                Some(scene) => scene.parse().map(SceneTransition::Push),
                None => Err(format!(
                    "Invalid transition: '{}'. Valid options: none, pop, finish, push:<scene>",
                    s
                )),
            },
        }
    }
}

impl fmt::Display for SceneTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneTransition::None => write!(f, "none"),
            SceneTransition::Pop => write!(f, "pop"),
            SceneTransition::Push(scene) => write!(f, "push:{}", scene),
            SceneTransition::Finish => write!(f, "finish"),
        }
    }
}

/// Navigation slice of the application state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    /// Pending transition
    pub scene_transition: SceneTransition,

    /// Bumped on every applied transition action. Lets the controller tell a
    /// fresh transition apart from one it already consumed but whose reset
    /// is still queued behind other actions.
    pub revision: u64,

    /// Set once a `Finish` transition has been applied
    pub finished: bool,
}
