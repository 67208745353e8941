//! plurshare - share-session core for Plurcast
//!
//! Collects the items a host application shares (text, links, images) into
//! a composition while driving a short stack of screens: pick a server, pick
//! a room, compose. State lives in a [`Store`]; every change is an
//! [`Action`]; the [`NavigationController`] is the only thing that touches
//! the view stack.

pub mod app;
pub mod config;
pub mod content;
pub mod controller;
pub mod error;
pub mod host;
pub mod ingestion;
pub mod logging;
pub mod navigation;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use app::{reduce, Action, AppState, Room, Server};
pub use config::ShareConfig;
pub use content::{Bitmap, Content, ContentItem};
pub use controller::NavigationController;
pub use error::{Result, ShareError};
pub use ingestion::{IngestionHandle, IngestionPipeline};
pub use navigation::{NavigationState, Scene, SceneTransition};
pub use session::{Dispatcher, ShareSession};
pub use store::{Store, StoreSubscriber, SubscriptionId};
