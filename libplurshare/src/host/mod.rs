//! Host collaborators
//!
//! The share session never talks to the host platform directly. Everything
//! it needs is behind these traits: attachment providers that load shared
//! items, a screen factory and view stack for presentation, and the
//! extension context used to hand control back.
//!
//! In-memory implementations live in [`memory`].

pub mod memory;

use std::fmt;

use async_trait::async_trait;
use url::Url;

use crate::content::Bitmap;
use crate::error::{ExtractionError, ShareError};
use crate::navigation::Scene;

/// Type identifiers a provider can be asked to load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeIdentifier {
    PlainText,
    Url,
    Image,
}

impl TypeIdentifier {
    /// Uniform type identifier as used by the host
    pub fn as_uti(&self) -> &'static str {
        match self {
            TypeIdentifier::PlainText => "public.plain-text",
            TypeIdentifier::Url => "public.url",
            TypeIdentifier::Image => "public.image",
        }
    }
}

impl fmt::Display for TypeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_uti())
    }
}

/// Value produced by a successful load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadedItem {
    Text(String),

    /// A link, or a reference to a local file holding image data
    Url(Url),

    /// Already-decoded image
    Image(Bitmap),
}

impl LoadedItem {
    pub fn kind(&self) -> &'static str {
        match self {
            LoadedItem::Text(_) => "text",
            LoadedItem::Url(_) => "url",
            LoadedItem::Image(_) => "image",
        }
    }
}

/// Opaque handle to one shared item
#[async_trait]
pub trait AttachmentProvider: Send + Sync {
    /// Whether the item can be loaded as `type_id`
    fn has_item_conforming_to(&self, type_id: TypeIdentifier) -> bool;

    /// Load the item as `type_id`. May complete on any thread.
    async fn load_item(&self, type_id: TypeIdentifier) -> Result<LoadedItem, ExtractionError>;
}

/// A presentable screen instance
pub trait Screen {
    fn scene(&self) -> Scene;
}

/// Builds the screen for a scene
pub trait ScreenFactory {
    fn make_screen(&self, scene: Scene) -> Box<dyn Screen>;
}

/// The host's stack-based presentation API
pub trait ViewStack {
    fn push_view(&mut self, screen: Box<dyn Screen>);

    /// Pop the top screen. Returns `None` when nothing can be popped.
    fn pop_view(&mut self) -> Option<Box<dyn Screen>>;

    fn depth(&self) -> usize;

    /// Scene of the top screen
    fn top_scene(&self) -> Option<Scene>;
}

/// Host side of the extension lifecycle
pub trait ExtensionContext {
    /// Terminate the share session
    fn cancel_request(&self, error: ShareError);
}
