//! Shared content model
//!
//! A share session accumulates [`ContentItem`]s into a [`Content`] sequence
//! as the host's attachments finish loading. Items are immutable once built;
//! the sequence only ever grows while ingestion is running.

use std::fmt;
use std::sync::Arc;

use image::RgbaImage;

use crate::error::ExtractionError;

/// Opaque, cheaply cloneable handle to a decoded image.
#[derive(Clone)]
pub struct Bitmap {
    pixels: Arc<RgbaImage>,
}

impl Bitmap {
    /// Wrap already-decoded RGBA pixels
    pub fn new(pixels: RgbaImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
        }
    }

    /// Decode an encoded image (PNG, JPEG, GIF, ...) into a bitmap
    pub fn decode(bytes: &[u8]) -> Result<Self, ExtractionError> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| ExtractionError::Decode(e.to_string()))?;
        Ok(Self::new(decoded.to_rgba8()))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

impl PartialEq for Bitmap {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels) || *self.pixels == *other.pixels
    }
}

impl Eq for Bitmap {}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

/// One unit of shared material
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentItem {
    /// Plain text. Shared URLs are folded into this variant as well.
    Text(String),

    /// Decoded image
    Image(Bitmap),
}

impl ContentItem {
    pub fn text(value: impl Into<String>) -> Self {
        ContentItem::Text(value.into())
    }

    /// Short kind label used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            ContentItem::Text(_) => "text",
            ContentItem::Image(_) => "image",
        }
    }
}

/// Ordered composition, in arrival order of the loads that produced it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Content(Vec<ContentItem>);

impl Content {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new sequence with `item` added at the end.
    pub fn appended(&self, item: ContentItem) -> Self {
        let mut items = self.0.clone();
        items.push(item);
        Self(items)
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ContentItem> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Text items joined with newlines, as the compose screen pre-fills them
    pub fn joined_text(&self) -> String {
        self.0
            .iter()
            .filter_map(|item| match item {
                ContentItem::Text(text) => Some(text.as_str()),
                ContentItem::Image(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<Vec<ContentItem>> for Content {
    fn from(items: Vec<ContentItem>) -> Self {
        Self(items)
    }
}

impl FromIterator<ContentItem> for Content {
    fn from_iter<I: IntoIterator<Item = ContentItem>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Content {
    type Item = &'a ContentItem;
    type IntoIter = std::slice::Iter<'a, ContentItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
