//! In-memory host collaborators
//!
//! Used by the headless `plur-share` host and by tests: providers that serve
//! preset items (optionally after a delay or with a failure), a plain vector
//! view stack, and an extension context that records cancellations.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use super::{
    AttachmentProvider, ExtensionContext, LoadedItem, Screen, ScreenFactory, TypeIdentifier,
    ViewStack,
};
use crate::content::Bitmap;
use crate::error::{ExtractionError, ShareError};
use crate::navigation::Scene;

/// Provider serving preset load results
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    results: HashMap<TypeIdentifier, Result<LoadedItem, ExtractionError>>,
    conforming: HashSet<TypeIdentifier>,
    delay: Duration,
    load_calls: Arc<AtomicUsize>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider holding a plain-text item
    pub fn text(text: impl Into<String>) -> Self {
        Self::new().with_item(TypeIdentifier::PlainText, LoadedItem::Text(text.into()))
    }

    /// Provider holding a link
    pub fn url(url: Url) -> Self {
        Self::new().with_item(TypeIdentifier::Url, LoadedItem::Url(url))
    }

    /// Provider holding a decoded image
    pub fn image(bitmap: Bitmap) -> Self {
        Self::new().with_item(TypeIdentifier::Image, LoadedItem::Image(bitmap))
    }

    /// Provider whose image loads as a reference to a local file
    pub fn image_file(path: &Path) -> Result<Self, ExtractionError> {
        let url = Url::from_file_path(path).map_err(|_| {
            ExtractionError::UnsupportedReference(path.display().to_string())
        })?;
        Ok(Self::new().with_item(TypeIdentifier::Image, LoadedItem::Url(url)))
    }

    /// Serve `item` for `type_id` and report conformance to it
    pub fn with_item(mut self, type_id: TypeIdentifier, item: LoadedItem) -> Self {
        self.results.insert(type_id, Ok(item));
        self.conforming.insert(type_id);
        self
    }

    /// Fail loads of `type_id` with `message` while still reporting conformance
    pub fn with_failure(mut self, type_id: TypeIdentifier, message: &str) -> Self {
        self.results.insert(
            type_id,
            Err(ExtractionError::Load {
                type_id: type_id.to_string(),
                message: message.to_string(),
            }),
        );
        self.conforming.insert(type_id);
        self
    }

    /// Stop reporting conformance to `type_id` without removing its result
    pub fn without_conformance(mut self, type_id: TypeIdentifier) -> Self {
        self.conforming.remove(&type_id);
        self
    }

    /// Delay every load by `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of `load_item` calls made so far
    pub fn load_call_count(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AttachmentProvider for MemoryProvider {
    fn has_item_conforming_to(&self, type_id: TypeIdentifier) -> bool {
        self.conforming.contains(&type_id)
    }

    async fn load_item(&self, type_id: TypeIdentifier) -> Result<LoadedItem, ExtractionError> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.results
            .get(&type_id)
            .cloned()
            .unwrap_or_else(|| {
                Err(ExtractionError::Load {
                    type_id: type_id.to_string(),
                    message: "item not available for this type".to_string(),
                })
            })
    }
}

/// Screen that only knows its scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneScreen {
    scene: Scene,
}

impl SceneScreen {
    pub fn new(scene: Scene) -> Self {
        Self { scene }
    }
}

impl Screen for SceneScreen {
    fn scene(&self) -> Scene {
        self.scene
    }
}

/// Factory producing [`SceneScreen`]s
#[derive(Debug, Clone, Default)]
pub struct SceneScreenFactory {
    made: Rc<RefCell<Vec<Scene>>>,
}

impl SceneScreenFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scenes instantiated so far, shared across clones
    pub fn made(&self) -> Vec<Scene> {
        self.made.borrow().clone()
    }
}

impl ScreenFactory for SceneScreenFactory {
    fn make_screen(&self, scene: Scene) -> Box<dyn Screen> {
        self.made.borrow_mut().push(scene);
        Box::new(SceneScreen::new(scene))
    }
}

/// View stack backed by a vector
///
/// Built with [`VecViewStack::with_root`], the bottom screen cannot be
/// popped, like the root of a navigation controller.
#[derive(Default)]
pub struct VecViewStack {
    screens: Vec<Box<dyn Screen>>,
    root_locked: bool,
}

impl VecViewStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: Box<dyn Screen>) -> Self {
        Self {
            screens: vec![root],
            root_locked: true,
        }
    }

    pub fn scenes(&self) -> Vec<Scene> {
        self.screens.iter().map(|screen| screen.scene()).collect()
    }
}

impl ViewStack for VecViewStack {
    fn push_view(&mut self, screen: Box<dyn Screen>) {
        self.screens.push(screen);
    }

    fn pop_view(&mut self) -> Option<Box<dyn Screen>> {
        let floor = usize::from(self.root_locked);
        if self.screens.len() <= floor {
            return None;
        }
        self.screens.pop()
    }

    fn depth(&self) -> usize {
        self.screens.len()
    }

    fn top_scene(&self) -> Option<Scene> {
        self.screens.last().map(|screen| screen.scene())
    }
}

/// Extension context that records each cancellation it receives
#[derive(Debug, Clone, Default)]
pub struct RecordingContext {
    cancellations: Rc<RefCell<Vec<String>>>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cancellations, shared across clones
    pub fn cancel_count(&self) -> usize {
        self.cancellations.borrow().len()
    }

    pub fn last_error(&self) -> Option<String> {
        self.cancellations.borrow().last().cloned()
    }
}

impl ExtensionContext for RecordingContext {
    fn cancel_request(&self, error: ShareError) {
        self.cancellations.borrow_mut().push(error.to_string());
    }
}
