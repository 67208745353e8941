//! Attachment ingestion
//!
//! Turns the host's attachment providers into content items. Every provider
//! gets up to three extractions running concurrently on the tokio runtime:
//! plain text, URL (unless disabled) and, when the provider conforms to it,
//! image. Each successful extraction appends one item to the composition by
//! sending a state update to the session's control thread. Failed
//! extractions are logged at debug level and otherwise ignored.

use std::path::Path;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinSet;
use tracing::{debug, debug_span, warn, Instrument};
use url::Url;

use crate::app::Action;
use crate::config::IngestionConfig;
use crate::content::{Bitmap, ContentItem};
use crate::error::ExtractionError;
use crate::host::{AttachmentProvider, LoadedItem, TypeIdentifier};
use crate::session::Dispatcher;

pub struct IngestionPipeline {
    dispatcher: Dispatcher,
    config: IngestionConfig,
}

impl IngestionPipeline {
    pub fn new(dispatcher: Dispatcher, config: IngestionConfig) -> Self {
        Self { dispatcher, config }
    }

    /// Start extracting from every provider on `runtime`.
    ///
    /// Returns immediately. Items reach the store as the session pumps its
    /// queue, in completion order.
    pub fn ingest(
        &self,
        providers: Vec<Arc<dyn AttachmentProvider>>,
        runtime: &Handle,
    ) -> IngestionHandle {
        let mut tasks = JoinSet::new();

        for (index, provider) in providers.into_iter().enumerate() {
            for type_id in self.planned_extractions(provider.as_ref()) {
                let provider = Arc::clone(&provider);
                let dispatcher = self.dispatcher.clone();
                let max_image_bytes = self.config.max_image_bytes;
                let span = debug_span!("extract", provider = index, type_id = %type_id);

                let task = async move {
                    match extract(provider.as_ref(), type_id, max_image_bytes).await {
                        Ok(item) => {
                            debug!(kind = item.kind(), "Extracted item");
                            dispatcher.update(move |state| {
                                Action::SetContent(state.content.appended(item))
                            });
                            true
                        }
                        Err(e) => {
                            debug!(error = %e, "Extraction skipped");
                            false
                        }
                    }
                };
                tasks.spawn_on(task.instrument(span), runtime);
            }
        }

        debug!(extractions = tasks.len(), "Ingestion started");
        IngestionHandle { tasks }
    }

    fn planned_extractions(&self, provider: &dyn AttachmentProvider) -> Vec<TypeIdentifier> {
        let mut planned = vec![TypeIdentifier::PlainText];
        if self.config.accept_urls {
            planned.push(TypeIdentifier::Url);
        }
        if provider.has_item_conforming_to(TypeIdentifier::Image) {
            planned.push(TypeIdentifier::Image);
        }
        planned
    }
}

/// In-flight extractions of one [`IngestionPipeline::ingest`] call
///
/// Dropping the handle leaves the extractions running; their items still
/// reach the session. Use [`IngestionHandle::abort`] to cancel them.
pub struct IngestionHandle {
    tasks: JoinSet<bool>,
}

impl IngestionHandle {
    /// Extractions not yet joined
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Cancel whatever is still running
    pub fn abort(&mut self) {
        self.tasks.abort_all();
    }

    /// Wait for every extraction. Returns how many produced an item.
    pub async fn join(mut self) -> usize {
        let mut extracted = 0;
        while let Some(result) = self.tasks.join_next().await {
            match result {
                Ok(true) => extracted += 1,
                Ok(false) => {}
                Err(e) if e.is_cancelled() => {}
                Err(e) => warn!(error = %e, "Extraction task panicked"),
            }
        }
        extracted
    }
}

impl Drop for IngestionHandle {
    fn drop(&mut self) {
        if !self.tasks.is_empty() {
            debug!(pending = self.tasks.len(), "Detaching running extractions");
        }
        self.tasks.detach_all();
    }
}

/// Run one typed extraction against `provider`
pub async fn extract(
    provider: &dyn AttachmentProvider,
    type_id: TypeIdentifier,
    max_image_bytes: u64,
) -> Result<ContentItem, ExtractionError> {
    let loaded = provider.load_item(type_id).await?;

    match (type_id, loaded) {
        (TypeIdentifier::PlainText, LoadedItem::Text(text)) => Ok(ContentItem::Text(text)),
        (TypeIdentifier::Url, LoadedItem::Url(url)) => Ok(ContentItem::Text(url.to_string())),
        (TypeIdentifier::Image, LoadedItem::Image(bitmap)) => Ok(ContentItem::Image(bitmap)),
        (TypeIdentifier::Image, LoadedItem::Url(reference)) => {
            load_image_reference(reference, max_image_bytes)
                .await
                .map(ContentItem::Image)
        }
        (expected, other) => Err(ExtractionError::UnexpectedType {
            expected: expected.to_string(),
            actual: other.kind().to_string(),
        }),
    }
}

/// Read and decode an image given by file URL, off the async workers
async fn load_image_reference(reference: Url, max_bytes: u64) -> Result<Bitmap, ExtractionError> {
    let path = reference
        .to_file_path()
        .map_err(|_| ExtractionError::UnsupportedReference(reference.to_string()))?;

    tokio::task::spawn_blocking(move || read_and_decode(&path, max_bytes))
        .await
        .map_err(|e| ExtractionError::Read(e.to_string()))?
}

fn read_and_decode(path: &Path, max_bytes: u64) -> Result<Bitmap, ExtractionError> {
    let size = std::fs::metadata(path)
        .map_err(|e| ExtractionError::Read(e.to_string()))?
        .len();
    if size > max_bytes {
        return Err(ExtractionError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let bytes = std::fs::read(path).map_err(|e| ExtractionError::Read(e.to_string()))?;
    Bitmap::decode(&bytes)
}
