//! Share session
//!
//! A [`ShareSession`] owns the [`Store`] for one share and the queue that
//! feeds it. The session and its store stay on the thread that created them;
//! other threads (ingestion tasks, host callbacks) hold a [`Dispatcher`] and
//! send commands that the control thread applies when it calls
//! [`ShareSession::pump`].
//!
//! ```
//! use libplurshare::{Action, ShareConfig, ShareSession};
//!
//! let session = ShareSession::new(ShareConfig::default());
//! let dispatcher = session.dispatcher();
//!
//! std::thread::spawn(move || {
//!     dispatcher.dispatch(Action::SetComposeText("from a worker".to_string()));
//! })
//! .join()
//! .unwrap();
//!
//! assert_eq!(session.pump(), 1);
//! assert_eq!(session.store().state().compose_text, "from a worker");
//! ```

use std::rc::Rc;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{debug, info};
use uuid::Uuid;

use crate::app::{Action, AppState};
use crate::config::ShareConfig;
use crate::controller::NavigationController;
use crate::ingestion::IngestionPipeline;
use crate::navigation::SceneTransition;
use crate::store::{Store, SubscriptionId};

type DeriveAction = Box<dyn FnOnce(&AppState) -> Action + Send>;

/// Message for the control thread
pub enum Command {
    Dispatch(Action),

    /// Dispatch the action computed from the state current when the command
    /// is applied
    Update(DeriveAction),
}

/// Thread-safe handle for sending actions to a session
#[derive(Clone)]
pub struct Dispatcher {
    sender: Sender<Command>,
}

impl Dispatcher {
    pub(crate) fn from_sender(sender: Sender<Command>) -> Self {
        Self { sender }
    }

    pub fn dispatch(&self, action: Action) {
        self.send(Command::Dispatch(action));
    }

    /// Queue a read-modify-write. `derive` runs on the control thread
    /// against the state of that moment, so concurrent updates never
    /// overwrite each other.
    pub fn update<F>(&self, derive: F)
    where
        F: FnOnce(&AppState) -> Action + Send + 'static,
    {
        self.send(Command::Update(Box::new(derive)));
    }

    fn send(&self, command: Command) {
        if self.sender.send(command).is_err() {
            // Session already gone; late completions have nowhere to land
            debug!("Share session closed, dropping command");
        }
    }
}

pub struct ShareSession {
    id: Uuid,
    config: ShareConfig,
    store: Store,
    sender: Sender<Command>,
    receiver: Receiver<Command>,
}

impl ShareSession {
    pub fn new(config: ShareConfig) -> Self {
        let (sender, receiver) = unbounded();
        let id = Uuid::new_v4();
        debug!(session = %id, "Share session created");
        Self {
            id,
            config,
            store: Store::new(AppState::new()),
            sender,
            receiver,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &ShareConfig {
        &self.config
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::from_sender(self.sender.clone())
    }

    /// Ingestion pipeline feeding this session
    pub fn ingestion(&self) -> IngestionPipeline {
        IngestionPipeline::new(self.dispatcher(), self.config.ingestion.clone())
    }

    /// Attach `controller` and present the configured initial scene
    pub fn start(&self, controller: &Rc<NavigationController>) -> SubscriptionId {
        let subscription = controller.attach(&self.store);
        let scene = self.config.navigation.initial_scene;
        info!(session = %self.id, %scene, "Share session started");
        self.store.dispatch(Action::MakeSceneTransition(SceneTransition::Push(scene)));
        subscription
    }

    /// Apply every queued command without blocking. Returns how many were
    /// applied.
    pub fn pump(&self) -> usize {
        let mut applied = 0;
        while let Ok(command) = self.receiver.try_recv() {
            self.apply(command);
            applied += 1;
        }
        applied
    }

    /// Wait up to `timeout` for a command, then drain the queue
    pub fn pump_timeout(&self, timeout: Duration) -> usize {
        match self.receiver.recv_timeout(timeout) {
            Ok(command) => {
                self.apply(command);
                1 + self.pump()
            }
            Err(_) => 0,
        }
    }

    /// Whether a Finish transition has been dispatched
    pub fn is_finished(&self) -> bool {
        self.store.state().navigation.finished
    }

    fn apply(&self, command: Command) {
        match command {
            Command::Dispatch(action) => self.store.dispatch(action),
            Command::Update(derive) => self.store.update(derive),
        }
    }
}
