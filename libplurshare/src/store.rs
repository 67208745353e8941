//! Session store
//!
//! Holds the [`AppState`] of one share session and is the only place the
//! reducer runs. The store lives on the session's control thread (it is
//! neither `Send` nor `Sync`); work on other threads reaches it through a
//! [`Dispatcher`](crate::session::Dispatcher).
//!
//! # Dispatch ordering
//!
//! A dispatch made while subscribers are being notified (for example the
//! navigation controller resetting a transition it just consumed, or a new
//! subscriber reacting to its first delivery) is queued and applied once the
//! current notification round has reached every subscriber. Every subscriber therefore sees the states in the same order,
//! and no subscriber is re-entered with a half-delivered round.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};
use uuid::Uuid;

use crate::app::{reduce, Action, AppState};

/// Listener notified after every applied action
pub trait StoreSubscriber {
    /// Called with the new state. `store` may be used to dispatch follow-up
    /// actions or manage subscriptions; both are safe from here.
    fn state_updated(&self, store: &Store, state: &AppState);
}

/// Handle returned by [`Store::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

type DeriveAction = Box<dyn FnOnce(&AppState) -> Action>;

enum Pending {
    Action(Action),
    /// Action computed from the state current at the moment it is applied
    Derived(DeriveAction),
}

pub struct Store {
    state: RefCell<AppState>,
    subscribers: RefCell<Vec<(SubscriptionId, Rc<dyn StoreSubscriber>)>>,
    queue: RefCell<VecDeque<Pending>>,
    dispatching: Cell<bool>,
}

/// Ends a dispatch round. If a subscriber panicked, whatever it left in the
/// queue is discarded so the next dispatch starts clean.
struct DispatchGuard<'a>(&'a Store);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            if let Ok(mut queue) = self.0.queue.try_borrow_mut() {
                if !queue.is_empty() {
                    debug!(dropped = queue.len(), "Discarding queued actions after panic");
                }
                queue.clear();
            }
        }
        self.0.dispatching.set(false);
    }
}

impl Store {
    pub fn new(state: AppState) -> Self {
        Self {
            state: RefCell::new(state),
            subscribers: RefCell::new(Vec::new()),
            queue: RefCell::new(VecDeque::new()),
            dispatching: Cell::new(false),
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> AppState {
        self.state.borrow().clone()
    }

    /// Apply `action` and notify every subscriber
    pub fn dispatch(&self, action: Action) {
        self.enqueue(Pending::Action(action));
    }

    /// Apply the action `derive` builds from the state current when it runs.
    ///
    /// Read-modify-write updates (such as appending one content item) go
    /// through here so that no other dispatch can land between the read and
    /// the write.
    pub fn update<F>(&self, derive: F)
    where
        F: FnOnce(&AppState) -> Action + 'static,
    {
        self.enqueue(Pending::Derived(Box::new(derive)));
    }

    /// Register `subscriber` and deliver the current state to it right away.
    ///
    /// Dispatches made from that first delivery are queued like any other
    /// nested dispatch and applied before `subscribe` returns.
    pub fn subscribe(&self, subscriber: Rc<dyn StoreSubscriber>) -> SubscriptionId {
        let id = SubscriptionId(Uuid::new_v4());
        self.subscribers
            .borrow_mut()
            .push((id, Rc::clone(&subscriber)));
        debug!(subscription = %id, "Subscriber added");

        let snapshot = self.state();
        if self.dispatching.replace(true) {
            // Subscribed mid-round; the outer dispatch drains the queue
            subscriber.state_updated(self, &snapshot);
            return id;
        }
        let _guard = DispatchGuard(self);
        subscriber.state_updated(self, &snapshot);
        self.drain();
        id
    }

    /// Remove a subscriber. Returns false if it was not registered.
    ///
    /// A subscriber removed mid-notification receives nothing further, not
    /// even the rest of the current round.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        let removed = subscribers.len() != before;
        if removed {
            debug!(subscription = %id, "Subscriber removed");
        }
        removed
    }

    /// Drop every subscriber
    pub fn clear_subscribers(&self) {
        let dropped = std::mem::take(&mut *self.subscribers.borrow_mut());
        debug!(count = dropped.len(), "Subscribers cleared");
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.subscribers
            .borrow()
            .iter()
            .any(|(existing, _)| *existing == id)
    }

    fn enqueue(&self, pending: Pending) {
        self.queue.borrow_mut().push_back(pending);

        if self.dispatching.replace(true) {
            // The outer dispatch drains the queue
            return;
        }
        let _guard = DispatchGuard(self);
        self.drain();
    }

    fn drain(&self) {
        while let Some(pending) = self.next_pending() {
            self.apply(pending);
        }
    }

    fn next_pending(&self) -> Option<Pending> {
        self.queue.borrow_mut().pop_front()
    }

    fn apply(&self, pending: Pending) {
        let action = match pending {
            Pending::Action(action) => action,
            Pending::Derived(derive) => derive(&self.state.borrow()),
        };
        let name = action.name();

        let current = std::mem::take(&mut *self.state.borrow_mut());
        let next = reduce(current, action);
        *self.state.borrow_mut() = next.clone();

        let round: Vec<_> = self.subscribers.borrow().clone();
        debug!(
            action = name,
            revision = next.navigation.revision,
            subscribers = round.len(),
            "Dispatched"
        );

        for (id, subscriber) in round {
            if !self.is_subscribed(id) {
                trace!(subscription = %id, "Skipping subscriber removed during notification");
                continue;
            }
            subscriber.state_updated(self, &next);
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(AppState::default())
    }
}
