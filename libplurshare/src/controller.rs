//! Navigation controller
//!
//! Subscribes to the [`Store`] and turns the pending [`SceneTransition`]
//! into a view stack operation, then resets the transition to `None`.
//!
//! The host's [`ViewStack`] is moved into the controller and wrapped in a
//! private scene stack, so the only way to present or dismiss a screen is
//! to dispatch a transition. If the wrapped stack changes depth behind the
//! controller's back, the next transition panics: the view stack and the
//! state would no longer agree, and there is nothing sensible to recover to.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, info};

use crate::app::{Action, AppState};
use crate::error::ShareError;
use crate::host::{ExtensionContext, ScreenFactory, ViewStack};
use crate::navigation::{Scene, SceneTransition};
use crate::store::{Store, StoreSubscriber, SubscriptionId};

/// Push/pop over the host view stack, nothing else
struct SceneStack {
    views: Box<dyn ViewStack>,
    factory: Box<dyn ScreenFactory>,
    expected_depth: usize,
}

impl SceneStack {
    fn new(views: Box<dyn ViewStack>, factory: Box<dyn ScreenFactory>) -> Self {
        let expected_depth = views.depth();
        Self {
            views,
            factory,
            expected_depth,
        }
    }

    fn push_scene(&mut self, scene: Scene) {
        self.check_depth();
        let screen = self.factory.make_screen(scene);
        self.views.push_view(screen);
        self.expected_depth = self.views.depth();
    }

    /// Returns whether a screen was popped
    fn pop_scene(&mut self) -> bool {
        self.check_depth();
        let popped = self.views.pop_view().is_some();
        self.expected_depth = self.views.depth();
        popped
    }

    fn check_depth(&self) {
        let actual = self.views.depth();
        assert_eq!(
            actual, self.expected_depth,
            "view stack mutated outside the navigation controller (expected depth {}, found {})",
            self.expected_depth, actual
        );
    }
}

pub struct NavigationController {
    stack: RefCell<SceneStack>,
    context: Box<dyn ExtensionContext>,
    last_revision: Cell<Option<u64>>,
    subscription: Cell<Option<SubscriptionId>>,
    finished: Cell<bool>,
}

impl NavigationController {
    /// Take ownership of the host's view stack, screen factory and extension
    /// context.
    pub fn new(
        views: Box<dyn ViewStack>,
        factory: Box<dyn ScreenFactory>,
        context: Box<dyn ExtensionContext>,
    ) -> Rc<Self> {
        Rc::new(Self {
            stack: RefCell::new(SceneStack::new(views, factory)),
            context,
            last_revision: Cell::new(None),
            subscription: Cell::new(None),
            finished: Cell::new(false),
        })
    }

    /// Start following `store`. The pending transition, if any, is handled
    /// immediately.
    pub fn attach(self: &Rc<Self>, store: &Store) -> SubscriptionId {
        if let Some(existing) = self.subscription.get() {
            if store.is_subscribed(existing) {
                return existing;
            }
        }
        let id = store.subscribe(Rc::clone(self) as Rc<dyn StoreSubscriber>);
        // A pending Finish handled during subscribe has already cleared it
        if store.is_subscribed(id) {
            self.subscription.set(Some(id));
        }
        id
    }

    /// Stop following `store`. Returns false if not attached.
    pub fn detach(&self, store: &Store) -> bool {
        match self.subscription.take() {
            Some(id) => store.unsubscribe(id),
            None => false,
        }
    }

    /// Back navigation from host chrome. Goes through the store like any
    /// other transition.
    pub fn request_pop(&self, store: &Store) {
        store.dispatch(Action::MakeSceneTransition(SceneTransition::Pop));
    }

    pub fn depth(&self) -> usize {
        self.stack.borrow().views.depth()
    }

    pub fn top_scene(&self) -> Option<Scene> {
        self.stack.borrow().views.top_scene()
    }

    pub fn is_finished(&self) -> bool {
        self.finished.get()
    }

    fn finish(&self, store: &Store) {
        self.finished.set(true);
        info!("Share session finished, returning to host");
        self.context.cancel_request(ShareError::Canceled);
        store.clear_subscribers();
        self.subscription.set(None);
    }
}

impl StoreSubscriber for NavigationController {
    fn state_updated(&self, store: &Store, state: &AppState) {
        let navigation = &state.navigation;
        let transition = navigation.scene_transition;

        if transition == SceneTransition::None || self.finished.get() {
            return;
        }
        if self.last_revision.get() == Some(navigation.revision) {
            debug!(%transition, revision = navigation.revision, "Transition already consumed");
            return;
        }
        self.last_revision.set(Some(navigation.revision));

        match transition {
            SceneTransition::None => return,
            SceneTransition::Pop => {
                if !self.stack.borrow_mut().pop_scene() {
                    debug!("Nothing to pop");
                }
            }
            SceneTransition::Push(scene) => {
                self.stack.borrow_mut().push_scene(scene);
            }
            SceneTransition::Finish => self.finish(store),
        }

        debug!(%transition, depth = self.depth(), "Transition consumed");
        store.dispatch(Action::MakeSceneTransition(SceneTransition::None));
    }
}
