use std::cell::RefCell;
use std::rc::Rc;

use ukabe_core::SceneEvent;

/// Fan-out hub for the typed scene events. Subscribers are plain closures
/// registered at wiring time by the application root; there is no dynamic
/// unsubscription because subscribers live exactly as long as the app.
#[derive(Clone, Default)]
pub(crate) struct SceneHooks {
    subscribers: Rc<RefCell<Vec<Rc<dyn Fn(SceneEvent)>>>>,
}

impl SceneHooks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn subscribe(&self, subscriber: Rc<dyn Fn(SceneEvent)>) {
        self.subscribers.borrow_mut().push(subscriber);
    }

    pub(crate) fn emit(&self, event: SceneEvent) {
        let subscribers: Vec<_> = self.subscribers.borrow().clone();
        for subscriber in subscribers {
            subscriber(event);
        }
    }
}
