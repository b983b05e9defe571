use std::collections::BTreeSet;
use std::sync::Arc;

/// Which part of the app state changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Topic {
    Preferences,
    Session,
}

impl Topic {
    pub fn as_str(self) -> &'static str {
        match self {
            Topic::Preferences => "preferences",
            Topic::Session => "session",
        }
    }
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen::prelude::wasm_bindgen)]
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct ListenerKey(pub(crate) slotmap::DefaultKey);

/// Listener registry plus the set of topics that changed since the last drain.
#[derive(Default)]
pub(crate) struct Notifier {
    listeners: slotmap::SlotMap<slotmap::DefaultKey, Arc<dyn Fn(ListenerKey, Topic)>>,
    dirty: BTreeSet<Topic>,
}

impl Notifier {
    pub fn register_listener(
        &mut self,
        listener: impl Fn(ListenerKey, Topic) + 'static,
    ) -> ListenerKey {
        ListenerKey(self.listeners.insert(Arc::new(listener)))
    }

    pub fn unregister_listener(&mut self, key: ListenerKey) {
        self.listeners.remove(key.0);
    }

    pub fn mark_dirty(&mut self, topic: Topic) {
        self.dirty.insert(topic);
    }

    /// Callbacks for every (listener, dirty topic) pair, topics in order. Leaves everything clean.
    /// Callers run them after releasing their borrow so listeners can call back into the app.
    pub fn drain_due_notifications(&mut self) -> Vec<Box<dyn FnOnce()>> {
        let mut notifications: Vec<Box<dyn FnOnce()>> = Vec::new();
        for topic in std::mem::take(&mut self.dirty) {
            for (key, listener) in self.listeners.iter() {
                let listener = listener.clone();
                let key = ListenerKey(key);
                notifications.push(Box::new(move || listener(key, topic)));
            }
        }
        notifications
    }
}
