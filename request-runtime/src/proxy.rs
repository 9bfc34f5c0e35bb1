//! A read-mostly value mirrored from an owning thread to any number of
//! readers, updated via [`ChangeNotifier`] so readers only wake up when the
//! value has actually changed.

use crate::change_notifier::ChangeNotifier;
use std::sync::{Arc, RwLock};

/// Holds the latest published snapshot of a `T`, plus the notifier that wakes
/// up readers when a fresh one lands.
pub struct ConfigProxy<T> {
    current: Arc<RwLock<T>>,
    notifier: ChangeNotifier,
}

impl<T> ConfigProxy<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// `on_change` runs (on whatever thread the supplied dispatcher delivers
    /// to) after every coalesced batch of `publish` calls.
    pub fn new(
        initial: T,
        dispatcher: Arc<dyn crate::dispatcher::Dispatcher>,
        on_change: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self {
            current: Arc::new(RwLock::new(initial)),
            notifier: ChangeNotifier::new(dispatcher, on_change),
        }
    }

    /// Returns a clone of the current value.
    pub fn get(&self) -> T {
        self.current.read().expect("config proxy poisoned").clone()
    }

    /// Publishes a new value and notifies.
    pub fn publish(&self, value: T) {
        *self.current.write().expect("config proxy poisoned") = value;
        self.notifier.notify();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::SameThreadDispatcher;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn readers_see_the_latest_published_value() {
        let notified = Arc::new(AtomicU32::new(0));
        let notified_clone = notified.clone();
        let proxy = ConfigProxy::new(0_i32, Arc::new(SameThreadDispatcher), move || {
            notified_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(proxy.get(), 0);
        proxy.publish(7);
        assert_eq!(proxy.get(), 7);
        assert_eq!(notified.load(Ordering::SeqCst), 1);
    }
}
