//! A debounced single-consumer signal: any number of change notifications
//! collapse into at most one pending delivery at a time.

use crate::dispatcher::Dispatcher;
use std::sync::{Arc, Mutex};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum NotifierState {
    /// No delivery in flight; the next `notify` will post one.
    Idle,
    /// A delivery has been posted but has not yet run.
    Pending,
    /// A delivery is in flight and at least one more `notify` arrived while
    /// it was running; another delivery must be posted once it finishes.
    Retriggered,
}

/// Collapses a burst of `notify` calls into a single posted callback, and
/// guarantees that any change occurring while that callback is running
/// results in exactly one more callback afterward rather than being lost.
pub struct ChangeNotifier {
    state: Arc<Mutex<NotifierState>>,
    dispatcher: Arc<dyn Dispatcher>,
    on_change: Arc<dyn Fn() + Send + Sync>,
}

impl ChangeNotifier {
    /// `on_change` runs on whatever thread `dispatcher` delivers to.
    pub fn new(dispatcher: Arc<dyn Dispatcher>, on_change: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            state: Arc::new(Mutex::new(NotifierState::Idle)),
            dispatcher,
            on_change: Arc::new(on_change),
        }
    }

    /// Signals a change. Only the `Idle -> Pending` transition actually posts
    /// a delivery; a notification arriving while one is pending or running
    /// just marks that another delivery is owed.
    pub fn notify(&self) {
        let mut state = self.state.lock().expect("notifier state poisoned");
        match *state {
            NotifierState::Idle => {
                *state = NotifierState::Pending;
                drop(state);
                tracing::trace!(from = ?NotifierState::Idle, to = ?NotifierState::Pending, "change notifier");
                self.post_delivery();
            }
            // A delivery is already posted or running; just mark that one
            // more is owed once it finishes.
            NotifierState::Pending => {
                tracing::trace!(from = ?NotifierState::Pending, to = ?NotifierState::Retriggered, "change notifier");
                *state = NotifierState::Retriggered;
            }
            NotifierState::Retriggered => {}
        }
    }

    fn post_delivery(&self) {
        deliver(self.state.clone(), self.on_change.clone(), self.dispatcher.clone());
    }
}

/// Runs `on_change` once, then re-posts itself if a `notify` arrived while it
/// was running; otherwise returns the notifier to `Idle`. Recurses through the
/// dispatcher rather than the call stack, so an arbitrarily long run of
/// back-to-back retriggers never grows one call frame deeper than this.
fn deliver(
    state: Arc<Mutex<NotifierState>>,
    on_change: Arc<dyn Fn() + Send + Sync>,
    dispatcher: Arc<dyn Dispatcher>,
) {
    on_change();
    let mut guard = state.lock().expect("notifier state poisoned");
    match *guard {
        NotifierState::Retriggered => {
            tracing::trace!(from = ?NotifierState::Retriggered, to = ?NotifierState::Pending, "change notifier");
            *guard = NotifierState::Pending;
            drop(guard);
            let dispatcher_for_post = dispatcher.clone();
            dispatcher.post_runnable(Box::new(move || deliver(state, on_change, dispatcher_for_post)));
        }
        _ => {
            tracing::trace!(to = ?NotifierState::Idle, "change notifier");
            *guard = NotifierState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::SameThreadDispatcher;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn a_burst_of_notifications_delivers_once() {
        let count = Arc::new(AtomicU32::new(0));
        let count_clone = count.clone();
        let notifier = ChangeNotifier::new(
            Arc::new(SameThreadDispatcher),
            move || {
                count_clone.fetch_add(1, Ordering::SeqCst);
            },
        );

        notifier.notify();
        notifier.notify();
        notifier.notify();

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn notifying_again_after_delivery_posts_another() {
        let count = Arc::new(AtomicU32::new(0));
        let count_clone = count.clone();
        let notifier = ChangeNotifier::new(
            Arc::new(SameThreadDispatcher),
            move || {
                count_clone.fetch_add(1, Ordering::SeqCst);
            },
        );

        notifier.notify();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        notifier.notify();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
