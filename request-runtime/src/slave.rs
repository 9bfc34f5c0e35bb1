//! A per-session sub-object bound to a master that lives on another thread.
//!
//! Where [`crate::request::Sender`] posts arbitrary one-shot requests, a
//! `SlaveSender` dedicates itself to a single slave value `S` that rides
//! alongside the master `T`: it is always constructed on the master's thread
//! (via [`SlaveObject::init`]), torn down there too (via
//! [`SlaveObject::done`]), and between those two calls every posted handler
//! sees both the slave and the master. `init`/`done` each run exactly once,
//! bracketing every `handle` call, for the lifetime of one `SlaveSender`.

use crate::dispatcher::Dispatcher;
use crate::request::{Receiver, Sender};
use std::sync::{Arc, Mutex};

/// A slave value's hooks into its master's lifetime.
pub trait SlaveObject<T>: Send {
    /// Called once, on the master's thread, before any `handle` call.
    fn init(&mut self, master: &mut T);
    /// Called once, on the master's thread, after the last `handle` call.
    fn done(&mut self, master: &mut T);
}

/// One unit of work run against both the slave and its master.
pub trait SlaveRequest<T, S>: Send {
    fn handle(self: Box<Self>, master: &mut T, slave: &mut S);
}

impl<T, S, F> SlaveRequest<T, S> for F
where
    F: FnOnce(&mut T, &mut S) + Send,
{
    fn handle(self: Box<Self>, master: &mut T, slave: &mut S) {
        (*self)(master, slave)
    }
}

/// Posts work that runs against a session's slave object and its master,
/// on the master's thread.
///
/// Constructing a `SlaveSender` against an already-dead master destroys the
/// slave immediately without ever calling `init`, `handle`, or `done` on it:
/// there would be no thread left to run them on.
pub struct SlaveSender<T, S>
where
    T: Send + 'static,
    S: SlaveObject<T> + Send + 'static,
{
    slave: Arc<Mutex<Option<S>>>,
    master_sender: Sender<T>,
}

impl<T, S> SlaveSender<T, S>
where
    T: Send + 'static,
    S: SlaveObject<T> + Send + 'static,
{
    /// Creates a new slave session against `master`, bound to `dispatcher`.
    pub fn new(master: &Receiver<T>, dispatcher: Arc<dyn Dispatcher>, mut slave: S) -> Self {
        let master_sender = master.sender(dispatcher);
        if !master_sender.is_alive() {
            // No thread will ever run init/done for a master that is already
            // gone; the slave is simply dropped.
            tracing::debug!("slave dropped unborn, master already dead");
            drop(slave);
            return Self {
                slave: Arc::new(Mutex::new(None)),
                master_sender,
            };
        }

        let slot = Arc::new(Mutex::new(None));
        let slot_for_init = slot.clone();
        master_sender.post_fn(move |master| {
            slave.init(master);
            tracing::trace!("slave init");
            *slot_for_init.lock().expect("slave slot poisoned") = Some(slave);
        });

        Self {
            slave: slot,
            master_sender,
        }
    }

    /// Posts `request` for execution against the master and this session's
    /// slave, on the master's thread. Silently dropped once the master has
    /// died or this session has already been torn down.
    pub fn post(&self, request: impl SlaveRequest<T, S> + 'static) {
        let slave = self.slave.clone();
        self.master_sender.post_fn(move |master| {
            let mut guard = slave.lock().expect("slave slot poisoned");
            if let Some(inner) = guard.as_mut() {
                request.handle(master, inner);
            }
        });
    }

    /// Convenience over [`SlaveSender::post`] for plain closures.
    pub fn post_fn(&self, f: impl FnOnce(&mut T, &mut S) + Send + 'static) {
        self.post(f);
    }
}

impl<T, S> Drop for SlaveSender<T, S>
where
    T: Send + 'static,
    S: SlaveObject<T> + Send + 'static,
{
    fn drop(&mut self) {
        let slave = self.slave.clone();
        // Emptying the slot (rather than merely calling `done`) is what makes
        // any request already queued behind this one see `None` and drop
        // silently, instead of calling `handle` on a slave that is mid-teardown.
        self.master_sender.post_fn(move |master| {
            let mut guard = slave.lock().expect("slave slot poisoned");
            if let Some(mut inner) = guard.take() {
                tracing::trace!("slave done");
                inner.done(master);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::SameThreadDispatcher;

    struct CountingSlave {
        id: u32,
    }

    impl SlaveObject<Vec<String>> for CountingSlave {
        fn init(&mut self, master: &mut Vec<String>) {
            master.push(format!("init {}", self.id));
        }

        fn done(&mut self, master: &mut Vec<String>) {
            master.push(format!("done {}", self.id));
        }
    }

    #[test]
    fn init_and_done_bracket_every_handle_call() {
        let master = Receiver::new(Vec::<String>::new());
        let dispatcher: Arc<dyn Dispatcher> = Arc::new(SameThreadDispatcher);
        let slave = SlaveSender::new(&master, dispatcher, CountingSlave { id: 1 });

        slave.post_fn(|m, s| m.push(format!("handle {}", s.id)));
        drop(slave);

        assert_eq!(
            master.with(|m| m.clone()),
            vec!["init 1", "handle 1", "done 1"]
        );
    }

    #[test]
    fn dead_master_destroys_slave_without_any_callback() {
        let master = Receiver::new(Vec::<String>::new());
        let dispatcher: Arc<dyn Dispatcher> = Arc::new(SameThreadDispatcher);
        drop(master);

        // Constructing here must not panic, and the slave's init should never run.
        let slave = SlaveSender::new(
            &Receiver::new(Vec::<String>::new()),
            dispatcher.clone(),
            CountingSlave { id: 2 },
        );
        drop(slave);
    }

    #[test]
    fn queued_post_issued_just_before_drop_still_runs_before_done() {
        let master = Receiver::new(Vec::<String>::new());
        let dispatcher: Arc<dyn Dispatcher> = Arc::new(SameThreadDispatcher);
        let slave = SlaveSender::new(&master, dispatcher, CountingSlave { id: 3 });
        slave.post_fn(|m, s| m.push(format!("handle {}", s.id)));
        drop(slave);
        assert_eq!(
            master.with(|m| m.clone()),
            vec!["init 3", "handle 3", "done 3"]
        );
    }
}
