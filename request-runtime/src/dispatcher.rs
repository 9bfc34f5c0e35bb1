//! Thread targets a piece of work can be posted to.
//!
//! Everything in this crate moves work between threads by handing around
//! `Box<dyn FnOnce() + Send>` runnables rather than messages of a fixed
//! payload type. A [`Dispatcher`] is just "a place such a runnable can be
//! posted to and will eventually run"; what runs it and on which thread is
//! entirely up to the implementation.

use std::sync::mpsc;
use std::thread::JoinHandle;

/// A target a runnable can be posted to for later execution.
///
/// Implementations never run the runnable synchronously inside `post_runnable`
/// unless documented otherwise (see [`SameThreadDispatcher`]); the general
/// assumption callers may rely on is that posting never blocks.
pub trait Dispatcher: Send + Sync {
    fn post_runnable(&self, runnable: Box<dyn FnOnce() + Send>);
}

/// Dispatches onto a dedicated OS thread, driven by an internal event loop
/// that simply pulls runnables off an `mpsc` channel and calls them in order.
///
/// Dropping the last `ThreadDispatcher` closes the channel, the worker thread's
/// receive loop ends, and the thread is joined.
pub struct ThreadDispatcher {
    sink: mpsc::Sender<Box<dyn FnOnce() + Send>>,
    worker: Option<JoinHandle<()>>,
}

impl ThreadDispatcher {
    /// Spawns the worker thread. `name` is used only for the thread's debug name.
    pub fn spawn(name: impl Into<String>) -> Self {
        let (sink, source) = mpsc::channel::<Box<dyn FnOnce() + Send>>();
        let worker = std::thread::Builder::new()
            .name(name.into())
            .spawn(move || {
                while let Ok(runnable) = source.recv() {
                    runnable();
                }
            })
            .expect("failed to spawn dispatcher thread");
        Self {
            sink,
            worker: Some(worker),
        }
    }
}

impl Dispatcher for ThreadDispatcher {
    fn post_runnable(&self, runnable: Box<dyn FnOnce() + Send>) {
        // An error here means the worker thread already shut down; there is
        // nothing useful to do with a runnable that will never run, so it is
        // dropped along with the error.
        let _ = self.sink.send(runnable);
    }
}

impl Drop for ThreadDispatcher {
    fn drop(&mut self) {
        // Dropping `sink` closes the channel; `recv` then returns `Err` and
        // the worker loop exits on its own.
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Dispatches by calling the runnable immediately, on whatever thread posts
/// it. Used where a real background thread would only add noise: unit tests,
/// and the UI thread itself when it posts to its own queue.
#[derive(Default)]
pub struct SameThreadDispatcher;

impl Dispatcher for SameThreadDispatcher {
    fn post_runnable(&self, runnable: Box<dyn FnOnce() + Send>) {
        runnable();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn same_thread_dispatcher_runs_inline() {
        let dispatcher = SameThreadDispatcher;
        let ran = Arc::new(AtomicU32::new(0));
        let ran_clone = ran.clone();
        dispatcher.post_runnable(Box::new(move || {
            ran_clone.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn thread_dispatcher_runs_on_a_different_thread() {
        let dispatcher = ThreadDispatcher::spawn("test-worker");
        let (tx, rx) = mpsc::channel();
        let this_thread = std::thread::current().id();
        dispatcher.post_runnable(Box::new(move || {
            let _ = tx.send(std::thread::current().id());
        }));
        let worker_thread = rx.recv().unwrap();
        assert_ne!(worker_thread, this_thread);
    }
}
