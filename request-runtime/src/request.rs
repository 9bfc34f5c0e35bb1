//! One-shot cross-thread calls onto a thread-owned object.
//!
//! A [`Receiver<T>`] is permanently bound to the thread that created it and
//! owns the `T` it guards. A [`Sender<T>`] is cheap to clone, may live on any
//! thread, and posts [`Request<T>`]s that the receiver's dispatcher will run
//! against the guarded object in order. If the receiver has already died, a
//! `Sender` notices (via the shared [`Link`]) and drops the request instead
//! of posting a runnable nobody will ever run.

use crate::dispatcher::Dispatcher;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// A single unit of work that can be run against a `T` exactly once.
pub trait Request<T>: Send {
    fn handle(self: Box<Self>, target: &mut T);
}

impl<T, F> Request<T> for F
where
    F: FnOnce(&mut T) + Send,
{
    fn handle(self: Box<Self>, target: &mut T) {
        (*self)(target)
    }
}

/// Shared liveness flag between a `Receiver` and all of its `Sender`s.
///
/// There is deliberately no way to resurrect a dead link: once the receiver
/// is gone, every sender derived from it is permanently inert.
#[derive(Default)]
struct Link {
    alive: AtomicBool,
}

impl Link {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            alive: AtomicBool::new(true),
        })
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    fn kill(&self) {
        self.alive.store(false, Ordering::Release);
    }
}

/// Owns a `T` on behalf of a single thread and runs [`Request`]s posted to it
/// by any of its [`Sender`]s, in the order its dispatcher delivers them.
pub struct Receiver<T> {
    target: Arc<Mutex<T>>,
    link: Arc<Link>,
}

impl<T> Receiver<T>
where
    T: Send + 'static,
{
    /// Wraps `target`. The receiver itself does not own a thread; requests
    /// run wherever the dispatcher supplied to [`Receiver::sender`] delivers
    /// them, which in practice is always the thread that constructed this
    /// receiver.
    pub fn new(target: T) -> Self {
        Self {
            target: Arc::new(Mutex::new(target)),
            link: Link::new(),
        }
    }

    /// Creates a new `Sender` bound to this receiver and posting through `dispatcher`.
    pub fn sender(&self, dispatcher: Arc<dyn Dispatcher>) -> Sender<T> {
        Sender {
            posting: Arc::new(DirectPosting {
                target: self.target.clone(),
                link: self.link.clone(),
                dispatcher,
            }),
        }
    }

    /// Runs `f` against the guarded value directly, without going through a
    /// dispatcher. Intended for the owning thread to use on itself.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.target.lock().expect("receiver target poisoned");
        f(&mut guard)
    }
}

impl<T> Drop for Receiver<T> {
    fn drop(&mut self) {
        tracing::debug!("receiver dropped, link now dead");
        self.link.kill();
    }
}

/// What a [`Sender`] actually posts through. The root variant guards a real
/// `T` behind a `Mutex`; `convert`/`make_temporary` instead wrap another
/// `Sender` and a closure, so a converted `Sender<U>` never needs storage of
/// its own for `U`.
trait Posting<T>: Send + Sync {
    fn is_alive(&self) -> bool;
    fn post(&self, request: Box<dyn Request<T>>);
}

struct DirectPosting<T> {
    target: Arc<Mutex<T>>,
    link: Arc<Link>,
    dispatcher: Arc<dyn Dispatcher>,
}

impl<T> Posting<T> for DirectPosting<T>
where
    T: Send + 'static,
{
    fn is_alive(&self) -> bool {
        self.link.is_alive()
    }

    fn post(&self, request: Box<dyn Request<T>>) {
        if !self.link.is_alive() {
            tracing::trace!("post dropped, receiver already dead");
            return;
        }
        let target = self.target.clone();
        let link = self.link.clone();
        self.dispatcher.post_runnable(Box::new(move || {
            if !link.is_alive() {
                tracing::trace!("queued request dropped, receiver died before it ran");
                return;
            }
            let mut guard = target.lock().expect("receiver target poisoned");
            request.handle(&mut guard);
        }));
    }
}

/// Backs a `Sender<U>` returned by [`Sender::convert`]: routes every posted
/// `Request<U>` through the original `Sender<T>`, resolving a `&mut U` from
/// `&mut T` via the closure each time. A closure that returns `None` leaves
/// the request undelivered, no resources touched.
struct ConvertPosting<T, U> {
    source: Sender<T>,
    convert: Arc<dyn Fn(&mut T) -> Option<&mut U> + Send + Sync>,
}

impl<T, U> Posting<U> for ConvertPosting<T, U>
where
    T: Send + 'static,
    U: Send + 'static,
{
    fn is_alive(&self) -> bool {
        self.source.is_alive()
    }

    fn post(&self, request: Box<dyn Request<U>>) {
        let convert = self.convert.clone();
        self.source.post_fn(move |target| {
            if let Some(converted) = convert(target) {
                request.handle(converted);
            } else {
                tracing::trace!("converter closure declined, request discarded");
            }
        });
    }
}

/// Backs a `Sender<U>` returned by [`Sender::make_temporary`]: allocates a
/// fresh `U` per posted request on the source thread, invokes the request
/// against it, then drops it. `None` from the closure discards the request
/// without ever constructing a `U`.
struct TemporaryPosting<T, U> {
    source: Sender<T>,
    make: Arc<dyn Fn(&mut T) -> Option<U> + Send + Sync>,
}

impl<T, U> Posting<U> for TemporaryPosting<T, U>
where
    T: Send + 'static,
    U: Send + 'static,
{
    fn is_alive(&self) -> bool {
        self.source.is_alive()
    }

    fn post(&self, request: Box<dyn Request<U>>) {
        let make = self.make.clone();
        self.source.post_fn(move |target| {
            if let Some(mut temporary) = make(target) {
                request.handle(&mut temporary);
            } else {
                tracing::trace!("temporary-object closure declined, request discarded");
            }
        });
    }
}

/// A cloneable handle that posts [`Request`]s to a [`Receiver`]'s guarded
/// value, running them on the receiver's side via a [`Dispatcher`].
pub struct Sender<T> {
    posting: Arc<dyn Posting<T>>,
}

impl<T> Clone for Sender<T> {
    fn clone(&self) -> Self {
        Self {
            posting: self.posting.clone(),
        }
    }
}

impl<T> Sender<T>
where
    T: Send + 'static,
{
    /// Returns whether the receiver backing this sender is still alive.
    /// Best-effort: the receiver may die between this call returning and the
    /// next `post` call being made.
    pub fn is_alive(&self) -> bool {
        self.posting.is_alive()
    }

    /// Posts `request` for execution against the guarded value. Silently
    /// dropped if the receiver has already died; this is the only outcome a
    /// dead receiver ever produces, there is no error to observe.
    pub fn post(&self, request: impl Request<T> + 'static) {
        self.posting.post(Box::new(request));
    }

    /// Convenience over [`Sender::post`] for plain closures.
    pub fn post_fn(&self, f: impl FnOnce(&mut T) + Send + 'static) {
        self.post(f);
    }

    /// Returns a `Sender<U>` that, for every request posted to it, resolves a
    /// `&mut U` out of this sender's `T` via `f` and runs the request against
    /// it. `f` returning `None` discards the request; `self` is unaffected
    /// either way. Useful for routing requests to a sub-object that may or
    /// may not currently exist (e.g. an `Option<U>` field of `T`).
    pub fn convert<U>(&self, f: impl Fn(&mut T) -> Option<&mut U> + Send + Sync + 'static) -> Sender<U>
    where
        U: Send + 'static,
    {
        Sender {
            posting: Arc::new(ConvertPosting {
                source: self.clone(),
                convert: Arc::new(f),
            }),
        }
    }

    /// Returns a `Sender<U>` that, for every request posted to it, builds a
    /// fresh `U` via `f`, runs the request against it, then drops it. `f`
    /// returning `None` discards the request without constructing a `U`.
    /// Used for transient adapter objects scoped to a single request.
    pub fn make_temporary<U>(&self, f: impl Fn(&mut T) -> Option<U> + Send + Sync + 'static) -> Sender<U>
    where
        U: Send + 'static,
    {
        Sender {
            posting: Arc::new(TemporaryPosting {
                source: self.clone(),
                make: Arc::new(f),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::{SameThreadDispatcher, ThreadDispatcher};
    use std::sync::mpsc;

    #[test]
    fn post_runs_against_the_guarded_value() {
        let receiver = Receiver::new(0_i32);
        let sender = receiver.sender(Arc::new(SameThreadDispatcher));
        sender.post_fn(|v| *v += 1);
        sender.post_fn(|v| *v += 1);
        assert_eq!(receiver.with(|v| *v), 2);
    }

    #[test]
    fn post_after_receiver_death_is_silently_dropped() {
        let receiver = Receiver::new(0_i32);
        let sender = receiver.sender(Arc::new(SameThreadDispatcher));
        drop(receiver);
        assert!(!sender.is_alive());
        // Must not panic even though the guarded value is gone.
        sender.post_fn(|v| *v += 1);
    }

    #[test]
    fn cross_thread_round_trip_runs_on_the_receivers_thread() {
        let dispatcher = Arc::new(ThreadDispatcher::spawn("receiver-thread"));
        let receiver = Receiver::new(Vec::<i32>::new());
        let sender = receiver.sender(dispatcher);

        let (done_tx, done_rx) = mpsc::channel();
        sender.post_fn(move |v| {
            v.push(42);
            let _ = done_tx.send(());
        });
        done_rx.recv().unwrap();

        assert_eq!(receiver.with(|v| v.clone()), vec![42]);
    }

    struct Parent {
        child: Option<i32>,
    }

    #[test]
    fn convert_reaches_a_sub_object_through_the_parent_sender() {
        let receiver = Receiver::new(Parent { child: Some(10) });
        let parent_sender = receiver.sender(Arc::new(SameThreadDispatcher));
        let child_sender = parent_sender.convert(|parent: &mut Parent| parent.child.as_mut());

        child_sender.post_fn(|v| *v += 1);

        assert_eq!(receiver.with(|p| p.child), Some(11));
    }

    #[test]
    fn convert_closure_returning_none_discards_the_request_and_leaves_sender_usable() {
        let receiver = Receiver::new(Parent { child: None });
        let parent_sender = receiver.sender(Arc::new(SameThreadDispatcher));
        let child_sender = parent_sender.convert(|parent: &mut Parent| parent.child.as_mut());

        // No child exists yet; this must not panic and must not touch `parent`.
        child_sender.post_fn(|v| *v += 1);
        assert!(child_sender.is_alive());

        receiver.with(|p| p.child = Some(5));
        child_sender.post_fn(|v| *v += 1);
        assert_eq!(receiver.with(|p| p.child), Some(6));
    }

    #[test]
    fn make_temporary_builds_a_fresh_value_per_post_and_discards_it_after() {
        let receiver = Receiver::new(Vec::<i32>::new());
        let parent_sender = receiver.sender(Arc::new(SameThreadDispatcher));
        let adapter_sender = parent_sender.make_temporary(|log: &mut Vec<i32>| {
            log.push(0);
            Some(String::from("adapter"))
        });

        adapter_sender.post_fn(|s| s.push_str("-used"));
        adapter_sender.post_fn(|s| s.push_str("-used"));

        // The temporary is rebuilt and dropped each time; only the side
        // effect on the parent (recording a build happened) accumulates.
        assert_eq!(receiver.with(|log| log.clone()), vec![0, 0]);
    }

    #[test]
    fn make_temporary_closure_returning_none_discards_the_request() {
        let receiver = Receiver::new(0_i32);
        let parent_sender = receiver.sender(Arc::new(SameThreadDispatcher));
        let adapter_sender = parent_sender.make_temporary(|_: &mut i32| -> Option<String> { None });

        // Must not panic even though no temporary is ever constructed.
        adapter_sender.post_fn(|s| s.push_str("unreachable"));
        assert!(adapter_sender.is_alive());
    }
}
