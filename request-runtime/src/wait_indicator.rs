//! A blocking wait for a result produced on another thread, built on the same
//! [`crate::request::Sender`] posting primitive used everywhere else in this
//! crate. Only the caller that issues the wait blocks; the target thread's
//! event loop is never made to block on anything.

use crate::request::Sender;
use std::sync::mpsc;

/// Posts `f` to `sender` and blocks the calling thread until it has run,
/// returning its result.
///
/// Panics if the receiver has already died, since there is then no thread
/// left that will ever produce the result being waited for.
pub fn wait_for<T, R>(sender: &Sender<T>, f: impl FnOnce(&mut T) -> R + Send + 'static) -> R
where
    T: Send + 'static,
    R: Send + 'static,
{
    assert!(
        sender.is_alive(),
        "cannot wait on a request whose receiver has already died"
    );
    let (tx, rx) = mpsc::channel();
    sender.post_fn(move |target| {
        let result = f(target);
        let _ = tx.send(result);
    });
    rx.recv()
        .expect("receiver died while a synchronous wait was pending")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::{Dispatcher, ThreadDispatcher};
    use crate::request::Receiver;
    use std::sync::Arc;

    #[test]
    fn wait_for_returns_the_computed_result() {
        let dispatcher: Arc<dyn Dispatcher> = Arc::new(ThreadDispatcher::spawn("wait-test"));
        let receiver = Receiver::new(41_i32);
        let sender = receiver.sender(dispatcher);

        let result = wait_for(&sender, |v| {
            *v += 1;
            *v
        });

        assert_eq!(result, 42);
    }
}
