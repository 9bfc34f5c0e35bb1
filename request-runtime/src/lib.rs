//! Cross-thread plumbing: post runnables between threads, bind per-session
//! slave objects to a master's thread, and coalesce change notifications.
//!
//! This crate carries no transport, serialization, or network concerns; it
//! is the in-process middleware a single host process uses to hand work
//! between its own threads, the same role the networked middle layer plays
//! between processes.

pub mod change_notifier;
pub mod dispatcher;
pub mod proxy;
pub mod request;
pub mod slave;
pub mod wait_indicator;

pub use change_notifier::ChangeNotifier;
pub use dispatcher::{Dispatcher, SameThreadDispatcher, ThreadDispatcher};
pub use proxy::ConfigProxy;
pub use request::{Receiver, Request, Sender};
pub use slave::{SlaveObject, SlaveRequest, SlaveSender};
pub use wait_indicator::wait_for;
