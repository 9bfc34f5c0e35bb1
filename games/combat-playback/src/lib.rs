//! The classic combat playback "game" built atop `request-runtime` and
//! `instruction-protocol`: three event-scheduling strategies, a recorder
//! that serializes a combat algorithm's calls for cross-thread transport,
//! and the buffering/jumping state machine that drives visualization.

pub mod config;
pub mod interleaved;
pub mod playback_controller;
pub mod recorder;
pub mod standard;
pub mod traditional;

pub use config::PlaybackConfig;
pub use interleaved::InterleavedScheduler;
pub use playback_controller::{
    AnimationEngine, ConsumerHandle, EventBundle, EventRequester, PlaybackController, PlaybackState, PlayState,
    UnitStatusWidget, WeaponKind,
};
pub use recorder::EventRecorder;
pub use standard::StandardScheduler;
pub use traditional::TraditionalScheduler;
