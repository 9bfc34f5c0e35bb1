//! Wire-agnostic data contracts shared between a combat algorithm and its
//! playback consumers: the instruction stream codec, the event listener and
//! scheduled-event shapes it carries, and the small value types they share.

pub mod error;
pub mod event_listener;
pub mod instruction_list;
pub mod scheduled_event;
pub mod types;

pub use error::InstructionListError;
pub use event_listener::EventListener;
pub use instruction_list::{InstructionList, InstructionReader, Opcode, Parameter};
pub use scheduled_event::{ScheduledEvent, ScheduledEventConsumer, ScheduledEventKind};
pub use types::{BattleResult, BattleResultBit, FighterStatus, HitEffect, Side, UnitInfo};
