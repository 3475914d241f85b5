//! # storyforge-ir
//!
//! The Storyforge element model: typed command timelines, scripted
//! sprites with their loop/trigger scopes, named groups, and the merge and
//! ordering rules that turn script output into one deterministic element
//! stream.
//!
//! Every script host builds elements through this API; every encoder reads
//! the resulting [`ElementStream`].

pub mod command;
pub mod element;
pub mod group;
pub mod stream;
pub mod timeline;
pub mod validate;

pub use command::{Command, CommandValue};
pub use element::{Animation, Sample, ScriptElement, Sprite, Video};
pub use group::{Group, GroupSet};
pub use stream::{ElementStream, StreamEntry};
pub use timeline::{LoopScope, Timeline, TimelineGroup, TriggerScope};
pub use validate::validate_stream;
