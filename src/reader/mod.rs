//! Markup Reader Module
//!
//! - SliceReader: pull parser over an in-memory string
//! - Events: event types for pull parsing

pub mod events;
pub mod slice;

pub use events::{MarkupEvent, StartTag};
pub use slice::{parse_events, SliceReader};
