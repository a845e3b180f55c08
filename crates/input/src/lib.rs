//! Input state tracker.
//!
//! Raw device events (already mapped to [`InputId`]s by the host) update a live
//! activation map and are re-emitted as named events carrying a snapshot.
//!
//! # Invariants
//! - A keydown for an id that is already active emits nothing.
//! - Every event's snapshot is taken after the state change.
//! - The tracker is owned by the host and torn down with it; no global state.

mod id;
mod tracker;

pub use id::{CHAR_KEYS, InputId, UnknownInput};
pub use tracker::{
    InputEvent, InputEventKind, InputPayload, InputSnapshot, InputTracker, ListenerId,
};
