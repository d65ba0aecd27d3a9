//! Desktop input mapped to a small action vocabulary.
//!
//! # Invariants
//! - The app turns raw events into actions; only actions touch scene state.
//! - Time actions go through `ControlState`, so the hour stays in `[0, 24]`.

pub mod action;

pub use action::{Action, Applied, HOUR_STEP};
