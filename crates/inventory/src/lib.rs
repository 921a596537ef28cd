//! Inventory domain module: stock movements and derived location balances.
//!
//! This crate contains the movement rules and the balance aggregation, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod balance;
pub mod movement;
pub mod view;

pub use balance::{BalanceIndex, BalanceLine, compute_balances};
pub use movement::{
    Movement, MovementChanges, MovementPatch, NewMovement, TIMESTAMP_DISPLAY_FORMAT,
    TIMESTAMP_INPUT_FORMAT, format_timestamp, normalize_location, parse_qty,
    parse_timestamp_input,
};
pub use view::{MovementView, movement_views};
