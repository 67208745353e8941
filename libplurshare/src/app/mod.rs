//! Application state module
//!
//! - Actions: what can happen
//! - State: what is true right now
//! - Reducer: pure function (State, Action) -> State
//!
//! The [`Store`](crate::store::Store) is the only caller of the reducer.

pub mod actions;
pub mod reducer;
pub mod state;

pub use actions::Action;
pub use reducer::reduce;
pub use state::{AppState, Room, Server};
