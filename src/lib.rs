//! Autoresolve - headless resolution of campaign scenarios
//!
//! Projects a campaign snapshot into a disposable battle simulation, turns the
//! scenario's objectives into standing orders and plays the phase loop to a
//! conclusion.

pub mod battle;
pub mod campaign;
pub mod core;
