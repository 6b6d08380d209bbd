//! Honda safety model: the per-hardware state machine that validates every
//! received frame, every outbound command and every cross-bus relay.
//!
//! [`state::SafetyState`] is the single entry point. The submodules hold the
//! pieces it composes: static variant records ([`hardware`]), the rolling
//! counter/checksum gate ([`integrity`]), pedal and button tracking
//! ([`tracker`]), enable transitions ([`controls`]), actuation bounds
//! ([`tx`]) and relay routes ([`forward`]).
pub mod controls;
pub mod forward;
pub mod hardware;
pub mod integrity;
pub mod state;
pub mod tracker;
pub mod tx;

pub use hardware::{HondaHardware, UnsafeMode};
pub use state::SafetyState;
