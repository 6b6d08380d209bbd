//! Protocol-side components: message layouts, CAN transport abstractions,
//! and the frame-dispatch gateway that drives the safety hooks.
pub mod gateway;
pub mod messages;
pub mod transport;
