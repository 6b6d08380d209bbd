//! CAN transport layer: the frame representation exchanged with the safety
//! hooks and the bus abstraction used by the gateway.
//!
//! Frames carry the index of the bus they were received on (or must be sent
//! to), so a single `CanBus` implementation can multiplex every bus the
//! gatekeeper sits on.

pub mod can_frame;
pub mod traits;
