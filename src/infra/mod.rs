//! Infrastructure shared by the protocol and safety layers.
pub mod codec;
