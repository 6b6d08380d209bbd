//! Signal codec: bit access, descriptor-driven decode/encode and the
//! Honda counter/checksum helpers.
pub mod bits;
pub mod checksum;
pub mod engine;
pub mod traits;
