//! `can-gatekeeper` library: a `no_std` CAN-bus safety gatekeeper sitting
//! between an assistive-driving computer and the buses of Honda Nidec and
//! Bosch vehicles. The crate exposes the infrastructure modules (bit codec,
//! checksums), the protocol plumbing (message layouts, frames, CAN bus,
//! gateway loop) and the safety model itself.
#![no_std]
//==================================================================================
/// Core data types shared by the build script and the codec engine.
pub mod core;
/// Edge errors: frame construction, signal codec, configuration, gateway I/O.
pub mod error;
/// Bit-level codec, Honda checksum and descriptor-driven signal access.
pub mod infra;
/// Message layouts, CAN transport and the async gateway.
pub mod protocol;
/// Per-hardware safety state machine: RX validation, TX validation, forwarding.
pub mod safety;
//==================================================================================
