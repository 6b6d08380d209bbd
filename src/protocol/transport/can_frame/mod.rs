//! In-memory representation of a classic CAN frame plus the bus it travels on.
use embedded_can::{ExtendedId, Id, StandardId};

use crate::core::{MessageDescriptor, MAX_PAYLOAD_BYTES};
use crate::error::{FrameError, SignalError};
use crate::infra::codec::engine;
use crate::infra::codec::traits::SignalAccess;

/// Largest 11-bit identifier.
const MAX_STANDARD_ID: u32 = 0x7FF;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Raw frame as read from (or written to) one of the vehicle buses.
pub struct CanFrame {
    /// Arbitration identifier (11-bit on every Honda message handled here).
    pub id: u32,
    /// Bus index: 0, 1 or 2 on the supported harnesses.
    pub bus: u8,
    /// Payload buffer. Bytes past `len` are always zero.
    pub data: [u8; MAX_PAYLOAD_BYTES],
    /// Number of valid payload bytes (Data Length Code, 0 to 8).
    pub len: usize,
}

impl CanFrame {
    /// Build a frame from a payload slice.
    pub fn new(id: u32, bus: u8, payload: &[u8]) -> Result<Self, FrameError> {
        if payload.len() > MAX_PAYLOAD_BYTES {
            return Err(FrameError::PayloadTooLong { len: payload.len() });
        }
        let mut data = [0u8; MAX_PAYLOAD_BYTES];
        data[..payload.len()].copy_from_slice(payload);
        Ok(Self {
            id,
            bus,
            data,
            len: payload.len(),
        })
    }

    /// Pack a message from named signal values. Counter and checksum handling
    /// follows [`engine::pack`]: the checksum is always recomputed.
    pub fn pack(
        descriptor: &'static MessageDescriptor,
        bus: u8,
        values: &[(&'static str, i64)],
    ) -> Result<Self, SignalError> {
        let mut data = [0u8; MAX_PAYLOAD_BYTES];
        let len = engine::pack(descriptor, values, &mut data)?;
        Ok(Self {
            id: descriptor.id,
            bus,
            data,
            len,
        })
    }

    /// Same frame relayed onto another bus.
    pub fn on_bus(&self, bus: u8) -> Self {
        Self {
            bus,
            ..self.clone()
        }
    }

    /// Immutable view over the populated bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len.min(MAX_PAYLOAD_BYTES)]
    }
}

impl SignalAccess for CanFrame {
    fn payload(&self) -> &[u8] {
        self.as_slice()
    }
}

impl embedded_can::Frame for CanFrame {
    fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        let raw = match id.into() {
            Id::Standard(id) => id.as_raw() as u32,
            Id::Extended(id) => id.as_raw(),
        };
        CanFrame::new(raw, 0, data).ok()
    }

    fn new_remote(_id: impl Into<Id>, _dlc: usize) -> Option<Self> {
        // Remote frames never carry actuation data; the gatekeeper does not model them.
        None
    }

    fn is_extended(&self) -> bool {
        self.id > MAX_STANDARD_ID
    }

    fn is_remote_frame(&self) -> bool {
        false
    }

    fn id(&self) -> Id {
        if self.id <= MAX_STANDARD_ID {
            Id::Standard(StandardId::new(self.id as u16).unwrap_or(StandardId::ZERO))
        } else {
            Id::Extended(ExtendedId::new(self.id).unwrap_or(ExtendedId::MAX))
        }
    }

    fn dlc(&self) -> usize {
        self.len
    }

    fn data(&self) -> &[u8] {
        self.as_slice()
    }
}
