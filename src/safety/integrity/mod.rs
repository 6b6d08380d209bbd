//! Rolling counter and checksum gate for tracked RX messages.
//!
//! Each tracked id owns a slot holding the last counter seen and a fault
//! count. Faults raise the count up to [`MAX_WRONG_COUNTERS`], valid frames
//! lower it, and a message is rejected while the count sits at that ceiling.
use crate::core::{ChecksumKind, MessageDescriptor};
use crate::infra::codec::checksum::{
    honda_checksum, honda_stored_checksum, honda_stored_counter, next_counter,
};

/// Fault count at which a message stops being trusted. Also its ceiling, so a
/// single good frame is enough to recover.
pub const MAX_WRONG_COUNTERS: u8 = 5;
/// Distinct message ids the gate can follow at once.
pub const MAX_TRACKED_MESSAGES: usize = 8;

/// Reason a tracked frame failed the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IntegrityFault {
    /// Stored checksum differs from the computed one. The frame is dropped
    /// whatever the fault count.
    Checksum,
    /// Too many counter faults accumulated for this id.
    Counter,
    /// Frame length differs from the tracked layout.
    Length,
    /// No slot left to follow a new id.
    Untrackable,
}

#[derive(Debug, Clone, Copy)]
struct CounterSlot {
    id: u32,
    last_counter: Option<u8>,
    wrong_counters: u8,
}

impl CounterSlot {
    fn fault(&mut self) {
        self.wrong_counters = (self.wrong_counters + 1).min(MAX_WRONG_COUNTERS);
    }

    fn good(&mut self) {
        self.wrong_counters = self.wrong_counters.saturating_sub(1);
    }
}

/// Fixed-capacity table of per-message counter state.
#[derive(Debug, Clone)]
pub struct IntegrityGate {
    slots: [Option<CounterSlot>; MAX_TRACKED_MESSAGES],
}

impl Default for IntegrityGate {
    fn default() -> Self {
        Self::new()
    }
}

impl IntegrityGate {
    pub const fn new() -> Self {
        Self {
            slots: [None; MAX_TRACKED_MESSAGES],
        }
    }

    /// Forget every counter and fault count.
    pub fn reset(&mut self) {
        self.slots = [None; MAX_TRACKED_MESSAGES];
    }

    /// Current fault count of `id` (0 when never seen).
    pub fn wrong_counters(&self, id: u32) -> u8 {
        self.slots
            .iter()
            .flatten()
            .find(|slot| slot.id == id)
            .map_or(0, |slot| slot.wrong_counters)
    }

    /// Run the length, checksum and counter checks on one frame of the
    /// tracked `message`. A wrong length rejects the frame without touching
    /// the counter state.
    pub fn check(
        &mut self,
        message: &MessageDescriptor,
        payload: &[u8],
    ) -> Result<(), IntegrityFault> {
        if payload.len() != message.length as usize {
            return Err(IntegrityFault::Length);
        }
        let (Some(counter), Some(stored)) =
            (honda_stored_counter(payload), honda_stored_checksum(payload))
        else {
            return Err(IntegrityFault::Length);
        };
        let id = message.id;
        let slot = self.slot_mut(id).ok_or(IntegrityFault::Untrackable)?;

        if message.checksum == ChecksumKind::Honda && stored != honda_checksum(id, payload) {
            slot.fault();
            return Err(IntegrityFault::Checksum);
        }

        match slot.last_counter {
            // First frame of this id: synchronize.
            None => {}
            Some(previous) if counter == next_counter(previous) => slot.good(),
            Some(_) => slot.fault(),
        }
        slot.last_counter = Some(counter);

        if slot.wrong_counters >= MAX_WRONG_COUNTERS {
            Err(IntegrityFault::Counter)
        } else {
            Ok(())
        }
    }

    fn slot_mut(&mut self, id: u32) -> Option<&mut CounterSlot> {
        let index = match self.slots.iter().position(|s| matches!(s, Some(s) if s.id == id)) {
            Some(index) => index,
            None => {
                let free = self.slots.iter().position(Option::is_none)?;
                self.slots[free] = Some(CounterSlot {
                    id,
                    last_counter: None,
                    wrong_counters: 0,
                });
                free
            }
        };
        self.slots[index].as_mut()
    }
}
