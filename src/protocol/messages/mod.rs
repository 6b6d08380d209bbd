//! Message layouts generated at build time from the signal database.
//! `generated_messages.rs` exposes one `MessageDescriptor` static and one
//! `*_ID` constant per message, plus the `MESSAGES` table.
include!(concat!(env!("OUT_DIR"), "/generated_messages.rs"));

/// Look up a message layout by arbitration id.
pub fn by_id(id: u32) -> Option<&'static MessageDescriptor> {
    MESSAGES.iter().copied().find(|m| m.id == id)
}

/// Cruise control buttons reported in `CRUISE_BUTTONS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CruiseButton {
    None,
    Cancel,
    Set,
    Resume,
    /// Any other raw value (main, distance, ...): irrelevant to engagement.
    Other(u8),
}

impl CruiseButton {
    pub const CANCEL: u8 = 2;
    pub const SET: u8 = 3;
    pub const RESUME: u8 = 4;

    /// Raw signal value for this button.
    pub fn raw(self) -> u8 {
        match self {
            CruiseButton::None => 0,
            CruiseButton::Cancel => Self::CANCEL,
            CruiseButton::Set => Self::SET,
            CruiseButton::Resume => Self::RESUME,
            CruiseButton::Other(v) => v,
        }
    }
}

impl From<u8> for CruiseButton {
    fn from(raw: u8) -> Self {
        match raw {
            0 => CruiseButton::None,
            Self::CANCEL => CruiseButton::Cancel,
            Self::SET => CruiseButton::Set,
            Self::RESUME => CruiseButton::Resume,
            other => CruiseButton::Other(other),
        }
    }
}
