// SPDX-FileCopyrightText: The djio authors
// SPDX-License-Identifier: MPL-2.0

use strum::{Display, EnumIter, FromRepr, IntoStaticStr};

/// Transport class of a MIDI device.
///
/// The numeric values are exchanged with other processes and must not change.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, FromRepr,
    IntoStaticStr,
)]
#[repr(i32)]
pub enum TransportType {
    /// Device attached via USB
    #[strum(serialize = "USB")]
    Usb = 1,

    /// Software-based device hosted by an application
    #[strum(serialize = "Virtual")]
    Virtual = 2,

    /// Device paired via Bluetooth LE
    #[strum(serialize = "Bluetooth")]
    Bluetooth = 3,
}

impl TransportType {
    #[must_use]
    pub const fn to_i32(self) -> i32 {
        self as i32
    }

    #[must_use]
    pub fn from_i32(value: i32) -> Option<Self> {
        Self::from_repr(value)
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator as _;

    use super::TransportType;

    #[test]
    fn numeric_values() {
        assert_eq!(1, TransportType::Usb.to_i32());
        assert_eq!(2, TransportType::Virtual.to_i32());
        assert_eq!(3, TransportType::Bluetooth.to_i32());
    }

    #[test]
    fn from_i32() {
        for transport_type in TransportType::iter() {
            assert_eq!(
                Some(transport_type),
                TransportType::from_i32(transport_type.to_i32())
            );
        }
        assert_eq!(None, TransportType::from_i32(0));
        assert_eq!(None, TransportType::from_i32(4));
        assert_eq!(None, TransportType::from_i32(-1));
    }
}
