// SPDX-FileCopyrightText: The djio authors
// SPDX-License-Identifier: MPL-2.0

use strum::{Display, FromRepr, IntoStaticStr};

/// Direction of a MIDI port.
///
/// The numeric values are exchanged with other processes and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
#[repr(i32)]
pub enum PortType {
    Input = 1,
    Output = 2,
}

impl PortType {
    #[must_use]
    pub const fn to_i32(self) -> i32 {
        self as i32
    }
}

/// Read-only view of a single port of a device.
///
/// Materialized on demand from a [`crate::DeviceDescriptor`] and never cached.
///
/// Ports have no identity of their own. Comparing two `PortInfo`s compares
/// their contents, i.e. type, number and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    port_type: PortType,
    port_number: usize,
    name: String,
}

impl PortInfo {
    /// Absent names are replaced by an empty string.
    #[must_use]
    pub fn new(port_type: PortType, port_number: usize, name: Option<String>) -> Self {
        Self {
            port_type,
            port_number,
            name: name.unwrap_or_default(),
        }
    }

    #[must_use]
    pub const fn port_type(&self) -> PortType {
        self.port_type
    }

    /// The 0-based index that has been used for requesting this port.
    #[must_use]
    pub const fn port_number(&self) -> usize {
        self.port_number
    }

    /// The name of the port or an empty string if the port has no name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}
