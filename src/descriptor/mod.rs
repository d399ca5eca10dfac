// SPDX-FileCopyrightText: The djio authors
// SPDX-License-Identifier: MPL-2.0

use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

use derive_more::{Display, From};
use thiserror::Error;

use crate::{PortInfo, PortType, Properties, TransportType};


/// Device identifier
///
/// Assigned by the registry that owns the device. Only unique during the
/// lifetime of the registry and not preserved when a device is re-attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From)]
pub struct DeviceId(i32);

impl DeviceId {
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> i32 {
        let Self(value) = self;
        value
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("{port_type} port number {port_number} out of range (port count: {port_count})")]
    PortNumberOutOfRange {
        port_type: PortType,
        port_number: usize,
        port_count: usize,
    },

    #[error("{port_count} {port_type} port(s) with {name_count} port name(s)")]
    PortNameCountMismatch {
        port_type: PortType,
        port_count: usize,
        name_count: usize,
    },
}

/// Arguments for [`DeviceDescriptor::new()`].
#[derive(Debug, Clone)]
pub struct NewDeviceDescriptor {
    pub transport_type: TransportType,

    pub id: DeviceId,

    pub input_port_count: usize,

    pub output_port_count: usize,

    /// Optional input port names
    ///
    /// If present the number of names must match `input_port_count`.
    /// Absent names are replaced by empty strings.
    pub input_port_names: Option<Vec<Option<String>>>,

    /// Optional output port names
    ///
    /// If present the number of names must match `output_port_count`.
    /// Absent names are replaced by empty strings.
    pub output_port_names: Option<Vec<Option<String>>>,

    /// Shared with the resulting descriptor, never copied.
    pub properties: Arc<Properties>,

    pub is_private: bool,
}

/// Immutable description of a MIDI device
///
/// Describes a device without holding a connection to it. Descriptors
/// are created by the registry that owns the device or decoded after
/// transferring them from another process.
///
/// Two descriptors are considered equal if their ids are equal, regardless
/// of all other fields. This allows to track devices by descriptor, e.g. in
/// a `HashSet`, even if a newer descriptor for the same device differs in
/// its contents. Use [`DeviceDescriptor::same_content()`] for comparing all
/// fields.
#[derive(Debug, Clone)]
pub struct DeviceDescriptor {
    transport_type: TransportType,
    id: DeviceId,
    input_port_names: Vec<String>,
    output_port_names: Vec<String>,
    properties: Arc<Properties>,
    is_private: bool,
}

fn normalize_port_names(
    port_type: PortType,
    port_count: usize,
    port_names: Option<Vec<Option<String>>>,
) -> Result<Vec<String>, DescriptorError> {
    let Some(port_names) = port_names else {
        return Ok(vec![String::new(); port_count]);
    };
    if port_names.len() != port_count {
        return Err(DescriptorError::PortNameCountMismatch {
            port_type,
            port_count,
            name_count: port_names.len(),
        });
    }
    Ok(port_names
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}

impl DeviceDescriptor {
    pub fn new(new_descriptor: NewDeviceDescriptor) -> Result<Self, DescriptorError> {
        let NewDeviceDescriptor {
            transport_type,
            id,
            input_port_count,
            output_port_count,
            input_port_names,
            output_port_names,
            properties,
            is_private,
        } = new_descriptor;
        let input_port_names =
            normalize_port_names(PortType::Input, input_port_count, input_port_names)?;
        let output_port_names =
            normalize_port_names(PortType::Output, output_port_count, output_port_names)?;
        for key in properties.inapplicable_keys(transport_type) {
            log::warn!("Property \"{key}\" does not apply to {transport_type} device {id}");
        }
        Ok(Self {
            transport_type,
            id,
            input_port_names,
            output_port_names,
            properties,
            is_private,
        })
    }

    #[must_use]
    pub const fn transport_type(&self) -> TransportType {
        self.transport_type
    }

    #[must_use]
    pub const fn id(&self) -> DeviceId {
        self.id
    }

    /// Hash code for interoperating with other processes.
    ///
    /// Equals the numeric value of the id.
    #[must_use]
    pub const fn hash_code(&self) -> i32 {
        self.id.value()
    }

    #[must_use]
    pub fn input_port_count(&self) -> usize {
        self.input_port_names.len()
    }

    #[must_use]
    pub fn output_port_count(&self) -> usize {
        self.output_port_names.len()
    }

    /// Names of all input ports, empty if unnamed.
    #[must_use]
    pub fn input_port_names(&self) -> &[String] {
        &self.input_port_names
    }

    /// Names of all output ports, empty if unnamed.
    #[must_use]
    pub fn output_port_names(&self) -> &[String] {
        &self.output_port_names
    }

    /// Information about an input port.
    ///
    /// Fails if `port_number` is not less than [`Self::input_port_count()`].
    pub fn input_port_info(&self, port_number: usize) -> Result<PortInfo, DescriptorError> {
        self.port_info(PortType::Input, port_number)
    }

    /// Information about an output port.
    ///
    /// Fails if `port_number` is not less than [`Self::output_port_count()`].
    pub fn output_port_info(&self, port_number: usize) -> Result<PortInfo, DescriptorError> {
        self.port_info(PortType::Output, port_number)
    }

    pub fn port_info(
        &self,
        port_type: PortType,
        port_number: usize,
    ) -> Result<PortInfo, DescriptorError> {
        let port_names = self.port_names(port_type);
        let Some(name) = port_names.get(port_number) else {
            return Err(DescriptorError::PortNumberOutOfRange {
                port_type,
                port_number,
                port_count: port_names.len(),
            });
        };
        Ok(PortInfo::new(port_type, port_number, Some(name.clone())))
    }

    /// Information about all ports of the given type, ordered by port number.
    pub fn port_infos(&self, port_type: PortType) -> impl Iterator<Item = PortInfo> + '_ {
        self.port_names(port_type)
            .iter()
            .enumerate()
            .map(move |(port_number, name)| {
                PortInfo::new(port_type, port_number, Some(name.clone()))
            })
    }

    fn port_names(&self, port_type: PortType) -> &[String] {
        match port_type {
            PortType::Input => &self.input_port_names,
            PortType::Output => &self.output_port_names,
        }
    }

    /// The properties
    ///
    /// Returns the very same instance that has been passed on construction.
    #[must_use]
    pub const fn properties(&self) -> &Arc<Properties> {
        &self.properties
    }

    /// Private devices are only visible to processes that run with the
    /// same identity as the application that hosts the device.
    #[must_use]
    pub const fn is_private(&self) -> bool {
        self.is_private
    }

    /// Compares all fields, not only the id.
    #[must_use]
    pub fn same_content(&self, other: &Self) -> bool {
        let Self {
            transport_type,
            id,
            input_port_names,
            output_port_names,
            properties,
            is_private,
        } = self;
        *transport_type == other.transport_type
            && *id == other.id
            && *input_port_names == other.input_port_names
            && *output_port_names == other.output_port_names
            && **properties == *other.properties
            && *is_private == other.is_private
    }
}

impl PartialEq for DeviceDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DeviceDescriptor {}

impl Hash for DeviceDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            transport_type,
            id,
            input_port_names,
            output_port_names,
            properties,
            is_private,
        } = self;
        write!(
            f,
            "{transport_type} device {id} (input ports: {input_port_count}, output ports: \
             {output_port_count}, properties: {properties}, private: {is_private})",
            input_port_count = input_port_names.len(),
            output_port_count = output_port_names.len(),
        )
    }
}
