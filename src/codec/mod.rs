// SPDX-FileCopyrightText: The djio authors
// SPDX-License-Identifier: MPL-2.0

//! Transfer of device descriptors between processes
//!
//! A descriptor is encoded as a fixed sequence of fields:
//!
//! ```text
//! [type:i32][id:i32][input port count:i32][output port count:i32]
//! [input port names:string array][output port names:string array]
//! [properties][private:i32]
//! ```
//!
//! Producers and consumers on both sides must agree on this order.

use std::{string::FromUtf16Error, sync::Arc};

use thiserror::Error;

use crate::{
    DescriptorError, DeviceDescriptor, DeviceId, NewDeviceDescriptor, PortType, PropertyError,
    TransportType,
};

mod bundle;

mod parcel;
pub use self::parcel::{ParcelReader, ParcelWriter};


/// Flags describing special contents of the encoded data.
///
/// Encoded descriptors are self-contained and never carry file
/// descriptors or other out-of-band resources.
pub const CONTENTS_FLAGS: i32 = 0;

/// Eight 32-bit fields with empty port name arrays and properties.
const MIN_ENCODED_DESCRIPTOR_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("length {0} exceeds the encodable range")]
    LengthOverflow(usize),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unexpected end of data: {needed} byte(s) needed, {available} available")]
    UnexpectedEnd { needed: usize, available: usize },

    #[error("invalid length {0}")]
    InvalidLength(i32),

    #[error("missing string")]
    MissingString,

    #[error(transparent)]
    InvalidUtf16(#[from] FromUtf16Error),

    #[error("string not terminated by a zero unit")]
    UnterminatedString,

    #[error("unknown transport type {0}")]
    UnknownTransportType(i32),

    #[error("invalid {port_type} port count {port_count}")]
    InvalidPortCount { port_type: PortType, port_count: i32 },

    #[error("invalid properties magic {0:#010x}")]
    InvalidPropertiesMagic(i32),

    #[error("properties length mismatch: declared {declared}, decoded {decoded}")]
    PropertiesLengthMismatch { declared: usize, decoded: usize },

    #[error("unsupported value tag {tag} of property \"{key}\"")]
    UnsupportedValueTag { key: String, tag: i32 },

    #[error("unknown record type \"{0}\"")]
    UnknownRecordType(String),

    #[error("{field} value {value} out of range")]
    ValueOutOfRange { field: &'static str, value: i32 },

    #[error("{0} trailing byte(s)")]
    TrailingBytes(usize),

    #[error(transparent)]
    Property(#[from] PropertyError),

    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
}

pub fn write_device_descriptor(
    writer: &mut ParcelWriter,
    descriptor: &DeviceDescriptor,
) -> Result<(), EncodeError> {
    writer.write_i32(descriptor.transport_type().to_i32());
    writer.write_i32(descriptor.id().value());
    writer.write_len(descriptor.input_port_count())?;
    writer.write_len(descriptor.output_port_count())?;
    writer.write_string_array(Some(descriptor.input_port_names()))?;
    writer.write_string_array(Some(descriptor.output_port_names()))?;
    bundle::write_properties(writer, descriptor.properties())?;
    writer.write_i32(i32::from(descriptor.is_private()));
    Ok(())
}

fn read_port_count(
    reader: &mut ParcelReader<'_>,
    port_type: PortType,
) -> Result<usize, DecodeError> {
    let port_count = reader.read_i32()?;
    usize::try_from(port_count).map_err(|_| DecodeError::InvalidPortCount {
        port_type,
        port_count,
    })
}

pub fn read_device_descriptor(
    reader: &mut ParcelReader<'_>,
) -> Result<DeviceDescriptor, DecodeError> {
    let transport_type = reader.read_i32()?;
    let transport_type = TransportType::from_i32(transport_type)
        .ok_or(DecodeError::UnknownTransportType(transport_type))?;
    let id = DeviceId::new(reader.read_i32()?);
    let input_port_count = read_port_count(reader, PortType::Input)?;
    let output_port_count = read_port_count(reader, PortType::Output)?;
    let input_port_names = reader.read_string_array()?;
    let output_port_names = reader.read_string_array()?;
    let properties = bundle::read_properties(reader)?;
    // Only 1 denotes a private device
    let is_private = reader.read_i32()? == 1;
    let descriptor = DeviceDescriptor::new(NewDeviceDescriptor {
        transport_type,
        id,
        input_port_count,
        output_port_count,
        input_port_names,
        output_port_names,
        properties: Arc::new(properties),
        is_private,
    })?;
    log::trace!("Decoded {descriptor}");
    Ok(descriptor)
}

fn finish_reading(reader: &ParcelReader<'_>) -> Result<(), DecodeError> {
    match reader.remaining() {
        0 => Ok(()),
        remaining => Err(DecodeError::TrailingBytes(remaining)),
    }
}

/// Encode a single descriptor.
pub fn encode(descriptor: &DeviceDescriptor) -> Result<Vec<u8>, EncodeError> {
    let mut writer = ParcelWriter::new();
    write_device_descriptor(&mut writer, descriptor)?;
    log::trace!("Encoded {descriptor} into {len} byte(s)", len = writer.len());
    Ok(writer.into_bytes())
}

/// Decode a single descriptor.
///
/// All bytes must be consumed.
pub fn decode(bytes: &[u8]) -> Result<DeviceDescriptor, DecodeError> {
    let mut reader = ParcelReader::new(bytes);
    let descriptor = read_device_descriptor(&mut reader)?;
    finish_reading(&reader)?;
    Ok(descriptor)
}

/// Encode a list of descriptors, e.g. the result of enumerating all devices.
pub fn encode_all(descriptors: &[DeviceDescriptor]) -> Result<Vec<u8>, EncodeError> {
    let mut writer = ParcelWriter::new();
    writer.write_len(descriptors.len())?;
    for descriptor in descriptors {
        write_device_descriptor(&mut writer, descriptor)?;
    }
    Ok(writer.into_bytes())
}

/// Decode a list of descriptors that has been encoded by [`encode_all()`].
///
/// All bytes must be consumed.
pub fn decode_all(bytes: &[u8]) -> Result<Vec<DeviceDescriptor>, DecodeError> {
    let mut reader = ParcelReader::new(bytes);
    let count = reader.read_len()?;
    let max_count = reader.remaining() / MIN_ENCODED_DESCRIPTOR_LEN;
    let mut descriptors = Vec::with_capacity(count.min(max_count));
    for _ in 0..count {
        descriptors.push(read_device_descriptor(&mut reader)?);
    }
    finish_reading(&reader)?;
    Ok(descriptors)
}
