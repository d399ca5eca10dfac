// SPDX-FileCopyrightText: The djio authors
// SPDX-License-Identifier: MPL-2.0

//! Encoding of property sets
//!
//! ```text
//! [length:i32][magic:i32][count:i32]([key:string][tag:i32][value])*
//! ```
//!
//! The length counts the bytes following the magic. Empty property
//! sets are encoded as a single zero length without a magic.

use crate::{
    BluetoothDeviceHandle, Properties, PropertyKey, PropertyValue, ServiceInfo, UsbDeviceHandle,
};

use super::{DecodeError, EncodeError, ParcelReader, ParcelWriter};

/// "BNDL" in little-endian byte order
const MAGIC: i32 = 0x4C44_4E42;

const ABSENT_LENGTH: i32 = -1;

const VALUE_TAG_STRING: i32 = 0;
const VALUE_TAG_INTEGER: i32 = 1;
const VALUE_TAG_RECORD: i32 = 4;

const USB_DEVICE_RECORD: &str = "UsbDevice";
const BLUETOOTH_DEVICE_RECORD: &str = "BluetoothDevice";
const SERVICE_INFO_RECORD: &str = "ServiceInfo";

pub(super) fn write_properties(
    writer: &mut ParcelWriter,
    properties: &Properties,
) -> Result<(), EncodeError> {
    if properties.is_empty() {
        writer.write_i32(0);
        return Ok(());
    }
    let length_pos = writer.reserve_i32();
    writer.write_i32(MAGIC);
    let start_pos = writer.len();
    writer.write_len(properties.len())?;
    for (key, value) in properties.iter() {
        writer.write_string(Some(key.as_str()))?;
        write_value(writer, value)?;
    }
    let length = writer.len() - start_pos;
    writer.patch_i32(
        length_pos,
        i32::try_from(length).map_err(|_| EncodeError::LengthOverflow(length))?,
    );
    Ok(())
}

fn write_value(writer: &mut ParcelWriter, value: &PropertyValue) -> Result<(), EncodeError> {
    match value {
        PropertyValue::String(value) => {
            writer.write_i32(VALUE_TAG_STRING);
            writer.write_string(Some(value.as_str()))?;
        }
        PropertyValue::Integer(value) => {
            writer.write_i32(VALUE_TAG_INTEGER);
            writer.write_i32(*value);
        }
        PropertyValue::UsbDevice(UsbDeviceHandle {
            device_name,
            vendor_id,
            product_id,
        }) => {
            writer.write_i32(VALUE_TAG_RECORD);
            writer.write_string(Some(USB_DEVICE_RECORD))?;
            writer.write_string(Some(device_name.as_str()))?;
            writer.write_i32(i32::from(*vendor_id));
            writer.write_i32(i32::from(*product_id));
        }
        PropertyValue::BluetoothDevice(BluetoothDeviceHandle { address }) => {
            writer.write_i32(VALUE_TAG_RECORD);
            writer.write_string(Some(BLUETOOTH_DEVICE_RECORD))?;
            writer.write_string(Some(address.as_str()))?;
        }
        PropertyValue::ServiceInfo(ServiceInfo { package_name, name }) => {
            writer.write_i32(VALUE_TAG_RECORD);
            writer.write_string(Some(SERVICE_INFO_RECORD))?;
            writer.write_string(Some(package_name.as_str()))?;
            writer.write_string(Some(name.as_str()))?;
        }
    }
    Ok(())
}

/// An absent property set is decoded as an empty set.
pub(super) fn read_properties(reader: &mut ParcelReader<'_>) -> Result<Properties, DecodeError> {
    let length = reader.read_i32()?;
    match length {
        ABSENT_LENGTH => {
            log::debug!("Decoding absent properties as empty");
            return Ok(Properties::new());
        }
        0 => return Ok(Properties::new()),
        _ => (),
    }
    let length = usize::try_from(length).map_err(|_| DecodeError::InvalidLength(length))?;
    let magic = reader.read_i32()?;
    if magic != MAGIC {
        return Err(DecodeError::InvalidPropertiesMagic(magic));
    }
    let start_pos = reader.position();
    let count = reader.read_len()?;
    let mut properties = Properties::new();
    for _ in 0..count {
        let key = reader.read_required_string()?;
        let value = read_value(reader, &key)?;
        match key.parse::<PropertyKey>() {
            Ok(key) => {
                if let Some(replaced) = properties.insert(key, value)? {
                    log::warn!("Replacing duplicate property \"{key}\": {replaced}");
                }
            }
            Err(_) => {
                log::warn!("Skipping unknown property \"{key}\": {value}");
            }
        }
    }
    let decoded_length = reader.position() - start_pos;
    if decoded_length != length {
        return Err(DecodeError::PropertiesLengthMismatch {
            declared: length,
            decoded: decoded_length,
        });
    }
    Ok(properties)
}

fn read_value(reader: &mut ParcelReader<'_>, key: &str) -> Result<PropertyValue, DecodeError> {
    let tag = reader.read_i32()?;
    let value = match tag {
        VALUE_TAG_STRING => PropertyValue::String(reader.read_required_string()?),
        VALUE_TAG_INTEGER => PropertyValue::Integer(reader.read_i32()?),
        VALUE_TAG_RECORD => read_record(reader)?,
        _ => {
            return Err(DecodeError::UnsupportedValueTag {
                key: key.to_owned(),
                tag,
            });
        }
    };
    Ok(value)
}

fn read_record(reader: &mut ParcelReader<'_>) -> Result<PropertyValue, DecodeError> {
    let record_type = reader.read_required_string()?;
    let value = match record_type.as_str() {
        USB_DEVICE_RECORD => {
            let device_name = reader.read_required_string()?;
            let vendor_id = read_u16(reader, "vendor_id")?;
            let product_id = read_u16(reader, "product_id")?;
            UsbDeviceHandle {
                device_name,
                vendor_id,
                product_id,
            }
            .into()
        }
        BLUETOOTH_DEVICE_RECORD => BluetoothDeviceHandle {
            address: reader.read_required_string()?,
        }
        .into(),
        SERVICE_INFO_RECORD => {
            let package_name = reader.read_required_string()?;
            let name = reader.read_required_string()?;
            ServiceInfo { package_name, name }.into()
        }
        _ => return Err(DecodeError::UnknownRecordType(record_type)),
    };
    Ok(value)
}

fn read_u16(reader: &mut ParcelReader<'_>, field: &'static str) -> Result<u16, DecodeError> {
    let value = reader.read_i32()?;
    u16::try_from(value).map_err(|_| DecodeError::ValueOutOfRange { field, value })
}
