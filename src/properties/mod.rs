// SPDX-FileCopyrightText: The djio authors
// SPDX-License-Identifier: MPL-2.0

//! Device properties
//!
//! Metadata about a device is stored in a property set with a closed
//! set of well-known keys. Each key accepts exactly one type of value
//! and only applies to certain transport types.

use std::{collections::BTreeMap, fmt};

use derive_more::{Deref, From};
use enum_as_inner::EnumAsInner;
use strum::{AsRefStr, EnumDiscriminants, EnumIter, EnumString, IntoStaticStr};
use thiserror::Error;

use crate::TransportType;

mod handles;
pub use self::handles::{BluetoothDeviceHandle, ServiceInfo, UsbDeviceHandle};


/// Well-known property keys
///
/// The string representation is used as the key on the wire.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    AsRefStr,
    EnumIter,
    EnumString,
    IntoStaticStr,
    strum::Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum PropertyKey {
    /// User visible name
    ///
    /// For USB devices this is a concatenation of the manufacturer
    /// and product names.
    Name,

    /// USB manufacturer name
    Manufacturer,

    /// USB product name
    Product,

    /// USB serial number
    SerialNumber,

    /// USB device that hosts the MIDI interface
    UsbDevice,

    /// Bluetooth peripheral
    BluetoothDevice,

    /// ALSA card number of a USB device
    AlsaCard,

    /// ALSA device number of a USB device
    AlsaDevice,

    /// Service that implements a virtual device
    ServiceInfo,
}

impl PropertyKey {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// The only type of value that is accepted for this key.
    #[must_use]
    pub const fn value_type(self) -> PropertyValueType {
        match self {
            Self::Name | Self::Manufacturer | Self::Product | Self::SerialNumber => {
                PropertyValueType::String
            }
            Self::AlsaCard | Self::AlsaDevice => PropertyValueType::Integer,
            Self::UsbDevice => PropertyValueType::UsbDevice,
            Self::BluetoothDevice => PropertyValueType::BluetoothDevice,
            Self::ServiceInfo => PropertyValueType::ServiceInfo,
        }
    }

    /// Checks if the property is meaningful for devices of the given transport type.
    #[must_use]
    pub const fn applies_to(self, transport_type: TransportType) -> bool {
        match self {
            Self::Name => true,
            Self::Manufacturer
            | Self::Product
            | Self::SerialNumber
            | Self::UsbDevice
            | Self::AlsaCard
            | Self::AlsaDevice => matches!(transport_type, TransportType::Usb),
            Self::BluetoothDevice => matches!(transport_type, TransportType::Bluetooth),
            Self::ServiceInfo => matches!(transport_type, TransportType::Virtual),
        }
    }
}

/// Property value
#[derive(Debug, Clone, PartialEq, Eq, EnumAsInner, EnumDiscriminants, From)]
#[strum_discriminants(name(PropertyValueType), derive(Hash, strum::Display))]
pub enum PropertyValue {
    String(String),
    Integer(i32),
    UsbDevice(UsbDeviceHandle),
    BluetoothDevice(BluetoothDeviceHandle),
    ServiceInfo(ServiceInfo),
}

impl From<&str> for PropertyValue {
    fn from(from: &str) -> Self {
        Self::String(from.to_owned())
    }
}

impl PropertyValue {
    #[must_use]
    pub fn value_type(&self) -> PropertyValueType {
        self.into()
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(value) => write!(f, "{value:?}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::UsbDevice(value) => write!(f, "{value}"),
            Self::BluetoothDevice(value) => write!(f, "{value}"),
            Self::ServiceInfo(value) => write!(f, "{value}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum PropertyError {
    #[error("property \"{key}\" expects a value of type {expected} instead of {actual}")]
    ValueTypeMismatch {
        key: PropertyKey,
        expected: PropertyValueType,
        actual: PropertyValueType,
    },
}

/// Set of device properties
///
/// Read access to the entries is provided by dereferencing into the
/// underlying map. Entries can only be added through [`Properties::insert()`],
/// which enforces the value type of each key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref)]
pub struct Properties(BTreeMap<PropertyKey, PropertyValue>);

impl Properties {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Insert or replace a property.
    ///
    /// Returns the replaced value, if any.
    pub fn insert(
        &mut self,
        key: PropertyKey,
        value: impl Into<PropertyValue>,
    ) -> Result<Option<PropertyValue>, PropertyError> {
        let value = value.into();
        let expected = key.value_type();
        let actual = value.value_type();
        if expected != actual {
            return Err(PropertyError::ValueTypeMismatch {
                key,
                expected,
                actual,
            });
        }
        Ok(self.0.insert(key, value))
    }

    /// Chainable variant of [`Properties::insert()`].
    pub fn with(
        mut self,
        key: PropertyKey,
        value: impl Into<PropertyValue>,
    ) -> Result<Self, PropertyError> {
        self.insert(key, value)?;
        Ok(self)
    }

    /// Keys of all properties that are not meaningful for the given transport type.
    pub fn inapplicable_keys(
        &self,
        transport_type: TransportType,
    ) -> impl Iterator<Item = PropertyKey> + '_ {
        self.0
            .keys()
            .copied()
            .filter(move |key| !key.applies_to(transport_type))
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.string_value(PropertyKey::Name)
    }

    #[must_use]
    pub fn manufacturer(&self) -> Option<&str> {
        self.string_value(PropertyKey::Manufacturer)
    }

    #[must_use]
    pub fn product(&self) -> Option<&str> {
        self.string_value(PropertyKey::Product)
    }

    #[must_use]
    pub fn serial_number(&self) -> Option<&str> {
        self.string_value(PropertyKey::SerialNumber)
    }

    #[must_use]
    pub fn usb_device(&self) -> Option<&UsbDeviceHandle> {
        self.0.get(&PropertyKey::UsbDevice)?.as_usb_device()
    }

    #[must_use]
    pub fn bluetooth_device(&self) -> Option<&BluetoothDeviceHandle> {
        self.0
            .get(&PropertyKey::BluetoothDevice)?
            .as_bluetooth_device()
    }

    #[must_use]
    pub fn alsa_card(&self) -> Option<i32> {
        self.integer_value(PropertyKey::AlsaCard)
    }

    #[must_use]
    pub fn alsa_device(&self) -> Option<i32> {
        self.integer_value(PropertyKey::AlsaDevice)
    }

    #[must_use]
    pub fn service_info(&self) -> Option<&ServiceInfo> {
        self.0.get(&PropertyKey::ServiceInfo)?.as_service_info()
    }

    fn string_value(&self, key: PropertyKey) -> Option<&str> {
        self.0.get(&key)?.as_string().map(String::as_str)
    }

    fn integer_value(&self, key: PropertyKey) -> Option<i32> {
        self.0.get(&key)?.as_integer().copied()
    }
}

impl fmt::Display for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        f.write_str("}")
    }
}
