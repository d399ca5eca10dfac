// SPDX-FileCopyrightText: The djio authors
// SPDX-License-Identifier: MPL-2.0

//! Opaque handles of the platform objects behind a device

use derive_more::Display;

/// Identifies the USB device that hosts a MIDI interface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
#[display("{device_name} ({vendor_id:04x}:{product_id:04x})")]
pub struct UsbDeviceHandle {
    /// Device node, e.g. `/dev/bus/usb/001/004`
    pub device_name: String,

    /// USB vendor id
    pub vendor_id: u16,

    /// USB product id
    pub product_id: u16,
}

/// Identifies a paired Bluetooth LE MIDI peripheral.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
#[display("{address}")]
pub struct BluetoothDeviceHandle {
    /// Hardware address, e.g. `00:11:22:AA:BB:CC`
    pub address: String,
}

/// The application service that implements a virtual device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
#[display("{package_name}/{name}")]
pub struct ServiceInfo {
    pub package_name: String,
    pub name: String,
}
