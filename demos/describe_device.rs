// SPDX-FileCopyrightText: The djio authors
// SPDX-License-Identifier: MPL-2.0

use std::sync::Arc;

use midi_device_info::{
    codec, DeviceDescriptor, DeviceId, NewDeviceDescriptor, PortType, Properties, PropertyKey,
    TransportType, UsbDeviceHandle,
};

fn main() {
    pretty_env_logger::init();
    match run() {
        Ok(()) => (),
        Err(err) => log::error!("{err:#}"),
    }
}

fn new_usb_keyboard() -> anyhow::Result<DeviceDescriptor> {
    let properties = Properties::new()
        .with(PropertyKey::Name, "Acme Keys 49")
        .and_then(|properties| properties.with(PropertyKey::Manufacturer, "Acme"))
        .and_then(|properties| properties.with(PropertyKey::Product, "Keys 49"))
        .and_then(|properties| {
            properties.with(
                PropertyKey::UsbDevice,
                UsbDeviceHandle {
                    device_name: "/dev/bus/usb/001/004".to_owned(),
                    vendor_id: 0x1234,
                    product_id: 0x0049,
                },
            )
        })
        .and_then(|properties| properties.with(PropertyKey::AlsaCard, 1))?;
    let descriptor = DeviceDescriptor::new(NewDeviceDescriptor {
        transport_type: TransportType::Usb,
        id: DeviceId::new(1),
        input_port_count: 1,
        output_port_count: 2,
        input_port_names: Some(vec![Some("Keys 49 MIDI In".to_owned())]),
        output_port_names: Some(vec![Some("Keys 49 MIDI Out".to_owned()), None]),
        properties: Arc::new(properties),
        is_private: false,
    })?;
    Ok(descriptor)
}

fn run() -> anyhow::Result<()> {
    let descriptor = new_usb_keyboard()?;
    let bytes = codec::encode(&descriptor)?;
    println!("Encoded {descriptor} into {len} bytes", len = bytes.len());

    let received = codec::decode(&bytes)?;
    anyhow::ensure!(
        received.same_content(&descriptor),
        "decoded descriptor differs from the original"
    );
    println!("Received {received}");
    for port_type in [PortType::Input, PortType::Output] {
        for port_info in received.port_infos(port_type) {
            println!(
                "{port_type} port {port_number}: \"{name}\"",
                port_number = port_info.port_number(),
                name = port_info.name(),
            );
        }
    }
    Ok(())
}
