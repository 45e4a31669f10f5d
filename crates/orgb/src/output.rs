use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use orgb_model::{Device, DeviceType, Plugin};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn device_type_name(device_type: DeviceType) -> &'static str {
    match device_type {
        DeviceType::Motherboard => "motherboard",
        DeviceType::Dram => "dram",
        DeviceType::Gpu => "gpu",
        DeviceType::Cooler => "cooler",
        DeviceType::LedStrip => "led strip",
        DeviceType::Keyboard => "keyboard",
        DeviceType::Mouse => "mouse",
        DeviceType::Mousemat => "mousemat",
        DeviceType::Headset => "headset",
        DeviceType::HeadsetStand => "headset stand",
        DeviceType::Gamepad => "gamepad",
        DeviceType::Light => "light",
        DeviceType::Speaker => "speaker",
        DeviceType::Virtual => "virtual",
        DeviceType::Storage => "storage",
        DeviceType::Case => "case",
        DeviceType::Microphone => "microphone",
        DeviceType::Accessory => "accessory",
        DeviceType::Keypad => "keypad",
        DeviceType::Unknown => "unknown",
    }
}

pub fn print_devices(devices: &[Device], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(devices),
        OutputFormat::Table => {
            let mut table = table(vec!["#", "TYPE", "NAME", "VENDOR", "LEDS", "ZONES", "MODE"]);
            for device in devices {
                table.add_row(vec![
                    device.index.to_string(),
                    device_type_name(device.device_type).to_string(),
                    device.name.clone(),
                    device.vendor.clone().unwrap_or_else(|| "-".to_string()),
                    device.leds.len().to_string(),
                    device.zones.len().to_string(),
                    device
                        .active_mode()
                        .map_or_else(|| "-".to_string(), |mode| mode.name().to_string()),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for device in devices {
                println!(
                    "{}: {} [{}] leds={} location={}",
                    device.index,
                    device.name,
                    device_type_name(device.device_type),
                    device.leds.len(),
                    device.location
                );
                for zone in &device.zones {
                    println!("    zone {}: {} ({} leds)", zone.index, zone.name, zone.leds_count);
                }
                for mode in &device.modes {
                    let marker = if Some(mode.index()) == usize::try_from(device.active_mode).ok() {
                        "*"
                    } else {
                        " "
                    };
                    println!("   {marker}mode {}: {}", mode.index(), mode.name());
                }
            }
        }
    }
}

pub fn print_names(title: &str, names: &[String], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(names),
        OutputFormat::Table => {
            let mut table = table(vec![title]);
            for name in names {
                table.add_row(vec![name.clone()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for name in names {
                println!("{name}");
            }
        }
    }
}

pub fn print_plugins(plugins: &[Plugin], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(plugins),
        OutputFormat::Table => {
            let mut table = table(vec!["#", "NAME", "VERSION", "SDK", "DESCRIPTION"]);
            for plugin in plugins {
                table.add_row(vec![
                    plugin.index.to_string(),
                    plugin.name.clone(),
                    plugin.version.clone(),
                    plugin.protocol_version.to_string(),
                    plugin.description.clone(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for plugin in plugins {
                println!("{}: {} {}", plugin.index, plugin.name, plugin.version);
            }
        }
    }
}
