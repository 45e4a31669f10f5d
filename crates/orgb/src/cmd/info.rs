use orgb_model::ProtocolVersion;
use serde::Serialize;

use crate::cmd::InfoArgs;
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_json, OutputFormat};

#[derive(Serialize)]
struct Capabilities {
    vendor_string: bool,
    profiles: bool,
    brightness_and_save_mode: bool,
    segments_and_plugins: bool,
}

impl From<ProtocolVersion> for Capabilities {
    fn from(version: ProtocolVersion) -> Self {
        Self {
            vendor_string: version.supports_vendor_string(),
            profiles: version.supports_profile_controls(),
            brightness_and_save_mode: version.supports_brightness_and_save_mode(),
            segments_and_plugins: version.supports_segments_and_plugins(),
        }
    }
}

#[derive(Serialize)]
struct InfoOutput {
    endpoint: String,
    client_name: String,
    protocol_version: u32,
    capabilities: Capabilities,
    controller_count: u32,
    connected: bool,
}

pub async fn run(args: InfoArgs, format: OutputFormat) -> CliResult<i32> {
    let client = args.connect.connect().await?;
    let version = client.protocol_version();
    let count = client.controller_count().await;
    client.dispose().await;

    let out = InfoOutput {
        endpoint: args.connect.endpoint(),
        client_name: args.connect.name.clone(),
        protocol_version: version.number(),
        capabilities: version.into(),
        controller_count: count.map_err(|err| client_error("controller count failed", err))?,
        connected: true,
    };
    print_info(&out, format);
    Ok(SUCCESS)
}

fn print_info(out: &InfoOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table | OutputFormat::Pretty => {
            let yes_no = |flag: bool| if flag { "yes" } else { "no" };
            println!("Connection Info:");
            println!("  Endpoint:         {}", out.endpoint);
            println!("  Client name:      {}", out.client_name);
            println!("  Protocol:         v{}", out.protocol_version);
            println!("  Vendor strings:   {}", yes_no(out.capabilities.vendor_string));
            println!("  Profiles:         {}", yes_no(out.capabilities.profiles));
            println!(
                "  Brightness/save:  {}",
                yes_no(out.capabilities.brightness_and_save_mode)
            );
            println!(
                "  Segments/plugins: {}",
                yes_no(out.capabilities.segments_and_plugins)
            );
            println!("  Controllers:      {}", out.controller_count);
        }
    }
}
