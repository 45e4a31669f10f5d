use orgb_client::OrgbClient;
use orgb_model::Color;
use tracing::info;

use crate::cmd::ColorArgs;
use crate::exit::{client_error, CliError, CliResult, SUCCESS, USAGE};

pub async fn run(args: ColorArgs) -> CliResult<i32> {
    let color: Color = args
        .color
        .parse()
        .map_err(|err| CliError::new(USAGE, format!("{err}")))?;

    let client = args.connect.connect().await?;
    let result = apply(&client, &args, color).await;
    client.dispose().await;
    result?;

    Ok(SUCCESS)
}

async fn apply(client: &OrgbClient, args: &ColorArgs, color: Color) -> CliResult<()> {
    let device = client
        .controller_data(args.device)
        .await
        .map_err(|err| client_error("fetching controller failed", err))?;

    client
        .set_custom_mode(device.index)
        .await
        .map_err(|err| client_error("switching to direct mode failed", err))?;

    match args.zone {
        Some(zone_index) => {
            let zone = device.zones.get(zone_index as usize).ok_or_else(|| {
                CliError::new(
                    USAGE,
                    format!("controller {} has no zone {zone_index}", device.index),
                )
            })?;
            let colors = vec![color; zone.leds_count as usize];
            client
                .update_zone_leds(device.index, zone_index, &colors)
                .await
                .map_err(|err| client_error("updating zone failed", err))?;
            info!(device = %device.name, zone = %zone.name, %color, "zone colored");
        }
        None => {
            let colors = vec![color; device.leds.len()];
            client
                .update_leds(device.index, &colors)
                .await
                .map_err(|err| client_error("updating leds failed", err))?;
            info!(device = %device.name, %color, "device colored");
        }
    }
    Ok(())
}
