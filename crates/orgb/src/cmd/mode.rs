use orgb_client::OrgbClient;
use orgb_model::{Device, Mode};
use tracing::info;

use crate::cmd::ModeArgs;
use crate::exit::{client_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};

pub async fn run(args: ModeArgs) -> CliResult<i32> {
    let client = args.connect.connect().await?;
    let result = apply(&client, &args).await;
    client.dispose().await;
    result?;

    Ok(SUCCESS)
}

async fn apply(client: &OrgbClient, args: &ModeArgs) -> CliResult<()> {
    let device = client
        .controller_data(args.device)
        .await
        .map_err(|err| client_error("fetching controller failed", err))?;

    let mut mode = select_mode(&device, &args.mode)?.clone();
    if let Some(speed) = args.speed {
        mode.set_speed(speed)
            .map_err(|err| CliError::new(DATA_INVALID, err.to_string()))?;
    }
    if let Some(brightness) = args.brightness {
        mode.set_brightness(brightness)
            .map_err(|err| CliError::new(DATA_INVALID, err.to_string()))?;
    }

    if args.save {
        client
            .save_mode(device.index, &mode)
            .await
            .map_err(|err| client_error("saving mode failed", err))?;
    } else {
        client
            .update_mode(device.index, &mode)
            .await
            .map_err(|err| client_error("updating mode failed", err))?;
    }
    info!(device = %device.name, mode = %mode, saved = args.save, "mode applied");
    Ok(())
}

/// Find a mode by index or, failing that, by case-insensitive name.
fn select_mode<'a>(device: &'a Device, selector: &str) -> CliResult<&'a Mode> {
    let found = match selector.parse::<usize>() {
        Ok(index) => device.modes.get(index),
        Err(_) => device.mode_by_name(selector),
    };
    found.ok_or_else(|| {
        CliError::new(
            USAGE,
            format!("controller {} has no mode '{selector}'", device.index),
        )
    })
}
