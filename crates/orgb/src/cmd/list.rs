use tracing::debug;

use crate::cmd::ListArgs;
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_devices, OutputFormat};

pub async fn run(args: ListArgs, format: OutputFormat) -> CliResult<i32> {
    let client = args.connect.connect().await?;
    let devices = client.all_controllers().await;
    client.dispose().await;

    let devices = devices.map_err(|err| client_error("listing controllers failed", err))?;
    debug!(count = devices.len(), "controllers fetched");
    print_devices(&devices, format);
    Ok(SUCCESS)
}
