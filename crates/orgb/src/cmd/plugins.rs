use crate::cmd::PluginsArgs;
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_plugins, OutputFormat};

pub async fn run(args: PluginsArgs, format: OutputFormat) -> CliResult<i32> {
    let client = args.connect.connect().await?;
    let plugins = client.plugins().await;
    client.dispose().await;

    let plugins = plugins.map_err(|err| client_error("listing plugins failed", err))?;
    print_plugins(&plugins, format);
    Ok(SUCCESS)
}
