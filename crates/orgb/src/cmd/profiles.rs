use orgb_client::OrgbClient;
use tracing::info;

use crate::cmd::{ProfilesAction, ProfilesArgs};
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_names, OutputFormat};

pub async fn run(args: ProfilesArgs, format: OutputFormat) -> CliResult<i32> {
    let client = args.connect.connect().await?;
    let result = apply(&client, &args.action, format).await;
    client.dispose().await;
    result?;

    Ok(SUCCESS)
}

async fn apply(client: &OrgbClient, action: &ProfilesAction, format: OutputFormat) -> CliResult<()> {
    match action {
        ProfilesAction::List => {
            let names = client
                .profiles()
                .await
                .map_err(|err| client_error("listing profiles failed", err))?;
            print_names("PROFILE", &names, format);
        }
        ProfilesAction::Load { name } => {
            client
                .load_profile(name)
                .await
                .map_err(|err| client_error("loading profile failed", err))?;
            info!(profile = %name, "profile loaded");
        }
        ProfilesAction::Save { name } => {
            client
                .save_profile(name)
                .await
                .map_err(|err| client_error("saving profile failed", err))?;
            info!(profile = %name, "profile saved");
        }
        ProfilesAction::Delete { name } => {
            client
                .delete_profile(name)
                .await
                .map_err(|err| client_error("deleting profile failed", err))?;
            info!(profile = %name, "profile deleted");
        }
    }
    Ok(())
}
