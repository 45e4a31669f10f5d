use std::future::Future;
use std::time::Duration;

use clap::{Args, Subcommand};
use orgb_client::{ClientConfig, OrgbClient, DEFAULT_CLIENT_NAME};
use orgb_transport::DEFAULT_PORT;

use crate::exit::{client_error, CliError, CliResult, INTERNAL, USAGE};
use crate::output::OutputFormat;

pub mod color;
pub mod info;
pub mod list;
pub mod mode;
pub mod plugins;
pub mod profiles;
pub mod version;
pub mod watch;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List controllers and their LEDs, zones and modes.
    List(ListArgs),
    /// Connect and print the negotiated protocol and controller count.
    Info(InfoArgs),
    /// Set every LED of a controller (or one zone) to a color.
    Color(ColorArgs),
    /// Activate a mode on a controller.
    Mode(ModeArgs),
    /// Manage server-side profiles.
    Profiles(ProfilesArgs),
    /// List server plugins.
    Plugins(PluginsArgs),
    /// Print device list change notifications until interrupted.
    Watch(WatchArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::List(args) => block_on(list::run(args, format)),
        Command::Info(args) => block_on(info::run(args, format)),
        Command::Color(args) => block_on(color::run(args)),
        Command::Mode(args) => block_on(mode::run(args)),
        Command::Profiles(args) => block_on(profiles::run(args, format)),
        Command::Plugins(args) => block_on(plugins::run(args, format)),
        Command::Watch(args) => block_on(watch::run(args, format)),
        Command::Version(args) => version::run(args),
    }
}

fn block_on<F: Future<Output = CliResult<i32>>>(future: F) -> CliResult<i32> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| CliError::new(INTERNAL, format!("failed to start runtime: {err}")))?
        .block_on(future)
}

/// Where and how to reach the SDK server.
#[derive(Args, Debug)]
pub struct ConnectArgs {
    /// Server host name or address.
    #[arg(long, env = "ORGB_HOST", default_value = "127.0.0.1")]
    pub host: String,
    /// Server port.
    #[arg(long, env = "ORGB_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// Connection timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "1s")]
    pub timeout: String,
    /// Client name announced to the server.
    #[arg(long, default_value = DEFAULT_CLIENT_NAME)]
    pub name: String,
}

impl ConnectArgs {
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn config(&self) -> CliResult<ClientConfig> {
        Ok(ClientConfig::default()
            .with_client_name(self.name.clone())
            .with_connect_timeout(parse_timeout(&self.timeout)?))
    }

    pub async fn connect(&self) -> CliResult<OrgbClient> {
        let endpoint = self.endpoint();
        OrgbClient::connect(&endpoint, self.config()?)
            .await
            .map_err(|err| client_error(&format!("connect to {endpoint} failed"), err))
    }
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
}

#[derive(Args, Debug)]
pub struct ColorArgs {
    /// Controller index.
    pub device: u32,
    /// Color as RRGGBB (leading '#' optional).
    pub color: String,
    /// Only color this zone.
    #[arg(long)]
    pub zone: Option<u32>,
    #[command(flatten)]
    pub connect: ConnectArgs,
}

#[derive(Args, Debug)]
pub struct ModeArgs {
    /// Controller index.
    pub device: u32,
    /// Mode index or name.
    pub mode: String,
    /// Effect speed, within the mode's range.
    #[arg(long)]
    pub speed: Option<u32>,
    /// Brightness, within the mode's range (protocol v3+).
    #[arg(long)]
    pub brightness: Option<u32>,
    /// Persist the mode on the device (protocol v3+).
    #[arg(long)]
    pub save: bool,
    #[command(flatten)]
    pub connect: ConnectArgs,
}

#[derive(Args, Debug)]
pub struct ProfilesArgs {
    #[command(subcommand)]
    pub action: ProfilesAction,
    #[command(flatten)]
    pub connect: ConnectArgs,
}

#[derive(Subcommand, Debug)]
pub enum ProfilesAction {
    /// List saved profiles.
    List,
    /// Apply a saved profile.
    Load { name: String },
    /// Save the current state as a profile.
    Save { name: String },
    /// Delete a saved profile.
    Delete { name: String },
}

#[derive(Args, Debug)]
pub struct PluginsArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Exit after N notifications.
    #[arg(long)]
    pub count: Option<usize>,
    #[command(flatten)]
    pub connect: ConnectArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_timeout(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "timeout must not be empty"));
    }

    let (number, millis) = match input.strip_suffix("ms") {
        Some(number) => (number, true),
        None => (input.strip_suffix('s').unwrap_or(input), false),
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid timeout value: {input}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "timeout must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_timeout_units() {
        assert_eq!(parse_timeout("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_timeout("2").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_timeout("150ms").unwrap(), Duration::from_millis(150));
    }

    #[test]
    fn parse_timeout_invalid() {
        assert!(parse_timeout("0s").is_err());
        assert!(parse_timeout("bad").is_err());
        assert!(parse_timeout(" ").is_err());
    }
}
