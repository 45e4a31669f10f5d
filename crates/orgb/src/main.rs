mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "orgb", version, about = "OpenRGB SDK client CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::ProfilesAction;

    #[test]
    fn parses_color_subcommand() {
        let cli = Cli::try_parse_from([
            "orgb", "color", "2", "#ff8000", "--zone", "1", "--host", "10.0.0.5",
        ])
        .expect("color args should parse");

        match cli.command {
            Command::Color(args) => {
                assert_eq!(args.device, 2);
                assert_eq!(args.color, "#ff8000");
                assert_eq!(args.zone, Some(1));
                assert_eq!(args.connect.endpoint(), format!("10.0.0.5:{}", args.connect.port));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_profile_load() {
        let cli = Cli::try_parse_from(["orgb", "profiles", "load", "evening"])
            .expect("profiles args should parse");
        match cli.command {
            Command::Profiles(args) => {
                assert!(matches!(args.action, ProfilesAction::Load { ref name } if name == "evening"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_mode_with_settings() {
        let cli = Cli::try_parse_from([
            "orgb", "mode", "0", "Breathing", "--speed", "50", "--brightness", "80", "--save",
        ])
        .expect("mode args should parse");
        match cli.command {
            Command::Mode(args) => {
                assert_eq!(args.mode, "Breathing");
                assert_eq!(args.speed, Some(50));
                assert_eq!(args.brightness, Some(80));
                assert!(args.save);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["orgb", "list", "--format", "json", "--log-level", "debug"])
            .expect("global flags should parse anywhere");
        assert!(matches!(cli.format, Some(OutputFormat::Json)));
        assert!(matches!(cli.command, Command::List(_)));
    }

    #[test]
    fn rejects_missing_color() {
        let err = Cli::try_parse_from(["orgb", "color", "0"]).expect_err("color is required");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn rejects_non_numeric_device() {
        let err = Cli::try_parse_from(["orgb", "color", "gpu", "ff0000"])
            .expect_err("device must be an index");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
