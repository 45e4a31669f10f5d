use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info};

use crate::cmd::WatchArgs;
use crate::exit::{client_error, CliError, CliResult, SUCCESS, TRANSPORT_ERROR};
use crate::output::{print_json, OutputFormat};

#[derive(Serialize)]
struct Notification {
    event: &'static str,
    sequence: usize,
    timestamp: String,
}

pub async fn run(args: WatchArgs, format: OutputFormat) -> CliResult<i32> {
    let client = args.connect.connect().await?;
    let mut events = client.subscribe_device_list_updates();
    info!(endpoint = %args.connect.endpoint(), "watching for device list changes");

    let mut seen = 0usize;
    let outcome = loop {
        if args.count.is_some_and(|limit| seen >= limit) {
            break Ok(SUCCESS);
        }
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                debug!("interrupted");
                break Ok(SUCCESS);
            }
            err = client.connection().closed() => {
                break Err(client_error("watch stopped", err));
            }
            event = events.recv() => match event {
                Ok(_) | Err(RecvError::Lagged(_)) => {
                    seen += 1;
                    print_notification(seen, format);
                }
                Err(RecvError::Closed) => {
                    break Err(CliError::new(TRANSPORT_ERROR, "connection closed"));
                }
            },
        }
    };

    client.dispose().await;
    outcome
}

fn print_notification(sequence: usize, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&Notification {
            event: "device_list_updated",
            sequence,
            timestamp: now_unix_seconds(),
        }),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("[{}] device list updated", now_unix_seconds());
        }
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
