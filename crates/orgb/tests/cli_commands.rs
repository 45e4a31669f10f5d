#![cfg(feature = "cli")]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::process::Command;
use std::thread;

use orgb_frame::{Command as SdkCommand, Header, HEADER_SIZE};

/// Minimal blocking server: answers the version probe with v3 and reports
/// zero controllers. Everything else is read and ignored.
fn spawn_empty_server() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
    let port = listener.local_addr().expect("local addr").port();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { break };
            thread::spawn(move || serve(stream));
        }
    });
    port
}

fn serve(mut stream: TcpStream) {
    loop {
        let mut raw = [0u8; HEADER_SIZE];
        if stream.read_exact(&mut raw).is_err() {
            return;
        }
        let header = Header::decode(&raw).expect("client sends valid headers");
        let mut payload = vec![0u8; header.payload_len as usize];
        if stream.read_exact(&mut payload).is_err() {
            return;
        }

        let reply = match SdkCommand::from_u32(header.command) {
            Some(SdkCommand::RequestProtocolVersion) => Some(3u32.to_le_bytes()),
            Some(SdkCommand::RequestControllerCount) => Some(0u32.to_le_bytes()),
            _ => None,
        };
        if let Some(body) = reply {
            let mut out = Header::new(header.target_id, header.command, 4).encode().to_vec();
            out.extend_from_slice(&body);
            if stream.write_all(&out).is_err() {
                return;
            }
        }
    }
}

fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    port
}

fn orgb(port: u16) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_orgb"));
    cmd.env("ORGB_HOST", "127.0.0.1")
        .env("ORGB_PORT", port.to_string())
        .arg("--log-level")
        .arg("error");
    cmd
}

#[test]
fn info_reports_negotiated_version_as_json() {
    let port = spawn_empty_server();

    let output = orgb(port)
        .args(["--format", "json", "info"])
        .output()
        .expect("info should run");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"protocol_version\":3"));
    assert!(stdout.contains("\"controller_count\":0"));
    assert!(stdout.contains("\"connected\":true"));
}

#[test]
fn list_with_no_controllers_prints_empty_array() {
    let port = spawn_empty_server();

    let output = orgb(port)
        .args(["--format", "json", "list"])
        .output()
        .expect("list should run");

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "[]");
}

#[test]
fn color_out_of_range_device_is_usage_error() {
    let port = spawn_empty_server();

    let output = orgb(port)
        .args(["color", "0", "ff0000"])
        .output()
        .expect("color should run");

    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("out of range"));
}

#[test]
fn invalid_color_fails_before_connecting() {
    let output = orgb(closed_port())
        .args(["color", "0", "not-a-color"])
        .output()
        .expect("color should run");

    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn refused_connection_is_plain_failure() {
    let output = orgb(closed_port())
        .arg("info")
        .output()
        .expect("info should run");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("error:"));
}

#[test]
fn version_prints_package_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_orgb"))
        .arg("version")
        .output()
        .expect("version should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("orgb "));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}
