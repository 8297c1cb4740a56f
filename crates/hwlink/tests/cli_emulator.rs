#![cfg(feature = "cli")]

use std::net::{SocketAddr, UdpSocket};
use std::process::{Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use hwlink::device::messages::{
    ButtonRequest, ButtonRequestType, Failure, FailureType, Features, PinMatrixRequest,
    PinMatrixRequestType, Success,
};
use hwlink::device::DeviceMessage;
use hwlink::frame::{encode_message, kind, Message, MessageDecoder};
use hwlink::transport::PACKET_SIZE;

/// UDP stand-in for the emulator. Answers each complete request with the next
/// scripted reply and stops after the last one (or on the first request past
/// the script). Yields the request kinds it saw.
fn spawn_emulator(replies: Vec<Message>) -> (SocketAddr, JoinHandle<Vec<u16>>) {
    let socket = UdpSocket::bind("127.0.0.1:0").expect("emulator socket should bind");
    socket
        .set_read_timeout(Some(Duration::from_secs(10)))
        .expect("read timeout should be settable");
    let addr = socket.local_addr().expect("emulator should have an address");

    let handle = thread::spawn(move || {
        let mut replies = replies.into_iter();
        let mut decoder = MessageDecoder::default();
        let mut received = Vec::new();
        let mut buf = [0u8; PACKET_SIZE];

        while let Ok((n, from)) = socket.recv_from(&mut buf) {
            assert_eq!(n, PACKET_SIZE, "client must send whole packets");
            let Some(request) = decoder.feed(&buf).expect("request should decode") else {
                continue;
            };
            received.push(request.kind);

            let Some(reply) = replies.next() else {
                break;
            };
            let packets =
                encode_message(reply.kind, &reply.payload).expect("reply should encode");
            for packet in packets {
                socket.send_to(&packet, from).expect("reply should send");
            }
            if replies.len() == 0 {
                break;
            }
        }
        received
    });

    (addr, handle)
}

fn hwlink(addr: SocketAddr, timeout: &str, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hwlink"))
        .args(["--emulator", "--emulator-addr"])
        .arg(addr.to_string())
        .args(["--timeout", timeout, "--format", "json", "--log-level", "off"])
        .args(args)
        .env_remove("HWLINK_EMULATOR")
        .env_remove("HWLINK_EMULATOR_ADDR")
        .env_remove("HWLINK_TIMEOUT")
        .stdin(Stdio::null())
        .output()
        .expect("hwlink should run")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

fn success(message: &str) -> Message {
    Success {
        message: Some(message.to_string()),
    }
    .to_message()
}

#[test]
fn features_over_emulator() {
    let (addr, emulator) = spawn_emulator(vec![Features {
        vendor: Some("Skycoin Foundation".into()),
        major_version: Some(1),
        minor_version: Some(2),
        patch_version: Some(3),
        initialized: Some(true),
        ..Features::default()
    }
    .to_message()]);

    let output = hwlink(addr, "5s", &["features"]);
    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let json = stdout_json(&output);
    assert_eq!(json["command"], "features");
    assert_eq!(json["vendor"], "Skycoin Foundation");
    assert_eq!(json["firmware_version"], "1.2.3");
    assert_eq!(json["initialized"], true);

    assert_eq!(emulator.join().unwrap(), vec![kind::GET_FEATURES]);
}

#[test]
fn ping_echoes_through_emulator() {
    let (addr, emulator) = spawn_emulator(vec![success("hello device")]);

    let output = hwlink(addr, "5s", &["ping", "hello device"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout_json(&output)["message"], "hello device");
    assert_eq!(emulator.join().unwrap(), vec![kind::PING]);
}

#[test]
fn wipe_acknowledges_button_request() {
    let (addr, emulator) = spawn_emulator(vec![
        ButtonRequest {
            code: Some(ButtonRequestType::WipeDevice as i32),
            data: None,
        }
        .to_message(),
        success("Device wiped"),
    ]);

    let output = hwlink(addr, "5s", &["wipe"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Confirm the wipe"));
    assert_eq!(
        emulator.join().unwrap(),
        vec![kind::WIPE_DEVICE, kind::BUTTON_ACK]
    );
}

#[test]
fn closed_stdin_declines_pin_and_cancels() {
    let (addr, emulator) = spawn_emulator(vec![
        PinMatrixRequest {
            r#type: Some(PinMatrixRequestType::Current as i32),
        }
        .to_message(),
        Failure {
            code: Some(FailureType::ActionCancelled as i32),
            message: Some("Action cancelled by user".into()),
        }
        .to_message(),
    ]);

    let output = hwlink(addr, "5s", &["address", "--count", "2"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("input declined"));
    assert_eq!(
        emulator.join().unwrap(),
        vec![kind::SKYCOIN_ADDRESS, kind::CANCEL]
    );
}

#[test]
fn unexpected_response_exits_60() {
    let (addr, emulator) = spawn_emulator(vec![Features::default().to_message()]);

    let output = hwlink(addr, "5s", &["wipe"]);
    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unexpected Features response"));
    assert_eq!(emulator.join().unwrap(), vec![kind::WIPE_DEVICE]);
}

#[test]
fn rejected_signature_reports_unverified() {
    let (addr, emulator) = spawn_emulator(vec![Failure {
        code: Some(FailureType::InvalidSignature as i32),
        message: Some("Invalid signature".into()),
    }
    .to_message()]);

    let output = hwlink(
        addr,
        "5s",
        &[
            "check-signature",
            "--address",
            "2EU3JbveHdkxW6z5tdhbbB2kRAWvXC2pLzw",
            "--message",
            "hello",
            "--signature",
            "deadbeef",
        ],
    );
    assert_eq!(output.status.code(), Some(1));
    let json = stdout_json(&output);
    assert_eq!(json["verified"], false);
    assert_eq!(json["message"], "Invalid signature");
    assert_eq!(
        emulator.join().unwrap(),
        vec![kind::SKYCOIN_CHECK_MESSAGE_SIGNATURE]
    );
}

#[test]
fn silent_emulator_times_out_with_124() {
    let (addr, emulator) = spawn_emulator(Vec::new());

    let output = hwlink(addr, "300ms", &["features"]);
    assert_eq!(output.status.code(), Some(124));
    assert_eq!(emulator.join().unwrap(), vec![kind::GET_FEATURES]);
}

#[cfg(not(feature = "usb"))]
#[test]
fn usb_without_feature_is_a_usage_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_hwlink"))
        .args(["--log-level", "off", "features"])
        .env_remove("HWLINK_EMULATOR")
        .stdin(Stdio::null())
        .output()
        .expect("hwlink should run");

    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--features usb"));
}

#[test]
fn emulator_help_mentions_usb_feature() {
    let output = Command::new(env!("CARGO_BIN_EXE_hwlink"))
        .arg("--help")
        .output()
        .expect("hwlink should run");

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("--features usb"));
}

#[test]
fn version_needs_no_device() {
    let output = Command::new(env!("CARGO_BIN_EXE_hwlink"))
        .args(["version", "--extended"])
        .output()
        .expect("hwlink should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("name: hwlink"));
    assert!(stdout.contains("emulator=udp/21324"));
}
