#![cfg(all(unix, feature = "cli"))]

use std::io::Read;
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::process::{Child, Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use bytes::BytesMut;
use rctelem::frame::{encode_v1, encode_v2, FrameHeader, HEARTBEAT, RC_CHANNELS};
use rctelem::monitor::RcChannels;

const SCENARIO: [u16; 8] = [1500, 1500, 1000, 1500, 1000, 1000, 1000, 1000];
const SCENARIO_LINE: &str =
    "CH1: 1500 | CH2: 1500 | CH3: 1000 | CH4: 1500 | CH5: 1000 | CH6: 1000 | CH7: 1000 | CH8: 1000";

fn free_udp_port() -> u16 {
    UdpSocket::bind("0.0.0.0:0")
        .expect("ephemeral bind should succeed")
        .local_addr()
        .expect("local addr should be available")
        .port()
}

fn rctelem() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rctelem"));
    cmd.env_remove("DRONE_ADDRESS");
    cmd
}

fn rc_frame_v2(values: &[u16]) -> Vec<u8> {
    let mut buf = BytesMut::new();
    encode_v2(
        &FrameHeader::default(),
        RC_CHANNELS,
        &RcChannels::new(500, values).to_payload(),
        &mut buf,
    )
    .expect("frame should encode");
    buf.to_vec()
}

/// Feed `datagrams` to `port` until the child exits, then collect its output.
fn pump_until_exit(mut child: Child, port: u16, datagrams: &[Vec<u8>]) -> Output {
    let sender = UdpSocket::bind("127.0.0.1:0").expect("sender bind should succeed");
    let target = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    let deadline = Instant::now() + Duration::from_secs(15);

    loop {
        if child.try_wait().expect("child status should be readable").is_some() {
            break;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            break;
        }
        for datagram in datagrams {
            let _ = sender.send_to(datagram, target);
        }
        thread::sleep(Duration::from_millis(50));
    }

    child.wait_with_output().expect("child output should be collected")
}

#[test]
fn udp_message_prints_one_line_with_eight_values() {
    let port = free_udp_port();
    let child = rctelem()
        .args(["rc-monitor", "--count", "1", "--address"])
        .arg(format!("udpin://0.0.0.0:{port}"))
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("rc-monitor should start");

    let output = pump_until_exit(child, port, &[rc_frame_v2(&SCENARIO)]);
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("-- Monitoring RC Channels --"));
    let lines: Vec<&str> = stdout.lines().filter(|l| l.starts_with("CH1:")).collect();
    assert_eq!(lines, vec![SCENARIO_LINE]);
}

#[test]
fn address_from_environment_and_mixed_traffic() {
    let port = free_udp_port();
    let child = rctelem()
        .env("DRONE_ADDRESS", format!("127.0.0.1:{port}"))
        .args(["rc-monitor", "--count", "2"])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("rc-monitor should start");

    let mut heartbeat = BytesMut::new();
    encode_v2(
        &FrameHeader::default(),
        HEARTBEAT,
        &[0, 0, 0, 0, 2, 3, 81, 4, 3],
        &mut heartbeat,
    )
    .expect("heartbeat should encode");

    let mut v1 = BytesMut::new();
    encode_v1(
        &FrameHeader::default(),
        RC_CHANNELS,
        &RcChannels::new(9, &SCENARIO).to_payload(),
        &mut v1,
    )
    .expect("v1 frame should encode");

    let mut datagram = vec![0xAA, 0x55, 0x00];
    datagram.extend_from_slice(&heartbeat);
    datagram.extend_from_slice(&v1);

    let output = pump_until_exit(child, port, &[datagram]);
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().filter(|l| l.starts_with("CH1:")).collect();
    assert_eq!(lines, vec![SCENARIO_LINE, SCENARIO_LINE]);
}

#[test]
fn json_format_emits_one_object_per_message() {
    let port = free_udp_port();
    let child = rctelem()
        .args(["--format", "json", "rc-monitor", "--count", "1", "--address"])
        .arg(format!("udpin://0.0.0.0:{port}"))
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("rc-monitor should start");

    let output = pump_until_exit(child, port, &[rc_frame_v2(&SCENARIO)]);
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let value: serde_json::Value =
        serde_json::from_str(stdout.trim()).expect("stdout should be one JSON object");
    assert_eq!(value["channels"], serde_json::json!(SCENARIO));
}

#[test]
fn missing_device_exits_one_naming_the_path() {
    let output = rctelem()
        .args([
            "rc-monitor",
            "--address",
            "serial:/dev/rctelem-no-such-device:57600",
        ])
        .output()
        .expect("rc-monitor should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: "), "stderr was: {stderr}");
    assert!(stderr.contains("/dev/rctelem-no-such-device"), "stderr was: {stderr}");
}

#[test]
fn missing_address_exits_one() {
    let output = rctelem()
        .arg("rc-monitor")
        .output()
        .expect("rc-monitor should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: DRONE_ADDRESS environment variable not set"));
    assert!(output.stdout.is_empty());
}

#[test]
fn malformed_address_exits_one() {
    let output = rctelem()
        .args(["rc-monitor", "--address", "serial:/dev/ttyUSB0:12345"])
        .output()
        .expect("rc-monitor should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: "));
    assert!(stderr.contains("12345"));
}

#[test]
fn duration_limit_ends_quiet_monitor() {
    let port = free_udp_port();
    let mut child = rctelem()
        .args(["rc-monitor", "--duration", "1s", "--address"])
        .arg(format!("udpin://0.0.0.0:{port}"))
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("rc-monitor should start");

    let start = Instant::now();
    let status = loop {
        if let Some(status) = child.try_wait().expect("status should be readable") {
            break status;
        }
        if start.elapsed() > Duration::from_secs(10) {
            let _ = child.kill();
            panic!("rc-monitor did not stop at its duration limit");
        }
        thread::sleep(Duration::from_millis(50));
    };
    assert_eq!(status.code(), Some(0));

    let mut stdout = String::new();
    child
        .stdout
        .take()
        .expect("stdout should be piped")
        .read_to_string(&mut stdout)
        .expect("stdout should be readable");
    assert!(!stdout.contains("CH1:"));
}
