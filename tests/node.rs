mod mock;

use core::time::Duration;
use fieldlink::config::{Capability, Config};
use fieldlink::display::Status;
use fieldlink::network::error::Error;
use fieldlink::node::{Node, Tick};
use fieldlink::session::Session;
use fieldlink::telemetry::TelemetrySample;
use mock::{MockClock, RecordingDisplay, ScriptedModem, REGISTER_OK};

type TestNode = Node<'static, ScriptedModem, MockClock, RecordingDisplay>;

fn node(
    modem: &ScriptedModem,
    clock: &MockClock,
    display: &RecordingDisplay,
    capability: Capability,
) -> TestNode {
    let mut config = Config::default();
    config.identity.device_id = "ESP32-001";
    config.capability = capability;
    config.send_interval = Duration::from_secs(30);
    Node::new(Session::new(modem.clone(), clock.clone(), config, display.clone()))
}

fn sample() -> TelemetrySample {
    TelemetrySample::new(22.0, 51.0, 2500)
}

fn posts_to(modem: &ScriptedModem, path: &str) -> usize {
    let prefix = format!("POST {} ", path);
    modem.sent().iter().filter(|c| c.starts_with(&prefix)).count()
}

#[test]
fn test_start_registers_connected_node() {
    let modem = ScriptedModem::sim800();
    let clock = MockClock::new();
    let display = RecordingDisplay::new();
    let mut node = node(&modem, &clock, &display, Capability::Connected);

    assert_eq!(node.start(), Ok(()));
    assert!(node.session().is_registered());
    assert_eq!(posts_to(&modem, "/api/register/"), 1);
}

#[test]
fn test_countdown_until_due() {
    let modem = ScriptedModem::sim800();
    let clock = MockClock::new();
    let display = RecordingDisplay::new();
    let mut node = node(&modem, &clock, &display, Capability::Connected);
    node.start().unwrap();

    clock.advance(Duration::from_secs(10));
    let Tick::Waiting { remaining } = node.tick(&sample()) else {
        panic!("expected a countdown");
    };
    assert!(remaining <= Duration::from_secs(20));
    assert!(remaining > Duration::from_secs(19));
    assert_eq!(display.last(), Some(Status::NextSendIn(19)));
    assert_eq!(posts_to(&modem, "/api/submit/"), 0);
}

#[test]
fn test_sends_once_per_interval() {
    let modem = ScriptedModem::sim800();
    let clock = MockClock::new();
    let display = RecordingDisplay::new();
    let mut node = node(&modem, &clock, &display, Capability::Connected);
    node.start().unwrap();

    clock.advance(Duration::from_secs(30));
    assert_eq!(node.tick(&sample()), Tick::Sent);
    assert!(matches!(node.tick(&sample()), Tick::Waiting { .. }));

    clock.advance(Duration::from_secs(30));
    assert_eq!(node.tick(&sample()), Tick::Sent);
    assert_eq!(posts_to(&modem, "/api/submit/"), 2);
}

#[test]
fn test_failed_send_waits_a_full_interval() {
    let modem = ScriptedModem::sim800();
    let clock = MockClock::new();
    let display = RecordingDisplay::new();
    let mut node = node(&modem, &clock, &display, Capability::Connected);
    node.start().unwrap();
    modem.on_post("/api/submit/", "HTTP/1.1 502 Bad Gateway\r\n\r\n");

    clock.advance(Duration::from_secs(30));
    assert_eq!(node.tick(&sample()), Tick::Failed(Error::HttpStatus(502)));
    assert!(matches!(node.tick(&sample()), Tick::Waiting { .. }));
}

#[test]
fn test_registration_retried_when_due() {
    let modem = ScriptedModem::sim800();
    modem.on_post("/api/register/", "HTTP/1.1 500 Internal Server Error\r\n\r\n");
    let clock = MockClock::new();
    let display = RecordingDisplay::new();
    let mut node = node(&modem, &clock, &display, Capability::Connected);

    assert_eq!(node.start(), Ok(()));
    assert!(!node.session().is_registered());

    modem.on_post("/api/register/", REGISTER_OK);
    clock.advance(Duration::from_secs(30));
    assert_eq!(node.tick(&sample()), Tick::Sent);
    assert_eq!(posts_to(&modem, "/api/register/"), 2);
    assert_eq!(node.session().token().map(|t| t.as_str()), Some("k-123"));
}

#[test]
fn test_modem_failure_at_start_is_recovered_later() {
    let modem = ScriptedModem::sim800();
    modem.once("AT+CPIN?", "\r\n+CPIN: NOT READY\r\n\r\nOK\r\n");
    let clock = MockClock::new();
    let display = RecordingDisplay::new();
    let mut node = node(&modem, &clock, &display, Capability::Connected);

    assert_eq!(node.start(), Err(Error::SimNotReady));
    assert_eq!(posts_to(&modem, "/api/register/"), 0);

    clock.advance(Duration::from_secs(30));
    assert_eq!(node.tick(&sample()), Tick::Sent);
}

#[test]
fn test_local_node_stays_idle() {
    let modem = ScriptedModem::sim800();
    let clock = MockClock::new();
    let display = RecordingDisplay::new();
    let mut node = node(&modem, &clock, &display, Capability::Local);

    assert_eq!(node.start(), Ok(()));
    clock.advance(Duration::from_secs(60));
    assert_eq!(node.tick(&sample()), Tick::Idle);
    assert_eq!(modem.commands(), vec!["AT", "AT+CSQ", "AT+CREG?"]);
}
