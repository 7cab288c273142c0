mod mock;

use core::time::Duration;
use fieldlink::config::Timing;
use fieldlink::modem::at::{AtEngine, Command};
use fieldlink::modem::command;
use fieldlink::modem::response::{RegistrationStatus, SignalQuality};
use mock::{MockClock, ScriptedModem};

fn engine(modem: &ScriptedModem, clock: &MockClock) -> AtEngine<ScriptedModem, MockClock> {
    AtEngine::new(modem.clone(), clock.clone(), Timing::sim800())
}

#[test]
fn test_execute_returns_reply_verbatim() {
    let modem = ScriptedModem::sim800();
    let clock = MockClock::new();
    let mut at = engine(&modem, &clock);

    let reply = at.execute(&command::signal_quality(&Timing::sim800())).unwrap();

    assert!(reply.matched());
    assert_eq!(reply.as_str(), "\r\n+CSQ: 17,99\r\n\r\nOK\r\n");
    assert_eq!(modem.commands(), vec!["AT+CSQ"]);
}

#[test]
fn test_expected_token_ends_read_early() {
    let modem = ScriptedModem::sim800();
    let clock = MockClock::new();
    let mut at = engine(&modem, &clock);

    assert!(at.probe().unwrap());
    assert!(clock.elapsed() < Duration::from_millis(100));
}

#[test]
fn test_error_ends_read_early_without_match() {
    let modem = ScriptedModem::sim800();
    modem.on("AT+CIICR", "\r\nERROR\r\n");
    let clock = MockClock::new();
    let mut at = engine(&modem, &clock);

    let reply = at.execute(&command::bring_up_wireless(&Timing::sim800())).unwrap();

    assert!(!reply.matched());
    assert!(clock.elapsed() < Duration::from_millis(100));
}

#[test]
fn test_command_without_expectation_reads_full_window() {
    let modem = ScriptedModem::new();
    modem.on("AT+GSN", "\r\n867856030000000\r\n\r\nOK\r\n");
    let clock = MockClock::new();
    let mut at = engine(&modem, &clock);

    let reply = at
        .execute(&Command::fixed("AT+GSN", Duration::from_millis(300)))
        .unwrap();

    assert!(reply.as_str().contains("867856030000000"));
    assert!(clock.elapsed() >= Duration::from_millis(300));
}

#[test]
fn test_sim_states() {
    let modem = ScriptedModem::sim800();
    let clock = MockClock::new();
    let mut at = engine(&modem, &clock);
    assert!(at.sim_ready().unwrap());

    modem.on("AT+CPIN?", "\r\n+CPIN: NOT READY\r\n\r\nOK\r\n");
    assert!(!at.sim_ready().unwrap());

    modem.on("AT+CPIN?", "\r\n+CME ERROR: 10\r\n");
    assert!(!at.sim_ready().unwrap());
}

#[test]
fn test_echoed_command_does_not_confuse_tokenizers() {
    let modem = ScriptedModem::sim800();
    modem.echo(true);
    modem.on("AT+CPIN?", "\r\n+CPIN: SIM PIN\r\n\r\nOK\r\n");
    let clock = MockClock::new();
    let mut at = engine(&modem, &clock);

    assert!(!at.sim_ready().unwrap());
    assert_eq!(at.signal_quality().unwrap(), SignalQuality(17));
}

#[test]
fn test_network_registration_codes() {
    let modem = ScriptedModem::sim800();
    let clock = MockClock::new();
    let mut at = engine(&modem, &clock);

    assert_eq!(at.registration().unwrap(), RegistrationStatus::Home);

    modem.on("AT+CREG?", "\r\n+CREG: 0,5\r\n\r\nOK\r\n");
    let status = at.registration().unwrap();
    assert_eq!(status, RegistrationStatus::Roaming);
    assert!(status.registered());

    modem.on("AT+CREG?", "\r\n+CREG: 0,2\r\n\r\nOK\r\n");
    let status = at.registration().unwrap();
    assert_eq!(status, RegistrationStatus::Searching);
    assert!(!status.registered());
}

#[test]
fn test_signal_quality_sentinel() {
    let modem = ScriptedModem::sim800();
    modem.on("AT+CSQ", "\r\nERROR\r\n");
    let clock = MockClock::new();
    let mut at = engine(&modem, &clock);

    assert_eq!(at.signal_quality().unwrap(), SignalQuality::UNKNOWN);
    assert_eq!(at.signal_quality().unwrap().value(), -99);
}

#[test]
fn test_silent_modem_times_out_within_window() {
    let modem = ScriptedModem::new();
    let clock = MockClock::new();
    let mut at = engine(&modem, &clock);
    let timing = Timing::sim800();

    assert!(!at.probe().unwrap());
    assert!(clock.elapsed() >= timing.command);
    assert!(clock.elapsed() < timing.command + Duration::from_millis(50));

    let before = clock.elapsed();
    assert!(!at.sim_ready().unwrap());
    assert!(clock.elapsed() - before < timing.status_query + Duration::from_millis(50));
}
