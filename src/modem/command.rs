//! The SIM800 command set used by the stack.
//!
//! Each builder returns a [`Command`] carrying its line, read window and the
//! token that ends the read early.

use super::at::Command;
use crate::config::{Apn, Endpoint, Timing};
use crate::network::error::Error;

/// `AT`: is anybody there.
pub fn attention(timing: &Timing) -> Command {
    Command::fixed("AT", timing.command).expecting("OK")
}

/// `ATE0`: stop echoing commands back.
pub fn echo_off(timing: &Timing) -> Command {
    Command::fixed("ATE0", timing.command).expecting("OK")
}

/// `AT+CPIN?`: SIM lock state.
pub fn sim_status(timing: &Timing) -> Command {
    Command::fixed("AT+CPIN?", timing.status_query).expecting("OK")
}

/// `AT+CREG?`: cellular network registration.
pub fn network_registration(timing: &Timing) -> Command {
    Command::fixed("AT+CREG?", timing.status_query).expecting("OK")
}

/// `AT+CSQ`: signal quality.
pub fn signal_quality(timing: &Timing) -> Command {
    Command::fixed("AT+CSQ", timing.command).expecting("OK")
}

/// `AT+CIPSHUT`: deactivate the bearer, harmless when it is already down.
pub fn shut(timing: &Timing) -> Command {
    Command::fixed("AT+CIPSHUT", timing.shutdown).expecting("SHUT OK")
}

/// `AT+CIPMODE=0`: normal (non-transparent) transfer mode.
pub fn normal_transfer_mode(timing: &Timing) -> Command {
    Command::fixed("AT+CIPMODE=0", timing.command).expecting("OK")
}

/// `AT+CIPMUX=0`: single connection.
pub fn single_connection(timing: &Timing) -> Command {
    Command::fixed("AT+CIPMUX=0", timing.command).expecting("OK")
}

/// `AT+CSTT="apn"[,"user","password"]`: select the access point.
pub fn set_apn(apn: &Apn<'_>, timing: &Timing) -> Result<Command, Error> {
    let command = if apn.user.is_empty() {
        Command::formatted(format_args!("AT+CSTT=\"{}\"", apn.name), timing.set_apn)?
    } else {
        Command::formatted(
            format_args!("AT+CSTT=\"{}\",\"{}\",\"{}\"", apn.name, apn.user, apn.password),
            timing.set_apn,
        )?
    };
    Ok(command.expecting("OK"))
}

/// `AT+CIICR`: activate the bearer.
pub fn bring_up_wireless(timing: &Timing) -> Command {
    Command::fixed("AT+CIICR", timing.bring_up).expecting("OK")
}

/// `AT+CIFSR`: local address. The answer has no final result code, so the
/// whole window is read.
pub fn local_address(timing: &Timing) -> Command {
    Command::fixed("AT+CIFSR", timing.local_address)
}

/// `AT+CIPSTART="TCP","host",port`, read until the connect outcome.
pub fn start_tcp(endpoint: &Endpoint<'_>, timing: &Timing) -> Result<Command, Error> {
    Ok(Command::formatted(
        format_args!("AT+CIPSTART=\"TCP\",\"{}\",{}", endpoint.host, endpoint.port),
        timing.connect,
    )?
    .expecting("CONNECT OK")
    .failing_on("CONNECT FAIL"))
}

/// `AT+CIPSEND=<len>`, read until the payload prompt.
pub fn send_length(len: usize, timing: &Timing) -> Result<Command, Error> {
    Ok(Command::formatted(format_args!("AT+CIPSEND={}", len), timing.send_prompt)?.expecting(">"))
}

/// `AT+CIPCLOSE`: close the socket. Answers `ERROR` when none is open.
pub fn close_socket(timing: &Timing) -> Command {
    Command::fixed("AT+CIPCLOSE", timing.close).expecting("CLOSE OK")
}
