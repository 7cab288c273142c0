#![allow(dead_code)]

use core::time::Duration;
use fieldlink::display::{Status, StatusDisplay};
use fieldlink::network::{Read, Write};
use fieldlink::time::Clock;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

/// Bytes handed out per `read`, small enough to split every token.
const READ_CHUNK: usize = 7;

pub const REGISTER_OK: &str = "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\r\n\
{\"success\":true,\"device_id\":\"ESP32-001\",\"api_key\":\"k-123\",\"created\":true}";
pub const SUBMIT_OK: &str = "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\r\n{\"status\":\"ok\"}";

#[derive(Debug)]
struct Rule {
    trigger: String,
    reply: Vec<u8>,
    once: bool,
}

impl Rule {
    fn matches(&self, chunk: &str) -> bool {
        match self.trigger.strip_suffix('*') {
            Some(prefix) => chunk.starts_with(prefix),
            None => chunk == self.trigger,
        }
    }
}

#[derive(Debug, Default)]
struct Script {
    rules: Vec<Rule>,
    pending: Vec<u8>,
    inbox: VecDeque<u8>,
    sent: Vec<Vec<u8>>,
    writes: usize,
    echo: bool,
    fail_writes: bool,
}

/// A SIM800 stand-in that answers whatever was written when it is flushed.
///
/// Rules match the flushed chunk with its line terminator trimmed, either
/// exactly or, for triggers ending in `*`, by prefix. The most recently added
/// matching rule wins. Chunks no rule matches get silence.
#[derive(Debug, Clone, Default)]
pub struct ScriptedModem(Rc<RefCell<Script>>);

impl ScriptedModem {
    /// A modem that never answers.
    pub fn new() -> Self {
        Self::default()
    }

    /// A modem with a SIM, network coverage and a collector that accepts
    /// everything.
    pub fn sim800() -> Self {
        let modem = Self::new();
        modem
            .on("AT", "\r\nOK\r\n")
            .on("ATE0", "\r\nOK\r\n")
            .on("AT+CPIN?", "\r\n+CPIN: READY\r\n\r\nOK\r\n")
            .on("AT+CREG?", "\r\n+CREG: 0,1\r\n\r\nOK\r\n")
            .on("AT+CSQ", "\r\n+CSQ: 17,99\r\n\r\nOK\r\n")
            .on("AT+CIPSHUT", "\r\nSHUT OK\r\n")
            .on("AT+CIPMODE=0", "\r\nOK\r\n")
            .on("AT+CIPMUX=0", "\r\nOK\r\n")
            .on("AT+CSTT=*", "\r\nOK\r\n")
            .on("AT+CIICR", "\r\nOK\r\n")
            .on("AT+CIFSR", "\r\n10.152.33.7\r\n")
            .on("AT+CIPCLOSE", "\r\nERROR\r\n")
            .on("AT+CIPSTART=*", "\r\nOK\r\n\r\nCONNECT OK\r\n")
            .on("AT+CIPSEND=*", "> ")
            .on_post("/api/register/", REGISTER_OK)
            .on_post("/api/submit/", SUBMIT_OK);
        modem
    }

    /// Answer every chunk matching `trigger` with `reply`.
    pub fn on(&self, trigger: &str, reply: &str) -> &Self {
        self.add(trigger, reply.as_bytes(), false)
    }

    /// Answer the next chunk matching `trigger` with `reply`, then forget it.
    pub fn once(&self, trigger: &str, reply: &str) -> &Self {
        self.add(trigger, reply.as_bytes(), true)
    }

    /// Answer a POST to `path` the way SIM800 relays it: `SEND OK`, the
    /// peer's bytes, then `CLOSED`.
    pub fn on_post(&self, path: &str, http: &str) -> &Self {
        let reply = format!("\r\nSEND OK\r\n{}\r\nCLOSED\r\n", http);
        self.on(&format!("POST {} *", path), &reply)
    }

    /// Answer every chunk matching `trigger` with raw bytes.
    pub fn on_bytes(&self, trigger: &str, reply: &[u8]) -> &Self {
        self.add(trigger, reply, false)
    }

    fn add(&self, trigger: &str, reply: &[u8], once: bool) -> &Self {
        self.0.borrow_mut().rules.push(Rule {
            trigger: trigger.to_string(),
            reply: reply.to_vec(),
            once,
        });
        self
    }

    /// Echo every chunk back before the reply, like a modem before `ATE0`.
    pub fn echo(&self, enabled: bool) -> &Self {
        self.0.borrow_mut().echo = enabled;
        self
    }

    /// Make every write fail.
    pub fn fail_writes(&self) -> &Self {
        self.0.borrow_mut().fail_writes = true;
        self
    }

    /// Queue unsolicited bytes.
    pub fn push_input(&self, bytes: &[u8]) {
        self.0.borrow_mut().inbox.extend(bytes.iter().copied());
    }

    /// Every flushed chunk, verbatim.
    pub fn sent(&self) -> Vec<String> {
        self.0
            .borrow()
            .sent
            .iter()
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
            .collect()
    }

    /// The AT command lines among the flushed chunks, without terminators.
    pub fn commands(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .map(|chunk| chunk.trim_end().to_string())
            .filter(|chunk| chunk.starts_with("AT"))
            .collect()
    }

    /// The flushed chunk starting with `prefix`.
    pub fn sent_starting_with(&self, prefix: &str) -> Option<String> {
        self.sent().into_iter().find(|chunk| chunk.starts_with(prefix))
    }

    /// Number of `write` calls so far.
    pub fn writes(&self) -> usize {
        self.0.borrow().writes
    }

    /// Forget what was sent.
    pub fn clear_sent(&self) {
        self.0.borrow_mut().sent.clear();
    }
}

impl Read for ScriptedModem {
    type Error = ();

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut script = self.0.borrow_mut();
        let n = buf.len().min(READ_CHUNK).min(script.inbox.len());
        for slot in buf.iter_mut().take(n) {
            *slot = script.inbox.pop_front().unwrap_or_default();
        }
        Ok(n)
    }
}

impl Write for ScriptedModem {
    type Error = ();

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        let mut script = self.0.borrow_mut();
        script.writes += 1;
        if script.fail_writes {
            return Err(());
        }
        script.pending.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        let mut script = self.0.borrow_mut();
        let chunk = std::mem::take(&mut script.pending);
        if chunk.is_empty() {
            return Ok(());
        }
        let text = String::from_utf8_lossy(&chunk).trim_end().to_string();

        if script.echo {
            script.inbox.extend(chunk.iter().copied());
        }
        if let Some(index) = script.rules.iter().rposition(|rule| rule.matches(&text)) {
            let reply = script.rules[index].reply.clone();
            if script.rules[index].once {
                script.rules.remove(index);
            }
            script.inbox.extend(reply);
        }
        script.sent.push(chunk);
        Ok(())
    }
}

/// Clock that ticks one millisecond per reading and jumps on `delay`.
#[derive(Debug, Clone, Default)]
pub struct MockClock(Rc<Cell<Duration>>);

impl MockClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time on the clock, without ticking it.
    pub fn elapsed(&self) -> Duration {
        self.0.get()
    }

    /// Move the clock forward, as if the main loop slept.
    pub fn advance(&self, by: Duration) {
        self.0.set(self.0.get() + by);
    }
}

impl Clock for MockClock {
    fn now(&mut self) -> Duration {
        self.advance(Duration::from_millis(1));
        self.0.get()
    }

    fn delay(&mut self, duration: Duration) {
        self.advance(duration);
    }
}

/// Display that remembers everything it was shown.
#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay(Rc<RefCell<Vec<Status>>>);

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown(&self) -> Vec<Status> {
        self.0.borrow().clone()
    }

    pub fn rendered(&self) -> Vec<String> {
        self.0.borrow().iter().map(|s| s.to_string()).collect()
    }

    pub fn last(&self) -> Option<Status> {
        self.0.borrow().last().copied()
    }
}

impl StatusDisplay for RecordingDisplay {
    fn show(&mut self, status: Status) {
        self.0.borrow_mut().push(status);
    }
}
