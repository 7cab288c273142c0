use crate::config::Endpoint;
use crate::modem::at::AtEngine;
use crate::modem::command;
use crate::modem::transport::{find, ModemResponse};
use crate::network::error::Error;
use crate::network::{Read, Write};
use crate::time::Clock;
use core::fmt::Write as _;
use heapless::{String, Vec};

/// Largest request, head and body together, that one `AT+CIPSEND` carries.
pub const REQUEST_CAPACITY: usize = 1024;

/// Marker the modem prints when the peer closes the socket.
pub const PEER_CLOSED: &str = "CLOSED";

/// Request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
}

impl Method {
    fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// A borrowed header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header<'a> {
    /// Field name.
    pub name: &'a str,
    /// Field value.
    pub value: &'a str,
}

const JSON_HEADERS: &[Header<'static>] = &[Header {
    name: "Content-Type",
    value: "application/json",
}];

/// An outbound request.
#[derive(Debug, Clone, Copy)]
pub struct Request<'a> {
    /// Method.
    pub method: Method,
    /// Absolute path, e.g. `/api/submit/`.
    pub path: &'a str,
    /// Extra headers. `Host`, `Content-Length` and `Connection` are added by
    /// the encoder.
    pub headers: &'a [Header<'a>],
    /// Body, if any.
    pub body: Option<&'a [u8]>,
}

impl<'a> Request<'a> {
    /// A `POST` of a JSON document.
    pub fn post_json(path: &'a str, body: &'a [u8]) -> Self {
        Self {
            method: Method::Post,
            path,
            headers: JSON_HEADERS,
            body: Some(body),
        }
    }

    /// Serialize the request for `host`.
    ///
    /// The whole request is composed before anything touches the modem, so
    /// its exact length is known for `AT+CIPSEND`.
    pub fn encode(&self, host: &str) -> Result<Vec<u8, REQUEST_CAPACITY>, Error> {
        let mut buf: Vec<u8, REQUEST_CAPACITY> = Vec::new();

        // Request line
        put(&mut buf, self.method.as_str().as_bytes())?;
        put(&mut buf, b" ")?;
        put(&mut buf, self.path.as_bytes())?;
        put(&mut buf, b" HTTP/1.1\r\n")?;

        put(&mut buf, b"Host: ")?;
        put(&mut buf, host.as_bytes())?;
        put(&mut buf, b"\r\n")?;

        for header in self.headers {
            put(&mut buf, header.name.as_bytes())?;
            put(&mut buf, b": ")?;
            put(&mut buf, header.value.as_bytes())?;
            put(&mut buf, b"\r\n")?;
        }

        if let Some(body) = self.body {
            let mut len_str: String<10> = String::new();
            write!(len_str, "{}", body.len()).map_err(|_| Error::BufferOverflow)?;
            put(&mut buf, b"Content-Length: ")?;
            put(&mut buf, len_str.as_bytes())?;
            put(&mut buf, b"\r\n")?;
        }

        put(&mut buf, b"Connection: close\r\n\r\n")?;

        if let Some(body) = self.body {
            put(&mut buf, body)?;
        }
        Ok(buf)
    }
}

fn put<const N: usize>(buf: &mut Vec<u8, N>, bytes: &[u8]) -> Result<(), Error> {
    buf.extend_from_slice(bytes).map_err(|_| Error::BufferOverflow)
}

/// One completed request: everything the modem printed after the payload went
/// out, and whether it carried a 200 status.
#[derive(Debug, Clone)]
pub struct Exchange {
    raw: ModemResponse,
    success: bool,
}

impl Exchange {
    /// Judge a captured response.
    pub fn new(raw: ModemResponse) -> Self {
        let success = match Response::parse(raw.as_str()) {
            Some(response) => response.status_code == 200,
            None => raw.contains("HTTP/1.1 200") || raw.contains("200 OK"),
        };
        Self { raw, success }
    }

    /// Whether the peer answered 200.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Raw capture, kept for salvage even when the exchange failed.
    pub fn raw(&self) -> &ModemResponse {
        &self.raw
    }

    /// Whether the capture ended with the peer closing the socket.
    pub fn peer_closed(&self) -> bool {
        self.raw.matched()
    }

    /// Parsed view of the capture.
    pub fn response(&self) -> Option<Response<'_>> {
        Response::parse(self.raw.as_str())
    }

    /// Status code, when a status line was captured.
    pub fn status_code(&self) -> Option<u16> {
        self.response().map(|r| r.status_code)
    }
}

/// A response read out of the modem capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response<'a> {
    /// Status code from the status line.
    pub status_code: u16,
    head: &'a str,
    /// Body, without the peer-close marker and cut to `Content-Length`.
    pub body: &'a str,
}

impl<'a> Response<'a> {
    /// Read the first HTTP response in `raw`.
    ///
    /// Modem chatter before the status line (`SEND OK` and the like) is
    /// skipped. Headers end at the first blank line; without one, which
    /// happens when the capture was cut short, the body is taken to start at
    /// the first `{` after the status line.
    pub fn parse(raw: &'a str) -> Option<Self> {
        let start = raw.find("HTTP/")?;
        let text = &raw[start..];

        let status_line = text.lines().next()?;
        let mut parts = status_line.splitn(3, ' ');
        parts.next();
        let status_code = parts.next()?.trim().parse::<u16>().ok()?;

        let (head, body) = match find(text.as_bytes(), b"\r\n\r\n") {
            Some(pos) => (&text[..pos], &text[pos + 4..]),
            None => match text.find('{') {
                Some(pos) => (&text[..pos], &text[pos..]),
                None => (text, ""),
            },
        };

        let mut response = Self {
            status_code,
            head,
            body: strip_peer_close(body),
        };
        if let Some(len) = response.content_length() {
            if len < response.body.len() && response.body.is_char_boundary(len) {
                response.body = &response.body[..len];
            }
        }
        Some(response)
    }

    /// Header lines after the status line, as name/value pairs.
    pub fn headers(self) -> impl Iterator<Item = Header<'a>> {
        self.head.lines().skip(1).filter_map(|line| {
            let (name, value) = line.split_once(':')?;
            Some(Header {
                name: name.trim(),
                value: value.trim(),
            })
        })
    }

    /// First header named `name`, ignoring case.
    pub fn header(&self, name: &str) -> Option<&'a str> {
        self.headers()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value)
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    fn content_length(&self) -> Option<usize> {
        self.header("Content-Length")?.parse().ok()
    }
}

fn strip_peer_close(body: &str) -> &str {
    let body = body.trim_end();
    body.strip_suffix(PEER_CLOSED).unwrap_or(body).trim_end()
}

/// Runs single requests through the modem's TCP socket.
///
/// Each request opens its own socket and closes it again; nothing is kept
/// between calls.
#[derive(Debug)]
pub struct Client<'m, 'e, S, C> {
    modem: &'m mut AtEngine<S, C>,
    endpoint: Endpoint<'e>,
}

impl<'m, 'e, S, C> Client<'m, 'e, S, C>
where
    S: Read + Write,
    C: Clock,
{
    /// A client talking to `endpoint` through `modem`.
    pub fn new(modem: &'m mut AtEngine<S, C>, endpoint: Endpoint<'e>) -> Self {
        Self { modem, endpoint }
    }

    /// `POST` `body` as JSON to `path`.
    pub fn post(&mut self, path: &str, body: &[u8]) -> Result<Exchange, Error> {
        self.request(&Request::post_json(path, body))
    }

    /// Send `request` and wait for the peer to close.
    ///
    /// A stale socket is closed first. Once the open was attempted the socket
    /// is closed again on every path out, success or not.
    pub fn request(&mut self, request: &Request<'_>) -> Result<Exchange, Error> {
        let payload = request.encode(self.endpoint.host)?;
        let timing = *self.modem.timing();

        self.modem.execute(&command::close_socket(&timing))?;
        self.modem.delay(timing.settle_after_close);

        let result = self.exchange(&payload);
        if let Err(e) = self.modem.execute(&command::close_socket(&timing)) {
            warn!("socket close failed: {:?}", e);
        }
        result
    }

    fn exchange(&mut self, payload: &[u8]) -> Result<Exchange, Error> {
        let timing = *self.modem.timing();

        let start = command::start_tcp(&self.endpoint, &timing)?;
        if !self.modem.execute(&start)?.matched() {
            warn!("connect to {}:{} failed", self.endpoint.host, self.endpoint.port);
            return Err(Error::ConnectFailed);
        }
        self.modem.delay(timing.settle_after_connect);

        let send = command::send_length(payload.len(), &timing)?;
        if !self.modem.execute(&send)?.matched() {
            warn!("no send prompt, payload withheld");
            return Err(Error::PromptMissing);
        }

        let transport = self.modem.transport_mut();
        transport.send(payload)?;
        let raw = transport.poll_until(PEER_CLOSED, timing.response)?;
        debug!("HTTP RSP: {}", raw.as_str().trim());
        if !raw.matched() {
            warn!("peer did not close within the response window");
        }

        let exchange = Exchange::new(raw);
        info!(
            "request of {} bytes done, success {}",
            payload.len(),
            exchange.is_success()
        );
        Ok(exchange)
    }
}
