//! A loopback HTTP server that replays canned responses.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// One canned reply.
#[derive(Debug, Clone)]
pub struct Reply {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
    /// Pause before answering.
    pub delay: Duration,
}

impl Reply {
    /// A reply with `status` and `body`, sent immediately.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    /// Delay the reply by `delay`.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// A request captured by [`CannedServer`].
#[derive(Debug, Clone)]
pub struct Captured {
    /// Request line, e.g. `POST /api/embed HTTP/1.1`.
    pub request_line: String,
    /// Request body.
    pub body: String,
}

/// Serves one reply per connection, in order, then stops accepting.
#[derive(Debug)]
pub struct CannedServer {
    base_url: String,
    captured: Arc<Mutex<Vec<Captured>>>,
    _worker: JoinHandle<()>,
}

impl CannedServer {
    /// Start serving `replies` on an ephemeral loopback port.
    pub fn start(replies: Vec<Reply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .unwrap_or_else(|err| panic!("failed to bind loopback listener: {err}"));
        let address = listener
            .local_addr()
            .unwrap_or_else(|err| panic!("listener has no address: {err}"));
        let captured = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&captured);
        let worker = thread::spawn(move || {
            for reply in replies {
                let Ok((stream, _)) = listener.accept() else {
                    return;
                };
                answer(stream, &reply, &sink);
            }
        });
        Self {
            base_url: format!("http://{address}"),
            captured,
            _worker: worker,
        }
    }

    /// Base URL of the server, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Requests received so far.
    pub fn captured(&self) -> Vec<Captured> {
        self.captured
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

fn answer(stream: TcpStream, reply: &Reply, sink: &Mutex<Vec<Captured>>) {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }

    let mut content_length = 0_usize;
    loop {
        let mut header = String::new();
        match reader.read_line(&mut header) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let trimmed = header.trim_end();
        if trimmed.is_empty() {
            break;
        }
        if let Some((name, value)) = trimmed.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }

    let mut body = vec![0_u8; content_length];
    if reader.read_exact(&mut body).is_err() {
        return;
    }
    if let Ok(mut requests) = sink.lock() {
        requests.push(Captured {
            request_line: request_line.trim_end().to_owned(),
            body: String::from_utf8_lossy(&body).into_owned(),
        });
    }

    thread::sleep(reply.delay);
    let mut stream = reader.into_inner();
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        reply.status,
        reason(reply.status),
        reply.body.len(),
        reply.body
    );
    // The client may already have given up on a delayed reply.
    stream
        .write_all(response.as_bytes())
        .and_then(|()| stream.flush())
        .unwrap_or_default();
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}
