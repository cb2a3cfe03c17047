//! Line-oriented transport to the game server.
//!
//! The server has no framing, so reads are "drain until quiet": keep reading
//! until nothing has arrived for one settle window.

use crate::domain::errors::MushError;
use crate::services::sources::{decode_latin1, encode_latin1};
use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::{Duration, Instant};

const IAC: u8 = 255;
const DONT: u8 = 254;
const DO: u8 = 253;
const WONT: u8 = 252;
const WILL: u8 = 251;
const SB: u8 = 250;
const SE: u8 = 240;

pub trait Channel {
    /// Sends `line` followed by a newline.
    fn send_line(&mut self, line: &str) -> anyhow::Result<()>;
    /// Returns everything received until the channel stays quiet for `settle`
    /// or `limit` has passed in total, whichever comes first.
    fn drain(&mut self, settle: Duration, limit: Duration) -> anyhow::Result<String>;
    fn close(&mut self) -> anyhow::Result<()>;
}

pub struct TcpChannel {
    stream: TcpStream,
    pending: Vec<u8>,
}

impl TcpChannel {
    pub fn connect(address: &str, port: u16) -> Result<Self, MushError> {
        let stream =
            TcpStream::connect((address, port)).map_err(|source| MushError::ConnectionFailed {
                address: format!("{}:{}", address, port),
                source,
            })?;
        Ok(Self {
            stream,
            pending: Vec::new(),
        })
    }
}

impl Channel for TcpChannel {
    fn send_line(&mut self, line: &str) -> anyhow::Result<()> {
        let mut bytes = encode_latin1(line);
        bytes.push(b'\n');
        self.stream.write_all(&bytes)?;
        self.stream.flush()?;
        Ok(())
    }

    fn drain(&mut self, settle: Duration, limit: Duration) -> anyhow::Result<String> {
        let started = Instant::now();
        let mut buf = [0u8; 4096];
        loop {
            let left = limit.saturating_sub(started.elapsed());
            let wait = settle.min(left).max(Duration::from_millis(1));
            self.stream.set_read_timeout(Some(wait))?;
            match self.stream.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    self.pending.extend_from_slice(&buf[..n]);
                    if started.elapsed() >= limit {
                        break;
                    }
                }
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    break
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        let (text, replies) = strip_telnet(&mut self.pending);
        if !replies.is_empty() {
            self.stream.write_all(&replies)?;
        }
        Ok(decode_latin1(&text))
    }

    fn close(&mut self) -> anyhow::Result<()> {
        match self.stream.shutdown(Shutdown::Both) {
            Err(e) if e.kind() != ErrorKind::NotConnected => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Splits telnet negotiation out of `pending`, refusing every option offered.
/// An incomplete trailing sequence stays in `pending` for the next read.
pub fn strip_telnet(pending: &mut Vec<u8>) -> (Vec<u8>, Vec<u8>) {
    let mut text = Vec::with_capacity(pending.len());
    let mut replies = Vec::new();
    let mut i = 0;
    while i < pending.len() {
        if pending[i] != IAC {
            text.push(pending[i]);
            i += 1;
            continue;
        }
        let Some(&cmd) = pending.get(i + 1) else {
            break;
        };
        match cmd {
            IAC => {
                text.push(IAC);
                i += 2;
            }
            WILL | WONT | DO | DONT => {
                let Some(&opt) = pending.get(i + 2) else {
                    break;
                };
                match cmd {
                    WILL => replies.extend_from_slice(&[IAC, DONT, opt]),
                    DO => replies.extend_from_slice(&[IAC, WONT, opt]),
                    _ => {}
                }
                i += 3;
            }
            SB => {
                let end = pending[i + 2..]
                    .windows(2)
                    .position(|w| w == [IAC, SE]);
                match end {
                    Some(pos) => i += 2 + pos + 2,
                    None => break,
                }
            }
            _ => i += 2,
        }
    }
    pending.drain(..i);
    (text, replies)
}
