//! AWS Event Stream framing.
//!
//! Each message is laid out as
//! `total_len:u32 | headers_len:u32 | prelude_crc:u32 | headers | payload | message_crc:u32`,
//! all big-endian, with IEEE CRC-32 checksums.

use std::collections::HashMap;

use agentbridge_core::BridgeError;
use bytes::{Buf, Bytes, BytesMut};

/// Prelude (8) + prelude CRC (4).
const PRELUDE_LEN: usize = 12;
/// Prelude + prelude CRC + message CRC.
const MIN_MESSAGE_LEN: usize = 16;
/// Service limit for a single frame.
const MAX_MESSAGE_LEN: usize = 16 * 1024 * 1024;

/// A decoded event stream message.
#[derive(Debug, Clone)]
pub struct EventStreamMessage {
    pub headers: HashMap<String, HeaderValue>,
    pub payload: Bytes,
}

impl EventStreamMessage {
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(HeaderValue::as_str)
    }

    /// `:message-type`, usually `event`, `exception` or `error`.
    pub fn message_type(&self) -> Option<&str> {
        self.header_str(":message-type")
    }

    pub fn event_type(&self) -> Option<&str> {
        self.header_str(":event-type")
    }

    pub fn exception_type(&self) -> Option<&str> {
        self.header_str(":exception-type")
    }

    pub fn is_exception(&self) -> bool {
        matches!(self.message_type(), Some("exception") | Some("error"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Bytes(Bytes),
    String(String),
    Timestamp(i64),
    Uuid([u8; 16]),
}

impl HeaderValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HeaderValue::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Incremental decoder: feed raw body bytes as they arrive and pull out
/// complete messages.
#[derive(Debug, Default)]
pub struct EventStreamParser {
    buffer: BytesMut,
}

impl EventStreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Bytes received but not yet consumed by a complete message.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Returns the next complete message, or `None` if more bytes are needed.
    pub fn next_message(&mut self) -> Result<Option<EventStreamMessage>, BridgeError> {
        if self.buffer.len() < PRELUDE_LEN {
            return Ok(None);
        }

        let total_len = read_u32(&self.buffer[0..4]) as usize;
        if !(MIN_MESSAGE_LEN..=MAX_MESSAGE_LEN).contains(&total_len) {
            return Err(BridgeError::protocol(format!("invalid event stream message length: {}", total_len)));
        }

        let prelude_crc = read_u32(&self.buffer[8..12]);
        if crc32fast::hash(&self.buffer[0..8]) != prelude_crc {
            return Err(BridgeError::protocol("event stream prelude checksum mismatch"));
        }

        if self.buffer.len() < total_len {
            return Ok(None);
        }

        let frame = self.buffer.split_to(total_len).freeze();
        decode_frame(frame).map(Some)
    }

    /// Drains every complete message currently buffered. Stops at the first error.
    pub fn drain(&mut self) -> Vec<Result<EventStreamMessage, BridgeError>> {
        let mut messages = Vec::new();
        loop {
            match self.next_message() {
                Ok(Some(msg)) => messages.push(Ok(msg)),
                Ok(None) => break,
                Err(e) => {
                    messages.push(Err(e));
                    break;
                }
            }
        }
        messages
    }
}

fn read_u32(data: &[u8]) -> u32 {
    u32::from_be_bytes([data[0], data[1], data[2], data[3]])
}

fn decode_frame(frame: Bytes) -> Result<EventStreamMessage, BridgeError> {
    let total_len = frame.len();
    let headers_len = read_u32(&frame[4..8]) as usize;

    let message_crc = read_u32(&frame[total_len - 4..]);
    if crc32fast::hash(&frame[..total_len - 4]) != message_crc {
        return Err(BridgeError::protocol("event stream message checksum mismatch"));
    }

    let headers_end = PRELUDE_LEN + headers_len;
    if headers_end > total_len - 4 {
        return Err(BridgeError::protocol("event stream headers overflow message"));
    }

    let headers = decode_headers(frame.slice(PRELUDE_LEN..headers_end))?;
    let payload = frame.slice(headers_end..total_len - 4);

    Ok(EventStreamMessage { headers, payload })
}

fn decode_headers(mut data: Bytes) -> Result<HashMap<String, HeaderValue>, BridgeError> {
    let mut headers = HashMap::new();

    while data.has_remaining() {
        let name_len = data.get_u8() as usize;
        ensure(&data, name_len, "header name")?;
        let name = String::from_utf8_lossy(&data.split_to(name_len)).into_owned();

        ensure(&data, 1, "header value type")?;
        let value = match data.get_u8() {
            0 => HeaderValue::Bool(true),
            1 => HeaderValue::Bool(false),
            2 => {
                ensure(&data, 1, "byte header")?;
                HeaderValue::Byte(data.get_i8())
            }
            3 => {
                ensure(&data, 2, "short header")?;
                HeaderValue::Short(data.get_i16())
            }
            4 => {
                ensure(&data, 4, "int header")?;
                HeaderValue::Int(data.get_i32())
            }
            5 => {
                ensure(&data, 8, "long header")?;
                HeaderValue::Long(data.get_i64())
            }
            6 => HeaderValue::Bytes(take_sized(&mut data, "bytes header")?),
            7 => {
                let raw = take_sized(&mut data, "string header")?;
                HeaderValue::String(String::from_utf8_lossy(&raw).into_owned())
            }
            8 => {
                ensure(&data, 8, "timestamp header")?;
                HeaderValue::Timestamp(data.get_i64())
            }
            9 => {
                ensure(&data, 16, "uuid header")?;
                let mut uuid = [0u8; 16];
                data.copy_to_slice(&mut uuid);
                HeaderValue::Uuid(uuid)
            }
            other => {
                return Err(BridgeError::protocol(format!("unknown event stream header type: {}", other)));
            }
        };
        headers.insert(name, value);
    }

    Ok(headers)
}

fn take_sized(data: &mut Bytes, what: &str) -> Result<Bytes, BridgeError> {
    ensure(data, 2, what)?;
    let len = data.get_u16() as usize;
    ensure(data, len, what)?;
    Ok(data.split_to(len))
}

fn ensure(data: &Bytes, needed: usize, what: &str) -> Result<(), BridgeError> {
    match data.remaining() >= needed {
        true => Ok(()),
        false => Err(BridgeError::protocol(format!("truncated {}", what))),
    }
}

/// Encodes a message with string headers. Used to build fixtures.
#[cfg(test)]
pub(crate) fn encode_message(headers: &[(&str, &str)], payload: &[u8]) -> Vec<u8> {
    let mut header_bytes = Vec::new();
    for (name, value) in headers {
        header_bytes.push(name.len() as u8);
        header_bytes.extend_from_slice(name.as_bytes());
        header_bytes.push(7);
        header_bytes.extend_from_slice(&(value.len() as u16).to_be_bytes());
        header_bytes.extend_from_slice(value.as_bytes());
    }

    let total_len = PRELUDE_LEN + header_bytes.len() + payload.len() + 4;
    let mut out = Vec::with_capacity(total_len);
    out.extend_from_slice(&(total_len as u32).to_be_bytes());
    out.extend_from_slice(&(header_bytes.len() as u32).to_be_bytes());
    let prelude_crc = crc32fast::hash(&out);
    out.extend_from_slice(&prelude_crc.to_be_bytes());
    out.extend_from_slice(&header_bytes);
    out.extend_from_slice(payload);
    let message_crc = crc32fast::hash(&out);
    out.extend_from_slice(&message_crc.to_be_bytes());
    out
}
