//! Serial port transport
//!
//! Opens the sensor's serial device through `tokio-serial` (its blocking
//! `serialport` API) and assembles incoming bytes into lines. Reads never
//! block past the caller's timeout: the port timeout is re-armed with the
//! time remaining before every read.
//!
//! # Port discovery
//!
//! When no port is configured, [`find_serial_port`] picks the first USB
//! serial device that looks like a microcontroller board (Arduino, CH340,
//! CP210x, FTDI or a CDC-ACM device).

use super::{LineRead, Transport, TransportError};
use crate::error::{Result, ViewerError};
use std::io::{self, Read};
use std::time::{Duration, Instant};
use tokio_serial::{ClearBuffer, SerialPort, SerialPortInfo, SerialPortType};

/// Longest line kept before giving up on finding a terminator
pub const MAX_LINE_BYTES: usize = 16 * 1024;

/// USB vendor IDs of common microcontroller boards and USB-serial bridges
const KNOWN_VIDS: &[u16] = &[
    0x2341, // Arduino
    0x2a03, // Arduino (arduino.org)
    0x1a86, // WCH CH340
    0x10c4, // Silicon Labs CP210x
    0x0403, // FTDI
];

/// Substrings matched against product, manufacturer and port names
const KEYWORDS: &[&str] = &["arduino", "ch340", "cp210", "ftdi", "acm"];

/// Byte-level access needed by [`SerialTransport`]
///
/// Implemented for real serial ports; tests provide in-memory versions.
pub trait SerialIo: Read {
    /// Number of bytes waiting in the input buffer
    fn bytes_waiting(&self) -> io::Result<u32>;

    /// Set how long the next read may block
    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()>;
}

impl SerialIo for Box<dyn SerialPort> {
    fn bytes_waiting(&self) -> io::Result<u32> {
        self.bytes_to_read().map_err(io::Error::from)
    }

    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        self.set_timeout(timeout).map_err(io::Error::from)
    }
}

/// Line-oriented transport over a serial device
pub struct SerialTransport<P: SerialIo = Box<dyn SerialPort>> {
    port: Option<P>,
    name: String,
    pending: Vec<u8>,
    scratch: Box<[u8]>,
}

impl SerialTransport {
    /// Open a serial port
    ///
    /// `settle` is slept after opening (boards that reset on connect need
    /// time to boot), then any bytes received meanwhile are discarded.
    pub fn open(path: &str, baud_rate: u32, settle: Duration) -> Result<Self> {
        let mut port = tokio_serial::new(path, baud_rate)
            .timeout(Duration::from_millis(100))
            .open()
            .map_err(|e| ViewerError::TransportUnavailable(format!("{}: {}", path, e)))?;

        tracing::info!("Connected to {} @ {} bps", path, baud_rate);

        if !settle.is_zero() {
            tracing::debug!("Waiting {:?} for the device to settle", settle);
            std::thread::sleep(settle);
            if let Err(e) = port.clear(ClearBuffer::Input) {
                tracing::warn!("Failed to clear input buffer on {}: {}", path, e);
            }
        }

        Ok(Self::from_io(port, path))
    }
}

impl<P: SerialIo> SerialTransport<P> {
    /// Wrap an already opened port
    pub fn from_io(port: P, name: impl Into<String>) -> Self {
        Self {
            port: Some(port),
            name: name.into(),
            pending: Vec::new(),
            scratch: vec![0u8; 1024].into_boxed_slice(),
        }
    }

    /// Whether the port has been closed
    pub fn is_closed(&self) -> bool {
        self.port.is_none()
    }

    fn take_line(&mut self) -> Option<Vec<u8>> {
        let pos = self.pending.iter().position(|&b| b == b'\n')?;
        let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(line)
    }
}

impl<P: SerialIo> Transport for SerialTransport<P> {
    fn bytes_available(&mut self) -> std::result::Result<bool, TransportError> {
        if !self.pending.is_empty() {
            return Ok(true);
        }
        let port = self
            .port
            .as_ref()
            .ok_or_else(|| TransportError::Disconnected(format!("{} is closed", self.name)))?;
        port.bytes_waiting()
            .map(|n| n > 0)
            .map_err(|e| classify_io(e, &self.name))
    }

    fn read_line(&mut self, timeout: Duration) -> std::result::Result<LineRead, TransportError> {
        let deadline = Instant::now() + timeout;

        loop {
            if let Some(line) = self.take_line() {
                return Ok(LineRead::Line(line));
            }
            if self.pending.len() >= MAX_LINE_BYTES {
                tracing::debug!("{}: no terminator in {} bytes", self.name, self.pending.len());
                return Ok(LineRead::Partial(std::mem::take(&mut self.pending)));
            }

            let now = Instant::now();
            if now >= deadline {
                break;
            }

            let port = self
                .port
                .as_mut()
                .ok_or_else(|| TransportError::Disconnected(format!("{} is closed", self.name)))?;
            port.set_read_timeout(deadline - now)
                .map_err(|e| classify_io(e, &self.name))?;

            match port.read(&mut self.scratch) {
                Ok(0) => {
                    return Err(TransportError::Disconnected(format!(
                        "{}: end of stream",
                        self.name
                    )))
                }
                Ok(n) => self.pending.extend_from_slice(&self.scratch[..n]),
                Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
                    break
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(classify_io(e, &self.name)),
            }
        }

        if self.pending.is_empty() {
            Ok(LineRead::Timeout)
        } else {
            Ok(LineRead::Partial(std::mem::take(&mut self.pending)))
        }
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            tracing::info!("Serial port {} closed", self.name);
        }
        self.pending.clear();
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

impl<P: SerialIo> Drop for SerialTransport<P> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Map an I/O error to a transport error, treating device loss as fatal
fn classify_io(err: io::Error, name: &str) -> TransportError {
    match err.kind() {
        io::ErrorKind::BrokenPipe
        | io::ErrorKind::NotConnected
        | io::ErrorKind::UnexpectedEof
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::NotFound => TransportError::Disconnected(format!("{}: {}", name, err)),
        _ => TransportError::Io(err),
    }
}

/// Enumerate serial ports
pub fn list_ports() -> Result<Vec<SerialPortInfo>> {
    Ok(tokio_serial::available_ports()?)
}

/// Find a serial port that looks like a sensor board
pub fn find_serial_port() -> Result<String> {
    list_ports()?
        .into_iter()
        .find(|info| {
            let matched = match &info.port_type {
                SerialPortType::UsbPort(usb) => {
                    matches_usb(usb.vid, usb.manufacturer.as_deref(), usb.product.as_deref())
                }
                _ => false,
            } || matches_name(&info.port_name);
            if matched {
                tracing::info!("Found sensor board on {}", info.port_name);
            }
            matched
        })
        .map(|info| info.port_name)
        .ok_or_else(|| {
            ViewerError::TransportUnavailable(
                "no serial device found; pass --port explicitly".to_string(),
            )
        })
}

/// Short description of a port for `--list-ports`
pub fn describe_port(info: &SerialPortInfo) -> String {
    match &info.port_type {
        SerialPortType::UsbPort(usb) => format!(
            "{} - USB {:04x}:{:04x} {} {}",
            info.port_name,
            usb.vid,
            usb.pid,
            usb.manufacturer.as_deref().unwrap_or(""),
            usb.product.as_deref().unwrap_or("")
        )
        .trim_end()
        .to_string(),
        SerialPortType::PciPort => format!("{} - PCI", info.port_name),
        SerialPortType::BluetoothPort => format!("{} - Bluetooth", info.port_name),
        SerialPortType::Unknown => info.port_name.clone(),
    }
}

fn matches_usb(vid: u16, manufacturer: Option<&str>, product: Option<&str>) -> bool {
    KNOWN_VIDS.contains(&vid)
        || [manufacturer, product]
            .into_iter()
            .flatten()
            .any(contains_keyword)
}

fn matches_name(port_name: &str) -> bool {
    // Only the device file name, so a "/dev/" parent never matches
    let file = port_name.rsplit(['/', '\\']).next().unwrap_or(port_name);
    contains_keyword(file)
}

fn contains_keyword(text: &str) -> bool {
    let lower = text.to_lowercase();
    KEYWORDS.iter().any(|k| lower.contains(k))
}
