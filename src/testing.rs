//! Recording test doubles for the HAL traits and [`Platform`].

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;
use std::string::String;
use std::sync::Mutex;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, OutputPin};
use embedded_hal::spi::{self, ErrorKind, SpiBus};
use log::{Log, Metadata, Record};

use crate::Platform;

/// Byte the mock bus "reads back" during in-place transfers.
const ECHO: u8 = 0xEE;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Pin(u8, bool),
    Write(Vec<u8>),
    Transfer(Vec<u8>),
    Flush,
    DelayMs(u32),
}

/// Shared, ordered record of everything the doubles were asked to do.
#[derive(Clone, Default)]
pub struct Trace(Rc<RefCell<Vec<Event>>>);

impl Trace {
    fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub fn take(&self) -> Vec<Event> {
        self.0.take()
    }

    /// Bytes sent in command mode, in order.
    pub fn register_bytes(&self) -> Vec<u8> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Write(bytes) => Some(bytes.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Row payloads as they were when handed to the bus.
    pub fn transfers(&self) -> Vec<Vec<u8>> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Transfer(bytes) => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }
}

pub struct MockPin {
    pin: u8,
    trace: Trace,
}

impl MockPin {
    pub fn new(pin: u8, trace: &Trace) -> Self {
        Self {
            pin,
            trace: trace.clone(),
        }
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }
}

impl digital::ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.trace.push(Event::Pin(self.pin, false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.trace.push(Event::Pin(self.pin, true));
        Ok(())
    }
}

/// SPI bus that records writes and echoes [`ECHO`] into in-place transfers,
/// like spidev does when tx and rx share a buffer.
pub struct MockBus {
    trace: Trace,
    pub fail: bool,
    pub echoed: usize,
}

impl MockBus {
    pub fn new(trace: &Trace) -> Self {
        Self {
            trace: trace.clone(),
            fail: false,
            echoed: 0,
        }
    }

    fn check(&self) -> Result<(), ErrorKind> {
        if self.fail {
            Err(ErrorKind::Other)
        } else {
            Ok(())
        }
    }
}

impl spi::ErrorType for MockBus {
    type Error = ErrorKind;
}

impl SpiBus for MockBus {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        self.check()?;
        words.fill(ECHO);
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        self.check()?;
        self.trace.push(Event::Write(words.to_vec()));
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        self.write(write)?;
        self.read(read)
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        self.check()?;
        self.trace.push(Event::Transfer(words.to_vec()));
        words.fill(ECHO);
        self.echoed += words.len();
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.check()?;
        self.trace.push(Event::Flush);
        Ok(())
    }
}

pub struct MockDelay {
    trace: Trace,
}

impl MockDelay {
    pub fn new(trace: &Trace) -> Self {
        Self {
            trace: trace.clone(),
        }
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.trace.push(Event::DelayMs(ms));
    }
}

/// Platform double that counts exports and can refuse any step.
pub struct MockPlatform {
    pub trace: Trace,
    pub exported: Vec<u8>,
    pub fail_export: Option<u8>,
    pub fail_direction: Option<u8>,
    pub fail_bus: bool,
    pub opened: Option<String>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            trace: Trace::default(),
            exported: Vec::new(),
            fail_export: None,
            fail_direction: None,
            fail_bus: false,
            opened: None,
        }
    }
}

impl Platform for MockPlatform {
    type Error = &'static str;
    type Pin = MockPin;
    type Bus = MockBus;

    fn export(&mut self, pin: u8) -> Result<(), Self::Error> {
        self.exported.push(pin);
        if self.fail_export == Some(pin) {
            return Err("export refused");
        }
        Ok(())
    }

    fn output_pin(&mut self, pin: u8) -> Result<MockPin, Self::Error> {
        if self.fail_direction == Some(pin) {
            return Err("direction refused");
        }
        Ok(MockPin::new(pin, &self.trace))
    }

    fn open_bus(&mut self, device: &str) -> Result<MockBus, Self::Error> {
        if self.fail_bus {
            return Err("no such device");
        }
        self.opened = Some(device.into());
        Ok(MockBus::new(&self.trace))
    }
}

/// Logger that keeps every message it is given.
#[derive(Default)]
pub struct Capture(Mutex<Vec<String>>);

impl Capture {
    pub fn leak() -> &'static Capture {
        Box::leak(Box::default())
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.0
            .lock()
            .map(|lines| lines.iter().any(|l| l.contains(needle)))
            .unwrap_or(false)
    }
}

impl Log for Capture {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut lines) = self.0.lock() {
            lines.push(std::format!("{}", record.args()));
        }
    }

    fn flush(&self) {}
}
