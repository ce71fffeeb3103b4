//! Driver for SSD1327-based 4-bit grayscale OLED panels with SPI interface.
//!
//! The driver keeps a full-panel [`Framebuffer`] in memory. Drawing only
//! mutates that buffer; [`Ssd1327::flush`] streams the whole of it to the
//! controller. Pixels are packed two per byte, in the same layout the
//! controller uses for its RAM, so a flush is a straight copy.
//!
//! On Linux, enable the `linux` feature and use [`open`] with
//! [`linux::Sysfs`] to get a driver wired to sysfs GPIO and spidev. On
//! other targets construct the peripherals yourself and call
//! [`Ssd1327::new`].

#![cfg_attr(not(test), no_std)]

extern crate alloc;
#[cfg(feature = "linux")]
extern crate std;

use alloc::vec;
use alloc::vec::Vec;

use command::{Command, INIT_SEQUENCE};
use embedded_graphics_core::prelude::{GrayColor, OriginDimensions, Size};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;
use log::{Log, Metadata, Record};

/// Logs through an injected `&dyn Log` rather than the global facade.
macro_rules! diag {
    ($logger:expr, $level:ident, $($arg:tt)+) => {{
        let logger: &dyn ::log::Log = $logger;
        let level = ::log::Level::$level;
        if logger.enabled(
            &::log::Metadata::builder()
                .level(level)
                .target(module_path!())
                .build(),
        ) {
            logger.log(
                &::log::Record::builder()
                    .level(level)
                    .target(module_path!())
                    .module_path(Some(module_path!()))
                    .file(Some(file!()))
                    .line(Some(line!()))
                    .args(format_args!($($arg)+))
                    .build(),
            );
        }
    }};
}

mod command;
mod draw;
mod font;
mod framebuffer;
mod geometry;
#[cfg(feature = "linux")]
pub mod linux;
mod platform;
mod segment;
#[cfg(test)]
mod testing;

pub use embedded_graphics_core::pixelcolor::Gray4;
pub use font::{glyph_offset, Font};
pub use framebuffer::Framebuffer;
pub use geometry::{ScanDirection, ScanGeometry};
pub use platform::{open, OpenError, Pins, Platform, PlatformDriver, PlatformError};
pub use segment::{segments_for, Segment};

pub const DISPLAY_WIDTH: u16 = 128;
pub const DISPLAY_HEIGHT: u16 = 128;

/// Time between reset line transitions.
const RESET_DELAY_MS: u32 = 100;
/// Time for the charge pump to settle after register programming.
const SETTLE_DELAY_MS: u32 = 200;
/// Pending register bytes. Must hold the longest [`Command`].
const COMMAND_BUF_LEN: usize = 8;

/// Log sink that discards everything. The default for [`Config::logger`].
pub struct Quiet;

impl Log for Quiet {
    fn enabled(&self, _: &Metadata) -> bool {
        false
    }

    fn log(&self, _: &Record) {}

    fn flush(&self) {}
}

pub static QUIET: Quiet = Quiet;

/// Panel size, framebuffer layout and diagnostics sink.
#[derive(Clone, Copy)]
pub struct Config {
    pub width: u16,
    pub height: u16,
    /// Fixed for the lifetime of the driver.
    pub scan_direction: ScanDirection,
    /// Where driver diagnostics go. Pass [`log::logger()`] to use whatever
    /// logger the application installed.
    pub logger: &'static dyn Log,
}

impl Default for Config {
    /// The Waveshare 1.5" module: 128×128, scanned left to right, top to
    /// bottom, with diagnostics off.
    fn default() -> Self {
        Self {
            width: DISPLAY_WIDTH,
            height: DISPLAY_HEIGHT,
            scan_direction: ScanDirection::default(),
            logger: &QUIET,
        }
    }
}

impl Config {
    pub fn with_logger(self, logger: &'static dyn Log) -> Self {
        Self { logger, ..self }
    }
}

/// Error type for this driver.
///
/// Bus and pin errors from the HAL are passed through untouched. There is
/// no retry; the controller may be left mid-command, and [`Ssd1327::init`]
/// is the way back to a known state.
#[derive(Debug)]
pub enum Error<PinE, SpiE> {
    Pin(PinE),
    Spi(SpiE),
    /// The panel size can't be packed two pixels per byte.
    InvalidSize { width: u16, height: u16 },
}

/// The implementation of the driver.
///
/// Owns the bus, the chip-select, data/command and reset lines, and the
/// framebuffer. Chip select is driven by hand around every transfer, so
/// `SPI` is a raw [`SpiBus`] rather than a device with its own CS.
///
/// Draw through [`Ssd1327::framebuffer_mut`] (or any `embedded-graphics`
/// drawable, since the framebuffer is a `DrawTarget`), then call
/// [`Ssd1327::flush`].
pub struct Ssd1327<CS, DC, RST, SPI> {
    cs: CS,
    dc: DC,
    rst: RST,
    spi: SPI,

    framebuffer: Framebuffer,
    // Rows are sent from this copy; see `flush`.
    transfer_buf: Vec<u8>,
    command_buf: heapless::Vec<u8, COMMAND_BUF_LEN>,

    logger: &'static dyn Log,
    ready: bool,
}

impl<CS, DC, RST, SPI> OriginDimensions for Ssd1327<CS, DC, RST, SPI> {
    fn size(&self) -> Size {
        self.framebuffer.size()
    }
}

impl<CS, DC, RST, SPI> Ssd1327<CS, DC, RST, SPI> {
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn framebuffer_mut(&mut self) -> &mut Framebuffer {
        &mut self.framebuffer
    }

    /// Whether the power-on sequence has completed. Flushes are dropped
    /// until it has.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Fills the framebuffer. Nothing is sent until [`Self::flush`].
    pub fn clear(&mut self, colour: Gray4) {
        diag!(self.logger, Trace, "clear, colour={}", colour.luma());
        self.framebuffer.clear(colour);
    }

    /// Sets one framebuffer pixel. Nothing is sent until [`Self::flush`].
    pub fn set_pixel(&mut self, x: i32, y: i32, colour: Gray4) {
        self.framebuffer.set_pixel(x, y, colour);
    }
}

impl<CS, DC, RST, SPI, PinE, SpiE> Ssd1327<CS, DC, RST, SPI>
where
    CS: OutputPin<Error = PinE>,
    DC: OutputPin<Error = PinE>,
    RST: OutputPin<Error = PinE>,
    SPI: SpiBus<Error = SpiE>,
{
    /// Creates a new driver instance and initializes the display.
    ///
    /// Requires GPIO output pins connected to the CS, DC and RST pins of the
    /// module and an SPI bus in MODE_0, MSB first. On return the panel is
    /// on and blank.
    pub fn new(
        spi: SPI,
        cs: CS,
        dc: DC,
        rst: RST,
        config: Config,
        delay: &mut impl DelayNs,
    ) -> Result<Self, Error<PinE, SpiE>> {
        let (width, height) = (config.width, config.height);
        let Some(framebuffer) = Framebuffer::new(width, height, config.scan_direction) else {
            diag!(config.logger, Error, "unsupported panel size {}x{}", width, height);
            return Err(Error::InvalidSize { width, height });
        };

        let mut d = Self {
            cs,
            dc,
            rst,
            spi,
            transfer_buf: vec![0; framebuffer.data().len()],
            framebuffer,
            command_buf: heapless::Vec::new(),
            logger: config.logger,
            ready: false,
        };

        d.init(delay)?;

        Ok(d)
    }

    /// Hard-resets and re-initializes the display.
    ///
    /// Takes about half a second, most of it in reset and settle delays.
    /// Leaves the panel on, with the framebuffer cleared to black and
    /// flushed. Instances returned by [`Self::new`] are already
    /// initialized.
    pub fn init(&mut self, delay: &mut impl DelayNs) -> Result<(), Error<PinE, SpiE>> {
        self.ready = false;
        self.command_buf.clear();

        self.reset(delay)?;
        self.init_reg()?;

        let geometry = self.framebuffer.geometry();
        diag!(
            self.logger,
            Debug,
            "scan direction {:?}, column={}, page={}",
            geometry.direction(),
            geometry.column(),
            geometry.page()
        );

        delay.delay_ms(SETTLE_DELAY_MS);
        self.ready = true;

        self.on()?;
        self.clear(Gray4::BLACK);
        self.flush()
    }

    /// Pulses the reset line high, low, high.
    ///
    /// The controller keeps its RAM across this, so previous contents come
    /// back once the panel is turned on again.
    pub fn reset(&mut self, delay: &mut impl DelayNs) -> Result<(), Error<PinE, SpiE>> {
        diag!(self.logger, Debug, "reset");
        self.rst.set_high().map_err(Error::Pin)?;
        delay.delay_ms(RESET_DELAY_MS);
        self.rst.set_low().map_err(Error::Pin)?;
        delay.delay_ms(RESET_DELAY_MS);
        self.rst.set_high().map_err(Error::Pin)?;
        delay.delay_ms(RESET_DELAY_MS);
        Ok(())
    }

    /// Turns the panel on. Whatever is in display RAM reappears.
    pub fn on(&mut self) -> Result<(), Error<PinE, SpiE>> {
        diag!(self.logger, Debug, "panel on");
        self.send_commands(&[Command::DisplayOn(true)])
    }

    /// Turns the panel off. Neither the framebuffer nor display RAM is
    /// cleared.
    pub fn off(&mut self) -> Result<(), Error<PinE, SpiE>> {
        diag!(self.logger, Debug, "panel off");
        self.send_commands(&[Command::DisplayOn(false)])
    }

    /// Transfers the whole framebuffer to the display.
    ///
    /// Does nothing until the power-on sequence has completed. Rows are sent
    /// with in-place transfers, which write whatever the bus reads back into
    /// the memory they send from. They are sent from a snapshot of the
    /// framebuffer, so the framebuffer itself never sees those echoes, even
    /// if a transfer fails partway.
    pub fn flush(&mut self) -> Result<(), Error<PinE, SpiE>> {
        if !self.ready {
            diag!(self.logger, Debug, "flush skipped, panel not ready");
            return Ok(());
        }
        diag!(self.logger, Trace, "flush");

        self.transfer_buf.copy_from_slice(self.framebuffer.data());
        let geometry = *self.framebuffer.geometry();
        self.set_window(0, 0, geometry.column(), geometry.page())?;

        self.dc.set_high().map_err(Error::Pin)?;
        self.cs.set_low().map_err(Error::Pin)?;
        for row in self.transfer_buf.chunks_exact_mut(geometry.row_bytes()) {
            self.spi.transfer_in_place(row).map_err(Error::Spi)?;
        }
        self.spi.flush().map_err(Error::Spi)?;
        self.cs.set_high().map_err(Error::Pin)?;

        Ok(())
    }

    /// Shuts the driver down and returns the peripherals to you.
    ///
    /// With `power_off` the panel is switched off first; a failure to do so
    /// is logged and otherwise ignored, so the peripherals always come back.
    /// Dropping the bus closes it.
    pub fn close(mut self, power_off: bool) -> (CS, DC, RST, SPI) {
        diag!(self.logger, Debug, "close, power_off={}", power_off);
        if power_off && self.off().is_err() {
            diag!(self.logger, Warn, "failed to switch the panel off");
        }
        self.ready = false;
        (self.cs, self.dc, self.rst, self.spi)
    }

    /// Addresses the RAM window `[xstart, xend) × [ystart, yend)`.
    fn set_window(
        &mut self,
        xstart: u16,
        ystart: u16,
        xend: u16,
        yend: u16,
    ) -> Result<(), Error<PinE, SpiE>> {
        diag!(
            self.logger,
            Trace,
            "set window ({}, {}) to ({}, {})",
            xstart,
            ystart,
            xend,
            yend
        );
        self.send_commands(&[
            Command::ColumnAddress(low_byte(xstart), low_byte(xend.wrapping_sub(1))),
            Command::RowAddress(low_byte(ystart), low_byte(yend.wrapping_sub(1))),
        ])
    }

    fn init_reg(&mut self) -> Result<(), Error<PinE, SpiE>> {
        diag!(self.logger, Debug, "programming registers");
        self.send_commands(&INIT_SEQUENCE)
    }

    fn send_commands(&mut self, commands: &[Command]) -> Result<(), Error<PinE, SpiE>> {
        for command in commands {
            if command.push(&mut self.command_buf) {
                continue;
            }
            self.flush_commands()?;
            assert!(command.push(&mut self.command_buf));
        }
        self.flush_commands()
    }

    /// Sends the pending bytes. The controller takes each in its own frame.
    fn flush_commands(&mut self) -> Result<(), Error<PinE, SpiE>> {
        let pending = core::mem::take(&mut self.command_buf);
        for &value in pending.iter() {
            self.write_reg(value)?;
        }
        Ok(())
    }

    /// Sends one command-mode byte in its own chip-select frame.
    fn write_reg(&mut self, value: u8) -> Result<(), Error<PinE, SpiE>> {
        diag!(self.logger, Trace, "write_reg {:02x}", value);
        self.dc.set_low().map_err(Error::Pin)?;
        self.cs.set_low().map_err(Error::Pin)?;
        self.spi.write(&[value]).map_err(Error::Spi)?;
        self.spi.flush().map_err(Error::Spi)?;
        self.cs.set_high().map_err(Error::Pin)?;
        Ok(())
    }
}

fn low_byte(value: u16) -> u8 {
    (value & 0xFF) as u8
}
