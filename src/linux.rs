//! Linux host support: sysfs GPIO for the control lines, spidev for the bus.

use std::io;
use std::os::unix::io::AsRawFd;

use linux_embedded_hal::spidev::{spidevioctl, SpiModeFlags, Spidev, SpidevOptions};
use linux_embedded_hal::{sysfs_gpio, SpidevBus, SysfsPin};
use log::Log;

use crate::{Platform, QUIET};

/// Default bus clock.
pub const SPI_SPEED_HZ: u32 = 2_000_000;

#[derive(Debug)]
pub enum LinuxError {
    Gpio(sysfs_gpio::Error),
    Spi(io::Error),
}

impl core::fmt::Display for LinuxError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LinuxError::Gpio(e) => write!(f, "gpio: {e}"),
            LinuxError::Spi(e) => write!(f, "spi: {e}"),
        }
    }
}

impl std::error::Error for LinuxError {}

/// [`Platform`] backed by `/sys/class/gpio` and `/dev/spidevB.C`.
///
/// The bus runs in mode 0. Failing to set the mode, or to read back the
/// clock, is fatal. Failing to set the word size or clock only logs a
/// warning, and the bus is used with whatever the kernel had configured.
pub struct Sysfs {
    pub speed_hz: u32,
    pub logger: &'static dyn Log,
}

impl Default for Sysfs {
    fn default() -> Self {
        Self {
            speed_hz: SPI_SPEED_HZ,
            logger: &QUIET,
        }
    }
}

impl Platform for Sysfs {
    type Error = LinuxError;
    type Pin = SysfsPin;
    type Bus = SpidevBus;

    fn export(&mut self, pin: u8) -> Result<(), LinuxError> {
        SysfsPin::new(u64::from(pin))
            .export()
            .map_err(LinuxError::Gpio)
    }

    fn output_pin(&mut self, pin: u8) -> Result<SysfsPin, LinuxError> {
        let gpio = SysfsPin::new(u64::from(pin));
        gpio.set_direction(sysfs_gpio::Direction::Out)
            .map_err(LinuxError::Gpio)?;
        Ok(gpio)
    }

    fn open_bus(&mut self, device: &str) -> Result<SpidevBus, LinuxError> {
        let mut spi = Spidev::open(device).map_err(LinuxError::Spi)?;

        let word = SpidevOptions::new().bits_per_word(8).build();
        if let Err(e) = spi.configure(&word) {
            diag!(self.logger, Warn, "{}: can't set 8 bits per word: {}", device, e);
        }

        let mode = SpidevOptions::new().mode(SpiModeFlags::SPI_MODE_0).build();
        spi.configure(&mode).map_err(|e| {
            diag!(self.logger, Error, "{}: can't set SPI mode 0: {}", device, e);
            LinuxError::Spi(e)
        })?;

        let speed = SpidevOptions::new().max_speed_hz(self.speed_hz).build();
        if let Err(e) = spi.configure(&speed) {
            diag!(self.logger, Warn, "{}: can't set clock to {} Hz: {}", device, self.speed_hz, e);
        }
        let speed_hz = read_back_speed(
            device,
            self.logger,
            spidevioctl::get_max_speed_hz(spi.as_raw_fd()),
        )?;

        diag!(self.logger, Debug, "{} open, mode 0, {} Hz", device, speed_hz);
        Ok(SpidevBus(spi))
    }
}

/// The clock the kernel actually runs the bus at. Not knowing it is fatal.
fn read_back_speed(
    device: &str,
    logger: &'static dyn Log,
    queried: io::Result<u32>,
) -> Result<u32, LinuxError> {
    queried.map_err(|e| {
        diag!(logger, Error, "{}: can't read SPI clock: {}", device, e);
        LinuxError::Spi(e)
    })
}
