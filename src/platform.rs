//! Acquiring the panel's pins and bus from the host.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, OutputPin};
use embedded_hal::spi::{self, SpiBus};

use crate::{Config, Error, Ssd1327};

/// GPIO numbers of the panel control lines, as wired on the Waveshare
/// Raspberry Pi HAT.
pub struct Pins;

impl Pins {
    /// Chip select, active low.
    pub const CS: u8 = 8;
    /// Reset, active low.
    pub const RST: u8 = 25;
    /// Data/command select (high for data, low for command).
    pub const DC: u8 = 24;
}

/// Host services needed to bring up the panel.
///
/// Each step is fallible and any failure aborts [`open`]. Whatever was
/// acquired before the failure is dropped; exported pins are not
/// unexported.
pub trait Platform {
    type Error: core::fmt::Debug;
    type Pin: OutputPin;
    type Bus: SpiBus;

    /// Makes `pin` available to user space.
    fn export(&mut self, pin: u8) -> Result<(), Self::Error>;

    /// Configures an exported `pin` as an output and hands it over.
    fn output_pin(&mut self, pin: u8) -> Result<Self::Pin, Self::Error>;

    /// Opens and configures the SPI bus at `device`.
    fn open_bus(&mut self, device: &str) -> Result<Self::Bus, Self::Error>;
}

/// Why [`open`] gave up. No driver exists after any of these.
#[derive(Debug)]
pub enum OpenError<E, PinE, SpiE> {
    Export { pin: u8, source: E },
    Direction { pin: u8, source: E },
    Bus(E),
    /// The peripherals were acquired but the panel did not come up.
    Panel(Error<PinE, SpiE>),
}

/// [`OpenError`] for a given platform.
pub type PlatformError<P> = OpenError<
    <P as Platform>::Error,
    <<P as Platform>::Pin as digital::ErrorType>::Error,
    <<P as Platform>::Bus as spi::ErrorType>::Error,
>;

/// Concrete driver type produced by [`open`].
pub type PlatformDriver<P> = Ssd1327<
    <P as Platform>::Pin,
    <P as Platform>::Pin,
    <P as Platform>::Pin,
    <P as Platform>::Bus,
>;

/// Exports and configures the control pins, opens `device` and brings the
/// panel up.
///
/// Pins are exported CS, RST, DC, then switched to outputs in the same
/// order, then the bus is opened. See [`Ssd1327::new`] for the rest.
pub fn open<P: Platform>(
    platform: &mut P,
    device: &str,
    config: Config,
    delay: &mut impl DelayNs,
) -> Result<PlatformDriver<P>, PlatformError<P>> {
    const ORDER: [u8; 3] = [Pins::CS, Pins::RST, Pins::DC];
    let logger = config.logger;

    for pin in ORDER {
        if let Err(source) = platform.export(pin) {
            diag!(logger, Error, "can't export GPIO {}: {:?}", pin, source);
            return Err(OpenError::Export { pin, source });
        }
    }

    let mut output = |pin| -> Result<P::Pin, PlatformError<P>> {
        platform.output_pin(pin).map_err(|source| {
            diag!(logger, Error, "can't make GPIO {} an output: {:?}", pin, source);
            OpenError::Direction { pin, source }
        })
    };
    let cs = output(Pins::CS)?;
    let rst = output(Pins::RST)?;
    let dc = output(Pins::DC)?;

    let spi = platform.open_bus(device).map_err(|source| -> PlatformError<P> {
        diag!(logger, Error, "can't open SPI device {}: {:?}", device, source);
        OpenError::Bus(source)
    })?;

    Ssd1327::new(spi, cs, dc, rst, config, delay).map_err(OpenError::Panel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Capture, MockDelay, MockPlatform};

    #[test]
    fn opens_and_initializes() {
        let mut platform = MockPlatform::new();
        let mut delay = MockDelay::new(&platform.trace);
        let d = open(&mut platform, "/dev/spidev0.0", Config::default(), &mut delay).unwrap();
        assert!(d.is_ready());
        assert_eq!(platform.exported, [Pins::CS, Pins::RST, Pins::DC]);
        assert_eq!(platform.opened.as_deref(), Some("/dev/spidev0.0"));
        assert_eq!(platform.trace.transfers().len(), 128);
    }

    #[test]
    fn bus_open_failure_yields_no_driver() {
        let log = Capture::leak();
        let mut platform = MockPlatform::new();
        platform.fail_bus = true;
        let mut delay = MockDelay::new(&platform.trace);
        let result = open(
            &mut platform,
            "/dev/spidev9.9",
            Config::default().with_logger(log),
            &mut delay,
        );
        assert!(matches!(result, Err(OpenError::Bus("no such device"))));
        // All three pins stay exported; nothing unexports them.
        assert_eq!(platform.exported.len(), 3);
        assert!(platform.trace.take().is_empty());
        assert!(log.contains("/dev/spidev9.9"));
    }

    #[test]
    fn export_failure_stops_early() {
        let mut platform = MockPlatform::new();
        platform.fail_export = Some(Pins::RST);
        let mut delay = MockDelay::new(&platform.trace);
        let result = open(&mut platform, "/dev/spidev0.0", Config::default(), &mut delay);
        assert!(matches!(
            result,
            Err(OpenError::Export { pin: Pins::RST, .. })
        ));
        assert_eq!(platform.exported, [Pins::CS, Pins::RST]);
        assert!(platform.opened.is_none());
    }

    #[test]
    fn direction_failure_is_fatal() {
        let mut platform = MockPlatform::new();
        platform.fail_direction = Some(Pins::DC);
        let mut delay = MockDelay::new(&platform.trace);
        let result = open(&mut platform, "/dev/spidev0.0", Config::default(), &mut delay);
        assert!(matches!(
            result,
            Err(OpenError::Direction { pin: Pins::DC, .. })
        ));
        assert!(platform.opened.is_none());
    }

    #[test]
    fn panel_errors_are_wrapped() {
        let mut platform = MockPlatform::new();
        let mut delay = MockDelay::new(&platform.trace);
        let config = Config {
            height: 0,
            ..Config::default()
        };
        let result = open(&mut platform, "/dev/spidev0.0", config, &mut delay);
        assert!(matches!(
            result,
            Err(OpenError::Panel(Error::InvalidSize { height: 0, .. }))
        ));
    }
}
