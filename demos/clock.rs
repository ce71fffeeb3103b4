//! Seven-segment UTC clock on the Waveshare 1.5" SSD1327 HAT for Raspberry
//! Pi.
//!
//! Connections (BCM numbering):
//!
//! | Display | Pi           |
//! |---------|--------------|
//! | DIN     | MOSI (10)    |
//! | CLK     | SCLK (11)    |
//! | CS      | CE0 (8)      |
//! | DC      | 24           |
//! | RST     | 25           |
//!
//! SPI has to be enabled (`dtparam=spi=on`) and the user needs write access
//! to `/sys/class/gpio`.
//!
//! ```sh
//! cargo run --release --features linux --example clock
//! ```

use std::thread::sleep;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::Context;
use embedded_graphics_core::pixelcolor::GrayColor;
use linux_embedded_hal::Delay;
use ssd1327_spidev::linux::Sysfs;
use ssd1327_spidev::{open, Config, Gray4};

const DIGIT_HEIGHT: i32 = 24;
const THICKNESS: i32 = 2;
const PITCH: i32 = DIGIT_HEIGHT / 2 + 6;

fn main() -> anyhow::Result<()> {
    let config = Config::default().with_logger(log::logger());
    let mut platform = Sysfs {
        logger: log::logger(),
        ..Sysfs::default()
    };
    let mut display = open(&mut platform, "/dev/spidev0.0", config, &mut Delay)
        .map_err(|e| anyhow::anyhow!("{e:?}"))
        .context("opening display")?;

    let frame = Gray4::new(0x4);
    let digits = Gray4::WHITE;

    for _ in 0..60 {
        let secs = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
        let (h, m, s) = ((secs / 3600) % 24, (secs / 60) % 60, secs % 60);

        let fb = display.framebuffer_mut();
        fb.clear(Gray4::BLACK);
        fb.draw_rect(2, 40, 126, 88, frame, false);

        let mut x = 10;
        for (i, value) in [h, m, s].into_iter().enumerate() {
            if i > 0 {
                fb.draw_square(x - 5, 54, 2, digits, true);
                fb.draw_square(x - 5, 70, 2, digits, true);
                x += 2;
            }
            fb.draw_7seg_digit(x, 52, DIGIT_HEIGHT, THICKNESS, (value / 10) as i32, digits);
            x += PITCH;
            fb.draw_7seg_digit(x, 52, DIGIT_HEIGHT, THICKNESS, (value % 10) as i32, digits);
            x += PITCH;
        }

        display
            .flush()
            .map_err(|e| anyhow::anyhow!("{e:?}"))
            .context("flushing frame")?;
        sleep(Duration::from_secs(1));
    }

    display.close(true);
    Ok(())
}
