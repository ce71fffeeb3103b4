/// Commands for the SSD1327 controller.
///
/// Command parameters are sent with D/C low like the opcode itself, one
/// register write per byte.
use heapless::Vec;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    /// Turn display on or off.
    DisplayOn(bool),
    /// Set column start and end address.
    ColumnAddress(u8, u8),
    /// Set row start and end address.
    RowAddress(u8, u8),
    /// Set contrast current, higher is brighter.
    Contrast(u8),
    /// Set segment/COM remapping and address increment mode.
    Remap(u8),
    /// Set display RAM row that maps to the first COM line.
    StartLine(u8),
    /// Set vertical shift of the display.
    DisplayOffset(u8),
    /// Show RAM contents as is (not all-on, all-off or inverted).
    NormalDisplay,
    /// Set multiplex ratio, number of COM lines minus one.
    MuxRatio(u8),
    /// Set phase 1 and phase 2 period lengths.
    PhaseLength(u8),
    /// Set front clock divider and oscillator frequency.
    ClockDivider(u8),
    /// Enable or disable the internal VDD regulator.
    FunctionSelectionA(u8),
    /// Set second pre-charge period.
    SecondPrecharge(u8),
    /// Set VCOMH deselect level.
    Vcomh(u8),
    /// Set pre-charge voltage level.
    PrechargeVoltage(u8),
    /// Enable second pre-charge and the internal VSL.
    FunctionSelectionB(u8),
    /// Lock or unlock the command interface.
    CommandLock(u8),
}

/// Register programming for the 128×128 Waveshare module, in order.
///
/// The addressing window here is always the full 128×128 RAM regardless of
/// the configured panel size; flushes set their own window.
pub(crate) const INIT_SEQUENCE: [Command; 17] = [
    Command::DisplayOn(false),
    Command::ColumnAddress(0x00, 0x7F),
    Command::RowAddress(0x00, 0x7F),
    Command::Contrast(0x40),
    Command::Remap(0x51),
    Command::StartLine(0x00),
    Command::DisplayOffset(0x00),
    Command::NormalDisplay,
    Command::MuxRatio(0x7F),
    Command::PhaseLength(0xF1),
    Command::ClockDivider(0x00),
    Command::FunctionSelectionA(0x01),
    Command::SecondPrecharge(0x0F),
    Command::Vcomh(0x04),
    Command::PrechargeVoltage(0x08),
    Command::FunctionSelectionB(0x62),
    Command::CommandLock(0x12),
];

impl Command {
    pub fn push<const N: usize>(&self, buf: &mut Vec<u8, N>) -> bool {
        let result = match *self {
            Command::DisplayOn(on) => &[0xAE | (on as u8)] as &[u8],
            Command::ColumnAddress(start, end) => &[0x15, start, end],
            Command::RowAddress(start, end) => &[0x75, start, end],
            Command::Contrast(level) => &[0x81, level],
            Command::Remap(flags) => &[0xA0, flags],
            Command::StartLine(line) => &[0xA1, line],
            Command::DisplayOffset(offset) => &[0xA2, offset],
            Command::NormalDisplay => &[0xA4],
            Command::MuxRatio(ratio) => &[0xA8, ratio],
            Command::PhaseLength(phases) => &[0xB1, phases],
            Command::ClockDivider(div) => &[0xB3, div],
            Command::FunctionSelectionA(sel) => &[0xAB, sel],
            Command::SecondPrecharge(period) => &[0xB6, period],
            Command::Vcomh(level) => &[0xBE, level],
            Command::PrechargeVoltage(level) => &[0xBC, level],
            Command::FunctionSelectionB(sel) => &[0xD5, sel],
            Command::CommandLock(lock) => &[0xFD, lock],
        };

        buf.extend_from_slice(result).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_sequence_bytes() {
        let mut buf: Vec<u8, 64> = Vec::new();
        for command in INIT_SEQUENCE {
            assert!(command.push(&mut buf));
        }
        assert_eq!(
            buf.as_slice(),
            &[
                0xAE, 0x15, 0x00, 0x7F, 0x75, 0x00, 0x7F, 0x81, 0x40, 0xA0, 0x51, 0xA1, 0x00,
                0xA2, 0x00, 0xA4, 0xA8, 0x7F, 0xB1, 0xF1, 0xB3, 0x00, 0xAB, 0x01, 0xB6, 0x0F,
                0xBE, 0x04, 0xBC, 0x08, 0xD5, 0x62, 0xFD, 0x12,
            ]
        );
    }

    #[test]
    fn display_power() {
        let mut buf: Vec<u8, 2> = Vec::new();
        assert!(Command::DisplayOn(true).push(&mut buf));
        assert!(Command::DisplayOn(false).push(&mut buf));
        assert_eq!(buf.as_slice(), &[0xAF, 0xAE]);
    }

    #[test]
    fn push_reports_a_full_buffer() {
        let mut buf: Vec<u8, 2> = Vec::new();
        assert!(!Command::ColumnAddress(0, 63).push(&mut buf));
        assert!(buf.is_empty());
    }
}
