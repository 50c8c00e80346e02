//! Wellenformen für adressierbare LEDs
//!
//! Eindraht-LED-Protokolle kodieren jedes Bit als ein Pulse Command: langer
//! High-Puls für `1`, kurzer für `0`. Eine lange Low-Pause übernimmt den
//! Frame. [`LedTiming`] hält diese drei Commands einer Chip-Familie samt
//! dem Clock-Divider, in dem die Dauern gezählt sind.
//!
//! # Presets
//! | Chip    | Divider | Tick  |
//! |---------|---------|-------|
//! | SK6812  | 4       | 50 ns |
//! | WS2808  | 2       | 25 ns |
//! | WS2812B | 2       | 25 ns |
//! | WS2812C | 2       | 25 ns |
//! | WS2815B | 2       | 25 ns |

use alloc::vec::Vec;
use rgb::RGB8;

use crate::channel::{RmtChannel, TransmitChannel};
use crate::command::PulseCommand;
use crate::driver::RmtDriver;
use crate::error::RmtError;
use crate::settings::TransmitChannelSettings;

/// Gesendete Bits pro LED
pub const BITS_PER_LED: usize = 24;

// ============================================================================
// Timing-Presets
// ============================================================================

/// Bit- und Reset-Pulse einer LED-Chip-Familie
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LedTiming {
    pub one: PulseCommand,
    pub zero: PulseCommand,
    pub reset: PulseCommand,
    /// Divider des 80 MHz Quell-Takts, in dem die Dauern gezählt sind
    pub clock_divider: u8,
}

impl LedTiming {
    pub const SK6812: Self = Self {
        one: PulseCommand::constant(14, true, 12, false),
        zero: PulseCommand::constant(7, true, 16, false),
        reset: PulseCommand::constant(500, false, 520, false),
        clock_divider: 4,
    };

    pub const WS2808: Self = Self {
        one: PulseCommand::constant(52, true, 52, false),
        zero: PulseCommand::constant(14, true, 52, false),
        reset: PulseCommand::constant(1400, false, 1400, false),
        clock_divider: 2,
    };

    pub const WS2812B: Self = Self {
        one: PulseCommand::constant(32, true, 18, false),
        zero: PulseCommand::constant(16, true, 34, false),
        reset: PulseCommand::constant(2000, false, 2000, false),
        clock_divider: 2,
    };

    // WS2812C und WS2815B nutzen die WS2808-Wellenform
    pub const WS2812C: Self = Self::WS2808;

    pub const WS2815B: Self = Self::WS2808;

    /// Command für ein einzelnes Bit
    pub const fn bit(&self, set: bool) -> PulseCommand {
        if set { self.one } else { self.zero }
    }

    /// Commands für einen ganzen Frame: 24 Bit pro Farbe, MSB zuerst, dann Reset
    pub fn commands_for(&self, colors: &[RGB8], order: ColorOrder) -> Vec<PulseCommand> {
        let mut commands = Vec::with_capacity(colors.len() * BITS_PER_LED + 1);
        for &color in colors {
            for byte in order.bytes(color) {
                commands.extend((0..8).rev().map(|bit| self.bit((byte >> bit) & 1 == 1)));
            }
        }
        commands.push(self.reset);
        commands
    }
}

/// Reihenfolge, in der ein Chip die Farbkanäle erwartet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColorOrder {
    #[default]
    Grb,
    Rgb,
    Brg,
}

impl ColorOrder {
    pub const fn bytes(self, color: RGB8) -> [u8; 3] {
        match self {
            ColorOrder::Grb => [color.g, color.r, color.b],
            ColorOrder::Rgb => [color.r, color.g, color.b],
            ColorOrder::Brg => [color.b, color.r, color.g],
        }
    }
}

// ============================================================================
// LED Writer
// ============================================================================

/// Trait für das Schreiben eines Farb-Frames auf einen LED-Strip
///
/// # Fehlerbehandlung
/// Liefert den [`RmtError`] des Channels, wenn der Frame nicht gesendet wurde
pub trait SmartLedWriter {
    fn write(&mut self, colors: &[RGB8]) -> Result<(), RmtError>;
}

/// LED-Strip an einem Transmit-Channel
pub struct LedStrip<D: RmtDriver> {
    channel: TransmitChannel<D>,
    timing: LedTiming,
    order: ColorOrder,
}

impl<D: RmtDriver> LedStrip<D> {
    /// Bindet einen Transmit-Channel auf `pin`, eingestellt für `timing`
    ///
    /// Carrier ist aus, die Leitung liegt im Idle auf Low.
    pub fn new(driver: D, pin: u8, timing: LedTiming) -> Result<Self, RmtError> {
        let mut settings = TransmitChannelSettings::new(pin);
        settings.base_mut().set_clock_divider(timing.clock_divider)?;
        settings.set_carrier_enabled(false);
        settings.set_idle_output_enabled(true);
        settings.set_idle_level(false);
        Ok(Self::from_channel(
            TransmitChannel::new(driver, settings)?,
            timing,
        ))
    }

    /// Übernimmt einen fertig konfigurierten Channel; Settings bleiben unverändert
    pub fn from_channel(channel: TransmitChannel<D>, timing: LedTiming) -> Self {
        Self {
            channel,
            timing,
            order: ColorOrder::default(),
        }
    }

    pub fn with_order(mut self, order: ColorOrder) -> Self {
        self.order = order;
        self
    }

    pub fn timing(&self) -> &LedTiming {
        &self.timing
    }

    pub fn channel(&self) -> &TransmitChannel<D> {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut TransmitChannel<D> {
        &mut self.channel
    }

    pub fn into_channel(self) -> TransmitChannel<D> {
        self.channel
    }
}

impl<D: RmtDriver> SmartLedWriter for LedStrip<D> {
    fn write(&mut self, colors: &[RGB8]) -> Result<(), RmtError> {
        debug!(
            "led: {} colors on GPIO{}",
            colors.len(),
            self.channel.pin()
        );
        self.channel.clear_commands()?;
        self.channel
            .extend_commands(self.timing.commands_for(colors, self.order))?;
        self.channel.send(true)
    }
}
