//! Validierte Channel-Konfiguration
//!
//! Jeder Setter prüft vor dem Zuweisen: ein ungültiger Wert liefert
//! [`RmtError::Range`] und das Feld behält seinen alten Wert. Ein Clone ist
//! eine vollständig unabhängige Kopie.
//!
//! Settings gehen per Value an den Channel-Konstruktor. Ab dann besitzt der
//! Channel seine Kopie und ist der einzige, der sie ändert.

use core::time::Duration;

use crate::consts::{
    DEFAULT_BUFFER_SIZE, DEFAULT_CARRIER_DUTY_PERCENTAGE, DEFAULT_CARRIER_FREQUENCY_HZ,
    DEFAULT_CLOCK_DIVIDER, DEFAULT_FILTER_THRESHOLD, DEFAULT_IDLE_THRESHOLD,
    DEFAULT_MEMORY_BLOCKS, DEFAULT_RECEIVE_TIMEOUT_MS, MAX_CHANNEL, MAX_LOOP_COUNT,
    SOURCE_CLOCK_HZ,
};
use crate::error::RmtError;
use crate::memory::{check_block_count, check_blocks_for_channel, max_blocks_for};

// ============================================================================
// Gemeinsame Settings
// ============================================================================

/// Settings, die Transmit- und Receive-Channels teilen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSettings {
    channel: Option<u8>,
    pin_number: u8,
    clock_divider: u8,
    number_of_memory_blocks: u8,
    buffer_size: usize,
    signal_inverter_enabled: bool,
}

impl ChannelSettings {
    /// Settings für `pin_number` auf dem nächsten freien Channel
    pub const fn new(pin_number: u8) -> Self {
        Self {
            channel: None,
            pin_number,
            clock_divider: DEFAULT_CLOCK_DIVIDER,
            number_of_memory_blocks: DEFAULT_MEMORY_BLOCKS,
            buffer_size: DEFAULT_BUFFER_SIZE,
            signal_inverter_enabled: false,
        }
    }

    /// Settings für `pin_number` auf einem festen Channel (0..=7)
    pub fn with_channel(channel: u8, pin_number: u8) -> Result<Self, RmtError> {
        let mut settings = Self::new(pin_number);
        settings.set_channel(channel)?;
        Ok(settings)
    }

    /// Gewünschter Channel, `None` heißt automatische Wahl
    pub const fn channel(&self) -> Option<u8> {
        self.channel
    }

    /// Fordert einen festen Channel an
    ///
    /// Fehler bei `channel > 7` oder wenn die eingestellten Memory Blocks
    /// dahinter keinen Platz haben.
    pub fn set_channel(&mut self, channel: u8) -> Result<(), RmtError> {
        if channel > MAX_CHANNEL {
            return Err(RmtError::range("channel", 0, MAX_CHANNEL as u32));
        }
        if self.number_of_memory_blocks > max_blocks_for(channel) {
            // Höchster Channel, hinter dem die aktuellen Blocks noch Platz haben
            let max = MAX_CHANNEL + 1 - self.number_of_memory_blocks;
            return Err(RmtError::range("channel", 0, max as u32));
        }
        self.channel = Some(channel);
        Ok(())
    }

    /// Treiber wählt den Channel
    pub fn set_auto_channel(&mut self) {
        self.channel = None;
    }

    pub const fn pin_number(&self) -> u8 {
        self.pin_number
    }

    pub fn set_pin_number(&mut self, pin_number: u8) {
        self.pin_number = pin_number;
    }

    pub const fn clock_divider(&self) -> u8 {
        self.clock_divider
    }

    /// Setzt den Teiler der 80 MHz Source Clock (1..=255)
    pub fn set_clock_divider(&mut self, divider: u8) -> Result<(), RmtError> {
        if divider == 0 {
            return Err(RmtError::range("clock_divider", 1, u8::MAX as u32));
        }
        self.clock_divider = divider;
        Ok(())
    }

    pub const fn number_of_memory_blocks(&self) -> u8 {
        self.number_of_memory_blocks
    }

    /// Setzt die Anzahl 64-Wort Memory Blocks (1..=8, höchstens `8 - channel`)
    pub fn set_number_of_memory_blocks(&mut self, blocks: u8) -> Result<(), RmtError> {
        match self.channel {
            Some(channel) => check_blocks_for_channel(channel, blocks)?,
            None => check_block_count(blocks)?,
        }
        self.number_of_memory_blocks = blocks;
        Ok(())
    }

    /// Ring Buffer Kapazität in Pulse Commands
    pub const fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    pub fn set_buffer_size(&mut self, size: usize) -> Result<(), RmtError> {
        if size == 0 {
            return Err(RmtError::range("buffer_size", 1, u32::MAX));
        }
        self.buffer_size = size;
        Ok(())
    }

    pub const fn signal_inverter_enabled(&self) -> bool {
        self.signal_inverter_enabled
    }

    pub fn set_signal_inverter_enabled(&mut self, enabled: bool) {
        self.signal_inverter_enabled = enabled;
    }

    /// Tick-Rate des Channels in Hz
    pub const fn tick_hz(&self) -> u32 {
        SOURCE_CLOCK_HZ / self.clock_divider as u32
    }

    /// Übernimmt den Channel, den der Treiber tatsächlich gebunden hat
    pub(crate) fn bind_channel(&mut self, channel: u8) {
        self.channel = Some(channel);
    }
}

// ============================================================================
// Transmit Settings
// ============================================================================

/// Carrier High/Low-Dauer in Source-Clock-Ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CarrierTicks {
    pub high: u16,
    pub low: u16,
}

/// Settings eines [`TransmitChannel`](crate::TransmitChannel)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransmitChannelSettings {
    base: ChannelSettings,
    carrier_enabled: bool,
    carrier_level: bool,
    carrier_frequency: u32,
    carrier_duty_percentage: u8,
    looping_enabled: bool,
    loop_count: u16,
    idle_output_enabled: bool,
    idle_level: bool,
}

impl TransmitChannelSettings {
    /// Transmit-Settings für `pin_number` auf dem nächsten freien Channel
    pub const fn new(pin_number: u8) -> Self {
        Self::from_base(ChannelSettings::new(pin_number))
    }

    /// Transmit-Settings für `pin_number` auf einem festen Channel (0..=7)
    pub fn with_channel(channel: u8, pin_number: u8) -> Result<Self, RmtError> {
        Ok(Self::from_base(ChannelSettings::with_channel(
            channel, pin_number,
        )?))
    }

    /// Ergänzt vorhandene Settings um die Transmit-Defaults
    pub const fn from_base(base: ChannelSettings) -> Self {
        Self {
            base,
            carrier_enabled: true,
            carrier_level: true,
            carrier_frequency: DEFAULT_CARRIER_FREQUENCY_HZ,
            carrier_duty_percentage: DEFAULT_CARRIER_DUTY_PERCENTAGE,
            looping_enabled: false,
            loop_count: 1,
            idle_output_enabled: true,
            idle_level: false,
        }
    }

    pub const fn base(&self) -> &ChannelSettings {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut ChannelSettings {
        &mut self.base
    }

    pub const fn carrier_enabled(&self) -> bool {
        self.carrier_enabled
    }

    pub fn set_carrier_enabled(&mut self, enabled: bool) {
        self.carrier_enabled = enabled;
    }

    /// Ausgangs-Level, auf den der Carrier moduliert wird (`true` = high)
    pub const fn carrier_level(&self) -> bool {
        self.carrier_level
    }

    pub fn set_carrier_level(&mut self, level: bool) {
        self.carrier_level = level;
    }

    /// Carrier-Frequenz in Hz
    pub const fn carrier_frequency(&self) -> u32 {
        self.carrier_frequency
    }

    pub fn set_carrier_frequency(&mut self, frequency: u32) -> Result<(), RmtError> {
        if frequency < 1 {
            return Err(RmtError::range("carrier_frequency", 1, u32::MAX));
        }
        self.carrier_frequency = frequency;
        Ok(())
    }

    pub const fn carrier_duty_percentage(&self) -> u8 {
        self.carrier_duty_percentage
    }

    pub fn set_carrier_duty_percentage(&mut self, duty: u8) -> Result<(), RmtError> {
        if !(1..=100).contains(&duty) {
            return Err(RmtError::range("carrier_duty_percentage", 1, 100));
        }
        self.carrier_duty_percentage = duty;
        Ok(())
    }

    /// Carrier High/Low-Dauer aus Frequenz und Duty Cycle
    ///
    /// Der Carrier läuft auf der ungeteilten Source Clock. Beide Werte
    /// werden auf `1..=65535` begrenzt.
    pub fn carrier_ticks(&self) -> CarrierTicks {
        let period = u64::from(SOURCE_CLOCK_HZ / self.carrier_frequency);
        let high = period * u64::from(self.carrier_duty_percentage) / 100;
        let low = period - high;
        CarrierTicks {
            high: saturate_ticks(high),
            low: saturate_ticks(low),
        }
    }

    pub const fn looping_enabled(&self) -> bool {
        self.looping_enabled
    }

    pub fn set_looping_enabled(&mut self, enabled: bool) {
        self.looping_enabled = enabled;
    }

    /// Anzahl Durchläufe bei aktivem Looping (1..=1023)
    pub const fn loop_count(&self) -> u16 {
        self.loop_count
    }

    pub fn set_loop_count(&mut self, count: u16) -> Result<(), RmtError> {
        if !(1..=MAX_LOOP_COUNT).contains(&count) {
            return Err(RmtError::range("loop_count", 1, MAX_LOOP_COUNT as u32));
        }
        self.loop_count = count;
        Ok(())
    }

    pub const fn idle_output_enabled(&self) -> bool {
        self.idle_output_enabled
    }

    pub fn set_idle_output_enabled(&mut self, enabled: bool) {
        self.idle_output_enabled = enabled;
    }

    /// Ausgangs-Level im Leerlauf (`true` = high)
    pub const fn idle_level(&self) -> bool {
        self.idle_level
    }

    pub fn set_idle_level(&mut self, level: bool) {
        self.idle_level = level;
    }
}

fn saturate_ticks(ticks: u64) -> u16 {
    u16::try_from(ticks).unwrap_or(u16::MAX).max(1)
}

impl AsRef<ChannelSettings> for TransmitChannelSettings {
    fn as_ref(&self) -> &ChannelSettings {
        &self.base
    }
}

// ============================================================================
// Receive Settings
// ============================================================================

/// Settings eines [`ReceiveChannel`](crate::ReceiveChannel)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverChannelSettings {
    base: ChannelSettings,
    idle_threshold: u16,
    filter_enabled: bool,
    filter_threshold: u8,
    receive_timeout: Duration,
}

impl ReceiverChannelSettings {
    /// Receive-Settings für `pin_number` auf dem nächsten freien Channel
    pub const fn new(pin_number: u8) -> Self {
        Self::from_base(ChannelSettings::new(pin_number))
    }

    /// Receive-Settings für `pin_number` auf einem festen Channel (0..=7)
    pub fn with_channel(channel: u8, pin_number: u8) -> Result<Self, RmtError> {
        Ok(Self::from_base(ChannelSettings::with_channel(
            channel, pin_number,
        )?))
    }

    /// Ergänzt vorhandene Settings um die Receive-Defaults
    pub const fn from_base(base: ChannelSettings) -> Self {
        Self {
            base,
            idle_threshold: DEFAULT_IDLE_THRESHOLD,
            filter_enabled: true,
            filter_threshold: DEFAULT_FILTER_THRESHOLD,
            receive_timeout: Duration::from_millis(DEFAULT_RECEIVE_TIMEOUT_MS),
        }
    }

    pub const fn base(&self) -> &ChannelSettings {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut ChannelSettings {
        &mut self.base
    }

    /// Ticks ohne Flanke, nach denen ein Empfang abgeschlossen ist
    pub const fn idle_threshold(&self) -> u16 {
        self.idle_threshold
    }

    pub fn set_idle_threshold(&mut self, ticks: u16) -> Result<(), RmtError> {
        if ticks == 0 {
            return Err(RmtError::range("idle_threshold", 1, u16::MAX as u32));
        }
        self.idle_threshold = ticks;
        Ok(())
    }

    pub const fn filter_enabled(&self) -> bool {
        self.filter_enabled
    }

    pub fn set_filter_enabled(&mut self, enabled: bool) {
        self.filter_enabled = enabled;
    }

    /// Kürzere Pulse (in Ticks) ignoriert der aktive Filter
    pub const fn filter_threshold(&self) -> u8 {
        self.filter_threshold
    }

    pub fn set_filter_threshold(&mut self, ticks: u8) {
        self.filter_threshold = ticks;
    }

    pub const fn receive_timeout(&self) -> Duration {
        self.receive_timeout
    }

    pub fn set_receive_timeout(&mut self, timeout: Duration) {
        self.receive_timeout = timeout;
    }
}

impl AsRef<ChannelSettings> for ReceiverChannelSettings {
    fn as_ref(&self) -> &ChannelSettings {
        &self.base
    }
}
