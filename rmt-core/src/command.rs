//! Pulse Command - ein Hardware-Wort des RMT Peripherals
//!
//! Ein [`PulseCommand`] enthält zwei `(duration, level)` Segmente. Die Dauer
//! wird in Channel-Ticks gezählt und ist auf 15 Bit begrenzt, weil das
//! oberste Bit jedes 16-Bit Halbworts den Level trägt.

use crate::consts::MAX_DURATION;
use crate::error::RmtError;

/// Kleinste erlaubte Dauer für das erste Segment.
///
/// Ein erstes Segment der Länge 0 markiert das Ende der Übertragung, bevor
/// überhaupt etwas gesendet wurde. Gilt nur beim Erstellen, nicht beim
/// Dekodieren empfangener Daten.
pub const MIN_DURATION0: u16 = 1;

/// Kleinste erlaubte Dauer für das zweite Segment.
///
/// 0 ist erlaubt und beendet die Wellenform nach dem ersten Segment.
pub const MIN_DURATION1: u16 = 0;

const LEVEL_BIT: u16 = 0x8000;

/// Zwei `(duration, level)` Pulse-Segmente
///
/// # Beispiele
///
/// ```
/// # use rmt_core::PulseCommand;
/// let one = PulseCommand::new(32, true, 18, false).unwrap();
/// assert_eq!(one.duration0(), 32);
/// assert!(PulseCommand::new(32_768, true, 0, false).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "(u16, bool, u16, bool)", into = "(u16, bool, u16, bool)")
)]
pub struct PulseCommand {
    duration0: u16,
    level0: bool,
    duration1: u16,
    level1: bool,
}

impl PulseCommand {
    /// Erstellt ein Command und prüft beide Dauern
    pub const fn new(
        duration0: u16,
        level0: bool,
        duration1: u16,
        level1: bool,
    ) -> Result<Self, RmtError> {
        if let Err(e) = check_duration0(duration0) {
            return Err(e);
        }
        if let Err(e) = check_duration1(duration1) {
            return Err(e);
        }
        Ok(Self {
            duration0,
            level0,
            duration1,
            level1,
        })
    }

    /// Konstantes Command, ungültige Dauer bricht den Build ab
    pub(crate) const fn constant(
        duration0: u16,
        level0: bool,
        duration1: u16,
        level1: bool,
    ) -> Self {
        match Self::new(duration0, level0, duration1, level1) {
            Ok(cmd) => cmd,
            Err(_) => panic!("invalid pulse command constant"),
        }
    }

    pub const fn duration0(&self) -> u16 {
        self.duration0
    }

    pub const fn level0(&self) -> bool {
        self.level0
    }

    pub const fn duration1(&self) -> u16 {
        self.duration1
    }

    pub const fn level1(&self) -> bool {
        self.level1
    }

    /// Setzt die erste Dauer; bei Fehler bleibt der alte Wert
    pub fn set_duration0(&mut self, duration: u16) -> Result<(), RmtError> {
        check_duration0(duration)?;
        self.duration0 = duration;
        Ok(())
    }

    /// Setzt die zweite Dauer; bei Fehler bleibt der alte Wert
    pub fn set_duration1(&mut self, duration: u16) -> Result<(), RmtError> {
        check_duration1(duration)?;
        self.duration1 = duration;
        Ok(())
    }

    pub fn set_level0(&mut self, level: bool) {
        self.level0 = level;
    }

    pub fn set_level1(&mut self, level: bool) {
        self.level1 = level;
    }

    /// Gesamtlänge beider Segmente in Ticks
    pub const fn total_ticks(&self) -> u32 {
        self.duration0 as u32 + self.duration1 as u32
    }

    /// Ende-Markierung des Receivers (erstes Segment mit Dauer 0)
    pub const fn is_end_marker(&self) -> bool {
        self.duration0 == 0
    }

    /// Packt das Command in das 32-Bit Wort des Peripherals
    ///
    /// Bits 0-14 duration0, Bit 15 level0, Bits 16-30 duration1, Bit 31 level1.
    pub const fn to_word(&self) -> u32 {
        let low = self.duration0 | if self.level0 { LEVEL_BIT } else { 0 };
        let high = self.duration1 | if self.level1 { LEVEL_BIT } else { 0 };
        (low as u32) | ((high as u32) << 16)
    }

    /// Entpackt ein 32-Bit Wort, exakte Umkehrung von [`to_word`](Self::to_word)
    ///
    /// Die 15-Bit Maske hält beide Dauern im gültigen Bereich. Eine Dauer 0
    /// im ersten Segment bleibt erhalten, denn so liefert der Receiver seine
    /// Ende-Markierung.
    pub const fn from_word(word: u32) -> Self {
        let low = word as u16;
        let high = (word >> 16) as u16;
        Self {
            duration0: low & MAX_DURATION,
            level0: low & LEVEL_BIT != 0,
            duration1: high & MAX_DURATION,
            level1: high & LEVEL_BIT != 0,
        }
    }
}

const fn check_duration0(duration: u16) -> Result<(), RmtError> {
    check_duration("duration0", MIN_DURATION0, duration)
}

const fn check_duration1(duration: u16) -> Result<(), RmtError> {
    check_duration("duration1", MIN_DURATION1, duration)
}

const fn check_duration(field: &'static str, min: u16, duration: u16) -> Result<(), RmtError> {
    if duration < min || duration > MAX_DURATION {
        return Err(RmtError::range(field, min as u32, MAX_DURATION as u32));
    }
    Ok(())
}

impl TryFrom<(u16, bool, u16, bool)> for PulseCommand {
    type Error = RmtError;

    fn try_from(
        (duration0, level0, duration1, level1): (u16, bool, u16, bool),
    ) -> Result<Self, Self::Error> {
        Self::new(duration0, level0, duration1, level1)
    }
}

impl From<PulseCommand> for (u16, bool, u16, bool) {
    fn from(cmd: PulseCommand) -> Self {
        (cmd.duration0, cmd.level0, cmd.duration1, cmd.level1)
    }
}
