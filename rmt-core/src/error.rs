//! Fehler-Typen
//!
//! `RmtError` liefert jede fehlbare Operation dieser Crate,
//! `DriverError` meldet ein [`RmtDriver`](crate::RmtDriver).

use thiserror::Error;

/// Fehler des nativen RMT-Treibers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError {
    /// Channel (oder GPIO) ist bereits belegt
    #[error("channel unavailable")]
    ChannelUnavailable,
    /// Memory Blocks oder Ring Buffer konnten nicht belegt werden
    #[error("out of memory")]
    NoMemory,
    /// Treiber lehnt einen Parameter ab
    #[error("invalid argument")]
    InvalidArgument,
    /// Channel sendet noch
    #[error("channel busy")]
    Busy,
    /// Sonstiger Hardware-Fehler
    #[error("driver failure")]
    Failed,
}

/// Fehler-Typ für RMT-Operationen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RmtError {
    /// Wert außerhalb von `min..=max`
    #[error("{field} out of range ({min}..={max})")]
    Range {
        field: &'static str,
        min: u32,
        max: u32,
    },
    /// Byte-Buffer, dessen Länge kein Vielfaches von 4 ist
    #[error("buffer length {len} is not a multiple of 4")]
    Format { len: usize },
    /// Ausgabe-Buffer zu klein für die kodierten Commands
    #[error("output buffer too small: {needed} bytes needed, {len} available")]
    BufferTooSmall { needed: usize, len: usize },
    /// Treiber konnte keinen Channel oder GPIO binden
    #[error("channel allocation failed: {0}")]
    Allocation(DriverError),
    /// Channel wurde bereits freigegeben
    #[error("channel disposed")]
    Disposed,
    /// Treiber-Aufruf nach dem Binden fehlgeschlagen
    #[error("driver error: {0}")]
    Driver(DriverError),
    /// Index hinter dem Ende der Command-Liste
    #[error("index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },
}

impl RmtError {
    pub(crate) const fn range(field: &'static str, min: u32, max: u32) -> Self {
        Self::Range { field, min, max }
    }
}

impl From<DriverError> for RmtError {
    fn from(err: DriverError) -> Self {
        Self::Driver(err)
    }
}
