//! Command Buffer Encoder/Decoder
//!
//! Übersetzt Pulse Commands in das native `rmt_item32_t` Layout des
//! Peripherals und zurück: ein Little-Endian 32-Bit Wort pro Command, das
//! zweimal `duration (15 Bit) | level (1 Bit)` packt.
//!
//! ```text
//! byte[0] = duration0 & 0xFF
//! byte[1] = (duration0 >> 8) | (level0 ? 0x80 : 0x00)
//! byte[2] = duration1 & 0xFF
//! byte[3] = (duration1 >> 8) | (level1 ? 0x80 : 0x00)
//! ```
//!
//! Die Dauern werden schon beim Erstellen eines [`PulseCommand`] geprüft,
//! deshalb schlägt das Kodieren nie fehl.

use alloc::vec::Vec;

use crate::command::PulseCommand;
use crate::consts::WORD_SIZE;
use crate::error::RmtError;

/// Anzahl Bytes für `count` Commands
pub const fn encoded_len(count: usize) -> usize {
    count * WORD_SIZE
}

/// Kodiert Commands in einen neuen Buffer mit genau `4 * commands.len()` Bytes
///
/// # Beispiele
///
/// ```
/// # use rmt_core::{PulseCommand, encode};
/// let cmd = PulseCommand::new(500, false, 520, false).unwrap();
/// assert_eq!(encode(&[cmd]), [244, 1, 8, 2]);
/// ```
pub fn encode(commands: &[PulseCommand]) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(encoded_len(commands.len()));
    for cmd in commands {
        buffer.extend_from_slice(&cmd.to_word().to_le_bytes());
    }
    buffer
}

/// Kodiert Commands in einen Buffer des Aufrufers
///
/// Gibt die Anzahl geschriebener Bytes zurück. Ist `out` kürzer als
/// [`encoded_len`], kommt [`RmtError::BufferTooSmall`] und `out` bleibt
/// unverändert.
pub fn encode_into(commands: &[PulseCommand], out: &mut [u8]) -> Result<usize, RmtError> {
    let needed = encoded_len(commands.len());
    if out.len() < needed {
        return Err(RmtError::BufferTooSmall {
            needed,
            len: out.len(),
        });
    }

    for (cmd, chunk) in commands.iter().zip(out.chunks_exact_mut(WORD_SIZE)) {
        chunk.copy_from_slice(&cmd.to_word().to_le_bytes());
    }
    Ok(needed)
}

/// Dekodiert einen Byte-Buffer zurück in Commands
///
/// Exakte Umkehrung von [`encode`]. Einziger Fehler ist
/// [`RmtError::Format`] bei einer Länge, die kein Vielfaches von 4 ist.
/// Die Ende-Markierung des Receivers (erste Dauer 0) wird als
/// normales Command zurückgegeben.
pub fn decode(bytes: &[u8]) -> Result<Vec<PulseCommand>, RmtError> {
    if bytes.len() % WORD_SIZE != 0 {
        return Err(RmtError::Format { len: bytes.len() });
    }

    Ok(bytes
        .chunks_exact(WORD_SIZE)
        .map(|chunk| {
            let word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            PulseCommand::from_word(word)
        })
        .collect())
}
