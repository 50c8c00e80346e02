//! Verwaltung des gemeinsamen Channel-Speichers
//!
//! Die 8 Channels teilen sich ein 512 x 32-Bit RAM in 8 Blocks. Channel `n`
//! besitzt standardmäßig Block `n`; belegt er `k` Blocks, sind das die
//! Blocks `n..n + k`, also geliehen von den folgenden Channels. Channel 0
//! kann deshalb bis zu 8 Blocks belegen, Channel 7 nur einen.

use crate::consts::{MAX_CHANNEL, MEMORY_BLOCK_COUNT};
use crate::error::{DriverError, RmtError};

/// Maximale Block-Anzahl für `channel`
pub const fn max_blocks_for(channel: u8) -> u8 {
    if channel >= MEMORY_BLOCK_COUNT {
        0
    } else {
        MEMORY_BLOCK_COUNT - channel
    }
}

/// Prüft `blocks` gegen die Channel-unabhängige Grenze `1..=8`
pub(crate) const fn check_block_count(blocks: u8) -> Result<(), RmtError> {
    if blocks < 1 || blocks > MEMORY_BLOCK_COUNT {
        return Err(RmtError::range(
            "number_of_memory_blocks",
            1,
            MEMORY_BLOCK_COUNT as u32,
        ));
    }
    Ok(())
}

/// Prüft, ob hinter `channel` Platz für `blocks` ist
pub(crate) const fn check_blocks_for_channel(channel: u8, blocks: u8) -> Result<(), RmtError> {
    if let Err(e) = check_block_count(blocks) {
        return Err(e);
    }
    if blocks > max_blocks_for(channel) {
        return Err(RmtError::range(
            "number_of_memory_blocks",
            1,
            max_blocks_for(channel) as u32,
        ));
    }
    Ok(())
}

/// Merkt sich, welcher Channel welche Memory Blocks belegt
///
/// Treiber nutzen das für `acquire` und die automatische Channel-Wahl.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockAllocator {
    /// Belegte Blocks pro Channel, 0 = Channel frei
    claims: [u8; MEMORY_BLOCK_COUNT as usize],
}

impl BlockAllocator {
    pub const fn new() -> Self {
        Self {
            claims: [0; MEMORY_BLOCK_COUNT as usize],
        }
    }

    /// Belegt `blocks` ab `channel`
    pub fn claim(&mut self, channel: u8, blocks: u8) -> Result<(), DriverError> {
        if channel > MAX_CHANNEL || check_blocks_for_channel(channel, blocks).is_err() {
            return Err(DriverError::InvalidArgument);
        }
        if !self.is_range_free(channel, blocks, None) {
            return Err(DriverError::ChannelUnavailable);
        }
        self.claims[channel as usize] = blocks;
        Ok(())
    }

    /// Belegt `blocks` auf dem niedrigsten Channel mit genug Platz
    pub fn claim_any(&mut self, blocks: u8) -> Result<u8, DriverError> {
        check_block_count(blocks).map_err(|_| DriverError::InvalidArgument)?;
        let channel = (0..=MAX_CHANNEL)
            .find(|&ch| blocks <= max_blocks_for(ch) && self.is_range_free(ch, blocks, None))
            .ok_or(DriverError::ChannelUnavailable)?;
        self.claims[channel as usize] = blocks;
        Ok(channel)
    }

    /// Ändert die Block-Anzahl eines belegten Channels
    pub fn resize(&mut self, channel: u8, blocks: u8) -> Result<(), DriverError> {
        if channel > MAX_CHANNEL || check_blocks_for_channel(channel, blocks).is_err() {
            return Err(DriverError::InvalidArgument);
        }
        if self.claims[channel as usize] == 0 {
            return Err(DriverError::InvalidArgument);
        }
        if !self.is_range_free(channel, blocks, Some(channel)) {
            return Err(DriverError::NoMemory);
        }
        self.claims[channel as usize] = blocks;
        Ok(())
    }

    /// Gibt `channel` frei; ein freier Channel bleibt unverändert
    pub fn release(&mut self, channel: u8) {
        if let Some(claim) = self.claims.get_mut(channel as usize) {
            *claim = 0;
        }
    }

    /// Von `channel` belegte Blocks (0 wenn frei)
    pub fn claimed(&self, channel: u8) -> u8 {
        self.claims.get(channel as usize).copied().unwrap_or(0)
    }

    /// Summe aller belegten Blocks
    pub fn used_blocks(&self) -> u8 {
        self.claims.iter().sum()
    }

    fn owner_of(&self, block: u8, ignore: Option<u8>) -> Option<u8> {
        (0..=block).rev().find(|&ch| {
            Some(ch) != ignore && ch + self.claims[ch as usize] > block
        })
    }

    fn is_range_free(&self, channel: u8, blocks: u8, ignore: Option<u8>) -> bool {
        (channel..channel + blocks).all(|block| self.owner_of(block, ignore).is_none())
    }
}
