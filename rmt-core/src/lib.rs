//! RMT Core - Platform-agnostic Pulse-Train Modell
//!
//! Diese Crate enthält KEINE Hardware-Dependencies.
//! Sie modelliert das ESP32 RMT Peripheral von der Software-Seite: Pulse
//! Commands, ihr 4-Byte Wire-Format, validierte Channel-Settings und
//! Transmit/Receive Channels über einem [`RmtDriver`].

#![no_std]

extern crate alloc;

#[macro_use]
mod fmt;

pub mod channel;
pub mod codec;
pub mod command;
pub mod consts;
pub mod driver;
pub mod error;
pub mod led;
pub mod memory;
pub mod settings;

// Re-exports für einfachen Zugriff
pub use channel::{ReceiveChannel, RmtChannel, TransmitChannel};
pub use codec::{decode, encode, encode_into, encoded_len};
pub use command::PulseCommand;
pub use driver::{ChannelHandle, ChannelMode, ChannelRequest, ChannelStatus, RmtDriver};
pub use error::{DriverError, RmtError};
pub use led::{ColorOrder, LedStrip, LedTiming, SmartLedWriter};
pub use memory::BlockAllocator;
pub use settings::{
    CarrierTicks, ChannelSettings, ReceiverChannelSettings, TransmitChannelSettings,
};
