//! Abstraktion des nativen Treibers
//!
//! Das RMT Peripheral selbst (Clock, GPIO-Routing, Ring Buffer, Interrupts)
//! wird nur über diesen Trait angesprochen. Ein Channel besitzt einen
//! Treiber und ein [`ChannelHandle`] aus [`RmtDriver::acquire`].
//!
//! # Implementierungen
//! - **Production:** Anbindung an den ESP-IDF RMT-Treiber auf dem Target
//! - **Testing:** `MockDriver` in `rmt-tests` (zeichnet jeden Aufruf auf)

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::time::Duration;

use crate::error::DriverError;
use crate::settings::CarrierTicks;

/// Opakes Handle eines gebundenen Hardware-Channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelHandle(u8);

impl ChannelHandle {
    /// Verpackt die vom Treiber gebundene Channel-Nummer
    pub const fn new(channel: u8) -> Self {
        Self(channel)
    }

    pub const fn channel(&self) -> u8 {
        self.0
    }
}

/// Richtung eines Channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ChannelMode {
    Receive = 0x00,
    Transmit = 0x01,
}

/// Hardware-Zustand eines Channels, wird immer beim Treiber abgefragt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChannelStatus {
    Uninitialized,
    Idle,
    Busy,
}

/// Parameter zum Binden eines Hardware-Channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelRequest {
    pub mode: ChannelMode,
    pub pin: u8,
    /// Fester Channel oder `None` für automatische Wahl
    pub channel: Option<u8>,
    pub memory_blocks: u8,
    /// Ring Buffer Kapazität in Pulse Commands
    pub buffer_size: usize,
}

/// Trait für RMT Hardware-Zugriff
///
/// Alle Buffer an dieser Grenze nutzen das 4-Byte-pro-Command Layout aus
/// [`codec`](crate::codec).
pub trait RmtDriver {
    /// Bindet einen Channel und einen GPIO Pin
    fn acquire(&mut self, request: &ChannelRequest) -> Result<ChannelHandle, DriverError>;

    fn configure_clock(&mut self, handle: ChannelHandle, divider: u8) -> Result<(), DriverError>;

    fn configure_memory_blocks(
        &mut self,
        handle: ChannelHandle,
        count: u8,
    ) -> Result<(), DriverError>;

    fn configure_gpio(
        &mut self,
        handle: ChannelHandle,
        pin: u8,
        invert: bool,
    ) -> Result<(), DriverError>;

    /// Nur Transmit
    fn configure_carrier(
        &mut self,
        handle: ChannelHandle,
        enabled: bool,
        ticks: CarrierTicks,
        level: bool,
    ) -> Result<(), DriverError>;

    /// Nur Transmit
    fn configure_idle_output(
        &mut self,
        handle: ChannelHandle,
        enabled: bool,
        level: bool,
    ) -> Result<(), DriverError>;

    /// Nur Transmit
    fn configure_looping(
        &mut self,
        handle: ChannelHandle,
        enabled: bool,
        loop_count: u16,
    ) -> Result<(), DriverError>;

    /// Nur Receive
    fn configure_idle_threshold(
        &mut self,
        handle: ChannelHandle,
        ticks: u16,
    ) -> Result<(), DriverError>;

    /// Nur Receive
    fn configure_filter(
        &mut self,
        handle: ChannelHandle,
        enabled: bool,
        threshold: u8,
    ) -> Result<(), DriverError>;

    /// Übergibt kodierte Commands; blockiert bis zum Ende, wenn `wait` gesetzt ist
    fn write(
        &mut self,
        handle: ChannelHandle,
        bytes: &[u8],
        wait: bool,
    ) -> Result<(), DriverError>;

    fn start(&mut self, handle: ChannelHandle, clear_buffer: bool) -> Result<(), DriverError>;

    fn stop(&mut self, handle: ChannelHandle) -> Result<(), DriverError>;

    /// Liefert empfangene Bytes, oder einen leeren Buffer nach `timeout`
    fn read_all(
        &mut self,
        handle: ChannelHandle,
        timeout: Duration,
    ) -> Result<Vec<u8>, DriverError>;

    fn query_status(&mut self, handle: ChannelHandle) -> Result<ChannelStatus, DriverError>;

    /// Gibt den Channel frei; genau einmal pro gebundenem Handle
    fn release(&mut self, handle: ChannelHandle);
}

/// Mehrere Channels teilen sich einen Treiber
impl<D: RmtDriver> RmtDriver for Rc<RefCell<D>> {
    fn acquire(&mut self, request: &ChannelRequest) -> Result<ChannelHandle, DriverError> {
        self.borrow_mut().acquire(request)
    }

    fn configure_clock(&mut self, handle: ChannelHandle, divider: u8) -> Result<(), DriverError> {
        self.borrow_mut().configure_clock(handle, divider)
    }

    fn configure_memory_blocks(
        &mut self,
        handle: ChannelHandle,
        count: u8,
    ) -> Result<(), DriverError> {
        self.borrow_mut().configure_memory_blocks(handle, count)
    }

    fn configure_gpio(
        &mut self,
        handle: ChannelHandle,
        pin: u8,
        invert: bool,
    ) -> Result<(), DriverError> {
        self.borrow_mut().configure_gpio(handle, pin, invert)
    }

    fn configure_carrier(
        &mut self,
        handle: ChannelHandle,
        enabled: bool,
        ticks: CarrierTicks,
        level: bool,
    ) -> Result<(), DriverError> {
        self.borrow_mut()
            .configure_carrier(handle, enabled, ticks, level)
    }

    fn configure_idle_output(
        &mut self,
        handle: ChannelHandle,
        enabled: bool,
        level: bool,
    ) -> Result<(), DriverError> {
        self.borrow_mut()
            .configure_idle_output(handle, enabled, level)
    }

    fn configure_looping(
        &mut self,
        handle: ChannelHandle,
        enabled: bool,
        loop_count: u16,
    ) -> Result<(), DriverError> {
        self.borrow_mut()
            .configure_looping(handle, enabled, loop_count)
    }

    fn configure_idle_threshold(
        &mut self,
        handle: ChannelHandle,
        ticks: u16,
    ) -> Result<(), DriverError> {
        self.borrow_mut().configure_idle_threshold(handle, ticks)
    }

    fn configure_filter(
        &mut self,
        handle: ChannelHandle,
        enabled: bool,
        threshold: u8,
    ) -> Result<(), DriverError> {
        self.borrow_mut()
            .configure_filter(handle, enabled, threshold)
    }

    fn write(
        &mut self,
        handle: ChannelHandle,
        bytes: &[u8],
        wait: bool,
    ) -> Result<(), DriverError> {
        self.borrow_mut().write(handle, bytes, wait)
    }

    fn start(&mut self, handle: ChannelHandle, clear_buffer: bool) -> Result<(), DriverError> {
        self.borrow_mut().start(handle, clear_buffer)
    }

    fn stop(&mut self, handle: ChannelHandle) -> Result<(), DriverError> {
        self.borrow_mut().stop(handle)
    }

    fn read_all(
        &mut self,
        handle: ChannelHandle,
        timeout: Duration,
    ) -> Result<Vec<u8>, DriverError> {
        self.borrow_mut().read_all(handle, timeout)
    }

    fn query_status(&mut self, handle: ChannelHandle) -> Result<ChannelStatus, DriverError> {
        self.borrow_mut().query_status(handle)
    }

    fn release(&mut self, handle: ChannelHandle) {
        self.borrow_mut().release(handle);
    }
}
