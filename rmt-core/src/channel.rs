//! Transmit- und Receive-Channels
//!
//! Ein Channel besitzt seine Settings, einen Treiber und das gebundene
//! Handle. Jeder Setter prüft auf einer Kopie der Settings, programmiert den
//! Treiber neu und übernimmt erst dann die Kopie. Weder ein Range-Fehler
//! noch ein Treiber-Fehler hinterlässt einen halb geänderten Channel.
//!
//! `close` gibt das Handle frei, darf mehrfach aufgerufen werden und läuft
//! auch beim Drop. Danach schlägt jede Operation, die Hardware braucht, mit
//! [`RmtError::Disposed`] fehl.

use alloc::vec::Vec;
use core::time::Duration;

use crate::codec;
use crate::command::PulseCommand;
use crate::consts::WORD_SIZE;
use crate::driver::{ChannelHandle, ChannelMode, ChannelRequest, ChannelStatus, RmtDriver};
use crate::error::{DriverError, RmtError};
use crate::settings::{ChannelSettings, ReceiverChannelSettings, TransmitChannelSettings};

// ============================================================================
// Treiber-Bindung
// ============================================================================

/// Treiber plus gebundenes Handle; gibt das Handle beim Drop frei
struct Binding<D: RmtDriver> {
    driver: D,
    handle: Option<ChannelHandle>,
}

impl<D: RmtDriver> Binding<D> {
    fn acquire(mut driver: D, request: &ChannelRequest) -> Result<Self, RmtError> {
        let handle = driver.acquire(request).map_err(|e| {
            warn!("rmt: no channel for GPIO{}", request.pin);
            RmtError::Allocation(e)
        })?;
        info!(
            "rmt ch{}: acquired on GPIO{}",
            handle.channel(),
            request.pin
        );
        Ok(Self {
            driver,
            handle: Some(handle),
        })
    }

    fn handle(&self) -> Result<ChannelHandle, RmtError> {
        self.handle.ok_or(RmtError::Disposed)
    }

    /// Führt einen Treiber-Aufruf auf dem gebundenen Handle aus
    fn call<T>(
        &mut self,
        f: impl FnOnce(&mut D, ChannelHandle) -> Result<T, DriverError>,
    ) -> Result<T, RmtError> {
        let handle = self.handle()?;
        f(&mut self.driver, handle).map_err(|e| {
            warn!("rmt ch{}: driver call failed", handle.channel());
            RmtError::Driver(e)
        })
    }

    /// Prüft `edit` auf einer Kopie, schreibt sie mit `apply`, übernimmt sie dann
    fn update<S: Clone>(
        &mut self,
        settings: &mut S,
        edit: impl FnOnce(&mut S) -> Result<(), RmtError>,
        apply: impl FnOnce(&mut D, ChannelHandle, &S) -> Result<(), DriverError>,
    ) -> Result<(), RmtError> {
        self.handle()?;
        let mut candidate = settings.clone();
        edit(&mut candidate)?;
        self.call(|driver, handle| apply(driver, handle, &candidate))?;
        *settings = candidate;
        Ok(())
    }

    fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.driver.release(handle);
            info!("rmt ch{}: released", handle.channel());
        }
    }
}

impl<D: RmtDriver> Drop for Binding<D> {
    fn drop(&mut self) {
        self.release();
    }
}

fn request_for(mode: ChannelMode, base: &ChannelSettings) -> ChannelRequest {
    ChannelRequest {
        mode,
        pin: base.pin_number(),
        channel: base.channel(),
        memory_blocks: base.number_of_memory_blocks(),
        buffer_size: base.buffer_size(),
    }
}

// Gemeinsame Treiber-Programmierung

fn apply_clock<D: RmtDriver>(
    driver: &mut D,
    handle: ChannelHandle,
    base: &ChannelSettings,
) -> Result<(), DriverError> {
    debug!(
        "rmt ch{}: clock divider {}",
        handle.channel(),
        base.clock_divider()
    );
    driver.configure_clock(handle, base.clock_divider())
}

fn apply_memory_blocks<D: RmtDriver>(
    driver: &mut D,
    handle: ChannelHandle,
    base: &ChannelSettings,
) -> Result<(), DriverError> {
    debug!(
        "rmt ch{}: {} memory blocks",
        handle.channel(),
        base.number_of_memory_blocks()
    );
    driver.configure_memory_blocks(handle, base.number_of_memory_blocks())
}

fn apply_gpio<D: RmtDriver>(
    driver: &mut D,
    handle: ChannelHandle,
    base: &ChannelSettings,
) -> Result<(), DriverError> {
    debug!(
        "rmt ch{}: GPIO{} inverted={}",
        handle.channel(),
        base.pin_number(),
        base.signal_inverter_enabled()
    );
    driver.configure_gpio(handle, base.pin_number(), base.signal_inverter_enabled())
}

fn apply_base<D: RmtDriver>(
    driver: &mut D,
    handle: ChannelHandle,
    base: &ChannelSettings,
) -> Result<(), DriverError> {
    apply_clock(driver, handle, base)?;
    apply_memory_blocks(driver, handle, base)?;
    apply_gpio(driver, handle, base)
}

// ============================================================================
// Channel Trait
// ============================================================================

/// Operationen, die Transmit- und Receive-Channels teilen
///
/// Getter lesen die eigene Settings-Kopie und funktionieren auch nach
/// `close`. Alles, was den Treiber berührt, liefert dann
/// [`RmtError::Disposed`].
pub trait RmtChannel {
    fn mode(&self) -> ChannelMode;

    /// Gemeinsamer Teil der Channel-Settings
    fn settings(&self) -> &ChannelSettings;

    /// Vom Treiber gebundene Hardware-Channel-Nummer
    fn channel(&self) -> Result<u8, RmtError>;

    fn pin(&self) -> u8 {
        self.settings().pin_number()
    }

    fn clock_divider(&self) -> u8 {
        self.settings().clock_divider()
    }

    fn number_of_memory_blocks(&self) -> u8 {
        self.settings().number_of_memory_blocks()
    }

    fn signal_inverter_enabled(&self) -> bool {
        self.settings().signal_inverter_enabled()
    }

    /// Verlegt den Channel auf einen anderen GPIO
    fn set_pin(&mut self, pin: u8) -> Result<(), RmtError>;

    fn set_clock_divider(&mut self, divider: u8) -> Result<(), RmtError>;

    fn set_number_of_memory_blocks(&mut self, blocks: u8) -> Result<(), RmtError>;

    fn set_signal_inverter_enabled(&mut self, enabled: bool) -> Result<(), RmtError>;

    /// Aktueller Hardware-Zustand, bei jedem Aufruf vom Treiber abgefragt
    fn status(&mut self) -> Result<ChannelStatus, RmtError>;

    fn is_disposed(&self) -> bool;

    /// Gibt den Hardware-Channel frei; mehrfacher Aufruf ist erlaubt
    fn close(&mut self);
}

/// Implementiert den Settings-Teil von [`RmtChannel`]
macro_rules! impl_base_setters {
    () => {
        fn channel(&self) -> Result<u8, RmtError> {
            self.binding.handle().map(|h| h.channel())
        }

        fn set_pin(&mut self, pin: u8) -> Result<(), RmtError> {
            self.binding.update(
                self.settings.base_mut(),
                |s| {
                    s.set_pin_number(pin);
                    Ok(())
                },
                apply_gpio,
            )
        }

        fn set_clock_divider(&mut self, divider: u8) -> Result<(), RmtError> {
            self.binding.update(
                self.settings.base_mut(),
                |s| s.set_clock_divider(divider),
                apply_clock,
            )
        }

        fn set_number_of_memory_blocks(&mut self, blocks: u8) -> Result<(), RmtError> {
            self.binding.update(
                self.settings.base_mut(),
                |s| s.set_number_of_memory_blocks(blocks),
                apply_memory_blocks,
            )
        }

        fn set_signal_inverter_enabled(&mut self, enabled: bool) -> Result<(), RmtError> {
            self.binding.update(
                self.settings.base_mut(),
                |s| {
                    s.set_signal_inverter_enabled(enabled);
                    Ok(())
                },
                apply_gpio,
            )
        }

        fn status(&mut self) -> Result<ChannelStatus, RmtError> {
            self.binding.call(|driver, handle| driver.query_status(handle))
        }

        fn is_disposed(&self) -> bool {
            self.binding.handle.is_none()
        }

        fn close(&mut self) {
            self.binding.release();
        }
    };
}

// ============================================================================
// Transmit channel
// ============================================================================

/// Channel, der eine Liste von Pulse Commands sendet
///
/// # Beispiele
///
/// ```ignore
/// let mut tx = TransmitChannel::new(driver, TransmitChannelSettings::new(18))?;
/// tx.set_carrier_enabled(false)?;
/// tx.add_command(PulseCommand::new(32, true, 18, false)?)?;
/// tx.send(true)?;
/// ```
pub struct TransmitChannel<D: RmtDriver> {
    binding: Binding<D>,
    settings: TransmitChannelSettings,
    commands: Vec<PulseCommand>,
}

impl<D: RmtDriver> TransmitChannel<D> {
    /// Bindet einen Transmit-Channel und programmiert alle Settings
    ///
    /// Schlägt ein Konfigurations-Aufruf fehl, wird das Handle wieder freigegeben.
    pub fn new(driver: D, settings: TransmitChannelSettings) -> Result<Self, RmtError> {
        let mut settings = settings;
        let request = request_for(ChannelMode::Transmit, settings.base());
        let binding = Binding::acquire(driver, &request)?;
        settings.base_mut().bind_channel(binding.handle()?.channel());

        let mut channel = Self {
            binding,
            settings,
            commands: Vec::new(),
        };
        channel.configure()?;
        Ok(channel)
    }

    fn configure(&mut self) -> Result<(), RmtError> {
        let settings = &self.settings;
        self.binding.call(|driver, handle| {
            apply_base(driver, handle, settings.base())?;
            apply_carrier(driver, handle, settings)?;
            apply_idle_output(driver, handle, settings)?;
            apply_looping(driver, handle, settings)
        })
    }

    /// Vollständige Transmit-Settings dieses Channels
    pub fn transmit_settings(&self) -> &TransmitChannelSettings {
        &self.settings
    }

    // ------------------------------------------------------------------------
    // Command-Liste
    // ------------------------------------------------------------------------

    /// Hängt ein Command an die Liste für [`send`](Self::send) an
    pub fn add_command(&mut self, command: PulseCommand) -> Result<(), RmtError> {
        self.binding.handle()?;
        self.commands.push(command);
        Ok(())
    }

    /// Hängt mehrere Commands an
    pub fn extend_commands(
        &mut self,
        commands: impl IntoIterator<Item = PulseCommand>,
    ) -> Result<(), RmtError> {
        self.binding.handle()?;
        self.commands.extend(commands);
        Ok(())
    }

    pub fn commands(&self) -> &[PulseCommand] {
        &self.commands
    }

    pub fn command(&self, index: usize) -> Result<PulseCommand, RmtError> {
        self.commands
            .get(index)
            .copied()
            .ok_or(RmtError::IndexOutOfBounds {
                index,
                len: self.commands.len(),
            })
    }

    /// Ersetzt das Command an `index`
    pub fn set_command(&mut self, index: usize, command: PulseCommand) -> Result<(), RmtError> {
        self.binding.handle()?;
        let len = self.commands.len();
        let slot = self
            .commands
            .get_mut(index)
            .ok_or(RmtError::IndexOutOfBounds { index, len })?;
        *slot = command;
        Ok(())
    }

    /// Leert die Command-Liste; der Treiber bleibt unberührt
    pub fn clear_commands(&mut self) -> Result<(), RmtError> {
        self.binding.handle()?;
        self.commands.clear();
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Senden
    // ------------------------------------------------------------------------

    /// Kodiert die Command-Liste und übergibt sie dem Treiber
    ///
    /// Mit `wait_for_completion` kehrt der Aufruf nach dem Senden zurück.
    /// Ohne darf erst wieder gesendet werden, wenn der Channel
    /// [`ChannelStatus::Idle`] meldet; sonst entscheidet der Treiber.
    pub fn send(&mut self, wait_for_completion: bool) -> Result<(), RmtError> {
        self.binding.handle()?;
        let bytes = codec::encode(&self.commands);
        self.write(&bytes, wait_for_completion)
    }

    /// Übergibt bereits kodierte Bytes an den Treiber
    pub fn send_data(&mut self, data: &[u8], wait_for_completion: bool) -> Result<(), RmtError> {
        self.binding.handle()?;
        if data.len() % WORD_SIZE != 0 {
            return Err(RmtError::Format { len: data.len() });
        }
        self.write(data, wait_for_completion)
    }

    fn write(&mut self, bytes: &[u8], wait: bool) -> Result<(), RmtError> {
        trace!(
            "rmt ch{}: writing {} bytes, wait={}",
            self.settings.base().channel().unwrap_or_default(),
            bytes.len(),
            wait
        );
        self.binding
            .call(|driver, handle| driver.write(handle, bytes, wait))
    }

    // ------------------------------------------------------------------------
    // Carrier, Idle-Ausgang und Loop
    // ------------------------------------------------------------------------

    pub fn set_carrier_enabled(&mut self, enabled: bool) -> Result<(), RmtError> {
        self.binding.update(
            &mut self.settings,
            |s| {
                s.set_carrier_enabled(enabled);
                Ok(())
            },
            apply_carrier,
        )
    }

    pub fn set_carrier_level(&mut self, level: bool) -> Result<(), RmtError> {
        self.binding.update(
            &mut self.settings,
            |s| {
                s.set_carrier_level(level);
                Ok(())
            },
            apply_carrier,
        )
    }

    pub fn set_carrier_frequency(&mut self, frequency: u32) -> Result<(), RmtError> {
        self.binding.update(
            &mut self.settings,
            |s| s.set_carrier_frequency(frequency),
            apply_carrier,
        )
    }

    pub fn set_carrier_duty_percentage(&mut self, duty: u8) -> Result<(), RmtError> {
        self.binding.update(
            &mut self.settings,
            |s| s.set_carrier_duty_percentage(duty),
            apply_carrier,
        )
    }

    pub fn set_idle_output_enabled(&mut self, enabled: bool) -> Result<(), RmtError> {
        self.binding.update(
            &mut self.settings,
            |s| {
                s.set_idle_output_enabled(enabled);
                Ok(())
            },
            apply_idle_output,
        )
    }

    pub fn set_idle_level(&mut self, level: bool) -> Result<(), RmtError> {
        self.binding.update(
            &mut self.settings,
            |s| {
                s.set_idle_level(level);
                Ok(())
            },
            apply_idle_output,
        )
    }

    pub fn set_looping_enabled(&mut self, enabled: bool) -> Result<(), RmtError> {
        self.binding.update(
            &mut self.settings,
            |s| {
                s.set_looping_enabled(enabled);
                Ok(())
            },
            apply_looping,
        )
    }

    pub fn set_loop_count(&mut self, count: u16) -> Result<(), RmtError> {
        self.binding.update(
            &mut self.settings,
            |s| s.set_loop_count(count),
            apply_looping,
        )
    }
}

impl<D: RmtDriver> RmtChannel for TransmitChannel<D> {
    fn mode(&self) -> ChannelMode {
        ChannelMode::Transmit
    }

    fn settings(&self) -> &ChannelSettings {
        self.settings.base()
    }

    impl_base_setters!();
}

fn apply_carrier<D: RmtDriver>(
    driver: &mut D,
    handle: ChannelHandle,
    settings: &TransmitChannelSettings,
) -> Result<(), DriverError> {
    let ticks = settings.carrier_ticks();
    debug!(
        "rmt ch{}: carrier enabled={} high={} low={}",
        handle.channel(),
        settings.carrier_enabled(),
        ticks.high,
        ticks.low
    );
    driver.configure_carrier(
        handle,
        settings.carrier_enabled(),
        ticks,
        settings.carrier_level(),
    )
}

fn apply_idle_output<D: RmtDriver>(
    driver: &mut D,
    handle: ChannelHandle,
    settings: &TransmitChannelSettings,
) -> Result<(), DriverError> {
    driver.configure_idle_output(
        handle,
        settings.idle_output_enabled(),
        settings.idle_level(),
    )
}

fn apply_looping<D: RmtDriver>(
    driver: &mut D,
    handle: ChannelHandle,
    settings: &TransmitChannelSettings,
) -> Result<(), DriverError> {
    driver.configure_looping(handle, settings.looping_enabled(), settings.loop_count())
}

// ============================================================================
// Receive channel
// ============================================================================

/// Channel, der eingehende Pulsfolgen aufzeichnet
pub struct ReceiveChannel<D: RmtDriver> {
    binding: Binding<D>,
    settings: ReceiverChannelSettings,
    receiving: bool,
}

impl<D: RmtDriver> ReceiveChannel<D> {
    /// Bindet einen Receive-Channel und programmiert alle Settings
    ///
    /// Schlägt ein Konfigurations-Aufruf fehl, wird das Handle wieder freigegeben.
    pub fn new(driver: D, settings: ReceiverChannelSettings) -> Result<Self, RmtError> {
        let mut settings = settings;
        let request = request_for(ChannelMode::Receive, settings.base());
        let binding = Binding::acquire(driver, &request)?;
        settings.base_mut().bind_channel(binding.handle()?.channel());

        let mut channel = Self {
            binding,
            settings,
            receiving: false,
        };
        channel.configure()?;
        Ok(channel)
    }

    fn configure(&mut self) -> Result<(), RmtError> {
        let settings = &self.settings;
        self.binding.call(|driver, handle| {
            apply_base(driver, handle, settings.base())?;
            apply_idle_threshold(driver, handle, settings)?;
            apply_filter(driver, handle, settings)
        })
    }

    /// Vollständige Receive-Settings dieses Channels
    pub fn receiver_settings(&self) -> &ReceiverChannelSettings {
        &self.settings
    }

    /// Startet die Aufzeichnung, leert optional den Ring Buffer
    pub fn start(&mut self, clear_buffer: bool) -> Result<(), RmtError> {
        self.binding
            .call(|driver, handle| driver.start(handle, clear_buffer))?;
        self.receiving = true;
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), RmtError> {
        self.binding.call(|driver, handle| driver.stop(handle))?;
        self.receiving = false;
        Ok(())
    }

    /// Ob [`start`](Self::start) ohne folgendes `stop` aufgerufen wurde
    pub fn is_receiving(&self) -> bool {
        self.receiving
    }

    /// Wartet bis zum Receive-Timeout und dekodiert die Aufzeichnung
    ///
    /// Kommt nichts rechtzeitig an, ist die Liste leer. Die Ende-Markierung
    /// des Receivers bleibt als letztes Command erhalten
    /// ([`PulseCommand::is_end_marker`]).
    pub fn get_all_items(&mut self) -> Result<Vec<PulseCommand>, RmtError> {
        let timeout = self.settings.receive_timeout();
        let bytes = self
            .binding
            .call(|driver, handle| driver.read_all(handle, timeout))?;
        trace!("rmt: received {} bytes", bytes.len());
        codec::decode(&bytes)
    }

    pub fn set_idle_threshold(&mut self, ticks: u16) -> Result<(), RmtError> {
        self.binding.update(
            &mut self.settings,
            |s| s.set_idle_threshold(ticks),
            apply_idle_threshold,
        )
    }

    pub fn set_filter_enabled(&mut self, enabled: bool) -> Result<(), RmtError> {
        self.binding.update(
            &mut self.settings,
            |s| {
                s.set_filter_enabled(enabled);
                Ok(())
            },
            apply_filter,
        )
    }

    pub fn set_filter_threshold(&mut self, ticks: u8) -> Result<(), RmtError> {
        self.binding.update(
            &mut self.settings,
            |s| {
                s.set_filter_threshold(ticks);
                Ok(())
            },
            apply_filter,
        )
    }

    /// Timeout für [`get_all_items`](Self::get_all_items); keine Treiber-Einstellung
    pub fn set_receive_timeout(&mut self, timeout: Duration) -> Result<(), RmtError> {
        self.binding.handle()?;
        self.settings.set_receive_timeout(timeout);
        Ok(())
    }
}

impl<D: RmtDriver> RmtChannel for ReceiveChannel<D> {
    fn mode(&self) -> ChannelMode {
        ChannelMode::Receive
    }

    fn settings(&self) -> &ChannelSettings {
        self.settings.base()
    }

    impl_base_setters!();
}

fn apply_idle_threshold<D: RmtDriver>(
    driver: &mut D,
    handle: ChannelHandle,
    settings: &ReceiverChannelSettings,
) -> Result<(), DriverError> {
    debug!(
        "rmt ch{}: idle threshold {}",
        handle.channel(),
        settings.idle_threshold()
    );
    driver.configure_idle_threshold(handle, settings.idle_threshold())
}

fn apply_filter<D: RmtDriver>(
    driver: &mut D,
    handle: ChannelHandle,
    settings: &ReceiverChannelSettings,
) -> Result<(), DriverError> {
    driver.configure_filter(
        handle,
        settings.filter_enabled(),
        settings.filter_threshold(),
    )
}
