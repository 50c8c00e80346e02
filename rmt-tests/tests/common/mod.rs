//! Recording mock of the native RMT driver
//!
//! Shared by all integration tests. Every call is appended to `calls`;
//! channel acquisition goes through a real `BlockAllocator`.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use rmt_core::{
    BlockAllocator, CarrierTicks, ChannelHandle, ChannelRequest, ChannelStatus, DriverError,
    PulseCommand, RmtDriver,
};

// ============================================================================
// Recorded calls
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Acquire(ChannelRequest),
    Clock {
        channel: u8,
        divider: u8,
    },
    MemoryBlocks {
        channel: u8,
        count: u8,
    },
    Gpio {
        channel: u8,
        pin: u8,
        invert: bool,
    },
    Carrier {
        channel: u8,
        enabled: bool,
        ticks: CarrierTicks,
        level: bool,
    },
    IdleOutput {
        channel: u8,
        enabled: bool,
        level: bool,
    },
    Looping {
        channel: u8,
        enabled: bool,
        loop_count: u16,
    },
    IdleThreshold {
        channel: u8,
        ticks: u16,
    },
    Filter {
        channel: u8,
        enabled: bool,
        threshold: u8,
    },
    Write {
        channel: u8,
        bytes: Vec<u8>,
        wait: bool,
    },
    Start {
        channel: u8,
        clear: bool,
    },
    Stop {
        channel: u8,
    },
    ReadAll {
        channel: u8,
        timeout: Duration,
    },
    Status {
        channel: u8,
    },
    Release {
        channel: u8,
    },
}

// ============================================================================
// Mock driver
// ============================================================================

#[derive(Debug)]
pub struct MockDriver {
    pub calls: Vec<Call>,
    pub allocator: BlockAllocator,
    /// Next `acquire` fails with this error
    pub fail_acquire: Option<DriverError>,
    /// Next configuration or I/O call fails with this error
    pub fail_next: Option<DriverError>,
    /// Byte buffers handed out by `read_all`, oldest first
    pub rx_queue: VecDeque<Vec<u8>>,
    pub status: ChannelStatus,
    pub release_count: usize,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            allocator: BlockAllocator::new(),
            fail_acquire: None,
            fail_next: None,
            rx_queue: VecDeque::new(),
            status: ChannelStatus::Idle,
            release_count: 0,
        }
    }
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Driver that can be handed to a channel and still be inspected
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Queues one capture for the next `read_all`
    pub fn push_rx(&mut self, commands: &[PulseCommand]) {
        self.rx_queue.push_back(rmt_core::encode(commands));
    }

    /// All bytes passed to `write`, in order
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Write { bytes, .. } => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&mut self, call: Call) -> Result<(), DriverError> {
        self.calls.push(call);
        match self.fail_next.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl RmtDriver for MockDriver {
    fn acquire(&mut self, request: &ChannelRequest) -> Result<ChannelHandle, DriverError> {
        self.calls.push(Call::Acquire(*request));
        if let Some(e) = self.fail_acquire.take() {
            return Err(e);
        }
        let channel = match request.channel {
            Some(channel) => {
                self.allocator.claim(channel, request.memory_blocks)?;
                channel
            }
            None => self.allocator.claim_any(request.memory_blocks)?,
        };
        Ok(ChannelHandle::new(channel))
    }

    fn configure_clock(&mut self, handle: ChannelHandle, divider: u8) -> Result<(), DriverError> {
        self.record(Call::Clock {
            channel: handle.channel(),
            divider,
        })
    }

    fn configure_memory_blocks(
        &mut self,
        handle: ChannelHandle,
        count: u8,
    ) -> Result<(), DriverError> {
        self.record(Call::MemoryBlocks {
            channel: handle.channel(),
            count,
        })?;
        self.allocator.resize(handle.channel(), count)
    }

    fn configure_gpio(
        &mut self,
        handle: ChannelHandle,
        pin: u8,
        invert: bool,
    ) -> Result<(), DriverError> {
        self.record(Call::Gpio {
            channel: handle.channel(),
            pin,
            invert,
        })
    }

    fn configure_carrier(
        &mut self,
        handle: ChannelHandle,
        enabled: bool,
        ticks: CarrierTicks,
        level: bool,
    ) -> Result<(), DriverError> {
        self.record(Call::Carrier {
            channel: handle.channel(),
            enabled,
            ticks,
            level,
        })
    }

    fn configure_idle_output(
        &mut self,
        handle: ChannelHandle,
        enabled: bool,
        level: bool,
    ) -> Result<(), DriverError> {
        self.record(Call::IdleOutput {
            channel: handle.channel(),
            enabled,
            level,
        })
    }

    fn configure_looping(
        &mut self,
        handle: ChannelHandle,
        enabled: bool,
        loop_count: u16,
    ) -> Result<(), DriverError> {
        self.record(Call::Looping {
            channel: handle.channel(),
            enabled,
            loop_count,
        })
    }

    fn configure_idle_threshold(
        &mut self,
        handle: ChannelHandle,
        ticks: u16,
    ) -> Result<(), DriverError> {
        self.record(Call::IdleThreshold {
            channel: handle.channel(),
            ticks,
        })
    }

    fn configure_filter(
        &mut self,
        handle: ChannelHandle,
        enabled: bool,
        threshold: u8,
    ) -> Result<(), DriverError> {
        self.record(Call::Filter {
            channel: handle.channel(),
            enabled,
            threshold,
        })
    }

    fn write(
        &mut self,
        handle: ChannelHandle,
        bytes: &[u8],
        wait: bool,
    ) -> Result<(), DriverError> {
        self.record(Call::Write {
            channel: handle.channel(),
            bytes: bytes.to_vec(),
            wait,
        })
    }

    fn start(&mut self, handle: ChannelHandle, clear_buffer: bool) -> Result<(), DriverError> {
        if clear_buffer {
            self.rx_queue.clear();
        }
        self.record(Call::Start {
            channel: handle.channel(),
            clear: clear_buffer,
        })
    }

    fn stop(&mut self, handle: ChannelHandle) -> Result<(), DriverError> {
        self.record(Call::Stop {
            channel: handle.channel(),
        })
    }

    fn read_all(
        &mut self,
        handle: ChannelHandle,
        timeout: Duration,
    ) -> Result<Vec<u8>, DriverError> {
        self.record(Call::ReadAll {
            channel: handle.channel(),
            timeout,
        })?;
        // Nothing queued behaves like an elapsed timeout
        Ok(self.rx_queue.pop_front().unwrap_or_default())
    }

    fn query_status(&mut self, handle: ChannelHandle) -> Result<ChannelStatus, DriverError> {
        self.record(Call::Status {
            channel: handle.channel(),
        })?;
        Ok(self.status)
    }

    fn release(&mut self, handle: ChannelHandle) {
        self.calls.push(Call::Release {
            channel: handle.channel(),
        });
        self.allocator.release(handle.channel());
        self.release_count += 1;
    }
}

// ============================================================================
// Helpers
// ============================================================================

pub fn cmd(d0: u16, l0: bool, d1: u16, l1: bool) -> PulseCommand {
    PulseCommand::new(d0, l0, d1, l1).unwrap()
}
