//! Hardware-Konstanten des ESP32 RMT Peripherals

/// APB Source Clock des RMT-Blocks (Hz)
pub const SOURCE_CLOCK_HZ: u32 = 80_000_000;

/// Anzahl RMT Channels
pub const CHANNEL_COUNT: u8 = 8;

/// Höchster gültiger Channel-Index
pub const MAX_CHANNEL: u8 = CHANNEL_COUNT - 1;

/// Memory Blocks, die sich alle Channels teilen (insgesamt 512 x 32-Bit Worte)
pub const MEMORY_BLOCK_COUNT: u8 = 8;

/// 32-Bit Worte pro Memory Block
pub const WORDS_PER_BLOCK: usize = 64;

/// Größte Dauer eines Pulse-Segments (15 Bit)
pub const MAX_DURATION: u16 = 0x7FFF;

/// Bytes pro kodiertem Pulse Command (ein `rmt_item32_t`)
pub const WORD_SIZE: usize = 4;

// Default-Werte

/// 80 MHz / 80 = 1 MHz = 1 µs Ticks
pub const DEFAULT_CLOCK_DIVIDER: u8 = 80;

pub const DEFAULT_MEMORY_BLOCKS: u8 = 1;

/// Ring Buffer Kapazität in Pulse Commands
pub const DEFAULT_BUFFER_SIZE: usize = 100;

pub const DEFAULT_CARRIER_FREQUENCY_HZ: u32 = 38_000;

pub const DEFAULT_CARRIER_DUTY_PERCENTAGE: u8 = 33;

pub const MAX_LOOP_COUNT: u16 = 1023;

/// 12 ms beim Default-Tick von 1 µs
pub const DEFAULT_IDLE_THRESHOLD: u16 = 12_000;

pub const DEFAULT_FILTER_THRESHOLD: u8 = 100;

pub const DEFAULT_RECEIVE_TIMEOUT_MS: u64 = 1_000;
