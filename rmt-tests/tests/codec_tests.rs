//! Integration tests for the command buffer codec
//!
//! Run on the host (x86_64) against the LED waveform fixtures

mod common;

use common::cmd;
use rmt_core::{LedTiming, PulseCommand, RmtError, decode, encode, encode_into, encoded_len};

// ============================================================================
// Fixtures
// ============================================================================

/// one, zero and reset commands of all five presets
fn led_fixture() -> Vec<PulseCommand> {
    [
        LedTiming::SK6812,
        LedTiming::WS2808,
        LedTiming::WS2812B,
        LedTiming::WS2812C,
        LedTiming::WS2815B,
    ]
    .iter()
    .flat_map(|t| [t.one, t.zero, t.reset])
    .collect()
}

#[rustfmt::skip]
const LED_FIXTURE_BYTES: [u8; 60] = [
    14, 128, 12, 0,    7, 128, 16, 0,    244, 1, 8, 2,
    52, 128, 52, 0,    14, 128, 52, 0,   120, 5, 120, 5,
    32, 128, 18, 0,    16, 128, 34, 0,   208, 7, 208, 7,
    52, 128, 52, 0,    14, 128, 52, 0,   120, 5, 120, 5,
    52, 128, 52, 0,    14, 128, 52, 0,   120, 5, 120, 5,
];

// ============================================================================
// Tests: encode()
// ============================================================================

#[test]
fn test_led_fixture_serializes_to_60_bytes() {
    let commands = led_fixture();
    assert_eq!(commands.len(), 15);

    let bytes = encode(&commands);
    assert_eq!(bytes.len(), 60);
    assert_eq!(bytes, LED_FIXTURE_BYTES);
}

#[test]
fn test_fixture_values_match_literal_commands() {
    let literal = vec![
        cmd(14, true, 12, false),
        cmd(7, true, 16, false),
        cmd(500, false, 520, false),
        cmd(52, true, 52, false),
        cmd(14, true, 52, false),
        cmd(1400, false, 1400, false),
        cmd(32, true, 18, false),
        cmd(16, true, 34, false),
        cmd(2000, false, 2000, false),
    ];
    assert_eq!(led_fixture()[..9], literal[..]);
}

#[test]
fn test_output_length_is_four_per_command() {
    for n in [0usize, 1, 2, 15, 64, 512] {
        let commands = vec![cmd(1, true, 0, false); n];
        assert_eq!(encode(&commands).len(), 4 * n);
        assert_eq!(encoded_len(n), 4 * n);
    }
}

#[test]
fn test_bytes_follow_layout() {
    let commands = [
        cmd(0x7FFF, true, 0x7FFF, true),
        cmd(0x0100, false, 0x00FF, true),
        cmd(1, false, 0, false),
    ];
    let bytes = encode(&commands);

    for (i, c) in commands.iter().enumerate() {
        let word = &bytes[4 * i..4 * i + 4];
        assert_eq!(word[0], (c.duration0() & 0xFF) as u8);
        assert_eq!(word[1] & 0x7F, (c.duration0() >> 8) as u8);
        assert_eq!(word[1] & 0x80 != 0, c.level0());
        assert_eq!(word[2], (c.duration1() & 0xFF) as u8);
        assert_eq!(word[3] & 0x7F, (c.duration1() >> 8) as u8);
        assert_eq!(word[3] & 0x80 != 0, c.level1());
    }
}

#[test]
fn test_max_duration_with_level() {
    assert_eq!(encode(&[cmd(32_767, true, 32_767, false)]), [255, 255, 255, 127]);
}

#[test]
fn test_encode_into_matches_encode() {
    let commands = led_fixture();
    let mut out = [0u8; 64];
    let written = encode_into(&commands, &mut out).unwrap();
    assert_eq!(written, 60);
    assert_eq!(out[..60], LED_FIXTURE_BYTES);
    assert_eq!(out[60..], [0, 0, 0, 0]);
}

// ============================================================================
// Tests: decode()
// ============================================================================

#[test]
fn test_decode_led_fixture() {
    assert_eq!(decode(&LED_FIXTURE_BYTES), Ok(led_fixture()));
}

#[test]
fn test_roundtrip_preserves_order_and_values() {
    let commands: Vec<_> = (1..=200u16)
        .map(|i| cmd(i * 100, i % 2 == 0, i * 3, i % 3 == 0))
        .collect();
    assert_eq!(decode(&encode(&commands)), Ok(commands));
}

#[test]
fn test_decode_rejects_lengths_not_multiple_of_four() {
    for len in [1usize, 2, 3, 5, 59, 61] {
        let bytes = vec![1u8; len];
        assert_eq!(decode(&bytes), Err(RmtError::Format { len }));
    }
}

#[test]
fn test_decode_empty() {
    assert_eq!(decode(&[]), Ok(Vec::new()));
}

#[test]
fn test_decode_then_encode_is_identity() {
    // Raw receiver words, including zero-length segments
    #[rustfmt::skip]
    let bytes = [
        0, 0, 0, 0,
        0, 128, 0, 128,
        14, 128, 12, 0,
        255, 255, 255, 255,
        7, 0, 0, 0,
    ];
    let commands = decode(&bytes).unwrap();
    assert_eq!(commands.len(), 5);
    assert_eq!(encode(&commands), bytes);
}
