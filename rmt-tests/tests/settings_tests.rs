//! Integration tests for channel settings validation

use std::time::Duration;

use rmt_core::{
    CarrierTicks, ChannelSettings, ReceiverChannelSettings, RmtError, TransmitChannelSettings,
};

// ============================================================================
// Tests: ChannelSettings
// ============================================================================

#[test]
fn test_channel_index_range() {
    let mut settings = ChannelSettings::new(5);
    for channel in 0..=7 {
        assert!(settings.set_channel(channel).is_ok());
        assert_eq!(settings.channel(), Some(channel));
    }

    assert!(matches!(
        settings.set_channel(8),
        Err(RmtError::Range { field: "channel", .. })
    ));
    assert_eq!(settings.channel(), Some(7));

    settings.set_auto_channel();
    assert_eq!(settings.channel(), None);
}

#[test]
fn test_clock_divider_rejects_zero() {
    let mut settings = ChannelSettings::new(5);
    assert_eq!(
        settings.set_clock_divider(0),
        Err(RmtError::Range {
            field: "clock_divider",
            min: 1,
            max: 255
        })
    );
    assert_eq!(settings.clock_divider(), 80);

    settings.set_clock_divider(1).unwrap();
    settings.set_clock_divider(255).unwrap();
    assert_eq!(settings.clock_divider(), 255);
}

#[test]
fn test_memory_blocks_range() {
    let mut settings = ChannelSettings::new(5);
    assert!(settings.set_number_of_memory_blocks(0).is_err());
    assert!(settings.set_number_of_memory_blocks(9).is_err());
    assert_eq!(settings.number_of_memory_blocks(), 1);

    settings.set_number_of_memory_blocks(8).unwrap();
    assert_eq!(settings.number_of_memory_blocks(), 8);

    // Only channel 0 has room for eight blocks
    assert!(settings.set_channel(1).is_err());
    settings.set_channel(0).unwrap();
}

#[test]
fn test_memory_blocks_limited_by_fixed_channel() {
    let mut settings = ChannelSettings::with_channel(5, 12).unwrap();
    settings.set_number_of_memory_blocks(3).unwrap();
    assert_eq!(
        settings.set_number_of_memory_blocks(4),
        Err(RmtError::Range {
            field: "number_of_memory_blocks",
            min: 1,
            max: 3
        })
    );
    assert_eq!(settings.number_of_memory_blocks(), 3);
}

#[test]
fn test_buffer_size_must_be_positive() {
    let mut settings = ChannelSettings::new(5);
    assert!(settings.set_buffer_size(0).is_err());
    assert_eq!(settings.buffer_size(), 100);
    settings.set_buffer_size(1).unwrap();
    assert_eq!(settings.buffer_size(), 1);
}

#[test]
fn test_pin_and_inverter() {
    let mut settings = ChannelSettings::new(5);
    settings.set_pin_number(33);
    settings.set_signal_inverter_enabled(true);
    assert_eq!(settings.pin_number(), 33);
    assert!(settings.signal_inverter_enabled());
}

#[test]
fn test_clone_is_independent() {
    let mut original = TransmitChannelSettings::new(5);
    let copy = original.clone();

    original.base_mut().set_clock_divider(2).unwrap();
    original.set_carrier_enabled(false);

    assert_eq!(copy.base().clock_divider(), 80);
    assert!(copy.carrier_enabled());
    assert_ne!(original, copy);
}

// ============================================================================
// Tests: TransmitChannelSettings
// ============================================================================

#[test]
fn test_transmit_defaults() {
    let settings = TransmitChannelSettings::new(18);
    assert!(settings.carrier_enabled());
    assert!(settings.carrier_level());
    assert_eq!(settings.carrier_frequency(), 38_000);
    assert_eq!(settings.carrier_duty_percentage(), 33);
    assert!(!settings.looping_enabled());
    assert_eq!(settings.loop_count(), 1);
    assert!(settings.idle_output_enabled());
    assert!(!settings.idle_level());
    assert_eq!(settings.base().channel(), None);
}

#[test]
fn test_transmit_ranges() {
    let mut settings = TransmitChannelSettings::new(18);
    assert!(settings.set_carrier_frequency(0).is_err());
    assert!(settings.set_carrier_duty_percentage(0).is_err());
    assert!(settings.set_carrier_duty_percentage(101).is_err());
    assert!(settings.set_loop_count(0).is_err());
    assert!(settings.set_loop_count(1024).is_err());

    settings.set_carrier_duty_percentage(100).unwrap();
    settings.set_loop_count(1023).unwrap();
    assert_eq!(settings.carrier_duty_percentage(), 100);
    assert_eq!(settings.loop_count(), 1023);
    assert_eq!(settings.carrier_frequency(), 38_000);
}

#[test]
fn test_carrier_ticks_follow_frequency_and_duty() {
    let mut settings = TransmitChannelSettings::new(18);
    settings.set_carrier_frequency(40_000).unwrap();
    settings.set_carrier_duty_percentage(50).unwrap();
    // 80 MHz / 40 kHz = 2000 ticks
    assert_eq!(
        settings.carrier_ticks(),
        CarrierTicks {
            high: 1000,
            low: 1000
        }
    );
}

#[test]
fn test_transmit_with_fixed_channel() {
    let settings = TransmitChannelSettings::with_channel(3, 18).unwrap();
    assert_eq!(settings.base().channel(), Some(3));
    assert!(TransmitChannelSettings::with_channel(8, 18).is_err());
}

// ============================================================================
// Tests: ReceiverChannelSettings
// ============================================================================

#[test]
fn test_receive_defaults() {
    let settings = ReceiverChannelSettings::new(4);
    assert_eq!(settings.idle_threshold(), 12_000);
    assert!(settings.filter_enabled());
    assert_eq!(settings.filter_threshold(), 100);
    assert_eq!(settings.receive_timeout(), Duration::from_secs(1));
}

#[test]
fn test_idle_threshold_range() {
    let mut settings = ReceiverChannelSettings::new(4);
    assert!(matches!(
        settings.set_idle_threshold(0),
        Err(RmtError::Range {
            field: "idle_threshold",
            ..
        })
    ));
    assert_eq!(settings.idle_threshold(), 12_000);

    settings.set_idle_threshold(1).unwrap();
    assert_eq!(settings.idle_threshold(), 1);
    settings.set_idle_threshold(65_535).unwrap();
    assert_eq!(settings.idle_threshold(), 65_535);
}

#[test]
fn test_receive_timeout_and_filter() {
    let mut settings = ReceiverChannelSettings::new(4);
    settings.set_receive_timeout(Duration::from_millis(250));
    settings.set_filter_enabled(false);
    settings.set_filter_threshold(0);
    assert_eq!(settings.receive_timeout(), Duration::from_millis(250));
    assert!(!settings.filter_enabled());
    assert_eq!(settings.filter_threshold(), 0);
}
