use icstream::codec::{PacketFramer, SampleDecoder, SampleEncoder};
use icstream::hal::{DeviceProfile, ProfileConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn assert_close(actual: f64, expected: f64, rel: f64) {
    let tolerance = (expected.abs() * rel).max(1e-9);
    assert!(
        (actual - expected).abs() <= tolerance,
        "{} not within {} of {}",
        actual,
        tolerance,
        expected
    );
}

#[test]
fn test_eight_channel_int16_scenario() {
    let profile = DeviceProfile::from_config(&ProfileConfig::default()).unwrap();
    assert_eq!(profile.packet_length(), 18);

    let counts: [i16; 8] = [100, -100, 0, 32767, -32768, 1, -1, 50];
    let mut stream = vec![0xAA, 0x55];
    for c in counts {
        stream.extend_from_slice(&c.to_le_bytes());
    }

    let mut framer = PacketFramer::new(&profile);
    framer.ingest(&stream);
    let packet = framer.try_extract_packet().unwrap();
    let sample = SampleDecoder::new(&profile).decode(&packet).unwrap();

    assert_close(SampleDecoder::new(&profile).scale(), 100.71, 1e-4);
    let expected = [
        10071.0, -10071.0, 0.0, 3299999.9, -3300032.6, 100.71, -100.71, 5035.5,
    ];
    assert_eq!(sample.channels(), 8);
    for (value, want) in sample.values.iter().zip(expected) {
        assert_close(*value, want, 1e-4);
    }
    assert_eq!(sample.device_ticks, None);
}

#[test]
fn test_round_trip_every_encoding() {
    for format in ["int16", "int24", "int32", "float32"] {
        let profile = DeviceProfile::from_config(&ProfileConfig {
            num_channels: 3,
            data_format: format.to_string(),
            has_timestamp: true,
            has_checksum: true,
            ..ProfileConfig::default()
        })
        .unwrap();

        let encoder = SampleEncoder::new(&profile);
        let decoder = SampleDecoder::new(&profile);
        let values = [1234.5, -98765.4, 0.0];

        let sample = decoder.decode_bytes(&encoder.encode(&values, 42)).unwrap();
        assert_eq!(sample.device_ticks, Some(42), "{}", format);
        for (got, want) in sample.values.iter().zip(values) {
            // one count of quantisation for integer formats
            assert!((got - want).abs() <= decoder.scale().max(0.01), "{}: {} vs {}", format, got, want);
        }
    }
}

#[test]
fn test_packet_length_matches_components() {
    let mut rng = StdRng::seed_from_u64(7);
    let formats = [("int16", 2), ("int24", 3), ("int32", 4), ("float32", 4)];

    for _ in 0..200 {
        let channels = rng.gen_range(1..=64);
        let (format, width) = formats[rng.gen_range(0..formats.len())];
        let header_len = rng.gen_range(1..=4);
        let header: Vec<String> = (0..header_len)
            .map(|_| format!("{:02X}", rng.gen::<u8>()))
            .collect();
        let has_timestamp = rng.gen_bool(0.5);
        let has_checksum = rng.gen_bool(0.5);

        let profile = DeviceProfile::from_config(&ProfileConfig {
            num_channels: channels,
            data_format: format.to_string(),
            header_bytes: header.join(" "),
            has_timestamp,
            has_checksum,
            ..ProfileConfig::default()
        })
        .unwrap();

        let expected = header_len
            + if has_timestamp { 4 } else { 0 }
            + channels * width
            + if has_checksum { 1 } else { 0 };
        assert_eq!(profile.packet_length(), expected);
    }
}

#[test]
fn test_truncated_packet_is_an_error() {
    let profile = DeviceProfile::from_config(&ProfileConfig::default()).unwrap();
    let decoder = SampleDecoder::new(&profile);
    assert!(decoder.decode_bytes(&[0xAA, 0x55, 0x01]).is_err());
}
