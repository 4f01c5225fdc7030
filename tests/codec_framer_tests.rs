use icstream::codec::{PacketFramer, SampleEncoder};
use icstream::hal::{DeviceProfile, ProfileConfig};

fn profile(has_checksum: bool) -> DeviceProfile {
    DeviceProfile::from_config(&ProfileConfig {
        num_channels: 4,
        has_checksum,
        ..ProfileConfig::default()
    })
    .unwrap()
}

fn packet(profile: &DeviceProfile, values: &[f64]) -> Vec<u8> {
    SampleEncoder::new(profile).encode(values, 0)
}

#[test]
fn test_garbage_prefix_is_discarded_exactly() {
    let profile = profile(false);
    let clean = packet(&profile, &[1000.0, -1000.0, 0.0, 5.0]);

    let garbage = [0x00, 0x13, 0xAA, 0x37, 0x55, 0xFE];
    let mut stream = garbage.to_vec();
    stream.extend_from_slice(&clean);

    let mut framer = PacketFramer::new(&profile);
    framer.ingest(&stream);

    let extracted = framer.try_extract_packet().unwrap();
    assert_eq!(extracted.as_bytes(), clean.as_slice());
    assert_eq!(framer.stats().bytes_discarded, garbage.len() as u64);
    assert!(framer.try_extract_packet().is_none());
}

#[test]
fn test_partial_packet_waits_for_more_bytes() {
    let profile = profile(false);
    let clean = packet(&profile, &[1.0, 2.0, 3.0, 4.0]);
    let mut framer = PacketFramer::new(&profile);

    // header plus one byte short of a packet
    framer.ingest(&clean[..clean.len() - 1]);
    assert!(framer.try_extract_packet().is_none());
    assert!(framer.try_extract_packet().is_none());

    framer.ingest(&clean[clean.len() - 1..]);
    assert_eq!(framer.try_extract_packet().unwrap().as_bytes(), clean.as_slice());
    assert!(framer.try_extract_packet().is_none());
    assert_eq!(framer.stats().packets_extracted, 1);
}

#[test]
fn test_byte_at_a_time_delivery() {
    let profile = profile(true);
    let mut stream = packet(&profile, &[10.0, 20.0, 30.0, 40.0]);
    stream.extend(packet(&profile, &[-10.0, -20.0, -30.0, -40.0]));

    let mut framer = PacketFramer::new(&profile);
    let mut packets = Vec::new();
    for byte in stream {
        framer.ingest(&[byte]);
        packets.extend(framer.drain_packets());
    }
    assert_eq!(packets.len(), 2);
    assert_eq!(framer.stats().checksum_failures, 0);
}

#[test]
fn test_corrupted_payload_rejected_once() {
    let profile = profile(true);
    let good = packet(&profile, &[100.0, 200.0, 300.0, 400.0]);
    let mut bad = good.clone();
    bad[3] ^= 0x40;

    let mut framer = PacketFramer::new(&profile);
    framer.ingest(&bad);
    assert!(framer.try_extract_packet().is_none());
    assert_eq!(framer.stats().checksum_failures, 1);
    assert_eq!(framer.stats().packets_extracted, 0);

    framer.ingest(&good);
    assert_eq!(framer.try_extract_packet().unwrap().as_bytes(), good.as_slice());
    assert_eq!(framer.stats().checksum_failures, 1);
}

#[test]
fn test_noise_without_header_stays_bounded() {
    let profile = profile(false);
    let mut framer = PacketFramer::new(&profile);

    for _ in 0..100 {
        framer.ingest(&[0x01; 64]);
        assert!(framer.try_extract_packet().is_none());
    }
    assert!(framer.buffered() < profile.header().len());
    assert_eq!(framer.stats().bytes_discarded, 6400 - framer.buffered() as u64);
}
