use pmic_client::RegisterSnapshot;

fn raw_with(f: impl FnOnce(&mut [u8; 32])) -> [u8; 32] {
    let mut raw = [0u8; 32];
    f(&mut raw);
    raw
}

#[test]
fn empty_map_decodes_to_zeroes() {
    let snapshot = RegisterSnapshot::from_raw(&[0u8; 32]);
    assert_eq!(snapshot.millis, 0);
    assert_eq!(snapshot.adc_sample, 0);
    assert_eq!(snapshot.vbat, 0.0);
    assert_eq!(snapshot.in_state, 0);
    assert_eq!(snapshot.device_id, [0u8; 12]);
}

#[test]
fn multi_byte_fields_are_little_endian() {
    let raw = raw_with(|r| {
        r[4] = 0x01;
        r[5] = 0x02;
        r[6] = 0x03;
        r[7] = 0x04;
        r[12] = 0x30;
        r[13] = 0x02;
    });
    let snapshot = RegisterSnapshot::from_raw(&raw);
    assert_eq!(snapshot.millis, 0x0403_0201);
    assert_eq!(snapshot.adc_sample, 0x0230);
}

#[test]
fn trigger_byte_is_exposed_raw() {
    let raw = raw_with(|r| r[11] = 0x5A);
    let snapshot = RegisterSnapshot::from_raw(&raw);
    assert_eq!(snapshot.led_color.trigger, 0x5A);
}

#[test]
fn vbat_is_derived_from_the_sample() {
    let raw = raw_with(|r| {
        r[12..14].copy_from_slice(&1024u16.to_le_bytes());
    });
    let snapshot = RegisterSnapshot::from_raw(&raw);
    assert!((snapshot.vbat - 6.6).abs() < 1e-6);
}

#[cfg(feature = "serde")]
#[test]
fn snapshot_serializes_with_wire_field_names() {
    let raw = raw_with(|r| {
        r[4] = 10;
        r[12] = 0x30;
        r[13] = 0x02;
        r[14] = 0x09;
    });
    let snapshot = RegisterSnapshot::from_raw(&raw);
    let json = serde_json::to_value(snapshot).unwrap();
    assert_eq!(json["tm"], 10);
    assert_eq!(json["adc_val"], 560);
    assert_eq!(json["in_state"], 9);
    assert!(json["led_color"].is_object());
}
