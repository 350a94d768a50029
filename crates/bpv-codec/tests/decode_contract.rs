//! A realistic multi-channel codec run end to end through the sandbox.

use bpv_codec::{CodecSandbox, SandboxConfig, SandboxError, UplinkInput};
use bpv_core::parse_hex_payload;
use serde_json::json;

const ROOM_SENSOR_CODEC: &str = r#"
function u32(b, i) {
  return ((b[i] << 24) | (b[i + 1] << 16) | (b[i + 2] << 8) | b[i + 3]) >>> 0;
}

function decodeUplink(input) {
  var b = input.bytes;
  if (input.fPort !== 10 || b[0] !== 0x04) {
    throw new Error("unsupported uplink on port " + input.fPort);
  }
  return [
    { name: "Temperature", channel: 1, value: b[2] / 4, unit: "°C" },
    { name: "Occupancy", channel: 2, value: b[3], unit: "" },
    { name: "Counter", channel: 3, value: u32(b, 4), unit: "" },
    { name: "Battery", channel: 4, value: ((b[8] << 8) | b[9]) / 10000, unit: "V" }
  ];
}
"#;

#[test]
fn decodes_room_sensor_frame() {
    let bytes = parse_hex_payload("040164010000000f41dc").unwrap();
    let records = CodecSandbox::new(SandboxConfig::default())
        .decode(ROOM_SENSOR_CODEC, &UplinkInput::new(bytes, 10))
        .unwrap();

    assert_eq!(records.len(), 4);
    assert_eq!(records[0]["name"], json!("Temperature"));
    assert_eq!(records[0]["channel"], json!(1));
    assert_eq!(records[0]["value"].as_f64(), Some(25.0));
    assert_eq!(records[0]["unit"], json!("°C"));
    assert_eq!(records[1]["value"].as_f64(), Some(1.0));
    assert_eq!(records[2]["value"].as_f64(), Some(15.0));
    assert_eq!(records[3]["value"].as_f64(), Some(1.686));
    assert_eq!(records[3]["unit"], json!("V"));
}

#[test]
fn wrong_port_surfaces_codec_message() {
    let bytes = parse_hex_payload("040164010000000f41dc").unwrap();
    let err = CodecSandbox::default()
        .decode(ROOM_SENSOR_CODEC, &UplinkInput::new(bytes, 2))
        .unwrap_err();
    match err {
        SandboxError::Runtime(msg) => assert!(msg.contains("port 2"), "{msg}"),
        other => panic!("unexpected error: {other}"),
    }
}
