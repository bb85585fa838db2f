//! Register dump rendering

use core::fmt::Write;

use pmic_client::RegisterSnapshot;

/// Hex dump plus decoded fields, one value per line.
pub fn render_text(raw: &[u8; 32], snapshot: &RegisterSnapshot) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "PMIC Register Dump:");
    for (i, value) in raw.iter().enumerate() {
        let _ = writeln!(out, " Reg {:2}: {:#04x}", i, value);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Decoded Fields:");
    let _ = writeln!(out, "  Time (ms): {}", snapshot.millis);
    let _ = writeln!(
        out,
        "  LED Color: R={:#04x}, G={:#04x}, B={:#04x} (trigger={:#04x})",
        snapshot.led_color.r, snapshot.led_color.g, snapshot.led_color.b, snapshot.led_color.trigger
    );
    let _ = writeln!(out, "  ADC Value: {}", snapshot.adc_sample);
    let _ = writeln!(out, "  Battery Voltage: {:.3} V", snapshot.vbat);
    let _ = writeln!(out, "  In-State : {:#04x}", snapshot.in_state);

    let mut id = String::new();
    for byte in &snapshot.device_id {
        let _ = write!(id, "{:02x}", byte);
    }
    let _ = writeln!(out, "  Device ID: {}", id);

    out
}

/// Decoded fields as a JSON object.
pub fn render_json(snapshot: &RegisterSnapshot) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}
