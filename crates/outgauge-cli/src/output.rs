//! Record formatting for the terminal

use outgauge_listener::TelemetryRecord;

/// One-line dash summary: gear, speed (m/s), RPM, turbo (bar) and lit lights.
pub fn summary_line(record: &TelemetryRecord) -> String {
    format!(
        "Gear: {} Speed: {:3.1} RPM: {:4.0} Turbo: {:+1.2} Lights: {}",
        record.gear_label(),
        record.speed,
        record.rpm,
        record.turbo,
        record.active_lights
    )
}

/// Print a record as a summary line or as a single-line JSON object
pub fn print_record(record: &TelemetryRecord, json: bool) {
    if json {
        match serde_json::to_string(record) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("Failed to format record as JSON: {e}"),
        }
    } else {
        println!("{}", summary_line(record));
    }
}
