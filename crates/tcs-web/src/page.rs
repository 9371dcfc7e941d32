//! HTML rendering.
//!
//! Everything interpolated into the page is numeric or one of our own enum
//! labels, so no escaping is needed.

use chrono::{DateTime, SecondsFormat, Utc};
use std::time::Duration;

use tcs_core::ColorReading;

/// What the page should show.
#[derive(Debug, Clone, Copy)]
pub enum Snapshot<'a> {
    /// Nothing published yet, or the store could not be read.
    NoData,
    Live(&'a ColorReading),
    /// Last reading is older than the staleness threshold. Rendered as no data.
    Stale(&'a ColorReading, Duration),
}

impl<'a> Snapshot<'a> {
    /// Classify `reading` against `now`.
    pub fn of(reading: Option<&'a ColorReading>, now: DateTime<Utc>, stale_after: Duration) -> Self {
        match reading {
            None => Snapshot::NoData,
            Some(reading) => {
                let age = reading.age(now).to_std().unwrap_or_default();
                if age > stale_after {
                    Snapshot::Stale(reading, age)
                } else {
                    Snapshot::Live(reading)
                }
            }
        }
    }
}

pub fn render(snapshot: Snapshot<'_>, refresh_secs: u32) -> String {
    let body = match snapshot {
        Snapshot::NoData => no_data_body("No data"),
        Snapshot::Live(reading) => reading_body(reading, "live", "Receiving data"),
        Snapshot::Stale(_, age) => no_data_body(&format!("No data: last reading {}s ago", age.as_secs())),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<meta http-equiv="refresh" content="{refresh}">
<title>TCS3200 Color Sensor</title>
<style>
body {{ background: #111827; color: #f9fafb; font-family: sans-serif; display: flex; justify-content: center; align-items: center; min-height: 100vh; margin: 0; }}
.card {{ background: #1f2937; padding: 2rem; border-radius: 0.5rem; width: 100%; max-width: 28rem; text-align: center; }}
.swatch {{ height: 12rem; border: 4px solid #374151; border-radius: 0.5rem; margin-bottom: 1.5rem; }}
.rgb {{ font-family: monospace; font-size: 1.5rem; margin-bottom: 1rem; }}
.status {{ padding: 0.75rem; border-radius: 0.5rem; font-weight: bold; }}
.live {{ background: #15803d; }}
.nodata {{ background: #b91c1c; }}
</style>
</head>
<body>
<div class="card">
<h1>TCS3200 Color Sensor</h1>
{body}
</div>
</body>
</html>
"#,
        refresh = refresh_secs,
        body = body,
    )
}

fn no_data_body(status: &str) -> String {
    format!(
        r#"<div class="swatch" style="background-color: #000000;"></div>
<div class="rgb">R: --- G: --- B: ---</div>
<div class="label">Dominant: ---</div>
<div class="status nodata">{status}</div>"#,
        status = status,
    )
}

fn reading_body(reading: &ColorReading, class: &str, status: &str) -> String {
    let label = match reading.tone {
        Some(tone) => format!("{} ({})", reading.label, tone),
        None => reading.label.to_string(),
    };
    format!(
        r#"<div class="swatch" style="background-color: {hex};"></div>
<div class="rgb">R: {r} G: {g} B: {b}</div>
<div class="label">Dominant: {label}</div>
<div class="raw">Raw: {raw_r:.0} / {raw_g:.0} / {raw_b:.0} Hz &middot; {hex}</div>
<div class="time">Captured {time}</div>
<div class="status {class}">{status}</div>"#,
        hex = reading.hex(),
        r = reading.rgb.r,
        g = reading.rgb.g,
        b = reading.rgb.b,
        label = label,
        raw_r = reading.raw.red,
        raw_g = reading.raw.green,
        raw_b = reading.raw.blue,
        time = reading.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        class = class,
        status = status,
    )
}
