//! Live Dashboard Example
//!
//! Renders a simulated host dashboard at whatever tier the terminal
//! supports. Press `q` or `Esc` to quit, scroll over a chart to zoom,
//! drag to pan, click a table row to select it.
//!
//! Run with: cargo run -p dashtier-terminal --example live_dashboard [config.yaml]
//!
//! Set `DASHTIER_LOG=debug` to write engine logs to `dashtier.log`.

use dashtier_terminal::{Capabilities, DashboardApp, DashboardConfig, DashboardEngine, DataPoint, Widget};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = r#"
title: "host"
target_fps: 30
layout: { columns: 3, rows: 3, gap: 1 }
widgets:
  - type: line_chart
    title: "network"
    series: ["rx", "tx"]
    max_points: 300
    placement: { column: 0, row: 0, column_span: 2 }
  - type: gauge
    title: "cpu"
    unit: "%"
    warn: 70
    critical: 90
    placement: { column: 2, row: 0 }
  - type: sparkline
    title: "load"
    capacity: 120
    placement: { column: 0, row: 1 }
  - type: kpi_card
    title: "memory"
    label: "used"
    unit: "GiB"
    higher_is_better: false
    placement: { column: 1, row: 1 }
  - type: heatmap
    title: "cores"
    rows: 2
    cols: 8
    palette: green_red
    range: [0.0, 100.0]
    placement: { column: 2, row: 1 }
  - type: table
    title: "processes"
    columns: ["pid", "cpu%", "command"]
    placement: { column: 0, row: 2, column_span: 2 }
  - type: status_bar
    placement: { column: 2, row: 2 }
"#;

fn init_logging() {
    let Ok(filter) = EnvFilter::try_from_env("DASHTIER_LOG") else {
        return;
    };
    // the alternate screen owns stdout, so logs go to a file
    if let Ok(file) = std::fs::File::create("dashtier.log") {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init();
    }
}

/// Cheap deterministic noise in `[0, 1)`.
fn noise(seed: u64) -> f64 {
    let mut x = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    x ^= x >> 29;
    x = x.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x ^= x >> 32;
    (x % 10_000) as f64 / 10_000.0
}

fn update(widgets: &mut [Widget], frame: u64) {
    let t = frame as f64 / 30.0;
    for widget in widgets.iter_mut() {
        if let Some(chart) = widget.line_chart_mut() {
            let rx = 40.0 + 30.0 * (t * 0.7).sin() + 10.0 * noise(frame);
            let tx = 20.0 + 15.0 * (t * 1.3).cos() + 5.0 * noise(frame + 7);
            let _ = chart.add_data_point(0, DataPoint::new(t, rx));
            let _ = chart.add_data_point(1, DataPoint::new(t, tx));
        } else if let Some(gauge) = widget.gauge_mut() {
            gauge.set_value(50.0 + 45.0 * (t * 0.4).sin());
        } else if let Some(spark) = widget.sparkline_mut() {
            spark.push(1.5 + (t * 0.9).sin() + noise(frame + 3));
        } else if let Some(kpi) = widget.kpi_card_mut() {
            if frame % 30 == 0 {
                if let Some(previous) = kpi.value() {
                    kpi.set_previous(previous);
                }
                kpi.set_value(8.0 + 4.0 * noise(frame / 30));
            }
        } else if let Some(heatmap) = widget.heatmap_mut() {
            for core in 0..16 {
                let load = 100.0 * noise(frame / 5 * 16 + core as u64);
                heatmap.set_cell(core / 8, core % 8, load);
            }
        } else if let Some(table) = widget.table_mut() {
            if frame % 15 == 0 {
                let rows = (0..12u64)
                    .map(|i| {
                        let cpu = 100.0 * noise(frame + i * 31);
                        vec![(1000 + i).to_string(), format!("{cpu:.1}"), format!("worker-{i}")]
                    })
                    .collect();
                table.set_rows(rows);
            }
        }
    }
}

fn main() -> dashtier_terminal::Result<()> {
    init_logging();

    let config = match std::env::args().nth(1) {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::from_yaml_str(DEFAULT_CONFIG)?,
    };
    let engine = DashboardEngine::with_probe(Capabilities::probe(), config)?;
    let tier = engine.tier();

    let mut app = DashboardApp::new(engine);
    app.run(update)?;

    println!("rendered {} frames at tier {tier}", app.frames());
    Ok(())
}
