//! Every widget kind rendered on every tier, plus input routing through
//! the engine.

use dashtier_terminal::{
    Capabilities, CapabilityTier, ColorDepth, DashboardConfig, DashboardEngine, DataPoint, Event, GraphicsProtocol,
    LayerId, MouseButton, Point, Widget,
};

const ALL_KINDS: &str = r#"
title: "all"
cell_pixels: { width: 2, height: 4 }
layout: { columns: 4, rows: 3 }
widgets:
  - { type: line_chart, title: "line", series: ["a", "b"], placement: { column: 0, row: 0 } }
  - { type: area_chart, title: "area", series: ["a"], placement: { column: 1, row: 0 } }
  - { type: bar_chart, title: "bars", placement: { column: 2, row: 0 } }
  - { type: sparkline, title: "spark", placement: { column: 3, row: 0 } }
  - { type: heatmap, title: "heat", rows: 2, cols: 3, placement: { column: 0, row: 1 } }
  - { type: gauge, title: "cpu", unit: "%", warn: 70, critical: 90, placement: { column: 1, row: 1 } }
  - { type: kpi_card, title: "mem", label: "used", unit: "G", placement: { column: 2, row: 1 } }
  - { type: table, title: "procs", columns: ["pid", "cmd"], placement: { column: 3, row: 1 } }
  - { type: grid, title: "disks", rows: 2, cols: 2, placement: { column: 0, row: 2, column_span: 3 } }
  - { type: status_bar, placement: { column: 3, row: 2 } }
"#;

fn caps_for(tier: CapabilityTier) -> Capabilities {
    match tier {
        CapabilityTier::High => Capabilities::new(GraphicsProtocol::Kitty, ColorDepth::TrueColor, true),
        CapabilityTier::Rich => Capabilities::new(GraphicsProtocol::Sixel, ColorDepth::Ansi256, true),
        CapabilityTier::Standard => Capabilities::new(GraphicsProtocol::None, ColorDepth::Ansi256, true),
        CapabilityTier::Minimal => Capabilities::new(GraphicsProtocol::None, ColorDepth::Ansi16, false),
    }
}

fn populated(tier: CapabilityTier) -> (DashboardEngine, Vec<Widget>) {
    let config = DashboardConfig::from_yaml_str(ALL_KINDS).unwrap();
    let engine = DashboardEngine::with_size(caps_for(tier), config, 96, 30).unwrap();
    assert_eq!(engine.tier(), tier);
    let mut widgets = engine.build_widgets();

    for series in 0..2 {
        let chart = widgets[0].line_chart_mut().unwrap();
        let points = (0..30).map(|i| DataPoint::new(f64::from(i), f64::from((i * (series + 2)) % 11)));
        chart.set_series_data(series as usize, points).unwrap();
    }
    let area = widgets[1].area_chart_mut().unwrap();
    area.set_series_data(0, (0..30).map(|i| DataPoint::new(f64::from(i), f64::from(i % 7))))
        .unwrap();
    widgets[2]
        .bar_chart_mut()
        .unwrap()
        .set_data(vec![("a".into(), 3.0), ("b".into(), 7.0), ("c".into(), 5.0)]);
    widgets[3].sparkline_mut().unwrap().set_data([1.0, 4.0, 2.0, 8.0, 5.0]);
    widgets[4]
        .heatmap_mut()
        .unwrap()
        .set_data(2, 3, [0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
    widgets[5].gauge_mut().unwrap().set_value(75.0);
    widgets[6].kpi_card_mut().unwrap().set_value(12.5);
    let table = widgets[7].table_mut().unwrap();
    for pid in 1..=4 {
        table.push_row(vec![pid.to_string(), format!("proc{pid}")]);
    }
    let grid = widgets[8].grid_mut().unwrap();
    grid.set_cell(0, 0, "sda");
    grid.set_cell(1, 1, "nvme0");
    (engine, widgets)
}

fn screen_text(engine: &DashboardEngine) -> String {
    let text = engine.pipeline().compositor().text();
    let (_, rows) = engine.size();
    (0..rows).map(|y| text.row_text(y)).collect::<Vec<_>>().join("\n")
}

// =============================================================================
// Rendering per tier
// =============================================================================

#[test]
fn test_all_kinds_render_on_every_tier() {
    for tier in CapabilityTier::ALL {
        let (mut engine, mut widgets) = populated(tier);
        let stats = engine.render(&mut widgets, &mut Vec::new()).unwrap();
        assert_eq!(stats.widgets_rendered, widgets.len(), "tier {tier}");
        let screen = screen_text(&engine);
        for title in ["line", "area", "bars", "spark", "heat", "cpu", "mem", "procs", "disks"] {
            assert!(screen.contains(title), "tier {tier} missing {title}");
        }
    }
}

#[test]
fn test_minimal_tier_is_pure_ascii() {
    let (mut engine, mut widgets) = populated(CapabilityTier::Minimal);
    engine.render(&mut widgets, &mut Vec::new()).unwrap();
    let screen = screen_text(&engine);
    assert!(screen.is_ascii(), "non-ascii output:\n{screen}");
    assert!(screen.contains("proc3"));
    assert!(screen.contains("nvme0"));
}

#[test]
fn test_standard_tier_plots_with_braille() {
    let (mut engine, mut widgets) = populated(CapabilityTier::Standard);
    engine.render(&mut widgets, &mut Vec::new()).unwrap();
    let screen = screen_text(&engine);
    assert!(screen.chars().any(|c| ('\u{2801}'..='\u{28FF}').contains(&c)));
}

#[test]
fn test_pixel_tiers_draw_data_as_pixels() {
    for tier in [CapabilityTier::High, CapabilityTier::Rich] {
        let (mut engine, mut widgets) = populated(tier);
        engine.render(&mut widgets, &mut Vec::new()).unwrap();
        let pipeline = engine.pipeline();
        assert!(pipeline.layer(LayerId::Data).pixels().count_set() > 0, "tier {tier}");
        assert!(!pipeline.compositor().output().is_clear(), "tier {tier}");
    }
}

#[test]
fn test_hidden_widget_is_not_drawn() {
    let (mut engine, mut widgets) = populated(CapabilityTier::Minimal);
    for widget in &mut widgets {
        widget.visible = widget.title.as_deref() == Some("procs");
    }
    let stats = engine.render(&mut widgets, &mut Vec::new()).unwrap();
    assert_eq!(stats.widgets_rendered, 1);
    let screen = screen_text(&engine);
    assert!(screen.contains("procs"));
    assert!(!screen.contains("disks"));
}

// =============================================================================
// Input routing
// =============================================================================

#[test]
fn test_click_selects_table_row() {
    let (mut engine, mut widgets) = populated(CapabilityTier::Standard);
    let content = widgets[7].content_bounds();
    // header occupies the first content row
    let click = Event::MouseDown {
        position: Point::new(content.x + 1.0, content.y + 2.0),
        button: MouseButton::Left,
    };
    assert_eq!(engine.dispatch_input(&mut widgets, &click), Some(7));
    assert_eq!(widgets[7].table().unwrap().selected(), Some(1));
}

#[test]
fn test_click_outside_every_widget_is_unhandled() {
    let (mut engine, mut widgets) = populated(CapabilityTier::High);
    let click = Event::MouseDown {
        position: Point::new(500.0, 500.0),
        button: MouseButton::Left,
    };
    assert_eq!(engine.dispatch_input(&mut widgets, &click), None);
}

#[test]
fn test_scroll_over_chart_zooms_viewport() {
    let (mut engine, mut widgets) = populated(CapabilityTier::High);
    engine.render(&mut widgets, &mut Vec::new()).unwrap();
    let before = widgets[0].line_chart().unwrap().core().viewport().effective_bounds();
    let bounds = widgets[0].content_bounds();
    let scroll = Event::Scroll {
        position: Point::new(bounds.x + bounds.width / 2.0, bounds.y + bounds.height / 2.0),
        delta_x: 0.0,
        delta_y: -1.0,
    };
    assert_eq!(engine.dispatch_input(&mut widgets, &scroll), Some(0));
    let after = widgets[0].line_chart().unwrap().core().viewport().effective_bounds();
    assert!(after.max_x - after.min_x < before.max_x - before.min_x);
}
