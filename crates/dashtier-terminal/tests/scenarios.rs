//! End-to-end scenarios over the public API: tier detection, gauge needle,
//! empty-frame compositing and the documented numeric properties.

use dashtier_terminal::compositor::mix_channel;
use dashtier_terminal::raster::{draw_line, PixelBuffer};
use dashtier_terminal::{
    detect_from_caps, BlendMode, Capabilities, CapabilityTier, Color, ColorDepth, ColorMode, DataPoint, FrameBudget,
    Gauge, GraphicsProtocol, RenderPipeline, Rgba8, Series, Surface, Viewport,
};
use proptest::prelude::*;

// =============================================================================
// Tier detection
// =============================================================================

#[test]
fn scenario_a_kitty_truecolor_mouse_is_high() {
    let caps = Capabilities::new(GraphicsProtocol::Kitty, ColorDepth::TrueColor, true);
    assert_eq!(detect_from_caps(&caps), CapabilityTier::High);
}

#[test]
fn scenario_b_256_colors_with_mouse_is_standard() {
    let caps = Capabilities::new(GraphicsProtocol::None, ColorDepth::Ansi256, true);
    assert_eq!(detect_from_caps(&caps), CapabilityTier::Standard);
}

#[test]
fn scenario_c_16_colors_without_mouse_is_minimal() {
    let caps = Capabilities::new(GraphicsProtocol::None, ColorDepth::Ansi16, false);
    assert_eq!(detect_from_caps(&caps), CapabilityTier::Minimal);
}

fn any_caps() -> impl Strategy<Value = Capabilities> {
    let graphics = prop_oneof![
        Just(GraphicsProtocol::None),
        Just(GraphicsProtocol::Kitty),
        Just(GraphicsProtocol::Sixel)
    ];
    let colors = prop_oneof![
        Just(ColorDepth::Ansi16),
        Just(ColorDepth::Ansi256),
        Just(ColorDepth::TrueColor)
    ];
    (graphics, colors, any::<bool>()).prop_map(|(g, c, m)| Capabilities::new(g, c, m))
}

proptest! {
    #[test]
    fn prop_detection_is_deterministic(caps in any_caps()) {
        let tier = detect_from_caps(&caps);
        prop_assert_eq!(tier, detect_from_caps(&caps));
        prop_assert!(CapabilityTier::ALL.contains(&tier));
    }
}

// =============================================================================
// Gauge
// =============================================================================

#[test]
fn scenario_d_gauge_needle_angle() {
    let mut gauge = Gauge::new(CapabilityTier::High).with_sweep(135.0, 405.0);
    assert!(gauge.set_value_range(0.0, 100.0));
    gauge.set_value(75.0);
    assert!((gauge.needle_angle() - 337.5).abs() < 1e-4);
}

// =============================================================================
// Pipeline
// =============================================================================

#[test]
fn scenario_e_empty_layers_composite_to_clear_output() {
    for tier in CapabilityTier::ALL {
        let surface = Surface::for_tier(tier, 12, 6, 4, 8);
        let mut pipeline = RenderPipeline::try_new(tier, surface, ColorMode::TrueColor).unwrap();
        pipeline.begin_frame();
        let stats = pipeline.composite();
        assert!(pipeline.compositor().output().is_clear(), "tier {tier}");
        assert!(pipeline.compositor().text().is_blank(), "tier {tier}");
        assert_eq!(stats.pixels_written, 0, "tier {tier}");
    }
}

// =============================================================================
// Numeric properties
// =============================================================================

#[test]
fn draw_line_horizontal_sets_six_pixels() {
    let mut buf = PixelBuffer::try_new(10, 4, "test").unwrap();
    draw_line(&mut buf, 0, 0, 5, 0, Rgba8::WHITE);
    assert_eq!(buf.count_set(), 6);
    for x in 0..=5 {
        assert_eq!(buf.get(x, 0), Some(Rgba8::WHITE));
    }
    assert_eq!(buf.get(6, 0), Some(Rgba8::TRANSPARENT));
}

#[test]
fn viewport_auto_scale_pads_five_percent() {
    let mut series = Series::new("s", Color::WHITE);
    series.push(DataPoint::new(10.0, 0.0));
    series.push(DataPoint::new(50.0, 100.0));
    let mut viewport = Viewport::new();
    viewport.update_viewport_bounds(&[series], None);
    let b = viewport.effective_bounds();
    assert!((b.min_x - 8.0).abs() < 1e-9);
    assert!((b.max_x - 52.0).abs() < 1e-9);
    assert!((b.min_y + 5.0).abs() < 1e-9);
    assert!((b.max_y - 105.0).abs() < 1e-9);
}

#[test]
fn frame_ring_keeps_latest_sixty() {
    let mut budget = FrameBudget::new(30);
    for ns in 1..=61u64 {
        budget.record_frame_time(ns);
    }
    assert_eq!(budget.len(), 60);
    assert_eq!(budget.frame_times().next(), Some(2));
    assert_eq!(budget.frame_times().last(), Some(61));
}

proptest! {
    #[test]
    fn prop_quality_stays_in_range(samples in proptest::collection::vec(0u64..200_000_000, 1..200)) {
        let mut budget = FrameBudget::new(60);
        for ns in samples {
            budget.record_frame_time(ns);
            let q = budget.quality_level();
            prop_assert!((0.1..=1.0).contains(&q));
        }
    }

    #[test]
    fn prop_mixed_channel_between_inputs(src in any::<u8>(), dst in any::<u8>(), alpha in any::<u8>()) {
        let out = mix_channel(src, dst, alpha);
        prop_assert!(out >= src.min(dst) && out <= src.max(dst));
    }

    #[test]
    fn prop_blend_modes_keep_source_alpha(src in any::<u8>(), dst in any::<u8>(), alpha in any::<u8>()) {
        for mode in [BlendMode::Normal, BlendMode::Multiply, BlendMode::Screen, BlendMode::Overlay] {
            let out = mode.apply(Rgba8::new(src, src, src, alpha), Rgba8::opaque(dst, dst, dst));
            prop_assert_eq!(out.a, alpha);
        }
    }
}
