//! Core types for the dashtier rendering engine.
//!
//! This crate provides the foundational types shared by the engine:
//! - Geometric primitives: [`Point`], [`Size`], [`Rect`], [`PixelRect`]
//! - Color representation: [`Color`] (floating point) and [`Rgba8`] (pixels)
//! - Input events: [`Event`], [`Key`], [`MouseButton`]

mod color;
mod event;
mod geometry;

pub use color::{Color, ColorParseError, Rgba8};
pub use event::{Event, Key, MouseButton};
pub use geometry::{PixelRect, Point, Rect, Size};

#[cfg(test)]
mod tests {
    use super::*;

    mod color_tests {
        use super::*;
        use proptest::prelude::*;

        #[test]
        fn test_color_new_clamps_values() {
            let c = Color::new(1.5, -0.5, 0.5, 2.0);
            assert_eq!(c.r, 1.0);
            assert_eq!(c.g, 0.0);
            assert_eq!(c.b, 0.5);
            assert_eq!(c.a, 1.0);
        }

        #[test]
        fn test_color_from_hex() {
            let c = Color::from_hex("#ff0000").unwrap();
            assert_eq!(c.r, 1.0);
            assert_eq!(c.g, 0.0);
            assert_eq!(c.b, 0.0);

            let c3 = Color::from_hex("0000ff").unwrap();
            assert_eq!(c3.b, 1.0);
        }

        #[test]
        fn test_color_from_hex_with_alpha() {
            let c = Color::from_hex("#ff000080").unwrap();
            assert_eq!(c.r, 1.0);
            assert!((c.a - 0.502).abs() < 0.01);
        }

        #[test]
        fn test_color_from_hex_invalid() {
            assert_eq!(Color::from_hex("invalid"), Err(ColorParseError::InvalidLength));
            assert_eq!(Color::from_hex("#gg0000"), Err(ColorParseError::InvalidHex));
            assert_eq!(Color::from_hex("#ff"), Err(ColorParseError::InvalidLength));
            assert_eq!(Color::from_hex("#ffé00"), Err(ColorParseError::InvalidHex));
        }

        #[test]
        fn test_color_to_hex() {
            assert_eq!(Color::from_rgb8(18, 52, 86).to_hex(), "#123456");
        }

        #[test]
        fn test_color_constants() {
            assert_eq!(Color::default(), Color::BLACK);
            assert_eq!(Color::WHITE.to_rgba8(), Rgba8::WHITE);
            assert_eq!(Color::BLACK.to_rgba8(), Rgba8::BLACK);
            assert_eq!(Color::TRANSPARENT.to_rgba8(), Rgba8::TRANSPARENT);
            for c in [Color::RED, Color::GREEN, Color::BLUE, Color::AMBER, Color::GRAY] {
                assert_eq!(c.a, 1.0);
            }
        }

        #[test]
        fn test_color_dim_keeps_alpha() {
            let c = Color::new(1.0, 1.0, 1.0, 0.5).dim(0.5);
            assert_eq!(c.r, 0.5);
            assert_eq!(c.a, 0.5);
        }

        #[test]
        fn test_rgba8_roundtrip_extremes() {
            assert_eq!(Color::WHITE.to_rgba8(), Rgba8::WHITE);
            assert_eq!(Color::TRANSPARENT.to_rgba8(), Rgba8::TRANSPARENT);
            assert_eq!(Rgba8::BLACK.to_color(), Color::BLACK);
        }

        #[test]
        fn test_rgba8_transparency() {
            assert!(Rgba8::TRANSPARENT.is_transparent());
            assert!(!Rgba8::opaque(1, 2, 3).is_transparent());
            assert_eq!(Rgba8::WHITE.with_alpha(7).a, 7);
        }

        proptest! {
            #[test]
            fn prop_color_clamps_to_valid_range(r in -1.0f32..2.0, g in -1.0f32..2.0, b in -1.0f32..2.0, a in -1.0f32..2.0) {
                let c = Color::new(r, g, b, a);
                prop_assert!(c.r >= 0.0 && c.r <= 1.0);
                prop_assert!(c.g >= 0.0 && c.g <= 1.0);
                prop_assert!(c.b >= 0.0 && c.b <= 1.0);
                prop_assert!(c.a >= 0.0 && c.a <= 1.0);
            }

            #[test]
            fn prop_rgba8_survives_color_conversion(r in 0u8..=255, g in 0u8..=255, b in 0u8..=255, a in 0u8..=255) {
                let px = Rgba8::new(r, g, b, a);
                prop_assert_eq!(px.to_color().to_rgba8(), px);
            }
        }
    }

    mod geometry_tests {
        use super::*;

        #[test]
        fn test_point_distance() {
            let p1 = Point::new(0.0, 0.0);
            let p2 = Point::new(3.0, 4.0);
            assert_eq!(p1.distance(&p2), 5.0);
        }

        #[test]
        fn test_point_to_i32_rounds() {
            assert_eq!(Point::new(1.4, 2.6).to_i32(), (1, 3));
        }

        #[test]
        fn test_rect_contains_point_half_open() {
            let r = Rect::new(0.0, 0.0, 10.0, 5.0);
            assert!(r.contains_point(&Point::new(0.0, 0.0)));
            assert!(r.contains_point(&Point::new(9.9, 4.9)));
            assert!(!r.contains_point(&Point::new(10.0, 2.0)));
        }

        #[test]
        fn test_rect_inset_never_negative() {
            let r = Rect::new(2.0, 2.0, 3.0, 1.0).inset(1.0);
            assert_eq!(r, Rect::new(3.0, 3.0, 1.0, 0.0));
            assert!(r.is_empty());
        }

        #[test]
        fn test_rect_scale() {
            let r = Rect::new(1.0, 2.0, 3.0, 4.0).scale(8.0, 16.0);
            assert_eq!(r, Rect::new(8.0, 32.0, 24.0, 64.0));
        }

        #[test]
        fn test_pixel_rect_clip() {
            let r = PixelRect::new(-5, -5, 10, 10);
            assert_eq!(r.clip(100, 100), Some(PixelRect::new(0, 0, 5, 5)));
            assert_eq!(PixelRect::new(200, 0, 5, 5).clip(100, 100), None);
        }

        #[test]
        fn test_pixel_rect_union_ignores_empty() {
            let a = PixelRect::new(2, 2, 3, 3);
            assert_eq!(a.union(&PixelRect::default()), a);
            assert_eq!(
                a.union(&PixelRect::new(10, 0, 2, 2)),
                PixelRect::new(2, 0, 10, 5)
            );
        }

        #[test]
        fn test_pixel_rect_touches_adjacent() {
            let a = PixelRect::new(0, 0, 4, 4);
            assert!(a.touches(&PixelRect::new(4, 0, 2, 2)));
            assert!(!a.touches(&PixelRect::new(6, 0, 2, 2)));
        }

        #[test]
        fn test_pixel_rect_from_rect_rounds_outward() {
            let r = PixelRect::from_rect(&Rect::new(0.5, 0.5, 1.0, 1.0));
            assert_eq!(r, PixelRect::new(0, 0, 2, 2));
        }
    }

    mod event_tests {
        use super::*;

        #[test]
        fn test_event_position() {
            let e = Event::Scroll {
                position: Point::new(3.0, 4.0),
                delta_x: 0.0,
                delta_y: -1.0,
            };
            assert_eq!(e.position(), Some(Point::new(3.0, 4.0)));
            assert_eq!(Event::FocusIn.position(), None);
        }

        #[test]
        fn test_event_is_key() {
            assert!(Event::KeyDown { key: Key::Up }.is_key());
            assert!(!Event::FocusOut.is_key());
        }
    }
}
