//! Terminal capability descriptors and tier detection.
//!
//! A [`Capabilities`] snapshot comes from whatever probe the host runs
//! (environment heuristics by default). [`detect_from_caps`] folds it into a
//! [`CapabilityTier`] using a fixed decision table, highest tier first:
//!
//! | Rule | Condition                                         | Tier       |
//! |------|---------------------------------------------------|------------|
//! | 1    | kitty graphics ∧ truecolor ∧ mouse                | `High`     |
//! | 2    | sixel graphics ∨ (truecolor ∧ mouse)              | `Rich`     |
//! | 3    | (256 colors ∨ truecolor) ∧ mouse                  | `Standard` |
//! | 4    | anything else                                     | `Minimal`  |

use crate::color::ColorMode;
use crate::error::{DashError, Result};
use serde::{Deserialize, Serialize};

/// Graphics protocol supported by the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphicsProtocol {
    /// No inline graphics.
    #[default]
    None,
    /// Kitty graphics protocol.
    Kitty,
    /// DEC Sixel graphics.
    Sixel,
}

/// Number of colors the terminal can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColorDepth {
    /// 16 ANSI colors.
    #[default]
    #[serde(rename = "16")]
    Ansi16,
    /// 256-color xterm palette.
    #[serde(rename = "256")]
    Ansi256,
    /// 24-bit color.
    #[serde(rename = "truecolor")]
    TrueColor,
}

/// Snapshot of terminal features produced by a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Capabilities {
    /// Inline graphics protocol.
    pub graphics: GraphicsProtocol,
    /// Color depth.
    pub colors: ColorDepth,
    /// Mouse reporting available.
    pub mouse: bool,
}

impl Capabilities {
    /// Create a capability snapshot.
    #[must_use]
    pub const fn new(graphics: GraphicsProtocol, colors: ColorDepth, mouse: bool) -> Self {
        Self {
            graphics,
            colors,
            mouse,
        }
    }

    /// Probe the current process environment.
    ///
    /// # Errors
    ///
    /// Returns [`DashError::ProbeFailed`] when neither `TERM` nor `COLORTERM`
    /// is set (not attached to a terminal emulator).
    pub fn probe() -> Result<Self> {
        let var = |name: &str| std::env::var(name).ok();
        Self::from_env(&EnvProbe {
            term: var("TERM"),
            colorterm: var("COLORTERM"),
            term_program: var("TERM_PROGRAM"),
            kitty_window_id: var("KITTY_WINDOW_ID"),
        })
    }

    /// Derive capabilities from captured environment values.
    ///
    /// This is the testable core of [`Capabilities::probe`].
    ///
    /// # Errors
    ///
    /// Returns [`DashError::ProbeFailed`] when `TERM` and `COLORTERM` are both
    /// missing.
    pub fn from_env(env: &EnvProbe) -> Result<Self> {
        if env.term.is_none() && env.colorterm.is_none() {
            return Err(DashError::ProbeFailed("TERM and COLORTERM are unset".into()));
        }
        let term = env.term.as_deref().unwrap_or_default();
        let program = env.term_program.as_deref().unwrap_or_default();

        let graphics = if env.kitty_window_id.is_some()
            || term.contains("kitty")
            || program.eq_ignore_ascii_case("ghostty")
            || program.eq_ignore_ascii_case("WezTerm")
        {
            GraphicsProtocol::Kitty
        } else if term.contains("sixel") || term.starts_with("mlterm") || term == "foot" {
            GraphicsProtocol::Sixel
        } else {
            GraphicsProtocol::None
        };

        let colors = match ColorMode::detect_with_env(env.colorterm.as_deref(), env.term.as_deref())
        {
            ColorMode::TrueColor => ColorDepth::TrueColor,
            ColorMode::Color256 => ColorDepth::Ansi256,
            ColorMode::Color16 | ColorMode::Mono => ColorDepth::Ansi16,
        };

        let mouse = !term.is_empty()
            && term != "dumb"
            && term != "linux"
            && !term.starts_with("vt1")
            && !term.starts_with("vt2");

        Ok(Self::new(graphics, colors, mouse))
    }
}

/// Environment values consulted by the default probe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvProbe {
    /// `TERM`
    pub term: Option<String>,
    /// `COLORTERM`
    pub colorterm: Option<String>,
    /// `TERM_PROGRAM`
    pub term_program: Option<String>,
    /// `KITTY_WINDOW_ID`
    pub kitty_window_id: Option<String>,
}

/// Adaptive quality level chosen from detected terminal features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityTier {
    /// Pixel graphics with true alpha blending.
    High,
    /// Pixel graphics with ordered dithering.
    Rich,
    /// Unicode Braille and block characters.
    Standard,
    /// Plain ASCII text.
    Minimal,
}

impl CapabilityTier {
    /// All tiers, highest first.
    pub const ALL: [Self; 4] = [Self::High, Self::Rich, Self::Standard, Self::Minimal];

    /// Lowercase tier name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Rich => "rich",
            Self::Standard => "standard",
            Self::Minimal => "minimal",
        }
    }

    /// Whether the tier draws into pixel layers.
    #[must_use]
    pub const fn has_graphics(self) -> bool {
        matches!(self, Self::High | Self::Rich)
    }

    /// Cell color conversion used when presenting text at this tier.
    #[must_use]
    pub fn color_mode(self, caps: &Capabilities) -> ColorMode {
        match self {
            Self::Minimal => match caps.colors {
                ColorDepth::Ansi16 => ColorMode::Color16,
                _ => ColorMode::Mono,
            },
            _ => ColorMode::from_depth(caps.colors),
        }
    }

    /// Tier for a probe outcome; a failed probe degrades to `Minimal`.
    #[must_use]
    pub fn detect_or_fallback(probe: &Result<Capabilities>) -> Self {
        match probe {
            Ok(caps) => detect_from_caps(caps),
            Err(err) => {
                tracing::warn!(error = %err, "capability probe failed, falling back to minimal tier");
                Self::Minimal
            }
        }
    }
}

impl std::fmt::Display for CapabilityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Map a capability snapshot to its tier.
///
/// Pure and total: unsupported combinations fall through to `Minimal`.
#[must_use]
pub fn detect_from_caps(caps: &Capabilities) -> CapabilityTier {
    let truecolor = caps.colors == ColorDepth::TrueColor;
    let wide_palette = matches!(caps.colors, ColorDepth::Ansi256 | ColorDepth::TrueColor);

    if caps.graphics == GraphicsProtocol::Kitty && truecolor && caps.mouse {
        CapabilityTier::High
    } else if caps.graphics == GraphicsProtocol::Sixel || (truecolor && caps.mouse) {
        CapabilityTier::Rich
    } else if wide_palette && caps.mouse {
        CapabilityTier::Standard
    } else {
        CapabilityTier::Minimal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn env(term: Option<&str>, colorterm: Option<&str>) -> EnvProbe {
        EnvProbe {
            term: term.map(String::from),
            colorterm: colorterm.map(String::from),
            ..EnvProbe::default()
        }
    }

    #[test]
    fn test_kitty_truecolor_mouse_is_high() {
        let caps = Capabilities::new(GraphicsProtocol::Kitty, ColorDepth::TrueColor, true);
        assert_eq!(detect_from_caps(&caps), CapabilityTier::High);
    }

    #[test]
    fn test_kitty_without_mouse_is_minimal() {
        let caps = Capabilities::new(GraphicsProtocol::Kitty, ColorDepth::TrueColor, false);
        assert_eq!(detect_from_caps(&caps), CapabilityTier::Minimal);
    }

    #[test]
    fn test_sixel_is_rich_regardless_of_colors() {
        for colors in [ColorDepth::Ansi16, ColorDepth::Ansi256, ColorDepth::TrueColor] {
            for mouse in [false, true] {
                let caps = Capabilities::new(GraphicsProtocol::Sixel, colors, mouse);
                assert_eq!(detect_from_caps(&caps), CapabilityTier::Rich);
            }
        }
    }

    #[test]
    fn test_truecolor_mouse_without_graphics_is_rich() {
        let caps = Capabilities::new(GraphicsProtocol::None, ColorDepth::TrueColor, true);
        assert_eq!(detect_from_caps(&caps), CapabilityTier::Rich);
    }

    #[test]
    fn test_256_mouse_is_standard() {
        let caps = Capabilities::new(GraphicsProtocol::None, ColorDepth::Ansi256, true);
        assert_eq!(detect_from_caps(&caps), CapabilityTier::Standard);
    }

    #[test]
    fn test_16_colors_no_mouse_is_minimal() {
        let caps = Capabilities::new(GraphicsProtocol::None, ColorDepth::Ansi16, false);
        assert_eq!(detect_from_caps(&caps), CapabilityTier::Minimal);
    }

    #[test]
    fn test_16_colors_with_mouse_is_minimal() {
        let caps = Capabilities::new(GraphicsProtocol::None, ColorDepth::Ansi16, true);
        assert_eq!(detect_from_caps(&caps), CapabilityTier::Minimal);
    }

    #[test]
    fn test_probe_failure_falls_back_to_minimal() {
        let failed: Result<Capabilities> = Err(DashError::ProbeFailed("no tty".into()));
        assert_eq!(CapabilityTier::detect_or_fallback(&failed), CapabilityTier::Minimal);
    }

    #[test]
    fn test_from_env_requires_term() {
        assert!(matches!(
            Capabilities::from_env(&EnvProbe::default()),
            Err(DashError::ProbeFailed(_))
        ));
    }

    #[test]
    fn test_from_env_kitty() {
        let probe = EnvProbe {
            kitty_window_id: Some("1".into()),
            ..env(Some("xterm-kitty"), Some("truecolor"))
        };
        let caps = Capabilities::from_env(&probe).unwrap();
        assert_eq!(caps.graphics, GraphicsProtocol::Kitty);
        assert_eq!(caps.colors, ColorDepth::TrueColor);
        assert!(caps.mouse);
        assert_eq!(detect_from_caps(&caps), CapabilityTier::High);
    }

    #[test]
    fn test_from_env_xterm_256() {
        let caps = Capabilities::from_env(&env(Some("xterm-256color"), None)).unwrap();
        assert_eq!(caps.graphics, GraphicsProtocol::None);
        assert_eq!(caps.colors, ColorDepth::Ansi256);
        assert_eq!(detect_from_caps(&caps), CapabilityTier::Standard);
    }

    #[test]
    fn test_from_env_linux_console_has_no_mouse() {
        let caps = Capabilities::from_env(&env(Some("linux"), None)).unwrap();
        assert!(!caps.mouse);
        assert_eq!(detect_from_caps(&caps), CapabilityTier::Minimal);
    }

    #[test]
    fn test_from_env_foot_is_sixel() {
        let caps = Capabilities::from_env(&env(Some("foot"), None)).unwrap();
        assert_eq!(caps.graphics, GraphicsProtocol::Sixel);
    }

    #[test]
    fn test_minimal_color_mode() {
        let caps16 = Capabilities::new(GraphicsProtocol::None, ColorDepth::Ansi16, false);
        assert_eq!(CapabilityTier::Minimal.color_mode(&caps16), ColorMode::Color16);
        let caps256 = Capabilities::new(GraphicsProtocol::None, ColorDepth::Ansi256, false);
        assert_eq!(CapabilityTier::Minimal.color_mode(&caps256), ColorMode::Mono);
        assert_eq!(CapabilityTier::Standard.color_mode(&caps256), ColorMode::Color256);
    }

    #[test]
    fn test_tier_names_and_order() {
        assert_eq!(CapabilityTier::High.to_string(), "high");
        assert!(CapabilityTier::High < CapabilityTier::Minimal);
        assert!(CapabilityTier::Rich.has_graphics());
        assert!(!CapabilityTier::Standard.has_graphics());
    }

    #[test]
    fn test_capabilities_deserialize() {
        let caps: Capabilities =
            serde_yaml_ng::from_str("graphics: sixel\ncolors: \"256\"\nmouse: true\n").unwrap();
        assert_eq!(
            caps,
            Capabilities::new(GraphicsProtocol::Sixel, ColorDepth::Ansi256, true)
        );
    }

    fn any_caps() -> impl Strategy<Value = Capabilities> {
        (
            prop_oneof![
                Just(GraphicsProtocol::None),
                Just(GraphicsProtocol::Kitty),
                Just(GraphicsProtocol::Sixel)
            ],
            prop_oneof![
                Just(ColorDepth::Ansi16),
                Just(ColorDepth::Ansi256),
                Just(ColorDepth::TrueColor)
            ],
            any::<bool>(),
        )
            .prop_map(|(g, c, m)| Capabilities::new(g, c, m))
    }

    proptest! {
        #[test]
        fn prop_detection_is_deterministic(caps in any_caps()) {
            let first = detect_from_caps(&caps);
            let second = detect_from_caps(&caps);
            prop_assert_eq!(first, second);
            prop_assert!(CapabilityTier::ALL.contains(&first));
        }

        #[test]
        fn prop_high_requires_every_feature(caps in any_caps()) {
            if detect_from_caps(&caps) == CapabilityTier::High {
                prop_assert_eq!(caps.graphics, GraphicsProtocol::Kitty);
                prop_assert_eq!(caps.colors, ColorDepth::TrueColor);
                prop_assert!(caps.mouse);
            }
        }
    }
}
