//! Adaptive terminal dashboard engine.
#![allow(clippy::suboptimal_flops)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::use_self)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::items_after_statements)]
//!
//! One engine renders the same dashboard on any terminal by picking a
//! [`CapabilityTier`] once from the detected features:
//!
//! | tier     | widgets draw with        | output                      |
//! |----------|--------------------------|-----------------------------|
//! | high     | pixels, alpha blending   | Kitty graphics + text cells |
//! | rich     | pixels, ordered dither   | Sixel + text cells          |
//! | standard | Braille / block cells    | half-block cells            |
//! | minimal  | ASCII cells              | plain text cells            |
//!
//! Every frame goes through four layers (background, data, interactive,
//! overlay), each double-buffered, merged by the [`compositor::Compositor`]
//! and written by the tier's presenter.
//!
//! # Example
//!
//! ```no_run
//! use dashtier_terminal::{Capabilities, DashboardApp, DashboardConfig, DashboardEngine};
//!
//! let config = DashboardConfig::from_yaml_str(r#"
//! title: "node"
//! layout: { columns: 1, rows: 1 }
//! widgets:
//!   - type: sparkline
//!     title: "load"
//! "#)?;
//! let engine = DashboardEngine::with_probe(Capabilities::probe(), config)?;
//! let mut app = DashboardApp::new(engine);
//! app.run(|widgets, frame| {
//!     if let Some(spark) = widgets[0].sparkline_mut() {
//!         spark.push((frame as f64 / 10.0).sin());
//!     }
//! })?;
//! # Ok::<(), dashtier_terminal::DashError>(())
//! ```

mod app;
pub mod braille;
pub mod budget;
pub mod caps;
mod color;
pub mod compositor;
pub mod config;
pub mod direct;
mod engine;
mod error;
mod factory;
mod input;
pub mod layer;
pub mod pipeline;
pub mod present;
pub mod raster;
mod series;
pub mod viewport;
pub mod widgets;

pub use app::{CrosstermTerminal, DashboardApp, Terminal, TestTerminal};
pub use braille::BrailleCanvas;
pub use budget::FrameBudget;
pub use caps::{detect_from_caps, Capabilities, CapabilityTier, ColorDepth, EnvProbe, GraphicsProtocol};
pub use color::ColorMode;
pub use compositor::{CompositeStats, Compositor, CompositorMode};
pub use config::{CellPixels, DashboardConfig, GridPlacement, LayoutConfig, WidgetKindSpec, WidgetSpec};
pub use direct::{Cell, CellBuffer, DiffRenderer, FlushStats, Modifiers};
pub use engine::{DashboardEngine, FrameStats, DEFAULT_SIZE};
pub use error::{DashError, Result};
pub use factory::WidgetFactory;
pub use input::{InputHandler, KeyBinding};
pub use layer::{BlendMode, DirtyRegions, DoubleBuffer, LayerId, RenderLayer};
pub use pipeline::{RenderPipeline, Surface};
pub use present::{PresentStats, Presenter};
pub use raster::PixelBuffer;
pub use series::{DataPoint, LineStyle, Series};
pub use viewport::{Viewport, WorldBounds};
pub use widgets::{
    AreaChart, BarChart, DashWidget, Gauge, GaugeZone, Grid, Heatmap, HeatmapPalette, KpiCard, LineChart, Palette,
    RenderMode, Sparkline, StatusBar, Table, TrendDirection, Widget, WidgetKind,
};

// Re-export core types for convenience
pub use dashtier_core::{Color, Event, Key, MouseButton, PixelRect, Point, Rect, Rgba8, Size};
