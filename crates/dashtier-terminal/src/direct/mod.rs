//! Direct crossterm text backend.
//!
//! ```text
//! layer text planes → compositor output plane → DiffRenderer → crossterm
//! ```
//!
//! Cells store graphemes inline, dirty bits limit output to changed cells,
//! and the renderer batches commands into the caller's writer.

mod cell_buffer;
mod diff_renderer;

pub use cell_buffer::{Cell, CellBuffer, Modifiers};
pub use diff_renderer::{DiffRenderer, FlushStats};
