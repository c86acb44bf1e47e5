//! Writes a composited frame to the terminal.
//!
//! Order per frame: graphics payload (high and rich tiers), dirty text cells,
//! one writer flush. The payload is skipped when the output pixels equal the
//! previous frame. A failed write forces a full payload on the next frame.

use crate::caps::CapabilityTier;
use crate::color::{palette_rgb, rgb_to_256, ColorMode};
use crate::compositor::Compositor;
use crate::direct::{DiffRenderer, FlushStats};
use crate::raster::PixelBuffer;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use crossterm::cursor::MoveTo;
use crossterm::queue;
use std::io::{self, Write};
use tracing::trace;

/// Base64 bytes per Kitty APC chunk.
pub const KITTY_CHUNK: usize = 4096;
/// Image id reused every frame so each upload replaces the last.
pub const KITTY_IMAGE_ID: u32 = 1;
/// Rows per Sixel band.
pub const SIXEL_BAND: u32 = 6;

/// Counters for one present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresentStats {
    /// Bytes of graphics payload written.
    pub graphics_bytes: usize,
    /// Payload skipped because the pixels did not change.
    pub graphics_skipped: bool,
    /// Cell flush counters.
    pub cells: FlushStats,
}

/// Tier-specific frame writer.
#[derive(Debug)]
pub struct Presenter {
    tier: CapabilityTier,
    renderer: DiffRenderer,
    force_graphics: bool,
    scratch: Vec<u8>,
}

impl Presenter {
    /// Presenter for `tier`, converting cell colors with `color_mode`.
    #[must_use]
    pub fn new(tier: CapabilityTier, color_mode: ColorMode) -> Self {
        Self {
            tier,
            renderer: DiffRenderer::new(color_mode),
            force_graphics: true,
            scratch: Vec::new(),
        }
    }

    /// Tier this presenter encodes for.
    #[must_use]
    pub const fn tier(&self) -> CapabilityTier {
        self.tier
    }

    /// Cell renderer.
    #[must_use]
    pub const fn renderer(&self) -> &DiffRenderer {
        &self.renderer
    }

    /// Forget terminal state; the next present resends everything it has.
    pub fn invalidate(&mut self) {
        self.force_graphics = true;
        self.renderer.reset();
    }

    /// Write the compositor's frame.
    ///
    /// # Errors
    ///
    /// Returns any writer error. The presenter then invalidates itself and
    /// marks every text cell dirty so the next call repeats the whole frame.
    pub fn present<W: Write>(&mut self, compositor: &mut Compositor, writer: &mut W) -> io::Result<PresentStats> {
        let result = self.write_frame(compositor, writer);
        if result.is_err() {
            self.invalidate();
            compositor.text_mut().mark_all_dirty();
        }
        result
    }

    fn write_frame<W: Write>(&mut self, compositor: &mut Compositor, writer: &mut W) -> io::Result<PresentStats> {
        let mut stats = PresentStats::default();

        if self.tier.has_graphics() {
            if self.force_graphics || !compositor.output_unchanged() {
                self.scratch.clear();
                match self.tier {
                    CapabilityTier::High => encode_kitty(compositor.output(), &mut self.scratch)?,
                    CapabilityTier::Rich => encode_sixel(compositor.output(), &mut self.scratch)?,
                    CapabilityTier::Standard | CapabilityTier::Minimal => {}
                }
                if !self.scratch.is_empty() {
                    queue!(writer, MoveTo(0, 0))?;
                    writer.write_all(&self.scratch)?;
                    self.renderer.reset();
                    if self.tier == CapabilityTier::Rich {
                        repaint_text(compositor);
                    }
                }
                stats.graphics_bytes = self.scratch.len();
            } else {
                stats.graphics_skipped = true;
            }
        }

        stats.cells = self.renderer.flush(compositor.text_mut(), writer)?;
        writer.flush()?;
        self.force_graphics = false;

        trace!(
            tier = self.tier.name(),
            graphics_bytes = stats.graphics_bytes,
            skipped = stats.graphics_skipped,
            cells = stats.cells.cells_written,
            "present"
        );
        Ok(stats)
    }
}

/// Sixel paints over cells, so visible text is redrawn after the image.
fn repaint_text(compositor: &mut Compositor) {
    let text = compositor.text_mut();
    for idx in 0..text.len() {
        if !text.cells()[idx].is_blank() {
            let (x, y) = text.coords(idx);
            text.mark_dirty(x, y);
        }
    }
}

/// Encode `pixels` as a Kitty graphics transmit-and-display command.
///
/// RGBA data (`f=32`) is base64 encoded and split into [`KITTY_CHUNK`]
/// sized APC sequences. The image sits below the text (`z=-1`) and does not
/// move the cursor (`C=1`). Empty buffers encode to nothing.
///
/// # Errors
///
/// Returns any error from `out`.
pub fn encode_kitty<W: Write>(pixels: &PixelBuffer, out: &mut W) -> io::Result<()> {
    if pixels.width() == 0 || pixels.height() == 0 {
        return Ok(());
    }
    let mut raw = Vec::with_capacity(pixels.pixels().len() * 4);
    for px in pixels.pixels() {
        raw.extend_from_slice(&[px.r, px.g, px.b, px.a]);
    }
    let encoded = STANDARD.encode(&raw);
    let chunks: Vec<&[u8]> = encoded.as_bytes().chunks(KITTY_CHUNK).collect();
    let last = chunks.len().saturating_sub(1);

    for (i, chunk) in chunks.iter().enumerate() {
        let more = u8::from(i != last);
        if i == 0 {
            write!(
                out,
                "\x1b_Ga=T,f=32,s={},v={},i={KITTY_IMAGE_ID},q=2,z=-1,C=1,m={more};",
                pixels.width(),
                pixels.height()
            )?;
        } else {
            write!(out, "\x1b_Gm={more};")?;
        }
        out.write_all(chunk)?;
        out.write_all(b"\x1b\\")?;
    }
    Ok(())
}

/// Encode `pixels` as a Sixel image on the 256-entry xterm palette.
///
/// Transparent pixels leave the terminal background (`P2=1`). Each
/// [`SIXEL_BAND`]-row band emits one pass per register in use; runs longer
/// than three are compressed as `!n`.
///
/// # Errors
///
/// Returns any error from `out`.
pub fn encode_sixel<W: Write>(pixels: &PixelBuffer, out: &mut W) -> io::Result<()> {
    let (w, h) = (pixels.width(), pixels.height());
    if w == 0 || h == 0 {
        return Ok(());
    }

    let registers: Vec<Option<u8>> = pixels
        .pixels()
        .iter()
        .map(|px| (!px.is_transparent()).then(|| rgb_to_256(px.r, px.g, px.b)))
        .collect();

    let mut used = [false; 256];
    for index in registers.iter().flatten() {
        used[usize::from(*index)] = true;
    }

    write!(out, "\x1bP0;1;0q\"1;1;{w};{h}")?;
    for (index, _) in used.iter().enumerate().filter(|(_, u)| **u) {
        let (r, g, b) = palette_rgb(index as u8);
        write!(
            out,
            "#{index};2;{};{};{}",
            u32::from(r) * 100 / 255,
            u32::from(g) * 100 / 255,
            u32::from(b) * 100 / 255
        )?;
    }

    let stride = w as usize;
    let mut row = Vec::with_capacity(stride);
    for top in (0..h).step_by(SIXEL_BAND as usize) {
        let band_rows = (h - top).min(SIXEL_BAND);
        let mut in_band = [false; 256];
        for dy in 0..band_rows {
            let start = (top + dy) as usize * stride;
            for index in registers[start..start + stride].iter().flatten() {
                in_band[usize::from(*index)] = true;
            }
        }

        for (index, _) in in_band.iter().enumerate().filter(|(_, u)| **u) {
            row.clear();
            for x in 0..stride {
                let mut bits = 0u8;
                for dy in 0..band_rows {
                    let idx = (top + dy) as usize * stride + x;
                    if registers[idx] == Some(index as u8) {
                        bits |= 1 << dy;
                    }
                }
                row.push(b'?' + bits);
            }
            write!(out, "#{index}")?;
            write_rle(&row, out)?;
            out.write_all(b"$")?;
        }
        out.write_all(b"-")?;
    }
    out.write_all(b"\x1b\\")
}

fn write_rle<W: Write>(row: &[u8], out: &mut W) -> io::Result<()> {
    let mut i = 0;
    while i < row.len() {
        let c = row[i];
        let run = row[i..].iter().take_while(|&&b| b == c).count();
        if run > 3 {
            write!(out, "!{run}")?;
            out.write_all(&[c])?;
        } else {
            for _ in 0..run {
                out.write_all(&[c])?;
            }
        }
        i += run;
    }
    Ok(())
}
