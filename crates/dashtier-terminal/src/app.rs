//! Dashboard application runner.
//!
//! One cooperative loop per frame: resize check, producer callback, render,
//! then input polled until the next frame is due.

use crate::engine::{DashboardEngine, FrameStats};
use crate::error::{DashError, Result};
use crate::input::InputHandler;
use crate::widgets::Widget;
use crossterm::{
    cursor,
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent},
    execute,
    terminal::{self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dashtier_core::Event;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io::{self, Stdout, Write};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Terminal abstraction for testability.
pub trait Terminal {
    /// Enter raw mode and the alternate screen.
    fn enter(&mut self) -> Result<()>;
    /// Leave the alternate screen and raw mode.
    fn leave(&mut self) -> Result<()>;
    /// Terminal size (columns, rows).
    fn size(&self) -> Result<(u16, u16)>;
    /// Wait up to `timeout` for an event.
    fn poll(&self, timeout: Duration) -> Result<bool>;
    /// Read the next event.
    fn read_event(&self) -> Result<CrosstermEvent>;
    /// Frame output.
    fn output(&mut self) -> &mut dyn Write;
    /// Enable mouse capture.
    fn enable_mouse(&mut self) -> Result<()>;
    /// Disable mouse capture.
    fn disable_mouse(&mut self) -> Result<()>;
}

/// Real terminal on stdout.
pub struct CrosstermTerminal {
    stdout: Stdout,
}

impl CrosstermTerminal {
    /// Terminal on the process stdout.
    #[must_use]
    pub fn new() -> Self {
        Self { stdout: io::stdout() }
    }
}

impl Default for CrosstermTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CrosstermTerminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrosstermTerminal").finish_non_exhaustive()
    }
}

impl Terminal for CrosstermTerminal {
    fn enter(&mut self) -> Result<()> {
        enable_raw_mode()?;
        execute!(self.stdout, EnterAlternateScreen, cursor::Hide)?;
        Ok(())
    }

    fn leave(&mut self) -> Result<()> {
        // Restore as much as possible even if one step fails
        let screen = execute!(self.stdout, cursor::Show, LeaveAlternateScreen);
        disable_raw_mode()?;
        screen?;
        Ok(())
    }

    fn size(&self) -> Result<(u16, u16)> {
        terminal::size().map_err(|_| DashError::TerminalNotAvailable)
    }

    fn poll(&self, timeout: Duration) -> Result<bool> {
        Ok(event::poll(timeout)?)
    }

    fn read_event(&self) -> Result<CrosstermEvent> {
        Ok(event::read()?)
    }

    fn output(&mut self) -> &mut dyn Write {
        &mut self.stdout
    }

    fn enable_mouse(&mut self) -> Result<()> {
        execute!(self.stdout, EnableMouseCapture)?;
        Ok(())
    }

    fn disable_mouse(&mut self) -> Result<()> {
        execute!(self.stdout, DisableMouseCapture)?;
        Ok(())
    }
}

/// In-memory terminal with scripted events.
///
/// A scripted `Resize` event also changes the reported size.
#[derive(Debug)]
pub struct TestTerminal<W: Write> {
    writer: W,
    size: Cell<(u16, u16)>,
    events: RefCell<VecDeque<CrosstermEvent>>,
    entered: bool,
    mouse_captured: bool,
}

impl<W: Write> TestTerminal<W> {
    /// Terminal writing to `writer` with the given size.
    pub fn new(writer: W, columns: u16, rows: u16) -> Self {
        Self {
            writer,
            size: Cell::new((columns, rows)),
            events: RefCell::new(VecDeque::new()),
            entered: false,
            mouse_captured: false,
        }
    }

    /// Queue events returned by `read_event`.
    #[must_use]
    pub fn with_events(self, events: Vec<CrosstermEvent>) -> Self {
        *self.events.borrow_mut() = events.into_iter().collect();
        self
    }

    /// Check if the terminal is between `enter` and `leave`.
    pub const fn is_entered(&self) -> bool {
        self.entered
    }

    /// Check if mouse capture is on.
    pub const fn is_mouse_captured(&self) -> bool {
        self.mouse_captured
    }

    /// Get the underlying writer (consumes self).
    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<W: Write> Terminal for TestTerminal<W> {
    fn enter(&mut self) -> Result<()> {
        self.entered = true;
        Ok(())
    }

    fn leave(&mut self) -> Result<()> {
        self.entered = false;
        Ok(())
    }

    fn size(&self) -> Result<(u16, u16)> {
        Ok(self.size.get())
    }

    fn poll(&self, _timeout: Duration) -> Result<bool> {
        Ok(!self.events.borrow().is_empty())
    }

    fn read_event(&self) -> Result<CrosstermEvent> {
        let event = self
            .events
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| DashError::Io(io::Error::new(io::ErrorKind::WouldBlock, "no events")))?;
        if let CrosstermEvent::Resize(columns, rows) = event {
            self.size.set((columns, rows));
        }
        Ok(event)
    }

    fn output(&mut self) -> &mut dyn Write {
        &mut self.writer
    }

    fn enable_mouse(&mut self) -> Result<()> {
        self.mouse_captured = true;
        Ok(())
    }

    fn disable_mouse(&mut self) -> Result<()> {
        self.mouse_captured = false;
        Ok(())
    }
}

/// Engine plus widgets plus the frame loop.
#[derive(Debug)]
pub struct DashboardApp {
    engine: DashboardEngine,
    widgets: Vec<Widget>,
    input: InputHandler,
    enable_mouse: bool,
    frame_limit: Option<u64>,
    frames: u64,
    should_quit: bool,
    last_stats: Option<FrameStats>,
}

impl DashboardApp {
    /// App with the widgets described by the engine's config.
    #[must_use]
    pub fn new(engine: DashboardEngine) -> Self {
        let widgets = engine.build_widgets();
        Self {
            enable_mouse: engine.capabilities().mouse,
            engine,
            widgets,
            input: InputHandler::with_quit_bindings(),
            frame_limit: None,
            frames: 0,
            should_quit: false,
            last_stats: None,
        }
    }

    /// Replace the widget list.
    #[must_use]
    pub fn with_widgets(mut self, widgets: Vec<Widget>) -> Self {
        self.widgets = widgets;
        self
    }

    /// Set the input handler.
    #[must_use]
    pub fn with_input_handler(mut self, handler: InputHandler) -> Self {
        self.input = handler;
        self
    }

    /// Enable or disable mouse capture.
    #[must_use]
    pub fn with_mouse(mut self, enabled: bool) -> Self {
        self.enable_mouse = enabled;
        self
    }

    /// Stop after `frames` frames.
    #[must_use]
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    /// The engine.
    #[must_use]
    pub const fn engine(&self) -> &DashboardEngine {
        &self.engine
    }

    /// Widgets in drawing order.
    #[must_use]
    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    /// Mutable widgets.
    pub fn widgets_mut(&mut self) -> &mut [Widget] {
        &mut self.widgets
    }

    /// Frames rendered by the last run.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Stats of the last presented frame.
    #[must_use]
    pub const fn last_stats(&self) -> Option<&FrameStats> {
        self.last_stats.as_ref()
    }

    /// Request the loop to exit after the current frame.
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Run on the real terminal until quit.
    ///
    /// `producer` updates widget data before each frame.
    ///
    /// # Errors
    ///
    /// Returns terminal setup errors and non-I/O render errors.
    pub fn run<F>(&mut self, producer: F) -> Result<()>
    where
        F: FnMut(&mut [Widget], u64),
    {
        self.run_with_terminal(CrosstermTerminal::new(), producer)
    }

    /// Run on a custom terminal. This is the testable entry point.
    ///
    /// # Errors
    ///
    /// As [`DashboardApp::run`].
    pub fn run_with_terminal<T, F>(&mut self, mut terminal: T, mut producer: F) -> Result<()>
    where
        T: Terminal,
        F: FnMut(&mut [Widget], u64),
    {
        terminal.enter()?;
        if self.enable_mouse {
            terminal.enable_mouse()?;
        }

        let result = self.run_loop(&mut terminal, &mut producer);

        let mouse = if self.enable_mouse {
            terminal.disable_mouse()
        } else {
            Ok(())
        };
        let leave = terminal.leave();
        self.engine.shutdown();
        result.and(mouse).and(leave)
    }

    fn run_loop<T, F>(&mut self, terminal: &mut T, producer: &mut F) -> Result<()>
    where
        T: Terminal,
        F: FnMut(&mut [Widget], u64),
    {
        let frame_duration = self.engine.frame_budget().frame_duration();
        self.should_quit = false;
        self.frames = 0;

        loop {
            let frame_start = Instant::now();

            let (columns, rows) = terminal.size()?;
            if (columns, rows) != self.engine.size() {
                self.engine.resize(columns, rows)?;
                self.engine.relayout(&mut self.widgets);
                debug!(columns, rows, "terminal resized");
            }

            producer(&mut self.widgets, self.frames);

            let mut out = terminal.output();
            match self.engine.render(&mut self.widgets, &mut out) {
                Ok(stats) => self.last_stats = Some(stats),
                Err(DashError::Io(err)) => warn!(error = %err, "frame write failed"),
                Err(err) => return Err(err),
            }
            self.frames += 1;
            if self.frame_limit.is_some_and(|limit| self.frames >= limit) {
                break;
            }

            let mut timeout = frame_duration.saturating_sub(frame_start.elapsed());
            while !self.should_quit && terminal.poll(timeout)? {
                timeout = Duration::ZERO;
                let raw = terminal.read_event()?;
                if self.input.action_for(&raw) == Some("quit") {
                    self.should_quit = true;
                    break;
                }
                match self.input.convert(raw) {
                    // Size is re-read at the top of the next frame
                    Some(Event::Resize { .. }) | None => {}
                    Some(event) => {
                        self.engine.dispatch_input(&mut self.widgets, &event);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caps::{Capabilities, CapabilityTier, ColorDepth, GraphicsProtocol};
    use crate::config::{DashboardConfig, GridPlacement, LayoutConfig, WidgetKindSpec, WidgetSpec};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn key(code: KeyCode) -> CrosstermEvent {
        CrosstermEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn app() -> DashboardApp {
        let config = DashboardConfig {
            tier_override: Some(CapabilityTier::Minimal),
            layout: LayoutConfig {
                columns: 1,
                rows: 1,
                gap: 0,
            },
            widgets: vec![WidgetSpec::new(
                WidgetKindSpec::Table {
                    columns: vec!["n".into()],
                    max_rows: None,
                },
                GridPlacement::new(0, 0),
            )],
            ..DashboardConfig::default()
        };
        let caps = Capabilities::new(GraphicsProtocol::None, ColorDepth::Ansi16, true);
        DashboardApp::new(DashboardEngine::with_size(caps, config, 20, 8).unwrap())
    }

    #[test]
    fn test_quit_key_stops_loop() {
        let mut app = app();
        let term = TestTerminal::new(Vec::new(), 20, 8).with_events(vec![key(KeyCode::Char('q'))]);
        app.run_with_terminal(term, |_, _| {}).unwrap();
        assert_eq!(app.frames(), 1);
        assert!(app.engine().is_shut_down());
    }

    #[test]
    fn test_frame_limit() {
        let mut app = app().with_frame_limit(3);
        let mut seen = Vec::new();
        app.run_with_terminal(TestTerminal::new(Vec::new(), 20, 8), |_, frame| seen.push(frame))
            .unwrap();
        assert_eq!(seen, vec![0, 1, 2]);
        assert_eq!(app.last_stats().map(|s| s.frame), Some(3));
    }

    #[test]
    fn test_producer_data_and_input_dispatch() {
        let mut app = app();
        let term = TestTerminal::new(Vec::new(), 20, 8)
            .with_events(vec![key(KeyCode::Down), key(KeyCode::Down), key(KeyCode::Esc)]);
        app.run_with_terminal(term, |widgets, _| {
            if let Some(table) = widgets[0].table_mut() {
                table.set_rows((0..5).map(|i| vec![i.to_string()]).collect());
            }
        })
        .unwrap();
        assert_eq!(app.widgets()[0].table().and_then(|t| t.selected()), Some(1));
    }

    #[test]
    fn test_resize_event_relayouts() {
        let mut app = app().with_frame_limit(2);
        let term = TestTerminal::new(Vec::new(), 20, 8).with_events(vec![CrosstermEvent::Resize(30, 10)]);
        app.run_with_terminal(term, |_, _| {}).unwrap();
        assert_eq!(app.engine().size(), (30, 10));
        assert_eq!(app.widgets()[0].bounds.width, 30.0);
    }

    #[test]
    fn test_mouse_capture_follows_caps() {
        let app = app();
        assert!(app.enable_mouse);
        assert!(!app.with_mouse(false).enable_mouse);
    }

    #[test]
    fn test_frames_written_to_output() {
        let mut app = app().with_frame_limit(1);
        let mut term = TestTerminal::new(Vec::new(), 20, 8);
        term.enter().unwrap();
        app.run_loop(&mut term, &mut |_: &mut [Widget], _: u64| {}).unwrap();
        assert!(term.is_entered());
        let out = String::from_utf8_lossy(&term.into_writer()).into_owned();
        assert!(out.contains('n'));
    }
}
