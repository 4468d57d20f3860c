//! Display sinks
//!
//! A sink is the imperative update path into a visible text field. The
//! animator pushes every intermediate value through it without going through
//! any host redraw machinery.

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{Result, SinkError};

/// Receives the text to display immediately
pub trait DisplaySink: Send {
    /// Replace the displayed text
    ///
    /// Returning [`SinkError::Unavailable`] tells the animator the field is
    /// gone and the running animation should stop.
    fn set_display_text(&mut self, text: &str) -> Result<()>;
}

impl DisplaySink for Box<dyn DisplaySink> {
    fn set_display_text(&mut self, text: &str) -> Result<()> {
        (**self).set_display_text(text)
    }
}

// ============================================================================
// Closure Sink
// ============================================================================

/// Adapts any `FnMut(&str)` into an infallible sink
pub struct FnSink<F> {
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(&str) + Send,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> DisplaySink for FnSink<F>
where
    F: FnMut(&str) + Send,
{
    fn set_display_text(&mut self, text: &str) -> Result<()> {
        (self.f)(text);
        Ok(())
    }
}

// ============================================================================
// Shared Text Buffer
// ============================================================================

#[derive(Debug, Default)]
struct TextBufferState {
    text: String,
    history: Vec<String>,
    detached: bool,
}

/// A shared in-memory text field
///
/// Clones refer to the same field, so a host can keep one clone for reading
/// while the animator writes through another. Every published string is kept
/// in [`history`](Self::history).
#[derive(Clone, Debug, Default)]
pub struct TextBuffer {
    state: Arc<Mutex<TextBufferState>>,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The text currently displayed
    pub fn text(&self) -> String {
        self.lock().text.clone()
    }

    /// Every string published so far, oldest first
    pub fn history(&self) -> Vec<String> {
        self.lock().history.clone()
    }

    /// Number of times the text has been set
    pub fn update_count(&self) -> usize {
        self.lock().history.len()
    }

    pub fn clear_history(&self) {
        self.lock().history.clear();
    }

    /// Mark the field as torn down; further updates report `Unavailable`
    pub fn detach(&self) {
        self.lock().detached = true;
    }

    pub fn is_detached(&self) -> bool {
        self.lock().detached
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TextBufferState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DisplaySink for TextBuffer {
    fn set_display_text(&mut self, text: &str) -> Result<()> {
        let mut state = self.lock();
        if state.detached {
            return Err(SinkError::Unavailable);
        }
        state.text.clear();
        state.text.push_str(text);
        state.history.push(text.to_owned());
        Ok(())
    }
}

// ============================================================================
// Terminal Line Sink
// ============================================================================

/// Rewrites a single terminal line in place
pub struct WriterSink<W> {
    writer: W,
    width: usize,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, width: 0 }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> DisplaySink for WriterSink<W> {
    fn set_display_text(&mut self, text: &str) -> Result<()> {
        let len = text.chars().count();
        // Pad over leftovers when the text gets shorter (e.g. 100 -> 96)
        let pad = self.width.saturating_sub(len);
        write!(self.writer, "\r{}{}", text, " ".repeat(pad))?;
        self.writer.flush()?;
        self.width = len;
        Ok(())
    }
}
