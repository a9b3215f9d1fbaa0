//! Clipboard access for paste operations.
//!
//! The grid never talks to a clipboard directly; it reads through a
//! [`ClipboardSource`]. [`SystemClipboard`] wraps the `arboard` crate and is
//! available with the `system-clipboard` feature (on by default).
//! [`StaticClipboard`] serves fixed text and is handy for hosts that receive
//! the pasted text in an event payload.
//!
//! # Example
//!
//! ```ignore
//! use lumex_grid::clipboard::SystemClipboard;
//!
//! let report = grid.paste_from_clipboard(&identity, &SystemClipboard::new()).await?;
//! if !report.grid_valid {
//!     println!("{} cells need attention", report.invalid);
//! }
//! ```

use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture};

use crate::error::Result;
#[cfg(feature = "system-clipboard")]
use crate::error::GridError;

/// Something the grid can read pasted text from.
pub trait ClipboardSource: Send + Sync {
    /// Reads the current clipboard text.
    fn read_text(&self) -> BoxFuture<'static, Result<String>>;
}

/// A clipboard holding fixed text.
#[derive(Debug, Clone, Default)]
pub struct StaticClipboard {
    text: String,
}

impl StaticClipboard {
    /// Creates a clipboard that always returns `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl ClipboardSource for StaticClipboard {
    fn read_text(&self) -> BoxFuture<'static, Result<String>> {
        future::ready(Ok(self.text.clone())).boxed()
    }
}

/// The platform clipboard.
///
/// Each read opens the clipboard on a blocking worker thread, so it must be
/// awaited inside a Tokio runtime.
///
/// # Platform Notes
///
/// - **Windows**: Uses the Win32 clipboard API
/// - **macOS**: Uses NSPasteboard
/// - **Linux**: Uses X11 selections or Wayland data-control protocol
#[cfg(feature = "system-clipboard")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

#[cfg(feature = "system-clipboard")]
impl SystemClipboard {
    /// Creates a handle to the platform clipboard.
    pub fn new() -> Self {
        Self
    }

    fn read_blocking() -> Result<String> {
        let mut clipboard = arboard::Clipboard::new().map_err(|e| GridError::clipboard(e.to_string()))?;
        clipboard.get_text().map_err(|e| GridError::clipboard(e.to_string()))
    }
}

#[cfg(feature = "system-clipboard")]
impl ClipboardSource for SystemClipboard {
    fn read_text(&self) -> BoxFuture<'static, Result<String>> {
        async {
            tokio::task::spawn_blocking(Self::read_blocking)
                .await
                .map_err(|e| GridError::clipboard(e.to_string()))?
        }
        .boxed()
    }
}
