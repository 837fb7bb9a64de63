//! Render shell boundary: how a finished document gets displayed.
//!
//! The core only needs one entry point — submit a document, block until the
//! user is done with it. The embedded browser implementation lives behind
//! the `gui` feature.

use crate::config::Document;
use crate::error::AtomlensError;

#[cfg(feature = "gui")]
pub mod webview;

#[cfg(feature = "gui")]
pub use webview::BrowserShell;

/// Anything that can display a configuration document.
pub trait RenderShell {
    /// Display the document, returning once the display is dismissed.
    fn render(&self, document: &Document) -> Result<(), AtomlensError>;
}
