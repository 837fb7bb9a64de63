//! Embedded browser shell built on winit + wry.
//!
//! Opens a native window, fills it with a wry webview serving the embedded
//! static viewer page over a custom `atomlens://` protocol, and injects the
//! configuration document once the page signals readiness over IPC. The
//! page defines the `defineData` entry point; the bundled page is the mount
//! point a visualizer frontend drops into.

use std::borrow::Cow;
use std::sync::mpsc;
use std::sync::Arc;

use rust_embed::RustEmbed;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowId};
use wry::http::{header::CONTENT_TYPE, Response};
use wry::{dpi, Rect, WebView, WebViewBuilder};

use super::RenderShell;
use crate::config::Document;
use crate::error::AtomlensError;

/// Embedded static viewer page.
#[derive(RustEmbed)]
#[folder = "assets/viewer/"]
struct ViewerAssets;

/// Initial window size in logical pixels.
const WINDOW_SIZE: (u32, u32) = (1280, 800);

/// Embedded browser window displaying a configuration document.
///
/// [`RenderShell::render`] blocks until the user closes the window.
#[derive(Debug, Clone)]
pub struct BrowserShell {
    devtools: bool,
    title: String,
}

impl BrowserShell {
    /// Shell with the default window title and no inspector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            devtools: false,
            title: "atomlens".to_owned(),
        }
    }

    /// Open the developer inspector panel alongside the page.
    #[must_use]
    pub fn with_devtools(mut self, enabled: bool) -> Self {
        self.devtools = enabled;
        self
    }

    /// Window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

impl Default for BrowserShell {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderShell for BrowserShell {
    fn render(&self, document: &Document) -> Result<(), AtomlensError> {
        let json = serde_json::to_string(document)
            .map_err(|e| AtomlensError::Shell(e.to_string()))?;
        let event_loop =
            EventLoop::new().map_err(|e| AtomlensError::Shell(e.to_string()))?;
        let mut app = ShellApp {
            window: None,
            webview: None,
            event_rx: None,
            document_json: json,
            devtools: self.devtools,
            title: self.title.clone(),
            error: None,
        };
        event_loop
            .run_app(&mut app)
            .map_err(|e| AtomlensError::Shell(e.to_string()))?;
        match app.error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Events sent from the page to the native side.
enum PageEvent {
    /// The page finished loading and registered its entry point.
    Ready,
}

struct ShellApp {
    window: Option<Arc<Window>>,
    webview: Option<WebView>,
    event_rx: Option<mpsc::Receiver<PageEvent>>,
    document_json: String,
    devtools: bool,
    title: String,
    error: Option<AtomlensError>,
}

impl ApplicationHandler for ShellApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(WINDOW_SIZE.0, WINDOW_SIZE.1));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.error = Some(AtomlensError::Shell(format!("window creation failed: {e}")));
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        match create_webview(&window, size.width, size.height, self.devtools) {
            Ok((webview, rx)) => {
                if self.devtools {
                    webview.open_devtools();
                }
                self.webview = Some(webview);
                self.event_rx = Some(rx);
            }
            Err(e) => {
                self.error = Some(AtomlensError::Shell(format!("webview creation failed: {e}")));
                event_loop.exit();
                return;
            }
        }
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(_) => {
                if let (Some(window), Some(webview)) = (&self.window, &self.webview) {
                    let size = window.inner_size();
                    let _ = webview.set_bounds(full_bounds(size.width, size.height));
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        let Some(rx) = &self.event_rx else {
            return;
        };
        while let Ok(event) = rx.try_recv() {
            match event {
                PageEvent::Ready => {
                    if let Some(webview) = &self.webview {
                        push_document(webview, &self.document_json);
                    }
                }
            }
        }
    }
}

/// Create the wry webview filling the window.
///
/// Returns `(webview, event_rx)` — the receiver yields [`PageEvent`]s from
/// the page.
fn create_webview(
    window: &Arc<Window>,
    width: u32,
    height: u32,
    devtools: bool,
) -> Result<(WebView, mpsc::Receiver<PageEvent>), wry::Error> {
    let (tx, rx) = mpsc::channel();

    let webview = WebViewBuilder::new()
        .with_bounds(full_bounds(width, height))
        .with_custom_protocol("atomlens".into(), |_id, request| {
            let path = request.uri().path();
            // Default to index.html for the root path.
            let path = if path == "/" { "index.html" } else { &path[1..] };

            match ViewerAssets::get(path) {
                Some(asset) => {
                    let mime = mime_guess::from_path(path)
                        .first_or_octet_stream()
                        .to_string();
                    Response::builder()
                        .header(CONTENT_TYPE, mime)
                        .body(Cow::from(asset.data.to_vec()))
                        .unwrap_or_else(|_| Response::new(Cow::from(Vec::new())))
                }
                None => Response::builder()
                    .status(404)
                    .body(Cow::from(Vec::new()))
                    .unwrap_or_else(|_| Response::new(Cow::from(Vec::new()))),
            }
        })
        .with_url("atomlens://localhost/")
        .with_initialization_script(BRIDGE_JS)
        .with_devtools(devtools)
        .with_ipc_handler(move |req| {
            if let Ok(msg) = serde_json::from_str::<serde_json::Value>(req.body()) {
                if msg.get("event").and_then(serde_json::Value::as_str) == Some("ready") {
                    let _ = tx.send(PageEvent::Ready);
                }
            }
        })
        .build_as_child(window)?;

    Ok((webview, rx))
}

/// The [`Rect`] covering the whole window.
fn full_bounds(width: u32, height: u32) -> Rect {
    Rect {
        position: dpi::Position::Physical(dpi::PhysicalPosition::new(0, 0)),
        size: dpi::Size::Physical(dpi::PhysicalSize::new(width, height)),
    }
}

/// Inject the document via the page's entry point.
fn push_document(webview: &WebView, json: &str) {
    let escaped = json.replace('\\', "\\\\").replace('\'', "\\'");
    let _ = webview.evaluate_script(&format!("window.__atomlens_push_document('{escaped}')"));
}

/// JavaScript injected before page load. Defines the push function the
/// native side calls; documents that arrive before the page registers its
/// `defineData` entry point are buffered and replayed.
const BRIDGE_JS: &str = r"
(function() {
    var pending = null;

    window.__atomlens_push_document = function(json) {
        var doc = JSON.parse(json);
        if (typeof window.defineData === 'function') {
            window.defineData(doc);
        } else {
            pending = doc;
        }
    };

    window.__atomlens_flush_pending = function() {
        if (pending !== null && typeof window.defineData === 'function') {
            var doc = pending;
            pending = null;
            window.defineData(doc);
        }
    };
})();
";
