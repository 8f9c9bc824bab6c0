//! Window seam.
//!
//! Presentation and rendering live outside this crate; the runtime only sees
//! windows through [`WindowController`] and creates them through a
//! [`WindowFactory`].

pub mod logging;

pub use logging::LoggingWindowFactory;

use log::debug;
use std::fmt;
use url::Url;

/// Identifies a window created for a runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(u64);

impl WindowId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window-{}", self.0)
    }
}

/// Handle of a content surface created by page content for a new window.
///
/// The renderer owns the surface; the handle is only passed along to the
/// window that should display it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

/// Kind of surface the compositor should create for a window.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WindowType {
    #[default]
    Card,
    Dashboard,
    PopupAlert,
    BannerAlert,
    Overlay,
}

impl WindowType {
    /// Type of every window spawned from page content.
    pub const CHILD: Self = Self::Card;

    /// Map a launch hint to a window type, falling back to a card.
    pub fn from_hint(hint: &str) -> Self {
        match hint {
            "card" => Self::Card,
            "dashboard" => Self::Dashboard,
            "popupalert" => Self::PopupAlert,
            "banneralert" => Self::BannerAlert,
            "overlay" => Self::Overlay,
            other => {
                debug!("Unknown window type hint '{other}', using {}", Self::CHILD);
                Self::CHILD
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Dashboard => "dashboard",
            Self::PopupAlert => "popupalert",
            Self::BannerAlert => "banneralert",
            Self::Overlay => "overlay",
        }
    }
}

impl fmt::Display for WindowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request from page content to open `url` in a new window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWindowRequest {
    pub url: Url,
    pub surface: SurfaceId,
}

/// One on-screen surface bound to a URL.
pub trait WindowController {
    fn show(&mut self);

    /// Close the window. Implementations raise the closed event.
    fn close(&mut self);

    fn execute_script(&mut self, script: &str);

    /// Drop cached page resources to free memory.
    fn clear_memory_caches(&mut self);

    /// Display a content surface created elsewhere instead of loading the URL.
    fn attach_surface(&mut self, surface: SurfaceId);

    /// Subscribe to the window being closed, by the user or by `close`.
    fn on_closed(&mut self, handler: Box<dyn FnMut()>);

    /// Subscribe to page content asking for a new window.
    fn on_new_window_requested(&mut self, handler: Box<dyn FnMut(NewWindowRequest)>);
}

/// Creates windows for runtimes.
pub trait WindowFactory {
    fn create_window(
        &self,
        url: &Url,
        window_type: &WindowType,
        headless: bool,
    ) -> Box<dyn WindowController>;
}
