use super::{NewWindowRequest, SurfaceId, WindowController, WindowFactory, WindowType};
use log::info;
use url::Url;

/// Window factory used when the host runs without a compositor connection.
///
/// Windows only log what they are asked to do.
#[derive(Debug, Default)]
pub struct LoggingWindowFactory;

impl WindowFactory for LoggingWindowFactory {
    fn create_window(
        &self,
        url: &Url,
        window_type: &WindowType,
        headless: bool,
    ) -> Box<dyn WindowController> {
        info!("Creating {window_type} window for {url} (headless: {headless})");
        Box::new(LoggingWindow {
            url: url.clone(),
            closed_handlers: Vec::new(),
        })
    }
}

struct LoggingWindow {
    url: Url,
    closed_handlers: Vec<Box<dyn FnMut()>>,
}

impl WindowController for LoggingWindow {
    fn show(&mut self) {
        info!("Showing window for {}", self.url);
    }

    fn close(&mut self) {
        info!("Closing window for {}", self.url);
        for handler in &mut self.closed_handlers {
            handler();
        }
    }

    fn execute_script(&mut self, script: &str) {
        info!("Executing script in {}: {script}", self.url);
    }

    fn clear_memory_caches(&mut self) {
        info!("Clearing memory caches of {}", self.url);
    }

    fn attach_surface(&mut self, surface: SurfaceId) {
        info!("Attaching surface {} to window for {}", surface.0, self.url);
    }

    fn on_closed(&mut self, handler: Box<dyn FnMut()>) {
        self.closed_handlers.push(handler);
    }

    fn on_new_window_requested(&mut self, _handler: Box<dyn FnMut(NewWindowRequest)>) {}
}
