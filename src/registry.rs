use crate::bus::CallChannel;
use crate::description::ApplicationDescription;
use crate::runtime::{AppRuntime, RuntimeContext, RuntimeEvent};
use crate::window::{WindowFactory, WindowType};
use log::{debug, info};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver};

/// Owns every running application of the host and routes their events.
pub struct RuntimeRegistry {
    context: RuntimeContext,
    events: Receiver<RuntimeEvent>,
    runtimes: HashMap<String, AppRuntime>,
}

impl RuntimeRegistry {
    pub fn new(channel: Rc<dyn CallChannel>, windows: Rc<dyn WindowFactory>) -> Self {
        let (sender, events) = mpsc::channel();
        Self {
            context: RuntimeContext {
                channel,
                windows,
                events: sender,
            },
            events,
            runtimes: HashMap::new(),
        }
    }

    /// Start an application instance, or relaunch it with `parameters` if
    /// the same instance is already running. Returns its identifier.
    pub fn launch(
        &mut self,
        description: ApplicationDescription,
        parameters: &str,
        process_id: &str,
    ) -> String {
        let identifier = format!("{}-{process_id}", description.id());

        if let Some(runtime) = self.runtimes.get_mut(&identifier) {
            runtime.relaunch(parameters);
            return identifier;
        }

        let url = description.entry_point().clone();
        let mut runtime = AppRuntime::new(
            &self.context,
            &url,
            &WindowType::Card,
            description,
            parameters,
            process_id,
        );
        runtime.run();

        info!("Launched application {identifier} from {url}");
        self.runtimes.insert(identifier.clone(), runtime);
        identifier
    }

    /// Handle every queued runtime event. Returns how many were handled.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events.try_recv() {
            self.handle(event);
            handled += 1;
        }
        handled
    }

    /// Wait for and handle runtime events until no application is left.
    pub fn run_until_idle(&mut self) {
        while !self.runtimes.is_empty() {
            match self.events.recv() {
                Ok(event) => self.handle(event),
                Err(_) => break,
            }
        }
        debug!("No applications left");
    }

    /// Tear down an application instance. Returns false if it is unknown.
    pub fn close(&mut self, identifier: &str) -> bool {
        match self.runtimes.remove(identifier) {
            Some(runtime) => {
                info!("Closing application {identifier}");
                runtime.destroy();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, identifier: &str) -> Option<&AppRuntime> {
        self.runtimes.get(identifier)
    }

    pub fn get_mut(&mut self, identifier: &str) -> Option<&mut AppRuntime> {
        self.runtimes.get_mut(identifier)
    }

    pub fn len(&self) -> usize {
        self.runtimes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runtimes.is_empty()
    }

    fn handle(&mut self, event: RuntimeEvent) {
        let Some(runtime) = self.runtimes.get_mut(event.identifier()) else {
            debug!("Ignoring event for unknown application: {event:?}");
            return;
        };

        match event {
            RuntimeEvent::Closed { identifier } => {
                info!("Application {identifier} was closed");
                if let Some(runtime) = self.runtimes.remove(&identifier) {
                    runtime.destroy();
                }
            }
            RuntimeEvent::NewWindowRequested {
                identifier,
                request,
            } => {
                let window = runtime.handle_new_window_request(&request);
                debug!("Opened {window} for application {identifier}");
            }
            RuntimeEvent::WindowClosed { identifier, window } => {
                if runtime.release_window(window) {
                    debug!("Released {window} of application {identifier}");
                }
            }
            RuntimeEvent::ReadyChanged { identifier, ready } => {
                debug!("Application {identifier} ready: {ready}");
            }
            RuntimeEvent::ParametersChanged { identifier } => {
                debug!(
                    "Application {identifier} parameters changed to {}",
                    runtime.parameters()
                );
            }
        }
    }
}
