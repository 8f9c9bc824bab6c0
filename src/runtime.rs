//! One running application instance.
//!
//! An [`AppRuntime`] owns the main window of the application, keeps the
//! instance registered with the activity manager and turns window callbacks
//! into [`RuntimeEvent`]s for whoever owns it. Activity manager failures are
//! logged and never stop the application from running.

use crate::activity::{ActivityRegistrar, ActivityToken};
use crate::bus::CallChannel;
use crate::description::ApplicationDescription;
use crate::error::FocusDirection;
use crate::window::{NewWindowRequest, WindowController, WindowFactory, WindowId, WindowType};
use log::{debug, warn};
use serde_json::Value;
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;
use std::sync::mpsc::Sender;
use url::Url;

/// Notifications raised by a runtime, tagged with its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEvent {
    /// The main window was closed; the runtime should be torn down.
    Closed { identifier: String },
    ReadyChanged { identifier: String, ready: bool },
    ParametersChanged { identifier: String },
    /// Page content in one of the runtime's windows asked for a new window.
    NewWindowRequested {
        identifier: String,
        request: NewWindowRequest,
    },
    /// A child window was closed by the user.
    WindowClosed { identifier: String, window: WindowId },
}

impl RuntimeEvent {
    pub fn identifier(&self) -> &str {
        match self {
            Self::Closed { identifier }
            | Self::ReadyChanged { identifier, .. }
            | Self::ParametersChanged { identifier }
            | Self::NewWindowRequested { identifier, .. }
            | Self::WindowClosed { identifier, .. } => identifier,
        }
    }
}

/// Collaborators shared by every runtime of a host.
#[derive(Clone)]
pub struct RuntimeContext {
    pub channel: Rc<dyn CallChannel>,
    pub windows: Rc<dyn WindowFactory>,
    pub events: Sender<RuntimeEvent>,
}

pub struct AppRuntime {
    description: ApplicationDescription,
    process_id: String,
    identifier: String,
    parameters: String,
    ready: bool,
    registrar: ActivityRegistrar,
    main_window: Box<dyn WindowController>,
    child_windows: Vec<(WindowId, Box<dyn WindowController>)>,
    next_window_id: u64,
    windows: Rc<dyn WindowFactory>,
    events: Sender<RuntimeEvent>,
}

impl AppRuntime {
    /// Create the main window for `url` and register with the activity
    /// manager. The window is not shown until [`AppRuntime::run`].
    pub fn new(
        context: &RuntimeContext,
        url: &Url,
        window_type: &WindowType,
        description: ApplicationDescription,
        parameters: &str,
        process_id: &str,
    ) -> Self {
        let identifier = format!("{}-{process_id}", description.id());

        let mut main_window =
            context
                .windows
                .create_window(url, window_type, description.headless());

        let events = context.events.clone();
        let closed_identifier = identifier.clone();
        let app_id = description.id().to_string();
        main_window.on_closed(Box::new(move || {
            debug!("Main application window {app_id} was closed");
            emit(
                &events,
                RuntimeEvent::Closed {
                    identifier: closed_identifier.clone(),
                },
            );
        }));
        forward_new_window_requests(main_window.as_mut(), &context.events, &identifier);

        let mut registrar =
            ActivityRegistrar::new(Rc::clone(&context.channel), description.id(), &identifier);
        if let Err(e) = registrar.register(process_id) {
            warn!("Application {}: {e}", description.id());
        }

        Self {
            description,
            process_id: process_id.to_string(),
            identifier,
            parameters: parameters.to_string(),
            ready: false,
            registrar,
            main_window,
            child_windows: Vec::new(),
            next_window_id: 0,
            windows: Rc::clone(&context.windows),
            events: context.events.clone(),
        }
    }

    pub fn run(&mut self) {
        if !self.headless() {
            self.main_window.show();
        }
    }

    /// Hand new launch parameters to the already running content.
    pub fn relaunch(&mut self, parameters: &str) {
        debug!(
            "Relaunching application {} with parameters {parameters}",
            self.id()
        );

        self.parameters = parameters.to_string();
        self.emit(RuntimeEvent::ParametersChanged {
            identifier: self.identifier.clone(),
        });
        self.main_window.execute_script(&relaunch_script(parameters));
    }

    /// Open a window for content that asked for one.
    ///
    /// Child windows are always visible cards, whatever the application's
    /// headless flag says.
    pub fn handle_new_window_request(&mut self, request: &NewWindowRequest) -> WindowId {
        debug!("Creating new window for url {}", request.url);

        let mut window = self
            .windows
            .create_window(&request.url, &WindowType::CHILD, false);
        window.attach_surface(request.surface);

        self.next_window_id += 1;
        let id = WindowId::new(self.next_window_id);

        let events = self.events.clone();
        let identifier = self.identifier.clone();
        window.on_closed(Box::new(move || {
            emit(
                &events,
                RuntimeEvent::WindowClosed {
                    identifier: identifier.clone(),
                    window: id,
                },
            );
        }));
        forward_new_window_requests(window.as_mut(), &self.events, &self.identifier);

        window.show();
        self.child_windows.push((id, window));
        id
    }

    /// Close a child window. Returns false if the runtime does not own it.
    pub fn close_window(&mut self, id: WindowId) -> bool {
        match self.take_window(id) {
            Some(mut window) => {
                window.close();
                true
            }
            None => false,
        }
    }

    /// Forget a child window the user already closed.
    pub fn release_window(&mut self, id: WindowId) -> bool {
        self.take_window(id).is_some()
    }

    pub fn child_window_count(&self) -> usize {
        self.child_windows.len()
    }

    /// Close the main window, which ends the application.
    pub fn kill(&mut self) {
        debug!("Killing application {}", self.identifier);
        self.main_window.close();
    }

    pub fn change_activity_focus(&self, focus: bool) {
        let direction = FocusDirection::from_focused(focus);
        if let Err(e) = self.registrar.change_focus(direction) {
            warn!("Application {}: {e}", self.id());
        }
    }

    pub fn stage_preparing(&mut self) {
        self.set_ready(false);
    }

    pub fn stage_ready(&mut self) {
        self.set_ready(true);
    }

    /// Whether the application may read the local file at `path`.
    ///
    /// Applications loaded from the network never get access to local
    /// resources. Privileged applications may read anything, all others only
    /// what lies inside their install directory.
    pub fn validate_resource_path(&self, path: &Path) -> bool {
        if self.has_remote_entry_point() {
            return false;
        }
        if self.privileged() {
            return true;
        }
        let Ok(entry) = self.description.entry_point().to_file_path() else {
            return false;
        };
        let Some(base) = entry.parent() else {
            return false;
        };
        normalize(path).starts_with(normalize(base))
    }

    /// Whether the application may open `url` in one of its windows.
    ///
    /// Local files follow [`AppRuntime::validate_resource_path`]. Remote URLs
    /// are allowed for privileged applications, on the entry point's origin
    /// and when they match one of the application's allowed URL patterns.
    pub fn is_url_allowed(&self, url: &Url) -> bool {
        if url.scheme() == "file" {
            return url
                .to_file_path()
                .is_ok_and(|path| self.validate_resource_path(&path));
        }
        if self.privileged() || url.origin() == self.url().origin() {
            return true;
        }
        self.description
            .urls_allowed()
            .iter()
            .any(|pattern| url_matches(pattern, url))
    }

    /// Ask every window of the application to drop its cached resources.
    pub fn clear_memory_caches(&mut self) {
        debug!("Clearing memory caches of application {}", self.identifier);
        self.main_window.clear_memory_caches();
        for (_, window) in &mut self.child_windows {
            window.clear_memory_caches();
        }
    }

    /// Tear the runtime down: cancel the activity, then release the windows.
    pub fn destroy(self) {
        drop(self);
    }

    pub fn id(&self) -> &str {
        self.description.id()
    }

    pub fn process_id(&self) -> &str {
        &self.process_id
    }

    pub fn url(&self) -> &Url {
        self.description.entry_point()
    }

    pub fn icon(&self) -> &Url {
        self.description.icon()
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn activity_id(&self) -> i32 {
        self.registrar.activity_id()
    }

    pub fn activity_token(&self) -> ActivityToken {
        self.registrar.token()
    }

    pub fn ready(&self) -> bool {
        self.ready
    }

    pub fn parameters(&self) -> &str {
        &self.parameters
    }

    pub fn headless(&self) -> bool {
        self.description.headless()
    }

    pub fn has_remote_entry_point(&self) -> bool {
        self.description.has_remote_entry_point()
    }

    pub fn privileged(&self) -> bool {
        self.description.privileged()
    }

    pub fn is_launcher(&self) -> bool {
        self.description.is_launcher()
    }

    pub fn internet_connectivity_required(&self) -> bool {
        self.description.internet_connectivity_required()
    }

    pub fn urls_allowed(&self) -> &[String] {
        self.description.urls_allowed()
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.description.user_agent()
    }

    pub fn loading_animation_disabled(&self) -> bool {
        self.description.loading_animation_disabled()
    }

    pub fn allow_cross_domain_access(&self) -> bool {
        self.description.allow_cross_domain_access()
    }

    pub fn description(&self) -> &ApplicationDescription {
        &self.description
    }

    fn set_ready(&mut self, ready: bool) {
        if self.ready == ready {
            return;
        }
        self.ready = ready;
        self.emit(RuntimeEvent::ReadyChanged {
            identifier: self.identifier.clone(),
            ready,
        });
    }

    fn take_window(&mut self, id: WindowId) -> Option<Box<dyn WindowController>> {
        let index = self
            .child_windows
            .iter()
            .position(|(window_id, _)| *window_id == id)?;
        Some(self.child_windows.remove(index).1)
    }

    fn emit(&self, event: RuntimeEvent) {
        emit(&self.events, event);
    }
}

impl Drop for AppRuntime {
    fn drop(&mut self) {
        if let Err(e) = self.registrar.cancel() {
            warn!("Application {}: {e}", self.description.id());
        }
    }
}

/// Script that delivers relaunch parameters to the page. The parameters are
/// embedded as a JSON string literal so quotes in them stay inside it.
pub fn relaunch_script(parameters: &str) -> String {
    format!(
        "_webOS.relaunch({});",
        Value::String(parameters.to_string())
    )
}

fn forward_new_window_requests(
    window: &mut dyn WindowController,
    events: &Sender<RuntimeEvent>,
    identifier: &str,
) {
    let events = events.clone();
    let identifier = identifier.to_string();
    window.on_new_window_requested(Box::new(move |request| {
        emit(
            &events,
            RuntimeEvent::NewWindowRequested {
                identifier: identifier.clone(),
                request,
            },
        );
    }));
}

fn emit(events: &Sender<RuntimeEvent>, event: RuntimeEvent) {
    if let Err(e) = events.send(event) {
        debug!("Nobody listens for runtime events anymore, dropping {:?}", e.0);
    }
}

fn url_matches(pattern: &str, url: &Url) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => url.as_str().starts_with(prefix),
        None => url.as_str() == pattern,
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                normalized.pop();
            }
            Component::CurDir => {}
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                normalized.push(component);
            }
        }
    }
    normalized
}
