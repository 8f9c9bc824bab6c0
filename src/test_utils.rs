//! Shared test doubles for webapp-host.
//!
//! `RecordingChannel` stands in for the service bus and `RecordingWindows`
//! for the compositor. Both record what the code under test asked for and
//! let tests deliver replies and window events later, the way the real
//! collaborators would on the control thread.

#![cfg(test)]

use crate::bus::{CallChannel, CallToken, ReplyHandler};
use crate::description::ApplicationDescription;
use crate::error::ChannelError;
use crate::window::{
    NewWindowRequest, SurfaceId, WindowController, WindowFactory, WindowType,
};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use url::Url;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub token: CallToken,
    pub uri: String,
    pub payload: String,
    pub app_id: String,
    pub expects_reply: bool,
}

impl RecordedCall {
    pub fn payload_json(&self) -> Value {
        serde_json::from_str(&self.payload).expect("recorded payload is json")
    }
}

#[derive(Default)]
pub struct RecordingChannel {
    next_token: Cell<u64>,
    calls: RefCell<Vec<RecordedCall>>,
    cancels: RefCell<Vec<CallToken>>,
    cancel_attempts: RefCell<Vec<CallToken>>,
    handlers: RefCell<HashMap<CallToken, ReplyHandler>>,
    fail_calls: Cell<bool>,
    fail_cancels: Cell<bool>,
    retain_handlers_after_cancel: Cell<bool>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_calls(&self, fail: bool) {
        self.fail_calls.set(fail);
    }

    pub fn fail_cancels(&self, fail: bool) {
        self.fail_cancels.set(fail);
    }

    /// Keep reply handlers registered after a successful cancel, like a bus
    /// that already queued a reply before the cancel arrived.
    pub fn retain_handlers_after_cancel(&self, retain: bool) {
        self.retain_handlers_after_cancel.set(retain);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    pub fn calls_to(&self, uri: &str) -> Vec<RecordedCall> {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.uri == uri)
            .cloned()
            .collect()
    }

    /// Tokens canceled successfully.
    pub fn cancels(&self) -> Vec<CallToken> {
        self.cancels.borrow().clone()
    }

    /// Tokens passed to `cancel`, whether or not it succeeded.
    pub fn cancel_attempts(&self) -> Vec<CallToken> {
        self.cancel_attempts.borrow().clone()
    }

    /// Deliver `payload` to the reply handler of `token`.
    ///
    /// Returns false when the call has no live handler.
    pub fn reply(&self, token: CallToken, payload: &str) -> bool {
        let Some(mut handler) = self.handlers.borrow_mut().remove(&token) else {
            return false;
        };
        handler(payload);
        self.handlers.borrow_mut().insert(token, handler);
        true
    }
}

impl CallChannel for RecordingChannel {
    fn call(
        &self,
        uri: &str,
        payload: &str,
        app_id: &str,
        reply: Option<ReplyHandler>,
    ) -> Result<CallToken, ChannelError> {
        if self.fail_calls.get() {
            return Err(ChannelError::CallRejected {
                uri: uri.to_string(),
                reason: "test failure".to_string(),
            });
        }

        let token = CallToken::new(self.next_token.get() + 1);
        self.next_token.set(token.raw());
        self.calls.borrow_mut().push(RecordedCall {
            token,
            uri: uri.to_string(),
            payload: payload.to_string(),
            app_id: app_id.to_string(),
            expects_reply: reply.is_some(),
        });
        if let Some(handler) = reply {
            self.handlers.borrow_mut().insert(token, handler);
        }
        Ok(token)
    }

    fn cancel(&self, token: CallToken) -> Result<(), ChannelError> {
        self.cancel_attempts.borrow_mut().push(token);
        if self.fail_cancels.get() {
            return Err(ChannelError::CancelRejected {
                reason: "test failure".to_string(),
            });
        }
        if !self.retain_handlers_after_cancel.get() {
            self.handlers.borrow_mut().remove(&token);
        }
        self.cancels.borrow_mut().push(token);
        Ok(())
    }
}

/// Observable state of one window created through `RecordingWindows`.
#[derive(Default)]
pub struct WindowRecord {
    pub url: Option<Url>,
    pub window_type: WindowType,
    pub headless: bool,
    pub shown: u32,
    pub closed: bool,
    pub released: bool,
    pub scripts: Vec<String>,
    pub caches_cleared: u32,
    pub surface: Option<SurfaceId>,
    closed_handlers: Vec<Box<dyn FnMut()>>,
    new_window_handlers: Vec<Box<dyn FnMut(NewWindowRequest)>>,
}

#[derive(Default)]
pub struct RecordingWindows {
    windows: RefCell<Vec<Rc<RefCell<WindowRecord>>>>,
}

impl RecordingWindows {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.windows.borrow().len()
    }

    pub fn window(&self, index: usize) -> Rc<RefCell<WindowRecord>> {
        let windows = self.windows.borrow();
        Rc::clone(windows.get(index).expect("window was created"))
    }

    /// Simulate the user closing window `index`.
    pub fn user_close(&self, index: usize) {
        fire_closed(&self.window(index));
    }

    /// Simulate page content in window `index` asking for a new window.
    pub fn request_new_window(&self, index: usize, request: &NewWindowRequest) {
        let record = self.window(index);
        let mut handlers = std::mem::take(&mut record.borrow_mut().new_window_handlers);
        for handler in &mut handlers {
            handler(request.clone());
        }
        record.borrow_mut().new_window_handlers = handlers;
    }
}

impl WindowFactory for RecordingWindows {
    fn create_window(
        &self,
        url: &Url,
        window_type: &WindowType,
        headless: bool,
    ) -> Box<dyn WindowController> {
        let record = Rc::new(RefCell::new(WindowRecord {
            url: Some(url.clone()),
            window_type: window_type.clone(),
            headless,
            ..WindowRecord::default()
        }));
        self.windows.borrow_mut().push(Rc::clone(&record));
        Box::new(RecordingWindow(record))
    }
}

fn fire_closed(record: &Rc<RefCell<WindowRecord>>) {
    record.borrow_mut().closed = true;
    let mut handlers = std::mem::take(&mut record.borrow_mut().closed_handlers);
    for handler in &mut handlers {
        handler();
    }
    record.borrow_mut().closed_handlers = handlers;
}

struct RecordingWindow(Rc<RefCell<WindowRecord>>);

impl WindowController for RecordingWindow {
    fn show(&mut self) {
        self.0.borrow_mut().shown += 1;
    }

    fn close(&mut self) {
        fire_closed(&self.0);
    }

    fn execute_script(&mut self, script: &str) {
        self.0.borrow_mut().scripts.push(script.to_string());
    }

    fn clear_memory_caches(&mut self) {
        self.0.borrow_mut().caches_cleared += 1;
    }

    fn attach_surface(&mut self, surface: SurfaceId) {
        self.0.borrow_mut().surface = Some(surface);
    }

    fn on_closed(&mut self, handler: Box<dyn FnMut()>) {
        self.0.borrow_mut().closed_handlers.push(handler);
    }

    fn on_new_window_requested(&mut self, handler: Box<dyn FnMut(NewWindowRequest)>) {
        self.0.borrow_mut().new_window_handlers.push(handler);
    }
}

impl Drop for RecordingWindow {
    fn drop(&mut self) {
        self.0.borrow_mut().released = true;
    }
}

/// Description of a windowed test application.
pub fn clock_description() -> ApplicationDescription {
    ApplicationDescription::new(
        "clock",
        Url::parse("file:///usr/palm/applications/clock/index.html").expect("valid url"),
        Url::parse("file:///usr/palm/applications/clock/icon.png").expect("valid url"),
        false,
    )
}

/// Description of a headless test service.
pub fn headless_description() -> ApplicationDescription {
    ApplicationDescription::new(
        "com.example.service",
        Url::parse("file:///usr/palm/applications/service/index.html").expect("valid url"),
        Url::parse("file:///usr/palm/applications/service/icon.png").expect("valid url"),
        true,
    )
}
