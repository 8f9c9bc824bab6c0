//! Registration of a running application with the platform activity manager.
//!
//! The protocol has three calls: `create` registers (and subscribes to) a
//! foreground activity, `focus`/`unfocus` report foreground changes once the
//! manager assigned an activity id, and a channel level cancel of the
//! `create` call ends the registration. Registration is advisory, so every
//! failure here is reported to the caller for logging and never retried.

pub mod reply;
pub mod request;

pub use reply::ActivityReply;
pub use request::{CreateActivityRequest, FocusRequest};

use crate::bus::{CallChannel, CallToken, ReplyHandler};
use crate::constants::{
    ACTIVITY_CREATE_URI, ACTIVITY_FOCUS_URI, ACTIVITY_UNFOCUS_URI, UNSET_ACTIVITY_ID,
};
use crate::error::{ActivityError, FocusDirection};
use log::{debug, warn};
use std::cell::Cell;
use std::rc::{Rc, Weak};

/// Handle of the outstanding `create` call, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivityToken {
    #[default]
    Unset,
    Live(CallToken),
}

impl ActivityToken {
    pub fn is_live(self) -> bool {
        matches!(self, Self::Live(_))
    }
}

/// Registration state shared with the reply handler of the `create` call.
#[derive(Debug, Default)]
struct Registration {
    token: Cell<ActivityToken>,
    activity_id: Cell<Option<i32>>,
}

impl Registration {
    fn accept_reply(&self, app_id: &str, payload: &str) {
        match ActivityReply::decode(payload) {
            ActivityReply::Created { activity_id } => {
                debug!("Application {app_id} registered as activity {activity_id}");
                self.activity_id.set(Some(activity_id));
            }
            ActivityReply::Refused => {
                warn!("Failed to create activity for application {app_id}");
            }
            ActivityReply::Malformed { reason } => {
                warn!("Got malformed json response from activity manager ({reason}): {payload}");
            }
        }
    }
}

pub struct ActivityRegistrar {
    channel: Rc<dyn CallChannel>,
    app_id: String,
    identifier: String,
    registration: Rc<Registration>,
}

impl ActivityRegistrar {
    /// `app_id` names the application in the request and in logs;
    /// `identifier` tags every call made on its behalf.
    pub fn new(channel: Rc<dyn CallChannel>, app_id: &str, identifier: &str) -> Self {
        Self {
            channel,
            app_id: app_id.to_string(),
            identifier: identifier.to_string(),
            registration: Rc::new(Registration::default()),
        }
    }

    pub fn token(&self) -> ActivityToken {
        self.registration.token.get()
    }

    /// The id assigned by the activity manager, or `-1` before that.
    pub fn activity_id(&self) -> i32 {
        self.registration
            .activity_id
            .get()
            .unwrap_or(UNSET_ACTIVITY_ID)
    }

    /// Submit the `create` call for this application instance.
    pub fn register(&mut self, process_id: &str) -> Result<CallToken, ActivityError> {
        if self.token().is_live() {
            return Err(ActivityError::AlreadyRegistered);
        }

        let request = CreateActivityRequest::foreground(&self.app_id, process_id);
        let payload = serde_json::to_string(&request).map_err(ActivityError::Encode)?;

        // The token is only known once the call went out.
        let call = Rc::new(Cell::new(None));
        let registration = Rc::downgrade(&self.registration);
        let app_id = self.app_id.clone();
        let handler_call = Rc::clone(&call);
        let handler: ReplyHandler = Box::new(move |payload| {
            deliver_register_reply(&registration, handler_call.get(), &app_id, payload);
        });

        let token = self
            .channel
            .call(
                ACTIVITY_CREATE_URI,
                &payload,
                &self.identifier,
                Some(handler),
            )
            .map_err(ActivityError::Register)?;
        call.set(Some(token));

        debug!(
            "Registering {} with activity manager (call {token})",
            self.identifier
        );
        self.registration.token.set(ActivityToken::Live(token));
        self.registration.activity_id.set(None);
        Ok(token)
    }

    /// Apply one reply of the outstanding `create` call.
    ///
    /// Ignored while no registration is live. Malformed and refused replies
    /// are logged and leave the state as is.
    pub fn on_register_reply(&self, payload: &str) {
        if !self.token().is_live() {
            debug!(
                "Dropping activity manager reply for unregistered application {}",
                self.app_id
            );
            return;
        }
        self.registration.accept_reply(&self.app_id, payload);
    }

    /// Report a foreground change. Does nothing until an activity id is known.
    pub fn change_focus(&self, direction: FocusDirection) -> Result<(), ActivityError> {
        let Some(activity_id) = self.registration.activity_id.get().filter(|id| *id >= 0)
        else {
            return Ok(());
        };

        let uri = match direction {
            FocusDirection::Focus => ACTIVITY_FOCUS_URI,
            FocusDirection::Unfocus => ACTIVITY_UNFOCUS_URI,
        };
        let payload = serde_json::to_string(&FocusRequest { activity_id })
            .map_err(ActivityError::Encode)?;

        self.channel
            .call(uri, &payload, &self.identifier, None)
            .map(|_| ())
            .map_err(|source| ActivityError::Focus { direction, source })
    }

    /// Cancel the `create` call. On failure the token is kept so the cancel
    /// can be attempted again.
    pub fn cancel(&mut self) -> Result<(), ActivityError> {
        let ActivityToken::Live(token) = self.token() else {
            return Ok(());
        };

        self.channel.cancel(token).map_err(ActivityError::Cancel)?;

        debug!("Canceled activity of {} (call {token})", self.identifier);
        self.registration.token.set(ActivityToken::Unset);
        self.registration.activity_id.set(None);
        Ok(())
    }
}

/// Hand a reply of call `token` to the registration, unless the registrar is
/// gone or `token` is no longer its live call.
fn deliver_register_reply(
    registration: &Weak<Registration>,
    token: Option<CallToken>,
    app_id: &str,
    payload: &str,
) {
    let Some(registration) = registration.upgrade() else {
        debug!("Dropping activity manager reply for closed application {app_id}");
        return;
    };

    match (token, registration.token.get()) {
        (Some(reply_token), ActivityToken::Live(live)) if reply_token == live => {
            registration.accept_reply(app_id, payload);
        }
        (_, current) => {
            debug!(
                "Dropping stale activity manager reply for application {app_id} \
                 (current registration: {current:?})"
            );
        }
    }
}
