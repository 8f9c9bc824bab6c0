//! Service bus seam.
//!
//! Every call to a platform service goes through a [`CallChannel`]. Calls are
//! non-blocking: `call` returns as soon as the message has been handed to the
//! bus, and any reply is delivered later, on the same control thread, through
//! the [`ReplyHandler`] registered with the call.

pub mod detached;

pub use detached::DetachedChannel;

use crate::error::ChannelError;
use std::fmt;

/// Opaque handle identifying one outbound call on a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallToken(u64);

impl CallToken {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CallToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Callback invoked with the raw payload of each reply to a call.
///
/// Subscribed calls may reply more than once.
pub type ReplyHandler = Box<dyn FnMut(&str)>;

/// Shared handle to the bus used for activity manager traffic.
pub trait CallChannel {
    /// Submit a call to `uri` on behalf of the application tagged `app_id`.
    ///
    /// `app_id` is carried with the call so the service side can attribute
    /// it; replies are routed to `reply` when one is given.
    fn call(
        &self,
        uri: &str,
        payload: &str,
        app_id: &str,
        reply: Option<ReplyHandler>,
    ) -> Result<CallToken, ChannelError>;

    /// Cancel a previously submitted call. No further replies are delivered
    /// for `token` once this returns `Ok`.
    fn cancel(&self, token: CallToken) -> Result<(), ChannelError>;
}
