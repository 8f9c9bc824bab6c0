use super::{CallChannel, CallToken, ReplyHandler};
use crate::error::ChannelError;
use log::debug;
use std::cell::Cell;

/// Channel used when the host runs without a platform bus.
///
/// Calls are accepted and logged but never answered, so runtimes behave as
/// if the activity manager never replied.
#[derive(Debug, Default)]
pub struct DetachedChannel {
    next_token: Cell<u64>,
}

impl DetachedChannel {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CallChannel for DetachedChannel {
    fn call(
        &self,
        uri: &str,
        payload: &str,
        app_id: &str,
        _reply: Option<ReplyHandler>,
    ) -> Result<CallToken, ChannelError> {
        let raw = self.next_token.get() + 1;
        self.next_token.set(raw);
        let token = CallToken::new(raw);
        debug!("bus detached, dropping call {token} to {uri} from {app_id}: {payload}");
        Ok(token)
    }

    fn cancel(&self, token: CallToken) -> Result<(), ChannelError> {
        debug!("bus detached, cancel of {token} is a no-op");
        Ok(())
    }
}
