//! Readiness notification for systemd `Type=notify` units.

use crate::error::HostError;
use log::debug;
use std::os::unix::net::UnixDatagram;

const READY: &str = "READY=1";

/// Tell the service manager the host finished starting up.
///
/// Returns `Ok(false)` when the host was not started by a notify unit.
pub fn notify_ready() -> Result<bool, HostError> {
    notify(std::env::var("NOTIFY_SOCKET").ok().as_deref(), READY)
}

fn notify(socket: Option<&str>, state: &str) -> Result<bool, HostError> {
    let Some(path) = socket.filter(|path| !path.is_empty()) else {
        debug!("NOTIFY_SOCKET is not set, skipping readiness notification");
        return Ok(false);
    };

    let sender = UnixDatagram::unbound().map_err(HostError::Notify)?;
    send(&sender, path, state).map_err(HostError::Notify)?;
    debug!("Sent {state} to {path}");
    Ok(true)
}

#[cfg(target_os = "linux")]
fn send(sender: &UnixDatagram, path: &str, state: &str) -> std::io::Result<()> {
    use std::os::linux::net::SocketAddrExt;
    use std::os::unix::net::SocketAddr;

    match path.strip_prefix('@') {
        Some(name) => {
            let addr = SocketAddr::from_abstract_name(name.as_bytes())?;
            sender.send_to_addr(state.as_bytes(), &addr)?;
        }
        None => {
            sender.send_to(state.as_bytes(), path)?;
        }
    }
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn send(sender: &UnixDatagram, path: &str, state: &str) -> std::io::Result<()> {
    sender.send_to(state.as_bytes(), path)?;
    Ok(())
}
