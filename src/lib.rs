pub mod activity;
pub mod bus;
pub mod cli;
pub mod config;
pub mod constants;
pub mod description;
pub mod error;
mod logging;
pub mod registry;
pub mod runtime;
#[cfg(unix)]
pub mod systemd;
#[cfg(test)]
mod test_utils;
pub mod window;

use crate::bus::DetachedChannel;
use crate::cli::Cli;
use crate::config::HostConfig;
use crate::constants::VERSION;
use crate::description::ApplicationDescription;
use crate::error::HostError;
use crate::registry::RuntimeRegistry;
use crate::window::LoggingWindowFactory;
use log::{info, warn};
use std::rc::Rc;

/// Start the host: prepare the environment, launch the application named on
/// the command line and serve it until its last window is gone.
pub fn run(cli: &Cli) -> Result<(), HostError> {
    logging::init(cli.verbose)?;

    if cli.version {
        info!("webapp-host {VERSION}");
        return Ok(());
    }

    let config = HostConfig::from_env();
    config.apply();
    info!(
        "Using persistent storage at {}",
        config.storage_path().display()
    );

    let appinfo = cli
        .appinfo
        .as_deref()
        .ok_or(HostError::MissingApplication)?;
    let description = ApplicationDescription::from_path(appinfo)?;

    let mut registry = RuntimeRegistry::new(
        Rc::new(DetachedChannel::new()),
        Rc::new(LoggingWindowFactory),
    );
    registry.launch(description, &cli.params, &cli.process_id());

    if cli.systemd {
        notify_service_manager()?;
    }

    registry.run_until_idle();
    Ok(())
}

#[cfg(unix)]
fn notify_service_manager() -> Result<(), HostError> {
    if !systemd::notify_ready()? {
        warn!("Started with --systemd but NOTIFY_SOCKET is not set");
    }
    Ok(())
}

#[cfg(not(unix))]
fn notify_service_manager() -> Result<(), HostError> {
    warn!("systemd notification is not supported on this platform");
    Ok(())
}
