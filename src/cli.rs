use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "webapp-host")]
#[command(about = "Run a web application inside the native shell")]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(long)]
    pub verbose: bool,

    /// Show version information and exit
    #[arg(short = 'v', long)]
    pub version: bool,

    /// Start with systemd support
    #[arg(long)]
    pub systemd: bool,

    /// Application directory or its appinfo.json
    #[arg(value_name = "APPINFO", required_unless_present = "version")]
    pub appinfo: Option<PathBuf>,

    /// Launch parameters handed to the application
    #[arg(long, default_value = "")]
    pub params: String,

    /// Process identity of the instance, defaults to the host's pid
    #[arg(long)]
    pub process_id: Option<String>,
}

impl Cli {
    pub fn process_id(&self) -> String {
        self.process_id
            .clone()
            .unwrap_or_else(|| std::process::id().to_string())
    }
}
