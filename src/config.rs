use std::path::PathBuf;

use clap::Parser;

use crate::error::{DeployError, DeployResult};

pub const DEFAULT_URL: &str = "https://captain.example.com";
pub const DEFAULT_EMAIL: &str = "captain@root";
pub const DEFAULT_PROJECT: &str = "unvanquished";
pub const DEFAULT_COMPOSE_FILE: &str = "../compose.yml";

/// Command-line and environment configuration.
#[derive(Debug, Parser)]
#[command(name = "caprover-compose")]
#[command(about = "Deploy the services of a compose file to CapRover")]
pub struct Config {
    /// CapRover dashboard URL
    #[arg(long, env = "CAPROVER_URL", default_value = DEFAULT_URL)]
    pub url: String,

    /// CapRover dashboard password
    #[arg(long, env = "CAPROVER_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// CapRover account email (not used by password login)
    #[arg(long, env = "CAPROVER_EMAIL", default_value = DEFAULT_EMAIL)]
    pub email: String,

    /// Project that owns the deployed apps
    #[arg(long, env = "UNV_PROJECT_NAME", default_value = DEFAULT_PROJECT)]
    pub project: String,

    /// Compose file, relative to the working directory
    #[arg(long, env = "COMPOSE_FILE", default_value = DEFAULT_COMPOSE_FILE)]
    pub compose_file: PathBuf,

    /// Print the app definitions that would be sent and exit
    #[arg(long)]
    pub dry_run: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// The password, or an error if it is unset or empty.
    pub fn password(&self) -> DeployResult<&str> {
        self.password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| DeployError::EnvMissing("CAPROVER_PASSWORD".into()))
    }
}
