//! Deploy the services of a Docker Compose file to CapRover.
//!
//! `caprover-compose` is a one-shot migration tool: it reads a
//! `compose.yml`, derives a CapRover application definition for each
//! service, and pushes those definitions to a CapRover instance.
//!
//! # Overview
//!
//! - [`compose`] loads the compose document into typed
//!   [`ServiceSpec`]s.
//! - [`derive`] extracts environment variables, ports, image or
//!   Dockerfile, and command from each service.
//! - [`definition`] assembles the [`AppDefinition`] payload.
//! - [`caprover`] holds the [`CaproverApi`] trait and its HTTP
//!   implementation, [`HttpClient`].
//! - [`Pipeline`] drives the run: login, resolve the project, then
//!   update and deploy each service in document order.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use caprover_compose::{HttpClient, Pipeline};
//!
//! fn main() -> anyhow::Result<()> {
//!     let client = HttpClient::new("https://captain.example.com", "secret")?;
//!     let mut pipeline = Pipeline::new(client, "my-project");
//!
//!     let deployed = pipeline.run(Path::new("compose.yml"))?;
//!     println!("deployed: {deployed:?}");
//!     Ok(())
//! }
//! ```
//!
//! Preview the definitions without contacting CapRover:
//!
//! ```sh
//! COMPOSE_FILE=compose.yml caprover-compose --dry-run
//! ```

#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod caprover;
pub mod compose;
pub mod config;
pub mod definition;
pub mod derive;
pub mod error;
pub mod pipeline;

pub use caprover::{CaproverApi, HttpClient};
pub use compose::{ComposeFile, ServiceSpec};
pub use config::Config;
pub use definition::AppDefinition;
pub use pipeline::Pipeline;
