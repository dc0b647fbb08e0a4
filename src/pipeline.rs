use std::path::Path;

use crate::caprover::{CaproverApi, DeployApp, UpdateAppDefinitions};
use crate::compose::{self, ComposeFile};
use crate::definition::AppDefinition;
use crate::derive::ServiceDescriptor;
use crate::error::{DeployError, DeployResult};

/// Drives a compose file through the CapRover API.
///
/// A run is strictly sequential: log in, resolve the project, then
/// for each service in document order submit its definition and
/// trigger a deploy. The first error aborts the run; services
/// already deployed are left as they are.
pub struct Pipeline<A> {
    api: A,
    project_name: String,
}

impl<A: CaproverApi> Pipeline<A> {
    #[must_use]
    pub fn new(api: A, project_name: &str) -> Self {
        Self {
            api,
            project_name: project_name.to_string(),
        }
    }

    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Log in, resolve the project, then deploy every service in the
    /// compose file at `compose_path`. Returns the deployed app names.
    pub fn run(&mut self, compose_path: &Path) -> DeployResult<Vec<String>> {
        self.api.login()?;
        let project_id = self.resolve_project()?;

        let compose = compose::load(compose_path)?;
        ensure_services(&compose, compose_path)?;

        let deployed = self.deploy_all(&project_id, &compose)?;
        tracing::info!(count = deployed.len(), "all services processed successfully");
        Ok(deployed)
    }

    /// Find the project by exact name, creating it when absent.
    pub fn resolve_project(&self) -> DeployResult<String> {
        let existing = self
            .api
            .list_projects()?
            .into_iter()
            .find(|p| p.name == self.project_name);

        if let Some(project) = existing {
            tracing::info!(
                project = %self.project_name,
                id = %project.id,
                "using existing project"
            );
            return Ok(project.id);
        }

        tracing::info!(project = %self.project_name, "project does not exist, creating");
        let created = self.api.create_project(&self.project_name)?;
        tracing::info!(id = %created.id, "created project");
        Ok(created.id)
    }

    /// Deploy every service of `compose` under `project_id`, in
    /// document order.
    pub fn deploy_all(&self, project_id: &str, compose: &ComposeFile) -> DeployResult<Vec<String>> {
        let mut deployed = Vec::new();
        for (name, spec) in compose.services() {
            tracing::info!(service = name, "processing service");
            let descriptor = ServiceDescriptor::from_service(name, &spec);
            tracing::info!(service = name, ?descriptor, "derived fields");

            let definition = AppDefinition::new(name, project_id, &descriptor);
            self.deploy_service(definition)?;
            deployed.push(name.to_string());
        }
        Ok(deployed)
    }

    fn deploy_service(&self, definition: AppDefinition) -> DeployResult<()> {
        let app_name = definition.app_name.clone();
        if !definition.has_source() {
            tracing::warn!(
                app = %app_name,
                "service has neither image nor build; deploying definition without a source"
            );
        }

        tracing::info!(app = %app_name, "updating app definition");
        self.api.update_app_definition(&UpdateAppDefinitions {
            app_definitions: vec![definition],
        })?;

        self.api.deploy_app(&DeployApp {
            app_name: app_name.clone(),
            captain_definition_content: String::new(),
        })?;

        tracing::info!(app = %app_name, "app deployed");
        Ok(())
    }
}

/// Translate every service into its application definition without
/// touching the network.
#[must_use]
pub fn plan(compose: &ComposeFile, project_id: &str) -> Vec<AppDefinition> {
    compose
        .services()
        .map(|(name, spec)| {
            let descriptor = ServiceDescriptor::from_service(name, &spec);
            AppDefinition::new(name, project_id, &descriptor)
        })
        .collect()
}

/// Reject documents that define no services.
pub fn ensure_services(compose: &ComposeFile, path: &Path) -> DeployResult<()> {
    if compose.is_empty() {
        return Err(DeployError::EmptyDocument(path.display().to_string()));
    }
    Ok(())
}
