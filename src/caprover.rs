use reqwest::blocking::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::definition::AppDefinition;
use crate::error::{DeployError, DeployResult};

/// CapRover envelope status for a plain success.
pub const STATUS_OK: i64 = 100;
/// CapRover envelope status for a successfully started deploy.
pub const STATUS_OK_DEPLOY_STARTED: i64 = 101;
/// CapRover envelope status for a partially successful request.
pub const STATUS_OK_PARTIALLY: i64 = 102;

const AUTH_HEADER: &str = "x-captain-auth";
const NAMESPACE_HEADER: &str = "x-namespace";
const NAMESPACE: &str = "captain";

/// A CapRover project, the owner of registered apps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(alias = "projectId")]
    pub id: String,
    pub name: String,
}

/// A batch of definitions to store. Each one is sent as its own
/// `appDefinitions/update` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateAppDefinitions {
    pub app_definitions: Vec<AppDefinition>,
}

/// A deploy trigger for one app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployApp {
    pub app_name: String,
    pub captain_definition_content: String,
}

/// The slice of the CapRover control-plane API this tool drives.
pub trait CaproverApi {
    /// Authenticate and keep the session for later calls.
    fn login(&mut self) -> DeployResult<()>;

    /// List every project on the instance.
    fn list_projects(&self) -> DeployResult<Vec<Project>>;

    /// Create a project named `name` and return it.
    fn create_project(&self, name: &str) -> DeployResult<Project>;

    /// Replace the stored definition of each listed app.
    fn update_app_definition(&self, request: &UpdateAppDefinitions) -> DeployResult<()>;

    /// Ask CapRover to (re)deploy an app.
    fn deploy_app(&self, request: &DeployApp) -> DeployResult<()>;
}

/// [`CaproverApi`] over CapRover's `/api/v2` REST interface.
pub struct HttpClient {
    base_url: String,
    password: String,
    client: Client,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    status: i64,
    #[serde(default)]
    description: String,
    #[serde(default)]
    data: Value,
}

impl HttpClient {
    pub fn new(base_url: &str, password: &str) -> DeployResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("caprover-compose/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: base_url.to_string(),
            password: password.to_string(),
            client,
            token: None,
        })
    }

    /// Full URL of an API path on the instance at `base_url`.
    #[must_use]
    pub fn api_url(base_url: &str, path: &str) -> String {
        format!("{}/api/v2{path}", base_url.trim_end_matches('/'))
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.header(NAMESPACE_HEADER, NAMESPACE);
        match &self.token {
            Some(token) => builder.header(AUTH_HEADER, token),
            None => builder,
        }
    }

    fn get(&self, operation: &str, path: &str) -> DeployResult<Value> {
        let url = Self::api_url(&self.base_url, path);
        tracing::debug!(%url, operation, "GET");
        let response = self.authorize(self.client.get(&url)).send()?;
        let envelope: Envelope = response.error_for_status()?.json()?;
        check_envelope(operation, envelope.status, &envelope.description)?;
        Ok(envelope.data)
    }

    fn post<B: Serialize + ?Sized>(
        &self,
        operation: &str,
        path: &str,
        body: &B,
    ) -> DeployResult<Value> {
        let url = Self::api_url(&self.base_url, path);
        tracing::debug!(%url, operation, "POST");
        let response = self.authorize(self.client.post(&url)).json(body).send()?;
        let envelope: Envelope = response.error_for_status()?.json()?;
        check_envelope(operation, envelope.status, &envelope.description)?;
        Ok(envelope.data)
    }
}

impl CaproverApi for HttpClient {
    fn login(&mut self) -> DeployResult<()> {
        let data = self.post("login", "/login", &json!({ "password": self.password }))?;
        let token = data["token"]
            .as_str()
            .ok_or_else(|| DeployError::Other("login response carried no token".into()))?;
        self.token = Some(token.to_string());
        Ok(())
    }

    fn list_projects(&self) -> DeployResult<Vec<Project>> {
        let data = self.get("list projects", "/user/projects")?;
        Ok(parse_projects(&data)?)
    }

    fn create_project(&self, name: &str) -> DeployResult<Project> {
        let body = json!({
            "name": name,
            "parentProjectId": "",
            "description": "",
        });
        let data = self.post("create project", "/user/projects/register", &body)?;

        if let Some(id) = data["id"].as_str() {
            return Ok(Project {
                id: id.to_string(),
                name: name.to_string(),
            });
        }

        // Older servers answer with an empty body; look the project up.
        self.list_projects()?
            .into_iter()
            .find(|p| p.name == name)
            .ok_or_else(|| DeployError::Other(format!("project '{name}' missing after creation")))
    }

    fn update_app_definition(&self, request: &UpdateAppDefinitions) -> DeployResult<()> {
        for definition in &request.app_definitions {
            self.post(
                "update app definition",
                "/user/apps/appDefinitions/update",
                definition,
            )?;
        }
        Ok(())
    }

    fn deploy_app(&self, request: &DeployApp) -> DeployResult<()> {
        let body = json!({
            "captainDefinitionContent": request.captain_definition_content,
            "gitHash": "",
        });
        self.post(
            "deploy app",
            &format!("/user/apps/appData/{}", request.app_name),
            &body,
        )?;
        Ok(())
    }
}

/// Map a CapRover envelope status to an error when it is not one of
/// the success codes.
pub fn check_envelope(operation: &str, status: i64, description: &str) -> DeployResult<()> {
    match status {
        STATUS_OK | STATUS_OK_DEPLOY_STARTED | STATUS_OK_PARTIALLY => Ok(()),
        _ => Err(DeployError::Api {
            operation: operation.to_string(),
            status,
            description: description.to_string(),
        }),
    }
}

/// Extract projects from the `data` of a project listing.
pub fn parse_projects(data: &Value) -> serde_json::Result<Vec<Project>> {
    match data.get("projects") {
        Some(projects) => serde_json::from_value(projects.clone()),
        None => Ok(Vec::new()),
    }
}
