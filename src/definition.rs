use serde::{Deserialize, Serialize};

use crate::derive::ServiceDescriptor;

/// A CapRover application definition, as sent to
/// `appDefinitions/update`.
///
/// # Example
///
/// ```
/// use caprover_compose::definition::AppDefinition;
/// use caprover_compose::derive::ServiceDescriptor;
///
/// let descriptor = ServiceDescriptor {
///     http_port: Some(80),
///     image_name: Some("nginx:latest".into()),
///     ..Default::default()
/// };
/// let def = AppDefinition::new("web", "proj-1", &descriptor);
///
/// assert!(!def.not_expose_as_web_app);
/// assert_eq!(def.container_http_port, Some(80));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppDefinition {
    pub app_name: String,
    pub project_id: String,
    pub description: String,
    pub not_expose_as_web_app: bool,
    pub has_persistent_data: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_http_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dockerfile_path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env_vars: Vec<EnvVar>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports_mapping: Vec<PortMapping>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmd: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    pub host_port: String,
    pub container_port: String,
}

impl AppDefinition {
    /// Assemble the definition for `app_name` from its derived
    /// fields.
    ///
    /// The app is exposed as a web app only when an HTTP port was
    /// derived. Volumes are not translated, so `has_persistent_data`
    /// is always `false`.
    #[must_use]
    pub fn new(app_name: &str, project_id: &str, descriptor: &ServiceDescriptor) -> Self {
        let http_port = descriptor.http_port.filter(|p| *p != 0);

        Self {
            app_name: app_name.to_string(),
            project_id: project_id.to_string(),
            description: format!("Auto-generated from compose.yml: {app_name}"),
            not_expose_as_web_app: http_port.is_none(),
            has_persistent_data: false,
            container_http_port: http_port,
            image_name: non_empty(descriptor.image_name.as_ref()),
            dockerfile_path: non_empty(descriptor.dockerfile_path.as_ref()),
            env_vars: descriptor
                .env_vars
                .iter()
                .map(|(key, value)| EnvVar {
                    key: key.clone(),
                    value: value.clone(),
                })
                .collect(),
            ports_mapping: descriptor
                .port_mapping
                .iter()
                .map(|(host, container)| PortMapping {
                    host_port: host.clone(),
                    container_port: container.clone(),
                })
                .collect(),
            cmd: non_empty(descriptor.command.as_ref()),
        }
    }

    /// Whether the definition names something CapRover can deploy.
    #[must_use]
    pub const fn has_source(&self) -> bool {
        self.image_name.is_some() || self.dockerfile_path.is_some()
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}
