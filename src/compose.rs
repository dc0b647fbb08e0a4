use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use crate::error::{DeployError, DeployResult};

/// The subset of a `docker-compose.yml` document this tool reads.
///
/// Everything except `services` is ignored. A missing or `null`
/// `services` key is treated as an empty mapping; callers decide
/// whether that is an error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComposeFile {
    #[serde(default)]
    services: Option<IndexMap<String, ServiceBody>>,
}

/// The value under a service name. Anything that is not a mapping of
/// well-typed fields is kept as `Malformed` so one odd service does
/// not fail the whole document.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "Value")]
enum ServiceBody {
    Spec(ServiceSpec),
    Malformed(Value),
}

impl From<Value> for ServiceBody {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Spec(ServiceSpec::default()),
            Value::Mapping(_) => serde_yaml::from_value(value.clone())
                .map_or_else(|_| Self::Malformed(value), Self::Spec),
            other => Self::Malformed(other),
        }
    }
}

/// A single compose service, limited to the fields that map onto a
/// CapRover application definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceSpec {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub build: Option<BuildSpec>,
    #[serde(default)]
    pub command: Option<CommandSpec>,
    #[serde(default)]
    pub environment: Option<Environment>,
    #[serde(default)]
    pub ports: Option<Value>,
}

/// `build:` either names a context directory or is an object with
/// `context` and `dockerfile`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum BuildSpec {
    Context(String),
    Advanced {
        #[serde(default)]
        context: Option<String>,
        #[serde(default)]
        dockerfile: Option<String>,
    },
    Unsupported(Value),
}

/// `command:` in shell form or exec (sequence) form.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CommandSpec {
    Shell(String),
    Exec(Vec<Value>),
    Unsupported(Value),
}

/// `environment:` as a list of `KEY=VALUE` strings or a mapping.
/// Mapping keys may be any scalar (`1:`, `true:`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Environment {
    List(Vec<Value>),
    Map(Mapping),
    Unsupported(Value),
}

impl ComposeFile {
    /// Parse a compose document from YAML text.
    ///
    /// An empty document yields an empty [`ComposeFile`].
    pub fn from_yaml(content: &str) -> DeployResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let compose: Option<Self> = serde_yaml::from_str(content)?;
        Ok(compose.unwrap_or_default())
    }

    /// Iterate services in document order. Services declared without
    /// a body, or with a body that is not a valid service mapping,
    /// yield an empty [`ServiceSpec`].
    pub fn services(&self) -> impl Iterator<Item = (&str, ServiceSpec)> + '_ {
        self.services.iter().flatten().map(|(name, body)| match body {
            ServiceBody::Spec(spec) => (name.as_str(), spec.clone()),
            ServiceBody::Malformed(value) => {
                tracing::warn!(service = %name, ?value, "service body is not a mapping, ignoring its fields");
                (name.as_str(), ServiceSpec::default())
            }
        })
    }

    #[must_use]
    pub fn service_names(&self) -> Vec<&str> {
        self.services
            .iter()
            .flat_map(|services| services.keys())
            .map(String::as_str)
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.as_ref().is_none_or(|services| services.is_empty())
    }
}

impl ServiceSpec {
    /// String entries of `ports:`. Numeric entries and non-sequence
    /// values are skipped.
    pub fn port_entries(&self) -> impl Iterator<Item = &str> + '_ {
        self.ports
            .as_ref()
            .and_then(Value::as_sequence)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
    }
}

/// Resolve `path` against the working directory, read it, and parse
/// it as a compose document.
pub fn load(path: &Path) -> DeployResult<ComposeFile> {
    let full = std::path::absolute(path)?;
    if !full.exists() {
        return Err(DeployError::FileNotFound(format!(
            "compose file not found: {}",
            full.display()
        )));
    }

    tracing::debug!(path = %full.display(), "reading compose file");
    let raw = fs::read_to_string(&full)?;
    ComposeFile::from_yaml(&raw)
}

/// Render a YAML scalar the way it would appear as an environment
/// value or command argument. `null` becomes the empty string;
/// sequences and mappings are rendered as compact JSON.
#[must_use]
pub fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => {
            serde_json::to_string(value).unwrap_or_default()
        }
    }
}
