//! Per-service field derivation.
//!
//! Each function here reads one concern out of a [`ServiceSpec`] and
//! never fails: malformed entries are skipped, missing fields yield
//! empty or `None` results.

use serde_yaml::Value;

use crate::compose::{BuildSpec, CommandSpec, Environment, ServiceSpec, scalar_to_string};

/// Port assumed for services whose name suggests a web UI but which
/// publish no ports.
pub const DEFAULT_WEB_PORT: u16 = 8080;

/// Everything derived from one compose service, before it is turned
/// into an application definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub env_vars: Vec<(String, String)>,
    pub port_mapping: Vec<(String, String)>,
    pub http_port: Option<u16>,
    pub image_name: Option<String>,
    pub dockerfile_path: Option<String>,
    pub command: Option<String>,
}

impl ServiceDescriptor {
    #[must_use]
    pub fn from_service(name: &str, spec: &ServiceSpec) -> Self {
        let (image_name, dockerfile_path) = match build_source(spec) {
            Some(BuildSource::Image(image)) => (Some(image), None),
            Some(BuildSource::Dockerfile(path)) => (None, Some(path)),
            None => (None, None),
        };

        Self {
            env_vars: normalize_env(spec.environment.as_ref()),
            port_mapping: port_mapping(spec),
            http_port: container_http_port(name, spec),
            image_name,
            dockerfile_path,
            command: command(spec),
        }
    }
}

/// Where the application's container comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildSource {
    /// A prebuilt image reference, used verbatim.
    Image(String),
    /// Path to a Dockerfile, joined from the build context.
    Dockerfile(String),
}

/// Flatten `environment:` into ordered `(key, value)` pairs.
///
/// List entries split on the first `=`; an entry without `=` becomes
/// a key with an empty value. Repeated keys are all kept.
#[must_use]
pub fn normalize_env(env: Option<&Environment>) -> Vec<(String, String)> {
    match env {
        Some(Environment::List(entries)) => entries
            .iter()
            .filter_map(Value::as_str)
            .map(|entry| match entry.split_once('=') {
                Some((key, value)) => (key.to_string(), value.to_string()),
                None => (entry.to_string(), String::new()),
            })
            .collect(),
        Some(Environment::Map(map)) => map
            .iter()
            .map(|(key, value)| (scalar_to_string(key), scalar_to_string(value)))
            .collect(),
        Some(Environment::Unsupported(_)) | None => Vec::new(),
    }
}

/// Guess the port the container serves HTTP on.
///
/// The container side of the first parseable `ports:` entry wins.
/// Failing that, services named like `*web*` or `*ui*` get
/// [`DEFAULT_WEB_PORT`].
#[must_use]
pub fn container_http_port(name: &str, spec: &ServiceSpec) -> Option<u16> {
    let published = spec.port_entries().find_map(|entry| {
        let container = entry.rsplit(':').next().unwrap_or(entry);
        leading_port(strip_protocol(container))
    });
    if published.is_some() {
        return published;
    }

    let lower = name.to_lowercase();
    if lower.contains("web") || lower.contains("ui") {
        return Some(DEFAULT_WEB_PORT);
    }
    None
}

/// Pick the image or Dockerfile a service is built from. `image`
/// takes precedence over `build`.
#[must_use]
pub fn build_source(spec: &ServiceSpec) -> Option<BuildSource> {
    if let Some(image) = spec.image.as_deref().filter(|i| !i.is_empty()) {
        return Some(BuildSource::Image(image.to_string()));
    }

    match spec.build.as_ref()? {
        BuildSpec::Context(context) if !context.is_empty() => {
            Some(BuildSource::Dockerfile(posix_join(context, "Dockerfile")))
        }
        BuildSpec::Advanced {
            context,
            dockerfile,
        } => {
            let context = context.as_deref().filter(|c| !c.is_empty()).unwrap_or(".");
            let dockerfile = dockerfile
                .as_deref()
                .filter(|d| !d.is_empty())
                .unwrap_or("Dockerfile");
            Some(BuildSource::Dockerfile(posix_join(context, dockerfile)))
        }
        BuildSpec::Context(_) | BuildSpec::Unsupported(_) => None,
    }
}

/// Render `command:` as a single string. Exec-form arguments are
/// joined with spaces; their original quoting is not preserved. A
/// `null` argument is rendered as the literal `null`.
#[must_use]
pub fn command(spec: &ServiceSpec) -> Option<String> {
    match spec.command.as_ref()? {
        CommandSpec::Shell(cmd) if !cmd.is_empty() => Some(cmd.clone()),
        CommandSpec::Exec(args) => Some(
            args.iter()
                .map(|arg| match arg {
                    Value::Null => "null".to_string(),
                    other => scalar_to_string(other),
                })
                .collect::<Vec<_>>()
                .join(" "),
        ),
        CommandSpec::Shell(_) | CommandSpec::Unsupported(_) => None,
    }
}

/// Collect `host:container` pairs from `ports:`, protocol suffixes
/// stripped. Entries lacking either side are skipped. Ports stay
/// strings because that is what the remote schema expects.
#[must_use]
pub fn port_mapping(spec: &ServiceSpec) -> Vec<(String, String)> {
    spec.port_entries()
        .filter_map(|entry| {
            let mut parts = entry.split(':');
            let host = parts.next().filter(|h| !h.is_empty())?;
            let container = parts.next().filter(|c| !c.is_empty())?;
            Some((
                strip_protocol(host).to_string(),
                strip_protocol(container).to_string(),
            ))
        })
        .collect()
}

/// Parse the leading digits of `s` as a port, so a range such as
/// `8000-8010` yields its first port.
fn leading_port(s: &str) -> Option<u16> {
    let s = s.trim_start();
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s[..end].parse().ok()
}

fn strip_protocol(port: &str) -> &str {
    port.split('/').next().unwrap_or(port)
}

/// Join two slash-separated paths and normalize the result, resolving
/// `.` and `..` segments lexically.
///
/// `posix_join("./api", "Dockerfile")` is `"api/Dockerfile"`.
#[must_use]
pub fn posix_join(base: &str, tail: &str) -> String {
    let joined = format!("{base}/{tail}");
    let absolute = joined.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if absolute => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let body = segments.join("/");
    match (absolute, body.is_empty()) {
        (true, _) => format!("/{body}"),
        (false, true) => ".".to_string(),
        (false, false) => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_normalizes() {
        assert_eq!(posix_join("./api", "Dockerfile"), "api/Dockerfile");
        assert_eq!(posix_join(".", "Dockerfile"), "Dockerfile");
        assert_eq!(posix_join("../svc/", "Dockerfile"), "../svc/Dockerfile");
        assert_eq!(posix_join("a/b/..", "docker/Dockerfile.prod"), "a/docker/Dockerfile.prod");
        assert_eq!(posix_join("/srv//app", "Dockerfile"), "/srv/app/Dockerfile");
        assert_eq!(posix_join("/", "../Dockerfile"), "/Dockerfile");
        assert_eq!(posix_join("..", "../Dockerfile"), "../../Dockerfile");
    }

    #[test]
    fn port_ranges_use_first_port() {
        assert_eq!(leading_port("8000-8010"), Some(8000));
        assert_eq!(leading_port(" 80"), Some(80));
        assert_eq!(leading_port("http"), None);
        assert_eq!(leading_port("70000"), None);
    }

    #[test]
    fn protocol_suffix() {
        assert_eq!(strip_protocol("80/tcp"), "80");
        assert_eq!(strip_protocol("53"), "53");
    }
}
