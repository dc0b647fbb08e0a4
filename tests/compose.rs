use std::io::Write;

use caprover_compose::compose::{self, BuildSpec, CommandSpec, ComposeFile, Environment};
use caprover_compose::error::DeployError;

#[test]
fn services_keep_document_order() {
    let compose = ComposeFile::from_yaml(
        "\
services:
  zeta:
    image: redis
  alpha:
    image: postgres
  mid:
    image: nginx
",
    )
    .unwrap();

    assert_eq!(compose.service_names(), vec!["zeta", "alpha", "mid"]);
}

#[test]
fn missing_services_key_is_empty() {
    let compose = ComposeFile::from_yaml("version: '3'\n").unwrap();

    assert!(compose.is_empty());
    assert_eq!(compose.services().count(), 0);
}

#[test]
fn null_services_is_empty() {
    let compose = ComposeFile::from_yaml("services:\n").unwrap();

    assert!(compose.is_empty());
}

#[test]
fn service_without_body_is_default() {
    let compose = ComposeFile::from_yaml("services:\n  worker:\n").unwrap();

    let (name, spec) = compose.services().next().unwrap();
    assert_eq!(name, "worker");
    assert!(spec.image.is_none());
    assert!(spec.build.is_none());
    assert!(spec.environment.is_none());
}

#[test]
fn malformed_service_does_not_fail_document() {
    let compose = ComposeFile::from_yaml(
        "\
services:
  scalar: nginx
  listed: [a, b]
  typed:
    image: 123
    ports: [\"80:80\"]
  good:
    image: redis
",
    )
    .unwrap();

    let services: Vec<_> = compose.services().collect();
    assert_eq!(compose.service_names(), vec!["scalar", "listed", "typed", "good"]);
    assert!(services[0].1.image.is_none());
    assert!(services[1].1.image.is_none());
    assert!(services[2].1.image.is_none());
    assert_eq!(services[3].1.image.as_deref(), Some("redis"));
}

#[test]
fn unknown_fields_are_ignored() {
    let compose = ComposeFile::from_yaml(
        "\
services:
  db:
    image: postgres:16
    volumes:
      - pgdata:/var/lib/postgresql/data
    restart: always
volumes:
  pgdata:
",
    )
    .unwrap();

    let (_, spec) = compose.services().next().unwrap();
    assert_eq!(spec.image.as_deref(), Some("postgres:16"));
}

#[test]
fn build_shapes() {
    let compose = ComposeFile::from_yaml(
        "\
services:
  short:
    build: ./api
  long:
    build:
      context: ./web
      dockerfile: Dockerfile.prod
      args:
        NODE_ENV: production
",
    )
    .unwrap();

    let specs: Vec<_> = compose.services().map(|(_, s)| s).collect();
    assert_eq!(specs[0].build, Some(BuildSpec::Context("./api".into())));
    assert_eq!(
        specs[1].build,
        Some(BuildSpec::Advanced {
            context: Some("./web".into()),
            dockerfile: Some("Dockerfile.prod".into()),
        })
    );
}

#[test]
fn command_and_environment_shapes() {
    let compose = ComposeFile::from_yaml(
        "\
services:
  shell:
    command: npm start
    environment:
      - A=1
  exec:
    command: [\"python\", \"-m\", \"http.server\", 8000]
    environment:
      B: 2
",
    )
    .unwrap();

    let specs: Vec<_> = compose.services().map(|(_, s)| s).collect();
    assert_eq!(specs[0].command, Some(CommandSpec::Shell("npm start".into())));
    assert!(matches!(specs[0].environment, Some(Environment::List(_))));
    assert!(matches!(specs[1].command, Some(CommandSpec::Exec(ref args)) if args.len() == 4));
    assert!(matches!(specs[1].environment, Some(Environment::Map(_))));
}

#[test]
fn port_entries_skip_non_strings() {
    let compose = ComposeFile::from_yaml(
        "\
services:
  web:
    ports:
      - \"8080:80\"
      - 9000
      - \"443:443/tcp\"
",
    )
    .unwrap();

    let (_, spec) = compose.services().next().unwrap();
    assert_eq!(
        spec.port_entries().collect::<Vec<_>>(),
        vec!["8080:80", "443:443/tcp"]
    );
}

#[test]
fn load_reads_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "services:\n  app:\n    image: nginx:latest").unwrap();

    let compose = compose::load(file.path()).unwrap();

    assert_eq!(compose.service_names(), vec!["app"]);
}

#[test]
fn load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("compose.yml");

    let err = compose::load(&path).unwrap_err();

    assert!(matches!(err, DeployError::FileNotFound(ref msg) if msg.contains("compose.yml")));
}

#[test]
fn load_invalid_yaml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "services: [unclosed").unwrap();

    let err = compose::load(file.path()).unwrap_err();

    assert!(matches!(err, DeployError::Yaml(_)));
}
