use caprover_compose::error::DeployError;

#[test]
fn display_env_missing() {
    let err = DeployError::EnvMissing("CAPROVER_PASSWORD".into());
    assert_eq!(
        err.to_string(),
        "environment variable missing: CAPROVER_PASSWORD"
    );
}

#[test]
fn display_file_not_found() {
    let err = DeployError::FileNotFound("compose.yml".into());
    assert_eq!(err.to_string(), "file not found: compose.yml");
}

#[test]
fn display_empty_document() {
    let err = DeployError::EmptyDocument("../compose.yml".into());
    assert_eq!(err.to_string(), "no services defined in ../compose.yml");
}

#[test]
fn display_other() {
    let err = DeployError::Other("custom error".into());
    assert_eq!(err.to_string(), "custom error");
}

#[test]
fn from_io_error() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
    let err: DeployError = io_err.into();
    assert!(matches!(err, DeployError::Io(_)));
}

#[test]
fn from_json_error() {
    let json_err = serde_json::from_str::<Vec<u64>>("invalid").unwrap_err();
    let err: DeployError = json_err.into();
    assert!(matches!(err, DeployError::Json(_)));
}

#[test]
fn from_yaml_error() {
    let yaml_err = serde_yaml::from_str::<Vec<u64>>("{").unwrap_err();
    let err: DeployError = yaml_err.into();
    assert!(matches!(err, DeployError::Yaml(_)));
}
