use dh_domain::config::{Config, ConfigStore};

#[test]
fn default_config_has_no_sessions_or_systems() {
    let config = Config::default();
    assert!(config.community.sessions.is_empty());
    assert!(config.enterprise.systems.is_empty());
}

#[test]
fn community_session_parses_from_json() {
    let raw = r#"{
        "community": {
            "sessions": {
                "local": {
                    "host": "0.0.0.0",
                    "port": 3210,
                    "auth_type": "anonymous",
                    "session_type": "python"
                }
            }
        }
    }"#;
    let config = Config::parse(raw).unwrap();
    let session = &config.community.sessions["local"];
    assert_eq!(session.host, "0.0.0.0");
    assert_eq!(session.port, 3210);
}

#[test]
fn unknown_top_level_field_is_rejected() {
    let err = Config::parse(r#"{"bogus": 1}"#).unwrap_err();
    assert_eq!(err.kind, dh_domain::ErrorKind::ConfigInvalid);
}

#[test]
fn config_store_loads_the_document_named_by_its_path() {
    let mut path = std::env::temp_dir();
    path.push(format!("dh-config-defaults-test-{}.json", std::process::id()));
    std::fs::write(
        &path,
        r#"{"community": {"sessions": {"local": {"host": "h", "port": 1, "auth_type": "anonymous", "session_type": "python"}}}}"#,
    )
    .unwrap();

    let store = ConfigStore::load(path.clone()).unwrap();
    assert_eq!(store.current().community.sessions.len(), 1);

    let _ = std::fs::remove_file(path);
}
