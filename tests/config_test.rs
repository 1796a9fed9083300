use flexchat::config::{DEFAULT_API_BASE, DEFAULT_MODEL, FlexConfig, load, validate};
use std::path::PathBuf;

#[test]
fn default_config_has_sensible_values() {
    let config = FlexConfig::default();
    assert_eq!(config.server.port, 5173);
    assert_eq!(config.server.bind, "127.0.0.1");
    assert_eq!(config.server.uploads_dir, PathBuf::from("uploads"));
    assert_eq!(config.server.client_dist, PathBuf::from("client/dist"));
    assert_eq!(config.server.max_upload_bytes, 25 * 1024 * 1024);
    assert!(config.chat.api_key.is_none());
    assert_eq!(config.chat.model(), DEFAULT_MODEL);
    assert_eq!(config.chat.api_base(), DEFAULT_API_BASE);
    assert!(validate(&config).is_ok());
}

#[test]
fn valid_toml_parses_successfully() {
    let toml_str = r#"
[server]
port = 8080
bind = "0.0.0.0"
uploads_dir = "/var/lib/flexchat/uploads"
client_dist = "web/dist"
max_upload_bytes = 1024

[chat]
api_key = "sk-test"
model = "gpt-4o"
api_base = "http://localhost:11434/v1"
"#;

    let config: FlexConfig = toml::from_str(toml_str).unwrap();
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.bind, "0.0.0.0");
    assert_eq!(
        config.server.uploads_dir,
        PathBuf::from("/var/lib/flexchat/uploads")
    );
    assert_eq!(config.server.client_dist, PathBuf::from("web/dist"));
    assert_eq!(config.server.max_upload_bytes, 1024);
    assert_eq!(config.chat.api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.chat.model(), "gpt-4o");
    assert_eq!(
        config.chat.completions_url(),
        "http://localhost:11434/v1/chat/completions"
    );
    assert!(validate(&config).is_ok());
}

#[test]
fn partial_config_uses_defaults_for_missing_fields() {
    let toml_str = r#"
[chat]
api_key = "test-key"
"#;

    let config: FlexConfig = toml::from_str(toml_str).unwrap();
    assert_eq!(config.server.port, 5173);
    assert_eq!(config.server.bind, "127.0.0.1");
    assert_eq!(config.chat.model(), DEFAULT_MODEL);
    assert_eq!(config.chat.api_key.as_deref(), Some("test-key"));
}

#[test]
fn empty_toml_uses_all_defaults() {
    let config: FlexConfig = toml::from_str("").unwrap();
    assert_eq!(config.server.port, 5173);
    assert!(config.chat.api_key.is_none());
}

#[test]
fn malformed_toml_returns_parse_error() {
    let result = toml::from_str::<FlexConfig>("this is not valid toml {{{");
    assert!(result.is_err());
    let err = result.unwrap_err().to_string();
    assert!(
        err.contains("expected") || err.contains("invalid"),
        "error should be descriptive: {err}"
    );
}

#[test]
fn completions_url_tolerates_trailing_slash() {
    let config: FlexConfig = toml::from_str(
        r#"
[chat]
api_base = "https://proxy.example.com/openai/v1/"
"#,
    )
    .unwrap();
    assert_eq!(
        config.chat.completions_url(),
        "https://proxy.example.com/openai/v1/chat/completions"
    );
}

#[test]
fn validate_rejects_bad_values() {
    let mut config = FlexConfig::default();
    config.server.port = 0;
    let err = validate(&config).unwrap_err();
    assert!(err.to_string().contains("server.port"));

    let mut config = FlexConfig::default();
    config.chat.model = Some("  ".to_string());
    let err = validate(&config).unwrap_err();
    assert!(err.to_string().contains("chat.model"));

    let mut config = FlexConfig::default();
    config.chat.api_base = Some("not a url".to_string());
    let err = validate(&config).unwrap_err();
    assert!(err.to_string().contains("invalid chat.api_base"));

    let mut config = FlexConfig::default();
    config.chat.api_base = Some("ftp://example.com/v1".to_string());
    let err = validate(&config).unwrap_err();
    assert!(err.to_string().contains("scheme must be http or https"));
}

// All environment handling lives in one test: env vars are process-global
// and tests in this binary run in parallel.
#[test]
fn load_reads_file_then_fills_from_environment() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.toml");

    // SAFETY: no other test in this binary touches these variables.
    unsafe {
        std::env::set_var("FLEXCHAT_CONFIG", &missing);
        std::env::remove_var("OPENAI_API_KEY");
        std::env::remove_var("OPENAI_MODEL");
        std::env::remove_var("OPENAI_BASE_URL");
    }
    let config = load().unwrap();
    assert_eq!(config.server.port, 5173);
    assert!(config.chat.api_key.is_none());

    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[server]
port = 9999

[chat]
model = "from-file"
"#,
    )
    .unwrap();

    unsafe {
        std::env::set_var("FLEXCHAT_CONFIG", &path);
        std::env::set_var("OPENAI_API_KEY", "sk-env");
        std::env::set_var("OPENAI_MODEL", "from-env");
        std::env::set_var("OPENAI_BASE_URL", "");
    }
    let result = load();
    unsafe {
        std::env::remove_var("FLEXCHAT_CONFIG");
        std::env::remove_var("OPENAI_API_KEY");
        std::env::remove_var("OPENAI_MODEL");
        std::env::remove_var("OPENAI_BASE_URL");
    }

    let config = result.unwrap();
    assert_eq!(config.server.port, 9999);
    assert_eq!(config.chat.api_key.as_deref(), Some("sk-env"));
    // File wins over environment.
    assert_eq!(config.chat.model(), "from-file");
    // Empty env values count as unset.
    assert_eq!(config.chat.api_base(), DEFAULT_API_BASE);
}
