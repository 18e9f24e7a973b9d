// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Mnemo configuration system.

use figment::Jail;
use mnemo_config::diagnostic::ConfigError;
use mnemo_config::model::ConsolidationMode;
use mnemo_config::{
    load_and_validate, load_and_validate_path, load_and_validate_str, load_config, load_config_from_path,
    load_config_from_str, require_api_key,
};

/// Valid TOML with every known field deserializes successfully.
#[test]
fn valid_toml_deserializes_into_mnemo_config() {
    let toml = r#"
[agent]
user_name = "alice"
log_level = "debug"
system_prompt = "Be brief."

[llm]
api_key = "sk-123"
base_url = "http://localhost:8080"
model = "gpt-4o-mini"
temperature = 0.2
max_tokens = 512
timeout_secs = 30

[embedding]
model = "bge-small"
base_url = "http://localhost:9090"

[memory]
data_dir = "/tmp/mnemo"
retrieval_k = 5
short_term_max_turns = 20
consolidation = "inline"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.user_name, "alice");
    assert_eq!(config.agent.log_level, "debug");
    assert_eq!(config.agent.system_prompt.as_deref(), Some("Be brief."));
    assert_eq!(config.llm.api_key.as_deref(), Some("sk-123"));
    assert_eq!(config.llm.base_url, "http://localhost:8080");
    assert_eq!(config.llm.model, "gpt-4o-mini");
    assert!((config.llm.temperature - 0.2).abs() < f32::EPSILON);
    assert_eq!(config.llm.max_tokens, 512);
    assert_eq!(config.llm.timeout_secs, 30);
    assert_eq!(config.embedding.model, "bge-small");
    assert_eq!(config.embedding.base_url.as_deref(), Some("http://localhost:9090"));
    assert_eq!(config.memory.data_dir, "/tmp/mnemo");
    assert_eq!(config.memory.retrieval_k, 5);
    assert_eq!(config.memory.short_term_max_turns, Some(20));
    assert_eq!(config.memory.consolidation, ConsolidationMode::Inline);
}

/// Missing sections use defaults without error.
#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.agent.user_name, "chenkx");
    assert_eq!(config.agent.log_level, "info");
    assert!(config.llm.api_key.is_none());
    assert_eq!(config.llm.base_url, "https://api.deepseek.com");
    assert_eq!(config.llm.model, "deepseek-chat");
    assert!((config.llm.temperature - 0.7).abs() < f32::EPSILON);
    assert_eq!(config.llm.max_tokens, 4096);
    assert_eq!(config.llm.timeout_secs, 120);
    assert_eq!(config.embedding.model, "text-embedding-3-small");
    assert!(config.embedding.base_url.is_none());
    assert_eq!(config.memory.retrieval_k, 3);
    assert!(config.memory.short_term_max_turns.is_none());
    assert_eq!(config.memory.consolidation, ConsolidationMode::Background);
}

#[test]
fn unknown_field_in_llm_produces_error() {
    let toml = r#"
[llm]
modle = "x"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("modle"),
        "error should mention unknown field, got: {err_str}"
    );
}

#[test]
fn unknown_top_level_section_is_rejected() {
    let toml = r#"
[storage]
database_path = "x.db"
"#;

    assert!(load_config_from_str(toml).is_err());
}

#[test]
fn invalid_consolidation_mode_is_rejected() {
    let toml = r#"
[memory]
consolidation = "sometimes"
"#;

    assert!(load_config_from_str(toml).is_err());
}

/// Unknown key diagnostics carry the suggestion and the section's valid keys.
#[test]
fn diagnostic_unknown_key_suggests_correction() {
    let toml = r#"
[agent]
usr_name = "bob"
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "usr_name"
                && suggestion.as_deref() == Some("user_name")
                && valid_keys.contains("log_level")
        })
    });
    assert!(found, "expected UnknownKey for usr_name, got: {errors:?}");
}

#[test]
fn diagnostic_invalid_type_names_the_key() {
    let toml = r#"
[memory]
retrieval_k = "three"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject invalid type");
    assert!(
        errors.iter().any(|e| e.to_string().contains("retrieval_k")),
        "got: {errors:?}"
    );
}

#[test]
fn validation_runs_after_deserialization() {
    let toml = r#"
[llm]
temperature = 3.5
"#;

    let errors = load_and_validate_str(toml).expect_err("out of range temperature");
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("temperature"))
    ));
}

#[test]
fn config_error_renders_with_miette() {
    use miette::GraphicalReportHandler;

    let error = ConfigError::UnknownKey {
        key: "usr_name".to_string(),
        suggestion: Some("user_name".to_string()),
        valid_keys: "user_name, log_level".to_string(),
        span: None,
        src: None,
    };

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render without error");
    assert!(buf.contains("usr_name"));
    assert!(buf.contains("did you mean `user_name`"));
}

/// `MNEMO_*` variables map to dotted keys without splitting inner underscores.
#[test]
fn prefixed_env_vars_override_toml() {
    Jail::expect_with(|jail| {
        jail.create_file("mnemo.toml", "[llm]\nmax_tokens = 100\n")?;
        jail.set_env("MNEMO_LLM_MAX_TOKENS", "2048");
        jail.set_env("MNEMO_MEMORY_SHORT_TERM_MAX_TURNS", "8");
        jail.set_env("MNEMO_EMBEDDING_BASE_URL", "http://embed.local");

        let config = load_config()?;
        assert_eq!(config.llm.max_tokens, 2048);
        assert_eq!(config.memory.short_term_max_turns, Some(8));
        assert_eq!(config.embedding.base_url.as_deref(), Some("http://embed.local"));
        Ok(())
    });
}

/// The plain `.env` variable names are honored and win over `MNEMO_*`.
#[test]
fn plain_env_vars_are_mapped() {
    Jail::expect_with(|jail| {
        jail.set_env("API_KEY", "sk-plain");
        jail.set_env("BASE_URL", "https://api.openai.com/v1");
        jail.set_env("LLM_MODEL", "gpt-4o");
        jail.set_env("LLM_TEMPERATURE", "0.3");
        jail.set_env("LLM_MAX_TOKENS", "1024");
        jail.set_env("EMBEDDING_MODEL", "text-embedding-3-large");
        jail.set_env("DEFAULT_USER_NAME", "dana");
        jail.set_env("MNEMO_LLM_MODEL", "ignored");

        let config = load_config()?;
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-plain"));
        assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
        assert_eq!(config.llm.model, "gpt-4o");
        assert!((config.llm.temperature - 0.3).abs() < 1e-6);
        assert_eq!(config.llm.max_tokens, 1024);
        assert_eq!(config.embedding.model, "text-embedding-3-large");
        assert_eq!(config.agent.user_name, "dana");
        Ok(())
    });
}

#[test]
fn local_file_is_picked_up_and_validated() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "mnemo.toml",
            "[agent]\nuser_name = \"erin\"\n\n[llm]\napi_key = \"sk-file\"\n",
        )?;

        let config = load_and_validate().map_err(|e| format!("{e:?}"))?;
        assert_eq!(config.agent.user_name, "erin");
        assert_eq!(require_api_key(&config).ok(), Some("sk-file"));
        Ok(())
    });
}

#[test]
fn load_from_explicit_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, "[memory]\nretrieval_k = 7\n").unwrap();

    let config = load_config_from_path(&path).expect("explicit path should load");
    assert_eq!(config.memory.retrieval_k, 7);
}

#[test]
fn missing_config_file_is_silently_skipped() {
    let config = load_config_from_path(std::path::Path::new("/nonexistent/mnemo.toml"))
        .expect("missing file should be skipped");
    assert_eq!(config.memory.retrieval_k, 3);
}

#[test]
fn explicit_path_is_validated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[memory]\nretrieval_k = 0\n").unwrap();

    let errors = load_and_validate_path(&path).expect_err("retrieval_k = 0 is invalid");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("retrieval_k"))));
}
