// SPDX-FileCopyrightText: 2026 Quantbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Quantbot configuration system.

use quantbot_config::diagnostic::{ConfigError, suggest_key};
use quantbot_config::model::QuantbotConfig;
use quantbot_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_quantbot_config() {
    let toml = r#"
[agent]
name = "test-bot"
mode = "paper"
log_level = "debug"

[vault]
path = "/tmp/test-keys.enc"
lock_timeout_ms = 2500
required = ["ALPACA_API_KEY", "ALPACA_SECRET_KEY"]
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "test-bot");
    assert_eq!(config.agent.mode, "paper");
    assert_eq!(config.agent.log_level, "debug");
    assert_eq!(config.vault.path, "/tmp/test-keys.enc");
    assert_eq!(config.vault.lock_timeout_ms, 2500);
    assert_eq!(
        config.vault.required,
        vec!["ALPACA_API_KEY", "ALPACA_SECRET_KEY"]
    );
}

/// Unknown field in [vault] section produces an UnknownField error.
#[test]
fn unknown_field_in_vault_produces_error() {
    let toml = r#"
[vault]
pat = "keys.enc"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    // Figment wraps serde's deny_unknown_fields error
    assert!(
        err_str.contains("unknown field") || err_str.contains("pat"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let toml = "";
    let config = load_config_from_str(toml).expect("empty TOML should use defaults");

    assert_eq!(config.agent.name, "quantbot");
    assert_eq!(config.agent.mode, "backtest");
    assert_eq!(config.agent.log_level, "info");
    assert_eq!(config.vault.path, "secrets/keys.enc");
    assert_eq!(config.vault.lock_timeout_ms, 5000);
    assert!(config.vault.required.is_empty());
}

/// Environment variable style override maps to vault.path via dot notation
/// (Env::map, NOT Env::split -- underscore-containing keys must survive).
#[test]
fn env_style_override_sets_vault_path() {
    use figment::{Figment, providers::Serialized};

    let config: QuantbotConfig = Figment::new()
        .merge(Serialized::defaults(QuantbotConfig::default()))
        .merge(("vault.path", "/run/vault/keys.enc"))
        .extract()
        .expect("should set vault.path via dot notation");

    assert_eq!(config.vault.path, "/run/vault/keys.enc");
}

/// lock_timeout_ms contains underscores and must not be split into sections.
#[test]
fn env_style_override_sets_lock_timeout() {
    use figment::{Figment, providers::Serialized};

    let config: QuantbotConfig = Figment::new()
        .merge(Serialized::defaults(QuantbotConfig::default()))
        .merge(("vault.lock_timeout_ms", 250u64))
        .extract()
        .expect("should set lock_timeout_ms via dot notation");

    assert_eq!(config.vault.lock_timeout_ms, 250);
}

/// Missing config files are silently skipped (Figment's Toml::file() behavior).
#[test]
fn missing_config_files_silently_skipped() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let config: QuantbotConfig = Figment::new()
        .merge(Serialized::defaults(QuantbotConfig::default()))
        .merge(Toml::file("/nonexistent/path/quantbot.toml"))
        .extract()
        .expect("missing file should be silently skipped");

    // Should just get defaults
    assert_eq!(config.agent.name, "quantbot");
}

/// Unexpected top-level section is rejected by deny_unknown_fields.
#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[brokers]
alpaca = "yes"
"#;

    let err =
        load_config_from_str(toml).expect_err("unknown top-level section should be rejected");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("brokers"),
        "error should mention unknown field, got: {err_str}"
    );
}

// ============================================================================
// Diagnostic tests
// ============================================================================

/// Unknown key "pat" in [vault] produces suggestion "did you mean `path`?"
#[test]
fn diagnostic_pat_suggests_path() {
    let valid_keys = &["path", "lock_timeout_ms", "required"];
    let suggestion = suggest_key("pat", valid_keys);
    assert_eq!(suggestion, Some("path".to_string()));
}

/// Unknown key "zzzzzz" with no close match does NOT produce a suggestion.
#[test]
fn diagnostic_no_suggestion_for_distant_typo() {
    let valid_keys = &["path", "lock_timeout_ms", "required"];
    let suggestion = suggest_key("zzzzzz", valid_keys);
    assert!(suggestion.is_none(), "should not suggest for distant typo");
}

/// Error output from load_and_validate_str includes the unknown key name.
#[test]
fn diagnostic_error_includes_unknown_key() {
    let toml = r#"
[vault]
pat = "keys.enc"
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    assert!(!errors.is_empty(), "should have at least one error");

    let has_unknown_key = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "pat"
                && suggestion.as_deref() == Some("path")
                && valid_keys.contains("path")
        })
    });
    assert!(
        has_unknown_key,
        "should have UnknownKey error for 'pat' with suggestion 'path', got: {errors:?}"
    );
}

/// Invalid type (string where number expected) produces clear message.
#[test]
fn diagnostic_invalid_type_message() {
    let toml = r#"
[vault]
lock_timeout_ms = "not_a_number"
"#;

    let err = load_config_from_str(toml).expect_err("should reject invalid type");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("invalid type") || err_str.contains("lock_timeout_ms"),
        "error should mention type mismatch, got: {err_str}"
    );
}

/// ConfigError implements miette::Diagnostic (can be rendered).
#[test]
fn config_error_implements_diagnostic() {
    use miette::Diagnostic;

    let error = ConfigError::UnknownKey {
        key: "pat".to_string(),
        suggestion: Some("path".to_string()),
        valid_keys: "path, lock_timeout_ms, required".to_string(),
        span: None,
        src: None,
    };

    // Verify it implements Diagnostic
    let code = error.code();
    assert!(code.is_some(), "should have diagnostic code");

    let help = error.help();
    assert!(help.is_some(), "should have help text");
    let help_str = help.unwrap().to_string();
    assert!(
        help_str.contains("did you mean `path`"),
        "help should contain suggestion, got: {help_str}"
    );
}

/// ConfigError can be rendered using miette's graphical handler.
#[test]
fn config_error_renders_with_miette() {
    use miette::GraphicalReportHandler;

    let error = ConfigError::UnknownKey {
        key: "pat".to_string(),
        suggestion: Some("path".to_string()),
        valid_keys: "path, lock_timeout_ms, required".to_string(),
        span: None,
        src: None,
    };

    let handler = GraphicalReportHandler::new();
    let mut buf = String::new();
    handler
        .render_report(&mut buf, &error)
        .expect("should render without error");
    assert!(!buf.is_empty(), "rendered report should not be empty");
    assert!(buf.contains("pat"), "rendered report should mention the key");
}

/// load_and_validate_str with valid TOML returns Ok config.
#[test]
fn load_and_validate_valid_toml() {
    let toml = r#"
[agent]
mode = "live"
"#;

    let config = load_and_validate_str(toml).expect("valid TOML should validate");
    assert_eq!(config.agent.mode, "live");
}

/// Validation catches an unknown run mode.
#[test]
fn validation_catches_unknown_mode() {
    let toml = r#"
[agent]
mode = "turbo"
"#;

    let errors = load_and_validate_str(toml).expect_err("unknown mode should fail");
    let has_validation_error = errors.iter().any(|e| {
        matches!(e, ConfigError::Validation { message } if message.contains("agent.mode"))
    });
    assert!(
        has_validation_error,
        "should have validation error for unknown mode"
    );
}

/// Validation catches a zero lock timeout.
#[test]
fn validation_catches_zero_lock_timeout() {
    let toml = r#"
[vault]
lock_timeout_ms = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("zero timeout should fail");
    let has_validation_error = errors.iter().any(|e| {
        matches!(e, ConfigError::Validation { message } if message.contains("lock_timeout_ms"))
    });
    assert!(
        has_validation_error,
        "should have validation error for zero lock timeout"
    );
}
