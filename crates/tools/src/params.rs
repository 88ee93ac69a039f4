//! Effective PQ creation parameter resolution: `tool_parameter >
//! system.session_creation.defaults > engine API default` (§4.1, §4.5).

use dh_domain::config::{SessionCreationDefaults, SessionLanguage};
use dh_domain::{CoreError, PqCreateParams};
use serde_json::Value;

use crate::args;

fn parse_language(raw: &str) -> Result<SessionLanguage, CoreError> {
    match raw {
        "python" => Ok(SessionLanguage::Python),
        "groovy" => Ok(SessionLanguage::Groovy),
        other => Err(CoreError::invalid_argument(format!(
            "programming_language must be \"python\" or \"groovy\", got {other:?}"
        ))),
    }
}

/// Builds the effective [`PqCreateParams`] for a PQ named `name`, layering
/// `args` over `defaults`, leaving anything neither specifies at its
/// engine-API default (`None`/empty).
pub fn resolve_pq_create_params(
    name: &str,
    args: &Value,
    defaults: &SessionCreationDefaults,
) -> Result<PqCreateParams, CoreError> {
    let programming_language = match args::str_opt(args, "programming_language") {
        Some(raw) => Some(parse_language(raw)?),
        None => defaults.programming_language,
    };

    let extra_jvm_args = {
        let from_args = args::str_vec_opt(args, "extra_jvm_args")?;
        if from_args.is_empty() { defaults.extra_jvm_args.clone() } else { from_args }
    };
    let extra_environment_vars = {
        let from_args = args::str_vec_opt(args, "extra_environment_vars")?;
        if from_args.is_empty() { defaults.extra_environment_vars.clone() } else { from_args }
    };
    let admin_groups = {
        let from_args = args::str_vec_opt(args, "admin_groups")?;
        if from_args.is_empty() { defaults.admin_groups.clone() } else { from_args }
    };
    let viewer_groups = {
        let from_args = args::str_vec_opt(args, "viewer_groups")?;
        if from_args.is_empty() { defaults.viewer_groups.clone() } else { from_args }
    };

    let session_arguments = match args.get("session_arguments").and_then(Value::as_object) {
        Some(obj) => obj.clone(),
        None => defaults.session_arguments.clone(),
    };

    Ok(PqCreateParams {
        name: name.to_string(),
        heap_size_gb: args::f64_opt(args, "heap_size_gb")?.or(defaults.heap_size_gb),
        programming_language,
        auto_delete_timeout: args::u64_opt(args, "auto_delete_timeout")?.or(defaults.auto_delete_timeout),
        server: args::str_opt(args, "server").map(str::to_string).or_else(|| defaults.server.clone()),
        engine: args::str_opt(args, "engine").map(str::to_string).or_else(|| defaults.engine.clone()),
        extra_jvm_args,
        extra_environment_vars,
        admin_groups,
        viewer_groups,
        timeout_seconds: args::f64_opt(args, "timeout_seconds")?.or(defaults.timeout_seconds),
        session_arguments,
    })
}

/// `tool_parameter > system defaults > None` (the engine-level default of
/// "no deadline override" is handled downstream by `dh_pq::lifecycle`).
pub fn resolve_timeout_seconds(args: &Value, defaults: &SessionCreationDefaults) -> Result<Option<f64>, CoreError> {
    Ok(args::f64_opt(args, "timeout_seconds")?.or(defaults.timeout_seconds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_argument_overrides_system_default() {
        let defaults = SessionCreationDefaults { heap_size_gb: Some(2.0), ..Default::default() };
        let params = resolve_pq_create_params("w1", &json!({"heap_size_gb": 8.0}), &defaults).unwrap();
        assert_eq!(params.heap_size_gb, Some(8.0));
    }

    #[test]
    fn falls_back_to_system_default_when_argument_absent() {
        let defaults = SessionCreationDefaults { heap_size_gb: Some(2.0), ..Default::default() };
        let params = resolve_pq_create_params("w1", &json!({}), &defaults).unwrap();
        assert_eq!(params.heap_size_gb, Some(2.0));
    }

    #[test]
    fn invalid_language_is_invalid_argument() {
        let err = resolve_pq_create_params("w1", &json!({"programming_language": "rust"}), &Default::default()).unwrap_err();
        assert_eq!(err.kind, dh_domain::ErrorKind::InvalidArgument);
    }
}
