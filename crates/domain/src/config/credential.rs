//! Shared "inline value or env-var indirection" credential shape.
//!
//! Used by both community `auth_token`/`auth_token_env_var` and enterprise
//! `password`/`password_env_var`. Config validation only checks the
//! structural "at most one of inline/env" invariant (§3) — resolving the
//! env var happens lazily, at acquisition time, in `dh-resources`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CredentialRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_var: Option<String>,
}

impl CredentialRef {
    pub fn inline(value: impl Into<String>) -> Self {
        Self {
            inline: Some(value.into()),
            env_var: None,
        }
    }

    pub fn env_var(name: impl Into<String>) -> Self {
        Self {
            inline: None,
            env_var: Some(name.into()),
        }
    }

    pub fn is_unset(&self) -> bool {
        self.inline.is_none() && self.env_var.is_none()
    }

    /// Structural validation: at most one of the two may be set. The
    /// specification mandates rejection, not a precedence rule, when both
    /// are present (§9 Open Questions).
    pub fn validate(&self, field_name: &str) -> Result<(), String> {
        if self.inline.is_some() && self.env_var.is_some() {
            return Err(format!(
                "{field_name}: at most one of inline value / env-var reference may be set"
            ));
        }
        Ok(())
    }

    /// Render a log-safe description: the env var name, or a fixed
    /// redaction marker for inline secrets. Never returns the inline value.
    pub fn redacted_display(&self) -> String {
        match (&self.inline, &self.env_var) {
            (Some(_), _) => "<inline, redacted>".to_string(),
            (None, Some(name)) => format!("env:{name}"),
            (None, None) => "<unset>".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_set_is_invalid() {
        let cred = CredentialRef {
            inline: Some("secret".into()),
            env_var: Some("TOKEN".into()),
        };
        assert!(cred.validate("auth_token").is_err());
    }

    #[test]
    fn single_field_is_valid() {
        assert!(CredentialRef::inline("x").validate("auth_token").is_ok());
        assert!(CredentialRef::env_var("X").validate("auth_token").is_ok());
        assert!(CredentialRef::default().validate("auth_token").is_ok());
    }

    #[test]
    fn redacted_display_never_leaks_inline_value() {
        let cred = CredentialRef::inline("super-secret-value");
        assert!(!cred.redacted_display().contains("super-secret-value"));
    }

    #[test]
    fn redacted_display_shows_env_var_name() {
        let cred = CredentialRef::env_var("DH_TOKEN");
        assert_eq!(cred.redacted_display(), "env:DH_TOKEN");
    }
}
