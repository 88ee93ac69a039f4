//! Enterprise (controller-brokered) system configuration (§3, §6, §4.1).

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::credential::CredentialRef;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EnterpriseConfig {
    #[serde(default)]
    pub systems: HashMap<String, EnterpriseSystemConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnterpriseAuthType {
    Password,
    PrivateKey,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnterpriseSystemConfig {
    pub connection_json_url: String,
    pub auth_type: EnterpriseAuthType,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub password_env_var: Option<String>,
    #[serde(default)]
    pub private_key_path: Option<PathBuf>,
    #[serde(default)]
    pub session_creation: SessionCreationConfig,
}

impl EnterpriseSystemConfig {
    pub fn password_credential(&self) -> CredentialRef {
        CredentialRef {
            inline: self.password.clone(),
            env_var: self.password_env_var.clone(),
        }
    }

    pub fn validate(&self, key: &str) -> Vec<super::ConfigIssue> {
        use super::ConfigIssue;
        let mut issues = Vec::new();

        if !self.connection_json_url.starts_with("https://")
            && !self.connection_json_url.starts_with("http://")
        {
            issues.push(ConfigIssue::error(format!(
                "enterprise.systems.{key}.connection_json_url: must be an http(s) URL"
            )));
        }

        match self.auth_type {
            EnterpriseAuthType::Password => {
                if self.username.is_none() {
                    issues.push(ConfigIssue::error(format!(
                        "enterprise.systems.{key}: auth_type=password requires username"
                    )));
                }
                if let Err(msg) = self
                    .password_credential()
                    .validate(&format!("enterprise.systems.{key}.password"))
                {
                    issues.push(ConfigIssue::error(msg));
                }
                if self.password_credential().is_unset() {
                    issues.push(ConfigIssue::error(format!(
                        "enterprise.systems.{key}: auth_type=password requires password or password_env_var"
                    )));
                }
                if self.private_key_path.is_some() {
                    issues.push(ConfigIssue::warning(format!(
                        "enterprise.systems.{key}: private_key_path is ignored when auth_type=password"
                    )));
                }
            }
            EnterpriseAuthType::PrivateKey => {
                if self.private_key_path.is_none() {
                    issues.push(ConfigIssue::error(format!(
                        "enterprise.systems.{key}: auth_type=private_key requires private_key_path"
                    )));
                }
                if let Some(p) = &self.private_key_path {
                    if !p.is_absolute() {
                        issues.push(ConfigIssue::error(format!(
                            "enterprise.systems.{key}.private_key_path: must be an absolute path"
                        )));
                    }
                }
                if !self.password_credential().is_unset() {
                    issues.push(ConfigIssue::warning(format!(
                        "enterprise.systems.{key}: password fields are ignored when auth_type=private_key"
                    )));
                }
            }
        }

        issues.extend(self.session_creation.defaults.validate(key));

        issues
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionCreationConfig {
    #[serde(default)]
    pub max_concurrent_sessions: Option<u32>,
    #[serde(default)]
    pub defaults: SessionCreationDefaults,
}

/// Recognized `session_creation.defaults` fields (§4.1). Every field is
/// optional: the effective value resolution order is
/// `tool_parameter > system.session_creation.defaults > engine API default`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionCreationDefaults {
    #[serde(default)]
    pub heap_size_gb: Option<f64>,
    #[serde(default)]
    pub programming_language: Option<super::community::SessionLanguage>,
    #[serde(default)]
    pub auto_delete_timeout: Option<u64>,
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default)]
    pub engine: Option<String>,
    #[serde(default)]
    pub extra_jvm_args: Vec<String>,
    #[serde(default)]
    pub extra_environment_vars: Vec<String>,
    #[serde(default)]
    pub admin_groups: Vec<String>,
    #[serde(default)]
    pub viewer_groups: Vec<String>,
    #[serde(default)]
    pub timeout_seconds: Option<f64>,
    #[serde(default)]
    pub session_arguments: serde_json::Map<String, serde_json::Value>,
}

impl SessionCreationDefaults {
    fn validate(&self, key: &str) -> Vec<super::ConfigIssue> {
        use super::ConfigIssue;
        let mut issues = Vec::new();
        for kv in &self.extra_environment_vars {
            if !kv.contains('=') {
                issues.push(ConfigIssue::error(format!(
                    "enterprise.systems.{key}.session_creation.defaults.extra_environment_vars: \
                     entry {kv:?} is not in NAME=value form"
                )));
            }
        }
        if let Some(heap) = self.heap_size_gb {
            if heap <= 0.0 {
                issues.push(ConfigIssue::error(format!(
                    "enterprise.systems.{key}.session_creation.defaults.heap_size_gb: must be positive"
                )));
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(auth_type: EnterpriseAuthType) -> EnterpriseSystemConfig {
        EnterpriseSystemConfig {
            connection_json_url: "https://example.com/connect.json".into(),
            auth_type,
            username: None,
            password: None,
            password_env_var: None,
            private_key_path: None,
            session_creation: SessionCreationConfig::default(),
        }
    }

    #[test]
    fn password_auth_requires_username_and_password() {
        let cfg = base(EnterpriseAuthType::Password);
        let issues = cfg.validate("prod");
        assert!(issues.iter().any(|i| i.message.contains("username")));
        assert!(issues.iter().any(|i| i.message.contains("password")));
    }

    #[test]
    fn private_key_auth_requires_absolute_path() {
        let mut cfg = base(EnterpriseAuthType::PrivateKey);
        cfg.private_key_path = Some(PathBuf::from("relative/key.pem"));
        let issues = cfg.validate("prod");
        assert!(issues
            .iter()
            .any(|i| i.message.contains("private_key_path")));
    }

    #[test]
    fn extraneous_sibling_fields_warn_not_error() {
        let mut cfg = base(EnterpriseAuthType::PrivateKey);
        cfg.private_key_path = Some(PathBuf::from("/abs/key.pem"));
        cfg.password = Some("ignored".into());
        let issues = cfg.validate("prod");
        assert!(issues
            .iter()
            .all(|i| i.severity == super::super::ConfigSeverity::Warning || !i.message.contains("password fields")));
        assert!(issues.iter().any(|i| i.message.contains("password fields")
            && i.severity == super::super::ConfigSeverity::Warning));
    }

    #[test]
    fn malformed_env_var_entry_is_an_error() {
        let mut cfg = base(EnterpriseAuthType::PrivateKey);
        cfg.private_key_path = Some(PathBuf::from("/abs/key.pem"));
        cfg.session_creation.defaults.extra_environment_vars = vec!["NOT_A_KV_PAIR".into()];
        let issues = cfg.validate("prod");
        assert!(issues
            .iter()
            .any(|i| i.message.contains("extra_environment_vars")));
    }
}
