//! Community (direct-connect) session configuration (§3, §6).

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::credential::CredentialRef;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CommunityConfig {
    #[serde(default)]
    pub sessions: HashMap<String, CommunitySessionConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionLanguage {
    Python,
    Groovy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunitySessionConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_auth_type")]
    pub auth_type: String,
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default)]
    pub auth_token_env_var: Option<String>,
    #[serde(default = "default_session_type")]
    pub session_type: SessionLanguage,
    #[serde(default)]
    pub never_timeout: bool,
    #[serde(default)]
    pub use_tls: bool,
    #[serde(default)]
    pub tls_root_certs: Option<PathBuf>,
    #[serde(default)]
    pub client_cert_chain: Option<PathBuf>,
    #[serde(default)]
    pub client_private_key: Option<PathBuf>,
}

fn default_host() -> String {
    "localhost".to_string()
}
fn default_port() -> u16 {
    10000
}
fn default_auth_type() -> String {
    "anonymous".to_string()
}
fn default_session_type() -> SessionLanguage {
    SessionLanguage::Python
}

impl CommunitySessionConfig {
    pub fn auth_credential(&self) -> CredentialRef {
        CredentialRef {
            inline: self.auth_token.clone(),
            env_var: self.auth_token_env_var.clone(),
        }
    }

    /// Validate this session's config, returning human-readable issues.
    /// Structural only — does not touch the filesystem or env vars.
    pub fn validate(&self, key: &str) -> Vec<super::ConfigIssue> {
        use super::{ConfigIssue, ConfigSeverity};
        let mut issues = Vec::new();

        if let Err(msg) = self.auth_credential().validate(&format!(
            "community.sessions.{key}.auth_token"
        )) {
            issues.push(ConfigIssue::error(msg));
        }

        for (field, path) in [
            (&self.tls_root_certs, "tls_root_certs"),
            (&self.client_cert_chain, "client_cert_chain"),
            (&self.client_private_key, "client_private_key"),
        ] {
            if let Some(p) = field {
                if !p.is_absolute() {
                    issues.push(ConfigIssue::error(format!(
                        "community.sessions.{key}.{path}: must be an absolute path, got {}",
                        p.display()
                    )));
                }
            }
        }

        if self.never_timeout {
            issues.push(ConfigIssue::new(
                ConfigSeverity::Warning,
                format!(
                    "community.sessions.{key}.never_timeout: advisory only; honored \
                     only if the underlying engine client exposes a keep-alive knob"
                ),
            ));
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_relative_tls_path() {
        let cfg = CommunitySessionConfig {
            host: default_host(),
            port: default_port(),
            auth_type: default_auth_type(),
            auth_token: None,
            auth_token_env_var: None,
            session_type: SessionLanguage::Python,
            never_timeout: false,
            use_tls: true,
            tls_root_certs: Some(PathBuf::from("relative/certs.pem")),
            client_cert_chain: None,
            client_private_key: None,
        };
        let issues = cfg.validate("s1");
        assert!(issues
            .iter()
            .any(|i| i.message.contains("tls_root_certs")));
    }

    #[test]
    fn both_token_and_env_var_is_an_error() {
        let cfg = CommunitySessionConfig {
            host: default_host(),
            port: default_port(),
            auth_type: default_auth_type(),
            auth_token: Some("tok".into()),
            auth_token_env_var: Some("TOKEN".into()),
            session_type: SessionLanguage::Python,
            never_timeout: false,
            use_tls: false,
            tls_root_certs: None,
            client_cert_chain: None,
            client_private_key: None,
        };
        let issues = cfg.validate("s1");
        assert!(issues
            .iter()
            .any(|i| i.severity == super::super::ConfigSeverity::Error));
    }
}
