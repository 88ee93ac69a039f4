//! Auth Adapters (C2): turn a configured credential description into what
//! the target engine client expects. Failures are always `AuthResolution`
//! and never echo the credential material itself.

use dh_domain::config::CredentialRef;
use dh_domain::CoreError;

/// A resolved-or-resolvable credential reference, deferred to acquisition
/// time per the "resolve at acquisition, not at parse" invariant (§3).
#[derive(Debug, Clone)]
pub enum CredentialSource {
    Inline(String),
    EnvVar(String),
}

impl CredentialSource {
    pub fn from_ref(cred: &CredentialRef) -> Option<Self> {
        match (&cred.inline, &cred.env_var) {
            (Some(v), _) => Some(CredentialSource::Inline(v.clone())),
            (None, Some(name)) => Some(CredentialSource::EnvVar(name.clone())),
            (None, None) => None,
        }
    }

    pub fn resolve(&self) -> Result<String, CoreError> {
        match self {
            CredentialSource::Inline(v) => Ok(v.clone()),
            CredentialSource::EnvVar(name) => std::env::var(name)
                .map_err(|_| CoreError::auth_resolution(format!("environment variable {name} is not set"))),
        }
    }
}

/// Resolved auth material for a community session client (§4.2).
#[derive(Debug, Clone)]
pub enum CommunityAuth {
    Anonymous,
    Basic { token: String },
    PreSharedKey { token: String },
}

pub fn resolve_community_auth(
    auth_type: &str,
    credential: Option<CredentialSource>,
) -> Result<CommunityAuth, CoreError> {
    match auth_type {
        "anonymous" => Ok(CommunityAuth::Anonymous),
        "basic" => {
            let cred = credential
                .ok_or_else(|| CoreError::auth_resolution("basic auth requires a credential"))?;
            Ok(CommunityAuth::Basic { token: cred.resolve()? })
        }
        "pre_shared_key" => {
            let cred = credential
                .ok_or_else(|| CoreError::auth_resolution("pre_shared_key auth requires a credential"))?;
            Ok(CommunityAuth::PreSharedKey { token: cred.resolve()? })
        }
        other => Err(CoreError::unsupported(format!(
            "auth_type {other:?} is not one of the enumerated community auth methods"
        ))),
    }
}

/// Resolved auth material for an enterprise system's auth client (§4.2).
#[derive(Debug, Clone)]
pub enum EnterpriseAuth {
    Password { username: String, password: String },
    PrivateKey { pem: Vec<u8> },
}

pub async fn resolve_enterprise_auth(
    auth_type: dh_domain::config::EnterpriseAuthType,
    username: Option<&str>,
    password: Option<CredentialSource>,
    private_key_path: Option<&std::path::Path>,
) -> Result<EnterpriseAuth, CoreError> {
    use dh_domain::config::EnterpriseAuthType;
    match auth_type {
        EnterpriseAuthType::Password => {
            let username = username
                .ok_or_else(|| CoreError::auth_resolution("password auth requires a username"))?
                .to_string();
            let password = password
                .ok_or_else(|| CoreError::auth_resolution("password auth requires a credential"))?
                .resolve()?;
            Ok(EnterpriseAuth::Password { username, password })
        }
        EnterpriseAuthType::PrivateKey => {
            let path = private_key_path.ok_or_else(|| {
                CoreError::auth_resolution("private_key auth requires private_key_path")
            })?;
            let pem = tokio::fs::read(path).await.map_err(|e| {
                CoreError::auth_resolution(format!("failed to read private key file: {e}"))
            })?;
            Ok(EnterpriseAuth::PrivateKey { pem })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_needs_no_credential() {
        assert!(matches!(
            resolve_community_auth("anonymous", None).unwrap(),
            CommunityAuth::Anonymous
        ));
    }

    #[test]
    fn basic_without_credential_fails_auth_resolution() {
        let err = resolve_community_auth("basic", None).unwrap_err();
        assert_eq!(err.kind, dh_domain::ErrorKind::AuthResolution);
    }

    #[test]
    fn unknown_auth_type_is_unsupported() {
        let err = resolve_community_auth("ldap", None).unwrap_err();
        assert_eq!(err.kind, dh_domain::ErrorKind::Unsupported);
    }

    #[test]
    fn missing_env_var_fails_auth_resolution_without_leaking_name_as_value() {
        let src = CredentialSource::EnvVar("DH_TEST_DOES_NOT_EXIST_XYZ".into());
        let err = src.resolve().unwrap_err();
        assert_eq!(err.kind, dh_domain::ErrorKind::AuthResolution);
        assert!(err.message.contains("DH_TEST_DOES_NOT_EXIST_XYZ"));
    }

    #[tokio::test]
    async fn private_key_auth_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key.pem");
        tokio::fs::write(&path, b"-----BEGIN KEY-----").await.unwrap();
        let auth = resolve_enterprise_auth(
            dh_domain::config::EnterpriseAuthType::PrivateKey,
            None,
            None,
            Some(&path),
        )
        .await
        .unwrap();
        assert!(matches!(auth, EnterpriseAuth::PrivateKey { pem } if pem.starts_with(b"-----BEGIN")));
    }

    #[tokio::test]
    async fn private_key_auth_missing_file_fails() {
        let err = resolve_enterprise_auth(
            dh_domain::config::EnterpriseAuthType::PrivateKey,
            None,
            None,
            Some(std::path::Path::new("/nonexistent/key.pem")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind, dh_domain::ErrorKind::AuthResolution);
    }
}
