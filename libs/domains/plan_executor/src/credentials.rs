//! Credential brokering for the subprocess stages. Grounded on
//! `terraform-executor/app/security/credentials.py`'s `CredentialResolver`:
//! parse `assume-role:<name>`, exchange for a short-lived session capped at
//! 15 minutes, hand back environment variables — never raw long-lived
//! credentials, never over the wire, never logged.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;

use crate::error::{ExecutorError, ExecutorResult};

const MAX_SESSION_SECONDS: u64 = 900;

/// Environment variables to inject into the subprocess. `Debug` is
/// hand-written to redact values; this type does not implement `Serialize`
/// so it can never be placed in a response body by accident.
#[derive(Default, Clone)]
pub struct SubprocessEnv(BTreeMap<String, String>);

impl SubprocessEnv {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Debug for SubprocessEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&str> = self.0.keys().map(|k| k.as_str()).collect();
        f.debug_struct("SubprocessEnv")
            .field("keys", &keys)
            .field("values", &"<redacted>")
            .finish()
    }
}

/// A short-lived credential session, expiring no later than
/// [`MAX_SESSION_SECONDS`] after it was issued.
pub struct CredentialSession {
    pub env: SubprocessEnv,
    pub ttl_seconds: u64,
}

/// Exchanges a `credential_reference` for a subprocess environment.
/// Implementations talk to whatever STS-equivalent backs a given cloud;
/// the broker seam keeps `executor.rs` ignorant of that detail.
#[async_trait]
pub trait CredentialBroker: Send + Sync {
    async fn resolve(&self, credential_reference: Option<&str>) -> ExecutorResult<CredentialSession>;
}

/// Parses a `credential_reference` of the form `assume-role:<name>`,
/// returning the role name. `None`/empty means "use ambient credentials",
/// which resolves to an empty environment rather than an error.
pub fn parse_role_reference(credential_reference: Option<&str>) -> ExecutorResult<Option<&str>> {
    let Some(reference) = credential_reference else {
        return Ok(None);
    };
    if reference.is_empty() {
        return Ok(None);
    }
    match reference.split_once(':') {
        Some(("assume-role", role)) if !role.is_empty() => Ok(Some(role)),
        _ => Err(ExecutorError::SecurityViolation(format!(
            "unsupported credential reference: {reference}"
        ))),
    }
}

/// Broker backed by an injected role-assumption callback. Production wiring
/// supplies a closure that calls the cloud's STS-equivalent; tests supply a
/// fixed session.
pub struct AssumeRoleBroker<F> {
    assume: F,
}

impl<F> AssumeRoleBroker<F>
where
    F: Fn(&str, u64) -> ExecutorResult<SubprocessEnv> + Send + Sync,
{
    pub fn new(assume: F) -> Self {
        Self { assume }
    }
}

#[async_trait]
impl<F> CredentialBroker for AssumeRoleBroker<F>
where
    F: Fn(&str, u64) -> ExecutorResult<SubprocessEnv> + Send + Sync,
{
    async fn resolve(&self, credential_reference: Option<&str>) -> ExecutorResult<CredentialSession> {
        match parse_role_reference(credential_reference)? {
            None => Ok(CredentialSession {
                env: SubprocessEnv::empty(),
                ttl_seconds: 0,
            }),
            Some(role) => {
                let env = (self.assume)(role, MAX_SESSION_SECONDS)?;
                Ok(CredentialSession {
                    env,
                    ttl_seconds: MAX_SESSION_SECONDS,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_reference_resolves_to_none() {
        assert_eq!(parse_role_reference(None).unwrap(), None);
        assert_eq!(parse_role_reference(Some("")).unwrap(), None);
    }

    #[test]
    fn parses_assume_role_reference() {
        assert_eq!(
            parse_role_reference(Some("assume-role:terraform-readonly")).unwrap(),
            Some("terraform-readonly")
        );
    }

    #[test]
    fn rejects_unknown_reference_kind() {
        assert!(parse_role_reference(Some("raw-key:AKIA...")).is_err());
    }

    #[tokio::test]
    async fn ambient_credentials_used_when_no_reference() {
        let broker = AssumeRoleBroker::new(|_role, _ttl| Ok(SubprocessEnv::empty()));
        let session = broker.resolve(None).await.unwrap();
        assert_eq!(session.ttl_seconds, 0);
        assert_eq!(session.env.iter().count(), 0);
    }

    #[tokio::test]
    async fn assume_role_session_is_capped_at_fifteen_minutes() {
        let broker = AssumeRoleBroker::new(|role, ttl| {
            assert_eq!(role, "terraform-readonly");
            assert_eq!(ttl, 900);
            let mut env = SubprocessEnv::empty();
            env.insert("AWS_SESSION_TOKEN", "short-lived");
            Ok(env)
        });
        let session = broker
            .resolve(Some("assume-role:terraform-readonly"))
            .await
            .unwrap();
        assert_eq!(session.ttl_seconds, 900);
    }

    #[test]
    fn debug_redacts_values() {
        let mut env = SubprocessEnv::empty();
        env.insert("AWS_SECRET_ACCESS_KEY", "super-secret");
        let rendered = format!("{env:?}");
        assert!(!rendered.contains("super-secret"));
    }
}
