//! Static validation of uploaded IaC files before any subprocess runs.
//! Grounded on `terraform-executor/app/security.py`'s three checks
//! (dangerous provisioners, backend blocks, blocked providers), generalized
//! to an allowlist instead of a blocklist per spec §4.3 ("reject providers
//! outside an allowlist") and adding the external-data-source check spec.md
//! calls for explicitly.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{ExecutorError, ExecutorResult};

static PROVISIONER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"provisioner\s+"(local-exec|remote-exec)""#).expect("valid regex")
});
static EXTERNAL_DATA_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"data\s+"external"\s+"[^"]+"\s*\{"#).expect("valid regex"));
static BACKEND_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"backend\s+"[^"]+"\s*\{"#).expect("valid regex"));
static PROVIDER_BLOCK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"provider\s+"([^"]+)"\s*\{"#).expect("valid regex"));
static PROVIDER_RESOURCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"resource\s+"([a-zA-Z0-9_]+)_"#).expect("valid regex"));

/// Scans every `.tf` file's contents for forbidden constructs. `contents`
/// pairs each file's path (for error messages) with its text.
pub fn validate_files(contents: &[(String, String)], allowed_providers: &[String]) -> ExecutorResult<()> {
    for (path, text) in contents {
        if let Some(m) = PROVISIONER_PATTERN.captures(text) {
            return Err(ExecutorError::SecurityViolation(format!(
                "forbidden provisioner {:?} in {path}",
                &m[1]
            )));
        }
        if EXTERNAL_DATA_PATTERN.is_match(text) {
            return Err(ExecutorError::SecurityViolation(format!(
                "external data source is not allowed in {path}"
            )));
        }
        if BACKEND_PATTERN.is_match(text) {
            return Err(ExecutorError::SecurityViolation(format!(
                "backend block is not allowed in {path}"
            )));
        }

        for m in PROVIDER_BLOCK_PATTERN.captures_iter(text) {
            check_allowed(&m[1], allowed_providers, path)?;
        }
        for m in PROVIDER_RESOURCE_PATTERN.captures_iter(text) {
            check_allowed(&m[1], allowed_providers, path)?;
        }
    }
    Ok(())
}

fn check_allowed(provider: &str, allowed_providers: &[String], path: &str) -> ExecutorResult<()> {
    if allowed_providers.iter().any(|p| p == provider) {
        Ok(())
    } else {
        Err(ExecutorError::SecurityViolation(format!(
            "provider {provider:?} is not in the allowlist (in {path})"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed() -> Vec<String> {
        vec!["aws".to_string()]
    }

    #[test]
    fn rejects_local_exec_provisioner() {
        let files = vec![(
            "main.tf".to_string(),
            r#"resource "aws_instance" "x" { provisioner "local-exec" { command = "echo hi" } }"#
                .to_string(),
        )];
        assert!(validate_files(&files, &allowed()).is_err());
    }

    #[test]
    fn rejects_backend_block() {
        let files = vec![("main.tf".to_string(), r#"terraform { backend "s3" {} }"#.to_string())];
        assert!(validate_files(&files, &allowed()).is_err());
    }

    #[test]
    fn rejects_external_data_source() {
        let files = vec![(
            "main.tf".to_string(),
            r#"data "external" "lookup" { program = ["sh", "x.sh"] }"#.to_string(),
        )];
        assert!(validate_files(&files, &allowed()).is_err());
    }

    #[test]
    fn rejects_provider_outside_allowlist() {
        let files = vec![("main.tf".to_string(), r#"provider "azurerm" {}"#.to_string())];
        assert!(validate_files(&files, &allowed()).is_err());
    }

    #[test]
    fn accepts_allowlisted_provider() {
        let files = vec![(
            "main.tf".to_string(),
            r#"provider "aws" {} resource "aws_instance" "x" {}"#.to_string(),
        )];
        assert!(validate_files(&files, &allowed()).is_ok());
    }
}
