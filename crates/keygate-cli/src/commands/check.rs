//! `keygate check` command implementation.
//!
//! Inspects a loaded configuration for problems the hard validation in
//! `KeygateConfig` does not reject: a questionable endpoint scheme,
//! partition-key paths without a leading slash, degenerate token lifetimes.

use anyhow::bail;
use keygate_core::KeygateConfig;

/// Severity level for check results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational message.
    Info,
    /// Warning, may indicate a potential issue.
    Warning,
    /// Error, the configuration will not work.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARN"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// A single check finding.
#[derive(Debug, Clone)]
pub struct CheckFinding {
    pub severity: Severity,
    pub category: String,
    pub message: String,
}

impl CheckFinding {
    fn info(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            category: category.into(),
            message: message.into(),
        }
    }

    fn warning(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            category: category.into(),
            message: message.into(),
        }
    }

    fn error(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            category: category.into(),
            message: message.into(),
        }
    }
}

/// Run every check against a loaded configuration.
pub fn check_config(config: &KeygateConfig) -> Vec<CheckFinding> {
    let mut findings = Vec::new();

    if !config.endpoint.starts_with("http://") && !config.endpoint.starts_with("https://") {
        findings.push(CheckFinding::warning(
            "endpoint",
            format!(
                "endpoint '{}' does not look like an http(s) URL",
                config.endpoint
            ),
        ));
    }

    for container in &config.containers {
        if !container.partition_key_path.starts_with('/') {
            findings.push(CheckFinding::error(
                "containers",
                format!(
                    "container '{}' has partition key path '{}' without a leading slash",
                    container.id, container.partition_key_path
                ),
            ));
        }
    }

    if config.token_ttl_secs == 0 {
        findings.push(CheckFinding::error(
            "tokens",
            "token_ttl_secs is 0; issued tokens would expire immediately",
        ));
    } else if config.token_ttl_secs >= 86_400 {
        findings.push(CheckFinding::warning(
            "tokens",
            format!(
                "token_ttl_secs is {}; tokens will live a day or longer",
                config.token_ttl_secs
            ),
        ));
    }

    if config.secondary_key.as_deref() == Some(config.master_key.as_str()) {
        findings.push(CheckFinding::warning(
            "credentials",
            "secondary_key equals master_key; rotation would be a no-op",
        ));
    }

    findings.push(CheckFinding::info(
        "containers",
        format!(
            "{} container(s) configured for database '{}'",
            config.containers.len(),
            config.database
        ),
    ));

    findings
}

pub fn run(config: &KeygateConfig) -> anyhow::Result<()> {
    let findings = check_config(config);

    for finding in &findings {
        println!("{:5} [{}] {}", finding.severity.to_string(), finding.category, finding.message);
    }

    let errors = findings
        .iter()
        .filter(|f| f.severity == Severity::Error)
        .count();
    if errors > 0 {
        bail!("configuration check failed with {errors} error(s)");
    }

    println!("✔ Configuration looks usable.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use keygate_core::ContainerConfig;
    use std::fs;
    use tempfile::tempdir;

    fn valid_config() -> KeygateConfig {
        KeygateConfig {
            endpoint: "https://store.example.net".into(),
            master_key: "master".into(),
            secondary_key: None,
            database: "appdata".into(),
            containers: vec![ContainerConfig {
                id: "msgs".into(),
                partition_key_path: "/uid".into(),
            }],
            token_ttl_secs: 600,
            bind: "0.0.0.0:8080".into(),
        }
    }

    fn errors(findings: &[CheckFinding]) -> usize {
        findings.iter().filter(|f| f.severity == Severity::Error).count()
    }

    #[test]
    fn valid_config_has_no_errors() {
        let findings = check_config(&valid_config());
        assert_eq!(errors(&findings), 0);
    }

    #[test]
    fn partition_path_without_slash_is_an_error() {
        let mut config = valid_config();
        config.containers[0].partition_key_path = "uid".into();
        let findings = check_config(&config);
        assert_eq!(errors(&findings), 1);
        assert!(findings.iter().any(|f| f.message.contains("leading slash")));
    }

    #[test]
    fn zero_ttl_is_an_error_and_long_ttl_a_warning() {
        let mut config = valid_config();
        config.token_ttl_secs = 0;
        assert_eq!(errors(&check_config(&config)), 1);

        config.token_ttl_secs = 172_800;
        let findings = check_config(&config);
        assert_eq!(errors(&findings), 0);
        assert!(findings.iter().any(|f| f.severity == Severity::Warning));
    }

    #[test]
    fn checks_a_config_loaded_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("keygate.yaml");
        fs::write(
            &path,
            r#"
endpoint: https://store.example.net
master_key: master
database: appdata
containers:
  - id: msgs
    partition_key_path: /uid
"#,
        )
        .unwrap();

        let config = KeygateConfig::from_file(&path).unwrap();
        assert_eq!(errors(&check_config(&config)), 0);
    }
}
