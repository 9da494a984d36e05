//! Org configuration
//!
//! Reads the org URL from the Okta tooling config file and derives the org
//! name used to name backup directories. Only developer orgs
//! (`dev-<digits>.okta.com`, any case) are accepted.
//!
//! When no `orgUrl` is configured, any line naming a developer domain is
//! used instead, e.g. `domain: https://dev-123456.okta.com`. A configured
//! `orgUrl` that is not a developer org is always rejected.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::{EnvsyncError, EnvsyncResult};

const DEV_ORG_PATTERN: &str = r"(?i)(dev-\d+)\.okta\.com";

static DEV_ORG: OnceLock<Option<Regex>> = OnceLock::new();

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    okta: Option<OktaSection>,
}

#[derive(Debug, Default, Deserialize)]
struct OktaSection {
    #[serde(default)]
    client: Option<ClientSection>,
}

#[derive(Debug, Default, Deserialize)]
struct ClientSection {
    #[serde(rename = "orgUrl", default)]
    org_url: Option<String>,
}

/// The org a backup or restore talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgConfig {
    /// Full org URL as configured
    pub org_url: String,
    /// Developer org name, e.g. `dev-123456`
    pub org_name: String,
    /// Config file the URL came from
    pub config_file: PathBuf,
}

impl OrgConfig {
    /// Load and validate the config file at `path`
    pub fn load(path: &Path) -> EnvsyncResult<Self> {
        if !path.exists() {
            return Err(EnvsyncError::Config(format!(
                "Okta config file not found: {}",
                path.display()
            )));
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            EnvsyncError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::parse(&contents, path)
    }

    /// Parse config file contents
    pub fn parse(contents: &str, path: &Path) -> EnvsyncResult<Self> {
        let configured = org_url_from_yaml(contents).or_else(|| org_url_from_lines(contents));
        let (org_url, org_name) = match configured {
            Some(org_url) => {
                let org_name = dev_org_name(&org_url)?.ok_or_else(|| {
                    EnvsyncError::Config(format!(
                        "{} is not a developer org (expected dev-<number>.okta.com)",
                        org_url
                    ))
                })?;
                (org_url, org_name)
            }
            None => dev_org_from_lines(contents)?.ok_or_else(|| {
                EnvsyncError::Config(format!("No orgUrl found in {}", path.display()))
            })?,
        };

        tracing::debug!(%org_url, %org_name, "loaded org config");
        Ok(Self {
            org_url,
            org_name,
            config_file: path.to_path_buf(),
        })
    }
}

fn org_url_from_yaml(contents: &str) -> Option<String> {
    let file: ConfigFile = serde_yaml::from_str(contents).ok()?;
    file.okta?.client?.org_url
}

// Tolerates files that are not valid YAML as a whole
fn org_url_from_lines(contents: &str) -> Option<String> {
    contents
        .lines()
        .find(|line| line.contains("orgUrl"))
        .and_then(|line| line.split_once(':'))
        .map(|(_, value)| value.trim().trim_matches(['"', '\'']).to_string())
        .filter(|value| !value.is_empty())
}

/// The first line naming a developer domain, as (url, org name)
fn dev_org_from_lines(contents: &str) -> EnvsyncResult<Option<(String, String)>> {
    for line in contents.lines() {
        let Some(org_name) = dev_org_name(line)? else {
            continue;
        };
        let org_url = line
            .split_whitespace()
            .find(|token| token.contains(org_name.as_str()))
            .unwrap_or(line.trim())
            .trim_matches(['"', '\''])
            .to_string();
        return Ok(Some((org_url, org_name)));
    }
    Ok(None)
}

/// Extract `dev-<digits>` from an org URL
pub fn dev_org_name(org_url: &str) -> EnvsyncResult<Option<String>> {
    let regex = DEV_ORG
        .get_or_init(|| Regex::new(DEV_ORG_PATTERN).ok())
        .as_ref()
        .ok_or_else(|| EnvsyncError::Config("invalid org name pattern".into()))?;

    Ok(regex
        .captures(org_url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("okta.yaml");
        fs::write(
            &path,
            "okta:\n  client:\n    orgUrl: https://dev-123456.okta.com\n    token: abc\n",
        )
        .unwrap();

        let config = OrgConfig::load(&path).unwrap();
        assert_eq!(config.org_name, "dev-123456");
        assert_eq!(config.org_url, "https://dev-123456.okta.com");
        assert_eq!(config.config_file, path);
    }

    #[test]
    fn test_line_fallback() {
        let contents = "this: [is not\n  orgUrl: \"https://dev-42.okta.com\"\n";
        let config = OrgConfig::parse(contents, Path::new("okta.yaml")).unwrap();
        assert_eq!(config.org_name, "dev-42");
    }

    #[test]
    fn test_uppercase_dev_org_accepted() {
        let contents = "okta:\n  client:\n    orgUrl: https://DEV-123456.okta.com\n";
        let config = OrgConfig::parse(contents, Path::new("okta.yaml")).unwrap();
        assert_eq!(config.org_name, "DEV-123456");
        assert_eq!(config.org_url, "https://DEV-123456.okta.com");
    }

    #[test]
    fn test_dev_domain_on_any_line() {
        let contents = "okta:\n  client:\n    domain: https://dev-123456.okta.com\n";
        let config = OrgConfig::parse(contents, Path::new("okta.yaml")).unwrap();
        assert_eq!(config.org_name, "dev-123456");
        assert_eq!(config.org_url, "https://dev-123456.okta.com");
    }

    #[test]
    fn test_configured_production_org_not_overridden() {
        let contents = concat!(
            "# copied from https://dev-1.okta.com\n",
            "okta:\n  client:\n    orgUrl: https://acme.okta.com\n",
        );
        let err = OrgConfig::parse(contents, Path::new("okta.yaml")).unwrap_err();
        assert!(err.to_string().contains("not a developer org"));
    }

    #[test]
    fn test_no_org_url_or_dev_domain() {
        let contents = "okta:\n  client:\n    token: abc\n";
        let err = OrgConfig::parse(contents, Path::new("okta.yaml")).unwrap_err();
        assert!(err.to_string().contains("No orgUrl found"));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = OrgConfig::load(&temp_dir.path().join("okta.yaml")).unwrap_err();
        assert!(matches!(err, EnvsyncError::Config(_)));
    }

    #[test]
    fn test_production_org_rejected() {
        let contents = "okta:\n  client:\n    orgUrl: https://acme.okta.com\n";
        let err = OrgConfig::parse(contents, Path::new("okta.yaml")).unwrap_err();
        assert!(err.to_string().contains("not a developer org"));
    }

    #[test]
    fn test_dev_org_name() {
        assert_eq!(
            dev_org_name("https://dev-9.okta.com/").unwrap(),
            Some("dev-9".to_string())
        );
        assert_eq!(
            dev_org_name("https://Dev-7.Okta.com").unwrap(),
            Some("Dev-7".to_string())
        );
        assert_eq!(dev_org_name("https://dev-x.okta.com").unwrap(), None);
    }
}
