//! AWS shared config inspection
//!
//! Reads `~/.aws/config` and `~/.aws/credentials` to tell the operator what
//! kind of profile they picked and whether it is obviously broken. Credential
//! resolution itself is left to the SDK:
//! - Static credentials (aws_access_key_id, aws_secret_access_key)
//! - Assume-role profiles with source_profile or credential_source
//! - SSO profiles (legacy fields or sso_session)
//! - credential_process helpers

use ini::Ini;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Credential mechanism a profile is configured for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    StaticCredentials,
    AssumeRole,
    Sso,
    CredentialProcess,
    /// EC2/ECS/environment credentials via credential_source
    CredentialSource,
    Unknown,
}

impl ProfileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileKind::StaticCredentials => "static credentials",
            ProfileKind::AssumeRole => "assume role",
            ProfileKind::Sso => "SSO",
            ProfileKind::CredentialProcess => "credential process",
            ProfileKind::CredentialSource => "credential source",
            ProfileKind::Unknown => "unknown",
        }
    }
}

/// Settings of one profile merged from both files
#[derive(Debug, Clone, Default)]
pub struct ProfileEntry {
    pub name: String,
    pub region: Option<String>,
    pub role_arn: Option<String>,
    pub source_profile: Option<String>,
    pub credential_source: Option<String>,
    pub credential_process: Option<String>,
    pub sso_session: Option<String>,
    pub sso_start_url: Option<String>,
    pub sso_region: Option<String>,
    pub sso_account_id: Option<String>,
    pub sso_role_name: Option<String>,
    pub has_static_credentials: bool,
}

impl ProfileEntry {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn kind(&self) -> ProfileKind {
        if self.sso_session.is_some()
            || self.sso_start_url.is_some()
            || (self.sso_account_id.is_some() && self.sso_role_name.is_some())
        {
            ProfileKind::Sso
        } else if self.role_arn.is_some() {
            ProfileKind::AssumeRole
        } else if self.has_static_credentials {
            ProfileKind::StaticCredentials
        } else if self.credential_process.is_some() {
            ProfileKind::CredentialProcess
        } else if self.credential_source.is_some() {
            ProfileKind::CredentialSource
        } else {
            ProfileKind::Unknown
        }
    }

    /// Whether this profile can act as the end of a source_profile chain
    fn provides_credentials(&self) -> bool {
        self.has_static_credentials
            || self.credential_process.is_some()
            || self.credential_source.is_some()
            || self.kind() == ProfileKind::Sso
    }
}

/// Outcome of checking a profile name against the shared files
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileStatus {
    Missing,
    Ok { kind: ProfileKind },
    Invalid { kind: ProfileKind, reason: String },
}

/// Profiles found in the shared config and credentials files
#[derive(Debug, Default)]
pub struct ProfileCatalog {
    profiles: BTreeMap<String, ProfileEntry>,
}

impl ProfileCatalog {
    /// Load from `~/.aws/config` and `~/.aws/credentials`
    pub fn load() -> Result<Self, ini::Error> {
        let Some(aws_dir) = aws_config_dir() else {
            return Ok(Self::default());
        };
        Self::from_files(&aws_dir.join("config"), &aws_dir.join("credentials"))
    }

    /// Load from explicit paths; files that do not exist are ignored
    pub fn from_files(config_path: &Path, credentials_path: &Path) -> Result<Self, ini::Error> {
        let config = read_if_exists(config_path)?;
        let credentials = read_if_exists(credentials_path)?;
        Ok(Self::from_ini(&config, &credentials))
    }

    pub fn from_ini(config: &Ini, credentials: &Ini) -> Self {
        let mut catalog = Self::default();

        for (section, props) in credentials.iter() {
            let Some(name) = section.map(str::trim) else {
                continue;
            };
            let entry = catalog
                .profiles
                .entry(name.to_string())
                .or_insert_with(|| ProfileEntry::named(name));
            entry.has_static_credentials = props.contains_key("aws_access_key_id")
                && props.contains_key("aws_secret_access_key");
        }

        for (section, props) in config.iter() {
            let name = match section.map(str::trim) {
                Some("default") => "default",
                Some(s) => match s.strip_prefix("profile ") {
                    Some(name) => name.trim(),
                    // sso-session and services sections are not profiles
                    None => continue,
                },
                None => continue,
            };

            let entry = catalog
                .profiles
                .entry(name.to_string())
                .or_insert_with(|| ProfileEntry::named(name));

            let get = |key: &str| props.get(key).map(|v| v.trim().to_string());
            entry.region = get("region").or(entry.region.take());
            entry.role_arn = get("role_arn");
            entry.source_profile = get("source_profile");
            entry.credential_source = get("credential_source");
            entry.credential_process = get("credential_process");
            entry.sso_session = get("sso_session");
            entry.sso_start_url = get("sso_start_url");
            entry.sso_region = get("sso_region");
            entry.sso_account_id = get("sso_account_id");
            entry.sso_role_name = get("sso_role_name");
            if props.contains_key("aws_access_key_id") && props.contains_key("aws_secret_access_key")
            {
                entry.has_static_credentials = true;
            }
        }

        catalog
    }

    /// Profile names, sorted, with "default" first
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        if let Some(pos) = names.iter().position(|n| *n == "default") {
            let default = names.remove(pos);
            names.insert(0, default);
        }
        names
    }

    pub fn get(&self, name: &str) -> Option<&ProfileEntry> {
        self.profiles.get(name)
    }

    pub fn status(&self, name: &str) -> ProfileStatus {
        let Some(entry) = self.profiles.get(name) else {
            return ProfileStatus::Missing;
        };

        let kind = entry.kind();
        let problem = match kind {
            ProfileKind::Sso => sso_problem(entry),
            ProfileKind::AssumeRole => self.assume_role_problem(entry),
            _ => None,
        };

        match problem {
            Some(reason) => ProfileStatus::Invalid { kind, reason },
            None => ProfileStatus::Ok { kind },
        }
    }

    fn assume_role_problem(&self, entry: &ProfileEntry) -> Option<String> {
        match (&entry.source_profile, &entry.credential_source) {
            (Some(source), _) => self.walk_source_chain(&entry.name, source).err(),
            (None, Some(_)) => None,
            (None, None) => Some("role_arn set without source_profile or credential_source".into()),
        }
    }

    /// Follow source_profile links until a profile that provides credentials
    fn walk_source_chain(&self, start: &str, source: &str) -> Result<(), String> {
        let mut chain = vec![start.to_string()];
        let mut current = source.to_string();

        loop {
            let Some(profile) = self.profiles.get(&current) else {
                return Err(format!("source profile '{}' not found", current));
            };

            // A profile may name itself as source when it also holds static keys
            if profile.provides_credentials() {
                return Ok(());
            }

            if chain.contains(&current) {
                return Err(format!(
                    "circular source_profile chain: {} -> {}",
                    chain.join(" -> "),
                    current
                ));
            }

            match &profile.source_profile {
                Some(next) => {
                    chain.push(current);
                    current = next.clone();
                }
                // default may be backed by environment variables
                None if current == "default" => return Ok(()),
                None => {
                    return Err(format!(
                        "source profile '{}' has no credentials",
                        current
                    ))
                }
            }
        }
    }
}

fn sso_problem(entry: &ProfileEntry) -> Option<String> {
    let mut missing = Vec::new();
    if entry.sso_session.is_none() {
        if entry.sso_start_url.is_none() {
            missing.push("sso_start_url");
        }
        if entry.sso_region.is_none() {
            missing.push("sso_region");
        }
    }
    if entry.sso_account_id.is_none() {
        missing.push("sso_account_id");
    }
    if entry.sso_role_name.is_none() {
        missing.push("sso_role_name");
    }

    if missing.is_empty() {
        None
    } else {
        Some(format!("SSO profile missing: {}", missing.join(", ")))
    }
}

fn aws_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".aws"))
}

fn read_if_exists(path: &Path) -> Result<Ini, ini::Error> {
    if path.exists() {
        Ini::load_from_file_noescape(path)
    } else {
        Ok(Ini::new())
    }
}
