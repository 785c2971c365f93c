//! Secrets Manager enumeration
//!
//! Prints the metadata of every listed secret, then tries to read each
//! secret's current value. A failed read is reported for that secret and the
//! loop moves on.

use std::io::Write;

use crate::aws::{SecretDescriptor, SecretValue, SecretsApi};
use crate::console::{Console, Marker, ITEM_RULE};
use crate::error::Result;

/// Result of reading one secret's value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretOutcome {
    Retrieved,
    /// The secret has no string value (binary-only or empty)
    NoString,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct SecretResult {
    pub name: String,
    pub outcome: SecretOutcome,
}

/// What the secrets phase did, in listing order
#[derive(Debug, Clone, Default)]
pub struct SecretsReport {
    pub secrets: Vec<SecretDescriptor>,
    pub results: Vec<SecretResult>,
}

impl SecretsReport {
    pub fn retrieved(&self) -> usize {
        self.count(|o| matches!(o, SecretOutcome::Retrieved))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, SecretOutcome::Failed(_)))
    }

    fn count(&self, f: impl Fn(&SecretOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| f(&r.outcome)).count()
    }
}

/// List every secret visible to the session, one page at a time
pub async fn list_all_secrets(api: &dyn SecretsApi) -> Result<Vec<SecretDescriptor>> {
    let mut secrets = Vec::new();
    let mut token = None;

    loop {
        let page = api.list_secrets_page(token.take()).await?;
        tracing::debug!("Listed {} secret(s)", page.items.len());
        secrets.extend(page.items);

        match page.next_token {
            Some(next) => token = Some(next),
            None => break,
        }
    }

    Ok(secrets)
}

pub async fn enumerate_secrets<W: Write>(
    api: &dyn SecretsApi,
    console: &mut Console<W>,
) -> Result<SecretsReport> {
    console.heading("Secrets Manager Enumeration")?;

    let secrets = list_all_secrets(api).await?;
    tracing::info!("Found {} secret(s)", secrets.len());

    for secret in &secrets {
        console.marked(Marker::Detail, format!("Name: {}", secret.name))?;
        console.marked(Marker::Detail, format!("ARN: {}", secret.arn))?;
        console.marked(
            Marker::Detail,
            format!(
                "Description: {}",
                secret.description.as_deref().unwrap_or("(none)")
            ),
        )?;
        console.rule(ITEM_RULE)?;
    }

    let mut results = Vec::with_capacity(secrets.len());
    for secret in &secrets {
        let outcome = match api.secret_value(&secret.name).await {
            Ok(value) => match value.as_text() {
                Some(text) => {
                    let name = console.bold(&secret.name);
                    console.marked(Marker::Success, format!("Secret found for: {}", name))?;
                    console.line(format!("SecretString: {}", text))?;
                    SecretOutcome::Retrieved
                }
                None => {
                    let detail = match &value {
                        SecretValue::Binary(len) => format!(" (SecretBinary, {} bytes)", len),
                        _ => String::new(),
                    };
                    console.marked(
                        Marker::Notice,
                        format!("No SecretString found for: {}{}", secret.name, detail),
                    )?;
                    SecretOutcome::NoString
                }
            },
            Err(e) => {
                tracing::debug!("Could not retrieve secret '{}': {}", secret.name, e);
                console.marked(
                    Marker::Failure,
                    format!("Could not retrieve secret '{}': {}", secret.name, e),
                )?;
                SecretOutcome::Failed(e.to_string())
            }
        };
        console.rule(ITEM_RULE)?;

        results.push(SecretResult {
            name: secret.name.clone(),
            outcome,
        });
    }

    Ok(SecretsReport { secrets, results })
}
