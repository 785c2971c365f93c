//! Caller identity report

use std::io::Write;

use crate::aws::{CallerIdentity, IdentityApi};
use crate::console::Console;
use crate::error::Result;

/// Look up who the session is authenticated as and print it
pub async fn report_identity<W: Write>(
    api: &dyn IdentityApi,
    console: &mut Console<W>,
) -> Result<CallerIdentity> {
    console.heading("Here is STS Info on the Profile!")?;

    let identity = api.caller_identity().await?;
    tracing::info!(account = %identity.account, arn = %identity.arn, "Resolved caller identity");

    console.line(format!("UserId: {}", identity.user_id))?;
    console.line(format!("Account: {}", identity.account))?;
    console.line(format!("ARN: {}", identity.arn))?;

    Ok(identity)
}
