pub mod compare;
pub mod init;
pub mod list;
pub mod run;
pub mod score;
pub mod validate;

use anyhow::{Context, Result};

use clinscore_core::model::InputPolicy;

/// A `--policy` flag wins over the configured policy.
pub(crate) fn resolve_policy(flag: Option<&str>, configured: InputPolicy) -> Result<InputPolicy> {
    match flag {
        Some(value) => value
            .parse()
            .map_err(anyhow::Error::msg)
            .context("invalid --policy"),
        None => Ok(configured),
    }
}
