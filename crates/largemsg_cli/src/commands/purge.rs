//! Purge command implementation.

use largemsg_core::naming::topic_prefix;
use largemsg_core::{RecordRole, StoreFactory};
use std::sync::Arc;

/// What to delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Every key starting with a raw prefix.
    Prefix(String),
    /// Every key written for a topic, optionally one role only.
    Topic {
        /// Topic name.
        topic: String,
        /// Restrict to keys or values.
        role: Option<RecordRole>,
    },
}

/// Parses a `--role` argument.
pub fn parse_role(role: &str) -> Result<RecordRole, String> {
    RecordRole::from_segment(role)
        .ok_or_else(|| format!("Unknown role {role:?} (expected keys or values)"))
}

/// Runs the purge command.
pub fn run(
    factory: &Arc<StoreFactory>,
    target: &Target,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let base = factory
        .config()
        .base_path
        .as_ref()
        .ok_or("Base path required for purge")?;
    let prefix = match target {
        Target::Prefix(prefix) => prefix.clone(),
        Target::Topic { topic, role } => topic_prefix(Some(base), topic, *role)?,
    };

    println!("Purging {}://{}/{}*", base.scheme(), base.bucket(), prefix);
    if dry_run {
        println!("(dry run - no changes will be made)");
        return Ok(());
    }

    factory.purge_prefix(&prefix)?;
    println!("✓ Purge complete");
    Ok(())
}
