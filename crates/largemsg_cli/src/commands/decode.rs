//! Decode command implementation.

use super::{read_input, write_output};
use largemsg_core::StoreFactory;
use std::path::Path;
use std::sync::Arc;

/// Runs the decode command.
pub fn run(
    factory: &Arc<StoreFactory>,
    input: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let wire = read_input(input)?;
    let payload = factory
        .decoder()
        .decode(Some(&wire))?
        .ok_or("Decoder returned no output for a present envelope")?;
    write_output(output, &payload)?;
    Ok(())
}
