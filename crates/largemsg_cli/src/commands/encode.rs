//! Encode command implementation.

use super::{read_input, write_output};
use largemsg_core::StoreFactory;
use std::path::Path;
use std::sync::Arc;

/// Runs the encode command.
pub fn run(
    factory: &Arc<StoreFactory>,
    topic: &str,
    is_key: bool,
    input: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = read_input(input)?;
    let encoded = factory
        .encoder()
        .encode(topic, Some(&data), is_key)?
        .ok_or("Encoder returned no output for a present payload")?;

    tracing::debug!(
        input = data.len(),
        output = encoded.len(),
        backed = encoded.first() == Some(&largemsg_codec::BACKED),
        "encoded payload"
    );
    write_output(output, &encoded)?;
    Ok(())
}
