//! Inspect command implementation.

use super::read_input;
use largemsg_codec::Envelope;
use serde::Serialize;
use std::path::Path;

/// Envelope inspection result.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct InspectResult {
    /// Flag byte.
    pub flag: u8,
    /// Whether the payload lives in a backing store.
    pub backed: bool,
    /// Size of the envelope in bytes, flag included.
    pub envelope_size: usize,
    /// Size of the inline payload in bytes (inline envelopes only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_size: Option<usize>,
    /// Address of the backed payload (backed envelopes only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationInfo>,
}

/// Parsed address of a backed payload.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct LocationInfo {
    /// Full address.
    pub uri: String,
    /// Store scheme.
    pub scheme: String,
    /// Bucket or container.
    pub bucket: String,
    /// Object key.
    pub path: String,
}

/// Runs the inspect command.
pub fn run(input: Option<&Path>, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let wire = read_input(input)?;
    let result = inspect(&wire)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

/// Describes an envelope without touching any backing store.
pub fn inspect(wire: &[u8]) -> Result<InspectResult, largemsg_codec::CodecError> {
    let envelope = Envelope::from_bytes(wire)?;
    let mut result = InspectResult {
        flag: envelope.flag(),
        backed: envelope.is_backed(),
        envelope_size: wire.len(),
        payload_size: None,
        location: None,
    };

    match envelope {
        Envelope::Literal(payload) => result.payload_size = Some(payload.len()),
        Envelope::Reference(location) => {
            result.location = Some(LocationInfo {
                uri: location.to_string(),
                scheme: location.scheme().to_string(),
                bucket: location.bucket().to_string(),
                path: location.path().to_string(),
            });
        }
    }

    Ok(result)
}

fn print_text_output(result: &InspectResult) {
    println!("LargeMsg Envelope");
    println!("=================");
    println!();
    println!(
        "Flag:          {:#04x} ({})",
        result.flag,
        if result.backed { "backed" } else { "inline" }
    );
    println!("Envelope size: {} bytes", result.envelope_size);

    if let Some(size) = result.payload_size {
        println!("Payload size:  {} bytes", size);
    }

    if let Some(location) = &result.location {
        println!();
        println!("Location:");
        println!("  URI:    {}", location.uri);
        println!("  Scheme: {}", location.scheme);
        println!("  Bucket: {}", location.bucket);
        println!("  Path:   {}", location.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_envelope() {
        let result = inspect(b"\x00hello").unwrap();
        assert!(!result.backed);
        assert_eq!(result.envelope_size, 6);
        assert_eq!(result.payload_size, Some(5));
        assert!(result.location.is_none());
    }

    #[test]
    fn backed_envelope() {
        let result = inspect(b"\x01s3://bucket/orders/values/abc").unwrap();
        assert!(result.backed);
        assert_eq!(result.flag, 0x01);
        let location = result.location.unwrap();
        assert_eq!(location.scheme, "s3");
        assert_eq!(location.bucket, "bucket");
        assert_eq!(location.path, "orders/values/abc");
    }

    #[test]
    fn json_omits_absent_fields() {
        let json = serde_json::to_value(inspect(b"\x00x").unwrap()).unwrap();
        assert_eq!(json["backed"], false);
        assert!(json.get("location").is_none());
    }

    #[test]
    fn unknown_flag_is_error() {
        assert!(inspect(b"\x02").is_err());
        assert!(inspect(b"").is_err());
    }
}
