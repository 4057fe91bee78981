//! Object addresses of the form `scheme://bucket/path`.

use crate::error::{CodecError, CodecResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const SCHEME_SEPARATOR: &str = "://";

/// A parsed object address.
///
/// The scheme selects a backing store, the bucket names a container within
/// it and the path is the object key. Scheme and bucket are case-folded at
/// construction, and the path never starts with `/`, so parsing the
/// formatted form of a location yields the same location again.
///
/// # Example
///
/// ```
/// use largemsg_codec::Location;
///
/// let loc: Location = "S3://My-Bucket/orders/values/1".parse().unwrap();
/// assert_eq!(loc.scheme(), "s3");
/// assert_eq!(loc.bucket(), "my-bucket");
/// assert_eq!(loc.path(), "orders/values/1");
/// assert_eq!(loc.to_string(), "s3://my-bucket/orders/values/1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Location {
    scheme: String,
    bucket: String,
    path: String,
}

impl Location {
    /// Builds a location from its parts, applying the same normalization as
    /// [`Location::parse`].
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::MalformedUri`] if the scheme or bucket is
    /// invalid.
    pub fn new(scheme: &str, bucket: &str, path: &str) -> CodecResult<Self> {
        let display = format!("{scheme}{SCHEME_SEPARATOR}{bucket}/{path}");
        validate_scheme(scheme, &display)?;
        validate_bucket(bucket, &display)?;
        Ok(Self {
            scheme: scheme.to_ascii_lowercase(),
            bucket: bucket.to_ascii_lowercase(),
            path: path.trim_start_matches('/').to_string(),
        })
    }

    /// Parses an address string.
    ///
    /// Everything after the bucket is treated as the object path; query and
    /// fragment delimiters carry no special meaning. An empty path is valid.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::MalformedUri`] if the input has no `://`
    /// separator, an empty or invalid scheme, or an empty bucket.
    pub fn parse(uri: &str) -> CodecResult<Self> {
        let (scheme, rest) = uri
            .split_once(SCHEME_SEPARATOR)
            .ok_or_else(|| CodecError::malformed_uri(uri, "missing \"://\" separator"))?;
        let (bucket, path) = match rest.split_once('/') {
            Some((bucket, path)) => (bucket, path),
            None => (rest, ""),
        };
        validate_scheme(scheme, uri)?;
        validate_bucket(bucket, uri)?;

        Ok(Self {
            scheme: scheme.to_ascii_lowercase(),
            bucket: bucket.to_ascii_lowercase(),
            path: path.trim_start_matches('/').to_string(),
        })
    }

    /// The lowercased scheme, e.g. `s3`.
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// The lowercased bucket or container name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// The object path, without a leading `/`. May be empty.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns a location in the same bucket with a different path.
    #[must_use]
    pub fn with_path(&self, path: &str) -> Self {
        Self {
            scheme: self.scheme.clone(),
            bucket: self.bucket.clone(),
            path: path.trim_start_matches('/').to_string(),
        }
    }
}

fn validate_scheme(scheme: &str, uri: &str) -> CodecResult<()> {
    let mut chars = scheme.chars();
    match chars.next() {
        None => return Err(CodecError::malformed_uri(uri, "empty scheme")),
        Some(c) if !c.is_ascii_alphabetic() => {
            return Err(CodecError::malformed_uri(
                uri,
                "scheme must start with a letter",
            ))
        }
        Some(_) => {}
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        Ok(())
    } else {
        Err(CodecError::malformed_uri(
            uri,
            "scheme contains invalid characters",
        ))
    }
}

fn validate_bucket(bucket: &str, uri: &str) -> CodecResult<()> {
    if bucket.is_empty() {
        return Err(CodecError::malformed_uri(uri, "empty bucket"));
    }
    if bucket.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(CodecError::malformed_uri(
            uri,
            "bucket contains whitespace or control characters",
        ));
    }
    Ok(())
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}{SCHEME_SEPARATOR}{}", self.scheme, self.bucket)
        } else {
            write!(
                f,
                "{}{SCHEME_SEPARATOR}{}/{}",
                self.scheme, self.bucket, self.path
            )
        }
    }
}

impl FromStr for Location {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Location {
    type Error = CodecError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Location> for String {
    fn from(value: Location) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_bucket_only() {
        let loc = Location::parse("s3://bucket").unwrap();
        assert_eq!(loc.scheme(), "s3");
        assert_eq!(loc.bucket(), "bucket");
        assert_eq!(loc.path(), "");
        assert_eq!(loc.to_string(), "s3://bucket");
    }

    #[test]
    fn parse_bucket_with_trailing_slash() {
        let loc = Location::parse("s3://bucket/").unwrap();
        assert_eq!(loc.path(), "");
    }

    #[test]
    fn parse_nested_path() {
        let loc = Location::parse("abs://container/base/orders/keys/abc").unwrap();
        assert_eq!(loc.scheme(), "abs");
        assert_eq!(loc.bucket(), "container");
        assert_eq!(loc.path(), "base/orders/keys/abc");
    }

    #[test]
    fn scheme_and_bucket_are_lowercased_path_is_not() {
        let loc = Location::parse("S3://MyBucket/Orders/Values/X").unwrap();
        assert_eq!(loc.scheme(), "s3");
        assert_eq!(loc.bucket(), "mybucket");
        assert_eq!(loc.path(), "Orders/Values/X");
    }

    #[test]
    fn leading_slashes_are_stripped_from_path() {
        let loc = Location::parse("s3://bucket//double/slash").unwrap();
        assert_eq!(loc.path(), "double/slash");
    }

    #[test]
    fn query_characters_stay_in_path() {
        let loc = Location::parse("s3://bucket/a?b#c").unwrap();
        assert_eq!(loc.path(), "a?b#c");
    }

    #[test]
    fn missing_separator_is_malformed() {
        assert!(matches!(
            Location::parse("bucket/path"),
            Err(CodecError::MalformedUri { .. })
        ));
        assert!(matches!(
            Location::parse("s3:bucket"),
            Err(CodecError::MalformedUri { .. })
        ));
    }

    #[test]
    fn empty_scheme_is_malformed() {
        assert!(matches!(
            Location::parse("://bucket/x"),
            Err(CodecError::MalformedUri { .. })
        ));
    }

    #[test]
    fn invalid_scheme_is_malformed() {
        assert!(Location::parse("3s://bucket").is_err());
        assert!(Location::parse("s 3://bucket").is_err());
        assert!(Location::parse("s3_x://bucket").is_err());
    }

    #[test]
    fn empty_bucket_is_malformed() {
        assert!(matches!(
            Location::parse("s3:///path"),
            Err(CodecError::MalformedUri { .. })
        ));
    }

    #[test]
    fn new_normalizes_like_parse() {
        let built = Location::new("S3", "Bucket", "/a/b").unwrap();
        let parsed = Location::parse("s3://bucket/a/b").unwrap();
        assert_eq!(built, parsed);
    }

    #[test]
    fn with_path_keeps_scheme_and_bucket() {
        let base = Location::parse("s3://bucket/root").unwrap();
        let obj = base.with_path("/root/topic/values/1");
        assert_eq!(obj.to_string(), "s3://bucket/root/topic/values/1");
    }

    #[test]
    fn serde_uses_string_form() {
        let loc = Location::parse("s3://bucket/a/b").unwrap();
        let json = serde_json::to_string(&loc).unwrap();
        assert_eq!(json, "\"s3://bucket/a/b\"");
        let back: Location = serde_json::from_str(&json).unwrap();
        assert_eq!(back, loc);
        assert!(serde_json::from_str::<Location>("\"not a uri\"").is_err());
    }

    proptest! {
        #[test]
        fn parse_is_idempotent(
            scheme in "[a-zA-Z][a-zA-Z0-9+.-]{0,7}",
            bucket in "[a-zA-Z0-9][a-zA-Z0-9.-]{0,20}",
            path in "[a-zA-Z0-9/_.-]{0,40}",
        ) {
            let input = format!("{scheme}://{bucket}/{path}");
            let first = Location::parse(&input).unwrap();
            let second = Location::parse(&first.to_string()).unwrap();
            prop_assert_eq!(&first, &second);
            prop_assert!(!first.path().starts_with('/'));
        }
    }
}
