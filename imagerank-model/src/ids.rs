use crate::error::ModelError;
use std::{fmt, str::FromStr};

/// Identifier of a tracked image.
///
/// The relational layer owns the identifier domain; this type only carries the
/// textual form that appears in counter keys and ranking members. Integer
/// primary keys convert losslessly through [`From<i64>`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ImageID(String);

impl ImageID {
    /// Wraps an identifier without checking it.
    pub fn new(raw: impl Into<String>) -> Self {
        ImageID(raw.into())
    }

    /// Parses operator input, rejecting empty or padded identifiers.
    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        if raw.trim().is_empty() {
            return Err(ModelError::InvalidIdentifier(
                "image id must not be empty".to_string(),
            ));
        }
        if raw.trim() != raw {
            return Err(ModelError::InvalidIdentifier(format!(
                "image id '{raw}' has surrounding whitespace"
            )));
        }
        Ok(ImageID(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for ImageID {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<i64> for ImageID {
    fn from(id: i64) -> Self {
        ImageID(id.to_string())
    }
}

impl From<u64> for ImageID {
    fn from(id: u64) -> Self {
        ImageID(id.to_string())
    }
}

impl From<&str> for ImageID {
    fn from(id: &str) -> Self {
        ImageID(id.to_string())
    }
}

impl From<String> for ImageID {
    fn from(id: String) -> Self {
        ImageID(id)
    }
}

impl FromStr for ImageID {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ImageID::parse(s)
    }
}

impl fmt::Display for ImageID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strongly typed ID for users of the bookmarking application
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UserID(pub i64);

impl UserID {
    pub fn to_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_ids_render_as_decimal() {
        assert_eq!(ImageID::from(42_i64).as_str(), "42");
        assert_eq!(ImageID::from(7_u64).to_string(), "7");
    }

    #[test]
    fn parse_rejects_blank_and_padded_input() {
        assert!(ImageID::parse("").is_err());
        assert!(ImageID::parse("   ").is_err());
        assert!(ImageID::parse(" img1").is_err());
        assert_eq!(ImageID::parse("img1").unwrap(), ImageID::from("img1"));
    }

    #[test]
    fn from_str_goes_through_parse() {
        let parsed: ImageID = "17".parse().unwrap();
        assert_eq!(parsed, ImageID::from(17_i64));
        assert!("".parse::<ImageID>().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn image_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&ImageID::from("img9")).unwrap();
        assert_eq!(json, "\"img9\"");
    }
}
