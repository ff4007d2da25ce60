//! Tenant slug type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// A validated tenant slug.
///
/// Slugs identify one tenant's data partition and travel in the
/// `X-Tenant-ID` header and login payloads. The backend accepts lowercase
/// letters, digits, and hyphens, 2 to 100 characters, starting and ending
/// with an alphanumeric character.
///
/// # Example
///
/// ```
/// use wms_core::TenantSlug;
///
/// let slug = TenantSlug::new("acme-east").unwrap();
/// assert_eq!(slug.as_str(), "acme-east");
/// assert!(TenantSlug::new("-acme").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TenantSlug(String);

impl TenantSlug {
    /// Create a new tenant slug from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the slug does not meet the backend's format rules.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        Self::validate(s)?;
        Ok(Self(s.to_string()))
    }

    /// Returns the slug as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(s: &str) -> Result<(), Error> {
        let invalid = |reason: &str| {
            Error::from(InvalidInputError::TenantSlug {
                value: s.to_string(),
                reason: reason.to_string(),
            })
        };

        if s.len() < 2 || s.len() > 100 {
            return Err(invalid("must be between 2 and 100 characters"));
        }

        let is_alnum = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();

        if !s.chars().all(|c| is_alnum(c) || c == '-') {
            return Err(invalid(
                "must contain only lowercase letters, digits, and hyphens",
            ));
        }

        let first = s.chars().next().unwrap_or('-');
        let last = s.chars().next_back().unwrap_or('-');
        if !is_alnum(first) || !is_alnum(last) {
            return Err(invalid("must start and end with a letter or digit"));
        }

        Ok(())
    }
}

impl fmt::Display for TenantSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TenantSlug {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for TenantSlug {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TenantSlug {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        TenantSlug::new(&s).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for TenantSlug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_slugs() {
        assert!(TenantSlug::new("acme").is_ok());
        assert!(TenantSlug::new("acme-east-2").is_ok());
        assert!(TenantSlug::new("a1").is_ok());
    }

    #[test]
    fn rejects_uppercase() {
        assert!(TenantSlug::new("Acme").is_err());
    }

    #[test]
    fn rejects_hyphen_at_ends() {
        assert!(TenantSlug::new("-acme").is_err());
        assert!(TenantSlug::new("acme-").is_err());
    }

    #[test]
    fn rejects_too_short() {
        assert!(TenantSlug::new("a").is_err());
        assert!(TenantSlug::new("").is_err());
    }

    #[test]
    fn rejects_other_characters() {
        assert!(TenantSlug::new("ac_me").is_err());
        assert!(TenantSlug::new("ac me").is_err());
    }
}
