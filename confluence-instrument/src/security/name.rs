use derive_more::Display;
use serde::Serialize;
use smol_str::{SmolStr, StrExt};
use std::borrow::Borrow;

/// Confluence `SmolStr` representation for a [`Security`](super::Security) ticker.
///
/// Tickers are normalised to upper case, so "vti" and "VTI" refer to the same security. Index
/// tickers keep their prefix (eg/ "^GSPC").
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Display)]
pub struct SecurityName(SmolStr);

impl SecurityName {
    pub fn new<S>(name: S) -> Self
    where
        S: Into<SmolStr>,
    {
        let name = name.into();
        if name.chars().any(char::is_lowercase) {
            Self(name.to_uppercase_smolstr())
        } else {
            Self(name)
        }
    }

    pub fn name(&self) -> &SmolStr {
        &self.0
    }
}

impl From<&str> for SecurityName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SecurityName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<SmolStr> for SecurityName {
    fn from(value: SmolStr) -> Self {
        Self::new(value)
    }
}

impl Borrow<str> for SecurityName {
    fn borrow(&self) -> &str {
        self.0.borrow()
    }
}

impl AsRef<str> for SecurityName {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}

impl<'de> serde::de::Deserialize<'de> for SecurityName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::de::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(SecurityName::new(name))
    }
}

/// Confluence `SmolStr` representation for a cohort of securities grouped by type (eg/ "growth",
/// "small_cap"), normalised to lower case.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Display)]
pub struct CohortName(SmolStr);

impl CohortName {
    pub fn new<S>(name: S) -> Self
    where
        S: Into<SmolStr>,
    {
        let name = name.into();
        if name.chars().any(char::is_uppercase) {
            Self(name.to_lowercase_smolstr())
        } else {
            Self(name)
        }
    }
}

impl From<&str> for CohortName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for CohortName {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}

impl<'de> serde::de::Deserialize<'de> for CohortName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::de::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(CohortName::new(name))
    }
}
