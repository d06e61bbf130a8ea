use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Unsupported TLD: {0:?} (supported: ro, eu, com, net, info, org)")]
    UnsupportedTld(String),
    #[error("Invalid limit: {name} must be greater than zero")]
    InvalidLimit { name: &'static str },
    #[error("Keyword has no usable characters: {0:?}")]
    EmptyKeyword(String),
}

/// The suffixes the registrar's multi-check endpoint can answer for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tld {
    Ro,
    Eu,
    Com,
    Net,
    Info,
    Org,
}

impl Tld {
    /// Every supported TLD, in the order the registrar lists them.
    pub const ALL: [Tld; 6] = [Tld::Ro, Tld::Eu, Tld::Com, Tld::Net, Tld::Info, Tld::Org];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tld::Ro => "ro",
            Tld::Eu => "eu",
            Tld::Com => "com",
            Tld::Net => "net",
            Tld::Info => "info",
            Tld::Org => "org",
        }
    }
}

impl fmt::Display for Tld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tld {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().trim_start_matches('.');
        Tld::ALL
            .into_iter()
            .find(|tld| tld.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigurationError::UnsupportedTld(s.to_string()))
    }
}

/// Turn an optional preferred set into the ordered TLD list used for batching.
///
/// `None` selects all six suffixes. Duplicates are dropped keeping their
/// first position, and the first unsupported value fails the whole call.
pub fn resolve_tlds<S: AsRef<str>>(preferred: Option<&[S]>) -> Result<Vec<Tld>, ConfigurationError> {
    let Some(preferred) = preferred else {
        return Ok(Tld::ALL.to_vec());
    };

    let mut tlds = Vec::with_capacity(preferred.len());
    for value in preferred {
        let tld: Tld = value.as_ref().parse()?;
        if !tlds.contains(&tld) {
            tlds.push(tld);
        }
    }
    Ok(tlds)
}
