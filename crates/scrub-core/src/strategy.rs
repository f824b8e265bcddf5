use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// How a matched span is rewritten. Chosen per call, applied to every span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Replace every char with `*`
    #[default]
    Mask,
    /// `{{LABEL:<first 8 hex of sha1>}}`
    Tokenize,
    /// `{{LABEL:<sha256 hex>}}`
    Hash,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Mask => "mask",
            Strategy::Tokenize => "tokenize",
            Strategy::Hash => "hash",
        }
    }
}

impl FromStr for Strategy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mask" => Ok(Strategy::Mask),
            "tokenize" => Ok(Strategy::Tokenize),
            "hash" => Ok(Strategy::Hash),
            _ => Err(CoreError::UnsupportedStrategy(s.to_string())),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
