use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Serialization format of a document buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Classify text by shape: JSON when the first non-whitespace character
    /// is `{` or `[`, YAML otherwise, `None` for blank text.
    ///
    /// ```
    /// use livedoc::document::Format;
    ///
    /// assert_eq!(Format::classify("  {\"a\": 1}"), Some(Format::Json));
    /// assert_eq!(Format::classify("a: 1"), Some(Format::Yaml));
    /// assert_eq!(Format::classify(" \n"), None);
    /// ```
    pub fn classify(text: &str) -> Option<Format> {
        match text.trim_start().chars().next()? {
            '{' | '[' => Some(Format::Json),
            _ => Some(Format::Yaml),
        }
    }

    /// The format to parse `text` with. The text's own shape wins; the hint
    /// only applies to blank text, and YAML is the last resort.
    pub fn resolve(text: &str, hint: Option<Format>) -> Format {
        Format::classify(text).or(hint).unwrap_or(Format::Yaml)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
        }
    }
}

impl FromStr for Format {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            _ => Err(EngineError::Config(format!("unknown format `{s}`"))),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_is_json() {
        assert_eq!(Format::classify("\n\t[1]"), Some(Format::Json));
    }

    #[test]
    fn hint_only_for_blank_text() {
        assert_eq!(Format::resolve("", Some(Format::Json)), Format::Json);
        assert_eq!(Format::resolve("a: 1", Some(Format::Json)), Format::Yaml);
        assert_eq!(Format::resolve("{}", Some(Format::Yaml)), Format::Json);
        assert_eq!(Format::resolve("   ", None), Format::Yaml);
    }

    #[test]
    fn names() {
        assert_eq!("YML".parse::<Format>(), Ok(Format::Yaml));
        assert_eq!("json".parse::<Format>(), Ok(Format::Json));
        assert_eq!(
            "toml".parse::<Format>(),
            Err(EngineError::Config("unknown format `toml`".into()))
        );
        assert_eq!(Format::Json.to_string(), "json");
    }
}
