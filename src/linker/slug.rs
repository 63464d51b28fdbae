//! Heading text to identifier transform

use crate::error::HeadlinkError;

/// How spaces in heading text become hyphens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlugMode {
    /// Only the first space is replaced (`"Quick Start Guide"` -> `"quick-start guide"`)
    #[default]
    FirstSpace,
    /// Every space is replaced (`"Quick Start Guide"` -> `"quick-start-guide"`)
    AllSpaces,
}

impl SlugMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlugMode::FirstSpace => "first-space",
            SlugMode::AllSpaces => "all-spaces",
        }
    }
}

impl std::str::FromStr for SlugMode {
    type Err = HeadlinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first-space" | "first" => Ok(SlugMode::FirstSpace),
            "all-spaces" | "all" => Ok(SlugMode::AllSpaces),
            _ => Err(HeadlinkError::InvalidOption {
                option: "slug mode",
                value: s.to_string(),
            }),
        }
    }
}

/// Derive an identifier from heading text.
///
/// The text is lowercased, then U+0020 is replaced with `-` according to
/// `mode`. Other whitespace is left untouched.
pub fn slugify(text: &str, mode: SlugMode) -> String {
    let lower = text.to_lowercase();
    match mode {
        SlugMode::FirstSpace => lower.replacen(' ', "-", 1),
        SlugMode::AllSpaces => lower.replace(' ', "-"),
    }
}
