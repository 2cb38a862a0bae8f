use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Model vendor a prompt is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    OpenAi,
    Anthropic,
    Google,
    Xai,
    Meta,
    Mistral,
}

impl Provider {
    pub const ALL: [Provider; 6] = [
        Provider::OpenAi,
        Provider::Anthropic,
        Provider::Google,
        Provider::Xai,
        Provider::Meta,
        Provider::Mistral,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Google => "google",
            Provider::Xai => "xai",
            Provider::Meta => "meta",
            Provider::Mistral => "mistral",
        }
    }

    /// Known model identifiers, in the order a picker should offer them.
    #[must_use]
    pub const fn models(self) -> &'static [&'static str] {
        match self {
            Provider::OpenAi => &["gpt-4o", "gpt-4o-mini", "o1", "o3-mini", "gpt-4-turbo"],
            Provider::Anthropic => &[
                "claude-3-5-sonnet-latest",
                "claude-3-5-haiku-latest",
                "claude-3-opus-latest",
            ],
            Provider::Google => &["gemini-2.0-flash", "gemini-1.5-pro", "gemini-1.5-flash"],
            Provider::Xai => &["grok-2", "grok-2-mini"],
            Provider::Meta => &["llama-3.3-70b", "llama-3.1-405b", "llama-3.1-8b"],
            Provider::Mistral => &[
                "mistral-large-latest",
                "mistral-small-latest",
                "codestral-latest",
            ],
        }
    }

    #[must_use]
    pub const fn default_model(self) -> &'static str {
        self.models()[0]
    }

    #[must_use]
    pub fn supports(self, model: &str) -> bool {
        self.models().contains(&model)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Provider::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| {
                format!(
                    "unknown provider '{s}', expected one of: {}",
                    Provider::ALL.map(Provider::as_str).join(", ")
                )
            })
    }
}
