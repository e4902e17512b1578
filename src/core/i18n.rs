//! Localized user-facing messages

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

const DEFAULT_CATALOG: &str = include_str!("../../locales/messages.yaml");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    De,
    Fr,
    Es,
    It,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::En,
        Language::De,
        Language::Fr,
        Language::Es,
        Language::It,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::De => "de",
            Language::Fr => "fr",
            Language::Es => "es",
            Language::It => "it",
        }
    }
}

impl Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Language::En),
            "de" => Ok(Language::De),
            "fr" => Ok(Language::Fr),
            "es" => Ok(Language::Es),
            "it" => Ok(Language::It),
            _ => Err(anyhow::anyhow!("Unsupported language: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKey {
    Title,
    FetchingRates,
    FetchingHistory,
    Conversion,
    RatesTitle,
    RatesAsOf,
    Currency,
    Rate,
    Unavailable,
    Refreshed,
    NoRates,
    Error,
    HistoryTitle,
    HistoryEmpty,
    HistoryRange,
    LanguageChanged,
    Prompt,
    Help,
    UnknownCommand,
    Goodbye,
}

impl MessageKey {
    fn name(&self) -> String {
        serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| format!("{self:?}"))
    }
}

/// All translations, loaded once at startup and passed to whoever renders text.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    messages: HashMap<Language, HashMap<MessageKey, String>>,
}

impl Catalog {
    /// The catalog compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_yaml(DEFAULT_CATALOG).context("Failed to parse embedded message catalog")
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let catalog: Catalog = serde_yaml::from_str(yaml)?;
        Ok(catalog)
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read message catalog: {}", path.as_ref().display())
        })?;
        Self::from_yaml(&text).with_context(|| {
            format!(
                "Failed to parse message catalog: {}",
                path.as_ref().display()
            )
        })
    }

    /// Looks up `key` in `lang`, falling back to English and then to the key name.
    pub fn text(&self, lang: Language, key: MessageKey) -> String {
        self.messages
            .get(&lang)
            .and_then(|m| m.get(&key))
            .or_else(|| {
                self.messages
                    .get(&Language::En)
                    .and_then(|m| m.get(&key))
            })
            .cloned()
            .unwrap_or_else(|| key.name())
    }

    /// Like [`Catalog::text`], with `{name}` placeholders substituted.
    pub fn format(&self, lang: Language, key: MessageKey, args: &[(&str, &str)]) -> String {
        args.iter()
            .fold(self.text(lang, key), |text, (name, value)| {
                text.replace(&format!("{{{name}}}"), value)
            })
    }
}
