//! config/keyword_config.rs
//! Listas de palabras clave del clasificador de resultados de llamada.
//! Son configuración explícita: se pueden sobreescribir por variable de entorno.

use serde::{Deserialize, Serialize};
use std::env;

const DEFAULT_POSITIVE: &[&str] = &[
    "yes",
    "interested",
    "demo",
    "schedule",
    "meeting",
    "sure",
    "sounds good",
    "tell me more",
    "want to",
    "would like",
    "sign up",
    "absolutely",
    "definitely",
];

const DEFAULT_NEGATIVE: &[&str] = &[
    "no",
    "not interested",
    "no thanks",
    "stop",
    "don't",
    "never",
    "remove",
    "unsubscribe",
    "busy",
    "not now",
    "maybe later",
];

const DEFAULT_CALLBACK: &[&str] = &[
    "call back",
    "later",
    "next week",
    "another time",
    "busy now",
    "not available",
];

/// Variante simplificada (dos ramas, sin confianza).
pub const SIMPLE_POSITIVE: &[&str] = &["interested", "demo", "yes", "schedule"];
pub const SIMPLE_NEGATIVE: &[&str] = &["not interested", "no thanks", "stop", "unsubscribe"];
pub const SIMPLE_CALLBACK: &[&str] = &["call back", "later", "busy"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeywordSets {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
    pub callback: Vec<String>,
}

impl Default for KeywordSets {
    fn default() -> Self {
        KeywordSets {
            positive: to_owned_list(DEFAULT_POSITIVE),
            negative: to_owned_list(DEFAULT_NEGATIVE),
            callback: to_owned_list(DEFAULT_CALLBACK),
        }
    }
}

impl KeywordSets {
    /// Defaults, reemplazando cada lista si su variable existe:
    /// CLASSIFIER_POSITIVE_KEYWORDS, CLASSIFIER_NEGATIVE_KEYWORDS, CLASSIFIER_CALLBACK_KEYWORDS
    pub fn from_env() -> Self {
        let mut sets = KeywordSets::default();
        if let Some(list) = env_list("CLASSIFIER_POSITIVE_KEYWORDS") {
            sets.positive = list;
        }
        if let Some(list) = env_list("CLASSIFIER_NEGATIVE_KEYWORDS") {
            sets.negative = list;
        }
        if let Some(list) = env_list("CLASSIFIER_CALLBACK_KEYWORDS") {
            sets.callback = list;
        }
        sets
    }
}

fn to_owned_list(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// Lista separada por comas; se normaliza a minúsculas. `None` si está vacía o no existe.
pub fn env_list(key: &str) -> Option<Vec<String>> {
    let raw = env::var(key).ok()?;
    parse_list(&raw)
}

pub fn parse_list(raw: &str) -> Option<Vec<String>> {
    let list: Vec<String> = raw
        .split(',')
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect();
    if list.is_empty() {
        None
    } else {
        Some(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_list_trims_and_lowercases() {
        let list = parse_list(" Yes , SURE,, sounds good ").unwrap();
        assert_eq!(list, vec!["yes", "sure", "sounds good"]);
    }

    #[test]
    fn parse_list_rejects_blank() {
        assert!(parse_list(" , ,").is_none());
    }

    #[test]
    fn defaults_have_all_three_sets() {
        let sets = KeywordSets::default();
        assert_eq!(sets.positive.len(), 13);
        assert_eq!(sets.negative.len(), 11);
        assert_eq!(sets.callback.len(), 6);
    }
}
