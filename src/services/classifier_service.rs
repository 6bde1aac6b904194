//! services/classifier_service.rs
//! Clasificación de transcripciones por palabras clave. Función pura: misma
//! entrada, mismo resultado.

use crate::config::keyword_config::{
    KeywordSets, SIMPLE_CALLBACK, SIMPLE_NEGATIVE, SIMPLE_POSITIVE,
};
use crate::models::classification_model::{ClassificationResult, FollowUpAction, Outcome};

/// Por debajo de este largo (tras trim) la llamada se considera sin respuesta.
pub const MIN_TRANSCRIPT_CHARS: usize = 10;

#[derive(Debug, Clone, Default)]
pub struct OutcomeClassifier {
    keywords: KeywordSets,
}

/// Conteo de coincidencias por lista.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordScores {
    pub positive: usize,
    pub negative: usize,
    pub callback: usize,
}

impl KeywordScores {
    fn total(&self) -> usize {
        self.positive + self.negative + self.callback
    }

    fn ratio(&self, hits: usize) -> f64 {
        match self.total() {
            0 => 0.0,
            total => hits as f64 / total as f64,
        }
    }
}

impl OutcomeClassifier {
    pub fn new(keywords: KeywordSets) -> Self {
        let keywords = KeywordSets {
            positive: lowercase_all(keywords.positive),
            negative: lowercase_all(keywords.negative),
            callback: lowercase_all(keywords.callback),
        };
        OutcomeClassifier { keywords }
    }

    pub fn keywords(&self) -> &KeywordSets {
        &self.keywords
    }

    pub fn score(&self, text: &str) -> KeywordScores {
        let text = text.to_lowercase();
        KeywordScores {
            positive: count_hits(&text, &self.keywords.positive),
            negative: count_hits(&text, &self.keywords.negative),
            callback: count_hits(&text, &self.keywords.callback),
        }
    }

    /// Variante canónica de cuatro ramas con confianza.
    pub fn classify(&self, transcript: &str) -> ClassificationResult {
        let trimmed = transcript.trim();
        if trimmed.chars().count() < MIN_TRANSCRIPT_CHARS {
            return no_response(Some(0.0));
        }

        let scores = self.score(trimmed);
        log::debug!(
            "(classify) positive={} negative={} callback={}",
            scores.positive,
            scores.negative,
            scores.callback
        );

        // El orden importa: la primera regla que aplica gana.
        if scores.positive > scores.negative && scores.positive > 0 {
            ClassificationResult {
                outcome: Outcome::Interested,
                qualified: true,
                action: FollowUpAction::ScheduleMeeting,
                confidence: Some(scores.ratio(scores.positive)),
            }
        } else if scores.callback > 0 && scores.callback >= scores.negative {
            ClassificationResult {
                outcome: Outcome::Callback,
                qualified: false,
                action: FollowUpAction::ScheduleCallback,
                confidence: Some(scores.ratio(scores.callback)),
            }
        } else if scores.negative > 0 {
            ClassificationResult {
                outcome: Outcome::NotInterested,
                qualified: false,
                action: FollowUpAction::Blocklist,
                confidence: Some(scores.ratio(scores.negative)),
            }
        } else {
            ClassificationResult {
                outcome: Outcome::Unclear,
                qualified: false,
                action: FollowUpAction::FollowUp,
                confidence: Some(0.0),
            }
        }
    }

    /// Variante simplificada de compatibilidad: sin puntaje ni confianza.
    /// CALLBACK sólo cuando no coincide ninguna palabra positiva ni negativa.
    pub fn classify_simple(transcript: &str) -> ClassificationResult {
        let text = transcript.to_lowercase();
        let any = |words: &[&str]| words.iter().any(|w| text.contains(w));

        if any(SIMPLE_POSITIVE) {
            ClassificationResult {
                outcome: Outcome::Interested,
                qualified: true,
                action: FollowUpAction::ScheduleMeeting,
                confidence: None,
            }
        } else if any(SIMPLE_NEGATIVE) {
            ClassificationResult {
                outcome: Outcome::NotInterested,
                qualified: false,
                action: FollowUpAction::Blocklist,
                confidence: None,
            }
        } else if any(SIMPLE_CALLBACK) {
            ClassificationResult {
                outcome: Outcome::Callback,
                qualified: false,
                action: FollowUpAction::ScheduleCallback,
                confidence: None,
            }
        } else {
            no_response(None)
        }
    }
}

fn no_response(confidence: Option<f64>) -> ClassificationResult {
    ClassificationResult {
        outcome: Outcome::NoResponse,
        qualified: false,
        action: FollowUpAction::FollowUp,
        confidence,
    }
}

fn count_hits(text: &str, keywords: &[String]) -> usize {
    keywords.iter().filter(|kw| text.contains(kw.as_str())).count()
}

fn lowercase_all(words: Vec<String>) -> Vec<String> {
    words.into_iter().map(|w| w.to_lowercase()).collect()
}
