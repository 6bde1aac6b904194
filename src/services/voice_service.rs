//! services/voice_service.rs
//! Gateways de voz: disparan la llamada saliente y consultan su estado y
//! transcripción. ElevenLabs y el mock viven aquí; Twilio en `twilio_service`.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::app_config::{require, AppConfig, ElevenLabsConfig, VoiceProvider};
use crate::errors::CallAgentError;
use crate::models::call_model::{CallPlacement, CallTarget, TranscriptFetch, TranscriptTurn};
use crate::services::twilio_service::TwilioGateway;

/// Consulta única del estado/transcripción de una llamada.
/// Un `Err` es reintentable para quien hace polling.
#[async_trait]
pub trait TranscriptFetcher: Send + Sync {
    async fn fetch(&self, call_id: &str) -> Result<TranscriptFetch>;
}

#[async_trait]
pub trait VoiceGateway: TranscriptFetcher {
    fn provider_name(&self) -> &'static str;

    async fn place_call(&self, target: &CallTarget) -> Result<CallPlacement>;
}

/// El mismo gateway visto con sus dos caras.
#[derive(Clone)]
pub struct VoiceClients {
    pub gateway: Arc<dyn VoiceGateway>,
    pub fetcher: Arc<dyn TranscriptFetcher>,
}

impl VoiceClients {
    pub fn from_config(config: &AppConfig, http_client: Client) -> Self {
        match config.voice_provider {
            VoiceProvider::ElevenLabs => {
                let gw = Arc::new(ElevenLabsGateway::new(config.elevenlabs.clone(), http_client));
                VoiceClients {
                    gateway: gw.clone(),
                    fetcher: gw,
                }
            }
            VoiceProvider::Twilio => {
                let gw = Arc::new(TwilioGateway::new(config.twilio.clone(), http_client));
                VoiceClients {
                    gateway: gw.clone(),
                    fetcher: gw,
                }
            }
            VoiceProvider::Mock => {
                let gw = Arc::new(MockGateway);
                VoiceClients {
                    gateway: gw.clone(),
                    fetcher: gw,
                }
            }
        }
    }
}

/// Concatena los turnos como "{role}: {message}\n" respetando el orden.
pub fn assemble_transcript(turns: &[TranscriptTurn]) -> String {
    let mut out = String::new();
    for turn in turns {
        let role = turn.role.as_deref().unwrap_or("unknown");
        let message = turn
            .message
            .as_deref()
            .filter(|m| !m.is_empty())
            .or(turn.text.as_deref())
            .unwrap_or("");
        out.push_str(&format!("{}: {}\n", role, message));
    }
    out.trim_end().to_string()
}

// ============================================================
// ElevenLabs ConvAI
// ============================================================

#[derive(Clone)]
pub struct ElevenLabsGateway {
    config: ElevenLabsConfig,
    http_client: Client,
}

#[derive(Debug, Deserialize)]
struct ConversationDetails {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    transcript: Option<Vec<TranscriptTurn>>,
    #[serde(default)]
    audio_url: Option<String>,
}

impl ElevenLabsGateway {
    pub fn new(config: ElevenLabsConfig, http_client: Client) -> Self {
        if config.api_key.is_none() || config.agent_id.is_none() {
            log::warn!("(ElevenLabsGateway::new) Faltan credenciales de ElevenLabs; las llamadas fallarán.");
        }
        ElevenLabsGateway {
            config,
            http_client,
        }
    }
}

#[async_trait]
impl TranscriptFetcher for ElevenLabsGateway {
    async fn fetch(&self, call_id: &str) -> Result<TranscriptFetch> {
        let api_key = require(&self.config.api_key, "ELEVENLABS_API_KEY")?;
        let url = format!("{}/conversations/{}", self.config.base_url, call_id);

        let resp = self
            .http_client
            .get(&url)
            .header("xi-api-key", api_key)
            .send()
            .await
            .context("(ElevenLabsGateway::fetch) Fallo al consultar la conversación")?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(CallAgentError::Upstream {
                service: "ElevenLabs",
                status,
                body,
            }
            .into());
        }

        let details: ConversationDetails = resp
            .json()
            .await
            .context("(ElevenLabsGateway::fetch) Respuesta JSON inválida")?;

        let turns = details.transcript.unwrap_or_default();
        Ok(TranscriptFetch {
            call_id: call_id.to_string(),
            status: details.status.unwrap_or_else(|| "unknown".to_string()),
            transcript: assemble_transcript(&turns),
            has_recording: details.audio_url.is_some(),
            recording_url: details.audio_url,
        })
    }
}

#[async_trait]
impl VoiceGateway for ElevenLabsGateway {
    fn provider_name(&self) -> &'static str {
        "ElevenLabs"
    }

    async fn place_call(&self, target: &CallTarget) -> Result<CallPlacement> {
        let api_key = require(&self.config.api_key, "ELEVENLABS_API_KEY")?;
        let agent_id = require(&self.config.agent_id, "ELEVENLABS_AGENT_ID")?;
        let phone_id = require(&self.config.phone_id, "ELEVENLABS_PHONE_ID")?;

        let mut payload = json!({
            "agent_id": agent_id,
            "agent_phone_number_id": phone_id,
            "to_number": target.phone,
        });
        if let Some(meta) = &target.metadata {
            payload["conversation_initiation_client_data"] = json!({ "dynamic_variables": meta });
        }

        log::info!(
            "(ElevenLabsGateway::place_call) Disparando llamada a {} ({})",
            target.phone,
            target.name
        );
        let resp = self
            .http_client
            .post(format!("{}/twilio/outbound-call", self.config.base_url))
            .header("xi-api-key", api_key)
            .json(&payload)
            .send()
            .await
            .context("(ElevenLabsGateway::place_call) Fallo al disparar la llamada")?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            log::error!(
                "(ElevenLabsGateway::place_call) ElevenLabs respondió {}: {}",
                status,
                body
            );
            return Err(CallAgentError::Upstream {
                service: "ElevenLabs",
                status,
                body,
            }
            .into());
        }

        let data: serde_json::Value = resp.json().await?;
        let call_id = ["conversation_id", "conversationId", "id"]
            .iter()
            .find_map(|k| data.get(*k).and_then(|v| v.as_str()))
            .map(|s| s.to_string());

        match call_id {
            Some(call_id) => {
                log::info!("(ElevenLabsGateway::place_call) Llamada iniciada: {}", call_id);
                Ok(CallPlacement {
                    call_id,
                    status: "initiated".to_string(),
                })
            }
            None => {
                log::error!(
                    "(ElevenLabsGateway::place_call) 200 sin id de conversación: {}",
                    data
                );
                Err(CallAgentError::MissingCallId("ElevenLabs").into())
            }
        }
    }
}

// ============================================================
// Mock (desarrollo local)
// ============================================================

pub const MOCK_TRANSCRIPT: &str = "Agent: Hi, interested in a demo? Lead: Yes, sounds good!";

#[derive(Clone, Copy, Default)]
pub struct MockGateway;

#[async_trait]
impl TranscriptFetcher for MockGateway {
    async fn fetch(&self, call_id: &str) -> Result<TranscriptFetch> {
        Ok(TranscriptFetch {
            call_id: call_id.to_string(),
            status: "completed".to_string(),
            transcript: MOCK_TRANSCRIPT.to_string(),
            has_recording: true,
            recording_url: None,
        })
    }
}

#[async_trait]
impl VoiceGateway for MockGateway {
    fn provider_name(&self) -> &'static str {
        "mock"
    }

    async fn place_call(&self, target: &CallTarget) -> Result<CallPlacement> {
        let digits: Vec<char> = target.phone.chars().collect();
        let tail: String = digits[digits.len().saturating_sub(4)..].iter().collect();
        let call_id = format!("MOCK_{}", tail);
        log::info!("(MockGateway::place_call) [MOCK] Llamada a {}: {}", target.name, call_id);
        Ok(CallPlacement {
            call_id,
            status: "completed".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(role: Option<&str>, message: Option<&str>, text: Option<&str>) -> TranscriptTurn {
        TranscriptTurn {
            role: role.map(String::from),
            message: message.map(String::from),
            text: text.map(String::from),
        }
    }

    #[test]
    fn assembles_turns_in_order() {
        let turns = vec![
            turn(Some("agent"), Some("Hello there"), None),
            turn(Some("user"), Some("Hi  "), None),
        ];
        assert_eq!(assemble_transcript(&turns), "agent: Hello there\nuser: Hi");
    }

    #[test]
    fn falls_back_to_text_and_unknown_role() {
        let turns = vec![turn(None, Some(""), Some("from text field"))];
        assert_eq!(assemble_transcript(&turns), "unknown: from text field");
    }

    #[test]
    fn empty_turns_yield_empty_transcript() {
        assert_eq!(assemble_transcript(&[]), "");
    }

    #[actix_rt::test]
    async fn mock_call_id_uses_last_four_digits() {
        let placement = MockGateway
            .place_call(&CallTarget::new("+1 555 123 9876", "Ana", "Acme"))
            .await
            .unwrap();
        assert_eq!(placement.call_id, "MOCK_9876");
    }
}
