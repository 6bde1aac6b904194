//! config/app_config.rs
//! Configuración global del servicio. Todas las credenciales son opcionales:
//! sólo se valida su presencia en el primer uso.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::config::keyword_config::{env_list, KeywordSets};
use crate::errors::CallAgentError;

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:4004";
pub const WEBHOOK_PATH: &str = "/api/v1/call-agent/webhook/outcome";
pub const ELEVENLABS_BASE_URL: &str = "https://api.elevenlabs.io/v1/convai";
pub const TWILIO_BASE_URL: &str = "https://api.twilio.com";
pub const CALCOM_BASE_URL: &str = "https://api.cal.com/v1";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_CALENDAR_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceProvider {
    ElevenLabs,
    Twilio,
    Mock,
}

impl FromStr for VoiceProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "elevenlabs" | "" => Ok(VoiceProvider::ElevenLabs),
            "twilio" => Ok(VoiceProvider::Twilio),
            "mock" => Ok(VoiceProvider::Mock),
            other => Err(format!("Proveedor de voz desconocido: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ElevenLabsConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub agent_id: Option<String>,
    pub phone_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TwilioConfig {
    pub base_url: String,
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CalComConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub event_type_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct GoogleCalendarConfig {
    pub token_url: String,
    pub base_url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
    pub calendar_id: String,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub use_tls: bool,
}

/// Parámetros del bucle de monitoreo de llamadas.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub max_polls: u32,
    pub poll_interval: Duration,
    pub terminal_statuses: Vec<String>,
    pub failure_statuses: Vec<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            max_polls: 60,
            poll_interval: Duration::from_secs(5),
            terminal_statuses: ["completed", "call_end", "finished", "done", "failed"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            failure_statuses: vec!["failed".to_string()],
        }
    }
}

impl MonitorConfig {
    pub fn is_terminal(&self, status: &str) -> bool {
        let status = status.to_lowercase();
        self.terminal_statuses.iter().any(|s| *s == status)
    }

    pub fn is_failure(&self, status: &str) -> bool {
        let status = status.to_lowercase();
        self.failure_statuses.iter().any(|s| *s == status)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub backend_url: String,
    pub database_url: Option<String>,
    pub voice_provider: VoiceProvider,
    pub elevenlabs: ElevenLabsConfig,
    pub twilio: TwilioConfig,
    pub calcom: CalComConfig,
    pub google: GoogleCalendarConfig,
    pub smtp: SmtpConfig,
    pub monitor: MonitorConfig,
    pub keywords: KeywordSets,
    /// Tope por request hacia proveedores externos (voz y calendario).
    pub http_timeout: Duration,
}

impl AppConfig {
    /// Lee todo del entorno. Nunca falla: valores inválidos caen al default con un warning.
    pub fn from_env() -> Self {
        let voice_provider = env::var("VOICE_PROVIDER")
            .ok()
            .and_then(|raw| match raw.parse::<VoiceProvider>() {
                Ok(p) => Some(p),
                Err(e) => {
                    log::warn!("(AppConfig::from_env) {}; se usa elevenlabs", e);
                    None
                }
            })
            .unwrap_or(VoiceProvider::ElevenLabs);

        let mut monitor = MonitorConfig::default();
        monitor.max_polls = parsed_var("MONITOR_MAX_POLLS").unwrap_or(monitor.max_polls);
        if let Some(secs) = parsed_var::<u64>("MONITOR_POLL_INTERVAL_SECS") {
            monitor.poll_interval = Duration::from_secs(secs);
        }
        if let Some(list) = env_list("MONITOR_TERMINAL_STATUSES") {
            monitor.terminal_statuses = list;
        }

        AppConfig {
            port: parsed_var("PORT").unwrap_or(5001),
            backend_url: env::var("BACKEND_URL")
                .unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string()),
            database_url: optional_var("DATABASE_URL"),
            voice_provider,
            elevenlabs: ElevenLabsConfig {
                base_url: ELEVENLABS_BASE_URL.to_string(),
                api_key: optional_var("ELEVENLABS_API_KEY"),
                agent_id: optional_var("ELEVENLABS_AGENT_ID"),
                phone_id: optional_var("ELEVENLABS_PHONE_ID"),
            },
            twilio: TwilioConfig {
                base_url: TWILIO_BASE_URL.to_string(),
                account_sid: optional_var("TWILIO_ACCOUNT_SID"),
                auth_token: optional_var("TWILIO_AUTH_TOKEN"),
                phone_number: optional_var("TWILIO_PHONE_NUMBER"),
            },
            calcom: CalComConfig {
                base_url: CALCOM_BASE_URL.to_string(),
                api_key: optional_var("CALCOM_API_KEY"),
                event_type_id: parsed_var("CALCOM_EVENT_TYPE_ID"),
            },
            google: GoogleCalendarConfig {
                token_url: GOOGLE_TOKEN_URL.to_string(),
                base_url: GOOGLE_CALENDAR_BASE_URL.to_string(),
                client_id: optional_var("GOOGLE_CLIENT_ID"),
                client_secret: optional_var("GOOGLE_CLIENT_SECRET"),
                refresh_token: optional_var("GOOGLE_REFRESH_TOKEN"),
                calendar_id: env::var("GOOGLE_CALENDAR_ID")
                    .unwrap_or_else(|_| "primary".to_string()),
            },
            smtp: SmtpConfig {
                host: env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
                port: parsed_var("SMTP_PORT").unwrap_or(587),
                user: optional_var("SMTP_USER"),
                password: optional_var("SMTP_PASSWORD"),
                use_tls: parsed_var("SMTP_USE_TLS").unwrap_or(true),
            },
            monitor,
            keywords: KeywordSets::from_env(),
            http_timeout: Duration::from_secs(
                parsed_var("HTTP_TIMEOUT_SECS").unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
            ),
        }
    }

    pub fn webhook_url(&self) -> String {
        format!("{}{}", self.backend_url.trim_end_matches('/'), WEBHOOK_PATH)
    }
}

/// Devuelve el valor o el error de credenciales faltantes.
pub fn require<'a>(
    value: &'a Option<String>,
    name: &'static str,
) -> Result<&'a str, CallAgentError> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or(CallAgentError::MissingCredentials(name))
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_var<T: FromStr>(key: &str) -> Option<T> {
    let raw = optional_var(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("(AppConfig::from_env) Valor inválido para {}: '{}'", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_parsing() {
        assert_eq!("ElevenLabs".parse::<VoiceProvider>(), Ok(VoiceProvider::ElevenLabs));
        assert_eq!("twilio".parse::<VoiceProvider>(), Ok(VoiceProvider::Twilio));
        assert_eq!(" mock ".parse::<VoiceProvider>(), Ok(VoiceProvider::Mock));
        assert!("vonage".parse::<VoiceProvider>().is_err());
    }

    #[test]
    fn terminal_status_is_case_insensitive() {
        let monitor = MonitorConfig::default();
        assert!(monitor.is_terminal("Completed"));
        assert!(monitor.is_terminal("call_end"));
        assert!(!monitor.is_terminal("in-progress"));
        assert!(monitor.is_failure("FAILED"));
    }

    #[test]
    fn require_rejects_blank_values() {
        let blank = Some("  ".to_string());
        assert!(matches!(
            require(&blank, "ELEVENLABS_API_KEY"),
            Err(CallAgentError::MissingCredentials("ELEVENLABS_API_KEY"))
        ));
        let set = Some("key".to_string());
        assert_eq!(require(&set, "X").unwrap(), "key");
    }
}
