//! services/notifier_service.rs
//! Reporte del resultado de una llamada al webhook del backend.
//! Un solo intento, 10 s de timeout; nunca propaga errores.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::models::webhook_model::OutcomePayload;

pub const NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait BackendNotifier: Send + Sync {
    /// `true` sólo si el backend respondió 200.
    async fn notify(&self, payload: &OutcomePayload) -> bool;
}

#[derive(Clone)]
pub struct WebhookNotifier {
    webhook_url: String,
    http_client: Client,
}

impl WebhookNotifier {
    pub fn new(webhook_url: String, http_client: Client) -> Self {
        WebhookNotifier {
            webhook_url,
            http_client,
        }
    }

    pub fn webhook_url(&self) -> &str {
        &self.webhook_url
    }
}

#[async_trait]
impl BackendNotifier for WebhookNotifier {
    async fn notify(&self, payload: &OutcomePayload) -> bool {
        log::info!(
            "(WebhookNotifier::notify) Enviando resultado de {} a {}",
            payload.call_id,
            self.webhook_url
        );

        let result = self
            .http_client
            .post(&self.webhook_url)
            .timeout(NOTIFY_TIMEOUT)
            .json(payload)
            .send()
            .await;

        match result {
            Ok(resp) if resp.status() == StatusCode::OK => {
                log::info!(
                    "(WebhookNotifier::notify) Backend notificado para {}",
                    payload.call_id
                );
                true
            }
            Ok(resp) => {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                log::error!(
                    "(WebhookNotifier::notify) Backend respondió {} para {}: {}",
                    status,
                    payload.call_id,
                    body
                );
                false
            }
            Err(e) => {
                log::error!(
                    "(WebhookNotifier::notify) Error enviando señal al backend: {:?}",
                    e
                );
                false
            }
        }
    }
}
