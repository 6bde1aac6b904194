//! services/mod.rs
//! Módulo que agrupa distintos "servicios" o "capas de negocio" de la app.

pub mod calendar_service;
pub mod call_service;
pub mod classifier_service;
pub mod company_service;
pub mod dispatch_service;
pub mod email_service;
pub mod monitor_service;
pub mod notifier_service;
pub mod record_store;
pub mod twilio_service;
pub mod voice_service;
