//! models/mod.rs
//! Módulo raíz para modelos/estructuras compartidas.

pub mod call_model;
pub mod classification_model;
pub mod company_model;
pub mod meeting_model;
pub mod webhook_model;
