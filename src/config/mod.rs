//! config/mod.rs
//! Configuración leída del entorno (.env) al arrancar.

pub mod app_config;
pub mod keyword_config;
