//! handlers/call_handler.rs
//! Endpoints de llamadas, transcripciones y análisis.

use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::errors::CallAgentError;
use crate::models::call_model::CallRequest;
use crate::models::classification_model::AnalyzeRequest;
use crate::models::company_model::{CallCompletionRequest, EmailReplyRequest};
use crate::services::call_service::CallService;

/// Errores de negocio a respuesta HTTP. Los "no encontrado" son 404; el resto 500.
fn error_response(e: anyhow::Error) -> HttpResponse {
    match e.downcast_ref::<CallAgentError>() {
        Some(CallAgentError::NotFound(what)) => HttpResponse::NotFound().json(json!({
            "success": false,
            "error": format!("{} not found", what)
        })),
        _ => HttpResponse::InternalServerError().json(json!({
            "success": false,
            "error": e.to_string()
        })),
    }
}

/// POST /api/call
/// Los fallos del proveedor (credenciales, HTTP) vuelven como `success: false`.
pub async fn make_call_endpoint(
    call_service: web::Data<CallService>,
    body: web::Json<CallRequest>,
) -> HttpResponse {
    match call_service.start_call(body.into_inner()).await {
        Ok(placement) => HttpResponse::Ok().json(json!({
            "success": true,
            "call_id": placement.call_id,
            "status": placement.status
        })),
        Err(e) => {
            log::error!("(make_call_endpoint) {:?}", e);
            HttpResponse::Ok().json(json!({
                "success": false,
                "error": e.to_string()
            }))
        }
    }
}

/// GET /api/transcript/{call_id}
pub async fn get_transcript_endpoint(
    call_service: web::Data<CallService>,
    path: web::Path<String>,
) -> HttpResponse {
    let call_id = path.into_inner();

    match call_service.get_transcript(&call_id).await {
        Ok(fetch) => HttpResponse::Ok().json(fetch),
        Err(e) => {
            log::error!("(get_transcript_endpoint) {}: {:?}", call_id, e);
            HttpResponse::Ok().json(json!({
                "success": false,
                "error": e.to_string()
            }))
        }
    }
}

/// POST /api/analyze
pub async fn analyze_endpoint(
    call_service: web::Data<CallService>,
    body: web::Json<AnalyzeRequest>,
) -> HttpResponse {
    HttpResponse::Ok().json(call_service.analyze(&body.transcript))
}

/// POST /api/call/complete
pub async fn complete_call_endpoint(
    call_service: web::Data<CallService>,
    body: web::Json<CallCompletionRequest>,
) -> HttpResponse {
    match call_service.complete_call(body.into_inner()).await {
        Ok(resp) => HttpResponse::Ok().json(resp),
        Err(e) => error_response(e),
    }
}

/// POST /api/email/reply
pub async fn email_reply_endpoint(
    call_service: web::Data<CallService>,
    body: web::Json<EmailReplyRequest>,
) -> HttpResponse {
    match call_service.handle_email_reply(body.into_inner()).await {
        Ok(resp) => HttpResponse::Ok().json(resp),
        Err(e) => error_response(e),
    }
}
