//! handlers/company_handler.rs
use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::models::company_model::{CompanyDetails, CompanyResponse};
use crate::services::call_service::CallService;

/// POST /api/company
pub async fn create_company_endpoint(
    call_service: web::Data<CallService>,
    body: web::Json<CompanyDetails>,
) -> HttpResponse {
    match call_service.companies().create_company(&body).await {
        Ok(company_id) => HttpResponse::Created().json(CompanyResponse {
            company_id,
            message: "Company details stored".to_string(),
        }),
        Err(e) => HttpResponse::InternalServerError().json(json!({
            "success": false,
            "error": format!("{:?}", e)
        })),
    }
}

/// GET /api/company/{id}
pub async fn get_company_endpoint(
    call_service: web::Data<CallService>,
    path: web::Path<String>,
) -> HttpResponse {
    let company_id = path.into_inner();

    match call_service.companies().get_company(&company_id).await {
        Ok(Some(company)) => HttpResponse::Ok().json(company),
        Ok(None) => HttpResponse::NotFound().json(json!({
            "success": false,
            "error": "Company not found"
        })),
        Err(e) => HttpResponse::InternalServerError().json(json!({
            "success": false,
            "error": format!("{:?}", e)
        })),
    }
}
