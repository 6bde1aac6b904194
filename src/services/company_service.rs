//! services/company_service.rs
//! Empresas y clientes sobre el `RecordStore`.

use std::sync::Arc;

use anyhow::Result;
use uuid::Uuid;

use crate::models::company_model::{ClientData, CompanyDetails};
use crate::services::record_store::{RecordStore, Repository};

#[derive(Clone)]
pub struct CompanyService {
    companies: Repository<CompanyDetails>,
    clients: Repository<ClientData>,
}

impl CompanyService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        CompanyService {
            companies: Repository::new(store.clone(), "company"),
            clients: Repository::new(store, "client"),
        }
    }

    pub async fn create_company(&self, details: &CompanyDetails) -> Result<String> {
        let company_id = Uuid::new_v4().to_string();
        self.companies.insert(&company_id, details).await?;
        log::info!(
            "(create_company) Empresa '{}' guardada con id={}",
            details.company_name,
            company_id
        );
        Ok(company_id)
    }

    pub async fn get_company(&self, company_id: &str) -> Result<Option<CompanyDetails>> {
        self.companies.find(company_id).await
    }

    pub async fn save_client(&self, client_id: &str, data: &ClientData) -> Result<()> {
        self.clients.insert(client_id, data).await
    }

    #[cfg(test)]
    pub async fn get_client(&self, client_id: &str) -> Result<Option<ClientData>> {
        self.clients.find(client_id).await
    }
}
