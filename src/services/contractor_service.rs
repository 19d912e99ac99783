// src/services/contractor_service.rs

use std::sync::Arc;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use mockable::Clock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ContractorStore,
    models::contractor::{
        Contractor, ContractorChanges, ContractorPage, ContractorStatus, GeoPoint, NewContractor,
        PageRequest,
    },
};

#[derive(Clone)]
pub struct ContractorService {
    store: Arc<dyn ContractorStore>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl ContractorService {
    pub fn new(store: Arc<dyn ContractorStore>, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { store, clock }
    }

    // O Postgres guarda microssegundos; truncar aqui mantém o valor igual após o round trip
    fn now(&self) -> DateTime<Utc> {
        self.clock.utc().trunc_subsecs(6)
    }

    pub async fn list(&self) -> Result<Vec<Contractor>, AppError> {
        tracing::debug!("Listando todas as contrapartes");
        self.store.find_all().await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Contractor>, AppError> {
        tracing::debug!(%id, "Buscando contraparte por ID");
        self.store.find_by_id(id).await
    }

    /// Atribui id e timestamps; status ausente vira ACTIVE.
    pub async fn create(&self, input: NewContractor) -> Result<Contractor, AppError> {
        tracing::debug!(name = %input.name, "Criando contraparte");

        let now = self.now();
        let contractor = Contractor {
            id: Uuid::new_v4(),
            name: input.name,
            legal_name: input.legal_name,
            inn: input.inn,
            kpp: input.kpp,
            email: input.email,
            phone: input.phone,
            address: input.address,
            coordinates: input.coordinates.map(|point| point.to_string()),
            status: input.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        self.store.insert(&contractor).await
    }

    /// Substitui todos os campos editáveis. `Ok(None)` quando o id não existe.
    pub async fn update(
        &self,
        id: Uuid,
        changes: ContractorChanges,
    ) -> Result<Option<Contractor>, AppError> {
        tracing::debug!(%id, "Atualizando contraparte");

        let Some(mut existing) = self.store.find_by_id(id).await? else {
            tracing::warn!(%id, "Atualização ignorada: contraparte não encontrada");
            return Ok(None);
        };

        existing.apply(changes);

        // updated_at precisa crescer estritamente, mesmo com relógio parado ou atrasado
        let now = self.now();
        existing.updated_at = if now > existing.updated_at {
            now
        } else {
            existing.updated_at + Duration::microseconds(1)
        };

        self.store.update(&existing).await
    }

    /// Remove sem checar existência. Retorna se alguma linha foi apagada.
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        tracing::debug!(%id, "Removendo contraparte");

        let removed = self.store.delete(id).await?;
        if removed == 0 {
            tracing::debug!(%id, "Nada para remover");
        }
        Ok(removed > 0)
    }

    pub async fn search_by_name(&self, name: &str) -> Result<Vec<Contractor>, AppError> {
        tracing::debug!(name, "Buscando contrapartes por nome");
        self.store.search_by_name(name).await
    }

    pub async fn list_by_status(
        &self,
        status: ContractorStatus,
    ) -> Result<Vec<Contractor>, AppError> {
        tracing::debug!(status = status.as_str(), "Listando contrapartes por status");
        self.store.find_by_status(status).await
    }

    pub async fn list_active(&self) -> Result<Vec<Contractor>, AppError> {
        tracing::debug!("Listando contrapartes ativas");
        self.store.find_active().await
    }

    pub async fn find_by_inn(&self, inn: &str) -> Result<Option<Contractor>, AppError> {
        tracing::debug!(inn, "Buscando contraparte por INN");
        self.store.find_by_inn(inn).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Contractor>, AppError> {
        tracing::debug!(email, "Buscando contraparte por e-mail");
        self.store.find_by_email(email).await
    }

    pub async fn exists_by_inn(&self, inn: &str) -> Result<bool, AppError> {
        tracing::debug!(inn, "Verificando existência por INN");
        self.store.exists_by_inn(inn).await
    }

    pub async fn exists_by_email(&self, email: &str) -> Result<bool, AppError> {
        tracing::debug!(email, "Verificando existência por e-mail");
        self.store.exists_by_email(email).await
    }

    pub async fn nearby(&self, point: GeoPoint, radius: f64) -> Result<Vec<Contractor>, AppError> {
        tracing::debug!(lat = point.lat, lng = point.lng, radius, "Buscando contrapartes no raio");
        self.store.find_nearby(point, radius).await
    }

    pub async fn page(&self, request: PageRequest) -> Result<ContractorPage, AppError> {
        tracing::debug!(?request, "Listando página de contrapartes");

        let items = self.store.find_page(request).await?;
        let total_count = self.store.count().await?;
        let has_next_page = request.offset + (items.len() as i64) < total_count;

        Ok(ContractorPage {
            items,
            total_count,
            has_next_page,
        })
    }
}
