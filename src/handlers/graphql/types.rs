// src/handlers/graphql/types.rs

use async_graphql::{InputObject, Object, SimpleObject, ID};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::contractor::{
        Contractor, ContractorChanges, ContractorPage, ContractorStatus, GeoPoint, NewContractor,
    },
};

pub(crate) fn parse_id(id: &ID) -> Result<Uuid, AppError> {
    Uuid::parse_str(id.as_str()).map_err(|_| AppError::InvalidId(id.to_string()))
}

// =============================================================================
//  SAÍDA
// =============================================================================

pub struct ContractorObject(pub Contractor);

#[Object(name = "Contractor")]
impl ContractorObject {
    async fn id(&self) -> ID {
        ID(self.0.id.to_string())
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn legal_name(&self) -> Option<&str> {
        self.0.legal_name.as_deref()
    }

    /// ИНН
    async fn inn(&self) -> Option<&str> {
        self.0.inn.as_deref()
    }

    /// КПП
    async fn kpp(&self) -> Option<&str> {
        self.0.kpp.as_deref()
    }

    async fn email(&self) -> Option<&str> {
        self.0.email.as_deref()
    }

    async fn phone(&self) -> Option<&str> {
        self.0.phone.as_deref()
    }

    async fn address(&self) -> Option<&str> {
        self.0.address.as_deref()
    }

    /// Texto exatamente como gravado, em geral `SRID=4326;POINT(<lng> <lat>)`.
    async fn coordinates(&self) -> Option<&str> {
        self.0.coordinates.as_deref()
    }

    /// `null` quando o texto gravado não é um POINT.
    async fn location(&self) -> Option<GeoPoint> {
        self.0.location()
    }

    async fn status(&self) -> ContractorStatus {
        self.0.status
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }

    async fn updated_at(&self) -> DateTime<Utc> {
        self.0.updated_at
    }
}

impl From<Contractor> for ContractorObject {
    fn from(contractor: Contractor) -> Self {
        Self(contractor)
    }
}

pub(crate) fn wrap(contractors: Vec<Contractor>) -> Vec<ContractorObject> {
    contractors.into_iter().map(ContractorObject).collect()
}

#[derive(SimpleObject)]
#[graphql(name = "ContractorPage")]
pub struct ContractorPageObject {
    pub items: Vec<ContractorObject>,
    pub total_count: i64,
    pub has_next_page: bool,
}

impl From<ContractorPage> for ContractorPageObject {
    fn from(page: ContractorPage) -> Self {
        Self {
            items: wrap(page.items),
            total_count: page.total_count,
            has_next_page: page.has_next_page,
        }
    }
}

// =============================================================================
//  ENTRADA
// =============================================================================

#[derive(Debug, Clone, Copy, InputObject)]
pub struct GeoPointInput {
    pub lat: f64,
    pub lng: f64,
}

impl From<GeoPointInput> for GeoPoint {
    fn from(input: GeoPointInput) -> Self {
        GeoPoint::new(input.lat, input.lng)
    }
}

#[derive(Debug, InputObject)]
pub struct CreateContractorInput {
    pub name: String,
    pub legal_name: Option<String>,
    pub inn: Option<String>,
    pub kpp: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub coordinates: Option<GeoPointInput>,
    pub status: Option<ContractorStatus>,
}

impl From<CreateContractorInput> for NewContractor {
    fn from(input: CreateContractorInput) -> Self {
        NewContractor {
            name: input.name,
            legal_name: input.legal_name,
            inn: input.inn,
            kpp: input.kpp,
            email: input.email,
            phone: input.phone,
            address: input.address,
            coordinates: input.coordinates.map(GeoPoint::from),
            status: input.status,
        }
    }
}

// Campos ausentes sobrescrevem com nulo; nome e status não podem ser nulos no registro
#[derive(Debug, InputObject)]
pub struct UpdateContractorInput {
    pub id: ID,
    pub name: String,
    pub legal_name: Option<String>,
    pub inn: Option<String>,
    pub kpp: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub coordinates: Option<GeoPointInput>,
    pub status: ContractorStatus,
}

impl UpdateContractorInput {
    pub(crate) fn into_changes(self) -> Result<(Uuid, ContractorChanges), AppError> {
        let id = parse_id(&self.id)?;
        let changes = ContractorChanges {
            name: self.name,
            legal_name: self.legal_name,
            inn: self.inn,
            kpp: self.kpp,
            email: self.email,
            phone: self.phone,
            address: self.address,
            coordinates: self.coordinates.map(GeoPoint::from),
            status: self.status,
        };
        Ok((id, changes))
    }
}
