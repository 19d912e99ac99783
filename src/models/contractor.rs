// src/models/contractor.rs

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// --- ENUMS ---

// Guardado como texto em maiúsculas na coluna `status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, async_graphql::Enum)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContractorStatus {
    #[default]
    Active,
    Inactive,
    Pending,
    Blocked,
}

impl ContractorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractorStatus::Active => "ACTIVE",
            ContractorStatus::Inactive => "INACTIVE",
            ContractorStatus::Pending => "PENDING",
            ContractorStatus::Blocked => "BLOCKED",
        }
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("Status de contraparte desconhecido: '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for ContractorStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(ContractorStatus::Active),
            "INACTIVE" => Ok(ContractorStatus::Inactive),
            "PENDING" => Ok(ContractorStatus::Pending),
            "BLOCKED" => Ok(ContractorStatus::Blocked),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

// --- COORDENADAS ---

/// SRID usado em todas as geometrias gravadas (WGS 84).
pub const SRID: i32 = 4326;

/// Ponto geográfico. No banco vira texto EWKT: `SRID=4326;POINT(<lng> <lat>)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, async_graphql::SimpleObject)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Distância planar em graus, a mesma métrica do `ST_DWithin` sobre `geometry` 4326.
    pub fn planar_distance(&self, other: &GeoPoint) -> f64 {
        (self.lng - other.lng).hypot(self.lat - other.lat)
    }
}

// Formato EWKT, o que fica guardado na coluna `coordinates`
impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SRID={};POINT({} {})", SRID, self.lng, self.lat)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum GeoPointParseError {
    #[error("Geometria não é um POINT: '{0}'")]
    NotAPoint(String),

    #[error("SRID não suportado: {0}")]
    UnsupportedSrid(String),

    #[error("Coordenada inválida: '{0}'")]
    InvalidCoordinate(String),
}

// Aceita "SRID=4326;POINT(x y)" e também "POINT(x y)" sem SRID
impl FromStr for GeoPoint {
    type Err = GeoPointParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        let wkt = match s.split_once(';') {
            Some((srid_part, rest)) => {
                let srid = srid_part
                    .trim()
                    .strip_prefix("SRID=")
                    .ok_or_else(|| GeoPointParseError::NotAPoint(s.to_string()))?;
                if srid.trim() != SRID.to_string() {
                    return Err(GeoPointParseError::UnsupportedSrid(srid.trim().to_string()));
                }
                rest.trim()
            }
            None => s,
        };

        let body = wkt
            .get(..5)
            .filter(|prefix| prefix.eq_ignore_ascii_case("POINT"))
            .map(|_| wkt[5..].trim())
            .and_then(|rest| rest.strip_prefix('('))
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| GeoPointParseError::NotAPoint(s.to_string()))?;

        let mut parts = body.split_whitespace();
        let (Some(x), Some(y), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(GeoPointParseError::InvalidCoordinate(body.to_string()));
        };

        let lng = x
            .parse::<f64>()
            .map_err(|_| GeoPointParseError::InvalidCoordinate(x.to_string()))?;
        let lat = y
            .parse::<f64>()
            .map_err(|_| GeoPointParseError::InvalidCoordinate(y.to_string()))?;

        Ok(GeoPoint { lat, lng })
    }
}

// --- CONTRAPARTE ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contractor {
    pub id: Uuid,
    pub name: String,
    pub legal_name: Option<String>,
    pub inn: Option<String>, // ИНН
    pub kpp: Option<String>, // КПП
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Texto da coluna `coordinates` tal como está gravado.
    pub coordinates: Option<String>,
    pub status: ContractorStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Dados de criação. O id e os timestamps são definidos pelo serviço.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewContractor {
    pub name: String,
    pub legal_name: Option<String>,
    pub inn: Option<String>,
    pub kpp: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub coordinates: Option<GeoPoint>,
    pub status: Option<ContractorStatus>,
}

/// Substituição completa dos campos editáveis. `None` sobrescreve com nulo.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractorChanges {
    pub name: String,
    pub legal_name: Option<String>,
    pub inn: Option<String>,
    pub kpp: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub coordinates: Option<GeoPoint>,
    pub status: ContractorStatus,
}

impl Contractor {
    pub(crate) fn apply(&mut self, changes: ContractorChanges) {
        self.name = changes.name;
        self.legal_name = changes.legal_name;
        self.inn = changes.inn;
        self.kpp = changes.kpp;
        self.email = changes.email;
        self.phone = changes.phone;
        self.address = changes.address;
        self.coordinates = changes.coordinates.map(|point| point.to_string());
        self.status = changes.status;
    }

    /// Ponto extraído do texto gravado. Registros antigos podem guardar outros
    /// formatos; nesse caso o resultado é `None` e o registro continua legível.
    pub fn location(&self) -> Option<GeoPoint> {
        let raw = self.coordinates.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.parse() {
            Ok(point) => Some(point),
            Err(e) => {
                tracing::warn!(id = %self.id, error = %e, "Coordenadas gravadas ignoradas");
                None
            }
        }
    }
}

// --- PAGINAÇÃO ---

// Colunas permitidas para ordenação. Nada vindo do cliente entra no SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, async_graphql::Enum)]
pub enum SortField {
    Name,
    LegalName,
    Inn,
    Status,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::LegalName => "legal_name",
            SortField::Inn => "inn",
            SortField::Status => "status",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, async_graphql::Enum)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRequest {
    pub sort: SortField,
    pub direction: SortDirection,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContractorPage {
    pub items: Vec<Contractor>,
    pub total_count: i64,
    pub has_next_page: bool,
}
