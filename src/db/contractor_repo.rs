// src/db/contractor_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::contractor::{Contractor, ContractorStatus, GeoPoint, PageRequest, SRID},
};

/// Acesso à tabela `contractors`. Ausência é `None`/vazio, nunca erro.
#[async_trait]
pub trait ContractorStore: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Contractor>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Contractor>, AppError>;

    /// Substring sem diferenciar maiúsculas, mais recentes primeiro.
    async fn search_by_name(&self, fragment: &str) -> Result<Vec<Contractor>, AppError>;

    async fn find_by_status(&self, status: ContractorStatus) -> Result<Vec<Contractor>, AppError>;

    async fn find_by_inn(&self, inn: &str) -> Result<Option<Contractor>, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Contractor>, AppError>;

    async fn exists_by_inn(&self, inn: &str) -> Result<bool, AppError>;

    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError>;

    /// Status ACTIVE, ordenados por nome.
    async fn find_active(&self) -> Result<Vec<Contractor>, AppError>;

    async fn find_page(&self, page: PageRequest) -> Result<Vec<Contractor>, AppError>;

    async fn count(&self) -> Result<i64, AppError>;

    async fn find_nearby(&self, point: GeoPoint, radius: f64) -> Result<Vec<Contractor>, AppError>;

    async fn insert(&self, contractor: &Contractor) -> Result<Contractor, AppError>;

    /// `None` se a linha sumiu entre a leitura e a escrita.
    async fn update(&self, contractor: &Contractor) -> Result<Option<Contractor>, AppError>;

    /// Retorna quantas linhas foram removidas.
    async fn delete(&self, id: Uuid) -> Result<u64, AppError>;
}

// Linha crua do banco: status e coordenadas ainda em texto
#[derive(Debug, FromRow)]
struct ContractorRow {
    id: Uuid,
    name: String,
    legal_name: Option<String>,
    inn: Option<String>,
    kpp: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    coordinates: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

// Só o status é estrito; coordenadas seguem como texto cru (ver `Contractor::location`)
impl TryFrom<ContractorRow> for Contractor {
    type Error = AppError;

    fn try_from(row: ContractorRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<ContractorStatus>()
            .map_err(|e| AppError::CorruptRow(format!("contractor {}: {}", row.id, e)))?;

        Ok(Contractor {
            id: row.id,
            name: row.name,
            legal_name: row.legal_name,
            inn: row.inn,
            kpp: row.kpp,
            email: row.email,
            phone: row.phone,
            address: row.address,
            coordinates: row.coordinates,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_contractors(rows: Vec<ContractorRow>) -> Result<Vec<Contractor>, AppError> {
    rows.into_iter().map(Contractor::try_from).collect()
}

// Textos que o PostGIS consegue converter em POINT 4326; o resto fica fora da busca por raio
const POINT_PATTERN: &str =
    r"^\s*(SRID=4326;)?\s*POINT\s*\(\s*[-+0-9.eE]+\s+[-+0-9.eE]+\s*\)\s*$";

const COLUMNS: &str = "id, name, legal_name, inn, kpp, email, phone, address, coordinates, status, created_at, updated_at";

/// Monta o SELECT paginado. Coluna e direção vêm de enums fechados;
/// limit/offset entram como parâmetros ($1, $2).
pub(crate) fn page_query(page: &PageRequest) -> String {
    format!(
        "SELECT {COLUMNS} FROM contractors ORDER BY {} {}, id ASC LIMIT $1 OFFSET $2",
        page.sort.column(),
        page.direction.keyword(),
    )
}

#[derive(Clone)]
pub struct PgContractorRepository {
    pool: PgPool,
}

impl PgContractorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContractorStore for PgContractorRepository {
    async fn find_all(&self) -> Result<Vec<Contractor>, AppError> {
        let rows = sqlx::query_as::<_, ContractorRow>(&format!(
            "SELECT {COLUMNS} FROM contractors"
        ))
        .fetch_all(&self.pool)
        .await?;

        into_contractors(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Contractor>, AppError> {
        sqlx::query_as::<_, ContractorRow>(&format!(
            "SELECT {COLUMNS} FROM contractors WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Contractor::try_from)
        .transpose()
    }

    async fn search_by_name(&self, fragment: &str) -> Result<Vec<Contractor>, AppError> {
        // strpos evita que '%' e '_' digitados virem curingas do LIKE
        let rows = sqlx::query_as::<_, ContractorRow>(&format!(
            r#"
            SELECT {COLUMNS} FROM contractors
            WHERE strpos(LOWER(name), LOWER($1)) > 0
            ORDER BY created_at DESC
            "#
        ))
        .bind(fragment)
        .fetch_all(&self.pool)
        .await?;

        into_contractors(rows)
    }

    async fn find_by_status(&self, status: ContractorStatus) -> Result<Vec<Contractor>, AppError> {
        let rows = sqlx::query_as::<_, ContractorRow>(&format!(
            "SELECT {COLUMNS} FROM contractors WHERE status = $1"
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        into_contractors(rows)
    }

    async fn find_by_inn(&self, inn: &str) -> Result<Option<Contractor>, AppError> {
        sqlx::query_as::<_, ContractorRow>(&format!(
            "SELECT {COLUMNS} FROM contractors WHERE inn = $1 ORDER BY created_at ASC LIMIT 1"
        ))
        .bind(inn)
        .fetch_optional(&self.pool)
        .await?
        .map(Contractor::try_from)
        .transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Contractor>, AppError> {
        sqlx::query_as::<_, ContractorRow>(&format!(
            "SELECT {COLUMNS} FROM contractors WHERE email = $1 ORDER BY created_at ASC LIMIT 1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .map(Contractor::try_from)
        .transpose()
    }

    async fn exists_by_inn(&self, inn: &str) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM contractors WHERE inn = $1)")
                .bind(inn)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM contractors WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn find_active(&self) -> Result<Vec<Contractor>, AppError> {
        let rows = sqlx::query_as::<_, ContractorRow>(&format!(
            "SELECT {COLUMNS} FROM contractors WHERE status = $1 ORDER BY name ASC"
        ))
        .bind(ContractorStatus::Active.as_str())
        .fetch_all(&self.pool)
        .await?;

        into_contractors(rows)
    }

    async fn find_page(&self, page: PageRequest) -> Result<Vec<Contractor>, AppError> {
        let rows = sqlx::query_as::<_, ContractorRow>(&page_query(&page))
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;

        into_contractors(rows)
    }

    async fn count(&self) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contractors")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn find_nearby(&self, point: GeoPoint, radius: f64) -> Result<Vec<Contractor>, AppError> {
        let rows = sqlx::query_as::<_, ContractorRow>(&format!(
            r#"
            SELECT {COLUMNS} FROM contractors
            WHERE CASE
                WHEN coordinates ~* '{POINT_PATTERN}' THEN ST_DWithin(
                    ST_SetSRID(coordinates::geometry, $3),
                    ST_SetSRID(ST_MakePoint($1, $2), $3),
                    $4
                )
                ELSE false
            END
            "#
        ))
        .bind(point.lng)
        .bind(point.lat)
        .bind(SRID)
        .bind(radius)
        .fetch_all(&self.pool)
        .await?;

        into_contractors(rows)
    }

    async fn insert(&self, contractor: &Contractor) -> Result<Contractor, AppError> {
        let row = sqlx::query_as::<_, ContractorRow>(&format!(
            r#"
            INSERT INTO contractors (
                id, name, legal_name, inn, kpp, email, phone, address,
                coordinates, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(contractor.id)
        .bind(&contractor.name)
        .bind(&contractor.legal_name)
        .bind(&contractor.inn)
        .bind(&contractor.kpp)
        .bind(&contractor.email)
        .bind(&contractor.phone)
        .bind(&contractor.address)
        .bind(&contractor.coordinates)
        .bind(contractor.status.as_str())
        .bind(contractor.created_at)
        .bind(contractor.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from_write)?;

        Contractor::try_from(row)
    }

    async fn update(&self, contractor: &Contractor) -> Result<Option<Contractor>, AppError> {
        // id e created_at nunca são reescritos
        sqlx::query_as::<_, ContractorRow>(&format!(
            r#"
            UPDATE contractors SET
                name = $2, legal_name = $3, inn = $4, kpp = $5, email = $6,
                phone = $7, address = $8, coordinates = $9, status = $10,
                updated_at = $11
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(contractor.id)
        .bind(&contractor.name)
        .bind(&contractor.legal_name)
        .bind(&contractor.inn)
        .bind(&contractor.kpp)
        .bind(&contractor.email)
        .bind(&contractor.phone)
        .bind(&contractor.address)
        .bind(&contractor.coordinates)
        .bind(contractor.status.as_str())
        .bind(contractor.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from_write)?
        .map(Contractor::try_from)
        .transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM contractors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
