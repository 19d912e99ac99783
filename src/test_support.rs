//! Dublês usados pelos testes unitários: store em memória e relógio controlável.

use std::{
    cmp::Ordering,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ContractorStore,
    models::contractor::{
        Contractor, ContractorStatus, GeoPoint, PageRequest, SortDirection, SortField,
    },
};

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

pub struct MutableClock {
    now: Mutex<DateTime<Utc>>,
}

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().expect("clock lock");
        *now += by;
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}

pub fn fixed_clock() -> Arc<MutableClock> {
    Arc::new(MutableClock::new(fixed_time()))
}

/// Mesma semântica das consultas do `PgContractorRepository`, sem banco.
#[derive(Default)]
pub struct InMemoryContractorStore {
    rows: Mutex<Vec<Contractor>>,
}

impl InMemoryContractorStore {
    pub fn len(&self) -> usize {
        self.rows.lock().expect("store lock").len()
    }

    pub fn snapshot(&self) -> Vec<Contractor> {
        self.rows.lock().expect("store lock").clone()
    }

    /// Grava o texto de coordenadas direto, como faria um registro antigo.
    pub fn set_coordinates(&self, id: Uuid, raw: &str) {
        let mut rows = self.rows.lock().expect("store lock");
        if let Some(row) = rows.iter_mut().find(|c| c.id == id) {
            row.coordinates = Some(raw.to_string());
        }
    }

    fn select(&self, keep: impl Fn(&Contractor) -> bool) -> Vec<Contractor> {
        self.rows
            .lock()
            .expect("store lock")
            .iter()
            .filter(|c| keep(c))
            .cloned()
            .collect()
    }
}

// NULLs por último em ASC, como no Postgres
fn cmp_nullable(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

fn cmp_by(field: SortField, a: &Contractor, b: &Contractor) -> Ordering {
    match field {
        SortField::Name => a.name.cmp(&b.name),
        SortField::LegalName => cmp_nullable(a.legal_name.as_deref(), b.legal_name.as_deref()),
        SortField::Inn => cmp_nullable(a.inn.as_deref(), b.inn.as_deref()),
        SortField::Status => a.status.as_str().cmp(b.status.as_str()),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    }
}

#[async_trait]
impl ContractorStore for InMemoryContractorStore {
    async fn find_all(&self) -> Result<Vec<Contractor>, AppError> {
        Ok(self.select(|_| true))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Contractor>, AppError> {
        Ok(self.select(|c| c.id == id).into_iter().next())
    }

    async fn search_by_name(&self, fragment: &str) -> Result<Vec<Contractor>, AppError> {
        let needle = fragment.to_lowercase();
        let mut found = self.select(|c| c.name.to_lowercase().contains(&needle));
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn find_by_status(&self, status: ContractorStatus) -> Result<Vec<Contractor>, AppError> {
        Ok(self.select(|c| c.status == status))
    }

    async fn find_by_inn(&self, inn: &str) -> Result<Option<Contractor>, AppError> {
        let mut found = self.select(|c| c.inn.as_deref() == Some(inn));
        found.sort_by_key(|c| c.created_at);
        Ok(found.into_iter().next())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Contractor>, AppError> {
        let mut found = self.select(|c| c.email.as_deref() == Some(email));
        found.sort_by_key(|c| c.created_at);
        Ok(found.into_iter().next())
    }

    async fn exists_by_inn(&self, inn: &str) -> Result<bool, AppError> {
        Ok(!self.select(|c| c.inn.as_deref() == Some(inn)).is_empty())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError> {
        Ok(!self.select(|c| c.email.as_deref() == Some(email)).is_empty())
    }

    async fn find_active(&self) -> Result<Vec<Contractor>, AppError> {
        let mut found = self.select(|c| c.status == ContractorStatus::Active);
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    async fn find_page(&self, page: PageRequest) -> Result<Vec<Contractor>, AppError> {
        let mut all = self.select(|_| true);
        all.sort_by(|a, b| {
            let primary = match page.direction {
                SortDirection::Asc => cmp_by(page.sort, a, b),
                SortDirection::Desc => cmp_by(page.sort, b, a),
            };
            primary.then_with(|| a.id.cmp(&b.id))
        });
        Ok(all
            .into_iter()
            .skip(page.offset.max(0) as usize)
            .take(page.limit.max(0) as usize)
            .collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.len() as i64)
    }

    async fn find_nearby(&self, point: GeoPoint, radius: f64) -> Result<Vec<Contractor>, AppError> {
        Ok(self.select(|c| {
            c.location()
                .is_some_and(|stored| stored.planar_distance(&point) <= radius)
        }))
    }

    async fn insert(&self, contractor: &Contractor) -> Result<Contractor, AppError> {
        self.rows
            .lock()
            .expect("store lock")
            .push(contractor.clone());
        Ok(contractor.clone())
    }

    async fn update(&self, contractor: &Contractor) -> Result<Option<Contractor>, AppError> {
        let mut rows = self.rows.lock().expect("store lock");
        Ok(rows.iter_mut().find(|c| c.id == contractor.id).map(|row| {
            *row = contractor.clone();
            row.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<u64, AppError> {
        let mut rows = self.rows.lock().expect("store lock");
        let before = rows.len();
        rows.retain(|c| c.id != id);
        Ok((before - rows.len()) as u64)
    }
}

/// Store cujo delete sempre falha, como um banco fora do ar.
#[derive(Default)]
pub struct FailingDeleteStore {
    pub inner: InMemoryContractorStore,
}

#[async_trait]
impl ContractorStore for FailingDeleteStore {
    async fn find_all(&self) -> Result<Vec<Contractor>, AppError> {
        self.inner.find_all().await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Contractor>, AppError> {
        self.inner.find_by_id(id).await
    }

    async fn search_by_name(&self, fragment: &str) -> Result<Vec<Contractor>, AppError> {
        self.inner.search_by_name(fragment).await
    }

    async fn find_by_status(&self, status: ContractorStatus) -> Result<Vec<Contractor>, AppError> {
        self.inner.find_by_status(status).await
    }

    async fn find_by_inn(&self, inn: &str) -> Result<Option<Contractor>, AppError> {
        self.inner.find_by_inn(inn).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Contractor>, AppError> {
        self.inner.find_by_email(email).await
    }

    async fn exists_by_inn(&self, inn: &str) -> Result<bool, AppError> {
        self.inner.exists_by_inn(inn).await
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError> {
        self.inner.exists_by_email(email).await
    }

    async fn find_active(&self) -> Result<Vec<Contractor>, AppError> {
        self.inner.find_active().await
    }

    async fn find_page(&self, page: PageRequest) -> Result<Vec<Contractor>, AppError> {
        self.inner.find_page(page).await
    }

    async fn count(&self) -> Result<i64, AppError> {
        self.inner.count().await
    }

    async fn find_nearby(&self, point: GeoPoint, radius: f64) -> Result<Vec<Contractor>, AppError> {
        self.inner.find_nearby(point, radius).await
    }

    async fn insert(&self, contractor: &Contractor) -> Result<Contractor, AppError> {
        self.inner.insert(contractor).await
    }

    async fn update(&self, contractor: &Contractor) -> Result<Option<Contractor>, AppError> {
        self.inner.update(contractor).await
    }

    async fn delete(&self, _id: Uuid) -> Result<u64, AppError> {
        Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut))
    }
}
