// src/handlers/graphql.rs

pub mod types;

use async_graphql::{
    extensions::Tracing, http::GraphiQLSource, Context, EmptySubscription, ErrorExtensions,
    Object, Schema, ID,
};
use axum::response::{Html, IntoResponse};

use crate::{
    common::error::AppError,
    models::contractor::{ContractorStatus, GeoPoint, PageRequest, SortDirection, SortField},
    services::ContractorService,
};
use types::{
    parse_id, wrap, ContractorObject, ContractorPageObject, CreateContractorInput,
    UpdateContractorInput,
};

pub type ContractorSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub const DEFAULT_PAGE_SIZE: i32 = 20;

pub fn build_schema(service: ContractorService) -> ContractorSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(service)
        .extension(Tracing)
        .finish()
}

fn service<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a ContractorService> {
    ctx.data::<ContractorService>()
}

fn gql(err: AppError) -> async_graphql::Error {
    err.extend()
}

// GET /graphql
pub async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

// =============================================================================
//  QUERIES
// =============================================================================

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn contractors(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<ContractorObject>> {
        tracing::debug!("GraphQL: contractors");
        let found = service(ctx)?.list().await.map_err(gql)?;
        Ok(wrap(found))
    }

    async fn contractor(
        &self,
        ctx: &Context<'_>,
        id: ID,
    ) -> async_graphql::Result<Option<ContractorObject>> {
        tracing::debug!(id = %id.as_str(), "GraphQL: contractor");
        let id = parse_id(&id).map_err(gql)?;
        let found = service(ctx)?.get_by_id(id).await.map_err(gql)?;
        Ok(found.map(ContractorObject))
    }

    async fn contractors_by_status(
        &self,
        ctx: &Context<'_>,
        status: ContractorStatus,
    ) -> async_graphql::Result<Vec<ContractorObject>> {
        tracing::debug!(status = status.as_str(), "GraphQL: contractorsByStatus");
        let found = service(ctx)?.list_by_status(status).await.map_err(gql)?;
        Ok(wrap(found))
    }

    async fn search_contractors(
        &self,
        ctx: &Context<'_>,
        name: String,
    ) -> async_graphql::Result<Vec<ContractorObject>> {
        tracing::debug!(%name, "GraphQL: searchContractors");
        let found = service(ctx)?.search_by_name(&name).await.map_err(gql)?;
        Ok(wrap(found))
    }

    async fn nearby_contractors(
        &self,
        ctx: &Context<'_>,
        lat: f64,
        lng: f64,
        radius: f64,
    ) -> async_graphql::Result<Vec<ContractorObject>> {
        tracing::debug!(lat, lng, radius, "GraphQL: nearbyContractors");
        let found = service(ctx)?
            .nearby(GeoPoint::new(lat, lng), radius)
            .await
            .map_err(gql)?;
        Ok(wrap(found))
    }

    async fn active_contractors(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<Vec<ContractorObject>> {
        tracing::debug!("GraphQL: activeContractors");
        let found = service(ctx)?.list_active().await.map_err(gql)?;
        Ok(wrap(found))
    }

    async fn contractor_by_inn(
        &self,
        ctx: &Context<'_>,
        inn: String,
    ) -> async_graphql::Result<Option<ContractorObject>> {
        tracing::debug!(%inn, "GraphQL: contractorByInn");
        let found = service(ctx)?.find_by_inn(&inn).await.map_err(gql)?;
        Ok(found.map(ContractorObject))
    }

    async fn contractor_by_email(
        &self,
        ctx: &Context<'_>,
        email: String,
    ) -> async_graphql::Result<Option<ContractorObject>> {
        tracing::debug!(%email, "GraphQL: contractorByEmail");
        let found = service(ctx)?.find_by_email(&email).await.map_err(gql)?;
        Ok(found.map(ContractorObject))
    }

    async fn contractor_exists_by_inn(
        &self,
        ctx: &Context<'_>,
        inn: String,
    ) -> async_graphql::Result<bool> {
        tracing::debug!(%inn, "GraphQL: contractorExistsByInn");
        service(ctx)?.exists_by_inn(&inn).await.map_err(gql)
    }

    async fn contractor_exists_by_email(
        &self,
        ctx: &Context<'_>,
        email: String,
    ) -> async_graphql::Result<bool> {
        tracing::debug!(%email, "GraphQL: contractorExistsByEmail");
        service(ctx)?.exists_by_email(&email).await.map_err(gql)
    }

    /// Ordenação só pelas colunas do enum `SortField`.
    async fn contractors_page(
        &self,
        ctx: &Context<'_>,
        #[graphql(default_with = "SortField::CreatedAt")] sort_by: SortField,
        #[graphql(default_with = "SortDirection::Desc")] direction: SortDirection,
        #[graphql(default_with = "DEFAULT_PAGE_SIZE")] limit: i32,
        #[graphql(default = 0)] offset: i32,
    ) -> async_graphql::Result<ContractorPageObject> {
        tracing::debug!(?sort_by, ?direction, limit, offset, "GraphQL: contractorsPage");
        let request = PageRequest {
            sort: sort_by,
            direction,
            limit: i64::from(limit.max(0)),
            offset: i64::from(offset.max(0)),
        };
        let page = service(ctx)?.page(request).await.map_err(gql)?;
        Ok(page.into())
    }
}

// =============================================================================
//  MUTATIONS
// =============================================================================

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create_contractor(
        &self,
        ctx: &Context<'_>,
        input: CreateContractorInput,
    ) -> async_graphql::Result<ContractorObject> {
        tracing::debug!(name = %input.name, "GraphQL: createContractor");
        let created = service(ctx)?.create(input.into()).await.map_err(gql)?;
        Ok(ContractorObject(created))
    }

    /// Retorna null quando o id não existe.
    async fn update_contractor(
        &self,
        ctx: &Context<'_>,
        input: UpdateContractorInput,
    ) -> async_graphql::Result<Option<ContractorObject>> {
        tracing::debug!(id = %input.id.as_str(), "GraphQL: updateContractor");
        let (id, changes) = input.into_changes().map_err(gql)?;
        let updated = service(ctx)?.update(id, changes).await.map_err(gql)?;
        Ok(updated.map(ContractorObject))
    }

    /// `false` para qualquer falha na remoção; a causa fica só no log.
    async fn delete_contractor(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<bool> {
        tracing::debug!(id = %id.as_str(), "GraphQL: deleteContractor");
        let id = parse_id(&id).map_err(gql)?;

        match service(ctx)?.delete(id).await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!(%id, error = ?e, "Falha ao remover contraparte");
                Ok(false)
            }
        }
    }
}
