use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::store::CustomerFilter;

use super::dto::CustomerBody;
use super::error::ApiError;
use super::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/customers")
            .route("", web::get().to(list))
            .route("", web::post().to(create))
            .route("/{id}", web::get().to(retrieve))
            .route("/{id}", web::put().to(replace))
            .route("/{id}", web::patch().to(update))
            .route("/{id}", web::delete().to(destroy)),
    );
}

#[derive(Debug, Deserialize)]
struct CustomerQuery {
    company_name: Option<String>,
}

async fn list(state: web::Data<AppState>, query: web::Query<CustomerQuery>) -> Result<HttpResponse, ApiError> {
    let filter = CustomerFilter {
        company_name: query.into_inner().company_name.filter(|name| !name.is_empty()),
    };
    let customers = state.store.list_customers(&filter).await?;
    Ok(HttpResponse::Ok().json(customers))
}

async fn create(state: web::Data<AppState>, body: web::Json<CustomerBody>) -> Result<HttpResponse, ApiError> {
    let customer = state.customers.register(body.into_inner().into_new()?).await?;
    Ok(HttpResponse::Created().json(customer))
}

async fn retrieve(state: web::Data<AppState>, id: web::Path<Uuid>) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let customer = state
        .store
        .get_customer(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Customer {id} not found")))?;
    Ok(HttpResponse::Ok().json(customer))
}

async fn replace(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    body: web::Json<CustomerBody>,
) -> Result<HttpResponse, ApiError> {
    let changes = body.into_inner().into_replacement()?;
    let customer = state.customers.update(id.into_inner(), changes).await?;
    Ok(HttpResponse::Ok().json(customer))
}

async fn update(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    body: web::Json<CustomerBody>,
) -> Result<HttpResponse, ApiError> {
    let customer = state.customers.update(id.into_inner(), body.into_inner().into_changes()).await?;
    Ok(HttpResponse::Ok().json(customer))
}

async fn destroy(state: web::Data<AppState>, id: web::Path<Uuid>) -> Result<HttpResponse, ApiError> {
    state.customers.delete(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
