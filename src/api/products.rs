use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::store::ProductFilter;

use super::dto::ProductBody;
use super::error::ApiError;
use super::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/products")
            .route("", web::get().to(list))
            .route("", web::post().to(create))
            .route("/{id}", web::get().to(retrieve))
            .route("/{id}", web::put().to(replace))
            .route("/{id}", web::patch().to(update))
            .route("/{id}", web::delete().to(destroy)),
    );
}

#[derive(Debug, Deserialize)]
struct ProductQuery {
    is_active: Option<String>,
}

/// Boolean query flag. Empty means "no filter".
fn parse_flag(raw: Option<&str>) -> Result<Option<bool>, ApiError> {
    match raw.map(str::to_ascii_lowercase).as_deref() {
        None | Some("") => Ok(None),
        Some("true") | Some("1") => Ok(Some(true)),
        Some("false") | Some("0") => Ok(Some(false)),
        Some(other) => Err(ApiError::validation(format!("is_active: \"{other}\" is not a boolean"))),
    }
}

async fn list(state: web::Data<AppState>, query: web::Query<ProductQuery>) -> Result<HttpResponse, ApiError> {
    let filter = ProductFilter {
        is_active: parse_flag(query.is_active.as_deref())?,
    };
    let products = state.store.list_products(&filter).await?;
    Ok(HttpResponse::Ok().json(products))
}

async fn create(state: web::Data<AppState>, body: web::Json<ProductBody>) -> Result<HttpResponse, ApiError> {
    let product = state.products.create(body.into_inner().into_new()?).await?;
    Ok(HttpResponse::Created().json(product))
}

async fn retrieve(state: web::Data<AppState>, id: web::Path<Uuid>) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let product = state
        .store
        .get_product(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product {id} not found")))?;
    Ok(HttpResponse::Ok().json(product))
}

async fn replace(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    body: web::Json<ProductBody>,
) -> Result<HttpResponse, ApiError> {
    let changes = body.into_inner().into_replacement()?;
    let product = state.products.update(id.into_inner(), changes).await?;
    Ok(HttpResponse::Ok().json(product))
}

async fn update(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    body: web::Json<ProductBody>,
) -> Result<HttpResponse, ApiError> {
    let product = state.products.update(id.into_inner(), body.into_inner().into_changes()).await?;
    Ok(HttpResponse::Ok().json(product))
}

async fn destroy(state: web::Data<AppState>, id: web::Path<Uuid>) -> Result<HttpResponse, ApiError> {
    state.products.delete(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::{json, Value};

    use crate::api::testing::{bearer, state};

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag(None).unwrap(), None);
        assert_eq!(parse_flag(Some("")).unwrap(), None);
        assert_eq!(parse_flag(Some("True")).unwrap(), Some(true));
        assert_eq!(parse_flag(Some("0")).unwrap(), Some(false));
        assert!(parse_flag(Some("maybe")).is_err());
    }

    #[actix_web::test]
    async fn test_create_defaults_and_active_filter() {
        let state = state();
        let app = test_app!(state);

        let req = actix_test::TestRequest::post()
            .uri("/products")
            .insert_header(bearer())
            .set_json(json!({"name": "Lamp"}))
            .to_request();
        let lamp: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(lamp["is_active"], true);
        assert_eq!(lamp["stock_quantity"], 0);

        let req = actix_test::TestRequest::post()
            .uri("/products")
            .insert_header(bearer())
            .set_json(json!({"name": "Old lamp", "price": "10.50", "is_active": false}))
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = actix_test::TestRequest::get().uri("/products?is_active=false").to_request();
        let inactive: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(inactive.as_array().unwrap().len(), 1);
        assert_eq!(inactive[0]["name"], "Old lamp");
    }

    #[actix_web::test]
    async fn test_post_requires_name() {
        let state = state();
        let app = test_app!(state);

        let req = actix_test::TestRequest::post()
            .uri("/products")
            .insert_header(bearer())
            .set_json(json!({"price": "5.00"}))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["detail"], "name: This field is required.");
    }

    #[actix_web::test]
    async fn test_malformed_json_is_bad_request() {
        let state = state();
        let app = test_app!(state);

        let req = actix_test::TestRequest::post()
            .uri("/products")
            .insert_header(bearer())
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{not json")
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
}
