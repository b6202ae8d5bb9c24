use std::collections::HashMap;

use actix_web::{web, HttpResponse};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::order::{OrderAggregate, OrderStatus};
use crate::store::OrderFilter;

use super::dto::{ItemBody, OrderBody, OrderResponse, StatusBody};
use super::error::ApiError;
use super::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .route("", web::get().to(list))
            .route("", web::post().to(create))
            .route("/{id}", web::get().to(retrieve))
            .route("/{id}", web::put().to(replace))
            .route("/{id}", web::patch().to(update))
            .route("/{id}", web::delete().to(destroy))
            .route("/{id}/status", web::patch().to(change_status))
            .route("/{id}/items/{product_id}", web::put().to(save_item)),
    );
}

#[derive(Debug, Default, Deserialize)]
struct OrderQuery {
    status: Option<String>,
    created_at: Option<String>,
    #[serde(rename = "customer__company_name")]
    customer_company_name: Option<String>,
}

impl OrderQuery {
    /// Empty values are ignored. A bare date on `created_at` selects the
    /// whole UTC day, a timestamp selects that exact instant.
    fn into_filter(self) -> Result<OrderFilter, ApiError> {
        let mut filter = OrderFilter {
            customer_company_name: non_empty(self.customer_company_name),
            ..Default::default()
        };

        if let Some(status) = non_empty(self.status) {
            filter.status = Some(
                status
                    .parse::<OrderStatus>()
                    .map_err(|e| ApiError::validation(format!("status: {e}")))?,
            );
        }

        if let Some(raw) = non_empty(self.created_at) {
            if let Ok(day) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
                filter.created_on = Some(day);
            } else {
                filter.created_at = Some(parse_instant(&raw)?);
            }
        }

        Ok(filter)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ApiError::validation(format!("created_at: \"{raw}\" is not a valid date or time")))
}

/// Attach `customer_detail` to each order with a single catalog lookup.
async fn with_customers(state: &AppState, orders: Vec<OrderAggregate>) -> Result<Vec<OrderResponse>, ApiError> {
    let mut ids: Vec<Uuid> = orders.iter().map(|o| o.customer_id).collect();
    ids.sort();
    ids.dedup();

    let customers: HashMap<Uuid, _> = state
        .store
        .customers_by_ids(&ids)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    Ok(orders
        .into_iter()
        .map(|order| {
            let customer = customers.get(&order.customer_id).cloned();
            OrderResponse::new(order, customer)
        })
        .collect())
}

async fn respond_with(state: &AppState, order: OrderAggregate) -> Result<OrderResponse, ApiError> {
    let customer = state.store.get_customer(order.customer_id).await?;
    Ok(OrderResponse::new(order, customer))
}

async fn list(state: web::Data<AppState>, query: web::Query<OrderQuery>) -> Result<HttpResponse, ApiError> {
    let filter = query.into_inner().into_filter()?;
    let orders = state.store.list_orders(&filter).await?;
    Ok(HttpResponse::Ok().json(with_customers(&state, orders).await?))
}

async fn create(state: web::Data<AppState>, body: web::Json<OrderBody>) -> Result<HttpResponse, ApiError> {
    let order = state.orders.create(body.into_inner().into_draft()?).await?;
    Ok(HttpResponse::Created().json(respond_with(&state, order).await?))
}

async fn retrieve(state: web::Data<AppState>, id: web::Path<Uuid>) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let order = state
        .store
        .get_order(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Order {id} not found")))?;
    Ok(HttpResponse::Ok().json(respond_with(&state, order).await?))
}

async fn replace(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    body: web::Json<OrderBody>,
) -> Result<HttpResponse, ApiError> {
    let revision = body.into_inner().into_replacement()?;
    let order = state.orders.revise(id.into_inner(), revision).await?;
    Ok(HttpResponse::Ok().json(respond_with(&state, order).await?))
}

async fn update(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    body: web::Json<OrderBody>,
) -> Result<HttpResponse, ApiError> {
    let revision = body.into_inner().into_revision()?;
    let order = state.orders.revise(id.into_inner(), revision).await?;
    Ok(HttpResponse::Ok().json(respond_with(&state, order).await?))
}

async fn destroy(state: web::Data<AppState>, id: web::Path<Uuid>) -> Result<HttpResponse, ApiError> {
    state.orders.delete(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn change_status(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    body: web::Json<StatusBody>,
) -> Result<HttpResponse, ApiError> {
    let order = state.orders.change_status(id.into_inner(), body.status()?).await?;
    Ok(HttpResponse::Ok().json(respond_with(&state, order).await?))
}

async fn save_item(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<ItemBody>,
) -> Result<HttpResponse, ApiError> {
    let (id, product_id) = path.into_inner();
    let order = state.orders.save_item(id, product_id, body.quantity).await?;
    Ok(HttpResponse::Ok().json(respond_with(&state, order).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rust_decimal::Decimal;
    use serde_json::{json, Value};

    use crate::api::testing::{bearer, state, state_with};
    use crate::domain::order::TransitionPolicy;
    use crate::store::InMemoryStore;

    fn decimal(value: &Value) -> Decimal {
        Decimal::from_str(value.as_str().unwrap()).unwrap()
    }

    macro_rules! post {
        ($app:expr, $uri:expr, $body:expr) => {{
            let req = actix_test::TestRequest::post()
                .uri($uri)
                .insert_header(bearer())
                .set_json($body)
                .to_request();
            let value: Value = actix_test::call_and_read_body_json(&$app, req).await;
            value
        }};
    }

    #[test]
    fn test_created_at_filter_forms() {
        let by_day = OrderQuery {
            created_at: Some("2024-03-05".to_string()),
            ..Default::default()
        }
        .into_filter()
        .unwrap();
        assert_eq!(by_day.created_on, NaiveDate::from_ymd_opt(2024, 3, 5));
        assert!(by_day.created_at.is_none());

        let exact = OrderQuery {
            created_at: Some("2024-03-05T10:00:00Z".to_string()),
            ..Default::default()
        }
        .into_filter()
        .unwrap();
        assert!(exact.created_on.is_none());
        assert!(exact.created_at.is_some());

        let bad = OrderQuery {
            status: Some("lost".to_string()),
            ..Default::default()
        }
        .into_filter();
        assert!(matches!(bad, Err(ApiError::Validation(_))));
    }

    #[actix_web::test]
    async fn test_order_lifecycle_over_http() {
        let state = state();
        let app = test_app!(state);

        let customer = post!(app, "/customers", json!({"email": "c@example.com", "company_name": "Acme"}));
        let laptop = post!(app, "/products", json!({"name": "Laptop", "price": "100000.00", "stock_quantity": 10}));
        let monitor = post!(app, "/products", json!({"name": "Monitor", "price": "5000.00", "stock_quantity": 10}));

        let order = post!(
            app,
            "/orders",
            json!({
                "customer": customer["id"],
                "items": [
                    {"product": laptop["id"], "quantity": 2},
                    {"product": monitor["id"]}
                ]
            })
        );

        assert_eq!(order["status"], "draft");
        assert_eq!(decimal(&order["total"]), Decimal::from(206640));
        assert_eq!(decimal(&order["shipping_cost"]), Decimal::ZERO);
        assert_eq!(order["customer_detail"]["company_name"], "Acme");
        assert_eq!(order["items"][1]["quantity"], 1);
        assert_eq!(decimal(&order["items"][0]["subtotal"]), Decimal::from(200000));

        let order_uri = format!("/orders/{}", order["id"].as_str().unwrap());

        let req = actix_test::TestRequest::patch()
            .uri(&format!("{order_uri}/status"))
            .insert_header(bearer())
            .set_json(json!({"status": "confirmed"}))
            .to_request();
        let confirmed: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(confirmed["status"], "confirmed");

        let req = actix_test::TestRequest::put()
            .uri(&format!("{order_uri}/items/{}", monitor["id"].as_str().unwrap()))
            .insert_header(bearer())
            .set_json(json!({"quantity": 4}))
            .to_request();
        let saved: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(saved["items"][1]["quantity"], 4);

        // Confirmed order: the item write decrements stock.
        let req = actix_test::TestRequest::get()
            .uri(&format!("/products/{}", monitor["id"].as_str().unwrap()))
            .to_request();
        let monitor_now: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(monitor_now["stock_quantity"], 6);

        let req = actix_test::TestRequest::get().uri("/orders?status=confirmed&customer__company_name=Acme").to_request();
        let listed: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let req = actix_test::TestRequest::get().uri("/orders?status=draft").to_request();
        let listed: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert!(listed.as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_unknown_status_value_is_bad_request() {
        let state = state();
        let app = test_app!(state);

        let req = actix_test::TestRequest::get().uri("/orders?status=lost").to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_strict_policy_rejects_regression() {
        let state = state_with(Arc::new(InMemoryStore::new()), TransitionPolicy::Strict);
        let app = test_app!(state);

        let customer = post!(app, "/customers", json!({"email": "s@example.com"}));
        let order = post!(app, "/orders", json!({"customer": customer["id"], "status": "shipped", "items": []}));

        let req = actix_test::TestRequest::patch()
            .uri(&format!("/orders/{}/status", order["id"].as_str().unwrap()))
            .insert_header(bearer())
            .set_json(json!({"status": "draft"}))
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_unknown_references() {
        let state = state();
        let app = test_app!(state);

        let req = actix_test::TestRequest::post()
            .uri("/orders")
            .insert_header(bearer())
            .set_json(json!({"customer": Uuid::now_v7(), "items": []}))
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = actix_test::TestRequest::get().uri(&format!("/orders/{}", Uuid::now_v7())).to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }
}
