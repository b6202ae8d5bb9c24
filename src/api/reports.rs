use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use serde::Deserialize;

use super::error::ApiError;
use super::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/reports/sales", web::get().to(sales));
}

#[derive(Debug, Deserialize)]
struct SalesQuery {
    start: Option<String>,
    end: Option<String>,
}

async fn sales(state: web::Data<AppState>, query: web::Query<SalesQuery>) -> Result<HttpResponse, ApiError> {
    let report = state
        .reports
        .render_sales_report(query.start.as_deref(), query.end.as_deref())
        .await?;

    Ok(HttpResponse::Ok()
        .content_type(report.content_type)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(report.filename)],
        })
        .body(report.bytes))
}

#[cfg(test)]
mod tests {
    use actix_web::http::{header, StatusCode};
    use actix_web::test as actix_test;
    use chrono::Utc;
    use serde_json::Value;

    use crate::api::testing::state;

    #[actix_web::test]
    async fn test_missing_range_is_bad_request() {
        let state = state();
        let app = test_app!(state);

        let req = actix_test::TestRequest::get().uri("/reports/sales?start=2024-01-01").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["detail"], "start and end required");
    }

    #[actix_web::test]
    async fn test_invalid_date_is_bad_request() {
        let state = state();
        let app = test_app!(state);

        let req = actix_test::TestRequest::get()
            .uri("/reports/sales?start=yesterday&end=2024-01-31")
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_pdf_download() {
        let state = state();
        let app = test_app!(state);
        let today = Utc::now().date_naive();

        let req = actix_test::TestRequest::get()
            .uri(&format!("/reports/sales?start={today}&end={today}"))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "application/pdf");

        let disposition = resp.headers().get(header::CONTENT_DISPOSITION).unwrap().to_str().unwrap();
        assert!(disposition.starts_with("attachment"));
        assert!(disposition.contains(&format!("sales_{today}_{today}.pdf")));

        let body = actix_test::read_body(resp).await;
        assert!(body.starts_with(b"%PDF"));
    }
}
