use std::collections::HashSet;
use std::future::{ready, Ready};
use std::sync::Arc;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::{header, Method};
use actix_web::{Error, ResponseError};
use futures_util::future::LocalBoxFuture;

use super::error::ApiError;

// ============================================================================
// Staff-or-read-only access
// ============================================================================
//
// GET, HEAD and OPTIONS are open. Everything else needs
// `Authorization: Bearer <token>` with a configured staff token.
//
// ============================================================================

const SAFE_METHODS: [Method; 3] = [Method::GET, Method::HEAD, Method::OPTIONS];

#[derive(Clone, Default)]
pub struct StaffOrReadOnly {
    tokens: Arc<HashSet<String>>,
}

impl StaffOrReadOnly {
    pub fn new(tokens: impl IntoIterator<Item = String>) -> Self {
        Self {
            tokens: Arc::new(tokens.into_iter().collect()),
        }
    }

    fn authorize(&self, req: &ServiceRequest) -> Result<(), ApiError> {
        if SAFE_METHODS.contains(req.method()) {
            return Ok(());
        }

        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(ApiError::Unauthenticated)?;

        if self.tokens.contains(token) {
            Ok(())
        } else {
            tracing::warn!(method = %req.method(), path = %req.path(), "Rejected unknown staff token");
            Err(ApiError::Forbidden)
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for StaffOrReadOnly
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = StaffOrReadOnlyMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(StaffOrReadOnlyMiddleware {
            service,
            policy: self.clone(),
        }))
    }
}

pub struct StaffOrReadOnlyMiddleware<S> {
    service: S,
    policy: StaffOrReadOnly,
}

impl<S, B> Service<ServiceRequest> for StaffOrReadOnlyMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if let Err(err) = self.policy.authorize(&req) {
            let response = req.into_response(err.error_response()).map_into_right_body();
            return Box::pin(async move { Ok(response) });
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test as actix_test;
    use actix_web::{web, App, HttpResponse};

    async fn ok() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    #[actix_web::test]
    async fn test_safe_and_unsafe_methods() {
        let app = actix_test::init_service(
            App::new()
                .wrap(StaffOrReadOnly::new(vec!["s3cret".to_string()]))
                .route("/things", web::get().to(ok))
                .route("/things", web::post().to(ok)),
        )
        .await;

        let resp = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/things").to_request()).await;
        assert_eq!(resp.status(), 200);

        let resp = actix_test::call_service(&app, actix_test::TestRequest::post().uri("/things").to_request()).await;
        assert_eq!(resp.status(), 401);

        let req = actix_test::TestRequest::post()
            .uri("/things")
            .insert_header((header::AUTHORIZATION, "Bearer wrong"))
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), 403);

        let req = actix_test::TestRequest::post()
            .uri("/things")
            .insert_header((header::AUTHORIZATION, "Basic s3cret"))
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), 401);

        let req = actix_test::TestRequest::post()
            .uri("/things")
            .insert_header((header::AUTHORIZATION, "Bearer s3cret"))
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), 200);
    }

    #[actix_web::test]
    async fn test_no_configured_tokens_means_read_only() {
        let app = actix_test::init_service(
            App::new()
                .wrap(StaffOrReadOnly::default())
                .route("/things", web::delete().to(ok)),
        )
        .await;

        let req = actix_test::TestRequest::delete()
            .uri("/things")
            .insert_header((header::AUTHORIZATION, "Bearer anything"))
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), 403);
    }
}
