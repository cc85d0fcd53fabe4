/// Request logging middleware
///
/// Emits one structured event per request with method, path, status and
/// latency. Failed requests also carry the `error_id` returned to the client.
/// Headers are never logged, so credentials in `Authorization` do not reach
/// the logs.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use std::time::Instant;
use uuid::Uuid;

use crate::error::ErrorId;

pub struct RequestLogger;

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggerService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(RequestLoggerService {
            service: Rc::new(service),
        }))
    }
}

pub struct RequestLoggerService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequestLoggerService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start_time = Instant::now();
        let request_id = Uuid::new_v4();
        let method = req.method().to_string();
        let path = req.path().to_string();

        tracing::debug!(%request_id, %method, %path, "Request started");

        let service = self.service.clone();

        Box::pin(async move {
            let res = service.call(req).await?;

            let status = res.status().as_u16();
            let elapsed_ms = start_time.elapsed().as_millis() as u64;
            let logged_error_id = error_id(&res);
            let error_id = logged_error_id.as_deref();

            if res.status().is_server_error() {
                tracing::error!(%request_id, %method, %path, status, elapsed_ms, error_id, "Request completed");
            } else {
                tracing::info!(%request_id, %method, %path, status, elapsed_ms, error_id, "Request completed");
            }

            Ok(res)
        })
    }
}

fn error_id<B>(res: &ServiceResponse<B>) -> Option<String> {
    res.response()
        .extensions()
        .get::<ErrorId>()
        .map(|id| id.0.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, AuthError};
    use actix_web::{test, web, App, HttpResponse};

    async fn forbidden() -> Result<HttpResponse, AppError> {
        Err(AuthError::Forbidden.into())
    }

    async fn ok() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    #[actix_web::test]
    async fn test_error_id_reaches_the_logger() {
        let app = test::init_service(
            App::new()
                .wrap(RequestLogger)
                .route("/forbidden", web::get().to(forbidden))
                .route("/ok", web::get().to(ok)),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/forbidden").to_request()).await;
        assert_eq!(res.status().as_u16(), 403);
        let logged = error_id(&res).expect("error id missing");

        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["error_id"], logged);

        let res = test::call_service(&app, test::TestRequest::get().uri("/ok").to_request()).await;
        assert!(error_id(&res).is_none());
    }
}
