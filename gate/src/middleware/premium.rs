use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    web,
};
use access::{AccessState, resolve_access_for};
use chrono::Utc;
use common::{
    error::{AppError, Res},
    jwt::JwtClaims,
};
use sqlx::PgPool;
use std::{future::Future, pin::Pin, rc::Rc, sync::Arc};

/// Rejects callers without trial or premium access with 403. The resolved
/// [`AccessState`] is left in the request extensions for handlers.
///
/// Must run inside the auth middleware, which provides the claims.
pub struct PremiumGate {}

impl PremiumGate {
    pub fn new() -> Self {
        PremiumGate {}
    }
}

impl Default for PremiumGate {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, B> Transform<S, ServiceRequest> for PremiumGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Transform = PremiumGateService<S>;
    type InitError = ();
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(PremiumGateService {
            service: Rc::new(service),
        }))
    }
}

pub struct PremiumGateService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for PremiumGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = Rc::clone(&self.service);
        let claims = req.extensions().get::<JwtClaims>().cloned();
        let pool = req.app_data::<web::Data<Arc<PgPool>>>().cloned();

        Box::pin(async move {
            let Some(claims) = claims else {
                return Ok(req.error_response(AppError::Unauthorized(
                    "Authentication required".to_string(),
                )));
            };
            let Some(pool) = pool else {
                return Ok(req.error_response(AppError::Internal(
                    "Database pool missing from app data".to_string(),
                )));
            };

            let pg_pool: &PgPool = &pool;
            let state = match db::subscription::get_by_user_id(pg_pool, claims.user_id).await {
                Ok(record) => resolve_access_for(record.as_ref(), Utc::now()),
                Err(e) => return Ok(req.error_response(e)),
            };

            if let Err(e) = admit(&state) {
                log::debug!("User {} denied premium route {}", claims.user_id, req.path());
                return Ok(req.error_response(e));
            }

            req.extensions_mut().insert(state);
            srv.call(req).await.map(|res| res.map_into_boxed_body())
        })
    }
}

fn admit(state: &AccessState) -> Res<()> {
    if state.access_level.has_access() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Premium access required. Your trial has ended.".to_string(),
        ))
    }
}
