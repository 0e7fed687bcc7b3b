use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web, Error, HttpMessage,
};

use super::{bearer_or_cookie, AdminClaims};
use crate::errors::ApiError;
use crate::tokens::{self, Principal};
use crate::GlobalState;

pub async fn admin_middleware(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let state = req
        .app_data::<web::Data<GlobalState>>()
        .ok_or(ApiError::Internal)?
        .clone();

    let token = bearer_or_cookie(&req, Principal::Admin)
        .ok_or_else(|| ApiError::auth("No token, authorization denied"))?;

    let claims = tokens::verify(&token, Principal::Admin, &state.config.jwt)
        .map_err(ApiError::from)?;

    req.extensions_mut().insert(AdminClaims(claims));
    next.call(req).await
}
