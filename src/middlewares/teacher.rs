use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web, Error, HttpMessage,
};

use super::{bearer_or_cookie, TeacherClaims};
use crate::errors::ApiError;
use crate::tokens::{self, Principal};
use crate::GlobalState;

pub async fn teacher_middleware(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let state = req
        .app_data::<web::Data<GlobalState>>()
        .ok_or(ApiError::Internal)?
        .clone();

    let token = bearer_or_cookie(&req, Principal::Teacher)
        .ok_or_else(|| ApiError::auth("No token, authorization denied"))?;

    let claims = tokens::verify(&token, Principal::Teacher, &state.config.jwt)
        .map_err(ApiError::from)?;

    req.extensions_mut().insert(TeacherClaims(claims));
    next.call(req).await
}
