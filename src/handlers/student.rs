use actix_web::{
    get, post, put,
    web::{self, Json},
    HttpResponse,
};
use serde_json::json;

use super::{removal_cookie, session_cookie};
use crate::errors::ApiError;
use crate::guard;
use crate::middlewares::StudentClaims;
use crate::models::address::{self, AddressKind, NewAddress};
use crate::models::card::{self, CardDetails, CardPatch, NewCard};
use crate::models::{course, student};
use crate::schema::student::{
    EditAddressRequest, EditCardRequest, EditDeliveryAddressRequest, EditStudentProfileRequest,
    NewAddressRequest, NewCardRequest, NewDeliveryAddressRequest, StudentChangePasswordRequest,
};

use crate::schema::{validate_payload, LoginRequest, LoginResponse, MessageResponse, SearchQuery};
use crate::tokens::{self, Principal};
use crate::utils::{hash_password, verify_password};
use crate::GlobalState;

#[post("/login")]
pub async fn student_login(
    data: web::Data<GlobalState>,
    body: Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    validate_payload(&*body)?;

    let student = student::find_student_by_email(&data.pool, &body.email)
        .await?
        .ok_or_else(|| ApiError::auth("Invalid credentials"))?;

    if verify_password(&body.password, &student.password).is_err() {
        return Err(ApiError::auth("Invalid credentials"));
    }

    let token = tokens::issue(
        student.student_id,
        &student.email,
        Principal::Student,
        &data.config.jwt,
    )?;

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(Principal::Student, &token))
        .json(LoginResponse {
            message: "Login successful",
            token,
        }))
}

#[post("/add-credit-card")]
pub async fn add_credit_card(
    data: web::Data<GlobalState>,
    claims: StudentClaims,
    body: Json<NewCardRequest>,
) -> Result<HttpResponse, ApiError> {
    body.check()?;
    guard::ensure_student_owner(&data.pool, body.student_id, claims.0.sub).await?;

    // Answer the common conflict before talking to the vault; the insert
    // re-checks transactionally.
    if card::get_card(&data.pool, body.student_id).await?.is_some() {
        return Err(ApiError::conflict(card::CARD_EXISTS));
    }

    let vaulted = data.vault.tokenize(&body.card_number, &body.cvv).await?;

    card::add_card(
        &data.pool,
        body.student_id,
        NewCard {
            vault_token: vaulted.token,
            card_holder_name: body.card_holder_name.clone(),
            last4: body.last4(),
            expiration_date: body.expiration_date,
            country: body.country.clone(),
            postal_code: body.postal_code.clone(),
        },
    )
    .await?;

    Ok(HttpResponse::Created().json(MessageResponse {
        message: "Credit card added successfully",
    }))
}

#[put("/edit-credit-card")]
pub async fn edit_credit_card(
    data: web::Data<GlobalState>,
    claims: StudentClaims,
    body: Json<EditCardRequest>,
) -> Result<HttpResponse, ApiError> {
    body.check()?;
    guard::ensure_student_owner(&data.pool, body.student_id, claims.0.sub).await?;

    if card::get_card(&data.pool, body.student_id).await?.is_none() {
        return Err(ApiError::not_found(card::NO_CARD));
    }

    let mut patch = CardPatch {
        card_holder_name: body.card_holder_name.clone(),
        expiration_date: body.expiration_date,
        country: body.country.clone(),
        postal_code: body.postal_code.clone(),
        ..CardPatch::default()
    };

    if let (Some(number), Some(cvv)) = (&body.card_number, &body.cvv) {
        let vaulted = data.vault.tokenize(number, cvv).await?;
        patch.vault_token = Some(vaulted.token);
        patch.last4 = Some(number[number.len() - 4..].to_string());
    }

    card::update_card(&data.pool, body.student_id, patch).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Credit card updated successfully",
    }))
}

#[post("/add-billing-address")]
pub async fn add_billing_address(
    data: web::Data<GlobalState>,
    claims: StudentClaims,
    body: Json<NewAddressRequest>,
) -> Result<HttpResponse, ApiError> {
    validate_payload(&*body)?;
    guard::ensure_student_owner(&data.pool, body.student_id, claims.0.sub).await?;

    let student_id = body.student_id;
    address::add_address(
        &data.pool,
        AddressKind::Billing,
        student_id,
        body.into_inner().into(),
    )
    .await?;

    Ok(HttpResponse::Created().json(MessageResponse {
        message: "Billing address added successfully",
    }))
}

#[put("/edit-billing-address")]
pub async fn edit_billing_address(
    data: web::Data<GlobalState>,
    claims: StudentClaims,
    body: Json<EditAddressRequest>,
) -> Result<HttpResponse, ApiError> {
    guard::ensure_student_owner(&data.pool, body.student_id, claims.0.sub).await?;

    if address::get_address(&data.pool, AddressKind::Billing, body.student_id)
        .await?
        .is_none()
    {
        return Err(ApiError::not_found(
            AddressKind::Billing.not_found_message(),
        ));
    }

    let student_id = body.student_id;
    address::update_address(
        &data.pool,
        AddressKind::Billing,
        student_id,
        body.into_inner().into_patch(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Billing address updated successfully",
    }))
}

#[post("/add-delivery-address")]
pub async fn add_delivery_address(
    data: web::Data<GlobalState>,
    claims: StudentClaims,
    body: Json<NewDeliveryAddressRequest>,
) -> Result<HttpResponse, ApiError> {
    guard::ensure_student_owner(&data.pool, body.student_id, claims.0.sub).await?;

    if address::get_address(&data.pool, AddressKind::Delivery, body.student_id)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict(AddressKind::Delivery.conflict_message()));
    }

    if body.copy_billing_address {
        let billing = address::get_address(&data.pool, AddressKind::Billing, body.student_id)
            .await?
            .ok_or_else(|| ApiError::not_found(AddressKind::Billing.not_found_message()))?;

        address::add_address(
            &data.pool,
            AddressKind::Delivery,
            body.student_id,
            NewAddress::from(billing),
        )
        .await?;

        return Ok(HttpResponse::Created().json(MessageResponse {
            message: "Delivery address added successfully (Copied from billing)",
        }));
    }

    let new_address = body.explicit_address()?;
    address::add_address(&data.pool, AddressKind::Delivery, body.student_id, new_address).await?;

    Ok(HttpResponse::Created().json(MessageResponse {
        message: "Delivery address added successfully",
    }))
}

#[put("/edit-delivery-address")]
pub async fn edit_delivery_address(
    data: web::Data<GlobalState>,
    claims: StudentClaims,
    body: Json<EditDeliveryAddressRequest>,
) -> Result<HttpResponse, ApiError> {
    guard::ensure_student_owner(&data.pool, body.student_id, claims.0.sub).await?;

    if address::get_address(&data.pool, AddressKind::Delivery, body.student_id)
        .await?
        .is_none()
    {
        return Err(ApiError::not_found(
            AddressKind::Delivery.not_found_message(),
        ));
    }

    if body.copy_billing_address {
        let billing = address::get_address(&data.pool, AddressKind::Billing, body.student_id)
            .await?
            .ok_or_else(|| ApiError::not_found(AddressKind::Billing.not_found_message()))?;

        address::overwrite_address(
            &data.pool,
            AddressKind::Delivery,
            body.student_id,
            NewAddress::from(billing),
        )
        .await?;

        return Ok(HttpResponse::Ok().json(MessageResponse {
            message: "Delivery address updated successfully (Copied from billing)",
        }));
    }

    let student_id = body.student_id;
    address::update_address(
        &data.pool,
        AddressKind::Delivery,
        student_id,
        body.into_inner().into_patch(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Delivery address updated successfully",
    }))
}

#[put("/edit-profile")]
pub async fn edit_profile(
    data: web::Data<GlobalState>,
    claims: StudentClaims,
    body: Json<EditStudentProfileRequest>,
) -> Result<HttpResponse, ApiError> {
    validate_payload(&*body)?;
    guard::ensure_student_owner(&data.pool, body.student_id, claims.0.sub).await?;

    student::update_student_profile(
        &data.pool,
        body.student_id,
        body.name.as_deref(),
        body.email.as_deref(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Student credentials updated successfully",
    }))
}

#[put("/change-password")]
pub async fn change_password(
    data: web::Data<GlobalState>,
    claims: StudentClaims,
    body: Json<StudentChangePasswordRequest>,
) -> Result<HttpResponse, ApiError> {
    validate_payload(&*body)?;
    body.ensure_passwords_match()?;
    guard::ensure_student_owner(&data.pool, body.student_id, claims.0.sub).await?;

    let password_hash = hash_password(&body.new_password)?;
    student::update_student_password(&data.pool, body.student_id, &password_hash).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Password updated successfully",
    }))
}

#[get("/get-single-student/{student_id}")]
pub async fn get_single_student(
    data: web::Data<GlobalState>,
    claims: StudentClaims,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let student_id = path.into_inner();
    guard::ensure_student_owner(&data.pool, student_id, claims.0.sub).await?;

    let profile = student::get_student_profile(&data.pool, student_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Student not found"))?;

    Ok(HttpResponse::Ok().json(json!({ "student": profile })))
}

#[get("/get-credit-card-details/{student_id}")]
pub async fn get_credit_card_details(
    data: web::Data<GlobalState>,
    claims: StudentClaims,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let student_id = path.into_inner();
    guard::ensure_student_owner(&data.pool, student_id, claims.0.sub).await?;

    let credit_card = card::get_card(&data.pool, student_id)
        .await?
        .map(CardDetails::from);

    Ok(HttpResponse::Ok().json(json!({ "credit_card": credit_card })))
}

#[get("/get-billing-address/{student_id}")]
pub async fn get_billing_address(
    data: web::Data<GlobalState>,
    claims: StudentClaims,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let student_id = path.into_inner();
    guard::ensure_student_owner(&data.pool, student_id, claims.0.sub).await?;

    let billing_address = address::get_address(&data.pool, AddressKind::Billing, student_id).await?;

    Ok(HttpResponse::Ok().json(json!({ "billing_address": billing_address })))
}

#[get("/get-delivery-address/{student_id}")]
pub async fn get_delivery_address(
    data: web::Data<GlobalState>,
    claims: StudentClaims,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let student_id = path.into_inner();
    guard::ensure_student_owner(&data.pool, student_id, claims.0.sub).await?;

    let delivery_address =
        address::get_address(&data.pool, AddressKind::Delivery, student_id).await?;

    Ok(HttpResponse::Ok().json(json!({ "delivery_address": delivery_address })))
}

#[get("/get-student-courses/{student_id}")]
pub async fn get_student_courses(
    data: web::Data<GlobalState>,
    claims: StudentClaims,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let student_id = path.into_inner();
    guard::ensure_student_owner(&data.pool, student_id, claims.0.sub).await?;

    let courses = course::enrolled_courses_with_videos(&data.pool, student_id).await?;

    Ok(HttpResponse::Ok().json(json!({ "courses": courses })))
}

#[get("/get-single-course/{student_id}/{course_id}")]
pub async fn get_single_course(
    data: web::Data<GlobalState>,
    claims: StudentClaims,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse, ApiError> {
    let (student_id, course_id) = path.into_inner();
    guard::ensure_student_owner(&data.pool, student_id, claims.0.sub).await?;

    let course = course::enrolled_course_with_videos(&data.pool, student_id, course_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Course not found for the specified student"))?;

    Ok(HttpResponse::Ok().json(json!({ "course": course })))
}

#[get("/search-courses")]
pub async fn search_courses(
    data: web::Data<GlobalState>,
    _claims: StudentClaims,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, ApiError> {
    let courses = course::search_all_courses(&data.pool, &query.query).await?;
    Ok(HttpResponse::Ok().json(json!({ "courses": courses })))
}

#[post("/student-logout")]
pub async fn student_logout(_claims: StudentClaims) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok()
        .cookie(removal_cookie(Principal::Student))
        .json(MessageResponse {
            message: "Logout successful",
        }))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use chrono::NaiveDate;

    use crate::errors::ErrorBody;
    use crate::schema::student::{NewCardRequest, StudentChangePasswordRequest};
    use crate::test_init_app::{init, TestTokens};
    use crate::tokens::Principal;

    #[actix_web::test]
    async fn change_password_rejects_mismatched_confirmation() {
        let app = init().await;
        let token = TestTokens::valid(Principal::Student, 1, "s@example.com");

        let body = StudentChangePasswordRequest {
            student_id: 1,
            new_password: "first".to_string(),
            confirm_new_password: "second".to_string(),
        };

        let res = test::TestRequest::put()
            .set_json(body)
            .append_header(("Authorization", format!("Bearer {token}")))
            .uri("/api/students/change-password")
            .send_request(&app)
            .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: ErrorBody = test::read_body_json(res).await;
        assert_eq!(body.error, "Passwords do not match");
    }

    #[actix_web::test]
    async fn add_credit_card_rejects_a_luhn_invalid_number() {
        let app = init().await;
        let token = TestTokens::valid(Principal::Student, 1, "s@example.com");

        let body = NewCardRequest {
            student_id: 1,
            card_number: "4242424242424241".to_string(),
            card_holder_name: "Someone".to_string(),
            expiration_date: NaiveDate::from_ymd_opt(2027, 1, 1).unwrap(),
            cvv: "123".to_string(),
            country: "US".to_string(),
            postal_code: "94000".to_string(),
        };

        let res = test::TestRequest::post()
            .set_json(body)
            .append_header(("Authorization", format!("Bearer {token}")))
            .uri("/api/students/add-credit-card")
            .send_request(&app)
            .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: ErrorBody = test::read_body_json(res).await;
        assert_eq!(body.error, "card_number must be a valid card number");
    }

    #[actix_web::test]
    async fn student_routes_reject_teacher_tokens() {
        let app = init().await;
        let token = TestTokens::valid(Principal::Teacher, 1, "t@example.com");

        let res = test::TestRequest::get()
            .uri("/api/students/get-billing-address/1")
            .append_header(("Authorization", format!("Bearer {token}")))
            .send_request(&app)
            .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: ErrorBody = test::read_body_json(res).await;
        assert_eq!(body.error, "Access token is not valid");
    }
}
