use serde::Serialize;
use sqlx::{Pool, Postgres};

use super::conflict_on_unique;
use crate::errors::ApiError;

/// Billing and delivery addresses share one shape and one set of queries;
/// only the backing table differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    Billing,
    Delivery,
}

impl AddressKind {
    fn table(&self) -> &'static str {
        match self {
            AddressKind::Billing => "billing_addresses",
            AddressKind::Delivery => "delivery_addresses",
        }
    }

    pub fn not_found_message(&self) -> &'static str {
        match self {
            AddressKind::Billing => "Billing address not found",
            AddressKind::Delivery => "Delivery address not found",
        }
    }

    pub fn conflict_message(&self) -> &'static str {
        match self {
            AddressKind::Billing => "Student already has an address",
            AddressKind::Delivery => "Student already has a delivery address",
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Address {
    pub student_id: i64,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub business_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewAddress {
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub business_name: Option<String>,
}

impl From<Address> for NewAddress {
    fn from(address: Address) -> Self {
        NewAddress {
            address_line1: address.address_line1,
            address_line2: address.address_line2,
            city: address.city,
            state: address.state,
            zip_code: address.zip_code,
            country: address.country,
            business_name: address.business_name,
        }
    }
}

/// Explicitly enumerated optional fields; `None` keeps the stored value.
#[derive(Debug, Default, Clone)]
pub struct AddressPatch {
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub business_name: Option<String>,
}

pub async fn get_address(
    pool: &Pool<Postgres>,
    kind: AddressKind,
    student_id: i64,
) -> Result<Option<Address>, ApiError> {
    let address = sqlx::query_as::<_, Address>(&format!(
        "SELECT student_id, address_line1, address_line2, city, state, zip_code, \
         country, business_name FROM {} WHERE student_id = $1",
        kind.table()
    ))
    .bind(student_id)
    .fetch_optional(pool)
    .await?;

    Ok(address)
}

pub async fn add_address(
    pool: &Pool<Postgres>,
    kind: AddressKind,
    student_id: i64,
    address: NewAddress,
) -> Result<(), ApiError> {
    let mut tx = pool.begin().await?;

    let existing = sqlx::query_scalar::<_, i64>(&format!(
        "SELECT student_id FROM {} WHERE student_id = $1",
        kind.table()
    ))
    .bind(student_id)
    .fetch_optional(&mut *tx)
    .await?;

    if existing.is_some() {
        return Err(ApiError::conflict(kind.conflict_message()));
    }

    sqlx::query(&format!(
        "INSERT INTO {} (student_id, address_line1, address_line2, city, state, \
         zip_code, country, business_name) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        kind.table()
    ))
    .bind(student_id)
    .bind(&address.address_line1)
    .bind(&address.address_line2)
    .bind(&address.city)
    .bind(&address.state)
    .bind(&address.zip_code)
    .bind(&address.country)
    .bind(&address.business_name)
    .execute(&mut *tx)
    .await
    .map_err(|e| conflict_on_unique(e, kind.conflict_message()))?;

    tx.commit().await?;
    Ok(())
}

pub async fn update_address(
    pool: &Pool<Postgres>,
    kind: AddressKind,
    student_id: i64,
    patch: AddressPatch,
) -> Result<(), ApiError> {
    sqlx::query(&format!(
        "UPDATE {} SET \
         address_line1 = COALESCE($2, address_line1), \
         address_line2 = COALESCE($3, address_line2), \
         city = COALESCE($4, city), \
         state = COALESCE($5, state), \
         zip_code = COALESCE($6, zip_code), \
         country = COALESCE($7, country), \
         business_name = COALESCE($8, business_name) \
         WHERE student_id = $1",
        kind.table()
    ))
    .bind(student_id)
    .bind(&patch.address_line1)
    .bind(&patch.address_line2)
    .bind(&patch.city)
    .bind(&patch.state)
    .bind(&patch.zip_code)
    .bind(&patch.country)
    .bind(&patch.business_name)
    .execute(pool)
    .await?;

    Ok(())
}

/// Full overwrite, used when an existing delivery address is refreshed from
/// the billing address.
pub async fn overwrite_address(
    pool: &Pool<Postgres>,
    kind: AddressKind,
    student_id: i64,
    address: NewAddress,
) -> Result<(), ApiError> {
    sqlx::query(&format!(
        "UPDATE {} SET address_line1 = $2, address_line2 = $3, city = $4, state = $5, \
         zip_code = $6, country = $7, business_name = $8 WHERE student_id = $1",
        kind.table()
    ))
    .bind(student_id)
    .bind(&address.address_line1)
    .bind(&address.address_line2)
    .bind(&address.city)
    .bind(&address.state)
    .bind(&address.zip_code)
    .bind(&address.country)
    .bind(&address.business_name)
    .execute(pool)
    .await?;

    Ok(())
}
