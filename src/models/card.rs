use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{Pool, Postgres};

use super::conflict_on_unique;
use crate::errors::ApiError;

pub const CARD_EXISTS: &str = "A credit card is already associated with this student";
pub const NO_CARD: &str = "No credit card associated with this student";

/// What the database holds: a vault reference plus displayable scraps. The
/// PAN and CVV only ever exist inside the external vault.
#[derive(Debug, sqlx::FromRow)]
pub struct StoredCard {
    pub student_id: i64,
    pub vault_token: String,
    pub card_holder_name: String,
    pub last4: String,
    pub expiration_date: NaiveDate,
    pub country: String,
    pub postal_code: String,
}

/// What leaves the server. The vault token is an internal credential and is
/// not part of any response.
#[derive(Debug, Serialize)]
pub struct CardDetails {
    pub card_holder_name: String,
    pub last4: String,
    pub expiration_date: NaiveDate,
    pub country: String,
    pub postal_code: String,
}

impl From<StoredCard> for CardDetails {
    fn from(card: StoredCard) -> Self {
        CardDetails {
            card_holder_name: card.card_holder_name,
            last4: card.last4,
            expiration_date: card.expiration_date,
            country: card.country,
            postal_code: card.postal_code,
        }
    }
}

#[derive(Debug)]
pub struct NewCard {
    pub vault_token: String,
    pub card_holder_name: String,
    pub last4: String,
    pub expiration_date: NaiveDate,
    pub country: String,
    pub postal_code: String,
}

#[derive(Debug, Default)]
pub struct CardPatch {
    pub vault_token: Option<String>,
    pub last4: Option<String>,
    pub card_holder_name: Option<String>,
    pub expiration_date: Option<NaiveDate>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
}

pub async fn get_card(
    pool: &Pool<Postgres>,
    student_id: i64,
) -> Result<Option<StoredCard>, ApiError> {
    let card = sqlx::query_as::<_, StoredCard>(
        "SELECT student_id, vault_token, card_holder_name, last4, expiration_date, \
         country, postal_code FROM credit_cards WHERE student_id = $1",
    )
    .bind(student_id)
    .fetch_optional(pool)
    .await?;

    Ok(card)
}

pub async fn add_card(
    pool: &Pool<Postgres>,
    student_id: i64,
    card: NewCard,
) -> Result<(), ApiError> {
    let mut tx = pool.begin().await?;

    let existing =
        sqlx::query_scalar::<_, i64>("SELECT student_id FROM credit_cards WHERE student_id = $1")
            .bind(student_id)
            .fetch_optional(&mut *tx)
            .await?;

    if existing.is_some() {
        return Err(ApiError::conflict(CARD_EXISTS));
    }

    sqlx::query(
        "INSERT INTO credit_cards (student_id, vault_token, card_holder_name, last4, \
         expiration_date, country, postal_code) VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(student_id)
    .bind(&card.vault_token)
    .bind(&card.card_holder_name)
    .bind(&card.last4)
    .bind(card.expiration_date)
    .bind(&card.country)
    .bind(&card.postal_code)
    .execute(&mut *tx)
    .await
    .map_err(|e| conflict_on_unique(e, CARD_EXISTS))?;

    tx.commit().await?;
    Ok(())
}

pub async fn update_card(
    pool: &Pool<Postgres>,
    student_id: i64,
    patch: CardPatch,
) -> Result<(), ApiError> {
    sqlx::query(
        "UPDATE credit_cards SET \
         vault_token = COALESCE($2, vault_token), \
         last4 = COALESCE($3, last4), \
         card_holder_name = COALESCE($4, card_holder_name), \
         expiration_date = COALESCE($5, expiration_date), \
         country = COALESCE($6, country), \
         postal_code = COALESCE($7, postal_code) \
         WHERE student_id = $1",
    )
    .bind(student_id)
    .bind(&patch.vault_token)
    .bind(&patch.last4)
    .bind(&patch.card_holder_name)
    .bind(patch.expiration_date)
    .bind(&patch.country)
    .bind(&patch.postal_code)
    .execute(pool)
    .await?;

    Ok(())
}
