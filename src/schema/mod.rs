use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::errors::ApiError;

pub mod admin;
pub mod student;
pub mod teacher;

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: String,
}

/// Collapses a `validator` report into the single-message 400 the API
/// speaks, mirroring the one-error-at-a-time behavior of schema validators.
pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), ApiError> {
    payload
        .validate()
        .map_err(|e| ApiError::validation(first_message(&e)))
}

fn first_message(errors: &ValidationErrors) -> String {
    errors
        .to_string()
        .lines()
        .next()
        .unwrap_or("Invalid request payload")
        .to_string()
}

/// Luhn check over an all-digit card number of plausible length.
pub fn is_valid_card_number(number: &str) -> bool {
    if !(13..=19).contains(&number.len()) || !number.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let sum: u32 = number
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                digit
            }
        })
        .sum();

    sum % 10 == 0
}

pub fn is_valid_cvv(cvv: &str) -> bool {
    (3..=4).contains(&cvv.len()) && cvv.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luhn_accepts_known_test_numbers() {
        // Standard network test PANs.
        assert!(is_valid_card_number("4242424242424242"));
        assert!(is_valid_card_number("4111111111111111"));
        assert!(is_valid_card_number("5555555555554444"));
    }

    #[test]
    fn luhn_rejects_mutations_and_junk() {
        assert!(!is_valid_card_number("4242424242424241"));
        assert!(!is_valid_card_number("1234"));
        assert!(!is_valid_card_number("4242-4242-4242-4242"));
        assert!(!is_valid_card_number(""));
    }

    #[test]
    fn cvv_must_be_three_or_four_digits() {
        assert!(is_valid_cvv("123"));
        assert!(is_valid_cvv("1234"));
        assert!(!is_valid_cvv("12"));
        assert!(!is_valid_cvv("12345"));
        assert!(!is_valid_cvv("12a"));
    }

    #[test]
    fn login_request_requires_a_real_email() {
        let bad = LoginRequest {
            email: "not-an-email".to_string(),
            password: "x".to_string(),
        };
        assert!(matches!(
            validate_payload(&bad),
            Err(ApiError::Validation(_))
        ));

        let good = LoginRequest {
            email: "a@b.com".to_string(),
            password: "x".to_string(),
        };
        assert!(validate_payload(&good).is_ok());
    }
}
