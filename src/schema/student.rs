use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{is_valid_card_number, is_valid_cvv, validate_payload};
use crate::errors::ApiError;
use crate::models::address::{AddressPatch, NewAddress};

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct NewCardRequest {
    pub student_id: i64,
    pub card_number: String,
    #[validate(length(min = 1))]
    pub card_holder_name: String,
    pub expiration_date: NaiveDate,
    pub cvv: String,
    #[validate(length(min = 1))]
    pub country: String,
    #[validate(length(min = 1))]
    pub postal_code: String,
}

impl NewCardRequest {
    pub fn check(&self) -> Result<(), ApiError> {
        validate_payload(self)?;
        if !is_valid_card_number(&self.card_number) {
            return Err(ApiError::validation("card_number must be a valid card number"));
        }
        if !is_valid_cvv(&self.cvv) {
            return Err(ApiError::validation("cvv must be 3 or 4 digits"));
        }
        Ok(())
    }

    pub fn last4(&self) -> String {
        self.card_number[self.card_number.len() - 4..].to_string()
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct EditCardRequest {
    pub student_id: i64,
    pub card_number: Option<String>,
    pub card_holder_name: Option<String>,
    pub expiration_date: Option<NaiveDate>,
    pub cvv: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
}

impl EditCardRequest {
    /// The number and CVV travel to the vault as a pair; updating one
    /// without the other cannot be tokenized.
    pub fn check(&self) -> Result<(), ApiError> {
        match (&self.card_number, &self.cvv) {
            (Some(number), Some(cvv)) => {
                if !is_valid_card_number(number) {
                    return Err(ApiError::validation(
                        "card_number must be a valid card number",
                    ));
                }
                if !is_valid_cvv(cvv) {
                    return Err(ApiError::validation("cvv must be 3 or 4 digits"));
                }
                Ok(())
            }
            (None, None) => Ok(()),
            _ => Err(ApiError::validation(
                "card_number and cvv must be supplied together",
            )),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct NewAddressRequest {
    pub student_id: i64,
    #[validate(length(min = 1))]
    pub address_line1: String,
    pub address_line2: Option<String>,
    #[validate(length(min = 1))]
    pub city: String,
    #[validate(length(min = 1))]
    pub state: String,
    #[validate(length(min = 1))]
    pub zip_code: String,
    #[validate(length(min = 1))]
    pub country: String,
    pub business_name: Option<String>,
}

impl From<NewAddressRequest> for NewAddress {
    fn from(req: NewAddressRequest) -> Self {
        NewAddress {
            address_line1: req.address_line1,
            address_line2: req.address_line2,
            city: req.city,
            state: req.state,
            zip_code: req.zip_code,
            country: req.country,
            business_name: req.business_name,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct EditAddressRequest {
    pub student_id: i64,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub business_name: Option<String>,
}

impl EditAddressRequest {
    pub fn into_patch(self) -> AddressPatch {
        AddressPatch {
            address_line1: self.address_line1,
            address_line2: self.address_line2,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            country: self.country,
            business_name: self.business_name,
        }
    }
}

/// Delivery addresses come in two flavors: copied from billing, or spelled
/// out. The address fields are only mandatory in the second case.
#[derive(Debug, Deserialize, Serialize)]
pub struct NewDeliveryAddressRequest {
    pub student_id: i64,
    pub copy_billing_address: bool,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub business_name: Option<String>,
}

impl NewDeliveryAddressRequest {
    pub fn explicit_address(&self) -> Result<NewAddress, ApiError> {
        let required = |field: &Option<String>, name: &str| {
            field
                .clone()
                .filter(|value| !value.is_empty())
                .ok_or_else(|| ApiError::validation(format!("{name} is required")))
        };

        Ok(NewAddress {
            address_line1: required(&self.address_line1, "address_line1")?,
            address_line2: self.address_line2.clone(),
            city: required(&self.city, "city")?,
            state: required(&self.state, "state")?,
            zip_code: required(&self.zip_code, "zip_code")?,
            country: required(&self.country, "country")?,
            business_name: self.business_name.clone(),
        })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct EditDeliveryAddressRequest {
    pub student_id: i64,
    #[serde(default)]
    pub copy_billing_address: bool,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub business_name: Option<String>,
}

impl EditDeliveryAddressRequest {
    pub fn into_patch(self) -> AddressPatch {
        AddressPatch {
            address_line1: self.address_line1,
            address_line2: self.address_line2,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            country: self.country,
            business_name: self.business_name,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct EditStudentProfileRequest {
    pub student_id: i64,
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct StudentChangePasswordRequest {
    pub student_id: i64,
    #[validate(length(min = 1))]
    pub new_password: String,
    pub confirm_new_password: String,
}

impl StudentChangePasswordRequest {
    pub fn ensure_passwords_match(&self) -> Result<(), ApiError> {
        if self.new_password != self.confirm_new_password {
            return Err(ApiError::validation("Passwords do not match"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card_request() -> NewCardRequest {
        NewCardRequest {
            student_id: 1,
            card_number: "4242424242424242".to_string(),
            card_holder_name: "Ada Lovelace".to_string(),
            expiration_date: NaiveDate::from_ymd_opt(2027, 5, 1).unwrap(),
            cvv: "123".to_string(),
            country: "GB".to_string(),
            postal_code: "SW1A 1AA".to_string(),
        }
    }

    #[test]
    fn valid_card_passes_and_exposes_last4() {
        let req = card_request();
        assert!(req.check().is_ok());
        assert_eq!(req.last4(), "4242");
    }

    #[test]
    fn luhn_failure_is_a_validation_error() {
        let req = NewCardRequest {
            card_number: "4242424242424241".to_string(),
            ..card_request()
        };
        assert!(matches!(req.check(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn card_edit_requires_number_and_cvv_together() {
        let req = EditCardRequest {
            student_id: 1,
            card_number: Some("4242424242424242".to_string()),
            card_holder_name: None,
            expiration_date: None,
            cvv: None,
            country: None,
            postal_code: None,
        };
        assert!(matches!(req.check(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn card_edit_without_card_fields_is_fine() {
        let req = EditCardRequest {
            student_id: 1,
            card_number: None,
            card_holder_name: Some("New Name".to_string()),
            expiration_date: None,
            cvv: None,
            country: None,
            postal_code: None,
        };
        assert!(req.check().is_ok());
    }

    #[test]
    fn delivery_address_requires_fields_when_not_copying() {
        let req = NewDeliveryAddressRequest {
            student_id: 1,
            copy_billing_address: false,
            address_line1: Some("1 Main St".to_string()),
            address_line2: None,
            city: None,
            state: Some("CA".to_string()),
            zip_code: Some("94000".to_string()),
            country: Some("US".to_string()),
            business_name: None,
        };

        let err = req.explicit_address().unwrap_err();
        assert_eq!(err.to_string(), "city is required");
    }

    #[test]
    fn delivery_address_with_all_fields_converts() {
        let req = NewDeliveryAddressRequest {
            student_id: 1,
            copy_billing_address: false,
            address_line1: Some("1 Main St".to_string()),
            address_line2: None,
            city: Some("Springfield".to_string()),
            state: Some("CA".to_string()),
            zip_code: Some("94000".to_string()),
            country: Some("US".to_string()),
            business_name: None,
        };

        let address = req.explicit_address().unwrap();
        assert_eq!(address.city, "Springfield");
    }
}
