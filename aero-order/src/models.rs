use aero_core::booking::PassengerType;
use aero_core::{CoreError, CoreResult};
use aero_shared::validate::is_valid_email;
use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct PassengerInput {
    pub title: String,
    pub full_name: String,
    /// adult, child or infant
    #[serde(rename = "type")]
    pub passenger_type: String,
}

/// Booking request as submitted by a customer.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrder {
    pub schedule_id: String,
    /// `YYYY-MM-DD`
    pub flight_date: String,
    #[serde(default)]
    pub cabin_class: String,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub passengers: Vec<PassengerInput>,
}

/// Admin edit of an existing order. Absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateOrder {
    pub status: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

/// Parses `raw` and rejects dates strictly before `today`.
pub fn parse_flight_date(raw: &str, today: NaiveDate) -> CoreResult<NaiveDate> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        CoreError::ValidationError("flight_date must be formatted YYYY-MM-DD".to_string())
    })?;
    if date < today {
        return Err(CoreError::ValidationError(
            "flight_date cannot be in the past".to_string(),
        ));
    }
    Ok(date)
}

pub(crate) fn required(field: &str, raw: &str) -> CoreResult<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(CoreError::ValidationError(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

pub(crate) fn contact_email(raw: &str) -> CoreResult<String> {
    let email = required("contact_email", raw)?;
    if !is_valid_email(&email) {
        return Err(CoreError::ValidationError("contact_email is not a valid email".to_string()));
    }
    Ok(email)
}

/// A validated passenger, not yet bound to an order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PassengerDraft {
    pub title: String,
    pub full_name: String,
    pub passenger_type: PassengerType,
}

pub(crate) fn validate_passengers(inputs: &[PassengerInput]) -> CoreResult<Vec<PassengerDraft>> {
    if inputs.is_empty() {
        return Err(CoreError::ValidationError(
            "at least one passenger is required".to_string(),
        ));
    }
    inputs
        .iter()
        .map(|p| {
            Ok(PassengerDraft {
                title: required("passenger title", &p.title)?,
                full_name: required("passenger full_name", &p.full_name)?,
                passenger_type: p.passenger_type.parse()?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_flight_date_bounds() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert!(parse_flight_date("2025-05-31", today).is_err());
        assert_eq!(parse_flight_date("2025-06-01", today).unwrap(), today);
        assert_eq!(
            parse_flight_date("2025-06-02", today).unwrap(),
            today + Duration::days(1)
        );
    }

    #[test]
    fn test_flight_date_format() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert!(parse_flight_date("01/07/2025", today).is_err());
        assert!(parse_flight_date("", today).is_err());
    }

    #[test]
    fn test_passenger_validation() {
        let ok = PassengerInput {
            title: "Mr".into(),
            full_name: "Budi Santoso".into(),
            passenger_type: "Adult".into(),
        };
        let drafts = validate_passengers(&[ok.clone()]).unwrap();
        assert_eq!(drafts[0].passenger_type, PassengerType::Adult);

        let bad_type = PassengerInput { passenger_type: "senior".into(), ..ok.clone() };
        assert!(validate_passengers(&[bad_type]).is_err());

        let no_name = PassengerInput { full_name: "  ".into(), ..ok };
        assert!(validate_passengers(&[no_name]).is_err());

        assert!(validate_passengers(&[]).is_err());
    }
}
