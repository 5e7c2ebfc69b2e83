//! The rental request entity.

use chrono::{DateTime, Utc};
use common::{ClientId, RentalRequestId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::RentalStatus;
use crate::error::ValidationError;

/// Maximum length of the string columns.
const MAX_REFERENCE_LEN: usize = 255;

/// Fractional digits kept on `total_price`.
const PRICE_SCALE: u32 = 2;

/// Total digits allowed on `total_price`, fractional digits included.
const PRICE_PRECISION: u32 = 10;

/// A request to rent equipment, as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalRequest {
    pub id: RentalRequestId,
    pub equipment: Option<i64>,
    pub rental: Option<String>,
    pub client: ClientId,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub quantity: Option<i32>,
    pub total_price: Option<Decimal>,
    pub status: RentalStatus,
}

impl RentalRequest {
    /// Builds the stored form of a validated creation payload.
    ///
    /// New requests always start in `pending`.
    pub fn from_new(id: RentalRequestId, new: NewRentalRequest) -> Self {
        Self {
            id,
            equipment: new.equipment,
            rental: new.rental,
            client: new.client,
            start_date: new.start_date,
            end_date: new.end_date,
            quantity: new.quantity,
            total_price: new.total_price,
            status: RentalStatus::Pending,
        }
    }
}

/// Payload for creating a rental request.
///
/// There is no `status` field: whatever a caller sends is ignored and the
/// request starts in `pending`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRentalRequest {
    #[serde(default)]
    pub equipment: Option<i64>,
    #[serde(default)]
    pub rental: Option<String>,
    pub client: ClientId,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub quantity: Option<i32>,
    #[serde(default)]
    pub total_price: Option<Decimal>,
}

impl NewRentalRequest {
    /// Creates a payload with the required fields only.
    pub fn new(client: impl Into<ClientId>, start_date: DateTime<Utc>, end_date: DateTime<Utc>) -> Self {
        Self {
            equipment: None,
            rental: None,
            client: client.into(),
            start_date,
            end_date,
            quantity: None,
            total_price: None,
        }
    }

    /// Sets the equipment reference.
    pub fn with_equipment(mut self, equipment: i64) -> Self {
        self.equipment = Some(equipment);
        self
    }

    /// Sets the rental reference.
    pub fn with_rental(mut self, rental: impl Into<String>) -> Self {
        self.rental = Some(rental.into());
        self
    }

    /// Sets the quantity.
    pub fn with_quantity(mut self, quantity: i32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Sets the total price.
    pub fn with_total_price(mut self, price: Decimal) -> Self {
        self.total_price = Some(price);
        self
    }

    /// Checks field constraints and normalizes the price to two decimals.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        if self.client.is_blank() {
            return Err(ValidationError::ClientRequired);
        }
        if self.client.as_str().chars().count() > MAX_REFERENCE_LEN {
            return Err(ValidationError::FieldTooLong {
                field: "client",
                max: MAX_REFERENCE_LEN,
            });
        }
        if let Some(rental) = &self.rental
            && rental.chars().count() > MAX_REFERENCE_LEN
        {
            return Err(ValidationError::FieldTooLong {
                field: "rental",
                max: MAX_REFERENCE_LEN,
            });
        }
        if self.end_date < self.start_date {
            return Err(ValidationError::InvalidDateRange {
                start_date: self.start_date,
                end_date: self.end_date,
            });
        }
        if let Some(quantity) = self.quantity
            && quantity <= 0
        {
            return Err(ValidationError::InvalidQuantity { quantity });
        }
        if let Some(price) = self.total_price {
            let mut price = price.round_dp(PRICE_SCALE);
            price.rescale(PRICE_SCALE);
            let limit = Decimal::from(10_i64.pow(PRICE_PRECISION - PRICE_SCALE));
            if price.is_sign_negative() || price >= limit {
                return Err(ValidationError::InvalidPrice { price });
            }
            self.total_price = Some(price);
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::{Duration, TimeZone};

    use super::*;

    fn sample() -> NewRentalRequest {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        NewRentalRequest::new("kc-user-1", start, start + Duration::days(3))
    }

    #[test]
    fn test_from_new_starts_pending() {
        let request = RentalRequest::from_new(RentalRequestId::new(1), sample().with_quantity(2));
        assert_eq!(request.status, RentalStatus::Pending);
        assert_eq!(request.quantity, Some(2));
        assert_eq!(request.client.as_str(), "kc-user-1");
    }

    #[test]
    fn test_validate_accepts_minimal_payload() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_client() {
        let mut payload = sample();
        payload.client = ClientId::new("  ");
        assert_eq!(payload.validate(), Err(ValidationError::ClientRequired));
    }

    #[test]
    fn test_validate_rejects_long_rental_reference() {
        let payload = sample().with_rental("r".repeat(256));
        assert!(matches!(
            payload.validate(),
            Err(ValidationError::FieldTooLong { field: "rental", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_inverted_dates() {
        let mut payload = sample();
        std::mem::swap(&mut payload.start_date, &mut payload.end_date);
        assert!(matches!(
            payload.validate(),
            Err(ValidationError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_quantity() {
        let payload = sample().with_quantity(0);
        assert_eq!(
            payload.validate(),
            Err(ValidationError::InvalidQuantity { quantity: 0 })
        );
    }

    #[test]
    fn test_validate_rounds_price_to_cents() {
        let payload = sample()
            .with_total_price(Decimal::from_str("149.999").unwrap())
            .validate()
            .unwrap();
        assert_eq!(payload.total_price, Some(Decimal::from_str("150.00").unwrap()));
    }

    #[test]
    fn test_validate_pads_price_to_two_decimals() {
        for (input, expected) in [("150", "150.00"), ("150.5", "150.50"), ("149.999", "150.00")] {
            let payload = sample()
                .with_total_price(Decimal::from_str(input).unwrap())
                .validate()
                .unwrap();
            assert_eq!(payload.total_price.unwrap().to_string(), expected, "{input}");

            let json = serde_json::to_value(&payload).unwrap();
            assert_eq!(json["total_price"], expected, "{input}");
        }
    }

    #[test]
    fn test_validate_rejects_negative_and_oversized_prices() {
        let negative = sample().with_total_price(Decimal::from_str("-1.00").unwrap());
        assert!(matches!(
            negative.validate(),
            Err(ValidationError::InvalidPrice { .. })
        ));

        let oversized = sample().with_total_price(Decimal::from_str("100000000.00").unwrap());
        assert!(matches!(
            oversized.validate(),
            Err(ValidationError::InvalidPrice { .. })
        ));
    }

    #[test]
    fn test_payload_ignores_status_field() {
        let json = serde_json::json!({
            "client": "kc-user-1",
            "start_date": "2025-03-01T09:00:00Z",
            "end_date": "2025-03-04T09:00:00Z",
            "status": "active"
        });
        let payload: NewRentalRequest = serde_json::from_value(json).unwrap();
        let request = RentalRequest::from_new(RentalRequestId::new(9), payload);
        assert_eq!(request.status, RentalStatus::Pending);
    }
}
