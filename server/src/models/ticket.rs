use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::event::EventId;
use crate::utils::error::{AppError, AppResult};

pub type TicketId = i64;

/// Prices are stored as `NUMERIC(12, 2)`.
const PRICE_SCALE: u32 = 2;

/// Largest price the price column can hold, 9 999 999 999.99.
fn max_price() -> Decimal {
    Decimal::new(999_999_999_999, PRICE_SCALE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "ticket_type", rename_all = "lowercase")]
pub enum TicketType {
    Free,
    Paid,
    Vip,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub id: TicketId,
    pub event_id: EventId,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub ticket_type: TicketType,
    pub price: Decimal,
    pub quantity: i32,
    pub available_quantity: i32,
}

/// Ticket batch as requested by the caller. `available_quantity` is stored
/// as given, independently of `quantity`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTicket {
    pub event_id: EventId,
    #[serde(rename = "type")]
    pub ticket_type: TicketType,
    pub price: Decimal,
    pub quantity: i32,
    pub available_quantity: i32,
}

impl NewTicket {
    pub fn validate(&self) -> AppResult<()> {
        if self.price.is_sign_negative() {
            return Err(AppError::ValidationError(
                "price must not be negative".to_string(),
            ));
        }
        if self.price.normalize().scale() > PRICE_SCALE {
            return Err(AppError::ValidationError(format!(
                "price must have at most {PRICE_SCALE} decimal places"
            )));
        }
        if self.price > max_price() {
            return Err(AppError::ValidationError(format!(
                "price must not exceed {}",
                max_price()
            )));
        }
        if self.quantity < 0 || self.available_quantity < 0 {
            return Err(AppError::ValidationError(
                "quantities must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_wire_shape() {
        let body = serde_json::json!({
            "event_id": 4,
            "type": "vip",
            "price": 49.5,
            "quantity": 10,
            "available_quantity": 12
        });
        let ticket: NewTicket = serde_json::from_value(body).unwrap();
        assert_eq!(ticket.ticket_type, TicketType::Vip);
        assert_eq!(ticket.price, Decimal::new(495, 1));
        // oversupply is stored as given
        assert!(ticket.validate().is_ok());
    }

    fn priced(price: Decimal) -> NewTicket {
        NewTicket {
            event_id: 1,
            ticket_type: TicketType::Paid,
            price,
            quantity: 1,
            available_quantity: 1,
        }
    }

    #[test]
    fn test_negative_price_rejected() {
        assert!(priced(Decimal::new(-1, 0)).validate().is_err());
    }

    #[test]
    fn test_price_precision_matches_column() {
        assert!(priced(Decimal::new(1999, 2)).validate().is_ok());
        // trailing zeros are not extra precision
        assert!(priced(Decimal::new(19_990, 3)).validate().is_ok());
        assert!(matches!(
            priced(Decimal::new(1999, 3)).validate(),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_price_upper_bound_matches_column() {
        assert!(priced(max_price()).validate().is_ok());
        assert!(matches!(
            priced(max_price() + Decimal::new(1, 2)).validate(),
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            priced(Decimal::new(12_345_678_901_999, 3)).validate(),
            Err(AppError::ValidationError(_))
        ));
    }
}
