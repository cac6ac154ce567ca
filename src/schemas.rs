use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = String;

/// Stored identity record. Never returned to clients: handlers only ever
/// hand out tokens, so `secret_hash` stays inside the service.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub secret_hash: String,
    pub date: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Expense {
    pub id: String,
    pub owner: UserId,
    pub title: String,
    pub amount: f64,
    pub category: Category,
    pub date: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum Category {
    Food,
    Transport,
    Shopping,
    Bills,
    Others,
    General,
}

impl Default for Category {
    fn default() -> Self {
        Category::General
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Debt {
    pub id: String,
    pub owner: UserId,
    #[serde(rename = "friendName")]
    pub friend_name: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub direction: Direction,
    pub status: Status,
    pub date: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum Direction {
    #[serde(rename = "To Receive")]
    ToReceive,
    #[serde(rename = "To Pay")]
    ToPay,
}

/// `Pending` is the sole initial state and `Settled` is terminal: the only
/// transition the API exposes is the one-way settle operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum Status {
    Pending,
    Settled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_uses_wire_labels() {
        assert_eq!(
            serde_json::to_string(&Direction::ToReceive).unwrap(),
            "\"To Receive\""
        );
        assert_eq!(
            serde_json::from_str::<Direction>("\"To Pay\"").unwrap(),
            Direction::ToPay
        );
    }

    #[test]
    fn unknown_direction_label_is_rejected() {
        assert!(serde_json::from_str::<Direction>("\"Sideways\"").is_err());
    }

    #[test]
    fn unknown_category_label_is_rejected() {
        assert!(serde_json::from_str::<Category>("\"Gambling\"").is_err());
        assert_eq!(
            serde_json::from_str::<Category>("\"Food\"").unwrap(),
            Category::Food
        );
    }

    #[test]
    fn debt_serializes_with_client_field_names() {
        let debt = Debt {
            id: "6543".to_owned(),
            owner: "1234".to_owned(),
            friend_name: "Raj".to_owned(),
            amount: 200.0,
            direction: Direction::ToReceive,
            status: Status::Pending,
            date: Utc::now(),
        };
        let json = serde_json::to_value(&debt).unwrap();
        assert_eq!(json["friendName"], "Raj");
        assert_eq!(json["type"], "To Receive");
        assert_eq!(json["status"], "Pending");
    }
}
