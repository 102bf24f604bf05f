use crate::shared::entity::{Entity, ID};
use crate::shared::metadata::Metadata;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// How long the receiving employee has to acknowledge a `Delivery` before
/// the sweep expires it and forces a checkout
pub const ACK_WINDOW_MILLIS: i64 = 1000 * 60 * 15;

/// The reason forwarded to the attendance service when a `Delivery` expires
pub const FORCED_CHECKOUT_REASON: &str = "no acknowledgement within 15 minutes";

/// A `Delivery` is one concrete notification instance sent to one employee.
/// It is the authoritative ledger row for the notify → ack-or-expire →
/// enforce lifecycle: transitions are one-way, `sent → acked` or
/// `sent → expired`, and are always applied as status-guarded writes.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub id: ID,
    pub schedule_id: Option<ID>,
    pub employee_id: ID,
    pub title: String,
    pub body: String,
    pub url: Option<String>,
    pub status: DeliveryStatus,
    pub sent_at: i64,
    pub acked_at: Option<i64>,
    /// Fixed at creation to `sent_at + ACK_WINDOW_MILLIS`, never recomputed
    pub expires_at: Option<i64>,
    /// Set if and only if the forced checkout has been confirmed to run
    /// at least once for this row
    pub forced_checkout_at: Option<i64>,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Acked,
    Expired,
}

impl Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            Self::Sent => "sent",
            Self::Acked => "acked",
            Self::Expired => "expired",
        };
        write!(f, "{}", status)
    }
}

#[derive(Error, Debug)]
pub enum InvalidStatusError {
    #[error("Invalid delivery status: {0}")]
    Unknown(String),
}

impl FromStr for DeliveryStatus {
    type Err = InvalidStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sent" => Ok(Self::Sent),
            "acked" => Ok(Self::Acked),
            "expired" => Ok(Self::Expired),
            _ => Err(InvalidStatusError::Unknown(s.to_string())),
        }
    }
}

impl Delivery {
    pub fn new(
        employee_id: ID,
        schedule_id: Option<ID>,
        title: String,
        body: String,
        url: Option<String>,
        sent_at: i64,
    ) -> Self {
        Self {
            id: ID::new(),
            schedule_id,
            employee_id,
            title,
            body,
            url,
            status: DeliveryStatus::Sent,
            sent_at,
            acked_at: None,
            expires_at: Some(sent_at + ACK_WINDOW_MILLIS),
            forced_checkout_at: None,
            metadata: Default::default(),
        }
    }

    pub fn is_expirable(&self, now: i64) -> bool {
        self.status == DeliveryStatus::Sent
            && self.expires_at.map(|e| e <= now).unwrap_or(false)
    }
}

impl Entity for Delivery {
    fn id(&self) -> &ID {
        &self.id
    }
}
