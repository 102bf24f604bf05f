use nudge_domain::{Delivery, DeliveryStatus, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryDTO {
    pub id: ID,
    pub schedule_id: Option<ID>,
    pub employee_id: ID,
    pub title: String,
    pub body: String,
    pub url: Option<String>,
    pub status: DeliveryStatus,
    pub sent_at: i64,
    pub acked_at: Option<i64>,
    pub expires_at: Option<i64>,
    pub forced_checkout_at: Option<i64>,
}

impl DeliveryDTO {
    pub fn new(delivery: Delivery) -> Self {
        Self {
            id: delivery.id.clone(),
            schedule_id: delivery.schedule_id.clone(),
            employee_id: delivery.employee_id.clone(),
            title: delivery.title,
            body: delivery.body,
            url: delivery.url,
            status: delivery.status,
            sent_at: delivery.sent_at,
            acked_at: delivery.acked_at,
            expires_at: delivery.expires_at,
            forced_checkout_at: delivery.forced_checkout_at,
        }
    }
}

/// The message shape handed to devices: just what the notification shows
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryMessageDTO {
    pub id: ID,
    pub title: String,
    pub body: String,
    pub url: Option<String>,
    pub sent_at: i64,
}

impl DeliveryMessageDTO {
    pub fn new(delivery: Delivery) -> Self {
        Self {
            id: delivery.id.clone(),
            title: delivery.title,
            body: delivery.body,
            url: delivery.url,
            sent_at: delivery.sent_at,
        }
    }
}
