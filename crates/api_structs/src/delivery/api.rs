use crate::dtos::{DeliveryDTO, DeliveryMessageDTO};
use nudge_domain::{Delivery, ID};
use serde::{Deserialize, Serialize};

pub mod send_notification {
    use super::*;
    use nudge_domain::Metadata;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub employee_id: ID,
        pub title: String,
        pub body: String,
        pub url: Option<String>,
        pub metadata: Option<Metadata>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub delivery: DeliveryDTO,
        /// Subscriptions the payload was handed to
        pub pushed: usize,
        /// Subscriptions whose dispatch failed (non-fatal)
        pub push_failures: usize,
    }

    impl APIResponse {
        pub fn new(delivery: Delivery, pushed: usize, push_failures: usize) -> Self {
            Self {
                delivery: DeliveryDTO::new(delivery),
                pushed,
                push_failures,
            }
        }
    }
}

pub mod ack_deliveries {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub delivery_ids: Vec<ID>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub matched: i64,
        pub modified: i64,
    }
}

pub mod sweep_deliveries {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        /// Candidate rows examined, enforcement retries included
        pub checked: i64,
        /// Rows whose forced checkout was confirmed this run
        pub forced: i64,
        /// Rows lost to a concurrent ack or sweep
        pub skipped: i64,
    }
}

pub mod get_deliveries {
    use super::*;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct QueryParams {
        pub limit: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub deliveries: Vec<DeliveryMessageDTO>,
    }

    impl APIResponse {
        pub fn new(deliveries: Vec<Delivery>) -> Self {
            Self {
                deliveries: deliveries.into_iter().map(DeliveryMessageDTO::new).collect(),
            }
        }
    }
}
