use crate::dtos::SubscriptionDTO;
use nudge_domain::{Subscription, SubscriptionKeys};
use serde::{Deserialize, Serialize};

pub mod set_subscription {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub endpoint: String,
        pub keys: SubscriptionKeys,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub subscription: SubscriptionDTO,
    }

    impl APIResponse {
        pub fn new(subscription: Subscription) -> Self {
            Self {
                subscription: SubscriptionDTO::new(subscription),
            }
        }
    }
}
