use nudge_domain::{Subscription, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionDTO {
    pub employee_id: ID,
    pub endpoint: String,
}

impl SubscriptionDTO {
    pub fn new(subscription: Subscription) -> Self {
        Self {
            employee_id: subscription.employee_id.clone(),
            endpoint: subscription.endpoint,
        }
    }
}
