use crate::shared::entity::ID;
use serde::{Deserialize, Serialize};

/// A `Subscription` is one push endpoint owned by one employee device.
/// The endpoint is the unique key: re-registering a known endpoint
/// supersedes the previous owner instead of creating a duplicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub employee_id: ID,
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

/// Opaque transport keys handed to the push gateway. This core never
/// interprets them, the transport cryptography lives in the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}
