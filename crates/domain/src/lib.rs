mod delivery;
mod schedule;
mod shared;
mod subscription;

pub use delivery::{
    Delivery, DeliveryStatus, InvalidStatusError, ACK_WINDOW_MILLIS, FORCED_CHECKOUT_REASON,
};
pub use schedule::{validate_http_url, Recurrence, Schedule};
pub use shared::entity::{Entity, InvalidIDError, ID};
pub use shared::metadata::{Metadata, MetadataSizeError};
pub use subscription::{Subscription, SubscriptionKeys};
