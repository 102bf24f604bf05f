use super::ISubscriptionRepo;
use crate::repos::shared::inmemory_repo::*;
use nudge_domain::{Subscription, ID};

pub struct InMemorySubscriptionRepo {
    subscriptions: std::sync::Mutex<Vec<Subscription>>,
}

impl InMemorySubscriptionRepo {
    pub fn new() -> Self {
        Self {
            subscriptions: std::sync::Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemorySubscriptionRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ISubscriptionRepo for InMemorySubscriptionRepo {
    async fn upsert(&self, subscription: &Subscription) -> anyhow::Result<()> {
        let updated = update_many(
            &self.subscriptions,
            |existing| existing.endpoint == subscription.endpoint,
            |existing| *existing = subscription.clone(),
        );
        if updated == 0 {
            insert(subscription, &self.subscriptions);
        }
        Ok(())
    }

    async fn find_by_employee(&self, employee_id: &ID) -> Vec<Subscription> {
        find_by(&self.subscriptions, |subscription| {
            subscription.employee_id == *employee_id
        })
    }
}
