use nudge_domain::ID;
use reqwest::Client;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutCall {
    pub employee_id: ID,
    pub reason: String,
    pub delivery_id: ID,
}

/// The enforcement collaborator: checks the employee out of attendance on
/// their behalf. The attendance service is expected to be idempotent per
/// delivery id, so the sweep may safely retry a call it could not confirm.
#[async_trait::async_trait]
pub trait ICheckoutService: Send + Sync {
    async fn force_checkout(
        &self,
        employee_id: &ID,
        reason: &str,
        delivery_id: &ID,
    ) -> anyhow::Result<()>;
}

pub struct HttpCheckoutService {
    client: Client,
    base_url: String,
}

impl HttpCheckoutService {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }
}

#[async_trait::async_trait]
impl ICheckoutService for HttpCheckoutService {
    async fn force_checkout(
        &self,
        employee_id: &ID,
        reason: &str,
        delivery_id: &ID,
    ) -> anyhow::Result<()> {
        let res = self
            .client
            .post(format!("{}/force-checkout", self.base_url))
            .json(&CheckoutCall {
                employee_id: employee_id.clone(),
                reason: reason.into(),
                delivery_id: delivery_id.clone(),
            })
            .send()
            .await?;
        if !res.status().is_success() {
            anyhow::bail!(
                "Attendance service rejected force-checkout for delivery: {} with status: {}",
                delivery_id,
                res.status()
            );
        }
        Ok(())
    }
}

/// Checkout fake that records calls, for tests
pub struct InMemoryCheckoutService {
    pub calls: Mutex<Vec<CheckoutCall>>,
    /// Flip to false to simulate an unreachable attendance service
    pub available: AtomicBool,
}

impl InMemoryCheckoutService {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            available: AtomicBool::new(true),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_for(&self, delivery_id: &ID) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.delivery_id == *delivery_id)
            .count()
    }
}

impl Default for InMemoryCheckoutService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ICheckoutService for InMemoryCheckoutService {
    async fn force_checkout(
        &self,
        employee_id: &ID,
        reason: &str,
        delivery_id: &ID,
    ) -> anyhow::Result<()> {
        if !self.available.load(Ordering::SeqCst) {
            anyhow::bail!("Attendance service is unreachable");
        }
        self.calls.lock().unwrap().push(CheckoutCall {
            employee_id: employee_id.clone(),
            reason: reason.into(),
            delivery_id: delivery_id.clone(),
        });
        Ok(())
    }
}
