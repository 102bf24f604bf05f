use nudge_domain::Subscription;
use reqwest::Client;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushPayload {
    pub title: String,
    pub body: String,
    pub url: Option<String>,
    pub tag: Option<String>,
}

/// Best-effort push transport. A failed dispatch is the caller's problem to
/// log, never to escalate: the delivery ledger stays authoritative.
#[async_trait::async_trait]
pub trait IPushGateway: Send + Sync {
    async fn dispatch(&self, subscription: &Subscription, payload: &PushPayload)
        -> anyhow::Result<()>;
}

/// Posts the payload to the subscribed endpoint. The transport encryption
/// for the endpoint lives in the downstream push gateway.
pub struct HttpPushGateway {
    client: Client,
}

impl HttpPushGateway {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for HttpPushGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IPushGateway for HttpPushGateway {
    async fn dispatch(
        &self,
        subscription: &Subscription,
        payload: &PushPayload,
    ) -> anyhow::Result<()> {
        let res = self
            .client
            .post(&subscription.endpoint)
            .header("nudge-p256dh", &subscription.keys.p256dh)
            .header("nudge-auth", &subscription.keys.auth)
            .json(payload)
            .send()
            .await?;
        if !res.status().is_success() {
            anyhow::bail!(
                "Push endpoint: {} rejected payload with status: {}",
                subscription.endpoint,
                res.status()
            );
        }
        Ok(())
    }
}

/// Push fake that records dispatches, for tests
pub struct InMemoryPushGateway {
    pub dispatched: Mutex<Vec<(String, PushPayload)>>,
    /// Endpoints that should fail their dispatch
    pub failing_endpoints: Mutex<HashSet<String>>,
}

impl InMemoryPushGateway {
    pub fn new() -> Self {
        Self {
            dispatched: Mutex::new(Vec::new()),
            failing_endpoints: Mutex::new(HashSet::new()),
        }
    }

    pub fn dispatch_count(&self) -> usize {
        self.dispatched.lock().unwrap().len()
    }
}

impl Default for InMemoryPushGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IPushGateway for InMemoryPushGateway {
    async fn dispatch(
        &self,
        subscription: &Subscription,
        payload: &PushPayload,
    ) -> anyhow::Result<()> {
        if self
            .failing_endpoints
            .lock()
            .unwrap()
            .contains(&subscription.endpoint)
        {
            anyhow::bail!("Push endpoint: {} is gone", subscription.endpoint);
        }
        self.dispatched
            .lock()
            .unwrap()
            .push((subscription.endpoint.clone(), payload.clone()));
        Ok(())
    }
}
