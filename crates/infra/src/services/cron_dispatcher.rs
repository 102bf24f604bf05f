use nudge_domain::Recurrence;
use reqwest::Client;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// One recurring job as the external cron dispatcher sees it. The
/// `forwarded_headers` are echoed back by the dispatcher on every tick
/// callback, which is how the tick webhook authenticates its caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CronJobRequest {
    pub job_id: String,
    pub destination_url: String,
    pub recurrence: Recurrence,
    pub forwarded_headers: HashMap<String, String>,
}

#[async_trait::async_trait]
pub trait ICronDispatcherService: Send + Sync {
    /// Creates or replaces the job with the given `job_id`. Calling this
    /// twice with the same `job_id` must not create a second job.
    async fn create_job(&self, job: &CronJobRequest) -> anyhow::Result<String>;
    async fn delete_job(&self, job_id: &str) -> anyhow::Result<()>;
}

pub struct HttpCronDispatcherService {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpCronDispatcherService {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
        }
    }
}

#[async_trait::async_trait]
impl ICronDispatcherService for HttpCronDispatcherService {
    async fn create_job(&self, job: &CronJobRequest) -> anyhow::Result<String> {
        // PUT keyed on the job id so that retries are idempotent
        let res = self
            .client
            .put(format!("{}/jobs/{}", self.base_url, job.job_id))
            .bearer_auth(&self.api_key)
            .json(job)
            .send()
            .await?;
        if !res.status().is_success() {
            anyhow::bail!(
                "Cron dispatcher rejected job: {} with status: {}",
                job.job_id,
                res.status()
            );
        }
        Ok(job.job_id.clone())
    }

    async fn delete_job(&self, job_id: &str) -> anyhow::Result<()> {
        let res = self
            .client
            .delete(format!("{}/jobs/{}", self.base_url, job_id))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        if !res.status().is_success() {
            anyhow::bail!(
                "Cron dispatcher could not delete job: {} with status: {}",
                job_id,
                res.status()
            );
        }
        Ok(())
    }
}

/// Dispatcher fake that records jobs, for tests
pub struct InMemoryCronDispatcherService {
    pub jobs: Mutex<HashMap<String, CronJobRequest>>,
    /// Flip to false to simulate an unreachable dispatcher
    pub available: AtomicBool,
}

impl InMemoryCronDispatcherService {
    pub fn new() -> Self {
        Self {
            jobs: Mutex::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    pub fn job_count(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }
}

impl Default for InMemoryCronDispatcherService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ICronDispatcherService for InMemoryCronDispatcherService {
    async fn create_job(&self, job: &CronJobRequest) -> anyhow::Result<String> {
        if !self.available.load(Ordering::SeqCst) {
            anyhow::bail!("Cron dispatcher is unreachable");
        }
        self.jobs
            .lock()
            .unwrap()
            .insert(job.job_id.clone(), job.clone());
        Ok(job.job_id.clone())
    }

    async fn delete_job(&self, job_id: &str) -> anyhow::Result<()> {
        if !self.available.load(Ordering::SeqCst) {
            anyhow::bail!("Cron dispatcher is unreachable");
        }
        match self.jobs.lock().unwrap().remove(job_id) {
            Some(_) => Ok(()),
            None => anyhow::bail!("Cron dispatcher has no job: {}", job_id),
        }
    }
}
