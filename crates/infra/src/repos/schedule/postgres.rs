use super::IScheduleRepo;
use nudge_domain::{Metadata, Schedule, ID};
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresScheduleRepo {
    pool: PgPool,
}

impl PostgresScheduleRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ScheduleRaw {
    schedule_uid: Uuid,
    employee_uid: Uuid,
    title: String,
    body: String,
    url: Option<String>,
    every_minutes: i64,
    start_at: i64,
    stop_at: i64,
    timezone: String,
    external_job_id: String,
    active: bool,
    created_by: Uuid,
    metadata: serde_json::Value,
}

impl From<ScheduleRaw> for Schedule {
    fn from(raw: ScheduleRaw) -> Self {
        Self {
            id: raw.schedule_uid.into(),
            employee_id: raw.employee_uid.into(),
            title: raw.title,
            body: raw.body,
            url: raw.url,
            every_minutes: raw.every_minutes,
            start_at: raw.start_at,
            stop_at: raw.stop_at,
            timezone: raw.timezone.parse().unwrap_or(chrono_tz::UTC),
            external_job_id: raw.external_job_id,
            active: raw.active,
            created_by: raw.created_by.into(),
            metadata: serde_json::from_value(raw.metadata).unwrap_or_default(),
        }
    }
}

fn metadata_json(metadata: &Metadata) -> serde_json::Value {
    serde_json::to_value(metadata).unwrap_or_else(|_| serde_json::json!({}))
}

#[async_trait::async_trait]
impl IScheduleRepo for PostgresScheduleRepo {
    async fn insert(&self, schedule: &Schedule) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO schedules
            (schedule_uid, employee_uid, title, body, url, every_minutes, start_at, stop_at, timezone, external_job_id, active, created_by, metadata)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(schedule.id.inner_ref())
        .bind(schedule.employee_id.inner_ref())
        .bind(&schedule.title)
        .bind(&schedule.body)
        .bind(&schedule.url)
        .bind(schedule.every_minutes)
        .bind(schedule.start_at)
        .bind(schedule.stop_at)
        .bind(schedule.timezone.to_string())
        .bind(&schedule.external_job_id)
        .bind(schedule.active)
        .bind(schedule.created_by.inner_ref())
        .bind(metadata_json(&schedule.metadata))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save(&self, schedule: &Schedule) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE schedules SET
                title = $2,
                body = $3,
                url = $4,
                every_minutes = $5,
                start_at = $6,
                stop_at = $7,
                timezone = $8,
                active = $9,
                metadata = $10
            WHERE schedule_uid = $1
            "#,
        )
        .bind(schedule.id.inner_ref())
        .bind(&schedule.title)
        .bind(&schedule.body)
        .bind(&schedule.url)
        .bind(schedule.every_minutes)
        .bind(schedule.start_at)
        .bind(schedule.stop_at)
        .bind(schedule.timezone.to_string())
        .bind(schedule.active)
        .bind(metadata_json(&schedule.metadata))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, schedule_id: &ID) -> anyhow::Result<Option<Schedule>> {
        let schedule = sqlx::query_as::<_, ScheduleRaw>(
            r#"
            SELECT * FROM schedules
            WHERE schedule_uid = $1
            "#,
        )
        .bind(schedule_id.inner_ref())
        .fetch_optional(&self.pool)
        .await?;
        Ok(schedule.map(|schedule| schedule.into()))
    }

    async fn find_by_employee(&self, employee_id: &ID) -> Vec<Schedule> {
        sqlx::query_as::<_, ScheduleRaw>(
            r#"
            SELECT * FROM schedules
            WHERE employee_uid = $1
            "#,
        )
        .bind(employee_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|schedule| schedule.into())
        .collect()
    }
}
