use super::IScheduleRepo;
use crate::repos::shared::inmemory_repo::*;
use nudge_domain::{Schedule, ID};

pub struct InMemoryScheduleRepo {
    schedules: std::sync::Mutex<Vec<Schedule>>,
}

impl InMemoryScheduleRepo {
    pub fn new() -> Self {
        Self {
            schedules: std::sync::Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemoryScheduleRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IScheduleRepo for InMemoryScheduleRepo {
    async fn insert(&self, schedule: &Schedule) -> anyhow::Result<()> {
        insert(schedule, &self.schedules);
        Ok(())
    }

    async fn save(&self, schedule: &Schedule) -> anyhow::Result<()> {
        save(schedule, &self.schedules);
        Ok(())
    }

    async fn find(&self, schedule_id: &ID) -> anyhow::Result<Option<Schedule>> {
        Ok(find(schedule_id, &self.schedules))
    }

    async fn find_by_employee(&self, employee_id: &ID) -> Vec<Schedule> {
        find_by(&self.schedules, |schedule| {
            schedule.employee_id == *employee_id
        })
    }
}
