use std::sync::Arc;

use tracing::{debug, info};

use lifeline_data::models::{Appointment, BloodRequest, Emergency, HealthRecord, Medicine, Report};
use lifeline_data::repository::{OwnedRecord, RecordRepository, SqliteRecordRepository};
use lifeline_data::database::DatabasePool;

use super::ServiceError;

/// An owned record exposed as an API resource
pub trait Resource: OwnedRecord {
    /// Name used in client-facing messages, e.g. "Medicine"
    const LABEL: &'static str;
}

impl Resource for HealthRecord {
    const LABEL: &'static str = "Record";
}

impl Resource for Medicine {
    const LABEL: &'static str = "Medicine";
}

impl Resource for Appointment {
    const LABEL: &'static str = "Appointment";
}

impl Resource for Report {
    const LABEL: &'static str = "Report";
}

impl Resource for BloodRequest {
    const LABEL: &'static str = "Blood request";
}

impl Resource for Emergency {
    const LABEL: &'static str = "Emergency";
}

/// Create, read, update and delete for one resource, always as its owner
pub struct RecordService<T: Resource> {
    repository: Arc<dyn RecordRepository<T>>,
}

impl<T: Resource> Clone for RecordService<T> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
        }
    }
}

impl<T: Resource> RecordService<T> {
    pub fn new(repository: Arc<dyn RecordRepository<T>>) -> Self {
        Self { repository }
    }

    /// Service over the SQLite repository for `T`
    pub fn sqlite(pool: DatabasePool) -> Self {
        Self::new(Arc::new(SqliteRecordRepository::<T>::new(pool)))
    }

    /// Underlying repository, for services that combine resources
    pub fn repository(&self) -> Arc<dyn RecordRepository<T>> {
        self.repository.clone()
    }

    pub async fn create(&self, user_id: i64, new: T::New) -> Result<T, ServiceError> {
        let record = self.repository.insert(user_id, new).await?;
        info!("Created {} for user {}", T::TABLE, user_id);
        Ok(record)
    }

    pub async fn list(&self, user_id: i64) -> Result<Vec<T>, ServiceError> {
        let records = self.repository.list(user_id, T::DEFAULT_ORDER).await?;
        debug!("Listed {} {} for user {}", records.len(), T::TABLE, user_id);
        Ok(records)
    }

    pub async fn get(&self, user_id: i64, id: i64) -> Result<T, ServiceError> {
        self.repository
            .find(user_id, id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("{} not found", T::LABEL)))
    }

    /// Update the supplied fields; an empty patch is a validation error
    pub async fn update(&self, user_id: i64, id: i64, patch: T::Patch) -> Result<T, ServiceError> {
        self.repository
            .update(user_id, id, patch)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("{} not found or not yours", T::LABEL)))
    }

    /// Delete the row if the caller owns it; succeeds either way
    pub async fn delete(&self, user_id: i64, id: i64) -> Result<(), ServiceError> {
        let removed = self.repository.delete(user_id, id).await?;
        debug!("Delete {} {} for user {}: removed={}", T::TABLE, id, user_id, removed);
        Ok(())
    }
}
