use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::{NewSpecialist, Specialist, SpecialistChanges, SpecialistFilter};

use super::{RepositoryError, RepositoryResult, SpecialistRepository};

#[derive(Default)]
struct Store {
    next_id: i64,
    records: BTreeMap<i64, Specialist>,
}

impl Store {
    fn registration_taken(&self, registration_number: &str, exclude_id: Option<i64>) -> bool {
        self.records
            .values()
            .any(|record| record.registration_number == registration_number && Some(record.id) != exclude_id)
    }
}

/// Process-local store. Uniqueness is checked under the write lock, so
/// concurrent creates cannot both claim a registration number.
#[derive(Default)]
pub struct InMemorySpecialistRepository {
    store: RwLock<Store>,
}

impl InMemorySpecialistRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SpecialistRepository for InMemorySpecialistRepository {
    async fn list(&self, filter: SpecialistFilter) -> RepositoryResult<Vec<Specialist>> {
        let store = self.store.read().await;
        Ok(store.records.values().filter(|record| filter.matches(record)).cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Specialist> {
        let store = self.store.read().await;
        store.records.get(&id).cloned().ok_or(RepositoryError::NotFound(id))
    }

    async fn find_by_registration_number(
        &self,
        registration_number: &str,
        exclude_id: Option<i64>,
    ) -> RepositoryResult<Option<Specialist>> {
        let store = self.store.read().await;
        Ok(store
            .records
            .values()
            .find(|record| record.registration_number == registration_number && Some(record.id) != exclude_id)
            .cloned())
    }

    async fn create(&self, specialist: NewSpecialist) -> RepositoryResult<Specialist> {
        let mut store = self.store.write().await;

        if store.registration_taken(&specialist.registration_number, None) {
            return Err(RepositoryError::DuplicateRegistration(specialist.registration_number));
        }

        store.next_id += 1;
        let now = Utc::now();
        let record = Specialist {
            id: store.next_id,
            full_name: specialist.full_name,
            specialty: specialist.specialty,
            registration_number: specialist.registration_number,
            schedule: specialist.schedule,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        store.records.insert(record.id, record.clone());
        debug!("Stored specialist {} in memory", record.id);

        Ok(record)
    }

    async fn update(&self, id: i64, changes: &SpecialistChanges) -> RepositoryResult<Specialist> {
        let mut store = self.store.write().await;

        if let Some(registration_number) = &changes.registration_number {
            if store.registration_taken(registration_number, Some(id)) {
                return Err(RepositoryError::DuplicateRegistration(registration_number.clone()));
            }
        }

        let record = store.records.get_mut(&id).ok_or(RepositoryError::NotFound(id))?;
        changes.apply_to(record, Utc::now());

        Ok(record.clone())
    }

    async fn set_active(&self, id: i64, is_active: bool) -> RepositoryResult<Specialist> {
        self.update(id, &SpecialistChanges::activation(is_active)).await
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let mut store = self.store.write().await;
        store.records.remove(&id).map(|_| ()).ok_or(RepositoryError::NotFound(id))
    }
}
