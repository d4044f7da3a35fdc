use std::sync::Arc;

use tracing::{debug, info, warn};

use shared_config::AppConfig;

use crate::models::{
    CreateSpecialistRequest, Specialist, SpecialistError, SpecialistFilter, UpdateSpecialistRequest,
};
use crate::repository::{repository_from_config, RepositoryError, SpecialistRepository};
use crate::services::schedule::validate_weekly_schedule;
use crate::services::validation::{validate_create_request, validate_update_request};

impl From<RepositoryError> for SpecialistError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(id) => SpecialistError::NotFound(id),
            RepositoryError::DuplicateRegistration(number) => SpecialistError::duplicate_registration(&number),
            RepositoryError::Storage(msg) => SpecialistError::Storage(msg),
        }
    }
}

/// Orchestrates validation and persistence. Every check runs before the
/// first write, so a rejected request leaves storage untouched.
pub struct SpecialistService {
    repository: Arc<dyn SpecialistRepository>,
}

impl SpecialistService {
    pub fn new(repository: Arc<dyn SpecialistRepository>) -> Self {
        Self { repository }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(repository_from_config(config))
    }

    pub async fn list(&self, filter: SpecialistFilter) -> Result<Vec<Specialist>, SpecialistError> {
        debug!("Listing specialists with filter: {:?}", filter);
        Ok(self.repository.list(filter).await?)
    }

    pub async fn get(&self, id: i64) -> Result<Specialist, SpecialistError> {
        Ok(self.repository.find_by_id(id).await?)
    }

    pub async fn create(&self, request: CreateSpecialistRequest) -> Result<Specialist, SpecialistError> {
        let specialist = validate_create_request(request).map_err(SpecialistError::Validation)?;

        validate_weekly_schedule(specialist.schedule.as_deref())
            .map_err(|e| SpecialistError::Validation(vec![e.to_error_detail()]))?;

        self.ensure_registration_available(&specialist.registration_number, None).await?;

        let created = self.repository.create(specialist).await?;
        info!("Specialist {} created", created.id);

        Ok(created)
    }

    pub async fn update(&self, id: i64, request: UpdateSpecialistRequest) -> Result<Specialist, SpecialistError> {
        // Unknown ids are reported before the body is looked at.
        self.repository.find_by_id(id).await?;

        let changes = validate_update_request(request).map_err(SpecialistError::Validation)?;

        if let Some(Some(schedule)) = &changes.schedule {
            validate_weekly_schedule(Some(schedule.as_slice()))
                .map_err(|e| SpecialistError::Validation(vec![e.to_error_detail()]))?;
        }

        if let Some(registration_number) = &changes.registration_number {
            self.ensure_registration_available(registration_number, Some(id)).await?;
        }

        let updated = self.repository.update(id, &changes).await?;
        info!("Specialist {} updated", id);

        Ok(updated)
    }

    pub async fn soft_delete(&self, id: i64) -> Result<Specialist, SpecialistError> {
        let specialist = self.repository.set_active(id, false).await?;
        info!("Specialist {} marked inactive", id);
        Ok(specialist)
    }

    pub async fn restore(&self, id: i64) -> Result<Specialist, SpecialistError> {
        let specialist = self.repository.set_active(id, true).await?;
        info!("Specialist {} restored", id);
        Ok(specialist)
    }

    pub async fn hard_delete(&self, id: i64) -> Result<(), SpecialistError> {
        self.repository.delete(id).await?;
        warn!("Specialist {} permanently deleted", id);
        Ok(())
    }

    async fn ensure_registration_available(
        &self,
        registration_number: &str,
        exclude_id: Option<i64>,
    ) -> Result<(), SpecialistError> {
        let existing = self
            .repository
            .find_by_registration_number(registration_number, exclude_id)
            .await?;

        match existing {
            Some(holder) => {
                debug!("Registration number {} already held by specialist {}", registration_number, holder.id);
                Err(SpecialistError::duplicate_registration(registration_number))
            }
            None => Ok(()),
        }
    }
}
