//! Persistence interface for specialist records.
//!
//! The service only talks to [`SpecialistRepository`]; which store backs it
//! is decided once at startup from [`AppConfig`].

mod memory;
mod supabase;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use shared_config::{AppConfig, StorageBackend};

use crate::models::{NewSpecialist, Specialist, SpecialistChanges, SpecialistFilter};

pub use memory::InMemorySpecialistRepository;
pub use supabase::SupabaseSpecialistRepository;

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Specialist {0} not found")]
    NotFound(i64),

    #[error("Registration number '{0}' is already in use")]
    DuplicateRegistration(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Implementations must enforce registration-number uniqueness on writes,
/// not only through [`find_by_registration_number`](Self::find_by_registration_number).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpecialistRepository: Send + Sync {
    /// All matching records, ordered by id.
    async fn list(&self, filter: SpecialistFilter) -> RepositoryResult<Vec<Specialist>>;

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Specialist>;

    /// Record holding `registration_number`, ignoring `exclude_id` if given.
    async fn find_by_registration_number(
        &self,
        registration_number: &str,
        exclude_id: Option<i64>,
    ) -> RepositoryResult<Option<Specialist>>;

    /// Inserts an active record with fresh timestamps.
    async fn create(&self, specialist: NewSpecialist) -> RepositoryResult<Specialist>;

    /// Merges `changes` into the record and refreshes `updated_at`.
    async fn update(&self, id: i64, changes: &SpecialistChanges) -> RepositoryResult<Specialist>;

    async fn set_active(&self, id: i64, is_active: bool) -> RepositoryResult<Specialist>;

    async fn delete(&self, id: i64) -> RepositoryResult<()>;
}

pub fn repository_from_config(config: &AppConfig) -> Arc<dyn SpecialistRepository> {
    match config.storage_backend {
        StorageBackend::Memory => {
            info!("Using in-memory specialist storage");
            Arc::new(InMemorySpecialistRepository::new())
        }
        StorageBackend::Supabase => {
            info!("Using Supabase specialist storage at {}", config.supabase_url);
            Arc::new(SupabaseSpecialistRepository::new(config))
        }
    }
}
