use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::{debug, error};

use shared_config::AppConfig;
use shared_database::{DatabaseError, SupabaseClient};

use crate::models::{fields, NewSpecialist, Specialist, SpecialistChanges, SpecialistFilter};

use super::{RepositoryError, RepositoryResult, SpecialistRepository};

const TABLE_PATH: &str = "/rest/v1/specialists";

/// `specialists` table behind Supabase's PostgREST API.
///
/// The table carries a UNIQUE constraint on `registro_profesional`; PostgREST
/// reports violations as HTTP 409.
pub struct SupabaseSpecialistRepository {
    supabase: SupabaseClient,
}

impl SupabaseSpecialistRepository {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    fn rows_to_specialists(rows: Vec<Value>) -> RepositoryResult<Vec<Specialist>> {
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(|e| RepositoryError::Storage(e.to_string())))
            .collect()
    }

    fn first_row(rows: Vec<Value>, id: i64) -> RepositoryResult<Specialist> {
        Self::rows_to_specialists(rows)?
            .into_iter()
            .next()
            .ok_or(RepositoryError::NotFound(id))
    }

    fn map_write_error(err: DatabaseError, registration_number: Option<&str>) -> RepositoryError {
        match (err, registration_number) {
            (DatabaseError::Conflict(_), Some(number)) => RepositoryError::DuplicateRegistration(number.to_string()),
            (err, _) => {
                error!("Supabase write failed: {}", err);
                RepositoryError::Storage(err.to_string())
            }
        }
    }

    fn patch_body(changes: &SpecialistChanges) -> RepositoryResult<Value> {
        let mut update_data = Map::new();

        if let Some(full_name) = &changes.full_name {
            update_data.insert(fields::FULL_NAME.to_string(), json!(full_name));
        }
        if let Some(specialty) = &changes.specialty {
            update_data.insert(fields::SPECIALTY.to_string(), json!(specialty));
        }
        if let Some(registration_number) = &changes.registration_number {
            update_data.insert(fields::REGISTRATION_NUMBER.to_string(), json!(registration_number));
        }
        if let Some(schedule) = &changes.schedule {
            let schedule = serde_json::to_value(schedule).map_err(|e| RepositoryError::Storage(e.to_string()))?;
            update_data.insert(fields::SCHEDULE.to_string(), schedule);
        }
        if let Some(is_active) = changes.is_active {
            update_data.insert("is_active".to_string(), json!(is_active));
        }

        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        Ok(Value::Object(update_data))
    }

    async fn patch(&self, id: i64, changes: &SpecialistChanges) -> RepositoryResult<Specialist> {
        let body = Self::patch_body(changes)?;
        let path = format!("{}?id=eq.{}", TABLE_PATH, id);

        let rows: Vec<Value> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(body),
            Some(SupabaseClient::representation_headers()),
        ).await
        .map_err(|e| Self::map_write_error(e, changes.registration_number.as_deref()))?;

        Self::first_row(rows, id)
    }
}

fn read_error(err: DatabaseError) -> RepositoryError {
    error!("Supabase read failed: {}", err);
    RepositoryError::Storage(err.to_string())
}

#[async_trait]
impl SpecialistRepository for SupabaseSpecialistRepository {
    async fn list(&self, filter: SpecialistFilter) -> RepositoryResult<Vec<Specialist>> {
        let mut path = format!("{}?order=id.asc", TABLE_PATH);
        if let Some(is_active) = filter.is_active {
            path.push_str(&format!("&is_active=eq.{}", is_active));
        }

        let rows: Vec<Value> = self.supabase.request(Method::GET, &path, None).await.map_err(read_error)?;
        Self::rows_to_specialists(rows)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Specialist> {
        debug!("Fetching specialist: {}", id);

        let path = format!("{}?id=eq.{}", TABLE_PATH, id);
        let rows: Vec<Value> = self.supabase.request(Method::GET, &path, None).await.map_err(read_error)?;

        Self::first_row(rows, id)
    }

    async fn find_by_registration_number(
        &self,
        registration_number: &str,
        exclude_id: Option<i64>,
    ) -> RepositoryResult<Option<Specialist>> {
        let mut path = format!(
            "{}?{}=eq.{}",
            TABLE_PATH,
            fields::REGISTRATION_NUMBER,
            urlencoding::encode(registration_number)
        );
        if let Some(id) = exclude_id {
            path.push_str(&format!("&id=neq.{}", id));
        }
        path.push_str("&limit=1");

        let rows: Vec<Value> = self.supabase.request(Method::GET, &path, None).await.map_err(read_error)?;
        Ok(Self::rows_to_specialists(rows)?.into_iter().next())
    }

    async fn create(&self, specialist: NewSpecialist) -> RepositoryResult<Specialist> {
        debug!("Creating specialist with registration number: {}", specialist.registration_number);

        let now = Utc::now().to_rfc3339();
        let specialist_data = json!({
            (fields::FULL_NAME): specialist.full_name,
            (fields::SPECIALTY): specialist.specialty,
            (fields::REGISTRATION_NUMBER): specialist.registration_number,
            (fields::SCHEDULE): specialist.schedule,
            "is_active": true,
            "created_at": now,
            "updated_at": now
        });

        let rows: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            TABLE_PATH,
            Some(specialist_data),
            Some(SupabaseClient::representation_headers()),
        ).await
        .map_err(|e| Self::map_write_error(e, Some(&specialist.registration_number)))?;

        let created = Self::rows_to_specialists(rows)?
            .into_iter()
            .next()
            .ok_or_else(|| RepositoryError::Storage("Failed to create specialist".to_string()))?;

        debug!("Specialist created successfully with ID: {}", created.id);
        Ok(created)
    }

    async fn update(&self, id: i64, changes: &SpecialistChanges) -> RepositoryResult<Specialist> {
        debug!("Updating specialist: {}", id);
        self.patch(id, changes).await
    }

    async fn set_active(&self, id: i64, is_active: bool) -> RepositoryResult<Specialist> {
        debug!("Setting specialist {} active={}", id, is_active);
        self.patch(id, &SpecialistChanges::activation(is_active)).await
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        debug!("Deleting specialist permanently: {}", id);

        let path = format!("{}?id=eq.{}", TABLE_PATH, id);
        let rows: Vec<Value> = self.supabase.request_with_headers(
            Method::DELETE,
            &path,
            None,
            Some(SupabaseClient::representation_headers()),
        ).await
        .map_err(|e| Self::map_write_error(e, None))?;

        if rows.is_empty() {
            return Err(RepositoryError::NotFound(id));
        }
        Ok(())
    }
}
