use std::sync::Arc;
use chrono::Utc;
use serde_json::{json, Value};

use shared_config::{AppConfig, StorageBackend};

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub storage_backend: StorageBackend,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            storage_backend: StorageBackend::Memory,
        }
    }
}

impl TestConfig {
    /// Config pointing the Supabase backend at a mock server.
    pub fn with_supabase_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            storage_backend: StorageBackend::Supabase,
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            storage_backend: self.storage_backend,
            server_port: 0,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

/// Request bodies in the wire format clients send.
pub struct SpecialistPayloads;

impl SpecialistPayloads {
    pub fn create(registration_number: &str) -> Value {
        json!({
            "nombre_completo": "Dra. Ana Torres",
            "especialidad": "Cardiología",
            "registro_profesional": registration_number,
            "dias_y_horas_atencion": [
                {
                    "dia": "Lunes",
                    "rangos": [
                        { "inicio": "08:00", "fin": "12:00" },
                        { "inicio": "14:00", "fin": "18:00" }
                    ]
                },
                {
                    "dia": "Miércoles",
                    "rangos": [
                        { "inicio": "09:00", "fin": "13:00" }
                    ]
                }
            ]
        })
    }

    pub fn create_with_schedule(registration_number: &str, schedule: Value) -> Value {
        let mut payload = Self::create(registration_number);
        payload["dias_y_horas_atencion"] = schedule;
        payload
    }
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn specialist_row(id: i64, registration_number: &str, is_active: bool) -> Value {
        json!({
            "id": id,
            "nombre_completo": "Dra. Ana Torres",
            "especialidad": "Cardiología",
            "registro_profesional": registration_number,
            "dias_y_horas_atencion": [
                { "dia": "Lunes", "rangos": [ { "inicio": "08:00", "fin": "12:00" } ] }
            ],
            "is_active": is_active,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        })
    }

    pub fn error_response(message: &str, code: &str) -> Value {
        json!({
            "code": code,
            "message": message,
            "details": null,
            "hint": null
        })
    }
}
