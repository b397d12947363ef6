pub mod config;
pub mod error;
pub mod groupchat;
pub mod intake;
mod logging;
pub mod openai;
pub mod personas;
pub mod pipeline;
pub mod prompt;
pub mod segment;

use config::AppConfig;
use error::{SubmissionFailure, WellbeingError};
use intake::{IntakeForm, IntakeOptions};
use openai::{ApiKey, OpenAIClient};
use pipeline::{generate_support_plan, SupportPlan};
use tauri::Manager;
use uuid::Uuid;

/// Read-only app state. Submission results are returned, never stored here.
pub struct AppState {
    config: AppConfig,
}

// ============ Intake ============

#[tauri::command]
fn get_intake_options() -> IntakeOptions {
    IntakeOptions::build()
}

#[tauri::command]
async fn submit_intake(
    state: tauri::State<'_, AppState>,
    api_key: String,
    form: IntakeForm,
) -> Result<SupportPlan, SubmissionFailure> {
    let session_id = Uuid::new_v4().to_string();
    submit_intake_internal(&state.config, api_key, &form, &session_id).await
}

/// The single error boundary: every pipeline failure becomes one generic failure.
async fn submit_intake_internal(
    config: &AppConfig,
    api_key: String,
    form: &IntakeForm,
    session_id: &str,
) -> Result<SupportPlan, SubmissionFailure> {
    let api_key = match ApiKey::parse(api_key) {
        Some(key) => key,
        None => {
            logging::log_intake(Some(session_id), "Submission rejected: no API key entered");
            return Err(SubmissionFailure::missing_credential());
        }
    };

    logging::log_session(Some(session_id), "Submission started");

    // The client owns the key and is dropped when this call returns.
    let result = match OpenAIClient::new(api_key, config) {
        Ok(client) => generate_support_plan(&client, config, form, session_id).await,
        Err(e) => Err(e),
    };

    result.map_err(|e: WellbeingError| {
        logging::log_error(Some(session_id), &format!("Submission failed: {}", e));
        SubmissionFailure::from(e)
    })
}

#[tauri::command]
async fn check_api_key(
    state: tauri::State<'_, AppState>,
    api_key: String,
) -> Result<bool, SubmissionFailure> {
    let api_key = ApiKey::parse(api_key).ok_or_else(SubmissionFailure::missing_credential)?;
    let client = OpenAIClient::new(api_key, &state.config)?;

    let valid = client.validate_api_key().await?;
    logging::log_intake(None, &format!("API key check: valid={}", valid));
    Ok(valid)
}

// ============ Run ============

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    if let Err(e) = logging::init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
    }
    if let Ok(removed) = logging::cleanup_old_logs() {
        if removed > 0 {
            logging::log_session(None, &format!("Removed {} old log files", removed));
        }
    }

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        logging::log_error(None, &format!("{}; using defaults", e));
        AppConfig::default()
    });

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(move |app| {
            logging::log_session(
                None,
                &format!("App initialized: model={} max_round={}", config.model, config.max_round),
            );
            app.manage(AppState { config });
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            get_intake_options,
            submit_intake,
            check_api_key,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
