use crate::config::AppConfig;
use crate::error::Result;
use crate::groupchat::GroupChat;
use crate::intake::IntakeForm;
use crate::logging;
use crate::openai::ChatBackend;
use crate::prompt::build_task;
use crate::segment::{segment, SegmentStrategy, SessionOutput};
use serde::Serialize;

/// Immutable result of one submission, handed straight to the renderer.
#[derive(Debug, Clone, Serialize)]
pub struct SupportPlan {
    pub session_id: String,
    pub sections: SessionOutput,
    pub unparsed: Vec<String>,
    pub strategy: SegmentStrategy,
    pub turn_count: usize,
}

/// Format the form, run the group chat and segment the transcript.
pub async fn generate_support_plan(
    backend: &dyn ChatBackend,
    config: &AppConfig,
    form: &IntakeForm,
    session_id: &str,
) -> Result<SupportPlan> {
    let task = build_task(form);
    logging::log_intake(
        Some(session_id),
        &format!(
            "Task built: sleep={} stress={} support={} symptoms={}",
            form.sleep_hours,
            form.stress_level,
            form.support_system.len(),
            form.symptoms.len()
        ),
    );

    let chat = GroupChat::wellbeing_team(config);
    logging::log_session(
        Some(session_id),
        &format!(
            "Starting group chat: model={} max_round={} selection={}",
            config.model,
            config.max_round,
            config.speaker_selection.as_str()
        ),
    );

    let transcript = chat.run(backend, &task, Some(session_id)).await?;
    let segmented = segment(&transcript);

    logging::log_session(
        Some(session_id),
        &format!(
            "Chat finished: {} turns, {:?} segmentation, {} unparsed fragments",
            transcript.len(),
            segmented.strategy,
            segmented.unparsed.len()
        ),
    );

    Ok(SupportPlan {
        session_id: session_id.to_string(),
        sections: segmented.sections,
        unparsed: segmented.unparsed,
        strategy: segmented.strategy,
        turn_count: transcript.len(),
    })
}
