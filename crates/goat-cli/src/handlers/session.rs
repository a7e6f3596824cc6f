use crate::cli::SessionAction;
use crate::context::CliContext;
use crate::output;
use goat_domain::calculate_progress;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionSummary<'a> {
    list_id: &'a str,
    list_size: usize,
    matched_count: usize,
    active: bool,
    synced: bool,
    updated_at: String,
}

pub async fn handle(ctx: &mut CliContext, action: SessionAction) -> anyhow::Result<()> {
    match action {
        SessionAction::Open { list_id, size } => {
            let session = ctx.open_list(&list_id, size).clone();
            ctx.save()?;
            output::output_success(&session)?;
        }
        SessionAction::Show { list_id } => match ctx.session(list_id.as_deref()) {
            Ok(session) => output::output_success(session)?,
            Err(e) => output::output_error(&e.to_string()),
        },
        SessionAction::List => {
            let active = ctx.items.active_session_id();
            let state = ctx.items.to_state();
            let summaries: Vec<SessionSummary> = state
                .list_sessions
                .values()
                .map(|session| SessionSummary {
                    list_id: &session.list_id,
                    list_size: session.list_size,
                    matched_count: session.grid.matched_count(),
                    active: active == Some(session.list_id.as_str()),
                    synced: session.synced,
                    updated_at: session.updated_at.to_rfc3339(),
                })
                .collect();
            output::output_list(summaries)?;
        }
        SessionAction::Progress { list_id } => match ctx.session(list_id.as_deref()) {
            Ok(session) => output::output_success(calculate_progress(session.grid.grid_items()))?,
            Err(e) => output::output_error(&e.to_string()),
        },
        SessionAction::Delete { list_id } => {
            if !ctx.items.delete_session(&list_id) {
                output::output_error(&format!("Session not found: {}", list_id));
            }
            ctx.local.clear_session(&list_id)?;
            ctx.save()?;
            output::output_success(serde_json::json!({ "deleted": list_id }))?;
        }
    }
    Ok(())
}
