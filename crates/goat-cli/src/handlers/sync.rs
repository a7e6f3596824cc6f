use crate::cli::SyncAction;
use crate::context::CliContext;
use crate::output;
use goat_persistence::{ConflictResolution, SyncEvent};

pub async fn handle(ctx: &mut CliContext, action: SyncAction) -> anyhow::Result<()> {
    match action {
        SyncAction::Run { list_id, debounced } => {
            let service = ctx.sync_service();
            let mut events = service.subscribe();
            let report = if debounced {
                service.scheduled_sync(&list_id).await;
                service.flush().await;
                None
            } else {
                Some(service.perform_sync(&list_id).await?)
            };

            let mut received: Vec<SyncEvent> = Vec::new();
            while let Ok(event) = events.try_recv() {
                tracing::debug!("Received {} event", event.name());
                received.push(event);
            }
            ctx.refresh_backlog(&list_id)?;
            ctx.save()?;
            output::output_success(serde_json::json!({
                "listId": list_id,
                "status": service.status(&list_id).await,
                "report": report,
                "events": received,
            }))?;
        }
        SyncAction::Conflicts { list_id } => {
            let conflicts = ctx.sync_service().check_for_conflicts(&list_id).await?;
            output::output_list(conflicts)?;
        }
        SyncAction::Resolve { list_id, strategy } => {
            let resolution: ConflictResolution = match strategy.parse() {
                Ok(resolution) => resolution,
                Err(e) => output::output_error(&e.to_string()),
            };
            let service = ctx.sync_service();
            service.resolve_conflicts(&list_id, resolution).await?;
            ctx.refresh_backlog(&list_id)?;
            ctx.save()?;
            output::output_success(serde_json::json!({
                "listId": list_id,
                "resolution": resolution,
                "status": service.status(&list_id).await,
            }))?;
        }
    }
    Ok(())
}
