use crate::cli::GridAction;
use crate::context::CliContext;
use crate::output;

pub async fn handle(ctx: &mut CliContext, action: GridAction) -> anyhow::Result<()> {
    match action {
        GridAction::Clear { list_id } => {
            ctx.open_list(&list_id, None);
            let released = ctx.items.clear_grid()?;
            ctx.save()?;
            output::output_success(serde_json::json!({
                "listId": list_id,
                "released": released,
            }))?;
        }
    }
    Ok(())
}
