use crate::cli::DragArgs;
use crate::context::CliContext;
use crate::output;
use goat_domain::DragEndEvent;

pub async fn handle(ctx: &mut CliContext, args: DragArgs) -> anyhow::Result<()> {
    ctx.open_list(&args.list_id, None);
    let event = DragEndEvent::new(&args.active, args.over.as_deref());
    let result = ctx.items.handle_drag_end(&event);

    if !result.success {
        let code = result.error_code.map(|c| c.as_str()).unwrap_or("UNKNOWN_ERROR");
        let message = result.error_message.as_deref().unwrap_or("drop rejected");
        output::output_error(&format!("{}: {}", code, message));
    }
    ctx.save()?;
    output::output_success(&result)?;
    Ok(())
}
