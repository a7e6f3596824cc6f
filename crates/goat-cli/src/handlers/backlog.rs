use crate::cli::{BacklogAction, BacklogAddArgs};
use crate::context::CliContext;
use crate::output;
use goat_domain::BacklogItem;
use goat_persistence::ItemGroupsApi;

pub async fn handle(ctx: &mut CliContext, action: BacklogAction) -> anyhow::Result<()> {
    match action {
        BacklogAction::Load { list_id, group } => {
            let fetched = match ctx.api.get_group(&group, true).await {
                Ok(fetched) => fetched,
                Err(e) => output::output_error(&e.to_string()),
            };
            let api_items = fetched.items.clone();
            ctx.local.initialize_from_api(&list_id, &[fetched])?;
            let items = ctx.local.load_group_items(&list_id, &group, api_items)?;
            ctx.refresh_backlog(&list_id)?;
            ctx.save()?;
            output::output_list(items)?;
        }
        BacklogAction::Add(args) => {
            let item = handle_add(ctx, args)?;
            output::output_success(&item)?;
        }
        BacklogAction::Remove { list_id, group, id } => {
            ctx.local.remove_item_locally(&list_id, &group, &id)?;
            ctx.refresh_backlog(&list_id)?;
            ctx.save()?;
            output::output_success(serde_json::json!({ "removed": id, "groupId": group }))?;
        }
        BacklogAction::Items { list_id, group } => {
            let items = ctx.local.get_available_items(&list_id, &group)?;
            output::output_list(items)?;
        }
    }
    Ok(())
}

fn handle_add(ctx: &mut CliContext, args: BacklogAddArgs) -> anyhow::Result<BacklogItem> {
    let mut item = BacklogItem::new(args.id, args.title);
    item.category = args.category;
    item.tags = args.tags;
    ctx.local
        .add_item_locally(&args.list_id, &args.group, item.clone())?;
    ctx.refresh_backlog(&args.list_id)?;
    ctx.save()?;
    Ok(item)
}
