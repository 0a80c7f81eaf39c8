use super::Action;
use log::debug;

/// Execute the action's business logic by delegating to the appropriate module
pub async fn execute(action: Action) -> anyhow::Result<()> {
    match action {
        Action::Inventory(options) => {
            let summary = crate::inventory::run(&options).await?;
            debug!("{summary:?}");
            Ok(())
        }
    }
}
