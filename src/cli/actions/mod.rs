mod run;

use crate::inventory::InventoryOptions;

/// Action enum representing each possible command
#[derive(Debug)]
pub enum Action {
    Inventory(InventoryOptions),
}

impl Action {
    /// Execute the action
    ///
    /// # Errors
    ///
    /// Returns an error if the action fails to execute
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
