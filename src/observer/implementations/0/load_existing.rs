// Ring 0: Data Preparation - loads the stored contact the request targets
use async_trait::async_trait;

use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing, Operation};

#[derive(Default)]
pub struct LoadExistingContact;

#[async_trait]
impl Observer for LoadExistingContact {
    fn name(&self) -> &'static str {
        "LoadExistingContact"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::DataPreparation
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Select | Operation::Update | Operation::Delete)
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        if ctx.existing.is_some() {
            tracing::debug!("Contact already loaded, skipping data preparation");
            return Ok(());
        }

        let id = ctx
            .contact_id
            .clone()
            .ok_or_else(|| ObserverError::PipelineError(format!("{:?} requires a contact id", ctx.operation)))?;

        match ctx.store.find(&id).await? {
            Some(contact) => {
                ctx.existing = Some(contact);
                Ok(())
            }
            None => Err(ObserverError::NotFound("Contact not found".to_string())),
        }
    }
}
