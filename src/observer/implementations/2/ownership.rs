// Ring 2: Security - a contact is only visible to the user who created it
use async_trait::async_trait;

use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing, Operation};

#[derive(Default)]
pub struct OwnershipGuard;

#[async_trait]
impl Observer for OwnershipGuard {
    fn name(&self) -> &'static str {
        "OwnershipGuard"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Security
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Select | Operation::Update | Operation::Delete)
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let existing = ctx
            .existing
            .as_ref()
            .ok_or_else(|| ObserverError::PipelineError("ownership check before contact was loaded".to_string()))?;

        if !existing.is_owned_by(&ctx.owner) {
            tracing::warn!("User {} denied access to contact {}", ctx.owner, existing.id);
            return Err(ObserverError::SecurityError(
                "You do not have permission to access this contact".to_string(),
            ));
        }

        Ok(())
    }
}
