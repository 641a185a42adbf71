// Ring 3: Business - primary email is unique per owner
use async_trait::async_trait;

use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing, Operation};

#[derive(Default)]
pub struct EmailConflictRule;

#[async_trait]
impl Observer for EmailConflictRule {
    fn name(&self) -> &'static str {
        "EmailConflictRule"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Business
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update)
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let email = match ctx.requested_email() {
            Some(email) => email.to_string(),
            None => return Ok(()),
        };

        // Unchanged email on update
        if let Some(existing) = &ctx.existing {
            if existing.email_primary == email {
                return Ok(());
            }
        }

        match ctx.store.find_by_email(&ctx.owner, &email).await? {
            Some(id) if ctx.contact_id.as_deref() != Some(id.as_str()) => {
                tracing::info!("Email already used by contact {} for user {}", id, ctx.owner);
                Err(ObserverError::Conflict {
                    message: "Contact with this email already exists".to_string(),
                    contact_id: Some(id),
                })
            }
            _ => Ok(()),
        }
    }
}
