// Ring 5: Database - hands the prepared operation to the store
use async_trait::async_trait;

use crate::contact::Contact;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing, Operation};

#[derive(Default)]
pub struct ContactSqlExecutor;

#[async_trait]
impl Observer for ContactSqlExecutor {
    fn name(&self) -> &'static str {
        "ContactSqlExecutor"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Database
    }

    fn applies_to_operation(&self, _op: Operation) -> bool {
        true
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let contact = match ctx.operation {
            Operation::Create => {
                let input = ctx
                    .input
                    .take()
                    .ok_or_else(|| ObserverError::PipelineError("create without validated input".to_string()))?;
                ctx.store.insert(Contact::from_input(input, &ctx.owner)).await?
            }
            Operation::Select => ctx
                .existing
                .clone()
                .ok_or_else(|| ObserverError::PipelineError("select without loaded contact".to_string()))?,
            Operation::Update => {
                let patch = ctx
                    .patch
                    .as_ref()
                    .ok_or_else(|| ObserverError::PipelineError("update without validated patch".to_string()))?;
                let id = contact_id(ctx)?;
                ctx.store.update(&ctx.owner, id, patch).await?
            }
            Operation::Delete => {
                let id = contact_id(ctx)?;
                ctx.store.delete(&ctx.owner, id).await?
            }
        };

        tracing::info!("{:?} contact {} for user {}", ctx.operation, contact.id, ctx.owner);
        ctx.result = Some(contact);
        Ok(())
    }
}

fn contact_id(ctx: &ObserverContext) -> Result<&str, ObserverError> {
    ctx.contact_id
        .as_deref()
        .ok_or_else(|| ObserverError::PipelineError("missing contact id".to_string()))
}
