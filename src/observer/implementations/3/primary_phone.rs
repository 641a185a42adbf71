// Ring 3: Business - exactly one phone is primary
use async_trait::async_trait;

use crate::contact::validation::has_single_primary_phone;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing, Operation};

pub const PRIMARY_PHONE_MESSAGE: &str = "Exactly one phone number must be marked as primary";

#[derive(Default)]
pub struct PrimaryPhoneRule;

#[async_trait]
impl Observer for PrimaryPhoneRule {
    fn name(&self) -> &'static str {
        "PrimaryPhoneRule"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Business
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update)
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let phones = match ctx.operation {
            Operation::Create => ctx.input.as_ref().map(|i| i.phones.as_slice()),
            Operation::Update => ctx.patch.as_ref().and_then(|p| p.phones.as_deref()),
            _ => None,
        };

        match phones {
            Some(phones) if !has_single_primary_phone(phones) => {
                Err(ObserverError::BusinessRule(PRIMARY_PHONE_MESSAGE.to_string()))
            }
            _ => Ok(()),
        }
    }
}
