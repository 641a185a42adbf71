// Ring 1: Input Validation - parses the body and applies the field rules
use async_trait::async_trait;

use crate::contact::validation::{validate_input, validate_patch, FieldErrors};
use crate::contact::{ContactInput, ContactPatch};
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing, Operation};

#[derive(Default)]
pub struct InputValidator;

#[async_trait]
impl Observer for InputValidator {
    fn name(&self) -> &'static str {
        "InputValidator"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::InputValidation
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update)
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let body = ctx
            .body
            .take()
            .ok_or_else(|| ObserverError::validation("Request body is required", None))?;

        match ctx.operation {
            Operation::Create => {
                let input: ContactInput = serde_json::from_value(body).map_err(malformed)?;
                validate_input(&input).map_err(rejected)?;
                ctx.input = Some(input);
            }
            Operation::Update => {
                let patch: ContactPatch = serde_json::from_value(body).map_err(malformed)?;
                if patch.is_empty() {
                    return Err(ObserverError::validation("No valid fields to update", None));
                }
                validate_patch(&patch).map_err(rejected)?;
                ctx.patch = Some(patch);
            }
            _ => {}
        }

        Ok(())
    }
}

fn rejected(errors: FieldErrors) -> ObserverError {
    ObserverError::validation("Validation error", Some(errors))
}

/// Shape errors (missing field, wrong type, unknown phone type) are reported under `body`
fn malformed(err: serde_json::Error) -> ObserverError {
    let mut errors = FieldErrors::new();
    errors.insert("body".to_string(), vec![err.to_string()]);
    ObserverError::validation("Validation error", Some(errors))
}
