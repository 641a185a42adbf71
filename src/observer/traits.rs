use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;

/// Observer rings, executed in ascending order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ObserverRing {
    DataPreparation = 0, // Load the stored contact
    InputValidation = 1, // Payload shape and field rules
    Security = 2,        // Ownership
    Business = 3,        // Primary phone, email uniqueness
    Database = 5,        // Store call
}

impl ObserverRing {
    pub const ALL: [ObserverRing; 5] = [
        ObserverRing::DataPreparation,
        ObserverRing::InputValidation,
        ObserverRing::Security,
        ObserverRing::Business,
        ObserverRing::Database,
    ];

    /// Rings that have work to do for an operation
    pub fn for_operation(operation: Operation) -> Vec<Self> {
        use ObserverRing::*;

        match operation {
            Operation::Select => vec![DataPreparation, Security, Database],
            Operation::Delete => vec![DataPreparation, Security, Database],
            Operation::Create => vec![InputValidation, Business, Database],
            Operation::Update => vec![DataPreparation, InputValidation, Security, Business, Database],
        }
    }
}

/// Operations on a single contact that flow through the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Create,
    Select,
    Update,
    Delete,
}

#[async_trait]
pub trait Observer: Send + Sync {
    /// Observer name for logging
    fn name(&self) -> &'static str;

    fn ring(&self) -> ObserverRing;

    fn applies_to_operation(&self, op: Operation) -> bool;

    /// Execution timeout (default 5 seconds)
    fn timeout(&self) -> Duration {
        Duration::from_secs(5)
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError>;
}
