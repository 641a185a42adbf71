use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use crate::contact::{Contact, ContactInput, ContactPatch};
use crate::database::ContactStore;
use crate::observer::traits::{ObserverRing, Operation};

/// State that flows through the rings for one request
pub struct ObserverContext {
    pub operation: Operation,
    /// Authenticated user; becomes `created_by` on create
    pub owner: String,
    pub contact_id: Option<String>,

    /// Raw request body, parsed by the input validation ring
    pub body: Option<Value>,
    pub input: Option<ContactInput>,
    pub patch: Option<ContactPatch>,

    /// Stored contact loaded by ring 0
    pub existing: Option<Contact>,
    /// Contact produced by ring 5
    pub result: Option<Contact>,

    pub store: Arc<dyn ContactStore>,

    pub start_time: Instant,
    pub current_ring: Option<ObserverRing>,
}

impl ObserverContext {
    pub fn new(operation: Operation, owner: impl Into<String>, store: Arc<dyn ContactStore>) -> Self {
        Self {
            operation,
            owner: owner.into(),
            contact_id: None,
            body: None,
            input: None,
            patch: None,
            existing: None,
            result: None,
            store,
            start_time: Instant::now(),
            current_ring: None,
        }
    }

    pub fn with_contact_id(mut self, id: impl Into<String>) -> Self {
        self.contact_id = Some(id.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Primary email the request wants the contact to end up with, if it sets one
    pub fn requested_email(&self) -> Option<&str> {
        match self.operation {
            Operation::Create => self.input.as_ref().map(|i| i.email.primary.as_str()),
            Operation::Update => self
                .patch
                .as_ref()
                .and_then(|p| p.email.as_ref())
                .map(|e| e.primary.as_str()),
            _ => None,
        }
    }
}

impl std::fmt::Debug for ObserverContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverContext")
            .field("operation", &self.operation)
            .field("owner", &self.owner)
            .field("contact_id", &self.contact_id)
            .field("current_ring", &self.current_ring)
            .finish()
    }
}
