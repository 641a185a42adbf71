use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tokio::time::timeout;

use crate::contact::Contact;
use crate::database::ContactStore;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::implementations::{
    ContactSqlExecutor, EmailConflictRule, InputValidator, LoadExistingContact, OwnershipGuard, PrimaryPhoneRule,
};
use crate::observer::traits::{Observer, ObserverRing, Operation};

/// Runs single-contact operations through the observer rings in order,
/// stopping at the first failure
pub struct ObserverPipeline {
    observers: HashMap<ObserverRing, Vec<Box<dyn Observer>>>,
}

impl ObserverPipeline {
    /// Empty pipeline; observers are added with `register_observer`
    pub fn new() -> Self {
        Self {
            observers: HashMap::new(),
        }
    }

    /// Pipeline with the standard contact observers
    pub fn with_default_observers() -> Self {
        let mut pipeline = Self::new();
        pipeline.register_observer(Box::new(LoadExistingContact));
        pipeline.register_observer(Box::new(InputValidator));
        pipeline.register_observer(Box::new(OwnershipGuard));
        pipeline.register_observer(Box::new(PrimaryPhoneRule));
        pipeline.register_observer(Box::new(EmailConflictRule));
        pipeline.register_observer(Box::new(ContactSqlExecutor));
        pipeline
    }

    pub fn register_observer(&mut self, observer: Box<dyn Observer>) {
        let ring = observer.ring();
        let name = observer.name();
        self.observers.entry(ring).or_default().push(observer);

        tracing::debug!("Registered observer '{}' for ring {:?}", name, ring);
    }

    pub async fn create(&self, store: Arc<dyn ContactStore>, owner: &str, body: Value) -> Result<Contact, ObserverError> {
        let ctx = ObserverContext::new(Operation::Create, owner, store).with_body(body);
        self.execute(ctx).await
    }

    pub async fn select(&self, store: Arc<dyn ContactStore>, owner: &str, id: &str) -> Result<Contact, ObserverError> {
        let ctx = ObserverContext::new(Operation::Select, owner, store).with_contact_id(id);
        self.execute(ctx).await
    }

    pub async fn update(
        &self,
        store: Arc<dyn ContactStore>,
        owner: &str,
        id: &str,
        body: Value,
    ) -> Result<Contact, ObserverError> {
        let ctx = ObserverContext::new(Operation::Update, owner, store)
            .with_contact_id(id)
            .with_body(body);
        self.execute(ctx).await
    }

    pub async fn delete(&self, store: Arc<dyn ContactStore>, owner: &str, id: &str) -> Result<Contact, ObserverError> {
        let ctx = ObserverContext::new(Operation::Delete, owner, store).with_contact_id(id);
        self.execute(ctx).await
    }

    /// Execute every applicable ring and return the contact produced by the database ring
    pub async fn execute(&self, mut ctx: ObserverContext) -> Result<Contact, ObserverError> {
        let relevant_rings = ObserverRing::for_operation(ctx.operation);

        tracing::info!(
            "Observer pipeline starting: operation={:?}, contact={:?}, rings={:?}",
            ctx.operation,
            ctx.contact_id,
            relevant_rings
        );

        for ring in relevant_rings {
            ctx.current_ring = Some(ring);
            self.execute_ring(ring, &mut ctx).await?;
        }

        tracing::debug!(
            "Observer pipeline finished: operation={:?} in {:?}",
            ctx.operation,
            ctx.start_time.elapsed()
        );

        ctx.result
            .take()
            .ok_or_else(|| ObserverError::PipelineError(format!("{:?} produced no contact", ctx.operation)))
    }

    async fn execute_ring(&self, ring: ObserverRing, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let observers = match self.observers.get(&ring) {
            Some(obs) => obs,
            None => {
                tracing::debug!("No observers registered for ring {:?}", ring);
                return Ok(());
            }
        };

        for observer in observers {
            if !observer.applies_to_operation(ctx.operation) {
                tracing::trace!(
                    "Observer {} skipped - doesn't apply to operation {:?}",
                    observer.name(),
                    ctx.operation
                );
                continue;
            }

            let observer_start = Instant::now();

            match timeout(observer.timeout(), observer.execute(ctx)).await {
                Ok(Ok(())) => {
                    tracing::debug!("Observer: {} completed in {:?}", observer.name(), observer_start.elapsed());
                }
                Ok(Err(error)) => {
                    tracing::warn!(
                        "Observer: {} failed in {:?}: {}",
                        observer.name(),
                        observer_start.elapsed(),
                        error
                    );
                    return Err(error);
                }
                Err(_elapsed) => {
                    tracing::error!("Observer: {} timed out after {:?}", observer.name(), observer.timeout());
                    return Err(ObserverError::TimeoutError(format!(
                        "Observer {} timed out after {:?}",
                        observer.name(),
                        observer.timeout()
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Default for ObserverPipeline {
    fn default() -> Self {
        Self::with_default_observers()
    }
}
