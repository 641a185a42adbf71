//! In-process stand-ins for the database and the auth service, used by the
//! unit tests and the router tests under `tests/`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;

use crate::auth::{AuthError, TokenValidator, ValidatedToken};
use crate::contact::{Contact, ContactPatch};
use crate::database::{ContactPage, ContactStore, DatabaseError};
use crate::filter::{ContactQuery, SortDirection, SortField};

/// `ContactStore` over a vector, matching the Postgres store's semantics
#[derive(Default)]
pub struct MemoryContactStore {
    contacts: RwLock<Vec<Contact>>,
    offline: AtomicBool,
}

impl MemoryContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail as if the database were unreachable
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.contacts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check_online(&self) -> Result<(), DatabaseError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(DatabaseError::ConnectionError("memory store is offline".to_string()));
        }
        Ok(())
    }

    fn matches(contact: &Contact, owner: &str, query: &ContactQuery) -> bool {
        fn contains(haystack: &str, needle: &Option<String>) -> bool {
            needle
                .as_ref()
                .map_or(true, |n| haystack.to_lowercase().contains(&n.to_lowercase()))
        }

        let company = contact.company.as_ref().map(|c| c.name.as_str());
        let company_ok = match (&query.company, company) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(_), Some(name)) => contains(name, &query.company),
        };
        let tags_ok = query.tags.is_empty()
            || contact
                .tags
                .as_ref()
                .map_or(false, |tags| tags.iter().any(|t| query.tags.contains(t)));

        contact.is_owned_by(owner)
            && contains(&contact.first_name, &query.first_name)
            && contains(&contact.last_name, &query.last_name)
            && contains(&contact.email_primary, &query.email)
            && company_ok
            && tags_ok
    }

    fn email_taken(contacts: &[Contact], owner: &str, email: &str, except_id: Option<&str>) -> bool {
        contacts
            .iter()
            .any(|c| c.is_owned_by(owner) && c.email_primary == email && Some(c.id.as_str()) != except_id)
    }
}

#[async_trait]
impl ContactStore for MemoryContactStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        self.check_online()
    }

    async fn list(&self, owner: &str, query: &ContactQuery) -> Result<ContactPage, DatabaseError> {
        self.check_online()?;
        let contacts = self.contacts.read().await;

        let mut matched: Vec<Contact> = contacts
            .iter()
            .filter(|c| Self::matches(c, owner, query))
            .cloned()
            .collect();

        matched.sort_by(|a, b| {
            let ordering = match query.sort {
                SortField::CreatedAt => a.created_at.cmp(&b.created_at),
                SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
                SortField::FirstName => a.first_name.cmp(&b.first_name),
                SortField::LastName => a.last_name.cmp(&b.last_name),
                SortField::Email => a.email_primary.cmp(&b.email_primary),
            }
            .then_with(|| a.id.cmp(&b.id));
            match query.order {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        let total = matched.len() as i64;
        let contacts = matched
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.page_size as usize)
            .collect();

        Ok(ContactPage { contacts, total })
    }

    async fn find(&self, id: &str) -> Result<Option<Contact>, DatabaseError> {
        self.check_online()?;
        Ok(self.contacts.read().await.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_email(&self, owner: &str, email: &str) -> Result<Option<String>, DatabaseError> {
        self.check_online()?;
        Ok(self
            .contacts
            .read()
            .await
            .iter()
            .find(|c| c.is_owned_by(owner) && c.email_primary == email)
            .map(|c| c.id.clone()))
    }

    async fn insert(&self, contact: Contact) -> Result<Contact, DatabaseError> {
        self.check_online()?;
        let mut contacts = self.contacts.write().await;
        if Self::email_taken(&contacts, &contact.created_by, &contact.email_primary, None) {
            return Err(DatabaseError::Conflict("Contact with this email already exists".to_string()));
        }
        contacts.push(contact.clone());
        Ok(contact)
    }

    async fn update(&self, owner: &str, id: &str, patch: &ContactPatch) -> Result<Contact, DatabaseError> {
        self.check_online()?;
        let mut contacts = self.contacts.write().await;

        if let Some(email) = &patch.email {
            if Self::email_taken(&contacts, owner, &email.primary, Some(id)) {
                return Err(DatabaseError::Conflict("Contact with this email already exists".to_string()));
            }
        }

        let contact = contacts
            .iter_mut()
            .find(|c| c.id == id && c.is_owned_by(owner))
            .ok_or_else(|| DatabaseError::NotFound("Contact not found".to_string()))?;
        contact.apply(patch);
        Ok(contact.clone())
    }

    async fn delete(&self, owner: &str, id: &str) -> Result<Contact, DatabaseError> {
        self.check_online()?;
        let mut contacts = self.contacts.write().await;
        let index = contacts
            .iter()
            .position(|c| c.id == id && c.is_owned_by(owner))
            .ok_or_else(|| DatabaseError::NotFound("Contact not found".to_string()))?;
        Ok(contacts.remove(index))
    }
}

/// `TokenValidator` answering from a fixed token → user table
#[derive(Clone, Default)]
pub struct StaticTokenValidator {
    users: HashMap<String, String>,
    unavailable: bool,
}

impl StaticTokenValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, token: impl Into<String>, user_id: impl Into<String>) -> Self {
        self.users.insert(token.into(), user_id.into());
        self
    }

    /// Behave like an auth service that is down
    pub fn unavailable() -> Self {
        Self {
            users: HashMap::new(),
            unavailable: true,
        }
    }
}

#[async_trait]
impl TokenValidator for StaticTokenValidator {
    async fn validate(&self, token: &str) -> Result<ValidatedToken, AuthError> {
        if self.unavailable {
            return Err(AuthError::Unavailable {
                message: "Token validation failed".to_string(),
                details: "auth service unreachable".to_string(),
            });
        }

        match self.users.get(token) {
            Some(user_id) => Ok(ValidatedToken {
                user_id: user_id.clone(),
                expires_at: Utc::now() + Duration::hours(1),
            }),
            None => Err(AuthError::Rejected {
                message: "Invalid access token".to_string(),
                details: "The provided access token is not valid or has expired.".to_string(),
            }),
        }
    }
}

pub fn memory_store() -> Arc<MemoryContactStore> {
    Arc::new(MemoryContactStore::new())
}
