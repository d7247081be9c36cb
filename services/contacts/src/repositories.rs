//! Owner-scoped contact repository
//!
//! Handlers never see a [`ContactStore`] directly. They ask the repository
//! for an [`OwnerScope`], and every query issued through the scope starts
//! from a filter bound to that owner.

use std::sync::Arc;

use common::error::DatabaseResult;
use uuid::Uuid;

use crate::{
    models::{Contact, ContactPatch, NewContact},
    store::{ContactFilter, ContactStore, NamePattern},
};

/// Contact repository shared across handlers
#[derive(Clone)]
pub struct ContactRepository {
    store: Arc<dyn ContactStore>,
}

impl ContactRepository {
    /// Create a new contact repository
    pub fn new(store: Arc<dyn ContactStore>) -> Self {
        Self { store }
    }

    /// Operations restricted to contacts owned by `owner_id`
    pub fn for_owner(&self, owner_id: Uuid) -> OwnerScope<'_> {
        OwnerScope {
            store: self.store.as_ref(),
            owner_id,
        }
    }

    /// Check that the backing store answers
    pub async fn ping(&self) -> DatabaseResult<()> {
        self.store.ping().await
    }
}

/// Contact operations on behalf of a single owner
pub struct OwnerScope<'a> {
    store: &'a dyn ContactStore,
    owner_id: Uuid,
}

impl OwnerScope<'_> {
    fn filter(&self) -> ContactFilter {
        ContactFilter::owned_by(self.owner_id)
    }

    pub async fn create(&self, contact: NewContact) -> DatabaseResult<Contact> {
        self.store.insert(self.owner_id, contact).await
    }

    pub async fn find_all(&self, name: Option<NamePattern>) -> DatabaseResult<Vec<Contact>> {
        let filter = match name {
            Some(pattern) => self.filter().with_name(pattern),
            None => self.filter(),
        };
        self.store.find(&filter).await
    }

    pub async fn find_one(&self, id: Uuid) -> DatabaseResult<Option<Contact>> {
        self.store.find_one(&self.filter().with_id(id)).await
    }

    pub async fn update(&self, id: Uuid, patch: &ContactPatch) -> DatabaseResult<Option<Contact>> {
        self.store.update_one(&self.filter().with_id(id), patch).await
    }

    pub async fn delete_one(&self, id: Uuid) -> DatabaseResult<Option<Contact>> {
        self.store.delete_one(&self.filter().with_id(id)).await
    }

    pub async fn delete_all(&self) -> DatabaseResult<u64> {
        self.store.delete_many(&self.filter()).await
    }

    pub async fn find_favorites(&self) -> DatabaseResult<Vec<Contact>> {
        self.store.find(&self.filter().favorites_only()).await
    }
}
