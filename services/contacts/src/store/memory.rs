//! In-process contact store
//!
//! Rows live in insertion order behind a single lock; each operation takes
//! the lock once, so single-row updates and deletes are atomic.

use async_trait::async_trait;
use common::error::DatabaseResult;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ContactFilter, ContactStore};
use crate::models::{Contact, ContactPatch, NewContact};

struct StoredContact {
    owner_id: Uuid,
    contact: Contact,
}

/// Contact store backed by process memory
#[derive(Default)]
pub struct MemoryContactStore {
    rows: RwLock<Vec<StoredContact>>,
}

impl MemoryContactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactStore for MemoryContactStore {
    async fn insert(&self, owner_id: Uuid, contact: NewContact) -> DatabaseResult<Contact> {
        let contact = Contact {
            id: Uuid::new_v4(),
            name: contact.name,
            email: contact.email,
            address: contact.address,
            phone: contact.phone,
            favorite: contact.favorite,
        };

        self.rows.write().await.push(StoredContact {
            owner_id,
            contact: contact.clone(),
        });

        Ok(contact)
    }

    async fn find(&self, filter: &ContactFilter) -> DatabaseResult<Vec<Contact>> {
        let rows = self.rows.read().await;

        Ok(rows
            .iter()
            .filter(|row| filter.matches(row.owner_id, &row.contact))
            .map(|row| row.contact.clone())
            .collect())
    }

    async fn find_one(&self, filter: &ContactFilter) -> DatabaseResult<Option<Contact>> {
        let rows = self.rows.read().await;

        Ok(rows
            .iter()
            .find(|row| filter.matches(row.owner_id, &row.contact))
            .map(|row| row.contact.clone()))
    }

    async fn update_one(
        &self,
        filter: &ContactFilter,
        patch: &ContactPatch,
    ) -> DatabaseResult<Option<Contact>> {
        let mut rows = self.rows.write().await;

        Ok(rows
            .iter_mut()
            .find(|row| filter.matches(row.owner_id, &row.contact))
            .map(|row| {
                patch.apply(&mut row.contact);
                row.contact.clone()
            }))
    }

    async fn delete_one(&self, filter: &ContactFilter) -> DatabaseResult<Option<Contact>> {
        let mut rows = self.rows.write().await;

        Ok(rows
            .iter()
            .position(|row| filter.matches(row.owner_id, &row.contact))
            .map(|index| rows.remove(index).contact))
    }

    async fn delete_many(&self, filter: &ContactFilter) -> DatabaseResult<u64> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|row| !filter.matches(row.owner_id, &row.contact));

        Ok((before - rows.len()) as u64)
    }

    async fn ping(&self) -> DatabaseResult<()> {
        Ok(())
    }
}
