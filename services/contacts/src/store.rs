//! Contact record storage
//!
//! A [`ContactStore`] persists contacts next to their owner identifier and
//! answers queries described by a [`ContactFilter`]. A filter cannot be built
//! without an owner, so every backend query is owner-constrained. Stores only
//! ever hand back [`Contact`] values, which carry no owner field.

use std::sync::Arc;

use async_trait::async_trait;
use common::{
    database::{self, DatabaseConfig},
    error::DatabaseResult,
};
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::models::{Contact, ContactPatch, NewContact};

pub mod memory;
pub mod postgres;

pub use memory::MemoryContactStore;
pub use postgres::PgContactStore;

/// URL scheme selecting the in-process store
pub const MEMORY_URL_SCHEME: &str = "memory://";

/// Persistence backend for contacts
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Insert a contact owned by `owner_id` and return it with its new id
    async fn insert(&self, owner_id: Uuid, contact: NewContact) -> DatabaseResult<Contact>;

    /// All contacts matching the filter, in creation order
    async fn find(&self, filter: &ContactFilter) -> DatabaseResult<Vec<Contact>>;

    /// First contact matching the filter
    async fn find_one(&self, filter: &ContactFilter) -> DatabaseResult<Option<Contact>>;

    /// Apply the patch to the first match and return the updated contact
    async fn update_one(
        &self,
        filter: &ContactFilter,
        patch: &ContactPatch,
    ) -> DatabaseResult<Option<Contact>>;

    /// Remove the first match and return it
    async fn delete_one(&self, filter: &ContactFilter) -> DatabaseResult<Option<Contact>>;

    /// Remove every match and return how many were removed
    async fn delete_many(&self, filter: &ContactFilter) -> DatabaseResult<u64>;

    /// Check that the backend answers
    async fn ping(&self) -> DatabaseResult<()>;
}

/// How the `name` query parameter is interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameFilterMode {
    /// The parameter is a case-insensitive regular expression, used as-is
    #[default]
    Pattern,
    /// The parameter is escaped and matched as a literal substring
    Literal,
}

/// Case-insensitive name matcher
///
/// The source text is what backends with native regex support receive; the
/// compiled form serves in-process matching and rejects invalid patterns
/// before any store access.
#[derive(Debug, Clone)]
pub struct NamePattern {
    source: String,
    regex: Regex,
}

impl NamePattern {
    pub fn new(raw: &str, mode: NameFilterMode) -> Result<Self, regex::Error> {
        let source = match mode {
            NameFilterMode::Pattern => raw.to_string(),
            NameFilterMode::Literal => regex::escape(raw),
        };
        let regex = RegexBuilder::new(&source).case_insensitive(true).build()?;

        Ok(Self { source, regex })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

/// Owner-constrained contact query
#[derive(Debug, Clone)]
pub struct ContactFilter {
    owner_id: Uuid,
    id: Option<Uuid>,
    name: Option<NamePattern>,
    favorite: Option<bool>,
}

impl ContactFilter {
    pub(crate) fn owned_by(owner_id: Uuid) -> Self {
        Self {
            owner_id,
            id: None,
            name: None,
            favorite: None,
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_name(mut self, pattern: NamePattern) -> Self {
        self.name = Some(pattern);
        self
    }

    pub fn favorites_only(mut self) -> Self {
        self.favorite = Some(true);
        self
    }

    pub fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    pub fn id(&self) -> Option<Uuid> {
        self.id
    }

    pub fn name(&self) -> Option<&NamePattern> {
        self.name.as_ref()
    }

    pub fn favorite(&self) -> Option<bool> {
        self.favorite
    }

    /// Evaluate the filter against a stored row
    pub fn matches(&self, owner_id: Uuid, contact: &Contact) -> bool {
        self.owner_id == owner_id
            && self.id.is_none_or(|id| id == contact.id)
            && self
                .name
                .as_ref()
                .is_none_or(|pattern| pattern.is_match(&contact.name))
            && self.favorite.is_none_or(|flag| flag == contact.favorite)
    }
}

/// Open the store named by the database URL
///
/// `memory://` selects the in-process store; anything else is handed to the
/// PostgreSQL driver and the contacts table is bootstrapped.
pub async fn connect(config: &DatabaseConfig) -> DatabaseResult<Arc<dyn ContactStore>> {
    if config.url.starts_with(MEMORY_URL_SCHEME) {
        info!("Using in-memory contact store");
        return Ok(Arc::new(MemoryContactStore::default()));
    }

    let pool = database::connect(config).await?;
    let store = PgContactStore::new(pool);
    store.ensure_schema().await?;
    info!("Contacts table ready");

    Ok(Arc::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(name: &str, favorite: bool) -> Contact {
        Contact {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: None,
            address: None,
            phone: None,
            favorite,
        }
    }

    #[test]
    fn test_filter_requires_matching_owner() {
        let owner = Uuid::new_v4();
        let row = contact("Ann", false);

        let filter = ContactFilter::owned_by(owner);
        assert!(filter.matches(owner, &row));
        assert!(!filter.matches(Uuid::new_v4(), &row));
        assert!(!filter.clone().with_id(row.id).matches(Uuid::new_v4(), &row));
    }

    #[test]
    fn test_filter_by_id_and_favorite() {
        let owner = Uuid::new_v4();
        let row = contact("Ann", true);

        assert!(ContactFilter::owned_by(owner).with_id(row.id).matches(owner, &row));
        assert!(!ContactFilter::owned_by(owner)
            .with_id(Uuid::new_v4())
            .matches(owner, &row));
        assert!(ContactFilter::owned_by(owner).favorites_only().matches(owner, &row));
        assert!(!ContactFilter::owned_by(owner)
            .favorites_only()
            .matches(owner, &contact("Bob", false)));
    }

    #[test]
    fn test_name_pattern_is_case_insensitive_substring() {
        let pattern = NamePattern::new("an", NameFilterMode::Pattern).expect("valid pattern");
        assert!(pattern.is_match("Ann"));
        assert!(pattern.is_match("DANIEL"));
        assert!(pattern.is_match("Joanne"));
        assert!(!pattern.is_match("Bob"));
    }

    #[test]
    fn test_name_pattern_keeps_regex_semantics() {
        let pattern = NamePattern::new("^a.n$", NameFilterMode::Pattern).expect("valid pattern");
        assert!(pattern.is_match("Ann"));
        assert!(!pattern.is_match("Anna"));
        assert_eq!(pattern.as_str(), "^a.n$");

        assert!(NamePattern::new("(", NameFilterMode::Pattern).is_err());
    }

    #[test]
    fn test_literal_mode_escapes_pattern_characters() {
        let pattern = NamePattern::new("a.n", NameFilterMode::Literal).expect("escaped pattern");
        assert!(pattern.is_match("Xa.nY"));
        assert!(!pattern.is_match("Ann"));

        assert!(NamePattern::new("(", NameFilterMode::Literal).is_ok());
    }

    #[tokio::test]
    async fn test_connect_memory_url() {
        let config = DatabaseConfig {
            url: "memory://contacts".to_string(),
            max_connections: 1,
        };

        let store = connect(&config).await.expect("memory store");
        store.ping().await.expect("memory store answers");
    }
}
