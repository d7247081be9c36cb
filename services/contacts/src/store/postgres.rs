//! PostgreSQL contact store

use async_trait::async_trait;
use common::{
    database,
    error::{DatabaseError, DatabaseResult},
};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{ContactFilter, ContactStore};
use crate::models::{Contact, ContactPatch, NewContact};

const CONTACT_COLUMNS: &str = "id, name, email, address, phone, favorite";

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS contacts (
        id UUID PRIMARY KEY,
        owner_id UUID NOT NULL,
        name TEXT NOT NULL,
        email TEXT,
        address TEXT,
        phone TEXT,
        favorite BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS contacts_owner_id_idx ON contacts (owner_id, id)",
    "CREATE INDEX IF NOT EXISTS contacts_owner_favorite_idx ON contacts (owner_id, favorite)",
];

/// Contact store for database operations
#[derive(Clone)]
pub struct PgContactStore {
    pool: PgPool,
}

impl PgContactStore {
    /// Create a new contact store
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the contacts table and its indexes when missing
    pub async fn ensure_schema(&self) -> DatabaseResult<()> {
        database::ensure_schema(&self.pool, SCHEMA).await
    }
}

/// Append the WHERE clause for a filter; the owner predicate always comes first
fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &ContactFilter) {
    query.push(" WHERE owner_id = ").push_bind(filter.owner_id());

    if let Some(id) = filter.id() {
        query.push(" AND id = ").push_bind(id);
    }
    if let Some(pattern) = filter.name() {
        query
            .push(" AND name ~* ")
            .push_bind(pattern.as_str().to_string());
    }
    if let Some(favorite) = filter.favorite() {
        query.push(" AND favorite = ").push_bind(favorite);
    }
}

/// Restrict a statement to the single oldest row matching the filter
fn push_first_match(query: &mut QueryBuilder<'_, Postgres>, filter: &ContactFilter) {
    query.push(" WHERE id = (SELECT id FROM contacts");
    push_filter(query, filter);
    query.push(" ORDER BY created_at, id LIMIT 1)");
}

#[async_trait]
impl ContactStore for PgContactStore {
    async fn insert(&self, owner_id: Uuid, contact: NewContact) -> DatabaseResult<Contact> {
        let row = sqlx::query_as::<_, Contact>(
            r#"
            INSERT INTO contacts (id, owner_id, name, email, address, phone, favorite)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, email, address, phone, favorite
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(contact.name)
        .bind(contact.email)
        .bind(contact.address)
        .bind(contact.phone)
        .bind(contact.favorite)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(row)
    }

    async fn find(&self, filter: &ContactFilter) -> DatabaseResult<Vec<Contact>> {
        let mut query: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {CONTACT_COLUMNS} FROM contacts"));
        push_filter(&mut query, filter);
        query.push(" ORDER BY created_at, id");

        query
            .build_query_as::<Contact>()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    async fn find_one(&self, filter: &ContactFilter) -> DatabaseResult<Option<Contact>> {
        let mut query: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {CONTACT_COLUMNS} FROM contacts"));
        push_filter(&mut query, filter);
        query.push(" ORDER BY created_at, id LIMIT 1");

        query
            .build_query_as::<Contact>()
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    async fn update_one(
        &self,
        filter: &ContactFilter,
        patch: &ContactPatch,
    ) -> DatabaseResult<Option<Contact>> {
        if patch.is_empty() {
            return self.find_one(filter).await;
        }

        let mut query: QueryBuilder<'_, Postgres> = QueryBuilder::new("UPDATE contacts SET ");
        {
            let mut assignments = query.separated(", ");
            if let Some(name) = &patch.name {
                assignments.push("name = ").push_bind_unseparated(name.clone());
            }
            if let Some(email) = &patch.email {
                assignments.push("email = ").push_bind_unseparated(email.clone());
            }
            if let Some(address) = &patch.address {
                assignments
                    .push("address = ")
                    .push_bind_unseparated(address.clone());
            }
            if let Some(phone) = &patch.phone {
                assignments.push("phone = ").push_bind_unseparated(phone.clone());
            }
            if let Some(favorite) = patch.favorite {
                assignments
                    .push("favorite = ")
                    .push_bind_unseparated(favorite);
            }
        }
        push_first_match(&mut query, filter);
        query.push(format!(" RETURNING {CONTACT_COLUMNS}"));

        query
            .build_query_as::<Contact>()
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    async fn delete_one(&self, filter: &ContactFilter) -> DatabaseResult<Option<Contact>> {
        let mut query: QueryBuilder<'_, Postgres> = QueryBuilder::new("DELETE FROM contacts");
        push_first_match(&mut query, filter);
        query.push(format!(" RETURNING {CONTACT_COLUMNS}"));

        query
            .build_query_as::<Contact>()
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    async fn delete_many(&self, filter: &ContactFilter) -> DatabaseResult<u64> {
        let mut query: QueryBuilder<'_, Postgres> = QueryBuilder::new("DELETE FROM contacts");
        push_filter(&mut query, filter);

        let result = query
            .build()
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> DatabaseResult<()> {
        database::health_check(&self.pool).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{NameFilterMode, NamePattern};

    fn select_sql(filter: &ContactFilter) -> String {
        let mut query: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {CONTACT_COLUMNS} FROM contacts"));
        push_filter(&mut query, filter);
        query.sql().to_string()
    }

    #[test]
    fn test_owner_predicate_always_present() {
        let owner = Uuid::new_v4();
        assert_eq!(
            select_sql(&ContactFilter::owned_by(owner)),
            "SELECT id, name, email, address, phone, favorite FROM contacts WHERE owner_id = $1"
        );
    }

    #[test]
    fn test_filter_clauses_are_anded_after_owner() {
        let pattern = NamePattern::new("an", NameFilterMode::Pattern).unwrap();
        let filter = ContactFilter::owned_by(Uuid::new_v4())
            .with_id(Uuid::new_v4())
            .with_name(pattern)
            .favorites_only();

        assert_eq!(
            select_sql(&filter),
            "SELECT id, name, email, address, phone, favorite FROM contacts \
             WHERE owner_id = $1 AND id = $2 AND name ~* $3 AND favorite = $4"
        );
    }

    #[test]
    fn test_delete_one_targets_single_owned_row() {
        let filter = ContactFilter::owned_by(Uuid::new_v4()).with_id(Uuid::new_v4());
        let mut query: QueryBuilder<'_, Postgres> = QueryBuilder::new("DELETE FROM contacts");
        push_first_match(&mut query, &filter);

        assert_eq!(
            query.sql(),
            "DELETE FROM contacts WHERE id = (SELECT id FROM contacts \
             WHERE owner_id = $1 AND id = $2 ORDER BY created_at, id LIMIT 1)"
        );
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance"]
    async fn test_round_trip_against_database() -> Result<(), Box<dyn std::error::Error>> {
        let pool = database::connect(&common::database::DatabaseConfig::from_env()).await?;
        let store = PgContactStore::new(pool);
        store.ensure_schema().await?;

        let owner = Uuid::new_v4();
        let created = store
            .insert(
                owner,
                NewContact {
                    name: "Ann".to_string(),
                    email: Some("a@x.com".to_string()),
                    address: None,
                    phone: None,
                    favorite: true,
                },
            )
            .await?;

        let found = store
            .find_one(&ContactFilter::owned_by(owner).with_id(created.id))
            .await?;
        assert_eq!(found, Some(created.clone()));

        let hidden = store
            .find_one(&ContactFilter::owned_by(Uuid::new_v4()).with_id(created.id))
            .await?;
        assert!(hidden.is_none());

        assert_eq!(store.delete_many(&ContactFilter::owned_by(owner)).await?, 1);

        Ok(())
    }
}
