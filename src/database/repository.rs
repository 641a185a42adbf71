use async_trait::async_trait;
use sqlx::{PgPool, Row};

use super::manager::{DatabaseError, DatabaseManager};
use super::query_builder::{bind_param_query, bind_param_query_as, insert_sql, UpdateBuilder};
use super::schema::CONTACTS_TABLE;
use crate::contact::{Contact, ContactPatch, ContactRow};
use crate::filter::{ContactQuery, Filter};

/// One page of a list request
#[derive(Debug, Clone)]
pub struct ContactPage {
    pub contacts: Vec<Contact>,
    pub total: i64,
}

/// Persistence seam for the contacts resource
#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn ping(&self) -> Result<(), DatabaseError>;

    async fn list(&self, owner: &str, query: &ContactQuery) -> Result<ContactPage, DatabaseError>;

    /// Lookup by id across owners; callers decide what a foreign contact means
    async fn find(&self, id: &str) -> Result<Option<Contact>, DatabaseError>;

    /// Id of the owner's contact whose primary email is `email`
    async fn find_by_email(&self, owner: &str, email: &str) -> Result<Option<String>, DatabaseError>;

    async fn insert(&self, contact: Contact) -> Result<Contact, DatabaseError>;

    async fn update(&self, owner: &str, id: &str, patch: &ContactPatch) -> Result<Contact, DatabaseError>;

    async fn delete(&self, owner: &str, id: &str) -> Result<Contact, DatabaseError>;
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgContactStore {
    pool: PgPool,
}

impl PgContactStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ContactStore for PgContactStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }

    async fn list(&self, owner: &str, query: &ContactQuery) -> Result<ContactPage, DatabaseError> {
        let filter = Filter::new(owner, query);

        let count_sql = filter.to_count_sql();
        let mut q = sqlx::query(&count_sql.query);
        for p in count_sql.params.iter() {
            q = bind_param_query(q, p);
        }
        let total: i64 = q.fetch_one(&self.pool).await?.try_get("count")?;

        let page_sql = filter.to_sql();
        let mut q = sqlx::query_as::<_, ContactRow>(&page_sql.query);
        for p in page_sql.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let rows = q.fetch_all(&self.pool).await?;

        Ok(ContactPage {
            contacts: rows.into_iter().map(Contact::from).collect(),
            total,
        })
    }

    async fn find(&self, id: &str) -> Result<Option<Contact>, DatabaseError> {
        let sql = format!("SELECT * FROM \"{}\" WHERE \"id\" = $1", CONTACTS_TABLE);
        let row = sqlx::query_as::<_, ContactRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Contact::from))
    }

    async fn find_by_email(&self, owner: &str, email: &str) -> Result<Option<String>, DatabaseError> {
        let sql = format!(
            "SELECT \"id\" FROM \"{}\" WHERE \"created_by\" = $1 AND \"email_primary\" = $2 LIMIT 1",
            CONTACTS_TABLE
        );
        let row = sqlx::query(&sql)
            .bind(owner)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(match row {
            Some(r) => Some(r.try_get("id")?),
            None => None,
        })
    }

    async fn insert(&self, contact: Contact) -> Result<Contact, DatabaseError> {
        let sql = insert_sql(&contact);
        let mut q = sqlx::query_as::<_, ContactRow>(&sql.query);
        for p in sql.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let row = q.fetch_one(&self.pool).await.map_err(unique_violation_as_conflict)?;
        Ok(row.into())
    }

    async fn update(&self, owner: &str, id: &str, patch: &ContactPatch) -> Result<Contact, DatabaseError> {
        let builder = UpdateBuilder::from_patch(patch);
        if builder.is_empty() {
            return Err(DatabaseError::QueryError("update without columns".to_string()));
        }

        let sql = builder.to_sql(owner, id);
        let mut q = sqlx::query_as::<_, ContactRow>(&sql.query);
        for p in sql.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let row = q
            .fetch_optional(&self.pool)
            .await
            .map_err(unique_violation_as_conflict)?
            .ok_or_else(|| DatabaseError::NotFound("Contact not found".to_string()))?;

        tracing::debug!("Updated contact {} columns {:?}", id, builder.columns());
        Ok(row.into())
    }

    async fn delete(&self, owner: &str, id: &str) -> Result<Contact, DatabaseError> {
        let sql = format!(
            "DELETE FROM \"{}\" WHERE \"id\" = $1 AND \"created_by\" = $2 RETURNING *",
            CONTACTS_TABLE
        );
        let row = sqlx::query_as::<_, ContactRow>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Contact not found".to_string()))?;
        Ok(row.into())
    }
}

/// Races past the pipeline's conflict check still surface as 409
fn unique_violation_as_conflict(err: sqlx::Error) -> DatabaseError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return DatabaseError::Conflict("Contact with this email already exists".to_string());
        }
    }
    DatabaseError::Sqlx(err)
}
