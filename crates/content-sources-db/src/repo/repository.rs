//! Repository DAO: shared repositories and per-organization configurations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use content_sources_core::{
    FilterData, PaginationData, Predicate, RepositoryBulkCreateResponse,
    RepositoryCollectionResponse, RepositoryRequest, RepositoryResponse,
};
use sqlx::{Connection, PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{DbError, DbResult};

// Columns of a configuration joined to its repository. Callers alias the
// configuration as `rc` and the repository as `r`.
const CONFIGURATION_COLUMNS: &str = "rc.uuid, rc.name, rc.versions, rc.arch, rc.account_id, \
     rc.org_id, rc.repository_uuid, rc.created_at, rc.updated_at, r.url";

// Three binds per row; keeps each seeding statement well under the
// PostgreSQL bind parameter limit.
const PUBLIC_REPO_CHUNK: usize = 1000;

/// A shared remote package source, unique by URL.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Repository {
    pub uuid: Uuid,
    pub url: String,
    pub public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One organization's configuration of a repository, joined to its URL.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RepositoryConfiguration {
    pub uuid: Uuid,
    pub name: String,
    pub versions: Vec<String>,
    pub arch: String,
    pub account_id: String,
    pub org_id: String,
    pub repository_uuid: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub url: String,
}

impl From<RepositoryConfiguration> for RepositoryResponse {
    fn from(config: RepositoryConfiguration) -> Self {
        RepositoryResponse {
            uuid: config.uuid,
            name: config.name,
            url: config.url,
            distribution_versions: config.versions,
            distribution_arch: config.arch,
            account_id: config.account_id,
            org_id: config.org_id,
        }
    }
}

/// Outcome of a bulk create.
///
/// `items` always matches the input in length and order. When any item
/// failed, `error` holds the first failure and no item carries a
/// repository payload.
#[derive(Debug)]
pub struct BulkCreateResult {
    pub items: Vec<RepositoryBulkCreateResponse>,
    pub error: Option<DbError>,
}

#[async_trait]
pub trait RepositoryDao: Send + Sync {
    /// Register a URL for an organization, reusing the shared repository if
    /// the URL is already known.
    async fn create(&self, request: RepositoryRequest) -> DbResult<RepositoryResponse>;

    /// Create many configurations in one transaction, isolating failures per item.
    async fn bulk_create(&self, requests: Vec<RepositoryRequest>) -> DbResult<BulkCreateResult>;

    /// Get a configuration visible to an organization.
    async fn fetch(&self, org_id: &str, uuid: Uuid) -> DbResult<RepositoryResponse>;

    /// List an organization's configurations. Returns the page and the total
    /// number of matches before paging.
    async fn list(
        &self,
        org_id: &str,
        page: PaginationData,
        filters: &FilterData,
    ) -> DbResult<(RepositoryCollectionResponse, i64)>;

    /// Apply the fields present in `request`.
    async fn update(
        &self,
        org_id: &str,
        uuid: Uuid,
        request: RepositoryRequest,
    ) -> DbResult<RepositoryResponse>;

    /// Delete a configuration. The shared repository is kept.
    async fn delete(&self, org_id: &str, uuid: Uuid) -> DbResult<()>;

    /// Insert public repositories, ignoring URLs that already exist.
    async fn save_public_repos(&self, urls: &[String]) -> DbResult<()>;

    /// Look up a shared repository by URL.
    async fn fetch_repository_by_url(&self, url: &str) -> DbResult<Option<Repository>>;
}

/// PostgreSQL implementation of RepositoryDao.
pub struct PgRepositoryDao {
    pool: PgPool,
}

impl PgRepositoryDao {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RepositoryDao for PgRepositoryDao {
    async fn create(&self, request: RepositoryRequest) -> DbResult<RepositoryResponse> {
        let mut tx = self.pool.begin().await?;
        let created = create_configuration(&mut tx, &request).await?;
        tx.commit().await?;

        info!(
            uuid = %created.uuid,
            org_id = %created.org_id,
            url = %created.url,
            "Created repository configuration"
        );
        Ok(created.into())
    }

    async fn bulk_create(&self, requests: Vec<RepositoryRequest>) -> DbResult<BulkCreateResult> {
        let mut tx = self.pool.begin().await?;
        let mut items = Vec::with_capacity(requests.len());
        let mut first_error: Option<DbError> = None;

        for (index, request) in requests.iter().enumerate() {
            // Nested transaction = SAVEPOINT; a failed item leaves the outer
            // transaction usable.
            let mut savepoint = tx.begin().await?;
            match create_configuration(&mut savepoint, request).await {
                Ok(created) => {
                    savepoint.commit().await?;
                    items.push(RepositoryBulkCreateResponse::created(created.into()));
                }
                Err(err) => {
                    savepoint.rollback().await?;
                    warn!(index, error = %err, "Bulk create item failed");
                    items.push(RepositoryBulkCreateResponse::failed(err.to_string()));
                    first_error.get_or_insert(err);
                }
            }
        }

        // Any failure discards the whole batch, successes included.
        if first_error.is_some() {
            tx.rollback().await?;
            for item in &mut items {
                item.repository = None;
            }
        } else {
            tx.commit().await?;
        }

        debug!(
            count = items.len(),
            failed = first_error.is_some(),
            "Bulk create finished"
        );
        Ok(BulkCreateResult {
            items,
            error: first_error,
        })
    }

    async fn fetch(&self, org_id: &str, uuid: Uuid) -> DbResult<RepositoryResponse> {
        let mut conn = self.pool.acquire().await?;
        let config = fetch_configuration(&mut conn, org_id, uuid).await?;
        Ok(config.into())
    }

    async fn list(
        &self,
        org_id: &str,
        page: PaginationData,
        filters: &FilterData,
    ) -> DbResult<(RepositoryCollectionResponse, i64)> {
        let predicates = filters.predicates();

        let mut count_query = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM repository_configurations rc \
             JOIN repositories r ON r.uuid = rc.repository_uuid",
        );
        push_conditions(&mut count_query, org_id, &predicates);
        let total = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut page_query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {CONFIGURATION_COLUMNS} FROM repository_configurations rc \
             JOIN repositories r ON r.uuid = rc.repository_uuid"
        ));
        push_conditions(&mut page_query, org_id, &predicates);
        page_query
            .push(" ORDER BY rc.created_at, rc.uuid LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset);
        let rows = page_query
            .build_query_as::<RepositoryConfiguration>()
            .fetch_all(&self.pool)
            .await?;

        debug!(org_id, total, returned = rows.len(), "Listed repository configurations");
        let data = rows.into_iter().map(RepositoryResponse::from).collect();
        Ok((RepositoryCollectionResponse::new(data), total))
    }

    async fn update(
        &self,
        org_id: &str,
        uuid: Uuid,
        request: RepositoryRequest,
    ) -> DbResult<RepositoryResponse> {
        let mut tx = self.pool.begin().await?;
        let existing = fetch_configuration(&mut tx, org_id, uuid).await?;

        let mut fields = ConfigurationFields::from(&existing);
        fields.apply(&request);
        fields.validate()?;

        // A new URL re-points the configuration; the old repository stays.
        let repository_uuid = match request.url.as_deref() {
            Some(url) => find_or_create_repository(&mut tx, url).await?.uuid,
            None => existing.repository_uuid,
        };

        let updated = sqlx::query_as::<_, RepositoryConfiguration>(&format!(
            r#"
            WITH rc AS (
                UPDATE repository_configurations
                SET name = $3, versions = $4, arch = $5, repository_uuid = $6, updated_at = NOW()
                WHERE uuid = $1 AND org_id = $2
                RETURNING *
            )
            SELECT {CONFIGURATION_COLUMNS} FROM rc
            JOIN repositories r ON r.uuid = rc.repository_uuid
            "#
        ))
        .bind(uuid)
        .bind(org_id)
        .bind(&fields.name)
        .bind(&fields.versions)
        .bind(&fields.arch)
        .bind(repository_uuid)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| not_found(uuid))?;
        tx.commit().await?;

        info!(%uuid, org_id, "Updated repository configuration");
        Ok(updated.into())
    }

    async fn delete(&self, org_id: &str, uuid: Uuid) -> DbResult<()> {
        let result =
            sqlx::query("DELETE FROM repository_configurations WHERE uuid = $1 AND org_id = $2")
                .bind(uuid)
                .bind(org_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(uuid));
        }
        info!(%uuid, org_id, "Deleted repository configuration");
        Ok(())
    }

    async fn save_public_repos(&self, urls: &[String]) -> DbResult<()> {
        let urls: Vec<&str> = urls
            .iter()
            .map(String::as_str)
            .filter(|url| !url.trim().is_empty())
            .collect();
        if urls.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;
        for chunk in urls.chunks(PUBLIC_REPO_CHUNK) {
            let mut query_builder = QueryBuilder::<Postgres>::new(
                "INSERT INTO repositories (uuid, url, public, created_at, updated_at) ",
            );
            query_builder.push_values(chunk.iter(), |mut b, url| {
                b.push_bind(Uuid::now_v7())
                    .push_bind(url.to_string())
                    .push_bind(true)
                    .push("NOW()")
                    .push("NOW()");
            });
            query_builder.push(" ON CONFLICT (url) DO NOTHING");

            inserted += query_builder.build().execute(&mut *tx).await?.rows_affected();
        }
        tx.commit().await?;

        info!(requested = urls.len(), inserted, "Saved public repositories");
        Ok(())
    }

    async fn fetch_repository_by_url(&self, url: &str) -> DbResult<Option<Repository>> {
        let repository = sqlx::query_as::<_, Repository>(
            "SELECT uuid, url, public, created_at, updated_at FROM repositories WHERE url = $1",
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;
        Ok(repository)
    }
}

/// Mutable configuration fields, before they are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ConfigurationFields {
    name: String,
    versions: Vec<String>,
    arch: String,
}

impl From<&RepositoryConfiguration> for ConfigurationFields {
    fn from(config: &RepositoryConfiguration) -> Self {
        Self {
            name: config.name.clone(),
            versions: config.versions.clone(),
            arch: config.arch.clone(),
        }
    }
}

impl ConfigurationFields {
    /// Overwrite only the fields present in the request.
    fn apply(&mut self, request: &RepositoryRequest) {
        if let Some(name) = &request.name {
            self.name = name.clone();
        }
        if let Some(versions) = &request.distribution_versions {
            self.versions = versions.clone();
        }
        if let Some(arch) = &request.distribution_arch {
            self.arch = arch.clone();
        }
    }

    fn validate(&self) -> DbResult<()> {
        if self.name.trim().is_empty() {
            return Err(DbError::BadValidation("Name cannot be blank.".to_string()));
        }
        Ok(())
    }
}

fn not_found(uuid: Uuid) -> DbError {
    DbError::NotFound(format!("Could not find repository with UUID {uuid}"))
}

async fn fetch_configuration(
    conn: &mut PgConnection,
    org_id: &str,
    uuid: Uuid,
) -> DbResult<RepositoryConfiguration> {
    sqlx::query_as::<_, RepositoryConfiguration>(&format!(
        "SELECT {CONFIGURATION_COLUMNS} FROM repository_configurations rc \
         JOIN repositories r ON r.uuid = rc.repository_uuid \
         WHERE rc.uuid = $1 AND rc.org_id = $2"
    ))
    .bind(uuid)
    .bind(org_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| not_found(uuid))
}

/// Return the repository with this URL, inserting it if absent.
async fn find_or_create_repository(conn: &mut PgConnection, url: &str) -> DbResult<Repository> {
    if url.trim().is_empty() {
        return Err(DbError::BadValidation("URL cannot be blank.".to_string()));
    }

    // The no-op update makes RETURNING yield the existing row on conflict.
    let repository = sqlx::query_as::<_, Repository>(
        r#"
        INSERT INTO repositories (uuid, url, public, created_at, updated_at)
        VALUES ($1, $2, FALSE, NOW(), NOW())
        ON CONFLICT (url) DO UPDATE SET url = EXCLUDED.url
        RETURNING uuid, url, public, created_at, updated_at
        "#,
    )
    .bind(Uuid::now_v7())
    .bind(url)
    .fetch_one(&mut *conn)
    .await?;
    Ok(repository)
}

async fn create_configuration(
    conn: &mut PgConnection,
    request: &RepositoryRequest,
) -> DbResult<RepositoryConfiguration> {
    let mut fields = ConfigurationFields::default();
    fields.apply(request);
    fields.validate()?;

    let repository =
        find_or_create_repository(&mut *conn, request.url.as_deref().unwrap_or_default()).await?;

    let created = sqlx::query_as::<_, RepositoryConfiguration>(&format!(
        r#"
        WITH rc AS (
            INSERT INTO repository_configurations (
                uuid, name, versions, arch, account_id, org_id, repository_uuid,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW())
            RETURNING *
        )
        SELECT {CONFIGURATION_COLUMNS} FROM rc
        JOIN repositories r ON r.uuid = rc.repository_uuid
        "#
    ))
    .bind(Uuid::now_v7())
    .bind(&fields.name)
    .bind(&fields.versions)
    .bind(&fields.arch)
    .bind(request.account_id.as_deref().unwrap_or_default())
    .bind(request.org_id.as_deref().unwrap_or_default())
    .bind(repository.uuid)
    .fetch_one(&mut *conn)
    .await?;
    Ok(created)
}

fn push_conditions(query: &mut QueryBuilder<'_, Postgres>, org_id: &str, predicates: &[Predicate]) {
    query.push(" WHERE rc.org_id = ").push_bind(org_id.to_string());

    for predicate in predicates {
        query.push(" AND ");
        match predicate {
            Predicate::AvailableForArch(arch) => {
                query
                    .push("(rc.arch = ")
                    .push_bind(arch.clone())
                    .push(" OR rc.arch = '')");
            }
            Predicate::AvailableForVersion(version) => {
                query
                    .push("(")
                    .push_bind(version.clone())
                    .push(" = ANY(rc.versions) OR array_length(rc.versions, 1) IS NULL)");
            }
            Predicate::Search(search) => {
                let pattern = format!("%{search}%");
                query
                    .push("(rc.name LIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR r.url LIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
            Predicate::ArchIn(arches) => {
                query
                    .push("rc.arch = ANY(")
                    .push_bind(arches.clone())
                    .push(")");
            }
            Predicate::VersionIn(versions) => {
                query.push("(");
                {
                    let mut any_of = query.separated(" OR ");
                    for version in versions {
                        any_of
                            .push_bind(version.clone())
                            .push_unseparated(" = ANY(rc.versions)");
                    }
                }
                query.push(")");
            }
        }
    }
}
