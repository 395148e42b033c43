use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::Config;
use crate::error::LoaderError;
use crate::record::CanonicalWork;

/// Writes canonical works into one PostgreSQL table. The `doi` column is
/// UNIQUE, so a record already present is skipped rather than overwritten.
pub struct PgLoader {
    table: String,
    pool: PgPool,
}

impl PgLoader {
    pub fn connect(config: &Config) -> Result<Self, LoaderError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_pg_connections)
            .connect_lazy(&config.database_url)
            .map_err(|error| LoaderError::Pool { error })?;

        Ok(Self { table: config.table_name.clone(), pool })
    }

    /// Create the destination table if it does not exist yet. Any DDL
    /// failure is fatal to the run.
    pub async fn ensure_schema(&self) -> Result<(), LoaderError> {
        let ddl = format!(
            r#"
CREATE TABLE IF NOT EXISTS "{}" (
    id SERIAL PRIMARY KEY,
    doi TEXT UNIQUE,
    type TEXT,
    title TEXT,
    authors JSONB,
    published_date DATE,
    journal TEXT,
    publisher TEXT,
    volume TEXT,
    issue TEXT,
    page TEXT,
    print_issn TEXT,
    electronic_issn TEXT,
    abstract TEXT,
    license_url TEXT,
    reference_count INTEGER,
    is_referenced_by_count INTEGER
)
            "#,
            &self.table
        );

        sqlx::query(&ddl)
            .execute(&self.pool)
            .await
            .map_err(|error| LoaderError::Schema { error })?;

        tracing::info!(table = %self.table, "destination table ensured");
        Ok(())
    }

    /// Insert a batch inside a single transaction, skipping DOIs already
    /// stored. Returns the number of rows actually inserted.
    ///
    /// Any failure rolls the whole batch back: the transaction is dropped
    /// uncommitted and its connection returns to the pool on every path.
    pub async fn load_batch(&self, works: &[CanonicalWork]) -> Result<u64, LoaderError> {
        let insert = format!(
            r#"
INSERT INTO "{}" (
    doi, type, title, authors, published_date, journal, publisher,
    volume, issue, page, print_issn, electronic_issn, abstract, license_url,
    reference_count, is_referenced_by_count
) VALUES (
    $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16
)
ON CONFLICT (doi) DO NOTHING
            "#,
            &self.table
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|error| LoaderError::Load { command: "BEGIN".to_owned(), error })?;

        let mut inserted = 0u64;
        for work in works {
            let result = sqlx::query(&insert)
                .bind(&work.doi)
                .bind(&work.work_type)
                .bind(&work.title)
                .bind(sqlx::types::Json(&work.authors))
                .bind(work.published_date)
                .bind(&work.journal)
                .bind(&work.publisher)
                .bind(&work.volume)
                .bind(&work.issue)
                .bind(&work.page)
                .bind(&work.print_issn)
                .bind(&work.electronic_issn)
                .bind(&work.abstract_text)
                .bind(&work.license_url)
                .bind(work.reference_count)
                .bind(work.is_referenced_by_count)
                .execute(&mut *tx)
                .await
                .map_err(|error| LoaderError::Load { command: "INSERT".to_owned(), error })?;

            inserted += result.rows_affected();
        }

        tx.commit()
            .await
            .map_err(|error| LoaderError::Load { command: "COMMIT".to_owned(), error })?;

        tracing::info!(
            table = %self.table,
            batch = works.len(),
            inserted,
            "batch loaded"
        );
        Ok(inserted)
    }
}
