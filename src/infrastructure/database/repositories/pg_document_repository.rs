use async_trait::async_trait;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::entities::Document;
use crate::domain::repositories::{DocumentRepository, DocumentRepositoryError};
use crate::infrastructure::database::connection::PgPool;
use crate::infrastructure::database::models::{DocumentRow, NewDocumentRow};
use crate::infrastructure::database::schema::documents;

/// Document catalog backed by Postgres. Diesel is synchronous, so every
/// query runs on the blocking thread pool.
pub struct PgDocumentRepository {
    pool: PgPool,
}

impl PgDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn backend(e: impl std::fmt::Display) -> DocumentRepositoryError {
    DocumentRepositoryError::Backend(e.to_string())
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    async fn save(&self, document: &Document) -> Result<(), DocumentRepositoryError> {
        let pool = self.pool.clone();
        let row = NewDocumentRow::from_entity(document);
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(backend)?;
            diesel::insert_into(documents::table)
                .values(&row)
                .execute(&mut conn)
                .map_err(backend)?;
            Ok(())
        })
        .await
        .map_err(backend)?
    }

    async fn update(&self, document: &Document) -> Result<(), DocumentRepositoryError> {
        let pool = self.pool.clone();
        let id = document.id();
        let row = NewDocumentRow::from_entity(document);
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(backend)?;
            let updated = diesel::update(documents::table.find(id))
                .set(&row)
                .execute(&mut conn)
                .map_err(backend)?;
            if updated == 0 {
                return Err(DocumentRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
        .map_err(backend)?
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Document>, DocumentRepositoryError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(backend)?;
            let row = documents::table
                .find(id)
                .select(DocumentRow::as_select())
                .first::<DocumentRow>(&mut conn)
                .optional()
                .map_err(backend)?;
            row.map(|r| r.into_entity().map_err(DocumentRepositoryError::Backend))
                .transpose()
        })
        .await
        .map_err(backend)?
    }

    async fn find_all(&self) -> Result<Vec<Document>, DocumentRepositoryError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(backend)?;
            let rows = documents::table
                .order(documents::uploaded_at.desc())
                .select(DocumentRow::as_select())
                .load::<DocumentRow>(&mut conn)
                .map_err(backend)?;
            rows.into_iter()
                .map(|r| r.into_entity().map_err(DocumentRepositoryError::Backend))
                .collect()
        })
        .await
        .map_err(backend)?
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DocumentRepositoryError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(backend)?;
            let deleted = diesel::delete(documents::table.find(id))
                .execute(&mut conn)
                .map_err(backend)?;
            Ok(deleted > 0)
        })
        .await
        .map_err(backend)?
    }

    async fn count(&self) -> Result<i64, DocumentRepositoryError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(backend)?;
            documents::table
                .count()
                .get_result(&mut conn)
                .map_err(backend)
        })
        .await
        .map_err(backend)?
    }
}
