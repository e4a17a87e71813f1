use async_trait::async_trait;
use diesel::prelude::*;
use pgvector::{Vector, VectorExpressionMethods};
use uuid::Uuid;

use crate::domain::entities::Chunk;
use crate::domain::repositories::{ScoredChunk, VectorIndex, VectorIndexError};
use crate::infrastructure::database::connection::PgPool;
use crate::infrastructure::database::models::{ChunkRow, NewChunkRow};
use crate::infrastructure::database::schema::chunks;

/// Vector index backed by Postgres with the pgvector extension. Cosine
/// distance `d = 1 - cos` is what the database computes; the normalized
/// score `(cos + 1) / 2` equals `(2 - d) / 2`, so a score threshold `t`
/// becomes the distance bound `d <= 2 - 2t`.
pub struct PgVectorIndex {
    pool: PgPool,
    dimension: usize,
}

impl PgVectorIndex {
    pub fn new(pool: PgPool, dimension: usize) -> Self {
        Self { pool, dimension }
    }

    fn check_dimension(&self, vector: &Vector) -> Result<(), VectorIndexError> {
        let actual = vector.as_slice().len();
        if actual != self.dimension {
            return Err(VectorIndexError::DimensionMismatch {
                expected: self.dimension,
                actual,
            });
        }
        Ok(())
    }
}

fn backend(e: impl std::fmt::Display) -> VectorIndexError {
    VectorIndexError::Backend(e.to_string())
}

#[async_trait]
impl VectorIndex for PgVectorIndex {
    async fn upsert(&self, chunk: &Chunk) -> Result<(), VectorIndexError> {
        self.check_dimension(chunk.embedding())?;
        let pool = self.pool.clone();
        let row = NewChunkRow::from_entity(chunk);
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(backend)?;
            diesel::insert_into(chunks::table)
                .values(&row)
                .on_conflict(chunks::id)
                .do_update()
                .set(&row)
                .execute(&mut conn)
                .map_err(backend)?;
            Ok(())
        })
        .await
        .map_err(backend)?
    }

    async fn upsert_batch(&self, batch: &[Chunk]) -> Result<(), VectorIndexError> {
        for chunk in batch {
            self.check_dimension(chunk.embedding())?;
        }
        let pool = self.pool.clone();
        let rows: Vec<NewChunkRow> = batch.iter().map(NewChunkRow::from_entity).collect();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(backend)?;
            conn.transaction::<_, diesel::result::Error, _>(|conn| {
                for row in &rows {
                    diesel::insert_into(chunks::table)
                        .values(row)
                        .on_conflict(chunks::id)
                        .do_update()
                        .set(row)
                        .execute(conn)?;
                }
                Ok(())
            })
            .map_err(backend)?;
            Ok(())
        })
        .await
        .map_err(backend)?
    }

    async fn search(
        &self,
        query: &Vector,
        threshold: f32,
        top_k: usize,
        document_id: Option<Uuid>,
    ) -> Result<Vec<ScoredChunk>, VectorIndexError> {
        self.check_dimension(query)?;
        let pool = self.pool.clone();
        let query = query.clone();
        let max_distance = (2.0 - 2.0 * threshold) as f64;
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(backend)?;

            let mut sql = chunks::table
                .select((
                    ChunkRow::as_select(),
                    chunks::embedding.cosine_distance(query.clone()),
                ))
                .filter(
                    chunks::embedding
                        .cosine_distance(query.clone())
                        .le(max_distance),
                )
                .order((
                    chunks::embedding.cosine_distance(query.clone()).asc(),
                    chunks::chunk_index.asc(),
                ))
                .limit(top_k as i64)
                .into_boxed();
            if let Some(id) = document_id {
                sql = sql.filter(chunks::document_id.eq(id));
            }

            let rows: Vec<(ChunkRow, f64)> = sql.load(&mut conn).map_err(backend)?;
            Ok(rows
                .into_iter()
                .map(|(row, distance)| ScoredChunk {
                    chunk: row.into_entity(),
                    score: ((2.0 - distance) / 2.0) as f32,
                })
                .collect())
        })
        .await
        .map_err(backend)?
    }

    async fn delete_document(&self, document_id: Uuid) -> Result<u64, VectorIndexError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(backend)?;
            let deleted = diesel::delete(chunks::table.filter(chunks::document_id.eq(document_id)))
                .execute(&mut conn)
                .map_err(backend)?;
            Ok(deleted as u64)
        })
        .await
        .map_err(backend)?
    }

    async fn count_for_document(&self, document_id: Uuid) -> Result<i64, VectorIndexError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(backend)?;
            chunks::table
                .filter(chunks::document_id.eq(document_id))
                .count()
                .get_result(&mut conn)
                .map_err(backend)
        })
        .await
        .map_err(backend)?
    }
}
