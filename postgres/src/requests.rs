use crate::db_error;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pet_adoption_core::error::{AdoptionError, Result};
use pet_adoption_core::model::{
    AdopterId, AdoptionRequest, AdoptionRequestId, AdoptionRequestPatch, PetId, RequestStatus,
};
use pet_adoption_core::repository::AdoptionRequestRepository;
use sqlx::PgPool;

const COLUMNS: &str = "id, adopter_id, pet_id, request_date, status, comments";

#[derive(sqlx::FromRow)]
struct RequestRow {
    id: String,
    adopter_id: String,
    pet_id: String,
    request_date: DateTime<Utc>,
    status: String,
    comments: Option<String>,
}

impl TryFrom<RequestRow> for AdoptionRequest {
    type Error = AdoptionError;

    fn try_from(row: RequestRow) -> Result<Self> {
        let status = RequestStatus::parse(&row.status).ok_or_else(|| {
            AdoptionError::storage(format!("Invalid request status: {}", row.status))
        })?;
        Ok(Self {
            id: AdoptionRequestId::new(row.id),
            adopter_id: AdopterId::new(row.adopter_id),
            pet_id: PetId::new(row.pet_id),
            request_date: row.request_date,
            status,
            comments: row.comments,
        })
    }
}

/// `PostgreSQL` adoption request store.
#[derive(Clone, Debug)]
pub struct PgAdoptionRequestRepository {
    pool: PgPool,
}

impl PgAdoptionRequestRepository {
    /// Create a new repository over `pool`
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdoptionRequestRepository for PgAdoptionRequestRepository {
    async fn list(&self) -> Result<Vec<AdoptionRequest>> {
        let rows: Vec<RequestRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM adoption_requests ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list adoption requests"))?;
        rows.into_iter().map(AdoptionRequest::try_from).collect()
    }

    async fn get(&self, id: &AdoptionRequestId) -> Result<Option<AdoptionRequest>> {
        let row: Option<RequestRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM adoption_requests WHERE id = $1"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("get adoption request"))?;
        row.map(AdoptionRequest::try_from).transpose()
    }

    #[tracing::instrument(skip(self, request), fields(request_id = %request.id, pet_id = %request.pet_id))]
    async fn insert(&self, request: AdoptionRequest) -> Result<AdoptionRequest> {
        let row: RequestRow = sqlx::query_as(&format!(
            r"
            INSERT INTO adoption_requests (id, adopter_id, pet_id, request_date, status, comments)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLUMNS}
            "
        ))
        .bind(request.id.as_str())
        .bind(request.adopter_id.as_str())
        .bind(request.pet_id.as_str())
        .bind(request.request_date)
        .bind(request.status.as_str())
        .bind(&request.comments)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("insert adoption request"))?;
        AdoptionRequest::try_from(row)
    }

    #[tracing::instrument(skip(self, patch), fields(request_id = %id, expected = %expected))]
    async fn update(
        &self,
        id: &AdoptionRequestId,
        expected: RequestStatus,
        patch: &AdoptionRequestPatch,
    ) -> Result<Option<AdoptionRequest>> {
        let row: Option<RequestRow> = sqlx::query_as(&format!(
            r"
            UPDATE adoption_requests SET
                status = COALESCE($3, status),
                comments = COALESCE($4, comments)
            WHERE id = $1 AND status = $2
            RETURNING {COLUMNS}
            "
        ))
        .bind(id.as_str())
        .bind(expected.as_str())
        .bind(patch.status.map(RequestStatus::as_str))
        .bind(&patch.comments)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("update adoption request"))?;
        row.map(AdoptionRequest::try_from).transpose()
    }

    async fn delete(&self, id: &AdoptionRequestId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM adoption_requests WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_error("delete adoption request"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_pending_for_pet(
        &self,
        pet_id: &PetId,
        except: Option<&AdoptionRequestId>,
    ) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM adoption_requests
            WHERE pet_id = $1
              AND status = 'PENDING'
              AND ($2::TEXT IS NULL OR id <> $2)
            ",
        )
        .bind(pet_id.as_str())
        .bind(except.map(AdoptionRequestId::as_str))
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("count pending requests"))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}
