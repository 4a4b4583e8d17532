use crate::db_error;
use async_trait::async_trait;
use pet_adoption_core::error::Result;
use pet_adoption_core::model::{Adopter, AdopterId, AdopterPatch};
use pet_adoption_core::repository::AdopterRepository;
use sqlx::PgPool;

const COLUMNS: &str = "id, full_name, national_id, phone, email, address";

#[derive(sqlx::FromRow)]
struct AdopterRow {
    id: String,
    full_name: Option<String>,
    national_id: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    address: Option<String>,
}

impl From<AdopterRow> for Adopter {
    fn from(row: AdopterRow) -> Self {
        Self {
            id: AdopterId::new(row.id),
            full_name: row.full_name,
            national_id: row.national_id,
            phone: row.phone,
            email: row.email,
            address: row.address,
        }
    }
}

/// `PostgreSQL` adopter store.
#[derive(Clone, Debug)]
pub struct PgAdopterRepository {
    pool: PgPool,
}

impl PgAdopterRepository {
    /// Create a new repository over `pool`
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdopterRepository for PgAdopterRepository {
    async fn list(&self) -> Result<Vec<Adopter>> {
        let rows: Vec<AdopterRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM adopters ORDER BY created_at, id"))
                .fetch_all(&self.pool)
                .await
                .map_err(db_error("list adopters"))?;
        Ok(rows.into_iter().map(Adopter::from).collect())
    }

    async fn insert(&self, adopter: Adopter) -> Result<Adopter> {
        let row: AdopterRow = sqlx::query_as(&format!(
            r"
            INSERT INTO adopters (id, full_name, national_id, phone, email, address)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLUMNS}
            "
        ))
        .bind(adopter.id.as_str())
        .bind(&adopter.full_name)
        .bind(&adopter.national_id)
        .bind(&adopter.phone)
        .bind(&adopter.email)
        .bind(&adopter.address)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("insert adopter"))?;
        Ok(row.into())
    }

    async fn update(&self, id: &AdopterId, patch: &AdopterPatch) -> Result<Option<Adopter>> {
        let row: Option<AdopterRow> = sqlx::query_as(&format!(
            r"
            UPDATE adopters SET
                full_name = COALESCE($2, full_name),
                national_id = COALESCE($3, national_id),
                phone = COALESCE($4, phone),
                email = COALESCE($5, email),
                address = COALESCE($6, address)
            WHERE id = $1
            RETURNING {COLUMNS}
            "
        ))
        .bind(id.as_str())
        .bind(&patch.full_name)
        .bind(&patch.national_id)
        .bind(&patch.phone)
        .bind(&patch.email)
        .bind(&patch.address)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("update adopter"))?;
        Ok(row.map(Adopter::from))
    }

    async fn delete(&self, id: &AdopterId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM adopters WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_error("delete adopter"))?;
        Ok(result.rows_affected() > 0)
    }
}
