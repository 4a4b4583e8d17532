use crate::db_error;
use async_trait::async_trait;
use pet_adoption_core::error::Result;
use pet_adoption_core::model::{Shelter, ShelterId, ShelterPatch};
use pet_adoption_core::repository::ShelterRepository;
use sqlx::PgPool;

const COLUMNS: &str = "id, name, address, phone, email";

#[derive(sqlx::FromRow)]
struct ShelterRow {
    id: String,
    name: Option<String>,
    address: Option<String>,
    phone: Option<String>,
    email: Option<String>,
}

impl From<ShelterRow> for Shelter {
    fn from(row: ShelterRow) -> Self {
        Self {
            id: ShelterId::new(row.id),
            name: row.name,
            address: row.address,
            phone: row.phone,
            email: row.email,
        }
    }
}

/// `PostgreSQL` shelter store.
#[derive(Clone, Debug)]
pub struct PgShelterRepository {
    pool: PgPool,
}

impl PgShelterRepository {
    /// Create a new repository over `pool`
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShelterRepository for PgShelterRepository {
    async fn list(&self) -> Result<Vec<Shelter>> {
        let rows: Vec<ShelterRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM shelters ORDER BY created_at, id"))
                .fetch_all(&self.pool)
                .await
                .map_err(db_error("list shelters"))?;
        Ok(rows.into_iter().map(Shelter::from).collect())
    }

    async fn insert(&self, shelter: Shelter) -> Result<Shelter> {
        let row: ShelterRow = sqlx::query_as(&format!(
            r"
            INSERT INTO shelters (id, name, address, phone, email)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COLUMNS}
            "
        ))
        .bind(shelter.id.as_str())
        .bind(&shelter.name)
        .bind(&shelter.address)
        .bind(&shelter.phone)
        .bind(&shelter.email)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("insert shelter"))?;
        Ok(row.into())
    }

    async fn update(&self, id: &ShelterId, patch: &ShelterPatch) -> Result<Option<Shelter>> {
        let row: Option<ShelterRow> = sqlx::query_as(&format!(
            r"
            UPDATE shelters SET
                name = COALESCE($2, name),
                address = COALESCE($3, address),
                phone = COALESCE($4, phone),
                email = COALESCE($5, email)
            WHERE id = $1
            RETURNING {COLUMNS}
            "
        ))
        .bind(id.as_str())
        .bind(&patch.name)
        .bind(&patch.address)
        .bind(&patch.phone)
        .bind(&patch.email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("update shelter"))?;
        Ok(row.map(Shelter::from))
    }

    async fn delete(&self, id: &ShelterId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM shelters WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_error("delete shelter"))?;
        Ok(result.rows_affected() > 0)
    }
}
