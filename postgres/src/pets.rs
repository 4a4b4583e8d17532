use crate::db_error;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pet_adoption_core::error::{AdoptionError, Result};
use pet_adoption_core::model::{Pet, PetId, PetPatch, PetStatus, ShelterId};
use pet_adoption_core::repository::PetRepository;
use sqlx::PgPool;

const COLUMNS: &str = "id, shelter_id, name, species, breed, age_years, sex, status, intake_date";

#[derive(sqlx::FromRow)]
struct PetRow {
    id: String,
    shelter_id: Option<String>,
    name: Option<String>,
    species: Option<String>,
    breed: Option<String>,
    age_years: Option<i64>,
    sex: Option<String>,
    status: String,
    intake_date: Option<DateTime<Utc>>,
}

impl TryFrom<PetRow> for Pet {
    type Error = AdoptionError;

    fn try_from(row: PetRow) -> Result<Self> {
        let status = PetStatus::parse(&row.status)
            .ok_or_else(|| AdoptionError::storage(format!("Invalid pet status: {}", row.status)))?;
        Ok(Self {
            id: PetId::new(row.id),
            shelter_id: row.shelter_id.map(ShelterId::new),
            name: row.name,
            species: row.species,
            breed: row.breed,
            age_years: row.age_years.and_then(|a| u32::try_from(a).ok()),
            sex: row.sex,
            status,
            intake_date: row.intake_date,
        })
    }
}

/// `PostgreSQL` pet store.
#[derive(Clone, Debug)]
pub struct PgPetRepository {
    pool: PgPool,
}

impl PgPetRepository {
    /// Create a new repository over `pool`
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PetRepository for PgPetRepository {
    async fn list(&self) -> Result<Vec<Pet>> {
        let rows: Vec<PetRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM pets ORDER BY created_at, id"))
                .fetch_all(&self.pool)
                .await
                .map_err(db_error("list pets"))?;
        rows.into_iter().map(Pet::try_from).collect()
    }

    async fn get(&self, id: &PetId) -> Result<Option<Pet>> {
        let row: Option<PetRow> = sqlx::query_as(&format!("SELECT {COLUMNS} FROM pets WHERE id = $1"))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("get pet"))?;
        row.map(Pet::try_from).transpose()
    }

    #[tracing::instrument(skip(self, pet), fields(pet_id = %pet.id))]
    async fn insert(&self, pet: Pet) -> Result<Pet> {
        let row: PetRow = sqlx::query_as(&format!(
            r"
            INSERT INTO pets (id, shelter_id, name, species, breed, age_years, sex, status, intake_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {COLUMNS}
            "
        ))
        .bind(pet.id.as_str())
        .bind(pet.shelter_id.as_ref().map(ShelterId::as_str))
        .bind(&pet.name)
        .bind(&pet.species)
        .bind(&pet.breed)
        .bind(pet.age_years.map(i64::from))
        .bind(&pet.sex)
        .bind(pet.status.as_str())
        .bind(pet.intake_date)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("insert pet"))?;
        Pet::try_from(row)
    }

    #[tracing::instrument(skip(self, patch), fields(pet_id = %id))]
    async fn update(&self, id: &PetId, patch: &PetPatch) -> Result<Option<Pet>> {
        let row: Option<PetRow> = sqlx::query_as(&format!(
            r"
            UPDATE pets SET
                shelter_id = COALESCE($2, shelter_id),
                name = COALESCE($3, name),
                species = COALESCE($4, species),
                breed = COALESCE($5, breed),
                age_years = COALESCE($6, age_years),
                sex = COALESCE($7, sex),
                intake_date = COALESCE($8, intake_date)
            WHERE id = $1
            RETURNING {COLUMNS}
            "
        ))
        .bind(id.as_str())
        .bind(patch.shelter_id.as_ref().map(ShelterId::as_str))
        .bind(&patch.name)
        .bind(&patch.species)
        .bind(&patch.breed)
        .bind(patch.age_years.map(i64::from))
        .bind(&patch.sex)
        .bind(patch.intake_date)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("update pet"))?;
        row.map(Pet::try_from).transpose()
    }

    #[tracing::instrument(skip(self), fields(pet_id = %id))]
    async fn compare_and_set_status(
        &self,
        id: &PetId,
        expected: PetStatus,
        next: PetStatus,
    ) -> Result<bool> {
        let result = sqlx::query("UPDATE pets SET status = $3 WHERE id = $1 AND status = $2")
            .bind(id.as_str())
            .bind(expected.as_str())
            .bind(next.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_error("set pet status"))?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, id: &PetId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM pets WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_error("delete pet"))?;
        Ok(result.rows_affected() > 0)
    }
}
