use async_trait::async_trait;
use pet_adoption_auth::{AuthError, Result, User, UserRepository};
use pet_adoption_core::model::UserId;
use sqlx::PgPool;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    username: String,
    password_hash: String,
}

/// `PostgreSQL` user store.
#[derive(Clone, Debug)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new repository over `pool`
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, username, password_hash FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AuthError::Storage(format!("Failed to get user: {e}")))?;
        Ok(row.map(|r| User {
            id: UserId::new(r.id),
            username: r.username,
            password_hash: r.password_hash,
        }))
    }

    async fn insert(&self, user: User) -> Result<User> {
        sqlx::query("INSERT INTO users (id, username, password_hash) VALUES ($1, $2, $3)")
            .bind(user.id.as_str())
            .bind(&user.username)
            .bind(&user.password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AuthError::UserAlreadyExists;
                    }
                }
                AuthError::Storage(format!("Failed to create user: {e}"))
            })?;
        Ok(user)
    }
}
