/// Technician model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE technicians (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL,
///     phone VARCHAR(50) NOT NULL DEFAULT '',
///     sector VARCHAR(100) NOT NULL DEFAULT ''
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

/// A technician record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Technician {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub sector: String,
}

/// Fields accepted when creating or replacing a technician
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TechnicianInput {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(max = 50))]
    pub phone: String,

    #[serde(default)]
    #[validate(length(max = 100))]
    pub sector: String,
}

impl Technician {
    pub fn from_input(id: i64, data: TechnicianInput) -> Self {
        Self {
            id,
            name: data.name,
            email: data.email,
            phone: data.phone,
            sector: data.sector,
        }
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Technician>(
            "SELECT id, name, email, phone, sector FROM technicians ORDER BY name, id",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn create(pool: &PgPool, data: TechnicianInput) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Technician>(
            r#"
            INSERT INTO technicians (name, email, phone, sector)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, phone, sector
            "#,
        )
        .bind(data.name)
        .bind(data.email)
        .bind(data.phone)
        .bind(data.sector)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: TechnicianInput,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Technician>(
            r#"
            UPDATE technicians
            SET name = $2, email = $3, phone = $4, sector = $5
            WHERE id = $1
            RETURNING id, name, email, phone, sector
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.email)
        .bind(data.phone)
        .bind(data.sector)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM technicians WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
