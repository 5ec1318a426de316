/// Training model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE trainings (
///     id BIGSERIAL PRIMARY KEY,
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     training_date DATE NOT NULL,
///     status VARCHAR(50) NOT NULL,
///     participants TEXT NOT NULL DEFAULT '',
///     responsible VARCHAR(255) NOT NULL DEFAULT '',
///     location VARCHAR(255) NOT NULL DEFAULT ''
/// );
/// ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

/// A scheduled training
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Training {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub training_date: NaiveDate,
    pub status: String,
    pub participants: String,
    pub responsible: String,
    pub location: String,
}

/// Fields accepted when creating or replacing a training
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TrainingInput {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    pub training_date: NaiveDate,

    #[validate(length(min = 1, max = 50, message = "Status must be 1-50 characters"))]
    pub status: String,

    #[serde(default)]
    pub participants: String,

    #[serde(default)]
    #[validate(length(max = 255))]
    pub responsible: String,

    #[serde(default)]
    #[validate(length(max = 255))]
    pub location: String,
}

impl Training {
    /// Builds a training from an id and input fields
    pub fn from_input(id: i64, data: TrainingInput) -> Self {
        Self {
            id,
            title: data.title,
            description: data.description,
            training_date: data.training_date,
            status: data.status,
            participants: data.participants,
            responsible: data.responsible,
            location: data.location,
        }
    }

    /// Lists all trainings ordered by date
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Training>(
            r#"
            SELECT id, title, description, training_date, status, participants, responsible, location
            FROM trainings
            ORDER BY training_date, id
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Inserts a training
    pub async fn create(pool: &PgPool, data: TrainingInput) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Training>(
            r#"
            INSERT INTO trainings (title, description, training_date, status, participants, responsible, location)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, title, description, training_date, status, participants, responsible, location
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.training_date)
        .bind(data.status)
        .bind(data.participants)
        .bind(data.responsible)
        .bind(data.location)
        .fetch_one(pool)
        .await
    }

    /// Replaces all fields of a training
    ///
    /// Returns None if no training has that id.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: TrainingInput,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Training>(
            r#"
            UPDATE trainings
            SET title = $2, description = $3, training_date = $4, status = $5,
                participants = $6, responsible = $7, location = $8
            WHERE id = $1
            RETURNING id, title, description, training_date, status, participants, responsible, location
            "#,
        )
        .bind(id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.training_date)
        .bind(data.status)
        .bind(data.participants)
        .bind(data.responsible)
        .bind(data.location)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a training; returns true if it existed
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM trainings WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_validation() {
        let input = TrainingInput {
            title: String::new(),
            description: String::new(),
            training_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            status: "scheduled".to_string(),
            participants: String::new(),
            responsible: String::new(),
            location: String::new(),
        };

        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
    }

    #[test]
    fn test_input_deserialize_defaults() {
        let input: TrainingInput = serde_json::from_str(
            r#"{"title": "NR-10", "training_date": "2024-03-01", "status": "scheduled"}"#,
        )
        .unwrap();

        assert!(input.validate().is_ok());
        let training = Training::from_input(7, input);
        assert_eq!(training.id, 7);
        assert_eq!(training.location, "");
    }
}
