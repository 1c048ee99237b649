pub mod auth_service;
pub mod meeting_service;
pub mod points_service;
pub mod recommendation_service;
pub mod user_service;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::config::Settings;
    use crate::database::Database;
    use chrono::{DateTime, Utc};

    pub fn test_settings() -> Settings {
        Settings {
            secret_key: "test-secret".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            app_origin: "http://localhost:3000".to_string(),
            database_url: "sqlite::memory:".to_string(),
        }
    }

    pub async fn add_user(db: &Database, email: &str) {
        sqlx::query("INSERT INTO users (email, hashed_password) VALUES (?, 'not-a-real-hash')")
            .bind(email)
            .execute(db.pool())
            .await
            .unwrap();
    }

    pub async fn add_meeting(db: &Database, id: &str, start: DateTime<Utc>, end: DateTime<Utc>) {
        sqlx::query(
            "INSERT INTO meetings (id, start_time, end_time, location, subject)
             VALUES (?, ?, ?, 'the park', 'chess')",
        )
        .bind(id)
        .bind(start)
        .bind(end)
        .execute(db.pool())
        .await
        .unwrap();
    }

    pub async fn add_participant(
        db: &Database,
        email: &str,
        meeting_id: &str,
        joined_at: DateTime<Utc>,
    ) {
        sqlx::query("INSERT INTO participants (user_id, meeting_id, joined_at) VALUES (?, ?, ?)")
            .bind(email)
            .bind(meeting_id)
            .bind(joined_at)
            .execute(db.pool())
            .await
            .unwrap();
    }

    pub async fn add_interest(db: &Database, email: &str, subject: &str) {
        sqlx::query("INSERT INTO interests (user_id, subject) VALUES (?, ?)")
            .bind(email)
            .bind(subject)
            .execute(db.pool())
            .await
            .unwrap();
    }

    pub async fn set_points(db: &Database, email: &str, points: i64) {
        sqlx::query("UPDATE users SET points = ? WHERE email = ?")
            .bind(points)
            .bind(email)
            .execute(db.pool())
            .await
            .unwrap();
    }
}
