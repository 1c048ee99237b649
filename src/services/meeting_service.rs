use crate::{
    database::Database,
    models::{Meeting, User, UserProfile},
    services::user_service,
    utils::error::{is_unique_violation, AppError},
};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Deserialize;

pub const MAX_PARTICIPANTS: i64 = 6;
pub const JOIN_COOLDOWN_HOURS: i64 = 1;

const MEETING_CODE_LEN: usize = 8;
const MEETING_CODE_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const MEETING_CODE_ATTEMPTS: usize = 5;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateMeetingRequest {
    pub duration_hours: i64,
    pub location: String,
    pub subject: String,
}

/// A user may create or join at most one meeting per hour, measured from
/// their most recent join across all participations.
pub fn within_cooldown(last_join: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match last_join {
        Some(last) => now - last < Duration::hours(JOIN_COOLDOWN_HOURS),
        None => false,
    }
}

fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..MEETING_CODE_LEN)
        .map(|_| MEETING_CODE_ALPHABET[rng.gen_range(0..MEETING_CODE_ALPHABET.len())] as char)
        .collect()
}

async fn last_join_time<'a, E>(executor: E, email: &str) -> Result<Option<DateTime<Utc>>, AppError>
where
    E: sqlx::Executor<'a, Database = sqlx::Sqlite>,
{
    Ok(sqlx::query_scalar::<_, Option<DateTime<Utc>>>(
        "SELECT MAX(joined_at) FROM participants WHERE user_id = ?",
    )
    .bind(email)
    .fetch_one(executor)
    .await?)
}

pub async fn create_meeting(
    db: &Database,
    email: &str,
    request: &CreateMeetingRequest,
    now: DateTime<Utc>,
) -> Result<Meeting, AppError> {
    if request.duration_hours <= 0 {
        return Err(AppError::InvalidRequest(
            "duration_hours must be at least 1".into(),
        ));
    }

    let user = user_service::get_user(db, email).await?;
    let end_time = now + Duration::hours(request.duration_hours);

    let mut tx = db.pool().begin().await?;

    // Collisions over a 62^8 code space are rare; retry a few draws
    // instead of failing the request.
    let mut code = None;
    for _ in 0..MEETING_CODE_ATTEMPTS {
        let candidate = generate_code();
        let inserted = sqlx::query(
            "INSERT INTO meetings (id, start_time, end_time, location, subject)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&candidate)
        .bind(now)
        .bind(end_time)
        .bind(&request.location)
        .bind(&request.subject)
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {
                code = Some(candidate);
                break;
            }
            Err(e) if is_unique_violation(&e) => continue,
            Err(e) => return Err(e.into()),
        }
    }
    let code =
        code.ok_or_else(|| AppError::Internal("could not allocate a meeting code".into()))?;

    // Creator is the first participant. The cooldown guard lives in the
    // same statement as the insert, so a concurrent join for the same
    // user cannot slip in between a read and the write. Zero rows means
    // the whole transaction rolls back, meeting row included.
    let enrolled = sqlx::query(
        "INSERT INTO participants (user_id, meeting_id, joined_at)
         SELECT ?, ?, ?
         WHERE NOT EXISTS (
             SELECT 1 FROM participants WHERE user_id = ? AND joined_at > ?
         )",
    )
    .bind(&user.email)
    .bind(&code)
    .bind(now)
    .bind(&user.email)
    .bind(now - Duration::hours(JOIN_COOLDOWN_HOURS))
    .execute(&mut *tx)
    .await?;

    if enrolled.rows_affected() == 0 {
        return Err(AppError::Forbidden(
            "cooldown: last meeting joined less than an hour ago".into(),
        ));
    }

    tx.commit().await?;

    log::info!("✅ Meeting {} created by {}", code, user.email);

    Ok(Meeting {
        id: code,
        start_time: now,
        end_time,
        location: request.location.clone(),
        subject: request.subject.clone(),
    })
}

pub async fn list_open(db: &Database, now: DateTime<Utc>) -> Result<Vec<Meeting>, AppError> {
    Ok(sqlx::query_as::<_, Meeting>(
        "SELECT * FROM meetings WHERE end_time > ? ORDER BY start_time, id",
    )
    .bind(now)
    .fetch_all(db.pool())
    .await?)
}

pub async fn join_meeting(
    db: &Database,
    email: &str,
    meeting_id: &str,
    now: DateTime<Utc>,
) -> Result<Meeting, AppError> {
    let user = user_service::get_user(db, email).await?;

    let mut tx = db.pool().begin().await?;

    let meeting = sqlx::query_as::<_, Meeting>("SELECT * FROM meetings WHERE id = ?")
        .bind(meeting_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("meeting {}", meeting_id)))?;

    let already_joined: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM participants WHERE user_id = ? AND meeting_id = ?)",
    )
    .bind(&user.email)
    .bind(meeting_id)
    .fetch_one(&mut *tx)
    .await?;
    if already_joined {
        return Err(AppError::Conflict(format!(
            "already joined meeting {}",
            meeting_id
        )));
    }

    // Capacity and cooldown checks ride in the same conditional
    // statement as the insert, so two concurrent joins cannot race past
    // the limit or the hour. The composite key is the backstop for
    // duplicate joins. A zero-row result is re-read only to pick the
    // right error.
    let inserted = sqlx::query(
        "INSERT INTO participants (user_id, meeting_id, joined_at)
         SELECT ?, ?, ?
         WHERE (SELECT COUNT(*) FROM participants WHERE meeting_id = ?) < ?
           AND NOT EXISTS (
               SELECT 1 FROM participants WHERE user_id = ? AND joined_at > ?
           )",
    )
    .bind(&user.email)
    .bind(meeting_id)
    .bind(now)
    .bind(meeting_id)
    .bind(MAX_PARTICIPANTS)
    .bind(&user.email)
    .bind(now - Duration::hours(JOIN_COOLDOWN_HOURS))
    .execute(&mut *tx)
    .await;

    match inserted {
        Ok(result) if result.rows_affected() == 0 => {
            let last = last_join_time(&mut *tx, &user.email).await?;
            if within_cooldown(last, now) {
                return Err(AppError::Forbidden(
                    "cooldown: last meeting joined less than an hour ago".into(),
                ));
            }
            return Err(AppError::Forbidden(format!(
                "full: meeting already has {} participants",
                MAX_PARTICIPANTS
            )));
        }
        Ok(_) => {}
        Err(e) if is_unique_violation(&e) => {
            return Err(AppError::Conflict(format!(
                "already joined meeting {}",
                meeting_id
            )));
        }
        Err(e) => return Err(e.into()),
    }

    tx.commit().await?;

    log::info!("✅ {} joined meeting {}", user.email, meeting_id);

    Ok(meeting)
}

/// Attendee list, restricted to members of the meeting.
pub async fn participants(
    db: &Database,
    caller: &str,
    meeting_id: &str,
) -> Result<Vec<UserProfile>, AppError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM meetings WHERE id = ?)")
        .bind(meeting_id)
        .fetch_one(db.pool())
        .await?;
    if !exists {
        return Err(AppError::NotFound(format!("meeting {}", meeting_id)));
    }

    let member: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM participants WHERE user_id = ? AND meeting_id = ?)",
    )
    .bind(caller)
    .bind(meeting_id)
    .fetch_one(db.pool())
    .await?;
    if !member {
        return Err(AppError::Forbidden(
            "only participants may view the attendee list".into(),
        ));
    }

    let users = sqlx::query_as::<_, User>(
        "SELECT u.* FROM users u
         JOIN participants p ON p.user_id = u.email
         WHERE p.meeting_id = ?
         ORDER BY p.joined_at, u.email",
    )
    .bind(meeting_id)
    .fetch_all(db.pool())
    .await?;

    let mut profiles = Vec::with_capacity(users.len());
    for user in &users {
        profiles.push(user_service::profile_of(db, user).await?);
    }

    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{add_meeting, add_participant, add_user};

    fn request() -> CreateMeetingRequest {
        CreateMeetingRequest {
            duration_hours: 2,
            location: "the park".to_string(),
            subject: "chess".to_string(),
        }
    }

    #[test]
    fn cooldown_windows() {
        let now = Utc::now();

        assert!(!within_cooldown(None, now));
        assert!(within_cooldown(Some(now - Duration::minutes(59)), now));
        assert!(!within_cooldown(Some(now - Duration::minutes(61)), now));
    }

    #[test]
    fn meeting_codes_are_eight_alphanumerics() {
        let code = generate_code();

        assert_eq!(code.len(), 8);
        assert!(code.bytes().all(|b| b.is_ascii_alphanumeric()));
    }

    #[tokio::test]
    async fn create_enrolls_the_creator() {
        let db = Database::in_memory().await;
        add_user(&db, "a@mail.com").await;
        let now = Utc::now();

        let meeting = create_meeting(&db, "a@mail.com", &request(), now)
            .await
            .unwrap();

        assert_eq!(meeting.end_time, meeting.start_time + Duration::hours(2));
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM participants WHERE meeting_id = ?")
                .bind(&meeting.id)
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn create_within_an_hour_of_a_join_hits_the_cooldown() {
        let db = Database::in_memory().await;
        add_user(&db, "a@mail.com").await;
        let now = Utc::now();

        create_meeting(&db, "a@mail.com", &request(), now)
            .await
            .unwrap();

        let too_soon = create_meeting(&db, "a@mail.com", &request(), now).await;
        assert!(
            matches!(too_soon, Err(AppError::Forbidden(ref msg)) if msg.contains("cooldown"))
        );

        // The rejected creation leaves no meeting row behind.
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM meetings")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);

        // Past the hour the cooldown clears.
        let later = create_meeting(&db, "a@mail.com", &request(), now + Duration::hours(2)).await;
        assert!(later.is_ok());
    }

    #[tokio::test]
    async fn join_unknown_meeting_is_not_found() {
        let db = Database::in_memory().await;
        add_user(&db, "a@mail.com").await;

        let result = join_meeting(&db, "a@mail.com", "nope1234", Utc::now()).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn seventh_join_fails_when_the_meeting_is_full() {
        let db = Database::in_memory().await;
        let now = Utc::now();
        add_meeting(&db, "abc12345", now, now + Duration::hours(2)).await;
        for i in 0..6 {
            let email = format!("user{}@mail.com", i);
            add_user(&db, &email).await;
            add_participant(&db, &email, "abc12345", now - Duration::hours(3)).await;
        }
        add_user(&db, "late@mail.com").await;

        let result = join_meeting(&db, "late@mail.com", "abc12345", now).await;

        assert!(matches!(result, Err(AppError::Forbidden(ref msg)) if msg.contains("full")));
    }

    #[tokio::test]
    async fn join_within_an_hour_of_a_join_hits_the_cooldown() {
        let db = Database::in_memory().await;
        let now = Utc::now();
        add_user(&db, "a@mail.com").await;
        add_meeting(&db, "first123", now - Duration::hours(1), now + Duration::hours(1)).await;
        add_meeting(&db, "secnd123", now, now + Duration::hours(2)).await;
        add_participant(&db, "a@mail.com", "first123", now - Duration::minutes(30)).await;

        let too_soon = join_meeting(&db, "a@mail.com", "secnd123", now).await;
        assert!(
            matches!(too_soon, Err(AppError::Forbidden(ref msg)) if msg.contains("cooldown"))
        );

        // The row inside the window blocks the insert even though the
        // meeting has plenty of room.
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM participants WHERE meeting_id = ?")
                .bind("secnd123")
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_eq!(count, 0);

        let later = join_meeting(&db, "a@mail.com", "secnd123", now + Duration::hours(2)).await;
        assert!(later.is_ok());
    }

    #[tokio::test]
    async fn joining_the_same_meeting_twice_is_a_conflict() {
        let db = Database::in_memory().await;
        let now = Utc::now();
        add_user(&db, "a@mail.com").await;
        add_meeting(&db, "abc12345", now, now + Duration::hours(6)).await;

        join_meeting(&db, "a@mail.com", "abc12345", now).await.unwrap();

        // Second attempt past the cooldown so the duplicate guard is what fires.
        let result = join_meeting(&db, "a@mail.com", "abc12345", now + Duration::hours(2)).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn open_listing_excludes_ended_meetings() {
        let db = Database::in_memory().await;
        let now = Utc::now();
        add_meeting(&db, "open1234", now - Duration::hours(1), now + Duration::hours(1)).await;
        add_meeting(&db, "done1234", now - Duration::hours(3), now - Duration::hours(1)).await;

        let open = list_open(&db, now).await.unwrap();

        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, "open1234");
    }

    #[tokio::test]
    async fn attendee_list_is_for_members_only() {
        let db = Database::in_memory().await;
        let now = Utc::now();
        add_user(&db, "a@mail.com").await;
        add_user(&db, "b@mail.com").await;
        add_user(&db, "outsider@mail.com").await;
        add_meeting(&db, "abc12345", now, now + Duration::hours(2)).await;
        add_participant(&db, "a@mail.com", "abc12345", now).await;
        add_participant(&db, "b@mail.com", "abc12345", now).await;

        let listed = participants(&db, "a@mail.com", "abc12345").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].email, "a@mail.com");

        let denied = participants(&db, "outsider@mail.com", "abc12345").await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));

        let missing = participants(&db, "a@mail.com", "nope1234").await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }
}
