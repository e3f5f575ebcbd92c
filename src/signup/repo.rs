use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;

use crate::error::StoreError;

/// User record in the database. Email is the primary key; the confirmation
/// token carries a unique index.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub email: String,
    pub nickname: Option<String>,
    pub token: String,
    pub registered_at: OffsetDateTime,
    pub confirmed: bool,
    pub confirmed_at: Option<OffsetDateTime>,
}

impl User {
    /// Exact-match lookup by email. More than one matching row means the
    /// primary key no longer holds and is reported as `NotUnique`.
    pub async fn find_by_email(db: &SqlitePool, email: &str) -> Result<Option<User>, StoreError> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT email, nickname, token, registered_at, confirmed, confirmed_at
            FROM users
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_all(db)
        .await?;
        match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.into_iter().next()),
            n => Err(StoreError::NotUnique {
                column: "email",
                value: email.to_string(),
                rows: n,
            }),
        }
    }

    /// Exact-match lookup by confirmation token.
    pub async fn find_by_token(db: &SqlitePool, token: &str) -> Result<Option<User>, StoreError> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT email, nickname, token, registered_at, confirmed, confirmed_at
            FROM users
            WHERE token = ?1
            "#,
        )
        .bind(token)
        .fetch_all(db)
        .await?;
        match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.into_iter().next()),
            n => Err(StoreError::NotUnique {
                column: "token",
                value: token.to_string(),
                rows: n,
            }),
        }
    }

    /// Insert a new pending record. A unique-constraint hit maps to
    /// `AlreadyExists` so callers can recover from a registration race; the
    /// constraint itself is the hard backstop, lookups before insert are
    /// only for the user-facing message.
    pub async fn insert(&self, db: &SqlitePool) -> Result<(), StoreError> {
        let res = sqlx::query(
            r#"
            INSERT INTO users (email, nickname, token, registered_at, confirmed, confirmed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&self.email)
        .bind(&self.nickname)
        .bind(&self.token)
        .bind(self.registered_at)
        .bind(self.confirmed)
        .bind(self.confirmed_at)
        .execute(db)
        .await;

        match res {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::AlreadyExists)
            }
            Err(e) => Err(StoreError::Db(e)),
        }
    }

    /// Apply the pending→confirmed transition, conditioned on an exact
    /// (email, token) match and the record still being pending. Returns the
    /// number of rows affected: 1 on success, 0 when the token was already
    /// consumed or never matched. More than one row is an invariant breach.
    pub async fn confirm(
        db: &SqlitePool,
        email: &str,
        token: &str,
        confirmed_at: OffsetDateTime,
    ) -> Result<u64, StoreError> {
        let res = sqlx::query(
            r#"
            UPDATE users
            SET confirmed = 1, confirmed_at = ?1
            WHERE email = ?2 AND token = ?3 AND confirmed = 0
            "#,
        )
        .bind(confirmed_at)
        .bind(email)
        .bind(token)
        .execute(db)
        .await?;

        let rows = res.rows_affected();
        if rows > 1 {
            return Err(StoreError::Fatal {
                email: email.to_string(),
                rows,
            });
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;
    use time::macros::datetime;

    fn pending_user(email: &str, token: &str) -> User {
        User {
            email: email.to_string(),
            nickname: Some("dan".to_string()),
            token: token.to_string(),
            registered_at: datetime!(2026-08-07 10:00:00 +00:00),
            confirmed: false,
            confirmed_at: None,
        }
    }

    #[tokio::test]
    async fn insert_and_find_by_email() {
        let db = connect_in_memory().await.unwrap();
        pending_user("a@example.com", "t-aaa").insert(&db).await.unwrap();

        let user = User::find_by_email(&db, "a@example.com")
            .await
            .unwrap()
            .expect("user should exist");
        assert_eq!(user.email, "a@example.com");
        assert_eq!(user.nickname.as_deref(), Some("dan"));
        assert_eq!(user.token, "t-aaa");
        assert!(!user.confirmed);
        assert!(user.confirmed_at.is_none());
    }

    #[tokio::test]
    async fn find_by_email_misses_are_none() {
        let db = connect_in_memory().await.unwrap();
        let user = User::find_by_email(&db, "nobody@example.com").await.unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn find_by_token_matches_exactly() {
        let db = connect_in_memory().await.unwrap();
        pending_user("a@example.com", "t-aaa").insert(&db).await.unwrap();
        pending_user("b@example.com", "t-bbb").insert(&db).await.unwrap();

        let user = User::find_by_token(&db, "t-bbb")
            .await
            .unwrap()
            .expect("user should exist");
        assert_eq!(user.email, "b@example.com");
        assert!(User::find_by_token(&db, "t-ccc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_insert_is_rejected() {
        let db = connect_in_memory().await.unwrap();
        pending_user("a@example.com", "t-aaa").insert(&db).await.unwrap();

        let err = pending_user("a@example.com", "t-other")
            .insert(&db)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists));

        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&db)
            .await
            .unwrap();
        assert_eq!(n, 1);
    }

    #[tokio::test]
    async fn duplicate_token_insert_is_rejected() {
        let db = connect_in_memory().await.unwrap();
        pending_user("a@example.com", "t-aaa").insert(&db).await.unwrap();

        let err = pending_user("b@example.com", "t-aaa")
            .insert(&db)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists));
    }

    #[tokio::test]
    async fn confirm_transitions_exactly_once() {
        let db = connect_in_memory().await.unwrap();
        pending_user("a@example.com", "t-aaa").insert(&db).await.unwrap();
        let at = datetime!(2026-08-07 11:00:00 +00:00);

        let rows = User::confirm(&db, "a@example.com", "t-aaa", at).await.unwrap();
        assert_eq!(rows, 1);

        let user = User::find_by_email(&db, "a@example.com")
            .await
            .unwrap()
            .unwrap();
        assert!(user.confirmed);
        assert_eq!(user.confirmed_at, Some(at));

        // Terminal state: the same token falls into the zero-rows path.
        let rows = User::confirm(&db, "a@example.com", "t-aaa", at).await.unwrap();
        assert_eq!(rows, 0);
    }

    #[tokio::test]
    async fn confirm_with_wrong_token_affects_nothing() {
        let db = connect_in_memory().await.unwrap();
        pending_user("a@example.com", "t-aaa").insert(&db).await.unwrap();
        let at = datetime!(2026-08-07 11:00:00 +00:00);

        let rows = User::confirm(&db, "a@example.com", "t-wrong", at).await.unwrap();
        assert_eq!(rows, 0);

        let user = User::find_by_email(&db, "a@example.com")
            .await
            .unwrap()
            .unwrap();
        assert!(!user.confirmed);
        assert!(user.confirmed_at.is_none());
    }
}
