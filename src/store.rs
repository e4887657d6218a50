/// Invite code repository over SQLite
use crate::error::{InviteError, InviteResult};
use crate::model::InviteCode;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// Fields for a record about to be created; `id`, `created_at` and the
/// zero `uses` counter are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewInviteCode {
    pub code: String,
    pub issued_by: String,
    pub max_uses: i64,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Listing filter for administrative views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFilter {
    All,
    /// Only codes that are currently redeemable
    Usable,
}

/// Invite code store
#[derive(Clone)]
pub struct InviteStore {
    db: SqlitePool,
}

impl InviteStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create an invite code record
    pub async fn create(&self, new: NewInviteCode) -> InviteResult<InviteCode> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO invite_code (code, issued_by, created_at, expires_at, max_uses, uses)
            VALUES (?, ?, ?, ?, ?, 0)
            "#,
        )
        .bind(&new.code)
        .bind(&new.issued_by)
        .bind(now.to_rfc3339())
        .bind(new.expires_at.map(|dt| dt.to_rfc3339()))
        .bind(new.max_uses)
        .execute(&self.db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                InviteError::DuplicateCode
            }
            other => InviteError::Store(other),
        })?;

        Ok(InviteCode {
            id: result.last_insert_rowid(),
            code: new.code,
            issued_by: new.issued_by,
            created_at: now,
            expires_at: new.expires_at,
            max_uses: new.max_uses,
            uses: 0,
        })
    }

    /// Look up a record by its code string
    pub async fn get_by_code(&self, code: &str) -> InviteResult<Option<InviteCode>> {
        let row = sqlx::query(
            r#"
            SELECT id, code, issued_by, created_at, expires_at, max_uses, uses
            FROM invite_code
            WHERE code = ?
            "#,
        )
        .bind(code)
        .fetch_optional(&self.db)
        .await?;

        row.map(|r| parse_row(&r)).transpose()
    }

    /// Look up a record by its store-assigned id
    pub async fn get_by_id(&self, id: i64) -> InviteResult<Option<InviteCode>> {
        let row = sqlx::query(
            r#"
            SELECT id, code, issued_by, created_at, expires_at, max_uses, uses
            FROM invite_code
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.map(|r| parse_row(&r)).transpose()
    }

    /// List records for administrative views, most-used first then newest,
    /// the order the admin listing has always shown. `page` is 1-based.
    pub async fn list(
        &self,
        filter: ListFilter,
        page: u32,
        per_page: u32,
    ) -> InviteResult<Vec<InviteCode>> {
        let offset = (page.max(1) - 1) as i64 * per_page as i64;

        let query = match filter {
            ListFilter::All => sqlx::query(
                r#"
                SELECT id, code, issued_by, created_at, expires_at, max_uses, uses
                FROM invite_code
                ORDER BY uses DESC, created_at DESC
                LIMIT ? OFFSET ?
                "#,
            )
            .bind(per_page as i64)
            .bind(offset),
            ListFilter::Usable => sqlx::query(
                r#"
                SELECT id, code, issued_by, created_at, expires_at, max_uses, uses
                FROM invite_code
                WHERE uses < max_uses AND (expires_at IS NULL OR expires_at > ?)
                ORDER BY uses DESC, created_at DESC
                LIMIT ? OFFSET ?
                "#,
            )
            .bind(Utc::now().to_rfc3339())
            .bind(per_page as i64)
            .bind(offset),
        };

        let rows = query.fetch_all(&self.db).await?;

        rows.iter().map(parse_row).collect()
    }

    /// Count codes created by a user, for self-service quota checks
    pub async fn count_issued_by(&self, user: &str) -> InviteResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM invite_code WHERE issued_by = ?")
            .bind(user)
            .fetch_one(&self.db)
            .await?;

        Ok(row.get("n"))
    }

    /// Rewrite `expires_at` across a set of records, transactionally.
    ///
    /// Either every targeted record is updated or, on failure, none are;
    /// an administrator reasoning about "I just expired this batch" must
    /// never see a half-applied result. Ids that match no record are
    /// skipped and simply not counted.
    pub async fn update_expiration(
        &self,
        ids: &[i64],
        expires_at: Option<DateTime<Utc>>,
    ) -> InviteResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let expires = expires_at.map(|dt| dt.to_rfc3339());
        let mut tx = self.db.begin().await?;
        let mut updated = 0u64;

        for id in ids {
            let result = sqlx::query("UPDATE invite_code SET expires_at = ? WHERE id = ?")
                .bind(&expires)
                .bind(id)
                .execute(&mut *tx)
                .await?;
            updated += result.rows_affected();
        }

        tx.commit().await?;

        Ok(updated)
    }

    /// Consume one use if the cap still allows it.
    ///
    /// The check and the write are a single conditional UPDATE, so two
    /// redemptions racing on the last use cannot both pass: the loser's
    /// predicate no longer holds and the statement affects zero rows.
    pub async fn increment_uses_if_under_cap(&self, id: i64) -> InviteResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE invite_code
            SET uses = uses + 1
            WHERE id = ? AND uses < max_uses
            "#,
        )
        .bind(id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

fn parse_row(row: &SqliteRow) -> InviteResult<InviteCode> {
    let created_at_str: String = row.get("created_at");
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map_err(|e| InviteError::Validation(format!("Invalid timestamp: {}", e)))?
        .with_timezone(&Utc);

    // A NULL column means "never expires"; a present but unparseable
    // value is corrupt data and must not read back as never-expiring.
    let expires_at = row
        .try_get::<Option<String>, _>("expires_at")?
        .map(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| InviteError::Validation(format!("Invalid timestamp: {}", e)))
        })
        .transpose()?;

    Ok(InviteCode {
        id: row.get("id"),
        code: row.get("code"),
        issued_by: row.get("issued_by"),
        created_at,
        expires_at,
        max_uses: row.get("max_uses"),
        uses: row.get("uses"),
    })
}
