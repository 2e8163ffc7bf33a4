use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use sqlx::{PgPool, Row};

use crate::errors::AppError;
use crate::models::{Action, Category};
use crate::store::{MonthBucket, TituloChanges, TituloStore, YearBucket};

/// Postgres-backed store over the `tesouro_direto_series` table.
pub struct PgTituloStore {
    pool: PgPool,
}

impl PgTituloStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Unique-key violations become conflicts carrying the database detail
/// verbatim; everything else stays a database error.
fn conflict_or_db(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return AppError::Conflict(db_err.to_string());
        }
    }
    AppError::Db(err)
}

#[derive(sqlx::FromRow)]
struct MonthRow {
    month: i32,
    year: i32,
    venda: BigDecimal,
    resgate: BigDecimal,
}

#[derive(sqlx::FromRow)]
struct YearRow {
    year: i32,
    venda: BigDecimal,
    resgate: BigDecimal,
}

#[async_trait]
impl TituloStore for PgTituloStore {
    async fn insert(
        &self,
        category: Category,
        action: Action,
        expire_at: NaiveDateTime,
        amount: BigDecimal,
    ) -> Result<i64, AppError> {
        let row = sqlx::query(
            "INSERT INTO tesouro_direto_series (category, action, expire_at, amount)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(category.as_str())
        .bind(action.as_str())
        .bind(expire_at)
        .bind(&amount)
        .fetch_one(&self.pool)
        .await
        .map_err(conflict_or_db)?;

        Ok(row.try_get("id")?)
    }

    async fn count_by_id(&self, id: i64) -> Result<i64, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM tesouro_direto_series WHERE id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM tesouro_direto_series WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn month_year_by_id(&self, id: i64) -> Result<Option<(u32, i32)>, AppError> {
        let row = sqlx::query(
            "SELECT EXTRACT(MONTH FROM expire_at)::int AS month,
                    EXTRACT(YEAR FROM expire_at)::int AS year
             FROM tesouro_direto_series
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let month: i32 = row.try_get("month")?;
                let year: i32 = row.try_get("year")?;
                Ok(Some((month as u32, year)))
            }
            None => Ok(None),
        }
    }

    async fn update_fields(&self, id: i64, changes: TituloChanges) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE tesouro_direto_series
             SET action = COALESCE($2::text, action),
                 amount = COALESCE($3::numeric, amount),
                 expire_at = $4
             WHERE id = $1",
        )
        .bind(id)
        .bind(changes.action.map(|action| action.as_str()))
        .bind(changes.amount)
        .bind(changes.expire_at)
        .execute(&self.pool)
        .await
        .map_err(conflict_or_db)?;
        Ok(())
    }

    async fn category_by_id(&self, id: i64) -> Result<Option<Category>, AppError> {
        let category: Option<String> =
            sqlx::query_scalar("SELECT category FROM tesouro_direto_series WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        category
            .map(|raw| {
                raw.parse().map_err(|_| {
                    AppError::Internal(format!("unknown category \"{raw}\" stored for id {id}"))
                })
            })
            .transpose()
    }

    async fn scan_history(
        &self,
        category: Category,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<MonthBucket>, AppError> {
        let rows: Vec<MonthRow> = sqlx::query_as(
            "SELECT EXTRACT(MONTH FROM expire_at)::int AS month,
                    EXTRACT(YEAR FROM expire_at)::int AS year,
                    COALESCE(SUM(CASE WHEN action = 'VENDA' THEN amount ELSE 0 END), 0) AS venda,
                    COALESCE(SUM(CASE WHEN action = 'RESGATE' THEN amount ELSE 0 END), 0) AS resgate
             FROM tesouro_direto_series
             WHERE category = $1 AND expire_at BETWEEN $2 AND $3
             GROUP BY year, month
             ORDER BY year, month",
        )
        .bind(category.as_str())
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| MonthBucket {
                month: row.month as u32,
                year: row.year,
                venda: row.venda,
                resgate: row.resgate,
            })
            .collect())
    }

    async fn scan_history_grouped(
        &self,
        category: Category,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<YearBucket>, AppError> {
        let rows: Vec<YearRow> = sqlx::query_as(
            "SELECT EXTRACT(YEAR FROM expire_at)::int AS year,
                    COALESCE(SUM(CASE WHEN action = 'VENDA' THEN amount ELSE 0 END), 0) AS venda,
                    COALESCE(SUM(CASE WHEN action = 'RESGATE' THEN amount ELSE 0 END), 0) AS resgate
             FROM tesouro_direto_series
             WHERE category = $1 AND expire_at BETWEEN $2 AND $3
             GROUP BY year
             ORDER BY year",
        )
        .bind(category.as_str())
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| YearBucket {
                year: row.year,
                venda: row.venda,
                resgate: row.resgate,
            })
            .collect())
    }
}
