//! The transaction store contract and its implementations.
//!
//! The service only ever talks to [`TituloStore`]; the store is the sole
//! point of shared mutable state and is responsible for serializing
//! conflicting writes (two creates racing on the same uniqueness key must
//! resolve to one success and one conflict).

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;

use crate::errors::AppError;
use crate::models::{Action, Category};

mod postgres;
#[cfg(test)]
pub mod memory;

pub use postgres::PgTituloStore;

/// Per-month sell/redeem sums for one category, in chronological order.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthBucket {
    pub month: u32,
    pub year: i32,
    pub venda: BigDecimal,
    pub resgate: BigDecimal,
}

/// Per-year sums, ordered by year ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct YearBucket {
    pub year: i32,
    pub venda: BigDecimal,
    pub resgate: BigDecimal,
}

/// Field changes applied by an update. `expire_at` is always recomputed
/// from the merged (month, year) pair; the other fields are written only
/// when supplied.
#[derive(Debug, Clone, PartialEq)]
pub struct TituloChanges {
    pub action: Option<Action>,
    pub amount: Option<BigDecimal>,
    pub expire_at: NaiveDateTime,
}

#[async_trait]
pub trait TituloStore: Send + Sync {
    /// Inserts a record and returns the assigned id. Fails with
    /// [`AppError::Conflict`] when (category, action, expire_at) already
    /// exists, carrying the database diagnostic verbatim.
    async fn insert(
        &self,
        category: Category,
        action: Action,
        expire_at: NaiveDateTime,
        amount: BigDecimal,
    ) -> Result<i64, AppError>;

    async fn count_by_id(&self, id: i64) -> Result<i64, AppError>;

    async fn delete_by_id(&self, id: i64) -> Result<(), AppError>;

    /// The stored (month, year) pair for an id, or `None` when absent.
    async fn month_year_by_id(&self, id: i64) -> Result<Option<(u32, i32)>, AppError>;

    async fn update_fields(&self, id: i64, changes: TituloChanges) -> Result<(), AppError>;

    async fn category_by_id(&self, id: i64) -> Result<Option<Category>, AppError>;

    /// Sell/redeem sums per (month, year) bucket for a category, bounds
    /// inclusive, ordered chronologically.
    async fn scan_history(
        &self,
        category: Category,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<MonthBucket>, AppError>;

    /// Same sums collapsed to yearly buckets.
    async fn scan_history_grouped(
        &self,
        category: Category,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<YearBucket>, AppError>;
}
