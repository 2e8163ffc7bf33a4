//! In-memory [`TituloStore`] used by service tests in place of Postgres.
//! Mirrors the table semantics: sequential ids, the (category, action,
//! expire_at) uniqueness key, and inclusive range scans.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDateTime;

use crate::errors::AppError;
use crate::models::{Action, Category};
use crate::store::{MonthBucket, TituloChanges, TituloStore, YearBucket};

#[derive(Debug, Clone)]
struct StoredRow {
    id: i64,
    category: Category,
    action: Action,
    expire_at: NaiveDateTime,
    amount: BigDecimal,
}

#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    rows: Vec<StoredRow>,
    next_id: i64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn month_of(expire_at: NaiveDateTime) -> u32 {
    use chrono::Datelike;
    expire_at.date().month()
}

fn year_of(expire_at: NaiveDateTime) -> i32 {
    use chrono::Datelike;
    expire_at.date().year()
}

#[async_trait]
impl TituloStore for InMemoryStore {
    async fn insert(
        &self,
        category: Category,
        action: Action,
        expire_at: NaiveDateTime,
        amount: BigDecimal,
    ) -> Result<i64, AppError> {
        let mut inner = self.inner.lock().unwrap();

        let duplicate = inner.rows.iter().any(|row| {
            row.category == category && row.action == action && row.expire_at == expire_at
        });
        if duplicate {
            return Err(AppError::Conflict(
                "duplicate key value violates unique constraint \
                 \"tesouro_direto_series_category_action_expire_at_key\""
                    .to_string(),
            ));
        }

        inner.next_id += 1;
        let id = inner.next_id;
        inner.rows.push(StoredRow {
            id,
            category,
            action,
            expire_at,
            amount,
        });
        Ok(id)
    }

    async fn count_by_id(&self, id: i64) -> Result<i64, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.rows.iter().filter(|row| row.id == id).count() as i64)
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        inner.rows.retain(|row| row.id != id);
        Ok(())
    }

    async fn month_year_by_id(&self, id: i64) -> Result<Option<(u32, i32)>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .rows
            .iter()
            .find(|row| row.id == id)
            .map(|row| (month_of(row.expire_at), year_of(row.expire_at))))
    }

    async fn update_fields(&self, id: i64, changes: TituloChanges) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(index) = inner.rows.iter().position(|row| row.id == id) {
            let mut updated = inner.rows[index].clone();
            if let Some(action) = changes.action {
                updated.action = action;
            }
            if let Some(amount) = changes.amount {
                updated.amount = amount;
            }
            updated.expire_at = changes.expire_at;

            let duplicate = inner.rows.iter().any(|row| {
                row.id != id
                    && row.category == updated.category
                    && row.action == updated.action
                    && row.expire_at == updated.expire_at
            });
            if duplicate {
                return Err(AppError::Conflict(
                    "duplicate key value violates unique constraint \
                     \"tesouro_direto_series_category_action_expire_at_key\""
                        .to_string(),
                ));
            }

            inner.rows[index] = updated;
        }
        Ok(())
    }

    async fn category_by_id(&self, id: i64) -> Result<Option<Category>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .rows
            .iter()
            .find(|row| row.id == id)
            .map(|row| row.category))
    }

    async fn scan_history(
        &self,
        category: Category,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<MonthBucket>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut buckets: BTreeMap<(i32, u32), (BigDecimal, BigDecimal)> = BTreeMap::new();

        for row in inner.rows.iter().filter(|row| {
            row.category == category && row.expire_at >= start && row.expire_at <= end
        }) {
            let key = (year_of(row.expire_at), month_of(row.expire_at));
            let sums = buckets
                .entry(key)
                .or_insert_with(|| (BigDecimal::zero(), BigDecimal::zero()));
            match row.action {
                Action::Venda => sums.0 += &row.amount,
                Action::Resgate => sums.1 += &row.amount,
            }
        }

        Ok(buckets
            .into_iter()
            .map(|((year, month), (venda, resgate))| MonthBucket {
                month,
                year,
                venda,
                resgate,
            })
            .collect())
    }

    async fn scan_history_grouped(
        &self,
        category: Category,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<YearBucket>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut buckets: BTreeMap<i32, (BigDecimal, BigDecimal)> = BTreeMap::new();

        for row in inner.rows.iter().filter(|row| {
            row.category == category && row.expire_at >= start && row.expire_at <= end
        }) {
            let sums = buckets
                .entry(year_of(row.expire_at))
                .or_insert_with(|| (BigDecimal::zero(), BigDecimal::zero()));
            match row.action {
                Action::Venda => sums.0 += &row.amount,
                Action::Resgate => sums.1 += &row.amount,
            }
        }

        Ok(buckets
            .into_iter()
            .map(|(year, (venda, resgate))| YearBucket {
                year,
                venda,
                resgate,
            })
            .collect())
    }
}
