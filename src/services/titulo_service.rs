//! Orchestrates validation, bucket computation and store calls for the
//! titulo tesouro CRUD and history reports.

use std::sync::Arc;

use bigdecimal::{BigDecimal, FromPrimitive, RoundingMode, ToPrimitive};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::currency::format_brl;
use crate::dates::{self, DateRange};
use crate::errors::AppError;
use crate::models::{Action, ActionEntry, ActionReport, Category, HistoryEntry, HistoryReport, Titulo};
use crate::store::{TituloChanges, TituloStore};
use crate::validation;

/// Rounds a validated amount to two decimals, half to even, over the
/// exact decimal expansion of the float. `10.005_f64` sits just below
/// 10.005, so naive `(amount * 100.0).round()` would push it up to
/// 10.01; rounding the expansion keeps the stored value faithful to the
/// number the caller sent.
fn normalize_amount(amount: f64) -> Result<(f64, BigDecimal), AppError> {
    let stored = BigDecimal::from_f64(amount)
        .ok_or_else(|| AppError::Internal(format!("amount {amount} is not a decimal number")))?
        .with_scale_round(2, RoundingMode::HalfEven);
    let rounded = stored
        .to_f64()
        .ok_or_else(|| AppError::Internal(format!("amount {amount} out of range")))?;
    Ok((rounded, stored))
}

/// Optional query parameters shared by the history endpoints.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RangeParams {
    pub data_inicio: Option<String>,
    pub data_fim: Option<String>,
    pub group_by: Option<String>,
}

#[derive(Clone)]
pub struct TituloService {
    store: Arc<dyn TituloStore>,
    initial_year: i32,
}

impl TituloService {
    pub fn new(store: Arc<dyn TituloStore>, initial_year: i32) -> Self {
        Self {
            store,
            initial_year,
        }
    }

    pub(crate) fn initial_year(&self) -> i32 {
        self.initial_year
    }

    /// Validates and creates a transaction record, returning it with the
    /// store-assigned id. Validation is fail-fast in field order after the
    /// presence check, which reports every missing field at once.
    pub async fn create(&self, body: &Map<String, Value>) -> Result<Titulo, AppError> {
        let fields = validation::require_create_fields(body)?;

        let category = validation::validate_category(fields.categoria_titulo)?;
        let month = validation::validate_month(fields.mes)?;
        let year = validation::validate_year(fields.ano, self.initial_year)?;
        let action = validation::validate_action(fields.acao)?;
        let amount = validation::validate_amount(fields.valor)?;

        self.insert_record(category, month, year, action, amount)
            .await
    }

    /// Shared insert path for create and bulk import: normalizes the
    /// amount to two decimals and computes the canonical expiry bucket.
    pub(crate) async fn insert_record(
        &self,
        category: Category,
        month: u32,
        year: i32,
        action: Action,
        amount: f64,
    ) -> Result<Titulo, AppError> {
        let expire_at = dates::canonical_expiry(month, year);
        let (rounded, stored) = normalize_amount(amount)?;

        let id = self.store.insert(category, action, expire_at, stored).await?;

        Ok(Titulo {
            id,
            categoria_titulo: category,
            mes: month,
            ano: year,
            acao: action,
            valor: rounded,
        })
    }

    /// Deletes by id. Returns `false` when no record exists; the delete is
    /// only issued after an explicit existence check.
    pub async fn delete(&self, raw_id: &str) -> Result<bool, AppError> {
        let id = validation::validate_titulo_id(raw_id)?;

        if self.store.count_by_id(id).await? == 0 {
            return Ok(false);
        }
        self.store.delete_by_id(id).await?;
        Ok(true)
    }

    /// Applies a partial update. The category is immutable: naming it in
    /// the payload fails validation before any store access, whether or
    /// not the id exists. Supplied month/year values are merged over the
    /// stored pair before the expiry bucket is recomputed.
    pub async fn update(&self, raw_id: &str, body: &Map<String, Value>) -> Result<bool, AppError> {
        let id = validation::validate_titulo_id(raw_id)?;

        if body.contains_key("categoria_titulo") {
            return Err(AppError::Validation(
                "Field \"categoria_titulo\" cannot be updated".to_string(),
            ));
        }

        let Some((mut month, mut year)) = self.store.month_year_by_id(id).await? else {
            return Ok(false);
        };

        if let Some(value) = body.get("mês") {
            month = validation::validate_month(value)?;
        }
        if let Some(value) = body.get("ano") {
            year = validation::validate_year(value, self.initial_year)?;
        }

        let mut changes = TituloChanges {
            action: None,
            amount: None,
            expire_at: dates::canonical_expiry(month, year),
        };

        if let Some(value) = body.get("ação") {
            changes.action = Some(validation::validate_action(value)?);
        }
        if let Some(value) = body.get("valor") {
            let amount = validation::validate_amount(value)?;
            let (_, stored) = normalize_amount(amount)?;
            changes.amount = Some(stored);
        }

        self.store.update_fields(id, changes).await?;
        Ok(true)
    }

    /// The two-series history report for the category the id belongs to,
    /// monthly by default or collapsed to yearly buckets with
    /// `group_by=true`. `None` when the id has no record.
    pub async fn read_history(
        &self,
        raw_id: &str,
        params: &RangeParams,
    ) -> Result<Option<HistoryReport>, AppError> {
        let id = validation::validate_titulo_id(raw_id)?;
        let (range, group_by) = self.resolve_range(params)?;

        let Some(category) = self.store.category_by_id(id).await? else {
            return Ok(None);
        };

        let historico = if group_by {
            self.store
                .scan_history_grouped(category, range.start, range.end)
                .await?
                .into_iter()
                .map(|bucket| HistoryEntry {
                    mes: None,
                    ano: bucket.year,
                    valor_venda: format_brl(&bucket.venda),
                    valor_resgate: format_brl(&bucket.resgate),
                })
                .collect()
        } else {
            self.store
                .scan_history(category, range.start, range.end)
                .await?
                .into_iter()
                .map(|bucket| HistoryEntry {
                    mes: Some(bucket.month),
                    ano: bucket.year,
                    valor_venda: format_brl(&bucket.venda),
                    valor_resgate: format_brl(&bucket.resgate),
                })
                .collect()
        };

        Ok(Some(HistoryReport {
            id,
            categoria_titulo: category,
            historico,
        }))
    }

    /// Like [`read_history`](Self::read_history) but restricted to one
    /// action, yielding a single amount series.
    pub async fn read_by_action(
        &self,
        raw_id: &str,
        action: Action,
        params: &RangeParams,
    ) -> Result<Option<ActionReport>, AppError> {
        let id = validation::validate_titulo_id(raw_id)?;
        let (range, group_by) = self.resolve_range(params)?;

        let Some(category) = self.store.category_by_id(id).await? else {
            return Ok(None);
        };

        let pick = |venda: &BigDecimal, resgate: &BigDecimal| match action {
            Action::Venda => format_brl(venda),
            Action::Resgate => format_brl(resgate),
        };

        let valores = if group_by {
            self.store
                .scan_history_grouped(category, range.start, range.end)
                .await?
                .into_iter()
                .map(|bucket| ActionEntry {
                    mes: None,
                    ano: bucket.year,
                    valor: pick(&bucket.venda, &bucket.resgate),
                })
                .collect()
        } else {
            self.store
                .scan_history(category, range.start, range.end)
                .await?
                .into_iter()
                .map(|bucket| ActionEntry {
                    mes: Some(bucket.month),
                    ano: bucket.year,
                    valor: pick(&bucket.venda, &bucket.resgate),
                })
                .collect()
        };

        Ok(Some(ActionReport {
            id,
            categoria_titulo: category,
            action,
            valores,
        }))
    }

    fn resolve_range(&self, params: &RangeParams) -> Result<(DateRange, bool), AppError> {
        let mut range = DateRange::defaults(self.initial_year);

        if let Some(token) = &params.data_inicio {
            range.start = dates::parse_range_token(token, self.initial_year)?;
        }
        if let Some(token) = &params.data_fim {
            range.end = dates::parse_range_token(token, self.initial_year)?;
        }

        let group_by = match &params.group_by {
            Some(raw) => validation::validate_group_by(raw)?,
            None => false,
        };

        Ok((range, group_by))
    }
}
