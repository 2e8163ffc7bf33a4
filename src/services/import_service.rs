//! Bulk import of historical series from the Tesouro Direto spreadsheet
//! export, converted to semicolon-delimited CSV.
//!
//! Row errors (bad values, duplicate buckets) are collected per line and
//! reported back instead of aborting the whole load.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{Action, Category};
use crate::services::titulo_service::TituloService;
use crate::validation;

/// Scale factor for sheets that quote amounts in millions of reais.
const MILLIONS: f64 = 1_000_000.0;

#[derive(Debug, Deserialize)]
struct CsvRow {
    categoria: String,
    acao: String,
    /// `YYYY-MM` bucket token, same format as the query parameters.
    data: String,
    valor: f64,
    /// `milhoes` when the sheet column is quoted in R$ (milhões).
    escala: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ImportOutcome {
    pub imported: usize,
    pub errors: Vec<String>,
}

/// Maps the spreadsheet action labels onto the stored actions. The raw
/// upper-cased names are accepted too so re-imports of exported data work.
fn parse_action_label(raw: &str) -> Option<Action> {
    match raw {
        "Vendas" | "VENDA" => Some(Action::Venda),
        "Resgates" | "RESGATE" => Some(Action::Resgate),
        _ => None,
    }
}

fn scale_multiplier(escala: Option<&str>) -> f64 {
    match escala {
        Some("milhoes") => MILLIONS,
        _ => 1.0,
    }
}

pub async fn import_file(service: &TituloService, path: &str) -> Result<ImportOutcome, AppError> {
    let file = File::open(Path::new(path))
        .map_err(|e| AppError::Validation(format!("cannot read file \"{path}\": {e}")))?;
    import_from_reader(service, file).await
}

pub async fn import_from_reader<R: Read>(
    service: &TituloService,
    reader: R,
) -> Result<ImportOutcome, AppError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b';')
        .from_reader(reader);

    let mut imported = 0;
    let mut errors = Vec::new();

    for (index, record) in csv_reader.deserialize::<CsvRow>().enumerate() {
        // Header is line 1.
        let line = index + 2;

        let row = match record {
            Ok(row) => row,
            Err(e) => {
                errors.push(format!("line {line}: {e}"));
                continue;
            }
        };

        match import_row(service, &row).await {
            Ok(()) => imported += 1,
            Err(e) => errors.push(format!("line {line}: {e}")),
        }
    }

    Ok(ImportOutcome { imported, errors })
}

async fn import_row(service: &TituloService, row: &CsvRow) -> Result<(), AppError> {
    let category: Category = row.categoria.parse().map_err(|_| {
        AppError::Validation(format!(
            "\"category\" must be one of {}.",
            Category::allowed_list()
        ))
    })?;

    let action = parse_action_label(&row.acao).ok_or_else(|| {
        AppError::Validation(format!("unknown action label \"{}\"", row.acao))
    })?;

    let (month, year) = validation::validate_date_token(&row.data, service.initial_year())?;

    let amount = row.valor * scale_multiplier(row.escala.as_deref());
    if amount <= 0.0 {
        return Err(AppError::Validation(
            "\"amount\" must be greater than zero.".to_string(),
        ));
    }

    service
        .insert_record(category, month, year, action, amount)
        .await?;
    Ok(())
}
