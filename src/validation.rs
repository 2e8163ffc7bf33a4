//! Field validators for titulo tesouro input.
//!
//! Each validator either returns the parsed, normalized value or fails with
//! the field-specific message. Validators are pure and independent; the
//! service composes them in field order and stops at the first failure.

use serde_json::{Map, Value};

use crate::errors::AppError;
use crate::models::{Action, Category};

/// Create-payload fields in declaration order.
pub const CREATE_FIELDS: [&str; 5] = ["categoria_titulo", "mês", "ano", "ação", "valor"];

/// Largest accepted year. Keeps every (month, year) pair representable
/// as a calendar date and well inside `i32`.
pub const MAX_YEAR: i64 = 9999;

/// References to the five mandatory create fields, extracted up front so
/// missing fields are reported all at once before any value validation.
#[derive(Debug)]
pub struct CreateFields<'a> {
    pub categoria_titulo: &'a Value,
    pub mes: &'a Value,
    pub ano: &'a Value,
    pub acao: &'a Value,
    pub valor: &'a Value,
}

pub fn require_create_fields(body: &Map<String, Value>) -> Result<CreateFields<'_>, AppError> {
    let missing: Vec<&str> = CREATE_FIELDS
        .iter()
        .copied()
        .filter(|field| !body.contains_key(*field))
        .collect();

    if !missing.is_empty() {
        let listed: Vec<String> = missing.iter().map(|field| format!("'{field}'")).collect();
        return Err(AppError::Validation(format!(
            "Mandatory fields [{}] missing.",
            listed.join(", ")
        )));
    }

    Ok(CreateFields {
        categoria_titulo: &body[CREATE_FIELDS[0]],
        mes: &body[CREATE_FIELDS[1]],
        ano: &body[CREATE_FIELDS[2]],
        acao: &body[CREATE_FIELDS[3]],
        valor: &body[CREATE_FIELDS[4]],
    })
}

pub fn validate_category(value: &Value) -> Result<Category, AppError> {
    let text = value
        .as_str()
        .ok_or_else(|| AppError::Validation("\"category\" must be a string.".to_string()))?;

    text.parse().map_err(|_| {
        AppError::Validation(format!(
            "\"category\" must be one of {}.",
            Category::allowed_list()
        ))
    })
}

pub fn validate_month(value: &Value) -> Result<u32, AppError> {
    let month = value
        .as_i64()
        .ok_or_else(|| AppError::Validation("\"month\" must be an integer.".to_string()))?;
    month_in_range(month)
}

pub fn month_in_range(month: i64) -> Result<u32, AppError> {
    if !(1..=12).contains(&month) {
        return Err(AppError::Validation(
            "\"month\" must be in interval [1, 12].".to_string(),
        ));
    }
    Ok(month as u32)
}

pub fn validate_year(value: &Value, initial_year: i32) -> Result<i32, AppError> {
    let year = value
        .as_i64()
        .ok_or_else(|| AppError::Validation("\"year\" must be an integer.".to_string()))?;
    year_in_range(year, initial_year)
}

pub fn year_in_range(year: i64, initial_year: i32) -> Result<i32, AppError> {
    if year < i64::from(initial_year) {
        return Err(AppError::Validation(format!(
            "\"year\" must be greater than or equal to {initial_year}."
        )));
    }
    if year > MAX_YEAR {
        return Err(AppError::Validation(format!(
            "\"year\" must be less than or equal to {MAX_YEAR}."
        )));
    }
    Ok(year as i32)
}

pub fn validate_action(value: &Value) -> Result<Action, AppError> {
    let text = value
        .as_str()
        .ok_or_else(|| AppError::Validation("\"action\" must be a string.".to_string()))?;

    text.to_uppercase().parse().map_err(|_| {
        AppError::Validation(format!(
            "\"action\" must be one of {}.",
            Action::allowed_list()
        ))
    })
}

pub fn validate_amount(value: &Value) -> Result<f64, AppError> {
    let amount = value
        .as_f64()
        .ok_or_else(|| AppError::Validation("\"amount\" must be a float or a int.".to_string()))?;

    if amount <= 0.0 {
        return Err(AppError::Validation(
            "\"amount\" must be greater than zero.".to_string(),
        ));
    }
    Ok(amount)
}

pub fn validate_titulo_id(raw: &str) -> Result<i64, AppError> {
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation(
            "\"titulo_id\" must be an int.".to_string(),
        ));
    }

    let id: i64 = raw
        .parse()
        .map_err(|_| AppError::Validation("\"titulo_id\" must be an int.".to_string()))?;

    if id <= 0 {
        return Err(AppError::Validation(
            "\"titulo_id\" must be greater than zero.".to_string(),
        ));
    }
    Ok(id)
}

/// Validates a `YYYY-MM` range token and returns the (month, year) pair.
pub fn validate_date_token(token: &str, initial_year: i32) -> Result<(u32, i32), AppError> {
    let parts: Vec<&str> = token.split('-').collect();
    if parts.len() != 2 {
        return Err(AppError::Validation(
            "date not in format \"YYYY-mm\"".to_string(),
        ));
    }

    let (year_raw, month_raw) = (parts[0], parts[1]);

    if year_raw.is_empty() || !year_raw.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation(
            "year must be a positive int.".to_string(),
        ));
    }
    let year: i64 = year_raw
        .parse()
        .map_err(|_| AppError::Validation("year must be a positive int.".to_string()))?;
    let year = year_in_range(year, initial_year)?;

    if month_raw.is_empty() || !month_raw.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation(
            "month must be a positive int.".to_string(),
        ));
    }
    let month: i64 = month_raw
        .parse()
        .map_err(|_| AppError::Validation("month must be a positive int.".to_string()))?;
    let month = month_in_range(month)?;

    Ok((month, year))
}

pub fn validate_group_by(raw: &str) -> Result<bool, AppError> {
    match raw {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(AppError::Validation(
            "\"group_by\" must be \"true\" or \"false\".".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const INITIAL_YEAR: i32 = 2002;

    fn message(err: AppError) -> String {
        match err {
            AppError::Validation(msg) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn missing_fields_are_reported_together() {
        let body = json!({ "categoria_titulo": "NTN-B" });
        let err = require_create_fields(body.as_object().unwrap()).unwrap_err();
        assert_eq!(
            message(err),
            "Mandatory fields ['mês', 'ano', 'ação', 'valor'] missing."
        );
    }

    #[test]
    fn complete_body_passes_presence_check() {
        let body = json!({
            "categoria_titulo": "NTN-B",
            "mês": 4,
            "ano": 2017,
            "ação": "venda",
            "valor": 15000
        });
        assert!(require_create_fields(body.as_object().unwrap()).is_ok());
    }

    #[test]
    fn category_must_be_a_string() {
        let err = validate_category(&json!(1)).unwrap_err();
        assert_eq!(message(err), "\"category\" must be a string.");
    }

    #[test]
    fn category_must_be_in_the_fixed_set() {
        let err = validate_category(&json!("something")).unwrap_err();
        assert_eq!(
            message(err),
            "\"category\" must be one of ['LTN', 'LFT', 'NTN-B', 'NTN-B Principal', 'NTN-C', 'NTN-F']."
        );
        assert_eq!(
            validate_category(&json!("NTN-B Principal")).unwrap(),
            Category::NtnBPrincipal
        );
    }

    #[test]
    fn month_must_be_an_integer() {
        assert_eq!(
            message(validate_month(&json!("January")).unwrap_err()),
            "\"month\" must be an integer."
        );
        // JSON floats are not integers, mirroring the strict type check.
        assert_eq!(
            message(validate_month(&json!(4.5)).unwrap_err()),
            "\"month\" must be an integer."
        );
    }

    #[test]
    fn month_bounds_are_inclusive() {
        assert_eq!(
            message(validate_month(&json!(0)).unwrap_err()),
            "\"month\" must be in interval [1, 12]."
        );
        assert_eq!(
            message(validate_month(&json!(13)).unwrap_err()),
            "\"month\" must be in interval [1, 12]."
        );
        assert_eq!(validate_month(&json!(1)).unwrap(), 1);
        assert_eq!(validate_month(&json!(12)).unwrap(), 12);
    }

    #[test]
    fn year_must_be_at_least_the_initial_year() {
        assert_eq!(
            message(validate_year(&json!("2017"), INITIAL_YEAR).unwrap_err()),
            "\"year\" must be an integer."
        );
        assert_eq!(
            message(validate_year(&json!(2001), INITIAL_YEAR).unwrap_err()),
            "\"year\" must be greater than or equal to 2002."
        );
        assert_eq!(validate_year(&json!(2002), INITIAL_YEAR).unwrap(), 2002);
    }

    #[test]
    fn year_has_an_upper_bound() {
        // Years past the ceiling must fail validation, not reach the
        // calendar code.
        assert_eq!(
            message(validate_year(&json!(300000), INITIAL_YEAR).unwrap_err()),
            "\"year\" must be less than or equal to 9999."
        );
        // Values past i32 must not wrap into the accepted range.
        assert_eq!(
            message(year_in_range((1i64 << 33) + 5, INITIAL_YEAR).unwrap_err()),
            "\"year\" must be less than or equal to 9999."
        );
        assert_eq!(validate_year(&json!(9999), INITIAL_YEAR).unwrap(), 9999);
    }

    #[test]
    fn action_is_case_insensitive_but_closed() {
        assert_eq!(
            message(validate_action(&json!(1)).unwrap_err()),
            "\"action\" must be a string."
        );
        assert_eq!(
            message(validate_action(&json!("aluguel")).unwrap_err()),
            "\"action\" must be one of ['VENDA', 'RESGATE']."
        );
        assert_eq!(validate_action(&json!("venda")).unwrap(), Action::Venda);
        assert_eq!(validate_action(&json!("RESGATE")).unwrap(), Action::Resgate);
    }

    #[test]
    fn amount_must_be_a_positive_number() {
        assert_eq!(
            message(validate_amount(&json!("15000")).unwrap_err()),
            "\"amount\" must be a float or a int."
        );
        assert_eq!(
            message(validate_amount(&json!(0)).unwrap_err()),
            "\"amount\" must be greater than zero."
        );
        assert_eq!(validate_amount(&json!(15000)).unwrap(), 15000.0);
        assert_eq!(validate_amount(&json!(0.01)).unwrap(), 0.01);
    }

    #[test]
    fn titulo_id_must_be_a_positive_integer_string() {
        assert_eq!(
            message(validate_titulo_id("three").unwrap_err()),
            "\"titulo_id\" must be an int."
        );
        assert_eq!(
            message(validate_titulo_id("-1").unwrap_err()),
            "\"titulo_id\" must be an int."
        );
        assert_eq!(
            message(validate_titulo_id("0").unwrap_err()),
            "\"titulo_id\" must be greater than zero."
        );
        assert_eq!(validate_titulo_id("7").unwrap(), 7);
        assert_eq!(validate_titulo_id("007").unwrap(), 7);
    }

    #[test]
    fn date_token_shape_is_checked_first() {
        assert_eq!(
            message(validate_date_token("-2015-05", INITIAL_YEAR).unwrap_err()),
            "date not in format \"YYYY-mm\""
        );
        assert_eq!(
            message(validate_date_token("2015", INITIAL_YEAR).unwrap_err()),
            "date not in format \"YYYY-mm\""
        );
    }

    #[test]
    fn date_token_parts_must_be_digits() {
        assert_eq!(
            message(validate_date_token("abcd-05", INITIAL_YEAR).unwrap_err()),
            "year must be a positive int."
        );
        assert_eq!(
            message(validate_date_token("2015-May", INITIAL_YEAR).unwrap_err()),
            "month must be a positive int."
        );
    }

    #[test]
    fn date_token_reuses_range_checks() {
        assert_eq!(
            message(validate_date_token("2001-05", INITIAL_YEAR).unwrap_err()),
            "\"year\" must be greater than or equal to 2002."
        );
        assert_eq!(
            message(validate_date_token("2015-13", INITIAL_YEAR).unwrap_err()),
            "\"month\" must be in interval [1, 12]."
        );
        assert_eq!(
            message(validate_date_token("300000-05", INITIAL_YEAR).unwrap_err()),
            "\"year\" must be less than or equal to 9999."
        );
        assert_eq!(
            validate_date_token("2014-05", INITIAL_YEAR).unwrap(),
            (5, 2014)
        );
    }

    #[test]
    fn group_by_accepts_only_literal_booleans() {
        assert!(validate_group_by("true").unwrap());
        assert!(!validate_group_by("false").unwrap());
        assert_eq!(
            message(validate_group_by("yes").unwrap_err()),
            "\"group_by\" must be \"true\" or \"false\"."
        );
    }
}
