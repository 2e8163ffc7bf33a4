use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// The fixed set of Tesouro Direto bond categories.
///
/// Parsed once at the validation boundary; an invalid category is
/// unrepresentable past that point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "LTN")]
    Ltn,
    #[serde(rename = "LFT")]
    Lft,
    #[serde(rename = "NTN-B")]
    NtnB,
    #[serde(rename = "NTN-B Principal")]
    NtnBPrincipal,
    #[serde(rename = "NTN-C")]
    NtnC,
    #[serde(rename = "NTN-F")]
    NtnF,
}

impl Category {
    pub const NAMES: [&'static str; 6] = [
        "LTN",
        "LFT",
        "NTN-B",
        "NTN-B Principal",
        "NTN-C",
        "NTN-F",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Ltn => "LTN",
            Category::Lft => "LFT",
            Category::NtnB => "NTN-B",
            Category::NtnBPrincipal => "NTN-B Principal",
            Category::NtnC => "NTN-C",
            Category::NtnF => "NTN-F",
        }
    }

    /// The allowed set rendered the way validation messages quote it,
    /// e.g. `['LTN', 'LFT', ...]`.
    pub fn allowed_list() -> String {
        let quoted: Vec<String> = Self::NAMES.iter().map(|name| format!("'{name}'")).collect();
        format!("[{}]", quoted.join(", "))
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LTN" => Ok(Category::Ltn),
            "LFT" => Ok(Category::Lft),
            "NTN-B" => Ok(Category::NtnB),
            "NTN-B Principal" => Ok(Category::NtnBPrincipal),
            "NTN-C" => Ok(Category::NtnC),
            "NTN-F" => Ok(Category::NtnF),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sale or redemption, always stored upper-cased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    #[serde(rename = "VENDA")]
    Venda,
    #[serde(rename = "RESGATE")]
    Resgate,
}

impl Action {
    pub const NAMES: [&'static str; 2] = ["VENDA", "RESGATE"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Venda => "VENDA",
            Action::Resgate => "RESGATE",
        }
    }

    /// Lower-cased form used in response keys (`valores_venda`) and paths.
    pub fn key_suffix(&self) -> &'static str {
        match self {
            Action::Venda => "venda",
            Action::Resgate => "resgate",
        }
    }

    pub fn allowed_list() -> String {
        let quoted: Vec<String> = Self::NAMES.iter().map(|name| format!("'{name}'")).collect();
        format!("[{}]", quoted.join(", "))
    }
}

impl FromStr for Action {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VENDA" => Ok(Action::Venda),
            "RESGATE" => Ok(Action::Resgate),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A created or updated transaction record, echoed back with the
/// store-assigned id. `valor` is the raw rounded amount, never the
/// formatted currency string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Titulo {
    pub id: i64,
    pub categoria_titulo: Category,
    #[serde(rename = "mês")]
    pub mes: u32,
    pub ano: i32,
    #[serde(rename = "ação")]
    pub acao: Action,
    pub valor: f64,
}

/// One aggregated history bucket. `mes` is omitted when the report is
/// grouped by year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mes: Option<u32>,
    pub ano: i32,
    pub valor_venda: String,
    pub valor_resgate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryReport {
    pub id: i64,
    pub categoria_titulo: Category,
    pub historico: Vec<HistoryEntry>,
}

/// Single-action variant of [`HistoryEntry`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mes: Option<u32>,
    pub ano: i32,
    pub valor: String,
}

/// History filtered to a single action. The series key depends on the
/// action (`valores_venda` / `valores_resgate`), so serialization is
/// written out by hand.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionReport {
    pub id: i64,
    pub categoria_titulo: Category,
    pub action: Action,
    pub valores: Vec<ActionEntry>,
}

impl Serialize for ActionReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("categoria_titulo", &self.categoria_titulo)?;
        map.serialize_entry(&format!("valores_{}", self.action.key_suffix()), &self.valores)?;
        map.end()
    }
}
