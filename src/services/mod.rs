pub mod import_service;
pub mod titulo_service;

pub use titulo_service::{RangeParams, TituloService};
