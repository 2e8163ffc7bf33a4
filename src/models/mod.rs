mod titulo;

pub use titulo::{
    Action, ActionEntry, ActionReport, Category, HistoryEntry, HistoryReport, Titulo,
};
