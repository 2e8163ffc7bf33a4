use crate::services::TituloService;

#[derive(Clone)]
pub struct AppState {
    pub service: TituloService,
}
