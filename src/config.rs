use anyhow::Context;

/// Runtime configuration, read once at startup from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    /// Earliest year a transaction may be recorded for. Tesouro Direto
    /// launched in 2002, so that is the default floor.
    pub initial_year: i32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().context("PORT must be a valid port number")?,
            Err(_) => 8000,
        };

        let initial_year = match std::env::var("TESOURO_INITIAL_YEAR") {
            Ok(raw) => raw
                .parse()
                .context("TESOURO_INITIAL_YEAR must be an integer year")?,
            Err(_) => 2002,
        };

        Ok(Self {
            database_url,
            port,
            initial_year,
        })
    }
}
