use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Error de base de datos: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Error de serialización: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cartón #{0} no encontrado")]
    CardNotFound(i64),

    #[error("Modalidad #{0} no encontrada")]
    PatternNotFound(i64),

    #[error("Modalidad '{0}' no encontrada")]
    UnknownPattern(String),

    #[error("Modalidad inválida : {0}")]
    InvalidPattern(String),

    #[error("Ya existe una modalidad con el nombre o las celdas de '{0}'")]
    DuplicatePattern(String),

    #[error("Cartón inválido : {0}")]
    InvalidCard(String),
}
