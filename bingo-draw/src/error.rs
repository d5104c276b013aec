use bingo_db::StoreError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    OutOfRange,
    AlreadyDrawn,
}

impl std::fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidReason::OutOfRange => write!(f, "fuera del rango 1-75"),
            InvalidReason::AlreadyDrawn => write!(f, "ya salió en este sorteo"),
        }
    }
}

#[derive(Debug, Error)]
pub enum DrawError {
    #[error("Bolillero vacío : ya salieron los 75 números")]
    DrawExhausted,

    #[error("Número {number} inválido : {reason}")]
    InvalidNumber { number: u8, reason: InvalidReason },

    #[error("Error de persistencia : {0}")]
    Persistence(#[from] StoreError),

    #[error("No hay un sorteo en curso")]
    DrawNotStarted,

    #[error("No hay modalidades activas. Guarde un reporte de pagos")]
    NoActivePattern,

    #[error("No hay cartones pagados para sortear")]
    NoSoldCards,

    #[error("No hay un reporte de pagos guardado")]
    NoPayoutReport,

    #[error("Modalidad #{0} no encontrada")]
    PatternNotFound(i64),
}

impl DrawError {
    /// Rejected before any state was touched; retry once the condition holds.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            DrawError::DrawNotStarted
                | DrawError::NoActivePattern
                | DrawError::NoSoldCards
                | DrawError::NoPayoutReport
                | DrawError::PatternNotFound(_)
        )
    }

    /// The caller may keep the session going: end of balls, or a write that can be retried.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DrawError::DrawExhausted | DrawError::Persistence(_)) || self.is_precondition()
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum PayoutError {
    #[error("Premio inválido '{0}' (use Nombre=20% o Nombre=150)")]
    InvalidEntry(String),

    #[error("Valor negativo para '{0}'")]
    NegativeValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy() {
        assert!(DrawError::NoSoldCards.is_precondition());
        assert!(DrawError::DrawExhausted.is_recoverable());
        assert!(!DrawError::DrawExhausted.is_precondition());

        let desync = DrawError::InvalidNumber { number: 7, reason: InvalidReason::AlreadyDrawn };
        assert!(!desync.is_recoverable());
        assert_eq!(desync.to_string(), "Número 7 inválido : ya salió en este sorteo");

        let io = DrawError::from(StoreError::CardNotFound(3));
        assert!(io.is_recoverable());
        assert!(!io.is_precondition());
    }
}
