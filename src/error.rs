use thiserror::Error;

/// Failures raised by the core table operations.
///
/// These are surfaced synchronously to the immediate caller; a failed load
/// never produces a partial table.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A required canonical column could not be resolved from any alias.
    #[error(
        "missing required column '{field}'; the spreadsheet must contain a recognizable \
         variation of it (e.g. 'QUADRA' for BLOCO, 'PRECO' for VALOR_A_VISTA)"
    )]
    MissingColumn { field: &'static str },
    /// The schedule term, converted to months, must be positive.
    #[error("invalid term of {months} month(s); the term in years must be greater than zero")]
    InvalidTerm { months: i64 },
}
