/// Domain errors. All are local, synchronous failures: nothing here is
/// transient, so callers should propagate rather than retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChessError {
    #[error("invalid square: {0}")]
    InvalidSquare(String),

    #[error("invalid piece: {0}")]
    InvalidPiece(String),

    #[error("invalid placement string: {0}")]
    InvalidPlacement(String),
}
