//! Pseudo-legal chess move generation on 64-bit bitboards.
//!
//! Attack tables for every square are built once (king, knight and pawn
//! destination masks; per-axis rays for the sliding pieces) and shared
//! immutably for the life of the process. A move query resolves a piece
//! against a [`Position`] snapshot and returns a bitboard of reachable
//! squares plus the subset holding enemy pieces; sliding reach is computed
//! per ray with a constant number of word operations. King safety,
//! castling, en passant and search belong to the layers above.

pub mod attacks;
pub mod bitboard;
pub mod error;
pub mod movegen;
pub mod position;
pub mod square;

pub use attacks::{line_attacks, AttackTables, Ray, ATTACK_TABLES};
pub use bitboard::Bitboard;
pub use error::ChessError;
pub use movegen::{attacked_squares, reachable_squares, reachable_squares_with, GenOptions, MoveSet};
pub use position::{Color, Piece, PieceType, Position, STARTING_PLACEMENT};
pub use square::{index_to_rank_file, index_to_square, rank_file_to_index, square_to_index};
