use crate::bitboard::*;
use crate::error::ChessError;
use crate::square::index_to_square;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    pub fn flip(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceType {
    pub fn from_char(ch: char) -> Result<Self, ChessError> {
        match ch.to_ascii_lowercase() {
            'p' => Ok(PieceType::Pawn),
            'n' => Ok(PieceType::Knight),
            'b' => Ok(PieceType::Bishop),
            'r' => Ok(PieceType::Rook),
            'q' => Ok(PieceType::Queen),
            'k' => Ok(PieceType::King),
            _ => Err(ChessError::InvalidPiece(ch.to_string())),
        }
    }

    pub fn to_char(self) -> char {
        match self {
            PieceType::Pawn => 'p',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Rook => 'r',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        }
    }
}

/// A piece together with the square it currently stands on. The square is
/// only changed by the owning [`Position`] when it relocates the piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceType,
    pub square: u8,
}

impl Piece {
    pub fn new(color: Color, kind: PieceType, square: u8) -> Self {
        Piece {
            color,
            kind,
            square,
        }
    }
}

pub const STARTING_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

/// Board occupancy state: one bitboard per color, a combined view, and a
/// square-indexed piece lookup.
///
/// Invariants, maintained by every mutator: a square is set in exactly one
/// color's occupancy iff it holds a piece of that color, the combined
/// occupancy is always the union of both colors, and no square is ever set
/// for both colors at once.
#[derive(Clone)]
pub struct Position {
    board: [Option<Piece>; 64],
    color_bb: [Bitboard; 2],
    all_pieces: Bitboard,
}

impl Default for Position {
    fn default() -> Self {
        Self::from_placement(STARTING_PLACEMENT).unwrap()
    }
}

impl Position {
    pub fn empty() -> Self {
        Position {
            board: [None; 64],
            color_bb: [EMPTY; 2],
            all_pieces: EMPTY,
        }
    }

    /// Parses the piece-placement field of a FEN string, e.g.
    /// `"rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"`.
    pub fn from_placement(placement: &str) -> Result<Self, ChessError> {
        let mut position = Position::empty();
        let mut rank = 7i8;
        let mut file = 0i8;

        for ch in placement.chars() {
            if ch == '/' {
                if file != 8 {
                    return Err(ChessError::InvalidPlacement(placement.to_string()));
                }
                rank -= 1;
                file = 0;
                if rank < 0 {
                    return Err(ChessError::InvalidPlacement(placement.to_string()));
                }
            } else if let Some(skip) = ch.to_digit(10) {
                if skip == 0 || skip > 8 {
                    return Err(ChessError::InvalidPlacement(placement.to_string()));
                }
                file += skip as i8;
                if file > 8 {
                    return Err(ChessError::InvalidPlacement(placement.to_string()));
                }
            } else {
                if file > 7 {
                    return Err(ChessError::InvalidPlacement(placement.to_string()));
                }
                let color = if ch.is_uppercase() {
                    Color::White
                } else {
                    Color::Black
                };
                let kind = PieceType::from_char(ch)?;
                let sq = (rank * 8 + file) as u8;
                position.place(Piece::new(color, kind, sq))?;
                file += 1;
            }
        }

        if rank != 0 || file != 8 {
            return Err(ChessError::InvalidPlacement(placement.to_string()));
        }
        Ok(position)
    }

    /// Inverse of [`Position::from_placement`].
    pub fn to_placement(&self) -> String {
        let mut out = String::new();
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match self.board[rank * 8 + file] {
                    Some(piece) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        let ch = piece.kind.to_char();
                        out.push(if piece.color == Color::White {
                            ch.to_ascii_uppercase()
                        } else {
                            ch
                        });
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            if rank > 0 {
                out.push('/');
            }
        }
        out
    }

    /// Puts a piece on its square, returning any occupant it replaced.
    pub fn place(&mut self, piece: Piece) -> Result<Option<Piece>, ChessError> {
        let sq = piece.square;
        if sq > 63 {
            return Err(ChessError::InvalidSquare(sq.to_string()));
        }
        let replaced = self.take(sq);
        self.board[sq as usize] = Some(piece);
        self.color_bb[piece.color as usize] = set_bit(self.color_bb[piece.color as usize], sq);
        self.all_pieces = set_bit(self.all_pieces, sq);
        Ok(replaced)
    }

    /// Removes and returns the piece on a square, if any.
    pub fn remove(&mut self, sq: u8) -> Result<Option<Piece>, ChessError> {
        if sq > 63 {
            return Err(ChessError::InvalidSquare(sq.to_string()));
        }
        Ok(self.take(sq))
    }

    /// Moves the piece on `from` to `to`, returning any captured occupant
    /// of `to`. No legality checking: the caller decides what may move.
    pub fn relocate(&mut self, from: u8, to: u8) -> Result<Option<Piece>, ChessError> {
        if from > 63 {
            return Err(ChessError::InvalidSquare(from.to_string()));
        }
        if to > 63 {
            return Err(ChessError::InvalidSquare(to.to_string()));
        }
        let mut piece = match self.take(from) {
            Some(piece) => piece,
            None => {
                return Err(ChessError::InvalidPiece(format!(
                    "no piece on {}",
                    index_to_square(from)?
                )))
            }
        };
        piece.square = to;
        self.place(piece)
    }

    pub fn occupancy(&self, color: Color) -> Bitboard {
        self.color_bb[color as usize]
    }

    pub fn combined_occupancy(&self) -> Bitboard {
        self.all_pieces
    }

    pub fn piece_at(&self, sq: u8) -> Result<Option<Piece>, ChessError> {
        if sq > 63 {
            return Err(ChessError::InvalidSquare(sq.to_string()));
        }
        Ok(self.board[sq as usize])
    }

    /// Iterates over all pieces of one color.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = Piece> + '_ {
        let mut bb = self.color_bb[color as usize];
        std::iter::from_fn(move || {
            let (rest, sq) = pop_lsb(bb);
            bb = rest;
            sq.map(|sq| self.board[sq as usize].expect("occupancy bit without a piece"))
        })
    }

    fn take(&mut self, sq: u8) -> Option<Piece> {
        let piece = self.board[sq as usize].take()?;
        self.color_bb[piece.color as usize] = clear_bit(self.color_bb[piece.color as usize], sq);
        self.all_pieces = clear_bit(self.all_pieces, sq);
        Some(piece)
    }
}
