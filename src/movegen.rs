//! Pseudo-legal move resolution: piece-movement rules and occupancy only,
//! king safety is the caller's problem.

use crate::attacks::AttackTables;
use crate::bitboard::*;
use crate::error::ChessError;
use crate::position::{Color, Piece, PieceType, Position};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Resolved destinations for one piece. `attacked_enemies` is the subset
/// of `moves` holding opposing pieces, a capture-threat map for check
/// detection built on top of this crate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveSet {
    pub moves: Bitboard,
    pub attacked_enemies: Bitboard,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct GenOptions {
    /// Legacy double-push behavior: only the destination square of the
    /// two-square pawn advance is checked for occupancy, so a pawn may
    /// jump a blocker standing directly in front of it. Off by default;
    /// the default requires the crossed square to be empty.
    pub permissive_double_push: bool,
}

impl Default for GenOptions {
    fn default() -> Self {
        GenOptions {
            permissive_double_push: false,
        }
    }
}

/// Resolves every square `piece` can pseudo-legally move to or capture on,
/// with the default options.
pub fn reachable_squares(
    piece: &Piece,
    position: &Position,
    tables: &AttackTables,
) -> Result<MoveSet, ChessError> {
    reachable_squares_with(piece, position, tables, GenOptions::default())
}

pub fn reachable_squares_with(
    piece: &Piece,
    position: &Position,
    tables: &AttackTables,
    options: GenOptions,
) -> Result<MoveSet, ChessError> {
    let sq = piece.square;
    if sq > 63 {
        return Err(ChessError::InvalidSquare(sq.to_string()));
    }

    let own = position.occupancy(piece.color);
    let enemy = position.occupancy(piece.color.flip());

    // Sliding attacks are unioned over all rays before own pieces are
    // masked out, so a friendly first blocker still closes its ray.
    let moves = match piece.kind {
        PieceType::Knight => tables.knight_attacks[sq as usize] & !own,
        PieceType::King => tables.king_attacks[sq as usize] & !own,
        PieceType::Rook => tables.rook_attacks(sq, own | enemy) & !own,
        PieceType::Bishop => tables.bishop_attacks(sq, own | enemy) & !own,
        PieceType::Queen => tables.queen_attacks(sq, own | enemy) & !own,
        PieceType::Pawn => {
            let push = pawn_pushes(piece, position.combined_occupancy(), tables, options);
            let capture = tables.pawn_attacks[piece.color as usize][sq as usize] & enemy;
            push | capture
        }
    };

    Ok(MoveSet {
        moves,
        attacked_enemies: moves & enemy,
    })
}

fn pawn_pushes(
    piece: &Piece,
    combined: Bitboard,
    tables: &AttackTables,
    options: GenOptions,
) -> Bitboard {
    let mut push = tables.pawn_pushes[piece.color as usize][piece.square as usize] & !combined;
    if !options.permissive_double_push && push != EMPTY {
        let step: i8 = match piece.color {
            Color::White => 8,
            Color::Black => -8,
        };
        let crossed = (piece.square as i8 + step) as u8;
        if get_bit(combined, crossed) {
            // a blocked pawn cannot jump its blocker
            push = EMPTY;
        }
    }
    push
}

/// Union of the reachable squares of every piece of one color: the
/// "attacked squares" map a check detector consumes. Queries are
/// independent pure reads, so they run in parallel with an OR-reduction.
pub fn attacked_squares(
    color: Color,
    position: &Position,
    tables: &AttackTables,
) -> Result<Bitboard, ChessError> {
    let pieces: Vec<Piece> = position.pieces(color).collect();
    pieces
        .par_iter()
        .map(|piece| reachable_squares(piece, position, tables).map(|set| set.moves))
        .try_reduce(|| EMPTY, |a, b| Ok(a | b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attacks::ATTACK_TABLES;
    use crate::square::square_to_index;

    fn bb(squares: &[&str]) -> Bitboard {
        squares
            .iter()
            .fold(EMPTY, |acc, sq| set_bit(acc, square_to_index(sq).unwrap()))
    }

    fn put(position: &mut Position, color: Color, kind: PieceType, sq: &str) -> Piece {
        let piece = Piece::new(color, kind, square_to_index(sq).unwrap());
        position.place(piece).unwrap();
        piece
    }

    fn resolve(piece: &Piece, position: &Position) -> MoveSet {
        reachable_squares(piece, position, &ATTACK_TABLES).unwrap()
    }

    #[test]
    fn test_own_square_never_reachable() {
        let kinds = [
            PieceType::Pawn,
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Rook,
            PieceType::Queen,
            PieceType::King,
        ];
        for kind in kinds {
            for sq_name in ["A1", "E4", "H8", "B7"] {
                let mut position = Position::empty();
                let piece = put(&mut position, Color::White, kind, sq_name);
                let set = resolve(&piece, &position);
                assert!(
                    !get_bit(set.moves, piece.square),
                    "{:?} on {} reaches its own square",
                    kind,
                    sq_name
                );
            }
        }
    }

    #[test]
    fn test_rook_stops_at_and_includes_enemy_blocker() {
        let mut position = Position::empty();
        let rook = put(&mut position, Color::White, PieceType::Rook, "A1");
        put(&mut position, Color::Black, PieceType::Knight, "D1");

        let set = resolve(&rook, &position);
        let rank_reach = set.moves & RANK_1;
        assert_eq!(rank_reach, bb(&["B1", "C1", "D1"]));
        assert_eq!(set.attacked_enemies, bb(&["D1"]));
    }

    #[test]
    fn test_rook_excludes_friendly_blocker() {
        let mut position = Position::empty();
        let rook = put(&mut position, Color::White, PieceType::Rook, "A1");
        put(&mut position, Color::White, PieceType::Knight, "D1");

        let set = resolve(&rook, &position);
        let rank_reach = set.moves & RANK_1;
        // the friendly piece still closes the ray, it is just not a target
        assert_eq!(rank_reach, bb(&["B1", "C1"]));
        assert_eq!(set.attacked_enemies, EMPTY);
    }

    #[test]
    fn test_knight_and_king_cannot_land_on_own_pieces() {
        let mut position = Position::empty();
        let knight = put(&mut position, Color::White, PieceType::Knight, "B1");
        put(&mut position, Color::White, PieceType::Pawn, "D2");

        let set = resolve(&knight, &position);
        assert_eq!(set.moves, bb(&["A3", "C3"]));

        let mut position = Position::empty();
        let king = put(&mut position, Color::Black, PieceType::King, "H8");
        put(&mut position, Color::Black, PieceType::Rook, "G8");
        put(&mut position, Color::White, PieceType::Queen, "H7");

        let set = resolve(&king, &position);
        assert_eq!(set.moves, bb(&["G7", "H7"]));
        assert_eq!(set.attacked_enemies, bb(&["H7"]));
    }

    #[test]
    fn test_queen_unions_both_axes() {
        let mut position = Position::empty();
        let queen = put(&mut position, Color::White, PieceType::Queen, "D4");
        put(&mut position, Color::Black, PieceType::Pawn, "D6");
        put(&mut position, Color::White, PieceType::Pawn, "F6");

        let set = resolve(&queen, &position);
        let rook_like = ATTACK_TABLES.rook_attacks(queen.square, position.combined_occupancy());
        let bishop_like = ATTACK_TABLES.bishop_attacks(queen.square, position.combined_occupancy());
        assert_eq!(
            set.moves,
            (rook_like | bishop_like) & !position.occupancy(Color::White)
        );
        assert_eq!(set.attacked_enemies, bb(&["D6"]));
    }

    #[test]
    fn test_pawn_pushes_on_empty_board() {
        let mut position = Position::empty();
        let pawn = put(&mut position, Color::White, PieceType::Pawn, "E2");
        assert_eq!(resolve(&pawn, &position).moves, bb(&["E3", "E4"]));

        let mut position = Position::empty();
        let pawn = put(&mut position, Color::Black, PieceType::Pawn, "E7");
        assert_eq!(resolve(&pawn, &position).moves, bb(&["E6", "E5"]));

        // off the start rank, only the single step remains
        let mut position = Position::empty();
        let pawn = put(&mut position, Color::White, PieceType::Pawn, "E3");
        assert_eq!(resolve(&pawn, &position).moves, bb(&["E4"]));
    }

    #[test]
    fn test_pawn_cannot_jump_blocker_by_default() {
        let mut position = Position::empty();
        let pawn = put(&mut position, Color::White, PieceType::Pawn, "E2");
        put(&mut position, Color::Black, PieceType::Knight, "E3");

        let set = resolve(&pawn, &position);
        assert_eq!(set.moves, EMPTY);
        assert_eq!(set.attacked_enemies, EMPTY);
    }

    #[test]
    fn test_permissive_double_push_jumps_blocker() {
        let mut position = Position::empty();
        let pawn = put(&mut position, Color::White, PieceType::Pawn, "E2");
        put(&mut position, Color::Black, PieceType::Knight, "E3");

        let options = GenOptions {
            permissive_double_push: true,
        };
        let set = reachable_squares_with(&pawn, &position, &ATTACK_TABLES, options).unwrap();
        assert_eq!(set.moves, bb(&["E4"]));
    }

    #[test]
    fn test_pawn_double_push_blocked_at_destination() {
        let mut position = Position::empty();
        let pawn = put(&mut position, Color::White, PieceType::Pawn, "E2");
        put(&mut position, Color::Black, PieceType::Knight, "E4");

        // both modes agree: the destination itself is occupied
        for permissive in [false, true] {
            let options = GenOptions {
                permissive_double_push: permissive,
            };
            let set = reachable_squares_with(&pawn, &position, &ATTACK_TABLES, options).unwrap();
            assert_eq!(set.moves, bb(&["E3"]));
        }
    }

    #[test]
    fn test_pawn_captures_diagonally() {
        let mut position = Position::empty();
        let pawn = put(&mut position, Color::White, PieceType::Pawn, "E4");
        put(&mut position, Color::Black, PieceType::Pawn, "D5");
        put(&mut position, Color::Black, PieceType::Pawn, "F5");
        put(&mut position, Color::White, PieceType::Pawn, "E5");

        let set = resolve(&pawn, &position);
        assert_eq!(set.moves, bb(&["D5", "F5"]));
        assert_eq!(set.attacked_enemies, bb(&["D5", "F5"]));
    }

    #[test]
    fn test_out_of_range_square_rejected() {
        let position = Position::empty();
        let piece = Piece::new(Color::White, PieceType::Rook, 64);
        assert!(matches!(
            reachable_squares(&piece, &position, &ATTACK_TABLES),
            Err(ChessError::InvalidSquare(_))
        ));
    }

    #[test]
    fn test_attacked_squares_of_starting_position() {
        let position = Position::default();
        let attacked = attacked_squares(Color::White, &position, &ATTACK_TABLES).unwrap();

        // pawn pushes cover ranks 3 and 4, knight targets are inside rank 3
        let rank_3: Bitboard = 0x0000000000FF0000;
        let rank_4: Bitboard = 0x00000000FF000000;
        assert_eq!(attacked, rank_3 | rank_4);

        let attacked = attacked_squares(Color::Black, &position, &ATTACK_TABLES).unwrap();
        let rank_5: Bitboard = 0x000000FF00000000;
        let rank_6: Bitboard = 0x0000FF0000000000;
        assert_eq!(attacked, rank_5 | rank_6);
    }
}
