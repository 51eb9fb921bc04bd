//! Precomputed per-square attack tables.
//!
//! Non-sliding pieces get plain destination masks. Sliding pieces get
//! per-axis [`Ray`]s, resolved against live occupancy by [`line_attacks`]
//! in a constant number of word operations per ray.

use crate::bitboard::*;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

/// One full line through a square, the source square itself excluded:
/// the squares a sliding piece could traverse along one axis on an empty
/// board. Squares are stored in ascending-index traversal order, which is
/// the order [`line_attacks`] resolves blockers in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ray {
    squares: [u8; 7],
    len: u8,
    mask: Bitboard,
}

impl Ray {
    const EMPTY: Ray = Ray {
        squares: [0; 7],
        len: 0,
        mask: 0,
    };

    fn from_squares(squares: &[u8]) -> Ray {
        let mut ray = Ray::EMPTY;
        for &sq in squares {
            ray.squares[ray.len as usize] = sq;
            ray.len += 1;
            ray.mask = set_bit(ray.mask, sq);
        }
        ray
    }

    /// Rebuilds a ray from its mask. Ascending bit order matches the
    /// stored traversal order, so this is lossless.
    fn from_mask(mask: Bitboard) -> Ray {
        let mut squares = [0u8; 7];
        let mut len = 0u8;
        let mut bb = mask;
        while let (rest, Some(sq)) = pop_lsb(bb) {
            squares[len as usize] = sq;
            len += 1;
            bb = rest;
        }
        Ray { squares, len, mask }
    }

    pub fn squares(&self) -> &[u8] {
        &self.squares[..self.len as usize]
    }

    pub fn mask(&self) -> Bitboard {
        self.mask
    }
}

/// Resolves one ray against board occupancy: every square between the
/// slider and the first occupied square in each direction of travel is
/// reachable, that first occupied square included, everything beyond it
/// excluded. Whether the blocker is actually capturable is the caller's
/// concern.
///
/// `occ` must already have the slider's own square cleared.
#[inline(always)]
pub fn line_attacks(ray: &Ray, occ: Bitboard, origin: u8) -> Bitboard {
    let o = occ & ray.mask;
    if o == EMPTY {
        // open ray
        return ray.mask;
    }
    // Double scan: o - 2s flips exactly the bits between the slider and
    // the first blocker above it; the same subtraction over the reversed
    // board covers the downward direction, and the XOR keeps only the
    // reachable span on each side.
    let s = 1u64 << origin;
    let forward = o.wrapping_sub(s << 1);
    let backward = o
        .reverse_bits()
        .wrapping_sub(s.reverse_bits() << 1)
        .reverse_bits();
    (forward ^ backward) & ray.mask
}

pub struct AttackTables {
    pub pawn_pushes: [[Bitboard; 64]; 2],
    pub pawn_attacks: [[Bitboard; 64]; 2],
    pub knight_attacks: [Bitboard; 64],
    pub king_attacks: [Bitboard; 64],
    /// Per square: rank line, file line.
    pub rook_rays: [[Ray; 2]; 64],
    /// Per square: diagonal, anti-diagonal.
    pub bishop_rays: [[Ray; 2]; 64],
    /// Per square: the rook rays followed by the bishop rays.
    pub queen_rays: [[Ray; 4]; 64],
}

impl AttackTables {
    pub fn new() -> Self {
        let mut tables = AttackTables {
            pawn_pushes: [[0; 64]; 2],
            pawn_attacks: [[0; 64]; 2],
            knight_attacks: [0; 64],
            king_attacks: [0; 64],
            rook_rays: [[Ray::EMPTY; 2]; 64],
            bishop_rays: [[Ray::EMPTY; 2]; 64],
            queen_rays: [[Ray::EMPTY; 4]; 64],
        };

        tables.init_pawn_tables();
        tables.init_knight_attacks();
        tables.init_king_attacks();
        tables.init_rays();

        tables
    }

    fn init_pawn_tables(&mut self) {
        for sq in 0..64u8 {
            let rank = sq / 8;
            let file = sq % 8;

            // White pushes; the double step from the start rank is in the
            // table, occupancy of the crossed square is checked at query
            // time.
            if rank < 7 {
                self.pawn_pushes[0][sq as usize] = set_bit(self.pawn_pushes[0][sq as usize], sq + 8);
                if rank == 1 {
                    self.pawn_pushes[0][sq as usize] =
                        set_bit(self.pawn_pushes[0][sq as usize], sq + 16);
                }
            }

            // Black pushes
            if rank > 0 {
                self.pawn_pushes[1][sq as usize] = set_bit(self.pawn_pushes[1][sq as usize], sq - 8);
                if rank == 6 {
                    self.pawn_pushes[1][sq as usize] =
                        set_bit(self.pawn_pushes[1][sq as usize], sq - 16);
                }
            }

            // White captures, clipped at the board files
            if rank < 7 {
                if file > 0 {
                    self.pawn_attacks[0][sq as usize] =
                        set_bit(self.pawn_attacks[0][sq as usize], sq + 7);
                }
                if file < 7 {
                    self.pawn_attacks[0][sq as usize] =
                        set_bit(self.pawn_attacks[0][sq as usize], sq + 9);
                }
            }

            // Black captures
            if rank > 0 {
                if file > 0 {
                    self.pawn_attacks[1][sq as usize] =
                        set_bit(self.pawn_attacks[1][sq as usize], sq - 9);
                }
                if file < 7 {
                    self.pawn_attacks[1][sq as usize] =
                        set_bit(self.pawn_attacks[1][sq as usize], sq - 7);
                }
            }
        }
    }

    fn init_knight_attacks(&mut self) {
        let deltas: [(i8, i8); 8] = [
            (-2, -1),
            (-2, 1),
            (-1, -2),
            (-1, 2),
            (1, -2),
            (1, 2),
            (2, -1),
            (2, 1),
        ];

        for sq in 0..64 {
            let rank = (sq / 8) as i8;
            let file = (sq % 8) as i8;

            for (dr, df) in deltas.iter() {
                let new_rank = rank + dr;
                let new_file = file + df;

                if (0..8).contains(&new_rank) && (0..8).contains(&new_file) {
                    let target = (new_rank * 8 + new_file) as u8;
                    self.knight_attacks[sq as usize] = set_bit(self.knight_attacks[sq as usize], target);
                }
            }
        }
    }

    fn init_king_attacks(&mut self) {
        let deltas: [(i8, i8); 8] = [
            (-1, -1),
            (-1, 0),
            (-1, 1),
            (0, -1),
            (0, 1),
            (1, -1),
            (1, 0),
            (1, 1),
        ];

        for sq in 0..64 {
            let rank = (sq / 8) as i8;
            let file = (sq % 8) as i8;

            for (dr, df) in deltas.iter() {
                let new_rank = rank + dr;
                let new_file = file + df;

                if (0..8).contains(&new_rank) && (0..8).contains(&new_file) {
                    let target = (new_rank * 8 + new_file) as u8;
                    self.king_attacks[sq as usize] = set_bit(self.king_attacks[sq as usize], target);
                }
            }
        }
    }

    fn init_rays(&mut self) {
        for sq in 0..64u8 {
            self.rook_rays[sq as usize] = [build_ray(sq, 0, 1), build_ray(sq, 1, 0)];
            self.bishop_rays[sq as usize] = [build_ray(sq, 1, 1), build_ray(sq, 1, -1)];
            self.queen_rays[sq as usize] = [
                self.rook_rays[sq as usize][0],
                self.rook_rays[sq as usize][1],
                self.bishop_rays[sq as usize][0],
                self.bishop_rays[sq as usize][1],
            ];
        }
    }

    #[inline(always)]
    pub fn rook_attacks(&self, sq: u8, occ: Bitboard) -> Bitboard {
        // a slider is never a blocker to itself
        let occ = clear_bit(occ, sq);
        let mut attacks = EMPTY;
        for ray in &self.rook_rays[sq as usize] {
            attacks |= line_attacks(ray, occ, sq);
        }
        attacks
    }

    #[inline(always)]
    pub fn bishop_attacks(&self, sq: u8, occ: Bitboard) -> Bitboard {
        let occ = clear_bit(occ, sq);
        let mut attacks = EMPTY;
        for ray in &self.bishop_rays[sq as usize] {
            attacks |= line_attacks(ray, occ, sq);
        }
        attacks
    }

    #[inline(always)]
    pub fn queen_attacks(&self, sq: u8, occ: Bitboard) -> Bitboard {
        let occ = clear_bit(occ, sq);
        let mut attacks = EMPTY;
        for ray in &self.queen_rays[sq as usize] {
            attacks |= line_attacks(ray, occ, sq);
        }
        attacks
    }

    /// Writes every table as a dense little-endian array of bitboards,
    /// ten per square in a fixed order. The layout is an implementation
    /// detail shared only with [`AttackTables::read_dense`].
    pub fn write_dense<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for sq in 0..64 {
            writer.write_u64::<LittleEndian>(self.pawn_pushes[0][sq])?;
            writer.write_u64::<LittleEndian>(self.pawn_pushes[1][sq])?;
            writer.write_u64::<LittleEndian>(self.pawn_attacks[0][sq])?;
            writer.write_u64::<LittleEndian>(self.pawn_attacks[1][sq])?;
            writer.write_u64::<LittleEndian>(self.knight_attacks[sq])?;
            writer.write_u64::<LittleEndian>(self.king_attacks[sq])?;
            writer.write_u64::<LittleEndian>(self.rook_rays[sq][0].mask)?;
            writer.write_u64::<LittleEndian>(self.rook_rays[sq][1].mask)?;
            writer.write_u64::<LittleEndian>(self.bishop_rays[sq][0].mask)?;
            writer.write_u64::<LittleEndian>(self.bishop_rays[sq][1].mask)?;
        }
        Ok(())
    }

    /// Inverse of [`AttackTables::write_dense`]. Ray square sequences are
    /// rebuilt from the stored masks.
    pub fn read_dense<R: Read>(reader: &mut R) -> io::Result<Self> {
        let mut tables = AttackTables {
            pawn_pushes: [[0; 64]; 2],
            pawn_attacks: [[0; 64]; 2],
            knight_attacks: [0; 64],
            king_attacks: [0; 64],
            rook_rays: [[Ray::EMPTY; 2]; 64],
            bishop_rays: [[Ray::EMPTY; 2]; 64],
            queen_rays: [[Ray::EMPTY; 4]; 64],
        };
        for sq in 0..64 {
            tables.pawn_pushes[0][sq] = reader.read_u64::<LittleEndian>()?;
            tables.pawn_pushes[1][sq] = reader.read_u64::<LittleEndian>()?;
            tables.pawn_attacks[0][sq] = reader.read_u64::<LittleEndian>()?;
            tables.pawn_attacks[1][sq] = reader.read_u64::<LittleEndian>()?;
            tables.knight_attacks[sq] = reader.read_u64::<LittleEndian>()?;
            tables.king_attacks[sq] = reader.read_u64::<LittleEndian>()?;
            tables.rook_rays[sq] = [
                Ray::from_mask(reader.read_u64::<LittleEndian>()?),
                Ray::from_mask(reader.read_u64::<LittleEndian>()?),
            ];
            tables.bishop_rays[sq] = [
                Ray::from_mask(reader.read_u64::<LittleEndian>()?),
                Ray::from_mask(reader.read_u64::<LittleEndian>()?),
            ];
            tables.queen_rays[sq] = [
                tables.rook_rays[sq][0],
                tables.rook_rays[sq][1],
                tables.bishop_rays[sq][0],
                tables.bishop_rays[sq][1],
            ];
        }
        Ok(tables)
    }
}

impl Default for AttackTables {
    fn default() -> Self {
        Self::new()
    }
}

/// Walks outward from `sq` in both signs of the `(dr, df)` axis,
/// collecting every in-board square passed; `sq` itself is excluded and
/// the result is ordered along the positive traversal direction.
fn build_ray(sq: u8, dr: i8, df: i8) -> Ray {
    let rank = (sq / 8) as i8;
    let file = (sq % 8) as i8;

    let mut behind = Vec::new();
    let mut r = rank - dr;
    let mut f = file - df;
    while (0..8).contains(&r) && (0..8).contains(&f) {
        behind.push((r * 8 + f) as u8);
        r -= dr;
        f -= df;
    }

    let mut squares: Vec<u8> = behind.into_iter().rev().collect();
    let mut r = rank + dr;
    let mut f = file + df;
    while (0..8).contains(&r) && (0..8).contains(&f) {
        squares.push((r * 8 + f) as u8);
        r += dr;
        f += df;
    }

    Ray::from_squares(&squares)
}

lazy_static::lazy_static! {
    pub static ref ATTACK_TABLES: AttackTables = AttackTables::new();
}
