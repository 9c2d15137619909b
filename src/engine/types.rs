use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// The two sides in a chess game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// Index for array lookups: White=0, Black=1.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Rank direction pawns of this colour advance in (+1 for White, -1 for Black).
    #[inline]
    pub const fn forward(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Back rank index (0-based): rank 1 for White, rank 8 for Black.
    #[inline]
    pub const fn back_rank(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    /// Rank a pawn of this colour starts on (0-based).
    #[inline]
    pub const fn pawn_home_rank(self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    /// Rank a pawn of this colour must stand on to capture en passant (0-based).
    #[inline]
    pub const fn en_passant_rank(self) -> u8 {
        match self {
            Color::White => 4,
            Color::Black => 3,
        }
    }

    /// Single-letter prefix used by the board grid ("w" / "b").
    pub fn prefix(self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }

    /// Capitalised name for prompts ("White" / "Black").
    pub fn name(self) -> &'static str {
        match self {
            Color::White => "White",
            Color::Black => "Black",
        }
    }
}

impl std::ops::Not for Color {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

// ---------------------------------------------------------------------------
// PieceType
// ---------------------------------------------------------------------------

/// The six piece kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceType {
    /// All piece types in order.
    pub const ALL: [PieceType; 6] = [
        PieceType::Pawn,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
    ];

    /// Single uppercase letter for white, lowercase for black.
    pub fn to_char(self, color: Color) -> char {
        let c = match self {
            PieceType::Pawn => 'p',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Rook => 'r',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        };
        match color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    /// Parse a piece character (case decides colour).
    pub fn from_char(c: char) -> Option<(Color, PieceType)> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let piece = match c.to_ascii_lowercase() {
            'p' => PieceType::Pawn,
            'n' => PieceType::Knight,
            'b' => PieceType::Bishop,
            'r' => PieceType::Rook,
            'q' => PieceType::Queen,
            'k' => PieceType::King,
            _ => return None,
        };
        Some((color, piece))
    }

    /// Resolve the promotion letter that accompanies a move request.
    ///
    /// `R`, `N`, `B` and `Q` are accepted in either case. Anything else,
    /// including no letter at all, promotes to a queen.
    pub fn promotion_choice(letter: Option<&str>) -> PieceType {
        match letter.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("r") => PieceType::Rook,
            Some("n") => PieceType::Knight,
            Some("b") => PieceType::Bishop,
            _ => PieceType::Queen,
        }
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PieceType::Pawn => write!(f, "pawn"),
            PieceType::Knight => write!(f, "knight"),
            PieceType::Bishop => write!(f, "bishop"),
            PieceType::Rook => write!(f, "rook"),
            PieceType::Queen => write!(f, "queen"),
            PieceType::King => write!(f, "king"),
        }
    }
}

// ---------------------------------------------------------------------------
// Piece
// ---------------------------------------------------------------------------

/// Occupant of a square. Empty squares are a variant of their own rather than
/// an absent entry, so the board mapping stays total.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Piece {
    #[default]
    Empty,
    Pawn(Color),
    Knight(Color),
    Bishop(Color),
    Rook(Color),
    Queen(Color),
    King(Color),
}

impl Piece {
    pub const fn new(color: Color, kind: PieceType) -> Self {
        match kind {
            PieceType::Pawn => Piece::Pawn(color),
            PieceType::Knight => Piece::Knight(color),
            PieceType::Bishop => Piece::Bishop(color),
            PieceType::Rook => Piece::Rook(color),
            PieceType::Queen => Piece::Queen(color),
            PieceType::King => Piece::King(color),
        }
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        matches!(self, Piece::Empty)
    }

    pub const fn color(self) -> Option<Color> {
        match self {
            Piece::Empty => None,
            Piece::Pawn(c)
            | Piece::Knight(c)
            | Piece::Bishop(c)
            | Piece::Rook(c)
            | Piece::Queen(c)
            | Piece::King(c) => Some(c),
        }
    }

    pub const fn kind(self) -> Option<PieceType> {
        match self {
            Piece::Empty => None,
            Piece::Pawn(_) => Some(PieceType::Pawn),
            Piece::Knight(_) => Some(PieceType::Knight),
            Piece::Bishop(_) => Some(PieceType::Bishop),
            Piece::Rook(_) => Some(PieceType::Rook),
            Piece::Queen(_) => Some(PieceType::Queen),
            Piece::King(_) => Some(PieceType::King),
        }
    }

    /// Does this square hold a piece of `color`?
    #[inline]
    pub fn is_color(self, color: Color) -> bool {
        self.color() == Some(color)
    }

    /// FEN-style letter, `None` for an empty square.
    pub fn to_char(self) -> Option<char> {
        match (self.color(), self.kind()) {
            (Some(c), Some(k)) => Some(k.to_char(c)),
            _ => None,
        }
    }

    /// Two-character grid code: colour prefix plus `p` for pawns, an
    /// uppercase letter for everything else ("wp", "bK", ...).
    pub fn code(self) -> Option<String> {
        let (color, kind) = (self.color()?, self.kind()?);
        let letter = match kind {
            PieceType::Pawn => 'p',
            other => other.to_char(Color::White),
        };
        Some(format!("{}{letter}", color.prefix()))
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.color(), self.kind()) {
            (Some(c), Some(k)) => write!(f, "{c} {k}"),
            _ => write!(f, "empty"),
        }
    }
}

// ---------------------------------------------------------------------------
// Square
// ---------------------------------------------------------------------------

/// A square on the chess board (0..63, LERF: a1=0, h8=63).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Square(pub u8);

impl Square {
    pub const NUM: usize = 64;

    #[inline]
    pub fn file(self) -> u8 {
        self.0 & 7
    }

    #[inline]
    pub fn rank(self) -> u8 {
        self.0 >> 3
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn from_file_rank(file: u8, rank: u8) -> Self {
        debug_assert!(file < 8 && rank < 8);
        Square(rank * 8 + file)
    }

    /// The square `df` files and `dr` ranks away, if it is on the board.
    pub fn offset(self, df: i8, dr: i8) -> Option<Square> {
        let f = self.file() as i8 + df;
        let r = self.rank() as i8 + dr;
        if (0..8).contains(&f) && (0..8).contains(&r) {
            Some(Square::from_file_rank(f as u8, r as u8))
        } else {
            None
        }
    }

    /// Signed (file, rank) displacement from `self` to `to`.
    #[inline]
    pub fn delta(self, to: Square) -> (i8, i8) {
        (
            to.file() as i8 - self.file() as i8,
            to.rank() as i8 - self.rank() as i8,
        )
    }

    /// Squares strictly between `self` and `to` when both lie on one file,
    /// rank or diagonal. Empty for unaligned or adjacent squares.
    pub fn between(self, to: Square) -> Vec<Square> {
        let (df, dr) = self.delta(to);
        let aligned = df == 0 || dr == 0 || df.abs() == dr.abs();
        if !aligned || self == to {
            return Vec::new();
        }
        let (step_f, step_r) = (df.signum(), dr.signum());
        let steps = df.abs().max(dr.abs());
        (1..steps)
            .filter_map(|i| self.offset(step_f * i, step_r * i))
            .collect()
    }

    /// All 64 squares in index order.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..64u8).map(Square)
    }

    /// Parse algebraic notation like "e4".
    pub fn from_algebraic(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let file = bytes[0].wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        if file < 8 && rank < 8 {
            Some(Square::from_file_rank(file, rank))
        } else {
            None
        }
    }

    /// Convert to algebraic notation like "e4".
    pub fn to_algebraic(self) -> String {
        let file = (b'a' + self.file()) as char;
        let rank = (b'1' + self.rank()) as char;
        format!("{file}{rank}")
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}

impl std::str::FromStr for Square {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Square::from_algebraic(&s.trim().to_ascii_lowercase())
            .ok_or_else(|| ChessError::InvalidSquare(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// CastlingRights
// ---------------------------------------------------------------------------

/// Which rook a castling move uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CastleSide {
    Kingside,
    Queenside,
}

impl fmt::Display for CastleSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CastleSide::Kingside => write!(f, "kingside"),
            CastleSide::Queenside => write!(f, "queenside"),
        }
    }
}

/// Castling availability bitfield.
///
/// Bits 0-3 are the rook-side rights (WK, WQ, BK, BQ). Bits 4-5 record
/// whether each king may still castle at all; they are cleared when the king
/// leaves its home square, after a castle, or once both rook-side rights of
/// that side are gone. Rights are only ever removed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CastlingRights(pub u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const WHITE_KINGSIDE: u8 = 1;
    pub const WHITE_QUEENSIDE: u8 = 2;
    pub const BLACK_KINGSIDE: u8 = 4;
    pub const BLACK_QUEENSIDE: u8 = 8;
    pub const WHITE_KING: u8 = 16;
    pub const BLACK_KING: u8 = 32;
    pub const ALL: CastlingRights = CastlingRights(0b11_1111);

    #[inline]
    pub fn has(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    /// Clear `flag`, then force the king flag off for any side that has no
    /// rook-side right left.
    pub fn remove(&mut self, flag: u8) {
        self.0 &= !flag;
        if !self.has(Self::WHITE_KINGSIDE | Self::WHITE_QUEENSIDE) {
            self.0 &= !Self::WHITE_KING;
        }
        if !self.has(Self::BLACK_KINGSIDE | Self::BLACK_QUEENSIDE) {
            self.0 &= !Self::BLACK_KING;
        }
    }

    pub const fn king_flag(color: Color) -> u8 {
        match color {
            Color::White => Self::WHITE_KING,
            Color::Black => Self::BLACK_KING,
        }
    }

    pub const fn side_flag(color: Color, side: CastleSide) -> u8 {
        match (color, side) {
            (Color::White, CastleSide::Kingside) => Self::WHITE_KINGSIDE,
            (Color::White, CastleSide::Queenside) => Self::WHITE_QUEENSIDE,
            (Color::Black, CastleSide::Kingside) => Self::BLACK_KINGSIDE,
            (Color::Black, CastleSide::Queenside) => Self::BLACK_QUEENSIDE,
        }
    }

    /// May `color`'s king still castle toward either rook?
    #[inline]
    pub fn king_may_castle(self, color: Color) -> bool {
        self.has(Self::king_flag(color))
    }

    /// The king flag and the rook-side right are both intact.
    #[inline]
    pub fn can_castle(self, color: Color, side: CastleSide) -> bool {
        self.king_may_castle(color) && self.has(Self::side_flag(color, side))
    }

    #[inline]
    pub fn can_castle_kingside(self, color: Color) -> bool {
        self.can_castle(color, CastleSide::Kingside)
    }

    #[inline]
    pub fn can_castle_queenside(self, color: Color) -> bool {
        self.can_castle(color, CastleSide::Queenside)
    }

    /// Parse FEN castling string (e.g. "KQkq", "-", "Kq").
    pub fn from_fen(s: &str) -> Option<Self> {
        if s == "-" {
            return Some(CastlingRights::NONE);
        }
        let mut rights = 0u8;
        for c in s.chars() {
            match c {
                'K' => rights |= Self::WHITE_KINGSIDE | Self::WHITE_KING,
                'Q' => rights |= Self::WHITE_QUEENSIDE | Self::WHITE_KING,
                'k' => rights |= Self::BLACK_KINGSIDE | Self::BLACK_KING,
                'q' => rights |= Self::BLACK_QUEENSIDE | Self::BLACK_KING,
                _ => return None,
            }
        }
        Some(CastlingRights(rights))
    }

    /// Convert to FEN castling string. Only rights the king can still use
    /// are written.
    pub fn to_fen(self) -> String {
        let mut s = String::with_capacity(4);
        if self.can_castle_kingside(Color::White) {
            s.push('K');
        }
        if self.can_castle_queenside(Color::White) {
            s.push('Q');
        }
        if self.can_castle_kingside(Color::Black) {
            s.push('k');
        }
        if self.can_castle_queenside(Color::Black) {
            s.push('q');
        }
        if s.is_empty() {
            s.push('-');
        }
        s
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// Outcome of a move attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    AcceptedCheck,
    AcceptedCheckmate,
    Rejected(RejectReason),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Verdict::Rejected(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Verdict::Accepted => "accepted",
            Verdict::AcceptedCheck => "check",
            Verdict::AcceptedCheckmate => "checkmate",
            Verdict::Rejected(_) => "rejected",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Rejected(reason) => write!(f, "rejected: {reason}"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a move attempt was refused. A rejected attempt never changes the
/// position.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("the game is already over")]
    GameOver,

    #[error("origin and destination are the same square")]
    SameSquare,

    #[error("not a square on the board: {0}")]
    OffBoard(String),

    #[error("no piece on {0}")]
    EmptyOrigin(Square),

    #[error("the {piece} on {square} does not belong to the side to move")]
    WrongColor { square: Square, piece: Piece },

    #[error("a {piece} cannot move from {from} to {to}")]
    IllegalGeometry {
        piece: PieceType,
        from: Square,
        to: Square,
    },

    #[error("the path from {from} to {to} is blocked")]
    PathBlocked { from: Square, to: Square },

    #[error("cannot capture own piece on {0}")]
    FriendlyFire(Square),

    #[error("move would leave the king in check")]
    LeavesKingInCheck,

    #[error("illegal castling: {0}")]
    IllegalCastle(#[from] CastleError),
}

/// Why a castling request failed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CastleError {
    #[error("{color} may no longer castle {side}")]
    RightsLost { color: Color, side: CastleSide },

    #[error("it is not {0}'s turn")]
    NotYourTurn(Color),

    #[error("the king is not on its home square")]
    KingNotHome,

    #[error("no rook on {0}")]
    RookMissing(Square),

    #[error("{0} is occupied")]
    PathBlocked(Square),

    #[error("{0} is attacked")]
    SquareAttacked(Square),
}

/// Domain errors raised while building positions from text.
#[derive(Debug, thiserror::Error)]
pub enum ChessError {
    #[error("invalid FEN string: {0}")]
    InvalidFen(String),

    #[error("invalid square notation: {0}")]
    InvalidSquare(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn color_toggle() {
        assert_eq!(!Color::White, Color::Black);
        assert_eq!(!Color::Black, Color::White);
    }

    #[test]
    fn color_display() {
        assert_eq!(Color::White.to_string(), "white");
        assert_eq!(Color::Black.name(), "Black");
    }

    #[test]
    fn piece_type_from_char_invalid() {
        assert_eq!(PieceType::from_char('x'), None);
        assert_eq!(PieceType::from_char('1'), None);
        assert_eq!(
            PieceType::from_char('N'),
            Some((Color::White, PieceType::Knight))
        );
    }

    #[test]
    fn promotion_choice_defaults_to_queen() {
        assert_eq!(PieceType::promotion_choice(None), PieceType::Queen);
        assert_eq!(PieceType::promotion_choice(Some("x")), PieceType::Queen);
        assert_eq!(PieceType::promotion_choice(Some("k")), PieceType::Queen);
        assert_eq!(PieceType::promotion_choice(Some("Q")), PieceType::Queen);
    }

    #[test]
    fn promotion_choice_is_case_insensitive() {
        assert_eq!(PieceType::promotion_choice(Some("n")), PieceType::Knight);
        assert_eq!(PieceType::promotion_choice(Some("N")), PieceType::Knight);
        assert_eq!(PieceType::promotion_choice(Some("r")), PieceType::Rook);
        assert_eq!(PieceType::promotion_choice(Some("B")), PieceType::Bishop);
    }

    #[test]
    fn piece_variants_round_trip() {
        for color in [Color::White, Color::Black] {
            for kind in PieceType::ALL {
                let p = Piece::new(color, kind);
                assert_eq!(p.color(), Some(color));
                assert_eq!(p.kind(), Some(kind));
                assert!(!p.is_empty());
            }
        }
        assert_eq!(Piece::Empty.color(), None);
        assert_eq!(Piece::Empty.kind(), None);
        assert_eq!(Piece::default(), Piece::Empty);
    }

    #[test]
    fn piece_codes() {
        assert_eq!(Piece::Pawn(Color::White).code().as_deref(), Some("wp"));
        assert_eq!(Piece::King(Color::Black).code().as_deref(), Some("bK"));
        assert_eq!(Piece::Knight(Color::White).code().as_deref(), Some("wN"));
        assert_eq!(Piece::Empty.code(), None);
    }

    #[test]
    fn square_from_algebraic() {
        assert_eq!(Square::from_algebraic("a1"), Some(Square(0)));
        assert_eq!(Square::from_algebraic("h8"), Some(Square(63)));
        assert_eq!(Square::from_algebraic("e4"), Some(Square(28)));
        assert_eq!(Square::from_algebraic("a9"), None);
        assert_eq!(Square::from_algebraic("i1"), None);
        assert_eq!(Square::from_algebraic("abc"), None);
    }

    #[test]
    fn square_from_str_ignores_case() {
        assert_eq!("E4".parse::<Square>().unwrap(), sq("e4"));
        assert!("z0".parse::<Square>().is_err());
    }

    #[test]
    fn square_offset_stays_on_board() {
        assert_eq!(sq("a1").offset(-1, 0), None);
        assert_eq!(sq("h8").offset(0, 1), None);
        assert_eq!(sq("e4").offset(1, 2), Some(sq("f6")));
    }

    #[test]
    fn between_on_lines() {
        assert_eq!(sq("a1").between(sq("a4")), vec![sq("a2"), sq("a3")]);
        assert_eq!(sq("h1").between(sq("e1")), vec![sq("g1"), sq("f1")]);
        assert_eq!(sq("c1").between(sq("f4")), vec![sq("d2"), sq("e3")]);
        assert!(sq("e4").between(sq("e5")).is_empty());
        assert!(sq("a1").between(sq("b3")).is_empty());
    }

    #[test]
    fn castling_rights_fen_round_trip() {
        for s in ["-", "K", "Kq", "KQkq", "kq", "Q"] {
            let cr = CastlingRights::from_fen(s).unwrap();
            assert_eq!(cr.to_fen(), s);
        }
        assert_eq!(CastlingRights::from_fen("X"), None);
    }

    #[test]
    fn losing_both_rook_sides_drops_king_flag() {
        let mut cr = CastlingRights::ALL;
        cr.remove(CastlingRights::WHITE_KINGSIDE);
        assert!(cr.king_may_castle(Color::White));
        assert!(cr.can_castle_queenside(Color::White));
        cr.remove(CastlingRights::WHITE_QUEENSIDE);
        assert!(!cr.king_may_castle(Color::White));
        assert!(cr.king_may_castle(Color::Black));
    }

    #[test]
    fn king_flag_gates_both_sides() {
        let mut cr = CastlingRights::ALL;
        cr.remove(CastlingRights::BLACK_KING);
        assert!(!cr.can_castle_kingside(Color::Black));
        assert!(!cr.can_castle_queenside(Color::Black));
        assert!(cr.has(CastlingRights::BLACK_KINGSIDE));
    }

    #[test]
    fn reject_reason_messages() {
        assert_eq!(
            RejectReason::EmptyOrigin(sq("e3")).to_string(),
            "no piece on e3"
        );
        let castle: RejectReason = CastleError::SquareAttacked(sq("f1")).into();
        assert_eq!(castle.to_string(), "illegal castling: f1 is attacked");
    }

    #[test]
    fn verdict_acceptance() {
        assert!(Verdict::Accepted.is_accepted());
        assert!(Verdict::AcceptedCheckmate.is_accepted());
        assert!(!Verdict::Rejected(RejectReason::SameSquare).is_accepted());
    }
}
