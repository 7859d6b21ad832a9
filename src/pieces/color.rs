/// The side to move. Represented as a signed unit so it doubles as the
/// fitness-sign multiplier used throughout static evaluation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Color {
    White = 1,
    Black = -1,
}

impl Color {
    /// The opponent's color.
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub fn multiplier(self) -> i64 {
        self as i64
    }
}

impl std::ops::Not for Color {
    type Output = Color;

    fn not(self) -> Color {
        self.opposite()
    }
}
