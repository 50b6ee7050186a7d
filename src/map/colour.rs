use serde::{Deserialize, Serialize};

/// Named display colours used in layer styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Colour {
    Black,
    Blue,
    Brown,
    Cyan,
    Green,
    Magenta,
    Maroon,
    Orange,
    Peru,
    Pink,
    Red,
    Teal,
}

impl Colour {
    pub fn hex(&self) -> &'static str {
        match self {
            Colour::Black => "#000000",
            Colour::Blue => "#0000FF",
            Colour::Brown => "#A52A2A",
            Colour::Cyan => "#00FFFF",
            Colour::Green => "#008000",
            Colour::Magenta => "#FF00FF",
            Colour::Maroon => "#800000",
            Colour::Orange => "#FFA500",
            Colour::Peru => "#CD853F",
            Colour::Pink => "#FFC0CB",
            Colour::Red => "#FF0000",
            Colour::Teal => "#008080",
        }
    }
}

impl std::fmt::Display for Colour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hex())
    }
}
