use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// One of the four playable colors. Chosen colors and the active color of a
/// game are always this type, so an active color of WILD cannot be
/// represented.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Color {
    Red,
    Yellow,
    Green,
    Blue,
}

impl Color {
    pub const ALL: [Color; 4] = [Color::Red, Color::Yellow, Color::Green, Color::Blue];
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::Red => write!(f, "RED"),
            Color::Yellow => write!(f, "YELLOW"),
            Color::Green => write!(f, "GREEN"),
            Color::Blue => write!(f, "BLUE"),
        }
    }
}

/// The color printed on a card: a real color, or the WILD sentinel carried
/// by wild cards.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CardColor {
    Red,
    Yellow,
    Green,
    Blue,
    Wild,
}

impl CardColor {
    pub fn as_color(&self) -> Option<Color> {
        match self {
            CardColor::Red => Some(Color::Red),
            CardColor::Yellow => Some(Color::Yellow),
            CardColor::Green => Some(Color::Green),
            CardColor::Blue => Some(Color::Blue),
            CardColor::Wild => None,
        }
    }
}

impl From<Color> for CardColor {
    fn from(color: Color) -> CardColor {
        match color {
            Color::Red => CardColor::Red,
            Color::Yellow => CardColor::Yellow,
            Color::Green => CardColor::Green,
            Color::Blue => CardColor::Blue,
        }
    }
}

impl Display for CardColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.as_color() {
            Some(color) => write!(f, "{}", color),
            None => write!(f, "WILD"),
        }
    }
}

/// Card face. Serde names match the wire protocol, where numerals are the
/// strings `"0"` through `"9"`.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum CardKind {
    #[serde(rename = "0")]
    Zero,
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "SKIP")]
    Skip,
    #[serde(rename = "REVERSE")]
    Reverse,
    #[serde(rename = "DRAW_TWO")]
    DrawTwo,
    #[serde(rename = "WILD")]
    Wild,
    #[serde(rename = "WILD_DRAW_FOUR")]
    WildDrawFour,
}

impl CardKind {
    pub const NUMBERS: [CardKind; 10] = [
        CardKind::Zero,
        CardKind::One,
        CardKind::Two,
        CardKind::Three,
        CardKind::Four,
        CardKind::Five,
        CardKind::Six,
        CardKind::Seven,
        CardKind::Eight,
        CardKind::Nine,
    ];

    pub const ACTIONS: [CardKind; 3] = [CardKind::Skip, CardKind::Reverse, CardKind::DrawTwo];

    pub fn is_number(&self) -> bool {
        CardKind::NUMBERS.contains(self)
    }
}

impl Display for CardKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CardKind::Zero => "0",
            CardKind::One => "1",
            CardKind::Two => "2",
            CardKind::Three => "3",
            CardKind::Four => "4",
            CardKind::Five => "5",
            CardKind::Six => "6",
            CardKind::Seven => "7",
            CardKind::Eight => "8",
            CardKind::Nine => "9",
            CardKind::Skip => "SKIP",
            CardKind::Reverse => "REVERSE",
            CardKind::DrawTwo => "DRAW_TWO",
            CardKind::Wild => "WILD",
            CardKind::WildDrawFour => "WILD_DRAW_FOUR",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub struct Card {
    pub color: CardColor,
    #[serde(rename = "type")]
    pub kind: CardKind,
}

impl Card {
    pub fn new(color: CardColor, kind: CardKind) -> Card {
        Card { color, kind }
    }

    pub fn is_wild(&self) -> bool {
        self.color == CardColor::Wild
    }
}

impl Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_wild() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{} {}", self.color, self.kind)
        }
    }
}

/// Builds the unshuffled 108-card deck: per color one `0` and two each of
/// `1`..`9` (76 numbered cards), two of each action card per color (24),
/// plus four WILD and four WILD_DRAW_FOUR (8).
pub fn standard_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(108);

    for color in Color::ALL {
        deck.push(Card::new(color.into(), CardKind::Zero));
        for &kind in &CardKind::NUMBERS[1..] {
            deck.push(Card::new(color.into(), kind));
            deck.push(Card::new(color.into(), kind));
        }
    }

    for color in Color::ALL {
        for kind in CardKind::ACTIONS {
            deck.push(Card::new(color.into(), kind));
            deck.push(Card::new(color.into(), kind));
        }
    }

    for _ in 0..4 {
        deck.push(Card::new(CardColor::Wild, CardKind::Wild));
        deck.push(Card::new(CardColor::Wild, CardKind::WildDrawFour));
    }

    deck
}

pub fn shuffle(cards: &mut [Card], rng: &mut impl rand::Rng) {
    use rand::seq::SliceRandom;
    cards.shuffle(rng);
}

/// A wild card is always legal. Anything else must match the active color
/// (which a prior wild play may have changed) or the kind of the top discard.
/// The top card's printed color is never consulted, so two same-kind cards of
/// different colors always chain.
pub fn is_legal_play(card: &Card, top: &Card, active_color: Color) -> bool {
    if card.is_wild() {
        return true;
    }
    card.color == CardColor::from(active_color) || card.kind == top.kind
}
