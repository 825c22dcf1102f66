use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-issued identity of one card instance. Two cards with the same label
/// are still different instances.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct CardId(pub u64);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    pub fn value(self) -> u8 {
        match self {
            Suit::Clubs => 1,
            Suit::Diamonds => 2,
            Suit::Hearts => 3,
            Suit::Spades => 4,
        }
    }

    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '♣' | 'c' | 'C' => Some(Suit::Clubs),
            '♦' | 'd' | 'D' => Some(Suit::Diamonds),
            '♥' | 'h' | 'H' => Some(Suit::Hearts),
            '♠' | 's' | 'S' => Some(Suit::Spades),
            _ => None,
        }
    }

    pub fn glyph(self) -> char {
        match self {
            Suit::Clubs => '♣',
            Suit::Diamonds => '♦',
            Suit::Hearts => '♥',
            Suit::Spades => '♠',
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub fn value(self) -> u8 {
        match self {
            Rank::Two => 2,
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Eight => 8,
            Rank::Nine => 9,
            Rank::Ten => 10,
            Rank::Jack => 11,
            Rank::Queen => 12,
            Rank::King => 13,
            Rank::Ace => 14,
        }
    }

    /// Accepts `2`..`9`, `T`/`10`, `J`, `Q`, `K`, `A` and the legacy `1` for ace.
    pub fn from_text(text: &str) -> Option<Self> {
        let rank = match text.trim().to_ascii_uppercase().as_str() {
            "2" => Rank::Two,
            "3" => Rank::Three,
            "4" => Rank::Four,
            "5" => Rank::Five,
            "6" => Rank::Six,
            "7" => Rank::Seven,
            "8" => Rank::Eight,
            "9" => Rank::Nine,
            "T" | "10" => Rank::Ten,
            "J" => Rank::Jack,
            "Q" => Rank::Queen,
            "K" => Rank::King,
            "A" | "1" => Rank::Ace,
            _ => return None,
        };
        Some(rank)
    }

    pub fn short(self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "T",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }
}

/// One addressable card in a hand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "WireCard")]
pub struct CardInstance {
    pub id: CardId,
    pub label: String,
}

impl CardInstance {
    pub fn new(id: u64, label: impl Into<String>) -> Self {
        Self {
            id: CardId(id),
            label: label.into(),
        }
    }
}

// Older servers send `rank` + `suit` instead of a ready-made label.
#[derive(Deserialize)]
struct WireCard {
    id: CardId,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    rank: Option<String>,
    #[serde(default)]
    suit: Option<String>,
}

impl From<WireCard> for CardInstance {
    fn from(wire: WireCard) -> Self {
        let label = match (wire.label, wire.rank, wire.suit) {
            (Some(label), _, _) => label,
            (None, Some(rank), Some(suit)) => format!("{rank}{suit}"),
            (None, Some(rank), None) => rank,
            (None, None, Some(suit)) => suit,
            (None, None, None) => String::new(),
        };
        Self { id: wire.id, label }
    }
}

pub fn parse_label(label: &str) -> Option<(Rank, Suit)> {
    let text = label.trim();
    let mut chars = text.chars();
    let suit = Suit::from_char(chars.next_back()?)?;
    let rank = Rank::from_text(chars.as_str())?;
    Some((rank, suit))
}

/// Ordering key for labels: rank, then suit, then the raw text. Labels that do
/// not parse sort below every real card.
pub fn label_sort_key(label: &str) -> (u8, u8, &str) {
    match parse_label(label) {
        Some((rank, suit)) => (rank.value(), suit.value(), label),
        None => (0, 0, label),
    }
}

pub fn format_label(rank: Rank, suit: Suit) -> String {
    format!("{}{}", rank.short(), suit.glyph())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_glyph_and_letter_suits() {
        assert_eq!(parse_label("A♠"), Some((Rank::Ace, Suit::Spades)));
        assert_eq!(parse_label("10♥"), Some((Rank::Ten, Suit::Hearts)));
        assert_eq!(parse_label("td"), Some((Rank::Ten, Suit::Diamonds)));
        assert_eq!(parse_label(" 1♣ "), Some((Rank::Ace, Suit::Clubs)));
    }

    #[test]
    fn rejects_placeholders() {
        assert_eq!(parse_label(""), None);
        assert_eq!(parse_label("??"), None);
        assert_eq!(parse_label("♠"), None);
        assert_eq!(parse_label("11♠"), None);
    }

    #[test]
    fn unknown_labels_sort_lowest() {
        assert!(label_sort_key("??") < label_sort_key("2♣"));
        assert_eq!(label_sort_key("?"), (0, 0, "?"));
    }

    #[test]
    fn wire_card_builds_label_from_rank_and_suit() {
        let card: CardInstance =
            serde_json::from_str(r#"{"id":7,"rank":"10","suit":"♦"}"#).expect("card");
        assert_eq!(card, CardInstance::new(7, "10♦"));
        let labelled: CardInstance =
            serde_json::from_str(r#"{"id":8,"label":"K♠","rank":"Q"}"#).expect("card");
        assert_eq!(labelled.label, "K♠");
    }

    #[test]
    fn formats_short_labels() {
        assert_eq!(format_label(Rank::Ten, Suit::Clubs), "T♣");
        assert_eq!(Suit::ALL.map(Suit::glyph), ['♣', '♦', '♥', '♠']);
    }
}
