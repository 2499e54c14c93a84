use serde::{Deserialize, Serialize};

/// One of the four suits, as carried in the second character of a card code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Suit {
    /// `h` (♥)
    Hearts,
    /// `d` (♦)
    Diamonds,
    /// `c` (♣)
    Clubs,
    /// `s` (♠)
    Spades,
}

impl Suit {
    pub fn from_char(c: char) -> Option<Suit> {
        match c {
            'h' => Some(Suit::Hearts),
            'd' => Some(Suit::Diamonds),
            'c' => Some(Suit::Clubs),
            's' => Some(Suit::Spades),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Suit::Hearts => "♥",
            Suit::Diamonds => "♦",
            Suit::Clubs => "♣",
            Suit::Spades => "♠",
        }
    }

    pub fn letter(self) -> char {
        match self {
            Suit::Hearts => 'h',
            Suit::Diamonds => 'd',
            Suit::Clubs => 'c',
            Suit::Spades => 's',
        }
    }

    /// Hearts and diamonds render red, the rest black.
    pub fn is_red(self) -> bool {
        matches!(self, Suit::Hearts | Suit::Diamonds)
    }
}

/// Card rank from Two through Ace, as carried in the first character of a card code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Rank {
    Two = 2,
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
    pub fn from_char(c: char) -> Option<Rank> {
        match c {
            '2' => Some(Rank::Two),
            '3' => Some(Rank::Three),
            '4' => Some(Rank::Four),
            '5' => Some(Rank::Five),
            '6' => Some(Rank::Six),
            '7' => Some(Rank::Seven),
            '8' => Some(Rank::Eight),
            '9' => Some(Rank::Nine),
            'T' => Some(Rank::Ten),
            'J' => Some(Rank::Jack),
            'Q' => Some(Rank::Queen),
            'K' => Some(Rank::King),
            'A' => Some(Rank::Ace),
            _ => None,
        }
    }

    /// Display label; the ten is spelled out as `10` while the wire uses `T`.
    pub fn label(self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }
}

/// A face-up playing card decoded from a two-character code such as `Ah` or `Td`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    /// Decodes a card code. Anything other than exactly rank + suit yields `None`.
    pub fn parse(code: &str) -> Option<Card> {
        let mut chars = code.chars();
        let rank = Rank::from_char(chars.next()?)?;
        let suit = Suit::from_char(chars.next()?)?;
        if chars.next().is_some() {
            return None;
        }
        Some(Card { rank, suit })
    }

    pub fn code(&self) -> String {
        let rank = match self.rank {
            Rank::Ten => 'T',
            other => other.label().chars().next().unwrap_or('?'),
        };
        format!("{}{}", rank, self.suit.letter())
    }
}

/// Server marker for a hole card the viewer may not see.
pub const HIDDEN_CODE: &str = "??";

/// What one card position on the table shows.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CardSlot {
    /// Face-up card.
    Face(Card),
    /// Face-down placeholder.
    Back,
    /// Malformed code; renders as nothing.
    Empty,
    /// Community card position not dealt yet.
    Placeholder,
}

impl CardSlot {
    /// Face-up slot for a raw card code.
    ///
    /// `??` and `?` are the server's concealment markers and always render
    /// face-down. Codes that do not decode render as [`CardSlot::Empty`].
    ///
    /// ```
    /// use pokerfelt_table::cards::{CardSlot, Rank, Suit};
    ///
    /// match CardSlot::from_code("Td") {
    ///     CardSlot::Face(card) => {
    ///         assert_eq!(card.rank, Rank::Ten);
    ///         assert_eq!(card.suit, Suit::Diamonds);
    ///     }
    ///     other => panic!("unexpected slot {:?}", other),
    /// }
    /// assert_eq!(CardSlot::from_code("??"), CardSlot::Back);
    /// assert_eq!(CardSlot::from_code("X"), CardSlot::Empty);
    /// ```
    pub fn from_code(code: &str) -> CardSlot {
        if is_concealed(code) {
            return CardSlot::Back;
        }
        match Card::parse(code) {
            Some(card) => CardSlot::Face(card),
            None => CardSlot::Empty,
        }
    }
}

pub fn is_concealed(code: &str) -> bool {
    code == HIDDEN_CODE || code == "?"
}
