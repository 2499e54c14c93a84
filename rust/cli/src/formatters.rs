//! Terminal rendering of table views, lobby rows, and chat lines.
//!
//! These are pure functions over the view model produced by
//! `pokerfelt_table::view::render_table`; they decide nothing about what is
//! visible, only how it looks in a terminal.
//!
//! ## Unicode vs ASCII Fallback
//!
//! Suits print as ♥ ♦ ♣ ♠ where the terminal supports it and as h d c s
//! otherwise. Unix terminals are assumed to support Unicode; on Windows the
//! modern terminal markers (WT_SESSION, TERM_PROGRAM, VSCODE_INJECTION) are
//! checked.
//!
//! ## Example
//!
//! ```rust
//! use pokerfelt_table::cards::{Card, CardSlot, Rank, Suit};
//! use pokerfelt_cli::formatters::format_slots;
//!
//! let ace = CardSlot::Face(Card { rank: Rank::Ace, suit: Suit::Spades });
//! let row = format_slots(&[ace, CardSlot::Back]);
//! assert!(row == "[A♠ ##]" || row == "[As ##]");
//! ```

use pokerfelt_table::cards::{Card, CardSlot, Suit};
use pokerfelt_table::chat::ChatMessage;
use pokerfelt_table::lobby::{LobbyRow, NO_TABLES_MESSAGE};
use pokerfelt_table::rules::{ActionPanel, Affordances, BetSlip};
use pokerfelt_table::view::{SeatView, StatusView, TableView};

pub fn supports_unicode() -> bool {
    if cfg!(windows) {
        std::env::var("WT_SESSION").is_ok()
            || std::env::var("TERM_PROGRAM").is_ok()
            || std::env::var("VSCODE_INJECTION").is_ok()
    } else {
        true
    }
}

pub fn format_suit(suit: Suit) -> String {
    if supports_unicode() {
        suit.symbol().to_string()
    } else {
        suit.letter().to_string()
    }
}

/// `"10♥"`, `"A♠"`, or the ASCII equivalents.
pub fn format_card(card: &Card) -> String {
    format!("{}{}", card.rank.label(), format_suit(card.suit))
}

/// One card position: face, back (`##`), undealt (`__`), or nothing.
pub fn format_slot(slot: &CardSlot) -> String {
    match slot {
        CardSlot::Face(card) => format_card(card),
        CardSlot::Back => "##".to_string(),
        CardSlot::Placeholder => "__".to_string(),
        CardSlot::Empty => String::new(),
    }
}

pub fn format_slots(slots: &[CardSlot]) -> String {
    let shown: Vec<String> = slots
        .iter()
        .map(format_slot)
        .filter(|s| !s.is_empty())
        .collect();
    format!("[{}]", shown.join(" "))
}

pub fn format_seat(index: usize, seat: &SeatView) -> String {
    match seat {
        SeatView::Empty { label } => format!("  {}: (empty)", label),
        SeatView::Unavailable => format!("  Seat {}: (unavailable)", index + 1),
        SeatView::Occupied {
            name,
            chips,
            bet,
            markers,
            is_me,
            folded,
            all_in,
            cards,
            hand_label,
        } => {
            let mut line = format!(
                "{} Seat {}: {}{}",
                if markers.turn { ">" } else { " " },
                index + 1,
                name,
                if *is_me { " (you)" } else { "" }
            );

            let tags: Vec<&str> = [
                (markers.dealer, "D"),
                (markers.small_blind, "SB"),
                (markers.big_blind, "BB"),
            ]
            .iter()
            .filter(|(on, _)| *on)
            .map(|(_, tag)| *tag)
            .collect();
            if !tags.is_empty() {
                line.push_str(&format!(" [{}]", tags.join(",")));
            }

            line.push_str(&format!("  {} chips", chips));
            if *bet > 0 {
                line.push_str(&format!("  bet {}", bet));
            }
            if !cards.is_empty() {
                line.push_str(&format!("  {}", format_slots(cards)));
            }
            if let Some(label) = hand_label {
                line.push_str(&format!("  {}", label));
            }
            if *folded {
                line.push_str("  FOLDED");
            } else if *all_in {
                line.push_str("  ALL-IN");
            }
            line
        }
    }
}

pub fn format_affordances(a: &Affordances) -> String {
    let mut buttons = Vec::new();
    if a.fold {
        buttons.push("fold".to_string());
    }
    if a.check {
        buttons.push("check".to_string());
    }
    if let Some(amount) = a.call {
        buttons.push(format!("call {}", amount));
    }
    if a.bet {
        buttons.push(format!("bet {}-{}", a.bounds.min, a.bounds.max));
    }
    if a.raise {
        buttons.push(format!("raise {}-{}", a.bounds.min, a.bounds.max));
    }
    if a.all_in {
        buttons.push("allin".to_string());
    }
    format!("Your move: {}\n{}", buttons.join(" | "), a.info_line())
}

pub fn format_bet_slip(slip: &BetSlip) -> String {
    let bounds = slip.bounds();
    format!(
        "{} {} (min {}, max {}); `confirm` to send, `cancel` to close",
        slip.kind().as_str(),
        slip.amount(),
        bounds.min,
        bounds.max
    )
}

/// Whole table as printed after each rendered snapshot.
pub fn format_table(view: &TableView) -> String {
    let mut lines = vec![format!(
        "== {} ({}) ==  blinds {}",
        view.header.table_name, view.table_id, view.header.blinds
    )];
    for (i, seat) in view.seats.iter().enumerate() {
        lines.push(format_seat(i, seat));
    }
    lines.push(format!(
        "Board: {}  Pot: {}",
        format_slots(&view.community),
        view.pot
    ));
    if let StatusView::Waiting { message, can_start } = &view.status {
        let hint = if *can_start { "  (type `start`)" } else { "" };
        lines.push(format!("{}{}", message, hint));
    }
    for winner in &view.winners {
        lines.push(format!("* {}", winner));
    }
    if let ActionPanel::Shown(a) = &view.actions {
        lines.push(format_affordances(a));
    }
    lines.join("\n")
}

pub fn format_lobby(rows: &[LobbyRow]) -> String {
    if rows.is_empty() {
        return NO_TABLES_MESSAGE.to_string();
    }
    let mut lines = vec![format!(
        "{:<12} {:<30} {:<8} {:<9} {:<11} {}",
        "ID", "Name", "Status", "Blinds", "Buy-in", "Players"
    )];
    for row in rows {
        lines.push(format!(
            "{:<12} {:<30} {:<8} {:<9} {:<11} {}",
            row.table_id, row.name, row.status, row.blinds, row.buy_in, row.players
        ));
    }
    lines.join("\n")
}

pub fn format_chat(message: &ChatMessage) -> String {
    format!(
        "[{}] {}: {}",
        message.time_label(),
        message.username,
        message.message
    )
}
