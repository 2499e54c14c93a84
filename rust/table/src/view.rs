//! Snapshot renderer.
//!
//! [`render_table`] turns the latest [`TableSnapshot`] and the viewer's socket
//! id into a [`TableView`], the complete visible state of the table. The view is
//! a plain value rebuilt from scratch on every call, so rendering the same
//! snapshot twice yields equal views.

use crate::cards::{CardSlot, is_concealed};
use crate::errors::RenderError;
use crate::rules::{ActionPanel, compute_affordances};
use crate::snapshot::{GameState, HandState, SEAT_COUNT, SeatOccupant, TableSnapshot};
use serde::Serialize;

/// Community card positions on the felt.
pub const BOARD_SIZE: usize = 5;
const MAX_HOLE_CARDS: usize = 2;
/// Players needed before a hand can be dealt.
pub const MIN_PLAYERS_TO_START: usize = 2;

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct HeaderView {
    pub table_name: String,
    pub blinds: String,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Serialize)]
pub struct SeatMarkers {
    pub dealer: bool,
    pub small_blind: bool,
    pub big_blind: bool,
    pub turn: bool,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SeatView {
    Empty {
        label: String,
    },
    Occupied {
        name: String,
        chips: u32,
        bet: u32,
        markers: SeatMarkers,
        is_me: bool,
        folded: bool,
        all_in: bool,
        cards: Vec<CardSlot>,
        hand_label: Option<String>,
    },
    /// The seat could not be drawn from this snapshot.
    Unavailable,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum StatusView {
    Hidden,
    Waiting { message: String, can_start: bool },
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct TableView {
    pub table_id: String,
    pub header: HeaderView,
    pub seats: Vec<SeatView>,
    pub pot: u32,
    pub community: Vec<CardSlot>,
    pub status: StatusView,
    pub actions: ActionPanel,
    pub winners: Vec<String>,
    pub my_seat: Option<usize>,
}

/// Renders the whole table for the viewer identified by `viewer`.
///
/// A seat that cannot be drawn is logged and shown as
/// [`SeatView::Unavailable`]; the remaining seats still render. Board-level
/// problems fail the whole render so the caller can keep its last good view.
pub fn render_table(snapshot: &TableSnapshot, viewer: &str) -> Result<TableView, RenderError> {
    let hand = snapshot.current_hand.as_ref();
    let my_seat = snapshot.seat_of(viewer);

    let community = match hand {
        Some(h) => render_board(&h.community_cards)?,
        None => vec![CardSlot::Placeholder; BOARD_SIZE],
    };

    let seats = (0..SEAT_COUNT)
        .map(|seat| {
            let occupant = snapshot.seats.get(seat).and_then(Option::as_ref);
            render_seat(snapshot, seat, occupant, my_seat).unwrap_or_else(|err| {
                tracing::error!(
                    table_id = %snapshot.table_id,
                    seat,
                    error = %err,
                    "failed to render seat"
                );
                SeatView::Unavailable
            })
        })
        .collect();

    let actions = match hand.and_then(|h| h.player_by_socket(viewer).map(|me| (h, me))) {
        Some((h, me)) => compute_affordances(h, me),
        None => ActionPanel::Hidden,
    };

    Ok(TableView {
        table_id: snapshot.table_id.clone(),
        header: HeaderView {
            table_name: snapshot.table_name.clone(),
            blinds: format!("{}/{}", snapshot.small_blind, snapshot.big_blind),
        },
        seats,
        pot: hand.map(|h| h.pot).unwrap_or(0),
        community,
        status: render_status(snapshot),
        actions,
        winners: render_winners(snapshot),
        my_seat,
    })
}

fn render_board(codes: &[String]) -> Result<Vec<CardSlot>, RenderError> {
    if codes.len() > BOARD_SIZE {
        return Err(RenderError::TooManyCommunityCards { count: codes.len() });
    }
    let mut board: Vec<CardSlot> = codes.iter().map(|c| CardSlot::from_code(c)).collect();
    board.resize(BOARD_SIZE, CardSlot::Placeholder);
    Ok(board)
}

fn render_seat(
    snapshot: &TableSnapshot,
    seat: usize,
    occupant: Option<&SeatOccupant>,
    my_seat: Option<usize>,
) -> Result<SeatView, RenderError> {
    let Some(occupant) = occupant else {
        return Ok(SeatView::Empty {
            label: format!("Seat {}", seat + 1),
        });
    };

    let hand = snapshot.current_hand.as_ref();
    let hand_player = match hand {
        Some(h) => {
            let mut claimants = h.players_in_seat(seat);
            let first = claimants.next();
            let extra = claimants.count();
            if extra > 0 {
                return Err(RenderError::DuplicateSeatClaim {
                    seat,
                    claimants: extra + 1,
                });
            }
            first
        }
        None => None,
    };

    let is_me = my_seat == Some(seat);
    let folded = hand_player.is_some_and(|p| p.is_folded);
    let (cards, hand_label) = match hand_player {
        Some(p) => {
            if p.cards.len() > MAX_HOLE_CARDS {
                return Err(RenderError::TooManyHoleCards {
                    seat,
                    count: p.cards.len(),
                });
            }
            let reveal = is_me || (snapshot.is_showdown() && !p.is_folded);
            let cards = p
                .cards
                .iter()
                .map(|code| hole_card(code, reveal))
                .collect();
            let label = if snapshot.is_showdown() && !p.is_folded {
                p.hand_result.as_ref().map(|r| r.name.clone())
            } else {
                None
            };
            (cards, label)
        }
        None => (Vec::new(), None),
    };

    Ok(SeatView::Occupied {
        name: occupant.username.clone(),
        chips: occupant.chips,
        bet: occupant.bet_amount,
        markers: hand.map(|h| markers_for(h, seat)).unwrap_or_default(),
        is_me,
        folded,
        all_in: hand_player.is_some_and(|p| p.is_all_in),
        cards,
        hand_label,
    })
}

/// A hole card is face-up only for its owner, or for everyone at showdown when
/// its owner is still in the hand.
fn hole_card(code: &str, reveal: bool) -> CardSlot {
    if reveal && !is_concealed(code) {
        CardSlot::from_code(code)
    } else {
        CardSlot::Back
    }
}

fn markers_for(hand: &HandState, seat: usize) -> SeatMarkers {
    SeatMarkers {
        dealer: hand.dealer_seat() == Some(seat),
        small_blind: hand.small_blind_seat() == Some(seat),
        big_blind: hand.big_blind_seat() == Some(seat),
        turn: hand.turn_seat() == Some(seat),
    }
}

fn render_status(snapshot: &TableSnapshot) -> StatusView {
    if snapshot.current_hand.is_some() || snapshot.is_showdown() {
        return StatusView::Hidden;
    }
    let active = snapshot.active_players().count();
    let can_start = active >= MIN_PLAYERS_TO_START && snapshot.game_state == GameState::Waiting;
    let message = if can_start {
        format!("{} players ready, deal the cards", active)
    } else {
        format!(
            "Waiting for players... ({}/{} minimum)",
            active, MIN_PLAYERS_TO_START
        )
    };
    StatusView::Waiting { message, can_start }
}

fn render_winners(snapshot: &TableSnapshot) -> Vec<String> {
    if !snapshot.is_showdown() {
        return Vec::new();
    }
    snapshot
        .current_hand
        .as_ref()
        .map(|h| {
            h.winners
                .iter()
                .map(|w| format!("{} wins {} with {}", w.username, w.amount, w.hand_name))
                .collect()
        })
        .unwrap_or_default()
}
