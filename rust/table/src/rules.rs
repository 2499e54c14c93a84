use crate::errors::RulesError;
use crate::snapshot::{HandPlayer, HandState};
use serde::{Deserialize, Serialize};

/// Action names understood by the table server.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Fold,
    Check,
    Call,
    Bet,
    Raise,
    #[serde(rename = "allin")]
    AllIn,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Fold => "fold",
            ActionKind::Check => "check",
            ActionKind::Call => "call",
            ActionKind::Bet => "bet",
            ActionKind::Raise => "raise",
            ActionKind::AllIn => "allin",
        }
    }

    /// Bet and raise need an amount chosen on the bet slip.
    pub fn needs_amount(&self) -> bool {
        matches!(self, ActionKind::Bet | ActionKind::Raise)
    }
}

/// An action ready to send: the kind plus the amount (0 when not applicable).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerAction {
    pub action: ActionKind,
    pub amount: u32,
}

impl PlayerAction {
    pub fn simple(action: ActionKind) -> Self {
        Self { action, amount: 0 }
    }
}

/// Inclusive range the bet/raise amount input is held to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
pub struct BetBounds {
    pub min: u32,
    pub max: u32,
}

impl BetBounds {
    pub fn clamp(&self, amount: u32) -> u32 {
        amount.clamp(self.min, self.max)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetPreset {
    Min,
    Half,
    Pot,
    Max,
}

impl BetPreset {
    pub fn parse(s: &str) -> Option<BetPreset> {
        match s.to_ascii_lowercase().as_str() {
            "min" => Some(BetPreset::Min),
            "half" => Some(BetPreset::Half),
            "pot" => Some(BetPreset::Pot),
            "max" | "allin" => Some(BetPreset::Max),
            _ => None,
        }
    }
}

/// Buttons offered to the player to act, with their bounds.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Affordances {
    pub fold: bool,
    pub check: bool,
    /// Amount to call when Call is offered.
    pub call: Option<u32>,
    pub bet: bool,
    pub raise: bool,
    pub all_in: bool,
    pub bounds: BetBounds,
    pub current_bet: u32,
    pub pot: u32,
    pub my_bet: u32,
    pub chips: u32,
}

impl Affordances {
    pub fn offers(&self, kind: ActionKind) -> bool {
        match kind {
            ActionKind::Fold => self.fold,
            ActionKind::Check => self.check,
            ActionKind::Call => self.call.is_some(),
            ActionKind::Bet => self.bet,
            ActionKind::Raise => self.raise,
            ActionKind::AllIn => self.all_in,
        }
    }

    /// Amount a preset puts on the slip, clamped into the input bounds.
    pub fn preset_amount(&self, preset: BetPreset) -> u32 {
        let raw = match preset {
            BetPreset::Min => self.current_bet.saturating_mul(2),
            BetPreset::Half => self.pot / 2,
            BetPreset::Pot => self.pot,
            BetPreset::Max => self.chips,
        };
        self.bounds.clamp(raw)
    }

    /// One-line summary of the betting round from the player's side.
    pub fn info_line(&self) -> String {
        format!(
            "Bet: {} · Your bet: {} · Chips: {}",
            self.current_bet, self.my_bet, self.chips
        )
    }
}

/// What the action area shows for the local player.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ActionPanel {
    Hidden,
    Shown(Affordances),
}

impl ActionPanel {
    pub fn affordances(&self) -> Option<&Affordances> {
        match self {
            ActionPanel::Shown(a) => Some(a),
            ActionPanel::Hidden => None,
        }
    }
}

/// Derives the legal actions for `me` from the hand's betting state.
///
/// Nothing is offered unless it is `me`'s turn and `me` has neither folded nor
/// gone all-in.
///
/// ```
/// use pokerfelt_table::rules::{compute_affordances, ActionPanel};
/// use pokerfelt_table::snapshot::{HandPlayer, HandState};
///
/// let me = HandPlayer { socket_id: "me".into(), chips: 100, ..Default::default() };
/// let hand = HandState {
///     current_bet: 20,
///     current_player_index: Some(0),
///     players: vec![me.clone()],
///     ..Default::default()
/// };
/// let ActionPanel::Shown(a) = compute_affordances(&hand, &me) else { panic!() };
/// assert_eq!(a.call, Some(20));
/// assert!(a.raise);
/// assert!(!a.check);
/// ```
pub fn compute_affordances(hand: &HandState, me: &HandPlayer) -> ActionPanel {
    if me.is_folded || me.is_all_in || !hand.is_turn_of(&me.socket_id) {
        return ActionPanel::Hidden;
    }

    let call_amount = hand.current_bet.saturating_sub(me.total_bet_this_round);
    let check = me.total_bet_this_round >= hand.current_bet;
    let call = (call_amount > 0 && call_amount <= me.chips).then_some(call_amount);
    let bet = hand.current_bet == 0;
    let raise = hand.current_bet > 0 && me.chips > call_amount;

    ActionPanel::Shown(Affordances {
        fold: true,
        check,
        call,
        bet,
        raise,
        all_in: true,
        bounds: BetBounds {
            min: 0,
            max: me.chips,
        },
        current_bet: hand.current_bet,
        pot: hand.pot,
        my_bet: me.total_bet_this_round,
        chips: me.chips,
    })
}

/// Checks that a ready action is on offer and carries a usable amount.
pub fn validate_action(
    affordances: &Affordances,
    action: PlayerAction,
) -> Result<PlayerAction, RulesError> {
    if !affordances.offers(action.action) {
        return Err(RulesError::NotOffered(action.action.as_str()));
    }
    if action.action.needs_amount() && action.amount == 0 {
        return Err(RulesError::NonPositiveAmount);
    }
    Ok(action)
}

/// Pending bet/raise amount input.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BetSlip {
    kind: ActionKind,
    amount: u32,
    bounds: BetBounds,
}

impl BetSlip {
    /// Opens the slip for Bet or Raise with the Min preset pre-filled.
    pub fn open(affordances: &Affordances, kind: ActionKind) -> Result<Self, RulesError> {
        if !kind.needs_amount() || !affordances.offers(kind) {
            return Err(RulesError::NotOffered(kind.as_str()));
        }
        Ok(Self {
            kind,
            amount: affordances.preset_amount(BetPreset::Min),
            bounds: affordances.bounds,
        })
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn amount(&self) -> u32 {
        self.amount
    }

    pub fn bounds(&self) -> BetBounds {
        self.bounds
    }

    /// Sets the amount, held inside the bounds.
    pub fn set_amount(&mut self, amount: u32) -> u32 {
        self.amount = self.bounds.clamp(amount);
        self.amount
    }

    pub fn apply_preset(&mut self, affordances: &Affordances, preset: BetPreset) -> u32 {
        self.set_amount(affordances.preset_amount(preset))
    }

    /// Re-reads the bounds from a newer snapshot's affordances. Returns
    /// `false` when the slip's action is no longer offered.
    pub fn refresh(&mut self, affordances: &Affordances) -> bool {
        if !affordances.offers(self.kind) {
            return false;
        }
        self.bounds = affordances.bounds;
        self.amount = self.bounds.clamp(self.amount);
        true
    }

    pub fn submit(&self) -> Result<PlayerAction, RulesError> {
        if self.amount == 0 {
            return Err(RulesError::NonPositiveAmount);
        }
        Ok(PlayerAction {
            action: self.kind,
            amount: self.amount,
        })
    }
}
