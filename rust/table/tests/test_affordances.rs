use pokerfelt_table::rules::{
    ActionKind, ActionPanel, Affordances, BetPreset, BetSlip, compute_affordances,
};
use pokerfelt_table::snapshot::{HandPlayer, HandState};

fn my_turn(current_bet: u32, my_bet: u32, chips: u32) -> ActionPanel {
    let me = HandPlayer {
        socket_id: "me".into(),
        seat: 3,
        chips,
        total_bet_this_round: my_bet,
        ..Default::default()
    };
    let hand = HandState {
        pot: current_bet + my_bet,
        current_bet,
        current_player_index: Some(0),
        players: vec![me.clone()],
        ..Default::default()
    };
    compute_affordances(&hand, &me)
}

fn shown(panel: ActionPanel) -> Affordances {
    panel.affordances().cloned().expect("actions shown on my turn")
}

#[test]
fn matched_bet_enables_check_and_disables_call() {
    for current_bet in [0u32, 1, 20, 500] {
        for chips in [0u32, 1, 100, 10_000] {
            let a = shown(my_turn(current_bet, current_bet, chips));
            assert!(a.check, "bet={} chips={}", current_bet, chips);
            assert_eq!(a.call, None, "bet={} chips={}", current_bet, chips);
        }
    }
}

#[test]
fn call_beyond_stack_is_disabled() {
    for (current_bet, my_bet, chips) in [(100u32, 0u32, 99u32), (50, 10, 39), (2, 0, 0)] {
        let a = shown(my_turn(current_bet, my_bet, chips));
        assert_eq!(a.call, None);
        assert!(a.all_in);
    }
}

#[test]
fn bet_bounds_when_nothing_is_wagered() {
    let a = shown(my_turn(0, 0, 500));
    assert_eq!(a.preset_amount(BetPreset::Min), 0);
    assert_eq!(a.preset_amount(BetPreset::Max), 500);
    assert!(a.bet);
    assert!(!a.raise);
}

#[test]
fn raise_available_with_chips_behind() {
    let a = shown(my_turn(20, 0, 100));
    assert_eq!(a.call, Some(20));
    assert!(a.raise);
    assert!(!a.bet);
    assert_eq!(a.info_line(), "Bet: 20 · Your bet: 0 · Chips: 100");

    let mut slip = BetSlip::open(&a, ActionKind::Raise).expect("raise offered");
    assert_eq!(slip.amount(), 40);
    assert_eq!(slip.apply_preset(&a, BetPreset::Max), 100);
}

#[test]
fn exact_stack_call_leaves_no_raise() {
    let a = shown(my_turn(20, 0, 20));
    assert_eq!(a.call, Some(20));
    assert!(!a.raise);
    assert!(a.all_in);
}
