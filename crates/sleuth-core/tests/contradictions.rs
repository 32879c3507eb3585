use sleuth_core::belief::contradiction::Contradiction;
use sleuth_core::belief::grid::Mark;
use sleuth_core::error::DeductionError;
use sleuth_core::game::event::Event;
use sleuth_core::game::setup::{ContradictionPolicy, TableSetup};
use sleuth_core::game::table::Table;
use sleuth_core::model::card::Triple;
use sleuth_core::model::player::PlayerId;

fn p(index: u8) -> PlayerId {
    PlayerId::from_index(index)
}

fn table(policy: ContradictionPolicy) -> Table {
    let setup = TableSetup::classic(&["Ann", "Bob", "Cat"], "Ann", &["rope"])
        .unwrap()
        .with_policy(policy);
    Table::from_setup(setup).unwrap()
}

/// Bob claims the rope Ann was dealt.
fn conflicting_claim(table: &Table) -> Event {
    Event::ManualClaim {
        player: p(1),
        cards: vec![table.setup().universe().card("rope").unwrap()],
        asserts_possession: true,
    }
}

#[test]
fn strict_policy_rejects_and_keeps_the_table() {
    let mut table = table(ContradictionPolicy::Reject);
    let before = table.clone();
    let event = conflicting_claim(&table);
    let err = table.append(event).unwrap_err();

    match err {
        DeductionError::Inconsistent {
            event,
            contradiction,
        } => {
            assert_eq!(event.position(), 1);
            assert!(matches!(
                contradiction,
                Contradiction::CellConflict {
                    held: Mark::Lacks,
                    requested: Mark::Has,
                    ..
                }
            ));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(table, before);
}

#[test]
fn tolerant_policy_records_and_keeps_the_first_fact() {
    let mut table = table(ContradictionPolicy::Tolerate);
    let rope = table.setup().universe().card("rope").unwrap();
    let event = conflicting_claim(&table);
    let effects = table.append(event).unwrap();

    assert_eq!(effects.contradictions.len(), 1);
    assert_eq!(table.contradictions().len(), 1);
    assert_eq!(table.state().grid().mark(p(1), rope), Some(Mark::Lacks));
    assert_eq!(table.state().grid().mark(p(0), rope), Some(Mark::Has));
    assert_eq!(table.event_log().len(), 1);

    // Re-applying the same conflict does not duplicate the record.
    let event = conflicting_claim(&table);
    table.append(event).unwrap();
    assert_eq!(table.contradictions().len(), 1);
}

#[test]
fn exhausted_disjunction_is_reported() {
    let mut strict = table(ContradictionPolicy::Reject);
    let universe = strict.setup().universe().clone();
    let [mustard, dagger, hall] = universe.cards_for(["col_mustard", "dagger", "hall"]).unwrap();
    strict
        .submit_manual_claim(p(2), &[mustard, dagger, hall], false)
        .unwrap();
    let triple = Triple::new(&universe, [mustard, dagger, hall]).unwrap();
    let err = strict
        .submit_suggestion(p(1), Some(triple), Some(p(2)), None)
        .unwrap_err();
    assert!(matches!(
        err.contradiction(),
        Some(Contradiction::ExhaustedConstraint { .. })
    ));

    let mut tolerant = table(ContradictionPolicy::Tolerate);
    tolerant
        .submit_manual_claim(p(2), &[mustard, dagger, hall], false)
        .unwrap();
    tolerant
        .submit_suggestion(p(1), Some(triple), Some(p(2)), None)
        .unwrap();
    assert!(matches!(
        tolerant.contradictions(),
        [Contradiction::ExhaustedConstraint { .. }]
    ));
    assert_eq!(tolerant.metrics().open_constraints, 0);
}

#[test]
fn overfull_hand_is_a_hand_size_contradiction() {
    // Six players: three cards each.
    let names = ["a", "b", "c", "d", "e", "f"];
    let mut table = Table::new(&names, "a", &[]).unwrap();
    let universe = table.setup().universe().clone();
    let cards = universe
        .cards_for(["rope", "hall", "dagger", "study"])
        .unwrap();
    table.submit_manual_claim(p(1), &cards[..3], false).unwrap();
    let rest: Vec<_> = universe.ids().filter(|c| !cards.contains(c)).collect();
    let err = table.submit_manual_claim(p(1), &rest, false).unwrap_err();
    assert!(matches!(
        err.contradiction(),
        Some(Contradiction::HandSize { .. })
    ));
}

#[test]
fn malformed_events_never_reach_the_grid() {
    let mut table = table(ContradictionPolicy::Tolerate);
    let before = table.clone();
    let err = table
        .append(Event::ManualClaim {
            player: p(1),
            cards: Vec::new(),
            asserts_possession: true,
        })
        .unwrap_err();
    assert!(matches!(err, DeductionError::MalformedEvent { .. }));
    let cards = table
        .setup()
        .universe()
        .cards_for(["col_mustard", "dagger", "hall"])
        .unwrap();
    let err = table
        .append(Event::AccusationFailure {
            accuser: p(5),
            triple: Triple::from_cards_unchecked(cards),
        })
        .unwrap_err();
    assert!(matches!(err, DeductionError::UnknownPlayer(player) if player == p(5)));
    assert_eq!(table, before);
}
