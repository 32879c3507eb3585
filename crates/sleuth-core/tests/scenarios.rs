use sleuth_core::belief::constraint::ConstraintStatus;
use sleuth_core::belief::grid::{Mark, Reason};
use sleuth_core::belief::query::SolutionVerdict;
use sleuth_core::game::table::Table;
use sleuth_core::model::card::{CardId, Triple};
use sleuth_core::model::player::PlayerId;

fn p(index: u8) -> PlayerId {
    PlayerId::from_index(index)
}

fn card(table: &Table, slug: &str) -> CardId {
    table.setup().universe().card(slug).unwrap()
}

fn triple(table: &Table, slugs: [&str; 3]) -> Triple {
    let universe = table.setup().universe();
    Triple::new(universe, universe.cards_for(slugs).unwrap()).unwrap()
}

fn mark(table: &Table, player: u8, slug: &str) -> Option<Mark> {
    table.state().grid().mark(p(player), card(table, slug))
}

fn pass_chain_table() -> Table {
    let mut table = Table::new(&["Ask", "Passer", "Shower"], "Ask", &[]).unwrap();
    let t = triple(&table, ["col_mustard", "dagger", "hall"]);
    table.submit_suggestion(p(0), Some(t), Some(p(2)), None).unwrap();
    table
}

#[test]
fn held_card_is_lacked_by_every_other_player() {
    let mut table = Table::new(&["p0", "p1", "p2"], "p0", &[]).unwrap();
    let scarlett = card(&table, "miss_scarlett");
    table.assert_cell(p(0), scarlett, Mark::Has).unwrap();

    assert_eq!(mark(&table, 1, "miss_scarlett"), Some(Mark::Lacks));
    assert_eq!(mark(&table, 2, "miss_scarlett"), Some(Mark::Lacks));
    let explanation = table.explain(p(2), scarlett).unwrap();
    assert_eq!(explanation.reason, Reason::CrossExclusion);
}

#[test]
fn players_between_asker_and_responder_pass() {
    let table = pass_chain_table();
    for slug in ["col_mustard", "dagger", "hall"] {
        assert_eq!(mark(&table, 1, slug), Some(Mark::Lacks), "{slug}");
        assert_eq!(mark(&table, 2, slug), None, "{slug}");
    }
    let constraints = table.constraints_snapshot();
    assert_eq!(constraints.len(), 1);
    assert_eq!(constraints[0].player, p(2));
    assert_eq!(constraints[0].cards.len(), 3);
    assert_eq!(constraints[0].status, ConstraintStatus::Open);
}

#[test]
fn unanswered_suggestion_forces_pending_constraint() {
    let mut table = pass_chain_table();
    let t = triple(&table, ["col_mustard", "dagger", "lounge"]);
    let effects = table.submit_suggestion(p(0), Some(t), None, None).unwrap();

    assert_eq!(mark(&table, 2, "col_mustard"), Some(Mark::Lacks));
    assert_eq!(mark(&table, 2, "dagger"), Some(Mark::Lacks));
    assert_eq!(mark(&table, 2, "hall"), Some(Mark::Has));

    let hall = card(&table, "hall");
    let explanation = table.explain(p(2), hall).unwrap();
    assert_eq!(explanation.reason, Reason::ConstraintForced);
    assert_eq!(explanation.origin.map(|id| id.position()), Some(1));
    assert_eq!(
        table.constraints_snapshot()[0].status,
        ConstraintStatus::Forced { card: hall }
    );
    assert_eq!(effects.constraints_resolved.len(), 1);
    assert!(
        effects
            .settled
            .iter()
            .any(|cell| cell.player == p(2) && cell.card == hall && cell.mark == Mark::Has)
    );
}

#[test]
fn failed_accusation_rules_out_the_remaining_card() {
    let mut table = Table::new(&["p0", "p1", "p2"], "p0", &[]).unwrap();
    let mustard = card(&table, "col_mustard");
    let dagger = card(&table, "dagger");
    let hall = card(&table, "hall");
    for player in 0..3 {
        table.submit_manual_claim(p(player), &[mustard, dagger], false).unwrap();
    }
    let report = table.solution_status();
    assert_eq!(report.verdict(mustard), Some(SolutionVerdict::ConfirmedIn));
    assert_eq!(report.verdict(dagger), Some(SolutionVerdict::ConfirmedIn));
    assert_eq!(report.verdict(hall), Some(SolutionVerdict::Undetermined));

    let t = triple(&table, ["col_mustard", "dagger", "hall"]);
    table.submit_accusation_failure(p(0), t).unwrap();
    assert_eq!(
        table.solution_status().verdict(hall),
        Some(SolutionVerdict::ConfirmedOut)
    );

    table.assert_cell(p(0), hall, Mark::Lacks).unwrap();
    assert_eq!(mark(&table, 2, "hall"), None);
    table.assert_cell(p(1), hall, Mark::Lacks).unwrap();
    assert_eq!(mark(&table, 2, "hall"), Some(Mark::Has));
    let explanation = table.explain(p(2), hall).unwrap();
    assert_eq!(explanation.reason, Reason::SolutionExcluded);
    assert_eq!(explanation.origin.map(|id| id.position()), Some(4));
}

#[test]
fn disjunctive_claim_resolves_when_one_card_is_ruled_out() {
    let mut table = Table::new(&["p0", "p1", "p2"], "p1", &[]).unwrap();
    let rope = card(&table, "rope");
    let candlestick = card(&table, "candlestick");
    let effects = table
        .submit_manual_claim(p(0), &[rope, candlestick], true)
        .unwrap();
    assert_eq!(effects.constraints_added.len(), 1);
    assert_eq!(mark(&table, 0, "candlestick"), None);

    table.assert_cell(p(0), rope, Mark::Lacks).unwrap();
    assert_eq!(mark(&table, 0, "candlestick"), Some(Mark::Has));
    assert_eq!(table.metrics().open_constraints, 0);
}

#[test]
fn hand_size_forces_both_directions() {
    let names = ["a", "b", "c", "d", "e", "f"];
    let mut table = Table::new(&names, "a", &[]).unwrap();
    for slug in ["rope", "hall", "dr_orchid"] {
        let c = card(&table, slug);
        table.assert_cell(p(1), c, Mark::Has).unwrap();
    }
    assert_eq!(table.state().grid().count(p(1), Mark::Lacks), 18);
    assert_eq!(table.state().grid().unknown_count(p(1)), 0);
    assert_eq!(
        table.explain(p(1), card(&table, "kitchen")).unwrap().reason,
        Reason::HandFull
    );

    // Player c: one card known, then everything but two cards ruled out.
    let lounge = card(&table, "lounge");
    table.assert_cell(p(2), lounge, Mark::Has).unwrap();
    let keep = [lounge, card(&table, "wrench"), card(&table, "study")];
    let others: Vec<CardId> = table
        .state()
        .grid()
        .unknown_cards(p(2))
        .into_iter()
        .filter(|c| !keep.contains(c))
        .collect();
    table.submit_manual_claim(p(2), &others, false).unwrap();
    assert_eq!(mark(&table, 2, "wrench"), Some(Mark::Has));
    assert_eq!(mark(&table, 2, "study"), Some(Mark::Has));
    assert_eq!(
        table.explain(p(2), card(&table, "study")).unwrap().reason,
        Reason::HandExhausted
    );
}
