//! Full decision rounds over the sample snapshot.

use std::io::BufRead;
use std::sync::Arc;

use bike_core::config::DecisionConfig;
use bike_core::events::DecisionLogger;
use bike_core::setup::{bikers_for_snapshot, seeded_rng};
use bike_core::systems::{tally_direction_ballots, ElectionOutcome, LeaderVoter, TargetRegime};
use bike_core::{Biker, DecisionError, ReputationStrategy};
use bike_events::fixtures::{self, ALDER, BRYN, CEDAR, DALE, ELM, FAR_RED, FERN, MAIN_BIKE, NEAR_RED, SECOND_BIKE};
use bike_events::{AgentId, Colour, DecisionEvent, DecisionKind, RoundSnapshot, ALLOCATION_EPSILON};

fn riders(snapshot: &RoundSnapshot, config: DecisionConfig) -> Vec<Biker> {
    let mut bikers = bikers_for_snapshot(snapshot, &mut seeded_rng(1), 0.0, &Arc::new(config));
    for biker in &mut bikers {
        biker.begin_round(snapshot).unwrap();
    }
    bikers
}

fn on_bike<'a>(bikers: &'a [Biker], ids: &[AgentId]) -> Vec<&'a Biker> {
    ids.iter()
        .filter_map(|id| bikers.iter().find(|b| b.id() == *id))
        .collect()
}

#[test]
fn test_main_bike_agrees_on_near_red() {
    let snapshot = fixtures::sample_round();
    let bikers = riders(&snapshot, DecisionConfig::default());
    let main = on_bike(&bikers, &fixtures::main_bike_occupants());

    let choices: Vec<_> = main.iter().map(|b| b.propose_direction(&snapshot).unwrap()).collect();
    // The whole bike is too weak to reach anything but the nearest own-colour box
    assert!(choices.iter().all(|c| c.regime == TargetRegime::AllWeak));
    assert_eq!(choices[0].loot_box, NEAR_RED);

    let mut proposals = Vec::new();
    for choice in &choices {
        if !proposals.contains(&choice.loot_box) {
            proposals.push(choice.loot_box);
        }
    }
    let ballots: Vec<_> = main
        .iter()
        .map(|b| b.final_direction_vote(&snapshot, &proposals).unwrap())
        .collect();
    assert!(ballots.iter().all(|ballot| ballot.len() == proposals.len()));

    let (winner, _) = tally_direction_ballots(&proposals, &ballots).unwrap();
    assert!(proposals.contains(&winner));
}

#[test]
fn test_allocation_votes_are_normalised() {
    let snapshot = fixtures::sample_round();
    let mut bikers = riders(&snapshot, DecisionConfig::default());

    for biker in &mut bikers {
        let outcome = biker.decide_allocation(&snapshot).unwrap();
        assert!(outcome.vote.is_normalised(ALLOCATION_EPSILON));
        assert!(outcome.vote.iter().all(|(_, w)| *w >= 0.0 && *w <= 1.0));

        let expected = if snapshot.bike(MAIN_BIKE).unwrap().has_occupant(biker.id()) { 4 } else { 2 };
        assert_eq!(outcome.vote.len(), expected);
    }
}

#[test]
fn test_main_bike_elects_alder() {
    let snapshot = fixtures::sample_round();
    let bikers = riders(&snapshot, DecisionConfig::default());
    let main = on_bike(&bikers, &[ALDER, BRYN, CEDAR, DALE]);
    let voters: Vec<&dyn LeaderVoter> = main.iter().map(|b| *b as &dyn LeaderVoter).collect();

    let result = main[0].tally_election(&snapshot, &voters).unwrap();
    assert_eq!(result.outcome, ElectionOutcome::Elected(ALDER));
    assert_eq!(result.accepts, 4);

    // Any rider running the tally reaches the same outcome
    let again = main[1].tally_election(&snapshot, &voters).unwrap();
    assert_eq!(again.outcome, result.outcome);
}

#[test]
fn test_split_bike_elects_nobody() {
    let snapshot = fixtures::sample_round();
    let bikers = riders(&snapshot, DecisionConfig::default());
    let second = on_bike(&bikers, &[ELM, FERN]);
    let voters: Vec<&dyn LeaderVoter> = second.iter().map(|b| *b as &dyn LeaderVoter).collect();

    let result = second[0].tally_election(&snapshot, &voters).unwrap();
    assert_eq!(result.shortlist, vec![ELM, FERN]);
    assert_eq!(result.points, vec![2, 0]);
    assert_eq!(result.candidate, ELM);
    // Fern does not share Elm's colour and rates Elm below the bike average
    assert_eq!(result.accepts, 1);
    assert_eq!(result.outcome, ElectionOutcome::NoLeader);
    assert!(snapshot.bike(SECOND_BIKE).is_some());
}

#[test]
fn test_tuning_file_changes_target() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tuning.toml");
    std::fs::write(&path, "[target]\nenergy_per_distance = 0.02\n").unwrap();

    let config = DecisionConfig::from_file(&path).unwrap();
    let snapshot = fixtures::sample_round();
    let mut alder = Biker::new(ALDER, Colour::Red, Box::new(ReputationStrategy))
        .with_energy(0.9)
        .with_config(Arc::new(config));
    alder.begin_round(&snapshot).unwrap();

    let choice = alder.propose_direction(&snapshot).unwrap();
    assert_eq!(choice.loot_box, FAR_RED);
    assert_eq!(choice.regime, TargetRegime::WeightedScore);
}

#[test]
fn test_malformed_snapshot_aborts_round() {
    let mut snapshot = fixtures::sample_round();
    snapshot.loot_boxes[0].total_resources = f64::NAN;

    let mut alder = Biker::new(ALDER, Colour::Red, Box::new(ReputationStrategy));
    let result = alder.begin_round(&snapshot);
    assert!(matches!(result, Err(DecisionError::MalformedSnapshot(_))));
    assert!(alder.reputation().is_empty());
}

#[test]
fn test_empty_loot_list_is_a_contract_violation() {
    let mut snapshot = fixtures::sample_round();
    snapshot.loot_boxes.clear();
    let bikers = riders(&snapshot, DecisionConfig::default());

    let result = bikers[0].propose_direction(&snapshot);
    assert!(matches!(result, Err(DecisionError::EmptyCandidates { .. })));
}

#[test]
fn test_decision_log_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("decisions.jsonl");
    let snapshot = fixtures::sample_round();
    let mut bikers = riders(&snapshot, DecisionConfig::default());

    {
        let mut logger = DecisionLogger::new(&path).unwrap();
        for biker in &mut bikers {
            let outcome = biker.decide_allocation(&snapshot).unwrap();
            logger
                .log(
                    snapshot.round,
                    biker.id(),
                    DecisionKind::AllocationVote {
                        strategy: outcome.strategy.as_str().to_string(),
                        weights: outcome.vote.into_inner(),
                    },
                )
                .unwrap();
        }
    }

    let file = std::fs::File::open(&path).unwrap();
    let events: Vec<DecisionEvent> = std::io::BufReader::new(file)
        .lines()
        .map(|l| DecisionEvent::from_jsonl(&l.unwrap()).unwrap())
        .collect();
    assert_eq!(events.len(), 6);
    assert_eq!(events[5].event_id, "dec_00000006");
    assert!(events.iter().all(|e| e.round == 4));
}
