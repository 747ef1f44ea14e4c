//! Megabike Agent Driver
//!
//! Runs one decision round for every rider in a snapshot file: direction
//! proposals and ballots, allocation votes and the leader election. Bikes and
//! riders are evaluated in parallel over the shared snapshot.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bike_core::config::{default_config_toml, ConfigError, DecisionConfig, DEFAULT_TUNING_PATH};
use bike_core::error::DecisionError;
use bike_core::events::{DecisionLogger, PendingDecisions};
use bike_core::setup::{bikers_for_snapshot, seeded_rng};
use bike_core::systems::{tally_direction_ballots, ElectionResult, LeaderVoter};
use bike_core::Biker;
use bike_events::{AgentId, BikeId, Colour, DecisionKind, LootBoxId, MegaBike, RoundSnapshot};
use clap::Parser;
use rayon::prelude::*;
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Command line arguments for the decision driver
#[derive(Parser, Debug)]
#[command(name = "megabike_agent")]
#[command(about = "Runs one megabike decision round over a snapshot")]
struct Args {
    /// Round snapshot (JSON)
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Random seed for strategy assignment
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Tuning file (TOML). Falls back to tuning.toml if present
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write every decision to this JSONL file
    #[arg(long)]
    log: Option<PathBuf>,

    /// Give every rider the baseline strategy
    #[arg(long)]
    baseline: bool,

    /// Print the default tuning file and exit
    #[arg(long)]
    print_default_config: bool,
}

#[derive(Debug, Error)]
enum AppError {
    #[error("no snapshot given, pass --snapshot <file>")]
    MissingSnapshot,
    #[error("could not read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Decision(#[from] DecisionError),
    #[error("decision log: {0}")]
    Log(#[from] std::io::Error),
}

/// What one bike decided this round
struct BikeRound {
    bike: BikeId,
    runner: AgentId,
    chosen: Option<(LootBoxId, u64)>,
    decisions: Vec<(AgentId, DecisionKind)>,
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into())))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        error!(error = %e, "decision round failed");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), AppError> {
    if args.print_default_config {
        print!("{}", default_config_toml());
        return Ok(());
    }

    let config = Arc::new(load_config(args.config.as_deref())?);
    let path = args.snapshot.ok_or(AppError::MissingSnapshot)?;
    let json = fs::read_to_string(&path).map_err(|source| AppError::Read {
        path: path.clone(),
        source,
    })?;
    let snapshot = RoundSnapshot::from_json(&json)?;

    println!("Megabike Decision Round");
    println!("=======================");
    println!("Round: {}", snapshot.round);
    println!("Seed: {}", args.seed);
    println!("Bikes: {}", snapshot.bikes.len());
    println!("Loot boxes: {}", snapshot.loot_boxes.len());
    println!();

    let mut rng = seeded_rng(args.seed);
    let baseline_share = if args.baseline { 1.0 } else { 0.0 };
    let mut bikers = bikers_for_snapshot(&snapshot, &mut rng, baseline_share, &config);
    info!(riders = bikers.len(), "agents ready");

    bikers
        .par_iter_mut()
        .try_for_each(|biker| biker.begin_round(&snapshot))?;

    // Direction stage
    let mut rounds: Vec<BikeRound> = {
        let index = rider_index(&bikers);
        snapshot
            .bikes
            .par_iter()
            .filter(|bike| !bike.occupants.is_empty())
            .map(|bike| direction_stage(&snapshot, bike, &riders_of(bike, &bikers, &index)))
            .collect::<Result<_, DecisionError>>()?
    };

    // Allocation stage
    let allocations = bikers
        .par_iter_mut()
        .map(|biker| {
            let outcome = biker.decide_allocation(&snapshot)?;
            Ok::<_, DecisionError>((
                biker.id(),
                DecisionKind::AllocationVote {
                    strategy: outcome.strategy.as_str().to_string(),
                    weights: outcome.vote.into_inner(),
                },
            ))
        })
        .collect::<Result<Vec<_>, DecisionError>>()?;

    // Election stage
    let index = rider_index(&bikers);
    let elections = snapshot
        .bikes
        .par_iter()
        .filter(|bike| !bike.occupants.is_empty())
        .map(|bike| election_stage(&snapshot, &riders_of(bike, &bikers, &index)))
        .collect::<Result<Vec<_>, DecisionError>>()?;

    let mut pending = PendingDecisions::new();
    for (round, (result, election_decisions)) in rounds.iter_mut().zip(elections) {
        pending.extend(round.decisions.drain(..));
        pending.extend(
            allocations
                .iter()
                .filter(|(agent, _)| snapshot.bike(round.bike).is_some_and(|b| b.has_occupant(*agent)))
                .cloned(),
        );
        pending.extend(election_decisions);

        match round.chosen {
            Some((loot_box, points)) => println!("Bike {}: heading to {} ({} points)", round.bike, loot_box, points),
            None => println!("Bike {}: no direction agreed", round.bike),
        }
        match result.outcome.leader() {
            Some(leader) => println!(
                "  leader {} confirmed by {}/{} riders (tallied by {})",
                leader, result.accepts, result.occupants, round.runner
            ),
            None => println!(
                "  no leader: {} got {}/{} accepts",
                result.candidate, result.accepts, result.occupants
            ),
        }
    }

    // Riders whose colour was just looted seek a new one
    let looted: HashMap<BikeId, Colour> = rounds
        .iter()
        .filter_map(|round| {
            let (loot_box, _) = round.chosen?;
            snapshot.loot_box(loot_box).map(|b| (round.bike, b.colour))
        })
        .collect();
    for biker in &mut bikers {
        let matched = biker
            .state()
            .bike
            .and_then(|bike| looted.get(&bike))
            .is_some_and(|colour| *colour == biker.colour());
        if matched {
            let colour = biker.reroll_colour(&mut rng, Colour::all().len());
            println!("Rider {} now seeks {}", biker.id(), colour);
        }
    }

    let mut logger = match &args.log {
        Some(path) => DecisionLogger::new(path)?,
        None => DecisionLogger::null(),
    };
    let logged = logger.log_pending(snapshot.round, &mut pending)?;
    logger.flush()?;
    if let Some(path) = &args.log {
        println!();
        println!("Wrote {} decisions to {}", logged, path.display());
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<DecisionConfig, ConfigError> {
    match path {
        Some(path) => DecisionConfig::from_file(path),
        None if Path::new(DEFAULT_TUNING_PATH).exists() => DecisionConfig::from_file(DEFAULT_TUNING_PATH),
        None => Ok(DecisionConfig::default()),
    }
}

fn rider_index(bikers: &[Biker]) -> HashMap<AgentId, usize> {
    bikers.iter().enumerate().map(|(i, b)| (b.id(), i)).collect()
}

/// Riders of `bike` in boarding order.
fn riders_of<'b>(bike: &MegaBike, bikers: &'b [Biker], index: &HashMap<AgentId, usize>) -> Vec<&'b Biker> {
    bike.occupants
        .iter()
        .filter_map(|o| index.get(&o.id).map(|i| &bikers[*i]))
        .collect()
}

fn direction_stage(snapshot: &RoundSnapshot, bike: &MegaBike, riders: &[&Biker]) -> Result<BikeRound, DecisionError> {
    let runner = riders.first().map(|b| b.id()).ok_or(DecisionError::EmptyCandidates {
        stage: "direction vote",
    })?;
    let mut decisions = Vec::new();

    let mut proposals = Vec::with_capacity(riders.len());
    for rider in riders {
        let choice = rider.propose_direction(snapshot)?;
        decisions.push((
            rider.id(),
            DecisionKind::DirectionProposed {
                loot_box: choice.loot_box,
                regime: choice.regime.as_str().to_string(),
            },
        ));
        if !proposals.contains(&choice.loot_box) {
            proposals.push(choice.loot_box);
        }
    }

    let mut ballots = Vec::with_capacity(riders.len());
    for rider in riders {
        let ranks = rider.final_direction_vote(snapshot, &proposals)?;
        decisions.push((rider.id(), DecisionKind::DirectionBallot { ranks: ranks.clone() }));
        ballots.push(ranks);
    }

    let chosen = tally_direction_ballots(&proposals, &ballots);
    match chosen {
        Some((loot_box, points)) => decisions.push((runner, DecisionKind::DirectionChosen { loot_box, points })),
        None => warn!(bike = %bike.id, "no direction proposals to tally"),
    }

    Ok(BikeRound {
        bike: bike.id,
        runner,
        chosen,
        decisions,
    })
}

fn election_stage(
    snapshot: &RoundSnapshot,
    riders: &[&Biker],
) -> Result<(ElectionResult, Vec<(AgentId, DecisionKind)>), DecisionError> {
    let runner = riders.first().ok_or(DecisionError::EmptyCandidates {
        stage: "leader election",
    })?;
    let voters: Vec<&dyn LeaderVoter> = riders.iter().map(|b| *b as &dyn LeaderVoter).collect();
    let result = runner.tally_election(snapshot, &voters)?;

    let occupants: Vec<AgentId> = riders.iter().map(|b| b.id()).collect();
    let mut decisions = Vec::with_capacity(riders.len() * 2 + 1);
    for rider in riders {
        decisions.push((
            rider.id(),
            DecisionKind::LeaderBallot {
                ranks: rider.leader_ballot(&result.shortlist)?,
            },
        ));
    }
    for rider in riders {
        decisions.push((
            rider.id(),
            DecisionKind::LeaderConfirmation {
                candidate: result.candidate,
                accept: rider.confirm_leader(result.candidate, &occupants),
            },
        ));
    }
    decisions.push((
        runner.id(),
        DecisionKind::ElectionResult {
            shortlist: result.shortlist.clone(),
            points: result.points.clone(),
            candidate: result.candidate,
            accepts: result.accepts,
            occupants: result.occupants,
            elected: result.outcome.leader(),
        },
    ));

    Ok((result, decisions))
}
