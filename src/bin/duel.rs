//! Headless Duel Runner
//!
//! Pits two fighters of any species against each other tick by tick and prints the
//! resolution log as JSON or text.

use std::path::PathBuf;
use std::process::ExitCode;

use arc_melee::combat::{
    ActionQueue, CombatEvent, CommittedAction, Combatant, Encounter, EventLog, Outcome, Reach,
    ResolutionEntry, StreamRandom, TickResolver,
};
use arc_melee::core::error::Result;
use arc_melee::core::types::{AgentId, TeamId};
use arc_melee::core::ResolutionConfig;
use arc_melee::data::{audit, builtin, CombatTables, DataTables};
use clap::{Parser, ValueEnum};
use serde::Serialize;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Text,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Range {
    Grapple,
    Short,
    Medium,
    Long,
    Pike,
}

impl From<Range> for Reach {
    fn from(range: Range) -> Self {
        match range {
            Range::Grapple => Reach::Grapple,
            Range::Short => Reach::Short,
            Range::Medium => Reach::Medium,
            Range::Long => Reach::Long,
            Range::Pike => Reach::Pike,
        }
    }
}

/// Headless Duel Runner - two fighters, one engagement
#[derive(Parser, Debug)]
#[command(name = "duel")]
#[command(about = "Resolve a one-on-one melee and print the log")]
struct Args {
    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Ticks to run unless someone drops first
    #[arg(long, default_value_t = 10)]
    ticks: u64,

    /// Starting range
    #[arg(long, value_enum, default_value = "medium")]
    range: Range,

    #[arg(long, default_value = "human")]
    red_species: String,

    #[arg(long, default_value = "axe")]
    red_weapon: String,

    #[arg(long, default_value = "swing")]
    red_technique: String,

    /// Guard or defence held through every tick (e.g. high_guard, parry)
    #[arg(long)]
    red_guard: Option<String>,

    /// Comma-separated armour piece ids
    #[arg(long, value_delimiter = ',')]
    red_armour: Vec<String>,

    #[arg(long, default_value = "human")]
    blue_species: String,

    #[arg(long, default_value = "arming_sword")]
    blue_weapon: String,

    #[arg(long, default_value = "thrust")]
    blue_technique: String,

    #[arg(long)]
    blue_guard: Option<String>,

    #[arg(long, value_delimiter = ',')]
    blue_armour: Vec<String>,

    /// Extra table file or directory merged over the built-in data
    #[arg(long)]
    data: Option<PathBuf>,

    /// Resolution config (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the data audit and exit
    #[arg(long)]
    audit: bool,

    #[arg(long, value_enum, default_value = "json")]
    format: Format,
}

const RED_WINDOW: (f32, f32) = (0.1, 0.6);
const BLUE_WINDOW: (f32, f32) = (0.5, 0.9);

#[derive(Serialize)]
struct DuelReport {
    seed: u64,
    ticks: u64,
    winner: Option<String>,
    entries: Vec<ResolutionEntry>,
    events: Vec<CombatEvent>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("arc_melee=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Duel failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_tables(args: &Args) -> Result<CombatTables> {
    let mut tables = builtin::tables();
    if let Some(path) = &args.data {
        if path.is_dir() {
            tables.load_directory(path)?;
        } else {
            tables.load_file(path)?;
        }
    }
    Ok(tables)
}

struct Loadout<'a> {
    species: &'a str,
    weapon: &'a str,
    armour: &'a [String],
}

fn fighter(id: AgentId, name: &str, team: u8, loadout: Loadout<'_>, tables: &CombatTables) -> Result<Combatant> {
    let species = tables.species(loadout.species)?;
    tables.body_plan(&species.body_plan)?;
    tables.weapon(loadout.weapon)?;
    for piece in loadout.armour {
        tables.armour_piece(piece)?;
    }
    let pieces: Vec<&str> = loadout.armour.iter().map(String::as_str).collect();
    Ok(Combatant::new(id, name, TeamId(team), species)
        .with_weapon(loadout.weapon)
        .with_armour(&pieces))
}

/// Window for a held guard or defence: the whole tick, or the part the
/// attack leaves free when both need the same channel
fn guard_window(tables: &CombatTables, guard: &str, attack: &str, attack_window: (f32, f32)) -> Result<(f32, f32)> {
    let guard = tables.technique(guard)?;
    let attack = tables.technique(attack)?;
    if !guard.channels.conflicts(&attack.channels) {
        return Ok((0.0, 1.0));
    }
    let (start, end) = attack_window;
    Ok(if start >= 1.0 - end { (0.0, start) } else { (end, 1.0) })
}

fn run(args: Args) -> Result<()> {
    let tables = load_tables(&args)?;

    if args.audit {
        let report = audit(&tables);
        print!("{}", report.to_markdown());
        report.into_result()?;
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => ResolutionConfig::load(path)?,
        None => ResolutionConfig::default(),
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = StreamRandom::new(seed);

    let red_id = AgentId::from_u128(1);
    let blue_id = AgentId::from_u128(2);
    let mut encounter = Encounter::new();
    let red = Loadout {
        species: &args.red_species,
        weapon: &args.red_weapon,
        armour: &args.red_armour,
    };
    let blue = Loadout {
        species: &args.blue_species,
        weapon: &args.blue_weapon,
        armour: &args.blue_armour,
    };
    encounter.add(fighter(red_id, "Red", 0, red, &tables)?);
    encounter.add(fighter(blue_id, "Blue", 1, blue, &tables)?);
    encounter.engage(red_id, blue_id, args.range.into());

    let resolver = TickResolver::new(&tables, &config);
    let mut queue = ActionQueue::new();
    let mut log = EventLog::new();
    let mut entries = Vec::new();
    let mut winner = None;

    tracing::info!("Duel start: seed {}, {} ticks", seed, args.ticks);

    for _ in 0..args.ticks {
        let sides = [
            (red_id, blue_id, &args.red_guard, &args.red_technique, RED_WINDOW),
            (blue_id, red_id, &args.blue_guard, &args.blue_technique, BLUE_WINDOW),
        ];
        for (id, foe, guard, technique, window) in sides {
            if let Some(guard) = guard {
                let (start, end) = guard_window(&tables, guard, technique, window)?;
                queue.commit(&tables, &encounter, CommittedAction::new(id, guard.as_str(), start, end))?;
            }
            queue.commit(
                &tables,
                &encounter,
                CommittedAction::new(id, technique.as_str(), window.0, window.1).at(foe),
            )?;
        }

        let actions = queue.take_tick();
        entries.extend(resolver.resolve(&actions, &mut encounter, &mut rng, &mut log)?);

        let down = |id| {
            encounter.get(id).map_or(true, |c| {
                tables
                    .body_plan(&c.body_plan)
                    .map_or(true, |plan| c.is_incapacitated(plan))
            })
        };
        let (red_down, blue_down) = (down(red_id), down(blue_id));
        if red_down || blue_down {
            winner = match (red_down, blue_down) {
                (false, true) => Some("Red".to_string()),
                (true, false) => Some("Blue".to_string()),
                _ => None,
            };
            break;
        }
    }

    let report = DuelReport {
        seed,
        ticks: encounter.tick,
        winner,
        entries,
        events: log.events,
    };

    match args.format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        Format::Text => print_text(&report, &encounter),
    }
    Ok(())
}

fn describe(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Hit(hit) => format!(
            "{} {} ({:?}, reached {:.1})",
            if hit.graze { "grazes" } else { "hits" },
            hit.part,
            hit.wound.severity,
            hit.reached
        ),
        Outcome::Deflected { part, .. } => format!("deflected off {}", part),
        Outcome::Miss => "misses".to_string(),
        Outcome::Defended { kind } => format!("defended ({:?})", kind),
        Outcome::OutOfRange { reach, range } => {
            format!("out of range ({:?} reach at {:?})", reach, range)
        }
        Outcome::NoValidTarget => "finds nothing to hit".to_string(),
        Outcome::Skipped { reason } => format!("skipped ({:?})", reason),
    }
}

fn print_text(report: &DuelReport, encounter: &Encounter) {
    let name = |id| encounter.get(id).map_or("?", |c| c.name.as_str());

    println!("Seed {}: {} tick(s)", report.seed, report.ticks);
    for entry in &report.entries {
        println!(
            "  {} {} ({}) -> {}: {}",
            name(entry.actor),
            entry.technique,
            entry.weapon,
            name(entry.target),
            describe(&entry.outcome)
        );
    }
    for event in &report.events {
        if let CombatEvent::WeaponDropped { actor, weapon, .. } = event {
            println!("  {} drops the {}", name(*actor), weapon);
        }
    }
    for fighter in encounter.combatants() {
        let v = &fighter.vitals;
        println!(
            "  {} ({}): blood {:.2}, stamina {:.2}, focus {:.2}",
            fighter.name, fighter.species, v.blood, v.stamina, v.focus
        );
    }
    match &report.winner {
        Some(winner) => println!("{} wins", winner),
        None => println!("No winner"),
    }
}
