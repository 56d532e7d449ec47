//! main.rs: Offline practice planner entry point
//!
//! Reads a TOML plan, partitions the present roster into groups (and partners
//! on request), then prints the time budget, water-break hints, group cards and
//! one schedule matrix per rotation block.

mod plan;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use practice_core::{create_groups, create_partners, present_players, suggest_group_count};

use plan::PlanBlock;
use report::PlanReport;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "practice-plan", about = "Plan a team practice: time budget, groups and rotations")]
struct Args {
    /// Plan file path
    #[arg(short, long, default_value = "plan.toml")]
    plan: String,
    /// Seed for reproducible groups
    #[arg(long)]
    seed: Option<u64>,
    /// Number of groups (overrides the plan and the suggestion)
    #[arg(short, long)]
    groups: Option<usize>,
    /// Also pair players into partners
    #[arg(long)]
    partners: bool,
    /// Do not charge automatic water breaks against the budget
    #[arg(long)]
    no_water_breaks: bool,
    /// Emit the report as JSON
    #[arg(long)]
    json: bool,
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "practice_cli=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let raw = match std::fs::read_to_string(&args.plan) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("⚠️  Could not read {} ({e}), using the bundled sample plan", args.plan);
            include_str!("../plan.toml").to_string()
        }
    };
    let plan = plan::parse(&raw).with_context(|| format!("loading {}", args.plan))?;

    let mut rng = match args.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let roster = plan.roster();
    let titles = plan.drill_titles();
    let present = present_players(&roster, &plan.attendance());
    let rotation_count = plan.blocks.iter().filter(|b| matches!(b, PlanBlock::Rotation { .. })).count();

    let group_count = args
        .groups
        .or(plan.practice.groups)
        .unwrap_or_else(|| suggest_group_count(present.len(), rotation_count));

    info!(
        "📋 {} present of {} players, {group_count} groups, {} blocks",
        present.len(),
        roster.len(),
        plan.blocks.len()
    );

    let mut groups = create_groups(&present, group_count, &mut rng);
    if args.partners {
        groups.extend(create_partners(&present, &mut rng));
    }

    let practice = plan.into_practice(groups)?;
    let report = PlanReport::build(&practice, &roster, &titles, !args.no_water_breaks);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render());
    }

    if report.time.is_over_limit {
        warn!("⏱ Plan runs {} over", practice_core::format_time(-report.time.remaining_minutes));
    }
    Ok(())
}
