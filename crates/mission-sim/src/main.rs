use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use mission_core::MissionConfig;
use mission_sim::{run_simulator, SimulatorConfig};
use serde_json::json;
use std::path::PathBuf;

fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .value_parser(value_parser!(PathBuf))
        .help("TOML file with team table and max-point overrides")
}

fn load_registries(args: &ArgMatches) -> anyhow::Result<MissionConfig> {
    match args.get_one::<PathBuf>("config") {
        Some(path) => MissionConfig::load(path)
            .with_context(|| format!("loading {}", path.display())),
        None => Ok(MissionConfig::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mission_sim=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Command::new("mission-sim")
        .version(mission_sim::VERSION)
        .about("Mission lifecycle simulator")
        .subcommand_required(true)
        .subcommand(
            Command::new("simulate")
                .about("Run randomised creation requests and check invariants")
                .arg(
                    Arg::new("missions")
                        .long("missions")
                        .default_value("1000")
                        .value_parser(value_parser!(u64))
                        .help("Number of creation requests to generate"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .default_value("42")
                        .value_parser(value_parser!(u64))
                        .help("Random seed for reproducibility"),
                )
                .arg(
                    Arg::new("failure-rate")
                        .long("failure-rate")
                        .default_value("0.0")
                        .value_parser(value_parser!(f64))
                        .help("Probability that a location notification fails"),
                )
                .arg(
                    Arg::new("stop-on-violation")
                        .long("stop-on-violation")
                        .action(ArgAction::SetTrue)
                        .help("Stop simulation on first violation"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                )
                .arg(config_arg()),
        )
        .subcommand(
            Command::new("variants")
                .about("List registered mission variants and teams")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                )
                .arg(config_arg()),
        );

    let matches = cli.get_matches();

    match matches.subcommand() {
        Some(("simulate", args)) => {
            let defaults = SimulatorConfig::default();
            let config = SimulatorConfig {
                seed: args.get_one::<u64>("seed").copied().unwrap_or(defaults.seed),
                missions: args
                    .get_one::<u64>("missions")
                    .copied()
                    .unwrap_or(defaults.missions),
                stop_on_first_violation: args.get_flag("stop-on-violation"),
                notification_failure_rate: args
                    .get_one::<f64>("failure-rate")
                    .copied()
                    .unwrap_or(defaults.notification_failure_rate),
                registries: load_registries(args)?,
            };
            let json = args.get_flag("json");

            tracing::info!(
                missions = config.missions,
                seed = config.seed,
                "Running mission simulator"
            );
            let report = run_simulator(config).await?;

            if json {
                println!("{}", report.generate_json()?);
            } else {
                println!("{}", report.generate_text());
            }

            std::process::exit(if report.passed() { 0 } else { 1 });
        }
        Some(("variants", args)) => {
            let registries = load_registries(args)?;
            let variants = registries.build_variant_registry()?;
            let teams = registries.build_team_registry()?;

            if args.get_flag("json") {
                let variants: Vec<_> = variants
                    .iter()
                    .map(|v| {
                        json!({
                            "type": v.type_id(),
                            "identifier": v.identifier(),
                            "max_points": v.max_points,
                            "outcome_shape": v.outcome_shape,
                        })
                    })
                    .collect();
                let teams: Vec<_> = teams.iter().collect();
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({ "variants": variants, "teams": teams }))?
                );
            } else {
                println!("Mission Variants");
                println!("================");
                for v in variants.iter() {
                    println!(
                        "  {:<22} {:<14} max {:>3}  {}",
                        v.type_id(),
                        v.identifier(),
                        v.max_points,
                        serde_json::to_string(&v.outcome_shape)?
                    );
                }
                println!();
                println!("Teams");
                println!("=====");
                for t in teams.iter() {
                    println!(
                        "  {:<10} {:<12} {}",
                        t.id.as_str(),
                        t.display_name,
                        if t.scoring { "scoring" } else { "observer" }
                    );
                }
            }
        }
        _ => {}
    }

    Ok(())
}
