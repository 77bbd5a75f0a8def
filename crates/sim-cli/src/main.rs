use std::env;

use contracts::{ScenarioConfig, ScenarioKind};
use sim_core::{compare_scenarios, run_scenario, IndicatorGraph};

fn print_usage() {
    println!("sim-cli <command>");
    println!("commands:");
    println!("  run <sdgs> [scenario] [funding_pct] [timeline_years] [delay_months] [seed]");
    println!("    sdgs: comma-separated goal numbers, e.g. 3,4,7");
    println!("    scenario: success | partial_success | delay | failure | underfunded");
    println!("    defaults: success, 100% funding, 5 years, no delay, seed 1337");
    println!("  compare <sdgs> [timeline_years] [seed]");
    println!("    runs all five scenarios with preset funding/delay and ranks them");
    println!("  indicators");
    println!("    prints the indicator catalogue");
}

fn parse_sdgs(value: Option<&String>) -> Result<Vec<u8>, String> {
    let raw = value.ok_or_else(|| "missing sdgs".to_string())?;
    let mut sdgs = Vec::new();
    for part in raw.split(',') {
        let trimmed = part.trim();
        if trimmed.is_empty() {
            continue;
        }
        let sdg = trimmed
            .parse::<u8>()
            .map_err(|_| format!("invalid sdg: {trimmed}"))?;
        if !(1..=17).contains(&sdg) {
            return Err(format!("sdg out of range 1-17: {sdg}"));
        }
        sdgs.push(sdg);
    }
    if sdgs.is_empty() {
        return Err("missing sdgs".to_string());
    }
    Ok(sdgs)
}

fn parse_scenario(value: Option<&String>) -> Result<ScenarioKind, String> {
    match value {
        None => Ok(ScenarioKind::Success),
        Some(raw) => {
            ScenarioKind::parse(raw).ok_or_else(|| format!("invalid scenario: {raw}"))
        }
    }
}

fn parse_f64(value: Option<&String>, default: f64, label: &str) -> Result<f64, String> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .parse::<f64>()
            .map_err(|_| format!("invalid {label}: {raw}")),
    }
}

fn parse_u32(value: Option<&String>, default: u32, label: &str) -> Result<u32, String> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| format!("invalid {label}: {raw}")),
    }
}

fn parse_seed(value: Option<&String>, default: u64) -> Result<u64, String> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|_| format!("invalid seed: {raw}")),
    }
}

fn run_command(args: &[String]) -> Result<(), String> {
    let mut config = ScenarioConfig::default();
    config.target_sdgs = parse_sdgs(args.get(2))?;
    config.scenario = parse_scenario(args.get(3))?;
    config.funding_percentage = parse_f64(args.get(4), 100.0, "funding_pct")?;
    if config.funding_percentage < 0.0 {
        return Err(format!(
            "funding_pct must be non-negative: {}",
            config.funding_percentage
        ));
    }
    config.timeline_years = parse_u32(args.get(5), 5, "timeline_years")?;
    if config.timeline_years == 0 {
        return Err("timeline_years must be at least 1".to_string());
    }
    config.delay_months = parse_u32(args.get(6), 0, "delay_months")?;
    config.seed = parse_seed(args.get(7), config.seed)?;
    config.run_id = format!("run_{}_{}", config.scenario, config.seed);

    let graph = IndicatorGraph::sdg_default();
    let result = run_scenario(&graph, config).map_err(|err| err.to_string())?;
    let encoded = serde_json::to_string_pretty(&result)
        .map_err(|err| format!("failed to encode result: {err}"))?;
    println!("{encoded}");
    Ok(())
}

fn compare_command(args: &[String]) -> Result<(), String> {
    let mut config = ScenarioConfig::default();
    config.target_sdgs = parse_sdgs(args.get(2))?;
    config.timeline_years = parse_u32(args.get(3), 5, "timeline_years")?;
    if config.timeline_years == 0 {
        return Err("timeline_years must be at least 1".to_string());
    }
    config.seed = parse_seed(args.get(4), config.seed)?;
    config.run_id = format!("batch_{}", config.seed);

    let graph = IndicatorGraph::sdg_default();
    let comparison = compare_scenarios(&graph, &config).map_err(|err| err.to_string())?;
    let encoded = serde_json::to_string_pretty(&comparison)
        .map_err(|err| format!("failed to encode comparison: {err}"))?;
    println!("{encoded}");
    Ok(())
}

fn indicators_command() {
    let graph = IndicatorGraph::sdg_default();
    for indicator in graph.indicators() {
        println!(
            "{:<22} {} (SDG {}) baseline {} {}",
            indicator.key, indicator.name, indicator.sdg, indicator.baseline, indicator.unit
        );
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str);

    let outcome = match command {
        Some("run") => run_command(&args),
        Some("compare") => compare_command(&args),
        Some("indicators") => {
            indicators_command();
            Ok(())
        }
        _ => {
            print_usage();
            std::process::exit(2);
        }
    };

    if let Err(err) = outcome {
        eprintln!("error: {}", err);
        print_usage();
        std::process::exit(2);
    }
}
