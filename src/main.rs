//! Gridpath CLI - Compare exact and genetic solvers on a JSON scenario.

use std::fs;
use std::path::PathBuf;

use rayon::prelude::*;

use gridpath::{
    compute::{astar, dijkstra, evolution::GeneticPathfinder},
    schema::{GaConfig, GaResult, Scenario, SearchResult},
};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <scenario.json> [trials]", args[0]);
        eprintln!();
        eprintln!("Solve a grid scenario with Dijkstra, A* and the genetic pathfinder.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  scenario.json  Path to scenario file (cells, start, goal)");
        eprintln!("  trials         Independent genetic runs (default: 1)");
        eprintln!();
        eprintln!("Genetic settings are read from <scenario>.ga.json when present.");
        eprintln!("Example files are generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let scenario_path = PathBuf::from(&args[1]);
    let trials: usize = args
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(1)
        .max(1);

    let scenario = Scenario::load(&scenario_path).unwrap_or_else(|e| {
        eprintln!("Error loading scenario: {}", e);
        std::process::exit(1);
    });

    let problem = scenario.to_problem().unwrap_or_else(|e| {
        eprintln!("Invalid scenario: {}", e);
        std::process::exit(1);
    });

    // Load or default GA settings
    let ga_path = scenario_path.with_extension("ga.json");
    let config: GaConfig = if ga_path.exists() {
        let ga_str = fs::read_to_string(&ga_path).unwrap_or_else(|e| {
            eprintln!("Error reading GA config file: {}", e);
            std::process::exit(1);
        });
        serde_json::from_str(&ga_str).unwrap_or_else(|e| {
            eprintln!("Error parsing GA config: {}", e);
            std::process::exit(1);
        })
    } else {
        GaConfig::default()
    };

    if let Err(e) = config.validate() {
        eprintln!("Invalid GA config: {}", e);
        std::process::exit(1);
    }

    println!("Gridpath");
    println!("========");
    println!("Grid: {}x{}", problem.grid.rows(), problem.grid.cols());
    println!("Start: {}  Goal: {}", problem.start, problem.goal);
    println!(
        "GA: population {}, {} generations, elitism {}, mutation {}",
        config.population_size, config.generations, config.elitism_count, config.mutation_rate
    );
    println!("Trials: {}", trials);
    println!();

    let dijkstra_result = dijkstra(&problem);
    let astar_result = astar(&problem);

    let base_seed = config.random_seed.unwrap_or_else(rand::random);
    let single = trials == 1;

    let ga_results: Vec<GaResult> = (0..trials)
        .into_par_iter()
        .map(|trial| {
            let trial_config = GaConfig {
                random_seed: Some(base_seed.wrapping_add(trial as u64)),
                ..config.clone()
            };
            let mut ga = match GeneticPathfinder::new(problem.clone(), trial_config) {
                Ok(ga) => ga,
                Err(e) => {
                    eprintln!("Invalid GA config: {}", e);
                    std::process::exit(1);
                }
            };
            ga.run_with_callback(|progress| {
                if single && progress.is_improvement {
                    println!("  {}", progress.status);
                }
            })
        })
        .collect();

    if single {
        println!();
    }

    println!(
        "{:<12} {:>10} {:>10} {:>8} {:>10} {:>12}",
        "Solver", "Status", "Cost", "Length", "Time (s)", "Work"
    );
    print_exact_row("Dijkstra", &dijkstra_result);
    print_exact_row("A*", &astar_result);
    for (trial, result) in ga_results.iter().enumerate() {
        let label = format!("GA #{}", trial + 1);
        println!(
            "{:<12} {:>10} {:>10} {:>8} {:>10.4} {:>12}",
            label,
            if result.reached_goal { "found" } else { "not found" },
            result.cost,
            result.path.len(),
            result.elapsed_seconds,
            format!("{} gens", result.stats.generations)
        );
    }

    println!();
    if !astar_result.success {
        println!("Goal is unreachable; no optimality gap to report.");
        return;
    }

    println!("Optimality gap vs A* (cost {}):", astar_result.cost);
    for (trial, result) in ga_results.iter().enumerate() {
        if result.reached_goal {
            let gap = result.cost as f64 / astar_result.cost.max(1) as f64 - 1.0;
            println!(
                "  GA #{}: +{} ({:.2}%)",
                trial + 1,
                result.cost - astar_result.cost.min(result.cost),
                gap * 100.0
            );
        } else {
            println!("  GA #{}: goal not reached", trial + 1);
        }
    }
}

fn print_exact_row(label: &str, result: &SearchResult) {
    println!(
        "{:<12} {:>10} {:>10} {:>8} {:>10.4} {:>12}",
        label,
        if result.success { "found" } else { "not found" },
        result.cost,
        result.path.len(),
        result.elapsed_seconds,
        format!("{} nodes", result.nodes_visited)
    );
}

fn print_example_config() {
    let scenario = Scenario::default();
    let config = GaConfig {
        population_size: 100,
        generations: 100,
        random_seed: Some(42),
        ..Default::default()
    };

    println!("Example scenario (maze.json):");
    println!("{}", to_json(&scenario));
    println!();
    println!("Example GA settings (maze.ga.json):");
    println!("{}", to_json(&config));
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error serializing example: {}", e);
        std::process::exit(1);
    })
}
