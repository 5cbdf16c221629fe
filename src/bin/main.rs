use std::error::Error;

use avl_tree::{Workload, WorkloadConfig};
use log::info;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

fn main() -> Result<(), Box<dyn Error>> {
    let config = WorkloadConfig::from_args(std::env::args().skip(1))?;

    TermLogger::init(
        config.log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let workload = Workload::generate(&config)?;
    info!("workload seed {}", workload.seed);

    let outcome = workload.run();

    if outcome.duplicates > 0 {
        info!(
            "{} of {} keys were duplicates and were not inserted",
            outcome.duplicates,
            workload.keys.len()
        );
    }

    println!("{}", outcome.tree.report());
    println!(
        "Found {} of {} searched keys, deleted {} of {} keys",
        outcome.found,
        workload.searches.len(),
        outcome.deleted,
        workload.deletes.len()
    );

    let tree = outcome.tree.tree();
    tree.assert_invariants();
    println!("Final tree: {} keys, height {}", tree.len(), tree.height());

    if config.dot {
        let mut dot = String::new();
        tree.dotgraph("avl", &mut dot)?;
        println!("{dot}");
    }

    Ok(())
}
