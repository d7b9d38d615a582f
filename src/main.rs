// Demonstration driver for rbt-index.
//
// * Build a small tree, delete from it and print the shape.
// * Grow it further, print, then delete a few keys, validating after
//   each delete.
// * Run a random insert/delete workload and validate the end result.
//
// Set RBT_LOG to one of off, error, warn, info, debug, trace to see the
// fix-up cases taken along the way.

use std::{
    error,
    str::FromStr,
    time::{SystemTime, UNIX_EPOCH},
};

use log::{info, warn};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

use rbt_index::Rbt;

const WORKLOAD: usize = 100_000;

fn main() -> Result<(), Box<dyn error::Error>> {
    init_logging();

    let mut tree: Rbt<i64> = Rbt::new("demo");
    for key in [10, 20, 30, 35, 25].iter() {
        tree.insert(*key);
    }
    tree.delete(&30);
    tree.validate()?;
    print!("{}", tree);
    println!();

    for key in [5, 3, 8, 1, 6, 9, 2, 7, 4].iter() {
        tree.insert(*key);
    }
    print!("{}", tree);
    println!();

    for key in [6, 2, 8].iter() {
        tree.delete(key);
        tree.validate()?;
    }
    print!("{}", tree);
    println!();

    let seed = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
    info!("workload seed {}", seed);
    let mut rng = SmallRng::from_seed(seed.to_le_bytes());
    let mut workload: Rbt<i64> = Rbt::new("workload");
    let (mut inserts, mut deletes) = (0, 0);
    for _ in 0..WORKLOAD {
        let key: i64 = rng.gen_range(0, 10_000);
        if rng.gen::<u8>() % 3 == 0 {
            if workload.delete(&key).is_some() {
                deletes += 1;
            }
        } else {
            workload.insert(key);
            inserts += 1;
        }
    }
    let stats = workload.validate()?;
    println!(
        "workload: inserts:{} deletes:{} entries:{} blacks:{:?}",
        inserts,
        deletes,
        stats.entries(),
        stats.blacks()
    );
    if let Some(depths) = stats.depths() {
        println!("{}", depths.pretty("workload: "));
    }
    Ok(())
}

fn init_logging() {
    let level = match std::env::var("RBT_LOG") {
        Ok(level) => LevelFilter::from_str(&level).unwrap_or(LevelFilter::Warn),
        Err(_) => LevelFilter::Warn,
    };
    let res = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );
    if let Err(err) = res {
        warn!("logger already installed: {}", err);
    }
}
