//! Bitcoin HD wallet recovery CLI

use anyhow::{bail, Context, Result};
use bitcoin::{Address, Network};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use recover_wallet::{Descriptor, MasterKey, SearchPlan, SearchQueue};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "recover-wallet")]
#[command(about = "Bitcoin HD wallet recovery candidate enumerator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enumerate candidate scripts for a master key
    Enumerate {
        /// Extended private key (xprv/tprv)
        #[arg(long, conflicts_with = "seed")]
        key: Option<String>,

        /// BIP32 seed in hex
        #[arg(long)]
        seed: Option<String>,

        /// Network addresses are rendered for
        #[arg(long, default_value = "bitcoin")]
        network: Network,

        /// Highest address index tried per descriptor
        #[arg(long, default_value = "100")]
        max_index: u32,

        /// Highest account tried per descriptor
        #[arg(long, default_value = "10")]
        max_account: u32,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Display the search plan without deriving anything
    Plan {
        /// Highest address index tried per descriptor
        #[arg(long, default_value = "100")]
        max_index: u32,

        /// Highest account tried per descriptor
        #[arg(long, default_value = "10")]
        max_account: u32,

        /// Output file for the JSON plan
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Enumerate {
            key,
            seed,
            network,
            max_index,
            max_account,
            output,
        } => {
            let master_key = load_master_key(key.as_deref(), seed.as_deref(), network)?;
            run_enumerate(&master_key, network, max_index, max_account, output.as_deref())?;
        }
        Commands::Plan {
            max_index,
            max_account,
            output,
        } => {
            run_plan(max_index, max_account, output.as_deref())?;
        }
    }

    Ok(())
}

fn load_master_key(key: Option<&str>, seed: Option<&str>, network: Network) -> Result<MasterKey> {
    let master_key = match (key, seed) {
        (Some(key), None) => MasterKey::from_str(key).context("invalid extended private key")?,
        (None, Some(seed)) => {
            let seed = hex::decode(seed).context("seed must be hex")?;
            MasterKey::from_seed(network.into(), &seed)?
        }
        _ => bail!("exactly one of --key and --seed is required"),
    };

    if master_key.network() != network.into() {
        warn!(
            "key network does not match --network; addresses are rendered for {}",
            network
        );
    }

    Ok(master_key)
}

fn run_enumerate(
    master_key: &MasterKey,
    network: Network,
    max_index: u32,
    max_account: u32,
    output: Option<&Path>,
) -> Result<()> {
    let descriptors = Descriptor::known()?;
    let queue = SearchQueue::new(master_key, &descriptors, max_index, max_account);

    info!(
        "Enumerating {} candidate scripts across {} searches",
        queue.total_scripts(),
        queue.active_searches()
    );

    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create output file: {:?}", path))?,
        )),
        None => Box::new(std::io::stdout().lock()),
    };

    let pb = ProgressBar::new(queue.total_scripts());
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} scripts ({eta})")?
            .progress_chars("#>-"),
    );

    let mut produced = 0u64;
    for candidate in queue {
        let candidate = candidate?;
        let address = Address::from_script(&candidate.script, network)?;

        writeln!(
            writer,
            "{}\t{}\t{}\t{}",
            address,
            candidate.path,
            candidate.script_type,
            hex::encode(candidate.script.as_bytes())
        )?;

        produced += 1;
        pb.inc(1);
    }

    pb.finish_with_message("Enumeration complete");
    writer.flush()?;

    info!("Produced {} candidate scripts", produced);

    Ok(())
}

fn run_plan(max_index: u32, max_account: u32, output: Option<&Path>) -> Result<()> {
    let descriptors = Descriptor::known()?;
    let plan = SearchPlan::generate(&descriptors, max_index, max_account);

    println!("=== Wallet Recovery Search Plan ===");
    for entry in &plan.entries {
        println!(
            "{}\t{}\t{} scripts",
            entry.pattern, entry.script_type, entry.total_scripts
        );
    }
    println!();
    println!("Grid bounds: index 0..={}, account 0..={}", plan.max_index, plan.max_account);
    println!("Total candidate scripts: {}", plan.total_scripts);

    if let Some(path) = output {
        plan.save(path)?;
        info!("Saved search plan to {:?}", path);
    }

    Ok(())
}
