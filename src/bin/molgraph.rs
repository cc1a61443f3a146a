use clap::{Parser, Subcommand, ValueEnum};
use molgraph::convert::records_to_smiles;
use molgraph::dataset::*;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DictKind {
    Atom,
    Bond,
}

#[derive(Subcommand)]
enum Command {
    /// Convert the record blobs of every split into graph blobs
    Prepare { data_dir: PathBuf },
    /// Print the SMILES string of each record in a split
    Smiles {
        data_dir: PathBuf,
        split: Split,
        /// Write aromatic rings with alternating single and double bonds
        #[arg(short, long)]
        kekulize: bool,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Dump a dictionary
    Dict {
        data_dir: PathBuf,
        #[arg(default_value = "atom")]
        kind: DictKind,
    },
}

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

fn init_tracing() {
    use tracing_subscriber::filter::*;
    use tracing_subscriber::prelude::*;
    let targets = match std::env::var("RUST_LOG") {
        Ok(var) => var.parse::<Targets>().unwrap_or_else(|e| {
            eprintln!("Ignoring `RUST_LOG={var:?}`: {e}");
            Targets::new().with_default(tracing::Level::ERROR)
        }),
        Err(e) => {
            if e != std::env::VarError::NotPresent {
                eprintln!("Ignoring `RUST_LOG`: {e}");
            }
            Targets::new().with_default(tracing::Level::ERROR)
        }
    };
    let fmt = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(targets)
        .with(fmt)
        .init();
}

fn run(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Prepare { data_dir } => {
            let config = DatasetConfig::new(data_dir);
            let dataset = MoleculeDataset::prepare(&config)?;
            dataset.save(&config)?;
            println!(
                "train: {}, val: {}, test: {}",
                dataset.train.len(),
                dataset.val.len(),
                dataset.test.len()
            );
        }
        Command::Smiles {
            data_dir,
            split,
            kekulize,
            limit,
        } => {
            let config = DatasetConfig::new(data_dir);
            let (atom_dict, bond_dict) = load_dictionaries(&config)?;
            let records = load_records(&config, split)?;
            let selected = records.iter().take(limit.unwrap_or(usize::MAX));
            let smiles = records_to_smiles(selected, &atom_dict, &bond_dict, kekulize)
                .map_err(|(i, err)| format!("record {i} of {split}: {err}"))?;
            for s in smiles {
                println!("{s}");
            }
        }
        Command::Dict { data_dir, kind } => {
            let config = DatasetConfig::new(data_dir);
            let (atom_dict, bond_dict) = load_dictionaries(&config)?;
            match kind {
                DictKind::Atom => print!("{atom_dict}"),
                DictKind::Bond => print!("{bond_dict}"),
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
