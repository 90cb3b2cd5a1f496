use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use env_logger::Env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use pw_input_generator::{
    convert_with_profile, enumerate_sorted, load_structure, prompt, writer, RelaxProfile,
    SpeciesResolver, StructureDescriptor,
};

#[derive(Parser)]
#[command(author, version, about = "Quantum ESPRESSO relax input generator")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Writes a pw.x relax input with a block of atoms held fixed.
    Convert {
        /// Structure file (CIF or POSCAR). Asked for when omitted.
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Destination of the pw.x input. Asked for when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// First height-sorted row to fix (1-based).
        #[arg(long, requires = "fix_to")]
        fix_from: Option<i64>,

        /// Last height-sorted row to fix (1-based, inclusive).
        #[arg(long, requires = "fix_from")]
        fix_to: Option<i64>,

        /// Fix nothing and skip the range question.
        #[arg(long, conflicts_with_all = ["fix_from", "fix_to"])]
        no_fix: bool,

        /// JSON file overriding the calculation parameters.
        #[arg(long)]
        profile: Option<PathBuf>,
    },

    /// Prints the atoms sorted by height, numbered as `convert` expects.
    List {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Prints the ATOMIC_SPECIES table.
    Species {
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn read_structure(path: &Path) -> Result<StructureDescriptor> {
    println!("Reading structure from {:?}...", path);
    let structure = load_structure(path).with_context(|| format!("Failed to read {:?}", path))?;
    let (a, b, c, alpha, beta, gamma) = structure.lattice.to_parameters();
    println!(
        "-> Loaded {} atoms. Cell: {:.4} {:.4} {:.4} Å, {:.2} {:.2} {:.2}°",
        structure.nat(),
        a, b, c, alpha, beta, gamma
    );
    Ok(structure)
}

fn print_listing(structure: &StructureDescriptor) {
    println!("Atoms sorted by height (third fractional coordinate):");
    for line in enumerate_sorted(structure) {
        println!("{}", line);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    let start_time = Instant::now();
    let stdin = io::stdin();
    let mut input_stream = stdin.lock();
    let mut out = io::stdout();

    match cli.command {
        Commands::Convert {
            input, output, fix_from, fix_to, no_fix, profile,
        } => {
            println!("--- pw.x Relax Input Generator ---");

            let profile = match profile {
                Some(path) => RelaxProfile::from_json_file(&path)
                    .with_context(|| format!("Failed to load profile {:?}", path))?,
                None => RelaxProfile::default(),
            };

            // 1. Parsing
            let input = match input {
                Some(p) => p,
                None => prompt::ask_path(&mut input_stream, &mut out, "Structure file path: ")?,
            };
            let structure = read_structure(&input)?;

            // 2. Range selection
            let range = match (fix_from, fix_to) {
                (Some(from), Some(to)) => Some((from, to)),
                _ if no_fix => None,
                _ => {
                    print_listing(&structure);
                    Some(prompt::ask_range(&mut input_stream, &mut out)?)
                }
            };

            // 3. Conversion
            let conversion = convert_with_profile(&structure, range, &profile)
                .with_context(|| format!("Cannot build the input for {:?}", input))?;

            if let Some(err) = &conversion.range_error {
                println!("Invalid row range ({}). No atoms were fixed.", err);
            }
            println!(
                "-> nat = {}, ntyp = {}, fixed atoms = {}",
                conversion.nat, conversion.ntyp, conversion.constrained
            );

            // 4. Output
            let output = match output {
                Some(p) => p,
                None => prompt::ask_path(&mut input_stream, &mut out, "Output file path: ")?,
            };
            println!("Writing output to {:?}...", output);
            writer::write_input(&output, &conversion.text)?;
        }

        Commands::List { input } => {
            let structure = read_structure(&input)?;
            print_listing(&structure);
        }

        Commands::Species { input } => {
            let structure = read_structure(&input)?;
            let species = SpeciesResolver::from_atoms(&structure.atoms)?;
            for s in species.iter() {
                println!("{} {:.3} {}", s.symbol, s.mass, s.pseudopotential());
            }
        }
    }

    out.flush()?;
    println!("Done in {:.2?}", start_time.elapsed());
    Ok(())
}
