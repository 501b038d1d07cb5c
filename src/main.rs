use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use rand::seq::SliceRandom;
use tracing_subscriber::EnvFilter;

mod assign;
mod config;
mod error;
mod models;
mod report;
mod roster;
mod scoring;
mod session;
mod shuffle;

use config::AssignmentConfig;
use models::RoleRequirement;
use roster::Roster;
use session::Session;

#[derive(Parser)]
#[command(name = "team-matcher")]
#[command(about = "Match students to project teams and roles from a survey roster", long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Markdown,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List roster columns, marking the numeric ones usable as preferences
    Headers {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Convert a roster into JSON records
    Convert {
        #[arg(long)]
        csv: PathBuf,
        /// Shuffle the record order before printing
        #[arg(long = "shuffle")]
        shuffled: bool,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Assign students to teams and roles
    #[command(group(
        ArgGroup::new("role_source")
            .args(["role", "roles_file"])
            .required(true)
            .multiple(true)
    ))]
    Match {
        #[arg(long)]
        csv: PathBuf,
        /// Roster column used as a preference signal; repeat in tie-break order
        #[arg(long = "property", required = true)]
        properties: Vec<String>,
        /// Role requirement as ROLE=COUNT; repeat for each role
        #[arg(long)]
        role: Vec<RoleRequirement>,
        /// JSON array of {"role": ..., "count": ...}
        #[arg(long)]
        roles_file: Option<PathBuf>,
        /// Shuffle the roster before matching
        #[arg(long)]
        reshuffle: bool,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value = "Name")]
        name_field: String,
        #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose {
            "team_matcher=debug"
        } else {
            "team_matcher=info"
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    match cli.command {
        Commands::Headers { csv } => {
            let roster = Roster::from_path(&csv)?;
            let numeric = roster.numeric_headers();
            println!("Columns in {}:", csv.display());
            for header in &roster.headers {
                if numeric.contains(&header.as_str()) {
                    println!("- {header} (numeric)");
                } else {
                    println!("- {header}");
                }
            }
        }
        Commands::Convert {
            csv,
            shuffled,
            seed,
            out,
        } => {
            let mut roster = Roster::from_path(&csv)?;
            if shuffled {
                let seed = config::resolve_seed(seed)?;
                roster.students.shuffle(&mut shuffle::rng_for(seed));
            }
            let json = report::records_json(&roster.students)
                .context("failed to serialize roster records")?;
            emit(&json, out.as_deref())?;
        }
        Commands::Match {
            csv,
            properties,
            role,
            roles_file,
            reshuffle,
            seed,
            name_field,
            format,
            out,
        } => {
            let mut roles = role;
            if let Some(path) = roles_file {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read roles file {}", path.display()))?;
                roles.extend(config::roles_from_json(&text)?);
            }

            let selection = AssignmentConfig::new(properties, roles)?;
            let roster = Roster::from_path(&csv)?;
            let mut session = Session::new(roster, selection);
            tracing::info!(
                students = session.roster().students.len(),
                team_size = session.config().team_size(),
                roles = session.config().roles.len(),
                "matching configuration ready"
            );

            let assignment = if reshuffle {
                let seed = config::resolve_seed(seed)?;
                session.reshuffle(&mut shuffle::rng_for(seed))?
            } else {
                session.run()?
            };

            let rendered = match format {
                OutputFormat::Markdown => report::build_report(
                    &assignment,
                    &csv.display().to_string(),
                    Utc::now().date_naive(),
                    &name_field,
                ),
                OutputFormat::Json => report::assignment_json(&assignment)
                    .context("failed to serialize team assignment")?,
            };
            emit(&rendered, out.as_deref())?;
        }
    }

    Ok(())
}

fn emit(content: &str, out: Option<&Path>) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Written to {}.", path.display());
        }
        None => println!("{content}"),
    }
    Ok(())
}
