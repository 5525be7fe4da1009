//! Command-line front end for loanbook core.
//!
//! # Responsibility
//! - Map subcommands onto core use-cases and print JSON results.
//! - Map core `ErrorKind` values onto distinct process exit codes.

use clap::{Args, Parser, Subcommand, ValueEnum};
use loanbook_core::{
    init_logging, read_csv_records, AccountId, AccountService, AppConfig, BulkLoader, Credentials,
    ErrorKind, IngestProfile, RawRecord, ServiceError, ServiceResult, SqliteAccountRepository,
};
use serde_json::json;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "loanbook",
    version,
    about = "Account records and loan eligibility"
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "loanbook.toml")]
    config: PathBuf,

    /// SQLite database file (overrides config file)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Log level (overrides config file)
    #[arg(long)]
    log_level: Option<String>,

    /// Absolute log directory (overrides config file)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every account
    List,
    /// Show one account
    Show { id: AccountId },
    /// Add one account
    Add(AddArgs),
    /// Delete one account
    Delete { id: AccountId },
    /// Check loan eligibility with PAN/TAN verification
    Loans {
        id: AccountId,
        #[arg(long)]
        pan: Option<String>,
        #[arg(long)]
        tan: Option<String>,
    },
    /// List loans by stored PAN/TAN presence only (unverified)
    PresenceLoans { id: AccountId },
    /// Bulk load accounts from a headered CSV file
    Load {
        csv: PathBuf,
        /// Normalization profile (overrides config file)
        #[arg(long, value_enum)]
        profile: Option<ProfileArg>,
    },
}

#[derive(Args, Debug)]
struct AddArgs {
    #[arg(long)]
    id: AccountId,
    #[arg(long)]
    name: Option<String>,
    #[arg(long = "type")]
    account_type: String,
    #[arg(long)]
    balance: String,
    #[arg(long)]
    pan: Option<String>,
    #[arg(long)]
    tan: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ProfileArg {
    Service,
    Etl,
}

impl From<ProfileArg> for IngestProfile {
    fn from(value: ProfileArg) -> Self {
        match value {
            ProfileArg::Service => IngestProfile::Service,
            ProfileArg::Etl => IngestProfile::Etl,
        }
    }
}

/// Failure reported to the shell.
struct CliFailure {
    kind: Option<ErrorKind>,
    message: String,
}

impl CliFailure {
    fn classified(kind: ErrorKind, err: impl Display) -> Self {
        Self {
            kind: Some(kind),
            message: err.to_string(),
        }
    }

    fn setup(err: impl Display) -> Self {
        Self {
            kind: None,
            message: err.to_string(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            let kind = failure.kind.map_or("setup", ErrorKind::as_str);
            eprintln!("{}", json!({ "error": failure.message, "kind": kind }));
            ExitCode::from(exit_code(failure.kind))
        }
    }
}

fn run(cli: Cli) -> Result<(), CliFailure> {
    let mut config = AppConfig::load(&cli.config).map_err(CliFailure::setup)?;
    apply_overrides(&mut config, &cli);
    init_logging(&config.logging).map_err(CliFailure::setup)?;

    let repo = SqliteAccountRepository::new(config.store_config());
    match cli.command {
        Command::Load { csv, profile } => {
            let profile = profile.map_or(config.ingest.profile, IngestProfile::from);
            load_csv(repo, &csv, profile)
        }
        command => {
            let service = AccountService::open(repo).map_err(classify)?;
            run_account_command(&service, command).map_err(classify)
        }
    }
}

/// Command-line flags take precedence over config file values.
fn apply_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(db) = &cli.db {
        config.database.path = db.clone();
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(dir) = &cli.log_dir {
        config.logging.dir = Some(dir.clone());
    }
}

fn load_csv(
    repo: SqliteAccountRepository,
    csv: &Path,
    profile: IngestProfile,
) -> Result<(), CliFailure> {
    let records = read_csv_records(csv).map_err(|err| CliFailure::classified(err.kind(), &err))?;
    let loader = BulkLoader::new(repo, profile.normalize_options());
    let report = loader
        .load(&records)
        .map_err(|err| CliFailure::classified(err.kind(), &err))?;
    print_json(&report);
    Ok(())
}

fn run_account_command(
    service: &AccountService<SqliteAccountRepository>,
    command: Command,
) -> ServiceResult<()> {
    match command {
        Command::List => print_json(&service.list_accounts()?),
        Command::Show { id } => print_json(&service.get_account(id)?),
        Command::Add(args) => print_json(&service.add_account(&args.into_record())?),
        Command::Delete { id } => {
            service.delete_account(id)?;
            print_json(&json!({ "deleted": id }));
        }
        Command::Loans { id, pan, tan } => {
            let credentials = Credentials {
                pan_number: pan,
                tan_number: tan,
            };
            let loans = service.loan_eligibility(id, &credentials)?;
            print_json(&json!({ "account_id": id, "eligible_loans": loans }));
        }
        Command::PresenceLoans { id } => {
            let loans = service.presence_loan_eligibility(id)?;
            print_json(&json!({ "account_id": id, "eligible_loans": loans, "verified": false }));
        }
        // Routed to `load_csv` by `run`.
        Command::Load { .. } => {}
    }
    Ok(())
}

fn classify(err: ServiceError) -> CliFailure {
    CliFailure::classified(err.kind(), &err)
}

impl AddArgs {
    fn into_record(self) -> RawRecord {
        let mut raw = RawRecord::new()
            .with("account_id", self.id)
            .with("account_type", self.account_type)
            .with("balance", self.balance);
        if let Some(name) = self.name {
            raw.insert("account_name", name);
        }
        if let Some(pan) = self.pan {
            raw.insert("pan_number", pan);
        }
        if let Some(tan) = self.tan {
            raw.insert("tan_number", tan);
        }
        raw
    }
}

fn print_json(value: &impl serde::Serialize) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(err) => eprintln!("failed to render output: {err}"),
    }
}

fn exit_code(kind: Option<ErrorKind>) -> u8 {
    match kind {
        None => 1,
        Some(ErrorKind::Validation) => 2,
        Some(ErrorKind::EmptyBatch) => 3,
        Some(ErrorKind::DuplicateKey) => 4,
        Some(ErrorKind::NotFound) => 5,
        Some(ErrorKind::MissingCredential | ErrorKind::CredentialMismatch) => 6,
        Some(ErrorKind::InvalidAccountType) => 7,
        Some(ErrorKind::Source) => 8,
        Some(ErrorKind::Storage) => 10,
    }
}
