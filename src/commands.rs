use crate::backup::{
    perform_backup, restore_backup, BackupContext, BackupRequest, Outcome, SlotCatalog, SlotInfo,
};
use crate::config::AppConfig;
use crate::frontend::ConsoleFrontend;
use crate::fs::StdFilesystem;
use crate::mount::DirectoryMounter;
use crate::save_paths::{parse_title_id, parse_user_id, Title};
use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// Backs up and restores game save data.
#[derive(Parser, Debug)]
#[command(name = "savesync", version)]
pub struct Cli {
    /// Configuration file to use instead of `config.json` next to the executable
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Lists the backup slots of a title
    List {
        #[command(flatten)]
        title: TitleArgs,

        /// Print the slots as JSON
        #[arg(long)]
        json: bool,
    },
    /// Backs up a title's save data into a new or existing slot
    Backup {
        #[command(flatten)]
        title: TitleArgs,

        /// Slot to overwrite, as numbered by `list`; 0 creates a new slot
        #[arg(long, default_value_t = 0)]
        slot: usize,

        /// Name for a new slot instead of asking for one
        #[arg(long)]
        name: Option<String>,

        /// Skip confirmation and use the suggested name
        #[arg(long)]
        batch: bool,

        /// Answer yes to the confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Restores a backup slot over a title's save data
    Restore {
        #[command(flatten)]
        title: TitleArgs,

        /// Slot to restore, as numbered by `list`
        #[arg(long)]
        slot: usize,

        /// Answer yes to the confirmation
        #[arg(long)]
        yes: bool,
    },
}

/// Identifies the title and the save data owner.
#[derive(Args, Debug, Clone)]
pub struct TitleArgs {
    /// Title id in hex
    #[arg(value_parser = parse_title_id)]
    pub title_id: u64,

    /// Owning user id in hex
    #[arg(long, value_parser = parse_user_id, conflicts_with = "system")]
    pub user: Option<u128>,

    /// Use the title's system save instead of a user's save
    #[arg(long)]
    pub system: bool,

    /// Title name, used for the backup folder name
    #[arg(long)]
    pub title_name: Option<String>,

    /// User name, used for suggested slot names
    #[arg(long, default_value = "user")]
    pub user_name: String,
}

impl TitleArgs {
    /// Builds the title, requiring an owner unless it is a system save.
    pub fn to_title(&self) -> Result<Title, String> {
        let user_id = match (self.user, self.system) {
            (Some(user), false) => user,
            (None, true) => 0,
            (None, false) => return Err("either --user or --system is required".to_string()),
            (Some(_), true) => return Err("--user and --system cannot be combined".to_string()),
        };
        Ok(Title {
            id: self.title_id,
            user_id,
            name: self.title_name.clone().unwrap_or_default(),
            user_name: self.user_name.clone(),
            system_save: self.system,
        })
    }
}

/// Runs the parsed command against the configured directories.
pub fn dispatch(command: &Commands, config: &AppConfig) -> Result<ExitCode, String> {
    match command {
        Commands::List { title, json } => list_command(&title.to_title()?, config, *json),
        Commands::Backup {
            title,
            slot,
            name,
            batch,
            yes,
        } => {
            let request = BackupRequest {
                cell: *slot,
                batch: *batch,
            };
            backup_command(&title.to_title()?, config, request, name.clone(), *yes)
        }
        Commands::Restore { title, slot, yes } => {
            restore_command(&title.to_title()?, config, *slot, *yes)
        }
    }
}

fn load_catalog(title: &Title, config: &AppConfig) -> Result<SlotCatalog, String> {
    SlotCatalog::load(&StdFilesystem, title, &config.backup_root).map_err(|e| {
        log::error!("Failed to list backups: {}", e);
        format!("Failed to list backups: {}", e)
    })
}

fn list_command(title: &Title, config: &AppConfig, json: bool) -> Result<ExitCode, String> {
    let catalog = load_catalog(title, config)?;
    let mut out = io::stdout().lock();
    print_slots(&mut out, &catalog.slots, json).map_err(|e| format!("Failed to write output: {}", e))?;
    Ok(ExitCode::SUCCESS)
}

fn backup_command(
    title: &Title,
    config: &AppConfig,
    request: BackupRequest,
    name: Option<String>,
    yes: bool,
) -> Result<ExitCode, String> {
    let mut catalog = load_catalog(title, config)?;
    let mut mounter = DirectoryMounter::new(&config.save_root);
    let mut frontend = ConsoleFrontend::stdio(yes, name);
    let mut ctx = BackupContext {
        fs: &StdFilesystem,
        mounter: &mut mounter,
        frontend: &mut frontend,
        options: config.sync_options(),
    };
    Ok(exit_code(&perform_backup(&mut ctx, title, &mut catalog, &request)))
}

fn restore_command(
    title: &Title,
    config: &AppConfig,
    cell: usize,
    yes: bool,
) -> Result<ExitCode, String> {
    let catalog = load_catalog(title, config)?;
    let mut mounter = DirectoryMounter::new(&config.save_root);
    let mut frontend = ConsoleFrontend::stdio(yes, None);
    let mut ctx = BackupContext {
        fs: &StdFilesystem,
        mounter: &mut mounter,
        frontend: &mut frontend,
        options: config.sync_options(),
    };
    Ok(exit_code(&restore_backup(&mut ctx, title, &catalog, cell)))
}

fn exit_code(outcome: &Outcome) -> ExitCode {
    match outcome {
        Outcome::Completed(_) => ExitCode::SUCCESS,
        Outcome::Cancelled => {
            log::info!("Operation cancelled");
            ExitCode::SUCCESS
        }
        Outcome::Failed(_) => ExitCode::FAILURE,
    }
}

/// Writes slots numbered by menu cell, or as a JSON array.
fn print_slots<W: Write>(out: &mut W, slots: &[SlotInfo], json: bool) -> io::Result<()> {
    if json {
        let text = serde_json::to_string_pretty(slots).map_err(io::Error::other)?;
        return writeln!(out, "{}", text);
    }
    if slots.is_empty() {
        return writeln!(out, "No backups found.");
    }
    for (index, slot) in slots.iter().enumerate() {
        match &slot.modified {
            Some(modified) => writeln!(out, "{:>3}  {}  ({})", index + 1, slot.name, modified)?,
            None => writeln!(out, "{:>3}  {}", index + 1, slot.name)?,
        }
    }
    Ok(())
}
