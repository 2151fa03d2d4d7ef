mod cmd_entry;
mod cmd_init;
mod cmd_project;
mod cmd_serve;
mod cmd_summary;
mod cmd_transfer;
mod workspace;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "forms", version, about = "Project journal with cached summaries")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Initialize a new .forms/ workspace
    Init,
    /// Manage projects
    Project {
        #[command(subcommand)]
        cmd: ProjectCmd,
    },
    /// Manage dated reflections
    Entry {
        #[command(subcommand)]
        cmd: EntryCmd,
    },
    /// Show, pre-generate, or clear project summaries
    Summary {
        #[command(subcommand)]
        cmd: SummaryCmd,
    },
    /// Write every project, entry, image, and summary to a JSON file
    Export {
        /// Output file (default: stdout)
        file: Option<PathBuf>,
    },
    /// Replace the journal with the contents of an export file
    Import {
        /// File written by `forms export`
        file: PathBuf,
        /// Overwrite a journal that already has projects
        #[arg(long)]
        force: bool,
    },
    /// Run the summary relay server
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Port (defaults to $PORT, then 3001)
        #[arg(long)]
        port: Option<u16>,
        /// Rate-limit by X-Forwarded-For (only behind a reverse proxy)
        #[arg(long)]
        trust_proxy: bool,
    },
}

#[derive(Subcommand)]
enum ProjectCmd {
    /// Create a project
    Add {
        /// Project name
        name: String,
    },
    /// List projects with entry counts and summary state
    List {
        /// Include archived projects
        #[arg(long)]
        all: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rename a project
    Rename {
        /// Project id or name
        project: String,
        /// New name
        name: String,
    },
    /// Hide a project from `project list`
    Archive {
        /// Project id or name
        project: String,
    },
    /// Bring an archived project back
    Unarchive {
        /// Project id or name
        project: String,
    },
    /// Delete a project with its entries, images, and summary
    Rm {
        /// Project id or name
        project: String,
    },
}

#[derive(Subcommand)]
enum EntryCmd {
    /// Write a project's reflection for a day (replaces that day's entry)
    Add {
        /// Project id or name
        project: String,
        /// Reflection text
        reflection: String,
        /// Entry date, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Regenerate the project summary afterwards
        #[arg(long)]
        summarize: bool,
    },
    /// Replace an entry's reflection
    Edit {
        /// Entry id
        id: String,
        /// New reflection text
        reflection: String,
        /// New date, YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
        /// Regenerate the project summary afterwards
        #[arg(long)]
        summarize: bool,
    },
    /// Delete an entry and its images
    Rm {
        /// Entry id
        id: String,
    },
    /// Attach an image (JPEG, PNG, WebP, or GIF, under 5MB)
    Attach {
        /// Entry id
        id: String,
        /// Image file
        file: PathBuf,
    },
    /// List an entry's images
    Media {
        /// Entry id
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove an attached image
    Detach {
        /// Media id
        media_id: String,
    },
    /// List a project's entries in date order
    List {
        /// Project id or name
        project: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum SummaryCmd {
    /// Print a project's summary, generating it when missing or stale
    Show {
        /// Project id or name
        project: String,
        /// Only print a cached summary; never call the relay
        #[arg(long)]
        cached: bool,
    },
    /// Generate summaries for every project that needs one
    Warm,
    /// Show cache state per project
    Status {
        /// Project id or name (default: all projects)
        project: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete cached summaries
    Clear {
        /// Project id or name
        project: Option<String>,
        /// Clear every project's summary
        #[arg(long, conflicts_with = "project")]
        all: bool,
    },
}

fn init_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(match cli.cmd {
        Command::Serve { .. } => "info",
        _ => "warn",
    });
    let cwd = std::env::current_dir()?;

    match cli.cmd {
        Command::Init => cmd_init::execute(&cwd),
        Command::Project { cmd } => match cmd {
            ProjectCmd::Add { name } => cmd_project::add(&cwd, &name),
            ProjectCmd::List { all, json } => cmd_project::list(&cwd, all, json),
            ProjectCmd::Rename { project, name } => cmd_project::rename(&cwd, &project, &name),
            ProjectCmd::Archive { project } => cmd_project::set_active(&cwd, &project, false),
            ProjectCmd::Unarchive { project } => cmd_project::set_active(&cwd, &project, true),
            ProjectCmd::Rm { project } => cmd_project::rm(&cwd, &project),
        },
        Command::Entry { cmd } => match cmd {
            EntryCmd::Add {
                project,
                reflection,
                date,
                summarize,
            } => cmd_entry::add(&cwd, &project, &reflection, date.as_deref(), summarize),
            EntryCmd::Edit {
                id,
                reflection,
                date,
                summarize,
            } => cmd_entry::edit(&cwd, &id, &reflection, date.as_deref(), summarize),
            EntryCmd::Rm { id } => cmd_entry::rm(&cwd, &id),
            EntryCmd::List { project, json } => cmd_entry::list(&cwd, &project, json),
            EntryCmd::Attach { id, file } => cmd_entry::attach(&cwd, &id, &file),
            EntryCmd::Media { id, json } => cmd_entry::media(&cwd, &id, json),
            EntryCmd::Detach { media_id } => cmd_entry::detach(&cwd, &media_id),
        },
        Command::Summary { cmd } => match cmd {
            SummaryCmd::Show { project, cached } => cmd_summary::show(&cwd, &project, cached),
            SummaryCmd::Warm => cmd_summary::warm(&cwd),
            SummaryCmd::Status { project, json } => {
                cmd_summary::status(&cwd, project.as_deref(), json)
            }
            SummaryCmd::Clear { project, all } => cmd_summary::clear(&cwd, project.as_deref(), all),
        },
        Command::Export { file } => cmd_transfer::export(&cwd, file.as_deref()),
        Command::Import { file, force } => cmd_transfer::import(&cwd, &file, force),
        Command::Serve {
            bind,
            port,
            trust_proxy,
        } => cmd_serve::execute(&bind, port, trust_proxy),
    }
}
