use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context as AnyhowContext, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use partner_universities_client::{
    ModuleInput, PageParams, PartnerUniversitiesClient, SearchParams, UniversityInput,
};
use serde::Serialize;

#[derive(Parser)]
#[command(
    name = "partner",
    about = "Command line interface for the partner universities API",
    version,
    arg_required_else_help = true
)]
struct Cli {
    /// Base URL of the API server.
    #[arg(
        long,
        global = true,
        env = "PARTNER_API_URL",
        default_value = "http://localhost:8080"
    )]
    url: String,

    /// Pretty-print JSON output.
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check server and store health.
    Health,

    /// Print the link relations advertised by the entry point.
    Links,

    /// Partner university commands.
    #[command(alias = "u")]
    Universities {
        #[command(subcommand)]
        command: UniversityCommands,
    },

    /// Module commands.
    #[command(alias = "m")]
    Modules {
        #[command(subcommand)]
        command: ModuleCommands,
    },

    /// Print CLI version.
    Version,
}

#[derive(Args)]
struct PageArgs {
    /// Zero-based page number.
    #[arg(long)]
    page: Option<u32>,
    /// Page size.
    #[arg(long)]
    size: Option<u32>,
    /// Sort as `field` or `field,asc|desc`.
    #[arg(long)]
    sort: Option<String>,
    /// Follow `next` links and print every page.
    #[arg(long, action = ArgAction::SetTrue)]
    all: bool,
}

impl PageArgs {
    fn params(&self) -> PageParams {
        PageParams {
            page: self.page,
            size: self.size,
            sort: self.sort.clone(),
        }
    }
}

#[derive(Subcommand)]
enum UniversityCommands {
    /// List universities page by page.
    List {
        #[command(flatten)]
        paging: PageArgs,
    },
    /// Search by case-sensitive substrings of name, country and department.
    Search {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        size: Option<u32>,
        /// Property to sort by (default: name).
        #[arg(long)]
        sort_by: Option<String>,
        /// `asc` sorts ascending, anything else descending.
        #[arg(long)]
        direction: Option<String>,
    },
    /// Fetch one university with its modules.
    Get { id: i64 },
    /// Create a university from a JSON file (or "-" for stdin).
    Create { file: PathBuf },
    /// Replace a university from a JSON file (or "-" for stdin).
    Update { id: i64, file: PathBuf },
    /// Delete a university and all its modules.
    Delete { id: i64 },
    /// List the modules owned by a university.
    Modules { id: i64 },
}

#[derive(Args)]
struct ModuleFields {
    #[arg(long)]
    name: String,
    #[arg(long)]
    semester: i32,
    #[arg(long)]
    credit_points: i32,
    /// Id of the owning university.
    #[arg(long)]
    university: i64,
}

impl ModuleFields {
    fn input(self) -> ModuleInput {
        ModuleInput::new(self.name, self.semester, self.credit_points, self.university)
    }
}

#[derive(Subcommand)]
enum ModuleCommands {
    /// List modules page by page.
    List {
        #[command(flatten)]
        paging: PageArgs,
    },
    /// Fetch one module.
    Get { id: i64 },
    /// Create a module under an existing university.
    Create {
        #[command(flatten)]
        fields: ModuleFields,
    },
    /// Replace a module; may move it to another university.
    Update {
        id: i64,
        #[command(flatten)]
        fields: ModuleFields,
    },
    /// Delete a module.
    Delete { id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let client = PartnerUniversitiesClient::new(&cli.url)
        .with_context(|| format!("Invalid server URL {}", cli.url))?;
    let pretty = cli.pretty;

    match cli.command {
        Commands::Version => {}
        Commands::Health => print_json(&client.health().await?, pretty)?,
        Commands::Links => print_json(&client.discover().await?, pretty)?,
        Commands::Universities { command } => {
            run_university_command(&client, command, pretty).await?
        }
        Commands::Modules { command } => run_module_command(&client, command, pretty).await?,
    }

    Ok(())
}

async fn run_university_command(
    client: &PartnerUniversitiesClient,
    command: UniversityCommands,
    pretty: bool,
) -> Result<()> {
    match command {
        UniversityCommands::List { paging } => {
            let mut page = client.list_universities(&paging.params()).await?;
            print_json(&page, pretty)?;
            while paging.all {
                match client.next_page(&page, "universities").await? {
                    Some(next) => {
                        print_json(&next, pretty)?;
                        page = next;
                    }
                    None => break,
                }
            }
        }
        UniversityCommands::Search {
            name,
            country,
            department,
            page,
            size,
            sort_by,
            direction,
        } => {
            let params = SearchParams {
                name,
                country,
                department_name: department,
                page,
                size,
                sort_by,
                direction,
            };
            print_json(&client.search_universities(&params).await?, pretty)?;
        }
        UniversityCommands::Get { id } => print_json(&client.get_university(id).await?, pretty)?,
        UniversityCommands::Create { file } => {
            let input = read_university_input(&file)?;
            print_json(&client.create_university(&input).await?, pretty)?;
        }
        UniversityCommands::Update { id, file } => {
            let input = read_university_input(&file)?;
            print_json(&client.update_university(id, &input).await?, pretty)?;
        }
        UniversityCommands::Delete { id } => {
            client.delete_university(id).await?;
            eprintln!("Deleted university {id}");
        }
        UniversityCommands::Modules { id } => {
            print_json(&client.university_modules(id).await?, pretty)?
        }
    }
    Ok(())
}

async fn run_module_command(
    client: &PartnerUniversitiesClient,
    command: ModuleCommands,
    pretty: bool,
) -> Result<()> {
    match command {
        ModuleCommands::List { paging } => {
            let mut page = client.list_modules(&paging.params()).await?;
            print_json(&page, pretty)?;
            while paging.all {
                match client.next_page(&page, "modules").await? {
                    Some(next) => {
                        print_json(&next, pretty)?;
                        page = next;
                    }
                    None => break,
                }
            }
        }
        ModuleCommands::Get { id } => print_json(&client.get_module(id).await?, pretty)?,
        ModuleCommands::Create { fields } => {
            print_json(&client.create_module(&fields.input()).await?, pretty)?
        }
        ModuleCommands::Update { id, fields } => {
            print_json(&client.update_module(id, &fields.input()).await?, pretty)?
        }
        ModuleCommands::Delete { id } => {
            client.delete_module(id).await?;
            eprintln!("Deleted module {id}");
        }
    }
    Ok(())
}

fn read_university_input(path: &Path) -> Result<UniversityInput> {
    let raw = if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read university JSON from stdin")?;
        buffer
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read university JSON from {}", path.display()))?
    };
    serde_json::from_str(&raw).context("University JSON does not match the expected shape")
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    if pretty {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", serde_json::to_string(value)?);
    }
    Ok(())
}
