//! scdb - command-line front end for the superconductor literature catalog
//!
//! Loads element-combination aggregates, exports citations and drives the
//! admin review workflow against a catalog backend.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scdb_client::config::ClientConfig;
use scdb_client::services::{AdminFilters, LoadOutcome, LoadRequest, PaperFilters, ViewMode};
use scdb_client::ClientContext;
use scdb_common::citation;
use scdb_common::config::{
    default_config_path, load_toml_config, write_toml_config, LoggingConfig, RootFolderInitializer,
    RootFolderResolver, TomlConfig,
};
use scdb_common::db::init_database_pool;
use scdb_common::models::{ArticleType, ReviewStatus, SessionUser, SuperconductorType};

/// Command-line arguments for scdb
#[derive(Parser, Debug)]
#[command(name = "scdb")]
#[command(about = "Superconductor literature catalog client")]
#[command(version)]
struct Cli {
    /// Folder holding the local session database
    #[arg(long, global = true)]
    root_folder: Option<PathBuf>,

    /// Catalog backend base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// TOML config file
    #[arg(long, global = true, env = "SCDB_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Inspect or change the cached login session
    #[command(subcommand)]
    Session(SessionCommand),

    /// Aggregate papers for a selection of elements
    Load(SelectionArgs),

    /// Export the papers of a selection as citations
    Export {
        #[command(flatten)]
        selection: SelectionArgs,

        #[arg(long, value_enum, default_value = "ris")]
        format: ExportFormat,
    },

    /// Admin review and edit workflow
    #[command(subcommand)]
    Admin(AdminCommand),

    /// Show or write the TOML config file
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
enum SessionCommand {
    Show,
    /// Store a session issued by the backend login
    Save {
        #[arg(long)]
        token: Option<String>,
        /// User JSON as returned at login
        #[arg(long)]
        user: Option<String>,
    },
    Clear,
}

#[derive(Args, Debug)]
struct SelectionArgs {
    /// Element symbols, e.g. `Fe Se`
    #[arg(required = true)]
    elements: Vec<String>,

    /// only | combination | contains (unknown values mean `only`)
    #[arg(long, default_value = "only")]
    mode: String,

    #[arg(long)]
    keyword: Option<String>,

    #[arg(long)]
    year_min: Option<i32>,

    #[arg(long)]
    year_max: Option<i32>,

    #[arg(long, value_parser = parse_review_status)]
    review_status: Option<ReviewStatus>,
}

impl SelectionArgs {
    fn to_request(&self) -> LoadRequest {
        LoadRequest::new(self.elements.iter().cloned(), ViewMode::parse_lenient(&self.mode))
            .with_filters(PaperFilters {
                keyword: self.keyword.clone(),
                year_min: self.year_min,
                year_max: self.year_max,
                review_status: self.review_status,
            })
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExportFormat {
    Ris,
    Bibtex,
    Aps,
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
    /// List papers, newest first
    List {
        #[arg(long, default_value_t = 1)]
        page: u64,
        #[arg(long, value_parser = parse_review_status)]
        review_status: Option<ReviewStatus>,
        #[arg(long, value_parser = parse_article_type)]
        article_type: Option<ArticleType>,
        #[arg(long, value_parser = parse_superconductor_type)]
        superconductor_type: Option<SuperconductorType>,
        #[arg(long)]
        year_min: Option<i32>,
        #[arg(long)]
        year_max: Option<i32>,
        #[arg(long)]
        keyword: Option<String>,
    },
    /// Set the review status of one paper
    Review {
        paper_id: i64,
        #[arg(value_parser = parse_review_status)]
        status: ReviewStatus,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Approve several papers
    BatchReview { paper_ids: Vec<i64> },
    /// Show or hide papers in the chart (super-admin)
    Chart {
        paper_ids: Vec<i64>,
        #[arg(long)]
        hide: bool,
    },
    /// Delete papers (super-admin)
    Delete { paper_ids: Vec<i64> },
    /// List a paper's images
    Images { paper_id: i64 },
    /// Delete one image; the last image of a paper is kept
    DeleteImage { paper_id: i64, image_id: i64 },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    Show,
    /// Write the effective settings to the config file
    Init,
}

fn parse_review_status(raw: &str) -> std::result::Result<ReviewStatus, String> {
    ReviewStatus::parse_strict(raw).ok_or_else(|| {
        let allowed: Vec<&str> = ReviewStatus::ALL.iter().map(|s| s.as_str()).collect();
        format!("expected one of: {}", allowed.join(", "))
    })
}

fn parse_article_type(raw: &str) -> std::result::Result<ArticleType, String> {
    Ok(ArticleType::normalize(raw))
}

fn parse_superconductor_type(raw: &str) -> std::result::Result<SuperconductorType, String> {
    Ok(SuperconductorType::normalize(raw))
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    let file_layer = match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Arc::new(file)),
            )
        }
        None => None,
    };
    let stderr_layer = logging
        .file
        .is_none()
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(default_config_path);
    let toml_config = config_path
        .as_deref()
        .map(load_toml_config)
        .unwrap_or_default();

    init_tracing(&toml_config.logging)?;

    info!("Starting scdb v{}", env!("CARGO_PKG_VERSION"));

    let client_config = ClientConfig::resolve(cli.api_url.as_deref(), &toml_config);
    let root_folder = RootFolderResolver::new()
        .with_cli_arg(cli.root_folder.clone())
        .with_toml(&toml_config)
        .resolve();

    if let Command::Config(cmd) = &cli.command {
        return run_config(cmd, config_path, &toml_config, &client_config, root_folder);
    }

    let initializer = RootFolderInitializer::new(root_folder);
    initializer.ensure_directory_exists()?;
    let db_path = initializer.database_path();
    info!(path = %db_path.display(), "Local database");

    let pool = init_database_pool(&db_path)
        .await
        .context("Failed to open local database")?;
    let ctx = ClientContext::connect(&client_config, pool)?;

    match cli.command {
        Command::Session(cmd) => run_session(&ctx, cmd).await,
        Command::Load(selection) => run_load(&ctx, &selection).await,
        Command::Export { selection, format } => run_export(&ctx, &selection, format).await,
        Command::Admin(cmd) => run_admin(&ctx, cmd).await,
        Command::Config(_) => Ok(()),
    }
}

fn run_config(
    cmd: &ConfigCommand,
    path: Option<PathBuf>,
    toml_config: &TomlConfig,
    client_config: &ClientConfig,
    root_folder: PathBuf,
) -> Result<()> {
    let effective = TomlConfig {
        root_folder: Some(root_folder),
        api_base_url: Some(client_config.api_base_url.clone()),
        request_timeout_secs: Some(client_config.request_timeout.as_secs()),
        admin_page_size: Some(client_config.admin_page_size),
        logging: toml_config.logging.clone(),
    };

    match cmd {
        ConfigCommand::Show => {
            if let Some(path) = &path {
                println!("# {}", path.display());
            }
            print!("{}", toml::to_string_pretty(&effective)?);
        }
        ConfigCommand::Init => {
            let path = path.context("No config path available on this platform")?;
            write_toml_config(&effective, &path)?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}

async fn run_session(ctx: &ClientContext, cmd: SessionCommand) -> Result<()> {
    match cmd {
        SessionCommand::Show => match ctx.session.get().await {
            Some(session) => {
                let role = if session.is_super_admin() {
                    "super-admin"
                } else if session.is_admin() {
                    "admin"
                } else {
                    "user"
                };
                println!(
                    "Logged in as {} (id {}, {})",
                    session.user.real_name, session.user.id, role
                );
            }
            None => println!("Not logged in"),
        },
        SessionCommand::Save { token, user } => {
            let user: Option<SessionUser> = user
                .as_deref()
                .map(serde_json::from_str)
                .transpose()
                .context("User JSON is not a valid login user")?;
            let session = ctx.session.save(token.as_deref(), user.as_ref()).await?;
            println!("Session saved for {}", session.user.real_name);
        }
        SessionCommand::Clear => {
            ctx.session.clear().await?;
            println!("Session cleared");
        }
    }
    Ok(())
}

async fn run_load(ctx: &ClientContext, selection: &SelectionArgs) -> Result<()> {
    let outcome = ctx.orchestrator.load(&selection.to_request()).await?;
    let snapshot = match outcome {
        LoadOutcome::Completed(snapshot) => snapshot,
        LoadOutcome::Superseded { generation } => {
            println!("Load {} was superseded", generation);
            return Ok(());
        }
    };

    if snapshot.sections.is_empty() {
        println!("No combinations found");
        return Ok(());
    }

    for section in &snapshot.sections {
        match section.error() {
            Some(message) => println!("{}: FAILED ({})", section.combination, message),
            None => {
                println!("{}: {} paper(s)", section.combination, section.records().len());
                for record in section.records() {
                    let tc = record
                        .max_tc()
                        .map(|tc| format!("{:.1} K", tc))
                        .unwrap_or_else(|| "-".to_string());
                    println!(
                        "  [{}] {} ({}) Tc max {} [{}]",
                        record.id,
                        record.title,
                        record.year.map(|y| y.to_string()).unwrap_or_default(),
                        tc,
                        record.superconductor_type
                    );
                    if let Some(url) = record.doi_url() {
                        println!("      {}", url);
                    }
                }
            }
        }
    }
    println!("Total: {}", snapshot.total_count);

    Ok(())
}

async fn run_export(
    ctx: &ClientContext,
    selection: &SelectionArgs,
    format: ExportFormat,
) -> Result<()> {
    let snapshot = match ctx.orchestrator.load(&selection.to_request()).await? {
        LoadOutcome::Completed(snapshot) => snapshot.into_complete()?,
        LoadOutcome::Superseded { .. } => return Ok(()),
    };

    let ids = snapshot.record_ids();
    let output = match format {
        ExportFormat::Ris => ctx.records.export_ris(&ids).await,
        ExportFormat::Bibtex => ctx
            .records
            .get_many(&ids)
            .await
            .iter()
            .map(citation::to_bibtex)
            .collect::<Vec<_>>()
            .join("\n\n"),
        ExportFormat::Aps => ctx
            .records
            .get_many(&ids)
            .await
            .iter()
            .map(citation::to_aps)
            .collect::<Vec<_>>()
            .join("\n"),
    };

    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}

async fn run_admin(ctx: &ClientContext, cmd: AdminCommand) -> Result<()> {
    match cmd {
        AdminCommand::List {
            page,
            review_status,
            article_type,
            superconductor_type,
            year_min,
            year_max,
            keyword,
        } => {
            let filters = AdminFilters {
                review_status,
                article_type,
                superconductor_type,
                year_min,
                year_max,
                keyword,
            };
            let list = ctx.admin.list(&filters, page).await?;
            for paper in &list.papers {
                println!(
                    "[{}] {} | {} | {} | {} image(s) | {}",
                    paper.id,
                    paper.review_status,
                    paper.element_symbols.as_deref().unwrap_or("-"),
                    paper.doi,
                    paper.image_count,
                    paper.title
                );
            }
            let window: Vec<String> = list
                .pagination
                .page_window()
                .into_iter()
                .map(|link| match link {
                    scdb_client::pagination::PageLink::Page(p) if p == list.pagination.page => {
                        format!("[{}]", p)
                    }
                    scdb_client::pagination::PageLink::Page(p) => p.to_string(),
                    scdb_client::pagination::PageLink::Ellipsis => "...".to_string(),
                })
                .collect();
            println!(
                "Page {}/{} ({} total) {}",
                list.pagination.page,
                list.pagination.total_pages,
                list.total,
                window.join(" ")
            );
        }
        AdminCommand::Review {
            paper_id,
            status,
            comment,
        } => {
            ctx.admin.review(paper_id, status, comment).await?;
            println!("Paper {} set to {}", paper_id, status);
        }
        AdminCommand::BatchReview { paper_ids } => {
            let ack = ctx.admin.batch_review(&paper_ids).await?;
            println!("Approved {} paper(s)", ack.affected.unwrap_or(0));
        }
        AdminCommand::Chart { paper_ids, hide } => {
            let ack = ctx.admin.batch_chart_visibility(&paper_ids, !hide).await?;
            println!(
                "{} {} paper(s) in chart",
                if hide { "Hid" } else { "Showed" },
                ack.affected.unwrap_or(0)
            );
        }
        AdminCommand::Delete { paper_ids } => {
            let ack = match paper_ids.as_slice() {
                [single] => ctx.admin.delete(*single).await?,
                _ => ctx.admin.batch_delete(&paper_ids).await?,
            };
            println!(
                "{}",
                ack.message
                    .unwrap_or_else(|| format!("Deleted {} paper(s)", paper_ids.len()))
            );
        }
        AdminCommand::Images { paper_id } => {
            let images = ctx.admin.list_images(paper_id).await?;
            for image in &images {
                println!(
                    "#{} image {} ({} bytes)",
                    image.order,
                    image.id,
                    image
                        .file_size
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "?".to_string())
                );
            }
            println!("{} image(s)", images.len());
        }
        AdminCommand::DeleteImage { paper_id, image_id } => {
            ctx.admin.delete_image(paper_id, image_id).await?;
            println!("Image {} deleted from paper {}", image_id, paper_id);
        }
    }
    Ok(())
}
