use clap::{ArgAction, Parser, Subcommand};
use folio::config::{self, SiteConfig};
use folio::fetch::HttpFetcher;
use folio::load::ContentStore;
use folio::query::{self, ContentFilters, PaginationOptions};
use folio::source::{ContentSource, LocalSource, RemoteSource};
use folio::{check, generate, output, verify};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Content engine and static site generator for a DevOps portfolio")]
#[command(long_about = "\
Content engine and static site generator for a DevOps portfolio

Projects and knowledge entries are JSON documents. They are validated on
load, filtered and paged in memory, and rendered into a static site whose
content JSON is exported alongside the pages.

Content structure:

  content/
  ├── config.toml                  # Site config (optional)
  ├── projects/
  │   ├── index.json               # Array of project records
  │   └── ci-pipeline.json         # One project, looked up by slug
  └── knowledge/
      ├── index.json               # Array of entries, or array of ids
      └── docker.json              # One entry, looked up by id

With --base-url (or content.base_url in config.toml) the same layout is
fetched over HTTP from a previous export instead:

  {base}/content/projects/index.json
  {base}/content/knowledge/{id}.json

Run 'folio gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Load content from a deployed export instead of the content directory
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// More logging on stderr (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the static site and export the content JSON
    Build,
    /// Validate every content JSON file (exit 1 on any problem)
    Check,
    /// Verify a generated export directory (exit 1 on failure)
    Verify {
        /// Also write the report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Copy the content JSON into {output}/content
    CopyContent,
    /// List projects, one page at a time
    Projects {
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Page size (defaults to content.projects_per_page)
        #[arg(long)]
        limit: Option<usize>,
        /// Only the featured projects shown on the home page
        #[arg(long)]
        featured: bool,
    },
    /// List knowledge entries matching the filters
    Knowledge {
        #[arg(long)]
        category: Option<String>,
        /// Comma-separated; an entry must carry every tag
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one project
    Project { slug: String },
    /// Show one knowledge entry and its related projects
    Entry { id: String },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let report = check::check_content(&cli.source);
            output::print_check_output(&report, &cli.source);
            if !report.passed() {
                std::process::exit(report.exit_code());
            }
        }
        Command::Verify { report: report_path } => {
            println!("==> Verifying {}", cli.output.display());
            let report = verify::verify_export(&cli.output)?;
            output::print_verify_output(&report);
            if let Some(path) = report_path {
                verify::write_report(&report, path)?;
                println!("Report written to {}", path.display());
            }
            if !report.passed() {
                std::process::exit(report.exit_code());
            }
        }
        Command::CopyContent => {
            let files = generate::copy_content(&cli.source, &cli.output)?;
            output::print_copy_output(&files);
        }
        command => {
            let site_config = config::load_config(&cli.source)?;
            let (store, remote) = open_store(&cli, &site_config)?;
            run_content_command(command, &cli, &site_config, &store, remote)?;
        }
    }

    Ok(())
}

/// Commands that read content through a [`ContentStore`].
fn run_content_command(
    command: &Command,
    cli: &Cli,
    site_config: &SiteConfig,
    store: &ContentStore<Box<dyn ContentSource>>,
    remote: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Build => {
            println!(
                "==> Building {} → {}",
                store.source().describe(),
                cli.output.display()
            );
            let content_root = (!remote).then_some(cli.source.as_path());
            let report = generate::generate(store, site_config, content_root, &cli.output)?;
            output::print_generate_output(&report);
            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Projects {
            page,
            limit,
            featured,
        } => {
            let mut projects = store.load_projects();
            if *featured {
                projects = query::featured_projects(&projects);
            }
            let limit = limit.unwrap_or(site_config.content.projects_per_page);
            let options =
                PaginationOptions::new(*page, limit).ok_or("--page and --limit must be at least 1")?;
            output::print_project_list(&query::paginate(&projects, options));
        }
        Command::Knowledge {
            category,
            tags,
            search,
        } => {
            let filters = ContentFilters {
                category: non_blank(category),
                tags: tags
                    .iter()
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect(),
                search: non_blank(search),
            };
            let entries = store.load_knowledge_entries(Some(&filters));
            output::print_knowledge_list(&entries, &filters);
        }
        Command::Project { slug } => {
            let project = store
                .load_project_by_slug(slug)
                .ok_or_else(|| format!("project not found: {slug}"))?;
            output::print_project_detail(&project);
        }
        Command::Entry { id } => {
            let entry = store
                .load_knowledge_entry_by_id(id)
                .ok_or_else(|| format!("knowledge entry not found: {id}"))?;
            let related = store.resolve_related_projects(&entry);
            output::print_knowledge_detail(&entry, &related);
        }
        Command::Check | Command::Verify { .. } | Command::CopyContent | Command::GenConfig => {
            unreachable!("handled without a content store")
        }
    }
    Ok(())
}

/// Remote when `--base-url` or `content.base_url` is set, local otherwise.
/// The flag wins over the config.
fn open_store(
    cli: &Cli,
    site_config: &SiteConfig,
) -> Result<(ContentStore<Box<dyn ContentSource>>, bool), Box<dyn std::error::Error>> {
    let base_url = cli
        .base_url
        .clone()
        .filter(|u| !u.trim().is_empty())
        .or_else(|| Some(site_config.content.base_url.clone()).filter(|u| !u.is_empty()));

    let source: Box<dyn ContentSource> = match &base_url {
        Some(url) => {
            let fetcher = HttpFetcher::new(site_config.fetch.timeout())?;
            Box::new(RemoteSource::new(
                url,
                fetcher,
                site_config.fetch.retry_policy(),
            ))
        }
        None => Box::new(LocalSource::new(cli.source.clone())),
    };
    info!(source = %source.describe(), "content source");
    Ok((ContentStore::new(source), base_url.is_some()))
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Log to stderr so command output on stdout stays clean.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
