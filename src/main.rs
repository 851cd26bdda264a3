use clap::{Parser, Subcommand};
use folio::{config, generate, output, serve, site::Site};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Personal portfolio: blog, projects and CV from Markdown and JSON")]
#[command(long_about = "\
Personal portfolio: blog, projects and CV from Markdown and JSON

The site root is the data source. Posts and projects are Markdown files with
frontmatter; the CV and home page come from one strictly validated JSON
document.

Site structure:

  site/
  ├── folio.toml                   # Config (optional, sparse over defaults)
  ├── posts/
  │   ├── 2024-01-30-hello.md      # Date and slug from the filename
  │   └── notes.md                 # Date from frontmatter or file mtime
  ├── projects/
  │   └── folio.md                 # type, github_url, featured, technologies...
  ├── data/
  │   ├── personal_info.json       # Bio, timeline, contact (required)
  │   └── knowledge_base.json      # Terminal snippets for the home page
  └── static/                      # Served under /static, copied on build

Field resolution (first available wins):
  Date:  frontmatter date → filename prefix → file mtime (posts only)
  Slug:  frontmatter slug → filename without date prefix
  Drafts (draft: true) are hidden unless --preview is given.

Logging: FOLIO_LOG sets the filter (default folio=info,warn), DEBUG=1 turns
on debug output, FOLIO_LOG_FORMAT=json switches to JSON lines.

Run 'folio gen-config' to generate a documented folio.toml.")]
#[command(version)]
struct Cli {
    /// Site root directory
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the site over HTTP, re-reading content as it changes
    Serve {
        /// Show drafts
        #[arg(long)]
        preview: bool,
        /// Port to listen on (overrides folio.toml)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Render every page to static HTML
    Build {
        /// Output directory
        #[arg(long, default_value = "dist")]
        output: PathBuf,
        /// Include drafts
        #[arg(long)]
        preview: bool,
    },
    /// Load all content and report what was found and what failed
    Check,
    /// Print a stock folio.toml with all options documented
    GenConfig,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("FOLIO_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "folio=debug,info"
        } else {
            "folio=info,warn"
        })
    });

    let format = env::var("FOLIO_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Load `folio.toml` and open the site, applying CLI overrides first.
fn open_site(
    root: &std::path::Path,
    apply: impl FnOnce(&mut config::SiteConfig),
) -> Result<Site, Box<dyn std::error::Error>> {
    let mut site_config = config::load_config(root)?;
    apply(&mut site_config);
    Ok(Site::open(root, site_config)?)
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match cli.command {
        Command::Serve { preview, port } => {
            let site = open_site(&cli.root, |c| {
                c.serve.preview |= preview;
                if let Some(port) = port {
                    c.serve.port = port;
                }
            })?;
            serve::serve(&site)?;
        }
        Command::Build {
            output: out_dir,
            preview,
        } => {
            let site = open_site(&cli.root, |c| c.serve.preview |= preview)?;
            println!("==> Building {} → {}", cli.root.display(), out_dir.display());
            let report = generate::generate(&site, &out_dir)?;
            output::print_build_output(&report);
            println!("==> Build complete: {}", out_dir.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.root.display());
            let site = open_site(&cli.root, |_| {})?;
            output::print_check_output(&site);
            let failures = output::failure_count(&site);
            if failures > 0 {
                println!("==> Content loaded, {failures} unit(s) skipped");
            } else {
                println!("==> Content is valid");
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}
