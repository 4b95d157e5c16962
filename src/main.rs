//! CLI entry point for iriedev

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use iriedev::commands::{generate, list};
use iriedev::Blog;

#[derive(Parser)]
#[command(name = "iriedev")]
#[command(version)]
#[command(about = "Static site generator for a personal markdown blog", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the site into the output directory
    #[command(alias = "g", alias = "generate")]
    Build {
        /// Keep running and rebuild on changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Build the site and serve it locally
    #[command(alias = "s", alias = "server")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Enable static mode (no file watching)
        #[arg(long)]
        r#static: bool,
    },

    /// Create a new post (a draft unless --published is given)
    New {
        /// Title of the new post
        title: String,

        /// Mark the new post as published
        #[arg(long)]
        published: bool,
    },

    /// List site information
    List {
        /// What to list (published, drafts, tags, routes)
        #[arg(default_value = "published")]
        r#type: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Remove generated output
    Clean,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "iriedev=debug,info"
    } else {
        "iriedev=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to read the current directory")?,
    };

    match cli.command {
        Commands::Build { watch } => {
            let blog = Blog::new(&base_dir)?;
            let report = blog.build()?;
            println!(
                "Built {} pages ({} published, {} drafts) into {:?}",
                report.pages, report.published, report.drafts, blog.public_dir
            );

            if watch {
                tokio::task::spawn_blocking(move || generate::watch(&blog, |_| {})).await??;
            }
        }

        Commands::Serve {
            port,
            ip,
            open,
            r#static,
        } => {
            let blog = Blog::new(&base_dir)?;
            blog.build()?;
            iriedev::server::start(&blog, &ip, port, !r#static, open).await?;
        }

        Commands::New { title, published } => {
            let blog = Blog::new(&base_dir)?;
            let path = blog.new_post(&title, published)?;
            println!("Created: {:?}", path);
        }

        Commands::List { r#type, json } => {
            let blog = Blog::new(&base_dir)?;
            list::run(&blog, &r#type, json)?;
        }

        Commands::Clean => {
            let blog = Blog::new(&base_dir)?;
            blog.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::Version => {
            println!("iriedev version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
