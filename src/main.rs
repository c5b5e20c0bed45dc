//! CLI entry point for kdroid-blog

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kdroid_blog::{commands, server, Blog};

#[derive(Parser)]
#[command(name = "kdroid-blog")]
#[command(version)]
#[command(about = "Markdown blog generator with per-category listings", long_about = None)]
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
    /// Initialize a new blog site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new post
    New {
        /// Title of the new post
        title: String,

        /// Category of the new post
        #[arg(short = 'C', long)]
        category: Option<String>,

        /// Path of the new post, relative to the source directory
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Generate static files
    #[command(alias = "g")]
    Generate {
        /// Watch for file changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Start a local server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
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

    /// Delete the public folder
    Clean,

    /// List site information
    List {
        /// Type of content to list (post, category, tag, skipped)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        "kdroid_blog=debug,info"
    } else {
        "kdroid_blog=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("reading the current directory")?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing blog site in {:?}", target_dir);
            commands::init::init_site(&target_dir)?;
            println!("Initialized blog site in {:?}", target_dir);
        }

        Commands::New {
            title,
            category,
            path,
        } => {
            let blog = Blog::new(&base_dir)?;
            let file_path =
                commands::new::create_post(&blog, &title, category.as_deref(), path.as_deref())?;
            println!("Created: {:?}", file_path);
        }

        Commands::Generate { watch } => {
            let blog = Blog::new(&base_dir)?;
            tracing::info!("Generating static files...");

            commands::generate::run(&blog)?;
            println!("Generated successfully!");

            if watch {
                commands::generate::watch(&blog).await?;
            }
        }

        Commands::Server {
            port,
            ip,
            open,
            r#static,
        } => {
            let blog = Blog::new(&base_dir)?;

            tracing::info!("Generating static files...");
            blog.generate()?;

            tracing::info!("Starting server at http://{}:{}", ip, port);
            server::start(&blog, &ip, port, !r#static, open).await?;
        }

        Commands::Clean => {
            let blog = Blog::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            blog.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            let blog = Blog::new(&base_dir)?;
            commands::list::run(&blog, &r#type)?;
        }

        Commands::Version => {
            println!("kdroid-blog version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
