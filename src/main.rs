//! CLI entry point for claypress

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "claypress")]
#[command(author = "Mark")]
#[command(version)]
#[command(about = "A personal blog server with Markdown import", long_about = None)]
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
    /// Initialize a new blog
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new unpublished post
    New {
        /// Title of the new post
        title: String,
    },

    /// Import a markdown file or a directory of them
    #[command(alias = "i")]
    Import {
        /// File or directory to import
        path: PathBuf,

        /// Publish the imported posts
        #[arg(short, long)]
        publish: bool,

        /// Re-import files when they change
        #[arg(short, long)]
        watch: bool,
    },

    /// Start the blog server
    #[command(alias = "s")]
    Server {
        /// Port to listen on (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to (defaults to the configured address)
        #[arg(short, long)]
        ip: Option<String>,
    },

    /// List blog content
    List {
        /// Type of content to list (post, category)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "claypress=debug,info"
    } else {
        "claypress=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing blog in {:?}", target_dir);
            claypress::commands::init::init_blog(&target_dir)?;
            println!("Initialized empty blog in {:?}", target_dir);
        }

        Commands::New { title } => {
            let blog = claypress::Blog::new(&base_dir)?;
            tracing::info!("Creating new post with title: {}", title);
            blog.new_post(&title)?;
        }

        Commands::Import {
            path,
            publish,
            watch,
        } => {
            let blog = claypress::Blog::new(&base_dir)?;
            let path = if path.is_absolute() {
                path
            } else {
                base_dir.join(path)
            };
            tracing::info!("Importing {:?}", path);
            let backend = claypress::commands::import::run(&blog, &path, publish)?;

            if watch {
                claypress::commands::import::watch(&blog, &backend, &path, publish)?;
            }
        }

        Commands::Server { port, ip } => {
            let blog = claypress::Blog::new(&base_dir)?;
            let ip = ip.unwrap_or_else(|| blog.config.server.ip.clone());
            let port = port.unwrap_or(blog.config.server.port);

            tracing::info!("Starting server at http://{}:{}", ip, port);
            claypress::server::start(&blog, &ip, port).await?;
        }

        Commands::List { r#type } => {
            let blog = claypress::Blog::new(&base_dir)?;
            claypress::commands::list::run(&blog, &r#type)?;
        }

        Commands::Version => {
            println!("claypress version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
