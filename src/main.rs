// gistkit command line entry point.
// Thin wrapper over the library: show, cat, and list gists, star and unstar.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gistkit::{GistClient, Gists};

/// Browse GitHub Gists from the command line
#[derive(Parser)]
#[command(name = "gistkit")]
#[command(about = "Browse GitHub Gists from the command line", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Subcommand)]
enum Commands {
    /// Show a gist's metadata
    Show {
        /// Gist identifier
        id: String,
    },
    /// Print every file of a gist
    Files {
        /// Gist identifier
        id: String,
    },
    /// List a user's public gists
    List {
        /// GitHub username
        user: String,
    },
    /// Star a gist (needs GIST_TOKEN)
    Star { id: String },
    /// Unstar a gist (needs GIST_TOKEN)
    Unstar { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = GistClient::from_env().context("failed to build HTTP client")?;
    let gists = Gists::new(client);

    match cli.command {
        Commands::Show { id } => {
            let gist = gists.gist(&id);
            let meta = gist.metadata().await?;
            println!("id:          {}", meta.id);
            println!("url:         {}", gist.url());
            println!("owner:       {}", meta.owner.as_deref().unwrap_or("-"));
            println!("description: {}", meta.description.as_deref().unwrap_or(""));
            println!("public:      {}", meta.public);
            if let Some(created_at) = meta.created_at {
                println!("created:     {}", created_at.to_rfc3339());
            }
            println!("files:       {}", meta.file_names.join(", "));
        }
        Commands::Files { id } => {
            let gist = gists.gist(&id);
            for (name, content) in gist.files().await? {
                println!("==> {} <==", name);
                println!("{}", content);
            }
        }
        Commands::List { user } => {
            for gist in gists.fetch_by_user(&user).await? {
                let description = gist.description().await?.unwrap_or_default();
                println!("{}  {}", gist.id(), description);
            }
        }
        Commands::Star { id } => {
            if !gists.star(&id).await {
                anyhow::bail!("could not star gist {}", id);
            }
        }
        Commands::Unstar { id } => {
            if !gists.unstar(&id).await {
                anyhow::bail!("could not unstar gist {}", id);
            }
        }
    }

    Ok(())
}
