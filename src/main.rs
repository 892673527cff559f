use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yatube::{build_state, config::Config, db, routes};

#[derive(Parser)]
#[command(name = "yatube", about = "Blogging platform with groups, comments and subscriptions")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the web server (default)
    Serve,
    /// Create a post group; groups have no web form
    CreateGroup {
        #[arg(long)]
        title: String,
        /// Derived from the title when omitted
        #[arg(long)]
        slug: Option<String>,
        #[arg(long, default_value = "")]
        description: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yatube=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    tracing::info!("configuration loaded");

    let addr = config.bind_addr();
    let state = build_state(config).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let app = routes::generate_routes(state);

            tracing::info!("listening on {}", addr);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            axum::serve(listener, app).await?;
        }
        Command::CreateGroup {
            title,
            slug: requested_slug,
            description,
        } => {
            let slug = requested_slug.unwrap_or_else(|| slug::slugify(&title));
            let group = db::create_group(&state.pool, &title, &slug, &description).await?;
            tracing::info!(id = group.id, slug = %group.slug, "group created");
        }
    }

    Ok(())
}
