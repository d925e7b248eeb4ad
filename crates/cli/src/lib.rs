//! # Brawo CLI
//!
//! Command-line interface for Brawo CMS.
//!
//! ## Commands
//!
//! - `check` - Validate declarations and materialize them in memory
//! - `ddl` - Print the tables derived from the declarations
//! - `routes` - Print the public route table
//! - `fields` - List field type tags or describe a content type's fields

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::Workspace;

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Run a parsed command line, writing to stdout
pub fn run(cli: Cli) -> anyhow::Result<()> {
    let workspace = Workspace::load(&cli.dir, cli.config.as_deref())?;
    tracing::debug!(
        dir = %workspace.dir.display(),
        database = %workspace.config.database,
        layout = %workspace.config.layout,
        "workspace loaded"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Check { strict } => commands::check(&workspace, strict, &mut out),
        Commands::Ddl {
            database,
            layout,
            content_type,
        } => commands::ddl(
            &workspace,
            database,
            layout,
            content_type.as_deref(),
            &mut out,
        ),
        Commands::Routes { json } => commands::routes(&workspace, json, &mut out),
        Commands::Fields { content_type, json } => {
            commands::fields(&workspace, content_type.as_deref(), json, &mut out)
        }
    }
}
