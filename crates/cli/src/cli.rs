//! Command-line definition

use brawo_core::DatabaseType;
use brawo_storage::StorageLayout;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Brawo - declarative content types for a CMS.
///
/// Reads `*_type.toml` / `*_type.json` declarations, validates them and
/// prints the storage and route shapes they produce.
#[derive(Parser, Debug)]
#[command(name = "brawo")]
#[command(version)]
#[command(about = "Validate content type declarations and inspect their storage, routes and fields")]
pub struct Cli {
    /// Directory holding content type declarations
    #[arg(
        short,
        long,
        global = true,
        env = "BRAWO_CONTENT_TYPES",
        default_value = "content_types",
        value_name = "DIR"
    )]
    pub dir: PathBuf,

    /// Storage configuration file (TOML)
    #[arg(short, long, global = true, env = "BRAWO_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate declarations and check that storage can be derived for each
    Check {
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },

    /// Print CREATE TABLE statements for the declared content types
    Ddl {
        /// Database dialect (postgresql, mysql, sqlite)
        #[arg(long)]
        database: Option<DatabaseType>,

        /// Storage layout (dedicated_table, json_column)
        #[arg(long)]
        layout: Option<StorageLayout>,

        /// Only this content type
        #[arg(long = "type", value_name = "SLUG")]
        content_type: Option<String>,
    },

    /// Print the public route table
    Routes {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List field type tags, or describe the fields of one content type
    Fields {
        /// Content type slug
        content_type: Option<String>,

        /// Print the input descriptions of a blank entity as JSON
        #[arg(long)]
        json: bool,
    },
}
