//! litebrowse CLI - terminal browser for SQLite databases.

#[cfg(feature = "tui")]
mod clipboard;
mod format;

#[cfg(feature = "tui")]
mod tui;

use clap::{Parser, Subcommand};
use litebrowse::config::DB_PATH_ENV;
use litebrowse::core::identifier::find_column;
use litebrowse::introspect::{list_objects, load_schema};
use litebrowse::mutate::drop_object;
use litebrowse::{BrowseError, Browser, BrowserConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};

/// Width the plain-text preview grid is fitted into.
const GRID_WIDTH: usize = 120;

#[derive(Parser)]
#[command(name = "litebrowse")]
#[command(about = "Browse and edit a SQLite database from the terminal")]
#[command(version)]
struct Cli {
    /// Path to the SQLite database file [default: $DB_PATH, then the newest .db
    /// in the current directory or in instance/]
    #[arg(long)]
    db: Option<PathBuf>,

    /// Output JSON result to stdout (tables, schema, preview)
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the interactive browser (default)
    #[cfg(feature = "tui")]
    Browse,

    /// List tables and views
    Tables,

    /// Show columns and unique indexes of a table or view
    Schema {
        /// Table or view name
        name: String,
    },

    /// Show the first rows of a table or view
    Preview {
        /// Table or view name
        name: String,
    },

    /// Insert a copy of a row that respects primary key and unique indexes
    Duplicate {
        /// Table name
        table: String,

        /// Preview row to copy (0-based)
        #[arg(long)]
        row: usize,
    },

    /// Delete a row
    Delete {
        /// Table name
        table: String,

        /// Preview row to delete (0-based)
        #[arg(long)]
        row: usize,
    },

    /// Set one cell of a row; the value NULL (any case) stores SQL NULL
    Update {
        /// Table name
        table: String,

        /// Preview row to edit (0-based)
        #[arg(long)]
        row: usize,

        /// Column name
        #[arg(long)]
        column: String,

        /// New value
        #[arg(long, allow_hyphen_values = true)]
        value: String,
    },

    /// Drop a table or view
    Drop {
        /// Table or view name
        name: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), BrowseError> {
    let cli = Cli::parse();

    // Resolve the database BEFORE touching the terminal so errors display properly
    let cwd = std::env::current_dir()?;
    let env_path = std::env::var_os(DB_PATH_ENV).map(PathBuf::from);
    let config = BrowserConfig::resolve(cli.db.clone(), env_path, &cwd)?;

    let command = match cli.command {
        #[cfg(feature = "tui")]
        None | Some(Commands::Browse) => return tui::run(config).await,
        #[cfg(not(feature = "tui"))]
        None => {
            return Err(BrowseError::Config(
                "built without the interactive browser; pass a subcommand".to_string(),
            ))
        }
        Some(command) => command,
    };

    setup_logging(&cli.verbosity, &cli.log_format)
        .map_err(BrowseError::Config)?;
    info!("Using database {}", config.db_path.display());

    let mut browser =
        Browser::from_connection(config.open()?)?.with_preview_limit(config.preview_limit);

    match command {
        #[cfg(feature = "tui")]
        Commands::Browse => unreachable!(), // Handled above

        Commands::Tables => {
            let objects = list_objects(browser.connection())?;
            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&objects)?);
            } else {
                for object in &objects {
                    println!("{:<6} {}", object.kind, object.name);
                }
            }
        }

        Commands::Schema { name } => {
            let schema = load_schema(browser.connection(), &name)?;
            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&schema)?);
            } else {
                println!("{} {}", schema.kind, schema.name);
                for col in &schema.columns {
                    let mut line = format!("  {} {}", col.name, col.decl_type);
                    if col.is_pk() {
                        line.push_str(&format!(" PRIMARY KEY({})", col.pk_order));
                    }
                    if col.not_null {
                        line.push_str(" NOT NULL");
                    }
                    if let Some(ref default) = col.default_value {
                        line.push_str(&format!(" DEFAULT {}", default));
                    }
                    println!("{}", line.trim_end());
                }
                for index in &schema.unique_indexes {
                    println!("  UNIQUE {} ({})", index.name, index.columns.join(", "));
                }
            }
        }

        Commands::Preview { name } => {
            browser.select_object(&name)?;
            let preview = browser.preview();
            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(preview)?);
            } else {
                println!(
                    "{}",
                    format::render_grid(&preview.columns, &preview.rows, GRID_WIDTH)
                );
                println!("({} rows)", preview.len());
            }
        }

        Commands::Duplicate { table, row } => {
            select_row(&mut browser, &table, row)?;
            let plan = browser.duplicate()?;
            println!("Duplicated row {} of {}", row, table);
            let mut overrides: Vec<_> = plan.overrides().iter().collect();
            overrides.sort_by(|a, b| a.0.cmp(b.0));
            for (column, value) in overrides {
                println!("  {} = {}", column, value);
            }
        }

        Commands::Delete { table, row } => {
            select_row(&mut browser, &table, row)?;
            let affected = browser.delete()?;
            println!("Deleted {} row(s) from {}", affected, table);
        }

        Commands::Update {
            table,
            row,
            column,
            value,
        } => {
            select_row(&mut browser, &table, row)?;
            let col = find_column(&browser.preview().columns, &column).ok_or_else(|| {
                BrowseError::Validation(format!("no column {} in {}", column, table))
            })?;
            browser.select_col(col);
            let affected = browser.commit_cell_edit(&value)?;
            println!("Updated {}.{} on {} row(s)", table, column, affected);
        }

        Commands::Drop { name } => {
            let kind = drop_object(browser.connection(), &name)?;
            println!("Dropped {} {}", kind, name);
        }
    }

    Ok(())
}

/// Select `row` of `table`, rejecting rows outside the preview.
fn select_row(browser: &mut Browser, table: &str, row: usize) -> Result<(), BrowseError> {
    browser.select_object(table)?;
    let rows = browser.preview().len();
    if row >= rows {
        return Err(BrowseError::Validation(format!(
            "row {} out of range ({} has {} preview rows)",
            row, table, rows
        )));
    }
    browser.select_row(row);
    Ok(())
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = if format == "json" {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    };

    result.map_err(|e| format!("failed to set up logging: {}", e))
}
