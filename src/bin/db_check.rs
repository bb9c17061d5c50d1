use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use homewatch::db::schema::{self, TableDump, TableSummary};
use homewatch::{config, db};

/// Compare a database file with the schema this server expects, or browse
/// its tables. The file is opened read-only and never created.
#[derive(Parser, Debug)]
struct Args {
    /// Path to YAML config; used to locate the database
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Database URL, overrides the config and DATABASE_URL
    #[arg(long)]
    database_url: Option<String>,

    /// Print the output as JSON
    #[arg(long)]
    json: bool,

    /// List every table with its row count
    #[arg(long, conflicts_with = "table")]
    tables: bool,

    /// Show the columns and newest rows of one table
    #[arg(long)]
    table: Option<String>,

    /// Rows to show with --table
    #[arg(long, default_value_t = 20, requires = "table")]
    limit: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let url = match args.database_url {
        Some(url) => url,
        None => config::load(Some(&args.config))?.database_url(),
    };

    // No migrations here: the point is to inspect the file as it is.
    let pool = db::open_read_only(&url).await?;

    if args.tables {
        let tables = schema::summarize_tables(&pool).await?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&tables)?);
        } else {
            print_summaries(&tables);
        }
        return Ok(());
    }

    if let Some(table) = args.table.as_deref() {
        let dump = schema::dump_table(&pool, table, args.limit).await?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&dump)?);
        } else {
            print_dump(&dump);
        }
        return Ok(());
    }

    let report = schema::check(&pool).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Database: {url}");
        for table in &report.missing_tables {
            println!("  missing table   {table}");
        }
        for table in &report.unexpected_tables {
            println!("  extra table     {table}");
        }
        for t in &report.tables {
            for c in &t.missing_columns {
                println!("  missing column  {}.{}", t.name, c);
            }
            for c in &t.extra_columns {
                println!("  extra column    {}.{}", t.name, c);
            }
        }
    }

    if !report.is_compatible() {
        bail!("database schema is not compatible");
    }
    println!("Schema OK");
    Ok(())
}

fn print_summaries(tables: &[TableSummary]) {
    let width = tables.iter().map(|t| t.name.len()).max().unwrap_or(0);
    for t in tables {
        println!("{:<width$}  {:>8} rows", t.name, t.rows);
    }
}

fn print_dump(dump: &TableDump) {
    println!("{} ({} rows, newest {} shown)", dump.name, dump.total_rows, dump.rows.len());
    for c in &dump.columns {
        let mut flags = Vec::new();
        if c.primary_key {
            flags.push("PK");
        }
        if c.not_null {
            flags.push("NOT NULL");
        }
        println!("  {} {} {}", c.name, c.decl_type, flags.join(" "));
    }
    println!();

    let cells: Vec<Vec<&str>> = dump
        .rows
        .iter()
        .map(|row| row.iter().map(|v| v.as_deref().unwrap_or("NULL")).collect())
        .collect();
    let widths: Vec<usize> = dump
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(c.name.len()))
                .max()
                .unwrap_or(0)
                .min(40)
        })
        .collect();

    let header: Vec<String> = dump
        .columns
        .iter()
        .zip(&widths)
        .map(|(c, &w)| format!("{:<w$}", c.name))
        .collect();
    println!("{}", header.join(" | "));
    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(v, &w)| format!("{:<w$}", truncate(v, w)))
            .collect();
        println!("{}", line.join(" | "));
    }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut out: String = value.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}
