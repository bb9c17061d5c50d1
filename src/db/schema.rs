//! Compares a live database with the tables and columns this server expects,
//! and lets an operator browse what is actually stored.
use super::repo::Pool;
use anyhow::{bail, Result};
use serde::Serialize;
use sqlx::Row;
use std::collections::BTreeSet;

/// Table name and the columns the server reads or writes.
pub const EXPECTED: &[(&str, &[&str])] = &[
    ("plant_types", &["id", "name", "summer_weeks", "winter_weeks"]),
    ("plants", &["id", "name", "type_id", "last_watered"]),
    (
        "sensor_readings",
        &["id", "recorded_at", "source", "temperature", "humidity", "pressure", "heat_index"],
    ),
    ("household_tasks", &["id", "name", "frequency_days", "last_completed"]),
    ("tips", &["id", "category", "tip"]),
    ("users", &["id", "username", "password_hash"]),
    ("sessions", &["token", "user_id"]),
];

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TableReport {
    pub name: String,
    pub missing_columns: Vec<String>,
    pub extra_columns: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct SchemaReport {
    pub missing_tables: Vec<String>,
    pub unexpected_tables: Vec<String>,
    pub tables: Vec<TableReport>,
}

impl SchemaReport {
    /// Extra tables and columns are tolerated; anything missing is not.
    pub fn is_compatible(&self) -> bool {
        self.missing_tables.is_empty() && self.tables.iter().all(|t| t.missing_columns.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub decl_type: String,
    pub not_null: bool,
    pub primary_key: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TableSummary {
    pub name: String,
    pub rows: i64,
}

/// Newest rows of one table, every value rendered as text.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TableDump {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
    pub total_rows: i64,
    pub rows: Vec<Vec<Option<String>>>,
}

/// User tables in name order. SQLite's own tables and the migration
/// bookkeeping table are left out.
pub async fn list_tables(pool: &Pool) -> Result<Vec<String>> {
    let names = sqlx::query_scalar::<_, String>(
        "SELECT name FROM sqlite_master WHERE type = 'table' \
         AND substr(name, 1, 7) != 'sqlite_' AND name != '_sqlx_migrations' \
         ORDER BY name",
    )
    .fetch_all(pool)
    .await?;
    Ok(names)
}

pub async fn table_columns(pool: &Pool, table: &str) -> Result<Vec<ColumnInfo>> {
    let rows = sqlx::query_as::<_, (String, String, i64, i64)>(
        "SELECT name, type, \"notnull\", pk FROM pragma_table_info(?) ORDER BY cid",
    )
    .bind(table)
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|(name, decl_type, not_null, pk)| ColumnInfo {
            name,
            decl_type,
            not_null: not_null != 0,
            primary_key: pk != 0,
        })
        .collect())
}

pub async fn summarize_tables(pool: &Pool) -> Result<Vec<TableSummary>> {
    let mut out = Vec::new();
    for name in list_tables(pool).await? {
        let rows = count_rows(pool, &name).await?;
        out.push(TableSummary { name, rows });
    }
    Ok(out)
}

/// Up to `limit` of the most recently inserted rows of `table`.
pub async fn dump_table(pool: &Pool, table: &str, limit: u32) -> Result<TableDump> {
    // Only names read back from sqlite_master ever reach the SQL text.
    let tables = list_tables(pool).await?;
    let Some(name) = tables.into_iter().find(|t| t == table) else {
        bail!("no such table: {table}");
    };
    let columns = table_columns(pool, &name).await?;
    let select = columns
        .iter()
        .map(|c| format!("CAST({} AS TEXT)", quote_ident(&c.name)))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "SELECT {select} FROM {} ORDER BY rowid DESC LIMIT ?",
        quote_ident(&name)
    );
    let mut rows = Vec::new();
    for row in sqlx::query(&sql).bind(i64::from(limit)).fetch_all(pool).await? {
        let values = (0..columns.len())
            .map(|i| row.try_get::<Option<String>, _>(i))
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(values);
    }
    Ok(TableDump {
        total_rows: count_rows(pool, &name).await?,
        name,
        columns,
        rows,
    })
}

async fn count_rows(pool: &Pool, table: &str) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
    Ok(sqlx::query_scalar::<_, i64>(&sql).fetch_one(pool).await?)
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub async fn check(pool: &Pool) -> Result<SchemaReport> {
    let actual: BTreeSet<String> = list_tables(pool).await?.into_iter().collect();

    let mut report = SchemaReport::default();
    let expected_names: BTreeSet<&str> = EXPECTED.iter().map(|(t, _)| *t).collect();
    report.unexpected_tables = actual
        .iter()
        .filter(|t| !expected_names.contains(t.as_str()))
        .cloned()
        .collect();

    for (table, columns) in EXPECTED {
        if !actual.contains(*table) {
            report.missing_tables.push(table.to_string());
            continue;
        }
        let present: BTreeSet<String> =
            sqlx::query_scalar::<_, String>("SELECT name FROM pragma_table_info(?)")
                .bind(*table)
                .fetch_all(pool)
                .await?
                .into_iter()
                .collect();
        let wanted: BTreeSet<String> = columns.iter().map(|c| c.to_string()).collect();
        report.tables.push(TableReport {
            name: table.to_string(),
            missing_columns: wanted.difference(&present).cloned().collect(),
            extra_columns: present.difference(&wanted).cloned().collect(),
        });
    }
    Ok(report)
}
