use super::model::{
    HouseholdTask, PlantRow, PlantType, PlantUpdate, ReadingRow, TaskUpdate, Tip, UserRecord,
};
use crate::model::{Reading, Source};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::instrument;

pub type Pool = SqlitePool;

const PLANT_SELECT: &str = "SELECT p.id, p.name, p.type_id, t.name AS type_name, p.last_watered, \
     t.summer_weeks, t.winter_weeks FROM plants p JOIN plant_types t ON t.id = p.type_id";

pub async fn init_pool(database_url: &str) -> Result<Pool> {
    let normalized = prepare_sqlite_url(database_url);
    let in_memory = normalized.starts_with("sqlite::memory");
    let options = SqliteConnectOptions::from_str(&normalized)
        .with_context(|| format!("invalid database url {normalized}"))?
        .create_if_missing(true)
        .foreign_keys(true);
    // WAL is not available for in-memory databases.
    let options = if in_memory {
        options
    } else {
        options
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Full)
    };
    // Every in-memory connection is its own database, so keep a single one.
    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };
    let pool = pool_options
        .connect_with(options)
        .await
        .context("failed to open sqlite database")?;
    Ok(pool)
}

/// Open an existing database file for inspection. Nothing is created and the
/// journal mode is left as the file has it.
pub async fn open_read_only(database_url: &str) -> Result<Pool> {
    let Some((path, _)) = sqlite_file_path(database_url) else {
        bail!("not a file-backed sqlite url: {database_url}");
    };
    if !Path::new(&path).is_file() {
        bail!("database file not found: {path}");
    }
    let options = SqliteConnectOptions::new()
        .filename(&path)
        .read_only(true)
        .create_if_missing(false);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .with_context(|| format!("failed to open {path} read-only"))?;
    Ok(pool)
}

/// File path (with a leading `~/` expanded) and query string of a
/// file-backed SQLite URL. `None` for in-memory and non-SQLite URLs.
fn sqlite_file_path(url: &str) -> Option<(String, Option<&str>)> {
    if !url.starts_with("sqlite:") || url.starts_with("sqlite::memory") {
        return None;
    }

    let rest = &url["sqlite:".len()..];
    let path_with_query = rest.strip_prefix("//").unwrap_or(rest);
    let (path_part, query_part) = match path_with_query.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (path_with_query, None),
    };
    if path_part.is_empty() {
        return None;
    }

    let expanded_path = match (path_part.strip_prefix("~/"), std::env::var("HOME")) {
        (Some(rest), Ok(home)) => format!("{}/{}", home.trim_end_matches('/'), rest),
        _ => path_part.to_string(),
    };
    Some((expanded_path, query_part))
}

/// If using a file-backed SQLite URL, expand a leading `~/` and ensure the parent
/// directory exists. Leaves in-memory URLs untouched. Returns possibly-updated URL.
fn prepare_sqlite_url(url: &str) -> String {
    let Some((expanded_path, query_part)) = sqlite_file_path(url) else {
        return url.to_string();
    };

    if let Some(parent) = Path::new(&expanded_path).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }

    let mut rebuilt = format!("sqlite://{expanded_path}");
    if let Some(q) = query_part {
        rebuilt.push('?');
        rebuilt.push_str(q);
    }
    rebuilt
}

pub async fn run_migrations(pool: &Pool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn health_check(pool: &Pool) -> Result<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Sensor readings
// ---------------------------------------------------------------------------

#[instrument(skip_all, fields(source = %reading.source))]
pub async fn insert_reading(pool: &Pool, reading: &Reading) -> Result<i64> {
    let rec = sqlx::query(
        "INSERT INTO sensor_readings (recorded_at, source, temperature, humidity, pressure, heat_index) \
         VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(reading.recorded_at.trunc_subsecs(0))
    .bind(reading.source.as_str())
    .bind(reading.temperature)
    .bind(reading.humidity)
    .bind(reading.pressure)
    .bind(reading.heat_index)
    .fetch_one(pool)
    .await?;
    Ok(rec.get("id"))
}

/// Readings at or after `since`, oldest first.
#[instrument(skip_all)]
pub async fn readings_since(
    pool: &Pool,
    since: DateTime<Utc>,
    source: Option<Source>,
) -> Result<Vec<Reading>> {
    let rows: Vec<ReadingRow> = sqlx::query_as(
        "SELECT recorded_at, source, temperature, humidity, pressure, heat_index \
         FROM sensor_readings WHERE recorded_at >= ? AND (? IS NULL OR source = ?) \
         ORDER BY recorded_at ASC, id ASC",
    )
    .bind(since.trunc_subsecs(0))
    .bind(source.map(|s| s.as_str()))
    .bind(source.map(|s| s.as_str()))
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().filter_map(ReadingRow::into_reading).collect())
}

/// Most recent stored reading of each source; used to warm the cache at startup.
#[instrument(skip_all)]
pub async fn latest_reading_per_source(pool: &Pool) -> Result<Vec<Reading>> {
    let rows: Vec<ReadingRow> = sqlx::query_as(
        "SELECT r.recorded_at, r.source, r.temperature, r.humidity, r.pressure, r.heat_index \
         FROM sensor_readings r \
         WHERE r.id = (SELECT id FROM sensor_readings x WHERE x.source = r.source \
                       ORDER BY x.recorded_at DESC, x.id DESC LIMIT 1)",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().filter_map(ReadingRow::into_reading).collect())
}

// ---------------------------------------------------------------------------
// Plant types
// ---------------------------------------------------------------------------

#[instrument(skip_all)]
pub async fn list_plant_types(pool: &Pool) -> Result<Vec<PlantType>> {
    let rows = sqlx::query_as::<_, PlantType>(
        "SELECT id, name, summer_weeks, winter_weeks FROM plant_types ORDER BY name",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[instrument(skip_all)]
pub async fn get_plant_type(pool: &Pool, id: i64) -> Result<Option<PlantType>> {
    let row = sqlx::query_as::<_, PlantType>(
        "SELECT id, name, summer_weeks, winter_weeks FROM plant_types WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

#[instrument(skip_all)]
pub async fn get_plant_type_by_name(pool: &Pool, name: &str) -> Result<Option<PlantType>> {
    let row = sqlx::query_as::<_, PlantType>(
        "SELECT id, name, summer_weeks, winter_weeks FROM plant_types WHERE name = ?",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Insert a rule, or replace the intervals of the rule with the same name.
#[instrument(skip_all, fields(name = %name))]
pub async fn upsert_plant_type(
    pool: &Pool,
    name: &str,
    summer_weeks: i64,
    winter_weeks: i64,
) -> Result<PlantType> {
    let row = sqlx::query_as::<_, PlantType>(
        "INSERT INTO plant_types (name, summer_weeks, winter_weeks) VALUES (?, ?, ?) \
         ON CONFLICT(name) DO UPDATE SET summer_weeks = excluded.summer_weeks, \
         winter_weeks = excluded.winter_weeks \
         RETURNING id, name, summer_weeks, winter_weeks",
    )
    .bind(name)
    .bind(summer_weeks)
    .bind(winter_weeks)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

// ---------------------------------------------------------------------------
// Plants
// ---------------------------------------------------------------------------

#[instrument(skip_all)]
pub async fn list_plants(pool: &Pool) -> Result<Vec<PlantRow>> {
    let rows = sqlx::query_as::<_, PlantRow>(&format!("{PLANT_SELECT} ORDER BY p.name, p.id"))
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

#[instrument(skip_all)]
pub async fn get_plant(pool: &Pool, id: i64) -> Result<Option<PlantRow>> {
    let row = sqlx::query_as::<_, PlantRow>(&format!("{PLANT_SELECT} WHERE p.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

#[instrument(skip_all)]
pub async fn insert_plant(
    pool: &Pool,
    name: &str,
    type_id: i64,
    last_watered: NaiveDate,
) -> Result<i64> {
    let rec = sqlx::query(
        "INSERT INTO plants (name, type_id, last_watered) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(name)
    .bind(type_id)
    .bind(last_watered)
    .fetch_one(pool)
    .await?;
    Ok(rec.get("id"))
}

/// Returns false when no plant has this id.
#[instrument(skip_all)]
pub async fn update_plant(pool: &Pool, id: i64, update: &PlantUpdate) -> Result<bool> {
    let res = sqlx::query(
        "UPDATE plants SET name = COALESCE(?, name), type_id = COALESCE(?, type_id), \
         last_watered = COALESCE(?, last_watered) WHERE id = ?",
    )
    .bind(update.name.as_deref())
    .bind(update.type_id)
    .bind(update.last_watered)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(res.rows_affected() > 0)
}

#[instrument(skip_all)]
pub async fn mark_watered(pool: &Pool, id: i64, on: NaiveDate) -> Result<bool> {
    let res = sqlx::query("UPDATE plants SET last_watered = ? WHERE id = ?")
        .bind(on)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected() > 0)
}

#[instrument(skip_all)]
pub async fn delete_plant(pool: &Pool, id: i64) -> Result<bool> {
    let res = sqlx::query("DELETE FROM plants WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected() > 0)
}

// ---------------------------------------------------------------------------
// Household tasks
// ---------------------------------------------------------------------------

#[instrument(skip_all)]
pub async fn list_tasks(pool: &Pool) -> Result<Vec<HouseholdTask>> {
    let rows = sqlx::query_as::<_, HouseholdTask>(
        "SELECT id, name, frequency_days, last_completed FROM household_tasks ORDER BY name, id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[instrument(skip_all)]
pub async fn get_task(pool: &Pool, id: i64) -> Result<Option<HouseholdTask>> {
    let row = sqlx::query_as::<_, HouseholdTask>(
        "SELECT id, name, frequency_days, last_completed FROM household_tasks WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

#[instrument(skip_all)]
pub async fn insert_task(
    pool: &Pool,
    name: &str,
    frequency_days: i64,
    last_completed: NaiveDate,
) -> Result<i64> {
    let rec = sqlx::query(
        "INSERT INTO household_tasks (name, frequency_days, last_completed) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(name)
    .bind(frequency_days)
    .bind(last_completed)
    .fetch_one(pool)
    .await?;
    Ok(rec.get("id"))
}

#[instrument(skip_all)]
pub async fn update_task(pool: &Pool, id: i64, update: &TaskUpdate) -> Result<bool> {
    let res = sqlx::query(
        "UPDATE household_tasks SET name = COALESCE(?, name), \
         frequency_days = COALESCE(?, frequency_days), \
         last_completed = COALESCE(?, last_completed) WHERE id = ?",
    )
    .bind(update.name.as_deref())
    .bind(update.frequency_days)
    .bind(update.last_completed)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(res.rows_affected() > 0)
}

#[instrument(skip_all)]
pub async fn complete_task(pool: &Pool, id: i64, on: NaiveDate) -> Result<bool> {
    let res = sqlx::query("UPDATE household_tasks SET last_completed = ? WHERE id = ?")
        .bind(on)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected() > 0)
}

#[instrument(skip_all)]
pub async fn delete_task(pool: &Pool, id: i64) -> Result<bool> {
    let res = sqlx::query("DELETE FROM household_tasks WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected() > 0)
}

// ---------------------------------------------------------------------------
// Tips
// ---------------------------------------------------------------------------

#[instrument(skip_all)]
pub async fn list_tips(pool: &Pool, category: Option<&str>) -> Result<Vec<Tip>> {
    let rows = sqlx::query_as::<_, Tip>(
        "SELECT id, category, tip FROM tips WHERE (? IS NULL OR category = ?) ORDER BY category, id",
    )
    .bind(category)
    .bind(category)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[instrument(skip_all)]
pub async fn random_tip(pool: &Pool, category: Option<&str>) -> Result<Option<Tip>> {
    let row = sqlx::query_as::<_, Tip>(
        "SELECT id, category, tip FROM tips WHERE (? IS NULL OR category = ?) ORDER BY RANDOM() LIMIT 1",
    )
    .bind(category)
    .bind(category)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

#[instrument(skip_all)]
pub async fn insert_tip(pool: &Pool, category: &str, tip: &str) -> Result<Tip> {
    let row = sqlx::query_as::<_, Tip>(
        "INSERT INTO tips (category, tip) VALUES (?, ?) RETURNING id, category, tip",
    )
    .bind(category)
    .bind(tip)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

// ---------------------------------------------------------------------------
// Users and sessions
// ---------------------------------------------------------------------------

/// Create the user, or replace the password hash of an existing one.
#[instrument(skip_all, fields(username = %username))]
pub async fn upsert_user(pool: &Pool, username: &str, password_hash: &str) -> Result<i64> {
    let rec = sqlx::query(
        "INSERT INTO users (username, password_hash) VALUES (?, ?) \
         ON CONFLICT(username) DO UPDATE SET password_hash = excluded.password_hash \
         RETURNING id",
    )
    .bind(username)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;
    Ok(rec.get("id"))
}

#[instrument(skip_all)]
pub async fn find_user(pool: &Pool, username: &str) -> Result<Option<UserRecord>> {
    let row = sqlx::query_as::<_, UserRecord>(
        "SELECT id, username, password_hash FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

#[instrument(skip_all)]
pub async fn insert_session(pool: &Pool, token: &str, user_id: i64) -> Result<()> {
    sqlx::query("INSERT INTO sessions (token, user_id) VALUES (?, ?)")
        .bind(token)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Owner of `token`, unless the session is older than `max_age`.
#[instrument(skip_all)]
pub async fn session_user(pool: &Pool, token: &str, max_age: Duration) -> Result<Option<i64>> {
    let id = sqlx::query_scalar::<_, i64>(
        "SELECT user_id FROM sessions WHERE token = ? AND created_at >= datetime('now', ?)",
    )
    .bind(token)
    .bind(age_modifier(max_age))
    .fetch_optional(pool)
    .await?;
    Ok(id)
}

/// Drop every session older than `max_age`; returns how many went.
#[instrument(skip_all)]
pub async fn delete_expired_sessions(pool: &Pool, max_age: Duration) -> Result<u64> {
    let res = sqlx::query("DELETE FROM sessions WHERE created_at < datetime('now', ?)")
        .bind(age_modifier(max_age))
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

/// SQLite `datetime()` modifier reaching `max_age` into the past.
fn age_modifier(max_age: Duration) -> String {
    format!("-{} seconds", max_age.as_secs())
}

#[instrument(skip_all)]
pub async fn delete_session(pool: &Pool, token: &str) -> Result<bool> {
    let res = sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(res.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Sample;
    use chrono::Duration as ChronoDuration;

    const DAY: Duration = Duration::from_secs(86_400);

    async fn setup_pool() -> Pool {
        let pool = init_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    #[test]
    fn prepare_url_passthrough() {
        assert_eq!(prepare_sqlite_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(prepare_sqlite_url("postgres://x"), "postgres://x");
    }

    #[test]
    fn prepare_url_creates_parent_dir() {
        let td = tempfile::tempdir().unwrap();
        let db = td.path().join("nested/dir/home.db");
        let url = format!("sqlite://{}?mode=rwc", db.display());
        let out = prepare_sqlite_url(&url);
        assert_eq!(out, url);
        assert!(td.path().join("nested/dir").is_dir());
    }

    #[tokio::test]
    async fn seeded_plant_types_present() {
        let pool = setup_pool().await;
        let types = list_plant_types(&pool).await.unwrap();
        let names: Vec<_> = types.iter().map(|t| t.name.as_str()).collect();
        assert!(names.contains(&"pothos"));
        let ficus = get_plant_type_by_name(&pool, "ficus").await.unwrap().unwrap();
        assert_eq!((ficus.summer_weeks, ficus.winter_weeks), (1, 2));
    }

    #[tokio::test]
    async fn upsert_plant_type_replaces_intervals() {
        let pool = setup_pool().await;
        let created = upsert_plant_type(&pool, "monstera", 1, 2).await.unwrap();
        let updated = upsert_plant_type(&pool, "monstera", 2, 4).await.unwrap();
        assert_eq!(created.id, updated.id);
        assert_eq!((updated.summer_weeks, updated.winter_weeks), (2, 4));
    }

    #[tokio::test]
    async fn plant_crud() {
        let pool = setup_pool().await;
        let ficus = get_plant_type_by_name(&pool, "ficus").await.unwrap().unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let id = insert_plant(&pool, "Benjamin", ficus.id, day).await.unwrap();

        let plant = get_plant(&pool, id).await.unwrap().unwrap();
        assert_eq!(plant.type_name, "ficus");
        assert_eq!(plant.last_watered, day);

        let later = day + ChronoDuration::days(3);
        assert!(mark_watered(&pool, id, later).await.unwrap());
        let update = PlantUpdate { name: Some("Benji".into()), ..Default::default() };
        assert!(update_plant(&pool, id, &update).await.unwrap());
        let plant = get_plant(&pool, id).await.unwrap().unwrap();
        assert_eq!(plant.name, "Benji");
        assert_eq!(plant.last_watered, later);

        assert!(delete_plant(&pool, id).await.unwrap());
        assert!(!delete_plant(&pool, id).await.unwrap());
        assert!(get_plant(&pool, id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_type_violates_foreign_key() {
        let pool = setup_pool().await;
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert!(insert_plant(&pool, "Ghost", 9999, day).await.is_err());
    }

    #[tokio::test]
    async fn readings_window_and_latest() {
        let pool = setup_pool().await;
        let now = Utc::now().trunc_subsecs(0);
        let sample = Sample { temperature: 20.0, humidity: 50.0, pressure: Some(1012.0) };
        for (mins, src) in [(120, Source::Sensor), (30, Source::Sensor), (10, Source::Weather)] {
            let r = Reading::from_sample(src, sample, now - ChronoDuration::minutes(mins));
            insert_reading(&pool, &r).await.unwrap();
        }

        let hour = readings_since(&pool, now - ChronoDuration::hours(1), None).await.unwrap();
        assert_eq!(hour.len(), 2);
        assert!(hour[0].recorded_at < hour[1].recorded_at);

        let since = now - ChronoDuration::hours(3);
        let sensor_only = readings_since(&pool, since, Some(Source::Sensor)).await.unwrap();
        assert_eq!(sensor_only.len(), 2);

        let latest = latest_reading_per_source(&pool).await.unwrap();
        assert_eq!(latest.len(), 2);
        let sensor = latest.iter().find(|r| r.source == Source::Sensor).unwrap();
        assert_eq!(sensor.recorded_at, now - ChronoDuration::minutes(30));
    }

    #[tokio::test]
    async fn tips_by_category() {
        let pool = setup_pool().await;
        insert_tip(&pool, "cactus", "Almost never water in winter.").await.unwrap();
        let tip = random_tip(&pool, Some("cactus")).await.unwrap().unwrap();
        assert_eq!(tip.tip, "Almost never water in winter.");
        assert!(random_tip(&pool, Some("nothing-here")).await.unwrap().is_none());
        assert!(!list_tips(&pool, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sessions_follow_users() {
        let pool = setup_pool().await;
        let uid = upsert_user(&pool, "alice", "hash-1").await.unwrap();
        assert_eq!(upsert_user(&pool, "alice", "hash-2").await.unwrap(), uid);
        assert_eq!(find_user(&pool, "alice").await.unwrap().unwrap().password_hash, "hash-2");

        insert_session(&pool, "tok", uid).await.unwrap();
        assert_eq!(session_user(&pool, "tok", DAY).await.unwrap(), Some(uid));
        assert!(delete_session(&pool, "tok").await.unwrap());
        assert_eq!(session_user(&pool, "tok", DAY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn sessions_expire_after_max_age() {
        let pool = setup_pool().await;
        let uid = upsert_user(&pool, "bob", "hash").await.unwrap();
        insert_session(&pool, "old", uid).await.unwrap();
        insert_session(&pool, "fresh", uid).await.unwrap();
        sqlx::query("UPDATE sessions SET created_at = datetime('now', '-2 days') WHERE token = 'old'")
            .execute(&pool)
            .await
            .unwrap();

        assert_eq!(session_user(&pool, "old", DAY).await.unwrap(), None);
        assert_eq!(session_user(&pool, "fresh", DAY).await.unwrap(), Some(uid));
        assert_eq!(
            session_user(&pool, "old", Duration::from_secs(3 * 86_400)).await.unwrap(),
            Some(uid)
        );

        assert_eq!(delete_expired_sessions(&pool, DAY).await.unwrap(), 1);
        assert_eq!(session_user(&pool, "fresh", DAY).await.unwrap(), Some(uid));
    }

    #[tokio::test]
    async fn read_only_open_never_creates_files() {
        let td = tempfile::tempdir().unwrap();
        let missing = td.path().join("typo/home.db");
        let err = open_read_only(&format!("sqlite://{}", missing.display())).await.unwrap_err();
        assert!(err.to_string().contains("not found"));
        assert!(!missing.exists());
        assert!(!td.path().join("typo").exists());
        assert!(open_read_only("sqlite::memory:").await.is_err());

        let path = td.path().join("home.db");
        let url = format!("sqlite://{}", path.display());
        let writer = init_pool(&url).await.unwrap();
        run_migrations(&writer).await.unwrap();

        let reader = open_read_only(&url).await.unwrap();
        assert!(!list_plant_types(&reader).await.unwrap().is_empty());
        assert!(upsert_user(&reader, "eve", "hash").await.is_err());
    }
}
