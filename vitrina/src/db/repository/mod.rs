mod access;
mod favorites;
mod purchases;
mod sessions;
mod users;

pub use access::AccessRepository;
pub use favorites::FavoriteRepository;
pub use purchases::PurchaseRepository;
pub use sessions::SessionRepository;
pub use users::UserRepository;

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use libsql::Connection;

use crate::error::{Result, VitrinaError};
use crate::models::{RecordGroup, MAX_RATING};

/// Fixed-width RFC 3339 so that stored timestamps sort lexicographically.
pub(crate) fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// `?start, ?start+1, ...` for an IN list of `count` values.
pub(crate) fn placeholders(start: usize, count: usize) -> String {
    let mut out = String::new();
    for i in 0..count {
        if i > 0 {
            out.push_str(", ");
        }
        out.push('?');
        out.push_str(&(start + i).to_string());
    }
    out
}

pub(crate) fn text_values(values: &[String]) -> Vec<libsql::Value> {
    values
        .iter()
        .map(|v| libsql::Value::from(v.clone()))
        .collect()
}

pub(crate) fn stored_quantity(raw: i64) -> Result<u32> {
    u32::try_from(raw)
        .ok()
        .filter(|q| *q > 0)
        .ok_or_else(|| VitrinaError::Internal(format!("Stored quantity out of range: {raw}")))
}

pub(crate) fn stored_rating(raw: i64) -> Result<u8> {
    u8::try_from(raw)
        .ok()
        .filter(|r| *r <= MAX_RATING)
        .ok_or_else(|| VitrinaError::Internal(format!("Stored rating out of range: {raw}")))
}

/// Turn a UNIQUE violation into `Conflict`; other errors pass through.
pub(crate) fn conflict_on_unique(err: libsql::Error, what: &str) -> VitrinaError {
    if err.to_string().contains("UNIQUE constraint failed") {
        VitrinaError::Conflict(format!("{what} already exists"))
    } else {
        VitrinaError::Database(err)
    }
}

/// Run a `SELECT key, COUNT(*) ... LIMIT ?1` query and return empty groups in
/// ranking order.
pub(crate) async fn ranked_groups<T>(
    conn: &Connection,
    sql: &str,
    limit: u32,
) -> Result<Vec<RecordGroup<T>>> {
    let mut rows = conn.query(sql, libsql::params![i64::from(limit)]).await?;

    let mut groups = Vec::new();
    while let Some(row) = rows.next().await? {
        let count: i64 = row.get(1)?;
        groups.push(RecordGroup {
            key: row.get(0)?,
            count: u32::try_from(count).unwrap_or(u32::MAX),
            items: Vec::new(),
        });
    }
    Ok(groups)
}

/// Distribute already-ordered records into their groups, keeping record order.
pub(crate) fn fill_groups<T>(
    groups: &mut [RecordGroup<T>],
    records: Vec<T>,
    key_of: impl Fn(&T) -> &str,
) {
    let index: HashMap<String, usize> = groups
        .iter()
        .enumerate()
        .map(|(i, g)| (g.key.clone(), i))
        .collect();

    for record in records {
        if let Some(&i) = index.get(key_of(&record)) {
            groups[i].items.push(record);
        }
    }
}
