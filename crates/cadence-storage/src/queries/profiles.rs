// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Profile cache operations.

use cadence_core::CadenceError;
use rusqlite::{Row, params};

use crate::database::Database;
use crate::models::{Profile, json_column, to_json};

const COLUMNS: &str = "id, identifier, name, headline, role, company, location, industry, \
                       summary, data, source, created_at, updated_at";

fn row_to_profile(row: &Row<'_>) -> rusqlite::Result<Profile> {
    let data: String = row.get(9)?;
    Ok(Profile {
        id: row.get(0)?,
        identifier: row.get(1)?,
        name: row.get(2)?,
        headline: row.get(3)?,
        role: row.get(4)?,
        company: row.get(5)?,
        location: row.get(6)?,
        industry: row.get(7)?,
        summary: row.get(8)?,
        data: json_column(9, &data)?,
        source: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

fn select_by_identifier(
    conn: &rusqlite::Connection,
    identifier: &str,
) -> rusqlite::Result<Option<Profile>> {
    let sql = format!("SELECT {COLUMNS} FROM profiles WHERE identifier = ?1");
    match conn.query_row(&sql, params![identifier], row_to_profile) {
        Ok(profile) => Ok(Some(profile)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Look up a cached profile by its normalized identifier.
pub async fn get_profile_by_identifier(
    db: &Database,
    identifier: &str,
) -> Result<Option<Profile>, CadenceError> {
    let identifier = identifier.to_string();
    db.connection()
        .call(move |conn| select_by_identifier(conn, &identifier))
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert a profile unless its identifier is already cached, then return
/// whichever row is stored.
pub async fn insert_profile(db: &Database, profile: &Profile) -> Result<Profile, CadenceError> {
    let profile = profile.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO profiles (id, identifier, name, headline, role, company, location,
                     industry, summary, data, source, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                 ON CONFLICT(identifier) DO NOTHING",
                params![
                    profile.id,
                    profile.identifier,
                    profile.name,
                    profile.headline,
                    profile.role,
                    profile.company,
                    profile.location,
                    profile.industry,
                    profile.summary,
                    to_json(&profile.data)?,
                    profile.source,
                    profile.created_at,
                    profile.updated_at,
                ],
            )?;
            select_by_identifier(conn, &profile.identifier)?
                .ok_or(rusqlite::Error::QueryReturnedNoRows)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::fixtures::sample_profile;

    #[tokio::test]
    async fn insert_then_lookup() {
        let db = Database::open_in_memory().await.unwrap();
        let stored = insert_profile(&db, &sample_profile("p1", "dana-whitfield"))
            .await
            .unwrap();
        assert_eq!(stored.id, "p1");

        let found = get_profile_by_identifier(&db, "dana-whitfield")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.company, "Northwind");
        assert_eq!(found.data["experience"][0]["title"], "VP Engineering");

        assert!(get_profile_by_identifier(&db, "nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_identifier_returns_existing_row() {
        let db = Database::open_in_memory().await.unwrap();
        insert_profile(&db, &sample_profile("p1", "dana-whitfield"))
            .await
            .unwrap();

        let mut second = sample_profile("p2", "dana-whitfield");
        second.name = "Someone Else".to_string();
        let stored = insert_profile(&db, &second).await.unwrap();
        assert_eq!(stored.id, "p1");
        assert_eq!(stored.name, "Dana Whitfield");
    }
}
