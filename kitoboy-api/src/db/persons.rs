//! Person storage and search

use anyhow::Result;
use futures::TryStreamExt;
use kitoboy_common::models::{PersonRecord, StatusId};
use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use uuid::Uuid;

const PERSON_COLUMNS: &str = "id, surname, name, second_name, age, address, phone, organization, description, status_id";

#[derive(Debug, sqlx::FromRow)]
struct PersonRow {
    id: String,
    surname: String,
    name: String,
    second_name: String,
    age: String,
    address: String,
    phone: String,
    organization: String,
    description: String,
    status_id: Option<String>,
}

impl From<PersonRow> for PersonRecord {
    fn from(row: PersonRow) -> Self {
        PersonRecord {
            id: row.id,
            surname: row.surname,
            name: row.name,
            second_name: row.second_name,
            age: row.age,
            address: row.address,
            phone: row.phone,
            organization: row.organization,
            description: row.description,
            status_id: row.status_id,
        }
    }
}

impl PersonRow {
    fn matches(&self, needle: &str) -> bool {
        [&self.name, &self.surname, &self.second_name]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Editable person fields; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonFields {
    pub surname: Option<String>,
    pub name: Option<String>,
    pub second_name: Option<String>,
    pub age: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub organization: Option<String>,
    pub description: Option<String>,
}

impl PersonFields {
    /// Present fields as (column, value)
    pub fn columns(&self) -> Vec<(&'static str, &str)> {
        [
            ("surname", &self.surname),
            ("name", &self.name),
            ("second_name", &self.second_name),
            ("age", &self.age),
            ("address", &self.address),
            ("phone", &self.phone),
            ("organization", &self.organization),
            ("description", &self.description),
        ]
        .into_iter()
        .filter_map(|(column, value)| value.as_deref().map(|v| (column, v)))
        .collect()
    }
}

/// Insert a person with status `not_set`
pub async fn create_person(conn: &mut SqliteConnection, fields: &PersonFields) -> Result<String> {
    let id = Uuid::new_v4().to_string();

    let mut query = QueryBuilder::<Sqlite>::new("INSERT INTO persons (id, status_id");
    let columns = fields.columns();
    for (column, _) in &columns {
        query.push(", ").push(*column);
    }
    query.push(") VALUES (");
    let mut values = query.separated(", ");
    values.push_bind(id.clone());
    values.push_bind(StatusId::NotSet.as_str());
    for (_, value) in &columns {
        values.push_bind(value.trim().to_string());
    }
    values.push_unseparated(")");

    query.build().execute(conn).await?;

    Ok(id)
}

pub async fn find_person(pool: &SqlitePool, id: &str) -> Result<Option<PersonRecord>> {
    let row: Option<PersonRow> =
        sqlx::query_as(&format!("SELECT {} FROM persons WHERE id = ?", PERSON_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await?;

    Ok(row.map(PersonRecord::from))
}

pub async fn person_exists(conn: &mut SqliteConnection, id: &str) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM persons WHERE id = ?")
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(found.is_some())
}

/// Persons whose name, surname or second name contains `search`
///
/// Matching is case-insensitive for any script. A blank search returns the
/// newest persons.
pub async fn search_persons(pool: &SqlitePool, search: &str, limit: usize) -> Result<Vec<PersonRecord>> {
    let needle = search.trim().to_lowercase();
    let sql = format!(
        "SELECT {} FROM persons ORDER BY created_at DESC, rowid DESC",
        PERSON_COLUMNS
    );
    let mut rows = sqlx::query_as::<_, PersonRow>(&sql).fetch(pool);

    let mut found = Vec::new();
    while found.len() < limit {
        let Some(row) = rows.try_next().await? else {
            break;
        };
        if needle.is_empty() || row.matches(&needle) {
            found.push(PersonRecord::from(row));
        }
    }

    Ok(found)
}

/// Apply field changes; `None` when the person does not exist
pub async fn update_person(
    pool: &SqlitePool,
    id: &str,
    fields: &PersonFields,
) -> Result<Option<PersonRecord>> {
    let columns = fields.columns();
    if columns.is_empty() {
        return find_person(pool, id).await;
    }

    let mut query = QueryBuilder::<Sqlite>::new("UPDATE persons SET ");
    let mut assignments = query.separated(", ");
    for (column, value) in columns {
        assignments.push(format!("{} = ", column));
        assignments.push_bind_unseparated(value.to_string());
    }
    query.push(" WHERE id = ").push_bind(id.to_string());

    let result = query.build().execute(pool).await?;
    if result.rows_affected() == 0 {
        return Ok(None);
    }

    find_person(pool, id).await
}

/// Set the triage status; `None` when the person does not exist
pub async fn update_person_status(
    pool: &SqlitePool,
    id: &str,
    status_id: &str,
) -> Result<Option<PersonRecord>> {
    let result = sqlx::query("UPDATE persons SET status_id = ? WHERE id = ?")
        .bind(status_id)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    find_person(pool, id).await
}
