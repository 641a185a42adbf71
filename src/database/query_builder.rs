use sqlx::postgres::PgArguments;
use sqlx::{FromRow, Postgres};

use crate::contact::{Contact, ContactPatch};
use crate::database::schema::CONTACTS_TABLE;
use crate::filter::{SqlParam, SqlResult};

/// Dynamic `UPDATE` over only the columns a patch touches
pub struct UpdateBuilder {
    assignments: Vec<(&'static str, SqlParam)>,
}

impl UpdateBuilder {
    pub fn from_patch(patch: &ContactPatch) -> Self {
        let mut assignments = Vec::new();

        if let Some(v) = &patch.first_name {
            assignments.push(("first_name", SqlParam::Text(Some(v.clone()))));
        }
        if let Some(v) = &patch.last_name {
            assignments.push(("last_name", SqlParam::Text(Some(v.clone()))));
        }
        if let Some(email) = &patch.email {
            assignments.push(("email_primary", SqlParam::Text(Some(email.primary.clone()))));
            assignments.push(("email_secondary", SqlParam::Text(email.secondary.clone())));
        }
        if let Some(v) = &patch.phones {
            assignments.push(("phones", SqlParam::Json(serde_json::to_value(v).ok())));
        }
        if let Some(v) = &patch.address {
            assignments.push(("address", SqlParam::Json(v.as_ref().and_then(|a| serde_json::to_value(a).ok()))));
        }
        if let Some(v) = &patch.company {
            assignments.push(("company", SqlParam::Json(v.as_ref().and_then(|c| serde_json::to_value(c).ok()))));
        }
        if let Some(v) = &patch.project_ids {
            assignments.push(("project_ids", SqlParam::TextArray(v.clone())));
        }
        if let Some(v) = &patch.opportunity_ids {
            assignments.push(("opportunity_ids", SqlParam::TextArray(v.clone())));
        }
        if let Some(v) = &patch.tags {
            assignments.push(("tags", SqlParam::TextArray(v.clone())));
        }

        Self { assignments }
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn columns(&self) -> Vec<&'static str> {
        self.assignments.iter().map(|(c, _)| *c).collect()
    }

    /// `UPDATE … SET … WHERE id AND created_by RETURNING *`
    pub fn to_sql(&self, owner: &str, id: &str) -> SqlResult {
        let mut params = Vec::with_capacity(self.assignments.len() + 2);
        let mut sets = Vec::with_capacity(self.assignments.len() + 1);

        for (column, value) in &self.assignments {
            params.push(value.clone());
            sets.push(format!("\"{}\" = ${}", column, params.len()));
        }
        sets.push("\"updated_at\" = NOW()".to_string());

        params.push(SqlParam::Text(Some(id.to_string())));
        let id_param = params.len();
        params.push(SqlParam::Text(Some(owner.to_string())));
        let owner_param = params.len();

        SqlResult {
            query: format!(
                "UPDATE \"{}\" SET {} WHERE \"id\" = ${} AND \"created_by\" = ${} RETURNING *",
                CONTACTS_TABLE,
                sets.join(", "),
                id_param,
                owner_param
            ),
            params,
        }
    }
}

/// Full-row `INSERT … RETURNING *`
pub fn insert_sql(contact: &Contact) -> SqlResult {
    let columns = [
        "id",
        "first_name",
        "last_name",
        "email_primary",
        "email_secondary",
        "phones",
        "address",
        "company",
        "project_ids",
        "opportunity_ids",
        "tags",
        "created_by",
    ];
    let params = vec![
        SqlParam::Text(Some(contact.id.clone())),
        SqlParam::Text(Some(contact.first_name.clone())),
        SqlParam::Text(Some(contact.last_name.clone())),
        SqlParam::Text(Some(contact.email_primary.clone())),
        SqlParam::Text(contact.email_secondary.clone()),
        SqlParam::Json(serde_json::to_value(&contact.phones).ok()),
        SqlParam::Json(contact.address.as_ref().and_then(|a| serde_json::to_value(a).ok())),
        SqlParam::Json(contact.company.as_ref().and_then(|c| serde_json::to_value(c).ok())),
        SqlParam::TextArray(contact.project_ids.clone()),
        SqlParam::TextArray(contact.opportunity_ids.clone()),
        SqlParam::TextArray(contact.tags.clone()),
        SqlParam::Text(Some(contact.created_by.clone())),
    ];
    let placeholders: Vec<String> = (1..=params.len()).map(|i| format!("${}", i)).collect();

    SqlResult {
        query: format!(
            "INSERT INTO \"{}\" ({}) VALUES ({}) RETURNING *",
            CONTACTS_TABLE,
            columns.iter().map(|c| format!("\"{}\"", c)).collect::<Vec<_>>().join(", "),
            placeholders.join(", ")
        ),
        params,
    }
}

pub fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, Postgres, PgArguments>,
    v: &SqlParam,
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    match v {
        SqlParam::Text(s) => q.bind(s.clone()),
        SqlParam::TextArray(a) => q.bind(a.clone()),
        SqlParam::Json(j) => q.bind(j.clone()),
    }
}

pub fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, Postgres, O, PgArguments>,
    v: &SqlParam,
) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    match v {
        SqlParam::Text(s) => q.bind(s.clone()),
        SqlParam::TextArray(a) => q.bind(a.clone()),
        SqlParam::Json(j) => q.bind(j.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn update_sets_only_patched_columns() {
        let patch: ContactPatch = serde_json::from_value(json!({
            "firstName": "Alan",
            "company": null,
            "tags": ["math"]
        }))
        .unwrap();

        let builder = UpdateBuilder::from_patch(&patch);
        assert_eq!(builder.columns(), vec!["first_name", "company", "tags"]);

        let sql = builder.to_sql("user-9", "c42");
        assert_eq!(
            sql.query,
            "UPDATE \"contacts\" SET \"first_name\" = $1, \"company\" = $2, \"tags\" = $3, \"updated_at\" = NOW() \
             WHERE \"id\" = $4 AND \"created_by\" = $5 RETURNING *"
        );
        assert_eq!(sql.params[1], SqlParam::Json(None));
        assert_eq!(sql.params[3], SqlParam::Text(Some("c42".into())));
        assert_eq!(sql.params[4], SqlParam::Text(Some("user-9".into())));
    }

    #[test]
    fn email_patch_replaces_both_addresses() {
        let patch: ContactPatch = serde_json::from_value(json!({
            "email": { "primary": "new@example.com" }
        }))
        .unwrap();
        let builder = UpdateBuilder::from_patch(&patch);
        assert_eq!(builder.columns(), vec!["email_primary", "email_secondary"]);
    }

    #[test]
    fn empty_patch_has_no_assignments() {
        assert!(UpdateBuilder::from_patch(&ContactPatch::default()).is_empty());
    }

    #[test]
    fn insert_binds_every_column() {
        let input = serde_json::from_value(json!({
            "firstName": "Alan",
            "lastName": "Turing",
            "email": { "primary": "alan@example.com" },
            "phones": [{ "type": "home", "number": "+4-420-555-0101", "primary": true }]
        }))
        .unwrap();
        let contact = Contact::from_input(input, "user-1");
        let sql = insert_sql(&contact);
        assert_eq!(sql.params.len(), 12);
        assert!(sql.query.ends_with("VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING *"));
        assert_eq!(sql.params[11], SqlParam::Text(Some("user-1".into())));
        assert_eq!(
            sql.params[5],
            SqlParam::Json(Some(json!([{ "type": "home", "number": "+4-420-555-0101", "primary": true }])))
        );
    }
}
