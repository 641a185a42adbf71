use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{ContactQuery, SqlResult};
use crate::database::schema::CONTACTS_TABLE;

/// Composes the page and count statements for one owner's list request
pub struct Filter<'a> {
    owner: &'a str,
    query: &'a ContactQuery,
}

impl<'a> Filter<'a> {
    pub fn new(owner: &'a str, query: &'a ContactQuery) -> Self {
        Self { owner, query }
    }

    pub fn to_sql(&self) -> SqlResult {
        let (where_clause, params) = FilterWhere::generate(self.owner, self.query);
        let order_clause = FilterOrder::generate(self.query.sort, self.query.order);
        let limit_clause = format!("LIMIT {} OFFSET {}", self.query.page_size, self.query.offset());

        let query = [
            "SELECT *".to_string(),
            format!("FROM \"{}\"", CONTACTS_TABLE),
            format!("WHERE {}", where_clause),
            order_clause,
            limit_clause,
        ]
        .join(" ");

        SqlResult { query, params }
    }

    pub fn to_count_sql(&self) -> SqlResult {
        let (where_clause, params) = FilterWhere::generate(self.owner, self.query);
        SqlResult {
            query: format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", CONTACTS_TABLE, where_clause),
            params,
        }
    }
}
