use super::types::{ContactQuery, SqlParam};

/// Accumulates WHERE conditions and their numbered parameters
pub struct FilterWhere {
    param_values: Vec<SqlParam>,
    conditions: Vec<String>,
}

impl FilterWhere {
    pub fn new() -> Self {
        Self {
            param_values: vec![],
            conditions: vec![],
        }
    }

    /// Owner scope plus every filter present on the query
    pub fn generate(owner: &str, query: &ContactQuery) -> (String, Vec<SqlParam>) {
        let mut filter_where = Self::new();

        let p = filter_where.param(SqlParam::Text(Some(owner.to_string())));
        filter_where.conditions.push(format!("\"created_by\" = {}", p));

        if let Some(v) = &query.first_name {
            filter_where.contains("\"first_name\"", v);
        }
        if let Some(v) = &query.last_name {
            filter_where.contains("\"last_name\"", v);
        }
        if let Some(v) = &query.email {
            filter_where.contains("\"email_primary\"", v);
        }
        if let Some(v) = &query.company {
            filter_where.contains("(\"company\"->>'name')", v);
        }
        if !query.tags.is_empty() {
            let p = filter_where.param(SqlParam::TextArray(Some(query.tags.clone())));
            filter_where.conditions.push(format!("\"tags\" && {}", p));
        }

        (filter_where.conditions.join(" AND "), filter_where.param_values)
    }

    fn contains(&mut self, column: &str, needle: &str) {
        let p = self.param(SqlParam::Text(Some(format!("%{}%", escape_like(needle)))));
        self.conditions.push(format!("{} ILIKE {}", column, p));
    }

    fn param(&mut self, value: SqlParam) -> String {
        self.param_values.push(value);
        format!("${}", self.param_values.len())
    }
}

impl Default for FilterWhere {
    fn default() -> Self {
        Self::new()
    }
}

/// Escape LIKE wildcards so user input matches literally
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
