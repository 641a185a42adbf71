use serde::{Deserialize, Serialize};

use super::error::FilterError;
use crate::config::ApiConfig;

/// Raw `GET /api/contacts` query string
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub tags: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    fn parse(s: &str) -> Result<Self, FilterError> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(FilterError::InvalidSortOrder(format!("'{}' (expected asc or desc)", s))),
        }
    }
}

/// Columns a list may be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    FirstName,
    LastName,
    Email,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::FirstName => "first_name",
            SortField::LastName => "last_name",
            SortField::Email => "email_primary",
        }
    }

    fn parse(s: &str) -> Result<Self, FilterError> {
        match s {
            "createdAt" | "created_at" => Ok(SortField::CreatedAt),
            "updatedAt" | "updated_at" => Ok(SortField::UpdatedAt),
            "firstName" | "first_name" => Ok(SortField::FirstName),
            "lastName" | "last_name" => Ok(SortField::LastName),
            "email" => Ok(SortField::Email),
            other => Err(FilterError::InvalidSortField(format!(
                "'{}' (expected createdAt, updatedAt, firstName, lastName or email)",
                other
            ))),
        }
    }
}

/// A parsed, bounded list request
#[derive(Debug, Clone, PartialEq)]
pub struct ContactQuery {
    pub page: u32,
    pub page_size: u32,
    pub sort: SortField,
    pub order: SortDirection,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub tags: Vec<String>,
}

impl ContactQuery {
    pub fn from_params(params: ListParams, api: &ApiConfig) -> Result<Self, FilterError> {
        let page = match non_empty(params.page) {
            Some(raw) => match raw.parse::<u32>() {
                Ok(0) | Err(_) => return Err(FilterError::InvalidPage(format!("'{}' (must be a positive integer)", raw))),
                Ok(n) => n,
            },
            None => 1,
        };

        let requested_size = match non_empty(params.page_size) {
            Some(raw) => match raw.parse::<u32>() {
                Ok(0) | Err(_) => {
                    return Err(FilterError::InvalidPageSize(format!("'{}' (must be a positive integer)", raw)))
                }
                Ok(n) => n,
            },
            None => api.default_page_size,
        };
        let max_page_size = api.max_page_size.max(1);
        let page_size = if requested_size > max_page_size {
            tracing::debug!("pageSize {} exceeds max {}, capping", requested_size, max_page_size);
            max_page_size
        } else {
            requested_size.max(1)
        };

        let sort = match non_empty(params.sort_by) {
            Some(raw) => SortField::parse(&raw)?,
            None => SortField::CreatedAt,
        };
        let order = match non_empty(params.sort_order) {
            Some(raw) => SortDirection::parse(&raw)?,
            None => SortDirection::Desc,
        };

        let tags = params
            .tags
            .map(|raw| {
                raw.split(',')
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            page,
            page_size,
            sort,
            order,
            first_name: non_empty(params.first_name),
            last_name: non_empty(params.last_name),
            email: non_empty(params.email),
            company: non_empty(params.company),
            tags,
        })
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        let size = i64::from(self.page_size);
        if size == 0 {
            return 0;
        }
        (total + size - 1) / size
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Bind value for a composed statement
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(Option<String>),
    TextArray(Option<Vec<String>>),
    Json(Option<serde_json::Value>),
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}
