use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid page: {0}")]
    InvalidPage(String),

    #[error("Invalid pageSize: {0}")]
    InvalidPageSize(String),

    #[error("Invalid sortBy: {0}")]
    InvalidSortField(String),

    #[error("Invalid sortOrder: {0}")]
    InvalidSortOrder(String),
}
