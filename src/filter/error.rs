use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid sort column: {0}")]
    InvalidSortColumn(String),

    #[error("Invalid sort direction: {0}")]
    InvalidSortDirection(String),

    #[error("Invalid page size: {0}")]
    InvalidPageSize(i64),

    #[error("Invalid page index: {0}")]
    InvalidPageIndex(i64),
}
