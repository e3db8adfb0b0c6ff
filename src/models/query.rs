use serde::Deserialize;

/// Page selector for the post listings; pages are 1-based.
#[derive(Debug, Default, Deserialize)]
pub struct PageQueryDto {
    pub page: Option<i64>,
}
