use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Default)]
pub struct ProductListQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeletedRowsResponse {
    #[serde(rename = "deletedRows")]
    pub deleted_rows: u64,
}
