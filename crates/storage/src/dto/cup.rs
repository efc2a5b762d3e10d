use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Cup;
use crate::services::CupRejection;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CupsResponse {
    pub year: i32,
    pub cups: Vec<Cup>,
    pub max_round: i32,
}

/// Result of an assign, unassign or reset
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CupActionResponse {
    pub applied: bool,
    pub cup: Option<Cup>,
    pub reason: Option<CupRejection>,
    pub state: CupsResponse,
}

impl CupActionResponse {
    pub fn from_result(result: Result<Cup, CupRejection>, state: CupsResponse) -> Self {
        match result {
            Ok(cup) => Self {
                applied: true,
                cup: Some(cup),
                reason: None,
                state,
            },
            Err(reason) => Self {
                applied: false,
                cup: None,
                reason: Some(reason),
                state,
            },
        }
    }
}
