use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The authenticated caller, resolved from the bearer token of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub role: Option<String>,
}

