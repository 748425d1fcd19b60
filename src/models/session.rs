use serde::{Deserialize, Serialize};

/// Identity the auth gateway vouched for on the current request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
}

/// Body posted to the gateway's login endpoint.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}
