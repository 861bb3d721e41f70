use serde::{Deserialize, Serialize};

/// Identity assertion payload carried by every admin token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i32,
    pub username: String,
    pub role_id: i32,
    pub role_name: String,
    pub exp: i64, // expiration, unix seconds
    pub iat: i64, // issued at, unix seconds
}

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: i32,
    pub username: String,
    pub role_id: i32,
    pub role_name: String,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.user_id,
            username: claims.username,
            role_id: claims.role_id,
            role_name: claims.role_name,
        }
    }
}
