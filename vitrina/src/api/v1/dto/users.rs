use serde::Deserialize;
use validator::Validate;

use crate::models::UserUpdate;
use crate::services::NewUser;

/// Request body for `POST /v1/users`.
#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub surname: String,
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    /// Roles to grant. Defaults to the `buyer` role.
    #[serde(default)]
    pub role_ids: Vec<String>,
}

impl From<CreateUserRequest> for NewUser {
    fn from(req: CreateUserRequest) -> Self {
        Self {
            name: req.name,
            surname: req.surname,
            username: req.username,
            email: req.email,
            password: req.password,
            role_ids: req.role_ids,
        }
    }
}

/// Request body for `PATCH /v1/users/{userId}`. Absent fields are unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub surname: Option<String>,
    #[validate(length(min = 3, max = 50))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8))]
    pub password: Option<String>,
    /// Replaces the user's roles when present.
    pub role_ids: Option<Vec<String>>,
}

impl UpdateUserRequest {
    /// Split into the store update and the plain-text password, if any.
    pub fn into_parts(self) -> (UserUpdate, Option<String>) {
        let update = UserUpdate {
            name: self.name,
            surname: self.surname,
            username: self.username,
            email: self.email,
            password_hash: None,
            role_ids: self.role_ids,
        };
        (update, self.password)
    }
}
