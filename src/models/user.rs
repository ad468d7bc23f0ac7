use serde::{Deserialize, Serialize};

use super::null_as_default;

/// Profile of the signed-in user, as persisted in the session file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub roles: Vec<String>,
    /// Cumulative points.
    #[serde(default, deserialize_with = "null_as_default")]
    pub score: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_color: Option<String>,
}

impl User {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|role| role == "ROLE_ADMIN")
    }
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// `data` of a successful login: the bearer token flattened with the profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub token: String,
    #[serde(rename = "type", default)]
    pub token_type: Option<String>,
    pub id: u64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub roles: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub score: u32,
}

impl AuthPayload {
    /// Split into the two values the session store keeps.
    pub fn into_session(self) -> (String, User) {
        let user = User {
            id: self.id,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            roles: self.roles,
            score: self.score,
            avatar_color: None,
        };
        (self.token, user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_payload_into_session() {
        let json = r#"{
            "token": "abc.def",
            "type": "Bearer",
            "id": 4,
            "email": "ada@example.com",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "roles": ["ROLE_USER"],
            "score": 120
        }"#;

        let payload: AuthPayload = serde_json::from_str(json).unwrap();
        let (token, user) = payload.into_session();
        assert_eq!(token, "abc.def");
        assert_eq!(user.display_name(), "Ada Lovelace");
        assert_eq!(user.score, 120);
        assert!(!user.is_admin());
    }

    #[test]
    fn test_login_payload_with_null_roles_and_score() {
        let json = r#"{
            "token": "t",
            "type": null,
            "id": 9,
            "email": "new@example.com",
            "firstName": "New",
            "lastName": "User",
            "roles": null,
            "score": null
        }"#;

        let payload: AuthPayload = serde_json::from_str(json).unwrap();
        assert!(payload.roles.is_empty());
        assert_eq!(payload.score, 0);
    }
}
