use std::fmt;
use serde::{Deserialize, Serialize};

pub type UserId = i64;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Customer,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Customer => write!(f, "CUSTOMER"),
            Role::Admin => write!(f, "ADMIN"),
        }
    }
}

/// Identity returned by register/login. This is all the session ever holds.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub role: Role,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_customer(&self) -> bool {
        self.role == Role::Customer
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_response_without_email_still_parses() {
        let user: User = serde_json::from_str(r#"{"id":1,"name":"A","role":"CUSTOMER"}"#).unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.email, "");
        assert!(user.is_customer());
        assert!(!user.is_admin());
    }

    #[test]
    fn unknown_role_is_rejected() {
        let parsed = serde_json::from_str::<User>(r#"{"id":1,"name":"A","role":"OWNER"}"#);
        assert!(parsed.is_err());
    }
}
