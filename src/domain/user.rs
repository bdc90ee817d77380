// ==========================================
// Civic Escalation - User Domain Model
// ==========================================
// One `user` table with a `type` discriminator. The variant-specific
// data lives on `Role`, capability checks are plain matches.
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Role - user variant
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Role {
    /// Authors posts and files requests
    Regular,
    /// Receives user requests and promotes them to a board
    Representative,
    /// Member of exactly one board
    BoardMember { board_id: i64 },
}

impl Role {
    /// Value of the `type` discriminator column
    pub fn type_str(&self) -> &'static str {
        match self {
            Role::Regular => "user",
            Role::Representative => "representative",
            Role::BoardMember { .. } => "board_member",
        }
    }

    /// Rebuild the role from the discriminator and the nullable board_id
    pub fn from_db(type_str: &str, board_id: Option<i64>) -> Option<Self> {
        match (type_str, board_id) {
            ("user", _) => Some(Role::Regular),
            ("representative", _) => Some(Role::Representative),
            ("board_member", Some(board_id)) => Some(Role::BoardMember { board_id }),
            _ => None,
        }
    }

    pub fn board_id(&self) -> Option<i64> {
        match self {
            Role::BoardMember { board_id } => Some(*board_id),
            _ => None,
        }
    }
}

// ==========================================
// User
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub alternative_id: String, // externally visible, stable
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub profession: String,
    pub age: Option<i32>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub registered_at: NaiveDateTime,
    pub role: Role,
}

impl User {
    pub fn is_representative(&self) -> bool {
        matches!(self.role, Role::Representative)
    }

    pub fn is_board_member(&self) -> bool {
        matches!(self.role, Role::BoardMember { .. })
    }

    /// Short public card used in request summaries
    pub fn short_info(&self) -> UserShortInfo {
        UserShortInfo {
            full_name: self.full_name.clone(),
            username: self.username.clone(),
            alternative_id: self.alternative_id.clone(),
        }
    }
}

/// Insert payload for a user. The credential hash comes from the auth collaborator.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub profession: String,
    pub age: Option<i32>,
    pub password_hash: String,
    pub role: Role,
}

impl NewUser {
    pub fn new(
        full_name: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
        profession: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            username: username.into(),
            email: email.into(),
            profession: profession.into(),
            age: None,
            password_hash: String::new(),
            role,
        }
    }

    pub fn with_age(mut self, age: i32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_password_hash(mut self, hash: impl Into<String>) -> Self {
        self.password_hash = hash.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserShortInfo {
    pub full_name: String,
    pub username: String,
    pub alternative_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_db_round_trip() {
        for role in [
            Role::Regular,
            Role::Representative,
            Role::BoardMember { board_id: 7 },
        ] {
            assert_eq!(Role::from_db(role.type_str(), role.board_id()), Some(role));
        }
    }

    #[test]
    fn test_board_member_requires_board() {
        assert_eq!(Role::from_db("board_member", None), None);
        assert_eq!(Role::from_db("admin", Some(1)), None);
    }

    #[test]
    fn test_short_info_hides_credentials() {
        let new_user = NewUser::new("Max Planck", "mplanck", "mplanck@example.org", "scientist", Role::Regular)
            .with_age(167)
            .with_password_hash("$argon2id$stub");
        let user = User {
            id: 1,
            alternative_id: "a-1".to_string(),
            full_name: new_user.full_name,
            username: new_user.username,
            email: new_user.email,
            profession: new_user.profession,
            age: new_user.age,
            password_hash: new_user.password_hash,
            registered_at: chrono::Utc::now().naive_utc(),
            role: new_user.role,
        };

        let card = user.short_info();
        assert_eq!(card.username, "mplanck");
        assert_eq!(card.alternative_id, "a-1");

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"]["type"], "regular");
    }
}
