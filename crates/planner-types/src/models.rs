use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Suffix the legacy client appends to a platoon name for its lieutenant.
const LIEUTENANT_SUFFIX: &str = "_Lieutenant";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platoon {
    Red,
    Green,
    Blue,
}

impl Platoon {
    pub const ALL: [Platoon; 3] = [Platoon::Red, Platoon::Green, Platoon::Blue];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platoon::Red => "Red",
            Platoon::Green => "Green",
            Platoon::Blue => "Blue",
        }
    }

    /// Parse either a base name (`"Red"`) or the legacy qualified form
    /// (`"Red_Lieutenant"`). Returns the base platoon and whether the
    /// lieutenant suffix was present. Only used on request input.
    pub fn parse_qualified(s: &str) -> Option<(Platoon, bool)> {
        match s.strip_suffix(LIEUTENANT_SUFFIX) {
            Some(base) => base.parse().ok().map(|p| (p, true)),
            None => s.parse().ok().map(|p| (p, false)),
        }
    }
}

impl fmt::Display for Platoon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown platoon '{0}'")]
pub struct UnknownPlatoon(pub String);

impl FromStr for Platoon {
    type Err = UnknownPlatoon;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platoon::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPlatoon(s.to_string()))
    }
}

/// A registered account. Never mutated after registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub platoon: Platoon,
    pub is_lieutenant: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn public(&self) -> PublicUser {
        PublicUser {
            username: self.username.clone(),
            platoon: self.platoon,
            is_lieutenant: self.is_lieutenant,
        }
    }
}

/// The only user view ever handed back to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub username: String,
    pub platoon: Platoon,
    pub is_lieutenant: bool,
}

/// A mission always belongs to a base platoon, never to a lieutenant variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mission {
    pub id: Uuid,
    pub platoon: Platoon,
    pub mission_type: String,
    pub description: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_base_names_exactly() {
        assert_eq!("Red".parse::<Platoon>(), Ok(Platoon::Red));
        assert_eq!("Blue".parse::<Platoon>(), Ok(Platoon::Blue));
        assert!("red".parse::<Platoon>().is_err());
        assert!("Purple".parse::<Platoon>().is_err());
        assert!("".parse::<Platoon>().is_err());
    }

    #[test]
    fn unknown_platoon_names_the_input() {
        let err = "Purple".parse::<Platoon>().unwrap_err();
        assert_eq!(err, UnknownPlatoon("Purple".into()));
        assert_eq!(err.to_string(), "unknown platoon 'Purple'");
    }

    #[test]
    fn parses_legacy_lieutenant_form() {
        assert_eq!(Platoon::parse_qualified("Green"), Some((Platoon::Green, false)));
        assert_eq!(
            Platoon::parse_qualified("Green_Lieutenant"),
            Some((Platoon::Green, true))
        );
        assert_eq!(Platoon::parse_qualified("Purple_Lieutenant"), None);
        assert_eq!(Platoon::parse_qualified("_Lieutenant"), None);
    }

    #[test]
    fn user_serialization_hides_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            username: "alice".into(),
            password_hash: "$argon2id$secret".into(),
            platoon: Platoon::Red,
            is_lieutenant: true,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["isLieutenant"], true);

        let public = serde_json::to_value(user.public()).unwrap();
        assert_eq!(
            public,
            serde_json::json!({ "username": "alice", "platoon": "Red", "isLieutenant": true })
        );
    }
}
