//! Domain view models
//!
//! These are the JSON shapes exchanged with the operator UI. Field names
//! are camelCase on the wire.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Classification label assigned to a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: String,
    pub name: String,
    /// Display color (hex), empty when unset
    #[serde(default)]
    pub color: String,
}

/// Triage status identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusId {
    Suicide,
    AntiSuicide,
    NeedsAttention,
    NotSet,
}

impl StatusId {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusId::Suicide => "suicide",
            StatusId::AntiSuicide => "anti_suicide",
            StatusId::NeedsAttention => "needs_attention",
            StatusId::NotSet => "not_set",
        }
    }
}

impl fmt::Display for StatusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusId {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim() {
            "suicide" => Ok(StatusId::Suicide),
            "anti_suicide" => Ok(StatusId::AntiSuicide),
            "needs_attention" => Ok(StatusId::NeedsAttention),
            "not_set" => Ok(StatusId::NotSet),
            other => Err(crate::Error::InvalidInput(format!("Unknown status: {}", other))),
        }
    }
}

/// Triage status row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: String,
}

/// Statuses seeded into a fresh database: (id, name, color)
pub const DEFAULT_STATUSES: [(StatusId, &str, &str); 3] = [
    (StatusId::Suicide, "Опасный", "#FFBC42"),
    (StatusId::AntiSuicide, "Безопасный", "#319795"),
    (StatusId::NotSet, "Статус не задан", "#FFF"),
];

/// Stored post as returned by the classifier callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub text: String,
    pub posted_at: String,
    pub avatar_id: String,
}

/// Post with its attribute set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: String,
    pub text: String,
    /// Raw ISO-8601 timestamp as imported; may be unparseable
    pub posted_at: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl PostView {
    pub fn has_attribute(&self, attribute_id: &str) -> bool {
        self.attributes.iter().any(|a| a.id == attribute_id)
    }
}

/// Short person block embedded in avatar views
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonSummary {
    pub id: String,
    pub surname: String,
    pub name: String,
    #[serde(default)]
    pub second_name: String,
    #[serde(default)]
    pub age: String,
}

impl PersonSummary {
    /// "Surname Name SecondName", or empty when both surname and name are blank
    pub fn full_name(&self) -> String {
        if self.surname.is_empty() && self.name.is_empty() {
            return String::new();
        }

        [self.surname.as_str(), self.name.as_str(), self.second_name.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Full person row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRecord {
    pub id: String,
    pub surname: String,
    pub name: String,
    pub second_name: String,
    pub age: String,
    pub address: String,
    pub phone: String,
    pub organization: String,
    pub description: String,
    pub status_id: Option<String>,
}

impl PersonRecord {
    pub fn summary(&self) -> PersonSummary {
        PersonSummary {
            id: self.id.clone(),
            surname: self.surname.clone(),
            name: self.name.clone(),
            second_name: self.second_name.clone(),
            age: self.age.clone(),
        }
    }
}

/// Avatar row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarRecord {
    pub id: String,
    pub username: String,
    pub url: String,
    pub person_id: Option<String>,
    pub status_id: Option<String>,
}

/// Avatar with person, status and posts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarView {
    pub id: String,
    pub username: String,
    pub url: String,
    pub person: Option<PersonSummary>,
    pub status: Option<Status>,
    pub posts: Vec<PostView>,
}

impl AvatarView {
    /// Unique attributes across all posts, in first-seen order
    pub fn distinct_attributes(&self) -> Vec<Attribute> {
        let mut seen = HashSet::new();
        self.posts
            .iter()
            .flat_map(|post| post.attributes.iter())
            .filter(|attribute| seen.insert(attribute.id.as_str()))
            .cloned()
            .collect()
    }

    pub fn without_person(self) -> AvatarSummary {
        AvatarSummary {
            id: self.id,
            username: self.username,
            url: self.url,
            status: self.status,
            posts: self.posts,
        }
    }
}

/// Avatar as nested under its person
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarSummary {
    pub id: String,
    pub username: String,
    pub url: String,
    pub status: Option<Status>,
    pub posts: Vec<PostView>,
}

/// Person with status and all linked avatars
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonWithAvatarsView {
    pub id: String,
    pub surname: String,
    pub name: String,
    pub second_name: String,
    pub age: String,
    pub address: String,
    pub phone: String,
    pub organization: String,
    pub description: String,
    pub status: Option<Status>,
    pub avatars: Vec<AvatarSummary>,
}
