use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub isbn: Option<String>,
    pub published_year: Option<i32>,
    pub rating: Option<f64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Book {
    /// Looks up a field by its wire name, rendered the way it is sent on the
    /// wire. Unknown names yield `None`.
    pub fn text_field(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "id" => Some(Cow::Borrowed(&self.id)),
            "title" => Some(Cow::Borrowed(&self.title)),
            "author" => Some(Cow::Borrowed(&self.author)),
            "genre" => Some(Cow::Borrowed(&self.genre)),
            "description" => self.description.as_deref().map(Cow::Borrowed),
            "coverImage" => self.cover_image.as_deref().map(Cow::Borrowed),
            "isbn" => self.isbn.as_deref().map(Cow::Borrowed),
            "publishedYear" => self.published_year.map(|year| Cow::Owned(year.to_string())),
            "rating" => self.rating.map(|rating| Cow::Owned(rating.to_string())),
            "createdAt" => self.created_at.map(|at| Cow::Owned(at.to_rfc3339())),
            "updatedAt" => self.updated_at.map(|at| Cow::Owned(at.to_rfc3339())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReadingList {
    pub id: String,
    pub name: String,
    pub book_ids: Vec<String>,
}

/// Body of a reading list update: the full replacement identifier collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingListUpdate {
    pub book_ids: Vec<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub book_id: String,
    pub user_id: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub book_id: String,
    pub user_id: String,
    pub rating: u8,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    Title,
    Author,
    Rating,
    PublishedYear,
    /// Any other field name, compared lexicographically.
    #[serde(untagged)]
    Other(String),
}

impl SortKey {
    pub fn parse(value: &str) -> Self {
        match value {
            "title" => SortKey::Title,
            "author" => SortKey::Author,
            "rating" => SortKey::Rating,
            "publishedYear" => SortKey::PublishedYear,
            other => SortKey::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SortKey::Title => "title",
            SortKey::Author => "author",
            SortKey::Rating => "rating",
            SortKey::PublishedYear => "publishedYear",
            SortKey::Other(name) => name,
        }
    }
}
