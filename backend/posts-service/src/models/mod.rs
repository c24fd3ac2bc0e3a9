/// Data models for posts-service
///
/// - `Post`: the stored entity
/// - `PostId`: opaque identifier shared by every storage backend
/// - `PostDraft`: validated title/body pair handed to a repository
/// - `PostForm`: raw form input with validation rules
/// - `PageRequest` / `PostPage`: pagination
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use validator::Validate;

/// Maximum title length in characters
pub const TITLE_MAX_CHARS: u64 = 255;

/// Opaque post identifier.
///
/// Each backend keeps its native representation (push id, ObjectId hex,
/// integer key) as a string here and converts at the adapter boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PostId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for PostId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<i64> for PostId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Title and body that already passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub body: String,
}

impl PostDraft {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Form payload for create and update.
///
/// Missing fields deserialize as empty strings so they surface as field
/// errors instead of a rejected request. `_method` carries the HTML form
/// verb override (`PUT` / `DELETE`).
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PostForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 255))]
    pub title: String,

    #[serde(default)]
    #[validate(length(min = 1))]
    pub body: String,

    #[serde(default, rename = "_method")]
    pub method: Option<String>,
}

/// Field name to human readable message
pub type FieldErrors = BTreeMap<&'static str, String>;

impl PostForm {
    /// Trim surrounding whitespace so blank input counts as missing.
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            body: self.body.trim().to_string(),
            method: self.method,
        }
    }

    /// Validate and convert into a draft, or return per-field messages.
    pub fn into_draft(self) -> Result<PostDraft, FieldErrors> {
        let form = self.normalized();
        match form.validate() {
            Ok(()) => Ok(PostDraft {
                title: form.title,
                body: form.body,
            }),
            Err(errors) => {
                let fields = errors.field_errors();
                let mut messages = FieldErrors::new();
                if fields.contains_key("title") {
                    let message = if form.title.is_empty() {
                        required_message("title")
                    } else {
                        format!(
                            "The title field must not be greater than {} characters.",
                            TITLE_MAX_CHARS
                        )
                    };
                    messages.insert("title", message);
                }
                if fields.contains_key("body") {
                    messages.insert("body", required_message("body"));
                }
                Err(messages)
            }
        }
    }
}

fn required_message(field: &str) -> String {
    format!("The {} field is required.", field)
}

/// 1-based page selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Rows to skip; capped at `i64::MAX` since drivers encode it signed
    pub fn offset(&self) -> u64 {
        (self.page - 1)
            .saturating_mul(self.per_page)
            .min(i64::MAX as u64)
    }

    /// Cut one page out of an already ordered full listing.
    pub fn slice(self, items: Vec<Post>) -> PostPage {
        let total = items.len() as u64;
        let offset = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        let per_page = usize::try_from(self.per_page).unwrap_or(usize::MAX);
        let items = items.into_iter().skip(offset).take(per_page).collect();
        PostPage {
            items,
            page: self.page,
            per_page: self.per_page,
            total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostPage {
    pub items: Vec<Post>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
}

impl PostPage {
    pub fn last_page(&self) -> u64 {
        self.total.div_ceil(self.per_page).max(1)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.last_page()
    }
}
