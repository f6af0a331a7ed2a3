// Cursor-paginated listings - messages, publications and users
use crate::domain::lenient;
use chrono::{DateTime, Utc};
use url::Url;
use serde::{Deserialize, Serialize};

/// Server-authoritative page envelope. `next` / `previous` presence alone
/// gates navigation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CursorPage<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub count: u64,
}

impl<T> CursorPage<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }
}

/// Recovers the `page` query parameter from a cursor URL, absolute or
/// relative. A cursor with no readable `page` points at the first page.
pub fn page_from_cursor(cursor: &str) -> u32 {
    let Ok(base) = Url::parse("http://cursor.invalid/") else {
        return 1;
    };
    let Ok(url) = Url::options().base_url(Some(&base)).parse(cursor) else {
        return 1;
    };
    url.query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(1)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Case-insensitive match on name or email
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        let contains = |field: &Option<String>| {
            field
                .as_deref()
                .is_some_and(|value| value.to_lowercase().contains(&query))
        };
        contains(&self.full_name) || contains(&self.email)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PublicationAuthor {
    Profile { full_name: Option<String> },
    Name(String),
}

impl PublicationAuthor {
    pub fn display_name(&self) -> Option<&str> {
        match self {
            PublicationAuthor::Profile { full_name } => full_name.as_deref(),
            PublicationAuthor::Name(name) => Some(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: Option<PublicationAuthor>,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "lenient::optional_timestamp")]
    pub publication_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Publisher,
    Editor,
}

/// Body of a user update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserUpdate {
    pub full_name: String,
    pub role: UserRole,
}

/// Roles a sign-up passcode can grant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PasscodeRole {
    Admin,
    Publisher,
    #[default]
    Editor,
    Participant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passcode {
    #[serde(default)]
    pub id: Option<u64>,
    pub code: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_page_from_cursor() {
        assert_eq!(page_from_cursor("http://localhost:8000/api/publications/?page=3"), 3);
        assert_eq!(page_from_cursor("/publications/?format=json&page=12"), 12);
        assert_eq!(page_from_cursor("/publications/"), 1);
        assert_eq!(page_from_cursor("/publications/?page=abc"), 1);
        assert_eq!(page_from_cursor("http://h/api/publications/?page=4#top"), 4);
        assert_eq!(page_from_cursor("/publications/?q=a%26page%3D9&page=%35"), 5);
    }

    #[test]
    fn test_envelope_defaults() {
        let page: CursorPage<Message> = serde_json::from_str(r#"{"next": null}"#).unwrap();
        assert!(page.results.is_empty());
        assert!(!page.has_next());
        assert!(!page.has_previous());
        assert_eq!(page.count, 0);
    }

    #[test]
    fn test_message_search_on_name_or_email() {
        let message = Message {
            id: 1,
            full_name: Some("Chinwe Okafor".to_string()),
            email: Some("c.okafor@example.org".to_string()),
            text: None,
            created_at: None,
        };
        assert!(message.matches("OKAF"));
        assert!(message.matches("example.org"));
        assert!(message.matches(""));
        assert!(!message.matches("bello"));
    }

    #[test]
    fn test_publication_author_shapes() {
        let nested: Publication =
            serde_json::from_str(r#"{"id": 1, "author": {"full_name": "Ada"}}"#).unwrap();
        let flat: Publication = serde_json::from_str(r#"{"id": 2, "author": "Grace"}"#).unwrap();
        assert_eq!(nested.author.unwrap().display_name(), Some("Ada"));
        assert_eq!(flat.author.unwrap().display_name(), Some("Grace"));
    }

    #[test]
    fn test_passcode_decoding() {
        let passcode: Passcode =
            serde_json::from_str(r#"{"code": "7KQ2-M9XD", "role": "participant"}"#).unwrap();
        assert_eq!(passcode.code, "7KQ2-M9XD");
        assert_eq!(passcode.role.as_deref(), Some("participant"));
        assert_eq!(passcode.id, None);

        assert_eq!(PasscodeRole::default(), PasscodeRole::Editor);
        let role: PasscodeRole = serde_json::from_str(r#""participant""#).unwrap();
        assert_eq!(role, PasscodeRole::Participant);
    }

    #[test]
    fn test_dates_without_offset_still_decode() {
        let page: CursorPage<Publication> = serde_json::from_str(
            r#"{"count": 2, "results": [
                {"id": 1, "publication_date": "2025-03-14"},
                {"id": 2, "publication_date": "someday"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(
            page.results[0].publication_date,
            Some(Utc.with_ymd_and_hms(2025, 3, 14, 0, 0, 0).unwrap())
        );
        assert_eq!(page.results[1].publication_date, None);

        let message: Message =
            serde_json::from_str(r#"{"id": 3, "created_at": "2025-03-14 08:15:00"}"#).unwrap();
        assert_eq!(
            message.created_at,
            Some(Utc.with_ymd_and_hms(2025, 3, 14, 8, 15, 0).unwrap())
        );
    }
}
