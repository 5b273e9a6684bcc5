use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

pub type AuthorId = i32;
pub type UserId = i32;

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: AuthorId,
    pub name: Option<String>,
    pub num_of_books: Option<i32>,
    pub rating: Option<String>,
}

/// Author payload as supplied by a client, before the store assigns an id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorDraft {
    pub name: Option<String>,
    pub num_of_books: Option<i32>,
    pub rating: Option<String>,
}

impl AuthorDraft {
    pub fn with_id(self, id: AuthorId) -> Author {
        Author {
            id,
            name: self.name,
            num_of_books: self.num_of_books,
            rating: self.rating,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct GetAllAuthorsResponse {
    pub authors: Vec<Author>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct ProtectedResponse {
    pub username: String,
}

/// Error body returned on every failed request.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct ErrorBody {
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "Details", skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: Some(details.into()),
        }
    }
}
