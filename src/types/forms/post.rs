use validator::{extras::validate_length, Validate, ValidateError};

use super::{CONTENT_MAX, CONTENT_MIN, TITLE_MAX, TITLE_MIN};
use crate::types::{PostPayload, PostWithVotes};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostForm {
    pub title: String,
    pub content: String,
    pub published: bool,
}

impl PostForm {
    /// New posts are published unless the author asks otherwise.
    #[must_use]
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            published: true,
        }
    }

    /// Prefills the form from an existing post, for editing.
    #[must_use]
    pub fn from_existing(post: &PostWithVotes) -> Self {
        Self {
            title: post.post.title.clone(),
            content: post.post.content.clone(),
            published: post.post.published,
        }
    }

    #[must_use]
    pub fn into_payload(self) -> PostPayload {
        PostPayload {
            title: self.title,
            content: self.content,
            published: Some(self.published),
        }
    }
}

impl Validate for PostForm {
    fn validate(&self) -> Result<(), ValidateError> {
        let mut fields = ValidateError::field_builder();
        fields.insert("title", {
            let mut error = ValidateError::msg_builder();
            if !validate_length(&self.title, Some(TITLE_MIN), None) {
                error.insert("Title must be at least 3 characters");
            } else if !validate_length(&self.title, None, Some(TITLE_MAX)) {
                error.insert("Title must be less than 100 characters");
            }
            error.build()
        });
        fields.insert("content", {
            let mut error = ValidateError::msg_builder();
            if !validate_length(&self.content, Some(CONTENT_MIN), None) {
                error.insert("Content must be at least 10 characters");
            } else if !validate_length(&self.content, None, Some(CONTENT_MAX)) {
                error.insert("Content must be less than 5000 characters");
            }
            error.build()
        });
        fields.build().into_result()
    }
}
