//! Outgoing payloads.

use bytes::Bytes;
use serde::Serialize;

use crate::traits::{FormPart, RequestBody};

/// Image attached to a post, comment or profile photo upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAttachment {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl ImageAttachment {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    fn to_part(&self, field: &str) -> FormPart {
        FormPart::File {
            name: field.to_string(),
            file_name: self.file_name.clone(),
            content_type: self.content_type.clone(),
            data: self.data.clone(),
        }
    }
}

/// Create/update payload for a post.
#[derive(Debug, Clone, PartialEq)]
pub struct PostForm {
    pub body: String,
    pub image: Option<ImageAttachment>,
}

impl PostForm {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            image: None,
        }
    }

    pub fn with_image(mut self, image: ImageAttachment) -> Self {
        self.image = Some(image);
        self
    }

    /// Trimmed body text.
    pub fn trimmed_body(&self) -> &str {
        self.body.trim()
    }

    /// A post needs text or an image.
    pub fn is_empty(&self) -> bool {
        self.trimmed_body().is_empty() && self.image.is_none()
    }

    pub fn to_body(&self) -> RequestBody {
        let mut parts = vec![FormPart::Text {
            name: "body".to_string(),
            value: self.trimmed_body().to_string(),
        }];
        if let Some(image) = &self.image {
            parts.push(image.to_part("image"));
        }
        RequestBody::Multipart(parts)
    }
}

/// Create/update payload for a comment or reply.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentForm {
    pub content: String,
    pub image: Option<ImageAttachment>,
}

impl CommentForm {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            image: None,
        }
    }

    pub fn with_image(mut self, image: ImageAttachment) -> Self {
        self.image = Some(image);
        self
    }

    pub fn trimmed_content(&self) -> &str {
        self.content.trim()
    }

    pub fn is_empty(&self) -> bool {
        self.trimmed_content().is_empty() && self.image.is_none()
    }

    pub fn to_body(&self) -> RequestBody {
        let mut parts = vec![FormPart::Text {
            name: "content".to_string(),
            value: self.trimmed_content().to_string(),
        }];
        if let Some(image) = &self.image {
            parts.push(image.to_part("image"));
        }
        RequestBody::Multipart(parts)
    }
}

impl ImageAttachment {
    /// Multipart body with only this image, as the photo upload expects.
    pub fn to_photo_body(&self) -> RequestBody {
        RequestBody::Multipart(vec![self.to_part("photo")])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub re_password: String,
    pub date_of_birth: String,
    pub gender: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordForm {
    pub password: String,
    pub new_password: String,
}
