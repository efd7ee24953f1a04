//! `data:<mime>;base64,<payload>` parsing for uploaded documents and images.

use crate::services::providers::MediaPart;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::borrow::Cow;
use thiserror::Error;
use validator::ValidationError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataUriError {
    #[error("must start with 'data:'")]
    MissingScheme,

    #[error("must be base64 encoded")]
    NotBase64,

    #[error("unsupported file type '{0}', expected a PDF or an image")]
    UnsupportedMimeType(String),

    #[error("file content is empty")]
    EmptyPayload,

    #[error("file content is not valid base64")]
    InvalidBase64,
}

impl DataUriError {
    fn code(&self) -> &'static str {
        match self {
            DataUriError::MissingScheme => "data_uri_scheme",
            DataUriError::NotBase64 => "data_uri_encoding",
            DataUriError::UnsupportedMimeType(_) => "data_uri_mime_type",
            DataUriError::EmptyPayload => "data_uri_empty",
            DataUriError::InvalidBase64 => "data_uri_base64",
        }
    }
}

/// A parsed data URI borrowing from the request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri<'a> {
    /// Lower-cased MIME type.
    pub mime_type: String,
    /// Base64 payload, still encoded.
    pub data: &'a str,
}

impl<'a> DataUri<'a> {
    /// Parse and check a data URI against the PDF / image allow-list.
    pub fn parse(uri: &'a str) -> Result<Self, DataUriError> {
        let rest = strip_prefix_ignore_case(uri.trim(), "data:").ok_or(DataUriError::MissingScheme)?;
        let (header, data) = rest.split_once(',').ok_or(DataUriError::NotBase64)?;

        let mut params = header.split(';');
        let mime_type = params.next().unwrap_or_default().trim().to_ascii_lowercase();
        if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
            return Err(DataUriError::NotBase64);
        }

        if !is_allowed_mime_type(&mime_type) {
            return Err(DataUriError::UnsupportedMimeType(mime_type));
        }

        if data.trim().is_empty() {
            return Err(DataUriError::EmptyPayload);
        }
        STANDARD
            .decode(data.trim())
            .map_err(|_| DataUriError::InvalidBase64)?;

        Ok(Self {
            mime_type,
            data: data.trim(),
        })
    }

    pub fn to_media_part(&self) -> MediaPart {
        MediaPart {
            mime_type: self.mime_type.clone(),
            data: self.data.to_string(),
        }
    }
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &value[prefix.len()..])
}

/// `application/pdf` or any `image/<subtype>`.
pub fn is_allowed_mime_type(mime_type: &str) -> bool {
    if mime_type == "application/pdf" {
        return true;
    }
    matches!(mime_type.split_once('/'), Some(("image", subtype)) if !subtype.is_empty())
}

/// `validator` hook for data-URI fields.
pub fn validate_data_uri(value: &str) -> Result<(), ValidationError> {
    DataUri::parse(value).map(|_| ()).map_err(|e| {
        let mut err = ValidationError::new(e.code());
        err.message = Some(Cow::Owned(format!("File {}", e)));
        err
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pdf_and_image_uris() {
        let pdf = DataUri::parse("data:application/pdf;base64,JVBERi0xLjQ=").unwrap();
        assert_eq!(pdf.mime_type, "application/pdf");
        assert_eq!(pdf.data, "JVBERi0xLjQ=");

        let png = DataUri::parse("data:IMAGE/PNG;base64,iVBORw0KGgo=").unwrap();
        assert_eq!(png.mime_type, "image/png");
        assert_eq!(png.to_media_part().data, "iVBORw0KGgo=");
    }

    #[test]
    fn extra_parameters_are_tolerated() {
        assert!(DataUri::parse("data:image/jpeg;name=scan.jpg;base64,/9j/4AA=").is_ok());
    }

    #[test]
    fn rejects_disallowed_types() {
        assert_eq!(
            DataUri::parse("data:text/plain;base64,aGVsbG8="),
            Err(DataUriError::UnsupportedMimeType("text/plain".to_string()))
        );
        assert_eq!(
            DataUri::parse("data:image/;base64,aGVsbG8="),
            Err(DataUriError::UnsupportedMimeType("image/".to_string()))
        );
    }

    #[test]
    fn rejects_malformed_uris() {
        assert_eq!(
            DataUri::parse("https://example.com/scan.png"),
            Err(DataUriError::MissingScheme)
        );
        assert_eq!(
            DataUri::parse("data:image/png,rawbytes"),
            Err(DataUriError::NotBase64)
        );
        assert_eq!(
            DataUri::parse("data:image/png;base64,"),
            Err(DataUriError::EmptyPayload)
        );
        assert_eq!(
            DataUri::parse("data:image/png;base64,@@not-base64@@"),
            Err(DataUriError::InvalidBase64)
        );
    }

    #[test]
    fn validator_hook_carries_readable_message() {
        let err = validate_data_uri("data:text/csv;base64,YQ==").unwrap_err();
        assert_eq!(err.code, "data_uri_mime_type");
        assert!(err.message.unwrap().contains("text/csv"));
    }
}
