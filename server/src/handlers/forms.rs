//! Multipart form decoding for the admin event and project forms.
//!
//! Translated fields arrive as `name[en]`, `description[fr]` and so on.

use std::collections::HashMap;

use axum::extract::Multipart;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::models::Translations;
use crate::services::{EventInput, ImageUpload, ProjectInput};
use crate::utils::error::AppError;

const NAIVE_DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Text fields in submission order plus any uploaded files by field name.
#[derive(Debug, Default)]
pub struct FormFields {
    text: Vec<(String, String)>,
    files: HashMap<String, ImageUpload>,
}

impl FormFields {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = FormFields::default();

        while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            match field.file_name().map(str::to_owned) {
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_owned);
                    let bytes = field.bytes().await.map_err(bad_form)?;
                    // Browsers send an empty part for an untouched file input.
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    form.files.insert(
                        name,
                        ImageUpload {
                            file_name,
                            content_type,
                            bytes: bytes.to_vec(),
                        },
                    );
                }
                None => {
                    let value = field.text().await.map_err(bad_form)?;
                    form.text.push((name, value));
                }
            }
        }

        Ok(form)
    }

    pub fn push_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.text.push((name.into(), value.into()));
    }

    /// Last value wins, so a hidden `is_private=0` followed by a checked box reads as set.
    fn last(&self, name: &str) -> Option<&str> {
        self.text
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Collects `field[locale]` entries, skipping blank values.
    fn translations(&self, field: &str) -> Translations {
        self.text
            .iter()
            .filter_map(|(key, value)| {
                let locale = key.strip_prefix(field)?.strip_prefix('[')?.strip_suffix(']')?;
                let value = value.trim();
                (!value.is_empty()).then(|| (locale.to_ascii_lowercase(), value.to_string()))
            })
            .collect()
    }

    pub fn take_file(&mut self, name: &str) -> Option<ImageUpload> {
        self.files.remove(name)
    }

    pub fn event_input(&self) -> Result<EventInput, AppError> {
        Ok(EventInput {
            name: self.translations("name"),
            description: self.translations("description"),
            date: self.last("date").map(parse_date).transpose()?.flatten(),
            capacity: self.last("capacity").map(parse_capacity).transpose()?.flatten(),
            location: self.last("location").unwrap_or_default().to_string(),
            is_private: self.last("is_private").map(parse_flag).unwrap_or(false),
        })
    }

    pub fn project_input(&self) -> ProjectInput {
        ProjectInput {
            name: self.last("name").unwrap_or_default().to_string(),
            description: self.translations("description"),
        }
    }
}

fn bad_form(err: impl std::fmt::Display) -> AppError {
    AppError::ValidationError(format!("Malformed form submission: {err}"))
}

/// Accepts RFC 3339, `datetime-local` values and bare dates (taken as midnight UTC).
fn parse_date(raw: &str) -> Result<Option<DateTime<Utc>>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(date.with_timezone(&Utc)));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(date) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Some(date.and_utc()));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|date| Some(date.and_utc()))
        .ok_or_else(|| AppError::ValidationError("The date is not a valid date.".to_string()))
}

fn parse_capacity(raw: &str) -> Result<Option<i32>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| AppError::ValidationError("The capacity must be an integer.".to_string()))
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}
