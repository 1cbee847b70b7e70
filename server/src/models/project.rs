use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::translations::{Locale, Translations};

/// Portfolio project shown on the public site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: Translations,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectContent {
    pub name: String,
    pub description: Translations,
}

/// Project as rendered on the public site.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectView {
    pub id: Uuid,
    pub name: String,
    pub description: Translations,
    pub display_description: Option<String>,
    pub image_url: Option<String>,
}

impl ProjectView {
    pub fn new(project: &Project, locale: &Locale) -> Self {
        Self {
            id: project.id,
            name: project.name.clone(),
            display_description: project.description.resolve(locale).map(str::to_owned),
            description: project.description.clone(),
            image_url: project.image.as_deref().map(crate::services::media::public_path),
        }
    }
}
