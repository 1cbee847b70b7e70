use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::models::{AdminContext, Project, ProjectContent, Translations};
use crate::services::media::{self, ImageUpload, MediaStorage, PROJECT_IMAGE_DIR};
use crate::services::validation::not_blank;
use crate::services::ServiceError;
use crate::store::ProjectStore;

#[derive(Debug, Clone, Default, Validate)]
pub struct ProjectInput {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    pub description: Translations,
}

impl ProjectInput {
    pub fn to_content(&self) -> Result<ProjectContent, ServiceError> {
        self.validate()?;
        let name = self.name.trim();
        if let Some(locale) = self.description.unsupported_locales().first() {
            return Err(ServiceError::Validation(format!(
                "Unsupported language '{locale}' for project description."
            )));
        }
        Ok(ProjectContent {
            name: name.to_string(),
            description: self.description.clone(),
        })
    }
}

#[derive(Clone)]
pub struct ProjectCatalog {
    store: Arc<dyn ProjectStore>,
    media: Arc<dyn MediaStorage>,
}

impl ProjectCatalog {
    pub fn new(store: Arc<dyn ProjectStore>, media: Arc<dyn MediaStorage>) -> Self {
        Self { store, media }
    }

    pub async fn list(&self) -> Result<Vec<Project>, ServiceError> {
        Ok(self.store.list_projects().await?)
    }

    pub async fn create(
        &self,
        admin: &AdminContext,
        input: ProjectInput,
        image: Option<ImageUpload>,
    ) -> Result<Project, ServiceError> {
        let content = input.to_content()?;
        let image_key = match &image {
            Some(upload) => Some(self.store_image(upload).await?),
            None => None,
        };

        match self.store.insert_project(content, image_key.clone()).await {
            Ok(project) => {
                info!(project_id = %project.id, admin = %admin.name, "Project created");
                Ok(project)
            }
            Err(e) => {
                self.discard(image_key.as_deref()).await;
                Err(e.into())
            }
        }
    }

    pub async fn update(
        &self,
        admin: &AdminContext,
        id: Uuid,
        input: ProjectInput,
        image: Option<ImageUpload>,
    ) -> Result<Project, ServiceError> {
        let current = self
            .store
            .find_project(id)
            .await?
            .ok_or_else(ServiceError::project_not_found)?;
        let content = input.to_content()?;
        let image_key = match &image {
            Some(upload) => Some(self.store_image(upload).await?),
            None => None,
        };

        let updated = match self.store.update_project(id, content, image_key.clone()).await {
            Ok(Some(project)) => project,
            Ok(None) => {
                self.discard(image_key.as_deref()).await;
                return Err(ServiceError::project_not_found());
            }
            Err(e) => {
                self.discard(image_key.as_deref()).await;
                return Err(e.into());
            }
        };

        if image_key.is_some() {
            self.discard(current.image.as_deref()).await;
        }
        info!(project_id = %id, admin = %admin.name, "Project updated");
        Ok(updated)
    }

    pub async fn delete(&self, admin: &AdminContext, id: Uuid) -> Result<(), ServiceError> {
        let project = self
            .store
            .find_project(id)
            .await?
            .ok_or_else(ServiceError::project_not_found)?;

        if let Some(image) = &project.image {
            self.media.remove(image).await?;
        }
        self.store
            .delete_project(id)
            .await?
            .ok_or_else(ServiceError::project_not_found)?;

        info!(project_id = %id, admin = %admin.name, "Project deleted");
        Ok(())
    }

    async fn store_image(&self, upload: &ImageUpload) -> Result<String, ServiceError> {
        upload.validate()?;
        let key = media::object_key(PROJECT_IMAGE_DIR, &upload.file_name);
        self.media.put(&key, &upload.bytes).await?;
        Ok(key)
    }

    async fn discard(&self, key: Option<&str>) {
        let Some(key) = key else { return };
        if let Err(e) = self.media.remove(key).await {
            warn!(error = %e, key, "Failed to remove unused project image");
        }
    }
}
