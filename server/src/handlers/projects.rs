//! Portfolio project administration.

use axum::extract::{Multipart, Path, State};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use uuid::Uuid;

use crate::handlers::forms::FormFields;
use crate::models::AdminContext;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

pub async fn index(
    State(state): State<AppState>,
    Extension(_admin): Extension<AdminContext>,
) -> Result<Response, AppError> {
    let projects = state.project_catalog().list().await?;
    Ok(success(projects, "Projects retrieved successfully").into_response())
}

pub async fn create(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let mut form = FormFields::from_multipart(multipart).await?;
    let image = form.take_file("image");

    let project = state
        .project_catalog()
        .create(&admin, form.project_input(), image)
        .await?;
    Ok(created(project, "Project created successfully").into_response())
}

pub async fn update(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let mut form = FormFields::from_multipart(multipart).await?;
    let image = form.take_file("image");

    let project = state
        .project_catalog()
        .update(&admin, id, form.project_input(), image)
        .await?;
    Ok(success(project, "Project updated successfully").into_response())
}

pub async fn destroy(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    state.project_catalog().delete(&admin, id).await?;
    Ok(empty_success("Project deleted successfully").into_response())
}
