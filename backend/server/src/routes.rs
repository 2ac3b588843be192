use std::sync::Arc;

use axum::{
    Json,
    extract::{State as AxumState, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use wire::{
    AnalyticsList, ContactAccepted, ContactForm, Health, ProjectView, SubmissionList,
    ViewRecorded,
};

use crate::{
    analytics::{list_project_analytics, list_submissions},
    error::AppError,
    state::State,
    submissions::record_submission,
    views::record_view,
};

pub async fn contact_handler(
    AxumState(state): AxumState<Arc<State>>,
    payload: Result<Json<ContactForm>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(form) = payload.map_err(|_| AppError::MalformedPayload)?;

    record_submission(state.store.as_ref(), form)
        .await
        .map_err(|e| e.during("Failed to submit contact form"))?;

    Ok((
        StatusCode::OK,
        Json(ContactAccepted {
            success: true,
            message: "Contact form submitted successfully".to_string(),
        }),
    ))
}

pub async fn track_view_handler(
    AxumState(state): AxumState<Arc<State>>,
    payload: Result<Json<ProjectView>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(view) = payload.map_err(|_| AppError::MalformedPayload)?;

    let views = record_view(
        state.store.as_ref(),
        &view.project_id,
        view.project_title.as_deref(),
    )
    .await
    .map_err(|e| e.during("Failed to track project view"))?;

    Ok((
        StatusCode::OK,
        Json(ViewRecorded {
            success: true,
            views,
        }),
    ))
}

pub async fn contacts_handler(
    AxumState(state): AxumState<Arc<State>>,
) -> Result<impl IntoResponse, AppError> {
    let submissions = list_submissions(state.store.as_ref())
        .await
        .map_err(|e| AppError::from(e).during("Failed to get contact submissions"))?;

    Ok((
        StatusCode::OK,
        Json(SubmissionList {
            success: true,
            submissions,
        }),
    ))
}

pub async fn analytics_handler(
    AxumState(state): AxumState<Arc<State>>,
) -> Result<impl IntoResponse, AppError> {
    let analytics = list_project_analytics(state.store.as_ref())
        .await
        .map_err(|e| AppError::from(e).during("Failed to get project analytics"))?;

    Ok((
        StatusCode::OK,
        Json(AnalyticsList {
            success: true,
            analytics,
        }),
    ))
}

pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(Health {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }),
    )
}
