use std::convert::Infallible;

use axum::Json;
use axum::extract::Path;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{delete, patch, post};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use chrono::Utc;
use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use crate::error::AppError;
use crate::models::*;
use crate::notify::{APP_TITLE, AppEvent, IndicatorStatus};
use crate::state::AppState;
use crate::storage::SavedImage;

#[derive(Deserialize)]
struct SaveImageRequest {
    data: String,
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NotificationRequest {
    title: Option<String>,
    body: Option<String>,
    #[serde(default)]
    silent: bool,
    item_id: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/items", get(list_items).post(create_item))
        .route(
            "/items/{id}",
            get(get_item).patch(update_item).delete(delete_item),
        )
        .route("/items/{id}/complete", patch(toggle_complete))
        .route("/items/{id}/stop-reminder", post(stop_reminder))
        .route("/images", post(save_image))
        .route("/images/{filename}", delete(delete_image))
        .route("/images/{filename}/url", get(image_url))
        .route("/settings", get(get_settings).patch(update_settings))
        .route("/notifications", post(show_notification))
        .route("/indicator", get(indicator))
        .route("/indicator/stop", post(stop_indicator))
        .route("/events", get(events))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.items.ping().await?;
    Ok(StatusCode::OK)
}

async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<Item>>, AppError> {
    let items = state.items.list().await?;
    Ok(Json(items))
}

async fn create_item(
    State(state): State<AppState>,
    Json(req): Json<NewItemRequest>
) -> Result<Json<Item>, AppError> {
    let item = state.items.create(req).await?;
    Ok(Json(item))
}

async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<Json<Item>, AppError> {
    let item = state.items.get(&id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(item))
}

async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateItemRequest>
) -> Result<Json<Item>, AppError> {
    let item = state.items.update(&id, req).await?;
    Ok(Json(item))
}

async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<StatusCode, AppError> {
    state.items.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn toggle_complete(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<Json<Item>, AppError> {
    let item = state.items.toggle_complete(&id).await?;
    Ok(Json(item))
}

async fn stop_reminder(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<Json<Item>, AppError> {
    let item = state.reminders.acknowledge(&id, Utc::now()).await?;
    Ok(Json(item))
}

async fn save_image(
    State(state): State<AppState>,
    Json(req): Json<SaveImageRequest>
) -> Result<Json<SavedImage>, AppError> {
    let saved = state.images.save(&req.data).await?;
    Ok(Json(saved))
}

async fn delete_image(
    State(state): State<AppState>,
    Path(filename): Path<String>
) -> Result<StatusCode, AppError> {
    state.images.delete(&filename).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn image_url(
    State(state): State<AppState>,
    Path(filename): Path<String>
) -> Result<Json<ImageUrl>, AppError> {
    let url = state.images.url_for(&filename)?;
    Ok(Json(ImageUrl { url }))
}

async fn get_settings(State(state): State<AppState>) -> Result<Json<Settings>, AppError> {
    let settings = state.settings.load().await?;
    Ok(Json(settings))
}

async fn update_settings(
    State(state): State<AppState>,
    Json(req): Json<UpdateSettingsRequest>
) -> Result<Json<Settings>, AppError> {
    let shortcuts_changed = req.shortcuts.is_some();
    let settings = state.settings.update(req).await?;

    // The shell owns global shortcut registration and re-registers on this event.
    if shortcuts_changed {
        state.events.publish(AppEvent::ShortcutsChanged {
            shortcuts: settings.shortcuts.clone(),
        });
    }
    Ok(Json(settings))
}

async fn show_notification(
    State(state): State<AppState>,
    Json(req): Json<NotificationRequest>
) -> StatusCode {
    state.events.publish(AppEvent::Notification {
        title: req.title.unwrap_or_else(|| APP_TITLE.to_string()),
        body: req.body.unwrap_or_default(),
        silent: req.silent,
        item_id: req.item_id,
    });
    StatusCode::ACCEPTED
}

async fn indicator(State(state): State<AppState>) -> Json<IndicatorStatus> {
    Json(state.indicator.status())
}

// Clicking a notification clears the tray without acknowledging the item.
async fn stop_indicator(State(state): State<AppState>) -> Json<IndicatorStatus> {
    state.signaler.stop_indicator();
    Json(state.indicator.status())
}

async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.events.subscribe();

    let stream = futures::stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(app_event) => match Event::default().event(app_event.name()).json_data(&app_event) {
                    Ok(event) => return Some((Ok(event), rx)),
                    Err(e) => warn!("failed to encode {} event: {}", app_event.name(), e),
                },
                Err(RecvError::Lagged(skipped)) => {
                    warn!("event listener lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
