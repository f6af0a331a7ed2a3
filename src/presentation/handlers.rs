// HTTP request handlers
use crate::application::dashboard_session::{DashboardSnapshot, SessionClosed, SessionCommand};
use crate::application::platform_api::FetchError;
use crate::domain::listing::{Passcode, PasscodeRole, UserUpdate};
use crate::domain::paging::PageSize;
use crate::domain::stats::{Section, UserSummary};
use crate::presentation::app_state::AppState;
use crate::presentation::views::{
    ActivityView, MessageListView, PublicationListView, StatsView, UserListView,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);
type HandlerResult<T> = Result<T, HandlerError>;

#[derive(Debug, Deserialize)]
pub struct PageBody {
    pub page: u32,
}

#[derive(Debug, Deserialize)]
pub struct SizeBody {
    pub size: u32,
}

#[derive(Debug, Deserialize)]
pub struct SearchBody {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PasscodeBody {
    #[serde(default)]
    pub role: PasscodeRole,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> HandlerError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
            code: status.as_u16(),
        }),
    )
}

fn session_error(err: SessionClosed) -> HandlerError {
    tracing::error!("Dashboard session unavailable: {}", err);
    error_response(StatusCode::SERVICE_UNAVAILABLE, err.to_string())
}

fn platform_error(err: FetchError) -> HandlerError {
    match err {
        FetchError::Unauthorized => error_response(StatusCode::UNAUTHORIZED, "Session expired"),
        other => {
            tracing::warn!("Platform request failed: {}", other);
            error_response(StatusCode::BAD_GATEWAY, other.to_string())
        }
    }
}

fn parse_section(slug: &str) -> HandlerResult<Section> {
    Section::from_slug(slug)
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, format!("Unknown section '{slug}'")))
}

/// Current session state, or 401 once the platform has rejected the token
async fn live_snapshot(state: &AppState) -> HandlerResult<DashboardSnapshot> {
    let snapshot = state.session.snapshot().await.map_err(session_error)?;
    if snapshot.session_expired {
        return Err(error_response(StatusCode::UNAUTHORIZED, "Session expired"));
    }
    Ok(snapshot)
}

async fn dispatch(state: &AppState, command: SessionCommand) -> HandlerResult<StatusCode> {
    live_snapshot(state).await?;
    state.session.send(command).await.map_err(session_error)?;
    Ok(StatusCode::ACCEPTED)
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn get_stats(State(state): State<Arc<AppState>>) -> HandlerResult<Json<StatsView>> {
    let snapshot = live_snapshot(&state).await?;
    Ok(Json(StatsView::from_snapshot(&snapshot.stats)))
}

pub async fn refresh_stats(State(state): State<Arc<AppState>>) -> HandlerResult<StatusCode> {
    dispatch(&state, SessionCommand::RefreshStats).await
}

/// Raw keystroke input; the session debounces it before querying
pub async fn search_stats(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SearchBody>,
) -> HandlerResult<StatusCode> {
    dispatch(&state, SessionCommand::SearchInput(body.text)).await
}

pub async fn set_section_page(
    Path(section): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<PageBody>,
) -> HandlerResult<StatusCode> {
    let section = parse_section(&section)?;
    dispatch(
        &state,
        SessionCommand::SetPage {
            section,
            page: body.page,
        },
    )
    .await
}

pub async fn set_section_size(
    Path(section): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<SizeBody>,
) -> HandlerResult<StatusCode> {
    let section = parse_section(&section)?;
    let size = PageSize::try_from(body.size)
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, e.to_string()))?;
    dispatch(&state, SessionCommand::SetSize { section, size }).await
}

pub async fn next_section_page(
    Path(section): Path<String>,
    State(state): State<Arc<AppState>>,
) -> HandlerResult<StatusCode> {
    let section = parse_section(&section)?;
    dispatch(&state, SessionCommand::NextPage(section)).await
}

pub async fn previous_section_page(
    Path(section): Path<String>,
    State(state): State<Arc<AppState>>,
) -> HandlerResult<StatusCode> {
    let section = parse_section(&section)?;
    dispatch(&state, SessionCommand::PreviousPage(section)).await
}

pub async fn get_activities(
    State(state): State<Arc<AppState>>,
) -> HandlerResult<Json<ActivityView>> {
    let snapshot = live_snapshot(&state).await?;
    Ok(Json(ActivityView::from_snapshot(
        &snapshot.activity,
        state.activity_page_len,
    )))
}

pub async fn refresh_activities(State(state): State<Arc<AppState>>) -> HandlerResult<StatusCode> {
    dispatch(&state, SessionCommand::RefreshActivity).await
}

pub async fn next_activity_page(State(state): State<Arc<AppState>>) -> HandlerResult<StatusCode> {
    dispatch(&state, SessionCommand::NextActivityPage).await
}

pub async fn previous_activity_page(
    State(state): State<Arc<AppState>>,
) -> HandlerResult<StatusCode> {
    dispatch(&state, SessionCommand::PreviousActivityPage).await
}

pub async fn list_messages(
    Query(query): Query<ListQuery>,
    State(state): State<Arc<AppState>>,
) -> HandlerResult<Json<MessageListView>> {
    let page = state
        .listings
        .list_messages(query.page.unwrap_or(1), query.q.as_deref())
        .await
        .map_err(platform_error)?;
    Ok(Json(page.into()))
}

pub async fn list_publications(
    Query(query): Query<ListQuery>,
    State(state): State<Arc<AppState>>,
) -> HandlerResult<Json<PublicationListView>> {
    let page = state
        .listings
        .list_publications(query.page.unwrap_or(1))
        .await
        .map_err(platform_error)?;
    Ok(Json(page.into()))
}

pub async fn list_users(
    Query(query): Query<ListQuery>,
    State(state): State<Arc<AppState>>,
) -> HandlerResult<Json<UserListView>> {
    let page = state
        .listings
        .list_users(query.page.unwrap_or(1), query.q.as_deref())
        .await
        .map_err(platform_error)?;
    Ok(Json(page.into()))
}

pub async fn block_user(
    Path(id): Path<u64>,
    State(state): State<Arc<AppState>>,
) -> HandlerResult<StatusCode> {
    state.listings.block_user(id).await.map_err(platform_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn unblock_user(
    Path(id): Path<u64>,
    State(state): State<Arc<AppState>>,
) -> HandlerResult<StatusCode> {
    state.listings.unblock_user(id).await.map_err(platform_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_user(
    Path(id): Path<u64>,
    State(state): State<Arc<AppState>>,
    Json(update): Json<UserUpdate>,
) -> HandlerResult<Json<UserSummary>> {
    let user = state
        .listings
        .update_user(id, &update)
        .await
        .map_err(platform_error)?;
    Ok(Json(user))
}

pub async fn delete_user(
    Path(id): Path<u64>,
    State(state): State<Arc<AppState>>,
) -> HandlerResult<StatusCode> {
    state.listings.delete_user(id).await.map_err(platform_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_passcodes(
    State(state): State<Arc<AppState>>,
) -> HandlerResult<Json<Vec<Passcode>>> {
    let passcodes = state.listings.list_passcodes().await.map_err(platform_error)?;
    Ok(Json(passcodes))
}

pub async fn create_passcode(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PasscodeBody>,
) -> HandlerResult<(StatusCode, Json<Passcode>)> {
    let passcode = state
        .listings
        .create_passcode(body.role)
        .await
        .map_err(platform_error)?;
    Ok((StatusCode::CREATED, Json(passcode)))
}
