//! HTTP route handlers.

use std::path::Path;

use askama::Template;
use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Path as UrlPath, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::de::DeserializeOwned;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::backend::{BackendError, Session};
use crate::domain::{BookingRequest, Coordinate, Rating, ShopId, ShopTime, Slug};
use crate::listing::ShopCard;
use crate::location::{MapsPlatform, directions_url};

use super::dto::*;
use super::state::AppState;
use super::templates::*;

/// Cookie that carries the access token for plain page loads.
const SESSION_COOKIE: &str = "access_token";

/// Create the application router.
///
/// `static_dir` is the path to the static assets directory.
pub fn create_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/", get(list_shops))
        .route("/health", get(health))
        .route("/shops", get(list_shops))
        .route("/shops/:shop", get(shop_detail))
        .route("/shops/:shop/gallery", get(gallery_step))
        .route("/shops/:shop/reviews", post(submit_review))
        .route("/favorites", get(list_favorites))
        .route("/favorites/:shop_id", delete(remove_favorite))
        .route("/favorites/:shop_id/toggle", post(toggle_favorite))
        .route("/bookings", get(list_bookings).post(create_booking))
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Check if request accepts HTML.
fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

fn render(template: impl Template) -> Result<Response, AppError> {
    let html = template.render().map_err(|e| AppError::Internal {
        message: format!("Template error: {}", e),
    })?;
    Ok(Html(html).into_response())
}

/// Parse a JSON body, logging it when it doesn't match.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        debug!(error = %e, body = %String::from_utf8_lossy(body), "rejected request body");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })
}

/// Access token from the `Authorization` header or the session cookie.
fn access_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        return Some(auth.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
        })
}

/// The caller's session, if they sent a usable token.
fn optional_session(state: &AppState, headers: &HeaderMap) -> Option<Session> {
    let token = access_token(headers)?;
    match Session::from_bearer(&token, state.clock.now()) {
        Ok(session) => Some(session),
        Err(e) => {
            debug!(error = %e, "ignoring unusable session token");
            None
        }
    }
}

fn require_session(state: &AppState, headers: &HeaderMap) -> Result<Session, AppError> {
    let token = access_token(headers).ok_or_else(|| AppError::Unauthorized {
        message: "Sign in required".to_string(),
    })?;
    Ok(Session::from_bearer(&token, state.clock.now())?)
}

/// The user's position: from the query when given, otherwise the position
/// the signed-in user last shared. Only signed-in users are remembered, and
/// only their own position is ever read back.
fn user_coordinate(
    state: &AppState,
    session: Option<&Session>,
    query: &LocationQuery,
) -> Result<Option<Coordinate>, AppError> {
    match (query.lat, query.lng) {
        (None, None) => Ok(session.and_then(|s| state.location.load(s.user_id()))),
        (Some(lat), Some(lng)) => {
            let coordinate = Coordinate::new(lat, lng).map_err(|e| AppError::BadRequest {
                message: e.to_string(),
            })?;
            if let Some(session) = session
                && let Err(e) = state.location.save(session.user_id(), coordinate)
            {
                warn!(error = %e, "failed to remember user location");
            }
            Ok(Some(coordinate))
        }
        _ => Err(AppError::BadRequest {
            message: "lat and lng must be given together".to_string(),
        }),
    }
}

fn parse_shop_id(raw: &str) -> Result<ShopId, AppError> {
    ShopId::parse(raw).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })
}

fn parse_slug(raw: &str) -> Result<Slug, AppError> {
    Slug::parse(raw).map_err(|_| AppError::NotFound {
        message: format!("No shop at {raw:?}"),
    })
}

/// All shops with their open state and distance.
async fn list_shops(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(location): Query<LocationQuery>,
) -> Result<Response, AppError> {
    let session = optional_session(&state, &headers);
    let user = user_coordinate(&state, session.as_ref(), &location)?;
    let shops = state.backend.list_shops().await?;
    let cards = ShopCard::build_all(&shops, user, &state.availability, &state.listing);

    if accepts_html(&headers) {
        render(ShopListTemplate {
            title: "Barbearias".to_string(),
            empty_message: "Nenhuma barbearia encontrada.".to_string(),
            shops: cards.iter().map(ShopCardView::from_card).collect(),
        })
    } else {
        let shops = cards.iter().map(ShopCardResult::from_card).collect();
        Ok(Json(ShopListResponse { shops }).into_response())
    }
}

/// A single shop, with the favorite flag for signed-in users.
async fn shop_detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    UrlPath(slug): UrlPath<String>,
    Query(location): Query<LocationQuery>,
) -> Result<Response, AppError> {
    let slug = parse_slug(&slug)?;
    let session = optional_session(&state, &headers);
    let user = user_coordinate(&state, session.as_ref(), &location)?;
    let shop = state.backend.shop_by_slug(&slug).await?;

    let is_favorite = match &session {
        Some(session) => Some(
            state
                .backend
                .backend()
                .is_favorite(session, &shop.id)
                .await?,
        ),
        None => None,
    };

    let platform = MapsPlatform::from_user_agent(
        headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok()),
    );
    let directions = directions_url(platform, shop.coordinate, &shop.maps_query());
    let card = ShopCard::build(&shop, user, &state.availability, &state.listing);

    if accepts_html(&headers) {
        render(ShopDetailTemplate {
            shop: ShopDetailView::new(&card, is_favorite, directions),
        })
    } else {
        Ok(Json(ShopDetailResponse::new(&card, is_favorite, directions)).into_response())
    }
}

/// Next or previous gallery image.
async fn gallery_step(
    State(state): State<AppState>,
    UrlPath(slug): UrlPath<String>,
    Query(query): Query<GalleryQuery>,
) -> Result<Json<GalleryResponse>, AppError> {
    let slug = parse_slug(&slug)?;
    let shop = state.backend.shop_by_slug(&slug).await?;
    let image = shop
        .gallery
        .step(&query.current, query.direction)
        .map(str::to_string);
    Ok(Json(GalleryResponse { image }))
}

/// Rate a shop. Each user may rate a shop once.
async fn submit_review(
    State(state): State<AppState>,
    headers: HeaderMap,
    UrlPath(shop_id): UrlPath<String>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let shop_id = parse_shop_id(&shop_id)?;
    let session = require_session(&state, &headers)?;
    let req: ReviewRequest = parse_body(&body)?;
    let rating = Rating::new(req.rating).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })?;

    state
        .backend
        .submit_review(&session, &shop_id, rating)
        .await?;
    info!(shop = %shop_id, stars = rating.stars(), "review submitted");
    Ok(StatusCode::CREATED)
}

/// The signed-in user's favorite shops.
async fn list_favorites(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(location): Query<LocationQuery>,
) -> Result<Response, AppError> {
    let session = require_session(&state, &headers)?;
    let user = user_coordinate(&state, Some(&session), &location)?;

    let backend = state.backend.backend();
    let ids = backend.favorite_ids(&session).await?;
    let shops = backend.shops_by_ids(&ids).await?;
    let cards = ShopCard::build_all(&shops, user, &state.availability, &state.listing);

    if accepts_html(&headers) {
        render(ShopListTemplate {
            title: "Favoritos".to_string(),
            empty_message: "Ainda não tem favoritos.".to_string(),
            shops: cards.iter().map(ShopCardView::from_card).collect(),
        })
    } else {
        let shops = cards.iter().map(ShopCardResult::from_card).collect();
        Ok(Json(ShopListResponse { shops }).into_response())
    }
}

/// Flip a shop's favorite state and report the new one.
async fn toggle_favorite(
    State(state): State<AppState>,
    headers: HeaderMap,
    UrlPath(shop_id): UrlPath<String>,
) -> Result<Json<FavoriteResponse>, AppError> {
    let shop_id = parse_shop_id(&shop_id)?;
    let session = require_session(&state, &headers)?;
    let backend = state.backend.backend();

    let is_favorite = if backend.is_favorite(&session, &shop_id).await? {
        backend.remove_favorite(&session, &shop_id).await?;
        false
    } else {
        backend.add_favorite(&session, &shop_id).await?;
        true
    };

    Ok(Json(FavoriteResponse {
        shop_id: shop_id.to_string(),
        is_favorite,
    }))
}

async fn remove_favorite(
    State(state): State<AppState>,
    headers: HeaderMap,
    UrlPath(shop_id): UrlPath<String>,
) -> Result<StatusCode, AppError> {
    let shop_id = parse_shop_id(&shop_id)?;
    let session = require_session(&state, &headers)?;
    state
        .backend
        .backend()
        .remove_favorite(&session, &shop_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Book a service. Slot availability is left to the shop.
async fn create_booking(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let session = require_session(&state, &headers)?;
    let req: CreateBookingRequest = parse_body(&body)?;

    let service_name = req.service_name.trim();
    if service_name.is_empty() {
        return Err(AppError::BadRequest {
            message: "service_name must not be empty".to_string(),
        });
    }
    let booking = BookingRequest {
        shop_id: parse_shop_id(&req.shop_id)?,
        service_name: service_name.to_string(),
        date: req.date,
        time: ShopTime::parse(&req.time).map_err(|e| AppError::BadRequest {
            message: e.to_string(),
        })?,
    };

    let stored = state
        .backend
        .backend()
        .create_booking(&session, &booking)
        .await?;
    info!(shop = %stored.shop_id, date = %stored.date, time = %stored.time, "booking created");

    Ok((StatusCode::CREATED, Json(BookingResult::from_booking(&stored))).into_response())
}

/// The signed-in user's bookings.
async fn list_bookings(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let session = require_session(&state, &headers)?;
    let bookings = state.backend.backend().bookings_for(&session).await?;

    if accepts_html(&headers) {
        render(BookingListTemplate {
            bookings: bookings.iter().map(BookingView::from_booking).collect(),
        })
    } else {
        let bookings = bookings.iter().map(BookingResult::from_booking).collect();
        Ok(Json(BookingListResponse { bookings }).into_response())
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Unauthorized { message: String },
    NotFound { message: String },
    Conflict { message: String },
    Internal { message: String },
}

impl From<BackendError> for AppError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::ShopNotFound(_) => AppError::NotFound {
                message: e.to_string(),
            },
            BackendError::AlreadyReviewed => AppError::Conflict {
                message: "Já avaliou esta barbearia".to_string(),
            },
            BackendError::Unauthorized => AppError::Unauthorized {
                message: e.to_string(),
            },
            _ => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::Unauthorized { message } => (StatusCode::UNAUTHORIZED, message.clone()),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message.clone()),
            AppError::Conflict { message } => (StatusCode::CONFLICT, message.clone()),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message.clone()),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            debug!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
