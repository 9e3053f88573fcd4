//! Session attach/detach handlers.
//!
//! Authentication itself is delegated to an external identity provider; this
//! service only records the verified user id in the session. A deployment
//! must front these endpoints with the provider's token verification.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use feira_core::UserId;

use crate::cart::CartOwner;
use crate::error::{AppError, Result};
use crate::middleware::session::keys;
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub user_id: String,
}

/// Attach a user id to the session and hydrate their durable cart.
///
/// The live guest cart, if any, simply becomes unreachable: only
/// authenticated identities own a persisted cart document, and the user's
/// own stored lines win on login.
#[instrument(skip(state, session, request))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<StatusCode> {
    if request.user_id.trim().is_empty() {
        return Err(AppError::BadRequest("user_id must not be empty".to_owned()));
    }

    session.cycle_id().await?;
    session.insert(keys::USER_ID, request.user_id.clone()).await?;
    session.remove::<String>(keys::GUEST_CART_KEY).await?;

    // Hydrate eagerly so the first cart read after login is warm and stale
    // product references are dropped right away.
    let owner = CartOwner::User(UserId::new(request.user_id));
    state.invalidate_cart(&owner).await;
    let _ = state.cart(&owner).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Detach the user id from the session.
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<StatusCode> {
    if let Some(user_id) = session.get::<String>(keys::USER_ID).await? {
        state
            .invalidate_cart(&CartOwner::User(UserId::new(user_id)))
            .await;
    }
    session.flush().await?;
    Ok(StatusCode::NO_CONTENT)
}
