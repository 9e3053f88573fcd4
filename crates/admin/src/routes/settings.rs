//! Shipping settings handlers.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use feira_core::StoreSettings;

use crate::db;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Settings update payload.
#[derive(Debug, Deserialize)]
pub struct SettingsPayload {
    pub flat_shipping_fee: Decimal,
    pub free_shipping_threshold: Decimal,
}

impl SettingsPayload {
    fn validate(&self) -> Result<()> {
        if self.flat_shipping_fee < Decimal::ZERO {
            return Err(AppError::Validation(
                "flat_shipping_fee must not be negative".to_string(),
            ));
        }
        if self.free_shipping_threshold < Decimal::ZERO {
            return Err(AppError::Validation(
                "free_shipping_threshold must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Current shipping settings.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Result<Json<StoreSettings>> {
    let settings = db::settings::get(state.pool()).await?;
    Ok(Json(settings))
}

/// Replace the shipping settings. Takes effect on the next checkout.
#[instrument(skip(state, payload))]
pub async fn update(
    State(state): State<AppState>,
    Json(payload): Json<SettingsPayload>,
) -> Result<Json<StoreSettings>> {
    payload.validate()?;

    let settings = StoreSettings {
        flat_shipping_fee: payload.flat_shipping_fee,
        free_shipping_threshold: payload.free_shipping_threshold,
    };
    db::settings::update(state.pool(), &settings).await?;
    tracing::info!(
        flat_shipping_fee = %settings.flat_shipping_fee,
        free_shipping_threshold = %settings.free_shipping_threshold,
        "store settings updated"
    );

    Ok(Json(settings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_negative_fee() {
        let payload = SettingsPayload {
            flat_shipping_fee: Decimal::new(-1500, 2),
            free_shipping_threshold: Decimal::new(10000, 2),
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_zero_threshold() {
        // Zero threshold means every order ships free.
        let payload = SettingsPayload {
            flat_shipping_fee: Decimal::ZERO,
            free_shipping_threshold: Decimal::ZERO,
        };
        assert!(payload.validate().is_ok());
    }
}
