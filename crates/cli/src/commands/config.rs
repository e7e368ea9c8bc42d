//! Business configuration commands.
//!
//! Running servers cache the configuration row, so changes show up after
//! `FOGON_CONFIG_CACHE_SECONDS`.

use fogon_core::Money;
use fogon_server::db::{BusinessConfigProvider, PgRepository};
use tracing::info;

use super::{CommandError, connect};

/// Set the delivery fee.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the row is missing.
pub async fn set_delivery_fee(amount: u32) -> Result<(), CommandError> {
    let pool = connect().await?;
    let fee = Money::new(i64::from(amount));

    let updated = sqlx::query(
        "UPDATE fogon.business_config SET delivery_fee = $1, updated_at = NOW() WHERE id",
    )
    .bind(fee)
    .execute(&pool)
    .await?
    .rows_affected();

    if updated == 0 {
        return Err(CommandError::InvalidArgument(
            "business configuration row is missing; run `fogon-cli migrate`".to_owned(),
        ));
    }

    info!(delivery_fee = %fee, "Delivery fee updated");
    Ok(())
}

/// Show the current business configuration.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the row is missing.
pub async fn show() -> Result<(), CommandError> {
    let repo = PgRepository::new(connect().await?);
    let config = repo
        .current()
        .await
        .map_err(|e| CommandError::InvalidArgument(e.to_string()))?;

    info!("Business configuration");
    info!("  Name: {}", config.business_name);
    info!("  Delivery fee: {}", config.delivery_fee);
    info!(
        "  WhatsApp: {}",
        config
            .whatsapp_number
            .as_ref()
            .map_or("(not set)", |phone| phone.as_str())
    );
    Ok(())
}
