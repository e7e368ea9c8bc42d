//! Staff account management.
//!
//! Staff are customers with role `staff` or `admin`, identified by phone
//! like everyone else. Creating a staff account for a known phone promotes
//! the existing customer.

use fogon_core::{CustomerRole, Phone};
use tracing::info;

use super::{CommandError, connect};

/// Parse and check a staff role.
fn staff_role(role: &str) -> Result<CustomerRole, CommandError> {
    let role: CustomerRole = role.parse().map_err(CommandError::InvalidArgument)?;
    if !role.is_staff() {
        return Err(CommandError::InvalidArgument(format!(
            "role must be staff or admin (got {role})"
        )));
    }
    Ok(role)
}

/// Create or promote a staff account.
///
/// # Errors
///
/// Returns an error for an invalid phone, name or role, or if the database
/// is unreachable.
pub async fn create(phone: &str, name: &str, role: &str) -> Result<(), CommandError> {
    let role = staff_role(role)?;
    let phone = Phone::parse(phone).map_err(|e| CommandError::InvalidArgument(e.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(CommandError::InvalidArgument("name cannot be empty".to_owned()));
    }

    let pool = connect().await?;

    let (id, created): (i32, bool) = sqlx::query_as(
        r"
        INSERT INTO fogon.customers (phone, name, role)
        VALUES ($1, $2, $3)
        ON CONFLICT (phone) DO UPDATE
            SET name = EXCLUDED.name, role = EXCLUDED.role, updated_at = NOW()
        RETURNING id, (xmax = 0) AS created
        ",
    )
    .bind(&phone)
    .bind(name)
    .bind(role)
    .fetch_one(&pool)
    .await?;

    if created {
        info!(customer_id = id, %phone, %role, "Staff account created");
    } else {
        info!(customer_id = id, %phone, %role, "Existing customer promoted");
    }
    Ok(())
}
