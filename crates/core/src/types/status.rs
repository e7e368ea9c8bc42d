//! Status enums for orders and customers, and the order status machine.
//!
//! Orders move `pending -> confirmed -> preparing -> ready -> delivered`,
//! with `cancelled` reachable from any non-terminal state. The machine is
//! permissive: any target status is accepted and classified, and only the
//! caller's authorization decides who may move an order. Each status other
//! than `pending` has a "reached at" timestamp that is stamped whenever the
//! order enters it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "fogon.order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Delivered,
    Cancelled,
}

/// How a status change relates to the normal order flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// Moves to the next status in the flow.
    Forward,
    /// Moves forward past one or more intermediate statuses.
    Skip,
    /// Cancels a non-terminal order.
    Cancel,
    /// Moves back in the flow, or out of a terminal status.
    Backward,
    /// Target equals the current status (timestamp is re-stamped).
    Unchanged,
}

impl OrderStatus {
    /// All statuses, in flow order with `cancelled` last.
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Confirmed,
        Self::Preparing,
        Self::Ready,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Returns `true` for `delivered` and `cancelled`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Position in the forward flow; `None` for `cancelled`.
    const fn rank(self) -> Option<u8> {
        match self {
            Self::Pending => Some(0),
            Self::Confirmed => Some(1),
            Self::Preparing => Some(2),
            Self::Ready => Some(3),
            Self::Delivered => Some(4),
            Self::Cancelled => None,
        }
    }

    /// Classify a transition from `self` to `next`.
    ///
    /// Every transition is allowed; the classification exists so callers can
    /// log or audit unusual moves such as `pending -> delivered`.
    #[must_use]
    pub fn classify(self, next: Self) -> TransitionKind {
        if self == next {
            return TransitionKind::Unchanged;
        }
        if self.is_terminal() {
            return TransitionKind::Backward;
        }
        match (self.rank(), next.rank()) {
            (_, None) => TransitionKind::Cancel,
            (Some(from), Some(to)) if to == from + 1 => TransitionKind::Forward,
            (Some(from), Some(to)) if to > from => TransitionKind::Skip,
            _ => TransitionKind::Backward,
        }
    }

    /// Returns the status as its storage/wire string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("invalid order status: {s}"))
    }
}

/// "Reached this status at" timestamps of an order.
///
/// `pending` has no field: it is the creation state and shares the order's
/// `created_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct StatusTimestamps {
    pub confirmed_at: Option<DateTime<Utc>>,
    pub preparing_at: Option<DateTime<Utc>>,
    pub ready_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl StatusTimestamps {
    /// Stamp the timestamp belonging to `status`. No-op for `pending`.
    pub fn stamp(&mut self, status: OrderStatus, at: DateTime<Utc>) {
        let slot = match status {
            OrderStatus::Pending => return,
            OrderStatus::Confirmed => &mut self.confirmed_at,
            OrderStatus::Preparing => &mut self.preparing_at,
            OrderStatus::Ready => &mut self.ready_at,
            OrderStatus::Delivered => &mut self.delivered_at,
            OrderStatus::Cancelled => &mut self.cancelled_at,
        };
        *slot = Some(at);
    }

    /// When the order reached `status`, if it has.
    #[must_use]
    pub const fn reached_at(&self, status: OrderStatus) -> Option<DateTime<Utc>> {
        match status {
            OrderStatus::Pending => None,
            OrderStatus::Confirmed => self.confirmed_at,
            OrderStatus::Preparing => self.preparing_at,
            OrderStatus::Ready => self.ready_at,
            OrderStatus::Delivered => self.delivered_at,
            OrderStatus::Cancelled => self.cancelled_at,
        }
    }
}

/// Fulfillment type of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "fogon.fulfillment_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentType {
    /// Shipped to an address; charged the configured delivery fee.
    Delivery,
    /// Collected in person; never charged a delivery fee.
    Pickup,
}

impl FulfillmentType {
    /// Human-readable label used in confirmation messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Delivery => "Domicilio",
            Self::Pickup => "Recoger en tienda",
        }
    }
}

/// Payment method recorded on an order. Metadata only; nothing is charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "fogon.payment_method", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Transfer,
    Card,
}

impl PaymentMethod {
    /// Human-readable label used in confirmation messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cash => "Efectivo",
            Self::Transfer => "Transferencia",
            Self::Card => "Tarjeta",
        }
    }
}

/// Role of a customer account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "fogon.customer_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum CustomerRole {
    /// Regular customer (phone-only or registered).
    #[default]
    Customer,
    /// Restaurant staff; may manage orders.
    Staff,
    /// Administrator; full back-office access.
    Admin,
}

impl CustomerRole {
    /// Returns `true` if the role may use the back-office.
    #[must_use]
    pub const fn is_staff(self) -> bool {
        matches!(self, Self::Staff | Self::Admin)
    }
}

impl std::fmt::Display for CustomerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Staff => write!(f, "staff"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for CustomerRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "staff" => Ok(Self::Staff),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// Account status of a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "fogon.customer_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum CustomerStatus {
    #[default]
    Active,
    Blocked,
}
