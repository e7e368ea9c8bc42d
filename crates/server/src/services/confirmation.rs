//! Order confirmation message and WhatsApp deep link.

use serde::Serialize;

use fogon_core::FulfillmentType;

use crate::db::BusinessConfig;
use crate::models::Order;

/// Human-readable confirmation of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    pub message: String,
    /// `https://wa.me/...` link that opens a chat with the message
    /// prefilled, when the business has a WhatsApp number configured.
    pub whatsapp_url: Option<String>,
}

/// Build the confirmation for `order`.
#[must_use]
pub fn build_confirmation(order: &Order, config: &BusinessConfig) -> Confirmation {
    let message = render_message(order, &config.business_name);
    let whatsapp_url = config.whatsapp_number.as_ref().map(|number| {
        format!(
            "https://wa.me/{}?text={}",
            number.digits(),
            urlencoding::encode(&message)
        )
    });
    Confirmation {
        message,
        whatsapp_url,
    }
}

fn render_message(order: &Order, business_name: &str) -> String {
    let mut lines = vec![
        format!("*{business_name}* - Pedido {}", order.order_number),
        format!("Cliente: {} ({})", order.customer_name, order.customer_phone),
        format!("Entrega: {}", order.fulfillment_type.label()),
    ];
    if order.fulfillment_type == FulfillmentType::Delivery
        && let Some(address) = &order.delivery_address
    {
        lines.push(format!("Dirección: {address}"));
    }

    lines.push(String::new());
    for item in &order.items {
        lines.push(format!(
            "{} x {} - {}",
            item.quantity, item.product_name, item.line_total
        ));
        lines.extend(
            item.additions
                .iter()
                .map(|addition| format!("   + {} ({})", addition.addition_name, addition.price)),
        );
    }

    lines.push(String::new());
    lines.push(format!("Subtotal: {}", order.subtotal));
    if order.fulfillment_type == FulfillmentType::Delivery {
        lines.push(format!("Domicilio: {}", order.delivery_fee));
    }
    lines.push(format!("Total: {}", order.total));

    lines.push(match &order.payment_reference {
        Some(reference) => format!("Pago: {} ({reference})", order.payment_method.label()),
        None => format!("Pago: {}", order.payment_method.label()),
    });
    if let Some(notes) = &order.notes {
        lines.push(format!("Notas: {notes}"));
    }

    lines.join("\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use fogon_core::{
        AdditionId, Money, OrderId, OrderItemId, OrderNumber, OrderStatus, PaymentMethod, Phone,
        ProductId, Quantity, StatusTimestamps,
    };

    use super::*;
    use crate::models::{OrderItem, OrderItemAddition};

    fn sample_order() -> Order {
        let at = Utc.with_ymd_and_hms(2026, 10, 18, 15, 0, 0).unwrap();
        Order {
            id: OrderId::new(1),
            order_number: OrderNumber::parse("ORD-20261018-001").unwrap(),
            customer_id: None,
            customer_name: "Ana".to_owned(),
            customer_phone: Phone::parse("3001234567").unwrap(),
            customer_email: None,
            fulfillment_type: FulfillmentType::Delivery,
            address_id: None,
            delivery_address: Some("Calle 10 # 5-20".to_owned()),
            subtotal: Money::new(14_000),
            delivery_fee: Money::new(5_000),
            total: Money::new(19_000),
            payment_method: PaymentMethod::Transfer,
            payment_reference: Some("NEQUI-77".to_owned()),
            notes: Some("Sin cebolla".to_owned()),
            status: OrderStatus::Pending,
            timestamps: StatusTimestamps::default(),
            admin_notes: None,
            created_at: at,
            updated_at: at,
            items: vec![OrderItem {
                id: OrderItemId::new(1),
                order_id: OrderId::new(1),
                product_id: Some(ProductId::new(1)),
                product_name: "Hamburguesa".to_owned(),
                unit_price: Money::new(6_000),
                quantity: Quantity::new(2).unwrap(),
                line_total: Money::new(14_000),
                position: 0,
                additions: vec![OrderItemAddition {
                    id: 1,
                    order_item_id: OrderItemId::new(1),
                    addition_id: Some(AdditionId::new(1)),
                    addition_name: "Queso".to_owned(),
                    price: Money::new(1_000),
                }],
            }],
        }
    }

    fn config(whatsapp: Option<&str>) -> BusinessConfig {
        BusinessConfig {
            business_name: "Fogon".to_owned(),
            delivery_fee: Money::new(5_000),
            whatsapp_number: whatsapp.map(|n| Phone::parse(n).unwrap()),
        }
    }

    #[test]
    fn test_message_lists_lines_and_totals() {
        let confirmation = build_confirmation(&sample_order(), &config(None));
        let message = confirmation.message;

        assert!(message.starts_with("*Fogon* - Pedido ORD-20261018-001"));
        assert!(message.contains("Cliente: Ana (3001234567)"));
        assert!(message.contains("Dirección: Calle 10 # 5-20"));
        assert!(message.contains("2 x Hamburguesa - $14.000"));
        assert!(message.contains("   + Queso ($1.000)"));
        assert!(message.contains("Domicilio: $5.000"));
        assert!(message.contains("Total: $19.000"));
        assert!(message.contains("Pago: Transferencia (NEQUI-77)"));
        assert!(message.ends_with("Notas: Sin cebolla"));
        assert!(confirmation.whatsapp_url.is_none());
    }

    #[test]
    fn test_whatsapp_link_uses_digits_and_encodes_text() {
        let confirmation = build_confirmation(&sample_order(), &config(Some("+57 300 765 4321")));
        let url = confirmation.whatsapp_url.unwrap();

        assert!(url.starts_with("https://wa.me/573007654321?text="));
        assert!(url.contains("ORD-20261018-001"));
        assert!(!url.contains(' '));
        assert!(url.contains("%2419.000"));
    }

    #[test]
    fn test_pickup_message_has_no_fee_or_address() {
        let mut order = sample_order();
        order.fulfillment_type = FulfillmentType::Pickup;
        order.delivery_fee = Money::ZERO;
        order.total = Money::new(14_000);

        let message = build_confirmation(&order, &config(None)).message;

        assert!(message.contains("Entrega: Recoger en tienda"));
        assert!(!message.contains("Domicilio:"));
        assert!(!message.contains("Dirección"));
    }

    #[test]
    fn test_message_sections_are_separated_by_blank_lines() {
        let mut order = sample_order();
        order.payment_reference = None;
        order.notes = None;

        let message = build_confirmation(&order, &config(None)).message;

        assert_eq!(message.matches("\n\n").count(), 2);
        assert!(message.contains("Dirección: Calle 10 # 5-20\n\n2 x Hamburguesa"));
        assert!(message.contains("   + Queso ($1.000)\n\nSubtotal: $14.000"));
        assert!(message.ends_with("Total: $19.000\nPago: Transferencia"));
    }
}
