//! Demo menu seed data.
//!
//! Inserts a small menu (categories, products, additions) and names the
//! business. Skipped when the catalog already has products.

use sqlx::{Postgres, Transaction};
use tracing::info;

use super::{CommandError, connect};

/// Menu categories with their products (name, price, description).
const MENU: &[(&str, &[(&str, i64, &str)])] = &[
    (
        "Hamburguesas",
        &[
            ("Hamburguesa clasica", 18_000, "Carne de res, queso, lechuga y tomate"),
            ("Hamburguesa doble", 24_000, "Doble carne y doble queso"),
            ("Hamburguesa de pollo", 19_000, "Pechuga apanada y salsa de la casa"),
        ],
    ),
    (
        "Perros",
        &[
            ("Perro sencillo", 12_000, "Salchicha americana, papa ripio y salsas"),
            ("Perro especial", 16_000, "Con tocineta, queso y huevo de codorniz"),
        ],
    ),
    (
        "Bebidas",
        &[
            ("Limonada natural", 6_000, "Limon fresco"),
            ("Gaseosa", 4_500, "350 ml"),
        ],
    ),
];

/// Additions (name, price).
const ADDITIONS: &[(&str, i64)] = &[
    ("Queso extra", 3_000),
    ("Tocineta", 4_000),
    ("Huevo", 2_000),
    ("Papas a la francesa", 5_000),
];

/// Seed the demo menu.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM fogon.products")
        .fetch_one(&pool)
        .await?;
    if existing > 0 {
        info!(products = existing, "Catalog already has products, skipping seed");
        return Ok(());
    }

    let mut tx = pool.begin().await?;

    let mut products = 0;
    for (position, (category, items)) in (0_i32..).zip(MENU) {
        let category_id = insert_category(&mut tx, category, position).await?;
        for (item_position, (name, price, description)) in (0_i32..).zip(*items) {
            sqlx::query(
                r"
                INSERT INTO fogon.products (category_id, name, price, description, display_order)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(category_id)
            .bind(name)
            .bind(price)
            .bind(description)
            .bind(item_position)
            .execute(&mut *tx)
            .await?;
            products += 1;
        }
    }

    for (position, (name, price)) in (0_i32..).zip(ADDITIONS) {
        sqlx::query(
            "INSERT INTO fogon.additions (name, price, display_order) VALUES ($1, $2, $3)",
        )
        .bind(name)
        .bind(price)
        .bind(position)
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query(
        r"
        INSERT INTO fogon.business_config (id, business_name)
        VALUES (TRUE, 'Fogon')
        ON CONFLICT (id) DO NOTHING
        ",
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(
        categories = MENU.len(),
        products,
        additions = ADDITIONS.len(),
        "Seed complete!"
    );
    Ok(())
}

async fn insert_category(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
    position: i32,
) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO fogon.categories (name, display_order) VALUES ($1, $2) RETURNING id",
    )
    .bind(name)
    .bind(position)
    .fetch_one(&mut **tx)
    .await
}
