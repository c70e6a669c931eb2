//! Seed the catalogue with sample data for local development.

use rust_decimal::Decimal;

use super::CommandError;

/// `(name, description, price in cents, stock, tags)`
const SAMPLE_PRODUCTS: &[(&str, &str, i64, i32, &[&str])] = &[
    (
        "Wireless Mouse",
        "Ergonomic 2.4 GHz wireless mouse with USB receiver",
        2995,
        120,
        &["peripherals", "wireless"],
    ),
    (
        "Mechanical Keyboard",
        "Tenkeyless mechanical keyboard with tactile switches",
        8990,
        45,
        &["peripherals", "keyboards"],
    ),
    (
        "27\" Monitor",
        "27 inch 1440p IPS monitor with thin bezels",
        32900,
        18,
        &["displays"],
    ),
    (
        "USB-C Hub",
        "7-in-1 USB-C hub with HDMI, ethernet and card reader",
        4550,
        200,
        &["adapters", "wireless"],
    ),
    (
        "Noise-Cancelling Headphones",
        "Over-ear headphones with active noise cancellation",
        19900,
        60,
        &["audio", "wireless"],
    ),
];

/// Insert the sample catalogue. Safe to run more than once; products are
/// matched by name and skipped when already present.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = super::connect().await?;

    let mut created = 0u32;
    for (name, description, cents, stock, tags) in SAMPLE_PRODUCTS {
        let existing: Option<(i32,)> = sqlx::query_as("SELECT id FROM product WHERE name = ?")
            .bind(name)
            .fetch_optional(&pool)
            .await?;
        if existing.is_some() {
            tracing::info!(name, "product already present, skipping");
            continue;
        }

        let result = sqlx::query(
            "INSERT INTO product (name, description, price, stock, available) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(name)
        .bind(description)
        .bind(Decimal::new(*cents, 2))
        .bind(stock)
        .bind(stock)
        .execute(&pool)
        .await?;
        let product_id = result.last_insert_id();

        for tag in *tags {
            sqlx::query("INSERT IGNORE INTO tag (name) VALUES (?)")
                .bind(tag)
                .execute(&pool)
                .await?;
            sqlx::query(
                "INSERT INTO product_tag (product_id, tag_id) \
                 SELECT ?, id FROM tag WHERE name = ?",
            )
            .bind(product_id)
            .bind(tag)
            .execute(&pool)
            .await?;
        }

        created += 1;
        tracing::info!(name, "product seeded");
    }

    tracing::info!(created, "seeding complete");
    Ok(())
}
