//! # Seed Data Generator
//!
//! Populates the database with demo categories and products for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./storefront.db
//! cargo run -p storefront-db --bin seed
//!
//! # Specify database path
//! cargo run -p storefront-db --bin seed -- --db ./data/storefront.db
//! ```
//!
//! Each category gets a handful of products. Roughly one in five products is
//! seeded out of stock and one in seven with untracked stock, so checkout
//! skipping and unlimited stock can be tried by hand.

use std::env;

use rand::Rng;
use storefront_core::{CategoryDraft, ProductDraft};
use storefront_db::{Database, DbConfig};

/// Demo catalog: (category, description, [(sku stem, product name)]).
const CATALOG: &[(&str, &str, &[(&str, &str)])] = &[
    (
        "Beverages",
        "Soft drinks, water and juice",
        &[
            ("COLA", "Cola 330ml"),
            ("LEMON", "Lemon Soda 330ml"),
            ("WATER", "Still Water 500ml"),
            ("OJ", "Orange Juice 1L"),
            ("TEA", "Iced Tea 500ml"),
        ],
    ),
    (
        "Snacks",
        "Chips, candy and cookies",
        &[
            ("CHIPS", "Salted Chips 150g"),
            ("NACHO", "Nacho Chips 200g"),
            ("CHOCO", "Milk Chocolate Bar"),
            ("COOKIE", "Oat Cookies 12pk"),
        ],
    ),
    (
        "Dairy",
        "Milk, cheese and yogurt",
        &[
            ("MILK", "Whole Milk 1L"),
            ("CHEDDAR", "Cheddar 200g"),
            ("YOGURT", "Greek Yogurt 500g"),
        ],
    ),
    (
        "Household",
        "Cleaning and paper goods",
        &[
            ("SOAP", "Dish Soap 750ml"),
            ("TOWEL", "Paper Towels 6pk"),
            ("SPONGE", "Sponges 3pk"),
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./storefront.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Storefront Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./storefront.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Storefront Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let mut rng = rand::thread_rng();
    let mut generated = 0usize;

    for (category_name, description, products) in CATALOG {
        let category = db
            .categories()
            .insert(&CategoryDraft {
                name: category_name.to_string(),
                description: Some(description.to_string()),
            })
            .await?;

        for (stem, name) in products.iter() {
            let stock = match rng.gen_range(0..35) {
                0..=6 => Some(0),
                7..=11 => None,
                n => Some(n as i64),
            };

            db.products()
                .insert(&ProductDraft {
                    sku: Some(format!("{}-{:03}", stem, generated + 1)),
                    name: name.to_string(),
                    stock,
                    price_cents: Some(rng.gen_range(99..=1999)),
                    category: Some(category.uuid.clone()),
                })
                .await?;

            generated += 1;
        }

        println!("  ✓ {} ({} products)", category_name, products.len());
    }

    println!();
    println!("✓ Seeded {} categories and {} products", CATALOG.len(), generated);

    db.close().await;
    Ok(())
}
