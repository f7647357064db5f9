#![allow(dead_code)]

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

const SCHEMA: &[&str] = &[
    r#"
CREATE TABLE restaurants (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    cuisine TEXT NOT NULL,
    isVeg BOOLEAN NOT NULL,
    hasOutdoorSeating BOOLEAN NOT NULL,
    isLuxury BOOLEAN NOT NULL,
    rating REAL NOT NULL
)"#,
    r#"
CREATE TABLE dishes (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    price REAL NOT NULL,
    isVeg BOOLEAN NOT NULL
)"#,
];

const SEED: &[&str] = &[
    r#"
INSERT INTO restaurants
    (id, name, cuisine, isVeg, hasOutdoorSeating, isLuxury, rating)
VALUES
    (1, 'Spice Kitchen', 'Indian', 1, 1, 0, 4.5),
    (2, 'Olive Bistro', 'Italian', 0, 1, 1, 4.8),
    (3, 'Green Leaf', 'Indian', 1, 0, 0, 3.9),
    (4, 'Dragon Wok', 'Chinese', 0, 0, 1, 4.5),
    (5, 'Sakura', 'Japanese', 1, 1, 0, 4.2)"#,
    r#"
INSERT INTO dishes
    (id, name, price, isVeg)
VALUES
    (1, 'Paneer Tikka', 250, 1),
    (2, 'Chicken Biryani', 320, 0),
    (3, 'Margherita', 199.5, 1),
    (4, 'Sushi Platter', 540, 0),
    (5, 'Dal Makhani', 199.5, 1)"#,
];

/// A private in-memory database. One connection that never expires, so the
/// data lives as long as the pool.
pub async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap()
}

async fn run(pool: &SqlitePool, statements: &[&str]) {
    for statement in statements {
        sqlx::query(statement).execute(pool).await.unwrap();
    }
}

/// Both tables, no rows.
pub async fn empty_pool() -> SqlitePool {
    let pool = memory_pool().await;
    run(&pool, SCHEMA).await;
    pool
}

/// Both tables with five restaurants and five dishes.
pub async fn seeded_pool() -> SqlitePool {
    let pool = empty_pool().await;
    run(&pool, SEED).await;
    pool
}

/// Numeric columns declared `NUMERIC` and `INTEGER` instead of `REAL`, so
/// whole numbers come back from SQLite as integers.
pub async fn loosely_typed_pool() -> SqlitePool {
    let pool = memory_pool().await;
    run(
        &pool,
        &[
            r#"
CREATE TABLE restaurants (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    cuisine TEXT NOT NULL,
    isVeg INTEGER NOT NULL,
    hasOutdoorSeating INTEGER NOT NULL,
    isLuxury INTEGER NOT NULL,
    rating NUMERIC NOT NULL
)"#,
            r#"
CREATE TABLE dishes (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    price INTEGER NOT NULL,
    isVeg BOOLEAN NOT NULL
)"#,
            r#"
INSERT INTO restaurants
    (id, name, cuisine, isVeg, hasOutdoorSeating, isLuxury, rating)
VALUES
    (1, 'Spice Kitchen', 'Indian', 1, 1, 0, 4),
    (2, 'Olive Bistro', 'Italian', 0, 1, 1, 4.5),
    (3, 'Green Leaf', 'Indian', 1, 0, 0, 3)"#,
            r#"
INSERT INTO dishes
    (id, name, price, isVeg)
VALUES
    (1, 'Paneer Tikka', 250, 1),
    (2, 'Chicken Biryani', 320, 0),
    (3, 'Dal Makhani', 180, 1)"#,
        ],
    )
    .await;
    pool
}
