use serde::Serialize;

use crate::db::{Column, Entity, EntityConfig, Field, FieldKind};

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    pub cuisine: String,
    pub is_veg: bool,
    pub has_outdoor_seating: bool,
    pub is_luxury: bool,
    pub rating: f64,
}

impl Entity for Restaurant {
    const CONFIG: EntityConfig = EntityConfig {
        table: "restaurants",
        singular: "restaurant",
        plural: "restaurants",
        columns: &[
            Column::plain("id"),
            Column::plain("name"),
            Column::plain("cuisine"),
            Column::plain("isVeg"),
            Column::plain("hasOutdoorSeating"),
            Column::plain("isLuxury"),
            Column::real("rating"),
        ],
        filters: &[
            Field::new("cuisine", FieldKind::Text),
            Field::new("isVeg", FieldKind::Bool),
            Field::new("hasOutdoorSeating", FieldKind::Bool),
            Field::new("isLuxury", FieldKind::Bool),
            Field::new("rating", FieldKind::Real),
        ],
        sorts: &["rating", "name"],
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct Dish {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub is_veg: bool,
}

impl Entity for Dish {
    const CONFIG: EntityConfig = EntityConfig {
        table: "dishes",
        singular: "dish",
        plural: "dishes",
        columns: &[
            Column::plain("id"),
            Column::plain("name"),
            Column::real("price"),
            Column::plain("isVeg"),
        ],
        filters: &[
            Field::new("isVeg", FieldKind::Bool),
            Field::new("price", FieldKind::Real),
        ],
        sorts: &["price", "name"],
    };
}

/// Tables every running server expects to find in the store.
pub const TABLES: &[&EntityConfig] = &[&Restaurant::CONFIG, &Dish::CONFIG];
