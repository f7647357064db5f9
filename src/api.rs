use std::collections::HashMap;

use actix_web::{http::StatusCode, web, HttpResponse, ResponseError};
use sqlx::SqlitePool;

use crate::{
    data::{Dish, Restaurant},
    db::{self, Entity, FilterValue, Filters, QueryProps, QueryPropsBuilder, SortBy},
    error::QueryError,
};

pub struct ApiState {
    db_pool: SqlitePool,
}

impl ApiState {
    pub fn new(db_pool: SqlitePool) -> Self {
        Self { db_pool }
    }
}

#[derive(serde::Serialize)]
struct MessageJsonResp<'a> {
    message: &'a str,
}

#[derive(serde::Serialize)]
struct ErrJsonResp {
    error: String,
}

impl ResponseError for QueryError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            err if err.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if let Self::NotFound(message) = self {
            tracing::debug!("{message}");
            return HttpResponse::build(status).json(MessageJsonResp {
                message: message.as_str(),
            });
        }

        if status.is_server_error() {
            tracing::error!("fail to answer query: {self}");
        } else {
            tracing::debug!("rejected query: {self}");
        }
        HttpResponse::build(status).json(ErrJsonResp {
            error: self.to_string(),
        })
    }
}

fn many_json<E: Entity>(rows: Vec<E>) -> Result<HttpResponse, QueryError> {
    let mut body = serde_json::Map::new();
    body.insert(E::CONFIG.plural.to_string(), serde_json::to_value(rows)?);
    Ok(HttpResponse::Ok().json(body))
}

fn one_json<E: Entity>(row: E) -> Result<HttpResponse, QueryError> {
    let mut body = serde_json::Map::new();
    body.insert(E::CONFIG.singular.to_string(), serde_json::to_value(row)?);
    Ok(HttpResponse::Ok().json(body))
}

/// Rows matching `props`, or 404 when there are none.
async fn fetch_many<E: Entity>(
    pool: &SqlitePool,
    props: QueryProps,
    not_found: String,
) -> Result<HttpResponse, QueryError> {
    let rows = db::query::<E>(pool, props)
        .await?
        .require_many(not_found)?;
    many_json(rows)
}

/// Rows matching `props`; an empty list is still a success.
async fn fetch_listing<E: Entity>(
    pool: &SqlitePool,
    props: QueryProps,
) -> Result<HttpResponse, QueryError> {
    let rows = db::query::<E>(pool, props).await?.into_rows();
    many_json(rows)
}

async fn fetch_one<E: Entity>(pool: &SqlitePool, id: i64) -> Result<HttpResponse, QueryError> {
    let props = QueryPropsBuilder::default().id(id).build()?;
    let row = db::query::<E>(pool, props)
        .await?
        .require_one(format!("No {} found with id: {id}", E::CONFIG.singular))?;
    one_json(row)
}

async fn fetch_filtered<E: Entity>(
    pool: &SqlitePool,
    params: &HashMap<String, String>,
) -> Result<HttpResponse, QueryError> {
    let filters = Filters::from_params(&E::CONFIG, params)?;
    let props = QueryPropsBuilder::default().filters(filters).build()?;
    fetch_many::<E>(
        pool,
        props,
        format!("No {} found matching the filters!", E::CONFIG.plural),
    )
    .await
}

#[derive(serde::Deserialize)]
pub struct DetailsPath {
    id: i64,
}

#[derive(serde::Deserialize)]
pub struct CuisinePath {
    cuisine: String,
}

#[actix_web::get("/restaurants")]
pub async fn restaurants(data: web::Data<ApiState>) -> Result<HttpResponse, QueryError> {
    fetch_many::<Restaurant>(
        &data.db_pool,
        QueryProps::default(),
        "No restaurants are found!".to_string(),
    )
    .await
}

#[actix_web::get("/restaurants/details/{id}")]
pub async fn restaurant_details(
    data: web::Data<ApiState>,
    path: web::Path<DetailsPath>,
) -> Result<HttpResponse, QueryError> {
    fetch_one::<Restaurant>(&data.db_pool, path.id).await
}

#[actix_web::get("/restaurants/cuisine/{cuisine}")]
pub async fn restaurants_by_cuisine(
    data: web::Data<ApiState>,
    path: web::Path<CuisinePath>,
) -> Result<HttpResponse, QueryError> {
    let cuisine = path.into_inner().cuisine;
    let not_found = format!("No restaurants found with cuisine: {cuisine}");
    let props = QueryPropsBuilder::default()
        .filters(Filters::new().with("cuisine", FilterValue::Text(cuisine)))
        .build()?;
    fetch_many::<Restaurant>(&data.db_pool, props, not_found).await
}

#[actix_web::get("/restaurants/filter")]
pub async fn filter_restaurants(
    data: web::Data<ApiState>,
    params: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, QueryError> {
    fetch_filtered::<Restaurant>(&data.db_pool, &params).await
}

#[actix_web::get("/restaurants/sort-by-rating")]
pub async fn restaurants_by_rating(
    data: web::Data<ApiState>,
) -> Result<HttpResponse, QueryError> {
    let props = QueryPropsBuilder::default()
        .sort_by(SortBy::desc("rating"))
        .build()?;
    fetch_listing::<Restaurant>(&data.db_pool, props).await
}

#[actix_web::get("/dishes")]
pub async fn dishes(data: web::Data<ApiState>) -> Result<HttpResponse, QueryError> {
    fetch_many::<Dish>(
        &data.db_pool,
        QueryProps::default(),
        "No dishes are found!".to_string(),
    )
    .await
}

#[actix_web::get("/dishes/details/{id}")]
pub async fn dish_details(
    data: web::Data<ApiState>,
    path: web::Path<DetailsPath>,
) -> Result<HttpResponse, QueryError> {
    fetch_one::<Dish>(&data.db_pool, path.id).await
}

#[actix_web::get("/dishes/filter")]
pub async fn filter_dishes(
    data: web::Data<ApiState>,
    params: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, QueryError> {
    fetch_filtered::<Dish>(&data.db_pool, &params).await
}

#[actix_web::get("/dishes/sort-by-price")]
pub async fn dishes_by_price(data: web::Data<ApiState>) -> Result<HttpResponse, QueryError> {
    let props = QueryPropsBuilder::default()
        .sort_by(SortBy::asc("price"))
        .build()?;
    fetch_listing::<Dish>(&data.db_pool, props).await
}

/// Register every endpoint. Expects `web::Data<ApiState>` in the app data.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(restaurants)
        .service(restaurant_details)
        .service(restaurants_by_cuisine)
        .service(filter_restaurants)
        .service(restaurants_by_rating)
        .service(dishes)
        .service(dish_details)
        .service(filter_dishes)
        .service(dishes_by_price);
}
