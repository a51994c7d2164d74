use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::domain::aggregates::{Category, Page, Product, ProductQuery};
use crate::{AppState, Result};

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub category: Option<String>,
    pub search: Option<String>,
}

impl From<ListParams> for ProductQuery {
    fn from(p: ListParams) -> Self { ProductQuery::new(p.page, p.per_page, p.category, p.search) }
}

pub async fn list_products(State(s): State<AppState>, Query(p): Query<ListParams>) -> Result<Json<Page<Product>>> {
    Ok(Json(s.backend.list_products(&p.into()).await?))
}

pub async fn get_product(State(s): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>> {
    Ok(Json(s.backend.get_product(&id).await?))
}

pub async fn list_categories(State(s): State<AppState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(s.backend.list_categories().await?))
}
