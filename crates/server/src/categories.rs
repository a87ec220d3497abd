//! Categories API endpoints.

use api_types::category::CategoryView;
use axum::Json;
use engine::Category;

use crate::views;

/// The fixed taxonomy, in display order.
pub async fn list() -> Json<Vec<CategoryView>> {
    Json(Category::all().iter().map(views::category).collect())
}
