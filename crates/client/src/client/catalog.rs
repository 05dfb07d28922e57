//! Public product catalog.

use gearhub_core::models::{ProductDetail, ProductQuery, ProductSummary};
use gearhub_core::{ApiResponse, Page, ProductId};
use tracing::instrument;

use super::{ApiClient, paging};
use crate::error::ClientError;
use crate::transport::Query;

/// Full query string for a catalog listing.
fn catalog_query(query: &ProductQuery) -> Query {
    let mut params = paging(query.page, query.size);
    if let Some(keyword) = query.keyword() {
        params.push(("keyword", keyword.to_string()));
    }
    if let Some(category) = query.category_id {
        params.push(("categoryId", category.to_string()));
    }
    if let Some(brand) = query.brand_id {
        params.push(("brandId", brand.to_string()));
    }
    params.push(("sortBy", query.sort_by.clone()));
    params.push(("sortDir", query.sort_dir.as_str().to_string()));
    params
}

impl ApiClient {
    /// List products with filters, sorting and pagination.
    ///
    /// Falls back to the demo catalog when enabled and the backend is down.
    ///
    /// # Errors
    ///
    /// Returns the transport error when no fallback applies.
    #[instrument(skip(self), fields(page = query.page, size = query.size))]
    pub async fn list_products(
        &self,
        query: &ProductQuery,
    ) -> Result<ApiResponse<Page<ProductSummary>>, ClientError> {
        let params = catalog_query(query);
        self.products_with_fallback(self.transport().get("/products", &params), query)
            .await
    }

    /// # Errors
    ///
    /// Returns the transport error.
    #[instrument(skip(self))]
    pub async fn get_product(
        &self,
        id: ProductId,
    ) -> Result<ApiResponse<ProductDetail>, ClientError> {
        self.transport().get(&format!("/products/{id}"), &[]).await
    }

    /// # Errors
    ///
    /// Returns the transport error.
    #[instrument(skip(self))]
    pub async fn get_product_by_slug(
        &self,
        slug: &str,
    ) -> Result<ApiResponse<ProductDetail>, ClientError> {
        self.transport()
            .get_segments(&["products", "slug", slug])
            .await
    }
}

#[cfg(test)]
mod tests {
    use gearhub_core::models::SortDirection;
    use gearhub_core::{BrandId, CategoryId};

    use super::*;

    #[test]
    fn test_catalog_query_defaults() {
        let params = catalog_query(&ProductQuery::default());
        assert_eq!(
            params,
            vec![
                ("page", "0".to_string()),
                ("size", "10".to_string()),
                ("sortBy", "createdAt".to_string()),
                ("sortDir", "DESC".to_string()),
            ]
        );
    }

    #[test]
    fn test_catalog_query_with_filters() {
        let query = ProductQuery {
            page: 2,
            size: 20,
            keyword: Some(" oled ".to_string()),
            category_id: Some(CategoryId::new(1)),
            brand_id: Some(BrandId::new(4)),
            sort_by: "name".to_string(),
            sort_dir: SortDirection::Asc,
        };
        let params = catalog_query(&query);
        assert!(params.contains(&("keyword", "oled".to_string())));
        assert!(params.contains(&("categoryId", "1".to_string())));
        assert!(params.contains(&("brandId", "4".to_string())));
        assert!(params.contains(&("sortDir", "ASC".to_string())));
    }
}
