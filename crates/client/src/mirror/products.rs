//! Product list and product detail screens.

use gearhub_core::models::{
    ProductDetail, ProductQuery, ProductSummary, ProductUpdate, SortDirection,
};
use gearhub_core::validation::validate_quantity;
use gearhub_core::{ApiResponse, BrandId, CategoryId, Page, ProductId, VariantId};

use super::{Access, Generation, Mirror, MirrorError};
use crate::client::{ApiClient, ProductUpload};
use crate::error::ClientError;

/// Which product listing a screen shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductScope {
    /// The public catalog with full filtering.
    Catalog,
    /// Staff lookup by keyword.
    Staff,
    /// Admin management by keyword.
    Admin,
}

impl ProductScope {
    const fn access(self) -> Option<Access> {
        match self {
            Self::Catalog => None,
            Self::Staff => Some(Access::Staff),
            Self::Admin => Some(Access::Admin),
        }
    }

    /// Run the listing call for this scope.
    ///
    /// # Errors
    ///
    /// Returns the client error.
    pub async fn fetch(
        self,
        client: &ApiClient,
        query: &ProductQuery,
    ) -> Result<ApiResponse<Page<ProductSummary>>, ClientError> {
        match self {
            Self::Catalog => client.list_products(query).await,
            Self::Staff => {
                client
                    .staff_list_products(query.page, query.size, query.keyword())
                    .await
            }
            Self::Admin => {
                client
                    .admin_list_products(query.page, query.size, query.keyword())
                    .await
            }
        }
    }
}

/// An issued product list fetch.
#[derive(Debug, Clone)]
pub struct ProductFetch {
    generation: Generation,
    query: ProductQuery,
}

impl ProductFetch {
    #[must_use]
    pub const fn query(&self) -> &ProductQuery {
        &self.query
    }
}

/// Paginated, filterable product list.
#[derive(Debug)]
pub struct ProductListScreen {
    scope: ProductScope,
    query: ProductQuery,
    mirror: Mirror<Page<ProductSummary>>,
}

impl ProductListScreen {
    #[must_use]
    pub fn new(scope: ProductScope, size: u32) -> Self {
        Self {
            scope,
            query: ProductQuery::new(size),
            mirror: Mirror::new(),
        }
    }

    #[must_use]
    pub const fn scope(&self) -> ProductScope {
        self.scope
    }

    /// Inputs the next fetch will use.
    #[must_use]
    pub const fn query(&self) -> &ProductQuery {
        &self.query
    }

    #[must_use]
    pub const fn mirror(&self) -> &Mirror<Page<ProductSummary>> {
        &self.mirror
    }

    #[must_use]
    pub const fn page(&self) -> Option<&Page<ProductSummary>> {
        self.mirror.data()
    }

    /// Change the search keyword. Resets to the first page when it changes.
    pub fn set_keyword(&mut self, keyword: &str) -> bool {
        let keyword = Some(keyword.trim().to_string()).filter(|k| !k.is_empty());
        if self.query.keyword == keyword {
            return false;
        }
        self.query.keyword = keyword;
        self.query.page = 0;
        true
    }

    /// Change the category filter. Resets to the first page when it changes.
    pub fn set_category(&mut self, category: Option<CategoryId>) -> bool {
        if self.query.category_id == category {
            return false;
        }
        self.query.category_id = category;
        self.query.page = 0;
        true
    }

    /// Change the brand filter. Resets to the first page when it changes.
    pub fn set_brand(&mut self, brand: Option<BrandId>) -> bool {
        if self.query.brand_id == brand {
            return false;
        }
        self.query.brand_id = brand;
        self.query.page = 0;
        true
    }

    /// Change the ordering. Resets to the first page when it changes.
    pub fn set_sort(&mut self, sort_by: &str, direction: SortDirection) -> bool {
        if self.query.sort_by == sort_by && self.query.sort_dir == direction {
            return false;
        }
        sort_by.clone_into(&mut self.query.sort_by);
        self.query.sort_dir = direction;
        self.query.page = 0;
        true
    }

    /// Jump to a zero-based page.
    pub fn set_page(&mut self, page: u32) -> bool {
        if self.query.page == page {
            return false;
        }
        self.query.page = page;
        true
    }

    /// Issue a fetch for the current inputs.
    pub fn begin_fetch(&mut self) -> ProductFetch {
        ProductFetch {
            generation: self.mirror.begin_fetch(),
            query: self.query.clone(),
        }
    }

    /// Apply a fetch result; stale results are dropped.
    pub fn finish(
        &mut self,
        fetch: &ProductFetch,
        result: Result<ApiResponse<Page<ProductSummary>>, ClientError>,
    ) -> bool {
        self.mirror.finish(fetch.generation, result)
    }

    /// Fetch the current inputs to completion.
    ///
    /// # Errors
    ///
    /// Returns `MirrorError::AccessDenied` without any network call when the
    /// session lacks the scope's role, or the fetch error.
    pub async fn refresh(&mut self, client: &ApiClient) -> Result<(), MirrorError> {
        if let Some(access) = self.scope.access() {
            access.check(client).await?;
        }
        let fetch = self.begin_fetch();
        let result = self.scope.fetch(client, &fetch.query).await;
        self.mirror.settle(fetch.generation, result).map(|_| ())
    }

    /// Create a product and reload the list.
    ///
    /// Once the server has confirmed the create, the new id is returned even
    /// if the reload fails; that failure shows in [`Mirror::error`].
    ///
    /// # Errors
    ///
    /// Returns `MirrorError::AccessDenied` outside the admin scope, or the
    /// server error.
    pub async fn create(
        &mut self,
        client: &ApiClient,
        upload: ProductUpload,
    ) -> Result<ProductId, MirrorError> {
        self.require_admin(client).await?;
        self.mirror.begin_mutation()?;
        let result = client.admin_create_product(upload).await;
        let created = self.mirror.end_mutation(result)?;
        self.reload(client).await;
        Ok(created.data.product_id)
    }

    /// Update a product and reload the list.
    ///
    /// # Errors
    ///
    /// Returns `MirrorError::AccessDenied` outside the admin scope, or the
    /// server error.
    pub async fn update(
        &mut self,
        client: &ApiClient,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<(), MirrorError> {
        self.require_admin(client).await?;
        self.mirror.begin_mutation()?;
        let result = client.admin_update_product(id, update).await;
        self.mirror.end_mutation(result)?;
        self.reload(client).await;
        Ok(())
    }

    /// Delete a product; the row disappears once the server confirms.
    ///
    /// # Errors
    ///
    /// Returns `MirrorError::AccessDenied` outside the admin scope, or the
    /// server error.
    pub async fn delete(&mut self, client: &ApiClient, id: ProductId) -> Result<(), MirrorError> {
        self.require_admin(client).await?;
        self.mirror.begin_mutation()?;
        let result = client.admin_delete_product(id).await;
        self.mirror.end_mutation(result)?;
        if let Some(page) = self.mirror.data_mut() {
            page.retain(|p| p.product_id != id);
        }
        Ok(())
    }

    /// Refetch after a confirmed mutation. The mutation stands either way.
    async fn reload(&mut self, client: &ApiClient) {
        if let Err(err) = self.refresh(client).await {
            tracing::warn!(error = %err, "reload after mutation failed");
        }
    }

    async fn require_admin(&mut self, client: &ApiClient) -> Result<(), MirrorError> {
        if self.scope != ProductScope::Admin {
            return Err(self
                .mirror
                .refuse(MirrorError::NotOffered("product editing is admin-only")));
        }
        Access::Admin.check(client).await.map(|_| ())
    }
}

/// How a product detail screen identifies its product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductKey {
    Id(ProductId),
    Slug(String),
}

/// One product with its variants.
#[derive(Debug)]
pub struct ProductDetailScreen {
    key: ProductKey,
    mirror: Mirror<ProductDetail>,
}

impl ProductDetailScreen {
    #[must_use]
    pub const fn new(key: ProductKey) -> Self {
        Self {
            key,
            mirror: Mirror::new(),
        }
    }

    #[must_use]
    pub const fn mirror(&self) -> &Mirror<ProductDetail> {
        &self.mirror
    }

    #[must_use]
    pub const fn product(&self) -> Option<&ProductDetail> {
        self.mirror.data()
    }

    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn refresh(&mut self, client: &ApiClient) -> Result<(), MirrorError> {
        let generation = self.mirror.begin_fetch();
        let result = match &self.key {
            ProductKey::Id(id) => client.get_product(*id).await,
            ProductKey::Slug(slug) => client.get_product_by_slug(slug).await,
        };
        self.mirror.settle(generation, result).map(|_| ())
    }

    /// Put a purchasable variant of this product in the cart.
    ///
    /// # Errors
    ///
    /// Returns `MirrorError::NotOffered` for an unknown or unavailable
    /// variant, a validation error, or the server error.
    pub async fn add_to_cart(
        &mut self,
        client: &ApiClient,
        variant_id: VariantId,
        quantity: u32,
    ) -> Result<(), MirrorError> {
        validate_quantity(quantity)?;
        let purchasable = self
            .product()
            .and_then(|p| p.variant(variant_id))
            .is_some_and(gearhub_core::models::ProductVariant::is_purchasable);
        if !purchasable {
            return Err(self
                .mirror
                .refuse(MirrorError::NotOffered("this variant is not available")));
        }
        Access::SignedIn.check(client).await?;
        self.mirror.begin_mutation()?;
        let result = client.add_to_cart(variant_id, quantity).await;
        self.mirror.end_mutation(result).map(|_| ())
    }
}
