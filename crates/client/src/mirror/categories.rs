//! Admin category tree.

use gearhub_core::CategoryId;
use gearhub_core::models::{Category, CategoryInput};

use super::{Access, Mirror, MirrorError};
use crate::client::ApiClient;

/// Category management. Every confirmed change reloads the tree, since a
/// change to one node can move others.
#[derive(Debug, Default)]
pub struct CategoryScreen {
    mirror: Mirror<Vec<Category>>,
}

impl CategoryScreen {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mirror: Mirror::new(),
        }
    }

    #[must_use]
    pub const fn mirror(&self) -> &Mirror<Vec<Category>> {
        &self.mirror
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        self.mirror.data().map_or(&[], Vec::as_slice)
    }

    /// Categories as `(depth, category)` rows in display order.
    #[must_use]
    pub fn rows(&self) -> Vec<(usize, &Category)> {
        Category::flatten(self.categories())
    }

    /// Find a category anywhere in the tree.
    #[must_use]
    pub fn find(&self, id: CategoryId) -> Option<&Category> {
        self.categories().iter().find_map(|c| c.find(id))
    }

    /// # Errors
    ///
    /// Returns an access error without any network call, or the fetch error.
    pub async fn refresh(&mut self, client: &ApiClient) -> Result<(), MirrorError> {
        Access::Admin.check(client).await?;
        let generation = self.mirror.begin_fetch();
        let result = client.admin_list_categories().await;
        self.mirror.settle(generation, result).map(|_| ())
    }

    /// # Errors
    ///
    /// Returns `MirrorError::InvalidInput` for a blank name, an access error,
    /// or the server error.
    pub async fn create(
        &mut self,
        client: &ApiClient,
        input: &CategoryInput,
    ) -> Result<CategoryId, MirrorError> {
        if input.name.as_deref().is_none_or(|n| n.trim().is_empty()) {
            return Err(self
                .mirror
                .refuse(MirrorError::InvalidInput("category name is required".to_string())));
        }
        Access::Admin.check(client).await?;
        self.mirror.begin_mutation()?;
        let result = client.admin_create_category(input).await;
        let created = self.mirror.end_mutation(result)?;
        self.reload(client).await;
        Ok(created.data.category_id)
    }

    /// # Errors
    ///
    /// Returns an access error or the server error.
    pub async fn update(
        &mut self,
        client: &ApiClient,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<(), MirrorError> {
        Access::Admin.check(client).await?;
        self.mirror.begin_mutation()?;
        let result = client.admin_update_category(id, input).await;
        self.mirror.end_mutation(result)?;
        self.reload(client).await;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an access error or the server error (for example when the
    /// category still has products).
    pub async fn delete(&mut self, client: &ApiClient, id: CategoryId) -> Result<(), MirrorError> {
        Access::Admin.check(client).await?;
        self.mirror.begin_mutation()?;
        let result = client.admin_delete_category(id).await;
        self.mirror.end_mutation(result)?;
        self.reload(client).await;
        Ok(())
    }

    async fn reload(&mut self, client: &ApiClient) {
        if let Err(err) = self.refresh(client).await {
            tracing::warn!(error = %err, "category reload failed");
        }
    }
}
