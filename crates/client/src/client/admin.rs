//! Admin scope: product, order and category administration.

use std::path::Path;

use gearhub_core::models::{
    Category, CategoryInput, CreatedProduct, NewProduct, NewVariant, OrderDetail, OrderSummary,
    ProductDetail, ProductQuery, ProductSummary, ProductUpdate, Specification,
    UpdateOrderStatusRequest,
};
use gearhub_core::{ApiResponse, CategoryId, OrderId, OrderStatus, Page, ProductId, StatusFilter};
use reqwest::multipart::{Form, Part};
use tracing::instrument;

use super::{ApiClient, keyword_paging, status_paging};
use crate::error::ClientError;

/// Image attached to a new product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Read an image from disk, guessing its type from the extension.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be read.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "image".to_string(), |n| n.to_string_lossy().into_owned());
        let content_type = match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("png") => "image/png",
            Some("jpg" | "jpeg") => "image/jpeg",
            Some("webp") => "image/webp",
            Some("gif") => "image/gif",
            _ => "application/octet-stream",
        };
        Ok(Self {
            file_name,
            content_type: content_type.to_string(),
            bytes,
        })
    }
}

/// Everything needed to create a product in one multipart request.
#[derive(Debug, Clone)]
pub struct ProductUpload {
    pub product: NewProduct,
    pub variants: Vec<NewVariant>,
    pub specifications: Vec<Specification>,
    pub image: Option<ImageUpload>,
}

impl ProductUpload {
    /// Build the multipart form: an optional `image` file part plus the
    /// `product`, `variants` and `specifications` parts as JSON text.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Encode` if a part cannot be serialized or the
    /// image content type is invalid.
    pub fn into_form(self) -> Result<Form, ClientError> {
        let encode = |e: serde_json::Error| ClientError::Encode(e.to_string());

        let mut form = Form::new()
            .text("product", serde_json::to_string(&self.product).map_err(encode)?)
            .text("variants", serde_json::to_string(&self.variants).map_err(encode)?)
            .text(
                "specifications",
                serde_json::to_string(&self.specifications).map_err(encode)?,
            );

        if let Some(image) = self.image {
            let part = Part::bytes(image.bytes)
                .file_name(image.file_name)
                .mime_str(&image.content_type)
                .map_err(|e| ClientError::Encode(e.to_string()))?;
            form = form.part("image", part);
        }
        Ok(form)
    }
}

impl ApiClient {
    /// Create a product with its variants, specifications and image.
    ///
    /// # Errors
    ///
    /// Returns the transport error.
    #[instrument(skip(self, upload), fields(name = %upload.product.name))]
    pub async fn admin_create_product(
        &self,
        upload: ProductUpload,
    ) -> Result<ApiResponse<CreatedProduct>, ClientError> {
        let form = upload.into_form()?;
        self.transport().multipart("/admin/product/add", form).await
    }

    /// Admin product listing. Falls back to the demo catalog like the public
    /// listing.
    ///
    /// # Errors
    ///
    /// Returns the transport error when no fallback applies.
    #[instrument(skip(self))]
    pub async fn admin_list_products(
        &self,
        page: u32,
        size: u32,
        keyword: Option<&str>,
    ) -> Result<ApiResponse<Page<ProductSummary>>, ClientError> {
        let params = keyword_paging(page, size, keyword);
        let query = ProductQuery {
            page,
            size,
            keyword: keyword.map(str::to_string),
            ..ProductQuery::default()
        };
        self.products_with_fallback(self.transport().get("/admin/product", &params), &query)
            .await
    }

    /// # Errors
    ///
    /// Returns the transport error.
    #[instrument(skip(self))]
    pub async fn admin_get_product(
        &self,
        id: ProductId,
    ) -> Result<ApiResponse<ProductDetail>, ClientError> {
        self.transport()
            .get(&format!("/admin/product/{id}"), &[])
            .await
    }

    /// Update a product with a JSON body. The image cannot be replaced here.
    ///
    /// # Errors
    ///
    /// Returns the transport error.
    #[instrument(skip(self, update))]
    pub async fn admin_update_product(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<ApiResponse<ProductDetail>, ClientError> {
        self.transport()
            .put(&format!("/admin/product/{id}"), update)
            .await
    }

    /// # Errors
    ///
    /// Returns the transport error.
    #[instrument(skip(self))]
    pub async fn admin_delete_product(&self, id: ProductId) -> Result<ApiResponse<()>, ClientError> {
        self.transport()
            .delete(&format!("/admin/product/{id}"))
            .await
    }

    /// # Errors
    ///
    /// Returns the transport error.
    #[instrument(skip(self))]
    pub async fn admin_list_orders(
        &self,
        page: u32,
        size: u32,
        status: StatusFilter,
    ) -> Result<ApiResponse<Page<OrderSummary>>, ClientError> {
        self.transport()
            .get("/admin/order", &status_paging(page, size, status))
            .await
    }

    /// # Errors
    ///
    /// Returns the transport error.
    #[instrument(skip(self))]
    pub async fn admin_get_order(
        &self,
        id: OrderId,
    ) -> Result<ApiResponse<OrderDetail>, ClientError> {
        self.transport().get(&format!("/admin/order/{id}"), &[]).await
    }

    /// # Errors
    ///
    /// Returns the transport error.
    #[instrument(skip(self))]
    pub async fn admin_update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<ApiResponse<OrderDetail>, ClientError> {
        let body = UpdateOrderStatusRequest {
            status_id: status.id(),
        };
        self.transport()
            .put(&format!("/admin/order/{id}/status"), &body)
            .await
    }

    /// # Errors
    ///
    /// Returns the transport error.
    #[instrument(skip(self))]
    pub async fn admin_list_categories(&self) -> Result<ApiResponse<Vec<Category>>, ClientError> {
        self.transport().get("/admin/category", &[]).await
    }

    /// # Errors
    ///
    /// Returns the transport error.
    #[instrument(skip(self))]
    pub async fn admin_create_category(
        &self,
        input: &CategoryInput,
    ) -> Result<ApiResponse<Category>, ClientError> {
        self.transport().post("/admin/category", input).await
    }

    /// # Errors
    ///
    /// Returns the transport error.
    #[instrument(skip(self))]
    pub async fn admin_update_category(
        &self,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<ApiResponse<Category>, ClientError> {
        self.transport()
            .put(&format!("/admin/category/{id}"), input)
            .await
    }

    /// # Errors
    ///
    /// Returns the transport error.
    #[instrument(skip(self))]
    pub async fn admin_delete_category(
        &self,
        id: CategoryId,
    ) -> Result<ApiResponse<()>, ClientError> {
        self.transport()
            .delete(&format!("/admin/category/{id}"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use gearhub_core::{BrandId, CategoryId};
    use rust_decimal::Decimal;

    use super::*;

    fn upload(image: Option<ImageUpload>) -> ProductUpload {
        ProductUpload {
            product: NewProduct {
                name: "Test Mouse".to_string(),
                slug: None,
                short_description: None,
                full_description: None,
                brand_id: BrandId::new(2),
                category_id: CategoryId::new(2),
                model_number: None,
                release_year: None,
                default_price: Some(Decimal::new(500_000, 0)),
            },
            variants: vec![NewVariant {
                sku: "TM-1".to_string(),
                attributes: None,
                price: Decimal::new(500_000, 0),
                stock: 10,
                is_active: None,
            }],
            specifications: vec![],
            image,
        }
    }

    #[test]
    fn test_form_builds_with_and_without_image() {
        assert!(upload(None).into_form().is_ok());
        let image = ImageUpload {
            file_name: "mouse.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        };
        assert!(upload(Some(image)).into_form().is_ok());
    }

    #[test]
    fn test_invalid_image_type_is_encode_error() {
        let image = ImageUpload {
            file_name: "x".to_string(),
            content_type: "not a mime type".to_string(),
            bytes: vec![],
        };
        assert!(matches!(
            upload(Some(image)).into_form(),
            Err(ClientError::Encode(_))
        ));
    }

    #[tokio::test]
    async fn test_image_from_path_guesses_type() {
        let path = std::env::temp_dir().join(format!("gearhub-upload-{}.JPG", std::process::id()));
        tokio::fs::write(&path, b"jpeg").await.expect("write");
        let image = ImageUpload::from_path(&path).await.expect("read");
        assert_eq!(image.content_type, "image/jpeg");
        assert_eq!(image.bytes, b"jpeg");
        tokio::fs::remove_file(&path).await.expect("cleanup");
    }
}
