//! Product catalog browsing and editing.

use importer_client::ClientError;
use importer_core::{MessageResponse, Product, ProductDraft, ProductFilter, ProductId, ProductPage};
use tracing::{info, warn};

use crate::confirm::ConfirmationRequest;
use crate::coordinator::ImportCoordinator;
use crate::error::{Result, TrackerError};
use crate::state::Shared;

impl Shared {
    /// Fetch the current page with the current filters and store it.
    pub(crate) async fn load_products(&self) -> std::result::Result<ProductPage, ClientError> {
        let (page, filter) = {
            let ui = self.ui();
            (ui.product_page, ui.product_filter.clone())
        };
        match self
            .api
            .list_products(page, self.settings.page_size, &filter)
            .await
        {
            Ok(result) => {
                self.update(|ui| ui.products = Some(result.clone()));
                Ok(result)
            }
            Err(e) => {
                warn!(page, error = %e, "failed to load products");
                self.notifier.error("Failed to load products");
                Err(e)
            }
        }
    }
}

/// Trim a draft's text fields, turning blank optionals into `None`.
pub fn normalize_product_draft(draft: &ProductDraft) -> Result<ProductDraft> {
    let optional = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let clean = ProductDraft {
        sku: draft.sku.trim().to_string(),
        name: draft.name.trim().to_string(),
        description: optional(&draft.description),
        price: draft.price,
        inventory_count: draft.inventory_count,
        category: optional(&draft.category),
        brand: optional(&draft.brand),
        is_active: draft.is_active,
    };

    if clean.sku.is_empty() || clean.name.is_empty() {
        return Err(TrackerError::InvalidDraft("SKU and name are required".into()));
    }
    if clean.price.is_some_and(|p| p < 0.0) {
        return Err(TrackerError::InvalidDraft("Price cannot be negative".into()));
    }
    Ok(clean)
}

impl ImportCoordinator {
    /// Reload the current product page.
    pub async fn load_products(&self) -> Result<ProductPage> {
        Ok(self.shared.load_products().await?)
    }

    /// Apply new filters and go back to the first page.
    pub async fn filter_products(&self, filter: ProductFilter) -> Result<ProductPage> {
        self.shared.update(|ui| {
            ui.product_filter = filter;
            ui.product_page = 1;
        });
        self.load_products().await
    }

    /// Drop all filters and go back to the first page.
    pub async fn clear_product_filters(&self) -> Result<ProductPage> {
        self.filter_products(ProductFilter::default()).await
    }

    /// Jump to a page of the listing. Pages start at 1.
    pub async fn go_to_page(&self, page: u32) -> Result<ProductPage> {
        self.shared.update(|ui| ui.product_page = page.max(1));
        self.load_products().await
    }

    /// Fetch one product, e.g. to prefill an edit form.
    pub async fn product(&self, id: ProductId) -> Result<Product> {
        self.shared.api.get_product(id).await.map_err(|e| {
            warn!(product_id = id, error = %e, "failed to load product");
            self.shared.notifier.error("Failed to load product details");
            e.into()
        })
    }

    /// Create a product, or update it when `id` is given.
    pub async fn save_product(&self, id: Option<ProductId>, draft: &ProductDraft) -> Result<Product> {
        let draft = match normalize_product_draft(draft) {
            Ok(draft) => draft,
            Err(e) => {
                self.shared.notifier.error(e.to_string());
                return Err(e);
            }
        };

        let saved = match id {
            Some(id) => self.shared.api.update_product(id, &draft).await,
            None => self.shared.api.create_product(&draft).await,
        };
        match saved {
            Ok(product) => {
                info!(product_id = product.id, sku = %product.sku, "product saved");
                let _ = self.shared.load_products().await;
                let verb = if id.is_some() { "updated" } else { "created" };
                self.shared
                    .notifier
                    .success(format!("Product {} successfully!", verb));
                Ok(product)
            }
            Err(e) => {
                warn!(error = %e, "failed to save product");
                self.shared.notifier.error(e.detail_or("Failed to save product"));
                Err(e.into())
            }
        }
    }

    /// Delete one product after a yes/no confirmation.
    pub async fn delete_product(&self, id: ProductId) -> Result<()> {
        self.confirm(&ConfirmationRequest::delete_one("product")).await?;

        match self.shared.api.delete_product(id).await {
            Ok(()) => {
                info!(product_id = id, "product deleted");
                let _ = self.shared.load_products().await;
                self.shared.notifier.success("Product deleted successfully!");
                Ok(())
            }
            Err(e) => {
                warn!(product_id = id, error = %e, "failed to delete product");
                self.shared.notifier.error("Failed to delete product");
                Err(e.into())
            }
        }
    }

    /// Delete every product. The user must type the confirmation phrase.
    pub async fn delete_all_products(&self) -> Result<MessageResponse> {
        self.confirm(&ConfirmationRequest::delete_all_products())
            .await?;

        match self.shared.api.delete_all_products().await {
            Ok(response) => {
                info!(deleted = ?response.deleted_count, "all products deleted");
                let _ = self.shared.load_products().await;
                self.shared.notifier.success(response.message.clone());
                Ok(response)
            }
            Err(e) => {
                warn!(error = %e, "failed to delete all products");
                self.shared.notifier.error("Failed to delete products");
                Err(e.into())
            }
        }
    }
}
