//! Demo catalog for local development (`SEED_CATALOG=true`).

use chrono::{Duration, Utc};
use tracing::info;

use storefront_catalog::{NewProduct, Product, ProductImage};
use storefront_core::{ProductId, UserId};

use super::ProductRepository;
use crate::error::StoreError;

const DEMO_PRODUCTS: &[(&str, &str, u64, &str, u64)] = &[
    ("Ceramic Mug", "Stoneware mug, 350ml.", 1_200, "kitchen", 40),
    ("Linen Apron", "Washed linen apron with pockets.", 3_400, "kitchen", 12),
    ("Notebook A5", "Dot grid, 120 pages.", 900, "stationery", 100),
    ("Desk Lamp", "Adjustable arm, warm LED.", 5_900, "home", 7),
];

/// Insert the demo products as owned by `owner`. Returns the inserted products.
pub async fn seed_demo_catalog(
    repo: &dyn ProductRepository,
    owner: UserId,
) -> Result<Vec<Product>, StoreError> {
    let now = Utc::now();
    let mut seeded = Vec::with_capacity(DEMO_PRODUCTS.len());

    for (idx, (name, description, price, category, stock)) in DEMO_PRODUCTS.iter().enumerate() {
        let slug = name.to_lowercase().replace(' ', "-");
        let input = NewProduct {
            name: (*name).to_string(),
            description: (*description).to_string(),
            price: *price,
            category: (*category).to_string(),
            image: ProductImage {
                url: format!("https://images.example.com/demo/{slug}.jpg"),
                public_id: format!("demo/{slug}"),
            },
            stock: *stock,
        };
        // Stagger timestamps so "newest first" is stable.
        let created_at = now - Duration::seconds(idx as i64);
        let product = Product::create(ProductId::new(), owner, input, created_at)
            .map_err(|e| StoreError::Invalid(e.to_string()))?;
        repo.insert(&product).await?;
        seeded.push(product);
    }

    info!(count = seeded.len(), "seeded demo catalog");
    Ok(seeded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;

    #[tokio::test]
    async fn seeds_active_products() {
        let repo = InMemoryCatalog::new();
        let owner = UserId::new();
        let seeded = seed_demo_catalog(&repo, owner).await.unwrap();

        let listed = repo.list_active().await.unwrap();
        assert_eq!(listed.len(), seeded.len());
        assert_eq!(listed[0].name, "Ceramic Mug");
    }
}
