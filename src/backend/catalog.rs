use async_trait::async_trait;

use super::PgBackend;
use crate::domain::aggregates::product::RELATED_PRODUCTS_LIMIT;
use crate::domain::aggregates::{
    Category, ProductDetail, ProductOrdering, ProductPage, ProductQuery, ProductRecord, ProductSize,
    ProductSummary, SortField,
};
use crate::Result;

const SUMMARY_COLUMNS: &str = "p.id, p.name, p.slug, p.price, p.image_url, p.sold_count, p.created_at";

#[async_trait]
pub trait Catalog: Send + Sync {
    async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage>;
    async fn product_detail(&self, slug: &str) -> Result<Option<ProductDetail>>;
    async fn related_products(&self, product: &ProductDetail) -> Result<Vec<ProductSummary>>;
    async fn categories(&self) -> Result<Vec<Category>>;
    /// Cheap round trip used by `/api/test-connection`.
    async fn ping(&self) -> Result<Vec<Category>>;

    async fn best_sellers(&self, limit: i64) -> Result<Vec<ProductSummary>> {
        let query = ProductQuery { limit, ordering: ProductOrdering::BestSellers, ..Default::default() };
        Ok(self.list_products(&query).await?.products)
    }

    async fn new_arrivals(&self, limit: i64) -> Result<Vec<ProductSummary>> {
        let query = ProductQuery {
            limit,
            ordering: ProductOrdering::Field { field: SortField::CreatedAt, ascending: false },
            ..Default::default()
        };
        let products = self.list_products(&query).await?.products;
        Ok(products.into_iter().map(ProductSummary::marked_new).collect())
    }
}

#[async_trait]
impl Catalog for PgBackend {
    async fn list_products(&self, q: &ProductQuery) -> Result<ProductPage> {
        let sql = format!(
            "SELECT {SUMMARY_COLUMNS} FROM products p LEFT JOIN categories c ON c.id = p.category_id WHERE ($1::text IS NULL OR c.slug = $1) ORDER BY {} LIMIT $2 OFFSET $3",
            q.order_by()
        );
        let products = sqlx::query_as::<_, ProductSummary>(&sql)
            .bind(&q.category).bind(q.limit).bind(q.offset).fetch_all(&self.db).await?;
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products p LEFT JOIN categories c ON c.id = p.category_id WHERE ($1::text IS NULL OR c.slug = $1)")
            .bind(&q.category).fetch_one(&self.db).await?;
        Ok(ProductPage {
            products: products.into_iter().map(ProductSummary::with_formatted_price).collect(),
            total: total.0, limit: q.limit, offset: q.offset,
        })
    }

    async fn product_detail(&self, slug: &str) -> Result<Option<ProductDetail>> {
        let record = sqlx::query_as::<_, ProductRecord>(
            "SELECT p.id, p.name, p.slug, p.description, p.price, p.image_url, p.image_urls, p.sold_count, p.category_id, c.name AS category_name, c.slug AS category_slug, p.created_at, p.updated_at FROM products p LEFT JOIN categories c ON c.id = p.category_id WHERE p.slug = $1",
        ).bind(slug).fetch_optional(&self.db).await?;
        let Some(record) = record else { return Ok(None) };
        let sizes = sqlx::query_as::<_, ProductSize>(
            "SELECT size AS value, size AS label, in_stock FROM product_sizes WHERE product_id = $1 ORDER BY size",
        ).bind(record.id).fetch_all(&self.db).await?;
        Ok(Some(ProductDetail::from_record(record, sizes)))
    }

    async fn related_products(&self, product: &ProductDetail) -> Result<Vec<ProductSummary>> {
        let Some(category) = product.category_slug() else { return Ok(vec![]) };
        let sql = format!(
            "SELECT {SUMMARY_COLUMNS} FROM products p JOIN categories c ON c.id = p.category_id WHERE c.slug = $1 AND p.id <> $2 ORDER BY p.sold_count DESC LIMIT $3"
        );
        let related = sqlx::query_as::<_, ProductSummary>(&sql)
            .bind(category).bind(product.id).bind(RELATED_PRODUCTS_LIMIT).fetch_all(&self.db).await?;
        Ok(related.into_iter().map(ProductSummary::with_formatted_price).collect())
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        let cats = sqlx::query_as::<_, Category>("SELECT id::text AS id, name, slug, image_url FROM categories ORDER BY name")
            .fetch_all(&self.db).await?;
        Ok(cats)
    }

    async fn ping(&self) -> Result<Vec<Category>> {
        let cats = sqlx::query_as::<_, Category>("SELECT id::text AS id, name, slug, image_url FROM categories LIMIT 5")
            .fetch_all(&self.db).await?;
        Ok(cats)
    }
}
