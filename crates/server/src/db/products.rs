//! Product catalogue repository, including tag and image associations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{MySqlPool, QueryBuilder};

use awe_electronics_core::{ImageId, ProductId, TagId};

use super::RepositoryError;
use super::accounts::id_from_insert;
use crate::models::{NewProduct, Product, ProductUpdate};

const PRODUCT_COLUMNS: &str =
    "id, name, description, price, stock, available, discontinued, created_at";

/// A `product` table row before tag/image enrichment.
#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    price: Decimal,
    stock: i32,
    available: i32,
    discontinued: bool,
    created_at: DateTime<Utc>,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a MySqlPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a MySqlPool) -> Self {
        Self { pool }
    }

    /// Get all products, tags and images included.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product ORDER BY id ASC"
        ))
        .fetch_all(self.pool)
        .await?;

        let mut products = Vec::with_capacity(rows.len());
        for row in rows {
            products.push(self.enrich(row).await?);
        }
        Ok(products)
    }

    /// Get a single product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE id = ?"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.enrich(row).await?)),
            None => Ok(None),
        }
    }

    /// Get products carrying **all** of the given tag names (intersection).
    ///
    /// An empty tag list matches nothing. Repeated names are collapsed, so
    /// asking for `[a, a]` means "has tag a", not an unsatisfiable count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_by_tags(&self, tags: &[String]) -> Result<Vec<Product>, RepositoryError> {
        let mut names: Vec<&str> = tags.iter().map(String::as_str).collect();
        names.sort_unstable();
        names.dedup();

        if names.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb: QueryBuilder<'_, sqlx::MySql> = QueryBuilder::new(format!(
            "SELECT p.{} FROM product p \
             JOIN product_tag pt ON pt.product_id = p.id \
             JOIN tag t ON t.id = pt.tag_id \
             WHERE t.name IN (",
            PRODUCT_COLUMNS.replace(", ", ", p.")
        ));
        let mut list = qb.separated(", ");
        for name in &names {
            list.push_bind(*name);
        }
        qb.push(") GROUP BY p.id HAVING COUNT(DISTINCT t.id) = ");
        qb.push_bind(i64::try_from(names.len()).unwrap_or(i64::MAX));
        qb.push(" ORDER BY p.id ASC");

        let rows = qb.build_query_as::<ProductRow>().fetch_all(self.pool).await?;

        let mut products = Vec::with_capacity(rows.len());
        for row in rows {
            products.push(self.enrich(row).await?);
        }
        Ok(products)
    }

    /// Create a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Invalid` for a negative price or counts.
    pub async fn create(&self, new: &NewProduct) -> Result<ProductId, RepositoryError> {
        if new.price < Decimal::ZERO {
            return Err(RepositoryError::Invalid("price cannot be negative".to_owned()));
        }
        if new.stock < 0 || new.available < 0 {
            return Err(RepositoryError::Invalid(
                "stock and available cannot be negative".to_owned(),
            ));
        }

        let result = sqlx::query(
            "INSERT INTO product (name, description, price, stock, available) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price)
        .bind(new.stock)
        .bind(new.available)
        .execute(self.pool)
        .await?;

        id_from_insert(result.last_insert_id()).map(ProductId::new)
    }

    /// Update whitelisted product fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Invalid` if no field is set or a value is
    /// out of range; `RepositoryError::NotFound` if the product is missing.
    pub async fn update(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<(), RepositoryError> {
        if update.is_empty() {
            return Err(RepositoryError::Invalid(
                "no valid fields to update".to_owned(),
            ));
        }
        if matches!(update.price, Some(p) if p < Decimal::ZERO) {
            return Err(RepositoryError::Invalid("price cannot be negative".to_owned()));
        }
        if matches!(update.stock, Some(s) if s < 0) || matches!(update.available, Some(a) if a < 0)
        {
            return Err(RepositoryError::Invalid(
                "stock and available cannot be negative".to_owned(),
            ));
        }

        let mut qb: QueryBuilder<'_, sqlx::MySql> = QueryBuilder::new("UPDATE product SET ");
        let mut fields = qb.separated(", ");
        if let Some(name) = &update.name {
            fields.push("name = ");
            fields.push_bind_unseparated(name);
        }
        if let Some(description) = &update.description {
            fields.push("description = ");
            fields.push_bind_unseparated(description);
        }
        if let Some(price) = update.price {
            fields.push("price = ");
            fields.push_bind_unseparated(price);
        }
        if let Some(stock) = update.stock {
            fields.push("stock = ");
            fields.push_bind_unseparated(stock);
        }
        if let Some(available) = update.available {
            fields.push("available = ");
            fields.push_bind_unseparated(available);
        }
        if let Some(discontinued) = update.discontinued {
            fields.push("discontinued = ");
            fields.push_bind_unseparated(discontinued);
        }
        qb.push(" WHERE id = ");
        qb.push_bind(id.as_i32());

        qb.build().execute(self.pool).await?;

        let exists: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM product WHERE id = ?")
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        if exists.is_none() {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    // =========================================================================
    // Tag associations
    // =========================================================================

    /// Attach a tag to a product, creating the tag row if the name is new.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Conflict` if the product already carries
    /// this tag.
    pub async fn add_tag(&self, product_id: ProductId, name: &str) -> Result<TagId, RepositoryError> {
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return Err(RepositoryError::Invalid("tag name cannot be empty".to_owned()));
        }

        let mut tx = self.pool.begin().await?;

        let exists: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM product WHERE id = ?")
            .bind(product_id.as_i32())
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(RepositoryError::NotFound);
        }

        let tag_id = match sqlx::query_as::<_, (i32,)>("SELECT id FROM tag WHERE name = ?")
            .bind(&name)
            .fetch_optional(&mut *tx)
            .await?
        {
            Some((id,)) => TagId::new(id),
            None => {
                let result = sqlx::query("INSERT INTO tag (name) VALUES (?)")
                    .bind(&name)
                    .execute(&mut *tx)
                    .await?;
                TagId::new(id_from_insert(result.last_insert_id())?)
            }
        };

        sqlx::query("INSERT INTO product_tag (product_id, tag_id) VALUES (?, ?)")
            .bind(product_id.as_i32())
            .bind(tag_id.as_i32())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::or_conflict(e, "product already carries this tag"))?;

        tx.commit().await?;

        Ok(tag_id)
    }

    /// Detach a tag from a product. The tag row itself is kept; the
    /// vocabulary is shared across products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not carry
    /// the tag.
    pub async fn remove_tag(&self, product_id: ProductId, name: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "DELETE pt FROM product_tag pt JOIN tag t ON t.id = pt.tag_id \
             WHERE pt.product_id = ? AND t.name = ?",
        )
        .bind(product_id.as_i32())
        .bind(name.trim().to_lowercase())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    // =========================================================================
    // Image associations
    // =========================================================================

    /// Attach an image URL to a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn add_image(
        &self,
        product_id: ProductId,
        url: &str,
    ) -> Result<ImageId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM product WHERE id = ?")
            .bind(product_id.as_i32())
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(RepositoryError::NotFound);
        }

        let result = sqlx::query("INSERT INTO image (url) VALUES (?)")
            .bind(url)
            .execute(&mut *tx)
            .await?;
        let image_id = ImageId::new(id_from_insert(result.last_insert_id())?);

        sqlx::query("INSERT INTO product_image (product_id, image_id) VALUES (?, ?)")
            .bind(product_id.as_i32())
            .bind(image_id.as_i32())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(image_id)
    }

    /// Detach an image from a product and delete the image row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the image is not linked to
    /// this product.
    pub async fn remove_image(
        &self,
        product_id: ProductId,
        image_id: ImageId,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "DELETE FROM product_image WHERE product_id = ? AND image_id = ?",
        )
        .bind(product_id.as_i32())
        .bind(image_id.as_i32())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query("DELETE FROM image WHERE id = ?")
            .bind(image_id.as_i32())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Join a product row with its tags and image URLs.
    async fn enrich(&self, row: ProductRow) -> Result<Product, RepositoryError> {
        let tags: Vec<(String,)> = sqlx::query_as(
            "SELECT t.name FROM tag t JOIN product_tag pt ON pt.tag_id = t.id \
             WHERE pt.product_id = ? ORDER BY t.name ASC",
        )
        .bind(row.id.as_i32())
        .fetch_all(self.pool)
        .await?;

        let images: Vec<(String,)> = sqlx::query_as(
            "SELECT i.url FROM image i JOIN product_image pi ON pi.image_id = i.id \
             WHERE pi.product_id = ? ORDER BY i.id ASC",
        )
        .bind(row.id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(Product {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            stock: row.stock,
            available: row.available,
            discontinued: row.discontinued,
            created_at: row.created_at,
            tags: tags.into_iter().map(|(name,)| name).collect(),
            images: images.into_iter().map(|(url,)| url).collect(),
        })
    }
}
