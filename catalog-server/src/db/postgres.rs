//! PostgreSQL catalog store
//!
//! A write transaction locks the product row with `SELECT ... FOR UPDATE`,
//! which serializes concurrent mutations of the same product. Child rows are
//! written with UNNEST batch statements.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::models::{
    Product, ProductAttribute, ProductAttributeValue, ProductVariant, VariantMedia,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};

use super::{sort_product, CatalogStore, ChangeSet, ProductTransaction, StoreError, StoreResult};
use crate::error::Resource;

/// sqlx-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect and run pending migrations
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
        Ok(Self { pool })
    }
}

// ── Rows ──

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    sku_prefix: Option<String>,
    min_price: Option<Decimal>,
    max_price: Option<Decimal>,
    total_stock: i64,
    created_at: i64,
    updated_at: i64,
}

#[derive(sqlx::FromRow)]
struct AttributeRow {
    id: i64,
    product_id: i64,
    name: String,
    display_order: i32,
}

#[derive(sqlx::FromRow)]
struct VariantRow {
    id: i64,
    product_id: i64,
    value_ids: Vec<i64>,
    sku: Option<String>,
    price: Decimal,
    stock: i64,
    is_active: bool,
    position: i32,
}

#[derive(sqlx::FromRow)]
struct MediaRow {
    variant_id: i64,
    #[sqlx(flatten)]
    media: VariantMedia,
}

// ── Reads ──

async fn fetch_product(
    conn: &mut PgConnection,
    product_id: i64,
    for_update: bool,
) -> StoreResult<Option<Product>> {
    let sql = if for_update {
        "SELECT id, name, sku_prefix, min_price, max_price, total_stock, created_at, updated_at FROM catalog_products WHERE id = $1 FOR UPDATE"
    } else {
        "SELECT id, name, sku_prefix, min_price, max_price, total_stock, created_at, updated_at FROM catalog_products WHERE id = $1"
    };
    let Some(row): Option<ProductRow> = sqlx::query_as(sql)
        .bind(product_id)
        .fetch_optional(&mut *conn)
        .await?
    else {
        return Ok(None);
    };

    let attribute_rows: Vec<AttributeRow> = sqlx::query_as(
        "SELECT id, product_id, name, display_order FROM catalog_attributes WHERE product_id = $1 ORDER BY display_order, id",
    )
    .bind(product_id)
    .fetch_all(&mut *conn)
    .await?;

    let value_rows: Vec<ProductAttributeValue> = sqlx::query_as(
        r#"
        SELECT v.id, v.attribute_id, v.value, v.display_order
        FROM catalog_attribute_values v
        JOIN catalog_attributes a ON a.id = v.attribute_id
        WHERE a.product_id = $1
        ORDER BY v.display_order, v.id
        "#,
    )
    .bind(product_id)
    .fetch_all(&mut *conn)
    .await?;

    let variant_rows: Vec<VariantRow> = sqlx::query_as(
        "SELECT id, product_id, value_ids, sku, price, stock, is_active, position FROM catalog_variants WHERE product_id = $1 ORDER BY position, id",
    )
    .bind(product_id)
    .fetch_all(&mut *conn)
    .await?;

    let media_rows: Vec<MediaRow> = sqlx::query_as(
        r#"
        SELECT m.id, m.variant_id, m.url, m.position
        FROM catalog_variant_media m
        JOIN catalog_variants v ON v.id = m.variant_id
        WHERE v.product_id = $1
        ORDER BY m.position, m.id
        "#,
    )
    .bind(product_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut values_by_attribute: HashMap<i64, Vec<ProductAttributeValue>> = HashMap::new();
    for value in value_rows {
        values_by_attribute
            .entry(value.attribute_id)
            .or_default()
            .push(value);
    }
    let mut media_by_variant: HashMap<i64, Vec<VariantMedia>> = HashMap::new();
    for row in media_rows {
        media_by_variant
            .entry(row.variant_id)
            .or_default()
            .push(row.media);
    }

    let attributes = attribute_rows
        .into_iter()
        .map(|a| ProductAttribute {
            values: values_by_attribute.remove(&a.id).unwrap_or_default(),
            id: a.id,
            product_id: a.product_id,
            name: a.name,
            display_order: a.display_order,
        })
        .collect();

    let variants = variant_rows
        .into_iter()
        .map(|v| ProductVariant {
            media: media_by_variant.remove(&v.id).unwrap_or_default(),
            id: v.id,
            product_id: v.product_id,
            value_ids: v.value_ids,
            sku: v.sku,
            price: v.price,
            stock: v.stock,
            is_active: v.is_active,
            position: v.position,
        })
        .collect();

    let mut product = Product {
        id: row.id,
        name: row.name,
        sku_prefix: row.sku_prefix,
        min_price: row.min_price,
        max_price: row.max_price,
        total_stock: row.total_stock,
        attributes,
        variants,
        created_at: row.created_at,
        updated_at: row.updated_at,
    };
    sort_product(&mut product);
    Ok(Some(product))
}

// ── Writes ──

async fn insert_attributes(
    conn: &mut PgConnection,
    attributes: &[ProductAttribute],
) -> StoreResult<()> {
    if attributes.is_empty() {
        return Ok(());
    }
    let ids: Vec<i64> = attributes.iter().map(|a| a.id).collect();
    let product_ids: Vec<i64> = attributes.iter().map(|a| a.product_id).collect();
    let names: Vec<String> = attributes.iter().map(|a| a.name.clone()).collect();
    let display_orders: Vec<i32> = attributes.iter().map(|a| a.display_order).collect();
    sqlx::query(
        r#"
        INSERT INTO catalog_attributes (id, product_id, name, display_order)
        SELECT * FROM UNNEST($1::bigint[], $2::bigint[], $3::text[], $4::integer[])
        "#,
    )
    .bind(&ids)
    .bind(&product_ids)
    .bind(&names)
    .bind(&display_orders)
    .execute(&mut *conn)
    .await?;

    let values: Vec<ProductAttributeValue> = attributes
        .iter()
        .flat_map(|a| a.values.iter().cloned())
        .collect();
    insert_values(conn, &values).await
}

async fn insert_values(conn: &mut PgConnection, values: &[ProductAttributeValue]) -> StoreResult<()> {
    if values.is_empty() {
        return Ok(());
    }
    let ids: Vec<i64> = values.iter().map(|v| v.id).collect();
    let attribute_ids: Vec<i64> = values.iter().map(|v| v.attribute_id).collect();
    let labels: Vec<String> = values.iter().map(|v| v.value.clone()).collect();
    let display_orders: Vec<i32> = values.iter().map(|v| v.display_order).collect();
    sqlx::query(
        r#"
        INSERT INTO catalog_attribute_values (id, attribute_id, value, display_order)
        SELECT * FROM UNNEST($1::bigint[], $2::bigint[], $3::text[], $4::integer[])
        "#,
    )
    .bind(&ids)
    .bind(&attribute_ids)
    .bind(&labels)
    .bind(&display_orders)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Sorted, comma-joined value ids; unique per product
fn combination_key(value_ids: &[i64]) -> String {
    let mut ids = value_ids.to_vec();
    ids.sort_unstable();
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

async fn insert_variants(conn: &mut PgConnection, variants: &[ProductVariant]) -> StoreResult<()> {
    // value_ids is an array column, UNNEST would flatten it
    for variant in variants {
        sqlx::query(
            r#"
            INSERT INTO catalog_variants (
                id, product_id, value_ids, combination_key, sku, price, stock, is_active, position
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(variant.id)
        .bind(variant.product_id)
        .bind(&variant.value_ids)
        .bind(combination_key(&variant.value_ids))
        .bind(&variant.sku)
        .bind(variant.price)
        .bind(variant.stock)
        .bind(variant.is_active)
        .bind(variant.position)
        .execute(&mut *conn)
        .await?;

        insert_media(conn, variant.id, &variant.media).await?;
    }
    Ok(())
}

async fn insert_media(conn: &mut PgConnection, variant_id: i64, media: &[VariantMedia]) -> StoreResult<()> {
    if media.is_empty() {
        return Ok(());
    }
    let ids: Vec<i64> = media.iter().map(|m| m.id).collect();
    let variant_ids: Vec<i64> = media.iter().map(|_| variant_id).collect();
    let urls: Vec<String> = media.iter().map(|m| m.url.clone()).collect();
    let positions: Vec<i32> = media.iter().map(|m| m.position).collect();
    sqlx::query(
        r#"
        INSERT INTO catalog_variant_media (id, variant_id, url, position)
        SELECT * FROM UNNEST($1::bigint[], $2::bigint[], $3::text[], $4::integer[])
        "#,
    )
    .bind(&ids)
    .bind(&variant_ids)
    .bind(&urls)
    .bind(&positions)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn apply_changes(conn: &mut PgConnection, changes: &ChangeSet) -> StoreResult<()> {
    let product_id = changes.product_id;

    // ── Deletes ──

    if !changes.variants_to_delete.is_empty() {
        sqlx::query("DELETE FROM catalog_variants WHERE product_id = $1 AND id = ANY($2)")
            .bind(product_id)
            .bind(&changes.variants_to_delete)
            .execute(&mut *conn)
            .await?;
    }
    if !changes.values_to_delete.is_empty() {
        sqlx::query(
            r#"
            DELETE FROM catalog_attribute_values
            WHERE id = ANY($1)
              AND attribute_id IN (SELECT id FROM catalog_attributes WHERE product_id = $2)
            "#,
        )
        .bind(&changes.values_to_delete)
        .bind(product_id)
        .execute(&mut *conn)
        .await?;
    }
    if !changes.attributes_to_delete.is_empty() {
        sqlx::query("DELETE FROM catalog_attributes WHERE product_id = $1 AND id = ANY($2)")
            .bind(product_id)
            .bind(&changes.attributes_to_delete)
            .execute(&mut *conn)
            .await?;
    }

    // ── Updates ──

    if !changes.attributes_to_update.is_empty() {
        let ids: Vec<i64> = changes.attributes_to_update.iter().map(|a| a.id).collect();
        let names: Vec<String> = changes
            .attributes_to_update
            .iter()
            .map(|a| a.name.clone())
            .collect();
        let orders: Vec<i32> = changes
            .attributes_to_update
            .iter()
            .map(|a| a.display_order)
            .collect();
        sqlx::query(
            r#"
            UPDATE catalog_attributes SET name = u.name, display_order = u.display_order
            FROM UNNEST($1::bigint[], $2::text[], $3::integer[]) AS u(id, name, display_order)
            WHERE catalog_attributes.id = u.id AND catalog_attributes.product_id = $4
            "#,
        )
        .bind(&ids)
        .bind(&names)
        .bind(&orders)
        .bind(product_id)
        .execute(&mut *conn)
        .await?;
    }
    if !changes.values_to_update.is_empty() {
        let ids: Vec<i64> = changes.values_to_update.iter().map(|v| v.id).collect();
        let labels: Vec<String> = changes
            .values_to_update
            .iter()
            .map(|v| v.value.clone())
            .collect();
        let orders: Vec<i32> = changes
            .values_to_update
            .iter()
            .map(|v| v.display_order)
            .collect();
        sqlx::query(
            r#"
            UPDATE catalog_attribute_values SET value = u.value, display_order = u.display_order
            FROM UNNEST($1::bigint[], $2::text[], $3::integer[]) AS u(id, value, display_order)
            WHERE catalog_attribute_values.id = u.id
            "#,
        )
        .bind(&ids)
        .bind(&labels)
        .bind(&orders)
        .execute(&mut *conn)
        .await?;
    }
    if !changes.variants_to_update.is_empty() {
        // The SKU index is checked per row: release old SKUs first so swaps land
        let ids: Vec<i64> = changes.variants_to_update.iter().map(|v| v.id).collect();
        sqlx::query("UPDATE catalog_variants SET sku = NULL WHERE product_id = $1 AND id = ANY($2)")
            .bind(product_id)
            .bind(&ids)
            .execute(&mut *conn)
            .await?;
    }
    for variant in &changes.variants_to_update {
        sqlx::query(
            r#"
            UPDATE catalog_variants
            SET value_ids = $1, combination_key = $2, sku = $3, price = $4,
                stock = $5, is_active = $6, position = $7
            WHERE id = $8 AND product_id = $9
            "#,
        )
        .bind(&variant.value_ids)
        .bind(combination_key(&variant.value_ids))
        .bind(&variant.sku)
        .bind(variant.price)
        .bind(variant.stock)
        .bind(variant.is_active)
        .bind(variant.position)
        .bind(variant.id)
        .bind(product_id)
        .execute(&mut *conn)
        .await?;
    }

    // ── Inserts ──

    insert_attributes(conn, &changes.attributes_to_insert).await?;
    insert_values(conn, &changes.values_to_insert).await?;
    insert_variants(conn, &changes.variants_to_insert).await?;

    sqlx::query(
        "UPDATE catalog_products SET min_price = $1, max_price = $2, total_stock = $3, updated_at = $4 WHERE id = $5",
    )
    .bind(changes.aggregates.min_price)
    .bind(changes.aggregates.max_price)
    .bind(changes.aggregates.total_stock)
    .bind(changes.updated_at)
    .bind(product_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

// ── Port ──

#[async_trait]
impl CatalogStore for PgStore {
    async fn insert_product(&self, product: &Product) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let inserted: Option<(i64,)> = sqlx::query_as(
            r#"
            INSERT INTO catalog_products (
                id, name, sku_prefix, min_price, max_price, total_stock, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.sku_prefix)
        .bind(product.min_price)
        .bind(product.max_price)
        .bind(product.total_stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .fetch_optional(&mut *tx)
        .await?;
        if inserted.is_none() {
            return Err(StoreError::Duplicate(product.id));
        }

        insert_attributes(&mut tx, &product.attributes).await?;
        insert_variants(&mut tx, &product.variants).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn load_product(&self, product_id: i64) -> StoreResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        fetch_product(&mut conn, product_id, false).await
    }

    async fn begin(&self, product_id: i64) -> StoreResult<Box<dyn ProductTransaction>> {
        let mut tx = self.pool.begin().await?;
        let snapshot = fetch_product(&mut tx, product_id, true)
            .await?
            .ok_or(StoreError::ProductNotFound(product_id))?;
        Ok(Box::new(PgTransaction { tx, snapshot }))
    }
}

struct PgTransaction {
    tx: Transaction<'static, Postgres>,
    snapshot: Product,
}

#[async_trait]
impl ProductTransaction for PgTransaction {
    fn snapshot(&self) -> &Product {
        &self.snapshot
    }

    async fn find_owner(&mut self, resource: Resource, id: i64) -> StoreResult<Option<i64>> {
        let sql = match resource {
            Resource::Product => "SELECT id FROM catalog_products WHERE id = $1",
            Resource::Attribute => "SELECT product_id FROM catalog_attributes WHERE id = $1",
            Resource::AttributeValue => {
                "SELECT a.product_id FROM catalog_attribute_values v JOIN catalog_attributes a ON a.id = v.attribute_id WHERE v.id = $1"
            }
            Resource::Variant => "SELECT product_id FROM catalog_variants WHERE id = $1",
        };
        let row: Option<(i64,)> = sqlx::query_as(sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.map(|(owner,)| owner))
    }

    async fn commit(self: Box<Self>, changes: ChangeSet) -> StoreResult<()> {
        let PgTransaction { mut tx, snapshot } = *self;
        if changes.product_id != snapshot.id {
            return Err(StoreError::Corrupt(format!(
                "change set for product {} committed on product {}",
                changes.product_id, snapshot.id
            )));
        }
        // an error drops `tx`, which rolls back
        apply_changes(&mut tx, &changes).await?;
        tx.commit().await?;
        Ok(())
    }
}
