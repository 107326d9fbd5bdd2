use async_trait::async_trait;

use crate::{
    application::pagination::PageWindow,
    application::repos::{ProductsRepo, RepoError},
    domain::products::{NewProduct, Product},
};

use super::{
    PostgresRepositories,
    util::{map_row_error, map_sqlx_error},
};

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    additional_info: String,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            additional_info: row.additional_info,
        }
    }
}

#[async_trait]
impl ProductsRepo for PostgresRepositories {
    async fn find_by_id(&self, id: i64) -> Result<Product, RepoError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, additional_info
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_one(self.pool())
        .await
        .map_err(map_row_error(id))?;

        Ok(row.into())
    }

    async fn list_all(&self) -> Result<Vec<Product>, RepoError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, additional_info
            FROM products
            ORDER BY id
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn list_paged(&self, window: PageWindow) -> Result<Vec<Product>, RepoError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, additional_info
            FROM products
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(window.limit())
        .bind(window.offset())
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn insert(&self, product: &NewProduct) -> Result<i64, RepoError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO products (name, additional_info)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(&product.name)
        .bind(&product.additional_info)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(id)
    }

    async fn update_by_id(&self, id: i64, product: &NewProduct) -> Result<Product, RepoError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            UPDATE products AS p
            SET name = $2, additional_info = $3
            FROM (
                SELECT id, name, additional_info
                FROM products
                WHERE id = $1
                FOR UPDATE
            ) AS old
            WHERE p.id = old.id
            RETURNING old.id, old.name, old.additional_info
            "#,
        )
        .bind(id)
        .bind(&product.name)
        .bind(&product.additional_info)
        .fetch_one(self.pool())
        .await
        .map_err(map_row_error(id))?;

        Ok(row.into())
    }

    async fn delete_by_id(&self, id: i64) -> Result<Product, RepoError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            DELETE FROM products
            WHERE id = $1
            RETURNING id, name, additional_info
            "#,
        )
        .bind(id)
        .fetch_one(self.pool())
        .await
        .map_err(map_row_error(id))?;

        Ok(row.into())
    }

    async fn delete_all_returning_count(&self) -> Result<u64, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        // Writers still in flight must finish before the count, or TRUNCATE
        // would remove rows the count never saw.
        sqlx::query("LOCK TABLE products IN ACCESS EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        sqlx::query("TRUNCATE TABLE products")
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        Self::convert_count(count)
    }

    async fn ping(&self) -> Result<(), RepoError> {
        self.health_check().await.map_err(map_sqlx_error)
    }
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use super::*;

    async fn seed(repo: &PostgresRepositories, names: &[&str]) -> Vec<i64> {
        let mut ids = Vec::new();
        for name in names {
            let id = repo
                .insert(&NewProduct::new(*name, format!("{name} info")))
                .await
                .expect("insert product");
            ids.push(id);
        }
        ids
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a Postgres instance"]
    async fn insert_then_find_round_trips(pool: PgPool) {
        let repo = PostgresRepositories::new(pool);
        let ids = seed(&repo, &["Lamp"]).await;

        let found = repo.find_by_id(ids[0]).await.expect("find product");
        assert_eq!(found.name, "Lamp");
        assert_eq!(found.additional_info, "Lamp info");
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a Postgres instance"]
    async fn find_missing_is_not_found(pool: PgPool) {
        let repo = PostgresRepositories::new(pool);
        let err = repo.find_by_id(404).await.expect_err("missing product");
        assert!(matches!(err, RepoError::NotFound { id: 404 }));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a Postgres instance"]
    async fn list_paged_orders_by_id(pool: PgPool) {
        let repo = PostgresRepositories::new(pool);
        let ids = seed(&repo, &["a", "b", "c", "d"]).await;

        let page = repo
            .list_paged(PageWindow::new(2, 1).unwrap())
            .await
            .expect("page");
        let page_ids: Vec<i64> = page.iter().map(|p| p.id).collect();
        assert_eq!(page_ids, vec![ids[1], ids[2]]);

        let beyond = repo
            .list_paged(PageWindow::new(2, 10).unwrap())
            .await
            .expect("empty page");
        assert!(beyond.is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a Postgres instance"]
    async fn update_returns_previous_state(pool: PgPool) {
        let repo = PostgresRepositories::new(pool);
        let ids = seed(&repo, &["Old"]).await;

        let previous = repo
            .update_by_id(ids[0], &NewProduct::new("New", "fresh"))
            .await
            .expect("update");
        assert_eq!(previous.name, "Old");

        let current = repo.find_by_id(ids[0]).await.expect("find");
        assert_eq!(current.name, "New");
        assert_eq!(current.additional_info, "fresh");
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a Postgres instance"]
    async fn update_and_delete_missing_are_not_found(pool: PgPool) {
        let repo = PostgresRepositories::new(pool);

        let update = repo
            .update_by_id(7, &NewProduct::new("x", "y"))
            .await
            .expect_err("missing update");
        assert!(matches!(update, RepoError::NotFound { id: 7 }));

        let delete = repo.delete_by_id(7).await.expect_err("missing delete");
        assert!(matches!(delete, RepoError::NotFound { id: 7 }));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a Postgres instance"]
    async fn delete_all_reports_removed_rows(pool: PgPool) {
        let repo = PostgresRepositories::new(pool);
        seed(&repo, &["a", "b", "c"]).await;

        assert_eq!(repo.delete_all_returning_count().await.expect("purge"), 3);
        assert!(repo.list_all().await.expect("list").is_empty());
        assert_eq!(repo.delete_all_returning_count().await.expect("purge"), 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a Postgres instance"]
    async fn delete_all_counts_rows_committed_by_a_concurrent_writer(pool: PgPool) {
        let repo = PostgresRepositories::new(pool.clone());
        seed(&repo, &["a", "b"]).await;

        let mut writer = pool.begin().await.expect("begin writer");
        sqlx::query("INSERT INTO products (name, additional_info) VALUES ('c', 'late')")
            .execute(&mut *writer)
            .await
            .expect("insert in open transaction");

        let purge = tokio::spawn({
            let repo = PostgresRepositories::new(pool.clone());
            async move { repo.delete_all_returning_count().await }
        });
        tokio::time::sleep(std::time::Duration::from_millis(300)).await;
        writer.commit().await.expect("commit writer");

        let removed = purge.await.expect("purge task").expect("purge");
        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&pool)
            .await
            .expect("count remaining");

        assert_eq!(removed, 3);
        assert_eq!(remaining, 0);
    }
}
