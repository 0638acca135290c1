//! Tests for posts module
//!
//! These tests verify the store-facing behavior of post handlers:
//! - Owner-scoped fetches never leak other users' posts
//! - Saved field values round-trip exactly

#[cfg(test)]
mod tests {
    use super::super::handlers::fetch_owned_post;
    use crate::common::migrations;
    use crate::services::sanitize::sanitize_post_html;
    use sqlx::SqlitePool;

    async fn pool_with_fixture() -> SqlitePool {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();

        for (user_id, email) in [("U_OWNER1", "owner@example.com"), ("U_OTHER1", "other@example.com")] {
            sqlx::query(
                "INSERT INTO users (id, name, email, password_hash, verified) VALUES (?, 'x', ?, 'hash', 1)",
            )
            .bind(user_id)
            .bind(email)
            .execute(&pool)
            .await
            .unwrap();
        }

        sqlx::query(
            r#"
            INSERT INTO posts (id, user_id, title, meta_description, seo_keywords, summary, content_html, source_url, ai_model)
            VALUES ('B_POST01', 'U_OWNER1', 'A Title', 'Meta', 'kw1, kw2', 'Summary.', '<p>Body</p>', 'https://youtu.be/dQw4w9WgXcQ', 'gpt-4o-mini')
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        pool
    }

    #[tokio::test]
    async fn test_owner_can_fetch_their_post() {
        let pool = pool_with_fixture().await;

        let post = fetch_owned_post(&pool, "B_POST01", "U_OWNER1")
            .await
            .unwrap()
            .expect("Owner should see their post");

        assert_eq!(post.title, "A Title");
        assert_eq!(post.user_id, "U_OWNER1");
    }

    #[tokio::test]
    async fn test_other_user_gets_none_not_details() {
        let pool = pool_with_fixture().await;

        // Same query shape for "not yours" and "does not exist"
        let foreign = fetch_owned_post(&pool, "B_POST01", "U_OTHER1").await.unwrap();
        assert!(foreign.is_none());

        let missing = fetch_owned_post(&pool, "B_NOPOST", "U_OWNER1").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_save_round_trips_field_values() {
        let pool = pool_with_fixture().await;

        let content = sanitize_post_html("<h2>Edited</h2><p>New body</p>");
        sqlx::query(
            r#"
            UPDATE posts
            SET title = ?, meta_description = ?, seo_keywords = ?, summary = ?,
                content_html = ?, updated_at = datetime('now')
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind("Edited Title")
        .bind("Edited meta")
        .bind("edited, keywords")
        .bind("Edited summary.")
        .bind(&content)
        .bind("B_POST01")
        .bind("U_OWNER1")
        .execute(&pool)
        .await
        .unwrap();

        let post = fetch_owned_post(&pool, "B_POST01", "U_OWNER1")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(post.title, "Edited Title");
        assert_eq!(post.meta_description, "Edited meta");
        assert_eq!(post.seo_keywords, "edited, keywords");
        assert_eq!(post.summary, "Edited summary.");
        assert_eq!(post.content_html, "<h2>Edited</h2><p>New body</p>");
    }

    #[tokio::test]
    async fn test_disallowed_markup_never_reaches_storage() {
        let pool = pool_with_fixture().await;

        // What a hostile save would submit, run through the same
        // sanitizer the handler applies before writing
        let content =
            sanitize_post_html(r#"<p>fine</p><script>steal()</script><p onclick="x">also fine</p>"#);
        sqlx::query("UPDATE posts SET content_html = ? WHERE id = 'B_POST01'")
            .bind(&content)
            .execute(&pool)
            .await
            .unwrap();

        let post = fetch_owned_post(&pool, "B_POST01", "U_OWNER1")
            .await
            .unwrap()
            .unwrap();

        assert!(!post.content_html.contains("<script"));
        assert!(!post.content_html.contains("onclick"));
        assert!(post.content_html.contains("<p>fine</p>"));
    }
}
