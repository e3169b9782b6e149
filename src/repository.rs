use crate::error::ApiError;
use crate::models::{
    Category, Comment, CreateReviewRequest, CreateTitleRequest, CreateUserRequest, Genre, Review,
    SlugPayload, Title, TitleRow, UpdateCommentRequest, UpdateReviewRequest, UpdateTitleRequest,
    UpdateUserRequest, User,
};
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// Abstract contract for all persistence operations, letting handlers talk to
/// the data layer without knowing the implementation (Postgres, in-memory
/// test double). Mutations return `Result` so storage-level constraint
/// violations surface through the error taxonomy; the uniqueness rules
/// (username, email, slugs, one review per author+title) are enforced by the
/// database atomically, never by check-then-insert in handler code.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn list_users(&self) -> Vec<User>;
    async fn get_user(&self, id: Uuid) -> Option<User>;
    async fn get_user_by_username(&self, username: &str) -> Option<User>;
    async fn get_user_by_email(&self, email: &str) -> Option<User>;
    // `is_active` differs between the admin path (true) and signup (false).
    async fn create_user(&self, req: CreateUserRequest, is_active: bool)
    -> Result<User, ApiError>;
    async fn update_user(
        &self,
        username: &str,
        req: UpdateUserRequest,
    ) -> Result<Option<User>, ApiError>;
    async fn delete_user(&self, username: &str) -> bool;
    // Signup flow state transitions.
    async fn set_confirmation_code(&self, user_id: Uuid, code: &str) -> Result<(), ApiError>;
    async fn activate_user(&self, user_id: Uuid) -> Result<(), ApiError>;

    // --- Categories ---
    async fn list_categories(&self) -> Vec<Category>;
    async fn create_category(&self, req: SlugPayload) -> Result<Category, ApiError>;
    async fn delete_category(&self, slug: &str) -> bool;

    // --- Genres ---
    async fn list_genres(&self) -> Vec<Genre>;
    async fn create_genre(&self, req: SlugPayload) -> Result<Genre, ApiError>;
    async fn delete_genre(&self, slug: &str) -> bool;

    // --- Titles ---
    async fn list_titles(&self) -> Vec<Title>;
    async fn get_title(&self, id: Uuid) -> Option<Title>;
    async fn create_title(&self, req: CreateTitleRequest) -> Result<Title, ApiError>;
    async fn update_title(
        &self,
        id: Uuid,
        req: UpdateTitleRequest,
    ) -> Result<Option<Title>, ApiError>;
    async fn delete_title(&self, id: Uuid) -> bool;

    // --- Reviews ---
    // Listing is newest-first by pub_date.
    async fn list_reviews(&self, title_id: Uuid) -> Vec<Review>;
    async fn get_review(&self, title_id: Uuid, review_id: i64) -> Option<Review>;
    async fn create_review(
        &self,
        title_id: Uuid,
        author: Uuid,
        req: CreateReviewRequest,
    ) -> Result<Review, ApiError>;
    async fn update_review(
        &self,
        review_id: i64,
        req: UpdateReviewRequest,
    ) -> Result<Option<Review>, ApiError>;
    async fn delete_review(&self, review_id: i64) -> bool;

    // --- Comments ---
    async fn list_comments(&self, review_id: i64) -> Vec<Comment>;
    async fn get_comment(&self, review_id: i64, comment_id: i64) -> Option<Comment>;
    async fn create_comment(
        &self,
        review_id: i64,
        author: Uuid,
        text: &str,
    ) -> Result<Comment, ApiError>;
    async fn update_comment(
        &self,
        comment_id: i64,
        req: UpdateCommentRequest,
    ) -> Result<Option<Comment>, ApiError>;
    async fn delete_comment(&self, comment_id: i64) -> bool;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// Translates database errors into the API taxonomy. Constraint names are the
/// contract between schema and code: `uq_review_author_title` is the one
/// violation that is a Conflict; every other uniqueness clash is bad input.
fn map_db_err(e: sqlx::Error) -> ApiError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return match db.constraint() {
                Some("uq_review_author_title") => {
                    ApiError::Conflict("you have already reviewed this title".to_string())
                }
                Some("users_username_key") => {
                    ApiError::Validation("username is already taken".to_string())
                }
                Some("users_email_key") => {
                    ApiError::Validation("email is already registered".to_string())
                }
                Some("categories_slug_key") | Some("genres_slug_key") => {
                    ApiError::Validation("slug is already in use".to_string())
                }
                _ => ApiError::Validation("duplicate value".to_string()),
            };
        }
        if db.is_foreign_key_violation() {
            return ApiError::NotFound("referenced resource");
        }
    }
    tracing::error!("database error: {:?}", e);
    ApiError::Internal
}

const USER_COLUMNS: &str =
    "id, username, email, first_name, last_name, bio, role, is_active, confirmation_code";

// The title read shape: category joined in, rating aggregated on read so it
// can never drift from the stored reviews. AVG over zero rows is NULL, which
// is exactly the "no reviews yet" contract.
const TITLE_SELECT: &str = r#"
    SELECT t.id, t.name, t.year, t.description,
           AVG(r.score)::float8 AS rating,
           c.id AS category_id, c.name AS category_name, c.slug AS category_slug
    FROM titles t
    LEFT JOIN categories c ON c.id = t.category_id
    LEFT JOIN reviews r ON r.title_id = t.id
"#;

const TITLE_GROUP_BY: &str = " GROUP BY t.id, t.name, t.year, t.description, c.id, c.name, c.slug";

/// Joined row used to attach genres to titles in bulk.
#[derive(FromRow)]
struct TitleGenreRow {
    title_id: Uuid,
    id: Uuid,
    name: String,
    slug: String,
}

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by Postgres.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_user_where(&self, clause: &str, bind: &str) -> Option<User> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE {clause}");
        sqlx::query_as::<_, User>(&query)
            .bind(bind)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("user lookup error: {:?}", e);
                None
            })
    }

    /// Fetches genres for one title.
    async fn genres_of(&self, title_id: Uuid) -> Vec<Genre> {
        sqlx::query_as::<_, Genre>(
            r#"SELECT g.id, g.name, g.slug
               FROM title_genres tg JOIN genres g ON g.id = tg.genre_id
               WHERE tg.title_id = $1 ORDER BY g.slug"#,
        )
        .bind(title_id)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("genres_of error: {:?}", e);
            vec![]
        })
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- USERS ---

    async fn list_users(&self) -> Vec<User> {
        let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY username");
        sqlx::query_as::<_, User>(&query)
            .fetch_all(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("list_users error: {:?}", e);
                vec![]
            })
    }

    async fn get_user(&self, id: Uuid) -> Option<User> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_user error: {:?}", e);
                None
            })
    }

    async fn get_user_by_username(&self, username: &str) -> Option<User> {
        self.fetch_user_where("username = $1", username).await
    }

    async fn get_user_by_email(&self, email: &str) -> Option<User> {
        self.fetch_user_where("email = $1", email).await
    }

    /// Inserts a new user. Username/email uniqueness is enforced by the
    /// database; violations come back as Validation errors.
    async fn create_user(
        &self,
        req: CreateUserRequest,
        is_active: bool,
    ) -> Result<User, ApiError> {
        let query = format!(
            r#"INSERT INTO users (id, username, email, first_name, last_name, bio, role, is_active)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING {USER_COLUMNS}"#
        );
        sqlx::query_as::<_, User>(&query)
            .bind(Uuid::new_v4())
            .bind(&req.username)
            .bind(&req.email)
            .bind(&req.first_name)
            .bind(&req.last_name)
            .bind(&req.bio)
            .bind(req.role.unwrap_or_default())
            .bind(is_active)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_err)
    }

    /// Partial update via COALESCE: only provided fields change. The role
    /// field mask has already been applied at the handler boundary.
    async fn update_user(
        &self,
        username: &str,
        req: UpdateUserRequest,
    ) -> Result<Option<User>, ApiError> {
        let query = format!(
            r#"UPDATE users
               SET email = COALESCE($2, email),
                   first_name = COALESCE($3, first_name),
                   last_name = COALESCE($4, last_name),
                   bio = COALESCE($5, bio),
                   role = COALESCE($6, role)
               WHERE username = $1
               RETURNING {USER_COLUMNS}"#
        );
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .bind(&req.email)
            .bind(&req.first_name)
            .bind(&req.last_name)
            .bind(&req.bio)
            .bind(req.role)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)
    }

    async fn delete_user(&self, username: &str) -> bool {
        match sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_user error: {:?}", e);
                false
            }
        }
    }

    async fn set_confirmation_code(&self, user_id: Uuid, code: &str) -> Result<(), ApiError> {
        sqlx::query("UPDATE users SET confirmation_code = $2 WHERE id = $1")
            .bind(user_id)
            .bind(code)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    /// Activation clears the pending code so it cannot be replayed.
    async fn activate_user(&self, user_id: Uuid) -> Result<(), ApiError> {
        sqlx::query("UPDATE users SET is_active = true, confirmation_code = NULL WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    // --- CATEGORIES ---

    async fn list_categories(&self) -> Vec<Category> {
        sqlx::query_as::<_, Category>("SELECT id, name, slug FROM categories ORDER BY slug")
            .fetch_all(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("list_categories error: {:?}", e);
                vec![]
            })
    }

    async fn create_category(&self, req: SlugPayload) -> Result<Category, ApiError> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (id, name, slug) VALUES ($1, $2, $3) RETURNING id, name, slug",
        )
        .bind(Uuid::new_v4())
        .bind(&req.name)
        .bind(&req.slug)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)
    }

    /// Deleting a category nulls the reference on its titles (FK is
    /// ON DELETE SET NULL); titles themselves are untouched.
    async fn delete_category(&self, slug: &str) -> bool {
        match sqlx::query("DELETE FROM categories WHERE slug = $1")
            .bind(slug)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_category error: {:?}", e);
                false
            }
        }
    }

    // --- GENRES ---

    async fn list_genres(&self) -> Vec<Genre> {
        sqlx::query_as::<_, Genre>("SELECT id, name, slug FROM genres ORDER BY slug")
            .fetch_all(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("list_genres error: {:?}", e);
                vec![]
            })
    }

    async fn create_genre(&self, req: SlugPayload) -> Result<Genre, ApiError> {
        sqlx::query_as::<_, Genre>(
            "INSERT INTO genres (id, name, slug) VALUES ($1, $2, $3) RETURNING id, name, slug",
        )
        .bind(Uuid::new_v4())
        .bind(&req.name)
        .bind(&req.slug)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)
    }

    async fn delete_genre(&self, slug: &str) -> bool {
        match sqlx::query("DELETE FROM genres WHERE slug = $1")
            .bind(slug)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_genre error: {:?}", e);
                false
            }
        }
    }

    // --- TITLES ---

    async fn list_titles(&self) -> Vec<Title> {
        let query = format!("{TITLE_SELECT}{TITLE_GROUP_BY} ORDER BY t.name");
        let rows = match sqlx::query_as::<_, TitleRow>(&query)
            .fetch_all(&self.pool)
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!("list_titles error: {:?}", e);
                return vec![];
            }
        };

        // One pass for every title's genres instead of a query per title.
        let genre_rows = sqlx::query_as::<_, TitleGenreRow>(
            r#"SELECT tg.title_id, g.id, g.name, g.slug
               FROM title_genres tg JOIN genres g ON g.id = tg.genre_id
               ORDER BY g.slug"#,
        )
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("list_titles genres error: {:?}", e);
            vec![]
        });

        let mut by_title: HashMap<Uuid, Vec<Genre>> = HashMap::new();
        for row in genre_rows {
            by_title.entry(row.title_id).or_default().push(Genre {
                id: row.id,
                name: row.name,
                slug: row.slug,
            });
        }

        rows.into_iter()
            .map(|row| {
                let genres = by_title.remove(&row.id).unwrap_or_default();
                row.into_title(genres)
            })
            .collect()
    }

    async fn get_title(&self, id: Uuid) -> Option<Title> {
        let query = format!("{TITLE_SELECT} WHERE t.id = $1{TITLE_GROUP_BY}");
        let row = sqlx::query_as::<_, TitleRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_title error: {:?}", e);
                None
            })?;
        let genres = self.genres_of(id).await;
        Some(row.into_title(genres))
    }

    /// Inserts a title and its genre links in one transaction. Category and
    /// genre slugs must already exist; unknown slugs are rejected before
    /// anything is written.
    async fn create_title(&self, req: CreateTitleRequest) -> Result<Title, ApiError> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;

        let category_id = match &req.category {
            Some(slug) => Some(
                sqlx::query_scalar::<_, Uuid>("SELECT id FROM categories WHERE slug = $1")
                    .bind(slug)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(map_db_err)?
                    .ok_or_else(|| {
                        ApiError::Validation(format!("unknown category slug '{slug}'"))
                    })?,
            ),
            None => None,
        };

        let title_id = Uuid::new_v4();
        sqlx::query(
            r#"INSERT INTO titles (id, name, year, description, category_id)
               VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(title_id)
        .bind(&req.name)
        .bind(req.year)
        .bind(&req.description)
        .bind(category_id)
        .execute(&mut *tx)
        .await
        .map_err(map_db_err)?;

        if !req.genre.is_empty() {
            let genre_ids =
                sqlx::query_scalar::<_, Uuid>("SELECT id FROM genres WHERE slug = ANY($1)")
                    .bind(&req.genre)
                    .fetch_all(&mut *tx)
                    .await
                    .map_err(map_db_err)?;
            if genre_ids.len() != req.genre.len() {
                return Err(ApiError::Validation(
                    "one or more genre slugs are unknown".to_string(),
                ));
            }
            for genre_id in genre_ids {
                sqlx::query("INSERT INTO title_genres (title_id, genre_id) VALUES ($1, $2)")
                    .bind(title_id)
                    .bind(genre_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(map_db_err)?;
            }
        }

        tx.commit().await.map_err(map_db_err)?;
        self.get_title(title_id).await.ok_or(ApiError::Internal)
    }

    /// Partial update; a provided genre list replaces the existing links
    /// wholesale inside the same transaction.
    async fn update_title(
        &self,
        id: Uuid,
        req: UpdateTitleRequest,
    ) -> Result<Option<Title>, ApiError> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;

        let updated = sqlx::query_scalar::<_, Uuid>(
            r#"UPDATE titles
               SET name = COALESCE($2, name),
                   year = COALESCE($3, year),
                   description = COALESCE($4, description)
               WHERE id = $1
               RETURNING id"#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(req.year)
        .bind(&req.description)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_err)?;

        if updated.is_none() {
            return Ok(None);
        }

        if let Some(slug) = &req.category {
            let category_id =
                sqlx::query_scalar::<_, Uuid>("SELECT id FROM categories WHERE slug = $1")
                    .bind(slug)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(map_db_err)?
                    .ok_or_else(|| ApiError::Validation(format!("unknown category slug '{slug}'")))?;
            sqlx::query("UPDATE titles SET category_id = $2 WHERE id = $1")
                .bind(id)
                .bind(category_id)
                .execute(&mut *tx)
                .await
                .map_err(map_db_err)?;
        }

        if let Some(slugs) = &req.genre {
            sqlx::query("DELETE FROM title_genres WHERE title_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(map_db_err)?;
            if !slugs.is_empty() {
                let genre_ids =
                    sqlx::query_scalar::<_, Uuid>("SELECT id FROM genres WHERE slug = ANY($1)")
                        .bind(slugs)
                        .fetch_all(&mut *tx)
                        .await
                        .map_err(map_db_err)?;
                if genre_ids.len() != slugs.len() {
                    return Err(ApiError::Validation(
                        "one or more genre slugs are unknown".to_string(),
                    ));
                }
                for genre_id in genre_ids {
                    sqlx::query("INSERT INTO title_genres (title_id, genre_id) VALUES ($1, $2)")
                        .bind(id)
                        .bind(genre_id)
                        .execute(&mut *tx)
                        .await
                        .map_err(map_db_err)?;
                }
            }
        }

        tx.commit().await.map_err(map_db_err)?;
        Ok(self.get_title(id).await)
    }

    /// Cascades to the title's reviews (and their comments) via FK rules.
    async fn delete_title(&self, id: Uuid) -> bool {
        match sqlx::query("DELETE FROM titles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_title error: {:?}", e);
                false
            }
        }
    }

    // --- REVIEWS ---

    async fn list_reviews(&self, title_id: Uuid) -> Vec<Review> {
        sqlx::query_as::<_, Review>(
            r#"SELECT r.id, r.title_id, r.author, u.username AS author_username,
                      r.text, r.score, r.pub_date
               FROM reviews r JOIN users u ON u.id = r.author
               WHERE r.title_id = $1
               ORDER BY r.pub_date DESC"#,
        )
        .bind(title_id)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("list_reviews error: {:?}", e);
            vec![]
        })
    }

    async fn get_review(&self, title_id: Uuid, review_id: i64) -> Option<Review> {
        sqlx::query_as::<_, Review>(
            r#"SELECT r.id, r.title_id, r.author, u.username AS author_username,
                      r.text, r.score, r.pub_date
               FROM reviews r JOIN users u ON u.id = r.author
               WHERE r.id = $1 AND r.title_id = $2"#,
        )
        .bind(review_id)
        .bind(title_id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_review error: {:?}", e);
            None
        })
    }

    /// Inserts a review and joins the author username in one round trip.
    /// The (author, title) uniqueness race is settled here by the
    /// `uq_review_author_title` constraint: exactly one of two concurrent
    /// writers gets the row, the other gets a Conflict.
    async fn create_review(
        &self,
        title_id: Uuid,
        author: Uuid,
        req: CreateReviewRequest,
    ) -> Result<Review, ApiError> {
        sqlx::query_as::<_, Review>(
            r#"WITH inserted AS (
                   INSERT INTO reviews (title_id, author, text, score)
                   VALUES ($1, $2, $3, $4)
                   RETURNING id, title_id, author, text, score, pub_date
               )
               SELECT i.id, i.title_id, i.author, u.username AS author_username,
                      i.text, i.score, i.pub_date
               FROM inserted i JOIN users u ON u.id = i.author"#,
        )
        .bind(title_id)
        .bind(author)
        .bind(&req.text)
        .bind(req.score)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)
    }

    /// Text and score are the only mutable fields; pub_date and authorship
    /// never change.
    async fn update_review(
        &self,
        review_id: i64,
        req: UpdateReviewRequest,
    ) -> Result<Option<Review>, ApiError> {
        sqlx::query_as::<_, Review>(
            r#"WITH updated AS (
                   UPDATE reviews
                   SET text = COALESCE($2, text), score = COALESCE($3, score)
                   WHERE id = $1
                   RETURNING id, title_id, author, text, score, pub_date
               )
               SELECT d.id, d.title_id, d.author, u.username AS author_username,
                      d.text, d.score, d.pub_date
               FROM updated d JOIN users u ON u.id = d.author"#,
        )
        .bind(review_id)
        .bind(&req.text)
        .bind(req.score)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)
    }

    /// Cascades to the review's comments via FK rules.
    async fn delete_review(&self, review_id: i64) -> bool {
        match sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(review_id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_review error: {:?}", e);
                false
            }
        }
    }

    // --- COMMENTS ---

    async fn list_comments(&self, review_id: i64) -> Vec<Comment> {
        sqlx::query_as::<_, Comment>(
            r#"SELECT c.id, c.review_id, c.author, u.username AS author_username,
                      c.text, c.pub_date
               FROM comments c JOIN users u ON u.id = c.author
               WHERE c.review_id = $1
               ORDER BY c.pub_date DESC"#,
        )
        .bind(review_id)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("list_comments error: {:?}", e);
            vec![]
        })
    }

    async fn get_comment(&self, review_id: i64, comment_id: i64) -> Option<Comment> {
        sqlx::query_as::<_, Comment>(
            r#"SELECT c.id, c.review_id, c.author, u.username AS author_username,
                      c.text, c.pub_date
               FROM comments c JOIN users u ON u.id = c.author
               WHERE c.id = $1 AND c.review_id = $2"#,
        )
        .bind(comment_id)
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_comment error: {:?}", e);
            None
        })
    }

    async fn create_comment(
        &self,
        review_id: i64,
        author: Uuid,
        text: &str,
    ) -> Result<Comment, ApiError> {
        sqlx::query_as::<_, Comment>(
            r#"WITH inserted AS (
                   INSERT INTO comments (review_id, author, text)
                   VALUES ($1, $2, $3)
                   RETURNING id, review_id, author, text, pub_date
               )
               SELECT i.id, i.review_id, i.author, u.username AS author_username,
                      i.text, i.pub_date
               FROM inserted i JOIN users u ON u.id = i.author"#,
        )
        .bind(review_id)
        .bind(author)
        .bind(text)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)
    }

    async fn update_comment(
        &self,
        comment_id: i64,
        req: UpdateCommentRequest,
    ) -> Result<Option<Comment>, ApiError> {
        sqlx::query_as::<_, Comment>(
            r#"WITH updated AS (
                   UPDATE comments SET text = COALESCE($2, text)
                   WHERE id = $1
                   RETURNING id, review_id, author, text, pub_date
               )
               SELECT d.id, d.review_id, d.author, u.username AS author_username,
                      d.text, d.pub_date
               FROM updated d JOIN users u ON u.id = d.author"#,
        )
        .bind(comment_id)
        .bind(&req.text)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)
    }

    async fn delete_comment(&self, comment_id: i64) -> bool {
        match sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_comment error: {:?}", e);
                false
            }
        }
    }
}
