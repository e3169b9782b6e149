// Shared across several test binaries; not every binary uses every helper.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use reviewdb::{
    AppConfig, AppState, JwtTokenIssuer, MockNotifier, NotifierState, RepositoryState,
    TokenIssuerState,
    error::ApiError,
    models::{
        Category, Comment, CreateReviewRequest, CreateTitleRequest, CreateUserRequest, Genre,
        Review, Role, SlugPayload, Title, UpdateCommentRequest, UpdateReviewRequest,
        UpdateTitleRequest, UpdateUserRequest, User,
    },
    repository::Repository,
};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// --- In-memory Repository test double ---
//
// A functional fake rather than a canned mock: it honors the same uniqueness,
// cascade, and aggregate rules the Postgres schema enforces, so the full
// router can be exercised hermetically.

#[derive(Clone)]
struct StoredTitle {
    id: Uuid,
    name: String,
    year: i32,
    description: Option<String>,
    category_id: Option<Uuid>,
    genre_ids: Vec<Uuid>,
}

#[derive(Default)]
struct Store {
    users: Vec<User>,
    categories: Vec<Category>,
    genres: Vec<Genre>,
    titles: Vec<StoredTitle>,
    reviews: Vec<Review>,
    comments: Vec<Comment>,
    next_review_id: i64,
    next_comment_id: i64,
}

impl Store {
    fn title_view(&self, stored: &StoredTitle) -> Title {
        let scores: Vec<i32> = self
            .reviews
            .iter()
            .filter(|r| r.title_id == stored.id)
            .map(|r| r.score)
            .collect();
        let rating = if scores.is_empty() {
            None
        } else {
            Some(scores.iter().sum::<i32>() as f64 / scores.len() as f64)
        };
        Title {
            id: stored.id,
            name: stored.name.clone(),
            year: stored.year,
            description: stored.description.clone(),
            rating,
            category: stored
                .category_id
                .and_then(|id| self.categories.iter().find(|c| c.id == id).cloned()),
            genre: self
                .genres
                .iter()
                .filter(|g| stored.genre_ids.contains(&g.id))
                .cloned()
                .collect(),
        }
    }

    fn username_of(&self, user_id: Uuid) -> String {
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.username.clone())
            .unwrap_or_default()
    }

    fn drop_comments_of_review(&mut self, review_id: i64) {
        self.comments.retain(|c| c.review_id != review_id);
    }
}

#[derive(Default)]
pub struct InMemoryRepo {
    inner: Mutex<Store>,
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for InMemoryRepo {
    async fn list_users(&self) -> Vec<User> {
        let mut users = self.inner.lock().unwrap().users.clone();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        users
    }

    async fn get_user(&self, id: Uuid) -> Option<User> {
        self.inner
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
    }

    async fn get_user_by_username(&self, username: &str) -> Option<User> {
        self.inner
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned()
    }

    async fn get_user_by_email(&self, email: &str) -> Option<User> {
        self.inner
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
    }

    async fn create_user(
        &self,
        req: CreateUserRequest,
        is_active: bool,
    ) -> Result<User, ApiError> {
        let mut store = self.inner.lock().unwrap();
        if store.users.iter().any(|u| u.username == req.username) {
            return Err(ApiError::Validation("username is already taken".into()));
        }
        if store.users.iter().any(|u| u.email == req.email) {
            return Err(ApiError::Validation("email is already registered".into()));
        }
        let user = User {
            id: Uuid::new_v4(),
            username: req.username,
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            bio: req.bio,
            role: req.role.unwrap_or_default(),
            is_active,
            confirmation_code: None,
        };
        store.users.push(user.clone());
        Ok(user)
    }

    async fn update_user(
        &self,
        username: &str,
        req: UpdateUserRequest,
    ) -> Result<Option<User>, ApiError> {
        let mut store = self.inner.lock().unwrap();
        if let Some(email) = &req.email {
            if store
                .users
                .iter()
                .any(|u| u.email == *email && u.username != username)
            {
                return Err(ApiError::Validation("email is already registered".into()));
            }
        }
        let Some(user) = store.users.iter_mut().find(|u| u.username == username) else {
            return Ok(None);
        };
        if let Some(email) = req.email {
            user.email = email;
        }
        if let Some(first_name) = req.first_name {
            user.first_name = Some(first_name);
        }
        if let Some(last_name) = req.last_name {
            user.last_name = Some(last_name);
        }
        if let Some(bio) = req.bio {
            user.bio = Some(bio);
        }
        if let Some(role) = req.role {
            user.role = role;
        }
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, username: &str) -> bool {
        let mut store = self.inner.lock().unwrap();
        let Some(user) = store.users.iter().find(|u| u.username == username).cloned() else {
            return false;
        };
        store.users.retain(|u| u.id != user.id);
        // Author cascades: reviews and comments go with the account.
        let removed_reviews: Vec<i64> = store
            .reviews
            .iter()
            .filter(|r| r.author == user.id)
            .map(|r| r.id)
            .collect();
        store.reviews.retain(|r| r.author != user.id);
        store
            .comments
            .retain(|c| c.author != user.id && !removed_reviews.contains(&c.review_id));
        true
    }

    async fn set_confirmation_code(&self, user_id: Uuid, code: &str) -> Result<(), ApiError> {
        let mut store = self.inner.lock().unwrap();
        if let Some(user) = store.users.iter_mut().find(|u| u.id == user_id) {
            user.confirmation_code = Some(code.to_string());
        }
        Ok(())
    }

    async fn activate_user(&self, user_id: Uuid) -> Result<(), ApiError> {
        let mut store = self.inner.lock().unwrap();
        if let Some(user) = store.users.iter_mut().find(|u| u.id == user_id) {
            user.is_active = true;
            user.confirmation_code = None;
        }
        Ok(())
    }

    async fn list_categories(&self) -> Vec<Category> {
        let mut categories = self.inner.lock().unwrap().categories.clone();
        categories.sort_by(|a, b| a.slug.cmp(&b.slug));
        categories
    }

    async fn create_category(&self, req: SlugPayload) -> Result<Category, ApiError> {
        let mut store = self.inner.lock().unwrap();
        if store.categories.iter().any(|c| c.slug == req.slug) {
            return Err(ApiError::Validation("slug is already in use".into()));
        }
        let category = Category {
            id: Uuid::new_v4(),
            name: req.name,
            slug: req.slug,
        };
        store.categories.push(category.clone());
        Ok(category)
    }

    async fn delete_category(&self, slug: &str) -> bool {
        let mut store = self.inner.lock().unwrap();
        let Some(category) = store.categories.iter().find(|c| c.slug == slug).cloned() else {
            return false;
        };
        store.categories.retain(|c| c.id != category.id);
        // Weak reference: titles survive with a nulled category.
        for title in &mut store.titles {
            if title.category_id == Some(category.id) {
                title.category_id = None;
            }
        }
        true
    }

    async fn list_genres(&self) -> Vec<Genre> {
        let mut genres = self.inner.lock().unwrap().genres.clone();
        genres.sort_by(|a, b| a.slug.cmp(&b.slug));
        genres
    }

    async fn create_genre(&self, req: SlugPayload) -> Result<Genre, ApiError> {
        let mut store = self.inner.lock().unwrap();
        if store.genres.iter().any(|g| g.slug == req.slug) {
            return Err(ApiError::Validation("slug is already in use".into()));
        }
        let genre = Genre {
            id: Uuid::new_v4(),
            name: req.name,
            slug: req.slug,
        };
        store.genres.push(genre.clone());
        Ok(genre)
    }

    async fn delete_genre(&self, slug: &str) -> bool {
        let mut store = self.inner.lock().unwrap();
        let Some(genre) = store.genres.iter().find(|g| g.slug == slug).cloned() else {
            return false;
        };
        store.genres.retain(|g| g.id != genre.id);
        for title in &mut store.titles {
            title.genre_ids.retain(|id| *id != genre.id);
        }
        true
    }

    async fn list_titles(&self) -> Vec<Title> {
        let store = self.inner.lock().unwrap();
        let mut titles: Vec<Title> = store.titles.iter().map(|t| store.title_view(t)).collect();
        titles.sort_by(|a, b| a.name.cmp(&b.name));
        titles
    }

    async fn get_title(&self, id: Uuid) -> Option<Title> {
        let store = self.inner.lock().unwrap();
        store
            .titles
            .iter()
            .find(|t| t.id == id)
            .map(|t| store.title_view(t))
    }

    async fn create_title(&self, req: CreateTitleRequest) -> Result<Title, ApiError> {
        let mut store = self.inner.lock().unwrap();
        let category_id = match &req.category {
            Some(slug) => Some(
                store
                    .categories
                    .iter()
                    .find(|c| c.slug == *slug)
                    .map(|c| c.id)
                    .ok_or_else(|| {
                        ApiError::Validation(format!("unknown category slug '{slug}'"))
                    })?,
            ),
            None => None,
        };
        let mut genre_ids = Vec::new();
        for slug in &req.genre {
            let genre = store
                .genres
                .iter()
                .find(|g| g.slug == *slug)
                .ok_or_else(|| ApiError::Validation("one or more genre slugs are unknown".into()))?;
            genre_ids.push(genre.id);
        }
        let stored = StoredTitle {
            id: Uuid::new_v4(),
            name: req.name,
            year: req.year,
            description: req.description,
            category_id,
            genre_ids,
        };
        store.titles.push(stored.clone());
        Ok(store.title_view(&stored))
    }

    async fn update_title(
        &self,
        id: Uuid,
        req: UpdateTitleRequest,
    ) -> Result<Option<Title>, ApiError> {
        let mut store = self.inner.lock().unwrap();
        let category_id = match &req.category {
            Some(slug) => Some(
                store
                    .categories
                    .iter()
                    .find(|c| c.slug == *slug)
                    .map(|c| c.id)
                    .ok_or_else(|| {
                        ApiError::Validation(format!("unknown category slug '{slug}'"))
                    })?,
            ),
            None => None,
        };
        let genre_ids = match &req.genre {
            Some(slugs) => {
                let mut ids = Vec::new();
                for slug in slugs {
                    let genre = store.genres.iter().find(|g| g.slug == *slug).ok_or_else(|| {
                        ApiError::Validation("one or more genre slugs are unknown".into())
                    })?;
                    ids.push(genre.id);
                }
                Some(ids)
            }
            None => None,
        };
        let Some(title) = store.titles.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        if let Some(name) = req.name {
            title.name = name;
        }
        if let Some(year) = req.year {
            title.year = year;
        }
        if let Some(description) = req.description {
            title.description = Some(description);
        }
        if let Some(category_id) = category_id {
            title.category_id = Some(category_id);
        }
        if let Some(genre_ids) = genre_ids {
            title.genre_ids = genre_ids;
        }
        let stored = title.clone();
        Ok(Some(store.title_view(&stored)))
    }

    async fn delete_title(&self, id: Uuid) -> bool {
        let mut store = self.inner.lock().unwrap();
        let existed = store.titles.iter().any(|t| t.id == id);
        if !existed {
            return false;
        }
        store.titles.retain(|t| t.id != id);
        let removed_reviews: Vec<i64> = store
            .reviews
            .iter()
            .filter(|r| r.title_id == id)
            .map(|r| r.id)
            .collect();
        store.reviews.retain(|r| r.title_id != id);
        store
            .comments
            .retain(|c| !removed_reviews.contains(&c.review_id));
        true
    }

    async fn list_reviews(&self, title_id: Uuid) -> Vec<Review> {
        let store = self.inner.lock().unwrap();
        let mut reviews: Vec<Review> = store
            .reviews
            .iter()
            .filter(|r| r.title_id == title_id)
            .cloned()
            .collect();
        // Newest first; id breaks ties from same-instant inserts.
        reviews.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));
        reviews
    }

    async fn get_review(&self, title_id: Uuid, review_id: i64) -> Option<Review> {
        self.inner
            .lock()
            .unwrap()
            .reviews
            .iter()
            .find(|r| r.id == review_id && r.title_id == title_id)
            .cloned()
    }

    async fn create_review(
        &self,
        title_id: Uuid,
        author: Uuid,
        req: CreateReviewRequest,
    ) -> Result<Review, ApiError> {
        let mut store = self.inner.lock().unwrap();
        if store
            .reviews
            .iter()
            .any(|r| r.title_id == title_id && r.author == author)
        {
            return Err(ApiError::Conflict(
                "you have already reviewed this title".into(),
            ));
        }
        store.next_review_id += 1;
        let review = Review {
            id: store.next_review_id,
            title_id,
            author,
            author_username: store.username_of(author),
            text: req.text,
            score: req.score,
            pub_date: Utc::now(),
        };
        store.reviews.push(review.clone());
        Ok(review)
    }

    async fn update_review(
        &self,
        review_id: i64,
        req: UpdateReviewRequest,
    ) -> Result<Option<Review>, ApiError> {
        let mut store = self.inner.lock().unwrap();
        let Some(review) = store.reviews.iter_mut().find(|r| r.id == review_id) else {
            return Ok(None);
        };
        if let Some(text) = req.text {
            review.text = text;
        }
        if let Some(score) = req.score {
            review.score = score;
        }
        Ok(Some(review.clone()))
    }

    async fn delete_review(&self, review_id: i64) -> bool {
        let mut store = self.inner.lock().unwrap();
        let existed = store.reviews.iter().any(|r| r.id == review_id);
        if !existed {
            return false;
        }
        store.reviews.retain(|r| r.id != review_id);
        store.drop_comments_of_review(review_id);
        true
    }

    async fn list_comments(&self, review_id: i64) -> Vec<Comment> {
        let store = self.inner.lock().unwrap();
        let mut comments: Vec<Comment> = store
            .comments
            .iter()
            .filter(|c| c.review_id == review_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));
        comments
    }

    async fn get_comment(&self, review_id: i64, comment_id: i64) -> Option<Comment> {
        self.inner
            .lock()
            .unwrap()
            .comments
            .iter()
            .find(|c| c.id == comment_id && c.review_id == review_id)
            .cloned()
    }

    async fn create_comment(
        &self,
        review_id: i64,
        author: Uuid,
        text: &str,
    ) -> Result<Comment, ApiError> {
        let mut store = self.inner.lock().unwrap();
        store.next_comment_id += 1;
        let comment = Comment {
            id: store.next_comment_id,
            review_id,
            author,
            author_username: store.username_of(author),
            text: text.to_string(),
            pub_date: Utc::now(),
        };
        store.comments.push(comment.clone());
        Ok(comment)
    }

    async fn update_comment(
        &self,
        comment_id: i64,
        req: UpdateCommentRequest,
    ) -> Result<Option<Comment>, ApiError> {
        let mut store = self.inner.lock().unwrap();
        let Some(comment) = store.comments.iter_mut().find(|c| c.id == comment_id) else {
            return Ok(None);
        };
        if let Some(text) = req.text {
            comment.text = text;
        }
        Ok(Some(comment.clone()))
    }

    async fn delete_comment(&self, comment_id: i64) -> bool {
        let mut store = self.inner.lock().unwrap();
        let existed = store.comments.iter().any(|c| c.id == comment_id);
        store.comments.retain(|c| c.id != comment_id);
        existed
    }
}

// --- State and fixture helpers ---

/// Builds an AppState over the in-memory repository, the real JWT issuer
/// (test secret from AppConfig::default), and a capturing notifier. The
/// notifier handle is returned so tests can read delivered codes.
pub fn test_state() -> (AppState, Arc<InMemoryRepo>, Arc<MockNotifier>) {
    let repo = Arc::new(InMemoryRepo::new());
    let notifier = Arc::new(MockNotifier::new());
    let config = AppConfig::default();
    let state = AppState {
        repo: repo.clone() as RepositoryState,
        tokens: Arc::new(JwtTokenIssuer::from_config(&config)) as TokenIssuerState,
        notifier: notifier.clone() as NotifierState,
        config,
    };
    (state, repo, notifier)
}

/// Inserts a user straight into the repository, bypassing the signup flow.
pub async fn seed_user(repo: &InMemoryRepo, username: &str, role: Role, is_active: bool) -> User {
    repo.create_user(
        CreateUserRequest {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: None,
            last_name: None,
            bio: None,
            role: Some(role),
        },
        is_active,
    )
    .await
    .expect("seed_user failed")
}

/// Inserts a title straight into the repository.
pub async fn seed_title(repo: &InMemoryRepo, name: &str, year: i32) -> Title {
    repo.create_title(CreateTitleRequest {
        name: name.to_string(),
        year,
        description: None,
        genre: vec![],
        category: None,
    })
    .await
    .expect("seed_title failed")
}
