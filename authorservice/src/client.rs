use anyhow::{bail, Context};
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;

use crate::api::{
    Author, AuthorDraft, AuthorId, GetAllAuthorsResponse, LoginRequest, LoginResponse,
    ProtectedResponse,
};

pub struct AuthorServiceClient {
    url: String,
    client: ClientWithMiddleware,
}

impl AuthorServiceClient {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            .build()
            .context("Failed to build reqwest client")?;
        let client = ClientBuilder::new(reqwest_client)
            // Insert the tracing middleware
            .with(TracingMiddleware::default())
            .build();

        Ok(Self {
            url: url.to_string(),
            client,
        })
    }

    pub async fn add_author(&self, draft: AuthorDraft) -> anyhow::Result<Author> {
        let response = self
            .client
            .post(format!("{}/api/authors", self.url))
            .json(&draft)
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("Failed to add author, status {}", response.status())
        }

        response
            .json()
            .await
            .context("Failed to parse created author")
    }

    pub async fn get_author(&self, author_id: AuthorId) -> anyhow::Result<Option<Author>> {
        let response = self
            .client
            .get(format!("{}/api/authors/{}", self.url, author_id))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            bail!("Failed to get author, status {}", response.status())
        }

        Ok(Some(response.json().await.context("Failed to parse author")?))
    }

    pub async fn list_authors(&self) -> anyhow::Result<Vec<Author>> {
        let response = self
            .client
            .get(format!("{}/api/authors", self.url))
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("Failed to list authors, status {}", response.status())
        }

        let body: GetAllAuthorsResponse = response
            .json()
            .await
            .context("Failed to parse authors list")?;
        Ok(body.authors)
    }

    pub async fn update_author(&self, author: Author) -> anyhow::Result<()> {
        let response = self
            .client
            .put(format!("{}/api/authors/{}", self.url, author.id))
            .json(&author)
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("Failed to update author, status {}", response.status())
        }
        Ok(())
    }

    /// Returns false when the author was already absent
    pub async fn delete_author(&self, author_id: AuthorId) -> anyhow::Result<bool> {
        let response = self
            .client
            .delete(format!("{}/api/authors/{}", self.url, author_id))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !response.status().is_success() {
            bail!("Failed to delete author, status {}", response.status())
        }
        Ok(true)
    }

    /// Returns None when the credentials were rejected
    pub async fn login(&self, username: &str, password: &str) -> anyhow::Result<Option<String>> {
        let response = self
            .client
            .post(format!("{}/api/auth/login", self.url))
            .json(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        if !response.status().is_success() {
            bail!("Failed to login, status {}", response.status())
        }

        let body: LoginResponse = response
            .json()
            .await
            .context("Failed to parse login response")?;
        Ok(Some(body.token))
    }

    /// Returns None when the token was rejected
    pub async fn protected(&self, token: &str) -> anyhow::Result<Option<String>> {
        let response = self
            .client
            .get(format!("{}/api/protected", self.url))
            .header(reqwest::header::AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        if !response.status().is_success() {
            bail!("Failed to call protected route, status {}", response.status())
        }

        let body: ProtectedResponse = response
            .json()
            .await
            .context("Failed to parse protected response")?;
        Ok(Some(body.username))
    }
}
