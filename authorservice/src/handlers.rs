use std::sync::Arc;

use actix_web::http::header::LOCATION;
use actix_web::Error;
use actix_web::HttpResponse;
use actix_web::web::Data;
use paperclip::actix::{
    api_v2_operation,
    web::{self},
};

use crate::api::{
    Author, AuthorDraft, AuthorId, ErrorBody, GetAllAuthorsResponse, LoginRequest, LoginResponse,
    ProtectedResponse,
};
use crate::auth::{verify_password, BearerAuth, TokenIssuer};
use crate::authors_repository::{AuthorsRepository, AuthorsRepositoryError};
use crate::users_repository::UsersRepository;

#[api_v2_operation]
pub async fn health() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().finish())
}

#[api_v2_operation]
pub async fn get_all_authors(
    authors_repository: Data<Arc<dyn AuthorsRepository + Send + Sync>>,
) -> Result<HttpResponse, Error> {
    Ok(match authors_repository.list_authors().await {
        Ok(authors) => HttpResponse::Ok().json(GetAllAuthorsResponse { authors }),
        Err(err) => {
            tracing::error!("Get all authors failed {}", err);
            HttpResponse::InternalServerError().json(ErrorBody::new("Author store failure"))
        }
    })
}

#[api_v2_operation]
pub async fn get_author(
    authors_repository: Data<Arc<dyn AuthorsRepository + Send + Sync>>,
    author_id: web::Path<AuthorId>,
) -> Result<HttpResponse, Error> {
    Ok(
        match authors_repository.get_author(author_id.into_inner()).await {
            Ok(author) => HttpResponse::Ok().json(author),
            Err(err @ AuthorsRepositoryError::NotFound(_)) => {
                HttpResponse::NotFound().json(ErrorBody::new(err.to_string()))
            }
            Err(err) => {
                tracing::error!("Get author failed {}", err);
                HttpResponse::InternalServerError().json(ErrorBody::new("Author store failure"))
            }
        },
    )
}

#[api_v2_operation]
pub async fn add_author(
    authors_repository: Data<Arc<dyn AuthorsRepository + Send + Sync>>,
    draft: web::Json<AuthorDraft>,
) -> Result<HttpResponse, Error> {
    Ok(
        match authors_repository.add_author(draft.into_inner()).await {
            Ok(author) => HttpResponse::Created()
                .append_header((LOCATION, format!("/api/authors/{}", author.id)))
                .json(author),
            Err(err) => {
                tracing::error!("Add author failed {}", err);
                HttpResponse::InternalServerError().json(ErrorBody::new("Author store failure"))
            }
        },
    )
}

#[api_v2_operation]
pub async fn update_author(
    authors_repository: Data<Arc<dyn AuthorsRepository + Send + Sync>>,
    author_id: web::Path<AuthorId>,
    author: web::Json<Author>,
) -> Result<HttpResponse, Error> {
    Ok(
        match authors_repository
            .update_author(author_id.into_inner(), author.into_inner())
            .await
        {
            Ok(()) => HttpResponse::NoContent().finish(),
            Err(err @ AuthorsRepositoryError::IdMismatch { .. }) => {
                HttpResponse::BadRequest().json(ErrorBody::new(err.to_string()))
            }
            Err(err @ AuthorsRepositoryError::NotFound(_)) => {
                HttpResponse::NotFound().json(ErrorBody::new(err.to_string()))
            }
            Err(err) => {
                tracing::error!("Update author failed {}", err);
                HttpResponse::InternalServerError().json(ErrorBody::new("Author store failure"))
            }
        },
    )
}

#[api_v2_operation]
pub async fn delete_author(
    authors_repository: Data<Arc<dyn AuthorsRepository + Send + Sync>>,
    author_id: web::Path<AuthorId>,
) -> Result<HttpResponse, Error> {
    Ok(
        match authors_repository
            .delete_author(author_id.into_inner())
            .await
        {
            Ok(()) => HttpResponse::NoContent().finish(),
            Err(err @ AuthorsRepositoryError::NotFound(_)) => {
                HttpResponse::NotFound().json(ErrorBody::new(err.to_string()))
            }
            Err(err) => {
                tracing::error!("Delete author failed {}", err);
                HttpResponse::InternalServerError().json(ErrorBody::new("Author store failure"))
            }
        },
    )
}

#[api_v2_operation]
pub async fn login(
    users_repository: Data<Arc<dyn UsersRepository + Send + Sync>>,
    token_issuer: Data<Arc<TokenIssuer>>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, Error> {
    let request = request.into_inner();
    Ok(
        match users_repository.get_user_by_username(&request.username).await {
            Ok(Some(user)) if verify_password(&request.password, &user.password_hash) => {
                match token_issuer.issue(&user.username) {
                    Ok(token) => HttpResponse::Ok().json(LoginResponse { token }),
                    Err(err) => {
                        tracing::error!("Token issuance failed {}", err);
                        HttpResponse::InternalServerError()
                            .json(ErrorBody::new("Failed to issue token"))
                    }
                }
            }
            // Same response for an unknown username and a wrong password
            Ok(_) => HttpResponse::Unauthorized()
                .json(ErrorBody::new("Invalid username or password")),
            Err(err) => {
                tracing::error!("Login failed {}", err);
                HttpResponse::InternalServerError().json(ErrorBody::new("User store failure"))
            }
        },
    )
}

#[api_v2_operation]
pub async fn protected(auth: BearerAuth) -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().json(ProtectedResponse {
        username: auth.0.sub,
    }))
}
