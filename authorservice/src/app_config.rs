use paperclip::actix::web;

use crate::handlers;

pub fn config_app(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(handlers::health)))
        .service(
            web::scope("/api")
                .service(
                    web::resource("/authors")
                        .route(web::get().to(handlers::get_all_authors))
                        .route(web::post().to(handlers::add_author)),
                )
                .service(
                    web::resource("/authors/{author_id}")
                        .route(web::get().to(handlers::get_author))
                        .route(web::put().to(handlers::update_author))
                        .route(web::delete().to(handlers::delete_author)),
                )
                .service(
                    web::scope("/auth")
                        .service(web::resource("/login").route(web::post().to(handlers::login))),
                )
                .service(web::resource("/protected").route(web::get().to(handlers::protected))),
        );
}
