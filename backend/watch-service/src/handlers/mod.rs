pub mod health;
pub mod streams;

use actix_web::web;

use crate::metrics;

/// Register every route served by watch-service.
///
/// Expects a `web::Data<WatchStore>` in app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/v1/users/{user_id}")
            .route("", web::get().to(streams::list_streams))
            .route("/streams/{stream_id}", web::put().to(streams::watch_stream))
            .route(
                "/streams/{stream_id}",
                web::delete().to(streams::finish_stream),
            ),
    )
    .route("/health", web::get().to(health::health))
    .route("/ready", web::get().to(health::ready))
    .route("/metrics", web::get().to(metrics::serve_metrics));
}
