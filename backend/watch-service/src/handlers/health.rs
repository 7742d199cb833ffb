use actix_web::{web, HttpResponse};
use tracing::warn;

use crate::store::WatchStore;

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}

/// Ready only while the backing engine answers.
pub async fn ready(store: web::Data<WatchStore>) -> HttpResponse {
    match store.ping().await {
        Ok(()) => HttpResponse::Ok().body("ready"),
        Err(err) => {
            warn!(error = %err, "readiness check failed");
            HttpResponse::ServiceUnavailable().finish()
        }
    }
}
