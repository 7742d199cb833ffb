//! Watch-set endpoints.
//!
//! `PUT    /v1/users/{user_id}/streams/{stream_id}` starts watching (201),
//! `DELETE /v1/users/{user_id}/streams/{stream_id}` stops watching (200),
//! `GET    /v1/users/{user_id}` lists watched streams as `id1,id2,...` (200).
//!
//! Quota and identifier errors answer 400, engine failures 500, always with
//! an empty body.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{debug, error};

use crate::error::{Result, WatchError};
use crate::metrics;
use crate::models::{StreamId, UserId, LIST_SEPARATOR};
use crate::store::WatchStore;

#[derive(Debug, Deserialize)]
pub struct StreamPath {
    pub user_id: String,
    pub stream_id: String,
}

#[derive(Debug, Deserialize)]
pub struct UserPath {
    pub user_id: String,
}

fn parse_ids(user_id: &str, stream_id: &str) -> Result<(UserId, StreamId)> {
    Ok((UserId::parse(user_id)?, StreamId::parse(stream_id)?))
}

fn report_failure(
    operation: &'static str,
    user_id: &str,
    stream_id: Option<&str>,
    err: &WatchError,
) {
    metrics::record_operation(operation, err.outcome());
    let stream_id = stream_id.unwrap_or_default();
    match err {
        WatchError::QuotaExceeded { limit } => {
            debug!(%user_id, %stream_id, limit, "user exceeded streaming quota");
        }
        WatchError::InvalidId { field, reason } => {
            debug!(%user_id, %stream_id, field, reason, "rejected invalid identifier");
        }
        WatchError::Store { .. } => {
            error!(%user_id, %stream_id, error = %err, operation, "watch store call failed");
        }
    }
}

pub async fn watch_stream(
    store: web::Data<WatchStore>,
    path: web::Path<StreamPath>,
) -> Result<HttpResponse> {
    let StreamPath { user_id, stream_id } = path.into_inner();

    let result = match parse_ids(&user_id, &stream_id) {
        Ok((user, stream)) => store.add_stream(&user, &stream).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(outcome) => {
            metrics::record_operation("add", outcome.as_str());
            Ok(HttpResponse::Created().finish())
        }
        Err(err) => {
            report_failure("add", &user_id, Some(&stream_id), &err);
            Err(err)
        }
    }
}

pub async fn finish_stream(
    store: web::Data<WatchStore>,
    path: web::Path<StreamPath>,
) -> Result<HttpResponse> {
    let StreamPath { user_id, stream_id } = path.into_inner();

    let result = match parse_ids(&user_id, &stream_id) {
        Ok((user, stream)) => store.remove_stream(&user, &stream).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(()) => {
            metrics::record_operation("remove", "ok");
            Ok(HttpResponse::Ok().finish())
        }
        Err(err) => {
            report_failure("remove", &user_id, Some(&stream_id), &err);
            Err(err)
        }
    }
}

pub async fn list_streams(
    store: web::Data<WatchStore>,
    path: web::Path<UserPath>,
) -> Result<HttpResponse> {
    let UserPath { user_id } = path.into_inner();

    let result = match UserId::parse(user_id.as_str()) {
        Ok(user) => store.get_streams(&user).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(streams) => {
            metrics::record_operation("list", "ok");
            let body = streams.join(LIST_SEPARATOR);
            Ok(HttpResponse::Ok()
                .content_type("text/plain; charset=utf-8")
                .body(body))
        }
        Err(err) => {
            report_failure("list", &user_id, None, &err);
            Err(err)
        }
    }
}
