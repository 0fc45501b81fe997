use std::{path::PathBuf, sync::Arc};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use pkgidx_operations::{query_packages, IndexSelector, OperationError};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::error::{CliResult, ErrorContext};

#[derive(Clone)]
struct AppState {
    data_root: Arc<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct PackageQuery {
    branch: String,
    architecture: String,
    package_name: Option<String>,
    codename: Option<String>,
}

pub fn router(data_root: PathBuf) -> Router {
    let state = AppState {
        data_root: Arc::new(data_root),
    };

    Router::new()
        .route("/packages/", get(get_packages))
        .route("/packages", get(get_packages))
        .with_state(state)
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

async fn get_packages(
    State(state): State<AppState>,
    Query(query): Query<PackageQuery>,
) -> Response {
    let selector = IndexSelector {
        codename: query.codename,
        branch: query.branch,
        architecture: query.architecture,
    };
    let data_root = state.data_root.clone();
    let package = query.package_name;

    let result = tokio::task::spawn_blocking(move || {
        query_packages(&data_root, &selector, package.as_deref())
    })
    .await;

    match result {
        Ok(Ok(found)) => Json(found.into_records()).into_response(),
        Ok(Err(OperationError::IndexNotFound {
            ..
        })) => detail(StatusCode::NOT_FOUND, "Repository not found"),
        Ok(Err(OperationError::PackageNotFound {
            ..
        })) => detail(StatusCode::NOT_FOUND, "Package not found"),
        Ok(Err(err)) => {
            error!("{err}");
            detail(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
        }
        Err(err) => {
            error!("query task failed: {err}");
            detail(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

pub async fn serve(bind: &str, data_root: PathBuf) -> CliResult<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("binding {bind}"))?;
    info!(
        "Serving {} on http://{}/packages/",
        data_root.display(),
        bind
    );

    axum::serve(listener, router(data_root))
        .await
        .with_context(|| "running HTTP server".to_string())
}
