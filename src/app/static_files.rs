use crate::state;
use crate::static_files::{self, AssetError};

use axum::extract::State;
use axum::http::StatusCode;
use axum::http::Uri;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::response::Response;
use tracing::error;

pub(crate) async fn static_asset(
    State(state): State<state::AppState>,
    uri: Uri,
) -> Result<Response, (StatusCode, &'static str)> {
    match static_files::load_asset(&state.config.public_dir, uri.path()) {
        Ok(asset) => Ok(([(CONTENT_TYPE, asset.content_type)], asset.bytes).into_response()),
        Err(AssetError::NotFound) => Err((StatusCode::NOT_FOUND, "not found")),
        Err(AssetError::Forbidden) => Err((StatusCode::FORBIDDEN, "forbidden")),
        Err(AssetError::Io(err)) => {
            error!(path = uri.path(), error = %err, "failed to read static asset");
            Err((StatusCode::INTERNAL_SERVER_ERROR, "internal error"))
        }
    }
}
