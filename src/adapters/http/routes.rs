use axum::{
    extract::{multipart::MultipartRejection, Multipart, Query, State},
    response::IntoResponse,
    Json,
};
use axum::body::Bytes;

use crate::adapters::http::codec::decode_frame;
use crate::adapters::http::state::HttpState;
use crate::application::dto::{ConfigResponse, DetectQuery, HealthResponse, ModelsInfoResponse, RootResponse};
use crate::application::services::{now_ms, FrameSource};
use crate::domain::errors::{DomainError, DomainResult};

pub async fn root() -> impl IntoResponse {
    Json(RootResponse {
        message: "YOLO Frame Detection API".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

pub async fn health(State(st): State<HttpState>) -> impl IntoResponse {
    let mode = if st.pipeline.is_degraded() { "degraded" } else { "inference" };
    Json(HealthResponse {
        status: "healthy".into(),
        timestamp: now_ms(),
        mode: mode.into(),
    })
}

/// `POST /api/detect?timestamp=<ms>`: un frame por petición, campo multipart `image`.
/// Los errores de entrada se devuelven como sobre de error, nunca como 5xx.
pub async fn detect(
    State(st): State<HttpState>,
    Query(query): Query<DetectQuery>,
    multipart: Result<Multipart, MultipartRejection>,
) -> impl IntoResponse {
    let received = st
        .pipeline
        .receive(FrameSource::Request)
        // timestamp=0 equivale a no enviarlo
        .with_capture_ts(query.timestamp.filter(|ts| *ts > 0))
        .with_frame_id(query.frame_id);

    let image = match multipart {
        Ok(mut multipart) => read_image_field(&mut multipart).await,
        Err(e) => Err(DomainError::InvalidInput(e.body_text())),
    };

    let frame = match image.and_then(|bytes| decode_frame(&bytes)) {
        Ok(frame) => frame,
        Err(e) => return Json(st.pipeline.reject(received, &e)),
    };

    Json(st.pipeline.process(received, frame).await)
}

async fn read_image_field(multipart: &mut Multipart) -> DomainResult<Bytes> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| DomainError::InvalidInput(e.body_text()))?
    {
        if field.name() == Some("image") {
            return field
                .bytes()
                .await
                .map_err(|e| DomainError::InvalidInput(e.body_text()));
        }
    }
    Err(DomainError::InvalidInput("falta el campo 'image'".into()))
}

pub async fn models_info(State(st): State<HttpState>) -> impl IntoResponse {
    let info = st.pipeline.model_info();
    let device = info.as_ref().map(|i| i.device.clone()).unwrap_or_else(|| "cpu".into());
    let backend = if info.is_some() { "onnxruntime" } else { "none" };

    Json(ModelsInfoResponse {
        models: info.into_iter().collect(),
        device,
        backend: backend.into(),
    })
}

pub async fn get_config(State(st): State<HttpState>) -> impl IntoResponse {
    Json(ConfigResponse::from(st.pipeline.params()))
}
