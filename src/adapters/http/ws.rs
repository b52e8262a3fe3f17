use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use tracing::{debug, info, warn};

use crate::adapters::http::codec::{decode_base64_frame, decode_frame};
use crate::adapters::http::state::HttpState;
use crate::application::dto::WsFrameRequest;
use crate::application::services::FrameSource;
use crate::domain::errors::DomainError;
use crate::domain::stream::DetectionResult;

pub async fn ws_handler(ws: WebSocketUpgrade, State(st): State<HttpState>) -> impl axum::response::IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, st))
}

/// Procesa los frames de una conexión en orden de llegada; un resultado por frame.
async fn handle_socket(mut socket: WebSocket, st: HttpState) {
    info!("WebSocket: cliente conectado");
    let mut frames = 0u64;

    while let Some(msg) = socket.recv().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                warn!("WebSocket: error de recepción: {}", e);
                break;
            }
        };

        let result = match msg {
            Message::Binary(data) => handle_binary(&st, &data).await,
            Message::Text(text) => handle_text(&st, &text).await,
            Message::Close(_) => break,
            // ping/pong los responde axum
            _ => continue,
        };
        frames += 1;

        let json = serde_json::to_string(&result).unwrap_or_default();
        if socket.send(Message::Text(json)).await.is_err() {
            break;
        }
    }

    info!("WebSocket: cliente desconectado tras {} frames", frames);
}

/// Binario: la imagen codificada tal cual; capture_ts = recv_ts.
async fn handle_binary(st: &HttpState, data: &[u8]) -> DetectionResult {
    let received = st.pipeline.receive(FrameSource::Stream);
    match decode_frame(data) {
        Ok(frame) => st.pipeline.process(received, frame).await,
        Err(e) => st.pipeline.reject(received, &e),
    }
}

/// Texto: JSON `{frame_id?, capture_ts?, image}` con la imagen en base64.
async fn handle_text(st: &HttpState, text: &str) -> DetectionResult {
    let received = st.pipeline.receive(FrameSource::Stream);
    let request: WsFrameRequest = match serde_json::from_str(text) {
        Ok(request) => request,
        Err(e) => return st.pipeline.reject(received, &DomainError::InvalidInput(e.to_string())),
    };
    debug!("WebSocket: frame {:?} con capture_ts {:?}", request.frame_id, request.capture_ts);

    let received = received
        .with_capture_ts(request.capture_ts)
        .with_frame_id(request.frame_id);
    match decode_base64_frame(&request.image) {
        Ok(frame) => st.pipeline.process(received, frame).await,
        Err(e) => st.pipeline.reject(received, &e),
    }
}
