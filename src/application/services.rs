use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::{
    application::ports::InferencePort,
    domain::{
        assembler::assemble,
        decoder::decode,
        detection::Detection,
        errors::{DomainError, DomainResult},
        frame::Frame,
        model::{DetectorParams, ModelInfo},
        preprocess::{preprocess, Preprocessed},
        stream::{summarize_detections, DetectionResult, FrameTiming},
        suppression::suppress,
    },
};

/// Milisegundos desde epoch (reloj de pared).
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Canal por el que llegó el frame; decide el `frame_id` por defecto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSource {
    Request,
    Stream,
}

/// Frame en estado `Received`: `recv_ts` ya está sellado, la imagen aún no se ha decodificado.
#[derive(Debug, Clone)]
pub struct ReceivedFrame {
    source: FrameSource,
    frame_id: Option<String>,
    capture_ts: Option<i64>,
    recv_ts: i64,
}

impl ReceivedFrame {
    /// Marca de captura del reloj del cliente; sin ella vale `recv_ts`.
    pub fn with_capture_ts(mut self, capture_ts: Option<i64>) -> Self {
        self.capture_ts = capture_ts;
        self
    }

    pub fn with_frame_id(mut self, frame_id: Option<String>) -> Self {
        self.frame_id = frame_id;
        self
    }

    pub fn recv_ts(&self) -> i64 {
        self.recv_ts
    }

    pub fn capture_ts(&self) -> i64 {
        self.capture_ts.unwrap_or(self.recv_ts)
    }

    pub fn frame_id(&self) -> String {
        match (&self.frame_id, self.source) {
            (Some(id), _) => id.clone(),
            (None, FrameSource::Request) => format!("frame_{}", self.capture_ts()),
            (None, FrameSource::Stream) => format!("ws_frame_{}", self.recv_ts),
        }
    }

    fn timing(&self) -> FrameTiming {
        FrameTiming {
            capture_ts: self.capture_ts(),
            recv_ts: self.recv_ts,
            // el reloj de pared puede retroceder; inference_ts nunca precede a recv_ts
            inference_ts: now_ms().max(self.recv_ts),
        }
    }
}

/// Orquestador del pipeline por frame:
/// `Received -> Preprocessed -> Inferred -> Postprocessed -> Delivered`.
///
/// No guarda estado entre frames; se clona y comparte libremente entre
/// peticiones y conexiones.
#[derive(Clone)]
pub struct PipelineService {
    params: Arc<DetectorParams>,
    backend: Option<Arc<dyn InferencePort>>,
}

impl PipelineService {
    pub fn new(params: DetectorParams, backend: Option<Arc<dyn InferencePort>>) -> Self {
        Self {
            params: Arc::new(params),
            backend,
        }
    }

    pub fn params(&self) -> &DetectorParams {
        &self.params
    }

    /// Sin backend el pipeline opera en modo degradado: resultados vacíos con timing válido.
    pub fn is_degraded(&self) -> bool {
        self.backend.is_none()
    }

    pub fn model_info(&self) -> Option<ModelInfo> {
        self.backend.as_ref().map(|b| b.info())
    }

    /// Estado `Received`: sella `recv_ts` en cuanto llega el mensaje.
    pub fn receive(&self, source: FrameSource) -> ReceivedFrame {
        ReceivedFrame {
            source,
            frame_id: None,
            capture_ts: None,
            recv_ts: now_ms(),
        }
    }

    /// Sobre de error para entradas que no llegan a decodificarse.
    pub fn reject(&self, received: ReceivedFrame, err: &DomainError) -> DetectionResult {
        warn!("Frame rechazado ({}): {}", received.frame_id(), err);
        DetectionResult {
            error: Some(err.to_string()),
            frame_id: format!("error_{}", received.recv_ts),
            timing: received.timing(),
            detections: Vec::new(),
        }
    }

    /// Procesa un frame decodificado. Nunca falla: cualquier error deja la
    /// lista de detecciones vacía y el resto del sobre intacto.
    pub async fn process(&self, received: ReceivedFrame, frame: Frame) -> DetectionResult {
        let frame_id = received.frame_id();

        let detections = match self.detect(&frame).await {
            Ok(detections) => detections,
            Err(DomainError::InferenceUnavailable(reason)) => {
                debug!("Frame {}: modo degradado ({})", frame_id, reason);
                Vec::new()
            }
            Err(e @ (DomainError::InvalidOutputShape { .. } | DomainError::InvariantViolation(_))) => {
                error!("Frame {} descartado: {}", frame_id, e);
                Vec::new()
            }
            Err(e) => {
                warn!("Frame {}: error de inferencia: {}", frame_id, e);
                Vec::new()
            }
        };

        let timing = received.timing();
        debug!(
            "Frame {} ({}x{}): [{}] en {} ms",
            frame_id,
            frame.width(),
            frame.height(),
            summarize_detections(&detections),
            timing.inference_ts - timing.recv_ts
        );

        DetectionResult {
            error: None,
            frame_id,
            timing,
            detections,
        }
    }

    async fn detect(&self, frame: &Frame) -> DomainResult<Vec<Detection>> {
        let Some(backend) = self.backend.as_ref() else {
            return Err(DomainError::InferenceUnavailable("ningún modelo cargado".into()));
        };
        let params = &self.params;

        let Preprocessed { tensor, transform } = preprocess(frame, params.input_size)?;
        let output = backend.infer(tensor).await?;

        let candidates = decode(output.view())?;
        let total = candidates.len();
        let kept = suppress(candidates, params.conf_threshold, params.iou_threshold);
        debug!("Postproceso: {} candidatos -> {} tras NMS", total, kept.len());

        assemble(&kept, &transform, frame.width(), frame.height(), params.class_names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::frame::PixelOrder;
    use async_trait::async_trait;
    use ndarray::{Array3, Array4, ArrayD};

    const CLASSES: usize = 80;

    /// Backend falso que devuelve filas fijas `[cx, cy, w, h, obj, class_id, score]`.
    struct FixedBackend {
        rows: Vec<(f32, f32, f32, f32, f32, usize, f32)>,
        classes: usize,
    }

    #[async_trait]
    impl InferencePort for FixedBackend {
        async fn infer(&self, input: Array4<f32>) -> DomainResult<ArrayD<f32>> {
            assert_eq!(input.shape(), &[1, 3, 320, 320]);
            let mut out = Array3::<f32>::zeros((1, self.rows.len(), 5 + self.classes));
            for (i, &(cx, cy, w, h, obj, class_id, score)) in self.rows.iter().enumerate() {
                for (k, v) in [cx, cy, w, h, obj].into_iter().enumerate() {
                    out[[0, i, k]] = v;
                }
                out[[0, i, 5 + class_id]] = score;
            }
            Ok(out.into_dyn())
        }

        fn info(&self) -> ModelInfo {
            ModelInfo {
                name: "fixed".into(),
                input_size: [320, 320],
                classes: self.classes,
                precision: "fp32".into(),
                device: "cpu".into(),
            }
        }
    }

    struct FailingBackend;

    #[async_trait]
    impl InferencePort for FailingBackend {
        async fn infer(&self, _input: Array4<f32>) -> DomainResult<ArrayD<f32>> {
            Err(DomainError::OperationFailed("sesión caída".into()))
        }

        fn info(&self) -> ModelInfo {
            ModelInfo {
                name: "failing".into(),
                input_size: [320, 320],
                classes: CLASSES,
                precision: "fp32".into(),
                device: "cpu".into(),
            }
        }
    }

    fn vga_frame() -> Frame {
        Frame::new(640, 480, PixelOrder::Bgr, vec![90; 640 * 480 * 3]).unwrap()
    }

    fn service(backend: Option<Arc<dyn InferencePort>>) -> PipelineService {
        PipelineService::new(DetectorParams::default(), backend)
    }

    fn assert_monotonic(result: &DetectionResult) {
        let t = result.timing;
        assert!(t.capture_ts <= t.recv_ts);
        assert!(t.recv_ts <= t.inference_ts);
    }

    #[tokio::test]
    async fn detects_and_maps_back_to_original_frame() {
        let backend = FixedBackend {
            rows: vec![
                (160.0, 160.0, 80.0, 80.0, 0.9, 0, 0.9),
                // solapa con la primera, menor confianza y otra clase: suprimida
                (162.0, 162.0, 80.0, 80.0, 0.9, 67, 0.7),
                // por debajo del umbral
                (40.0, 60.0, 20.0, 20.0, 0.3, 41, 0.5),
            ],
            classes: CLASSES,
        };
        let svc = service(Some(Arc::new(backend)));
        let received = svc.receive(FrameSource::Request).with_capture_ts(Some(1_000));
        let result = svc.process(received, vga_frame()).await;

        assert_eq!(result.frame_id, "frame_1000");
        assert_eq!(result.timing.capture_ts, 1_000);
        assert!(result.error.is_none());
        assert_eq!(result.detections.len(), 1);

        let d = &result.detections[0];
        assert_eq!(d.label, "person");
        assert!((d.score - 0.81).abs() < 1e-5);
        assert!((d.xmin - 0.375).abs() < 1e-5);
        assert!((d.xmax - 0.625).abs() < 1e-5);
        assert!((d.ymin - 1.0 / 3.0).abs() < 1e-5);
        assert!((d.ymax - 2.0 / 3.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn missing_backend_returns_empty_envelope() {
        let svc = service(None);
        assert!(svc.is_degraded());
        let received = svc.receive(FrameSource::Request);
        let recv_ts = received.recv_ts();
        let result = svc.process(received, vga_frame()).await;

        assert!(result.detections.is_empty());
        assert!(result.error.is_none());
        assert_eq!(result.timing.capture_ts, recv_ts);
        assert_eq!(result.frame_id, format!("frame_{}", recv_ts));
        assert_monotonic(&result);
    }

    #[tokio::test]
    async fn backend_failure_degrades_to_empty() {
        let svc = service(Some(Arc::new(FailingBackend)));
        let received = svc.receive(FrameSource::Stream);
        let recv_ts = received.recv_ts();
        let result = svc.process(received, vga_frame()).await;

        assert!(result.detections.is_empty());
        assert_eq!(result.frame_id, format!("ws_frame_{}", recv_ts));
        assert_monotonic(&result);
    }

    #[tokio::test]
    async fn out_of_range_class_drops_only_that_frame() {
        // 81 clases contra un vocabulario de 80
        let bad = FixedBackend {
            rows: vec![(160.0, 160.0, 80.0, 80.0, 0.9, 80, 0.9)],
            classes: CLASSES + 1,
        };
        let svc = service(Some(Arc::new(bad)));
        let first = svc.process(svc.receive(FrameSource::Stream).with_frame_id(Some("a".into())), vga_frame()).await;
        assert_eq!(first.frame_id, "a");
        assert!(first.detections.is_empty());

        let second = svc.process(svc.receive(FrameSource::Stream).with_frame_id(Some("b".into())), vga_frame()).await;
        assert_eq!(second.frame_id, "b");
        assert!(second.detections.is_empty());
        assert_monotonic(&second);
    }

    #[tokio::test]
    async fn reject_builds_error_envelope() {
        let svc = service(None);
        let received = svc.receive(FrameSource::Request).with_capture_ts(Some(5));
        let recv_ts = received.recv_ts();
        let result = svc.reject(received, &DomainError::InvalidInput("imagen ilegible".into()));

        assert!(result.error.as_deref().unwrap_or_default().contains("imagen ilegible"));
        assert_eq!(result.frame_id, format!("error_{}", recv_ts));
        assert_eq!(result.timing.capture_ts, 5);
        assert!(result.detections.is_empty());
    }

    #[tokio::test]
    async fn shared_service_handles_parallel_frames() {
        let backend = FixedBackend {
            rows: vec![(160.0, 160.0, 80.0, 80.0, 0.9, 16, 0.95)],
            classes: CLASSES,
        };
        let svc = service(Some(Arc::new(backend)));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let svc = svc.clone();
                tokio::spawn(async move {
                    let received = svc
                        .receive(FrameSource::Stream)
                        .with_capture_ts(Some(i))
                        .with_frame_id(Some(format!("f{}", i)));
                    svc.process(received, vga_frame()).await
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let result = handle.await.unwrap();
            assert_eq!(result.frame_id, format!("f{}", i));
            assert_eq!(result.detections.len(), 1);
            assert_eq!(result.detections[0].label, "dog");
        }
    }
}
