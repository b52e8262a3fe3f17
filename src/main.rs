use std::sync::Arc;
use tower_http::services::ServeDir;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use clap::Parser;

use yolo_frame_detector::adapters::{
    http::{router, state::HttpState},
    onnx::{model_catalog::OnnxModelCatalog, yolo_engine::OnnxYoloEngine},
};
use yolo_frame_detector::application::{ports::{InferencePort, ModelCatalogPort}, services::PipelineService};
use yolo_frame_detector::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Inicializar logs (RUST_LOG=info por defecto)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::parse();
    let params = config.detector_params();
    params.validate()?;

    // 2. Cargar el backend; si falta o falla, el pipeline queda en modo degradado
    info!("🔧 Cargando modelo {} ({})...", config.model_name, config.model);
    let model = config.model_id();
    let backend: Option<Arc<dyn InferencePort>> = match OnnxModelCatalog::new().validate_model(&model).await {
        Ok(()) => match OnnxYoloEngine::load(&model, params.input_size, params.class_names.len(), &config.engine_options()) {
            Ok(engine) => Some(Arc::new(engine) as Arc<dyn InferencePort>),
            Err(e) => {
                warn!("⚠️ Error cargando modelo YOLO: {:?}", e);
                None
            }
        },
        Err(e) => {
            warn!("⚠️ Modelo no disponible: {}", e);
            None
        }
    };
    if backend.is_none() {
        warn!("⚠️ Sin backend de inferencia: modo degradado (detecciones vacías)");
    }

    // 3. Servicio y estado de la API
    let pipeline = Arc::new(PipelineService::new(params, backend));
    let state = HttpState { pipeline };

    // 4. Router de Axum y archivos estáticos
    let app = router(state)
        .fallback_service(ServeDir::new(&config.static_dir));

    // 5. Lanzar el servidor
    let addr = config.addr();
    info!(
        "🚀 Servidor de detección en http://{} (entrada {}px, conf {}, iou {})",
        addr, config.input_size, config.conf_threshold, config.iou_threshold
    );
    info!("📂 Archivos estáticos servidos desde '{}'", config.static_dir);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
