use dotenvy::dotenv;
use tracing::{error, info};
use uuid::Uuid;

fn init_logging() {
    // load .env first so RUST_LOG / LOG_FORMAT take effect
    dotenv().ok();
    common::utils::logging::init_logging_from_env();
    info!(service = "storefront", event = "logger_init", "tracing subscriber initialized");
}

fn main() -> std::process::ExitCode {
    init_logging();

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "storefront",
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    // config.toml (optional), then env overrides such as PORT
    let cfg = match configs::AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "storefront", event = "config_invalid", error = %e, "invalid configuration");
            return std::process::ExitCode::FAILURE;
        }
    };

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = cfg.server.worker_threads { builder.worker_threads(w); }

    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "storefront", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(
        service = "storefront",
        event = "start",
        %service_id,
        pid,
        version,
        port = cfg.server.port,
        threads = cfg.server.worker_threads.unwrap_or_default(),
        "storefront service starting"
    );

    match rt.block_on(server::run(cfg)) {
        Ok(()) => {
            info!(service = "storefront", event = "stop", %service_id, pid, "server stopped normally");
            std::process::ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "storefront", event = "run_failed", error = %e, "server::run returned error");
            std::process::ExitCode::FAILURE
        }
    }
}
