use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use titanic_survival::core::ConfigProvider;
use titanic_survival::utils::{logger, validation::Validate};
use titanic_survival::{
    router, CliArgs, LabelPolicy, LocalModelStore, ModelHandle, Scorer, SurvivalError,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 載入配置 (日誌格式取決於配置，所以先載入)
    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    };

    // 初始化日誌
    logger::init_logger(config.logging.format, args.verbose);

    tracing::info!("🚀 Starting titanic survival API");
    if args.verbose {
        tracing::debug!("Config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        exit_with(e);
    }

    let handle = Arc::new(ModelHandle::new(LocalModelStore::new(config.model_path())));

    // 模型檔缺失或損毀屬於啟動失敗，不重試
    if config.preload_model() || args.check {
        if let Err(e) = handle.get().await {
            exit_with(e);
        }
    } else {
        tracing::info!("💤 Model will be loaded on first request");
    }

    if args.check {
        tracing::info!("✅ Configuration and model are valid");
        println!("✅ Configuration and model are valid");
        return Ok(());
    }

    let policy = if config.reject_unknown_labels() {
        LabelPolicy::Reject
    } else {
        LabelPolicy::Propagate
    };
    let scorer = Arc::new(Scorer::with_policy(handle, policy));

    let app = match router(scorer, config.allowed_origin()) {
        Ok(app) => app,
        Err(e) => exit_with(e),
    };

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("🌐 Listening on http://{}", addr);
    tracing::info!("🔓 CORS allowed origin: {}", config.allowed_origin());
    tracing::info!("🏷️ Unknown label policy: {:?}", policy);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("👋 Server stopped");
    Ok(())
}

fn exit_with(e: SurvivalError) -> ! {
    tracing::error!(
        "❌ Startup failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());

    // 啟動錯誤一律以非零結束
    std::process::exit(e.exit_code().max(1));
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("🛑 Shutdown signal received");
}
