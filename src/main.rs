use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};

use fleet_waybill::config::{DatabaseConfig, EnvironmentConfig};
use fleet_waybill::database::DatabaseConnection;
use fleet_waybill::repositories::PgWaybillRepository;
use fleet_waybill::routes::create_router;
use fleet_waybill::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    info!("🚚 Fleet Waybill - motor de pedidos de transporte");
    info!("================================================");
    info!("🌍 Entorno: {}", config.environment);
    if config.cors_origins.is_empty() && !config.is_development() {
        warn!("⚠️ CORS_ORIGINS vacío fuera de desarrollo: se aceptan todos los orígenes");
    }

    // Inicializar base de datos
    let database_config = DatabaseConfig::from_env()?;
    let db_connection = match DatabaseConnection::connect(&database_config).await {
        Ok(conn) => conn,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(e);
        }
    };

    let repository = Arc::new(PgWaybillRepository::new(db_connection.pool().clone()));
    let state = AppState::new(repository, config.clone());
    let app = create_router(state);

    let addr = config.server_url();
    info!("🌐 Servidor escuchando en http://{}", addr);
    info!("📋 Endpoints disponibles:");
    info!("   GET    /health");
    info!("   POST   /api/orders");
    info!("   GET    /api/orders?status=");
    info!("   GET    /api/orders/:id");
    info!("   PATCH  /api/orders/:id");
    info!("   DELETE /api/orders/:id");
    info!("   GET    /api/resources/candidates?kind=&exclude_order_id=");
    info!("   PUT    /api/resources/drivers/:id/vehicle");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Servidor detenido");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
