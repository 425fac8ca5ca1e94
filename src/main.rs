// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use carcrawl::application::usecases::run_scrape::RunScrapeUseCase;
use carcrawl::config::settings::Settings;
use carcrawl::engines::stagehand::StagehandEngine;
use carcrawl::engines::traits::AutomationEngine;
use carcrawl::infrastructure::storage::ListingStore;
use carcrawl::presentation::routes;
use carcrawl::utils::telemetry;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting carcrawl...");

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    // 3. Initialize the automation engine and the job orchestrator
    let engine: Arc<dyn AutomationEngine> = Arc::new(StagehandEngine::new(settings.scraper.clone()));
    let use_case = Arc::new(RunScrapeUseCase::from_settings(engine, &settings.scraper));

    // 4. Initialize the listing store
    let store = Arc::new(ListingStore::new(&settings.storage.data_file));

    // 5. Start HTTP server
    let app = routes::routes(use_case, store);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
