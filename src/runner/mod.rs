// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::{bail, Context, Result};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Duration;

use crate::engines::traits::{ENGINE_URL_ENV, HANDOFF_PATH_ENV, MODEL_NAME_ENV, SETTLE_SECS_ENV};
use crate::infrastructure::stagehand_client::StagehandClient;

/// 运行器配置
///
/// 由编排器在启动子进程时通过环境变量注入。
pub struct RunnerConfig {
    /// 自动化引擎基础URL
    pub engine_url: String,
    /// 模型标识
    pub model_name: String,
    /// act之后的固定沉降等待
    ///
    /// 引擎契约不暴露显式的就绪信号，固定等待是唯一可用的
    /// 回退手段，留给异步页面更新完成的时间。
    pub settle: Duration,
    /// 交接文件路径（每个作业唯一）
    pub handoff_path: PathBuf,
}

impl RunnerConfig {
    /// 从环境变量加载运行器配置
    pub fn from_env() -> Result<Self> {
        let handoff_path = std::env::var(HANDOFF_PATH_ENV)
            .with_context(|| format!("{} must be set", HANDOFF_PATH_ENV))?;
        let engine_url = std::env::var(ENGINE_URL_ENV)
            .unwrap_or_else(|_| "http://127.0.0.1:8700".to_string());
        let model_name = std::env::var(MODEL_NAME_ENV)
            .unwrap_or_else(|_| "google/gemini-2.5-flash".to_string());
        let settle_secs = std::env::var(SETTLE_SECS_ENV)
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .unwrap_or(8);

        Ok(Self {
            engine_url,
            model_name,
            settle: Duration::from_secs(settle_secs),
            handoff_path: PathBuf::from(handoff_path),
        })
    }
}

/// 运行器启动参数
///
/// 位置参数顺序固定：brand、model、year、target_url、api_key。
pub struct RunnerArgs {
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub target_url: String,
    pub api_key: String,
}

impl RunnerArgs {
    /// 解析位置参数
    ///
    /// # 参数
    ///
    /// * `args` - 不含程序名的参数序列
    pub fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut next = |name: &str| {
            args.next()
                .with_context(|| format!("Missing positional argument '{}'", name))
        };
        let brand = next("brand")?;
        let model = next("model")?;
        let year_raw = next("year")?;
        let target_url = next("target_url")?;
        let api_key = next("api_key")?;

        let year: i32 = year_raw
            .parse()
            .with_context(|| format!("Invalid year '{}'", year_raw))?;
        if args.next().is_some() {
            bail!("Too many positional arguments, expected exactly five");
        }

        Ok(Self {
            brand,
            model,
            year,
            target_url,
            api_key,
        })
    }
}

/// 构造搜索act指令
///
/// 描述期望的搜索/过滤操作，把具体的DOM交互留给引擎。
pub fn search_instruction(args: &RunnerArgs) -> String {
    format!(
        "Acepta cookies si aparecen. Asegúrate de estar en el listado de autos usados. \
         Aplica los filtros: Marca '{}', Modelo '{}' y Año '{}'. \
         Confirma que los filtros se aplicaron viendo los resultados en pantalla.",
        args.brand, args.model, args.year
    )
}

/// extract指令
pub fn extract_instruction() -> &'static str {
    "Localiza la lista principal de resultados (ignora anuncios y recomendados). \
     Extrae marca, modelo, año, kilometraje, precio, moneda y título de cada vehículo visible."
}

/// extract绑定的固定JSON模式
pub fn vehicle_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "vehicles": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "brand": {"type": "string"},
                        "model": {"type": "string"},
                        "year": {"type": "string"},
                        "km": {"type": "string"},
                        "price": {"type": "string"},
                        "currency": {"type": "string"},
                        "title": {"type": "string"}
                    }
                }
            }
        }
    })
}

/// 运行一次自动化作业
///
/// 启动会话，执行 navigate → act → 沉降等待 → extract 循环，把
/// 提取到的数组（可能为空）写入交接文件。无论成功还是失败，
/// 会话都会在返回前结束，浏览器资源在所有退出路径上被释放。
pub async fn run(config: &RunnerConfig, args: &RunnerArgs) -> Result<()> {
    let client = StagehandClient::new(&config.engine_url, &config.model_name);

    let session_id = client
        .start_session(&args.api_key)
        .await
        .context("Could not start automation session")?;

    // From here on the session must be released on every path.
    let outcome = drive(&client, &session_id, config, args).await;
    if let Err(e) = client.end_session(&session_id).await {
        eprintln!("warning: session cleanup failed: {}", e);
    }
    outcome
}

/// 执行单次act/extract循环并写入交接文件
async fn drive(
    client: &StagehandClient,
    session_id: &str,
    config: &RunnerConfig,
    args: &RunnerArgs,
) -> Result<()> {
    client
        .navigate(session_id, &args.target_url)
        .await
        .context("Navigation failed")?;

    client
        .act(session_id, &search_instruction(args))
        .await
        .context("Search action failed")?;

    // Asynchronous page updates keep landing after the act completes.
    tokio::time::sleep(config.settle).await;

    let extracted = client
        .extract(session_id, extract_instruction(), &vehicle_schema())
        .await
        .context("Extraction failed")?;

    let vehicles = extracted
        .get("vehicles")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    if let Some(parent) = config.handoff_path.parent() {
        std::fs::create_dir_all(parent).context("Could not create handoff directory")?;
    }
    let serialized = serde_json::to_vec(&Value::Array(vehicles))?;
    std::fs::write(&config.handoff_path, serialized).context("Could not write handoff file")?;

    Ok(())
}
