// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含服务器、抓取器和本地存储等所有配置项
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 抓取器配置
    pub scraper: ScraperSettings,
    /// 存储配置
    pub storage: StorageSettings,
}

/// 服务器配置设置
#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 抓取器配置设置
///
/// 控制自动化子进程的启动方式和时间预算
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperSettings {
    /// 运行器可执行文件（carcrawl-runner 或测试替身）
    pub runner_command: String,
    /// 传递给运行器的前置参数（位于五个位置参数之前）
    #[serde(default)]
    pub runner_args: Vec<String>,
    /// 单个抓取作业的超时时间（秒）
    pub job_timeout_secs: u64,
    /// act 指令之后的固定沉降等待（秒）
    pub settle_secs: u64,
    /// 交接文件目录
    pub handoff_dir: String,
    /// 自动化引擎使用的模型标识
    pub model_name: String,
    /// 自动化引擎（Stagehand 兼容服务）的基础URL
    pub engine_url: String,
}

impl ScraperSettings {
    /// 作业超时时间
    ///
    /// # 返回值
    ///
    /// 以Duration表示的作业超时时间
    pub fn job_timeout(&self) -> Duration {
        Duration::from_secs(self.job_timeout_secs)
    }
}

/// 存储配置设置
#[derive(Debug, Deserialize)]
pub struct StorageSettings {
    /// 成功作业结果追加写入的本地JSON数据文件
    pub data_file: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Start with default settings
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            // Default Scraper settings
            .set_default("scraper.runner_command", "carcrawl-runner")?
            // Generous default: navigation + settle sleep + model inference latency
            .set_default("scraper.job_timeout_secs", 120)?
            .set_default("scraper.settle_secs", 8)?
            .set_default("scraper.handoff_dir", "data")?
            .set_default("scraper.model_name", "google/gemini-2.5-flash")?
            .set_default("scraper.engine_url", "http://127.0.0.1:8700")?
            // Default Storage settings
            .set_default("storage.data_file", "data/listings.json")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("CARCRAWL").separator("__"));

        builder.build()?.try_deserialize()
    }
}
