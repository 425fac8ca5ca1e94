// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde_json::{json, Value};
use thiserror::Error;

/// 会话错误类型
#[derive(Error, Debug)]
pub enum SessionError {
    /// HTTP请求失败
    #[error("Engine request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// 引擎返回了错误响应
    ///
    /// 只携带端点和状态码；响应体可能回显含密钥的请求，不进入错误文本。
    #[error("Engine endpoint '{endpoint}' returned status {status}")]
    Api { endpoint: &'static str, status: u16 },
    /// 引擎响应缺少预期字段
    #[error("Engine response missing field '{0}'")]
    MissingField(&'static str),
}

/// Stagehand会话客户端
///
/// 运行器侧对本地Stagehand兼容服务的HTTP封装。引擎本身是
/// 黑盒协作者，这里只依赖 start/navigate/act/extract/end
/// 这一组契约。
pub struct StagehandClient {
    http: reqwest::Client,
    base_url: String,
    model_name: String,
}

impl StagehandClient {
    /// 创建新的会话客户端
    ///
    /// # 参数
    ///
    /// * `base_url` - 引擎基础URL
    /// * `model_name` - 模型标识
    pub fn new(base_url: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            model_name: model_name.into(),
        }
    }

    /// 启动浏览器会话
    ///
    /// # 参数
    ///
    /// * `api_key` - AI API密钥（仅进入请求体，不进入任何错误或日志）
    ///
    /// # 返回值
    ///
    /// * `Ok(String)` - 会话ID
    /// * `Err(SessionError)` - 启动失败
    pub async fn start_session(&self, api_key: &str) -> Result<String, SessionError> {
        let body = json!({
            "model_name": self.model_name,
            "model_api_key": api_key,
            "browser": {"type": "local"},
        });
        let value = self.post_to("start", "/v1/sessions/start", &body).await?;
        value
            .pointer("/data/session_id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(SessionError::MissingField("data.session_id"))
    }

    /// 导航到目标URL并等待页面加载
    pub async fn navigate(&self, session_id: &str, url: &str) -> Result<(), SessionError> {
        let path = format!("/v1/sessions/{}/navigate", session_id);
        self.post_to("navigate", &path, &json!({"url": url})).await?;
        Ok(())
    }

    /// 发出一条自然语言act指令
    ///
    /// act指令描述要执行的UI交互（搜索、过滤），由引擎决定
    /// 具体的DOM操作，因而对页面标记变化具有韧性。
    pub async fn act(&self, session_id: &str, instruction: &str) -> Result<(), SessionError> {
        let path = format!("/v1/sessions/{}/act", session_id);
        let body = json!({"instruction": instruction, "max_steps": 20});
        self.post_to("act", &path, &body).await?;
        Ok(())
    }

    /// 发出一条绑定JSON模式的extract指令
    ///
    /// # 返回值
    ///
    /// * `Ok(Value)` - 引擎返回的提取结果对象
    pub async fn extract(
        &self,
        session_id: &str,
        instruction: &str,
        schema: &Value,
    ) -> Result<Value, SessionError> {
        let path = format!("/v1/sessions/{}/extract", session_id);
        let body = json!({"instruction": instruction, "schema": schema});
        let value = self.post_to("extract", &path, &body).await?;
        value
            .pointer("/data/result")
            .cloned()
            .ok_or(SessionError::MissingField("data.result"))
    }

    /// 结束会话，释放浏览器资源
    pub async fn end_session(&self, session_id: &str) -> Result<(), SessionError> {
        let path = format!("/v1/sessions/{}/end", session_id);
        self.post_to("end", &path, &json!({})).await?;
        Ok(())
    }

    async fn post_to(
        &self,
        endpoint: &'static str,
        path: &str,
        body: &Value,
    ) -> Result<Value, SessionError> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        let response = self.http.post(&url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SessionError::Api {
                endpoint,
                status: status.as_u16(),
            });
        }
        Ok(response.json::<Value>().await?)
    }
}
