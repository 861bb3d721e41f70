//! Mini-program `code2session` exchange.

use serde::Deserialize;
use tracing::warn;

use crate::config::WechatConfig;
use crate::error::{AppError, AppResult};

const CODE2SESSION_URL: &str = "https://api.weixin.qq.com/sns/jscode2session";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WechatSession {
    #[serde(default)]
    pub openid: String,
    #[serde(default)]
    pub session_key: String,
    #[serde(default)]
    pub unionid: Option<String>,
    #[serde(default)]
    pub errcode: i64,
    #[serde(default)]
    pub errmsg: String,
}

/// Turns a login code from the mini-program into a session identity.
#[async_trait::async_trait]
pub trait SessionExchange: Send + Sync {
    async fn exchange(&self, code: &str) -> AppResult<WechatSession>;
}

#[derive(Debug, Clone)]
pub struct WechatClient {
    config: WechatConfig,
    http_client: reqwest::Client,
}

impl WechatClient {
    pub fn new(config: WechatConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl SessionExchange for WechatClient {
    async fn exchange(&self, code: &str) -> AppResult<WechatSession> {
        let response = self
            .http_client
            .get(CODE2SESSION_URL)
            .query(&[
                ("appid", self.config.app_id.as_str()),
                ("secret", self.config.app_secret.as_str()),
                ("js_code", code),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("wechat request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Internal(format!(
                "wechat returned status: {}",
                response.status()
            )));
        }

        let session: WechatSession = response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("wechat response unreadable: {e}")))?;

        if session.errcode != 0 || session.openid.is_empty() {
            warn!(
                errcode = session.errcode,
                errmsg = %session.errmsg,
                "wechat rejected login code"
            );
            return Err(AppError::bad_input(format!(
                "wechat login failed: {}",
                session.errmsg
            )));
        }
        Ok(session)
    }
}
