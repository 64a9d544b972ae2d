//! 点击追踪示例服务
//!
//! 这些服务只用来演示容器如何按构造参数描述递归装配对象图：
//! 点击写入内存存储，Webhook 校验共享密钥，财务转发组装发往财务服务的载荷。

use crate::errors::ContainerError;
use crate::infrastructure::container::{Arguments, Concrete, Container, Dependency, Injectable, Parameters};
use crate::infrastructure::provider::ServiceProvider;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;

/// 点击存储的接口标识
pub const CLICK_STORE: &str = "ClickStore";

pub const DEFAULT_FINANCE_URL: &str = "http://finance-service:8080";
pub const DEFAULT_FINANCE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_WEBHOOK_SECRET: &str = "change-me";

/// 点击数据必须包含的字段
pub const REQUIRED_CLICK_FIELDS: [&str; 5] = ["click_id", "offer_id", "source", "timestamp", "signature"];

/// 单条点击记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickRecord {
    pub click_id: String,
    pub offer_id: u64,
    pub source: String,
    pub timestamp: String,
}

/// 内存点击存储，按 click_id 去重
#[derive(Debug, Default)]
pub struct InMemoryClickStore {
    clicks: DashMap<String, ClickRecord>,
}

impl InMemoryClickStore {
    /// 写入记录，重复的 click_id 返回 false
    pub fn insert(&self, record: ClickRecord) -> bool {
        match self.clicks.entry(record.click_id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.clicks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clicks.is_empty()
    }

    /// 指定日期（`YYYY-MM-DD`）的点击，按 click_id 排序
    pub fn clicks_for_date(&self, date: &str) -> Vec<ClickRecord> {
        let mut clicks: Vec<ClickRecord> = self
            .clicks
            .iter()
            .filter(|entry| entry.timestamp.starts_with(date))
            .map(|entry| entry.value().clone())
            .collect();
        clicks.sort_by(|a, b| a.click_id.cmp(&b.click_id));
        clicks
    }
}

impl Injectable for InMemoryClickStore {
    fn key() -> String {
        "InMemoryClickStore".to_string()
    }

    fn construct(_args: Arguments) -> Result<Self, ContainerError> {
        Ok(Self::default())
    }
}

/// 点击接收服务
pub struct ClickService {
    store: Arc<InMemoryClickStore>,
}

impl ClickService {
    /// 校验并保存点击数据
    pub fn process_click(&self, data: &HashMap<String, String>) -> bool {
        let Some(record) = Self::parse_click(data) else {
            tracing::warn!(fields = data.len(), "Invalid click data received");
            return false;
        };

        let click_id = record.click_id.clone();
        let inserted = self.store.insert(record);
        if !inserted {
            tracing::debug!(click_id = %click_id, "Duplicate click ignored");
        }
        inserted
    }

    fn parse_click(data: &HashMap<String, String>) -> Option<ClickRecord> {
        let has_all_fields = REQUIRED_CLICK_FIELDS
            .iter()
            .all(|field| data.get(*field).map(|v| !v.is_empty()).unwrap_or(false));
        if !has_all_fields {
            return None;
        }

        Some(ClickRecord {
            click_id: data.get("click_id")?.clone(),
            offer_id: data.get("offer_id")?.parse().ok()?,
            source: data.get("source")?.clone(),
            timestamp: data.get("timestamp")?.clone(),
        })
    }

    pub fn store(&self) -> &Arc<InMemoryClickStore> {
        &self.store
    }
}

impl Injectable for ClickService {
    fn key() -> String {
        "ClickService".to_string()
    }

    fn dependencies() -> Vec<Dependency> {
        vec![Dependency::bound("store", CLICK_STORE)]
    }

    fn construct(mut args: Arguments) -> Result<Self, ContainerError> {
        Ok(Self { store: args.next()? })
    }
}

/// Webhook 校验服务
pub struct WebhookService {
    secret: String,
}

impl WebhookService {
    /// 载荷是否包含所有必需字段
    pub fn validate_payload(&self, payload: &HashMap<String, String>) -> bool {
        match REQUIRED_CLICK_FIELDS.iter().find(|field| !payload.contains_key(**field)) {
            Some(missing) => {
                tracing::warn!(field = *missing, "Missing required field");
                false
            }
            None => true,
        }
    }

    pub fn verify_token(&self, token: &str) -> bool {
        !token.is_empty() && token == self.secret
    }
}

impl Injectable for WebhookService {
    fn key() -> String {
        "WebhookService".to_string()
    }

    fn dependencies() -> Vec<Dependency> {
        vec![Dependency::value("secret").with_default(DEFAULT_WEBHOOK_SECRET.to_string())]
    }

    fn construct(mut args: Arguments) -> Result<Self, ContainerError> {
        Ok(Self {
            secret: args.next_value()?,
        })
    }
}

/// 发往财务服务的载荷
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinancePayload {
    pub url: String,
    pub timeout_secs: u64,
    pub date: String,
    pub clicks: Vec<ClickRecord>,
}

/// 财务转发服务
pub struct FinanceService {
    store: Arc<InMemoryClickStore>,
    url: String,
    timeout_secs: u64,
}

impl FinanceService {
    /// 组装指定日期的转发载荷，没有点击时返回 `None`
    pub fn payload_for_date(&self, date: &str) -> Option<FinancePayload> {
        let clicks = self.store.clicks_for_date(date);
        if clicks.is_empty() {
            tracing::info!(date, "No clicks found for date");
            return None;
        }

        Some(FinancePayload {
            url: format!("{}/clicks", self.url.trim_end_matches('/')),
            timeout_secs: self.timeout_secs,
            date: date.to_string(),
            clicks,
        })
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }
}

impl Injectable for FinanceService {
    fn key() -> String {
        "FinanceService".to_string()
    }

    fn dependencies() -> Vec<Dependency> {
        vec![
            Dependency::bound("store", CLICK_STORE),
            Dependency::value("url").with_default(DEFAULT_FINANCE_URL.to_string()),
            Dependency::value("timeout_secs").with_default(DEFAULT_FINANCE_TIMEOUT_SECS),
        ]
    }

    fn construct(mut args: Arguments) -> Result<Self, ContainerError> {
        Ok(Self {
            store: args.next()?,
            url: args.next_value()?,
            timeout_secs: args.next_value()?,
        })
    }
}

/// 注册点击追踪相关服务
#[derive(Debug, Default)]
pub struct ClickTrackingProvider {
    webhook_secret: Option<String>,
}

impl ClickTrackingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_webhook_secret(secret: impl Into<String>) -> Self {
        Self {
            webhook_secret: Some(secret.into()),
        }
    }
}

impl ServiceProvider for ClickTrackingProvider {
    fn name(&self) -> &str {
        "click-tracking"
    }

    fn register(&self, container: &mut Container) -> Result<(), ContainerError> {
        container
            .register_abstract(CLICK_STORE)
            .register_type::<InMemoryClickStore>()
            .register_type::<ClickService>()
            .register_type::<WebhookService>()
            .register_type::<FinanceService>();

        container
            .singleton(CLICK_STORE, Some(Concrete::of::<InMemoryClickStore>()))
            .singleton(ClickService::key(), None)
            .singleton(FinanceService::key(), None);

        match &self.webhook_secret {
            Some(secret) => {
                let secret = secret.clone();
                container.singleton(
                    WebhookService::key(),
                    Some(Concrete::instance_factory(move |container, _| {
                        let parameters = Parameters::new().with("secret", secret.clone());
                        container.build(&Concrete::of::<WebhookService>(), &parameters)
                    })),
                );
            }
            None => {
                container.singleton(WebhookService::key(), None);
            }
        }

        Ok(())
    }

    fn boot(&self, container: &Container) -> Result<(), ContainerError> {
        let clicks = container.resolve::<ClickService>()?;
        tracing::info!(stored = clicks.store().len(), "Click tracking services ready");
        Ok(())
    }
}
