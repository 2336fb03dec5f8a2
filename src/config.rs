use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::advice::{HandlerAdvice, RetryAdvice, TimeoutAdvice, TimingAdvice};
use crate::error::{IntegrationError, Result};
use crate::router::{HeaderSelector, MatchRule, Recipient, RecipientListRouter};

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct IntegrationConfig {
    pub router: RouterDefinition,
    pub advices: Vec<AdviceDefinition>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RouterDefinition {
    pub recipients: Vec<RecipientDefinition>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RecipientDefinition {
    pub channels: Vec<String>,
    pub selector: Option<SelectorConfig>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SelectorConfig {
    pub header: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdviceDefinition {
    pub name: String,
    pub enabled: bool,
    pub timeout_ms: u64,
    pub max_retries: u32,
}

impl Default for AdviceDefinition {
    fn default() -> Self {
        Self {
            name: String::new(),
            enabled: true,
            timeout_ms: 3_000,
            max_retries: 0,
        }
    }
}

impl SelectorConfig {
    fn rule(&self) -> MatchRule {
        if self.values.is_empty() {
            MatchRule::Any
        } else {
            MatchRule::of(self.values.clone())
        }
    }
}

impl RecipientDefinition {
    fn build(&self) -> Result<Recipient> {
        match &self.selector {
            Some(selector) => Recipient::new(
                Arc::new(HeaderSelector::new(selector.header.clone(), selector.rule())),
                self.channels.clone(),
            ),
            None => Recipient::broadcast(self.channels.clone()),
        }
    }
}

impl RouterDefinition {
    /// 构建路由器，空配置在此处致命失败（启动期校验）
    pub fn build(&self) -> Result<RecipientListRouter> {
        let recipients = self
            .recipients
            .iter()
            .map(RecipientDefinition::build)
            .collect::<Result<Vec<_>>>()?;
        RecipientListRouter::with_recipients(recipients)
    }
}

impl IntegrationConfig {
    pub fn merge(&mut self, other: IntegrationConfig) {
        self.router.recipients.extend(other.router.recipients);
        self.advices.extend(other.advices);
    }

    pub fn build_router(&self) -> Result<RecipientListRouter> {
        self.router.build()
    }

    /// 按声明顺序构建增强链，禁用项跳过
    pub fn build_advice_chain(&self) -> Result<Vec<Arc<dyn HandlerAdvice>>> {
        let mut chain: Vec<Arc<dyn HandlerAdvice>> = Vec::new();
        for def in &self.advices {
            if !def.enabled {
                tracing::info!(advice = %def.name, "advice disabled, skip");
                continue;
            }
            let advice: Arc<dyn HandlerAdvice> = match def.name.as_str() {
                "retry" => Arc::new(RetryAdvice::new(def.max_retries + 1)),
                "timeout" => Arc::new(TimeoutAdvice::new(Duration::from_millis(def.timeout_ms))),
                "timing" => Arc::new(TimingAdvice::new()),
                other => {
                    return Err(IntegrationError::configuration(format!(
                        "unknown advice '{other}'"
                    )));
                }
            };
            chain.push(advice);
        }
        Ok(chain)
    }
}

pub struct IntegrationConfigLoader {
    candidate_paths: Vec<PathBuf>,
}

impl Default for IntegrationConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl IntegrationConfigLoader {
    pub fn new() -> Self {
        Self {
            candidate_paths: vec![
                PathBuf::from("config/integration.toml"),
                PathBuf::from("config/integration.d"),
            ],
        }
    }

    pub fn add_candidate<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.candidate_paths.push(path.into());
        self
    }

    pub fn load(&self) -> Result<IntegrationConfig> {
        for path in &self.candidate_paths {
            if path.is_dir() {
                if let Ok(cfg) = self.load_from_directory(path) {
                    return Ok(cfg);
                }
            } else if path.is_file() {
                if let Ok(cfg) = self.load_from_file(path) {
                    return Ok(cfg);
                }
            }
        }
        Ok(IntegrationConfig::default())
    }

    fn load_from_file(&self, path: &Path) -> Result<IntegrationConfig> {
        let content = fs::read_to_string(path).map_err(|err| {
            IntegrationError::configuration(format!(
                "failed to read integration config: path={}, err={err}",
                path.display()
            ))
        })?;
        toml::from_str(&content).map_err(|err| {
            IntegrationError::configuration(format!(
                "invalid integration config format: path={}, err={err}",
                path.display()
            ))
        })
    }

    fn load_from_directory(&self, dir: &Path) -> Result<IntegrationConfig> {
        let mut merged = IntegrationConfig::default();
        if !dir.exists() {
            return Ok(merged);
        }

        let mut entries = fs::read_dir(dir)
            .map_err(|err| {
                IntegrationError::configuration(format!(
                    "failed to read integration config dir: path={}, err={err}",
                    dir.display()
                ))
            })?
            .filter_map(|entry| entry.ok())
            .collect::<Vec<_>>();
        entries.sort_by_key(|entry| entry.path());

        for entry in entries {
            if entry
                .path()
                .extension()
                .map(|ext| ext == "toml")
                .unwrap_or(false)
            {
                let cfg = self.load_from_file(&entry.path())?;
                merged.merge(cfg);
            }
        }

        Ok(merged)
    }
}
