//! Canned response knowledge base
//!
//! Responses are loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/tally/config/responses.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Selection is uniform over a pool, through an injected
//! [`RandomSource`] so tests can force a pick.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::config::default_data_dir;
use crate::error::{Error, Result};
use crate::random::RandomSource;

use super::intent::Intent;

/// Embedded default knowledge base (compiled into binary)
const DEFAULT_RESPONSES: &str = include_str!("../../../../config/responses.toml");

/// Pool names as they appear in the TOML file
fn pool_key(intent: Intent) -> Option<&'static str> {
    match intent {
        Intent::Greeting => Some("greeting"),
        Intent::Farewell => Some("farewell"),
        Intent::Thanks => Some("thanks"),
        Intent::SavingMoney => Some("saving_money"),
        Intent::BudgetTips => Some("budget_tips"),
        Intent::IncomeSuggestions => Some("income_suggestions"),
        Intent::InvestmentBasics => Some("investment_basics"),
        Intent::Unknown => Some("unknown"),
        Intent::ExpenseAnalysis => None,
    }
}

const FOLLOW_UP_KEY: &str = "follow_up";

/// Raw knowledge base structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawKnowledge {
    welcome: Option<String>,
    #[serde(default)]
    pools: HashMap<String, Vec<String>>,
}

/// Canned responses keyed by intent
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    welcome: String,
    pools: HashMap<Intent, Vec<String>>,
    follow_ups: Vec<String>,
    /// Path to override file (if any)
    source_path: Option<PathBuf>,
}

impl KnowledgeBase {
    /// Load from the default override location, else embedded defaults
    pub fn load() -> Result<Self> {
        load_knowledge(default_responses_path().as_deref())
    }

    /// Load from an explicit override file (missing file = defaults)
    pub fn load_from(path: &Path) -> Result<Self> {
        load_knowledge(Some(path))
    }

    /// The embedded defaults only
    pub fn embedded() -> Result<Self> {
        Self::from_toml(DEFAULT_RESPONSES)
    }

    /// Parse and validate a knowledge base
    ///
    /// Every canned intent and the follow-up list must have a non-empty pool.
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut raw: RawKnowledge = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid responses TOML: {}", e)))?;

        let welcome = raw
            .welcome
            .filter(|w| !w.trim().is_empty())
            .ok_or_else(|| Error::Config("responses: missing welcome message".to_string()))?;

        let mut pools = HashMap::new();
        for intent in Intent::all() {
            let Some(key) = pool_key(*intent) else {
                continue;
            };
            let pool = take_pool(&mut raw.pools, key)?;
            pools.insert(*intent, pool);
        }
        let follow_ups = take_pool(&mut raw.pools, FOLLOW_UP_KEY)?;

        for leftover in raw.pools.keys() {
            debug!("Ignoring unknown response pool '{}'", leftover);
        }

        Ok(Self {
            welcome,
            pools,
            follow_ups,
            source_path: None,
        })
    }

    /// Pick a canned response for an intent
    ///
    /// Returns `None` for intents that are generated rather than canned.
    pub fn respond(&self, intent: Intent, rng: &mut dyn RandomSource) -> Option<&str> {
        self.pools.get(&intent).map(|pool| pick(pool, rng))
    }

    /// Pick a follow-up question
    pub fn follow_up(&self, rng: &mut dyn RandomSource) -> &str {
        pick(&self.follow_ups, rng)
    }

    /// First-visit greeting
    pub fn welcome(&self) -> &str {
        &self.welcome
    }

    pub fn pool(&self, intent: Intent) -> Option<&[String]> {
        self.pools.get(&intent).map(Vec::as_slice)
    }

    pub fn follow_ups(&self) -> &[String] {
        &self.follow_ups
    }

    /// Whether this came from an override file
    pub fn is_override(&self) -> bool {
        self.source_path.is_some()
    }
}

fn take_pool(pools: &mut HashMap<String, Vec<String>>, key: &str) -> Result<Vec<String>> {
    let pool: Vec<String> = pools
        .remove(key)
        .unwrap_or_default()
        .into_iter()
        .filter(|r| !r.trim().is_empty())
        .collect();
    if pool.is_empty() {
        return Err(Error::Config(format!(
            "responses: pool '{}' is missing or empty",
            key
        )));
    }
    Ok(pool)
}

fn pick<'a>(pool: &'a [String], rng: &mut dyn RandomSource) -> &'a str {
    let index = rng.pick(pool.len()).min(pool.len() - 1);
    &pool[index]
}

/// Default knowledge base override path
pub fn default_responses_path() -> Option<PathBuf> {
    default_data_dir().map(|d| d.join("config").join("responses.toml"))
}

fn load_knowledge(override_path: Option<&Path>) -> Result<KnowledgeBase> {
    match override_path {
        Some(path) if path.exists() => {
            debug!("Loading responses override from {}", path.display());
            let content = fs::read_to_string(path)
                .map_err(|e| Error::Config(format!("Failed to read responses: {}", e)))?;
            let mut kb = KnowledgeBase::from_toml(&content)?;
            kb.source_path = Some(path.to_path_buf());
            Ok(kb)
        }
        _ => KnowledgeBase::embedded(),
    }
}
