use crate::core::properties::electronegativity::{ElectronegativitySource, PaulingTestOptions};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// What the stoichiometry enumerator does when a site or class ends up with no candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyPoolPolicy {
    /// Return an empty result.
    #[default]
    Silent,
    /// Fail with [`EngineError::EmptyPool`](super::error::EngineError::EmptyPool).
    Fatal,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnumerationConfig {
    pub empty_pool: EmptyPoolPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionConfig {
    /// Above this many sites, prefixes are pruned against the materialised group.
    pub incremental_threshold: usize,
    /// Largest group order that is materialised for prefix pruning.
    pub group_order_limit: usize,
}

impl Default for SubstitutionConfig {
    fn default() -> Self {
        Self {
            incremental_threshold: 6,
            group_order_limit: 50_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreeningConfig {
    pub enumeration: EnumerationConfig,
    /// Drop compositions failing the Pauling electronegativity test.
    pub pauling: Option<PaulingTestOptions>,
    /// Attach a compound electronegativity estimate to every result.
    pub electronegativity: Option<ElectronegativitySource>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountConfig {
    pub max_ions: usize,
    pub threshold: u32,
    pub pauling: Option<PaulingTestOptions>,
    pub primitive_only: bool,
}

#[derive(Default)]
pub struct EnumerationConfigBuilder {
    empty_pool: Option<EmptyPoolPolicy>,
}

impl EnumerationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn empty_pool(mut self, policy: EmptyPoolPolicy) -> Self {
        self.empty_pool = Some(policy);
        self
    }

    pub fn build(self) -> Result<EnumerationConfig, ConfigError> {
        Ok(EnumerationConfig {
            empty_pool: self.empty_pool.unwrap_or_default(),
        })
    }
}

#[derive(Default)]
pub struct SubstitutionConfigBuilder {
    incremental_threshold: Option<usize>,
    group_order_limit: Option<usize>,
}

impl SubstitutionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn incremental_threshold(mut self, sites: usize) -> Self {
        self.incremental_threshold = Some(sites);
        self
    }
    pub fn group_order_limit(mut self, order: usize) -> Self {
        self.group_order_limit = Some(order);
        self
    }

    pub fn build(self) -> Result<SubstitutionConfig, ConfigError> {
        let defaults = SubstitutionConfig::default();
        let group_order_limit = self
            .group_order_limit
            .unwrap_or(defaults.group_order_limit);
        if group_order_limit == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "group_order_limit",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(SubstitutionConfig {
            incremental_threshold: self
                .incremental_threshold
                .unwrap_or(defaults.incremental_threshold),
            group_order_limit,
        })
    }
}

#[derive(Default)]
pub struct ScreeningConfigBuilder {
    enumeration: Option<EnumerationConfig>,
    pauling: Option<PaulingTestOptions>,
    electronegativity: Option<ElectronegativitySource>,
}

impl ScreeningConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enumeration(mut self, config: EnumerationConfig) -> Self {
        self.enumeration = Some(config);
        self
    }
    pub fn pauling_test(mut self, options: PaulingTestOptions) -> Self {
        self.pauling = Some(options);
        self
    }
    pub fn electronegativity(mut self, source: ElectronegativitySource) -> Self {
        self.electronegativity = Some(source);
        self
    }

    pub fn build(self) -> Result<ScreeningConfig, ConfigError> {
        Ok(ScreeningConfig {
            enumeration: self.enumeration.unwrap_or_default(),
            pauling: self.pauling,
            electronegativity: self.electronegativity,
        })
    }
}

#[derive(Default)]
pub struct CountConfigBuilder {
    max_ions: Option<usize>,
    threshold: Option<u32>,
    pauling: Option<PaulingTestOptions>,
    primitive_only: Option<bool>,
}

impl CountConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_ions(mut self, n: usize) -> Self {
        self.max_ions = Some(n);
        self
    }
    pub fn threshold(mut self, threshold: u32) -> Self {
        self.threshold = Some(threshold);
        self
    }
    pub fn pauling_test(mut self, options: PaulingTestOptions) -> Self {
        self.pauling = Some(options);
        self
    }
    pub fn primitive_only(mut self, primitive_only: bool) -> Self {
        self.primitive_only = Some(primitive_only);
        self
    }

    pub fn build(self) -> Result<CountConfig, ConfigError> {
        let max_ions = self
            .max_ions
            .ok_or(ConfigError::MissingParameter("max_ions"))?;
        if max_ions < 2 {
            return Err(ConfigError::InvalidParameter {
                name: "max_ions",
                reason: format!("a compound needs at least 2 ions, got {max_ions}"),
            });
        }
        let threshold = self
            .threshold
            .ok_or(ConfigError::MissingParameter("threshold"))?;
        if threshold == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "threshold",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(CountConfig {
            max_ions,
            threshold,
            pauling: self.pauling,
            primitive_only: self.primitive_only.unwrap_or(false),
        })
    }
}
