// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Compiler configuration via `streamflow.yaml`.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::channel::{
    ArrayChannelFactory, ChannelFactory, DebugChannelFactory, Element, SynchronizedChannelFactory,
};
use crate::core::error::{Result, StreamError};

/// Channel implementation backing every edge the compiler creates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    #[default]
    Array,
    Debug,
    Synchronized,
}

/// Stream compiler configuration from `streamflow.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Check every firing against the declared rates.
    pub audit_rates: bool,

    /// Channel implementation. Auditing upgrades `array` to `debug`.
    pub channel: ChannelKind,

    /// Initial buffer capacity of each channel.
    pub channel_capacity: usize,

    /// Cap on sink passes per `interpret()` call.
    pub max_passes: Option<usize>,

    /// Whether `drain` counts undelivered messages as undrained state.
    pub check_pending_messages: bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            audit_rates: false,
            channel: ChannelKind::Array,
            channel_capacity: 16,
            max_passes: None,
            check_pending_messages: true,
        }
    }
}

impl StreamConfig {
    /// Configuration file name.
    pub const FILE_NAME: &'static str = "streamflow.yaml";

    /// Load configuration from a directory. Returns error if the file is
    /// missing, cannot be parsed or fails validation.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            StreamError::Configuration(format!("Failed to read {}: {}", config_path.display(), e))
        })?;

        let config = Self::from_yaml_str(&content).map_err(|e| {
            StreamError::Configuration(format!("{}: {}", config_path.display(), e))
        })?;

        tracing::info!("Loaded stream config from {}", config_path.display());
        Ok(config)
    }

    /// Load configuration from a directory, returning defaults if the file is
    /// missing or invalid.
    pub fn load_or_default(dir: &Path) -> Self {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            tracing::debug!(
                "No {} found in {}, using defaults",
                Self::FILE_NAME,
                dir.display()
            );
            return Self::default();
        }

        match Self::load(dir) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Parse and validate YAML.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| StreamError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| StreamError::Configuration(format!("Failed to serialize config: {}", e)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.audit_rates && self.channel == ChannelKind::Synchronized {
            return Err(StreamError::Configuration(
                "audit_rates cannot be combined with synchronized channels".into(),
            ));
        }
        if self.max_passes == Some(0) {
            return Err(StreamError::Configuration(
                "max_passes must be at least 1".into(),
            ));
        }
        if self.channel_capacity == 0 {
            return Err(StreamError::Configuration(
                "channel_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Channel kind actually used, after the auditing upgrade.
    pub fn effective_channel(&self) -> ChannelKind {
        match self.channel {
            ChannelKind::Array if self.audit_rates => ChannelKind::Debug,
            kind => kind,
        }
    }

    pub fn channel_factory<T: Element>(&self) -> Arc<dyn ChannelFactory<T>> {
        let capacity = self.channel_capacity;
        match self.effective_channel() {
            ChannelKind::Array => Arc::new(ArrayChannelFactory { capacity }),
            ChannelKind::Debug => Arc::new(DebugChannelFactory { capacity }),
            ChannelKind::Synchronized => Arc::new(SynchronizedChannelFactory { capacity }),
        }
    }
}
