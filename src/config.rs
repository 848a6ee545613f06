use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SqlMarshalError;
use crate::template::TemplateCache;

/// Environment variable toggling placeholder validation (`true`/`false`/`1`/`0`).
pub const ENV_VALIDATE_SQL: &str = "SQL_MARSHAL_VALIDATE_SQL";
/// Environment variable sizing the process-wide template cache.
pub const ENV_TEMPLATE_CACHE_CAPACITY: &str = "SQL_MARSHAL_TEMPLATE_CACHE_CAPACITY";

pub const DEFAULT_TEMPLATE_CACHE_CAPACITY: usize = 4096;

static VALIDATE_SQL: AtomicBool = AtomicBool::new(true);
static TEMPLATE_CACHE_CAPACITY: AtomicUsize = AtomicUsize::new(DEFAULT_TEMPLATE_CACHE_CAPACITY);

/// Turn placeholder validation on or off for the whole process.
pub fn set_validate_sql(enabled: bool) {
    VALIDATE_SQL.store(enabled, Ordering::Release);
}

/// Whether the gated validators in [`crate::template`] scan SQL at all.
#[must_use]
pub fn validate_sql_enabled() -> bool {
    VALIDATE_SQL.load(Ordering::Acquire)
}

pub(crate) fn template_cache_capacity() -> NonZeroUsize {
    NonZeroUsize::new(TEMPLATE_CACHE_CAPACITY.load(Ordering::Acquire))
        .unwrap_or(NonZeroUsize::MIN)
}

/// Process-wide marshaling options.
///
/// Embeds in a host application's configuration file:
/// ```rust
/// use sql_marshal::config::MarshalOptions;
///
/// let opts: MarshalOptions = serde_json::from_str(r#"{ "validate_sql": false }"#).unwrap();
/// assert!(!opts.validate_sql);
/// assert_eq!(opts.template_cache_capacity, 4096);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarshalOptions {
    pub validate_sql: bool,
    pub template_cache_capacity: usize,
}

impl Default for MarshalOptions {
    fn default() -> Self {
        Self {
            validate_sql: true,
            template_cache_capacity: DEFAULT_TEMPLATE_CACHE_CAPACITY,
        }
    }
}

impl MarshalOptions {
    #[must_use]
    pub fn builder() -> MarshalOptionsBuilder {
        MarshalOptionsBuilder::new()
    }

    #[must_use]
    pub fn with_validate_sql(mut self, validate_sql: bool) -> Self {
        self.validate_sql = validate_sql;
        self
    }

    #[must_use]
    pub fn with_template_cache_capacity(mut self, capacity: usize) -> Self {
        self.template_cache_capacity = capacity;
        self
    }

    /// Read options from the process environment, defaulting unset keys.
    ///
    /// # Errors
    /// Returns `SqlMarshalError::Config` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, SqlMarshalError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`MarshalOptions::from_env`] over an arbitrary key lookup.
    ///
    /// # Errors
    /// Returns `SqlMarshalError::Config` if a value is present but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SqlMarshalError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();
        if let Some(raw) = lookup(ENV_VALIDATE_SQL) {
            opts.validate_sql = parse_flag(&raw).ok_or_else(|| {
                SqlMarshalError::Config(format!("{ENV_VALIDATE_SQL} must be a boolean, got {raw:?}"))
            })?;
        }
        if let Some(raw) = lookup(ENV_TEMPLATE_CACHE_CAPACITY) {
            opts.template_cache_capacity = raw.trim().parse().map_err(|e| {
                SqlMarshalError::Config(format!("{ENV_TEMPLATE_CACHE_CAPACITY}={raw:?}: {e}"))
            })?;
        }
        Ok(opts)
    }

    /// Apply these options to the process-wide switch and template cache.
    ///
    /// # Errors
    /// Returns `SqlMarshalError::Config` if the template cache capacity is zero.
    pub fn install(&self) -> Result<(), SqlMarshalError> {
        let capacity = NonZeroUsize::new(self.template_cache_capacity).ok_or_else(|| {
            SqlMarshalError::Config("template cache capacity must be at least 1".to_string())
        })?;
        set_validate_sql(self.validate_sql);
        TEMPLATE_CACHE_CAPACITY.store(capacity.get(), Ordering::Release);
        TemplateCache::global().resize(capacity);
        debug!(
            validate_sql = self.validate_sql,
            template_cache_capacity = capacity.get(),
            "installed marshal options"
        );
        Ok(())
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Fluent builder for [`MarshalOptions`].
#[derive(Debug, Clone, Default)]
pub struct MarshalOptionsBuilder {
    opts: MarshalOptions,
}

impl MarshalOptionsBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn validate_sql(mut self, validate_sql: bool) -> Self {
        self.opts.validate_sql = validate_sql;
        self
    }

    #[must_use]
    pub fn template_cache_capacity(mut self, capacity: usize) -> Self {
        self.opts.template_cache_capacity = capacity;
        self
    }

    #[must_use]
    pub fn finish(self) -> MarshalOptions {
        self.opts
    }

    /// Build and install the options process-wide.
    ///
    /// # Errors
    /// See [`MarshalOptions::install`].
    pub fn install(self) -> Result<MarshalOptions, SqlMarshalError> {
        let opts = self.finish();
        opts.install()?;
        Ok(opts)
    }
}
