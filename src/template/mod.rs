//! SQL template handling: named-placeholder rewriting, placeholder counting and
//! parameter-count validation.

use std::num::NonZeroUsize;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard};

use lru::LruCache;
use tracing::{debug, trace};

mod scanner;
mod validate;

pub use scanner::count_placeholders;
pub use validate::{
    PARAMETER_MARKER, QUOTE_DELIMITER, validate_arrays, validate_batch, validate_params,
    validate_placeholder_count, validate_sql, validate_statements,
};

const PARAMETER_PREFIX: &str = "#{";
const PARAMETER_SUFFIX: &str = "}";
const ESCAPE: u8 = b'\\';

/// A rewritten template: positional SQL plus the parameter names in marker order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSql {
    sql: String,
    parameter_names: Vec<String>,
}

impl ParsedSql {
    /// The normalized SQL with every `#{name}` replaced by `?`.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Names extracted from the template, left to right.
    #[must_use]
    pub fn parameter_names(&self) -> &[String] {
        &self.parameter_names
    }

    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.parameter_names.len()
    }

    /// The flat layout: element 0 is the SQL, elements 1..=n the parameter names.
    #[must_use]
    pub fn as_parts(&self) -> Vec<&str> {
        std::iter::once(self.sql.as_str())
            .chain(self.parameter_names.iter().map(String::as_str))
            .collect()
    }

    #[must_use]
    pub fn into_parts(self) -> (String, Vec<String>) {
        (self.sql, self.parameter_names)
    }
}

/// Rewrite `#{name}` placeholders to `?` without consulting any cache.
///
/// `\#{` is emitted as a literal `#{` (the backslash is dropped). An opening `#{` with
/// no closing `}` leaves the rest of the template untouched.
#[must_use]
pub fn parse_template(raw: &str) -> ParsedSql {
    let bytes = raw.as_bytes();
    let mut sql = String::with_capacity(raw.len());
    let mut names = Vec::new();
    let mut offset = 0;

    while let Some(found) = raw[offset..].find(PARAMETER_PREFIX) {
        let start = offset + found;
        if start > 0 && bytes[start - 1] == ESCAPE {
            sql.push_str(&raw[offset..start - 1]);
            sql.push_str(PARAMETER_PREFIX);
            offset = start + PARAMETER_PREFIX.len();
            continue;
        }

        let name_start = start + PARAMETER_PREFIX.len();
        match raw[name_start..].find(PARAMETER_SUFFIX) {
            Some(len) => {
                sql.push_str(&raw[offset..start]);
                names.push(raw[name_start..name_start + len].to_string());
                sql.push(PARAMETER_MARKER);
                offset = name_start + len + PARAMETER_SUFFIX.len();
            }
            None => break,
        }
    }

    sql.push_str(&raw[offset..]);
    ParsedSql {
        sql,
        parameter_names: names,
    }
}

/// Bounded cache of rewritten templates keyed by their exact raw text.
///
/// The raw text is parsed while the cache lock is held, so a template is parsed at most
/// once per residency even when several threads see it for the first time together.
/// Evicted templates are simply parsed again on their next use.
pub struct TemplateCache {
    entries: Mutex<LruCache<String, Arc<ParsedSql>>>,
}

static GLOBAL_TEMPLATES: LazyLock<TemplateCache> =
    LazyLock::new(|| TemplateCache::new(crate::config::template_cache_capacity()));

impl TemplateCache {
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// The process-wide cache used by [`rewrite_template`].
    #[must_use]
    pub fn global() -> &'static TemplateCache {
        &GLOBAL_TEMPLATES
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, Arc<ParsedSql>>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[must_use]
    pub fn rewrite(&self, raw: &str) -> Arc<ParsedSql> {
        let mut entries = self.lock();
        if let Some(hit) = entries.get(raw) {
            trace!(sql = raw, "template cache hit");
            return Arc::clone(hit);
        }

        let parsed = Arc::new(parse_template(raw));
        if let Some((evicted, _)) = entries.push(raw.to_string(), Arc::clone(&parsed)) {
            debug!(sql = %evicted, "template cache evicted entry");
        }
        debug!(
            sql = raw,
            parameters = parsed.parameter_count(),
            "template cached"
        );
        parsed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> NonZeroUsize {
        self.lock().cap()
    }

    pub fn resize(&self, capacity: NonZeroUsize) {
        self.lock().resize(capacity);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

/// Rewrite a template through the process-wide cache.
///
/// ```rust
/// use sql_marshal::template::rewrite_template;
///
/// let parsed = rewrite_template("select * from t where id = #{id} and name = #{name}");
/// assert_eq!(parsed.sql(), "select * from t where id = ? and name = ?");
/// assert_eq!(parsed.parameter_names(), ["id", "name"]);
/// ```
#[must_use]
pub fn rewrite_template(raw: &str) -> Arc<ParsedSql> {
    TemplateCache::global().rewrite(raw)
}
