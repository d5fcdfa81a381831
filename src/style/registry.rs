use std::collections::HashMap;
use std::sync::Arc;

use crate::foundation::error::{CapError, CapResult};
use crate::style::builtin::{ALIASES, DEFAULT_STYLE_ID, builtin_styles};
use crate::style::model::{CaptionStyle, Category};

/// Immutable, cheaply cloneable catalog of caption styles.
///
/// Lookups never fail: unknown ids resolve to the default style so a job with a typo
/// still renders.
#[derive(Clone, Debug)]
pub struct StyleRegistry {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    styles: Vec<Arc<CaptionStyle>>,
    by_id: HashMap<String, usize>,
    aliases: HashMap<String, String>,
    default_idx: usize,
}

impl StyleRegistry {
    /// Registry holding the built-in catalog.
    pub fn builtin() -> Self {
        let aliases = ALIASES
            .iter()
            .map(|(alias, id)| ((*alias).to_string(), (*id).to_string()))
            .collect();
        let styles = builtin_styles();
        debug_assert!(styles.iter().all(|s| s.validate().is_ok()));
        Self::assemble(styles, aliases, DEFAULT_STYLE_ID)
    }

    fn assemble(
        styles: Vec<CaptionStyle>,
        aliases: HashMap<String, String>,
        default_id: &str,
    ) -> Self {
        let by_id: HashMap<String, usize> = styles
            .iter()
            .enumerate()
            .map(|(idx, s)| (s.id.clone(), idx))
            .collect();
        let default_idx = by_id.get(default_id).copied().unwrap_or(0);
        Self {
            inner: Arc::new(Inner {
                styles: styles.into_iter().map(Arc::new).collect(),
                by_id,
                aliases,
                default_idx,
            }),
        }
    }

    /// Build a registry from explicit styles. Every style is validated, ids must be unique,
    /// and every alias must point at a known id.
    pub fn from_styles(
        styles: Vec<CaptionStyle>,
        aliases: HashMap<String, String>,
        default_id: &str,
    ) -> CapResult<Self> {
        let mut by_id = HashMap::with_capacity(styles.len());
        for (idx, style) in styles.iter().enumerate() {
            style.validate().map_err(CapError::validation)?;
            if by_id.insert(style.id.clone(), idx).is_some() {
                return Err(CapError::validation(format!(
                    "duplicate style id '{}'",
                    style.id
                )));
            }
        }
        for (alias, target) in &aliases {
            if !by_id.contains_key(target) {
                return Err(CapError::validation(format!(
                    "alias '{alias}' points at unknown style '{target}'"
                )));
            }
        }
        if !by_id.contains_key(default_id) {
            return Err(CapError::validation(format!(
                "default style '{default_id}' is not registered"
            )));
        }
        Ok(Self::assemble(styles, aliases, default_id))
    }

    /// Lowercase, map whitespace and underscores to `-`.
    pub fn normalize_id(raw: &str) -> String {
        raw.trim()
            .chars()
            .map(|c| {
                if c.is_whitespace() || c == '_' {
                    '-'
                } else {
                    c.to_ascii_lowercase()
                }
            })
            .collect()
    }

    /// Resolve `raw` through aliases and ids, returning `None` when nothing matches.
    pub fn resolve(&self, raw: &str) -> Option<Arc<CaptionStyle>> {
        let key = Self::normalize_id(raw);
        let id = self.inner.aliases.get(&key).unwrap_or(&key);
        self.inner
            .by_id
            .get(id)
            .map(|&idx| Arc::clone(&self.inner.styles[idx]))
    }

    /// Resolve `raw`, falling back to the default style.
    pub fn get(&self, raw: &str) -> Arc<CaptionStyle> {
        match self.resolve(raw) {
            Some(s) => s,
            None => {
                tracing::warn!(style = raw, "unknown caption style, using default");
                self.default_style()
            }
        }
    }

    pub fn default_style(&self) -> Arc<CaptionStyle> {
        Arc::clone(&self.inner.styles[self.inner.default_idx])
    }

    /// All styles in registration order.
    pub fn list(&self) -> Vec<Arc<CaptionStyle>> {
        self.inner.styles.clone()
    }

    pub fn list_by_category(&self, category: Category) -> Vec<Arc<CaptionStyle>> {
        self.inner
            .styles
            .iter()
            .filter(|s| s.category == category)
            .cloned()
            .collect()
    }

    /// Aliases that resolve to `id`, sorted.
    pub fn aliases_of(&self, id: &str) -> Vec<&str> {
        let mut out: Vec<&str> = self
            .inner
            .aliases
            .iter()
            .filter(|(_, target)| target.as_str() == id)
            .map(|(alias, _)| alias.as_str())
            .collect();
        out.sort_unstable();
        out
    }

    pub fn len(&self) -> usize {
        self.inner.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.styles.is_empty()
    }
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/registry.rs"]
mod tests;
