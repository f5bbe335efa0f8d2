//! Default page style and its once-per-process registration

use rustc_hash::FxHashSet;
use std::sync::{Arc, Mutex, OnceLock};

/// Class of generated page containers when none is configured
pub const DEFAULT_PAGE_CLASS: &str = "print-folio";

/// Registry key of [`DEFAULT_STYLE_RULE`]
pub const DEFAULT_STYLE_ID: &str = "report-table-print-folio";

/// Folio label plus margin padding. The margin comes from the
/// `--print-folio-margin` property set inline on each container.
pub const DEFAULT_STYLE_RULE: &str = "\
.print-folio {
  position: relative;
  box-sizing: border-box;
  padding: var(--print-folio-margin, 0px);
  overflow: hidden;
  page-break-after: always;
  break-after: page;
}
.print-folio::after {
  content: attr(data-folio);
  position: absolute;
  right: var(--print-folio-margin, 0px);
  bottom: calc(var(--print-folio-margin, 0px) / 2);
}
@media print {
  body { margin: 0; }
}
";

/// Style ids already inserted into the document
#[derive(Debug, Default)]
pub struct StyleRegistry {
    registered: Mutex<FxHashSet<String>>,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry shared by every report table in the process
    pub fn global() -> Arc<StyleRegistry> {
        static GLOBAL: OnceLock<Arc<StyleRegistry>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(StyleRegistry::new())).clone()
    }

    /// Mark `style_id` as inserted. Returns `false` if it already was.
    pub fn register(&self, style_id: &str) -> bool {
        let mut registered = self.registered.lock().unwrap_or_else(|e| e.into_inner());
        registered.insert(style_id.to_string())
    }

    pub fn is_registered(&self, style_id: &str) -> bool {
        let registered = self.registered.lock().unwrap_or_else(|e| e.into_inner());
        registered.contains(style_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_once() {
        let registry = StyleRegistry::new();
        assert!(!registry.is_registered("a"));
        assert!(registry.register("a"));
        assert!(!registry.register("a"));
        assert!(registry.register("b"));
        assert!(registry.is_registered("a"));
    }

    #[test]
    fn test_global_is_shared() {
        let a = StyleRegistry::global();
        let b = StyleRegistry::global();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_rule_targets_default_class() {
        assert!(DEFAULT_STYLE_RULE.contains(&format!(".{}::after", DEFAULT_PAGE_CLASS)));
        assert!(DEFAULT_STYLE_RULE.contains("attr(data-folio)"));
    }
}
