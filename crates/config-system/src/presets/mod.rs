//! Built-in view configurations, used when the page supplies none

pub mod jvm_presets;

pub use jvm_presets::*;

use crate::ViewRegistry;

/// The default registry offered on a stock dashboard
pub fn default_views() -> ViewRegistry {
    ViewRegistry::new(jvm_presets::create_jvm_views())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_views_are_aligned() {
        let views = default_views();
        assert!(!views.is_empty());
        for view in views.iter() {
            assert_eq!(view.charts.len(), view.titles.len(), "view {}", view.key);
        }
        // at least one view is selected on first visit
        assert!(views.iter().any(|v| v.visible));
    }
}
