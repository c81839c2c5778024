//! Module visibility filter
//!
//! The picker shows either normal modules or auto-key modules, never both.
//! Both passes reset every row to visible first, so they are idempotent and
//! complementary over the same row set.

/// Marker substring identifying the auto-key module category
const AUTO_KEY_MARKER: &str = "auto-key";

/// One selectable module in the picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRow {
    /// Opaque module identifier
    pub module_id: String,
    /// Display/lookup key, also the popup configuration key
    pub module_url: String,
    /// Category metadata rendered with the row
    pub category: String,
    visible: bool,
}

impl ModuleRow {
    /// Create a visible row
    pub fn new(module_id: &str, module_url: &str, category: &str) -> Self {
        Self {
            module_id: module_id.to_string(),
            module_url: module_url.to_string(),
            category: category.to_string(),
            visible: true,
        }
    }

    /// Whether this module generates automatic keys
    pub fn is_auto_key(&self) -> bool {
        self.category.contains(AUTO_KEY_MARKER)
    }

    /// Whether the row passes the current filter
    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// The server-rendered table of selectable modules
#[derive(Debug, Default)]
pub struct ModuleTable {
    rows: Vec<ModuleRow>,
}

impl ModuleTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row
    pub fn push(&mut self, row: ModuleRow) {
        self.rows.push(row);
    }

    /// All rows
    pub fn rows(&self) -> &[ModuleRow] {
        &self.rows
    }

    /// Row by index
    pub fn row(&self, index: usize) -> Option<&ModuleRow> {
        self.rows.get(index)
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Show normal modules only
    pub fn hide_auto_keys(&mut self) {
        for row in &mut self.rows {
            row.visible = !row.is_auto_key();
        }
    }

    /// Show auto-key modules only
    pub fn show_auto_keys(&mut self) {
        for row in &mut self.rows {
            row.visible = row.is_auto_key();
        }
    }

    /// Rows passing the current filter
    pub fn visible_rows(&self) -> impl Iterator<Item = &ModuleRow> {
        self.rows.iter().filter(|r| r.is_visible())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ModuleTable {
        let mut t = ModuleTable::new();
        t.push(ModuleRow::new("1", "mod/popup", "popup dialog"));
        t.push(ModuleRow::new("2", "mod/auto-key", "auto-key generator"));
        t.push(ModuleRow::new("3", "mod/select", "option list"));
        t
    }

    #[test]
    fn test_filters_are_complements() {
        let mut t = table();
        t.hide_auto_keys();
        let normal: Vec<String> = t.visible_rows().map(|r| r.module_id.clone()).collect();
        t.show_auto_keys();
        let auto: Vec<String> = t.visible_rows().map(|r| r.module_id.clone()).collect();

        assert_eq!(normal, vec!["1", "3"]);
        assert_eq!(auto, vec!["2"]);
        // Every row is visible in exactly one of the two views
        assert_eq!(normal.len() + auto.len(), t.len());
    }

    #[test]
    fn test_filter_idempotence() {
        let mut t = table();
        t.show_auto_keys();
        t.hide_auto_keys();
        t.hide_auto_keys();
        let visible: Vec<&str> = t.visible_rows().map(|r| r.module_id.as_str()).collect();
        assert_eq!(visible, vec!["1", "3"]);
    }

    #[test]
    fn test_auto_key_category_detection() {
        assert!(ModuleRow::new("1", "u", "auto-key generator").is_auto_key());
        assert!(!ModuleRow::new("2", "u", "popup dialog").is_auto_key());
    }
}
