//! Locator catalog.
//!
//! Groups named locators by page so test code refers to `"login_button"`
//! rather than repeating selectors. Names double as cache keys, so they must
//! be unique across the whole catalog.
//!
//! ```yaml
//! login:
//!   - platform: WEB
//!     name: username
//!     selector: { kind: CSS, value: "input[name='username']" }
//!   - platform: IOS
//!     name: login_button
//!     selector: { kind: ACCESSIBILITY, value: login }
//! ```

use crate::locator::Locator;
use crate::result::{SondearError, SondearResult};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Named locators grouped by page
#[derive(Debug, Clone, Default)]
pub struct LocatorCatalog {
    locators: HashMap<String, Locator>,
    pages: BTreeMap<String, Vec<String>>,
}

impl LocatorCatalog {
    /// Create an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `locator` under `page`, rejecting invalid locators and duplicate
    /// names
    pub fn insert(&mut self, page: &str, locator: Locator) -> SondearResult<()> {
        locator.validate()?;
        if self.locators.contains_key(locator.name()) {
            return Err(SondearError::catalog(format!(
                "duplicate locator name '{}' on page '{page}'",
                locator.name()
            )));
        }
        self.pages
            .entry(page.to_string())
            .or_default()
            .push(locator.name().to_string());
        self.locators.insert(locator.name().to_string(), locator);
        Ok(())
    }

    /// Add `locator` under `page` (builder form)
    pub fn with_locator(mut self, page: &str, locator: Locator) -> SondearResult<Self> {
        self.insert(page, locator)?;
        Ok(self)
    }

    /// Parse a page → locator list YAML document
    pub fn from_yaml_str(yaml: &str) -> SondearResult<Self> {
        let pages: BTreeMap<String, Vec<Locator>> = serde_yaml_ng::from_str(yaml)?;
        let mut catalog = Self::new();
        for (page, locators) in pages {
            for locator in locators {
                catalog.insert(&page, locator)?;
            }
        }
        tracing::debug!(
            pages = catalog.pages.len(),
            locators = catalog.len(),
            "loaded locator catalog"
        );
        Ok(catalog)
    }

    /// Load a YAML catalog file
    pub fn from_path(path: impl AsRef<Path>) -> SondearResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Look up a locator by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Locator> {
        self.locators.get(name)
    }

    /// Look up a locator by name, failing when absent
    pub fn require(&self, name: &str) -> SondearResult<&Locator> {
        self.get(name)
            .ok_or_else(|| SondearError::catalog(format!("unknown locator '{name}'")))
    }

    /// Locators declared on `page`, in declaration order
    #[must_use]
    pub fn page(&self, page: &str) -> Vec<&Locator> {
        self.pages
            .get(page)
            .map(|names| names.iter().filter_map(|n| self.locators.get(n)).collect())
            .unwrap_or_default()
    }

    /// Page names
    #[must_use]
    pub fn pages(&self) -> Vec<&str> {
        self.pages.keys().map(String::as_str).collect()
    }

    /// Number of locators
    #[must_use]
    pub fn len(&self) -> usize {
        self.locators.len()
    }

    /// Check if empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::{Platform, SelectorKind};

    const CATALOG: &str = r#"
login:
  - platform: WEB
    name: username
    selector: { kind: CSS, value: "input[name='username']" }
  - platform: WEB
    name: submit
    selector: { kind: XPATH, value: "//button[@type='submit']" }
settings:
  - platform: IOS
    name: dark_mode
    selector: { kind: ACCESSIBILITY, value: dark-mode-toggle }
"#;

    #[test]
    fn test_load_yaml() {
        let catalog = LocatorCatalog::from_yaml_str(CATALOG).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.pages(), vec!["login", "settings"]);

        let submit = catalog.require("submit").unwrap();
        assert_eq!(submit.platform(), Platform::Web);
        assert_eq!(submit.kind(), SelectorKind::XPath);

        let names: Vec<_> = catalog.page("login").iter().map(|l| l.name()).collect();
        assert_eq!(names, vec!["username", "submit"]);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let yaml = r#"
a:
  - { platform: WEB, name: ok, selector: { kind: ID, value: ok } }
b:
  - { platform: ANDROID, name: ok, selector: { kind: ID, value: ok } }
"#;
        let err = LocatorCatalog::from_yaml_str(yaml).unwrap_err();
        assert!(err.to_string().contains("duplicate locator name 'ok'"));
    }

    #[test]
    fn test_invalid_locator_rejected() {
        let err = LocatorCatalog::new()
            .with_locator("p", Locator::android("chain", SelectorKind::Chain, "**/Cell"))
            .unwrap_err();
        assert!(matches!(err, SondearError::Catalog { .. }));
    }

    #[test]
    fn test_require_unknown() {
        let catalog = LocatorCatalog::new();
        assert!(catalog.get("nope").is_none());
        assert!(catalog.require("nope").is_err());
        assert!(catalog.page("nope").is_empty());
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locators.yaml");
        std::fs::write(&path, CATALOG).unwrap();
        assert_eq!(LocatorCatalog::from_path(&path).unwrap().len(), 3);
    }
}
