//! Locator abstraction for element selection.
//!
//! A [`Locator`] names an element once (the logical `name` is the cache key
//! for the whole run) and says where to look for it: which platform's session
//! and which selector. Locators are immutable after construction.
//!
//! # Design Philosophy
//!
//! - **Logical names**: resolution results are cached per name, never per selector
//! - **Platform-aware selectors**: iOS class chains and predicates only make
//!   sense against an iOS session, and [`Locator::validate`] says so
//! - **Wire-ready**: every selector lowers to a W3C `{using, value}` pair

use serde::{Deserialize, Serialize};

use crate::result::{SondearError, SondearResult};

/// Target platform of a locator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Platform {
    /// Desktop or mobile browser
    Web,
    /// Native iOS application
    Ios,
    /// Native Android application
    Android,
}

impl Platform {
    /// All platforms
    pub const ALL: [Self; 3] = [Self::Web, Self::Ios, Self::Android];

    /// Get the platform name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Web => "WEB",
            Self::Ios => "IOS",
            Self::Android => "ANDROID",
        }
    }

    /// Native mobile platform
    #[must_use]
    pub const fn is_mobile(&self) -> bool {
        matches!(self, Self::Ios | Self::Android)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a selector value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SelectorKind {
    /// XPath expression
    XPath,
    /// CSS selector
    Css,
    /// `name` attribute
    Name,
    /// Tag name
    Tag,
    /// Exact link text
    Text,
    /// iOS class chain
    Chain,
    /// iOS NSPredicate string
    Predicate,
    /// Accessibility identifier
    Accessibility,
    /// Element id (resource id on Android)
    Id,
}

impl SelectorKind {
    /// Whether the kind can be sent to a session on `platform`
    #[must_use]
    pub const fn supported_on(&self, platform: Platform) -> bool {
        match self {
            Self::Chain | Self::Predicate => matches!(platform, Platform::Ios),
            Self::Css | Self::Text => matches!(platform, Platform::Web),
            _ => true,
        }
    }
}

impl std::fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::XPath => "XPATH",
            Self::Css => "CSS",
            Self::Name => "NAME",
            Self::Tag => "TAG",
            Self::Text => "TEXT",
            Self::Chain => "CHAIN",
            Self::Predicate => "PREDICATE",
            Self::Accessibility => "ACCESSIBILITY",
            Self::Id => "ID",
        };
        f.write_str(name)
    }
}

/// A selector kind paired with its value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selector {
    /// Interpretation of `value`
    pub kind: SelectorKind,
    /// Raw selector text
    pub value: String,
}

/// W3C find-element payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireSelector {
    /// Location strategy
    pub using: String,
    /// Strategy argument
    pub value: String,
}

impl Selector {
    /// Create a selector
    #[must_use]
    pub fn new(kind: SelectorKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// Create a CSS selector
    #[must_use]
    pub fn css(value: impl Into<String>) -> Self {
        Self::new(SelectorKind::Css, value)
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(value: impl Into<String>) -> Self {
        Self::new(SelectorKind::XPath, value)
    }

    /// Create an accessibility-id selector
    #[must_use]
    pub fn accessibility(value: impl Into<String>) -> Self {
        Self::new(SelectorKind::Accessibility, value)
    }

    /// Lower to the location strategy a session on `platform` understands.
    ///
    /// Browsers have no `name` or `id` strategy in W3C WebDriver, so those
    /// become attribute CSS selectors there, the same way Selenium rewrites
    /// them. Mobile sessions take them natively.
    #[must_use]
    pub fn to_wire(&self, platform: Platform) -> WireSelector {
        let (using, value) = match (self.kind, platform) {
            (SelectorKind::XPath, _) => ("xpath", self.value.clone()),
            (SelectorKind::Css, _) => ("css selector", self.value.clone()),
            (SelectorKind::Name, Platform::Web) => {
                ("css selector", format!("*[name={:?}]", self.value))
            }
            (SelectorKind::Name, _) => ("name", self.value.clone()),
            (SelectorKind::Tag, _) => ("tag name", self.value.clone()),
            (SelectorKind::Text, _) => ("link text", self.value.clone()),
            (SelectorKind::Chain, _) => ("-ios class chain", self.value.clone()),
            (SelectorKind::Predicate, _) => ("-ios predicate string", self.value.clone()),
            (SelectorKind::Accessibility, _) => ("accessibility id", self.value.clone()),
            (SelectorKind::Id, Platform::Web) => {
                ("css selector", format!("*[id={:?}]", self.value))
            }
            (SelectorKind::Id, _) => ("id", self.value.clone()),
        };
        WireSelector {
            using: using.to_string(),
            value,
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.kind, self.value)
    }
}

/// A named, platform-bound element locator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    platform: Platform,
    name: String,
    selector: Selector,
}

impl Locator {
    /// Create a locator
    #[must_use]
    pub fn new(
        platform: Platform,
        name: impl Into<String>,
        kind: SelectorKind,
        value: impl Into<String>,
    ) -> Self {
        Self {
            platform,
            name: name.into(),
            selector: Selector::new(kind, value),
        }
    }

    /// Shorthand for a web locator
    #[must_use]
    pub fn web(name: impl Into<String>, kind: SelectorKind, value: impl Into<String>) -> Self {
        Self::new(Platform::Web, name, kind, value)
    }

    /// Shorthand for an iOS locator
    #[must_use]
    pub fn ios(name: impl Into<String>, kind: SelectorKind, value: impl Into<String>) -> Self {
        Self::new(Platform::Ios, name, kind, value)
    }

    /// Shorthand for an Android locator
    #[must_use]
    pub fn android(name: impl Into<String>, kind: SelectorKind, value: impl Into<String>) -> Self {
        Self::new(Platform::Android, name, kind, value)
    }

    /// Platform whose session resolves this locator
    #[must_use]
    pub const fn platform(&self) -> Platform {
        self.platform
    }

    /// Logical name, the cache key
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Selector kind
    #[must_use]
    pub const fn kind(&self) -> SelectorKind {
        self.selector.kind
    }

    /// Selector value
    #[must_use]
    pub fn value(&self) -> &str {
        &self.selector.value
    }

    /// Full selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Check the locator can be used at all
    pub fn validate(&self) -> SondearResult<()> {
        if self.name.trim().is_empty() {
            return Err(SondearError::catalog(format!(
                "locator for {} has an empty name",
                self.selector
            )));
        }
        if self.selector.value.is_empty() {
            return Err(SondearError::catalog(format!(
                "locator '{}' has an empty selector value",
                self.name
            )));
        }
        if !self.selector.kind.supported_on(self.platform) {
            return Err(SondearError::catalog(format!(
                "locator '{}' uses {} which {} sessions do not support",
                self.name, self.selector.kind, self.platform
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{} {}]", self.name, self.platform, self.selector)
    }
}
