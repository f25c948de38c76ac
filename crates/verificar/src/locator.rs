//! Locator abstraction for element selection.
//!
//! A locator is a `(pattern, kind)` pair identifying zero or more elements on
//! a page. Dynamic locators use [`LocatorTemplate`], a pattern with a single
//! substitution slot validated at construction, instead of ad-hoc format
//! strings.

use crate::result::{VerificarError, VerificarResult};

/// Substitution marker accepted by [`LocatorTemplate`]
pub const TEMPLATE_SLOT: &str = "%s";

/// Locator resolution strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocatorKind {
    /// CSS selector (e.g., `button.primary`)
    Css,
    /// Element id attribute
    Id,
    /// XPath expression
    XPath,
    /// Tag name
    TagName,
    /// Name attribute
    Name,
    /// Single class name
    ClassName,
    /// Exact anchor text
    LinkText,
    /// Anchor text substring
    PartialLinkText,
    /// Mobile accessibility id (no web resolution strategy)
    AccessibilityId,
    /// Android UiAutomator expression (no web resolution strategy)
    AndroidUiAutomator,
    /// iOS NSPredicate expression (no web resolution strategy)
    IosNsPredicate,
}

impl LocatorKind {
    /// Display name used in diagnostics
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Css => "CSS",
            Self::Id => "ID",
            Self::XPath => "XPATH",
            Self::TagName => "TAG_NAME",
            Self::Name => "NAME",
            Self::ClassName => "CLASS_NAME",
            Self::LinkText => "LINK_TEXT",
            Self::PartialLinkText => "PARTIAL_LINK_TEXT",
            Self::AccessibilityId => "ACCESSIBILITY_ID",
            Self::AndroidUiAutomator => "ANDROID_UI_AUTOMATOR",
            Self::IosNsPredicate => "IOS_NS_PREDICATE",
        }
    }
}

impl std::fmt::Display for LocatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Query a locator resolves to in the DOM backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomQuery {
    /// CSS selector query
    Css(String),
    /// XPath expression query
    XPath(String),
}

impl DomQuery {
    /// The raw query string
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Css(s) | Self::XPath(s) => s,
        }
    }
}

/// A `(pattern, kind)` pair identifying elements on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pattern: String,
    kind: LocatorKind,
}

impl Locator {
    /// Create a locator with an explicit kind
    #[must_use]
    pub fn new(pattern: impl Into<String>, kind: LocatorKind) -> Self {
        Self {
            pattern: pattern.into(),
            kind,
        }
    }

    /// Create a CSS locator
    #[must_use]
    pub fn css(pattern: impl Into<String>) -> Self {
        Self::new(pattern, LocatorKind::Css)
    }

    /// Create an id locator
    #[must_use]
    pub fn id(pattern: impl Into<String>) -> Self {
        Self::new(pattern, LocatorKind::Id)
    }

    /// Create an XPath locator
    #[must_use]
    pub fn xpath(pattern: impl Into<String>) -> Self {
        Self::new(pattern, LocatorKind::XPath)
    }

    /// Create a tag-name locator
    #[must_use]
    pub fn tag_name(pattern: impl Into<String>) -> Self {
        Self::new(pattern, LocatorKind::TagName)
    }

    /// Create a name-attribute locator
    #[must_use]
    pub fn name(pattern: impl Into<String>) -> Self {
        Self::new(pattern, LocatorKind::Name)
    }

    /// Create a class-name locator
    #[must_use]
    pub fn class_name(pattern: impl Into<String>) -> Self {
        Self::new(pattern, LocatorKind::ClassName)
    }

    /// Create an exact link-text locator
    #[must_use]
    pub fn link_text(pattern: impl Into<String>) -> Self {
        Self::new(pattern, LocatorKind::LinkText)
    }

    /// Create a partial link-text locator
    #[must_use]
    pub fn partial_link_text(pattern: impl Into<String>) -> Self {
        Self::new(pattern, LocatorKind::PartialLinkText)
    }

    /// The raw pattern
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The resolution strategy
    #[must_use]
    pub const fn kind(&self) -> LocatorKind {
        self.kind
    }

    /// Translate to the query the DOM backend executes.
    ///
    /// # Errors
    ///
    /// Returns [`VerificarError::UnsupportedLocator`] for kinds with no web
    /// resolution strategy.
    pub fn resolution_query(&self) -> VerificarResult<DomQuery> {
        let p = &self.pattern;
        match self.kind {
            LocatorKind::Css => Ok(DomQuery::Css(p.clone())),
            LocatorKind::Id => Ok(DomQuery::Css(format!("[id='{p}']"))),
            LocatorKind::Name => Ok(DomQuery::Css(format!("[name='{p}']"))),
            LocatorKind::ClassName => Ok(DomQuery::Css(format!("[class~='{p}']"))),
            LocatorKind::TagName => Ok(DomQuery::Css(p.clone())),
            LocatorKind::XPath => Ok(DomQuery::XPath(p.clone())),
            LocatorKind::LinkText => Ok(DomQuery::XPath(format!(
                "//a[normalize-space(text())='{p}']"
            ))),
            LocatorKind::PartialLinkText => {
                Ok(DomQuery::XPath(format!("//a[contains(text(), '{p}')]")))
            }
            LocatorKind::AccessibilityId
            | LocatorKind::AndroidUiAutomator
            | LocatorKind::IosNsPredicate => {
                Err(VerificarError::UnsupportedLocator { kind: self.kind })
            }
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.pattern, self.kind)
    }
}

/// A locator pattern with at most one substitution slot.
///
/// Replaces printf-style dynamic locators: the slot count is validated once
/// at construction, and substitution is an explicit, checked operation.
///
/// # Example
///
/// ```
/// use verificar::{Locator, LocatorKind, LocatorTemplate};
///
/// let tpl = LocatorTemplate::new("//li[%s]/a", LocatorKind::XPath).unwrap();
/// let locator = tpl.with_parameter("5").unwrap();
/// assert_eq!(locator.pattern(), "//li[5]/a");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorTemplate {
    pattern: String,
    kind: LocatorKind,
    has_slot: bool,
}

impl LocatorTemplate {
    /// Create a template, validating the slot count.
    ///
    /// # Errors
    ///
    /// Returns [`VerificarError::InvalidTemplate`] when the pattern contains
    /// more than one substitution slot.
    pub fn new(pattern: impl Into<String>, kind: LocatorKind) -> VerificarResult<Self> {
        let pattern = pattern.into();
        let slots = pattern.matches(TEMPLATE_SLOT).count();
        if slots > 1 {
            return Err(VerificarError::InvalidTemplate {
                pattern,
                reason: format!("expected at most one {TEMPLATE_SLOT} slot, found {slots}"),
            });
        }
        Ok(Self {
            pattern,
            kind,
            has_slot: slots == 1,
        })
    }

    /// Whether the template carries a substitution slot
    #[must_use]
    pub const fn has_slot(&self) -> bool {
        self.has_slot
    }

    /// Substitute the slot, producing a concrete locator.
    ///
    /// # Errors
    ///
    /// Returns [`VerificarError::InvalidTemplate`] when the template has no
    /// slot to fill.
    pub fn with_parameter(&self, value: impl AsRef<str>) -> VerificarResult<Locator> {
        if !self.has_slot {
            return Err(VerificarError::InvalidTemplate {
                pattern: self.pattern.clone(),
                reason: "template has no substitution slot".to_string(),
            });
        }
        Ok(Locator::new(
            self.pattern.replacen(TEMPLATE_SLOT, value.as_ref(), 1),
            self.kind,
        ))
    }

    /// Use a slotless template as-is.
    ///
    /// # Errors
    ///
    /// Returns [`VerificarError::InvalidTemplate`] when the template still
    /// has an unfilled slot.
    pub fn resolve(&self) -> VerificarResult<Locator> {
        if self.has_slot {
            return Err(VerificarError::InvalidTemplate {
                pattern: self.pattern.clone(),
                reason: "template slot was never filled".to_string(),
            });
        }
        Ok(Locator::new(self.pattern.clone(), self.kind))
    }
}
