//! Tag lookup with typed failure.
//!
//! Every lookup either returns the first matching element in document order
//! or a [`ScrapeError::TagNotFound`] naming the tag and the filters used, so
//! call sites are forced to handle absence explicitly instead of threading
//! bare options around.

use regex::Regex;
use scraper::{ElementRef, Selector};

use crate::error::{Result, ScrapeError};

/// Rule for a single attribute of a candidate element.
pub enum AttrRule<'a> {
    /// Attribute value must equal this string exactly.
    Exact(&'a str),
    /// Attribute value must match this pattern.
    Matches(&'a Regex),
}

/// Immutable description of one tag lookup: tag name, attribute rules and an
/// optional exact-text rule. Built once, used for one `find_in` call.
pub struct TagQuery<'a> {
    name: &'a str,
    attrs: Vec<(&'a str, AttrRule<'a>)>,
    text: Option<&'a str>,
}

impl<'a> TagQuery<'a> {
    pub fn new(name: &'a str) -> Self {
        Self {
            name,
            attrs: Vec::new(),
            text: None,
        }
    }

    /// Require an attribute to equal `value` exactly (the raw attribute
    /// string, not individual class tokens).
    pub fn attr(mut self, name: &'a str, value: &'a str) -> Self {
        self.attrs.push((name, AttrRule::Exact(value)));
        self
    }

    /// Require an attribute to match `pattern`.
    pub fn attr_matches(mut self, name: &'a str, pattern: &'a Regex) -> Self {
        self.attrs.push((name, AttrRule::Matches(pattern)));
        self
    }

    /// Require the element's collected text to equal `text` exactly.
    pub fn text(mut self, text: &'a str) -> Self {
        self.text = Some(text);
        self
    }

    /// First matching descendant of `root` in document order.
    pub fn find_in<'b>(&self, root: ElementRef<'b>) -> Result<ElementRef<'b>> {
        root.descendants()
            .skip(1) // descendants only, not the root itself
            .filter_map(ElementRef::wrap)
            .find(|el| self.matches(*el))
            .ok_or_else(|| ScrapeError::TagNotFound {
                query: self.render(),
            })
    }

    fn matches(&self, el: ElementRef<'_>) -> bool {
        if el.value().name() != self.name {
            return false;
        }
        for (attr, rule) in &self.attrs {
            let Some(value) = el.value().attr(attr) else {
                return false;
            };
            let ok = match rule {
                AttrRule::Exact(want) => value == *want,
                AttrRule::Matches(re) => re.is_match(value),
            };
            if !ok {
                return false;
            }
        }
        match self.text {
            Some(want) => element_text(el) == want,
            None => true,
        }
    }

    fn render(&self) -> String {
        let mut out = String::from(self.name);
        for (attr, rule) in &self.attrs {
            match rule {
                AttrRule::Exact(v) => out.push_str(&format!("[{attr}={v:?}]")),
                AttrRule::Matches(re) => out.push_str(&format!("[{attr}~={:?}]", re.as_str())),
            }
        }
        if let Some(text) = self.text {
            out.push_str(&format!("{{text={text:?}}}"));
        }
        out
    }
}

/// Shorthand for a bare tag-name lookup.
pub fn find_tag<'b>(root: ElementRef<'b>, name: &str) -> Result<ElementRef<'b>> {
    TagQuery::new(name).find_in(root)
}

/// Nearest following sibling element with the given tag name.
pub fn find_next_sibling_tag<'b>(node: ElementRef<'b>, name: &str) -> Result<ElementRef<'b>> {
    node.next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == name)
        .ok_or_else(|| ScrapeError::TagNotFound {
            query: format!("{name} (next sibling)"),
        })
}

/// First match for a CSS selector. An unparseable selector is reported the
/// same way as a missing element, carrying the selector string.
pub fn select_first<'b>(root: ElementRef<'b>, css: &str) -> Result<ElementRef<'b>> {
    let selector = Selector::parse(css).map_err(|_| ScrapeError::TagNotFound {
        query: css.to_string(),
    })?;
    root.select(&selector)
        .next()
        .ok_or_else(|| ScrapeError::TagNotFound {
            query: css.to_string(),
        })
}

/// Every match for a CSS selector, in document order. An empty result is not
/// an error here; enumeration call sites decide what absence means.
pub fn select_all<'b>(root: ElementRef<'b>, css: &str) -> Result<Vec<ElementRef<'b>>> {
    let selector = Selector::parse(css).map_err(|_| ScrapeError::TagNotFound {
        query: css.to_string(),
    })?;
    Ok(root.select(&selector).collect())
}

/// All text nodes under an element, concatenated.
pub fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}
