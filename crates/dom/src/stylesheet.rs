//! Style sheets and inline style declarations
//!
//! Mirrors the small part of CSSOM the collapser needs: a rule list that
//! supports `insertRule(text, index)` / `deleteRule(index)`, and an inline
//! style declaration block with per-property priority.

use serde::{Deserialize, Serialize};

use crate::error::{DomError, Result};
use crate::selector::SelectorList;

/// Single `property: value [!important]` declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

impl Declaration {
    pub fn to_css(&self) -> String {
        if self.important {
            format!("{}: {} !important;", self.property, self.value)
        } else {
            format!("{}: {};", self.property, self.value)
        }
    }
}

/// Parse a declaration block body (`display: none!important; height: 0px`)
///
/// Empty and malformed entries (no colon, empty property) are skipped, the
/// same way a browser drops invalid declarations.
pub fn parse_declarations(block: &str) -> Vec<Declaration> {
    split_outside_quotes(block, ';')
        .into_iter()
        .filter_map(|raw| {
            let (property, value) = raw.split_once(':')?;
            let property = property.trim().to_ascii_lowercase();
            if property.is_empty() {
                return None;
            }

            let mut value = value.trim();
            let mut important = false;
            if let Some(bang) = value.rfind('!') {
                if value[bang + 1..].trim().eq_ignore_ascii_case("important") {
                    important = true;
                    value = value[..bang].trim_end();
                }
            }
            if value.is_empty() {
                return None;
            }

            Some(Declaration {
                property,
                value: value.to_string(),
                important,
            })
        })
        .collect()
}

/// Inline `style` of an element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineStyle {
    declarations: Vec<Declaration>,
}

impl InlineStyle {
    pub fn parse(css_text: &str) -> Self {
        let mut style = Self::default();
        for decl in parse_declarations(css_text) {
            style.set_property(&decl.property, &decl.value, decl.important);
        }
        style
    }

    /// Value of `property`, empty string when unset (CSSOM semantics)
    pub fn get_property_value(&self, property: &str) -> &str {
        self.find(property).map(|d| d.value.as_str()).unwrap_or("")
    }

    /// `"important"` or empty string
    pub fn get_property_priority(&self, property: &str) -> &str {
        match self.find(property) {
            Some(d) if d.important => "important",
            _ => "",
        }
    }

    pub fn get(&self, property: &str) -> Option<&Declaration> {
        self.find(property)
    }

    pub fn set_property(&mut self, property: &str, value: &str, important: bool) {
        let property = property.to_ascii_lowercase();
        match self.declarations.iter_mut().find(|d| d.property == property) {
            Some(existing) => {
                existing.value = value.to_string();
                existing.important = important;
            }
            None => self.declarations.push(Declaration {
                property,
                value: value.to_string(),
                important,
            }),
        }
    }

    pub fn remove_property(&mut self, property: &str) -> Option<Declaration> {
        let pos = self
            .declarations
            .iter()
            .position(|d| d.property.eq_ignore_ascii_case(property))?;
        Some(self.declarations.remove(pos))
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn css_text(&self) -> String {
        self.declarations
            .iter()
            .map(Declaration::to_css)
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn find(&self, property: &str) -> Option<&Declaration> {
        self.declarations
            .iter()
            .find(|d| d.property.eq_ignore_ascii_case(property))
    }
}

/// One style rule of a sheet
#[derive(Debug, Clone)]
pub struct CssRule {
    /// Selector text exactly as inserted (trimmed)
    pub selector_text: String,
    pub selectors: SelectorList,
    pub declarations: Vec<Declaration>,
}

impl CssRule {
    /// Parse `selector { declarations }`
    pub fn parse(rule: &str) -> Result<Self> {
        let rule = rule.trim();
        let open = find_outside_quotes(rule, '{')
            .ok_or_else(|| DomError::Syntax(format!("missing '{{' in rule: {}", rule)))?;
        let body = rule[open + 1..]
            .strip_suffix('}')
            .ok_or_else(|| DomError::Syntax(format!("missing '}}' in rule: {}", rule)))?;

        let selector_text = rule[..open].trim();
        let selectors = SelectorList::parse(selector_text)?;

        Ok(Self {
            selector_text: selector_text.to_string(),
            selectors,
            declarations: parse_declarations(body),
        })
    }

    pub fn css_text(&self) -> String {
        let body = self
            .declarations
            .iter()
            .map(Declaration::to_css)
            .collect::<Vec<_>>()
            .join(" ");
        format!("{} {{ {} }}", self.selector_text, body)
    }
}

/// Rule list owned by a `<style>` element
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    rules: Vec<CssRule>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `rule` at `index`, returns the index
    pub fn insert_rule(&mut self, rule: &str, index: usize) -> Result<usize> {
        if index > self.rules.len() {
            return Err(DomError::IndexSize {
                index,
                len: self.rules.len(),
            });
        }
        let parsed = CssRule::parse(rule)?;
        self.rules.insert(index, parsed);
        Ok(index)
    }

    pub fn delete_rule(&mut self, index: usize) -> Result<()> {
        if index >= self.rules.len() {
            return Err(DomError::IndexSize {
                index,
                len: self.rules.len(),
            });
        }
        self.rules.remove(index);
        Ok(())
    }

    pub fn rules(&self) -> &[CssRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn css_text(&self) -> String {
        self.rules
            .iter()
            .map(CssRule::css_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Byte offset of the first `needle` that is not inside a quoted string
fn find_outside_quotes(text: &str, needle: char) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (ch, quote) {
            ('\\', _) => escaped = true,
            ('"' | '\'', None) => quote = Some(ch),
            (c, Some(q)) if c == q => quote = None,
            (c, None) if c == needle => return Some(idx),
            _ => {}
        }
    }
    None
}

fn split_outside_quotes(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = text;
    while let Some(idx) = find_outside_quotes(rest, separator) {
        parts.push(&rest[..idx]);
        rest = &rest[idx + separator.len_utf8()..];
    }
    parts.push(rest);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_declarations_priority() {
        let decls = parse_declarations("visibility:hidden!important; height: 0px ! important;color:red");
        assert_eq!(decls.len(), 3);
        assert_eq!(decls[0].property, "visibility");
        assert_eq!(decls[0].value, "hidden");
        assert!(decls[0].important);
        assert_eq!(decls[1].value, "0px");
        assert!(decls[1].important);
        assert!(!decls[2].important);
    }

    #[test]
    fn test_inline_style_priority() {
        let mut style = InlineStyle::parse("display: block");
        assert_eq!(style.get_property_value("display"), "block");
        assert_eq!(style.get_property_priority("display"), "");

        style.set_property("display", "none", true);
        assert_eq!(style.get_property_value("display"), "none");
        assert_eq!(style.get_property_priority("display"), "important");
        assert_eq!(style.get_property_value("visibility"), "");
    }

    #[test]
    fn test_insert_and_delete_rules() {
        let mut sheet = StyleSheet::new();
        assert_eq!(sheet.insert_rule("div > span{display:none!important;}", 0).unwrap(), 0);
        assert_eq!(sheet.insert_rule("p{color:red}", 1).unwrap(), 1);
        assert_eq!(sheet.rules()[0].selector_text, "div > span");
        assert_eq!(sheet.len(), 2);

        sheet.delete_rule(0).unwrap();
        assert_eq!(sheet.rules()[0].selector_text, "p");
        assert!(matches!(sheet.delete_rule(5), Err(DomError::IndexSize { .. })));
    }

    #[test]
    fn test_insert_rejects_bad_index_and_syntax() {
        let mut sheet = StyleSheet::new();
        assert!(matches!(
            sheet.insert_rule("div{display:none}", 1),
            Err(DomError::IndexSize { index: 1, len: 0 })
        ));
        assert!(matches!(sheet.insert_rule("div > {display:none}", 0), Err(DomError::Syntax(_))));
        assert!(matches!(sheet.insert_rule("div display:none", 0), Err(DomError::Syntax(_))));
        assert!(sheet.is_empty());
    }

    #[test]
    fn test_brace_inside_attribute_value() {
        let mut sheet = StyleSheet::new();
        sheet.insert_rule(r#"img[src="a{b}.png"]{display:none}"#, 0).unwrap();
        assert_eq!(sheet.rules()[0].selector_text, r#"img[src="a{b}.png"]"#);
        assert_eq!(sheet.rules()[0].declarations[0].value, "none");
    }
}
