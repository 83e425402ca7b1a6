//! CollapseStrategy - which declaration, which selector flavour
//!
//! | element           | selector rule                          | inline collapse     |
//! |-------------------|----------------------------------------|---------------------|
//! | `frame`           | `visibility:hidden; height:0px`        | `visibility:hidden` |
//! | `iframe`          | `visibility:hidden; height:0px`        | `display:none`      |
//! | everything else   | `display:none`                         | `display:none`      |
//!
//! All of it `!important`.

use cssparser::serialize_string;

use crate::config::SuppressorConfig;
use crate::path::escape_name;

/// Declaration block for a rule hiding an element with this tag
pub fn hide_style<'a>(tag: &str, config: &'a SuppressorConfig) -> &'a str {
    match tag {
        "frame" | "iframe" => &config.frame_hide_style,
        _ => &config.hide_style,
    }
}

/// `tag[src="value"]`, value serialized as a CSS string
pub fn src_selector(tag: &str, src: &str) -> String {
    let mut selector = escape_name(tag);
    selector.push_str("[src=");
    // fmt::Write into a String never fails
    let _ = serialize_string(src, &mut selector);
    selector.push(']');
    selector
}

/// Inline `(property, value)` that collapses an element with this tag
pub fn inline_target(tag: &str) -> (&'static str, &'static str) {
    match tag {
        "frame" => ("visibility", "hidden"),
        _ => ("display", "none"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::SelectorList;

    #[test]
    fn test_frame_styles() {
        let config = SuppressorConfig::default();
        assert_eq!(hide_style("iframe", &config), "visibility:hidden!important; height:0px!important;");
        assert_eq!(hide_style("frame", &config), config.frame_hide_style);
        assert_eq!(hide_style("div", &config), "display:none!important;");
    }

    #[test]
    fn test_src_selector_quotes_value() {
        assert_eq!(src_selector("img", "a.png"), r#"img[src="a.png"]"#);
        assert_eq!(src_selector("img", r#"x"y\z"#), r#"img[src="x\"y\\z"]"#);
        assert!(SelectorList::parse(&src_selector("my-img", r#"{"}"#)).is_ok());
    }

    #[test]
    fn test_inline_target() {
        assert_eq!(inline_target("frame"), ("visibility", "hidden"));
        assert_eq!(inline_target("iframe"), ("display", "none"));
        assert_eq!(inline_target("input"), ("display", "none"));
    }
}
