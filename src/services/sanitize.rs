// src/services/sanitize.rs
//! Allow-listed HTML sanitization for stored post bodies

use ammonia::Builder;
use std::collections::HashSet;

/// Sanitize post HTML against the storage allow-list.
///
/// Only heading, paragraph and list markup survives; every other tag and
/// every attribute is stripped. Runs on generated content before the
/// first insert and again on every user save.
pub fn sanitize_post_html(html: &str) -> String {
    let tags: HashSet<&str> = [
        "h1", "h2", "h3", "h4", "h5", "h6", "p", "ul", "ol", "li",
    ]
    .into_iter()
    .collect();

    Builder::default()
        .tags(tags)
        .generic_attributes(HashSet::new())
        .link_rel(None)
        .clean(html)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_tags_survive() {
        let html = "<h1>Title</h1><p>Body</p><ul><li>One</li><li>Two</li></ul>";
        assert_eq!(sanitize_post_html(html), html);
    }

    #[test]
    fn test_script_tags_are_stripped() {
        let html = "<p>ok</p><script>alert('xss')</script>";
        let clean = sanitize_post_html(html);
        assert!(!clean.contains("<script"));
        assert!(clean.contains("<p>ok</p>"));
    }

    #[test]
    fn test_attributes_are_stripped() {
        let clean = sanitize_post_html(r#"<p onclick="evil()" class="x">text</p>"#);
        assert_eq!(clean, "<p>text</p>");
    }

    #[test]
    fn test_disallowed_tags_keep_inner_text() {
        let clean = sanitize_post_html("<p><a href=\"http://e.com\">link</a> and <b>bold</b></p>");
        assert_eq!(clean, "<p>link and bold</p>");
    }

    #[test]
    fn test_img_and_iframe_removed() {
        let clean = sanitize_post_html(r#"<p>x</p><img src="a.png"><iframe src="b"></iframe>"#);
        assert!(!clean.contains("img"));
        assert!(!clean.contains("iframe"));
    }
}
