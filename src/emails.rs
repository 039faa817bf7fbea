//! Email address extraction from recognized text

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-z]{2,}").expect("email pattern is valid")
});

/// Every address found in `text`, in order of first appearance, duplicates dropped
pub fn extract_emails(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for m in EMAIL_REGEX.find_iter(text) {
        if !found.iter().any(|seen| seen == m.as_str()) {
            found.push(m.as_str().to_string());
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_addresses_in_ocr_text() {
        let text = "Contact: jane.doe@example.com\nSales - sales+eu@mail.example.co.uk\n";
        assert_eq!(
            extract_emails(text),
            vec!["jane.doe@example.com", "sales+eu@mail.example.co.uk"]
        );
    }

    #[test]
    fn test_no_addresses() {
        assert!(extract_emails("").is_empty());
        assert!(extract_emails("call us at 555-0100, @home, user@localhost").is_empty());
    }

    #[test]
    fn test_duplicates_are_dropped_order_kept() {
        let text = "b@x.io a@x.io b@x.io";
        assert_eq!(extract_emails(text), vec!["b@x.io", "a@x.io"]);
    }

    #[test]
    fn test_top_level_domain_must_be_lowercase_letters() {
        // OCR noise like a trailing digit or uppercase TLD is cut off, not matched whole
        assert_eq!(extract_emails("info@shop.com2"), vec!["info@shop.com"]);
        assert!(extract_emails("INFO@SHOP.COM").is_empty());
    }

    #[test]
    fn test_address_touching_punctuation() {
        assert_eq!(extract_emails("(write to ops@corp.net)."), vec!["ops@corp.net"]);
    }
}
