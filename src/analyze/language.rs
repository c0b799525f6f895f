// src/analyze/language.rs
//! Language hint for downstream summarization.
//!
//! The source-level hint is trusted first. Text inspection can only move a
//! topic toward the CJK language, never away from a non-default hint.

use crate::ingest::types::Topic;

pub const CJK_LANGUAGE: &str = "zh";

/// CJK unified ideographs (+ extension A, compatibility block, extension B).
pub fn is_cjk(ch: char) -> bool {
    matches!(ch,
        '\u{4E00}'..='\u{9FFF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{20000}'..='\u{2A6DF}')
}

pub fn contains_cjk(s: &str) -> bool {
    s.chars().any(is_cjk)
}

pub fn classify(topic: &Topic, source_hint: &str, default_language: &str) -> String {
    if !source_hint.eq_ignore_ascii_case(default_language) {
        return source_hint.to_string();
    }
    let excerpt = topic.excerpt.as_deref().unwrap_or_default();
    if contains_cjk(&topic.title) || contains_cjk(excerpt) {
        return CJK_LANGUAGE.to_string();
    }
    default_language.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::SourceTag;

    fn t(title: &str, excerpt: Option<&str>) -> Topic {
        Topic {
            id: "1".into(),
            source: SourceTag::Reddit("rust".into()),
            title: title.into(),
            url: "https://example.test".into(),
            score: 1,
            comments_count: 0,
            author: None,
            excerpt: excerpt.map(str::to_string),
            language: "en".into(),
            comments: vec![],
        }
    }

    #[test]
    fn source_hint_wins_over_plain_text() {
        assert_eq!(classify(&t("OpenAI news", None), "zh", "en"), "zh");
    }

    #[test]
    fn cjk_text_upgrades_default_source() {
        assert_eq!(classify(&t("人工智能 update", None), "en", "en"), "zh");
        assert_eq!(classify(&t("plain", Some("来自中国新闻网")), "en", "en"), "zh");
    }

    #[test]
    fn plain_text_stays_default() {
        assert_eq!(classify(&t("Rust agents", Some("no cjk here")), "en", "en"), "en");
    }

    #[test]
    fn kana_only_is_not_cjk_ideograph() {
        assert!(!contains_cjk("ひらがな"));
        assert!(contains_cjk("漢字"));
    }
}
