use super::{element_text, selector};
use crate::config::{ContentConfig, ExclusionRule};
use crate::error::Result;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

enum Exclusion<'a> {
    Attribute { name: &'a str, contains: &'a str },
    Selector(Selector),
}

impl<'a> Exclusion<'a> {
    fn compile(rule: &'a ExclusionRule) -> Result<Self> {
        Ok(match rule {
            ExclusionRule::Attribute { name, contains } => Exclusion::Attribute { name, contains },
            ExclusionRule::Selector { selector: css } => Exclusion::Selector(selector(css)?),
        })
    }

    fn matches(&self, element: &ElementRef<'_>) -> bool {
        match self {
            Exclusion::Attribute { name, contains } => element
                .value()
                .attr(name)
                .is_some_and(|value| value.contains(*contains)),
            Exclusion::Selector(selector) => selector.matches(element),
        }
    }
}

/// Text blocks of a chapter page in document order. Excluded nodes are
/// dropped; empty nodes are kept as empty strings.
pub fn parse_content(document: &Html, config: &ContentConfig) -> Result<Vec<String>> {
    let exclusions = config
        .exclude
        .iter()
        .map(Exclusion::compile)
        .collect::<Result<Vec<_>>>()?;

    let mut blocks = Vec::new();

    if let Some(css) = config.title_selector.as_deref() {
        if let Some(title) = document.select(&selector(css)?).next() {
            blocks.push(element_text(title));
        }
    }

    let mut excluded = 0;
    for element in document.select(&selector(&config.content_selector)?) {
        if exclusions.iter().any(|rule| rule.matches(&element)) {
            excluded += 1;
            continue;
        }
        blocks.push(element_text(element));
    }

    debug!("[CONTENT] {} blocks, {} excluded", blocks.len(), excluded);
    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(exclude: Vec<ExclusionRule>) -> ContentConfig {
        ContentConfig {
            title_selector: None,
            content_selector: "div.entry-content p".to_string(),
            exclude,
        }
    }

    fn opacity_rule() -> ExclusionRule {
        ExclusionRule::Attribute {
            name: "style".to_string(),
            contains: "opacity".to_string(),
        }
    }

    const CHAPTER: &str = r#"<html><body><div class="entry-content">
        <p>One</p>
        <p style="opacity:0; height:0">decoy text</p>
        <p>Two</p>
        <p>Three</p>
    </div></body></html>"#;

    #[test]
    fn drops_opacity_decoys_and_keeps_order() {
        let blocks = parse_content(&Html::parse_document(CHAPTER), &config(vec![opacity_rule()])).unwrap();
        assert_eq!(blocks, vec!["One", "Two", "Three"]);
    }

    #[test]
    fn selector_rule_excludes_matching_nodes() {
        let rule = ExclusionRule::Selector {
            selector: "p[style]".to_string(),
        };
        let blocks = parse_content(&Html::parse_document(CHAPTER), &config(vec![rule])).unwrap();
        assert_eq!(blocks, vec!["One", "Two", "Three"]);
    }

    #[test]
    fn empty_blocks_are_kept() {
        let html = r#"<div class="entry-content"><p>A</p><p> </p><p>B</p></div>"#;
        let blocks = parse_content(&Html::parse_document(html), &config(Vec::new())).unwrap();
        assert_eq!(blocks, vec!["A", "", "B"]);
    }

    #[test]
    fn title_comes_first_when_configured() {
        let mut config = config(vec![opacity_rule()]);
        config.title_selector = Some("h2.ch".to_string());
        let html = r#"<h2 class="ch">Chapter 9</h2><div class="entry-content"><p>Body</p></div>"#;

        let blocks = parse_content(&Html::parse_document(html), &config).unwrap();
        assert_eq!(blocks, vec!["Chapter 9", "Body"]);
    }

    #[test]
    fn without_rules_everything_is_kept() {
        let blocks = parse_content(&Html::parse_document(CHAPTER), &config(Vec::new())).unwrap();
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[1], "decoy text");
    }
}
