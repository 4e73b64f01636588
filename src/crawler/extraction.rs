//! Content block extraction from parsed pages.
//!
//! A page contributes one block per heading that has a paragraph somewhere
//! after it in document order. The block carries the combined visible text of
//! the pair (for embedding) and a reconstructed HTML fragment wrapping the
//! original markup (for display).

use scraper::{ElementRef, Html, Node};
use url::Url;

use crate::crawler::ContentBlock;

const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];
const SKIPPED_TAGS: [&str; 3] = ["script", "style", "noscript"];

/// Extract heading/paragraph content blocks from a parsed page.
///
/// Headings are visited in document order. Each heading is paired with the
/// first `<p>` element that follows it anywhere later in the document, not
/// necessarily a sibling. A heading with no following paragraph yields no
/// block. Two headings may pair with the same paragraph; the duplication is
/// kept.
pub fn extract_blocks(document: &Html, page_url: &Url) -> Vec<ContentBlock> {
    let mut headings: Vec<(usize, ElementRef)> = Vec::new();
    let mut paragraphs: Vec<(usize, ElementRef)> = Vec::new();

    for (position, node) in document.root_element().descendants().enumerate() {
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };
        let name = element.value().name();
        if HEADING_TAGS.contains(&name) {
            headings.push((position, element));
        } else if name == "p" {
            paragraphs.push((position, element));
        }
    }

    let mut blocks = Vec::new();
    for (heading_position, heading) in headings {
        let Some((_, paragraph)) = paragraphs
            .iter()
            .find(|(position, _)| *position > heading_position)
        else {
            continue;
        };

        let text = format!("{} {}", visible_text(heading), visible_text(*paragraph));
        let html = format!(
            "<div class=\"et_pb_text_inner\">\n  {}\n  {}\n</div>",
            heading.html(),
            paragraph.html()
        );

        blocks.push(ContentBlock {
            text,
            html,
            source_url: page_url.to_string(),
        });
    }

    blocks
}

/// Visible text of an element with whitespace collapsed.
///
/// Text inside script, style, and noscript subtrees is ignored so markup
/// noise never contaminates the embedded text.
fn visible_text(element: ElementRef) -> String {
    let mut words: Vec<&str> = Vec::new();
    for node in element.descendants() {
        if let Node::Text(text) = node.value() {
            let hidden = node.ancestors().any(|ancestor| match ancestor.value() {
                Node::Element(el) => SKIPPED_TAGS.contains(&el.name()),
                _ => false,
            });
            if !hidden {
                words.extend(text.split_whitespace());
            }
        }
    }
    words.join(" ")
}
