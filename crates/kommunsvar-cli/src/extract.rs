// HTML to plain text for ingestion. Picks the most content-like root
// (main, then article, then body), collects the block-level text and
// collapses whitespace. Navigation chrome and scripts never make it
// into the stored page content.

use scraper::{ElementRef, Html, Selector};

const SKIP_TAGS: [&str; 6] = ["script", "style", "template", "noscript", "svg", "nav"];

pub struct ExtractedPage {
    pub title: String,
    pub content: String,
}

pub fn extract_page(html: &str, url: &str) -> ExtractedPage {
    let document = Html::parse_document(html);
    ExtractedPage {
        title: extract_title(&document, url),
        content: extract_content(&document),
    }
}

fn extract_title(document: &Html, url: &str) -> String {
    let title_sel = Selector::parse("title").expect("title selector");
    let h1_sel = Selector::parse("h1").expect("h1 selector");

    document
        .select(&title_sel)
        .next()
        .map(|e| collapse_whitespace(&e.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .or_else(|| {
            document
                .select(&h1_sel)
                .next()
                .map(|e| collapse_whitespace(&e.text().collect::<String>()))
                .filter(|t| !t.is_empty())
        })
        .unwrap_or_else(|| url.to_string())
}

fn extract_content(document: &Html) -> String {
    let root = pick_root(document);
    let block_sel =
        Selector::parse("h1, h2, h3, h4, h5, h6, p, li, td, th").expect("block selector");

    let mut out = String::new();
    for element in root.select(&block_sel) {
        if inside_skipped(element) {
            continue;
        }
        let text = collapse_whitespace(&element.text().collect::<String>());
        if text.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&text);
    }
    out
}

fn pick_root(document: &Html) -> ElementRef<'_> {
    let main_sel = Selector::parse("main").expect("main selector");
    let article_sel = Selector::parse("article").expect("article selector");
    let body_sel = Selector::parse("body").expect("body selector");

    document
        .select(&main_sel)
        .next()
        .or_else(|| document.select(&article_sel).next())
        .or_else(|| document.select(&body_sel).next())
        .unwrap_or_else(|| document.root_element())
}

fn inside_skipped(element: ElementRef<'_>) -> bool {
    element.ancestors().any(|node| {
        node.value()
            .as_element()
            .is_some_and(|e| SKIP_TAGS.contains(&e.name()))
    })
}

fn collapse_whitespace(input: &str) -> String {
    let mut buf = String::with_capacity(input.len());
    let mut last_space = false;
    for ch in input.chars() {
        if ch.is_whitespace() {
            if !last_space && !buf.is_empty() {
                buf.push(' ');
            }
            last_space = true;
        } else {
            buf.push(ch);
            last_space = false;
        }
    }
    buf.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_title_and_body_text() {
        let html = r#"
            <html><head><title>Bygglov - Sandvikens kommun</title>
            <script>var x = 1;</script></head>
            <body><nav><a>Hem</a><a>Kontakt</a></nav>
            <main><h1>Bygglov</h1>
            <p>Du behöver bygglov för att bygga nytt.</p>
            <ul><li>Ritningar</li><li>Ansökan</li></ul></main>
            </body></html>"#;

        let page = extract_page(html, "https://sandviken.se/bygglov");
        assert_eq!(page.title, "Bygglov - Sandvikens kommun");
        assert!(page.content.contains("Du behöver bygglov"));
        assert!(page.content.contains("Ritningar"));
        assert!(!page.content.contains("var x"));
        assert!(!page.content.contains("Kontakt"));
    }

    #[test]
    fn test_title_falls_back_to_h1_then_url() {
        let html = "<html><body><h1>Förskola</h1><p>text</p></body></html>";
        assert_eq!(extract_page(html, "u").title, "Förskola");

        let bare = "<html><body><p>text</p></body></html>";
        assert_eq!(extract_page(bare, "https://example.se/x").title, "https://example.se/x");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  en \n  tv\u{e5}  tre "), "en tv\u{e5} tre");
        assert_eq!(collapse_whitespace("   "), "");
    }
}
