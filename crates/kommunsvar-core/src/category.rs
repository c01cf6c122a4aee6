// Category vocabulary and the two classifiers (keyword-based for queries,
// URL-based for ingestion). The two need not agree; they only share the
// label set.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// The fixed topical vocabulary of the municipal site. `Ovrigt` is the
/// uncategorized fallback used at ingestion time; a query-time filter of
/// "no category" is expressed as `Option<Category>::None`, never a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Bygga, bo och miljö")]
    ByggaBoMiljo,
    #[serde(rename = "Omsorg och stöd")]
    OmsorgStod,
    #[serde(rename = "Utbildning och förskola")]
    UtbildningForskola,
    #[serde(rename = "Kultur och fritid")]
    KulturFritid,
    #[serde(rename = "Trafik och infrastruktur")]
    TrafikInfrastruktur,
    #[serde(rename = "Näringsliv och arbete")]
    NaringslivArbete,
    #[serde(rename = "Kommun och politik")]
    KommunPolitik,
    #[serde(rename = "Övrigt")]
    Ovrigt,
}

impl Category {
    /// The display label, identical to the string stored on chunk rows.
    pub fn label(&self) -> &'static str {
        match self {
            Category::ByggaBoMiljo => "Bygga, bo och miljö",
            Category::OmsorgStod => "Omsorg och stöd",
            Category::UtbildningForskola => "Utbildning och förskola",
            Category::KulturFritid => "Kultur och fritid",
            Category::TrafikInfrastruktur => "Trafik och infrastruktur",
            Category::NaringslivArbete => "Näringsliv och arbete",
            Category::KommunPolitik => "Kommun och politik",
            Category::Ovrigt => "Övrigt",
        }
    }

    /// Parse a stored label back into the enum (case-sensitive, exact).
    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "Bygga, bo och miljö" => Some(Category::ByggaBoMiljo),
            "Omsorg och stöd" => Some(Category::OmsorgStod),
            "Utbildning och förskola" => Some(Category::UtbildningForskola),
            "Kultur och fritid" => Some(Category::KulturFritid),
            "Trafik och infrastruktur" => Some(Category::TrafikInfrastruktur),
            "Näringsliv och arbete" => Some(Category::NaringslivArbete),
            "Kommun och politik" => Some(Category::KommunPolitik),
            "Övrigt" => Some(Category::Ovrigt),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// Ordered keyword patterns; first match wins.
fn keyword_patterns() -> &'static Vec<(Regex, Category)> {
    static PATTERNS: OnceLock<Vec<(Regex, Category)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            (
                Regex::new(
                    "bygglov|ritning|bygga|hus|villa|altan|inglasning|tillbyggnad|fasad|carport|garage|attefallshus",
                )
                .unwrap(),
                Category::ByggaBoMiljo,
            ),
            (
                Regex::new(
                    "hemtjänst|äldreomsorg|omsorg|stöd|personlig assistent|funktionsnedsättning|lss|boende|vård",
                )
                .unwrap(),
                Category::OmsorgStod,
            ),
            (
                Regex::new(
                    "skola|förskola|fritids|grundskola|gymnasium|utbildning|elev|lärare|pedagogisk",
                )
                .unwrap(),
                Category::UtbildningForskola,
            ),
            (
                Regex::new("kultur|bibliotek|idrott|fritid|museum|teater|konsert|sport|aktivitet")
                    .unwrap(),
                Category::KulturFritid,
            ),
            (
                Regex::new("trafik|parkering|väg|gata|snöröjning|vinter|cykel|gång|infart|parkerings")
                    .unwrap(),
                Category::TrafikInfrastruktur,
            ),
            (
                Regex::new(
                    "företag|näringsliv|tillstånd|serveringstillstånd|etablera|starta företag|jobb|arbete",
                )
                .unwrap(),
                Category::NaringslivArbete,
            ),
            (
                Regex::new("kommun|politik|nämnd|styrelse|fullmäktige|kontakt").unwrap(),
                Category::KommunPolitik,
            ),
        ]
    })
}

/// Detect a category from the keywords of a user query. `None` means the
/// query carries no topical signal and retrieval should search all
/// categories.
pub fn classify_query(query: &str) -> Option<Category> {
    let q = query.to_lowercase();
    keyword_patterns()
        .iter()
        .find(|(pattern, _)| pattern.is_match(&q))
        .map(|(_, category)| *category)
}

/// Map a page URL onto a category via its path segment. Used at
/// ingestion time only; always resolves (fallback `Ovrigt`).
pub fn classify_url(url: &str) -> Category {
    const SEGMENTS: [(&str, Category); 7] = [
        ("/utbildningochforskola/", Category::UtbildningForskola),
        ("/omsorgochstod/", Category::OmsorgStod),
        ("/kulturochfritid/", Category::KulturFritid),
        ("/byggaboochmiljo/", Category::ByggaBoMiljo),
        ("/trafikochinfrastruktur/", Category::TrafikInfrastruktur),
        ("/naringslivocharbete/", Category::NaringslivArbete),
        ("/kommunochpolitik/", Category::KommunPolitik),
    ];

    SEGMENTS
        .iter()
        .find(|(segment, _)| url.contains(segment))
        .map(|(_, category)| *category)
        .unwrap_or(Category::Ovrigt)
}
