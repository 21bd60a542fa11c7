//! services/bot/src/adapters/profile.rs
//!
//! Heuristic extraction of a student profile from the portal's student-info
//! page. The portal's markup is not contractually stable, so extraction is
//! layered: labelled table rows first, then text searches anchored on things
//! we already know, then safe defaults. The function is total - a login is
//! never blocked on parsing ambiguity.

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use studygate_core::domain::StudentProfile;

const DEFAULT_NAME: &str = "Student";
const DEFAULT_STUDY_GROUP: &str = "Not specified";

/// Bilingual label keywords, checked by substring match against cell 0 of
/// each table row. First match wins per field.
const NAME_KEYWORDS: &[&str] = &["اسم الطالب", "الاسم", "Name"];
const NATIONAL_ID_KEYWORDS: &[&str] = &["الرقم القومي", "National ID"];
const MOBILE_KEYWORDS: &[&str] = &["الموبايل", "رقم الهاتف", "Mobile", "Phone"];
const EMAIL_KEYWORDS: &[&str] = &["الايميل", "البريد الإلكتروني", "Email"];
const STUDY_GROUP_KEYWORDS: &[&str] = &["الفرقة", "المستوى", "البرنامج", "Level", "Program"];

/// Keywords used by the study-group fallback text search.
const PROGRAM_HINTS: &[&str] = &["المستوى", "برنامج"];

#[derive(Default)]
struct Fields {
    name: Option<String>,
    national_id: Option<String>,
    mobile: Option<String>,
    email: Option<String>,
    study_group: Option<String>,
}

impl Fields {
    fn assign(&mut self, label: &str, value: &str) {
        let slot = if matches(label, NAME_KEYWORDS) {
            &mut self.name
        } else if matches(label, NATIONAL_ID_KEYWORDS) {
            &mut self.national_id
        } else if matches(label, MOBILE_KEYWORDS) {
            &mut self.mobile
        } else if matches(label, EMAIL_KEYWORDS) {
            &mut self.email
        } else if matches(label, STUDY_GROUP_KEYWORDS) {
            &mut self.study_group
        } else {
            return;
        };
        if slot.is_none() {
            *slot = Some(value.to_string());
        }
    }
}

fn matches(label: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| label.contains(k))
}

/// Extracts a `StudentProfile` from the student-info page HTML.
///
/// Total: any input, including the empty document, yields a profile with a
/// non-empty name and study group. `known_email` is the address the student
/// logged in with; it anchors the name fallback and fills the email field
/// when the page does not repeat it.
pub fn extract(html: &str, known_email: &str) -> StudentProfile {
    let document = Html::parse_document(html);
    let mut fields = Fields::default();

    // Layer 1: labelled table rows.
    let table_selector = Selector::parse("table").expect("static selector");
    let row_selector = Selector::parse("tr").expect("static selector");
    let cell_selector = Selector::parse("td, th").expect("static selector");
    for table in document.select(&table_selector) {
        for row in table.select(&row_selector) {
            let cells: Vec<ElementRef> = row.select(&cell_selector).collect();
            if cells.len() >= 2 {
                let label = element_text(&cells[0]);
                let value = element_text(&cells[1]);
                fields.assign(&label, &value);
            }
        }
    }

    // Layer 2: the student's name often appears next to their email address.
    if fields.name.is_none() && !known_email.is_empty() {
        fields.name = text_search(&document, |t| t.contains(known_email));
    }

    // Layer 3: study group from program-related wording anywhere on the page.
    if fields.study_group.is_none() {
        fields.study_group = text_search(&document, |t| PROGRAM_HINTS.iter().any(|h| t.contains(h)));
    }

    // Layer 4: defaults.
    StudentProfile {
        name: fields.name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
        email: fields.email.unwrap_or_else(|| known_email.to_string()),
        study_group: fields
            .study_group
            .unwrap_or_else(|| DEFAULT_STUDY_GROUP.to_string()),
        national_id: fields.national_id,
        mobile: fields.mobile,
        platform_username: None,
    }
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Finds the first text node matching `predicate` and returns the trimmed
/// text of its nearest containing element.
fn text_search(document: &Html, predicate: impl Fn(&str) -> bool) -> Option<String> {
    for node in document.tree.nodes() {
        if let Node::Text(text) = node.value() {
            if predicate(&**text) {
                let mut parent = node.parent();
                while let Some(p) = parent {
                    if let Some(element) = ElementRef::wrap(p) {
                        let owned = element_text(&element);
                        if !owned.is_empty() {
                            return Some(owned);
                        }
                        break;
                    }
                    parent = p.parent();
                }
            }
        }
    }
    None
}
