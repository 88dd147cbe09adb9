/// Markdown heading marker the prompt asks the model to put before each section.
pub const SECTION_DELIMITER: &str = "###";

pub const SECTION_NOT_FOUND: &str = "Section not found in the response.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractedSection {
    pub label: String,
    pub body: String,
}

/// Finds the first reply segment that mentions `label` and returns its body.
///
/// The reply is split on [`SECTION_DELIMITER`]. Text before the first delimiter
/// has no heading, so it is returned whole. Every later segment starts with its
/// heading line: the heading itself is dropped, but text that follows the label
/// on that line (`### Definition: a positive quality`) is kept as the first
/// line of the body. Matching is a case-sensitive substring check and the first
/// hit wins.
pub fn extract_section(reply: &str, label: &str) -> Option<ExtractedSection> {
    reply
        .split(SECTION_DELIMITER)
        .enumerate()
        .find(|(_, segment)| segment.contains(label))
        .map(|(idx, segment)| ExtractedSection {
            label: label.to_string(),
            body: if idx == 0 {
                segment.trim().to_string()
            } else {
                segment_body(segment, label)
            },
        })
}

fn segment_body(segment: &str, label: &str) -> String {
    let (heading, rest) = segment.split_once('\n').unwrap_or((segment, ""));
    let inline = heading
        .split_once(label)
        .map(|(_, after)| {
            after.trim_start_matches(|c: char| matches!(c, '*' | ':') || c.is_whitespace())
        })
        .unwrap_or("")
        .trim();
    let rest = rest.trim();

    match (inline.is_empty(), rest.is_empty()) {
        (true, _) => rest.to_string(),
        (false, true) => inline.to_string(),
        (false, false) => format!("{inline}\n{rest}"),
    }
}

pub fn section_or_sentinel(reply: &str, label: &str) -> String {
    extract_section(reply, label)
        .map(|section| section.body)
        .unwrap_or_else(|| SECTION_NOT_FOUND.to_string())
}
