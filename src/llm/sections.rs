#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Highlights,
    Insights,
    Recommendations,
    Motivation,
}

const HEADER_KEYWORDS: &[(&str, Section)] = &[
    ("highlight", Section::Highlights),
    ("insight", Section::Insights),
    ("recommendation", Section::Recommendations),
    ("motivation", Section::Motivation),
];

/// Sections found in a free-text coaching reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSections {
    pub highlights: Vec<String>,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub motivation: Option<String>,
}

impl ParsedSections {
    /// A reply without insights and recommendations is unusable.
    pub fn is_usable(&self) -> bool {
        !self.insights.is_empty() || !self.recommendations.is_empty()
    }
}

/// Splits a reply into sections by scanning for header lines.
///
/// A header is a short line (at most four words once markdown decoration is
/// removed) containing one of the section keywords, matched
/// case-insensitively. Text before the first header is dropped. List bullets
/// and numbering are stripped from entries.
pub fn parse_sections(text: &str) -> ParsedSections {
    let mut parsed = ParsedSections::default();
    let mut current: Option<Section> = None;
    let mut motivation: Vec<String> = Vec::new();

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(section) = header(line) {
            current = Some(section);
            continue;
        }
        let entry = strip_bullet(line);
        if entry.is_empty() {
            continue;
        }
        match current {
            Some(Section::Highlights) => parsed.highlights.push(entry.to_string()),
            Some(Section::Insights) => parsed.insights.push(entry.to_string()),
            Some(Section::Recommendations) => parsed.recommendations.push(entry.to_string()),
            Some(Section::Motivation) => motivation.push(entry.to_string()),
            None => {}
        }
    }

    if !motivation.is_empty() {
        parsed.motivation = Some(motivation.join(" "));
    }
    parsed
}

fn header(line: &str) -> Option<Section> {
    let normalized = line
        .trim_start_matches(|c: char| c == '#' || c == '*' || c == '_' || c.is_whitespace())
        .trim_end_matches(|c: char| c == ':' || c == '*' || c == '_' || c.is_whitespace())
        .to_lowercase();
    if normalized.is_empty() || normalized.split_whitespace().count() > 4 {
        return None;
    }
    // "Recommendations: do X" is content, not a header
    if line.contains(':') && !line.trim_end_matches(['*', '_']).trim_end().ends_with(':') {
        return None;
    }
    HEADER_KEYWORDS
        .iter()
        .find(|(keyword, _)| normalized.contains(keyword))
        .map(|(_, section)| *section)
}

/// Removes one list marker (`-`, `*`, `•` or `+` followed by whitespace) and
/// any `1.` / `1)` numbering. Markdown emphasis such as `**bold**` is content.
fn strip_bullet(line: &str) -> &str {
    let line = line.trim();
    let line = ['-', '*', '•', '+']
        .iter()
        .find_map(|marker| {
            line.strip_prefix(*marker)
                .filter(|rest| rest.starts_with(char::is_whitespace))
        })
        .map_or(line, str::trim_start);
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(stripped) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return stripped.trim();
        }
    }
    line.trim()
}

/// The outermost `[...]` in a reply, tolerating code fences and prose around it.
pub fn json_array_slice(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}
