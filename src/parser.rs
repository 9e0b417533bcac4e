use once_cell::sync::Lazy;
use regex::Regex;

static LOCATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Location:\s*(\S+)").unwrap());
static PAGE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Page:\s*(\S+)").unwrap());
static AUTHOR_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^By:\s*").unwrap());

/// Location/page info parsed out of an annotation header like
/// "Yellow highlight | Page: 56, Location: 1234".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationHeader {
    pub location: Option<String>,
    pub page: Option<String>,
}

pub fn parse_annotation_header(header: &str) -> AnnotationHeader {
    AnnotationHeader {
        location: capture_token(&LOCATION_RE, header),
        page: capture_token(&PAGE_RE, header),
    }
}

fn capture_token(re: &Regex, header: &str) -> Option<String> {
    re.captures(header)
        .and_then(|caps| caps.get(1))
        // tokens come out of a comma-separated header
        .map(|m| m.as_str().trim_end_matches(',').to_string())
        .filter(|s| !s.is_empty())
}

pub fn clean_author(raw: &str) -> String {
    AUTHOR_PREFIX_RE.replace(raw.trim(), "").to_string()
}
