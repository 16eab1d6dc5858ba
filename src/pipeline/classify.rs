use crate::types::track::SportKind;

/// Filename keywords, checked in order. First match wins.
const FILENAME_RULES: &[(&[&str], SportKind)] = &[
    (&["hike", "walk"], SportKind::Walking),
    (&["run"], SportKind::Running),
    (&["ride"], SportKind::Cycling),
];

/// Assigns an activity category from a declared sport string, falling back
/// to filename heuristics when nothing usable was declared. Never fails.
pub fn classify(declared: Option<&str>, filename: &str) -> SportKind {
    if let Some(declared) = declared.map(str::trim).filter(|s| !s.is_empty()) {
        if declared.eq_ignore_ascii_case("biking") {
            return SportKind::Cycling;
        }
        return declared.parse().unwrap_or(SportKind::Other);
    }

    classify_filename(filename)
}

fn classify_filename(filename: &str) -> SportKind {
    let stem = file_stem(filename).to_lowercase();
    let tokens: Vec<&str> = stem
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();
    let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
        return SportKind::Other;
    };

    for (keywords, sport) in FILENAME_RULES {
        if keywords.iter().any(|k| first == k || last == k) {
            return *sport;
        }
    }

    SportKind::Other
}

fn file_stem(filename: &str) -> &str {
    let base = filename
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(filename);
    match base.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => base,
    }
}
