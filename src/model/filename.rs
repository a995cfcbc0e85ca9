/// Maximum length of a derived filename stem
const MAX_STEM_LENGTH: usize = 50;

/// Derive a storage-safe filename stem from an entity title.
///
/// Pipeline: trim, spaces to hyphens, lowercase, collapse repeated hyphens,
/// strip everything outside `[a-z0-9-]`, bound the length, trim stray
/// hyphens and dots from the ends. An empty title yields an empty stem; the
/// storage collaborator decides what to do with that.
///
/// Stripping happens after the collapse pass, so characters removed by the
/// strip can leave a double hyphen behind ("rock & roll" becomes
/// "rock--roll"). Stems are stable identifiers; changing the order would
/// orphan existing storage paths.
pub fn filename_stem(title: &str) -> String {
    if title.is_empty() {
        return String::new();
    }

    let hyphenated = title.trim().replace(' ', "-").to_lowercase();
    let collapsed = collapse_hyphens(&hyphenated);

    let mut stem: String = collapsed
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect();

    // All remaining characters are single-byte, so this cannot split a char
    if stem.len() > MAX_STEM_LENGTH {
        stem.truncate(MAX_STEM_LENGTH);
    }

    stem.trim_matches(|c| c == '-' || c == '.').to_string()
}

/// Collapse runs of hyphens into a single hyphen
fn collapse_hyphens(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut last_was_hyphen = false;

    for c in s.chars() {
        if c == '-' {
            if !last_was_hyphen {
                result.push('-');
            }
            last_was_hyphen = true;
        } else {
            result.push(c);
            last_was_hyphen = false;
        }
    }

    result
}
