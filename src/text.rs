use std::collections::HashSet;

/// Canonical form of a keyword: trimmed, with every run of separators
/// collapsed to one space. Separators are Unicode whitespace plus the ASCII
/// information separators U+001C..=U+001F.
pub fn normalize(value: &str) -> String {
    value
        .split(is_separator)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn tokenize(value: &str) -> Vec<String> {
    normalize(value)
        .split(' ')
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn token_count(value: &str) -> usize {
    normalize(value).split(' ').filter(|token| !token.is_empty()).count()
}

pub fn unique_ordered<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for item in items {
        let item = item.into();
        if seen.insert(item.clone()) {
            out.push(item);
        }
    }
    out
}

fn is_separator(ch: char) -> bool {
    ch.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&ch)
}
