//! Any-token / any-field substring matching.
//!
//! Used to narrow proximity candidates that an index-backed query cannot text
//! filter, and by typeahead. Recall is favoured over precision: one matching
//! token in one field is enough.

/// True when any whitespace token of `query` is a case-insensitive substring of
/// any present field. An empty or blank query matches everything.
pub fn matches(query: &str, fields: &[Option<&str>]) -> bool {
    let tokens = tokenize(query);
    if tokens.is_empty() {
        return true;
    }

    let haystacks: Vec<String> = fields.iter().flatten().map(|f| f.to_lowercase()).collect();
    tokens
        .iter()
        .any(|token| haystacks.iter().any(|field| field.contains(token.as_str())))
}

/// Lowercased whitespace tokens of a query.
pub fn tokenize(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_lowercase).collect()
}
