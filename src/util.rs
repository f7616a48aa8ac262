//! Small utility helpers used across modules.

/// Canonical form of a free-text answer: lower-case, periods and commas
/// removed, hyphens turned into spaces, whitespace collapsed and trimmed.
pub fn normalize_answer(s: &str) -> String {
  let cleaned: String = s
    .to_lowercase()
    .chars()
    .filter(|c| *c != '.' && *c != ',')
    .map(|c| if c == '-' { ' ' } else { c })
    .collect();
  cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Log-safe truncation for learner input.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  match s.char_indices().nth(max) {
    None => s.to_string(),
    Some((cut, _)) => format!("{}… ({} bytes total)", &s[..cut], s.len()),
  }
}
