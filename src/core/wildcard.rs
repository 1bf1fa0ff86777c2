//! Pre-parse wildcard resolution: `__name__` → one drawn candidate.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::schema::table::WildcardTable;

/// Characters allowed inside a `__name__` token.
fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, ',' | '_' | '(' | ')' | '/' | '-')
}

/// Resolve every `__name__` wildcard in `text` against `table`, repeating
/// whole passes until the output stops changing.
///
/// Candidates may themselves contain wildcards; the fixpoint loop resolves
/// those on the next pass, and every occurrence draws independently, so one
/// wildcard appearing twice may resolve to two different candidates. Unknown
/// names — and names whose candidate list is empty — are left as literal
/// text: partial tables are an expected operating condition, not an error.
///
/// No pass limit is enforced. A table whose candidates reintroduce the
/// wildcard that produced them never reaches a fixpoint; keeping tables
/// acyclic is the caller's responsibility.
pub fn resolve(text: &str, table: &WildcardTable, rng: &mut StdRng) -> String {
    let mut current = text.to_string();
    loop {
        let next = resolve_pass(&current, table, rng);
        if next == current {
            return next;
        }
        current = next;
    }
}

/// One non-overlapping scan-and-replace pass. Replacement text is not
/// rescanned until the next pass.
fn resolve_pass(text: &str, table: &WildcardTable, rng: &mut StdRng) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        match match_wildcard(&chars, i) {
            Some(end) => {
                let token: String = chars[i..end].iter().collect();
                let name = token.trim_matches('_');
                match table.get(name).and_then(|candidates| candidates.choose(rng)) {
                    Some(candidate) => out.push_str(candidate),
                    None => out.push_str(&token),
                }
                i = end;
            }
            None => {
                out.push(chars[i]);
                i += 1;
            }
        }
    }

    out
}

/// Try to match a `__name__` token starting at `start`, returning the index
/// one past its end.
///
/// Underscores are themselves name characters, so matching is greedy: the
/// token runs to the last `__` inside the maximal name-char run. `__a__b__`
/// is one token (name `a__b`), while `__a__x` matches only `__a__`.
fn match_wildcard(chars: &[char], start: usize) -> Option<usize> {
    if chars.get(start) != Some(&'_') || chars.get(start + 1) != Some(&'_') {
        return None;
    }

    let mut run_end = start + 2;
    while run_end < chars.len() && is_name_char(chars[run_end]) {
        run_end += 1;
    }

    // Closing `__` with at least one name char between the delimiters.
    let mut k = run_end.saturating_sub(2);
    while k >= start + 3 {
        if chars[k] == '_' && chars[k + 1] == '_' {
            return Some(k + 2);
        }
        k -= 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn table(entries: &[(&str, &[&str])]) -> WildcardTable {
        let mut t = WildcardTable::new();
        for (name, candidates) in entries {
            t.insert(
                name.to_string(),
                candidates.iter().map(|s| s.to_string()).collect(),
            );
        }
        t
    }

    #[test]
    fn clean_text_is_unchanged() {
        let t = table(&[("color", &["red"])]);
        assert_eq!(resolve("plain text, no tokens", &t, &mut rng()), "plain text, no tokens");
    }

    #[test]
    fn single_candidate_resolves() {
        let t = table(&[("color", &["red"])]);
        assert_eq!(resolve("__color__ hair", &t, &mut rng()), "red hair");
    }

    #[test]
    fn draw_comes_from_candidate_list() {
        let t = table(&[("color", &["red", "blue"])]);
        let result = resolve("__color__ hair", &t, &mut rng());
        assert!(result == "red hair" || result == "blue hair", "got: {}", result);
    }

    #[test]
    fn unknown_name_falls_back_to_literal() {
        let t = WildcardTable::new();
        assert_eq!(resolve("__missing__", &t, &mut rng()), "__missing__");
    }

    #[test]
    fn empty_candidate_list_falls_back_to_literal() {
        let t = table(&[("hollow", &[])]);
        assert_eq!(resolve("__hollow__", &t, &mut rng()), "__hollow__");
    }

    #[test]
    fn nested_candidates_resolve_to_fixpoint() {
        let t = table(&[("outfit", &["__color__ dress"]), ("color", &["red"])]);
        assert_eq!(resolve("a __outfit__", &t, &mut rng()), "a red dress");
    }

    #[test]
    fn repeated_wildcard_draws_independently() {
        let t = table(&[("color", &["red", "blue"])]);
        let result = resolve("__color__/__color__", &t, &mut rng());
        let parts: Vec<&str> = result.split('/').collect();
        assert_eq!(parts.len(), 2);
        for part in parts {
            assert!(part == "red" || part == "blue", "got: {}", result);
        }
    }

    #[test]
    fn path_like_names_resolve() {
        let t = table(&[("cloth/dress-style", &["gown"])]);
        assert_eq!(resolve("__cloth/dress-style__", &t, &mut rng()), "gown");
    }

    #[test]
    fn greedy_match_spans_inner_underscores() {
        let t = table(&[("a__b", &["X"])]);
        assert_eq!(resolve("__a__b__", &t, &mut rng()), "X");
    }

    #[test]
    fn token_closes_at_last_double_underscore() {
        let t = table(&[("a", &["A"])]);
        assert_eq!(resolve("__a__x", &t, &mut rng()), "Ax");
    }

    #[test]
    fn bare_underscores_are_not_a_token() {
        let t = table(&[("", &["nope"])]);
        assert_eq!(resolve("____", &t, &mut rng()), "____");
    }

    #[test]
    fn token_cannot_cross_whitespace() {
        let t = table(&[("a b", &["nope"])]);
        assert_eq!(resolve("__a b__", &t, &mut rng()), "__a b__");
    }
}
