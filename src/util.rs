//! Small utility helpers used across modules.

use rand::seq::SliceRandom;
use rand::Rng;

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Shuffle the letters of `word`.
///
/// Retries a few times when the shuffle lands on the original order, then
/// rotates by one. Words made of a single repeated letter come back unchanged.
pub fn scramble<R: Rng + ?Sized>(word: &str, rng: &mut R) -> String {
  let original: Vec<char> = word.chars().collect();
  let mut letters = original.clone();
  if letters.len() < 2 {
    return word.to_string();
  }
  for _ in 0..8 {
    letters.shuffle(rng);
    if letters != original {
      return letters.into_iter().collect();
    }
  }
  letters.rotate_left(1);
  letters.into_iter().collect()
}

/// "This <category> word has <N> letters".
pub fn word_hint(category: &str, word: &str) -> String {
  format!("This {} word has {} letters", category.to_lowercase(), word.chars().count())
}

/// Log-safe truncation for large strings.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.chars().count() <= max {
    s.to_string()
  } else {
    let head: String = s.chars().take(max).collect();
    format!("{}… ({} bytes total)", head, s.len())
  }
}
