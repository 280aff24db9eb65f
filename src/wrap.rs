//! Greedy word wrapping for node and field labels.

/// Wraps `text` into lines of at most `limit` characters joined by `separator`.
///
/// Lines break only at whitespace. A word longer than `limit` is kept whole on
/// its own line. Whitespace between two lines is dropped; whitespace inside a
/// line is kept as is. A line never spans a newline of the input.
pub fn wrap(text: &str, limit: usize, separator: &str) -> String {
    let limit = limit.max(1);
    let chars: Vec<char> = text.chars().collect();
    let mut lines: Vec<String> = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_whitespace() {
            i += 1;
            continue;
        }
        let word_end = chars[i..]
            .iter()
            .position(|c| c.is_whitespace())
            .map_or(chars.len(), |p| i + p);
        let end = if word_end - i >= limit {
            word_end
        } else {
            longest_line(&chars, i, limit).unwrap_or(word_end)
        };
        lines.push(chars[i..end].iter().collect());
        i = end;
    }
    lines.join(separator)
}

/// End of the longest line starting at `start` that fits into `limit` and is
/// followed by whitespace or the end of the text.
fn longest_line(chars: &[char], start: usize, limit: usize) -> Option<usize> {
    let max = chars.len().min(start + limit);
    let max = chars[start + 1..max]
        .iter()
        .position(|&c| c == '\n')
        .map_or(max, |p| start + 1 + p);
    (start + 1..=max)
        .rev()
        .find(|&end| end == chars.len() || chars[end].is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn simple_wrap() {
        assert_eq!(
            wrap("Lorem ipsum dolor sit amet", 10, "\n"),
            "Lorem\nipsum\ndolor sit\namet"
        );
    }

    #[test]
    fn unwrappable() {
        assert_eq!(
            wrap("Supercalifragilisticexpialidocious", 10, "\n"),
            "Supercalifragilisticexpialidocious"
        );
    }

    #[test]
    fn one_line() {
        assert_eq!(wrap("One line", 10, "\n"), "One line");
    }

    #[test]
    fn empty() {
        assert_eq!(wrap("", 10, "<br />"), "");
        assert_eq!(wrap("   ", 10, "<br />"), "");
    }

    #[test]
    fn single_letter_words() {
        assert_eq!(wrap("a", 10, "|"), "a");
        assert_eq!(wrap("a b c d e f", 3, "|"), "a b|c d|e f");
    }

    #[test]
    fn long_word_in_the_middle() {
        assert_eq!(
            wrap("see Supercalifragilistic here", 10, "<br />"),
            "see<br />Supercalifragilistic<br />here"
        );
    }

    #[test]
    fn does_not_cross_newlines() {
        assert_eq!(wrap("ab\ncd", 10, "|"), "ab|cd");
    }

    #[test]
    fn multibyte() {
        assert_eq!(
            wrap("Markus Krötzsch Denny Vrandečić", 15, "\n"),
            "Markus Krötzsch\nDenny Vrandečić"
        );
    }

    proptest! {
        #[test]
        fn lines_fit_unless_single_word(text in "[a-zé ]{0,60}", limit in 1usize..20) {
            let wrapped = wrap(&text, limit, "\n");
            for line in wrapped.split('\n') {
                let fits = line.chars().count() <= limit;
                let single_word = !line.contains(' ');
                prop_assert!(fits || single_word, "line {:?} over {}", line, limit);
            }
        }

        #[test]
        fn keeps_non_whitespace(text in "[a-z \u{e9}\u{3b1}]{0,60}", limit in 1usize..20) {
            let strip = |s: &str| s.chars().filter(|c| !c.is_whitespace()).collect::<String>();
            prop_assert_eq!(strip(&wrap(&text, limit, "|")).replace('|', ""), strip(&text));
        }
    }
}
