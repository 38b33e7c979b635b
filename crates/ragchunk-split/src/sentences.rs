/// Byte spans of the sentences in `text`, covering it without gaps.
///
/// A sentence ends after `.`, `!` or `?` followed by whitespace; the whitespace
/// run belongs to the sentence it follows.
pub(crate) fn sentence_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') { continue; }
        let mut end = i + c.len_utf8();
        let mut saw_space = false;
        while let Some(&(j, w)) = chars.peek() {
            if !w.is_whitespace() { break; }
            saw_space = true;
            end = j + w.len_utf8();
            chars.next();
        }
        if saw_space {
            spans.push((start, end));
            start = end;
        }
    }
    if start < text.len() {
        match spans.last_mut() {
            Some(last) if text[start..].trim().is_empty() => last.1 = text.len(),
            _ => spans.push((start, text.len())),
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(text: &str) -> Vec<&str> { sentence_spans(text).into_iter().map(|(s, e)| &text[s..e]).collect() }

    #[test]
    fn spans_partition_the_text() {
        assert_eq!(texts("A. B. C."), vec!["A. ", "B. ", "C."]);
        assert_eq!(texts("  Lead in? Yes!\n\nNext"), vec!["  Lead in? ", "Yes!\n\n", "Next"]);
        assert_eq!(texts("No terminator"), vec!["No terminator"]);
        assert_eq!(texts("Version 1.2 shipped. Done."), vec!["Version 1.2 shipped. ", "Done."]);
    }
}
