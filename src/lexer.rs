/// Everything from this character to the end of the line is ignored.
pub const COMMENT_CHAR: char = '#';

/// Strip the trailing comment (if any) from a raw source line.
pub fn strip_comment(line: &str) -> &str {
    match line.find(COMMENT_CHAR) {
        Some(p) => &line[..p],
        None => line,
    }
}

/// Split one source line into tokens.
///
/// Whitespace separates tokens and every comma is a token of its own, so
/// `A 1, 2` yields `["A", "1", ",", "2"]`. Blank and comment-only lines
/// yield an empty vector.
pub fn tokenize(line: &str) -> Vec<&str> {
    let mut out = Vec::new();
    for word in strip_comment(line).split_whitespace() {
        let mut rest = word;
        while let Some(p) = rest.find(',') {
            if p > 0 {
                out.push(&rest[..p]);
            }
            out.push(",");
            rest = &rest[p + 1..];
        }
        if !rest.is_empty() {
            out.push(rest);
        }
    }
    out
}
