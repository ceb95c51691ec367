//! Inline link rewriting
//!
//! Some publishing platforms drop link targets and only keep link titles, which
//! they then turn into footnotes. Rewriting `[text](url)` to
//! `[text](url "text")` gives every link such a title.

/// Hosts whose links are kept as plain links
const KEEP_HOSTS: &[&str] = &["mp.weixin.qq.com"];

/// Rewrite every plain inline link in `line` to carry its text as title
///
/// Image links (`![..](..)`), links with an empty target and links that already
/// have a title are left alone, which makes the rewrite idempotent.
///
/// # Returns
/// * `(String, usize)` - The rewritten line and the number of links changed
pub fn footnote_links(line: &str) -> (String, usize) {
    let mut output = String::with_capacity(line.len());
    let mut count = 0;
    let mut rest = line;

    // `rest` always starts right after a `[` or a `)`, never after a `!`
    while let Some(open) = rest.find('[') {
        let is_image = rest[..open].ends_with('!');

        let Some(link) = InlineLink::scan(&rest[open..]) else {
            // Not a link: keep the bracket and look for the next one
            output.push_str(&rest[..=open]);
            rest = &rest[open + 1..];
            continue;
        };

        output.push_str(&rest[..open]);
        if is_image || !link.wants_title() {
            output.push_str(&rest[open..open + link.len]);
        } else {
            output.push_str(&format!(
                "[{}]({} \"{}\")",
                link.text,
                link.url,
                link.text.replace('"', "'")
            ));
            count += 1;
        }
        rest = &rest[open + link.len..];
    }
    output.push_str(rest);

    (output, count)
}

/// A `[text](url)` occurrence at the start of a string slice
struct InlineLink<'a> {
    text: &'a str,
    url: &'a str,
    /// Byte length of the whole `[text](url)` span
    len: usize,
}

impl<'a> InlineLink<'a> {
    /// Recognise a link starting at `s[0] == '['`
    fn scan(s: &'a str) -> Option<Self> {
        let body = s.strip_prefix('[')?;
        let close = body.find(']')?;
        let text = &body[..close];
        if text.contains('[') {
            // `[a [b](c)`: the link starts at the inner bracket
            return None;
        }
        let target = body[close + 1..].strip_prefix('(')?;
        let end = target.find(')')?;
        let url = &target[..end];
        // '[' + text + ']' + '(' + url + ')'
        let len = 1 + close + 2 + end + 1;
        Some(Self { text, url, len })
    }

    fn wants_title(&self) -> bool {
        !self.text.is_empty()
            && !self.url.is_empty()
            && !self.url.contains(char::is_whitespace)
            && !KEEP_HOSTS.iter().any(|host| self.url.contains(host))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_link_gets_title() {
        let (line, count) = footnote_links("see [the docs](https://docs.rs) for more");
        assert_eq!(
            line,
            "see [the docs](https://docs.rs \"the docs\") for more"
        );
        assert_eq!(count, 1);
    }

    #[test]
    fn test_image_link_is_skipped() {
        let input = "![figure](https://x.com/a.png) and [link](https://x.com)";
        let (line, count) = footnote_links(input);
        assert_eq!(
            line,
            "![figure](https://x.com/a.png) and [link](https://x.com \"link\")"
        );
        assert_eq!(count, 1);
    }

    #[test]
    fn test_link_at_line_start() {
        let (line, count) = footnote_links("[a](b)");
        assert_eq!(line, "[a](b \"a\")");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let (once, first) = footnote_links("[a](https://a.com) and [b](https://b.com)");
        let (twice, second) = footnote_links(&once);
        assert_eq!(first, 2);
        assert_eq!(second, 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_wechat_links_are_kept() {
        let input = "[post](https://mp.weixin.qq.com/s/abc)";
        assert_eq!(footnote_links(input), (input.to_string(), 0));
    }

    #[test]
    fn test_non_links_are_untouched() {
        for input in [
            "array[0] = 1",
            "[unclosed](paren",
            "[text] (space before paren)",
            "[](empty-text)",
            "[empty-url]()",
            "no brackets at all",
            "数组[下标](链接",
        ] {
            assert_eq!(footnote_links(input), (input.to_string(), 0), "{}", input);
        }
    }

    #[test]
    fn test_nested_bracket_finds_inner_link() {
        let (line, count) = footnote_links("[note [x](y)");
        assert_eq!(line, "[note [x](y \"x\")");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_multibyte_text() {
        let (line, count) = footnote_links("参见[文档](https://example.com)。");
        assert_eq!(line, "参见[文档](https://example.com \"文档\")。");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_quote_in_text_does_not_break_title() {
        let (line, _) = footnote_links("[say \"hi\"](u)");
        assert_eq!(line, "[say \"hi\"](u \"say 'hi'\")");
    }
}
