/// The maximum length of a message in characters.
pub const MAX_MESSAGE_LEN: usize = 2000;

/// Trims `text` and shortens it to at most `max_len` characters by
/// replacing its middle with `...`.
pub fn trim_text(text: &str, max_len: usize) -> String {
    let text = text.trim();

    let len = text.chars().count();
    if len <= max_len {
        return text.to_owned();
    }

    let head = max_len / 2 - 3;
    let tail = max_len / 2 - 2;

    let mut buf: String = text.chars().take(head).collect();
    buf.push_str("\n...\n");
    buf.extend(text.chars().skip(len - tail));
    buf
}

/// Removes the bot token and defuses mass mentions in outgoing content.
pub fn sanitize(content: &str, token: &str) -> String {
    let content = if token.is_empty() {
        content.to_owned()
    } else {
        content.replace(token, "TOKEN_LEAKED")
    };

    content
        .replace("@everyone", "@\u{200b}everyone")
        .replace("@here", "@\u{200b}here")
}

/// Returns the last `lines` lines of `text`.
pub fn last_lines(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().collect();
    let start = all.len().saturating_sub(lines);

    all[start..].join("\n")
}
