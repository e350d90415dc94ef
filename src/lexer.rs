//! Line-level tokenizing for assembly source.

/// Drop a trailing `; comment`.
pub fn strip_comment(line: &str) -> &str {
    match line.find(';') {
        Some(p) => &line[..p],
        None => line,
    }
}

/// Split one source line into uppercase tokens. Commas separate operands the
/// same way whitespace does, so `MOV RAM0,X` becomes `["MOV", "RAM0", "X"]`.
pub fn tokenize(line: &str) -> Vec<String> {
    strip_comment(line)
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_uppercase())
        .collect()
}

/// Parse a numeric literal: decimal (optionally negative), `0x`/`$` hex or
/// `0b` binary, each optionally behind a `#`.
pub fn parse_number(token: &str) -> Option<i64> {
    let t = token.trim();
    let t = t.strip_prefix('#').unwrap_or(t);
    let (negative, t) = match t.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, t),
    };
    let value = if let Some(hex) = t
        .strip_prefix("0X")
        .or_else(|| t.strip_prefix("0x"))
        .or_else(|| t.strip_prefix('$'))
    {
        i64::from_str_radix(hex, 16).ok()?
    } else if let Some(bin) = t.strip_prefix("0B").or_else(|| t.strip_prefix("0b")) {
        i64::from_str_radix(bin, 2).ok()?
    } else if !t.is_empty() && t.bytes().all(|b| b.is_ascii_digit()) {
        t.parse::<i64>().ok()?
    } else {
        return None;
    };
    Some(if negative { -value } else { value })
}
