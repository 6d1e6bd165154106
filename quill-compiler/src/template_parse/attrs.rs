use crate::template_ast::ForLoop;

/// `v-`, `:`, `@` and `#` attributes are directives; everything else is a
/// plain attribute.
pub fn is_directive_attr(name: &str) -> bool {
    name.starts_with("v-") || name.starts_with(':') || name.starts_with('@') || name.starts_with('#')
}

/// Splits `name.mod1.mod2` into the name and its modifiers. Dots inside a
/// dynamic argument (`:[a.b].prop`) belong to the name.
pub fn split_modifiers(name: &str) -> (&str, Vec<String>) {
    let search_from = name.rfind(']').map(|i| i + 1).unwrap_or(0);
    match name[search_from..].find('.') {
        Some(dot) => {
            let cut = search_from + dot;
            let modifiers = name[cut + 1..]
                .split('.')
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .collect();
            (&name[..cut], modifiers)
        }
        None => (name, Vec::new()),
    }
}

/// `[expr]` → `(expr, true)`; anything else is a literal argument.
pub fn dynamic_arg(arg: &str) -> (&str, bool) {
    match arg.strip_prefix('[').and_then(|a| a.strip_suffix(']')) {
        Some(inner) => (inner.trim(), true),
        None => (arg, false),
    }
}

/// `foo-bar` → `fooBar`
pub fn camelize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper = false;
    for c in s.chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    if upper {
        out.push('-');
    }
    out
}

/// Parses `alias in source`, `(item, index) of list` and destructured
/// aliases such as `{ a, b } in list`.
pub fn parse_for(exp: &str) -> Option<ForLoop> {
    let (alias_part, source) = split_in_of(exp)?;
    let source = source.trim();
    let alias_part = alias_part.trim();
    let alias_part = alias_part
        .strip_prefix('(')
        .and_then(|a| a.strip_suffix(')'))
        .unwrap_or(alias_part);

    let mut parts = split_top_level_commas(alias_part).into_iter().map(str::trim);
    let alias = parts.next().filter(|a| !a.is_empty())?;
    if source.is_empty() {
        return None;
    }
    let iterator1 = parts.next().filter(|s| !s.is_empty()).map(str::to_string);
    let iterator2 = parts.next().filter(|s| !s.is_empty()).map(str::to_string);

    Some(ForLoop {
        source: source.to_string(),
        alias: alias.to_string(),
        iterator1,
        iterator2,
    })
}

/// First ` in ` / ` of ` separator surrounded by whitespace.
fn split_in_of(exp: &str) -> Option<(&str, &str)> {
    let bytes = exp.as_bytes();
    let mut i = 1;
    while i + 3 < bytes.len() {
        let word = &bytes[i..i + 2];
        if (word == b"in" || word == b"of")
            && bytes[i - 1].is_ascii_whitespace()
            && bytes[i + 2].is_ascii_whitespace()
        {
            return Some((&exp[..i - 1], &exp[i + 2..]));
        }
        i += 1;
    }
    None
}

fn split_top_level_commas(s: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '{' | '[' | '(' => depth += 1,
            '}' | ']' | ')' => depth -= 1,
            ',' if depth == 0 => {
                out.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(&s[start..]);
    out
}
