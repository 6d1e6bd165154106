/// Decodes the entity references allowed in attribute values.
pub fn decode_attr(value: &str, keep_newlines: bool) -> String {
    decode(value, |name| match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "amp" => Some('&'),
        "#39" => Some('\''),
        "#10" if keep_newlines => Some('\n'),
        "#9" if keep_newlines => Some('\t'),
        _ => None,
    })
}

/// Decodes text content: named entities from a small table plus numeric
/// references.
pub fn decode_html(text: &str) -> String {
    decode(text, |name| match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "amp" => Some('&'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => numeric(name),
    })
}

fn numeric(name: &str) -> Option<char> {
    let digits = name.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<u32>().ok()?,
    };
    char::from_u32(code)
}

fn decode(input: &str, lookup: impl Fn(&str) -> Option<char>) -> String {
    if !input.contains('&') {
        return input.to_string();
    }
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let decoded = after
            .find(';')
            .filter(|&semi| semi > 0 && semi <= 10)
            .and_then(|semi| lookup(&after[..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &after[semi + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
