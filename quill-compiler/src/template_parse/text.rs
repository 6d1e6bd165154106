use crate::options::Delimiters;
use crate::template_ast::TextToken;
use crate::template_codegen::string_lit;

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedText {
    /// Concatenation expression, e.g. `"Hello "+_s(name)`.
    pub expression: String,
    pub tokens: Vec<TextToken>,
}

/// Splits text on interpolation delimiters. Returns `None` when the text
/// holds no complete interpolation.
pub fn parse_text(text: &str, delimiters: &Delimiters) -> Option<ParsedText> {
    let (open, close) = (delimiters.open.as_str(), delimiters.close.as_str());
    if open.is_empty() || close.is_empty() || !text.contains(open) {
        return None;
    }

    let mut code: Vec<String> = Vec::new();
    let mut tokens: Vec<TextToken> = Vec::new();
    let mut has_binding = false;
    let mut last = 0usize;
    let mut pos = 0usize;

    while let Some(i) = text[pos..].find(open) {
        let start = pos + i;
        let inner_start = start + open.len();
        let Some(j) = text[inner_start..].find(close) else {
            break;
        };
        let inner_end = inner_start + j;
        let exp = text[inner_start..inner_end].trim();
        if exp.is_empty() {
            pos = inner_end + close.len();
            continue;
        }
        if start > last {
            let lit = &text[last..start];
            code.push(string_lit(lit));
            tokens.push(TextToken::Literal(lit.to_string()));
        }
        code.push(format!("_s({exp})"));
        tokens.push(TextToken::Binding(exp.to_string()));
        has_binding = true;
        last = inner_end + close.len();
        pos = last;
    }

    if !has_binding {
        return None;
    }
    if last < text.len() {
        let lit = &text[last..];
        code.push(string_lit(lit));
        tokens.push(TextToken::Literal(lit.to_string()));
    }
    Some(ParsedText {
        expression: code.join("+"),
        tokens,
    })
}

pub fn has_interpolation(text: &str, delimiters: &Delimiters) -> bool {
    parse_text(text, delimiters).is_some()
}

/// Offset of an opening delimiter that is never closed.
pub fn find_unterminated(text: &str, delimiters: &Delimiters) -> Option<usize> {
    let (open, close) = (delimiters.open.as_str(), delimiters.close.as_str());
    if open.is_empty() || close.is_empty() {
        return None;
    }
    let mut pos = 0usize;
    loop {
        let start = pos + text[pos..].find(open)?;
        let inner = start + open.len();
        match text[inner..].find(close) {
            Some(j) => pos = inner + j + close.len(),
            None => return Some(start),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_literals_and_bindings() {
        let parsed = parse_text("Hello {{ name }}!", &Delimiters::default()).unwrap();
        assert_eq!(parsed.expression, r#""Hello "+_s(name)+"!""#);
        assert_eq!(
            parsed.tokens,
            vec![
                TextToken::Literal("Hello ".into()),
                TextToken::Binding("name".into()),
                TextToken::Literal("!".into()),
            ]
        );
    }

    #[test]
    fn plain_text_is_not_parsed() {
        assert!(parse_text("just text", &Delimiters::default()).is_none());
        assert!(parse_text("{{ open", &Delimiters::default()).is_none());
    }

    #[test]
    fn custom_delimiters() {
        let d = Delimiters::new("${", "}");
        let parsed = parse_text("${a}${b}", &d).unwrap();
        assert_eq!(parsed.expression, "_s(a)+_s(b)");
    }

    #[test]
    fn unterminated_offset() {
        let d = Delimiters::default();
        assert_eq!(find_unterminated("a {{ b }} c {{ d", &d), Some(12));
        assert_eq!(find_unterminated("a {{ b }}", &d), None);
    }
}
