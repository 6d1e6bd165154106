use crate::template_ast::SourceRange;

#[derive(Debug, Clone, PartialEq)]
pub struct ScannedAttr<'a> {
    pub name: &'a str,
    pub value: Option<&'a str>,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    StartTag {
        name: &'a str,
        attrs: Vec<ScannedAttr<'a>>,
        self_closing: bool,
        range: SourceRange,
    },
    EndTag {
        name: &'a str,
        range: SourceRange,
    },
    Text {
        text: &'a str,
        range: SourceRange,
    },
    Comment {
        text: &'a str,
        range: SourceRange,
    },
    /// A `<tag ...` that never reaches `>`; kept as text by the parser.
    Malformed {
        text: &'a str,
        range: SourceRange,
    },
}

/// Elements whose content is never parsed as markup.
pub fn is_plain_text_element(tag: &str) -> bool {
    matches!(tag.to_ascii_lowercase().as_str(), "script" | "style" | "textarea")
}

/// Single-pass tokenizer over template markup.
pub struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    i: usize,
    raw_text_until: Option<&'a str>,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            i: 0,
            raw_text_until: None,
        }
    }

    fn starts_with(&self, pat: &str) -> bool {
        self.bytes[self.i..].starts_with(pat.as_bytes())
    }

    fn find_from(&self, pat: &str) -> Option<usize> {
        self.src[self.i..].find(pat).map(|p| self.i + p)
    }

    fn is_tag_start(&self, j: usize) -> bool {
        let b = self.bytes;
        if b[j] != b'<' || j + 1 >= b.len() {
            return false;
        }
        let next = b[j + 1];
        next.is_ascii_alphabetic()
            || next == b'!'
            || (next == b'/' && j + 2 < b.len() && b[j + 2].is_ascii_alphabetic())
    }

    fn raw_text(&mut self, tag: &'a str) -> Option<Token<'a>> {
        let start = self.i;
        let close = format!("</{}", tag.to_ascii_lowercase());
        let lower = self.src[start..].to_ascii_lowercase();
        let end = lower.find(&close).map(|p| start + p).unwrap_or(self.src.len());
        self.i = end;
        (end > start).then(|| Token::Text {
            text: &self.src[start..end],
            range: SourceRange::new(start, end),
        })
    }

    fn end_tag(&mut self) -> Token<'a> {
        let start = self.i;
        self.i += 2;
        let name = read_tag_name(self.src, &mut self.i);
        while self.i < self.bytes.len() && self.bytes[self.i] != b'>' {
            self.i += 1;
        }
        if self.i < self.bytes.len() {
            self.i += 1;
        }
        Token::EndTag {
            name,
            range: SourceRange::new(start, self.i),
        }
    }

    fn start_tag(&mut self) -> Token<'a> {
        let start = self.i;
        self.i += 1;
        let name = read_tag_name(self.src, &mut self.i);
        let mut attrs = Vec::new();
        let mut self_closing = false;

        loop {
            skip_ws(self.bytes, &mut self.i);
            if self.i >= self.bytes.len() {
                return Token::Malformed {
                    text: &self.src[start..],
                    range: SourceRange::new(start, self.src.len()),
                };
            }
            match self.bytes[self.i] {
                b'>' => {
                    self.i += 1;
                    break;
                }
                b'/' if self.bytes.get(self.i + 1) == Some(&b'>') => {
                    self.i += 2;
                    self_closing = true;
                    break;
                }
                b'/' => self.i += 1,
                _ => {
                    if let Some(attr) = read_attribute(self.src, &mut self.i) {
                        attrs.push(attr);
                    } else {
                        // skip unknown token
                        self.i += 1;
                    }
                }
            }
        }

        if !self_closing && is_plain_text_element(name) {
            self.raw_text_until = Some(name);
        }
        Token::StartTag {
            name,
            attrs,
            self_closing,
            range: SourceRange::new(start, self.i),
        }
    }

    fn text(&mut self) -> Token<'a> {
        let start = self.i;
        // a `<` that does not open a tag is plain text
        self.i += 1;
        while self.i < self.bytes.len() && !self.is_tag_start(self.i) {
            self.i += 1;
        }
        Token::Text {
            text: &self.src[start..self.i],
            range: SourceRange::new(start, self.i),
        }
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if let Some(tag) = self.raw_text_until.take() {
            if let Some(tok) = self.raw_text(tag) {
                return Some(tok);
            }
        }

        loop {
            if self.i >= self.bytes.len() {
                return None;
            }
            if self.bytes[self.i] != b'<' || !self.is_tag_start(self.i) {
                return Some(self.text());
            }

            if self.starts_with("<!--") {
                if let Some(end) = self.find_from("-->") {
                    let start = self.i;
                    self.i = end + 3;
                    return Some(Token::Comment {
                        text: &self.src[start + 4..end],
                        range: SourceRange::new(start, self.i),
                    });
                }
                return Some(self.text());
            }
            if self.starts_with("<![") {
                // conditional comment
                match self.find_from("]>") {
                    Some(end) => {
                        self.i = end + 2;
                        continue;
                    }
                    None => return Some(self.text()),
                }
            }
            if self.starts_with("<!") {
                // doctype and other declarations
                match self.find_from(">") {
                    Some(end) => {
                        self.i = end + 1;
                        continue;
                    }
                    None => return Some(self.text()),
                }
            }
            if self.starts_with("</") {
                return Some(self.end_tag());
            }
            return Some(self.start_tag());
        }
    }
}

fn skip_ws(bytes: &[u8], i: &mut usize) {
    while *i < bytes.len() && (bytes[*i] as char).is_whitespace() {
        *i += 1;
    }
}

fn read_tag_name<'a>(src: &'a str, i: &mut usize) -> &'a str {
    let bytes = src.as_bytes();
    let start = *i;
    while *i < bytes.len() {
        let c = bytes[*i] as char;
        if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ':' | '.') {
            *i += 1;
        } else {
            break;
        }
    }
    &src[start..*i]
}

fn is_attr_name_byte(b: u8) -> bool {
    !(b.is_ascii_whitespace() || matches!(b, b'"' | b'\'' | b'<' | b'>' | b'/' | b'='))
}

fn read_attribute<'a>(src: &'a str, i: &mut usize) -> Option<ScannedAttr<'a>> {
    let bytes = src.as_bytes();
    let name_start = *i;
    let mut bracket = 0i32;
    while *i < bytes.len() {
        let b = bytes[*i];
        // dynamic arguments may hold `=` or `/`: `:[a/b]`
        match b {
            b'[' => bracket += 1,
            b']' => bracket -= 1,
            _ => {}
        }
        if bracket > 0 && b != b'>' || is_attr_name_byte(b) {
            *i += 1;
        } else {
            break;
        }
    }
    if *i == name_start {
        return None;
    }
    let name = &src[name_start..*i];
    let mut end = *i;

    let mut j = *i;
    skip_ws(bytes, &mut j);
    let mut value = None;
    if j < bytes.len() && bytes[j] == b'=' {
        j += 1;
        skip_ws(bytes, &mut j);
        value = read_quoted(src, &mut j).or_else(|| read_unquoted(src, &mut j));
        *i = j;
        end = j;
    }

    Some(ScannedAttr {
        name,
        value,
        range: SourceRange::new(name_start, end),
    })
}

fn read_quoted<'a>(src: &'a str, i: &mut usize) -> Option<&'a str> {
    let bytes = src.as_bytes();
    if *i >= bytes.len() {
        return None;
    }
    let quote = bytes[*i];
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    *i += 1;
    let start = *i;
    while *i < bytes.len() && bytes[*i] != quote {
        *i += 1;
    }
    let s = &src[start..*i];
    if *i < bytes.len() {
        *i += 1;
    } // consume closing quote
    Some(s)
}

fn read_unquoted<'a>(src: &'a str, i: &mut usize) -> Option<&'a str> {
    let bytes = src.as_bytes();
    let start = *i;
    while *i < bytes.len() {
        let b = bytes[*i];
        if b.is_ascii_whitespace() || matches!(b, b'"' | b'\'' | b'=' | b'<' | b'>' | b'`') {
            break;
        }
        *i += 1;
    }
    (*i > start).then(|| &src[start..*i])
}
