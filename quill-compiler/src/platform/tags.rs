// Tag tables for the web platform.

const HTML_TAGS: &[&str] = &[
    "html", "body", "base", "head", "link", "meta", "style", "title", "address", "article", "aside",
    "footer", "header", "h1", "h2", "h3", "h4", "h5", "h6", "hgroup", "nav", "section", "div", "dd",
    "dl", "dt", "figcaption", "figure", "picture", "hr", "img", "li", "main", "ol", "p", "pre", "ul",
    "a", "b", "abbr", "bdi", "bdo", "br", "cite", "code", "data", "dfn", "em", "i", "kbd", "mark",
    "q", "rp", "rt", "rtc", "ruby", "s", "samp", "small", "span", "strong", "sub", "sup", "time",
    "u", "var", "wbr", "area", "audio", "map", "track", "video", "embed", "object", "param",
    "source", "canvas", "script", "noscript", "del", "ins", "caption", "col", "colgroup", "table",
    "thead", "tbody", "td", "th", "tr", "button", "datalist", "fieldset", "form", "input", "label",
    "legend", "meter", "optgroup", "option", "output", "progress", "select", "textarea", "details",
    "dialog", "menu", "menuitem", "summary", "content", "element", "shadow", "template",
    "blockquote", "iframe", "tfoot",
];

const SVG_TAGS: &[&str] = &[
    "svg", "animate", "circle", "clippath", "cursor", "defs", "desc", "ellipse", "filter",
    "font-face", "foreignobject", "g", "glyph", "image", "line", "marker", "mask", "missing-glyph",
    "path", "pattern", "polygon", "polyline", "rect", "switch", "symbol", "text", "textpath",
    "tspan", "use", "view",
];

const UNARY_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "frame", "hr", "img", "input", "isindex", "keygen", "link",
    "meta", "param", "source", "track", "wbr",
];

const LEFT_OPEN_TAGS: &[&str] = &[
    "colgroup", "dd", "dt", "li", "options", "p", "td", "tfoot", "th", "thead", "tr", "source",
];

const NON_PHRASING_TAGS: &[&str] = &[
    "address", "article", "aside", "base", "blockquote", "body", "caption", "col", "colgroup", "dd",
    "details", "dialog", "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form",
    "h1", "h2", "h3", "h4", "h5", "h6", "head", "header", "hgroup", "hr", "html", "legend", "li",
    "menuitem", "meta", "optgroup", "option", "param", "rp", "rt", "source", "style", "summary",
    "tbody", "td", "tfoot", "th", "thead", "title", "tr", "track",
];

const ACCEPT_VALUE: &[&str] = &["input", "textarea", "option", "select", "progress"];

fn contains(table: &[&str], tag: &str) -> bool {
    table.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

pub fn is_html_tag(tag: &str) -> bool {
    contains(HTML_TAGS, tag)
}

pub fn is_svg_tag(tag: &str) -> bool {
    contains(SVG_TAGS, tag)
}

pub fn is_reserved_tag(tag: &str) -> bool {
    is_html_tag(tag) || is_svg_tag(tag)
}

pub fn is_unary_tag(tag: &str) -> bool {
    contains(UNARY_TAGS, tag)
}

pub fn can_be_left_open_tag(tag: &str) -> bool {
    contains(LEFT_OPEN_TAGS, tag)
}

pub fn is_non_phrasing_tag(tag: &str) -> bool {
    contains(NON_PHRASING_TAGS, tag)
}

pub fn is_pre_tag(tag: &str) -> bool {
    tag == "pre"
}

pub fn must_use_prop(tag: &str, ty: Option<&str>, attr: &str) -> bool {
    (attr == "value" && contains(ACCEPT_VALUE, tag) && ty != Some("button"))
        || (attr == "selected" && tag == "option")
        || (attr == "checked" && tag == "input")
        || (attr == "muted" && tag == "video")
}

pub fn get_tag_namespace(tag: &str) -> Option<&'static str> {
    if is_svg_tag(tag) {
        Some("svg")
    } else if tag == "math" {
        Some("math")
    } else {
        None
    }
}
