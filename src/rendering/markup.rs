//! Tolerant tokenizer for SVG markup.
//!
//! Splits text into tags, text and comments without requiring well-formed
//! XML. Quoted attribute values may contain `>`, and whitespace is allowed
//! around `=`. A construct cut off by the end of input ends the stream.

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Attribute<'a> {
    pub name: &'a str,
    /// Value without its quotes, `None` for a bare attribute name
    pub value: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StartTag<'a> {
    pub name: &'a str,
    /// Byte offset just past the tag name
    pub name_end: usize,
    pub attributes: Vec<Attribute<'a>>,
    pub self_closing: bool,
}

impl StartTag<'_> {
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token<'a> {
    Text(&'a str),
    StartTag(StartTag<'a>),
    EndTag(&'a str),
    /// Comment or CDATA section, including its delimiters
    Verbatim(&'a str),
    /// XML declaration, doctype or processing instruction
    Declaration,
    /// A `<` that does not open any markup
    StrayLt,
}

pub(crate) struct Tokenizer<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    /// Consume up to and including `terminator`
    fn take_through(&mut self, terminator: &str) -> Option<&'a str> {
        let rest = self.rest();
        let end = rest.find(terminator)? + terminator.len();
        self.pos += end;
        Some(&rest[..end])
    }

    /// `<!DOCTYPE ...>` and friends, which may carry an internal `[...]` subset
    fn declaration(&mut self) -> Option<Token<'a>> {
        let bytes = self.rest().as_bytes();
        let mut quote = None;
        let mut depth = 0usize;

        for (i, &b) in bytes.iter().enumerate().skip(2) {
            match quote {
                Some(q) if b == q => quote = None,
                Some(_) => {}
                None => match b {
                    b'"' | b'\'' => quote = Some(b),
                    b'[' => depth += 1,
                    b']' => depth = depth.saturating_sub(1),
                    b'>' if depth == 0 => {
                        self.pos += i + 1;
                        return Some(Token::Declaration);
                    }
                    _ => {}
                },
            }
        }
        None
    }

    fn end_tag(&mut self) -> Option<Token<'a>> {
        let after = &self.rest()[2..];
        let name_len = tag_name_length(after);
        if name_len == 0 {
            self.pos += 1;
            return Some(Token::StrayLt);
        }

        let close = after[name_len..].find('>')?;
        self.pos += 2 + name_len + close + 1;
        Some(Token::EndTag(&after[..name_len]))
    }

    fn start_tag(&mut self) -> Option<Token<'a>> {
        let start = self.pos;
        let name_len = tag_name_length(&self.text[start + 1..]);
        if name_len == 0 {
            self.pos += 1;
            return Some(Token::StrayLt);
        }

        let name_end = start + 1 + name_len;
        let mut tag = StartTag {
            name: &self.text[start + 1..name_end],
            name_end,
            attributes: Vec::new(),
            self_closing: false,
        };

        let bytes = self.text.as_bytes();
        let mut cursor = name_end;
        loop {
            cursor = skip_whitespace(bytes, cursor);
            match *bytes.get(cursor)? {
                b'>' => {
                    self.pos = cursor + 1;
                    return Some(Token::StartTag(tag));
                }
                b'/' if bytes.get(cursor + 1) == Some(&b'>') => {
                    tag.self_closing = true;
                    self.pos = cursor + 2;
                    return Some(Token::StartTag(tag));
                }
                _ => {
                    let (attribute, next) = self.attribute(cursor)?;
                    tag.attributes.extend(attribute);
                    cursor = next;
                }
            }
        }
    }

    /// One attribute starting at `start`, plus the offset after it.
    /// Junk between attributes is skipped and yields `None`.
    fn attribute(&self, start: usize) -> Option<(Option<Attribute<'a>>, usize)> {
        let bytes = self.text.as_bytes();
        let name_len = attribute_name_length(&self.text[start..]);

        if name_len == 0 {
            return match bytes[start] {
                q @ (b'"' | b'\'') => {
                    let len = self.text[start + 1..].find(q as char)?;
                    Some((None, start + len + 2))
                }
                _ => Some((None, start + 1)),
            };
        }

        let name = &self.text[start..start + name_len];
        let mut cursor = skip_whitespace(bytes, start + name_len);
        if bytes.get(cursor) != Some(&b'=') {
            return Some((Some(Attribute { name, value: None }), start + name_len));
        }

        cursor = skip_whitespace(bytes, cursor + 1);
        let (value, next) = match *bytes.get(cursor)? {
            q @ (b'"' | b'\'') => {
                let len = self.text[cursor + 1..].find(q as char)?;
                (&self.text[cursor + 1..cursor + 1 + len], cursor + len + 2)
            }
            _ => {
                let len = unquoted_value_length(&bytes[cursor..]);
                (&self.text[cursor..cursor + len], cursor + len)
            }
        };

        Some((
            Some(Attribute {
                name,
                value: Some(value),
            }),
            next,
        ))
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let rest = self.rest();
        if rest.is_empty() {
            return None;
        }

        if !rest.starts_with('<') {
            let len = rest.find('<').unwrap_or(rest.len());
            self.pos += len;
            return Some(Token::Text(&rest[..len]));
        }

        if rest.starts_with("<!--") {
            self.take_through("-->").map(Token::Verbatim)
        } else if rest.starts_with("<![CDATA[") {
            self.take_through("]]>").map(Token::Verbatim)
        } else if rest.starts_with("<?") {
            self.take_through("?>").map(|_| Token::Declaration)
        } else if rest.starts_with("<!") {
            self.declaration()
        } else if rest.starts_with("</") {
            self.end_tag()
        } else {
            self.start_tag()
        }
    }
}

fn is_delimiter(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b'<' | b'>' | b'/' | b'=' | b'"' | b'\'')
}

fn tag_name_length(s: &str) -> usize {
    match s.bytes().next() {
        Some(b) if b.is_ascii_alphabetic() || b == b'_' || b == b':' || !b.is_ascii() => {
            s.bytes().take_while(|&b| !is_delimiter(b)).count()
        }
        _ => 0,
    }
}

fn attribute_name_length(s: &str) -> usize {
    s.bytes().take_while(|&b| !is_delimiter(b)).count()
}

fn unquoted_value_length(bytes: &[u8]) -> usize {
    bytes
        .iter()
        .enumerate()
        .find(|&(i, &b)| {
            b.is_ascii_whitespace() || b == b'>' || (b == b'/' && bytes.get(i + 1) == Some(&b'>'))
        })
        .map_or(bytes.len(), |(i, _)| i)
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while bytes.get(pos).is_some_and(|b| b.is_ascii_whitespace()) {
        pos += 1;
    }
    pos
}
