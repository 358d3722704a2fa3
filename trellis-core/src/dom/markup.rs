//! Markup reader.
//!
//! Reads the HTML-like subset used for templates: elements with quoted or
//! bare attributes, void and self-closing elements, text and comments.
//! Only `&lt;`, `&gt;`, `&amp;`, `&quot;` and `&#39;` are decoded.

use chumsky::prelude::*;

use super::Node;
use crate::error::{Error, Result};

type Span = SimpleSpan;
type ParseError<'src> = Rich<'src, char, Span>;

const VOID_ELEMENTS: &[&str] = &["input", "br", "img", "hr", "meta", "link"];

pub(crate) fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Parse `input` into its top-level nodes.
///
/// Tokens are lexed first; nesting is checked afterwards so mismatched and
/// unclosed tags are reported at the offending tag's offset.
pub fn parse(input: &str) -> Result<Vec<Node>> {
    let tokens = lexer().parse(input).into_result().map_err(|errors| {
        errors.first().map_or_else(
            || Error::markup(0, "malformed markup"),
            |error| Error::markup(error.span().start, error.to_string()),
        )
    })?;
    build(tokens)
}

pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn unescape(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[derive(Debug, Clone, PartialEq)]
enum Token<'src> {
    Open {
        name: &'src str,
        attributes: Vec<(&'src str, &'src str)>,
        self_closing: bool,
    },
    Close(&'src str),
    Comment(&'src str),
    Text(&'src str),
}

#[derive(Debug, Clone)]
struct Spanned<T> {
    span: Span,
    node: T,
}

fn lexer<'src>()
-> impl Parser<'src, &'src str, Vec<Spanned<Token<'src>>>, extra::Err<ParseError<'src>>> {
    let comment = just("<!--")
        .ignore_then(any().and_is(just("-->").not()).repeated().to_slice())
        .then_ignore(just("-->"))
        .map(Token::Comment);

    let close = just("</")
        .ignore_then(none_of('>').repeated().to_slice())
        .then_ignore(just('>'))
        .map(|name: &str| Token::Close(name.trim()));

    let tag_name = any()
        .filter(char::is_ascii_alphabetic)
        .then(
            any()
                .filter(|character: &char| {
                    character.is_ascii_alphanumeric() || *character == '-' || *character == ':'
                })
                .repeated(),
        )
        .to_slice();

    let quoted = choice((
        just('"')
            .ignore_then(none_of('"').repeated().to_slice())
            .then_ignore(just('"')),
        just('\'')
            .ignore_then(none_of('\'').repeated().to_slice())
            .then_ignore(just('\'')),
    ));
    let bare = none_of(" \t\r\n>\"'").repeated().to_slice();

    let attribute = none_of(" \t\r\n=>/\"'")
        .repeated()
        .at_least(1)
        .to_slice()
        .then(
            just('=')
                .padded_by(text::whitespace())
                .ignore_then(quoted.or(bare))
                .or_not(),
        )
        .map(|(name, value): (&str, Option<&str>)| (name, value.unwrap_or("")));

    let open = just('<')
        .ignore_then(tag_name)
        .then(
            text::whitespace()
                .ignore_then(attribute)
                .repeated()
                .collect::<Vec<_>>(),
        )
        .then_ignore(text::whitespace())
        .then(just("/>").to(true).or(just('>').to(false)))
        .map(|((name, attributes), self_closing)| Token::Open {
            name,
            attributes,
            self_closing,
        });

    // A `<` that does not start a tag or comment is ordinary text.
    let tag_start = choice((
        just("<!--").ignored(),
        just("</").ignored(),
        just('<')
            .then(any().filter(char::is_ascii_alphabetic))
            .ignored(),
    ));
    let plain = any()
        .and_is(tag_start.not())
        .repeated()
        .at_least(1)
        .to_slice()
        .map(Token::Text);

    choice((comment, close, open, plain))
        .map_with(|node, extra| Spanned {
            node,
            span: extra.span(),
        })
        .repeated()
        .collect()
}

fn build(tokens: Vec<Spanned<Token<'_>>>) -> Result<Vec<Node>> {
    let mut roots = Vec::new();
    let mut open: Vec<(Node, usize)> = Vec::new();

    for Spanned { span, node } in tokens {
        let offset = span.start;
        let node = match node {
            Token::Comment(body) => Node::comment(body),
            Token::Text(text) => Node::text_node(&unescape(text)),
            Token::Close(name) => {
                let name = name.to_ascii_lowercase();
                match open.pop() {
                    Some((element, _)) if element.tag() == name => continue,
                    Some((element, _)) => {
                        return Err(Error::markup(
                            offset,
                            format!("expected `</{}>`, found `</{name}>`", element.tag()),
                        ))
                    }
                    None => return Err(Error::markup(offset, format!("unexpected `</{name}>`"))),
                }
            }
            Token::Open {
                name,
                attributes,
                self_closing,
            } => {
                let element = Node::element(name);
                for (name, value) in attributes {
                    element.set_attribute(name, &unescape(value));
                }
                match open.last() {
                    Some((parent, _)) => parent.append(element.clone()),
                    None => roots.push(element.clone()),
                }
                if !self_closing && !is_void(element.tag()) {
                    open.push((element, offset));
                }
                continue;
            }
        };
        match open.last() {
            Some((parent, _)) => parent.append(node),
            None => roots.push(node),
        }
    }

    if let Some((element, offset)) = open.pop() {
        return Err(Error::markup(offset, format!("unclosed `<{}>`", element.tag())));
    }
    Ok(roots)
}
