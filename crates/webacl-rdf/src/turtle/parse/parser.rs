//! Turtle document parser.
//!
//! Builds a [`Graph`] from the token stream. Every IRI is resolved against
//! the current base and normalized through [`Url`], so lookups can compare
//! IRIs as plain strings.

use std::collections::HashMap;

use url::Url;
use webacl_core::constants::{rdf, xsd};

use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::lexer::{Spanned, Token, tokenize};
use crate::graph::{Graph, Literal, Term, Triple};

/// Deepest nesting of blank node property lists and collections accepted.
pub const MAX_NESTING: usize = 64;

/// Parses a Turtle document.
///
/// `base` resolves relative IRIs; it is usually the URL the document was
/// retrieved from. Without a base, relative IRIs are an error.
///
/// ## Errors
///
/// Returns an error if the input is not valid Turtle, uses an undeclared
/// prefix, or contains an IRI that cannot be resolved.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn parse(input: &str, base: Option<&str>) -> ParseResult<Graph> {
    tracing::trace!("Parsing Turtle document");

    let base = base
        .map(|b| Url::parse(b).map_err(|e| ParseError::invalid_iri(1, format!("base <{b}>: {e}"))))
        .transpose()?;

    let tokens = tokenize(input)?;
    tracing::trace!(count = tokens.len(), "Tokenized document");

    let mut parser = Parser::new(tokens, base);
    parser.document()?;

    tracing::debug!(triples = parser.graph.len(), "Turtle document parsed");

    Ok(parser.graph)
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    base: Option<Url>,
    prefixes: HashMap<String, String>,
    graph: Graph,
    next_blank: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Spanned>, base: Option<Url>) -> Self {
        Self {
            tokens,
            pos: 0,
            base,
            prefixes: HashMap::new(),
            graph: Graph::new(),
            next_blank: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset).map(|s| &s.token)
    }

    /// Line of the current token, or of the last token at end of input.
    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |s| s.line)
    }

    fn advance(&mut self, expected: &str) -> ParseResult<Spanned> {
        let spanned = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| ParseError::eof(self.line(), expected))?;
        self.pos += 1;
        Ok(spanned)
    }

    fn expect(&mut self, token: &Token) -> ParseResult<()> {
        let expected = token.to_string();
        let next = self.advance(&expected)?;
        if &next.token == token {
            Ok(())
        } else {
            Err(ParseError::unexpected(next.line, &expected, &next.token))
        }
    }

    fn document(&mut self) -> ParseResult<()> {
        while let Some(token) = self.peek() {
            match token {
                Token::AtKeyword(word) if word == "prefix" => {
                    self.pos += 1;
                    self.prefix_decl()?;
                    self.expect(&Token::Dot)?;
                }
                Token::AtKeyword(word) if word == "base" => {
                    self.pos += 1;
                    self.base_decl()?;
                    self.expect(&Token::Dot)?;
                }
                Token::Keyword(word) if word.eq_ignore_ascii_case("prefix") => {
                    self.pos += 1;
                    self.prefix_decl()?;
                }
                Token::Keyword(word) if word.eq_ignore_ascii_case("base") => {
                    self.pos += 1;
                    self.base_decl()?;
                }
                _ => {
                    self.triples()?;
                    self.expect(&Token::Dot)?;
                }
            }
        }
        Ok(())
    }

    fn prefix_decl(&mut self) -> ParseResult<()> {
        let name = self.advance("prefix name")?;
        let Token::PrefixedName { prefix, local } = name.token else {
            return Err(ParseError::unexpected(name.line, "prefix name", &name.token));
        };
        if !local.is_empty() {
            return Err(ParseError::unexpected(
                name.line,
                "prefix name ending in ':'",
                format!("{prefix}:{local}"),
            ));
        }

        let iri = self.advance("namespace IRI")?;
        let Token::IriRef(raw) = iri.token else {
            return Err(ParseError::unexpected(iri.line, "namespace IRI", &iri.token));
        };
        let namespace = self.resolve(&raw, iri.line)?;

        tracing::trace!(%prefix, %namespace, "Declared prefix");
        self.prefixes.insert(prefix, namespace);
        Ok(())
    }

    fn base_decl(&mut self) -> ParseResult<()> {
        let iri = self.advance("base IRI")?;
        let Token::IriRef(raw) = iri.token else {
            return Err(ParseError::unexpected(iri.line, "base IRI", &iri.token));
        };
        let resolved = self.resolve(&raw, iri.line)?;
        let base = Url::parse(&resolved)
            .map_err(|e| ParseError::invalid_iri(iri.line, format!("base <{resolved}>: {e}")))?;
        self.base = Some(base);
        Ok(())
    }

    fn triples(&mut self) -> ParseResult<()> {
        if self.peek() == Some(&Token::LBracket) && self.peek_at(1) != Some(&Token::RBracket) {
            let subject = self.blank_node_property_list()?;
            if self.peek() != Some(&Token::Dot) {
                self.predicate_object_list(&subject)?;
            }
            return Ok(());
        }

        let subject = self.subject()?;
        self.predicate_object_list(&subject)
    }

    fn subject(&mut self) -> ParseResult<Term> {
        let next = self.advance("subject")?;
        match next.token {
            Token::IriRef(raw) => Ok(Term::Iri(self.resolve(&raw, next.line)?)),
            Token::PrefixedName { prefix, local } => {
                Ok(Term::Iri(self.expand(&prefix, &local, next.line)?))
            }
            Token::BlankLabel(label) => Ok(Term::Blank(label)),
            Token::LBracket => {
                self.expect(&Token::RBracket)?;
                Ok(self.fresh_blank())
            }
            Token::LParen => self.collection(),
            other => Err(ParseError::unexpected(next.line, "subject", other)),
        }
    }

    fn predicate_object_list(&mut self, subject: &Term) -> ParseResult<()> {
        loop {
            let verb = self.verb()?;
            self.object_list(subject, &verb)?;

            if self.peek() != Some(&Token::Semicolon) {
                return Ok(());
            }
            while self.peek() == Some(&Token::Semicolon) {
                self.pos += 1;
            }
            if matches!(self.peek(), None | Some(Token::Dot | Token::RBracket)) {
                return Ok(());
            }
        }
    }

    fn verb(&mut self) -> ParseResult<String> {
        let next = self.advance("predicate")?;
        match next.token {
            Token::Keyword(word) if word == "a" => Ok(rdf::TYPE.to_string()),
            Token::IriRef(raw) => self.resolve(&raw, next.line),
            Token::PrefixedName { prefix, local } => self.expand(&prefix, &local, next.line),
            other => Err(ParseError::unexpected(next.line, "predicate", other)),
        }
    }

    fn object_list(&mut self, subject: &Term, predicate: &str) -> ParseResult<()> {
        loop {
            let object = self.object()?;
            self.graph
                .insert(Triple::new(subject.clone(), predicate, object));

            if self.peek() == Some(&Token::Comma) {
                self.pos += 1;
            } else {
                return Ok(());
            }
        }
    }

    fn object(&mut self) -> ParseResult<Term> {
        if self.peek() == Some(&Token::LBracket) && self.peek_at(1) != Some(&Token::RBracket) {
            return self.blank_node_property_list();
        }

        let next = self.advance("object")?;
        match next.token {
            Token::IriRef(raw) => Ok(Term::Iri(self.resolve(&raw, next.line)?)),
            Token::PrefixedName { prefix, local } => {
                Ok(Term::Iri(self.expand(&prefix, &local, next.line)?))
            }
            Token::BlankLabel(label) => Ok(Term::Blank(label)),
            Token::LBracket => {
                self.expect(&Token::RBracket)?;
                Ok(self.fresh_blank())
            }
            Token::LParen => self.collection(),
            Token::String(value) => self.literal_suffix(value),
            Token::Integer(n) => Ok(Term::Literal(Literal::typed(n, xsd::INTEGER))),
            Token::Decimal(n) => Ok(Term::Literal(Literal::typed(n, xsd::DECIMAL))),
            Token::Double(n) => Ok(Term::Literal(Literal::typed(n, xsd::DOUBLE))),
            Token::Keyword(word) if word == "true" || word == "false" => {
                Ok(Term::Literal(Literal::typed(word, xsd::BOOLEAN)))
            }
            other => Err(ParseError::unexpected(next.line, "object", other)),
        }
    }

    /// Applies an optional language tag or datatype to a string literal.
    fn literal_suffix(&mut self, value: String) -> ParseResult<Term> {
        match self.peek() {
            Some(Token::AtKeyword(tag)) => {
                let literal = Literal::tagged(value, tag.as_str());
                self.pos += 1;
                Ok(Term::Literal(literal))
            }
            Some(Token::DoubleCaret) => {
                self.pos += 1;
                let next = self.advance("datatype IRI")?;
                let datatype = match next.token {
                    Token::IriRef(raw) => self.resolve(&raw, next.line)?,
                    Token::PrefixedName { prefix, local } => {
                        self.expand(&prefix, &local, next.line)?
                    }
                    other => return Err(ParseError::unexpected(next.line, "datatype IRI", other)),
                };
                Ok(Term::Literal(Literal::typed(value, datatype)))
            }
            _ => Ok(Term::Literal(Literal::plain(value))),
        }
    }

    fn blank_node_property_list(&mut self) -> ParseResult<Term> {
        self.expect(&Token::LBracket)?;
        self.enter()?;
        let node = self.fresh_blank();
        self.predicate_object_list(&node)?;
        self.expect(&Token::RBracket)?;
        self.depth -= 1;
        Ok(node)
    }

    /// Parses `( ... )` after the opening parenthesis into an `rdf:first`/`rdf:rest` chain.
    fn collection(&mut self) -> ParseResult<Term> {
        self.enter()?;
        let mut items = Vec::new();
        while self.peek() != Some(&Token::RParen) {
            if self.peek().is_none() {
                return Err(ParseError::eof(self.line(), "')'"));
            }
            items.push(self.object()?);
        }
        self.pos += 1;

        let mut head = Term::iri(rdf::NIL);
        for item in items.into_iter().rev() {
            let node = self.fresh_blank();
            self.graph
                .insert(Triple::new(node.clone(), rdf::FIRST, item));
            self.graph.insert(Triple::new(node.clone(), rdf::REST, head));
            head = node;
        }
        self.depth -= 1;
        Ok(head)
    }

    fn enter(&mut self) -> ParseResult<()> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::new(
                ParseErrorKind::NestingTooDeep,
                self.line(),
                format!("more than {MAX_NESTING} nested blank nodes or collections"),
            ));
        }
        self.depth += 1;
        Ok(())
    }

    fn fresh_blank(&mut self) -> Term {
        let label = format!("genid{}", self.next_blank);
        self.next_blank += 1;
        Term::Blank(label)
    }

    /// Resolves an IRI reference against the current base and normalizes it.
    fn resolve(&self, raw: &str, line: usize) -> ParseResult<String> {
        match Url::parse(raw) {
            Ok(url) => Ok(url.into()),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = self.base.as_ref().ok_or_else(|| {
                    ParseError::invalid_iri(line, format!("relative IRI <{raw}> without a base"))
                })?;
                base.join(raw)
                    .map(String::from)
                    .map_err(|e| ParseError::invalid_iri(line, format!("<{raw}>: {e}")))
            }
            Err(e) => Err(ParseError::invalid_iri(line, format!("<{raw}>: {e}"))),
        }
    }

    fn expand(&self, prefix: &str, local: &str, line: usize) -> ParseResult<String> {
        let namespace = self.prefixes.get(prefix).ok_or_else(|| {
            ParseError::new(
                ParseErrorKind::UndefinedPrefix,
                line,
                format!("'{prefix}:' is not declared"),
            )
        })?;
        let iri = format!("{namespace}{local}");
        Url::parse(&iri)
            .map(String::from)
            .map_err(|e| ParseError::invalid_iri(line, format!("<{iri}>: {e}")))
    }
}
