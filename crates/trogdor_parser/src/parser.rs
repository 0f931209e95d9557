//! Recursive-descent parser for the natural-language subset.
//!
//! Parsing happens in two steps. Sentences are first read into an entity
//! table that records each entity's kind, properties, placement, exits and
//! description along with the lines they came from, so contradictions can
//! be reported against both sentences involved. Once the whole source has
//! been read, the table is lowered into AST operations.

use std::collections::HashMap;

use tracing::{debug, debug_span, warn};
use trogdor_foundation::{EntityType, Error, Result};
use trogdor_language::{Ast, CompilerConfig, Parsed, START_ROOM, Subject, SymbolTable, Vocabulary};

use crate::kind::KindId;
use crate::lexer::{NaturalLexer, Token, TokenKind};
use crate::lexicon::{Lexicon, Property};

/// A property asserted on an entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assertion {
    /// The property name.
    pub property: String,
    /// Whether the sentence said `not`.
    pub negated: bool,
    /// Where it was asserted.
    pub line: usize,
}

/// Whether a thing is placed in or on something.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preposition {
    /// `in`: a room or container.
    In,
    /// `on`: a supporter.
    On,
}

impl Preposition {
    const fn word(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::On => "on",
        }
    }
}

/// Where a thing was placed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    /// `in` or `on`.
    pub preposition: Preposition,
    /// Key of the entity it was placed in or on.
    pub target: String,
    /// Where it was placed.
    pub line: usize,
}

/// A one-way exit from a room.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Exit {
    /// Canonical direction.
    pub direction: String,
    /// Key of the destination room.
    pub destination: String,
    /// Where the exit was implied.
    pub line: usize,
}

/// Everything the source said about one entity.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityRecord {
    /// The name as first written, used as the entity's title.
    pub name: String,
    /// Line of first mention.
    pub line: usize,
    /// The kind the source gave it, and where.
    pub kind: Option<(KindId, usize)>,
    /// Properties in the order asserted.
    pub assertions: Vec<Assertion>,
    /// Where it was placed.
    pub placement: Option<Placement>,
    /// Exits leading from it.
    pub exits: Vec<Exit>,
    /// Its description.
    pub description: Option<String>,
}

impl EntityRecord {
    fn new(name: &str, line: usize) -> Self {
        Self {
            name: name.to_string(),
            line,
            kind: None,
            assertions: Vec::new(),
            placement: None,
            exits: Vec::new(),
            description: None,
        }
    }
}

/// Parser for natural-language game definitions.
pub struct NaturalParser<'src> {
    lexer: NaturalLexer<'src>,
    lexicon: Lexicon,
    max_compound_words: usize,
    /// Entities in order of first mention.
    entities: Vec<EntityRecord>,
    /// Lowercase name to index in `entities`.
    index: HashMap<String, usize>,
    /// Subjects of the most recent statement, for trailing descriptions.
    last_subjects: Vec<String>,
    title: Option<String>,
    author: Option<String>,
}

impl<'src> NaturalParser<'src> {
    /// Creates a parser.
    #[must_use]
    pub fn new(source: &'src str, vocabulary: &Vocabulary, config: &CompilerConfig) -> Self {
        Self {
            lexer: NaturalLexer::new(source, config.max_compound_words),
            lexicon: Lexicon::standard(vocabulary),
            max_compound_words: config.max_compound_words.max(1),
            entities: Vec::new(),
            index: HashMap::new(),
            last_subjects: Vec::new(),
            title: None,
            author: None,
        }
    }

    /// Returns the lexicon, including kinds declared so far.
    #[must_use]
    pub const fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Returns what has been recorded about an entity.
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&EntityRecord> {
        self.index.get(&name.to_lowercase()).map(|&i| &self.entities[i])
    }

    /// Parses the whole source and lowers it to operations.
    ///
    /// # Errors
    ///
    /// Returns the first lex or parse error, including contradictions.
    pub fn parse(mut self) -> Result<Parsed> {
        let span = debug_span!("parse", format = "natural");
        let _guard = span.enter();
        self.parse_program()?;
        self.lower()
    }

    /// Reads every sentence into the entity table without lowering.
    ///
    /// # Errors
    ///
    /// Returns the first lex or parse error, including contradictions.
    pub fn parse_program(&mut self) -> Result<()> {
        self.parse_bibliographic()?;
        loop {
            let token = self.next()?;
            match token.kind {
                TokenKind::Eof => return Ok(()),
                TokenKind::Terminator => {}
                TokenKind::Quoted => self.parse_trailing_description(&token)?,
                _ => {
                    self.lexer.push(token);
                    self.parse_phrase()?;
                }
            }
        }
    }

    // =========================================================================
    // Token helpers
    // =========================================================================

    fn next(&mut self) -> Result<Token> {
        self.lexer.next_token(&self.lexicon)
    }

    fn expect_terminator(&mut self) -> Result<()> {
        let token = self.next()?;
        if token.ends_sentence() {
            if token.kind == TokenKind::Eof {
                self.lexer.push(token);
            }
            return Ok(());
        }
        Err(unexpected(&token, "the end of the sentence"))
    }

    fn expect_word(&mut self, word: &str) -> Result<Token> {
        let token = self.next()?;
        if token.is_word(word) {
            Ok(token)
        } else {
            Err(unexpected(&token, &format!("\"{word}\"")))
        }
    }

    /// Reads a noun up to the end of the sentence, skipping articles.
    fn parse_noun(&mut self) -> Result<(String, usize)> {
        let mut words = Vec::new();
        let mut line = self.lexer.line();
        loop {
            let token = self.next()?;
            match token.kind {
                TokenKind::Article => {}
                TokenKind::Word => {
                    if words.is_empty() {
                        line = token.line;
                    }
                    words.push(token.value);
                }
                _ if token.ends_sentence() && !words.is_empty() => {
                    self.lexer.push(token);
                    return Ok((words.join(" "), line));
                }
                _ => return Err(unexpected(&token, "a name")),
            }
        }
    }

    // =========================================================================
    // Sentences
    // =========================================================================

    fn parse_bibliographic(&mut self) -> Result<()> {
        let token = self.next()?;
        if token.kind != TokenKind::Quoted {
            self.lexer.push(token);
            return Ok(());
        }
        self.title = Some(token.value.trim_end_matches('.').to_string());
        let next = self.next()?;
        if next.is_word("by") {
            let (author, _) = self.parse_noun()?;
            self.author = Some(author);
        } else {
            self.lexer.push(next);
        }
        self.expect_terminator()
    }

    fn parse_phrase(&mut self) -> Result<()> {
        let identifiers = self.parse_identifiers()?;
        let equality = self.next()?;
        if equality.kind != TokenKind::Equality {
            return Err(unexpected(&equality, "\"is\" or \"are\""));
        }
        if let [(name, line)] = identifiers.as_slice() {
            if let Some(noun) = name.to_lowercase().strip_prefix("description of ") {
                let noun = noun.to_string();
                return self.parse_description_statement(&noun, *line);
            }
        }
        self.parse_equality(&identifiers)
    }

    /// Reads the comma- and `and`-separated subjects before `is`/`are`.
    ///
    /// The whole list is consumed before any decision about the rest of the
    /// sentence is made, which keeps lookahead to a single token.
    fn parse_identifiers(&mut self) -> Result<Vec<(String, usize)>> {
        let mut identifiers = Vec::new();
        let mut words: Vec<String> = Vec::new();
        let mut line = self.lexer.line();
        let mut after_comma = false;
        loop {
            let token = self.next()?;
            match token.kind {
                TokenKind::Article => {}
                TokenKind::Word => {
                    if words.is_empty() {
                        line = token.line;
                    }
                    words.push(token.value);
                    after_comma = false;
                }
                TokenKind::Comma | TokenKind::And => {
                    if words.is_empty() {
                        let oxford = token.kind == TokenKind::And && after_comma;
                        if !oxford {
                            return Err(unexpected(&token, "a name"));
                        }
                    } else {
                        identifiers.push((words.join(" "), line));
                        words.clear();
                    }
                    after_comma = token.kind == TokenKind::Comma;
                }
                TokenKind::Equality if !words.is_empty() => {
                    identifiers.push((words.join(" "), line));
                    self.lexer.push(token);
                    return Ok(identifiers);
                }
                _ => return Err(unexpected(&token, "a name followed by \"is\" or \"are\"")),
            }
        }
    }

    fn parse_description_statement(&mut self, noun: &str, line: usize) -> Result<()> {
        let token = self.next()?;
        if token.kind != TokenKind::Quoted {
            return Err(unexpected(&token, "quoted text"));
        }
        let key = self.declare_entity(noun, line)?;
        self.set_description(&key, token.value);
        self.last_subjects = vec![key];
        self.expect_terminator()
    }

    /// A quoted sentence on its own describes the subject of the sentence
    /// before it.
    fn parse_trailing_description(&mut self, token: &Token) -> Result<()> {
        let [key] = self.last_subjects.as_slice() else {
            return Err(Error::parse(
                "quoted text must follow a sentence about exactly one thing",
                token.line,
            ));
        };
        let key = key.clone();
        self.set_description(&key, token.value.clone());
        self.expect_terminator()
    }

    fn parse_equality(&mut self, identifiers: &[(String, usize)]) -> Result<()> {
        let mut token = self.next()?;
        while token.kind == TokenKind::Article {
            token = self.next()?;
        }

        if token.is_word("kind") {
            self.expect_word("of")?;
            return self.parse_kind_declaration(identifiers);
        }
        for (name, line) in identifiers {
            if self.lexicon.kinds().lookup(name).is_some() {
                return Err(Error::parse(
                    format!("\"{name}\" is a kind; only things can be described this way"),
                    *line,
                ));
            }
        }

        let mut keys = Vec::with_capacity(identifiers.len());
        for (name, line) in identifiers {
            keys.push(self.declare_entity(name, *line)?);
        }
        self.last_subjects.clone_from(&keys);

        if token.kind == TokenKind::Word && self.lexicon.is_direction(&token.value) {
            return self.parse_location_clause(identifiers, &keys, &token);
        }
        self.lexer.push(token);
        self.parse_definition(&keys)
    }

    fn parse_kind_declaration(&mut self, identifiers: &[(String, usize)]) -> Result<()> {
        let mut token = self.next()?;
        while token.kind == TokenKind::Article {
            token = self.next()?;
        }
        let Some(parent) = self.lexicon.kinds().lookup(&token.value).filter(|_| token.kind == TokenKind::Word) else {
            return Err(unexpected(&token, "a kind"));
        };
        self.expect_terminator()?;
        for (name, line) in identifiers {
            if self.index.contains_key(&name.to_lowercase()) {
                return Err(Error::parse(
                    format!("\"{name}\" is already a thing and cannot also be a kind"),
                    *line,
                ));
            }
            let kind = self
                .lexicon
                .declare_kind(name, parent, self.max_compound_words, *line)?;
            debug!(kind = %self.lexicon.kinds().get(kind).name, line, "declared kind");
        }
        self.last_subjects.clear();
        Ok(())
    }

    /// Parses `A is <direction> of B`.
    fn parse_location_clause(
        &mut self,
        identifiers: &[(String, usize)],
        keys: &[String],
        direction: &Token,
    ) -> Result<()> {
        let [room] = keys else {
            return Err(Error::parse(
                "only one room can be placed in a direction from another",
                direction.line,
            ));
        };
        let of = self.next()?;
        if !(of.is_word("of") || of.is_word("from")) {
            return Err(unexpected(&of, "\"of\" or \"from\""));
        }
        let (origin_name, origin_line) = self.parse_noun()?;
        self.expect_terminator()?;

        let line = direction.line;
        let direction = direction.value.to_lowercase();
        let origin = self.declare_entity(&origin_name, origin_line)?;
        let room_kind = self.builtin_kind("room")?;
        self.set_kind(room, room_kind, identifiers[0].1)?;
        self.set_kind(&origin, room_kind, origin_line)?;

        self.add_exit(&origin, &direction, room, line)?;
        if let Some(opposite) = self.lexicon.opposite(&direction).map(str::to_string) {
            self.add_exit(room, &opposite, &origin, line)?;
        }
        Ok(())
    }

    /// Parses the right-hand side of a definition: properties, an optional
    /// kind, an optional placement and an optional description.
    fn parse_definition(&mut self, keys: &[String]) -> Result<()> {
        let mut negated = false;
        let mut seen_anything = false;
        loop {
            let token = self.next()?;
            match token.kind {
                TokenKind::Article | TokenKind::Comma | TokenKind::And => {}
                TokenKind::Terminator | TokenKind::Eof if seen_anything && !negated => {
                    if token.kind == TokenKind::Eof {
                        self.lexer.push(token);
                    }
                    return Ok(());
                }
                TokenKind::Quoted if seen_anything => {
                    if let [key] = keys {
                        self.set_description(key, token.value);
                        return self.expect_terminator();
                    }
                    return Err(Error::parse(
                        "quoted text can only describe one thing at a time",
                        token.line,
                    ));
                }
                TokenKind::Word if token.is_word("not") => {
                    if negated {
                        return Err(unexpected(&token, "a property"));
                    }
                    negated = true;
                }
                TokenKind::Word if token.is_word("in") || token.is_word("on") => {
                    if negated {
                        return Err(unexpected(&token, "a property"));
                    }
                    let preposition = if token.is_word("in") { Preposition::In } else { Preposition::On };
                    return self.parse_placement(keys, preposition, token.line);
                }
                TokenKind::Word if self.lexicon.is_unassertable(&token.value) => {
                    return Err(Error::parse(
                        format!(
                            "\"{}\" describes a condition of the world and cannot be asserted",
                            token.value
                        ),
                        token.line,
                    ));
                }
                TokenKind::Word if self.lexicon.property(&token.value).is_some() => {
                    let property = token.value.to_lowercase();
                    for key in keys {
                        self.assert_property(key, &property, negated, token.line)?;
                    }
                    negated = false;
                    seen_anything = true;
                }
                TokenKind::Word if !negated && self.lexicon.kinds().lookup(&token.value).is_some() => {
                    let kind = self.lexicon.kinds().lookup(&token.value).ok_or_else(|| {
                        Error::internal("kind disappeared from the lexicon")
                    })?;
                    for key in keys {
                        self.set_kind(key, kind, token.line)?;
                    }
                    seen_anything = true;
                }
                TokenKind::Word => {
                    return Err(Error::parse(
                        format!("\"{}\" is not a known kind or property", token.value),
                        token.line,
                    ));
                }
                _ => return Err(unexpected(&token, "a kind or property")),
            }
        }
    }

    fn parse_placement(&mut self, keys: &[String], preposition: Preposition, line: usize) -> Result<()> {
        let (target_name, target_line) = self.parse_noun()?;
        self.expect_terminator()?;
        let target = self.declare_entity(&target_name, target_line)?;
        let default_kind = match preposition {
            Preposition::In => "room",
            Preposition::On => "supporter",
        };
        let inferable = {
            let record = self.record(&target);
            record.kind.is_none() && record.assertions.iter().all(|a| a.negated)
        };
        if inferable {
            let kind = self.builtin_kind(default_kind)?;
            self.set_kind(&target, kind, target_line)?;
        }
        for key in keys {
            if *key == target {
                return Err(Error::parse(
                    format!("\"{}\" cannot be {} itself", self.record(key).name, preposition.word()),
                    line,
                ));
            }
            let record = self.record_mut(key);
            if let Some(previous) = &record.placement {
                if previous.target != target || previous.preposition != preposition {
                    return Err(Error::parse(
                        format!(
                            "\"{}\" was already placed {} \"{}\" on line {}",
                            record.name,
                            previous.preposition.word(),
                            previous.target,
                            previous.line
                        ),
                        line,
                    ));
                }
            }
            record.placement = Some(Placement {
                preposition,
                target: target.clone(),
                line,
            });
        }
        Ok(())
    }

    // =========================================================================
    // Entity table
    // =========================================================================

    fn builtin_kind(&self, name: &str) -> Result<KindId> {
        self.lexicon
            .kinds()
            .lookup(name)
            .ok_or_else(|| Error::internal(format!("missing built-in kind \"{name}\"")))
    }

    fn record(&self, key: &str) -> &EntityRecord {
        &self.entities[self.index[key]]
    }

    fn record_mut(&mut self, key: &str) -> &mut EntityRecord {
        let i = self.index[key];
        &mut self.entities[i]
    }

    /// Records a mention of an entity and returns its key.
    fn declare_entity(&mut self, name: &str, line: usize) -> Result<String> {
        let key = name.to_lowercase();
        if self.lexicon.kinds().lookup(&key).is_some() {
            return Err(Error::parse(
                format!("\"{name}\" is a kind, not a thing"),
                line,
            ));
        }
        if !self.index.contains_key(&key) {
            self.index.insert(key.clone(), self.entities.len());
            self.entities.push(EntityRecord::new(name, line));
        }
        Ok(key)
    }

    fn set_description(&mut self, key: &str, text: String) {
        self.record_mut(key).description = Some(text);
    }

    /// Assigns a kind, checking it against the kind already given and
    /// against every property asserted so far.
    fn set_kind(&mut self, key: &str, kind: KindId, line: usize) -> Result<()> {
        let kinds = self.lexicon.kinds();
        let record = &self.entities[self.index[key]];
        let kind_name = &kinds.get(kind).name;

        if kinds.get(kind).entity_type.is_none() {
            return Err(Error::parse(
                format!("{} are not supported yet", kinds.get(kind).plural),
                line,
            ));
        }

        let mut resolved = kind;
        if let Some((existing, existing_line)) = record.kind {
            if !kinds.related(existing, kind) {
                return Err(Error::parse(
                    format!(
                        "\"{}\" cannot be a {kind_name} because it was made a {} on line {existing_line}",
                        record.name,
                        kinds.get(existing).name
                    ),
                    line,
                ));
            }
            if kinds.is_a(existing, kind) {
                resolved = existing;
            }
        }

        for assertion in &record.assertions {
            if assertion.negated {
                continue;
            }
            if !self.property_fits(&assertion.property, resolved) {
                return Err(Error::parse(
                    format!(
                        "\"{}\" cannot be a {kind_name} because it was made {} on line {}, which a {kind_name} cannot be",
                        record.name, assertion.property, assertion.line
                    ),
                    line,
                ));
            }
        }

        let keep_line = match record.kind {
            Some((existing, existing_line)) if existing == resolved => existing_line,
            _ => line,
        };
        self.record_mut(key).kind = Some((resolved, keep_line));
        Ok(())
    }

    fn property_fits(&self, property: &str, kind: KindId) -> bool {
        self.lexicon
            .property(property)
            .is_some_and(|p| p.kinds.iter().any(|k| self.lexicon.kinds().is_a(kind, *k)))
    }

    /// Kinds an entity without a stated kind could still be, given its
    /// positive properties. `None` means nothing constrains it yet.
    fn candidate_kinds(&self, assertions: &[&Assertion]) -> Option<Vec<KindId>> {
        let positive: Vec<&Property> = assertions
            .iter()
            .filter(|a| !a.negated)
            .filter_map(|a| self.lexicon.property(&a.property))
            .collect();
        if positive.is_empty() {
            return None;
        }
        let mut candidates: Vec<KindId> = Vec::new();
        for kind in positive.iter().flat_map(|p| p.kinds.iter().copied()) {
            if !candidates.contains(&kind)
                && positive
                    .iter()
                    .all(|p| p.kinds.iter().any(|k| self.lexicon.kinds().is_a(kind, *k)))
            {
                candidates.push(kind);
            }
        }
        Some(candidates)
    }

    fn assert_property(&mut self, key: &str, property: &str, negated: bool, line: usize) -> Result<()> {
        let record = self.record(key);
        let Some(definition) = self.lexicon.property(property) else {
            return Err(Error::internal(format!("unknown property \"{property}\"")));
        };

        for existing in &record.assertions {
            let conflict = if existing.property == property {
                existing.negated != negated
            } else if !negated && !existing.negated {
                definition.contraries.iter().any(|c| *c == existing.property)
            } else if negated && existing.negated {
                let other = self.lexicon.property(&existing.property);
                definition.contraries == [existing.property.as_str()]
                    && other.is_some_and(|o| o.contraries == [property])
            } else {
                false
            };
            if conflict {
                return Err(Error::parse(
                    format!(
                        "\"{}\" cannot be {} because it was made {} on line {}",
                        record.name,
                        describe(property, negated),
                        describe(&existing.property, existing.negated),
                        existing.line
                    ),
                    line,
                ));
            }
        }

        if !negated {
            match record.kind {
                Some((kind, kind_line)) if !self.property_fits(property, kind) => {
                    return Err(Error::parse(
                        format!(
                            "\"{}\" cannot be {property} because it was made a {} on line {kind_line}",
                            record.name,
                            self.lexicon.kinds().get(kind).name
                        ),
                        line,
                    ));
                }
                Some(_) => {}
                None => {
                    let new = Assertion {
                        property: property.to_string(),
                        negated,
                        line,
                    };
                    let mut all: Vec<&Assertion> = record.assertions.iter().collect();
                    all.push(&new);
                    if self.candidate_kinds(&all).is_some_and(|c| c.is_empty()) {
                        let earlier = record
                            .assertions
                            .iter()
                            .filter(|a| !a.negated)
                            .find(|a| self.candidate_kinds(&[*a, &new]).is_some_and(|c| c.is_empty()))
                            .or_else(|| record.assertions.iter().find(|a| !a.negated));
                        let (other, other_line) = earlier.map_or(("", 0), |a| (a.property.as_str(), a.line));
                        return Err(Error::parse(
                            format!(
                                "\"{}\" cannot be {property} because it was made {other} on line {other_line}, and nothing can be both",
                                record.name
                            ),
                            line,
                        ));
                    }
                }
            }
        }

        let record = self.record_mut(key);
        if !record
            .assertions
            .iter()
            .any(|a| a.property == property && a.negated == negated)
        {
            record.assertions.push(Assertion {
                property: property.to_string(),
                negated,
                line,
            });
        }
        Ok(())
    }

    fn add_exit(&mut self, from: &str, direction: &str, to: &str, line: usize) -> Result<()> {
        let record = self.record_mut(from);
        if let Some(existing) = record.exits.iter().find(|e| e.direction == direction) {
            if existing.destination != to {
                return Err(Error::parse(
                    format!(
                        "\"{}\" already leads {direction} to \"{}\" (line {})",
                        record.name, existing.destination, existing.line
                    ),
                    line,
                ));
            }
            return Ok(());
        }
        record.exits.push(Exit {
            direction: direction.to_string(),
            destination: to.to_string(),
            line,
        });
        Ok(())
    }

    // =========================================================================
    // Lowering
    // =========================================================================

    /// Chooses each entity's final kind: the stated one, else the first
    /// kind its properties allow, else `thing`.
    fn resolve_kind(&self, record: &EntityRecord) -> Result<KindId> {
        if let Some((kind, _)) = record.kind {
            return Ok(kind);
        }
        let assertions: Vec<&Assertion> = record.assertions.iter().collect();
        if let Some(kind) = self
            .candidate_kinds(&assertions)
            .and_then(|c| c.into_iter().find(|k| self.lexicon.kinds().get(*k).entity_type.is_some()))
        {
            return Ok(kind);
        }
        warn!(entity = %record.name, line = record.line, "no kind given, defaulting to thing");
        self.builtin_kind("thing")
    }

    /// Name of the class entities of `kind` are created from. Built-in
    /// kinds that share a name with an entity type use the type itself.
    fn class_name(&self, kind: KindId) -> Result<String> {
        let kind = self.lexicon.kinds().get(kind);
        let Some(ty) = kind.entity_type else {
            return Err(Error::internal(format!("kind \"{}\" has no entity type", kind.name)));
        };
        Ok(if EntityType::from_name(&kind.name).is_some() {
            ty.name().to_string()
        } else {
            kind.name.clone()
        })
    }

    fn entity_type(&self, kind: KindId) -> EntityType {
        self.lexicon.kinds().get(kind).entity_type.unwrap_or(EntityType::Object)
    }

    fn lower(self) -> Result<Parsed> {
        let mut ast = Ast::new();
        let mut symbols = SymbolTable::new();

        if let Some(title) = &self.title {
            ast.set_meta(Subject::Game, "title", title, 1);
        }
        if let Some(author) = &self.author {
            ast.set_meta(Subject::Game, "author", author, 1);
        }

        let kinds = self
            .entities
            .iter()
            .map(|record| self.resolve_kind(record))
            .collect::<Result<Vec<_>>>()?;
        let room = self.builtin_kind("room")?;
        let first_room = kinds.iter().position(|k| self.lexicon.kinds().is_a(*k, room));

        // The first room becomes the start room; everything else is named
        // by its lowercase source name.
        let mut names = Vec::with_capacity(self.entities.len());
        for (i, record) in self.entities.iter().enumerate() {
            let key = record.name.to_lowercase();
            if first_room == Some(i) {
                names.push(START_ROOM.to_string());
            } else if key == START_ROOM {
                return Err(Error::parse(
                    format!("the name \"{START_ROOM}\" is reserved for the first room"),
                    record.line,
                ));
            } else {
                names.push(key);
            }
        }

        // One class per kind in use that is not an entity type of its own,
        // tagged with the kind and everything above it.
        let mut classes_defined: Vec<KindId> = Vec::new();
        for (record, &kind) in self.entities.iter().zip(&kinds) {
            let class = self.class_name(kind)?;
            if classes_defined.contains(&kind) || EntityType::from_name(&class).is_some() {
                continue;
            }
            classes_defined.push(kind);
            let ty = self.entity_type(kind);
            symbols.declare_class(&class, ty, record.line)?;
            ast.define_entity_class(&class, ty, record.line);
            for ancestor in self.lexicon.kinds().lineage(kind) {
                ast.set_tag(Subject::Class(&class), &self.lexicon.kinds().get(ancestor).name, record.line);
            }
        }

        for ((record, &kind), name) in self.entities.iter().zip(&kinds).zip(&names) {
            let class = self.class_name(kind)?;
            symbols.declare_entity(&mut ast, name, self.entity_type(kind), &class, None, record.line)?;
            ast.set_property(Subject::Entity(name), "title", &record.name, record.line);
            if let Some(description) = &record.description {
                ast.set_property(Subject::Entity(name), "longDesc", description, record.line);
            }
            for assertion in &record.assertions {
                if assertion.negated {
                    ast.remove_tag(Subject::Entity(name), &assertion.property, assertion.line);
                } else {
                    ast.set_tag(Subject::Entity(name), &assertion.property, assertion.line);
                }
            }
        }

        // Placements and exits, now that every entity exists.
        for ((record, &kind), name) in self.entities.iter().zip(&kinds).zip(&names) {
            if let Some(placement) = &record.placement {
                let target = self.index[&placement.target];
                self.check_placement(kind, placement, kinds[target])?;
                ast.insert_into_place(name, &names[target], placement.line);
            }
            for exit in &record.exits {
                let destination = &names[self.index[&exit.destination]];
                ast.connect_rooms(Subject::Entity(name), &exit.direction, destination, exit.line);
            }
        }

        symbols.finish()?;
        debug!(
            entities = symbols.entity_count(),
            classes = symbols.class_count(),
            operations = ast.len(),
            "lowered natural-language source"
        );
        Ok(Parsed { ast, symbols })
    }

    /// Only things placed directly in rooms can be lowered.
    fn check_placement(&self, kind: KindId, placement: &Placement, target_kind: KindId) -> Result<()> {
        let kinds = self.lexicon.kinds();
        let room = self.builtin_kind("room")?;
        let target = &self.record(&placement.target).name;
        let preposition = placement.preposition.word();

        if kinds.is_a(kind, room) {
            return Err(Error::parse(
                format!("a room cannot be placed {preposition} \"{target}\""),
                placement.line,
            ));
        }
        if placement.preposition == Preposition::In && kinds.is_a(target_kind, room) {
            return Ok(());
        }
        let message = if ["container", "supporter"]
            .iter()
            .filter_map(|k| kinds.lookup(k))
            .any(|k| kinds.is_a(target_kind, k))
        {
            format!("placing things {preposition} \"{target}\" is not supported yet; things can only be placed in rooms")
        } else {
            format!("things cannot be placed {preposition} \"{target}\", which is a {}", kinds.get(target_kind).name)
        };
        Err(Error::parse(message, placement.line))
    }
}

/// Describes a property assertion for messages.
fn describe(property: &str, negated: bool) -> String {
    if negated {
        format!("not {property}")
    } else {
        property.to_string()
    }
}

fn unexpected(token: &Token, expected: &str) -> Error {
    let found = match token.kind {
        TokenKind::Word | TokenKind::Article | TokenKind::Equality | TokenKind::And => {
            format!("\"{}\"", token.value)
        }
        kind => kind.to_string(),
    };
    Error::parse(format!("expected {expected} but found {found}"), token.line)
}
