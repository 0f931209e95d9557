//! Recursive-descent parser for markup game definitions.
//!
//! The parser mirrors the document's fixed section nesting. Every
//! recognized tag becomes exactly one AST operation through the typed
//! constructors in [`crate::builder`].

use tracing::debug_span;
use trogdor_foundation::{EntityType, Error, Result};

use crate::ast::Ast;
use crate::builder::{ScriptMode, Subject};
use crate::markup::reader::MarkupReader;
use crate::symbols::SymbolTable;
use crate::vocabulary::Vocabulary;
use crate::Parsed;

/// Leaf tags shared by every entity type, and the property each one sets.
const COMMON_PROPERTIES: &[(&str, &str)] = &[
    ("title", "title"),
    ("description", "longDesc"),
    ("short", "shortDesc"),
];

const OBJECT_PROPERTIES: &[(&str, &str)] = &[
    ("weight", "weight"),
    ("damage", "damage"),
    ("takeable", "takeable"),
    ("droppable", "droppable"),
    ("weapon", "weapon"),
];

const BEING_PROPERTIES: &[(&str, &str)] = &[
    ("alive", "alive"),
    ("attackable", "attackable"),
    ("health", "health"),
    ("maxhealth", "maxHealth"),
    ("woundrate", "woundRate"),
    ("damagebarehands", "damageBareHands"),
];

const CREATURE_PROPERTIES: &[(&str, &str)] = &[
    ("counterattack", "counterAttack"),
    ("allegiance", "allegiance"),
];

const RESOURCE_PROPERTIES: &[(&str, &str)] = &[
    ("amount", "amountAvailable"),
    ("maxallocation", "maxAllocationPerDepositor"),
    ("integer", "requireIntegerAllocations"),
    ("pluraltitle", "pluralTitle"),
];

/// Parser for markup game definitions.
pub struct MarkupParser<'src, 'v> {
    reader: MarkupReader<'src>,
    vocabulary: &'v Vocabulary,
    symbols: SymbolTable,
    ast: Ast,
    /// Set once an entity section has been parsed; classes must come first.
    entities_seen: bool,
}

impl<'src, 'v> MarkupParser<'src, 'v> {
    /// Creates a parser for the given source.
    #[must_use]
    pub fn new(source: &'src str, vocabulary: &'v Vocabulary) -> Self {
        Self {
            reader: MarkupReader::new(source),
            vocabulary,
            symbols: SymbolTable::new(),
            ast: Ast::new(),
            entities_seen: false,
        }
    }

    /// Parses the whole document.
    ///
    /// # Errors
    ///
    /// Returns the first lex or parse error, or one aggregated error naming
    /// every entity that was referenced but never declared.
    pub fn parse(mut self) -> Result<Parsed> {
        let span = debug_span!("parse", format = "markup");
        let _guard = span.enter();

        if !self.reader.next_tag()? || self.reader.tag_name() != "game" {
            return Err(Error::parse(
                "document must start with <game>",
                self.reader.line(),
            ));
        }
        self.each_child("game", |p, tag, line| match tag {
            "classes" => p.parse_classes(),
            "rooms" => p.parse_instances(EntityType::Room),
            "objects" => p.parse_instances(EntityType::Object),
            "creatures" => p.parse_instances(EntityType::Creature),
            "resources" => p.parse_instances(EntityType::Resource),
            "vocabulary" => p.parse_vocabulary(),
            "player" => p.parse_player(),
            "events" => p.parse_events(Subject::Game),
            "introduction" => p.parse_introduction(),
            "timer" => p.parse_timer(),
            "meta" => p.parse_meta(Subject::Game),
            other => Err(Error::parse(format!("invalid section <{other}> in <game>"), line)),
        })?;
        self.symbols.finish()?;

        Ok(Parsed {
            ast: self.ast,
            symbols: self.symbols,
        })
    }

    /// Runs `handle` for each child of the current element, then consumes
    /// the element's closing tag.
    fn each_child(
        &mut self,
        parent: &str,
        mut handle: impl FnMut(&mut Self, &str, usize) -> Result<()>,
    ) -> Result<()> {
        let depth = self.reader.depth() + 1;
        while self.reader.next_tag()? && self.reader.is_child_at(depth) {
            let tag = self.reader.tag_name().to_string();
            let line = self.reader.line();
            handle(self, &tag, line)?;
        }
        self.reader.check_closing_tag(parent)
    }

    // =========================================================================
    // Classes and instances
    // =========================================================================

    fn parse_classes(&mut self) -> Result<()> {
        if self.entities_seen {
            return Err(Error::parse(
                "<classes> must come before any entities are declared",
                self.reader.line(),
            ));
        }
        self.each_child("classes", |p, tag, line| {
            let ty = section_type(tag)
                .ok_or_else(|| Error::parse(format!("invalid section <{tag}> in <classes>"), line))?;
            p.each_child(tag, |p, tag, line| {
                if tag != ty.name() {
                    return Err(Error::parse(
                        format!("expected <{}> but found <{tag}>", ty.name()),
                        line,
                    ));
                }
                let name = p.reader.attribute("class")?.to_string();
                p.symbols.declare_class(&name, ty, line)?;
                p.ast.define_entity_class(&name, ty, line);
                p.parse_body(Subject::Class(&name), ty)
            })
        })
    }

    fn parse_instances(&mut self, ty: EntityType) -> Result<()> {
        self.entities_seen = true;
        let section = self.reader.tag_name().to_string();
        self.each_child(&section, |p, tag, line| {
            let class = if tag == ty.name() {
                ty.name().to_string()
            } else if p.symbols.class_type(tag) == Some(ty) {
                tag.to_string()
            } else {
                return Err(Error::parse(
                    format!("<{tag}> is not a {ty} or {ty} class in <{section}>"),
                    line,
                ));
            };
            let name = p.reader.attribute("name")?.to_string();
            let plural = p.reader.optional_attribute("plural").map(str::to_string);
            p.symbols
                .declare_entity(&mut p.ast, &name, ty, &class, plural.as_deref(), line)?;
            p.parse_body(Subject::Entity(&name), ty)
        })
    }

    fn parse_player(&mut self) -> Result<()> {
        self.each_child("player", |p, tag, line| match tag {
            "default" => p.parse_body(Subject::DefaultPlayer, EntityType::Player),
            other => Err(Error::parse(format!("invalid tag <{other}> in <player>"), line)),
        })
    }

    // =========================================================================
    // Entity, class and default-player bodies
    // =========================================================================

    fn parse_body(&mut self, subject: Subject<'_>, ty: EntityType) -> Result<()> {
        let parent = self.reader.tag_name().to_string();
        self.each_child(&parent, |p, tag, line| {
            if let Some(property) = leaf_property(ty, tag) {
                let value = p.reader.leaf_value()?;
                p.ast.set_property(subject, property, &value, line);
                return Ok(());
            }
            match tag {
                "messages" => p.parse_messages(subject),
                "tags" => p.parse_tags(subject),
                "meta" => p.parse_meta(subject),
                "events" if subject != Subject::DefaultPlayer => p.parse_events(subject),
                "resources" if matches!(subject, Subject::Entity(_)) && ty != EntityType::Resource => {
                    p.parse_allocations(subject)
                }
                "contains" if ty == EntityType::Room => p.parse_contents(subject),
                "aliases"
                    if ty.is_a(EntityType::Thing) && subject != Subject::DefaultPlayer =>
                {
                    p.parse_aliases(subject)
                }
                "inventory" if ty.is_a(EntityType::Being) => p.parse_inventory(subject),
                "attributes" if ty.is_a(EntityType::Being) => p.parse_attributes(subject),
                "respawn" if ty.is_a(EntityType::Being) => {
                    p.parse_grouped(subject, "respawn", &["enabled", "interval", "lives"])
                }
                "autoattack" if ty == EntityType::Creature => {
                    p.parse_grouped(subject, "autoAttack", &["enabled", "repeat", "interval"])
                }
                "wandering" if ty == EntityType::Creature => {
                    p.parse_grouped(subject, "wandering", &["enabled", "interval", "wanderlust"])
                }
                _ if ty == EntityType::Room => p.parse_connection(subject, tag, line, &parent),
                other => Err(Error::parse(format!("invalid tag <{other}> in <{parent}>"), line)),
            }
        })
    }

    fn parse_messages(&mut self, subject: Subject<'_>) -> Result<()> {
        self.each_child("messages", |p, tag, line| {
            if tag != "message" {
                return Err(Error::parse(format!("invalid tag <{tag}> in <messages>"), line));
            }
            let name = p.reader.attribute("name")?.to_string();
            let text = p.reader.leaf_value()?;
            p.ast.set_message(subject, &name, &text, line);
            Ok(())
        })
    }

    fn parse_tags(&mut self, subject: Subject<'_>) -> Result<()> {
        self.each_child("tags", |p, tag, line| {
            if tag != "tag" {
                return Err(Error::parse(format!("invalid tag <{tag}> in <tags>"), line));
            }
            let value = p.reader.leaf_value()?;
            p.ast.set_tag(subject, &value, line);
            Ok(())
        })
    }

    fn parse_meta(&mut self, subject: Subject<'_>) -> Result<()> {
        self.each_child("meta", |p, key, line| {
            let value = p.reader.leaf_value()?;
            p.ast.set_meta(subject, key, &value, line);
            Ok(())
        })
    }

    fn parse_aliases(&mut self, subject: Subject<'_>) -> Result<()> {
        self.each_child("aliases", |p, tag, line| {
            if tag != "alias" {
                return Err(Error::parse(format!("invalid tag <{tag}> in <aliases>"), line));
            }
            let alias = p.reader.leaf_value()?;
            p.ast.set_alias(subject, &alias, line);
            Ok(())
        })
    }

    fn parse_attributes(&mut self, subject: Subject<'_>) -> Result<()> {
        self.each_child("attributes", |p, attribute, line| {
            let value = p.reader.leaf_value()?;
            p.ast.set_attribute(subject, attribute, &value, line);
            Ok(())
        })
    }

    /// Parses a group like `<respawn><enabled>1</enabled></respawn>` into
    /// dotted properties such as `respawn.enabled`.
    fn parse_grouped(&mut self, subject: Subject<'_>, prefix: &str, fields: &[&str]) -> Result<()> {
        let parent = self.reader.tag_name().to_string();
        self.each_child(&parent, |p, tag, line| {
            if !fields.contains(&tag) {
                return Err(Error::parse(format!("invalid tag <{tag}> in <{parent}>"), line));
            }
            let value = p.reader.leaf_value()?;
            p.ast
                .set_property(subject, &format!("{prefix}.{tag}"), &value, line);
            Ok(())
        })
    }

    fn parse_inventory(&mut self, subject: Subject<'_>) -> Result<()> {
        self.each_child("inventory", |p, tag, line| match (tag, subject) {
            ("weight", _) => {
                let value = p.reader.leaf_value()?;
                p.ast.set_property(subject, "inventory.weight", &value, line);
                Ok(())
            }
            ("object", Subject::Entity(being)) => {
                let object = p.reader.leaf_value()?;
                p.symbols
                    .reference_entity(&mut p.ast, &object, EntityType::Object, line)?;
                p.ast.insert_into_inventory(&object, being, line);
                Ok(())
            }
            ("object", _) => Err(Error::parse(
                "objects can only be placed in the inventory of a declared creature",
                line,
            )),
            (other, _) => Err(Error::parse(format!("invalid tag <{other}> in <inventory>"), line)),
        })
    }

    fn parse_contents(&mut self, subject: Subject<'_>) -> Result<()> {
        let Subject::Entity(room) = subject else {
            return Err(Error::parse(
                "only declared rooms can contain things",
                self.reader.line(),
            ));
        };
        self.each_child("contains", |p, tag, line| {
            let ty = match tag {
                "object" => EntityType::Object,
                "creature" => EntityType::Creature,
                other => {
                    return Err(Error::parse(format!("invalid tag <{other}> in <contains>"), line));
                }
            };
            let thing = p.reader.leaf_value()?;
            p.symbols.reference_entity(&mut p.ast, &thing, ty, line)?;
            p.ast.insert_into_place(&thing, room, line);
            Ok(())
        })
    }

    fn parse_allocations(&mut self, subject: Subject<'_>) -> Result<()> {
        let Subject::Entity(owner) = subject else {
            return Ok(());
        };
        self.each_child("resources", |p, tag, line| {
            if tag != "resource" {
                return Err(Error::parse(format!("invalid tag <{tag}> in <resources>"), line));
            }
            let amount = p.reader.attribute("amount")?.to_string();
            let resource = p.reader.leaf_value()?;
            p.symbols
                .reference_entity(&mut p.ast, &resource, EntityType::Resource, line)?;
            p.ast.allocate_resource(&resource, owner, &amount, line);
            Ok(())
        })
    }

    fn parse_connection(&mut self, subject: Subject<'_>, tag: &str, line: usize, parent: &str) -> Result<()> {
        let Some(direction) = self
            .symbols
            .resolve_direction(self.vocabulary, tag)
            .map(str::to_string)
        else {
            return Err(Error::parse(format!("invalid tag <{tag}> in <{parent}>"), line));
        };
        let destination = self.reader.leaf_value()?;
        self.symbols
            .reference_entity(&mut self.ast, &destination, EntityType::Room, line)?;
        self.ast.connect_rooms(subject, &direction, &destination, line);
        Ok(())
    }

    fn parse_events(&mut self, subject: Subject<'_>) -> Result<()> {
        self.each_child("events", |p, tag, line| match tag {
            "script" => {
                if let Some(src) = p.reader.optional_attribute("src").map(str::to_string) {
                    p.reader.check_closing_tag("script")?;
                    p.ast.load_script(subject, ScriptMode::File, &src, line);
                } else {
                    let source = p.reader.leaf_value()?;
                    p.ast.load_script(subject, ScriptMode::Inline, &source, line);
                }
                Ok(())
            }
            "event" => {
                let name = p.reader.attribute("name")?.to_string();
                let function = p.reader.leaf_value()?;
                p.ast.set_event(subject, &name, &function, line);
                Ok(())
            }
            other => Err(Error::parse(format!("invalid tag <{other}> in <events>"), line)),
        })
    }

    // =========================================================================
    // Game-level sections
    // =========================================================================

    fn parse_vocabulary(&mut self) -> Result<()> {
        self.each_child("vocabulary", |p, tag, line| match tag {
            "directions" => p.each_child("directions", |p, tag, line| {
                if tag != "direction" {
                    return Err(Error::parse(format!("invalid tag <{tag}> in <directions>"), line));
                }
                let direction = p.reader.leaf_value()?;
                p.symbols.declare_direction(p.vocabulary, &direction, line)?;
                p.ast.define_direction(&direction, line);
                Ok(())
            }),
            "synonyms" => p.each_child("synonyms", |p, tag, line| {
                if tag != "synonym" {
                    return Err(Error::parse(format!("invalid tag <{tag}> in <synonyms>"), line));
                }
                let verb = p.reader.optional_attribute("verb").map(str::to_string);
                let direction = p.reader.optional_attribute("direction").map(str::to_string);
                let synonym = p.reader.leaf_value()?;
                match (verb, direction) {
                    (Some(verb), None) => {
                        p.symbols.declare_verb_synonym(&verb, &synonym, line)?;
                        p.ast.define_verb_synonym(&verb, &synonym, line);
                    }
                    (None, Some(direction)) => {
                        p.symbols
                            .declare_direction_synonym(p.vocabulary, &direction, &synonym, line)?;
                        p.ast.define_direction_synonym(&direction, &synonym, line);
                    }
                    _ => {
                        return Err(Error::parse(
                            "<synonym> requires exactly one of the attributes \"verb\" or \"direction\"",
                            line,
                        ));
                    }
                }
                Ok(())
            }),
            other => Err(Error::parse(format!("invalid tag <{other}> in <vocabulary>"), line)),
        })
    }

    fn parse_introduction(&mut self) -> Result<()> {
        self.parse_grouped(Subject::Game, "introduction", &["enabled", "text", "pause"])
    }

    fn parse_timer(&mut self) -> Result<()> {
        self.each_child("timer", |p, tag, line| match tag {
            "period" => {
                let period = p.reader.leaf_value()?;
                p.ast.set_timer_period(&period, line);
                Ok(())
            }
            other => Err(Error::parse(format!("invalid tag <{other}> in <timer>"), line)),
        })
    }
}

/// Maps a plural section name to the entity type it declares.
fn section_type(section: &str) -> Option<EntityType> {
    match section {
        "rooms" => Some(EntityType::Room),
        "objects" => Some(EntityType::Object),
        "creatures" => Some(EntityType::Creature),
        "resources" => Some(EntityType::Resource),
        _ => None,
    }
}

/// Returns the property a leaf tag sets on an entity of type `ty`.
fn leaf_property(ty: EntityType, tag: &str) -> Option<&'static str> {
    let mut tables = vec![COMMON_PROPERTIES];
    match ty {
        EntityType::Object => tables.push(OBJECT_PROPERTIES),
        EntityType::Creature => {
            tables.push(BEING_PROPERTIES);
            tables.push(CREATURE_PROPERTIES);
        }
        EntityType::Player => tables.push(BEING_PROPERTIES),
        EntityType::Resource => tables.push(RESOURCE_PROPERTIES),
        _ => {}
    }
    tables
        .into_iter()
        .flatten()
        .find(|(t, _)| *t == tag)
        .map(|(_, property)| *property)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::Opcode;

    fn parse(source: &str) -> Result<Parsed> {
        let vocab = Vocabulary::english();
        MarkupParser::new(source, &vocab).parse()
    }

    fn ops(parsed: &Parsed) -> Vec<(Opcode, Vec<String>)> {
        parsed
            .ast
            .operations()
            .map(|op| (op.opcode, op.args.iter().map(|a| (*a).to_string()).collect()))
            .collect()
    }

    #[test]
    fn single_room() {
        let parsed = parse(r#"<game><rooms><room name="start"/></rooms></game>"#).unwrap();
        assert_eq!(
            ops(&parsed),
            vec![(
                Opcode::DefineEntity,
                vec!["start".into(), "room".into(), "room".into()]
            )]
        );
    }

    #[test]
    fn room_body() {
        let parsed = parse(
            r#"<game><rooms><room name="start">
                <title>The Start</title>
                <description>A plain room.</description>
                <north>start</north>
                <tags><tag>lit</tag></tags>
                <messages><message name="enter">Hello</message></messages>
            </room></rooms></game>"#,
        )
        .unwrap();
        let ops = ops(&parsed);
        assert_eq!(ops[1].1, vec!["entity", "start", "title", "The Start"]);
        assert_eq!(ops[2].1, vec!["entity", "start", "longDesc", "A plain room."]);
        assert_eq!(ops[3].0, Opcode::ConnectRooms);
        assert_eq!(ops[3].1, vec!["entity", "start", "north", "start"]);
        assert_eq!(ops[4].0, Opcode::SetTag);
        assert_eq!(ops[5].1, vec!["entity", "start", "enter", "Hello"]);
    }

    #[test]
    fn direction_synonym_tag_resolves() {
        let parsed = parse(
            r#"<game><rooms>
                <room name="start"><n>hall</n></room>
                <room name="hall"/>
            </rooms></game>"#,
        )
        .unwrap();
        let ops = ops(&parsed);
        assert_eq!(ops[1].1, vec!["hall", "room", "room"]);
        assert_eq!(ops[2].1, vec!["entity", "start", "north", "hall"]);
        assert_eq!(ops.len(), 3);
    }

    #[test]
    fn forward_reference_patched_with_class() {
        let parsed = parse(
            r#"<game>
                <classes><rooms><room class="cave"/></rooms></classes>
                <rooms>
                  <room name="start"><east>grotto</east></room>
                  <cave name="grotto"/>
                </rooms>
            </game>"#,
        )
        .unwrap();
        let ops = ops(&parsed);
        assert_eq!(ops[0].0, Opcode::DefineEntityClass);
        assert_eq!(ops[2].1, vec!["grotto", "room", "cave"]);
        assert_eq!(ops.len(), 4);
    }

    #[test]
    fn undeclared_room_aggregates_lines() {
        let err = parse(
            "<game><rooms>\n<room name=\"start\">\n<east>void</east>\n<west>void</west>\n</room>\n</rooms></game>",
        )
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("\"void\""));
        assert!(msg.contains("3, 4"));
    }

    #[test]
    fn classes_after_entities_rejected() {
        let err = parse(
            r#"<game><rooms><room name="start"/></rooms><classes></classes></game>"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("<classes>"));
    }

    #[test]
    fn creature_groups_and_inventory() {
        let parsed = parse(
            r#"<game>
              <objects><object name="club"><weight>3</weight></object></objects>
              <creatures><creature name="troll">
                <maxhealth>10</maxhealth>
                <wandering><enabled>1</enabled><wanderlust>0.5</wanderlust></wandering>
                <inventory><weight>20</weight><object>club</object></inventory>
                <attributes><strength>12</strength></attributes>
                <aliases><alias>ogre</alias></aliases>
              </creature></creatures>
            </game>"#,
        )
        .unwrap();
        let ops = ops(&parsed);
        let props: Vec<_> = ops
            .iter()
            .filter(|(op, _)| *op == Opcode::SetProperty)
            .map(|(_, args)| args[2].clone())
            .collect();
        assert_eq!(
            props,
            vec!["weight", "maxHealth", "wandering.enabled", "wandering.wanderlust", "inventory.weight"]
        );
        assert!(ops.contains(&(Opcode::InsertIntoInventory, vec!["club".into(), "troll".into()])));
        assert!(ops.contains(&(
            Opcode::SetAttribute,
            vec!["entity".into(), "troll".into(), "strength".into(), "12".into()]
        )));
        assert!(ops.iter().any(|(op, _)| *op == Opcode::SetAlias));
    }

    #[test]
    fn default_player_cannot_hold_objects() {
        let err = parse(
            r#"<game><player><default><inventory><object>x</object></inventory></default></player></game>"#,
        )
        .unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn vocabulary_and_game_sections() {
        let parsed = parse(
            r#"<game>
              <vocabulary>
                <directions><direction>widdershins</direction></directions>
                <synonyms>
                  <synonym verb="take">grab</synonym>
                  <synonym direction="widdershins">wd</synonym>
                </synonyms>
              </vocabulary>
              <events><script src="game.lua"/><event name="tick">onTick</event></events>
              <introduction><enabled>1</enabled><text>Hi</text></introduction>
              <timer><period>500</period></timer>
              <meta><author>Me</author></meta>
            </game>"#,
        )
        .unwrap();
        let opcodes: Vec<_> = ops(&parsed).into_iter().map(|(op, _)| op).collect();
        assert_eq!(
            opcodes,
            vec![
                Opcode::DefineDirection,
                Opcode::DefineVerbSynonym,
                Opcode::DefineDirectionSynonym,
                Opcode::LoadScript,
                Opcode::SetEvent,
                Opcode::SetProperty,
                Opcode::SetProperty,
                Opcode::SetTimerPeriod,
                Opcode::SetMeta,
            ]
        );
    }

    #[test]
    fn unknown_tags_rejected() {
        assert!(parse("<game><dragons/></game>").is_err());
        assert!(parse(r#"<game><rooms><room name="start"><weight>1</weight></room></rooms></game>"#).is_err());
        assert!(parse(r#"<game><rooms><cave name="x"/></rooms></game>"#).is_err());
        assert!(parse("<world/>").is_err());
    }

    #[test]
    fn resource_plural_and_allocation() {
        let parsed = parse(
            r#"<game>
              <rooms><room name="start"><resources><resource amount="5">gold</resource></resources></room></rooms>
              <resources><resource name="gold" plural="gold pieces"><integer>1</integer></resource></resources>
            </game>"#,
        )
        .unwrap();
        let ops = ops(&parsed);
        assert_eq!(ops[1].1, vec!["gold", "resource", "resource", "gold pieces"]);
        assert_eq!(ops[2].1, vec!["gold", "start", "5"]);
    }
}
