//! Per-operation semantic checks.
//!
//! Each opcode has a validator that runs immediately before the operation
//! executes, against the symbol table as it stands at that moment. A
//! validator checks arity, that referenced names exist with the right
//! types, value domains and structural rules. It also converts the
//! operation's payload text into a typed [`Value`] once, for the executor.

use trogdor_foundation::{EntityType, Error, Result, Value, ValueType};

use crate::ast::OperationRef;
use crate::builder::ScriptMode;
use crate::opcode::{Opcode, Target};
use crate::symbols::SymbolTable;
use crate::vocabulary::Vocabulary;

/// What a validator may look at.
#[derive(Clone, Copy)]
pub struct ValidationContext<'a> {
    /// Names declared by the operations executed so far.
    pub symbols: &'a SymbolTable,
    /// The host vocabulary.
    pub vocabulary: &'a Vocabulary,
}

/// A validator. Returns the operation's typed payload, if it has one.
pub type Validator = fn(&OperationRef<'_>, &ValidationContext<'_>) -> Result<Option<Value>>;

/// Returns the built-in validator for an opcode.
#[must_use]
pub fn validator_for(opcode: Opcode) -> Validator {
    match opcode {
        Opcode::DefineDirection => validate_define_direction,
        Opcode::DefineDirectionSynonym => validate_define_direction_synonym,
        Opcode::DefineVerbSynonym => validate_define_verb_synonym,
        Opcode::DefineEntityClass => validate_define_entity_class,
        Opcode::DefineEntity => validate_define_entity,
        Opcode::SetProperty => validate_set_property,
        Opcode::LoadScript => validate_load_script,
        Opcode::SetAlias => validate_set_alias,
        Opcode::SetAttribute => validate_set_attribute,
        Opcode::SetMessage
        | Opcode::SetTag
        | Opcode::RemoveTag
        | Opcode::SetEvent
        | Opcode::SetMeta => validate_subject_only,
        Opcode::InsertIntoInventory => validate_insert_into_inventory,
        Opcode::InsertIntoPlace => validate_insert_into_place,
        Opcode::ConnectRooms => validate_connect_rooms,
        Opcode::AllocateResource => validate_allocate_resource,
        Opcode::SetTimerPeriod => validate_set_timer_period,
    }
}

// =============================================================================
// Property rules
// =============================================================================

/// The value domain of a settable property.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropertyRule {
    /// Any text.
    String,
    /// `1` or `0`.
    Bool,
    /// An integer.
    Int,
    /// A number that is zero or more.
    NonNegative,
    /// A number between 0 and 1 inclusive.
    Probability,
    /// One of a fixed set of words.
    Choice(&'static [&'static str]),
}

impl PropertyRule {
    /// Converts property text to a typed value.
    ///
    /// # Errors
    ///
    /// Returns a validation error describing the expected domain.
    pub fn parse(self, property: &str, text: &str, line: usize) -> Result<Value> {
        let fail = |expected: &str| {
            Error::validation(format!("{property} {expected}, got \"{text}\""), line)
        };
        match self {
            Self::String => Ok(Value::String(text.to_string())),
            Self::Bool => Value::parse(text, ValueType::Bool)
                .ok_or_else(|| fail("must be 1 for true or 0 for false")),
            Self::Int => Value::parse(text, ValueType::Int).ok_or_else(|| fail("must be an integer")),
            Self::NonNegative => Value::parse(text, ValueType::Float)
                .filter(|v| v.as_float().is_some_and(|f| f >= 0.0))
                .ok_or_else(|| fail("must be a number no less than 0")),
            Self::Probability => Value::parse(text, ValueType::Float)
                .filter(|v| v.as_float().is_some_and(|f| (0.0..=1.0).contains(&f)))
                .ok_or_else(|| fail("must be a probability between 0 and 1")),
            Self::Choice(choices) => choices
                .iter()
                .find(|c| **c == text.trim())
                .map(|c| Value::from(*c))
                .ok_or_else(|| fail(&format!("must be one of {}", choices.join(", ")))),
        }
    }
}

const ALLEGIANCES: &[&str] = &["friend", "neutral", "enemy"];

/// Returns the rule for an entity property, or `None` if entities of type
/// `ty` have no such property.
#[must_use]
pub fn entity_property_rule(ty: EntityType, property: &str) -> Option<PropertyRule> {
    use PropertyRule::{Bool, Choice, Int, NonNegative, Probability, String};

    let rule = match property {
        "title" | "longDesc" | "shortDesc" => String,

        "amountAvailable" | "maxAllocationPerDepositor" if ty == EntityType::Resource => NonNegative,
        "requireIntegerAllocations" if ty == EntityType::Resource => Bool,
        "pluralTitle" if ty == EntityType::Resource => String,

        "weight" | "damage" if ty == EntityType::Object => Int,
        "takeable" | "droppable" | "weapon" if ty == EntityType::Object => Bool,

        "alive" | "attackable" | "respawn.enabled" if ty.is_a(EntityType::Being) => Bool,
        "health" | "maxHealth" | "damageBareHands" | "respawn.interval" | "respawn.lives"
        | "inventory.weight"
            if ty.is_a(EntityType::Being) =>
        {
            Int
        }
        "woundRate" if ty.is_a(EntityType::Being) => Probability,

        "counterAttack" | "autoAttack.enabled" | "autoAttack.repeat" | "wandering.enabled"
            if ty == EntityType::Creature =>
        {
            Bool
        }
        "autoAttack.interval" | "wandering.interval" if ty == EntityType::Creature => Int,
        "wandering.wanderlust" if ty == EntityType::Creature => Probability,
        "allegiance" if ty == EntityType::Creature => Choice(ALLEGIANCES),

        _ => return None,
    };
    Some(rule)
}

/// Returns the rule for a game property.
#[must_use]
pub fn game_property_rule(property: &str) -> Option<PropertyRule> {
    match property {
        "introduction.enabled" | "introduction.pause" => Some(PropertyRule::Bool),
        "introduction.text" => Some(PropertyRule::String),
        _ => None,
    }
}

// =============================================================================
// Shared checks
// =============================================================================

fn check_arity(op: &OperationRef<'_>) -> Result<()> {
    let targets = op.opcode.targets();
    if !targets.is_empty() && op.target().is_none_or(|t| !targets.contains(&t)) {
        let accepted = targets.iter().map(|t| t.name()).collect::<Vec<_>>().join(", ");
        return Err(Error::validation(
            format!(
                "{} cannot target \"{}\"; expected one of {accepted}",
                op.opcode,
                op.arg(0)
            ),
            op.line,
        ));
    }
    let Some(arity) = op.opcode.arity(op.target()) else {
        return Err(Error::internal(format!("no arity rule for {}", op.opcode)));
    };
    if !arity.accepts(op.args.len()) {
        return Err(Error::validation(
            format!(
                "{} expects {arity} arguments but got {}",
                op.opcode,
                op.args.len()
            ),
            op.line,
        ));
    }
    Ok(())
}

/// Resolves the operation's target to the entity type it acts on, checking
/// that a named entity or class exists. Returns `None` for the game.
fn check_subject(op: &OperationRef<'_>, ctx: &ValidationContext<'_>) -> Result<Option<EntityType>> {
    check_arity(op)?;
    let name = op.arg(1);
    match op.target() {
        Some(Target::Entity) => ctx.symbols.entity_type(name).map(Some).ok_or_else(|| {
            Error::validation(
                format!("cannot {}: entity \"{name}\" has not been declared", action(op.opcode)),
                op.line,
            )
        }),
        Some(Target::Class) => ctx.symbols.class_type(name).map(Some).ok_or_else(|| {
            Error::validation(
                format!("cannot {}: class \"{name}\" has not been declared", action(op.opcode)),
                op.line,
            )
        }),
        Some(Target::DefaultPlayer) => Ok(Some(EntityType::Player)),
        Some(Target::Game) | None => Ok(None),
    }
}

/// Checks that `name` is a declared entity whose type descends from `ty`.
fn check_entity(
    op: &OperationRef<'_>,
    ctx: &ValidationContext<'_>,
    name: &str,
    ty: EntityType,
) -> Result<EntityType> {
    match ctx.symbols.entity_type(name) {
        Some(actual) if actual.is_a(ty) => Ok(actual),
        Some(actual) => Err(Error::validation(
            format!(
                "cannot {}: \"{name}\" is a {actual}, not a {ty}",
                action(op.opcode)
            ),
            op.line,
        )),
        None => Err(Error::validation(
            format!(
                "cannot {}: {ty} \"{name}\" has not been declared",
                action(op.opcode)
            ),
            op.line,
        )),
    }
}

/// Describes what an operation was trying to do, for error messages.
const fn action(opcode: Opcode) -> &'static str {
    match opcode {
        Opcode::DefineDirection => "define direction",
        Opcode::DefineDirectionSynonym => "define direction synonym",
        Opcode::DefineVerbSynonym => "define verb synonym",
        Opcode::DefineEntityClass => "define class",
        Opcode::DefineEntity => "define entity",
        Opcode::SetProperty => "set property",
        Opcode::SetMessage => "set message",
        Opcode::SetTag => "set tag",
        Opcode::RemoveTag => "remove tag",
        Opcode::LoadScript => "load script",
        Opcode::SetEvent => "set event",
        Opcode::SetAlias => "set alias",
        Opcode::SetMeta => "set meta value",
        Opcode::SetAttribute => "set attribute",
        Opcode::InsertIntoInventory => "insert into inventory",
        Opcode::InsertIntoPlace => "insert into place",
        Opcode::ConnectRooms => "connect rooms",
        Opcode::AllocateResource => "allocate resource",
        Opcode::SetTimerPeriod => "set timer period",
    }
}

fn check_new_name(op: &OperationRef<'_>, ctx: &ValidationContext<'_>, name: &str) -> Result<()> {
    if name.is_empty() || EntityType::from_name(name).is_some() {
        return Err(Error::validation(
            format!("cannot {}: \"{name}\" is a reserved name", action(op.opcode)),
            op.line,
        ));
    }
    if ctx.symbols.entity_exists(name) {
        return Err(Error::validation(
            format!("cannot {}: entity \"{name}\" already exists", action(op.opcode)),
            op.line,
        ));
    }
    Ok(())
}

fn instantiable_type(op: &OperationRef<'_>, name: &str) -> Result<EntityType> {
    EntityType::from_name(name)
        .filter(|ty| ty.is_instantiable())
        .ok_or_else(|| {
            Error::validation(
                format!("cannot {}: \"{name}\" is not a valid entity type", action(op.opcode)),
                op.line,
            )
        })
}

// =============================================================================
// Validators
// =============================================================================

fn validate_define_direction(op: &OperationRef<'_>, ctx: &ValidationContext<'_>) -> Result<Option<Value>> {
    check_arity(op)?;
    let direction = op.arg(0);
    if ctx.symbols.resolve_direction(ctx.vocabulary, direction).is_some() {
        return Err(Error::validation(
            format!("direction \"{direction}\" is already defined"),
            op.line,
        ));
    }
    Ok(None)
}

fn validate_define_direction_synonym(
    op: &OperationRef<'_>,
    ctx: &ValidationContext<'_>,
) -> Result<Option<Value>> {
    check_arity(op)?;
    let (direction, synonym) = (op.arg(0), op.arg(1));
    if ctx.symbols.resolve_direction(ctx.vocabulary, direction) != Some(direction) {
        return Err(Error::validation(
            format!("cannot {}: \"{direction}\" is not a direction", action(op.opcode)),
            op.line,
        ));
    }
    if ctx.symbols.resolve_direction(ctx.vocabulary, synonym).is_some() {
        return Err(Error::validation(
            format!("\"{synonym}\" already names a direction"),
            op.line,
        ));
    }
    Ok(None)
}

fn validate_define_verb_synonym(op: &OperationRef<'_>, ctx: &ValidationContext<'_>) -> Result<Option<Value>> {
    check_arity(op)?;
    let synonym = op.arg(1);
    if let Some(verb) = ctx.symbols.verb_for_synonym(synonym) {
        return Err(Error::validation(
            format!("\"{synonym}\" is already a synonym for \"{verb}\""),
            op.line,
        ));
    }
    Ok(None)
}

fn validate_define_entity_class(op: &OperationRef<'_>, ctx: &ValidationContext<'_>) -> Result<Option<Value>> {
    check_arity(op)?;
    let name = op.arg(0);
    let ty = instantiable_type(op, op.arg(1))?;
    check_new_name(op, ctx, name)?;
    match ctx.symbols.class_type(name) {
        Some(existing) if existing != ty => Err(Error::validation(
            format!(
                "class-type mismatch: class \"{name}\" was declared as a {existing} class and cannot be redefined as a {ty} class"
            ),
            op.line,
        )),
        Some(_) => Err(Error::validation(
            format!("class \"{name}\" is already defined"),
            op.line,
        )),
        None => Ok(None),
    }
}

fn validate_define_entity(op: &OperationRef<'_>, ctx: &ValidationContext<'_>) -> Result<Option<Value>> {
    check_arity(op)?;
    let (name, class) = (op.arg(0), op.arg(2));
    let ty = instantiable_type(op, op.arg(1))?;
    check_new_name(op, ctx, name)?;
    if ctx.symbols.class(name).is_some() {
        return Err(Error::validation(
            format!("cannot {}: \"{name}\" is already a class", action(op.opcode)),
            op.line,
        ));
    }
    if !ctx.symbols.class_allows(class, ty) {
        let message = match ctx.symbols.class_type(class) {
            Some(class_ty) => format!(
                "class-type mismatch: \"{class}\" is a {class_ty} class, but \"{name}\" is a {ty}"
            ),
            None => format!("cannot {}: class \"{class}\" has not been declared", action(op.opcode)),
        };
        return Err(Error::validation(message, op.line));
    }
    if op.args.len() == 4 && ty != EntityType::Resource {
        return Err(Error::validation(
            format!("only resources may have a custom plural name, but \"{name}\" is a {ty}"),
            op.line,
        ));
    }
    Ok(None)
}

fn validate_set_property(op: &OperationRef<'_>, ctx: &ValidationContext<'_>) -> Result<Option<Value>> {
    let ty = check_subject(op, ctx)?;
    let payload = op.payload();
    let (property, text) = (payload[0], payload[1]);
    let rule = match ty {
        Some(ty) => entity_property_rule(ty, property).ok_or_else(|| {
            Error::validation(format!("\"{property}\" is not a valid property for a {ty}"), op.line)
        })?,
        None => game_property_rule(property).ok_or_else(|| {
            Error::validation(format!("\"{property}\" is not a valid game property"), op.line)
        })?,
    };
    rule.parse(property, text, op.line).map(Some)
}

fn validate_subject_only(op: &OperationRef<'_>, ctx: &ValidationContext<'_>) -> Result<Option<Value>> {
    check_subject(op, ctx)?;
    if op.payload().iter().take(1).any(|key| key.trim().is_empty()) {
        return Err(Error::validation(
            format!("cannot {}: name must not be empty", action(op.opcode)),
            op.line,
        ));
    }
    Ok(None)
}

fn validate_load_script(op: &OperationRef<'_>, ctx: &ValidationContext<'_>) -> Result<Option<Value>> {
    check_subject(op, ctx)?;
    let mode = op.payload()[0];
    if ScriptMode::from_name(mode).is_none() {
        return Err(Error::validation(
            format!("script mode must be \"file\" or \"string\", got \"{mode}\""),
            op.line,
        ));
    }
    Ok(None)
}

fn validate_set_alias(op: &OperationRef<'_>, ctx: &ValidationContext<'_>) -> Result<Option<Value>> {
    let ty = check_subject(op, ctx)?;
    if !ty.is_some_and(|ty| ty.is_a(EntityType::Thing)) {
        return Err(Error::validation(
            "aliases can only be set on objects, creatures and players",
            op.line,
        ));
    }
    Ok(None)
}

fn validate_set_attribute(op: &OperationRef<'_>, ctx: &ValidationContext<'_>) -> Result<Option<Value>> {
    let ty = check_subject(op, ctx)?;
    if !ty.is_some_and(|ty| ty.is_a(EntityType::Being)) {
        return Err(Error::validation(
            "attributes can only be set on creatures and players",
            op.line,
        ));
    }
    let payload = op.payload();
    PropertyRule::Int.parse(payload[0], payload[1], op.line).map(Some)
}

fn validate_insert_into_inventory(
    op: &OperationRef<'_>,
    ctx: &ValidationContext<'_>,
) -> Result<Option<Value>> {
    check_arity(op)?;
    check_entity(op, ctx, op.arg(0), EntityType::Object)?;
    check_entity(op, ctx, op.arg(1), EntityType::Being)?;
    Ok(None)
}

fn validate_insert_into_place(op: &OperationRef<'_>, ctx: &ValidationContext<'_>) -> Result<Option<Value>> {
    check_arity(op)?;
    check_entity(op, ctx, op.arg(0), EntityType::Thing)?;
    check_entity(op, ctx, op.arg(1), EntityType::Place)?;
    Ok(None)
}

fn validate_connect_rooms(op: &OperationRef<'_>, ctx: &ValidationContext<'_>) -> Result<Option<Value>> {
    let ty = check_subject(op, ctx)?;
    if ty != Some(EntityType::Room) {
        return Err(Error::validation(
            format!("cannot {}: \"{}\" is not a room", action(op.opcode), op.arg(1)),
            op.line,
        ));
    }
    let (direction, destination) = (op.arg(2), op.arg(3));
    let Some(canonical) = ctx.symbols.resolve_direction(ctx.vocabulary, direction) else {
        return Err(Error::validation(
            format!("cannot {}: \"{direction}\" is not a direction", action(op.opcode)),
            op.line,
        ));
    };
    check_entity(op, ctx, destination, EntityType::Room)?;
    Ok(Some(Value::from(canonical)))
}

fn validate_allocate_resource(op: &OperationRef<'_>, ctx: &ValidationContext<'_>) -> Result<Option<Value>> {
    check_arity(op)?;
    let (resource, owner, amount) = (op.arg(0), op.arg(1), op.arg(2));
    check_entity(op, ctx, resource, EntityType::Resource)?;
    check_entity(op, ctx, owner, EntityType::Tangible)?;
    let value = PropertyRule::NonNegative.parse("allocation amount", amount, op.line)?;
    let whole = value.as_float().is_some_and(|f| f.fract() == 0.0);
    if ctx.symbols.requires_integer_allocations(resource) && !whole {
        return Err(Error::validation(
            format!("\"{resource}\" can only be allocated in whole amounts, got {amount}"),
            op.line,
        ));
    }
    Ok(Some(value))
}

fn validate_set_timer_period(op: &OperationRef<'_>, _ctx: &ValidationContext<'_>) -> Result<Option<Value>> {
    check_arity(op)?;
    let period = PropertyRule::Int.parse("timer period", op.arg(0), op.line)?;
    if period.as_int().is_some_and(|p| p <= 0) {
        return Err(Error::validation("timer period must be positive", op.line));
    }
    Ok(Some(period))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Ast;
    use crate::builder::Subject;
    use crate::symbols::{EntityClassDeclaration, EntityDeclaration};

    fn symbols() -> SymbolTable {
        let mut symbols = SymbolTable::new();
        for (name, ty) in [
            ("start", EntityType::Room),
            ("candle", EntityType::Object),
            ("troll", EntityType::Creature),
            ("gold", EntityType::Resource),
        ] {
            symbols.insert_entity(EntityDeclaration {
                name: name.to_string(),
                entity_type: ty,
                class: ty.name().to_string(),
                line: 1,
            });
        }
        symbols.insert_class(EntityClassDeclaration {
            name: "cave".to_string(),
            entity_type: EntityType::Room,
            line: 1,
        });
        symbols
    }

    fn validate(build: impl FnOnce(&mut Ast), symbols: &SymbolTable) -> Result<Option<Value>> {
        let vocabulary = Vocabulary::english();
        let mut ast = Ast::new();
        build(&mut ast);
        let op = ast.operations().next().unwrap();
        let ctx = ValidationContext {
            symbols,
            vocabulary: &vocabulary,
        };
        validator_for(op.opcode)(&op, &ctx)
    }

    #[test]
    fn set_property_types_value() {
        let symbols = symbols();
        let value = validate(|a| { a.set_property(Subject::Entity("candle"), "weight", "5", 3); }, &symbols)
            .unwrap();
        assert_eq!(value, Some(Value::Int(5)));

        let err = validate(|a| { a.set_property(Subject::Entity("candle"), "weight", "heavy", 3); }, &symbols)
            .unwrap_err();
        assert!(err.to_string().contains("must be an integer"));
    }

    #[test]
    fn booleans_are_one_or_zero() {
        let symbols = symbols();
        let err = validate(|a| { a.set_property(Subject::Entity("candle"), "takeable", "yes", 1); }, &symbols)
            .unwrap_err();
        assert!(err.to_string().contains("1 for true or 0 for false"));
    }

    #[test]
    fn probabilities_in_range() {
        let symbols = symbols();
        assert!(validate(|a| { a.set_property(Subject::Entity("troll"), "woundRate", "0.25", 1); }, &symbols).is_ok());
        assert!(validate(|a| { a.set_property(Subject::Entity("troll"), "woundRate", "1.5", 1); }, &symbols).is_err());
    }

    #[test]
    fn property_must_fit_type() {
        let symbols = symbols();
        let err = validate(|a| { a.set_property(Subject::Entity("start"), "weight", "1", 1); }, &symbols)
            .unwrap_err();
        assert!(err.to_string().contains("not a valid property for a room"));
    }

    #[test]
    fn undeclared_subject_names_action() {
        let symbols = symbols();
        let err = validate(|a| { a.set_tag(Subject::Entity("ghost"), "spooky", 9); }, &symbols).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("cannot set tag"));
        assert!(err.to_string().contains("\"ghost\""));
    }

    #[test]
    fn class_type_mismatch() {
        let symbols = symbols();
        let err = validate(|a| { a.define_entity_class("cave", EntityType::Object, 1); }, &symbols).unwrap_err();
        assert!(err.to_string().contains("class-type mismatch"));

        let err = validate(|a| { a.define_entity("pit", EntityType::Object, "cave", None, 1); }, &symbols)
            .unwrap_err();
        assert!(err.to_string().contains("class-type mismatch"));

        assert!(validate(|a| { a.define_entity("pit", EntityType::Room, "cave", None, 1); }, &symbols).is_ok());
    }

    #[test]
    fn plural_only_on_resources() {
        let symbols = symbols();
        let err = validate(|a| { a.define_entity("coins", EntityType::Object, "object", Some("coinses"), 1); }, &symbols)
            .unwrap_err();
        assert!(err.to_string().contains("only resources"));
        assert!(validate(|a| { a.define_entity("silver", EntityType::Resource, "resource", Some("silver"), 1); }, &symbols).is_ok());
    }

    #[test]
    fn aliases_and_attributes_restricted() {
        let symbols = symbols();
        assert!(validate(|a| { a.set_alias(Subject::Entity("start"), "home", 1); }, &symbols).is_err());
        assert!(validate(|a| { a.set_alias(Subject::Entity("candle"), "light", 1); }, &symbols).is_ok());
        assert!(validate(|a| { a.set_attribute(Subject::Entity("candle"), "strength", "3", 1); }, &symbols).is_err());
        assert_eq!(
            validate(|a| { a.set_attribute(Subject::DefaultPlayer, "strength", "3", 1); }, &symbols).unwrap(),
            Some(Value::Int(3))
        );
    }

    #[test]
    fn only_places_contain_things() {
        let symbols = symbols();
        assert!(validate(|a| { a.insert_into_place("candle", "start", 1); }, &symbols).is_ok());
        let err = validate(|a| { a.insert_into_place("candle", "troll", 1); }, &symbols).unwrap_err();
        assert!(err.to_string().contains("not a place"));
    }

    #[test]
    fn connect_rooms_resolves_direction() {
        let symbols = symbols();
        let value = validate(|a| { a.connect_rooms(Subject::Entity("start"), "n", "start", 1); }, &symbols)
            .unwrap();
        assert_eq!(value, Some(Value::from("north")));
        assert!(validate(|a| { a.connect_rooms(Subject::Entity("start"), "sideways", "start", 1); }, &symbols).is_err());
        assert!(validate(|a| { a.connect_rooms(Subject::Entity("start"), "north", "nowhere", 1); }, &symbols).is_err());
    }

    #[test]
    fn resource_amounts() {
        let mut symbols = symbols();
        assert!(validate(|a| { a.allocate_resource("gold", "start", "-1", 1); }, &symbols).is_err());
        assert!(validate(|a| { a.allocate_resource("gold", "start", "2.5", 1); }, &symbols).is_ok());
        symbols.set_integer_allocations("gold", true);
        assert!(validate(|a| { a.allocate_resource("gold", "start", "2.5", 1); }, &symbols).is_err());
        assert!(validate(|a| { a.allocate_resource("gold", "start", "2", 1); }, &symbols).is_ok());
    }

    #[test]
    fn arity_and_target_checked() {
        let symbols = symbols();
        let err = validate(|a| { a.push_operation(Opcode::SetAlias, &["game", "x"], 4); }, &symbols).unwrap_err();
        assert!(err.to_string().contains("cannot target"));
        let err = validate(|a| { a.push_operation(Opcode::InsertIntoPlace, &["candle"], 4); }, &symbols).unwrap_err();
        assert!(err.to_string().contains("expects 2 arguments"));
    }
}
