//! Executes an AST against a backend.
//!
//! The instantiator owns an operation table mapping each opcode to an
//! optional validator and an executor. Operations run in AST order: each
//! is validated against the symbols recorded so far, handed to the
//! backend's executor, and then recorded. After the last operation the
//! start room is checked and the backend's `after_instantiate` hook runs.

use std::collections::HashMap;

use tracing::{debug_span, info, trace};
use trogdor_foundation::{EntityType, Error, ErrorKind, Result, Value};

use crate::ast::{Ast, OperationRef};
use crate::builder::{ScriptMode, Subject};
use crate::config::CompilerConfig;
use crate::opcode::{Opcode, Target};
use crate::symbols::{EntityClassDeclaration, EntityDeclaration, SymbolTable};
use crate::validator::{ValidationContext, Validator, validator_for};
use crate::vocabulary::Vocabulary;

/// Name of the room every playable game must define.
pub const START_ROOM: &str = "start";

/// Executes one validated operation. Receives the typed payload the
/// validator produced, if any.
pub type Executor<B> = fn(&mut B, &OperationRef<'_>, Option<&Value>) -> Result<()>;

/// A game backend.
///
/// Backends register an executor for every opcode and supply the setter
/// drivers that property writes end up in.
pub trait Backend: Sized {
    /// Registers the backend's executors.
    fn register_operations(table: &mut OperationTable<Self>);

    /// Sets a property on an entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot apply the value.
    fn entity_setter_driver(&mut self, entity: &str, property: &str, value: &Value) -> Result<()>;

    /// Sets a property on an entity class.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot apply the value.
    fn entity_class_setter_driver(&mut self, class: &str, property: &str, value: &Value) -> Result<()>;

    /// Sets a property on the default player template.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot apply the value.
    fn default_player_setter_driver(&mut self, property: &str, value: &Value) -> Result<()>;

    /// Sets a game property.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot apply the value.
    fn game_setter_driver(&mut self, property: &str, value: &Value) -> Result<()>;

    /// Runs once after every operation has executed.
    ///
    /// # Errors
    ///
    /// Returns an error if the finished game is unusable.
    fn after_instantiate(&mut self) -> Result<()> {
        Ok(())
    }
}

// =============================================================================
// Operation table
// =============================================================================

struct Entry<B> {
    validator: Option<Validator>,
    executor: Option<Executor<B>>,
}

/// Maps opcodes to their validators and executors.
pub struct OperationTable<B> {
    entries: HashMap<Opcode, Entry<B>>,
}

impl<B: Backend> OperationTable<B> {
    /// Creates a table with the built-in validator for every opcode and the
    /// built-in `SetProperty` executor, which routes writes to the setter
    /// drivers.
    #[must_use]
    pub fn new() -> Self {
        let mut entries = HashMap::with_capacity(Opcode::ALL.len());
        for opcode in Opcode::ALL {
            entries.insert(
                opcode,
                Entry {
                    validator: Some(validator_for(opcode)),
                    executor: None,
                },
            );
        }
        let mut table = Self { entries };
        table.register_operation(Opcode::SetProperty, execute_set_property::<B>);
        table
    }

    /// Registers the executor for an opcode, replacing any earlier one.
    pub fn register_operation(&mut self, opcode: Opcode, executor: Executor<B>) {
        if let Some(entry) = self.entries.get_mut(&opcode) {
            entry.executor = Some(executor);
        }
    }

    /// Replaces or removes the validator for an opcode.
    pub fn register_validator(&mut self, opcode: Opcode, validator: Option<Validator>) {
        if let Some(entry) = self.entries.get_mut(&opcode) {
            entry.validator = validator;
        }
    }

    /// Checks if an executor is registered for an opcode.
    #[must_use]
    pub fn has_executor(&self, opcode: Opcode) -> bool {
        self.entries
            .get(&opcode)
            .is_some_and(|entry| entry.executor.is_some())
    }

    fn lookup(&self, opcode: Opcode) -> (Option<Validator>, Option<Executor<B>>) {
        self.entries
            .get(&opcode)
            .map_or((None, None), |entry| (entry.validator, entry.executor))
    }
}

impl<B: Backend> Default for OperationTable<B> {
    fn default() -> Self {
        Self::new()
    }
}

fn execute_set_property<B: Backend>(
    backend: &mut B,
    op: &OperationRef<'_>,
    value: Option<&Value>,
) -> Result<()> {
    let property = op.payload().first().copied().unwrap_or_default();
    let fallback;
    let value = match value {
        Some(value) => value,
        None => {
            fallback = Value::from(op.payload().get(1).copied().unwrap_or_default());
            &fallback
        }
    };
    match op.target() {
        Some(Target::Entity) => backend.entity_setter_driver(op.arg(1), property, value),
        Some(Target::Class) => backend.entity_class_setter_driver(op.arg(1), property, value),
        Some(Target::DefaultPlayer) => backend.default_player_setter_driver(property, value),
        Some(Target::Game) => backend.game_setter_driver(property, value),
        None => Err(Error::internal(format!(
            "SET_PROPERTY with invalid target \"{}\"",
            op.arg(0)
        ))),
    }
}

// =============================================================================
// Instantiator
// =============================================================================

/// Drives a backend through an AST.
pub struct Instantiator<'v, B: Backend> {
    backend: B,
    table: OperationTable<B>,
    symbols: SymbolTable,
    vocabulary: &'v Vocabulary,
    require_start_room: bool,
}

impl<'v, B: Backend> Instantiator<'v, B> {
    /// Creates an instantiator around a backend, letting the backend
    /// register its executors.
    #[must_use]
    pub fn new(backend: B, vocabulary: &'v Vocabulary) -> Self {
        let mut table = OperationTable::new();
        B::register_operations(&mut table);
        Self {
            backend,
            table,
            symbols: SymbolTable::new(),
            vocabulary,
            require_start_room: true,
        }
    }

    /// Applies the parts of a compiler configuration that affect
    /// instantiation.
    #[must_use]
    pub fn with_config(mut self, config: &CompilerConfig) -> Self {
        self.require_start_room = config.require_start_room;
        self
    }

    /// Returns the backend.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns the backend mutably.
    pub const fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Consumes the instantiator and returns the backend.
    #[must_use]
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Returns the symbols recorded from executed operations.
    #[must_use]
    pub const fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Returns the operation table.
    pub const fn table_mut(&mut self) -> &mut OperationTable<B> {
        &mut self.table
    }

    /// Executes every operation in the AST, then checks for the start room
    /// and runs the backend's finishing hook.
    ///
    /// # Errors
    ///
    /// Returns the first validation or execution error, or
    /// [`trogdor_foundation::ErrorKind::NoStartRoom`] if no room named
    /// `start` was defined and one is required.
    pub fn instantiate(&mut self, ast: &Ast) -> Result<()> {
        let span = debug_span!("instantiate", operations = ast.len());
        let _guard = span.enter();

        let mut saw_start_room = false;
        let mut executed = 0usize;
        for op in ast.operations() {
            if op.opcode == Opcode::DefineEntity
                && op.arg(0) == START_ROOM
                && op.arg(1) == EntityType::Room.name()
            {
                saw_start_room = true;
            }
            trace!(opcode = %op.opcode, line = op.line, "executing operation");
            self.execute_operation(&op)?;
            executed += 1;
        }

        if self.require_start_room && !saw_start_room {
            return Err(Error::new(ErrorKind::NoStartRoom));
        }
        self.backend.after_instantiate()?;
        info!(
            executed,
            entities = self.symbols.entity_count(),
            classes = self.symbols.class_count(),
            "instantiation complete"
        );
        Ok(())
    }

    /// Validates and executes a single operation.
    ///
    /// # Errors
    ///
    /// Returns the validator's error, an internal error if no executor is
    /// registered for the opcode, or the executor's error.
    pub fn execute_operation(&mut self, op: &OperationRef<'_>) -> Result<()> {
        let (validator, executor) = self.table.lookup(op.opcode);
        let value = match validator {
            Some(validate) => {
                let ctx = ValidationContext {
                    symbols: &self.symbols,
                    vocabulary: self.vocabulary,
                };
                validate(op, &ctx)?
            }
            None => None,
        };
        let Some(execute) = executor else {
            return Err(Error::internal(format!(
                "no operation registered for {}",
                op.opcode
            )));
        };
        execute(&mut self.backend, op, value.as_ref())?;
        self.record(op, value.as_ref());
        Ok(())
    }

    // =========================================================================
    // Backend-facing seam
    // =========================================================================

    /// Checks if an entity has been created.
    #[must_use]
    pub fn entity_exists(&self, name: &str) -> bool {
        self.symbols.entity_exists(name)
    }

    /// Returns an entity's type.
    #[must_use]
    pub fn entity_type(&self, name: &str) -> Option<EntityType> {
        self.symbols.entity_type(name)
    }

    /// Returns the class an entity was created from.
    #[must_use]
    pub fn entity_class(&self, name: &str) -> Option<&str> {
        self.symbols.entity_class(name)
    }

    /// Creates an entity class.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the class cannot be defined.
    pub fn make_entity_class(&mut self, name: &str, ty: EntityType) -> Result<()> {
        self.execute_detached(|ast| {
            ast.define_entity_class(name, ty, 0);
        })
    }

    /// Creates an entity.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the entity cannot be defined.
    pub fn make_entity(&mut self, name: &str, ty: EntityType, class: &str) -> Result<()> {
        self.execute_detached(|ast| {
            ast.define_entity(name, ty, class, None, 0);
        })
    }

    /// Validates and sets an entity property.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the property or value is invalid.
    pub fn entity_setter(&mut self, entity: &str, property: &str, value: &str) -> Result<()> {
        self.set(Subject::Entity(entity), property, value)
    }

    /// Validates and sets an entity class property.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the property or value is invalid.
    pub fn entity_class_setter(&mut self, class: &str, property: &str, value: &str) -> Result<()> {
        self.set(Subject::Class(class), property, value)
    }

    /// Validates and sets a default player property.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the property or value is invalid.
    pub fn default_player_setter(&mut self, property: &str, value: &str) -> Result<()> {
        self.set(Subject::DefaultPlayer, property, value)
    }

    /// Validates and sets a game property.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the property or value is invalid.
    pub fn game_setter(&mut self, property: &str, value: &str) -> Result<()> {
        self.set(Subject::Game, property, value)
    }

    /// Loads a script attached to an entity or class.
    ///
    /// # Errors
    ///
    /// Returns an error if the owner is undeclared or the script cannot be
    /// loaded.
    pub fn load_entity_script(&mut self, owner: Subject<'_>, mode: ScriptMode, script: &str) -> Result<()> {
        self.execute_detached(|ast| {
            ast.load_script(owner, mode, script, 0);
        })
    }

    /// Loads a game-wide script.
    ///
    /// # Errors
    ///
    /// Returns an error if the script cannot be loaded.
    pub fn load_game_script(&mut self, mode: ScriptMode, script: &str) -> Result<()> {
        self.load_entity_script(Subject::Game, mode, script)
    }

    fn set(&mut self, subject: Subject<'_>, property: &str, value: &str) -> Result<()> {
        self.execute_detached(|ast| {
            ast.set_property(subject, property, value, 0);
        })
    }

    /// Builds a one-operation AST and executes it.
    fn execute_detached(&mut self, build: impl FnOnce(&mut Ast)) -> Result<()> {
        let mut scratch = Ast::new();
        build(&mut scratch);
        for op in scratch.operations() {
            self.execute_operation(&op)?;
        }
        Ok(())
    }

    /// Records what an executed operation declared.
    fn record(&mut self, op: &OperationRef<'_>, value: Option<&Value>) {
        match op.opcode {
            Opcode::DefineDirection => self.symbols.insert_direction(op.arg(0)),
            Opcode::DefineDirectionSynonym => {
                self.symbols.insert_direction_synonym(op.arg(0), op.arg(1));
            }
            Opcode::DefineVerbSynonym => self.symbols.insert_verb_synonym(op.arg(0), op.arg(1)),
            Opcode::DefineEntityClass => {
                if let Some(ty) = EntityType::from_name(op.arg(1)) {
                    self.symbols.insert_class(EntityClassDeclaration {
                        name: op.arg(0).to_string(),
                        entity_type: ty,
                        line: op.line,
                    });
                }
            }
            Opcode::DefineEntity => {
                if let Some(ty) = EntityType::from_name(op.arg(1)) {
                    self.symbols.insert_entity(EntityDeclaration {
                        name: op.arg(0).to_string(),
                        entity_type: ty,
                        class: op.arg(2).to_string(),
                        line: op.line,
                    });
                }
            }
            Opcode::SetProperty
                if op.target().is_some_and(Target::is_named)
                    && op.payload().first() == Some(&"requireIntegerAllocations") =>
            {
                let required = value.and_then(Value::as_bool).unwrap_or(false);
                self.symbols.set_integer_allocations(op.arg(1), required);
            }
            _ => {}
        }
    }
}
