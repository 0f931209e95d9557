//! Symbol table and forward-reference resolution.
//!
//! Front-ends declare entities and classes here as they parse, and may refer
//! to an entity before it has been declared. The first forward use emits a
//! placeholder `DefineEntity` into the AST whose class is the referenced
//! type's own name. The real declaration later patches the placeholder's
//! class argument instead of emitting a second definition.
//!
//! The instantiator keeps a second table of the same type, filled as
//! operations execute, which validators consult.

use std::collections::{HashMap, HashSet};

use tracing::debug;
use trogdor_foundation::{EntityType, Error, ErrorKind, Result, UnresolvedName};

use crate::ast::{Ast, NodeId};
use crate::vocabulary::Vocabulary;

/// Argument index of the class name in a `DefineEntity` operation.
const CLASS_ARGUMENT: usize = 2;

/// A declared entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityDeclaration {
    /// Entity name.
    pub name: String,
    /// Entity type.
    pub entity_type: EntityType,
    /// Class the entity was created from.
    pub class: String,
    /// Line of the declaration.
    pub line: usize,
}

/// A declared entity class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityClassDeclaration {
    /// Class name.
    pub name: String,
    /// Type of the entities this class creates.
    pub entity_type: EntityType,
    /// Line of the declaration.
    pub line: usize,
}

#[derive(Clone, Debug)]
struct UnresolvedReference {
    entity_type: EntityType,
    placeholder: NodeId,
    lines: Vec<usize>,
}

/// Declared names for one compilation.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    entities: HashMap<String, EntityDeclaration>,
    classes: HashMap<String, EntityClassDeclaration>,
    directions: HashSet<String>,
    direction_synonyms: HashMap<String, String>,
    verb_synonyms: HashMap<String, String>,
    integral_resources: HashSet<String>,
    unresolved: HashMap<String, UnresolvedReference>,
    unresolved_order: Vec<String>,
}

impl SymbolTable {
    /// Creates an empty symbol table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Looks up a declared entity. Unresolved forward references are not
    /// declarations.
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&EntityDeclaration> {
        self.entities.get(name)
    }

    /// Checks if an entity has been declared.
    #[must_use]
    pub fn entity_exists(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    /// Returns a declared entity's type.
    #[must_use]
    pub fn entity_type(&self, name: &str) -> Option<EntityType> {
        self.entities.get(name).map(|e| e.entity_type)
    }

    /// Returns a declared entity's class.
    #[must_use]
    pub fn entity_class(&self, name: &str) -> Option<&str> {
        self.entities.get(name).map(|e| e.class.as_str())
    }

    /// Looks up a declared class.
    #[must_use]
    pub fn class(&self, name: &str) -> Option<&EntityClassDeclaration> {
        self.classes.get(name)
    }

    /// Returns a declared class's type.
    #[must_use]
    pub fn class_type(&self, name: &str) -> Option<EntityType> {
        self.classes.get(name).map(|c| c.entity_type)
    }

    /// Returns true if `class` may be used to create entities of type `ty`:
    /// either it is the type's own name or a class declared for that type.
    #[must_use]
    pub fn class_allows(&self, class: &str, ty: EntityType) -> bool {
        class == ty.name() || self.class_type(class) == Some(ty)
    }

    /// Number of declared entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Number of declared classes.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Checks if a word is a direction declared by the game itself.
    #[must_use]
    pub fn is_custom_direction(&self, word: &str) -> bool {
        self.directions.contains(word)
    }

    /// Resolves a word to a canonical direction using the host vocabulary
    /// and the game's own directions and synonyms.
    #[must_use]
    pub fn resolve_direction<'a>(&'a self, vocabulary: &'a Vocabulary, word: &'a str) -> Option<&'a str> {
        if self.directions.contains(word) {
            return Some(word);
        }
        if let Some(direction) = vocabulary.resolve_direction(word) {
            return Some(direction);
        }
        self.direction_synonyms.get(word).map(String::as_str)
    }

    /// Returns the verb a synonym stands for.
    #[must_use]
    pub fn verb_for_synonym(&self, synonym: &str) -> Option<&str> {
        self.verb_synonyms.get(synonym).map(String::as_str)
    }

    /// Returns true if allocations of the named resource, or of resources
    /// created from the named class, must be whole numbers.
    #[must_use]
    pub fn requires_integer_allocations(&self, name: &str) -> bool {
        self.integral_resources.contains(name)
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    /// Declares an entity class.
    ///
    /// # Errors
    ///
    /// Returns a parse error if the name is reserved or already used.
    pub fn declare_class(&mut self, name: &str, ty: EntityType, line: usize) -> Result<()> {
        if EntityType::from_name(name).is_some() {
            return Err(Error::parse(
                format!("\"{name}\" is a reserved name and cannot be used as a class"),
                line,
            ));
        }
        self.check_unused(name, line)?;
        self.insert_class(EntityClassDeclaration {
            name: name.to_string(),
            entity_type: ty,
            line,
        });
        Ok(())
    }

    /// Declares an entity, emitting its `DefineEntity` operation or patching
    /// the placeholder left by an earlier forward reference.
    ///
    /// # Errors
    ///
    /// Returns a parse error if the name is reserved or already declared, if
    /// the class does not create entities of type `ty`, or if earlier
    /// references used the name as a different type.
    pub fn declare_entity(
        &mut self,
        ast: &mut Ast,
        name: &str,
        ty: EntityType,
        class: &str,
        plural: Option<&str>,
        line: usize,
    ) -> Result<NodeId> {
        if EntityType::from_name(name).is_some() {
            return Err(Error::parse(
                format!("\"{name}\" is a reserved name and cannot be used as an entity"),
                line,
            ));
        }
        self.check_unused(name, line)?;
        if !self.class_allows(class, ty) {
            return Err(Error::parse(
                format!("\"{class}\" is not a {ty} class, so {ty} \"{name}\" cannot be created from it"),
                line,
            ));
        }

        let node = if let Some(reference) = self.take_unresolved(name) {
            if reference.entity_type != ty {
                return Err(Error::parse(
                    format!(
                        "\"{name}\" is declared as a {ty} but was referenced as a {} on line(s) {}",
                        reference.entity_type,
                        join_lines(&reference.lines)
                    ),
                    line,
                ));
            }
            debug!(name, class, line, "resolved forward reference");
            ast.set_argument(reference.placeholder, CLASS_ARGUMENT, class);
            if let Some(plural) = plural {
                ast.push_argument(reference.placeholder, plural);
            }
            reference.placeholder
        } else {
            ast.define_entity(name, ty, class, plural, line)
        };

        self.insert_entity(EntityDeclaration {
            name: name.to_string(),
            entity_type: ty,
            class: class.to_string(),
            line,
        });
        Ok(node)
    }

    /// Records a use of an entity name as type `ty`.
    ///
    /// An undeclared name gets a placeholder definition on first use; later
    /// uses only add their line to the reference.
    ///
    /// # Errors
    ///
    /// Returns a parse error if the name is already declared, or already
    /// referenced, as an incompatible type.
    pub fn reference_entity(&mut self, ast: &mut Ast, name: &str, ty: EntityType, line: usize) -> Result<()> {
        if let Some(declared) = self.entities.get(name) {
            if !declared.entity_type.is_a(ty) {
                return Err(Error::parse(
                    format!(
                        "\"{name}\" was declared as a {} on line {}, not a {ty}",
                        declared.entity_type, declared.line
                    ),
                    line,
                ));
            }
            return Ok(());
        }
        if self.classes.contains_key(name) {
            return Err(Error::parse(
                format!("\"{name}\" is a class, not an entity"),
                line,
            ));
        }

        if let Some(reference) = self.unresolved.get_mut(name) {
            if reference.entity_type != ty {
                return Err(Error::parse(
                    format!(
                        "\"{name}\" was referenced as a {} on line {}, not a {ty}",
                        reference.entity_type, reference.lines[0]
                    ),
                    line,
                ));
            }
            reference.lines.push(line);
            return Ok(());
        }

        debug!(name, entity_type = %ty, line, "forward reference, emitting placeholder");
        let placeholder = ast.define_entity(name, ty, ty.name(), None, line);
        self.unresolved.insert(
            name.to_string(),
            UnresolvedReference {
                entity_type: ty,
                placeholder,
                lines: vec![line],
            },
        );
        self.unresolved_order.push(name.to_string());
        Ok(())
    }

    /// Declares a custom direction.
    ///
    /// # Errors
    ///
    /// Returns a parse error if the direction is already known.
    pub fn declare_direction(&mut self, vocabulary: &Vocabulary, direction: &str, line: usize) -> Result<()> {
        if self.resolve_direction(vocabulary, direction).is_some() {
            return Err(Error::parse(
                format!("direction \"{direction}\" is already defined"),
                line,
            ));
        }
        self.directions.insert(direction.to_string());
        Ok(())
    }

    /// Declares a synonym for a known direction.
    ///
    /// # Errors
    ///
    /// Returns a parse error if the direction is unknown or the synonym is
    /// already a direction word.
    pub fn declare_direction_synonym(
        &mut self,
        vocabulary: &Vocabulary,
        direction: &str,
        synonym: &str,
        line: usize,
    ) -> Result<()> {
        if self.resolve_direction(vocabulary, direction) != Some(direction) {
            return Err(Error::parse(
                format!("\"{direction}\" is not a direction"),
                line,
            ));
        }
        if self.resolve_direction(vocabulary, synonym).is_some() {
            return Err(Error::parse(
                format!("\"{synonym}\" already names a direction"),
                line,
            ));
        }
        self.direction_synonyms
            .insert(synonym.to_string(), direction.to_string());
        Ok(())
    }

    /// Declares a synonym for a verb.
    ///
    /// # Errors
    ///
    /// Returns a parse error if the synonym is already declared.
    pub fn declare_verb_synonym(&mut self, verb: &str, synonym: &str, line: usize) -> Result<()> {
        if let Some(existing) = self.verb_synonyms.get(synonym) {
            return Err(Error::parse(
                format!("\"{synonym}\" is already a synonym for \"{existing}\""),
                line,
            ));
        }
        self.verb_synonyms
            .insert(synonym.to_string(), verb.to_string());
        Ok(())
    }

    /// Fails with one aggregated error if any forward reference was never
    /// declared. Call once parsing is complete.
    ///
    /// # Errors
    ///
    /// Returns an unresolved-references error naming every undeclared
    /// entity and every line that referenced it.
    pub fn finish(&self) -> Result<()> {
        if self.unresolved_order.is_empty() {
            return Ok(());
        }
        let names = self
            .unresolved_order
            .iter()
            .filter_map(|name| {
                self.unresolved.get(name).map(|reference| UnresolvedName {
                    name: name.clone(),
                    entity_type: reference.entity_type,
                    lines: reference.lines.clone(),
                })
            })
            .collect();
        Err(Error::new(ErrorKind::UnresolvedReferences(names)))
    }

    // =========================================================================
    // Unchecked inserts used while executing operations
    // =========================================================================

    /// Records an entity without any checks.
    pub fn insert_entity(&mut self, declaration: EntityDeclaration) {
        if self.integral_resources.contains(&declaration.class) {
            self.integral_resources.insert(declaration.name.clone());
        }
        self.entities.insert(declaration.name.clone(), declaration);
    }

    /// Records a class without any checks.
    pub fn insert_class(&mut self, declaration: EntityClassDeclaration) {
        self.classes.insert(declaration.name.clone(), declaration);
    }

    /// Records a direction without any checks.
    pub fn insert_direction(&mut self, direction: &str) {
        self.directions.insert(direction.to_string());
    }

    /// Records a direction synonym without any checks.
    pub fn insert_direction_synonym(&mut self, direction: &str, synonym: &str) {
        self.direction_synonyms
            .insert(synonym.to_string(), direction.to_string());
    }

    /// Records a verb synonym without any checks.
    pub fn insert_verb_synonym(&mut self, verb: &str, synonym: &str) {
        self.verb_synonyms
            .insert(synonym.to_string(), verb.to_string());
    }

    /// Sets whether allocations of a resource or resource class must be
    /// whole numbers.
    pub fn set_integer_allocations(&mut self, name: &str, required: bool) {
        if required {
            self.integral_resources.insert(name.to_string());
        } else {
            self.integral_resources.remove(name);
        }
    }

    fn check_unused(&self, name: &str, line: usize) -> Result<()> {
        if let Some(entity) = self.entities.get(name) {
            return Err(Error::parse(
                format!("\"{name}\" was already declared as an entity on line {}", entity.line),
                line,
            ));
        }
        if let Some(class) = self.classes.get(name) {
            return Err(Error::parse(
                format!("\"{name}\" was already declared as a class on line {}", class.line),
                line,
            ));
        }
        Ok(())
    }

    fn take_unresolved(&mut self, name: &str) -> Option<UnresolvedReference> {
        let reference = self.unresolved.remove(name)?;
        self.unresolved_order.retain(|n| n != name);
        Some(reference)
    }
}

pub(crate) fn join_lines(lines: &[usize]) -> String {
    lines
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
