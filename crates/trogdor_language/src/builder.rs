//! Typed constructors for AST operations.
//!
//! Front-ends never build operations from raw argument lists. Each
//! constructor here fixes the opcode, packs the positional arguments in the
//! order the validator expects, and stamps the source line.

use trogdor_foundation::EntityType;

use crate::ast::{Ast, NodeId};
use crate::opcode::{Opcode, Target};

/// What a setter operation acts on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Subject<'a> {
    /// A declared entity.
    Entity(&'a str),
    /// A declared entity class.
    Class(&'a str),
    /// The default player template.
    DefaultPlayer,
    /// The game itself.
    Game,
}

impl<'a> Subject<'a> {
    /// Returns the target discriminator for this subject.
    #[must_use]
    pub const fn target(self) -> Target {
        match self {
            Self::Entity(_) => Target::Entity,
            Self::Class(_) => Target::Class,
            Self::DefaultPlayer => Target::DefaultPlayer,
            Self::Game => Target::Game,
        }
    }

    fn args(self, rest: &[&'a str]) -> Vec<&'a str> {
        let mut args = vec![self.target().name()];
        if let Self::Entity(name) | Self::Class(name) = self {
            args.push(name);
        }
        args.extend_from_slice(rest);
        args
    }
}

/// How a `LoadScript` operation's script argument is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScriptMode {
    /// The argument is a path to a script file.
    File,
    /// The argument is the script source itself.
    Inline,
}

impl ScriptMode {
    /// Returns the mode's source-level name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Inline => "string",
        }
    }

    /// Looks up a mode by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "file" => Some(Self::File),
            "string" => Some(Self::Inline),
            _ => None,
        }
    }
}

impl Ast {
    /// Declares a custom direction.
    pub fn define_direction(&mut self, direction: &str, line: usize) -> NodeId {
        self.push_operation(Opcode::DefineDirection, &[direction], line)
    }

    /// Declares a synonym for a direction.
    pub fn define_direction_synonym(&mut self, direction: &str, synonym: &str, line: usize) -> NodeId {
        self.push_operation(Opcode::DefineDirectionSynonym, &[direction, synonym], line)
    }

    /// Declares a synonym for a verb.
    pub fn define_verb_synonym(&mut self, verb: &str, synonym: &str, line: usize) -> NodeId {
        self.push_operation(Opcode::DefineVerbSynonym, &[verb, synonym], line)
    }

    /// Declares an entity class.
    pub fn define_entity_class(&mut self, name: &str, ty: EntityType, line: usize) -> NodeId {
        self.push_operation(Opcode::DefineEntityClass, &[name, ty.name()], line)
    }

    /// Declares an entity. Only resources may carry a plural name.
    pub fn define_entity(
        &mut self,
        name: &str,
        ty: EntityType,
        class: &str,
        plural: Option<&str>,
        line: usize,
    ) -> NodeId {
        let mut args = vec![name, ty.name(), class];
        args.extend(plural);
        self.push_operation(Opcode::DefineEntity, &args, line)
    }

    /// Sets a property.
    pub fn set_property(&mut self, subject: Subject<'_>, property: &str, value: &str, line: usize) -> NodeId {
        self.push_operation(Opcode::SetProperty, &subject.args(&[property, value]), line)
    }

    /// Sets a named message.
    pub fn set_message(&mut self, subject: Subject<'_>, message: &str, text: &str, line: usize) -> NodeId {
        self.push_operation(Opcode::SetMessage, &subject.args(&[message, text]), line)
    }

    /// Adds a tag.
    pub fn set_tag(&mut self, subject: Subject<'_>, tag: &str, line: usize) -> NodeId {
        self.push_operation(Opcode::SetTag, &subject.args(&[tag]), line)
    }

    /// Removes a tag.
    pub fn remove_tag(&mut self, subject: Subject<'_>, tag: &str, line: usize) -> NodeId {
        self.push_operation(Opcode::RemoveTag, &subject.args(&[tag]), line)
    }

    /// Loads a script from a file or from inline source.
    pub fn load_script(&mut self, subject: Subject<'_>, mode: ScriptMode, script: &str, line: usize) -> NodeId {
        self.push_operation(Opcode::LoadScript, &subject.args(&[mode.name(), script]), line)
    }

    /// Binds an event to a script function.
    pub fn set_event(&mut self, subject: Subject<'_>, event: &str, function: &str, line: usize) -> NodeId {
        self.push_operation(Opcode::SetEvent, &subject.args(&[event, function]), line)
    }

    /// Adds an alias.
    pub fn set_alias(&mut self, subject: Subject<'_>, alias: &str, line: usize) -> NodeId {
        self.push_operation(Opcode::SetAlias, &subject.args(&[alias]), line)
    }

    /// Sets a meta value.
    pub fn set_meta(&mut self, subject: Subject<'_>, key: &str, value: &str, line: usize) -> NodeId {
        self.push_operation(Opcode::SetMeta, &subject.args(&[key, value]), line)
    }

    /// Sets an attribute.
    pub fn set_attribute(&mut self, subject: Subject<'_>, attribute: &str, value: &str, line: usize) -> NodeId {
        self.push_operation(Opcode::SetAttribute, &subject.args(&[attribute, value]), line)
    }

    /// Puts an object into a being's inventory.
    pub fn insert_into_inventory(&mut self, object: &str, being: &str, line: usize) -> NodeId {
        self.push_operation(Opcode::InsertIntoInventory, &[object, being], line)
    }

    /// Puts a thing into a place.
    pub fn insert_into_place(&mut self, thing: &str, place: &str, line: usize) -> NodeId {
        self.push_operation(Opcode::InsertIntoPlace, &[thing, place], line)
    }

    /// Connects a room, or every room of a class, to a destination.
    pub fn connect_rooms(&mut self, subject: Subject<'_>, direction: &str, destination: &str, line: usize) -> NodeId {
        self.push_operation(Opcode::ConnectRooms, &subject.args(&[direction, destination]), line)
    }

    /// Allocates an amount of a resource to a tangible entity.
    pub fn allocate_resource(&mut self, resource: &str, tangible: &str, amount: &str, line: usize) -> NodeId {
        self.push_operation(Opcode::AllocateResource, &[resource, tangible, amount], line)
    }

    /// Sets the game timer's period.
    pub fn set_timer_period(&mut self, period: &str, line: usize) -> NodeId {
        self.push_operation(Opcode::SetTimerPeriod, &[period], line)
    }
}
