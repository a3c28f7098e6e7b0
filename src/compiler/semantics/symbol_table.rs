use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use super::SemanticError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Input,
    Output,
    Inout,
}

impl Direction {
    /// The keyword the target language uses for this direction
    pub fn keyword(&self) -> &'static str {
        match self {
            Direction::Input => "input",
            Direction::Output => "output",
            Direction::Inout => "inout",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub name: String,
    pub width: u32,
    pub direction: Direction,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub name: String,
    pub width: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub ty: String,
}

/**
 A hardware module and everything that has been declared inside of it so far.

 Ports, wires, registers and parameters are kept in declaration order.  A
 name appears in at most one of these lists; the [`SymbolTable`] checks this
 before anything is added.
*/
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Module {
    name: String,
    io: Vec<Port>,
    wires: Vec<Signal>,
    registers: Vec<Signal>,
    parameters: Vec<Parameter>,
}

impl Module {
    pub fn new(name: &str) -> Module {
        Module {
            name: name.into(),
            io: vec![],
            wires: vec![],
            registers: vec![],
            parameters: vec![],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ports(&self) -> &[Port] {
        &self.io
    }

    pub fn wires(&self) -> &[Signal] {
        &self.wires
    }

    pub fn registers(&self) -> &[Signal] {
        &self.registers
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn get_port(&self, name: &str) -> Option<&Port> {
        self.io.iter().find(|p| p.name == name)
    }

    pub fn get_wire(&self, name: &str) -> Option<&Signal> {
        self.wires.iter().find(|w| w.name == name)
    }

    pub fn get_register(&self, name: &str) -> Option<&Signal> {
        self.registers.iter().find(|r| r.name == name)
    }

    pub fn get_parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// What an identifier refers to from the point of view of the active module.
#[derive(Clone, Debug, PartialEq)]
pub enum Classification {
    Constant,
    Module,
    /// Ports and wires, both are nets driven by continuous assignment
    Wire(u32),
    Register(u32),
    Parameter(String),
    Undefined,
}

impl Classification {
    pub fn is_defined(&self) -> bool {
        *self != Classification::Undefined
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::Constant => f.write_str("constant"),
            Classification::Module => f.write_str("module"),
            Classification::Wire(w) => f.write_fmt(format_args!("wire({})", w)),
            Classification::Register(w) => f.write_fmt(format_args!("register({})", w)),
            Classification::Parameter(ty) => f.write_fmt(format_args!("parameter({})", ty)),
            Classification::Undefined => f.write_str("undefined"),
        }
    }
}

/**
 `SymbolTable` holds every name known to one compilation: the global constants,
 the registry of modules, and which module is currently being defined.

 Constants and module names share one global namespace.  Ports, wires,
 registers and parameters belong to the module that was active when they
 were declared.  Only one module is active at a time, declaring a new module
 makes it the active module.

 Names are resolved in a fixed order: constants, then modules, then the
 active module's ports, wires, registers and parameters.  The first match
 wins.
*/
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SymbolTable {
    constants: HashMap<String, String>,
    modules: Vec<Module>,
    active: Option<usize>,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable {
            constants: HashMap::new(),
            modules: vec![],
            active: None,
        }
    }

    /// Defines `name` as a global constant.  A constant which already exists
    /// is overwritten.
    pub fn define_constant(&mut self, name: &str, value: &str) {
        match self.constants.insert(name.into(), value.into()) {
            Some(old) => debug!("Redefine constant {}: {} -> {}", name, old, value),
            None => debug!("Define constant {} = {}", name, value),
        }
    }

    pub fn constant(&self, name: &str) -> Option<&str> {
        self.constants.get(name).map(|v| v.as_str())
    }

    pub fn constants(&self) -> &HashMap<String, String> {
        &self.constants
    }

    /// Creates a new module and makes it the active module.
    pub fn declare_module(&mut self, name: &str) -> Result<&Module, SemanticError> {
        if self.constants.contains_key(name) || self.get_module(name).is_some() {
            return Err(SemanticError::NameCollision(name.into()));
        }

        debug!("Declare module {}", name);
        self.modules.push(Module::new(name));
        self.active = Some(self.modules.len() - 1);
        Ok(&self.modules[self.modules.len() - 1])
    }

    pub fn declare_port(
        &mut self,
        name: &str,
        width: u32,
        direction: Direction,
    ) -> Result<(), SemanticError> {
        let module = self.free_in_active(name)?;
        debug!("Declare {} port {} [{}] in {}", direction, name, width, module.name);
        module.io.push(Port {
            name: name.into(),
            width,
            direction,
        });
        Ok(())
    }

    pub fn declare_wire(&mut self, name: &str, width: u32) -> Result<(), SemanticError> {
        let module = self.free_in_active(name)?;
        debug!("Declare wire {} [{}] in {}", name, width, module.name);
        module.wires.push(Signal {
            name: name.into(),
            width,
        });
        Ok(())
    }

    pub fn declare_register(&mut self, name: &str, width: u32) -> Result<(), SemanticError> {
        let module = self.free_in_active(name)?;
        debug!("Declare register {} [{}] in {}", name, width, module.name);
        module.registers.push(Signal {
            name: name.into(),
            width,
        });
        Ok(())
    }

    pub fn declare_parameter(&mut self, name: &str, ty: &str) -> Result<(), SemanticError> {
        let module = self.free_in_active(name)?;
        debug!("Declare parameter {}: {} in {}", name, ty, module.name);
        module.parameters.push(Parameter {
            name: name.into(),
            ty: ty.into(),
        });
        Ok(())
    }

    /// Determine what `name` refers to.
    pub fn classify(&self, name: &str) -> Classification {
        if self.constants.contains_key(name) {
            return Classification::Constant;
        }

        if self.get_module(name).is_some() {
            return Classification::Module;
        }

        let module = match self.active_module() {
            Some(m) => m,
            None => return Classification::Undefined,
        };

        if let Some(port) = module.get_port(name) {
            Classification::Wire(port.width)
        } else if let Some(wire) = module.get_wire(name) {
            Classification::Wire(wire.width)
        } else if let Some(reg) = module.get_register(name) {
            Classification::Register(reg.width)
        } else if let Some(param) = module.get_parameter(name) {
            Classification::Parameter(param.ty.clone())
        } else {
            Classification::Undefined
        }
    }

    pub fn active_module(&self) -> Option<&Module> {
        self.active.map(|idx| &self.modules[idx])
    }

    pub fn get_module(&self, name: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.name == name)
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Returns the active module if `name` is not already taken by anything
    /// visible from it.
    fn free_in_active(&mut self, name: &str) -> Result<&mut Module, SemanticError> {
        let idx = self
            .active
            .ok_or_else(|| SemanticError::OutsideModule(name.into()))?;

        if self.classify(name).is_defined() {
            return Err(SemanticError::NameCollision(name.into()));
        }

        Ok(&mut self.modules[idx])
    }
}

impl std::fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Constants\n")?;
        let mut constants: Vec<_> = self.constants.iter().collect();
        constants.sort();
        for (name, value) in constants {
            f.write_fmt(format_args!("\t{} = {}\n", name, value))?;
        }

        for module in &self.modules {
            f.write_fmt(format_args!("Module({})\n", module.name))?;
            f.write_str("\tName | Kind | Width\n")?;
            for p in &module.io {
                f.write_fmt(format_args!("\t{} | {} | {}\n", p.name, p.direction, p.width))?;
            }
            for w in &module.wires {
                f.write_fmt(format_args!("\t{} | wire | {}\n", w.name, w.width))?;
            }
            for r in &module.registers {
                f.write_fmt(format_args!("\t{} | reg | {}\n", r.name, r.width))?;
            }
            for p in &module.parameters {
                f.write_fmt(format_args!("\t{} | parameter | {}\n", p.name, p.ty))?;
            }
        }
        Ok(())
    }
}
