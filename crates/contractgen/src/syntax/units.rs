//! Output units and the unit factory.

use indexmap::{IndexMap, IndexSet};

use super::Declaration;
use crate::{Error, Result};

/// Handle to a unit in [`TypeUnits`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(u32);

impl UnitId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Where an imported name comes from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ImportSource {
    /// Another generated unit; the specifier is computed at render time.
    Unit(UnitId),
    /// An external module. `./` and `../` specifiers are relative to the
    /// output root; anything else is a package name used verbatim.
    External(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Import {
    pub name: String,
    pub source: ImportSource,
}

/// A named container of declarations, addressed by location.
#[derive(Clone, Debug, Default)]
pub struct Unit {
    location: String,
    imports: IndexSet<Import>,
    declarations: Vec<Declaration>,
}

impl Unit {
    fn new(location: &str) -> Self {
        Self {
            location: location.to_string(),
            ..Self::default()
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn imports(&self) -> impl Iterator<Item = &Import> {
        self.imports.iter()
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// Location as a file stem. The empty location is `index`.
    pub fn stem(&self) -> &str {
        if self.location.is_empty() {
            "index"
        } else {
            &self.location
        }
    }

    fn declares(&self, name: &str) -> bool {
        self.declarations.iter().any(|d| d.name() == name)
    }

    fn duplicate(&self, name: &str) -> Error {
        Error::DuplicateDeclaration {
            unit: self.stem().to_string(),
            name: name.to_string(),
        }
    }
}

/// Unit factory: one persistent unit per location, in creation order.
#[derive(Clone, Debug, Default)]
pub struct TypeUnits {
    units: IndexMap<String, Unit>,
}

impl TypeUnits {
    pub fn new() -> Self {
        Self::default()
    }

    /// The unit at `location`, created on first request.
    pub fn get_or_create(&mut self, location: &str) -> UnitId {
        let entry = self.units.entry(location.to_string());
        let index = entry.index();
        entry.or_insert_with(|| Unit::new(location));
        UnitId(index as u32)
    }

    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.get_index(id.index()).map(|(_, unit)| unit)
    }

    pub fn find(&self, location: &str) -> Option<&Unit> {
        self.units.get(location)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (UnitId, &Unit)> {
        self.units
            .values()
            .enumerate()
            .map(|(i, unit)| (UnitId(i as u32), unit))
    }

    /// Import `name` into `into`. Duplicates and self-imports are dropped.
    ///
    /// Fails if `into` already declares `name` or imports it from elsewhere.
    pub fn add_import(&mut self, into: UnitId, name: &str, source: ImportSource) -> Result<()> {
        if source == ImportSource::Unit(into) {
            return Ok(());
        }
        let unit = self.unit_mut(into);
        let clash = unit.declares(name)
            || unit
                .imports
                .iter()
                .any(|import| import.name == name && import.source != source);
        if clash {
            return Err(unit.duplicate(name));
        }

        unit.imports.insert(Import {
            name: name.to_string(),
            source,
        });
        Ok(())
    }

    /// Append a declaration, returning its index in the unit.
    ///
    /// Fails if the name is already declared in or imported into the unit.
    pub fn declare(&mut self, into: UnitId, declaration: Declaration) -> Result<usize> {
        let unit = self.unit_mut(into);
        let name = declaration.name();
        if unit.declares(name) || unit.imports.iter().any(|import| import.name == name) {
            return Err(unit.duplicate(name));
        }

        unit.declarations.push(declaration);
        Ok(unit.declarations.len() - 1)
    }

    pub(crate) fn declaration_mut(&mut self, unit: UnitId, index: usize) -> &mut Declaration {
        &mut self.unit_mut(unit).declarations[index]
    }

    fn unit_mut(&mut self, id: UnitId) -> &mut Unit {
        match self.units.get_index_mut(id.index()) {
            Some((_, unit)) => unit,
            None => crate::invariants::unit_not_found(id),
        }
    }

    /// Module specifier importing `to` from `from`.
    pub fn specifier(&self, from: UnitId, source: &ImportSource) -> String {
        match source {
            ImportSource::External(specifier) => {
                external_specifier(self.get(from).map_or("index", Unit::stem), specifier)
            }
            ImportSource::Unit(to) => {
                let stem = |id: UnitId| self.get(id).map_or("index", Unit::stem);
                relative_specifier(stem(from), stem(*to))
            }
        }
    }
}

/// Rebase a root-relative external specifier onto the file `from`.
/// Package specifiers pass through unchanged.
pub(crate) fn external_specifier(from: &str, specifier: &str) -> String {
    if let Some(target) = specifier.strip_prefix("./") {
        return relative_specifier(from, target);
    }
    if specifier.starts_with("../") {
        let depth = from.matches('/').count();
        return format!("{}{specifier}", "../".repeat(depth));
    }
    specifier.to_string()
}

/// Relative module specifier from the file `from` to the file `to`.
///
/// Both are `/`-separated stems relative to the output root.
pub(crate) fn relative_specifier(from: &str, to: &str) -> String {
    let from_dir: Vec<&str> = match from.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    let to_parts: Vec<&str> = to.split('/').collect();
    let to_dir = &to_parts[..to_parts.len() - 1];

    let common = from_dir
        .iter()
        .zip(to_dir)
        .take_while(|(a, b)| a == b)
        .count();
    let rest = to_parts[common..].join("/");
    let ups = from_dir.len() - common;

    if ups == 0 {
        format!("./{rest}")
    } else {
        format!("{}{rest}", "../".repeat(ups))
    }
}
