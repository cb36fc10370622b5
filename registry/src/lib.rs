#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Canonical unit templates and battle-start instantiation.
//!
//! The registry maps unit names to stat blocks. Unknown or empty names resolve
//! to an all-zero template so that presentation code can always render
//! something, and the lookup miss is reported at debug level.

use std::collections::BTreeMap;

use serde::Deserialize;
use skirmish_core::{Cell, CoreError, Group, MoveClass, UnitState, WeaponTag, WeaponType};
use thiserror::Error;
use tracing::debug;

/// Stat block shared by every instance of a named unit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnitTemplate {
    /// Mobility category.
    pub move_class: MoveClass,
    /// Experience level.
    pub level: u32,
    /// Weapon classification tags.
    pub weapon: WeaponType,
    /// Starting hit points.
    pub hp: u32,
    /// Attack stat.
    pub atk: u32,
    /// Speed stat.
    pub spd: u32,
    /// Defence stat.
    pub def: u32,
    /// Resistance stat.
    pub res: u32,
    /// Skill names granted to the unit.
    pub skills: Vec<String>,
}

/// Errors raised while loading templates from TOML.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The document is not valid TOML or does not match the expected layout.
    #[error("could not parse unit templates: {0}")]
    Parse(#[from] toml::de::Error),
    /// A template entry carried an unknown move class or weapon tag.
    #[error("template '{name}' is invalid: {source}")]
    InvalidTemplate {
        /// Name of the offending entry.
        name: String,
        /// Underlying parse failure.
        #[source]
        source: CoreError,
    },
    /// A template entry had an empty name.
    #[error("template entries require a non-empty name")]
    MissingName,
}

/// Lookup table from unit name to template.
#[derive(Clone, Debug, Default)]
pub struct UnitRegistry {
    templates: BTreeMap<String, UnitTemplate>,
}

impl UnitRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry populated with the built-in cast.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for (name, template) in builtin_templates() {
            let _ = registry.insert(name, template);
        }
        registry
    }

    /// Parses templates from a TOML document made of `[[unit]]` tables.
    ///
    /// ```toml
    /// [[unit]]
    /// name = "Rowan"
    /// move_class = "infantry"
    /// weapon = ["red"]
    /// hp = 40
    /// atk = 32
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self, RegistryError> {
        let document: TemplateDocument = toml::from_str(source)?;
        let mut registry = Self::new();
        let _ = registry.extend_from(document)?;
        Ok(registry)
    }

    /// Adds or replaces templates using a TOML document.
    pub fn load_toml_str(&mut self, source: &str) -> Result<usize, RegistryError> {
        let document: TemplateDocument = toml::from_str(source)?;
        self.extend_from(document)
    }

    /// Inserts a template, returning the one it replaced.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        template: UnitTemplate,
    ) -> Option<UnitTemplate> {
        self.templates.insert(name.into(), template)
    }

    /// Names of every registered template in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Reports whether a template exists for the provided name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Template registered for `name`, or an all-zero template when unknown.
    #[must_use]
    pub fn template_for(&self, name: &str) -> UnitTemplate {
        if name.is_empty() {
            debug!("empty unit name requested; using default template");
            return UnitTemplate::default();
        }

        match self.templates.get(name) {
            Some(template) => template.clone(),
            None => {
                debug!(unit = name, "no template registered; using default template");
                UnitTemplate::default()
            }
        }
    }

    /// Creates fresh battle state for `name` on the given side and cell.
    #[must_use]
    pub fn instantiate(&self, name: &str, group: Group, position: Cell) -> UnitState {
        let template = self.template_for(name);
        UnitState {
            name: name.to_owned(),
            group,
            move_class: template.move_class,
            level: template.level,
            weapon: template.weapon,
            hp: template.hp,
            atk: template.atk,
            spd: template.spd,
            def: template.def,
            res: template.res,
            position,
            has_acted: false,
            has_moved: false,
            ended_turn: false,
            is_alive: true,
            skills: template.skills,
        }
    }

    fn extend_from(&mut self, document: TemplateDocument) -> Result<usize, RegistryError> {
        let mut loaded = 0;
        for entry in document.unit {
            let (name, template) = entry.into_template()?;
            debug!(unit = %name, "registered unit template");
            let _ = self.templates.insert(name, template);
            loaded += 1;
        }
        Ok(loaded)
    }
}

#[derive(Debug, Default, Deserialize)]
struct TemplateDocument {
    #[serde(default)]
    unit: Vec<TemplateEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TemplateEntry {
    name: String,
    #[serde(default)]
    move_class: Option<String>,
    #[serde(default)]
    level: u32,
    #[serde(default)]
    weapon: Vec<String>,
    #[serde(default)]
    hp: u32,
    #[serde(default)]
    atk: u32,
    #[serde(default)]
    spd: u32,
    #[serde(default)]
    def: u32,
    #[serde(default)]
    res: u32,
    #[serde(default)]
    skills: Vec<String>,
}

impl TemplateEntry {
    fn into_template(self) -> Result<(String, UnitTemplate), RegistryError> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(RegistryError::MissingName);
        }

        let invalid = |source: CoreError| RegistryError::InvalidTemplate {
            name: name.clone(),
            source,
        };

        let move_class = match self.move_class.as_deref() {
            Some(value) => value.parse::<MoveClass>().map_err(invalid)?,
            None => MoveClass::default(),
        };
        let tags = self
            .weapon
            .iter()
            .map(|tag| tag.parse::<WeaponTag>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(invalid)?;

        let template = UnitTemplate {
            move_class,
            level: self.level,
            weapon: WeaponType::new(tags),
            hp: self.hp,
            atk: self.atk,
            spd: self.spd,
            def: self.def,
            res: self.res,
            skills: self.skills,
        };
        Ok((name, template))
    }
}

#[allow(clippy::too_many_arguments)]
fn template(
    move_class: MoveClass,
    level: u32,
    weapon: &[WeaponTag],
    hp: u32,
    atk: u32,
    spd: u32,
    def: u32,
    res: u32,
    skills: &[&str],
) -> UnitTemplate {
    UnitTemplate {
        move_class,
        level,
        weapon: WeaponType::new(weapon.iter().copied()),
        hp,
        atk,
        spd,
        def,
        res,
        skills: skills.iter().map(|skill| (*skill).to_owned()).collect(),
    }
}

fn builtin_templates() -> Vec<(&'static str, UnitTemplate)> {
    use MoveClass::{Armored, Cavalry, Flying, Infantry};
    use WeaponTag::{Blue, Colorless, Green, Magic, Red, Staff};

    vec![
        ("Rowan", template(Infantry, 5, &[Red], 40, 32, 30, 22, 15, &[])),
        ("Sela", template(Cavalry, 5, &[Blue], 38, 30, 31, 20, 18, &[])),
        ("Garron", template(Armored, 6, &[Green], 52, 35, 17, 35, 12, &["Guard"])),
        ("Mira", template(Flying, 4, &[Blue, Magic], 33, 31, 28, 14, 30, &[])),
        (
            "Ives",
            template(Infantry, 4, &[Colorless, Staff, Magic], 32, 26, 24, 12, 28, &["Recover"]),
        ),
        ("Brigand", template(Infantry, 4, &[Green], 42, 33, 22, 18, 10, &[])),
        ("Lancer", template(Cavalry, 4, &[Blue], 40, 30, 25, 24, 14, &[])),
        ("Hexer", template(Infantry, 5, &[Red, Magic], 34, 32, 26, 12, 26, &[])),
        ("Wyvern", template(Flying, 6, &[Green], 45, 34, 20, 28, 10, &[])),
        ("Sentinel", template(Armored, 6, &[Blue], 55, 33, 15, 36, 14, &["Guard"])),
    ]
}
