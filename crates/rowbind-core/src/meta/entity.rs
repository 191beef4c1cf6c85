use super::Field;
use crate::{Error, Result, Value};

use std::fmt;

/// Reads one property off an entity. Built once at registration time and
/// reused for every bind afterwards.
pub type Getter<T> = Box<dyn Fn(&T) -> Value + Send + Sync>;

/// Writes a database-returned value back into an entity.
pub type Setter<T> = Box<dyn Fn(&mut T, Value) + Send + Sync>;

/// One mapped property: entity member name, mapped column, accessors, and
/// the defined member names when the property is enum-typed.
pub struct PropertyMap<T> {
    name: String,
    column: Field,
    enum_members: Vec<String>,
    getter: Getter<T>,
    setter: Option<Setter<T>>,
}

impl<T> PropertyMap<T> {
    /// The entity member name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The mapped column.
    pub fn column(&self) -> &Field {
        &self.column
    }

    /// Defined member names when the property is enum-typed, empty otherwise.
    pub fn enum_members(&self) -> &[String] {
        &self.enum_members
    }

    pub fn get(&self, entity: &T) -> Value {
        (self.getter)(entity)
    }

    pub fn set(&self, entity: &mut T, value: Value) -> Result<()> {
        match &self.setter {
            Some(setter) => {
                setter(entity, value);
                Ok(())
            }
            None => Err(Error::missing_mapping(format!(
                "property `{}` has no setter registered",
                self.name
            ))),
        }
    }

    pub fn has_setter(&self) -> bool {
        self.setter.is_some()
    }
}

// The accessors are opaque closures, so Debug is written by hand.
impl<T> fmt::Debug for PropertyMap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyMap")
            .field("name", &self.name)
            .field("column", &self.column)
            .field("enum_members", &self.enum_members)
            .field("has_setter", &self.setter.is_some())
            .finish_non_exhaustive()
    }
}

/// The complete property-to-column mapping for one entity type.
///
/// Constructed once through [`EntityMapBuilder`] and registered with a
/// [`Registry`](super::Registry); immutable afterwards, so shared freely
/// across threads.
pub struct EntityMap<T> {
    entity: String,
    table: String,
    properties: Vec<PropertyMap<T>>,
}

impl<T> EntityMap<T> {
    pub fn builder(entity: impl Into<String>, table: impl Into<String>) -> EntityMapBuilder<T> {
        EntityMapBuilder {
            entity: entity.into(),
            table: table.into(),
            properties: vec![],
        }
    }

    /// The entity type name, used in error messages.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// The mapped table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn properties(&self) -> &[PropertyMap<T>] {
        &self.properties
    }

    /// Resolves a member name to its property map, case-insensitively on
    /// both the member name and the mapped column.
    pub fn property(&self, member: &str) -> Option<&PropertyMap<T>> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(member))
            .or_else(|| {
                self.properties
                    .iter()
                    .find(|p| p.column == Field::new(member))
            })
    }

    /// Like [`property`](Self::property), failing with a mapping-not-found
    /// error. Unresolvable members are a programming error, never retried.
    pub fn resolve(&self, member: &str) -> Result<&PropertyMap<T>> {
        self.property(member)
            .ok_or_else(|| Error::mapping_not_found(&self.entity, member))
    }

    /// The mapped columns, in registration order.
    pub fn fields(&self) -> Vec<Field> {
        self.properties.iter().map(|p| p.column.clone()).collect()
    }
}

impl<T> fmt::Debug for EntityMap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityMap")
            .field("entity", &self.entity)
            .field("table", &self.table)
            .field("properties", &self.properties)
            .finish()
    }
}

/// Explicit registration API for entity mappings. Replaces attribute
/// scanning: each property is declared with its column and accessors, once,
/// at startup.
pub struct EntityMapBuilder<T> {
    entity: String,
    table: String,
    properties: Vec<PropertyMap<T>>,
}

impl<T> EntityMapBuilder<T> {
    /// Maps a property whose column name equals the member name.
    pub fn property(
        self,
        name: impl Into<String>,
        get: impl Fn(&T) -> Value + Send + Sync + 'static,
    ) -> Self {
        let name = name.into();
        let column = Field::new(name.clone());
        self.push(name, column, vec![], Box::new(get))
    }

    /// Maps a property to an explicitly named column.
    pub fn property_mapped(
        self,
        name: impl Into<String>,
        column: impl Into<Field>,
        get: impl Fn(&T) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.push(name.into(), column.into(), vec![], Box::new(get))
    }

    /// Maps an enum-typed property, declaring the defined member names used
    /// for value coercion during expression parsing.
    pub fn enum_property(
        self,
        name: impl Into<String>,
        members: &[&str],
        get: impl Fn(&T) -> Value + Send + Sync + 'static,
    ) -> Self {
        let name = name.into();
        let column = Field::new(name.clone());
        let members = members.iter().map(|m| m.to_string()).collect();
        self.push(name, column, members, Box::new(get))
    }

    /// Attaches a setter to the most recently declared property, making it a
    /// write-back target for database-returned keys.
    ///
    /// # Panics
    ///
    /// Panics if no property has been declared yet.
    pub fn writable(mut self, set: impl Fn(&mut T, Value) + Send + Sync + 'static) -> Self {
        let last = self
            .properties
            .last_mut()
            .expect("writable() requires a preceding property");
        last.setter = Some(Box::new(set));
        self
    }

    pub fn build(self) -> EntityMap<T> {
        EntityMap {
            entity: self.entity,
            table: self.table,
            properties: self.properties,
        }
    }

    fn push(
        mut self,
        name: String,
        column: Field,
        enum_members: Vec<String>,
        getter: Getter<T>,
    ) -> Self {
        self.properties.push(PropertyMap {
            name,
            column,
            enum_members,
            getter,
            setter: None,
        });
        self
    }
}
