//! Per-type converters compiled from a [`TypeDescriptor`].

mod cache;

pub use cache::{ConverterCache, get_converter};

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::adapters::{ResultCursor, StatementHandle, column_labels};
use crate::coercion::set_parameter;
use crate::error::{BuildError, SqlMarshalError};
use crate::object::{DataObject, FieldType, Getter, Setter, TypeDescriptor};

/// Column position to writable-member ordinal, `None` for columns without a member.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnCodes(Vec<Option<usize>>);

impl ColumnCodes {
    /// Sentinel used by [`to_ordinals`](Self::to_ordinals) for skipped columns.
    pub const SKIP: i64 = -1;

    #[must_use]
    pub fn new(codes: Vec<Option<usize>>) -> Self {
        Self(codes)
    }

    #[must_use]
    pub fn get(&self, column: usize) -> Option<usize> {
        self.0.get(column).copied().flatten()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<usize>> + '_ {
        self.0.iter().copied()
    }

    /// The codes with skipped columns rendered as `-1`.
    #[must_use]
    pub fn to_ordinals(&self) -> Vec<i64> {
        self.0
            .iter()
            .map(|code| code.and_then(|c| i64::try_from(c).ok()).unwrap_or(Self::SKIP))
            .collect()
    }
}

struct Reader<T> {
    getter: Getter<T>,
}

struct Writer<T> {
    name: String,
    field_type: FieldType,
    setter: Setter<T>,
}

/// Compiled bind, map and read behavior for one data object type.
///
/// Immutable once built; share it freely between threads.
pub struct TypeConverter<T> {
    type_name: &'static str,
    readers: HashMap<String, Reader<T>>,
    writers: Vec<Writer<T>>,
    writer_ordinals: HashMap<String, usize>,
    constructor: fn() -> T,
}

impl<T> TypeConverter<T> {
    /// Compile a converter from a descriptor.
    ///
    /// # Errors
    /// `SqlMarshalError::ConverterBuild` when the descriptor has no constructor, repeats
    /// a member name, or declares a member with no accessor.
    pub fn build(descriptor: TypeDescriptor<T>) -> Result<Self, SqlMarshalError> {
        let type_name = descriptor.type_name();
        let fail = |source: BuildError| SqlMarshalError::ConverterBuild { type_name, source };

        let mut readers = HashMap::new();
        let mut writers = Vec::new();
        let mut writer_ordinals = HashMap::new();
        let mut seen = HashSet::new();

        for member in descriptor.members() {
            if !seen.insert(member.name()) {
                return Err(fail(BuildError::DuplicateMember(member.name().to_string())));
            }
            if !member.is_readable() && !member.is_writable() {
                return Err(fail(BuildError::InaccessibleMember(member.name().to_string())));
            }
            if let Some(getter) = member.getter() {
                readers.insert(member.name().to_string(), Reader { getter });
            }
            if let Some(setter) = member.setter() {
                writer_ordinals.insert(member.name().to_string(), writers.len());
                writers.push(Writer {
                    name: member.name().to_string(),
                    field_type: member.field_type(),
                    setter,
                });
            }
        }

        let constructor = descriptor
            .constructor()
            .ok_or_else(|| fail(BuildError::CannotInstantiate))?;

        debug!(
            type_name,
            readable = readers.len(),
            writable = writers.len(),
            "compiled type converter"
        );

        Ok(Self {
            type_name,
            readers,
            writers,
            writer_ordinals,
            constructor,
        })
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Writable member names in ordinal order.
    pub fn writable_names(&self) -> impl Iterator<Item = &str> {
        self.writers.iter().map(|w| w.name.as_str())
    }

    #[must_use]
    pub fn is_readable(&self, name: &str) -> bool {
        self.readers.contains_key(name)
    }

    /// Bind the members named in `names` at positions 1..=n.
    ///
    /// Names without a readable member leave their position unbound.
    ///
    /// # Errors
    /// Propagates binding failures from the statement handle.
    pub fn bind<S, N>(&self, stmt: &mut S, obj: &T, names: &[N]) -> Result<(), SqlMarshalError>
    where
        S: StatementHandle + ?Sized,
        N: AsRef<str>,
    {
        for (position, name) in names.iter().enumerate() {
            let name = name.as_ref();
            let Some(reader) = self.readers.get(name) else {
                trace!(type_name = self.type_name, name, "no readable member, skipping");
                continue;
            };
            set_parameter(stmt, position + 1, (reader.getter)(obj))?;
        }
        Ok(())
    }

    /// Map result column labels to writable member ordinals by exact name.
    #[must_use]
    pub fn map_column_codes<L: AsRef<str>>(&self, labels: &[L]) -> ColumnCodes {
        ColumnCodes(
            labels
                .iter()
                .map(|label| self.writer_ordinals.get(label.as_ref()).copied())
                .collect(),
        )
    }

    /// [`map_column_codes`](Self::map_column_codes) over the labels of a cursor.
    ///
    /// # Errors
    /// Propagates label lookup failures from the cursor.
    pub fn map_labels_of<C>(&self, cursor: &C) -> Result<ColumnCodes, SqlMarshalError>
    where
        C: ResultCursor + ?Sized,
    {
        Ok(self.map_column_codes(&column_labels(cursor)?))
    }

    /// Construct a new object and populate it from the cursor's current row.
    ///
    /// # Errors
    /// `SqlMarshalError::Coercion` naming the member whose column could not be coerced;
    /// fetch failures from the cursor; `SqlMarshalError::Execution` for codes that were
    /// not produced by this converter.
    pub fn read<C>(&self, cursor: &C, codes: &ColumnCodes) -> Result<T, SqlMarshalError>
    where
        C: ResultCursor + ?Sized,
    {
        let mut obj = (self.constructor)();
        for (column, code) in codes.iter().enumerate() {
            let Some(ordinal) = code else {
                continue;
            };
            let writer = self.writers.get(ordinal).ok_or_else(|| {
                SqlMarshalError::Execution(format!(
                    "column code {ordinal} has no member in {}",
                    self.type_name
                ))
            })?;
            let sql_type = cursor.column_type(column)?;
            let value = cursor.fetch(column, sql_type)?;
            (writer.setter)(&mut obj, value).map_err(|source| SqlMarshalError::Coercion {
                member: writer.name.clone(),
                source,
            })?;
        }
        Ok(obj)
    }

    /// Read every row, mapping column codes once from the first row.
    ///
    /// # Errors
    /// See [`read`](Self::read).
    pub fn read_all<C: ResultCursor>(&self, rows: &[C]) -> Result<Vec<T>, SqlMarshalError> {
        let Some(first) = rows.first() else {
            return Ok(Vec::new());
        };
        let codes = self.map_labels_of(first)?;
        rows.iter().map(|row| self.read(row, &codes)).collect()
    }

    /// Declared type of the writable member at `ordinal`.
    #[must_use]
    pub fn field_type_of(&self, ordinal: usize) -> Option<FieldType> {
        self.writers.get(ordinal).map(|w| w.field_type)
    }
}

impl<T: DataObject> TypeConverter<T> {
    /// Build a converter from the type's own descriptor.
    ///
    /// # Errors
    /// See [`build`](Self::build).
    pub fn compile() -> Result<Self, SqlMarshalError> {
        Self::build(T::descriptor())
    }
}

impl<T> std::fmt::Debug for TypeConverter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeConverter")
            .field("type_name", &self.type_name)
            .field("readable", &self.readers.len())
            .field("writable", &self.writer_ordinals)
            .finish_non_exhaustive()
    }
}
