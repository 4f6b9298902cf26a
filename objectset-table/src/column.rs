//! Column definitions.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::TableRow;
use crate::api::CellContext;
use crate::error::SaveError;
use crate::validation::FieldProps;
use crate::value::CellValue;

/// Horizontal alignment for column content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Column kind. Drives default alignment, comparator and formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnType {
    #[default]
    String,
    Number,
    Boolean,
    Date,
    /// Row action buttons. Never editable or sortable by default.
    Actions,
}

impl ColumnType {
    /// Default alignment for this kind of column.
    pub fn default_align(self) -> Alignment {
        match self {
            ColumnType::Number => Alignment::Right,
            ColumnType::Boolean | ColumnType::Actions => Alignment::Center,
            ColumnType::String | ColumnType::Date => Alignment::Left,
        }
    }

    /// Default comparator for this kind of column.
    pub fn compare(self, a: &CellValue, b: &CellValue) -> Ordering {
        match self {
            // Text columns compare case-insensitively first so "apple" and
            // "Banana" sort the way people expect.
            ColumnType::String => match (a.as_text(), b.as_text()) {
                (Some(x), Some(y)) => x
                    .to_lowercase()
                    .cmp(&y.to_lowercase())
                    .then_with(|| x.cmp(y)),
                _ => a.natural_cmp(b),
            },
            _ => a.natural_cmp(b),
        }
    }
}

pub type ValueGetter<T> = Arc<dyn Fn(&T) -> CellValue + Send + Sync>;
pub type ValueSetter<T> = Arc<dyn Fn(&mut T, CellValue) + Send + Sync>;
pub type ValueFormatter = Arc<dyn Fn(&CellValue) -> String + Send + Sync>;
pub type RowComparator = Arc<dyn Fn(&CellValue, &CellValue) -> Ordering + Send + Sync>;
pub type CellRenderer<T> = Arc<dyn Fn(&CellContext<T>) -> String + Send + Sync>;

/// Persists a committed cell value.
///
/// Called after the cell form validated. `Ok(true)` commits the value,
/// `Ok(false)` and `Err(_)` keep the cell in edit mode with the error shown
/// next to the row.
#[async_trait]
pub trait SaveHandler<T: TableRow>: Send + Sync {
    async fn save(&self, value: CellValue, context: CellContext<T>) -> Result<bool, SaveError>;
}

/// Adapter for synchronous save closures.
pub struct FnSaveHandler<F>(pub F);

#[async_trait]
impl<T, F> SaveHandler<T> for FnSaveHandler<F>
where
    T: TableRow,
    F: Fn(&CellValue, &CellContext<T>) -> bool + Send + Sync,
{
    async fn save(&self, value: CellValue, context: CellContext<T>) -> Result<bool, SaveError> {
        Ok((self.0)(&value, &context))
    }
}

/// A table column definition.
///
/// The `field` key identifies the column and must be unique within a table.
///
/// # Examples
///
/// ```ignore
/// let name = ColumnDef::new("name")
///     .title("Name")
///     .editable()
///     .sortable()
///     .getter(|c: &Contact| c.name.clone().into())
///     .setter(|c, v| c.name = v.to_string())
///     .validate_with("required");
/// ```
pub struct ColumnDef<T> {
    pub field: String,
    pub title: Option<String>,
    pub column_type: ColumnType,
    pub width: Option<u16>,
    pub min_width: Option<u16>,
    pub max_width: Option<u16>,
    pub align: Option<Alignment>,
    pub editable: bool,
    /// Editable on the trailing insert row even when `editable` is false.
    pub insertable: bool,
    pub sortable: bool,
    pub value_getter: Option<ValueGetter<T>>,
    pub value_setter: Option<ValueSetter<T>>,
    pub value_formatter: Option<ValueFormatter>,
    pub render_cell: Option<CellRenderer<T>>,
    pub render_cell_editor: Option<CellRenderer<T>>,
    pub on_save: Option<Arc<dyn SaveHandler<T>>>,
    pub row_comparator: Option<RowComparator>,
    /// Names of validators from the table's registry.
    pub validators: Vec<String>,
    /// Props handed to the validator factories.
    pub props: FieldProps,
}

impl<T: TableRow> ColumnDef<T> {
    /// Create a string column with the given field key.
    pub fn new(field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            props: FieldProps::new(field.clone()),
            field,
            title: None,
            column_type: ColumnType::default(),
            width: None,
            min_width: None,
            max_width: None,
            align: None,
            editable: false,
            insertable: false,
            sortable: false,
            value_getter: None,
            value_setter: None,
            value_formatter: None,
            render_cell: None,
            render_cell_editor: None,
            on_save: None,
            row_comparator: None,
            validators: Vec::new(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        let title = title.into();
        self.props.label = title.clone();
        self.title = Some(title);
        self
    }

    pub fn column_type(mut self, column_type: ColumnType) -> Self {
        self.column_type = column_type;
        self
    }

    pub fn width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    pub fn min_width(mut self, width: u16) -> Self {
        self.min_width = Some(width);
        self
    }

    pub fn max_width(mut self, width: u16) -> Self {
        self.max_width = Some(width);
        self
    }

    pub fn align(mut self, align: Alignment) -> Self {
        self.align = Some(align);
        self
    }

    /// Allow editing existing rows and the insert row.
    pub fn editable(mut self) -> Self {
        self.editable = true;
        self.insertable = true;
        self
    }

    /// Allow editing on the insert row only.
    pub fn insertable(mut self) -> Self {
        self.insertable = true;
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn getter(mut self, f: impl Fn(&T) -> CellValue + Send + Sync + 'static) -> Self {
        self.value_getter = Some(Arc::new(f));
        self
    }

    pub fn setter(mut self, f: impl Fn(&mut T, CellValue) + Send + Sync + 'static) -> Self {
        self.value_setter = Some(Arc::new(f));
        self
    }

    pub fn formatter(mut self, f: impl Fn(&CellValue) -> String + Send + Sync + 'static) -> Self {
        self.value_formatter = Some(Arc::new(f));
        self
    }

    pub fn render_cell(
        mut self,
        f: impl Fn(&CellContext<T>) -> String + Send + Sync + 'static,
    ) -> Self {
        self.render_cell = Some(Arc::new(f));
        self
    }

    pub fn render_cell_editor(
        mut self,
        f: impl Fn(&CellContext<T>) -> String + Send + Sync + 'static,
    ) -> Self {
        self.render_cell_editor = Some(Arc::new(f));
        self
    }

    pub fn on_save(mut self, handler: impl SaveHandler<T> + 'static) -> Self {
        self.on_save = Some(Arc::new(handler));
        self
    }

    pub fn comparator(
        mut self,
        f: impl Fn(&CellValue, &CellValue) -> Ordering + Send + Sync + 'static,
    ) -> Self {
        self.row_comparator = Some(Arc::new(f));
        self
    }

    /// Run the named validator from the table's registry on commit.
    pub fn validate_with(mut self, name: impl Into<String>) -> Self {
        self.validators.push(name.into());
        self
    }

    /// Adjust the validator props.
    pub fn props(mut self, f: impl FnOnce(&mut FieldProps)) -> Self {
        f(&mut self.props);
        self
    }

    /// Header text, falling back to the field key.
    pub fn header(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.field)
    }

    /// Effective alignment.
    pub fn alignment(&self) -> Alignment {
        self.align.unwrap_or_else(|| self.column_type.default_align())
    }

    /// Extract this column's value from a row.
    pub fn value(&self, row: &T) -> CellValue {
        self.value_getter
            .as_ref()
            .map(|get| get(row))
            .unwrap_or_default()
    }

    /// Format a value for display.
    pub fn format(&self, value: &CellValue) -> String {
        match &self.value_formatter {
            Some(format) => format(value),
            None => value.to_string(),
        }
    }

    /// Effective width, clamped to the min/max bounds.
    pub fn effective_width(&self) -> Option<u16> {
        let width = self.width.or(self.min_width)?;
        let width = self.min_width.map_or(width, |min| width.max(min));
        Some(self.max_width.map_or(width, |max| width.min(max)))
    }
}

impl<T> Clone for ColumnDef<T> {
    fn clone(&self) -> Self {
        Self {
            field: self.field.clone(),
            title: self.title.clone(),
            column_type: self.column_type,
            width: self.width,
            min_width: self.min_width,
            max_width: self.max_width,
            align: self.align,
            editable: self.editable,
            insertable: self.insertable,
            sortable: self.sortable,
            value_getter: self.value_getter.clone(),
            value_setter: self.value_setter.clone(),
            value_formatter: self.value_formatter.clone(),
            render_cell: self.render_cell.clone(),
            render_cell_editor: self.render_cell_editor.clone(),
            on_save: self.on_save.clone(),
            row_comparator: self.row_comparator.clone(),
            validators: self.validators.clone(),
            props: self.props.clone(),
        }
    }
}

impl<T> fmt::Debug for ColumnDef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDef")
            .field("field", &self.field)
            .field("title", &self.title)
            .field("column_type", &self.column_type)
            .field("editable", &self.editable)
            .field("insertable", &self.insertable)
            .field("sortable", &self.sortable)
            .field("validators", &self.validators)
            .finish_non_exhaustive()
    }
}
