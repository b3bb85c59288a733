//! Column declarations shared by list pages and the export encoder.

/// Maps a stored status code to its display label
pub type LabelLookup = fn(&str) -> Option<&'static str>;

/// How a column's values are displayed and exported
#[derive(Debug, Clone, Copy, Default)]
pub enum ColumnKind {
    #[default]
    Text,
    Number,
    Date,
    DateTime,
    /// Arrays joined with the export list delimiter
    List,
    /// Code rendered through a label table
    Status(LabelLookup),
}

#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub field: String,
    pub title: String,
    pub kind: ColumnKind,
    pub sortable: bool,
    pub width: Option<u32>,
}

impl ColumnDef {
    pub fn new(field: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            title: title.into(),
            kind: ColumnKind::Text,
            sortable: true,
            width: None,
        }
    }

    pub fn kind(mut self, kind: ColumnKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }
}
