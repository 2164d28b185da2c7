//! Closed vocabularies of the PLCopen model: elementary types, POU kinds,
//! variable list kinds and type references.

use std::fmt;

use crate::document::{Document, NodeId};

/// IEC 61131-3 elementary types as spelled by PLCopen TC6 element names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementaryKind {
    Bool,
    Byte,
    Word,
    DWord,
    LWord,
    SInt,
    Int,
    DInt,
    LInt,
    USInt,
    UInt,
    UDInt,
    ULInt,
    Real,
    LReal,
    Time,
    Date,
    DateAndTime,
    TimeOfDay,
    String,
    WString,
}

impl ElementaryKind {
    pub const ALL: [ElementaryKind; 21] = [
        ElementaryKind::Bool,
        ElementaryKind::Byte,
        ElementaryKind::Word,
        ElementaryKind::DWord,
        ElementaryKind::LWord,
        ElementaryKind::SInt,
        ElementaryKind::Int,
        ElementaryKind::DInt,
        ElementaryKind::LInt,
        ElementaryKind::USInt,
        ElementaryKind::UInt,
        ElementaryKind::UDInt,
        ElementaryKind::ULInt,
        ElementaryKind::Real,
        ElementaryKind::LReal,
        ElementaryKind::Time,
        ElementaryKind::Date,
        ElementaryKind::DateAndTime,
        ElementaryKind::TimeOfDay,
        ElementaryKind::String,
        ElementaryKind::WString,
    ];

    /// Maps a PLCopen type element tag (`BOOL`, `INT`, `string`, ...).
    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag {
            "BOOL" => ElementaryKind::Bool,
            "BYTE" => ElementaryKind::Byte,
            "WORD" => ElementaryKind::Word,
            "DWORD" => ElementaryKind::DWord,
            "LWORD" => ElementaryKind::LWord,
            "SINT" => ElementaryKind::SInt,
            "INT" => ElementaryKind::Int,
            "DINT" => ElementaryKind::DInt,
            "LINT" => ElementaryKind::LInt,
            "USINT" => ElementaryKind::USInt,
            "UINT" => ElementaryKind::UInt,
            "UDINT" => ElementaryKind::UDInt,
            "ULINT" => ElementaryKind::ULInt,
            "REAL" => ElementaryKind::Real,
            "LREAL" => ElementaryKind::LReal,
            "TIME" => ElementaryKind::Time,
            "DATE" => ElementaryKind::Date,
            "DT" => ElementaryKind::DateAndTime,
            "TOD" => ElementaryKind::TimeOfDay,
            "string" => ElementaryKind::String,
            "wstring" => ElementaryKind::WString,
            _ => return None,
        };
        Some(kind)
    }

    /// Maps an IEC type keyword, case-insensitively, including the long
    /// spellings accepted in typed literals (`DATE_AND_TIME`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        let up = name.trim().to_ascii_uppercase();
        match up.as_str() {
            "STRING" => Some(ElementaryKind::String),
            "WSTRING" => Some(ElementaryKind::WString),
            "DATE_AND_TIME" => Some(ElementaryKind::DateAndTime),
            "TIME_OF_DAY" => Some(ElementaryKind::TimeOfDay),
            other => ElementaryKind::from_tag(other),
        }
    }

    /// Canonical upper-case IEC name.
    pub fn name(self) -> &'static str {
        match self {
            ElementaryKind::Bool => "BOOL",
            ElementaryKind::Byte => "BYTE",
            ElementaryKind::Word => "WORD",
            ElementaryKind::DWord => "DWORD",
            ElementaryKind::LWord => "LWORD",
            ElementaryKind::SInt => "SINT",
            ElementaryKind::Int => "INT",
            ElementaryKind::DInt => "DINT",
            ElementaryKind::LInt => "LINT",
            ElementaryKind::USInt => "USINT",
            ElementaryKind::UInt => "UINT",
            ElementaryKind::UDInt => "UDINT",
            ElementaryKind::ULInt => "ULINT",
            ElementaryKind::Real => "REAL",
            ElementaryKind::LReal => "LREAL",
            ElementaryKind::Time => "TIME",
            ElementaryKind::Date => "DATE",
            ElementaryKind::DateAndTime => "DT",
            ElementaryKind::TimeOfDay => "TOD",
            ElementaryKind::String => "STRING",
            ElementaryKind::WString => "WSTRING",
        }
    }

    pub fn is_bool(self) -> bool {
        self == ElementaryKind::Bool
    }

    /// Inclusive value range for integer and bit-string kinds.
    pub fn integer_range(self) -> Option<(i128, i128)> {
        let range = match self {
            ElementaryKind::SInt => (i8::MIN as i128, i8::MAX as i128),
            ElementaryKind::Int => (i16::MIN as i128, i16::MAX as i128),
            ElementaryKind::DInt => (i32::MIN as i128, i32::MAX as i128),
            ElementaryKind::LInt => (i64::MIN as i128, i64::MAX as i128),
            ElementaryKind::USInt | ElementaryKind::Byte => (0, u8::MAX as i128),
            ElementaryKind::UInt | ElementaryKind::Word => (0, u16::MAX as i128),
            ElementaryKind::UDInt | ElementaryKind::DWord => (0, u32::MAX as i128),
            ElementaryKind::ULInt | ElementaryKind::LWord => (0, u64::MAX as i128),
            _ => return None,
        };
        Some(range)
    }

    pub fn is_real(self) -> bool {
        matches!(self, ElementaryKind::Real | ElementaryKind::LReal)
    }
}

impl fmt::Display for ElementaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind of program organisation unit, from the `pouType` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PouKind {
    Program,
    Function,
    FunctionBlock,
}

impl PouKind {
    pub fn from_attr(value: &str) -> Option<Self> {
        match value.trim() {
            "program" => Some(PouKind::Program),
            "function" => Some(PouKind::Function),
            "functionBlock" => Some(PouKind::FunctionBlock),
            _ => None,
        }
    }

    /// Kinds whose local variables may carry located addresses.
    pub fn allows_addresses(self) -> bool {
        matches!(self, PouKind::Program | PouKind::FunctionBlock)
    }
}

/// Kind of a variable list inside a POU interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    InputVars,
    OutputVars,
    InOutVars,
    LocalVars,
    TempVars,
    ExternalVars,
    AccessVars,
    GlobalVars,
}

impl ListKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim() {
            "inputVars" => Some(ListKind::InputVars),
            "outputVars" => Some(ListKind::OutputVars),
            "inOutVars" => Some(ListKind::InOutVars),
            "localVars" => Some(ListKind::LocalVars),
            "tempVars" => Some(ListKind::TempVars),
            "externalVars" => Some(ListKind::ExternalVars),
            "accessVars" => Some(ListKind::AccessVars),
            "globalVars" => Some(ListKind::GlobalVars),
            _ => None,
        }
    }

    /// Only local and external lists may be declared `constant`.
    pub fn may_be_constant(self) -> bool {
        matches!(self, ListKind::LocalVars | ListKind::ExternalVars)
    }

    /// Lists whose variables are bound elsewhere and take no initial value.
    pub fn forbids_initial_value(self) -> bool {
        matches!(self, ListKind::InOutVars | ListKind::ExternalVars)
    }

    /// Lists supported by this profile only when empty.
    pub fn must_be_empty(self) -> bool {
        matches!(self, ListKind::AccessVars | ListKind::GlobalVars)
    }
}

/// Syntactic type reference: the single child of a `type`, `baseType` or
/// `returnType` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSpec {
    Elementary(ElementaryKind),
    /// `<derived name="..."/>`; the name is trimmed and may be empty.
    Derived(String),
    /// Any other element (`array`, `struct`, `enum`, ...).
    Unsupported(String),
}

impl TypeSpec {
    /// Reads the type element under `holder` (e.g. a `type` node).
    pub fn of(doc: &Document, holder: NodeId) -> Option<(NodeId, TypeSpec)> {
        let child = doc.single_child(holder)?;
        Some((child, TypeSpec::from_node(doc, child)))
    }

    pub fn from_node(doc: &Document, node: NodeId) -> TypeSpec {
        let tag = doc.tag(node);
        if let Some(kind) = ElementaryKind::from_tag(tag) {
            TypeSpec::Elementary(kind)
        } else if tag == "derived" {
            TypeSpec::Derived(doc.attr_trimmed(node, "name").to_string())
        } else {
            TypeSpec::Unsupported(tag.to_string())
        }
    }
}

/// What a variable's declared type resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeCategory {
    Elementary(ElementaryKind),
    /// A user data type; its elementary ancestor may or may not exist.
    UserType(String),
    /// A standard, configured or user-defined function block.
    FunctionBlock(String),
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elementary_tags_round_trip_to_names() {
        for kind in ElementaryKind::ALL {
            assert_eq!(ElementaryKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ElementaryKind::from_tag("string"), Some(ElementaryKind::String));
        assert_eq!(ElementaryKind::from_tag("STRING"), None);
        assert_eq!(ElementaryKind::from_name("date_and_time"), Some(ElementaryKind::DateAndTime));
    }

    #[test]
    fn list_kind_rules() {
        assert!(ListKind::LocalVars.may_be_constant());
        assert!(!ListKind::InputVars.may_be_constant());
        assert!(ListKind::InOutVars.forbids_initial_value());
        assert!(ListKind::GlobalVars.must_be_empty());
        assert_eq!(ListKind::from_tag("tempVars"), Some(ListKind::TempVars));
    }

    #[test]
    fn type_spec_reads_derived_names() {
        let mut doc = Document::new("type");
        let derived = doc.append_child(doc.root(), "derived");
        doc.set_attr(derived, "name", "  Speed ");
        let (node, spec) = TypeSpec::of(&doc, doc.root()).unwrap();
        assert_eq!(node, derived);
        assert_eq!(spec, TypeSpec::Derived("Speed".into()));
    }
}
