//! The typed intermediate tree every emitter consumes. One lowering pass
//! produces it from the surface AST; each expression carries a resolved
//! [`IrType`], with [`IrType::Any`] standing for "unknown", never an error.

use std::fmt;

pub use crate::ast::{AssignOp, BinOp, Literal, UnOp};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrType {
    Int,
    Float,
    String,
    Bool,
    Void,
    Array,
    Object,
    Any,
}

impl IrType {
    /// Resolves a surface type spelling, case-insensitively. Absent or
    /// unrecognized spellings come back as [`IrType::Object`] only when they
    /// name something, [`IrType::Any`] otherwise.
    pub fn from_name(name: &str) -> IrType {
        let lower = name.to_lowercase();
        match lower.as_str() {
            "int" | "integer" | "long" | "short" | "byte" => IrType::Int,
            "float" | "double" => IrType::Float,
            "str" | "string" => IrType::String,
            "bool" | "boolean" => IrType::Bool,
            "void" | "none" => IrType::Void,
            _ if lower.contains("list") || lower.contains("array") || lower.contains("[]") => {
                IrType::Array
            }
            _ => IrType::Object,
        }
    }

    pub fn from_annotation(annotation: Option<&str>) -> IrType {
        annotation.map_or(IrType::Any, IrType::from_name)
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IrType::Int => "int",
            IrType::Float => "float",
            IrType::String => "string",
            IrType::Bool => "bool",
            IrType::Void => "void",
            IrType::Array => "array",
            IrType::Object => "object",
            IrType::Any => "any",
        })
    }
}

/// Top-level statements are bucketed so emitters can synthesize their own
/// entry point from `globals` plus `main_body`.
#[derive(Debug, Clone, Default)]
pub struct IrProgram {
    pub functions: Vec<IrFunction>,
    pub classes: Vec<IrClass>,
    pub globals: Vec<IrVariable>,
    pub main_body: Vec<IrStmt>,
}

#[derive(Debug, Clone)]
pub struct IrFunction {
    pub name: String,
    pub parameters: Vec<(String, IrType)>,
    pub return_type: IrType,
    pub body: Vec<IrStmt>,
    pub is_method: bool,
    pub access: Option<String>,
}

#[derive(Debug, Clone)]
pub struct IrClass {
    pub name: String,
    pub bases: Vec<String>,
    pub fields: Vec<IrVariable>,
    pub methods: Vec<IrFunction>,
}

#[derive(Debug, Clone)]
pub struct IrVariable {
    pub name: String,
    pub ty: IrType,
    pub init: Option<IrExpr>,
}

#[derive(Debug, Clone)]
pub enum IrStmt {
    Variable(IrVariable),
    Assignment {
        target: String,
        op: AssignOp,
        value: IrExpr,
    },
    If {
        condition: IrExpr,
        then_block: Vec<IrStmt>,
        elif_blocks: Vec<(IrExpr, Vec<IrStmt>)>,
        else_block: Vec<IrStmt>,
    },
    While {
        condition: IrExpr,
        body: Vec<IrStmt>,
    },
    For {
        variable: String,
        iterable: Option<IrExpr>,
        body: Vec<IrStmt>,
    },
    Return(Option<IrExpr>),
    Break,
    Expression(IrExpr),
    Block(Vec<IrStmt>),
}

#[derive(Debug, Clone)]
pub struct IrExpr {
    pub kind: IrExprKind,
    pub ty: IrType,
}

impl IrExpr {
    pub fn new(kind: IrExprKind, ty: IrType) -> IrExpr {
        IrExpr { kind, ty }
    }
}

#[derive(Debug, Clone)]
pub enum IrExprKind {
    Binary {
        op: BinOp,
        lhs: Box<IrExpr>,
        rhs: Box<IrExpr>,
    },
    Unary {
        op: UnOp,
        operand: Box<IrExpr>,
    },
    Call {
        callee: String,
        args: Vec<IrExpr>,
    },
    MethodCall {
        receiver: Box<IrExpr>,
        method: String,
        args: Vec<IrExpr>,
    },
    Member {
        receiver: Box<IrExpr>,
        name: String,
    },
    Index {
        receiver: Box<IrExpr>,
        index: Box<IrExpr>,
    },
    Invoke {
        target: Box<IrExpr>,
        args: Vec<IrExpr>,
    },
    Identifier(String),
    Literal(Literal),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn type_names_resolve_case_insensitively() {
        assert_eq!(IrType::from_name("Integer"), IrType::Int);
        assert_eq!(IrType::from_name("double"), IrType::Float);
        assert_eq!(IrType::from_name("String"), IrType::String);
        assert_eq!(IrType::from_name("boolean"), IrType::Bool);
        assert_eq!(IrType::from_name("None"), IrType::Void);
        assert_eq!(IrType::from_name("List[int]"), IrType::Array);
        assert_eq!(IrType::from_name("int[]"), IrType::Array);
        assert_eq!(IrType::from_name("Widget"), IrType::Object);
    }

    #[test]
    fn missing_annotations_resolve_to_any() {
        assert_eq!(IrType::from_annotation(None), IrType::Any);
        assert_eq!(IrType::from_annotation(Some("long")), IrType::Int);
    }
}
