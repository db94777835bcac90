//! AST to IR lowering. One depth-first pass that keeps its own lightweight
//! scope stack, separate from the semantic analyzer's table, to decide
//! whether an assignment declares a fresh variable or mutates an existing
//! one, and to give every expression a resolved [`IrType`].

use std::collections::HashMap;

use crate::{
    ast::{
        AssignOp, BinOp, ClassDef, Expr, ExprKind, FunctionDef, Literal, Program, Stmt, StmtKind,
        UnOp, VariableDecl,
    },
    ir::{IrClass, IrExpr, IrExprKind, IrFunction, IrProgram, IrStmt, IrType, IrVariable},
    Lang,
};

pub fn lower(program: &Program, lang: Lang) -> IrProgram {
    Lowering::new(lang).program(program)
}

struct Lowering {
    lang: Lang,
    scopes: Vec<HashMap<String, IrType>>,
}

impl Lowering {
    fn new(lang: Lang) -> Lowering {
        Lowering {
            lang,
            scopes: vec![HashMap::new()],
        }
    }

    fn define(&mut self, name: &str, ty: IrType) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), ty);
        }
    }

    fn lookup(&self, name: &str) -> Option<IrType> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }

    fn program(mut self, program: &Program) -> IrProgram {
        let mut ir = IrProgram::default();
        for stmt in &program.statements {
            match &stmt.kind {
                StmtKind::FunctionDef(func) => ir.functions.push(self.function(func, false)),
                StmtKind::ClassDef(class) => ir.classes.push(self.class(class)),
                StmtKind::VariableDecl(decl) => {
                    let variable = self.variable(decl);
                    self.define(&variable.name, variable.ty);
                    ir.globals.push(variable);
                }
                StmtKind::Assignment { target, op, value }
                    if self.lang == Lang::Python
                        && *op == AssignOp::Assign
                        && self.lookup(target).is_none() =>
                {
                    // A first write at top level is a global declaration.
                    let value = self.expression(value);
                    let ty = value.ty;
                    self.define(target, ty);
                    ir.globals.push(IrVariable {
                        name: target.clone(),
                        ty,
                        init: Some(value),
                    });
                }
                _ => {
                    if let Some(lowered) = self.statement(stmt) {
                        ir.main_body.push(lowered);
                    }
                }
            }
        }
        ir
    }

    fn function(&mut self, func: &FunctionDef, is_method: bool) -> IrFunction {
        self.scopes.push(HashMap::new());
        let parameters: Vec<(String, IrType)> = func
            .parameters
            .iter()
            .map(|p| (p.name.clone(), IrType::from_annotation(p.ty.as_deref())))
            .collect();
        for (name, ty) in &parameters {
            self.define(name, *ty);
        }

        let body: Vec<IrStmt> = func.body.iter().filter_map(|s| self.statement(s)).collect();
        self.scopes.pop();

        let return_type = match &func.return_type {
            Some(annotation) => IrType::from_name(annotation),
            None => match infer_return_type(&body) {
                IrType::Any => IrType::Void,
                inferred => inferred,
            },
        };

        IrFunction {
            name: func.name.clone(),
            parameters,
            return_type,
            body,
            is_method,
            access: func.access.clone(),
        }
    }

    fn class(&mut self, class: &ClassDef) -> IrClass {
        self.scopes.push(HashMap::new());
        let fields: Vec<IrVariable> = class
            .fields
            .iter()
            .map(|f| {
                let variable = self.variable(f);
                self.define(&variable.name, variable.ty);
                variable
            })
            .collect();
        let methods = class
            .methods
            .iter()
            .map(|m| self.function(m, true))
            .collect();
        self.scopes.pop();

        IrClass {
            name: class.name.clone(),
            bases: class.bases.clone(),
            fields,
            methods,
        }
    }

    fn variable(&mut self, decl: &VariableDecl) -> IrVariable {
        let init = decl.init.as_ref().map(|e| self.expression(e));
        let ty = match &decl.ty {
            Some(annotation) => IrType::from_name(annotation),
            None => init.as_ref().map_or(IrType::Any, |e| e.ty),
        };
        IrVariable {
            name: decl.name.clone(),
            ty,
            init,
        }
    }

    fn statement(&mut self, stmt: &Stmt) -> Option<IrStmt> {
        match &stmt.kind {
            StmtKind::FunctionDef(_) | StmtKind::ClassDef(_) => None,
            StmtKind::VariableDecl(decl) => {
                let variable = self.variable(decl);
                self.define(&variable.name, variable.ty);
                Some(IrStmt::Variable(variable))
            }
            StmtKind::Assignment { target, op, value } => {
                let value = self.expression(value);
                if self.lang == Lang::Python
                    && *op == AssignOp::Assign
                    && self.lookup(target).is_none()
                {
                    let ty = value.ty;
                    self.define(target, ty);
                    return Some(IrStmt::Variable(IrVariable {
                        name: target.clone(),
                        ty,
                        init: Some(value),
                    }));
                }
                Some(IrStmt::Assignment {
                    target: target.clone(),
                    op: *op,
                    value,
                })
            }
            StmtKind::If(if_stmt) => Some(IrStmt::If {
                condition: self.expression(&if_stmt.condition),
                then_block: self.statements(&if_stmt.then_block),
                elif_blocks: if_stmt
                    .elif_blocks
                    .iter()
                    .map(|(c, b)| (self.expression(c), self.statements(b)))
                    .collect(),
                else_block: self.statements(&if_stmt.else_block),
            }),
            StmtKind::While { condition, body } => Some(IrStmt::While {
                condition: self.expression(condition),
                body: self.statements(body),
            }),
            StmtKind::For {
                variable,
                iterable,
                body,
            } => {
                let iterable = iterable.as_ref().map(|e| self.expression(e));
                if !variable.is_empty() {
                    self.define(variable, IrType::Any);
                }
                Some(IrStmt::For {
                    variable: variable.clone(),
                    iterable,
                    body: self.statements(body),
                })
            }
            StmtKind::Return(value) => {
                Some(IrStmt::Return(value.as_ref().map(|e| self.expression(e))))
            }
            StmtKind::Break => Some(IrStmt::Break),
            StmtKind::Expression(expr) => Some(IrStmt::Expression(self.expression(expr))),
            StmtKind::Block(statements) => Some(IrStmt::Block(self.statements(statements))),
        }
    }

    fn statements(&mut self, statements: &[Stmt]) -> Vec<IrStmt> {
        statements.iter().filter_map(|s| self.statement(s)).collect()
    }

    fn expression(&mut self, expr: &Expr) -> IrExpr {
        match &expr.kind {
            ExprKind::Literal(literal) => {
                let ty = literal_type(literal);
                IrExpr::new(IrExprKind::Literal(literal.clone()), ty)
            }
            ExprKind::Identifier(name) => {
                let ty = self.lookup(name).unwrap_or(IrType::Any);
                IrExpr::new(IrExprKind::Identifier(name.clone()), ty)
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let lhs = self.expression(lhs);
                let rhs = self.expression(rhs);
                let ty = infer_binary(*op, lhs.ty, rhs.ty);
                IrExpr::new(
                    IrExprKind::Binary {
                        op: *op,
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                    },
                    ty,
                )
            }
            ExprKind::Unary { op, operand } => {
                let operand = self.expression(operand);
                let ty = match op {
                    UnOp::Not => IrType::Bool,
                    UnOp::Neg | UnOp::Pos => operand.ty,
                };
                IrExpr::new(
                    IrExprKind::Unary {
                        op: *op,
                        operand: Box::new(operand),
                    },
                    ty,
                )
            }
            ExprKind::Call { callee, args } => {
                let args: Vec<IrExpr> = args.iter().map(|a| self.expression(a)).collect();
                let ty = call_return_type(callee);
                IrExpr::new(
                    IrExprKind::Call {
                        callee: callee.clone(),
                        args,
                    },
                    ty,
                )
            }
            ExprKind::MethodCall {
                receiver,
                method,
                args,
            } => {
                let receiver = self.expression(receiver);
                let args: Vec<IrExpr> = args.iter().map(|a| self.expression(a)).collect();
                let ty = call_return_type(method);
                IrExpr::new(
                    IrExprKind::MethodCall {
                        receiver: Box::new(receiver),
                        method: method.clone(),
                        args,
                    },
                    ty,
                )
            }
            ExprKind::Member { receiver, name } => {
                let receiver = self.expression(receiver);
                IrExpr::new(
                    IrExprKind::Member {
                        receiver: Box::new(receiver),
                        name: name.clone(),
                    },
                    IrType::Any,
                )
            }
            ExprKind::Index { receiver, index } => {
                let receiver = self.expression(receiver);
                let index = self.expression(index);
                IrExpr::new(
                    IrExprKind::Index {
                        receiver: Box::new(receiver),
                        index: Box::new(index),
                    },
                    IrType::Any,
                )
            }
            ExprKind::Invoke { target, args } => {
                let target = self.expression(target);
                let args: Vec<IrExpr> = args.iter().map(|a| self.expression(a)).collect();
                IrExpr::new(
                    IrExprKind::Invoke {
                        target: Box::new(target),
                        args,
                    },
                    IrType::Any,
                )
            }
        }
    }
}

fn literal_type(literal: &Literal) -> IrType {
    match literal {
        Literal::Int(_) => IrType::Int,
        Literal::Float(_) => IrType::Float,
        Literal::Str(_) => IrType::String,
        Literal::Bool(_) => IrType::Bool,
        Literal::Null => IrType::Any,
    }
}

/// Binary result typing mirrors the checker's arithmetic rule. Unknown
/// operands are treated as integers so untyped arithmetic still lands on a
/// concrete numeric type.
fn infer_binary(op: BinOp, lhs: IrType, rhs: IrType) -> IrType {
    if op.is_comparison() || op.is_logical() {
        return IrType::Bool;
    }
    if matches!(op, BinOp::Shl | BinOp::Shr) {
        return IrType::Any;
    }
    if op == BinOp::Add && (lhs == IrType::String || rhs == IrType::String) {
        return IrType::String;
    }
    if lhs == IrType::Float || rhs == IrType::Float {
        return IrType::Float;
    }
    IrType::Int
}

fn call_return_type(callee: &str) -> IrType {
    match callee {
        "int" | "stoi" | "len" | "size" | "length" => IrType::Int,
        "float" | "stof" => IrType::Float,
        "str" | "to_string" | "input" | "read_input" => IrType::String,
        "range" | "list" => IrType::Array,
        "print" | "println" => IrType::Void,
        _ => IrType::Any,
    }
}

/// The first typed return decides an unannotated function's return type.
fn infer_return_type(body: &[IrStmt]) -> IrType {
    for stmt in body {
        let found = match stmt {
            IrStmt::Return(Some(expr)) if expr.ty != IrType::Any => Some(expr.ty),
            IrStmt::Return(_) => None,
            IrStmt::If {
                then_block,
                elif_blocks,
                else_block,
                ..
            } => {
                let mut found = infer_return_type(then_block);
                for (_, block) in elif_blocks {
                    if found != IrType::Any {
                        break;
                    }
                    found = infer_return_type(block);
                }
                if found == IrType::Any {
                    found = infer_return_type(else_block);
                }
                (found != IrType::Any).then_some(found)
            }
            IrStmt::While { body, .. } | IrStmt::For { body, .. } | IrStmt::Block(body) => {
                let found = infer_return_type(body);
                (found != IrType::Any).then_some(found)
            }
            _ => None,
        };
        if let Some(ty) = found {
            return ty;
        }
    }
    IrType::Any
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{lexer, parser};

    fn lower_source(source: &str, lang: Lang) -> IrProgram {
        let tokens = lexer::tokenize(source, lang);
        let program = parser::parse(&tokens, lang).expect("parse failed");
        lower(&program, lang)
    }

    #[test]
    fn untyped_addition_lands_on_int() {
        let source = indoc! {"
            def add(a, b):
                result = a + b
                return result
        "};
        let ir = lower_source(source, Lang::Python);
        assert_eq!(ir.functions.len(), 1);
        let func = &ir.functions[0];
        assert_eq!(func.return_type, IrType::Int);
        let IrStmt::Variable(decl) = &func.body[0] else {
            panic!("expected fresh declaration");
        };
        assert_eq!(decl.name, "result");
        assert_eq!(decl.ty, IrType::Int);
    }

    #[test]
    fn top_level_statements_bucket_by_kind() {
        let source = indoc! {"
            def helper():
                return 1

            count = 0
            count = count + 1
            print(count)
        "};
        let ir = lower_source(source, Lang::Python);
        assert_eq!(ir.functions.len(), 1);
        assert_eq!(ir.globals.len(), 1);
        assert_eq!(ir.globals[0].name, "count");
        assert_eq!(ir.main_body.len(), 2);
        assert!(matches!(ir.main_body[0], IrStmt::Assignment { .. }));
        assert!(matches!(ir.main_body[1], IrStmt::Expression(_)));
    }

    #[test]
    fn second_write_is_a_mutation_not_a_declaration() {
        let source = indoc! {"
            def bump():
                x = 5
                x = x + 1
                return x
        "};
        let ir = lower_source(source, Lang::Python);
        let body = &ir.functions[0].body;
        assert!(matches!(body[0], IrStmt::Variable(_)));
        assert!(matches!(body[1], IrStmt::Assignment { .. }));
    }

    #[test]
    fn annotations_win_over_inference() {
        let source = indoc! {"
            def half(n: int) -> float:
                return n / 2
        "};
        let ir = lower_source(source, Lang::Python);
        let func = &ir.functions[0];
        assert_eq!(func.parameters, vec![("n".to_string(), IrType::Int)]);
        assert_eq!(func.return_type, IrType::Float);
    }

    #[test]
    fn declared_types_flow_into_globals() {
        let ir = lower_source("double ratio = 0.5;", Lang::Java);
        assert_eq!(ir.globals.len(), 1);
        assert_eq!(ir.globals[0].ty, IrType::Float);
    }

    #[test]
    fn class_methods_are_marked_as_methods() {
        let source = indoc! {"
            class Counter:
                def get(self):
                    return 0
        "};
        let ir = lower_source(source, Lang::Python);
        assert_eq!(ir.classes.len(), 1);
        assert!(ir.classes[0].methods[0].is_method);
    }

    #[test]
    fn float_operand_widens_arithmetic() {
        assert_eq!(infer_binary(BinOp::Mul, IrType::Int, IrType::Float), IrType::Float);
        assert_eq!(infer_binary(BinOp::Add, IrType::Int, IrType::Int), IrType::Int);
        assert_eq!(infer_binary(BinOp::Lt, IrType::Int, IrType::Int), IrType::Bool);
        assert_eq!(
            infer_binary(BinOp::Add, IrType::String, IrType::String),
            IrType::String
        );
    }

    #[test]
    fn comparison_typed_conditions_reach_the_ir() {
        let source = indoc! {"
            def sign(n):
                if n < 0:
                    return -1
                return 1
        "};
        let ir = lower_source(source, Lang::Python);
        let IrStmt::If { condition, .. } = &ir.functions[0].body[0] else {
            panic!("expected if");
        };
        assert_eq!(condition.ty, IrType::Bool);
    }
}
