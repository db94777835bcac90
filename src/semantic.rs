//! Name resolution and type checking over the surface AST.
//!
//! The analyzer walks the whole program and accumulates every error and
//! warning it finds instead of stopping at the first one. Scopes live in an
//! arena owned by [`SymbolTable`]; exiting a scope pops the live stack but
//! keeps the scope around so callers can inspect the table after the pass.

use std::collections::HashMap;

use crate::{
    ast::{
        AssignOp, BinOp, ClassDef, Expr, ExprKind, FunctionDef, IfStmt, Literal, Program, Stmt,
        StmtKind, UnOp, VariableDecl,
    },
    Lang,
};

/// Callees accepted without a declared symbol.
const BUILTIN_FUNCTIONS: &[&str] = &[
    "print",
    "println",
    "cout",
    "input",
    "read_input",
    "len",
    "range",
    "list",
    "str",
    "int",
    "float",
];

const NUMERIC_TYPES: &[&str] = &["int", "float", "double", "long", "short"];
const BOOL_TYPES: &[&str] = &["bool", "boolean"];

/// Two type names are compatible when they are the same after normalization
/// or both fall in the numeric or boolean family.
pub fn is_type_compatible(expected: &str, actual: &str) -> bool {
    let expected = normalize_type(expected);
    let actual = normalize_type(actual);
    if expected == actual || expected == "any" || actual == "any" {
        return true;
    }
    if NUMERIC_TYPES.contains(&expected.as_str()) && NUMERIC_TYPES.contains(&actual.as_str()) {
        return true;
    }
    BOOL_TYPES.contains(&expected.as_str()) && BOOL_TYPES.contains(&actual.as_str())
}

fn normalize_type(name: &str) -> String {
    let lower = name.to_lowercase();
    match lower.as_str() {
        "string" => "str".to_string(),
        "none" | "null" => "None".to_string(),
        _ => lower,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Function,
    Class,
    Parameter,
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub ty: String,
    pub line: u32,
    pub column: u32,
    /// Parameter names and declared types, for function symbols.
    pub parameters: Vec<(String, String)>,
    pub return_type: String,
    pub methods: HashMap<String, Symbol>,
    pub fields: HashMap<String, Symbol>,
    pub base_classes: Vec<String>,
}

impl Symbol {
    fn new(name: &str, kind: SymbolKind, ty: &str, line: u32, column: u32) -> Symbol {
        Symbol {
            name: name.to_string(),
            kind,
            ty: ty.to_string(),
            line,
            column,
            parameters: Vec::new(),
            return_type: "any".to_string(),
            methods: HashMap::new(),
            fields: HashMap::new(),
            base_classes: Vec::new(),
        }
    }
}

#[derive(Debug)]
struct Scope {
    #[allow(dead_code)]
    name: String,
    parent: Option<usize>,
    symbols: HashMap<String, Symbol>,
}

/// Arena of scopes plus the stack of currently open ones. Scopes are never
/// removed, so lookups stay valid after the walk finishes.
#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    stack: Vec<usize>,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable {
            scopes: vec![Scope {
                name: "global".to_string(),
                parent: None,
                symbols: HashMap::new(),
            }],
            stack: vec![0],
        }
    }

    fn current(&self) -> usize {
        *self.stack.last().unwrap_or(&0)
    }

    fn enter_scope(&mut self, name: &str) {
        let parent = self.current();
        self.scopes.push(Scope {
            name: name.to_string(),
            parent: Some(parent),
            symbols: HashMap::new(),
        });
        self.stack.push(self.scopes.len() - 1);
    }

    fn exit_scope(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    /// Defines `symbol` in the innermost open scope. Returns false when the
    /// name is already taken there.
    fn define(&mut self, symbol: Symbol) -> bool {
        let current = self.current();
        let scope = &mut self.scopes[current];
        if scope.symbols.contains_key(&symbol.name) {
            return false;
        }
        scope.symbols.insert(symbol.name.clone(), symbol);
        true
    }

    /// Walks the scope chain from the innermost open scope outwards.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        let mut idx = Some(self.current());
        while let Some(i) = idx {
            if let Some(symbol) = self.scopes[i].symbols.get(name) {
                return Some(symbol);
            }
            idx = self.scopes[i].parent;
        }
        None
    }

    fn lookup_current(&self, name: &str) -> Option<&Symbol> {
        self.scopes[self.current()].symbols.get(name)
    }

    fn symbol_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        let mut idx = Some(self.current());
        while let Some(i) = idx {
            if self.scopes[i].symbols.contains_key(name) {
                return self.scopes[i].symbols.get_mut(name);
            }
            idx = self.scopes[i].parent;
        }
        None
    }
}

impl Default for SymbolTable {
    fn default() -> SymbolTable {
        SymbolTable::new()
    }
}

/// Outcome of one analysis pass.
#[derive(Debug)]
pub struct SemanticResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub symbols: SymbolTable,
}

pub fn check(program: &Program, lang: Lang) -> SemanticResult {
    Analyzer::new(lang).check(program)
}

struct Analyzer {
    lang: Lang,
    table: SymbolTable,
    errors: Vec<String>,
    warnings: Vec<String>,
    /// Return types of the functions currently being walked, innermost last.
    function_stack: Vec<String>,
}

impl Analyzer {
    fn new(lang: Lang) -> Analyzer {
        let mut table = SymbolTable::new();
        if lang == Lang::Cpp {
            for name in ["cout", "cin", "endl"] {
                table.define(Symbol::new(name, SymbolKind::Variable, "any", 0, 0));
            }
        }
        Analyzer {
            lang,
            table,
            errors: Vec::new(),
            warnings: Vec::new(),
            function_stack: Vec::new(),
        }
    }

    fn check(mut self, program: &Program) -> SemanticResult {
        for stmt in &program.statements {
            self.statement(stmt);
        }
        SemanticResult {
            valid: self.errors.is_empty(),
            errors: self.errors,
            warnings: self.warnings,
            symbols: self.table,
        }
    }

    fn error(&mut self, message: String, line: u32, column: u32) {
        self.errors
            .push(format!("{message} at line {line}, column {column}"));
    }

    fn bool_type(&self) -> &'static str {
        match self.lang {
            Lang::Java => "boolean",
            Lang::Python | Lang::Cpp => "bool",
        }
    }

    fn statement(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::FunctionDef(func) => self.function_def(func, stmt.line, stmt.column),
            StmtKind::ClassDef(class) => self.class_def(class, stmt.line, stmt.column),
            StmtKind::VariableDecl(decl) => self.variable_decl(decl, stmt.line, stmt.column),
            StmtKind::If(if_stmt) => self.if_statement(if_stmt),
            StmtKind::While { condition, body } => {
                let ty = self.expression(condition);
                self.check_condition(&ty, condition.line, condition.column);
                self.statements(body);
            }
            StmtKind::For {
                variable,
                iterable,
                body,
            } => {
                if let Some(iterable) = iterable {
                    self.expression(iterable);
                }
                if !variable.is_empty() && self.table.lookup_current(variable).is_none() {
                    self.table.define(Symbol::new(
                        variable,
                        SymbolKind::Variable,
                        "any",
                        stmt.line,
                        stmt.column,
                    ));
                }
                self.statements(body);
            }
            StmtKind::Return(value) => self.return_statement(value.as_ref(), stmt.line, stmt.column),
            StmtKind::Break => {}
            StmtKind::Assignment { target, op, value } => {
                self.assignment(target, *op, value, stmt.line, stmt.column);
            }
            StmtKind::Expression(expr) => {
                self.expression(expr);
            }
            StmtKind::Block(statements) => self.statements(statements),
        }
    }

    fn statements(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            self.statement(stmt);
        }
    }

    fn function_def(&mut self, func: &FunctionDef, line: u32, column: u32) {
        let return_type = func
            .return_type
            .clone()
            .unwrap_or_else(|| "any".to_string());
        let mut symbol = Symbol::new(&func.name, SymbolKind::Function, &return_type, line, column);
        symbol.return_type = return_type.clone();
        symbol.parameters = func
            .parameters
            .iter()
            .map(|p| {
                (
                    p.name.clone(),
                    p.ty.clone().unwrap_or_else(|| "any".to_string()),
                )
            })
            .collect();
        if !self.table.define(symbol) {
            self.error(format!("Function '{}' is already defined", func.name), line, column);
        }

        self.table.enter_scope(&func.name);
        self.function_stack.push(return_type);
        for param in &func.parameters {
            let ty = param.ty.clone().unwrap_or_else(|| "any".to_string());
            if !self.table.define(Symbol::new(
                &param.name,
                SymbolKind::Parameter,
                &ty,
                line,
                column,
            )) {
                self.error(
                    format!("Parameter '{}' is already defined", param.name),
                    line,
                    column,
                );
            }
        }
        self.statements(&func.body);
        self.function_stack.pop();
        self.table.exit_scope();
    }

    fn class_def(&mut self, class: &ClassDef, line: u32, column: u32) {
        let mut symbol = Symbol::new(&class.name, SymbolKind::Class, &class.name, line, column);
        symbol.base_classes.clone_from(&class.bases);
        if !self.table.define(symbol) {
            self.error(format!("Class '{}' is already defined", class.name), line, column);
        }

        self.table.enter_scope(&class.name);
        for field in &class.fields {
            self.variable_decl(field, line, column);
            if let Some(field_symbol) = self.table.lookup_current(&field.name).cloned() {
                if let Some(class_symbol) = self.table.symbol_mut(&class.name) {
                    class_symbol.fields.insert(field.name.clone(), field_symbol);
                }
            }
        }
        for method in &class.methods {
            self.function_def(method, line, column);
            if let Some(method_symbol) = self.table.lookup_current(&method.name).cloned() {
                if let Some(class_symbol) = self.table.symbol_mut(&class.name) {
                    class_symbol
                        .methods
                        .insert(method.name.clone(), method_symbol);
                }
            }
        }
        self.table.exit_scope();
    }

    fn variable_decl(&mut self, decl: &VariableDecl, line: u32, column: u32) {
        let init_type = decl.init.as_ref().map(|init| self.expression(init));
        let declared = decl.ty.clone().or_else(|| init_type.clone());
        let ty = declared.unwrap_or_else(|| "any".to_string());

        if let (Some(declared), Some(actual)) = (&decl.ty, &init_type) {
            if !is_type_compatible(declared, actual) {
                self.error(
                    format!(
                        "Type mismatch: cannot assign '{actual}' to variable '{}' of type '{declared}'",
                        decl.name
                    ),
                    line,
                    column,
                );
            }
        }
        if !self
            .table
            .define(Symbol::new(&decl.name, SymbolKind::Variable, &ty, line, column))
        {
            self.error(format!("Variable '{}' is already defined", decl.name), line, column);
        }
    }

    fn if_statement(&mut self, if_stmt: &IfStmt) {
        let ty = self.expression(&if_stmt.condition);
        self.check_condition(&ty, if_stmt.condition.line, if_stmt.condition.column);
        self.statements(&if_stmt.then_block);
        for (condition, block) in &if_stmt.elif_blocks {
            let ty = self.expression(condition);
            self.check_condition(&ty, condition.line, condition.column);
            self.statements(block);
        }
        self.statements(&if_stmt.else_block);
    }

    fn check_condition(&mut self, ty: &str, line: u32, column: u32) {
        let normalized = normalize_type(ty);
        if !matches!(normalized.as_str(), "bool" | "boolean" | "int" | "any") {
            self.warnings.push(format!(
                "Condition has type '{ty}' at line {line}, column {column}"
            ));
        }
    }

    fn return_statement(&mut self, value: Option<&Expr>, line: u32, column: u32) {
        let Some(expected) = self.function_stack.last().cloned() else {
            self.error("Return outside function".to_string(), line, column);
            if let Some(value) = value {
                self.expression(value);
            }
            return;
        };
        match value {
            Some(value) => {
                let actual = self.expression(value);
                if expected != "any" && expected != "void" && !is_type_compatible(&expected, &actual)
                {
                    self.error(
                        format!("Type mismatch: cannot return '{actual}' from function returning '{expected}'"),
                        line,
                        column,
                    );
                }
            }
            None => {
                if !matches!(expected.as_str(), "any" | "void" | "None") {
                    self.error(
                        format!("Missing return value in function returning '{expected}'"),
                        line,
                        column,
                    );
                }
            }
        }
    }

    fn assignment(&mut self, target: &str, op: AssignOp, value: &Expr, line: u32, column: u32) {
        let value_type = self.expression(value);
        match self.table.lookup(target) {
            Some(symbol) => {
                let declared = symbol.ty.clone();
                if !is_type_compatible(&declared, &value_type) {
                    self.error(
                        format!(
                            "Type mismatch: cannot assign '{value_type}' to variable '{target}' of type '{declared}'"
                        ),
                        line,
                        column,
                    );
                }
            }
            None if self.lang == Lang::Python && op == AssignOp::Assign => {
                // First write defines the name.
                self.table.define(Symbol::new(
                    target,
                    SymbolKind::Variable,
                    &value_type,
                    line,
                    column,
                ));
            }
            None => {
                self.error(format!("Variable '{target}' is not defined"), line, column);
            }
        }
    }

    /// Infers the type of `expr`, reporting any errors found along the way.
    fn expression(&mut self, expr: &Expr) -> String {
        match &expr.kind {
            ExprKind::Literal(literal) => literal_type(literal).to_string(),
            ExprKind::Identifier(name) => match self.table.lookup(name) {
                Some(symbol) => symbol.ty.clone(),
                None => {
                    self.error(
                        format!("Variable '{name}' is not defined"),
                        expr.line,
                        expr.column,
                    );
                    "any".to_string()
                }
            },
            ExprKind::Binary { op, lhs, rhs } => {
                let left = self.expression(lhs);
                let right = self.expression(rhs);
                self.binary(*op, &left, &right, expr.line, expr.column)
            }
            ExprKind::Unary { op, operand } => {
                let ty = self.expression(operand);
                match op {
                    UnOp::Not => self.bool_type().to_string(),
                    UnOp::Neg | UnOp::Pos => {
                        let normalized = normalize_type(&ty);
                        if normalized != "any" && !NUMERIC_TYPES.contains(&normalized.as_str()) {
                            self.error(
                                format!("Invalid operand of type '{ty}' for unary '{}'", op.as_str()),
                                expr.line,
                                expr.column,
                            );
                        }
                        ty
                    }
                }
            }
            ExprKind::Call { callee, args } => {
                for arg in args {
                    self.expression(arg);
                }
                self.call(callee, args.len(), expr.line, expr.column)
            }
            ExprKind::MethodCall { receiver, args, .. } => {
                self.expression(receiver);
                for arg in args {
                    self.expression(arg);
                }
                "any".to_string()
            }
            ExprKind::Invoke { target, args } => {
                self.expression(target);
                for arg in args {
                    self.expression(arg);
                }
                "any".to_string()
            }
            ExprKind::Member { receiver, .. } => {
                self.expression(receiver);
                "any".to_string()
            }
            ExprKind::Index { receiver, index } => {
                self.expression(receiver);
                self.expression(index);
                "any".to_string()
            }
        }
    }

    fn binary(&mut self, op: BinOp, left: &str, right: &str, line: u32, column: u32) -> String {
        if op.is_comparison() || op.is_logical() {
            return self.bool_type().to_string();
        }
        if matches!(op, BinOp::Shl | BinOp::Shr) {
            return "any".to_string();
        }
        let l = normalize_type(left);
        let r = normalize_type(right);
        if l == "any" || r == "any" {
            return "any".to_string();
        }
        let l_num = NUMERIC_TYPES.contains(&l.as_str());
        let r_num = NUMERIC_TYPES.contains(&r.as_str());
        if l_num && r_num {
            if matches!(l.as_str(), "float" | "double") || matches!(r.as_str(), "float" | "double")
            {
                return "float".to_string();
            }
            return "int".to_string();
        }
        if op == BinOp::Add && l == "str" && r == "str" {
            return "str".to_string();
        }
        self.error(
            format!("Invalid operands '{left}' and '{right}' for '{}'", op.as_str()),
            line,
            column,
        );
        "any".to_string()
    }

    fn call(&mut self, callee: &str, arg_count: usize, line: u32, column: u32) -> String {
        if let Some(symbol) = self.table.lookup(callee) {
            match symbol.kind {
                SymbolKind::Function => {
                    let expected = symbol.parameters.len();
                    let return_type = symbol.return_type.clone();
                    if arg_count != expected {
                        self.error(
                            format!(
                                "Function '{callee}' expects {expected} arguments but got {arg_count}"
                            ),
                            line,
                            column,
                        );
                    }
                    return return_type;
                }
                SymbolKind::Class => return symbol.name.clone(),
                SymbolKind::Variable | SymbolKind::Parameter => return "any".to_string(),
            }
        }
        if BUILTIN_FUNCTIONS.contains(&callee) {
            return builtin_return_type(callee).to_string();
        }
        self.error(format!("Function '{callee}' is not defined"), line, column);
        "any".to_string()
    }
}

fn literal_type(literal: &Literal) -> &'static str {
    match literal {
        Literal::Int(_) => "int",
        Literal::Float(_) => "float",
        Literal::Str(_) => "str",
        Literal::Bool(_) => "bool",
        Literal::Null => "None",
    }
}

fn builtin_return_type(callee: &str) -> &'static str {
    match callee {
        "len" | "int" => "int",
        "float" => "float",
        "input" | "str" => "str",
        // Stream reads adapt to the declared target type.
        "read_input" => "any",
        "range" | "list" => "list",
        _ => "any",
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{lexer, parser};

    fn analyze(source: &str, lang: Lang) -> SemanticResult {
        let tokens = lexer::tokenize(source, lang);
        let program = parser::parse(&tokens, lang).expect("parse failed");
        check(&program, lang)
    }

    #[test]
    fn define_rejects_duplicates_only_in_the_same_scope() {
        let mut table = SymbolTable::new();
        assert!(table.define(Symbol::new("x", SymbolKind::Variable, "int", 1, 1)));
        assert!(!table.define(Symbol::new("x", SymbolKind::Variable, "int", 2, 1)));
        table.enter_scope("inner");
        assert!(table.define(Symbol::new("x", SymbolKind::Variable, "int", 3, 1)));
    }

    #[test]
    fn factorial_checks_clean() {
        let source = indoc! {"
            def factorial(n):
                if n <= 1:
                    return 1
                return n * factorial(n - 1)
        "};
        let result = analyze(source, Lang::Python);
        assert_eq!(result.errors, Vec::<String>::new());
        assert!(result.valid);
        let symbol = result.symbols.lookup("factorial").expect("missing symbol");
        assert_eq!(symbol.kind, SymbolKind::Function);
        assert_eq!(symbol.parameters.len(), 1);
    }

    #[test]
    fn undefined_variable_is_reported() {
        let source = indoc! {"
            def test():
                x = 5
                y = undefined_var + 10
                return y
        "};
        let result = analyze(source, Lang::Python);
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.contains("undefined_var")));
    }

    #[test]
    fn first_write_defines_only_in_the_dynamic_surface() {
        let result = analyze("x = 1\n", Lang::Python);
        assert!(result.valid);
        assert!(result.symbols.lookup("x").is_some());

        let result = analyze("x = 1;", Lang::Java);
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.contains("'x' is not defined")));
    }

    #[test]
    fn function_scope_symbols_are_not_visible_outside() {
        let source = indoc! {"
            def test():
                local = 5
                return local
        "};
        let result = analyze(source, Lang::Python);
        assert!(result.valid);
        assert!(result.symbols.lookup("local").is_none());
        assert!(result.symbols.lookup("test").is_some());
    }

    #[test]
    fn numeric_and_boolean_families_are_lattices() {
        assert!(is_type_compatible("int", "float"));
        assert!(is_type_compatible("double", "int"));
        assert!(is_type_compatible("bool", "boolean"));
        assert!(is_type_compatible("str", "str"));
        assert!(!is_type_compatible("bool", "int"));
        assert!(!is_type_compatible("str", "int"));
    }

    #[test]
    fn wrong_argument_count_is_an_error() {
        let source = indoc! {"
            def add(a, b):
                return a + b

            result = add(1)
        "};
        let result = analyze(source, Lang::Python);
        assert!(!result.valid);
        assert!(result
            .errors
            .iter()
            .any(|e| e.contains("expects 2 arguments but got 1")));
    }

    #[test]
    fn string_condition_warns_but_stays_valid() {
        let source = indoc! {"
            if \"yes\":
                x = 1
        "};
        let result = analyze(source, Lang::Python);
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("Condition has type 'str'"));
    }

    #[test]
    fn mixed_operand_arithmetic_is_an_error() {
        let result = analyze("x = 1 + \"one\"\n", Lang::Python);
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.contains("Invalid operands")));
    }

    #[test]
    fn string_concatenation_is_accepted() {
        let result = analyze("greeting = \"hi \" + \"there\"\n", Lang::Python);
        assert!(result.valid);
        let symbol = result.symbols.lookup("greeting").expect("missing symbol");
        assert_eq!(symbol.ty, "str");
    }

    #[test]
    fn redefining_a_function_is_an_error() {
        let source = indoc! {"
            def f():
                return 1

            def f():
                return 2
        "};
        let result = analyze(source, Lang::Python);
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.contains("already defined")));
    }

    #[test]
    fn return_outside_function_is_an_error() {
        let result = analyze("return 1\n", Lang::Python);
        assert!(!result.valid);
        assert!(result
            .errors
            .iter()
            .any(|e| e.contains("Return outside function")));
    }

    #[test]
    fn stream_globals_are_seeded_for_the_stream_surface() {
        let result = analyze("cout << 1 << endl;", Lang::Cpp);
        assert!(result.valid, "errors: {:?}", result.errors);
    }

    #[test]
    fn declared_type_mismatch_is_reported() {
        let result = analyze("int x = \"five\";", Lang::Java);
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.contains("Type mismatch")));
    }

    #[test]
    fn class_symbol_records_methods_and_bases() {
        let source = indoc! {"
            class Dog(Animal):
                def bark(self):
                    return 1
        "};
        let result = analyze(source, Lang::Python);
        let symbol = result.symbols.lookup("Dog").expect("missing class");
        assert_eq!(symbol.kind, SymbolKind::Class);
        assert_eq!(symbol.base_classes, vec!["Animal".to_string()]);
        assert!(symbol.methods.contains_key("bark"));
    }
}
