//! Stream-I/O emitter. Print calls become `cout` insertion chains, prompted
//! reads split into a prompt insertion plus a `cin >>` read tied to the
//! declaration, and loose top-level statements are wrapped in a synthesized
//! `int main()` when the source did not provide one.

use crate::{
    codegen::{
        dotted_name, escape_double_quoted, format_float, match_prompt_read, Writer,
    },
    ir::{
        BinOp, IrClass, IrExpr, IrExprKind, IrFunction, IrProgram, IrStmt, IrType, IrVariable,
        Literal, UnOp,
    },
};

pub(crate) fn generate(ir: &IrProgram) -> String {
    let mut w = Writer::new();
    w.line("#include <iostream>");
    w.line("#include <string>");
    w.blank();
    w.line("using namespace std;");
    w.blank();

    // Prompted reads on globals declare at file scope, but their prompt and
    // stream read are executable statements and belong inside main.
    let mut reads = Vec::new();
    for global in &ir.globals {
        global_variable(&mut w, global, &mut reads);
    }
    if !ir.globals.is_empty() {
        w.blank();
    }
    for class in &ir.classes {
        emit_class(&mut w, class);
    }
    for func in &ir.functions {
        function(&mut w, func, false);
    }

    let has_main = ir.functions.iter().any(|f| f.name == "main");
    if (!ir.main_body.is_empty() || !reads.is_empty()) && !has_main {
        w.line("int main() {");
        w.indent();
        for read in reads {
            w.line(read);
        }
        for stmt in &ir.main_body {
            statement(&mut w, stmt);
        }
        w.line("return 0;");
        w.dedent();
        w.line("}");
    }
    w.finish()
}

fn global_variable(w: &mut Writer, var: &IrVariable, reads: &mut Vec<String>) {
    if let Some(init) = &var.init {
        if let Some(read) = match_prompt_read(init) {
            let ty = match read.conversion {
                Some("float" | "stof") => "double",
                Some("int" | "stoi") => "int",
                None => "string",
                Some(_) => declared_type(var.ty),
            };
            w.line(format!("{ty} {};", var.name));
            if let Some(prompt) = read.prompt {
                reads.push(format!("cout << {};", expr(prompt)));
            }
            reads.push(format!("cin >> {};", var.name));
            return;
        }
    }
    variable(w, var);
}

fn map_type(ty: IrType) -> &'static str {
    match ty {
        IrType::Int => "int",
        IrType::Float => "double",
        IrType::String => "string",
        IrType::Bool => "bool",
        IrType::Void => "void",
        IrType::Array => "vector<int>",
        IrType::Object => "void*",
        IrType::Any => "auto",
    }
}

/// Declared names need a concrete spelling even when the type is unknown.
fn declared_type(ty: IrType) -> &'static str {
    match ty {
        IrType::Any => "int",
        other => map_type(other),
    }
}

fn function(w: &mut Writer, func: &IrFunction, in_class: bool) {
    // The dynamic surface's receiver parameter has no place in a brace
    // method signature.
    let parameters: Vec<&(String, IrType)> = func
        .parameters
        .iter()
        .skip(usize::from(
            in_class
                && func
                    .parameters
                    .first()
                    .is_some_and(|(name, _)| name == "self" || name == "this"),
        ))
        .collect();
    let params: Vec<String> = parameters
        .iter()
        .map(|(name, ty)| format!("{} {name}", map_type(*ty)))
        .collect();
    w.line(format!(
        "{} {}({}) {{",
        map_type(func.return_type),
        func.name,
        params.join(", ")
    ));
    w.indent();
    for stmt in &func.body {
        statement(w, stmt);
    }
    w.dedent();
    w.line("}");
    w.blank();
}

fn emit_class(w: &mut Writer, class: &IrClass) {
    if class.bases.is_empty() {
        w.line(format!("class {} {{", class.name));
    } else {
        let bases: Vec<String> = class.bases.iter().map(|b| format!("public {b}")).collect();
        w.line(format!("class {} : {} {{", class.name, bases.join(", ")));
    }
    w.line("public:");
    w.indent();
    for field in &class.fields {
        w.line(format!("{} {};", declared_type(field.ty), field.name));
    }
    if !class.fields.is_empty() {
        w.blank();
    }
    for method in &class.methods {
        function(w, method, true);
    }
    w.dedent();
    w.line("};");
    w.blank();
}

fn variable(w: &mut Writer, var: &IrVariable) {
    let ty = declared_type(var.ty);
    let Some(init) = &var.init else {
        w.line(format!("{ty} {} = {};", var.name, default_value(var.ty)));
        return;
    };
    // A prompted read becomes prompt insertion, declaration, stream read.
    if let Some(read) = match_prompt_read(init) {
        if let Some(prompt) = read.prompt {
            w.line(format!("cout << {};", expr(prompt)));
        }
        let ty = match read.conversion {
            Some("float" | "stof") => "double",
            Some("int" | "stoi") => "int",
            None => "string",
            Some(_) => ty,
        };
        w.line(format!("{ty} {};", var.name));
        w.line(format!("cin >> {};", var.name));
        return;
    }
    w.line(format!("{ty} {} = {};", var.name, expr(init)));
}

fn default_value(ty: IrType) -> &'static str {
    match ty {
        IrType::Int => "0",
        IrType::Float => "0.0",
        IrType::String => "\"\"",
        IrType::Bool => "false",
        IrType::Array => "{}",
        IrType::Void | IrType::Object => "nullptr",
        IrType::Any => "0",
    }
}

fn statement(w: &mut Writer, stmt: &IrStmt) {
    match stmt {
        IrStmt::Variable(var) => variable(w, var),
        IrStmt::Assignment { target, op, value } => {
            // Reads lowered from any surface come back as stream reads.
            if let IrExprKind::Call { callee, args } = &value.kind {
                if matches!(callee.as_str(), "input" | "read_input") {
                    if let Some(prompt) = args.first() {
                        w.line(format!("cout << {};", expr(prompt)));
                    }
                    w.line(format!("cin >> {target};"));
                    return;
                }
            }
            w.line(format!("{target} {} {};", op.as_str(), expr(value)));
        }
        IrStmt::If {
            condition,
            then_block,
            elif_blocks,
            else_block,
        } => {
            w.line(format!("if ({}) {{", expr(condition)));
            w.indent();
            for stmt in then_block {
                statement(w, stmt);
            }
            w.dedent();
            w.line("}");
            for (elif_condition, elif_body) in elif_blocks {
                w.line(format!("else if ({}) {{", expr(elif_condition)));
                w.indent();
                for stmt in elif_body {
                    statement(w, stmt);
                }
                w.dedent();
                w.line("}");
            }
            if !else_block.is_empty() {
                w.line("else {");
                w.indent();
                for stmt in else_block {
                    statement(w, stmt);
                }
                w.dedent();
                w.line("}");
            }
        }
        IrStmt::While { condition, body } => {
            w.line(format!("while ({}) {{", expr(condition)));
            w.indent();
            for stmt in body {
                statement(w, stmt);
            }
            w.dedent();
            w.line("}");
        }
        IrStmt::For {
            variable,
            iterable,
            body,
        } => {
            let iterable = iterable
                .as_ref()
                .map_or_else(|| "vector<int>{}".to_string(), expr);
            w.line(format!("for (auto {variable} : {iterable}) {{"));
            w.indent();
            for stmt in body {
                statement(w, stmt);
            }
            w.dedent();
            w.line("}");
        }
        IrStmt::Return(Some(value)) => w.line(format!("return {};", expr(value))),
        IrStmt::Return(None) => w.line("return;"),
        IrStmt::Break => w.line("break;"),
        IrStmt::Expression(value) => w.line(format!("{};", expr(value))),
        IrStmt::Block(statements) => {
            for stmt in statements {
                statement(w, stmt);
            }
        }
    }
}

fn expr(e: &IrExpr) -> String {
    match &e.kind {
        IrExprKind::Literal(literal) => literal_text(literal),
        IrExprKind::Identifier(name) => name.clone(),
        IrExprKind::Binary { op, lhs, rhs } => {
            let left = expr(lhs);
            let right = expr(rhs);
            match op {
                // Insertion chains stay flat instead of nesting parens.
                BinOp::Shl => format!("{left} << {right}"),
                BinOp::Shr => format!("{left} >> {right}"),
                BinOp::And => format!("({left} && {right})"),
                BinOp::Or => format!("({left} || {right})"),
                BinOp::FloorDiv => format!("({left} / {right})"),
                BinOp::Pow => format!("pow({left}, {right})"),
                other => format!("({left} {} {right})", other.as_str()),
            }
        }
        IrExprKind::Unary { op, operand } => {
            let operand = expr(operand);
            match op {
                UnOp::Not => format!("!{operand}"),
                UnOp::Neg => format!("-{operand}"),
                UnOp::Pos => format!("+{operand}"),
            }
        }
        IrExprKind::Call { callee, args } => call(callee, args),
        IrExprKind::MethodCall {
            receiver,
            method,
            args,
        } => {
            if let Some(name) = dotted_name(receiver) {
                return call(&format!("{name}.{method}"), args);
            }
            call(&format!("{}.{method}", expr(receiver)), args)
        }
        IrExprKind::Member { receiver, name } => format!("{}.{name}", expr(receiver)),
        IrExprKind::Index { receiver, index } => {
            format!("{}[{}]", expr(receiver), expr(index))
        }
        IrExprKind::Invoke { target, args } => {
            let rendered: Vec<String> = args.iter().map(expr).collect();
            format!("{}({})", expr(target), rendered.join(", "))
        }
    }
}

fn call(callee: &str, args: &[IrExpr]) -> String {
    let rendered: Vec<String> = args.iter().map(expr).collect();

    // Print calls re-expand into an insertion chain ending in a newline.
    if matches!(callee, "print" | "println" | "System.out.println") {
        if rendered.is_empty() {
            return "cout << endl".to_string();
        }
        return format!("cout << {} << endl", rendered.join(" << "));
    }
    if callee == "System.out.print" {
        return format!("cout << {}", rendered.join(" << "));
    }
    let mapped = match callee {
        "str" | "to_string" | "String.valueOf" => "to_string",
        "int" | "Integer.parseInt" => "stoi",
        "float" | "Double.parseDouble" => "stof",
        "len" | "length" => "size",
        other => other,
    };
    format!("{mapped}({})", rendered.join(", "))
}

fn literal_text(literal: &Literal) -> String {
    match literal {
        Literal::Int(value) => value.to_string(),
        Literal::Float(value) => format_float(*value),
        Literal::Str(value) => format!("\"{}\"", escape_double_quoted(value)),
        Literal::Bool(true) => "true".to_string(),
        Literal::Bool(false) => "false".to_string(),
        Literal::Null => "nullptr".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{lexer, lower, parser, Lang};

    fn translate_to_cpp(source: &str, from: Lang) -> String {
        let tokens = lexer::tokenize(source, from);
        let program = parser::parse(&tokens, from).expect("parse failed");
        generate(&lower::lower(&program, from))
    }

    const HEADER: &str = "#include <iostream>\n#include <string>\n\nusing namespace std;\n\n";

    #[test]
    fn add_translates_with_integer_types() {
        let source = indoc! {"
            def add(a, b):
                result = a + b
                return result
        "};
        let out = translate_to_cpp(source, Lang::Python);
        let expected = format!(
            "{HEADER}{}",
            indoc! {"
                int add(auto a, auto b) {
                    int result = (a + b);
                    return result;
                }
            "}
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn print_expands_to_an_insertion_chain() {
        let out = translate_to_cpp("print(\"total\", n)\n", Lang::Python);
        assert!(out.contains("cout << \"total\" << n << endl;"));
    }

    #[test]
    fn prompted_read_splits_into_prompt_and_stream_read() {
        let out = translate_to_cpp("age = int(input(\"Age: \"))\nprint(age)\n", Lang::Python);
        assert!(out.contains("cout << \"Age: \";"));
        assert!(out.contains("int age;"));
        assert!(out.contains("cin >> age;"));
        // The declaration stays at file scope; the prompt and the read are
        // executable and must land inside main, before the statements that
        // use the value.
        let main_pos = out.find("int main() {").unwrap();
        assert!(out.find("int age;").unwrap() < main_pos);
        assert!(out.find("cout << \"Age: \";").unwrap() > main_pos);
        assert!(out.find("cin >> age;").unwrap() > main_pos);
        assert!(out.find("cin >> age;").unwrap() < out.find("cout << age << endl;").unwrap());
    }

    #[test]
    fn prompted_global_alone_still_synthesizes_main() {
        let out = translate_to_cpp("age = int(input(\"Age: \"))\n", Lang::Python);
        assert!(out.contains("int main() {"));
        assert!(out.contains("return 0;"));
    }

    #[test]
    fn loose_statements_are_wrapped_in_main() {
        let source = indoc! {"
            x = 1
            print(x)
        "};
        let out = translate_to_cpp(source, Lang::Python);
        assert!(out.contains("int main() {"));
        assert!(out.contains("return 0;"));
        // Globals stay at file scope, outside the synthesized main.
        let main_pos = out.find("int main()").unwrap();
        let decl_pos = out.find("int x = 1;").unwrap();
        assert!(decl_pos < main_pos);
    }

    #[test]
    fn user_main_suppresses_the_synthesized_one() {
        let source = indoc! {"
            def main():
                print(\"hi\")
        "};
        let out = translate_to_cpp(source, Lang::Python);
        assert_eq!(out.matches("main()").count(), 1);
    }

    #[test]
    fn receiver_parameter_is_stripped_from_methods() {
        let source = indoc! {"
            class Greeter:
                def greet(self, name):
                    print(name)
        "};
        let out = translate_to_cpp(source, Lang::Python);
        assert!(out.contains("void greet(auto name) {"));
        assert!(out.contains("public:"));
    }

    #[test]
    fn logical_spellings_and_floor_division_map_over() {
        let out = translate_to_cpp("ok = a and not b\nq = 7 // 2\n", Lang::Python);
        assert!(out.contains("(a && !b)"));
        assert!(out.contains("(7 / 2)"));
    }
}
