//! Brace-OOP emitter. The whole program lands inside one `Main` class:
//! functions become static methods, source classes become static nested
//! classes, and globals plus the loose top-level statements are folded into
//! a synthesized `main`. A `Scanner` is constructed and closed around the
//! entry point only when something in it reads input.

use crate::{
    codegen::{
        dotted_name, escape_double_quoted, format_float, is_endl, is_stream_chain,
        match_prompt_read, reads_input, stream_chain_args, Writer,
    },
    ir::{
        BinOp, IrClass, IrExpr, IrExprKind, IrFunction, IrProgram, IrStmt, IrType, IrVariable,
        Literal, UnOp,
    },
};

pub(crate) fn generate(ir: &IrProgram) -> String {
    let needs_scanner = reads_input(&ir.main_body)
        || ir
            .globals
            .iter()
            .any(|g| g.init.as_ref().is_some_and(|e| match_prompt_read(e).is_some()));

    let mut w = Writer::new();
    if needs_scanner {
        w.line("import java.util.Scanner;");
        w.blank();
    }
    w.line("public class Main {");
    w.indent();

    for class in &ir.classes {
        emit_class(&mut w, class);
    }
    for func in &ir.functions {
        function(&mut w, func);
    }
    if !ir.globals.is_empty() || !ir.main_body.is_empty() {
        w.line("public static void main(String[] args) {");
        w.indent();
        if needs_scanner {
            w.line("Scanner scanner = new Scanner(System.in);");
        }
        for global in &ir.globals {
            variable(&mut w, global);
        }
        for stmt in &ir.main_body {
            statement(&mut w, stmt);
        }
        if needs_scanner {
            w.line("scanner.close();");
        }
        w.dedent();
        w.line("}");
    }

    w.dedent();
    w.line("}");
    w.finish()
}

fn map_type(ty: IrType) -> &'static str {
    match ty {
        IrType::Int => "int",
        IrType::Float => "double",
        IrType::String => "String",
        IrType::Bool => "boolean",
        IrType::Void => "void",
        IrType::Array => "Object[]",
        IrType::Object | IrType::Any => "Object",
    }
}

fn function(w: &mut Writer, func: &IrFunction) {
    let access = if func.is_method {
        "public".to_string()
    } else {
        func.access.clone().unwrap_or_else(|| "public".to_string())
    };
    let params: Vec<String> = func
        .parameters
        .iter()
        .map(|(name, ty)| format!("{} {name}", map_type(*ty)))
        .collect();
    let statik = if func.is_method { "" } else { "static " };
    w.line(format!(
        "{access} {statik}{} {}({}) {{",
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
    // Single inheritance only, so extra bases are dropped.
    if let Some(base) = class.bases.first() {
        w.line(format!("public static class {} extends {base} {{", class.name));
    } else {
        w.line(format!("public static class {} {{", class.name));
    }
    w.indent();
    for field in &class.fields {
        match &field.init {
            Some(init) => w.line(format!(
                "private {} {} = {};",
                map_type(field.ty),
                field.name,
                expr(init)
            )),
            None => w.line(format!("private {} {};", map_type(field.ty), field.name)),
        }
    }
    if !class.fields.is_empty() {
        w.blank();
    }
    for method in &class.methods {
        function(w, method);
    }
    w.dedent();
    w.line("}");
    w.blank();
}

fn variable(w: &mut Writer, var: &IrVariable) {
    let ty = map_type(var.ty);
    let Some(init) = &var.init else {
        w.line(format!("{ty} {} = {};", var.name, default_value(var.ty)));
        return;
    };
    // A prompted read splits into a prompt print and a reader call.
    if let Some(read) = match_prompt_read(init) {
        if let Some(prompt) = read.prompt {
            w.line(format!("System.out.print({});", expr(prompt)));
        }
        let reader = match read.conversion {
            Some("int" | "stoi") => "Integer.parseInt(scanner.nextLine())",
            Some("float" | "stof") => "Double.parseDouble(scanner.nextLine())",
            _ => "scanner.nextLine()",
        };
        w.line(format!("{ty} {} = {reader};", var.name));
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
        IrType::Void | IrType::Array | IrType::Object | IrType::Any => "null",
    }
}

fn statement(w: &mut Writer, stmt: &IrStmt) {
    match stmt {
        IrStmt::Variable(var) => variable(w, var),
        IrStmt::Assignment { target, op, value } => {
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
                .map_or_else(|| "new Object[0]".to_string(), expr);
            w.line(format!("for (Object {variable} : {iterable}) {{"));
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
        IrStmt::Expression(value) => {
            if is_stream_chain(value) {
                stream_println(w, value);
            } else {
                w.line(format!("{};", expr(value)));
            }
        }
        IrStmt::Block(statements) => {
            for stmt in statements {
                statement(w, stmt);
            }
        }
    }
}

/// A `cout` chain becomes one concatenated print. A trailing `endl` selects
/// `println`; inner ones turn into literal newlines.
fn stream_println(w: &mut Writer, chain: &IrExpr) {
    let args = stream_chain_args(chain);
    let trailing_endl = args.last().is_some_and(|a| is_endl(a));
    let kept = if trailing_endl {
        &args[..args.len() - 1]
    } else {
        &args[..]
    };
    let parts: Vec<String> = kept
        .iter()
        .map(|arg| {
            if is_endl(arg) {
                "\"\\n\"".to_string()
            } else {
                expr(arg)
            }
        })
        .collect();
    let text = if parts.is_empty() {
        "\"\"".to_string()
    } else {
        parts.join(" + ")
    };
    if trailing_endl {
        w.line(format!("System.out.println({text});"));
    } else {
        w.line(format!("System.out.print({text});"));
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
                BinOp::And => format!("({left} && {right})"),
                BinOp::Or => format!("({left} || {right})"),
                BinOp::FloorDiv => format!("({left} / {right})"),
                BinOp::Pow => format!("Math.pow({left}, {right})"),
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
    let args_text = rendered.join(", ");
    let mapped = match callee {
        "print" | "println" => "System.out.println",
        "str" | "to_string" => "String.valueOf",
        "int" | "stoi" => "Integer.parseInt",
        "float" | "stof" => "Double.parseDouble",
        "len" | "size" => "length",
        other => other,
    };
    // A prompt normally folds into the enclosing declaration; as a plain
    // expression the read degrades to a bare line read.
    if matches!(callee, "input" | "read_input") {
        return "scanner.nextLine()".to_string();
    }
    format!("{mapped}({args_text})")
}

fn literal_text(literal: &Literal) -> String {
    match literal {
        Literal::Int(value) => value.to_string(),
        Literal::Float(value) => format!("{}d", format_float(*value)),
        Literal::Str(value) => format!("\"{}\"", escape_double_quoted(value)),
        Literal::Bool(true) => "true".to_string(),
        Literal::Bool(false) => "false".to_string(),
        Literal::Null => "null".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{lexer, lower, parser, Lang};

    fn translate_to_java(source: &str, from: Lang) -> String {
        let tokens = lexer::tokenize(source, from);
        let program = parser::parse(&tokens, from).expect("parse failed");
        generate(&lower::lower(&program, from))
    }

    #[test]
    fn program_is_wrapped_in_a_single_class() {
        let source = indoc! {"
            def add(a, b):
                result = a + b
                return result
        "};
        let out = translate_to_java(source, Lang::Python);
        let expected = indoc! {"
            public class Main {
                public static int add(Object a, Object b) {
                    int result = (a + b);
                    return result;
                }

            }
        "};
        assert_eq!(out, expected);
    }

    #[test]
    fn globals_and_script_statements_form_the_entry_point() {
        let source = indoc! {"
            count = 0
            count += 1
            print(count)
        "};
        let out = translate_to_java(source, Lang::Python);
        let expected = indoc! {"
            public class Main {
                public static void main(String[] args) {
                    int count = 0;
                    count += 1;
                    System.out.println(count);
                }
            }
        "};
        assert_eq!(out, expected);
    }

    #[test]
    fn input_reads_inject_a_scanner() {
        let source = "name = input()\nprint(name)\n";
        let out = translate_to_java(source, Lang::Python);
        assert!(out.starts_with("import java.util.Scanner;"));
        assert!(out.contains("Scanner scanner = new Scanner(System.in);"));
        assert!(out.contains("String name = scanner.nextLine();"));
        assert!(out.contains("scanner.close();"));
    }

    #[test]
    fn prompted_integer_read_splits_into_print_and_parse() {
        let out = translate_to_java("age = int(input(\"Age: \"))\n", Lang::Python);
        assert!(out.contains("System.out.print(\"Age: \");"));
        assert!(out.contains("int age = Integer.parseInt(scanner.nextLine());"));
    }

    #[test]
    fn trailing_endl_selects_println() {
        let out = translate_to_java("cout << \"hi \" << name << endl;", Lang::Cpp);
        assert!(out.contains("System.out.println(\"hi \" + name);"));

        let out = translate_to_java("cout << \"hi\";", Lang::Cpp);
        assert!(out.contains("System.out.print(\"hi\");"));
    }

    #[test]
    fn float_literals_carry_the_double_suffix() {
        let out = translate_to_java("pi = 3.14\n", Lang::Python);
        assert!(out.contains("double pi = 3.14d;"));
    }

    #[test]
    fn source_classes_become_static_nested_classes() {
        let source = indoc! {"
            class Dog extends Animal {
                private int age = 3;
                public void bark() {
                    System.out.println(\"woof\");
                }
            }
        "};
        let out = translate_to_java(source, Lang::Java);
        assert!(out.contains("public static class Dog extends Animal {"));
        assert!(out.contains("private int age = 3;"));
        assert!(out.contains("public void bark() {"));
    }
}
