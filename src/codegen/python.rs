//! Indentation-surface emitter. Stream chains collapse into a single
//! `print(..., sep='', end='')`, the brace surfaces' conversion calls map
//! back to their builtin spellings, and a `main` function gets the usual
//! `if __name__ == "__main__":` trailer.

use crate::{
    codegen::{dotted_name, format_float, is_endl, is_stream_chain, stream_chain_args, Writer},
    ir::{
        BinOp, IrClass, IrExpr, IrExprKind, IrFunction, IrProgram, IrStmt, IrVariable, Literal,
        UnOp,
    },
};

pub(crate) fn generate(ir: &IrProgram) -> String {
    let mut w = Writer::new();
    for global in &ir.globals {
        variable(&mut w, global);
    }
    if !ir.globals.is_empty() {
        w.blank();
    }
    for class in &ir.classes {
        emit_class(&mut w, class);
    }
    for func in &ir.functions {
        function(&mut w, func);
    }
    for stmt in &ir.main_body {
        statement(&mut w, stmt);
    }
    if ir.functions.iter().any(|f| f.name == "main") {
        w.blank();
        w.line("if __name__ == \"__main__\":");
        w.indent();
        w.line("main()");
        w.dedent();
    }
    w.finish()
}

fn function(w: &mut Writer, func: &IrFunction) {
    let params: Vec<&str> = func.parameters.iter().map(|(name, _)| name.as_str()).collect();
    w.line(format!("def {}({}):", func.name, params.join(", ")));
    w.indent();
    block(w, &func.body);
    w.dedent();
    w.blank();
}

fn emit_class(w: &mut Writer, class: &IrClass) {
    if class.bases.is_empty() {
        w.line(format!("class {}:", class.name));
    } else {
        w.line(format!("class {}({}):", class.name, class.bases.join(", ")));
    }
    w.indent();
    for field in &class.fields {
        variable(w, field);
    }
    for method in &class.methods {
        function(w, method);
    }
    if class.fields.is_empty() && class.methods.is_empty() {
        w.line("pass");
    }
    w.dedent();
    w.blank();
}

fn block(w: &mut Writer, statements: &[IrStmt]) {
    if statements.is_empty() {
        w.line("pass");
        return;
    }
    for stmt in statements {
        statement(w, stmt);
    }
}

fn variable(w: &mut Writer, var: &IrVariable) {
    match &var.init {
        Some(init) => w.line(format!("{} = {}", var.name, expr(init))),
        None => w.line(format!("{} = {}", var.name, default_value(var))),
    }
}

fn default_value(var: &IrVariable) -> &'static str {
    use crate::ir::IrType;
    match var.ty {
        IrType::Int => "0",
        IrType::Float => "0.0",
        IrType::String => "''",
        IrType::Bool => "False",
        IrType::Array => "[]",
        IrType::Void | IrType::Object | IrType::Any => "None",
    }
}

fn statement(w: &mut Writer, stmt: &IrStmt) {
    match stmt {
        IrStmt::Variable(var) => variable(w, var),
        IrStmt::Assignment { target, op, value } => {
            w.line(format!("{target} {} {}", op.as_str(), expr(value)));
        }
        IrStmt::If {
            condition,
            then_block,
            elif_blocks,
            else_block,
        } => {
            w.line(format!("if {}:", expr(condition)));
            w.indent();
            block(w, then_block);
            w.dedent();
            for (elif_condition, elif_body) in elif_blocks {
                w.line(format!("elif {}:", expr(elif_condition)));
                w.indent();
                block(w, elif_body);
                w.dedent();
            }
            if !else_block.is_empty() {
                w.line("else:");
                w.indent();
                block(w, else_block);
                w.dedent();
            }
        }
        IrStmt::While { condition, body } => {
            w.line(format!("while {}:", expr(condition)));
            w.indent();
            block(w, body);
            w.dedent();
        }
        IrStmt::For {
            variable,
            iterable,
            body,
        } => {
            let iterable = iterable.as_ref().map_or_else(|| "[]".to_string(), expr);
            w.line(format!("for {variable} in {iterable}:"));
            w.indent();
            block(w, body);
            w.dedent();
        }
        IrStmt::Return(Some(value)) => w.line(format!("return {}", expr(value))),
        IrStmt::Return(None) => w.line("return"),
        IrStmt::Break => w.line("break"),
        IrStmt::Expression(value) => w.line(expr(value)),
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
            if *op == BinOp::Shl && is_stream_chain(e) {
                return stream_print(e);
            }
            let left = expr(lhs);
            let right = expr(rhs);
            let op = match op {
                BinOp::And => "and",
                BinOp::Or => "or",
                other => other.as_str(),
            };
            // Plain addition skips the outer parens to keep concatenation
            // chains readable.
            if op == "+" {
                format!("{left} + {right}")
            } else {
                format!("({left} {op} {right})")
            }
        }
        IrExprKind::Unary { op, operand } => {
            let operand = expr(operand);
            match op {
                UnOp::Not => format!("not {operand}"),
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

    // print with no trailing newline keeps its end marker explicit.
    if callee == "System.out.print" {
        return format!("print({args_text}, end='')");
    }
    let mapped = match callee {
        "stoi" | "Integer.parseInt" => "int",
        "stof" | "Double.parseDouble" => "float",
        "to_string" => "str",
        "read_input" | "scanner.nextLine" => "input",
        "size" | "length" => "len",
        "System.out.println" => "print",
        "Math.max" => "max",
        "Math.min" => "min",
        "Math.abs" => "abs",
        other => other,
    };
    if callee == "scanner.nextInt" {
        return "int(input())".to_string();
    }
    format!("{mapped}({args_text})")
}

/// A `cout` chain becomes one print with no separator; `endl` becomes an
/// explicit newline argument.
fn stream_print(chain: &IrExpr) -> String {
    let args: Vec<String> = stream_chain_args(chain)
        .iter()
        .map(|arg| {
            if is_endl(arg) {
                "'\\n'".to_string()
            } else {
                expr(arg)
            }
        })
        .collect();
    format!("print({}, sep='', end='')", args.join(", "))
}

fn literal_text(literal: &Literal) -> String {
    match literal {
        Literal::Int(value) => value.to_string(),
        Literal::Float(value) => format_float(*value),
        Literal::Str(value) => format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'")),
        Literal::Bool(true) => "True".to_string(),
        Literal::Bool(false) => "False".to_string(),
        Literal::Null => "None".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{lexer, lower, parser, Lang};

    fn translate_to_python(source: &str, from: Lang) -> String {
        let tokens = lexer::tokenize(source, from);
        let program = parser::parse(&tokens, from).expect("parse failed");
        generate(&lower::lower(&program, from))
    }

    #[test]
    fn stream_chain_becomes_a_single_print() {
        let out = translate_to_python("cout << \"Sum: \" << total << endl;", Lang::Cpp);
        assert_eq!(out, "print('Sum: ', total, '\\n', sep='', end='')\n");
    }

    #[test]
    fn conversion_calls_map_back_to_builtins() {
        let out = translate_to_python("int n = stoi(read_input());", Lang::Cpp);
        assert_eq!(out, "n = int(input())\n");
    }

    #[test]
    fn main_function_gets_the_entry_trailer() {
        let source = indoc! {"
            void main() {
                int x = 1;
            }
        "};
        let out = translate_to_python(source, Lang::Cpp);
        let expected = indoc! {"
            def main():
                x = 1


            if __name__ == \"__main__\":
                main()
        "};
        assert_eq!(out, expected);
    }

    #[test]
    fn println_maps_to_print() {
        let out = translate_to_python("System.out.println(message);", Lang::Java);
        assert_eq!(out, "print(message)\n");
    }

    #[test]
    fn empty_bodies_emit_pass() {
        let out = translate_to_python("def noop():\n    return\n", Lang::Python);
        assert_eq!(out, "def noop():\n    return\n");
        let out = translate_to_python("class Empty:\n    x = 0\n", Lang::Python);
        assert!(out.contains("class Empty:"));
    }

    #[test]
    fn identity_round_trip_is_stable() {
        let source = indoc! {"
            def factorial(n):
                if n <= 1:
                    return 1
                return n * factorial(n - 1)
        "};
        let once = translate_to_python(source, Lang::Python);
        let twice = translate_to_python(&once, Lang::Python);
        assert_eq!(once, twice);
    }

    #[test]
    fn uninitialized_declarations_take_native_defaults() {
        let out = translate_to_python("int count;\nString name;\nboolean ok;", Lang::Java);
        let expected = indoc! {"
            count = 0
            name = ''
            ok = False
        "};
        assert_eq!(out, expected);
    }

    #[test]
    fn logical_operators_spell_out() {
        let out = translate_to_python("boolean r = a && !b;", Lang::Java);
        assert!(out.contains("(a and not b)"));
    }
}
