//! Emitters turning the typed IR back into surface text, one per target.
//! Emission never fails: IR shapes an emitter does not recognize fall
//! through to a generic rendering instead of erroring.

use crate::{
    ir::{BinOp, IrExpr, IrExprKind, IrProgram},
    Lang,
};

pub mod cpp;
pub mod java;
pub mod python;

pub fn emit(ir: &IrProgram, lang: Lang) -> String {
    match lang {
        Lang::Python => python::generate(ir),
        Lang::Java => java::generate(ir),
        Lang::Cpp => cpp::generate(ir),
    }
}

/// Indentation-tracking line builder shared by all emitters.
pub(crate) struct Writer {
    lines: Vec<String>,
    level: usize,
}

impl Writer {
    pub(crate) fn new() -> Writer {
        Writer {
            lines: Vec::new(),
            level: 0,
        }
    }

    pub(crate) fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if text.trim().is_empty() {
            self.lines.push(String::new());
        } else {
            self.lines.push(format!("{}{text}", "    ".repeat(self.level)));
        }
    }

    pub(crate) fn blank(&mut self) {
        self.lines.push(String::new());
    }

    pub(crate) fn indent(&mut self) {
        self.level += 1;
    }

    pub(crate) fn dedent(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    pub(crate) fn finish(mut self) -> String {
        while self.lines.last().is_some_and(String::is_empty) {
            self.lines.pop();
        }
        let mut code = self.lines.join("\n");
        code.push('\n');
        code
    }
}

/// True when `expr` is a stream-insertion chain: left-nested `<<` with the
/// `cout` identifier at the bottom.
pub(crate) fn is_stream_chain(expr: &IrExpr) -> bool {
    match &expr.kind {
        IrExprKind::Identifier(name) => name == "cout",
        IrExprKind::Binary {
            op: BinOp::Shl,
            lhs,
            ..
        } => is_stream_chain(lhs),
        _ => false,
    }
}

/// Flattens a stream chain into its inserted operands, left to right,
/// dropping the `cout` root.
pub(crate) fn stream_chain_args(expr: &IrExpr) -> Vec<&IrExpr> {
    match &expr.kind {
        IrExprKind::Binary {
            op: BinOp::Shl,
            lhs,
            rhs,
        } => {
            let mut args = stream_chain_args(lhs);
            args.extend(stream_chain_args(rhs));
            args
        }
        IrExprKind::Identifier(name) if name == "cout" => Vec::new(),
        _ => vec![expr],
    }
}

pub(crate) fn is_endl(expr: &IrExpr) -> bool {
    matches!(&expr.kind, IrExprKind::Identifier(name) if name == "endl")
}

/// True for calls that read interactive input, used to decide whether the
/// brace targets need a reader set up around their entry point.
pub(crate) fn is_input_callee(name: &str) -> bool {
    matches!(name, "input" | "read_input" | "nextLine" | "nextInt")
}

/// Renders a member chain as a dotted name when it is made only of
/// identifiers, so `System.out.println` can be looked up as one unit.
pub(crate) fn dotted_name(expr: &IrExpr) -> Option<String> {
    match &expr.kind {
        IrExprKind::Identifier(name) => Some(name.clone()),
        IrExprKind::Member { receiver, name } => {
            Some(format!("{}.{name}", dotted_name(receiver)?))
        }
        _ => None,
    }
}

/// Formats a float so it keeps a decimal point even when the fraction is
/// zero, matching how the surfaces spell float literals.
pub(crate) fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// The prompt-then-read idiom: `int(input("..."))`, `stoi(read_input(...))`
/// or a bare `input("...")` call. Declarations initialized this way get
/// rewritten by the brace emitters into a prompt print plus a read.
pub(crate) struct PromptRead<'e> {
    pub(crate) prompt: Option<&'e IrExpr>,
    /// Wrapping conversion (`int`, `stoi`, `float`), when present.
    pub(crate) conversion: Option<&'e str>,
}

pub(crate) fn match_prompt_read(expr: &IrExpr) -> Option<PromptRead<'_>> {
    if let IrExprKind::Call { callee, args } = &expr.kind {
        if is_input_callee(callee) {
            return Some(PromptRead {
                prompt: args.first(),
                conversion: None,
            });
        }
        if matches!(callee.as_str(), "int" | "stoi" | "float" | "stof") && args.len() == 1 {
            if let IrExprKind::Call {
                callee: inner,
                args: inner_args,
            } = &args[0].kind
            {
                if is_input_callee(inner) {
                    return Some(PromptRead {
                        prompt: inner_args.first(),
                        conversion: Some(callee),
                    });
                }
            }
        }
    }
    None
}

/// True when any statement in the tree calls an input reader.
pub(crate) fn reads_input(statements: &[crate::ir::IrStmt]) -> bool {
    use crate::ir::IrStmt;
    statements.iter().any(|stmt| match stmt {
        IrStmt::Variable(var) => var.init.as_ref().is_some_and(expr_reads_input),
        IrStmt::Assignment { value, .. } => expr_reads_input(value),
        IrStmt::Expression(expr) => expr_reads_input(expr),
        IrStmt::Return(value) => value.as_ref().is_some_and(expr_reads_input),
        IrStmt::If {
            condition,
            then_block,
            elif_blocks,
            else_block,
        } => {
            expr_reads_input(condition)
                || reads_input(then_block)
                || elif_blocks
                    .iter()
                    .any(|(c, b)| expr_reads_input(c) || reads_input(b))
                || reads_input(else_block)
        }
        IrStmt::While { condition, body } => expr_reads_input(condition) || reads_input(body),
        IrStmt::For { iterable, body, .. } => {
            iterable.as_ref().is_some_and(expr_reads_input) || reads_input(body)
        }
        IrStmt::Block(body) => reads_input(body),
        IrStmt::Break => false,
    })
}

fn expr_reads_input(expr: &IrExpr) -> bool {
    match &expr.kind {
        IrExprKind::Call { callee, args } => {
            is_input_callee(callee) || args.iter().any(expr_reads_input)
        }
        IrExprKind::MethodCall {
            receiver,
            method,
            args,
        } => {
            is_input_callee(method)
                || expr_reads_input(receiver)
                || args.iter().any(expr_reads_input)
        }
        IrExprKind::Invoke { target, args } => {
            expr_reads_input(target) || args.iter().any(expr_reads_input)
        }
        IrExprKind::Binary { lhs, rhs, .. } => expr_reads_input(lhs) || expr_reads_input(rhs),
        IrExprKind::Unary { operand, .. } => expr_reads_input(operand),
        IrExprKind::Member { receiver, .. } => expr_reads_input(receiver),
        IrExprKind::Index { receiver, index } => {
            expr_reads_input(receiver) || expr_reads_input(index)
        }
        IrExprKind::Identifier(_) | IrExprKind::Literal(_) => false,
    }
}

pub(crate) fn escape_double_quoted(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ir::{IrType, Literal};

    fn ident(name: &str) -> IrExpr {
        IrExpr::new(IrExprKind::Identifier(name.to_string()), IrType::Any)
    }

    fn shl(lhs: IrExpr, rhs: IrExpr) -> IrExpr {
        IrExpr::new(
            IrExprKind::Binary {
                op: BinOp::Shl,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            IrType::Any,
        )
    }

    #[test]
    fn writer_indents_by_four_spaces() {
        let mut w = Writer::new();
        w.line("def f():");
        w.indent();
        w.line("pass");
        w.dedent();
        assert_eq!(w.finish(), "def f():\n    pass\n");
    }

    #[test]
    fn stream_chains_are_detected_and_flattened() {
        let chain = shl(shl(ident("cout"), ident("x")), ident("endl"));
        assert!(is_stream_chain(&chain));
        let args = stream_chain_args(&chain);
        assert_eq!(args.len(), 2);
        assert!(is_endl(args[1]));

        assert!(!is_stream_chain(&ident("x")));
    }

    #[test]
    fn prompt_reads_match_with_and_without_conversion() {
        let prompted = IrExpr::new(
            IrExprKind::Call {
                callee: "int".to_string(),
                args: vec![IrExpr::new(
                    IrExprKind::Call {
                        callee: "input".to_string(),
                        args: vec![IrExpr::new(
                            IrExprKind::Literal(Literal::Str("Age: ".to_string())),
                            IrType::String,
                        )],
                    },
                    IrType::String,
                )],
            },
            IrType::Int,
        );
        let matched = match_prompt_read(&prompted).expect("no match");
        assert_eq!(matched.conversion, Some("int"));
        assert!(matched.prompt.is_some());

        let bare = IrExpr::new(
            IrExprKind::Call {
                callee: "read_input".to_string(),
                args: Vec::new(),
            },
            IrType::String,
        );
        let matched = match_prompt_read(&bare).expect("no match");
        assert_eq!(matched.conversion, None);
        assert!(matched.prompt.is_none());
    }

    #[test]
    fn float_formatting_keeps_the_point() {
        assert_eq!(format_float(2.0), "2.0");
        assert_eq!(format_float(2.5), "2.5");
    }
}
