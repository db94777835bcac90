//! Source-to-source translator between three surface syntaxes: an
//! indentation-structured dynamic one, a curly-brace single-inheritance OOP
//! one, and a curly-brace preprocessor/stream-I/O one.
//!
//! Translation is a five-stage pipeline. The lexer maps source text into
//! tokens, the per-surface parsers map tokens into one shared AST, the
//! semantic analyzer checks names and types, lowering produces a typed IR,
//! and one emitter per target turns the IR back into text. The typed IR is
//! what keeps the surface count from turning into a quadratic translation
//! matrix.

use std::fmt;

/// The lexers take the source input, mapping it into a sequence of tokens.
pub mod lexer;

/// The parsers take a sequence of tokens, mapping it into the shared AST.
pub mod parser;

/// The semantic analyzer resolves names and checks types over the AST.
pub mod semantic;

/// Lowering maps the checked AST into the typed IR.
pub mod lower;

/// The emitters map the typed IR back into surface text, one per target.
pub mod codegen;

pub mod ast;
pub mod error;
pub mod ir;
pub mod token;

pub use crate::{
    error::{ParseError, Phase, TranslateError},
    semantic::SemanticResult,
};

/// The three supported surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lang {
    Python,
    Java,
    Cpp,
}

impl Lang {
    /// Resolves a user-facing language name. Anything unrecognized is a
    /// caller-side configuration problem, surfaced before the pipeline runs.
    pub fn from_name(name: &str) -> Option<Lang> {
        match name.to_lowercase().as_str() {
            "python" | "py" => Some(Lang::Python),
            "java" => Some(Lang::Java),
            "cpp" | "c++" | "cxx" => Some(Lang::Cpp),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Lang::Python => "python",
            Lang::Java => "java",
            Lang::Cpp => "cpp",
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tokenizes `source`. Total: unknown characters are skipped and the output
/// always ends with exactly one EOF token.
pub fn generate_tokens(source: &str, lang: Lang) -> Vec<token::Token> {
    lexer::tokenize(source, lang)
}

/// Parses a token sequence into the shared AST. The first syntax error
/// aborts the parse.
pub fn parse(tokens: &[token::Token], lang: Lang) -> Result<ast::Program, ParseError> {
    parser::parse(tokens, lang)
}

/// Checks the program, returning every error and warning found plus the
/// populated symbol table.
pub fn check(program: &ast::Program, lang: Lang) -> SemanticResult {
    semantic::check(program, lang)
}

/// Lowers the AST into the typed IR.
pub fn lower(program: &ast::Program, lang: Lang) -> ir::IrProgram {
    lower::lower(program, lang)
}

/// Emits target text from the IR. Emission never fails; unrecognized IR
/// shapes fall back to a generic rendering.
pub fn emit(ir: &ir::IrProgram, lang: Lang) -> String {
    codegen::emit(ir, lang)
}

/// Runs the whole pipeline. Stops at the first failing phase: a parse error
/// short-circuits the semantic pass, a failed semantic pass short-circuits
/// lowering and emission. Semantic failures carry the full error list.
pub fn translate(source: &str, from: Lang, to: Lang) -> Result<String, TranslateError> {
    let tokens = lexer::tokenize(source, from);
    let program = parser::parse(&tokens, from).map_err(|e| TranslateError {
        phase: Phase::Parse,
        message: e.to_string(),
    })?;
    let result = semantic::check(&program, from);
    if !result.valid {
        return Err(TranslateError {
            phase: Phase::Semantic,
            message: result.errors.join("\n"),
        });
    }
    let ir = lower::lower(&program, from);
    Ok(codegen::emit(&ir, to))
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn language_names_resolve() {
        assert_eq!(Lang::from_name("Python"), Some(Lang::Python));
        assert_eq!(Lang::from_name("c++"), Some(Lang::Cpp));
        assert_eq!(Lang::from_name("java"), Some(Lang::Java));
        assert_eq!(Lang::from_name("cobol"), None);
    }

    #[test]
    fn factorial_translates_to_both_brace_targets() {
        let source = indoc! {"
            def factorial(n):
                if n <= 1:
                    return 1
                return n * factorial(n - 1)
        "};
        let java = translate(source, Lang::Python, Lang::Java).expect("to java");
        assert!(java.contains("public class Main {"));
        assert!(java.contains("static int factorial(Object n) {"));

        let cpp = translate(source, Lang::Python, Lang::Cpp).expect("to cpp");
        assert!(cpp.starts_with("#include <iostream>"));
        assert!(cpp.contains("int factorial(auto n) {"));
    }

    #[test]
    fn semantic_failures_short_circuit_with_the_full_list() {
        let source = indoc! {"
            def test():
                x = 5
                y = undefined_var + other_undefined
                return y
        "};
        let err = translate(source, Lang::Python, Lang::Java).expect_err("should fail");
        assert_eq!(err.phase, Phase::Semantic);
        assert!(err.message.contains("undefined_var"));
        assert!(err.message.contains("other_undefined"));
        assert!(err.message.contains('\n'));
    }

    #[test]
    fn parse_failures_carry_position() {
        let err = translate("x = )\n", Lang::Python, Lang::Java).expect_err("should fail");
        assert_eq!(err.phase, Phase::Parse);
        assert!(err.message.contains("line 1"));
    }

    #[test]
    fn python_to_python_reaches_a_fixed_point() {
        let source = indoc! {"
            def greet(name):
                message = 'hi ' + name
                print(message)

            greet('ada')
        "};
        let once = translate(source, Lang::Python, Lang::Python).expect("first pass");
        let twice = translate(&once, Lang::Python, Lang::Python).expect("second pass");
        assert_eq!(once, twice);
    }

    #[test]
    fn stream_output_crosses_surfaces_both_ways() {
        let cpp_in = "cout << \"n = \" << n << endl;";
        let tokens = generate_tokens(cpp_in, Lang::Cpp);
        let program = parse(&tokens, Lang::Cpp).expect("parse");
        let ir = lower(&program, Lang::Cpp);
        assert!(emit(&ir, Lang::Python).contains("print(\'n = \', n, \'\\n\', sep=\'\', end=\'\')"));
        assert!(emit(&ir, Lang::Java).contains("System.out.println(\"n = \" + n);"));

        let py_in = "print('n')\n";
        let out = translate(py_in, Lang::Python, Lang::Cpp).expect("to cpp");
        assert!(out.contains("cout << \"n\" << endl;"));
    }

    #[test]
    fn interpolated_strings_translate_as_concatenation() {
        let source = "name = 'ada'\nprint(f\"hi {name}!\")\n";
        let out = translate(source, Lang::Python, Lang::Java).expect("to java");
        assert!(out.contains("String.valueOf(name)"));
    }

    #[test]
    fn prompted_reads_rewrite_per_target() {
        let source = "age = int(input(\"Age: \"))\nprint(age)\n";
        let java = translate(source, Lang::Python, Lang::Java).expect("to java");
        assert!(java.contains("import java.util.Scanner;"));
        assert!(java.contains("Integer.parseInt(scanner.nextLine())"));

        let cpp = translate(source, Lang::Python, Lang::Cpp).expect("to cpp");
        assert!(cpp.contains("cin >> age;"));
    }

    #[test]
    fn brace_surface_reads_map_back_to_input() {
        let source = indoc! {"
            #include <iostream>
            using namespace std;

            int main() {
                int x;
                cin >> x;
                cout << x << endl;
                return 0;
            }
        "};
        let out = translate(source, Lang::Cpp, Lang::Python).expect("to python");
        assert!(out.contains("x = input()"));
        assert!(out.contains("if __name__ == \"__main__\":"));
    }

    #[test]
    fn classes_cross_between_surfaces() {
        let source = indoc! {"
            class Dog(Animal):
                def speak(self):
                    print('woof')
        "};
        let java = translate(source, Lang::Python, Lang::Java).expect("to java");
        assert!(java.contains("public static class Dog extends Animal {"));

        let cpp = translate(source, Lang::Python, Lang::Cpp).expect("to cpp");
        assert!(cpp.contains("class Dog : public Animal {"));
        assert!(cpp.contains("void speak() {"));
    }
}
