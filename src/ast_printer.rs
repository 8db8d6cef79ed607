use crate::expr::Expr;
use crate::token::TokenType;

/// Converts an expression to the Crafting‑Interpreters prefix form
/// (no heap allocations except `String` joins for output).
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(expr: &Expr) -> String {
        match expr {
            // ── literals ────────────────────────────────────────────────
            Expr::Literal(token) => match &token.token_type {
                TokenType::TRUE => "true".into(),

                TokenType::FALSE => "false".into(),

                TokenType::NIL => "nil".into(),

                TokenType::STRING(s) => s.clone(),

                TokenType::NUMBER(n) => {
                    if n.fract() == 0.0 {
                        // 3.0 → 3.0
                        format!("{:.1}", n)
                    } else {
                        n.to_string()
                    }
                }

                _ => token.lexeme.clone(),
            },

            // ── grouping ────────────────────────────────────────────────
            Expr::Grouping(inner) => format!("(group {})", Self::print(inner)),

            // ── unary operator ──────────────────────────────────────────
            Expr::Unary(operator, right) => {
                format!("({} {})", operator.lexeme, Self::print(right))
            }

            // ── binary / logical operators ─────────────────────────────
            Expr::Binary(left, operator, right) | Expr::Logical(left, operator, right) => {
                format!(
                    "({} {} {})",
                    operator.lexeme,
                    Self::print(left),
                    Self::print(right)
                )
            }

            // ── variables and assignment ───────────────────────────────
            Expr::Variable(_, name) => name.lexeme.clone(),

            Expr::Assign(_, name, value) => format!("(= {} {})", name.lexeme, Self::print(value)),

            // ── calls and property access ──────────────────────────────
            Expr::Call(callee, _, arguments) => {
                let mut s = format!("(call {}", Self::print(callee));
                for arg in arguments {
                    s.push(' ');
                    s.push_str(&Self::print(arg));
                }
                s.push(')');
                s
            }

            Expr::Get(object, name) => format!("(. {} {})", Self::print(object), name.lexeme),

            Expr::Set(object, name, value) => format!(
                "(= (. {} {}) {})",
                Self::print(object),
                name.lexeme,
                Self::print(value)
            ),

            // ── class expressions ──────────────────────────────────────
            Expr::This(_, _) => "this".into(),

            Expr::Super(_, _, method) => format!("(super {})", method.lexeme),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::scanner::Scanner;

    fn print(source: &str) -> String {
        let mut parser = Parser::new(Scanner::new(source.as_bytes().to_vec()));
        AstPrinter::print(&parser.parse_expression().unwrap())
    }

    #[test]
    fn prefix_form() {
        assert_eq!(print("1 + 2 * 3"), "(+ 1.0 (* 2.0 3.0))");
        assert_eq!(print("-(1.5)"), "(- (group 1.5))");
        assert_eq!(print("a or b.c(1)"), "(or a (call (. b c) 1.0))");
        assert_eq!(print("this.x = 2"), "(= (. this x) 2.0)");
    }
}
