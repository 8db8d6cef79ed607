use crate::token::Token;

/// Identity of an expression node, assigned by the parser at construction.
///
/// The resolver keys binding distances by this id, so two structurally equal
/// expressions at different source positions resolve independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(pub usize);

#[derive(Debug)]
pub enum Expr {
    Literal(Token),

    Logical(Box<Expr>, Token, Box<Expr>),

    Grouping(Box<Expr>),

    Unary(Token, Box<Expr>),

    Binary(Box<Expr>, Token, Box<Expr>),

    Variable(ExprId, Token),

    Assign(ExprId, Token, Box<Expr>),

    // Callee, closing parenthesis (for error reporting), arguments.
    Call(Box<Expr>, Token, Vec<Expr>),

    Get(Box<Expr>, Token),

    Set(Box<Expr>, Token, Box<Expr>),

    This(ExprId, Token),

    // Keyword, method name.
    Super(ExprId, Token, Token),
}
