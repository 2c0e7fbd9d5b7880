//! Lexer, AST, parser, and tree-walking evaluator for demo steps.
//!
//! The step language supports integer/float/string literals, arithmetic,
//! comparison, logical operators, the ternary operator, assignment, and
//! calls to the built-in functions.  `#` starts a comment that runs to the
//! end of the line; newlines are ordinary whitespace, which is what lets a
//! step span several physical lines.
//!
//! Operator precedence (lowest → highest):
//!   assign  →  ternary  →  or  →  and  →  relational  →
//!   additive  →  multiplicative  →  unary  →  primary

use crate::scope::Scope;
use crate::value::Value;

// ── Token ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,

    // Comparison
    Eq, // ==
    Ne, // !=
    Lt,
    Le,
    Gt,
    Ge,

    // Logical
    And, // &&
    Or,  // ||

    // Assignment
    Assign,        // =
    PlusAssign,    // +=
    MinusAssign,   // -=
    StarAssign,    // *=
    SlashAssign,   // /=
    PercentAssign, // %=

    // Misc
    Question,
    Colon,
    Comma,
    LParen,
    RParen,
    /// Unrecognised input — reported as a diagnostic instead of masking as EOF.
    Unknown(char),
    /// Numeric literal that does not fit the value type; reported as a
    /// diagnostic instead of silently becoming zero.
    BadNumber(String),
    Eof,
}

// ── Lexer ─────────────────────────────────────────────────────────────────────

struct Lexer {
    src: Vec<char>,
    pos: usize,
}

impl Lexer {
    fn new(src: &str) -> Self {
        Lexer {
            src: src.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.src.get(self.pos).copied()
    }

    fn peek2(&self) -> Option<char> {
        self.src.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.src.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        loop {
            match self.peek() {
                Some(' ' | '\t' | '\n' | '\r') => self.pos += 1,
                // Comment to end of line; the newline itself is whitespace.
                Some('#') => {
                    while !matches!(self.peek(), None | Some('\n')) {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }

    fn read_number(&mut self, first: char) -> Token {
        let mut s = String::new();
        s.push(first);
        let mut is_float = false;

        // Hex literal; a bare `0x` falls through and lexes as `0` + ident.
        if first == '0'
            && matches!(self.peek(), Some('x' | 'X'))
            && matches!(self.peek2(), Some(c) if c.is_ascii_hexdigit())
        {
            self.advance();
            let mut hex = String::new();
            while matches!(self.peek(), Some(c) if c.is_ascii_hexdigit()) {
                hex.push(self.advance().unwrap_or('0'));
            }
            return match i64::from_str_radix(&hex, 16) {
                Ok(n) => Token::Int(n),
                Err(_) => Token::BadNumber(format!("0x{hex}")),
            };
        }

        while matches!(self.peek(), Some('0'..='9')) {
            s.push(self.advance().unwrap_or('0'));
        }
        if self.peek() == Some('.') && matches!(self.peek2(), Some('0'..='9')) {
            is_float = true;
            s.push(self.advance().unwrap_or('.'));
            while matches!(self.peek(), Some('0'..='9')) {
                s.push(self.advance().unwrap_or('0'));
            }
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            // An exponent needs digits after it; `2e` stays two tokens.
            let mark = self.pos;
            let marker = self.advance().unwrap_or('e');
            let sign = match self.peek() {
                Some(c @ ('+' | '-')) => {
                    self.advance();
                    Some(c)
                }
                _ => None,
            };
            if matches!(self.peek(), Some('0'..='9')) {
                is_float = true;
                s.push(marker);
                if let Some(c) = sign {
                    s.push(c);
                }
                while matches!(self.peek(), Some('0'..='9')) {
                    s.push(self.advance().unwrap_or('0'));
                }
            } else {
                self.pos = mark;
            }
        }

        if is_float {
            match s.parse::<f64>() {
                Ok(x) => Token::Float(x),
                Err(_) => Token::BadNumber(s),
            }
        } else {
            match s.parse::<i64>() {
                Ok(n) => Token::Int(n),
                Err(_) => Token::BadNumber(s),
            }
        }
    }

    fn read_string(&mut self, quote: char) -> Token {
        let mut s = String::new();
        loop {
            match self.advance() {
                None | Some('\n') => break,
                Some('\\') => match self.advance() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some(c) => s.push(c),
                    None => break,
                },
                Some(c) if c == quote => break,
                Some(c) => s.push(c),
            }
        }
        Token::Str(s)
    }

    fn read_ident(&mut self, first: char) -> Token {
        let mut s = String::new();
        s.push(first);
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            s.push(self.advance().unwrap_or('_'));
        }
        Token::Ident(s)
    }

    fn next_token(&mut self) -> Token {
        self.skip_ws();
        let ch = match self.advance() {
            None => return Token::Eof,
            Some(c) => c,
        };

        match ch {
            '0'..='9' => self.read_number(ch),
            '"' => self.read_string('"'),
            '\'' => self.read_string('\''),
            c if c.is_ascii_alphabetic() || c == '_' => self.read_ident(c),
            '+' => {
                if self.eat('=') {
                    Token::PlusAssign
                } else {
                    Token::Plus
                }
            }
            '-' => {
                if self.eat('=') {
                    Token::MinusAssign
                } else {
                    Token::Minus
                }
            }
            '*' => {
                if self.eat('=') {
                    Token::StarAssign
                } else {
                    Token::Star
                }
            }
            '/' => {
                if self.eat('=') {
                    Token::SlashAssign
                } else {
                    Token::Slash
                }
            }
            '%' => {
                if self.eat('=') {
                    Token::PercentAssign
                } else {
                    Token::Percent
                }
            }
            '!' => {
                if self.eat('=') {
                    Token::Ne
                } else {
                    Token::Bang
                }
            }
            '&' => {
                if self.eat('&') {
                    Token::And
                } else {
                    Token::Unknown('&')
                }
            }
            '|' => {
                if self.eat('|') {
                    Token::Or
                } else {
                    Token::Unknown('|')
                }
            }
            '<' => {
                if self.eat('=') {
                    Token::Le
                } else {
                    Token::Lt
                }
            }
            '>' => {
                if self.eat('=') {
                    Token::Ge
                } else {
                    Token::Gt
                }
            }
            '=' => {
                if self.eat('=') {
                    Token::Eq
                } else {
                    Token::Assign
                }
            }
            '?' => Token::Question,
            ':' => Token::Colon,
            ',' => Token::Comma,
            '(' => Token::LParen,
            ')' => Token::RParen,
            c => Token::Unknown(c),
        }
    }

    fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let t = self.next_token();
            let done = matches!(t, Token::Eof);
            tokens.push(t);
            if done {
                break;
            }
        }
        tokens
    }
}

// ── AST ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

#[derive(Debug, Clone)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone)]
pub enum AssignOp {
    Set,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Value),
    Var(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Ternary(Box<Expr>, Box<Expr>, Box<Expr>),
    Assign(String, AssignOp, Box<Expr>),
    Call(String, Vec<Expr>),
    /// Parenthesised expression.  Kept as a node so a wrapped assignment
    /// stays expression-shaped at the root.
    Group(Box<Expr>),
}

impl Expr {
    /// Statement-shaped steps produce no value line.
    pub fn is_statement(&self) -> bool {
        matches!(self, Expr::Assign(..))
    }
}

// ── Parser ────────────────────────────────────────────────────────────────────

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens.get(self.pos).cloned().unwrap_or(Token::Eof);
        self.pos += 1;
        t
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == expected {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    // ── Grammar ───────────────────────────────────────────────────────────────

    fn parse_expr(&mut self) -> Result<Expr, String> {
        self.parse_assign()
    }

    fn parse_assign(&mut self) -> Result<Expr, String> {
        // Look-ahead: if next token is Ident followed by an assign op, parse as assignment.
        if let Token::Ident(name) = self.peek().clone() {
            let op = match self.tokens.get(self.pos + 1) {
                Some(Token::Assign) => Some(AssignOp::Set),
                Some(Token::PlusAssign) => Some(AssignOp::Add),
                Some(Token::MinusAssign) => Some(AssignOp::Sub),
                Some(Token::StarAssign) => Some(AssignOp::Mul),
                Some(Token::SlashAssign) => Some(AssignOp::Div),
                Some(Token::PercentAssign) => Some(AssignOp::Rem),
                _ => None,
            };
            if let Some(op) = op {
                self.pos += 2; // consume ident + assign-op
                let rhs = self.parse_assign()?;
                return Ok(Expr::Assign(name, op, Box::new(rhs)));
            }
        }
        self.parse_ternary()
    }

    fn parse_ternary(&mut self) -> Result<Expr, String> {
        let cond = self.parse_or()?;
        if self.eat(&Token::Question) {
            let then = self.parse_or()?;
            if !self.eat(&Token::Colon) {
                return Err("expected ':' in ternary".into());
            }
            let else_ = self.parse_ternary()?;
            Ok(Expr::Ternary(
                Box::new(cond),
                Box::new(then),
                Box::new(else_),
            ))
        } else {
            Ok(cond)
        }
    }

    fn parse_or(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_and()?;
        while self.eat(&Token::Or) {
            let rhs = self.parse_and()?;
            lhs = Expr::Binary(BinOp::Or, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_relational()?;
        while self.eat(&Token::And) {
            let rhs = self.parse_relational()?;
            lhs = Expr::Binary(BinOp::And, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_relational(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Token::Eq => BinOp::Eq,
                Token::Ne => BinOp::Ne,
                Token::Lt => BinOp::Lt,
                Token::Le => BinOp::Le,
                Token::Gt => BinOp::Gt,
                Token::Ge => BinOp::Ge,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_additive()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_multiplicative()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                Token::Percent => BinOp::Rem,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, String> {
        match self.peek() {
            Token::Minus => {
                self.pos += 1;
                Ok(Expr::Unary(UnaryOp::Neg, Box::new(self.parse_unary()?)))
            }
            Token::Bang => {
                self.pos += 1;
                Ok(Expr::Unary(UnaryOp::Not, Box::new(self.parse_unary()?)))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, String> {
        let tok = self.advance();
        match tok {
            Token::Int(n) => Ok(Expr::Literal(Value::Int(n))),
            Token::Float(x) => Ok(Expr::Literal(Value::Float(x))),
            Token::Str(s) => Ok(Expr::Literal(Value::Str(s))),
            Token::BadNumber(text) => Err(format!("numeric literal out of range: {text}")),
            Token::Ident(name) => {
                if self.eat(&Token::LParen) {
                    // Function call
                    let mut args = Vec::new();
                    if self.peek() != &Token::RParen {
                        args.push(self.parse_assign()?);
                        while self.eat(&Token::Comma) {
                            args.push(self.parse_assign()?);
                        }
                    }
                    if !self.eat(&Token::RParen) {
                        return Err(format!("expected ')' after args to {name}"));
                    }
                    Ok(Expr::Call(name, args))
                } else {
                    Ok(Expr::Var(name))
                }
            }
            Token::LParen => {
                let inner = self.parse_expr()?;
                if !self.eat(&Token::RParen) {
                    return Err("expected ')'".into());
                }
                Ok(Expr::Group(Box::new(inner)))
            }
            other => Err(format!("unexpected token {other:?}")),
        }
    }
}

/// Parse one step into an AST.
///
/// Returns `Ok(None)` when the step holds no expression at all, which is
/// what a comment-only step looks like after the lexer drops its text.
pub fn parse_step(src: &str) -> Result<Option<Expr>, String> {
    let tokens = Lexer::new(src).tokenize();
    if tokens.first() == Some(&Token::Eof) {
        return Ok(None);
    }
    let mut parser = Parser::new(tokens);
    let expr = parser.parse_expr()?;
    if parser.peek() != &Token::Eof {
        return Err(format!("unexpected {:?} after expression", parser.peek()));
    }
    Ok(Some(expr))
}

// ── Evaluator ─────────────────────────────────────────────────────────────────

/// Evaluate an [`Expr`] AST node against the scope.
pub fn eval_expr(expr: &Expr, scope: &mut Scope) -> Result<Value, String> {
    use std::cmp::Ordering;

    match expr {
        Expr::Literal(v) => Ok(v.clone()),

        Expr::Var(name) => scope
            .get(name)
            .cloned()
            .ok_or_else(|| format!("name {name:?} is not defined")),

        Expr::Unary(op, inner) => {
            let v = eval_expr(inner, scope)?;
            match op {
                UnaryOp::Neg => v.arith_neg(),
                UnaryOp::Not => Ok(Value::from(!v.is_truthy())),
            }
        }

        Expr::Binary(op, lhs, rhs) => {
            // Short-circuit for && and ||
            match op {
                BinOp::And => {
                    let l = eval_expr(lhs, scope)?;
                    if !l.is_truthy() {
                        return Ok(Value::Int(0));
                    }
                    let r = eval_expr(rhs, scope)?;
                    return Ok(Value::from(r.is_truthy()));
                }
                BinOp::Or => {
                    let l = eval_expr(lhs, scope)?;
                    if l.is_truthy() {
                        return Ok(Value::Int(1));
                    }
                    let r = eval_expr(rhs, scope)?;
                    return Ok(Value::from(r.is_truthy()));
                }
                _ => {}
            }
            let l = eval_expr(lhs, scope)?;
            let r = eval_expr(rhs, scope)?;
            match op {
                BinOp::Add => Ok(l.arith_add(&r)),
                BinOp::Sub => l.arith_sub(&r),
                BinOp::Mul => l.arith_mul(&r),
                BinOp::Div => l.arith_div(&r),
                BinOp::Rem => l.arith_rem(&r),
                BinOp::Eq => Ok(Value::from(l.cmp_value(&r) == Ordering::Equal)),
                BinOp::Ne => Ok(Value::from(l.cmp_value(&r) != Ordering::Equal)),
                BinOp::Lt => Ok(Value::from(l.cmp_value(&r) == Ordering::Less)),
                BinOp::Le => Ok(Value::from(l.cmp_value(&r) != Ordering::Greater)),
                BinOp::Gt => Ok(Value::from(l.cmp_value(&r) == Ordering::Greater)),
                BinOp::Ge => Ok(Value::from(l.cmp_value(&r) != Ordering::Less)),
                BinOp::And | BinOp::Or => unreachable!("handled above"),
            }
        }

        Expr::Ternary(cond, then, else_) => {
            let c = eval_expr(cond, scope)?;
            if c.is_truthy() {
                eval_expr(then, scope)
            } else {
                eval_expr(else_, scope)
            }
        }

        Expr::Assign(name, op, rhs) => {
            let rval = eval_expr(rhs, scope)?;
            let new_val = if let AssignOp::Set = op {
                rval
            } else {
                let cur = scope
                    .get(name)
                    .cloned()
                    .ok_or_else(|| format!("name {name:?} is not defined"))?;
                match op {
                    AssignOp::Add => cur.arith_add(&rval),
                    AssignOp::Sub => cur.arith_sub(&rval)?,
                    AssignOp::Mul => cur.arith_mul(&rval)?,
                    AssignOp::Div => cur.arith_div(&rval)?,
                    AssignOp::Rem => cur.arith_rem(&rval)?,
                    AssignOp::Set => unreachable!(),
                }
            };
            scope.set(name, new_val.clone());
            Ok(new_val)
        }

        Expr::Call(name, arg_exprs) => {
            let mut args = Vec::with_capacity(arg_exprs.len());
            for ae in arg_exprs {
                args.push(eval_expr(ae, scope)?);
            }
            match super::builtins::call_builtin(name, &args) {
                Some(result) => result,
                None => Err(format!("unknown function: {name}")),
            }
        }

        Expr::Group(inner) => eval_expr(inner, scope),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
