//! Lexer and recursive-descent parser for the restricted query language.
//!
//! ```text
//! program    := stmt (NEWLINE | ';')* ...
//! stmt       := IDENT '=' expr | expr
//! expr       := primary postfix*
//! primary    := IDENT | literal
//! postfix    := '.' IDENT '(' args? ')' | '[' STRING ']'
//! arg        := STRING cmp-op literal | expr
//! literal    := STRING | NUMBER | 'true' | 'false'
//! ```
//!
//! Anything else — and any unterminated string or stray token — is a parse
//! error surfaced as a query failure.

use crate::error::{ChatError, Result};
use crate::query::ast::{Arg, CmpOp, Expr, Literal, Program, Stmt};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
    Dot,
    Comma,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Assign,
    Cmp(CmpOp),
    Newline,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Ident(s) => format!("identifier '{s}'"),
            Token::Str(s) => format!("string \"{s}\""),
            Token::Int(i) => format!("number {i}"),
            Token::Float(f) => format!("number {f}"),
            Token::Dot => "'.'".to_string(),
            Token::Comma => "','".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::LBracket => "'['".to_string(),
            Token::RBracket => "']'".to_string(),
            Token::Assign => "'='".to_string(),
            Token::Cmp(op) => format!("'{op}'"),
            Token::Newline => "end of line".to_string(),
        }
    }
}

fn lex(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            '\n' | ';' => {
                chars.next();
                tokens.push(Token::Newline);
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            '.' => {
                chars.next();
                tokens.push(Token::Dot);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '[' => {
                chars.next();
                tokens.push(Token::LBracket);
            }
            ']' => {
                chars.next();
                tokens.push(Token::RBracket);
            }
            '=' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Cmp(CmpOp::Eq));
                } else {
                    tokens.push(Token::Assign);
                }
            }
            '!' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Cmp(CmpOp::Ne));
                } else {
                    return Err(ChatError::query("unexpected character '!'"));
                }
            }
            '<' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Cmp(CmpOp::Le));
                } else {
                    tokens.push(Token::Cmp(CmpOp::Lt));
                }
            }
            '>' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Cmp(CmpOp::Ge));
                } else {
                    tokens.push(Token::Cmp(CmpOp::Gt));
                }
            }
            '"' | '\'' => {
                let quote = c;
                chars.next();
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some(ch) if ch == quote => break,
                        Some(ch) => s.push(ch),
                        None => return Err(ChatError::query("unterminated string literal")),
                    }
                }
                tokens.push(Token::Str(s));
            }
            c if c.is_ascii_digit() || c == '-' => {
                let mut s = String::new();
                if c == '-' {
                    s.push(c);
                    chars.next();
                }
                while let Some(&ch) = chars.peek() {
                    if ch.is_ascii_digit() || ch == '.' {
                        s.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if s.contains('.') {
                    let f: f64 = s
                        .parse()
                        .map_err(|_| ChatError::query(format!("invalid number '{s}'")))?;
                    tokens.push(Token::Float(f));
                } else {
                    let i: i64 = s
                        .parse()
                        .map_err(|_| ChatError::query(format!("invalid number '{s}'")))?;
                    tokens.push(Token::Int(i));
                }
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut s = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_alphanumeric() || ch == '_' {
                        s.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(s));
            }
            other => {
                return Err(ChatError::query(format!("unexpected character '{other}'")));
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, expected: &Token) -> Result<()> {
        match self.next() {
            Some(tok) if tok == *expected => Ok(()),
            Some(tok) => Err(ChatError::query(format!(
                "expected {}, found {}",
                expected.describe(),
                tok.describe()
            ))),
            None => Err(ChatError::query(format!(
                "expected {}, found end of program",
                expected.describe()
            ))),
        }
    }

    fn skip_newlines(&mut self) {
        while self.peek() == Some(&Token::Newline) {
            self.pos += 1;
        }
    }

    fn parse_program(&mut self) -> Result<Program> {
        let mut stmts = Vec::new();
        self.skip_newlines();
        while self.peek().is_some() {
            stmts.push(self.parse_stmt()?);
            match self.peek() {
                None => break,
                Some(Token::Newline) => self.skip_newlines(),
                Some(tok) => {
                    return Err(ChatError::query(format!(
                        "expected end of statement, found {}",
                        tok.describe()
                    )))
                }
            }
        }
        if stmts.is_empty() {
            return Err(ChatError::query("empty program"));
        }
        Ok(Program { stmts })
    }

    fn parse_stmt(&mut self) -> Result<Stmt> {
        // Assignment needs two tokens of lookahead: IDENT '='.
        if let (Some(Token::Ident(name)), Some(Token::Assign)) =
            (self.tokens.get(self.pos), self.tokens.get(self.pos + 1))
        {
            let name = name.clone();
            self.pos += 2;
            let expr = self.parse_expr()?;
            return Ok(Stmt {
                target: Some(name),
                expr,
            });
        }
        let expr = self.parse_expr()?;
        Ok(Stmt { target: None, expr })
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.peek() {
                Some(Token::Dot) => {
                    self.pos += 1;
                    let name = match self.next() {
                        Some(Token::Ident(name)) => name,
                        Some(tok) => {
                            return Err(ChatError::query(format!(
                                "expected method name after '.', found {}",
                                tok.describe()
                            )))
                        }
                        None => {
                            return Err(ChatError::query("expected method name after '.'"));
                        }
                    };
                    self.expect(&Token::LParen)?;
                    let args = self.parse_args()?;
                    self.expect(&Token::RParen)?;
                    expr = Expr::MethodCall {
                        recv: Box::new(expr),
                        name,
                        args,
                    };
                }
                Some(Token::LBracket) => {
                    self.pos += 1;
                    let column = match self.next() {
                        Some(Token::Str(column)) => column,
                        Some(tok) => {
                            return Err(ChatError::query(format!(
                                "expected column name in [...], found {}",
                                tok.describe()
                            )))
                        }
                        None => {
                            return Err(ChatError::query("expected column name in [...]"));
                        }
                    };
                    self.expect(&Token::RBracket)?;
                    expr = Expr::Projection {
                        recv: Box::new(expr),
                        column,
                    };
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        match self.next() {
            Some(Token::Ident(name)) => match name.as_str() {
                "true" => Ok(Expr::Literal(Literal::Bool(true))),
                "false" => Ok(Expr::Literal(Literal::Bool(false))),
                _ => Ok(Expr::Ident(name)),
            },
            Some(Token::Str(s)) => Ok(Expr::Literal(Literal::Str(s))),
            Some(Token::Int(i)) => Ok(Expr::Literal(Literal::Int(i))),
            Some(Token::Float(f)) => Ok(Expr::Literal(Literal::Float(f))),
            Some(tok) => Err(ChatError::query(format!(
                "expected expression, found {}",
                tok.describe()
            ))),
            None => Err(ChatError::query("expected expression, found end of program")),
        }
    }

    fn parse_args(&mut self) -> Result<Vec<Arg>> {
        let mut args = Vec::new();
        if self.peek() == Some(&Token::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_arg()?);
            if self.peek() == Some(&Token::Comma) {
                self.pos += 1;
            } else {
                break;
            }
        }
        Ok(args)
    }

    fn parse_arg(&mut self) -> Result<Arg> {
        // A string followed by a comparison operator is a column comparison.
        if let (Some(Token::Str(column)), Some(Token::Cmp(op))) =
            (self.tokens.get(self.pos), self.tokens.get(self.pos + 1))
        {
            let column = column.clone();
            let op = *op;
            self.pos += 2;
            let value = self.parse_literal()?;
            return Ok(Arg::Comparison { column, op, value });
        }
        Ok(Arg::Expr(self.parse_expr()?))
    }

    fn parse_literal(&mut self) -> Result<Literal> {
        match self.next() {
            Some(Token::Str(s)) => Ok(Literal::Str(s)),
            Some(Token::Int(i)) => Ok(Literal::Int(i)),
            Some(Token::Float(f)) => Ok(Literal::Float(f)),
            Some(Token::Ident(name)) if name == "true" => Ok(Literal::Bool(true)),
            Some(Token::Ident(name)) if name == "false" => Ok(Literal::Bool(false)),
            Some(tok) => Err(ChatError::query(format!(
                "expected literal, found {}",
                tok.describe()
            ))),
            None => Err(ChatError::query("expected literal, found end of program")),
        }
    }
}

/// Parses a candidate program into an AST.
pub fn parse_program(input: &str) -> Result<Program> {
    let tokens = lex(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    parser.parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_assignment_with_groupby_chain() {
        let program =
            parse_program(r#"result = df.groupby("Department").sum("Net Amount")"#).unwrap();

        assert_eq!(program.stmts.len(), 1);
        let stmt = &program.stmts[0];
        assert_eq!(stmt.target.as_deref(), Some("result"));

        let Expr::MethodCall { recv, name, args } = &stmt.expr else {
            panic!("expected method call");
        };
        assert_eq!(name, "sum");
        assert_eq!(args, &vec![Arg::Expr(Expr::Literal(Literal::Str("Net Amount".into())))]);
        let Expr::MethodCall { name: inner, .. } = recv.as_ref() else {
            panic!("expected inner method call");
        };
        assert_eq!(inner, "groupby");
    }

    #[test]
    fn test_parse_filter_comparison() {
        let program = parse_program(r#"result = df.filter("Net Amount" > 500)"#).unwrap();
        let Expr::MethodCall { args, .. } = &program.stmts[0].expr else {
            panic!("expected method call");
        };
        assert_eq!(
            args,
            &vec![Arg::Comparison {
                column: "Net Amount".into(),
                op: CmpOp::Gt,
                value: Literal::Int(500),
            }]
        );
    }

    #[test]
    fn test_parse_projection_then_method() {
        let program = parse_program(r#"result = df["Age"].mean()"#).unwrap();
        let Expr::MethodCall { recv, name, args } = &program.stmts[0].expr else {
            panic!("expected method call");
        };
        assert_eq!(name, "mean");
        assert!(args.is_empty());
        assert_eq!(
            recv.as_ref(),
            &Expr::Projection {
                recv: Box::new(Expr::Ident("df".into())),
                column: "Age".into(),
            }
        );
    }

    #[test]
    fn test_parse_multiple_statements() {
        let program = parse_program("step = df.head(10)\nresult = step.count()").unwrap();
        assert_eq!(program.stmts.len(), 2);
        assert_eq!(program.stmts[0].target.as_deref(), Some("step"));
        assert_eq!(program.stmts[1].target.as_deref(), Some("result"));
    }

    #[test]
    fn test_parse_semicolon_separator() {
        let program = parse_program("step = df.head(10); result = step.count()").unwrap();
        assert_eq!(program.stmts.len(), 2);
    }

    #[test]
    fn test_parse_negative_and_float_literals() {
        let program = parse_program(r#"result = df.filter("Balance" < -1.5)"#).unwrap();
        let Expr::MethodCall { args, .. } = &program.stmts[0].expr else {
            panic!("expected method call");
        };
        assert_eq!(
            args,
            &vec![Arg::Comparison {
                column: "Balance".into(),
                op: CmpOp::Lt,
                value: Literal::Float(-1.5),
            }]
        );
    }

    #[test]
    fn test_parse_single_quoted_strings() {
        let program = parse_program("result = df.groupby('Department').count()").unwrap();
        assert_eq!(program.stmts.len(), 1);
    }

    #[test]
    fn test_empty_program_is_error() {
        let err = parse_program("  \n ").unwrap_err();
        assert!(err.to_string().contains("empty program"));
    }

    #[test]
    fn test_prose_is_a_parse_error() {
        let err = parse_program("Here is the code you asked for!").unwrap_err();
        assert_eq!(err.category(), "Query Error");
    }

    #[test]
    fn test_unterminated_string() {
        let err = parse_program(r#"result = df.groupby("Department"#).unwrap_err();
        assert!(err.to_string().contains("unterminated string"));
    }

    #[test]
    fn test_bool_literal_in_filter() {
        let program = parse_program(r#"result = df.filter("Active" == true)"#).unwrap();
        let Expr::MethodCall { args, .. } = &program.stmts[0].expr else {
            panic!("expected method call");
        };
        assert_eq!(
            args,
            &vec![Arg::Comparison {
                column: "Active".into(),
                op: CmpOp::Eq,
                value: Literal::Bool(true),
            }]
        );
    }
}
