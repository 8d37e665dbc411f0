//! Go parser implementation
//!
//! Recursive descent over the token stream. Types inside declarations are
//! consumed and recorded as spans only; struct/interface bodies and
//! composite literal contents are skipped with balanced-delimiter scans.

use gosift_lexer::{Lexer, Span, Token, TokenKind};

use crate::ast::*;

/// Parse error
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// Outcome of parsing a `for`/`if`/`switch` header clause
enum Header<'a> {
    Simple(Stmt<'a>),
    Range {
        key: Option<Expr<'a>>,
        value: Option<Expr<'a>>,
        define: bool,
        subject: Expr<'a>,
    },
}

/// Raw parameter-list item before name/type resolution
struct RawItem<'a> {
    names: Vec<Ident<'a>>,
    ty_span: Option<Span>,
    bare: Option<Ident<'a>>,
    variadic: bool,
}

/// The Go parser
pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token<'a>>,
    current: usize,
    errors: Vec<ParseError>,
    /// True while parsing an if/for/switch header, where a `{` opens the
    /// body rather than a composite literal (Go spec restriction).
    no_composite: bool,
}

impl<'a> Parser<'a> {
    /// Create a new parser from source code
    pub fn new(source: &'a str) -> Self {
        let tokens = Lexer::new(source).tokenize();
        Self {
            source,
            tokens,
            current: 0,
            errors: Vec::new(),
            no_composite: false,
        }
    }

    /// Parse the source into a file
    pub fn parse(mut self) -> Result<File<'a>, Vec<ParseError>> {
        let start = self.current_span();

        let package = match self.parse_package_clause() {
            Ok(id) => id,
            Err(e) => {
                return Err(vec![e]);
            }
        };

        let mut decls = Vec::with_capacity(self.tokens.len() / 40 + 4);

        while !self.is_at_end() {
            if self.eat(|k| matches!(k, TokenKind::Semicolon)) {
                continue;
            }
            match self.parse_decl() {
                Ok(decl) => decls.push(decl),
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize_decl();
                }
            }
        }

        let span = start.to(self.previous_span());

        if self.errors.is_empty() {
            Ok(File {
                package,
                decls,
                span,
            })
        } else {
            Err(self.errors)
        }
    }

    fn parse_package_clause(&mut self) -> Result<Ident<'a>, ParseError> {
        self.expect(
            |k| matches!(k, TokenKind::Package),
            "expected `package` clause",
        )?;
        let name = self.expect_ident("expected package name")?;
        self.expect_semi()?;
        Ok(name)
    }

    // ========== Declarations ==========

    fn parse_decl(&mut self) -> Result<Decl<'a>, ParseError> {
        match self.peek_kind() {
            TokenKind::Import => self.parse_import_decl(),
            TokenKind::Var => self.parse_value_decl(ValueKeyword::Var),
            TokenKind::Const => self.parse_value_decl(ValueKeyword::Const),
            TokenKind::Func => self.parse_func_decl(),
            TokenKind::Type => self.parse_type_decl(),
            _ => Err(self.error_here("expected declaration")),
        }
    }

    fn parse_import_decl(&mut self) -> Result<Decl<'a>, ParseError> {
        let start = self.current_span();
        self.advance(); // import

        let mut specs = Vec::new();

        if self.eat(|k| matches!(k, TokenKind::LeftParen)) {
            while !self.check(|k| matches!(k, TokenKind::RightParen)) && !self.is_at_end() {
                if self.eat(|k| matches!(k, TokenKind::Semicolon)) {
                    continue;
                }
                specs.push(self.parse_import_spec()?);
            }
            self.expect(
                |k| matches!(k, TokenKind::RightParen),
                "expected `)` to close import group",
            )?;
        } else {
            specs.push(self.parse_import_spec()?);
        }

        self.expect_semi()?;
        let span = start.to(self.previous_span());
        Ok(Decl::Import { specs, span })
    }

    fn parse_import_spec(&mut self) -> Result<ImportSpec<'a>, ParseError> {
        let start = self.current_span();

        let alias = match self.peek_kind() {
            TokenKind::Ident(name) => {
                let span = self.current_span();
                self.advance();
                Some(Ident { name, span })
            }
            TokenKind::Dot => {
                let span = self.current_span();
                self.advance();
                Some(Ident { name: ".", span })
            }
            _ => None,
        };

        let path = match self.peek_kind() {
            TokenKind::String(text) => {
                self.advance();
                text
            }
            _ => return Err(self.error_here("expected import path string")),
        };

        let span = start.to(self.previous_span());
        Ok(ImportSpec { alias, path, span })
    }

    fn parse_value_decl(&mut self, keyword: ValueKeyword) -> Result<Decl<'a>, ParseError> {
        let start = self.current_span();
        let keyword_span = start;
        self.advance(); // var / const

        let mut specs = Vec::new();

        if self.eat(|k| matches!(k, TokenKind::LeftParen)) {
            while !self.check(|k| matches!(k, TokenKind::RightParen)) && !self.is_at_end() {
                if self.eat(|k| matches!(k, TokenKind::Semicolon)) {
                    continue;
                }
                specs.push(self.parse_value_spec(keyword, keyword_span, true)?);
            }
            self.expect(
                |k| matches!(k, TokenKind::RightParen),
                "expected `)` to close declaration group",
            )?;
        } else {
            specs.push(self.parse_value_spec(keyword, keyword_span, false)?);
        }

        self.expect_semi()?;
        let span = start.to(self.previous_span());
        Ok(Decl::Value { specs, span })
    }

    fn parse_value_spec(
        &mut self,
        keyword: ValueKeyword,
        keyword_span: Span,
        grouped: bool,
    ) -> Result<ValueSpec<'a>, ParseError> {
        let start = self.current_span();

        let mut names = vec![self.expect_ident("expected identifier")?];
        while self.eat(|k| matches!(k, TokenKind::Comma)) {
            names.push(self.expect_ident("expected identifier")?);
        }

        let ty_span = if !self.check(|k| {
            matches!(
                k,
                TokenKind::Assign | TokenKind::Semicolon | TokenKind::RightParen
            )
        }) && !self.is_at_end()
        {
            Some(self.parse_type()?)
        } else {
            None
        };

        let mut values = Vec::new();
        if self.eat(|k| matches!(k, TokenKind::Assign)) {
            values.push(self.parse_expr()?);
            while self.eat(|k| matches!(k, TokenKind::Comma)) {
                values.push(self.parse_expr()?);
            }
        }

        let span = start.to(self.previous_span());
        Ok(ValueSpec {
            keyword,
            keyword_span,
            names,
            ty_span,
            values,
            grouped,
            span,
        })
    }

    fn parse_type_decl(&mut self) -> Result<Decl<'a>, ParseError> {
        let start = self.current_span();
        self.advance(); // type

        if self.check(|k| matches!(k, TokenKind::LeftParen)) {
            self.skip_balanced(
                |k| matches!(k, TokenKind::LeftParen),
                |k| matches!(k, TokenKind::RightParen),
            );
            self.expect_semi()?;
            let span = start.to(self.previous_span());
            return Ok(Decl::Type { name: None, span });
        }

        let name = self.expect_ident("expected type name")?;

        // Consume the definition without modeling it
        self.skip_to_stmt_end();
        let span = start.to(self.previous_span());
        Ok(Decl::Type {
            name: Some(name),
            span,
        })
    }

    fn parse_func_decl(&mut self) -> Result<Decl<'a>, ParseError> {
        let start = self.current_span();
        self.advance(); // func

        let recv = if self.check(|k| matches!(k, TokenKind::LeftParen)) {
            let (mut fields, _) = self.parse_params()?;
            fields.pop()
        } else {
            None
        };

        let name = self.expect_ident("expected function name")?;

        // Skip a type parameter list, if any
        if self.check(|k| matches!(k, TokenKind::LeftBracket)) {
            self.skip_balanced(
                |k| matches!(k, TokenKind::LeftBracket),
                |k| matches!(k, TokenKind::RightBracket),
            );
        }

        let (params, params_span) = self.parse_params()?;
        let results_span = self.parse_results()?;

        let body = if self.check(|k| matches!(k, TokenKind::LeftBrace)) {
            Some(self.parse_block()?)
        } else {
            None
        };

        self.expect_semi()?;
        let span = start.to(self.previous_span());
        Ok(Decl::Func(FuncDecl {
            name,
            recv,
            params,
            params_span,
            results_span,
            body,
            span,
        }))
    }

    /// Parse a parenthesized parameter (or receiver) list.
    ///
    /// Go's grammar is ambiguous between names and types until the whole
    /// list is seen (`(a, b int)` vs `(int, string)`), so bare identifiers
    /// are collected first and resolved once a named field appears.
    fn parse_params(&mut self) -> Result<(Vec<Param<'a>>, Span), ParseError> {
        let open = self.current_span();
        self.expect(|k| matches!(k, TokenKind::LeftParen), "expected `(`")?;

        let mut items: Vec<RawItem<'a>> = Vec::new();

        while !self.check(|k| matches!(k, TokenKind::RightParen)) && !self.is_at_end() {
            let item = self.parse_param_item()?;
            items.push(item);
            if !self.eat(|k| matches!(k, TokenKind::Comma)) {
                break;
            }
        }

        self.expect(
            |k| matches!(k, TokenKind::RightParen),
            "expected `)` to close parameter list",
        )?;
        let params_span = open.to(self.previous_span());

        Ok((resolve_params(items), params_span))
    }

    fn parse_param_item(&mut self) -> Result<RawItem<'a>, ParseError> {
        // `...T` - unnamed variadic
        if self.check(|k| matches!(k, TokenKind::Ellipsis)) {
            self.advance();
            let ty = self.parse_type()?;
            return Ok(RawItem {
                names: Vec::new(),
                ty_span: Some(ty),
                bare: None,
                variadic: true,
            });
        }

        if let TokenKind::Ident(name) = self.peek_kind() {
            let span = self.current_span();
            let next = self.peek_kind_at(1);

            // Bare identifier: a name awaiting its type, or an unnamed
            // parameter of a named type - resolved later.
            if matches!(next, TokenKind::Comma | TokenKind::RightParen) {
                self.advance();
                return Ok(RawItem {
                    names: Vec::new(),
                    ty_span: None,
                    bare: Some(Ident { name, span }),
                    variadic: false,
                });
            }

            // `pkg.Type` is a type, not a name
            if !matches!(next, TokenKind::Dot) && type_starts(&next) {
                self.advance();
                let mut variadic = false;
                if self.eat(|k| matches!(k, TokenKind::Ellipsis)) {
                    variadic = true;
                }
                let ty = self.parse_type()?;
                return Ok(RawItem {
                    names: vec![Ident { name, span }],
                    ty_span: Some(ty),
                    bare: None,
                    variadic,
                });
            }
        }

        let ty = self.parse_type()?;
        Ok(RawItem {
            names: Vec::new(),
            ty_span: Some(ty),
            bare: None,
            variadic: false,
        })
    }

    fn parse_results(&mut self) -> Result<Option<Span>, ParseError> {
        if self.check(|k| matches!(k, TokenKind::LeftParen)) {
            let start = self.current_span();
            self.skip_balanced(
                |k| matches!(k, TokenKind::LeftParen),
                |k| matches!(k, TokenKind::RightParen),
            );
            return Ok(Some(start.to(self.previous_span())));
        }
        let kind = self.peek_kind();
        if !matches!(kind, TokenKind::LeftBrace | TokenKind::Semicolon) && type_starts(&kind) {
            return Ok(Some(self.parse_type()?));
        }
        Ok(None)
    }

    /// Consume a type, returning its span. Structure is not modeled.
    fn parse_type(&mut self) -> Result<Span, ParseError> {
        let start = self.current_span();

        match self.peek_kind() {
            TokenKind::Star => {
                self.advance();
                self.parse_type()?;
            }
            TokenKind::LeftBracket => {
                // `[]T`, `[N]T`, `[...]T`
                self.skip_balanced(
                    |k| matches!(k, TokenKind::LeftBracket),
                    |k| matches!(k, TokenKind::RightBracket),
                );
                self.parse_type()?;
            }
            TokenKind::Map => {
                self.advance();
                self.expect(
                    |k| matches!(k, TokenKind::LeftBracket),
                    "expected `[` after `map`",
                )?;
                self.parse_type()?;
                self.expect(
                    |k| matches!(k, TokenKind::RightBracket),
                    "expected `]` in map type",
                )?;
                self.parse_type()?;
            }
            TokenKind::Chan => {
                self.advance();
                self.eat(|k| matches!(k, TokenKind::Arrow));
                self.parse_type()?;
            }
            TokenKind::Arrow => {
                self.advance();
                self.expect(
                    |k| matches!(k, TokenKind::Chan),
                    "expected `chan` after `<-`",
                )?;
                self.parse_type()?;
            }
            TokenKind::Func => {
                self.advance();
                if self.check(|k| matches!(k, TokenKind::LeftParen)) {
                    self.skip_balanced(
                        |k| matches!(k, TokenKind::LeftParen),
                        |k| matches!(k, TokenKind::RightParen),
                    );
                }
                let kind = self.peek_kind();
                if matches!(kind, TokenKind::LeftParen) {
                    self.skip_balanced(
                        |k| matches!(k, TokenKind::LeftParen),
                        |k| matches!(k, TokenKind::RightParen),
                    );
                } else if !matches!(
                    kind,
                    TokenKind::LeftBrace
                        | TokenKind::Semicolon
                        | TokenKind::Comma
                        | TokenKind::RightParen
                        | TokenKind::RightBracket
                        | TokenKind::RightBrace
                        | TokenKind::Assign
                ) && type_starts(&kind)
                {
                    self.parse_type()?;
                }
            }
            TokenKind::Interface | TokenKind::Struct => {
                self.advance();
                self.expect(
                    |k| matches!(k, TokenKind::LeftBrace),
                    "expected `{` in type literal",
                )?;
                // Already consumed the opening brace; rewind bookkeeping by
                // scanning to its matching close.
                let mut depth = 1usize;
                while depth > 0 && !self.is_at_end() {
                    match self.peek_kind() {
                        TokenKind::LeftBrace => depth += 1,
                        TokenKind::RightBrace => depth -= 1,
                        _ => {}
                    }
                    self.advance();
                }
            }
            TokenKind::LeftParen => {
                self.advance();
                self.parse_type()?;
                self.expect(
                    |k| matches!(k, TokenKind::RightParen),
                    "expected `)` in parenthesized type",
                )?;
            }
            TokenKind::Ellipsis => {
                self.advance();
                self.parse_type()?;
            }
            TokenKind::Ident(_) => {
                self.advance();
                if self.eat(|k| matches!(k, TokenKind::Dot)) {
                    self.expect_ident("expected identifier after `.` in type")?;
                }
                // Generic instantiation
                if self.check(|k| matches!(k, TokenKind::LeftBracket)) {
                    self.skip_balanced(
                        |k| matches!(k, TokenKind::LeftBracket),
                        |k| matches!(k, TokenKind::RightBracket),
                    );
                }
            }
            _ => return Err(self.error_here("expected type")),
        }

        Ok(start.to(self.previous_span()))
    }

    // ========== Statements ==========

    fn parse_block(&mut self) -> Result<Block<'a>, ParseError> {
        let start = self.current_span();
        self.expect(|k| matches!(k, TokenKind::LeftBrace), "expected `{`")?;

        let mut stmts = Vec::new();
        while !self.check(|k| matches!(k, TokenKind::RightBrace)) && !self.is_at_end() {
            if self.eat(|k| matches!(k, TokenKind::Semicolon)) {
                continue;
            }
            stmts.push(self.parse_stmt()?);
        }

        self.expect(
            |k| matches!(k, TokenKind::RightBrace),
            "expected `}` to close block",
        )?;
        let span = start.to(self.previous_span());
        Ok(Block { stmts, span })
    }

    fn parse_stmt(&mut self) -> Result<Stmt<'a>, ParseError> {
        match self.peek_kind() {
            TokenKind::Var => Ok(Stmt::Decl(self.parse_value_decl(ValueKeyword::Var)?)),
            TokenKind::Const => Ok(Stmt::Decl(self.parse_value_decl(ValueKeyword::Const)?)),
            TokenKind::Type => Ok(Stmt::Decl(self.parse_type_decl()?)),
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::For => self.parse_for_stmt(),
            TokenKind::Switch => self.parse_switch_stmt(),
            TokenKind::Select => self.parse_select_stmt(),
            TokenKind::Return => self.parse_return_stmt(),
            TokenKind::Defer => {
                let start = self.current_span();
                self.advance();
                let call = self.parse_expr()?;
                self.expect_semi()?;
                let span = start.to(self.previous_span());
                Ok(Stmt::Defer { call, span })
            }
            TokenKind::Go => {
                let start = self.current_span();
                self.advance();
                let call = self.parse_expr()?;
                self.expect_semi()?;
                let span = start.to(self.previous_span());
                Ok(Stmt::Go { call, span })
            }
            TokenKind::Break | TokenKind::Continue | TokenKind::Goto | TokenKind::Fallthrough => {
                self.parse_branch_stmt()
            }
            TokenKind::LeftBrace => {
                let block = self.parse_block()?;
                self.expect_semi()?;
                Ok(Stmt::Block(block))
            }
            TokenKind::Semicolon => {
                let span = self.current_span();
                self.advance();
                Ok(Stmt::Empty { span })
            }
            // Labeled statement: the label itself is transparent
            TokenKind::Ident(_) if matches!(self.peek_kind_at(1), TokenKind::Colon) => {
                let span = self.current_span();
                self.advance();
                self.advance();
                if self.eat(|k| matches!(k, TokenKind::Semicolon)) {
                    return Ok(Stmt::Empty { span });
                }
                if self.check(|k| matches!(k, TokenKind::RightBrace)) {
                    return Ok(Stmt::Empty { span });
                }
                self.parse_stmt()
            }
            _ => {
                let stmt = match self.parse_simple_stmt(false)? {
                    Header::Simple(s) => s,
                    Header::Range { .. } => {
                        return Err(self.error_here("`range` is only valid in a `for` statement"))
                    }
                };
                self.expect_semi()?;
                Ok(stmt)
            }
        }
    }

    fn parse_branch_stmt(&mut self) -> Result<Stmt<'a>, ParseError> {
        let start = self.current_span();
        let kind = match self.peek_kind() {
            TokenKind::Break => BranchKind::Break,
            TokenKind::Continue => BranchKind::Continue,
            TokenKind::Goto => BranchKind::Goto,
            _ => BranchKind::Fallthrough,
        };
        self.advance();

        let label = if let TokenKind::Ident(name) = self.peek_kind() {
            let span = self.current_span();
            self.advance();
            Some(Ident { name, span })
        } else {
            None
        };

        self.expect_semi()?;
        let span = start.to(self.previous_span());
        Ok(Stmt::Branch { kind, label, span })
    }

    fn parse_return_stmt(&mut self) -> Result<Stmt<'a>, ParseError> {
        let start = self.current_span();
        self.advance(); // return

        let mut results = Vec::new();
        if !self.check(|k| matches!(k, TokenKind::Semicolon | TokenKind::RightBrace)) {
            results.push(self.parse_expr()?);
            while self.eat(|k| matches!(k, TokenKind::Comma)) {
                results.push(self.parse_expr()?);
            }
        }

        self.expect_semi()?;
        let span = start.to(self.previous_span());
        Ok(Stmt::Return { results, span })
    }

    fn parse_if_stmt(&mut self) -> Result<Stmt<'a>, ParseError> {
        let start = self.current_span();
        self.advance(); // if

        let saved = self.no_composite;
        self.no_composite = true;

        let mut init = None;
        let header = self.parse_simple_stmt(false)?;
        let cond = if self.eat(|k| matches!(k, TokenKind::Semicolon)) {
            init = Some(Box::new(match header {
                Header::Simple(s) => s,
                Header::Range { .. } => {
                    self.no_composite = saved;
                    return Err(self.error_here("unexpected `range` in if header"));
                }
            }));
            self.parse_expr()?
        } else {
            match header {
                Header::Simple(Stmt::Expr { expr, .. }) => expr,
                _ => {
                    self.no_composite = saved;
                    return Err(self.error_here("expected condition in if statement"));
                }
            }
        };

        self.no_composite = saved;
        let then = self.parse_block()?;

        let els = if self.eat(|k| matches!(k, TokenKind::Else)) {
            if self.check(|k| matches!(k, TokenKind::If)) {
                Some(Box::new(self.parse_if_stmt()?))
            } else {
                let block = self.parse_block()?;
                self.expect_semi()?;
                Some(Box::new(Stmt::Block(block)))
            }
        } else {
            self.expect_semi()?;
            None
        };

        let span = start.to(self.previous_span());
        Ok(Stmt::If {
            init,
            cond,
            then,
            els,
            span,
        })
    }

    fn parse_for_stmt(&mut self) -> Result<Stmt<'a>, ParseError> {
        let start = self.current_span();
        self.advance(); // for

        let saved = self.no_composite;
        self.no_composite = true;

        // `for { ... }`
        if self.check(|k| matches!(k, TokenKind::LeftBrace)) {
            self.no_composite = saved;
            let body = self.parse_block()?;
            self.expect_semi()?;
            let span = start.to(self.previous_span());
            return Ok(Stmt::For {
                init: None,
                cond: None,
                post: None,
                body,
                span,
            });
        }

        // `for range x { ... }`
        if self.eat(|k| matches!(k, TokenKind::Range)) {
            let subject = self.parse_expr()?;
            self.no_composite = saved;
            let body = self.parse_block()?;
            self.expect_semi()?;
            let span = start.to(self.previous_span());
            return Ok(Stmt::Range {
                key: None,
                value: None,
                define: false,
                subject,
                body,
                span,
            });
        }

        // `for ; cond ; post { ... }`
        if self.check(|k| matches!(k, TokenKind::Semicolon)) {
            let result = self.parse_for_clauses(start, None);
            self.no_composite = saved;
            return result;
        }

        let header = self.parse_simple_stmt(true)?;

        match header {
            Header::Range {
                key,
                value,
                define,
                subject,
            } => {
                self.no_composite = saved;
                let body = self.parse_block()?;
                self.expect_semi()?;
                let span = start.to(self.previous_span());
                Ok(Stmt::Range {
                    key,
                    value,
                    define,
                    subject,
                    body,
                    span,
                })
            }
            Header::Simple(stmt) => {
                if self.check(|k| matches!(k, TokenKind::Semicolon)) {
                    let result = self.parse_for_clauses(start, Some(Box::new(stmt)));
                    self.no_composite = saved;
                    result
                } else {
                    // `for cond { ... }`
                    let cond = match stmt {
                        Stmt::Expr { expr, .. } => expr,
                        _ => {
                            self.no_composite = saved;
                            return Err(self.error_here("expected loop condition"));
                        }
                    };
                    self.no_composite = saved;
                    let body = self.parse_block()?;
                    self.expect_semi()?;
                    let span = start.to(self.previous_span());
                    Ok(Stmt::For {
                        init: None,
                        cond: Some(cond),
                        post: None,
                        body,
                        span,
                    })
                }
            }
        }
    }

    /// Parse `; cond ; post { body }` after an optional init statement
    fn parse_for_clauses(
        &mut self,
        start: Span,
        init: Option<Box<Stmt<'a>>>,
    ) -> Result<Stmt<'a>, ParseError> {
        self.expect(
            |k| matches!(k, TokenKind::Semicolon),
            "expected `;` in for clause",
        )?;

        let cond = if self.check(|k| matches!(k, TokenKind::Semicolon)) {
            None
        } else {
            Some(self.parse_expr()?)
        };

        self.expect(
            |k| matches!(k, TokenKind::Semicolon),
            "expected `;` in for clause",
        )?;

        let post = if self.check(|k| matches!(k, TokenKind::LeftBrace)) {
            None
        } else {
            match self.parse_simple_stmt(false)? {
                Header::Simple(s) => Some(Box::new(s)),
                Header::Range { .. } => {
                    return Err(self.error_here("unexpected `range` in for post statement"))
                }
            }
        };

        let saved = self.no_composite;
        self.no_composite = false;
        let body = self.parse_block()?;
        self.no_composite = saved;
        self.expect_semi()?;

        let span = start.to(self.previous_span());
        Ok(Stmt::For {
            init,
            cond,
            post,
            body,
            span,
        })
    }

    fn parse_switch_stmt(&mut self) -> Result<Stmt<'a>, ParseError> {
        let start = self.current_span();
        self.advance(); // switch

        let saved = self.no_composite;
        self.no_composite = true;

        let mut init = None;
        let mut tag = None;

        if !self.check(|k| matches!(k, TokenKind::LeftBrace)) {
            let header = self.parse_simple_stmt(false)?;
            let header = match header {
                Header::Simple(s) => s,
                Header::Range { .. } => {
                    self.no_composite = saved;
                    return Err(self.error_here("unexpected `range` in switch header"));
                }
            };

            if self.eat(|k| matches!(k, TokenKind::Semicolon)) {
                init = Some(Box::new(header));
                if !self.check(|k| matches!(k, TokenKind::LeftBrace)) {
                    tag = Some(self.parse_expr()?);
                }
            } else {
                match header {
                    Stmt::Expr { expr, .. } => tag = Some(expr),
                    other => init = Some(Box::new(other)),
                }
            }
        }

        self.no_composite = saved;
        self.expect(
            |k| matches!(k, TokenKind::LeftBrace),
            "expected `{` to open switch body",
        )?;

        let mut cases = Vec::new();
        while !self.check(|k| matches!(k, TokenKind::RightBrace)) && !self.is_at_end() {
            if self.eat(|k| matches!(k, TokenKind::Semicolon)) {
                continue;
            }
            cases.push(self.parse_case_clause()?);
        }

        self.expect(
            |k| matches!(k, TokenKind::RightBrace),
            "expected `}` to close switch",
        )?;
        self.expect_semi()?;

        let span = start.to(self.previous_span());
        Ok(Stmt::Switch {
            init,
            tag,
            cases,
            span,
        })
    }

    fn parse_case_clause(&mut self) -> Result<CaseClause<'a>, ParseError> {
        let start = self.current_span();

        let mut values = Vec::new();
        if self.eat(|k| matches!(k, TokenKind::Case)) {
            values.push(self.parse_expr()?);
            while self.eat(|k| matches!(k, TokenKind::Comma)) {
                values.push(self.parse_expr()?);
            }
        } else {
            self.expect(
                |k| matches!(k, TokenKind::Default),
                "expected `case` or `default`",
            )?;
        }

        self.expect(
            |k| matches!(k, TokenKind::Colon),
            "expected `:` after case",
        )?;

        let mut body = Vec::new();
        while !self.check(|k| {
            matches!(
                k,
                TokenKind::Case | TokenKind::Default | TokenKind::RightBrace
            )
        }) && !self.is_at_end()
        {
            if self.eat(|k| matches!(k, TokenKind::Semicolon)) {
                continue;
            }
            body.push(self.parse_stmt()?);
        }

        let span = start.to(self.previous_span());
        Ok(CaseClause { values, body, span })
    }

    fn parse_select_stmt(&mut self) -> Result<Stmt<'a>, ParseError> {
        let start = self.current_span();
        self.advance(); // select
        self.expect(
            |k| matches!(k, TokenKind::LeftBrace),
            "expected `{` after `select`",
        )?;

        let mut cases = Vec::new();
        while !self.check(|k| matches!(k, TokenKind::RightBrace)) && !self.is_at_end() {
            if self.eat(|k| matches!(k, TokenKind::Semicolon)) {
                continue;
            }
            cases.push(self.parse_comm_clause()?);
        }

        self.expect(
            |k| matches!(k, TokenKind::RightBrace),
            "expected `}` to close `select`",
        )?;
        self.expect_semi()?;
        let span = start.to(self.previous_span());
        Ok(Stmt::Select { cases, span })
    }

    /// A `select` communication clause. The `case` header is an ordinary
    /// send or receive statement.
    fn parse_comm_clause(&mut self) -> Result<CommClause<'a>, ParseError> {
        let start = self.current_span();

        let comm = if self.eat(|k| matches!(k, TokenKind::Case)) {
            match self.parse_simple_stmt(false)? {
                Header::Simple(stmt) => Some(Box::new(stmt)),
                Header::Range { .. } => {
                    return Err(self.error_here("`range` is only valid in a `for` statement"))
                }
            }
        } else {
            self.expect(
                |k| matches!(k, TokenKind::Default),
                "expected `case` or `default` in `select`",
            )?;
            None
        };

        self.expect(
            |k| matches!(k, TokenKind::Colon),
            "expected `:` after case",
        )?;

        let mut body = Vec::new();
        while !self.check(|k| {
            matches!(
                k,
                TokenKind::Case | TokenKind::Default | TokenKind::RightBrace
            )
        }) && !self.is_at_end()
        {
            if self.eat(|k| matches!(k, TokenKind::Semicolon)) {
                continue;
            }
            body.push(self.parse_stmt()?);
        }

        let span = start.to(self.previous_span());
        Ok(CommClause { comm, body, span })
    }

    /// Parse a simple statement: assignment, short declaration, inc/dec,
    /// send, or a bare expression. Does not consume the terminating
    /// semicolon.
    fn parse_simple_stmt(&mut self, allow_range: bool) -> Result<Header<'a>, ParseError> {
        let start = self.current_span();

        let mut lhs = vec![self.parse_expr()?];
        while self.eat(|k| matches!(k, TokenKind::Comma)) {
            lhs.push(self.parse_expr()?);
        }

        let kind = self.peek_kind();

        if let Some(op) = assign_op(&kind) {
            let op_span = self.current_span();
            self.advance();

            if allow_range && self.eat(|k| matches!(k, TokenKind::Range)) {
                let subject = self.parse_expr()?;
                let mut iter = lhs.into_iter();
                return Ok(Header::Range {
                    key: iter.next(),
                    value: iter.next(),
                    define: op == AssignOp::Define,
                    subject,
                });
            }

            let mut rhs = vec![self.parse_expr()?];
            while self.eat(|k| matches!(k, TokenKind::Comma)) {
                rhs.push(self.parse_expr()?);
            }

            let span = start.to(self.previous_span());
            return Ok(Header::Simple(Stmt::Assign {
                lhs,
                op,
                op_span,
                rhs,
                span,
            }));
        }

        match kind {
            TokenKind::Increment | TokenKind::Decrement => {
                let is_inc = matches!(kind, TokenKind::Increment);
                self.advance();
                let expr = lhs.swap_remove(0);
                let span = start.to(self.previous_span());
                Ok(Header::Simple(Stmt::IncDec { expr, is_inc, span }))
            }
            TokenKind::Arrow => {
                self.advance();
                let value = self.parse_expr()?;
                let chan = lhs.swap_remove(0);
                let span = start.to(self.previous_span());
                Ok(Header::Simple(Stmt::Send { chan, value, span }))
            }
            _ => {
                if lhs.len() != 1 {
                    return Err(self.error_here("expected assignment after expression list"));
                }
                let expr = lhs.swap_remove(0);
                let span = start.to(self.previous_span());
                Ok(Header::Simple(Stmt::Expr { expr, span }))
            }
        }
    }

    // ========== Expressions ==========

    fn parse_expr(&mut self) -> Result<Expr<'a>, ParseError> {
        self.parse_binary_expr(1)
    }

    fn parse_binary_expr(&mut self, min_prec: u8) -> Result<Expr<'a>, ParseError> {
        let mut left = self.parse_unary_expr()?;

        loop {
            let Some((op, prec)) = binary_op(&self.peek_kind()) else {
                break;
            };
            if prec < min_prec {
                break;
            }
            self.advance();
            let right = self.parse_binary_expr(prec + 1)?;
            let span = left.span().to(right.span());
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }

        Ok(left)
    }

    fn parse_unary_expr(&mut self) -> Result<Expr<'a>, ParseError> {
        let op = match self.peek_kind() {
            TokenKind::Not => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Plus => Some(UnaryOp::Pos),
            TokenKind::Amp => Some(UnaryOp::Amp),
            TokenKind::Star => Some(UnaryOp::Deref),
            TokenKind::Caret => Some(UnaryOp::Xor),
            TokenKind::Arrow => Some(UnaryOp::Recv),
            _ => None,
        };

        if let Some(op) = op {
            let start = self.current_span();
            self.advance();
            let operand = self.parse_unary_expr()?;
            let span = start.to(operand.span());
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
                span,
            });
        }

        self.parse_postfix_expr()
    }

    fn parse_postfix_expr(&mut self) -> Result<Expr<'a>, ParseError> {
        let mut expr = self.parse_primary_expr()?;

        loop {
            match self.peek_kind() {
                TokenKind::Dot => {
                    self.advance();
                    if self.eat(|k| matches!(k, TokenKind::LeftParen)) {
                        // Type assertion: `x.(T)` or `x.(type)`
                        if !self.eat(|k| matches!(k, TokenKind::Type)) {
                            self.parse_type()?;
                        }
                        self.expect(
                            |k| matches!(k, TokenKind::RightParen),
                            "expected `)` to close type assertion",
                        )?;
                        let span = expr.span().to(self.previous_span());
                        expr = Expr::TypeAssert {
                            recv: Box::new(expr),
                            span,
                        };
                    } else {
                        let sel = self.expect_ident("expected selector after `.`")?;
                        let span = expr.span().to(sel.span);
                        expr = Expr::Selector {
                            recv: Box::new(expr),
                            sel,
                            span,
                        };
                    }
                }
                TokenKind::LeftParen => {
                    self.advance();
                    let saved = self.no_composite;
                    self.no_composite = false;

                    let mut args = Vec::new();
                    while !self.check(|k| matches!(k, TokenKind::RightParen))
                        && !self.is_at_end()
                    {
                        args.push(self.parse_expr()?);
                        // `f(xs...)`
                        self.eat(|k| matches!(k, TokenKind::Ellipsis));
                        if !self.eat(|k| matches!(k, TokenKind::Comma)) {
                            break;
                        }
                    }

                    self.no_composite = saved;
                    self.expect(
                        |k| matches!(k, TokenKind::RightParen),
                        "expected `)` to close call",
                    )?;
                    let span = expr.span().to(self.previous_span());
                    expr = Expr::Call {
                        fun: Box::new(expr),
                        args,
                        span,
                    };
                }
                TokenKind::LeftBracket => {
                    self.advance();
                    let saved = self.no_composite;
                    self.no_composite = false;
                    expr = self.parse_index_or_slice(expr)?;
                    self.no_composite = saved;
                }
                TokenKind::LeftBrace if !self.no_composite && composite_ok(&expr) => {
                    let idents = self.skip_balanced_idents(
                        |k| matches!(k, TokenKind::LeftBrace),
                        |k| matches!(k, TokenKind::RightBrace),
                    );
                    let span = expr.span().to(self.previous_span());
                    expr = Expr::Composite { idents, span };
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn parse_index_or_slice(&mut self, recv: Expr<'a>) -> Result<Expr<'a>, ParseError> {
        let mut low = None;
        if !self.check(|k| matches!(k, TokenKind::Colon)) {
            low = Some(Box::new(self.parse_expr()?));
        }

        if self.eat(|k| matches!(k, TokenKind::Colon)) {
            let mut high = None;
            let mut max = None;
            if !self.check(|k| matches!(k, TokenKind::RightBracket | TokenKind::Colon)) {
                high = Some(Box::new(self.parse_expr()?));
            }
            if self.eat(|k| matches!(k, TokenKind::Colon)) {
                max = Some(Box::new(self.parse_expr()?));
            }
            self.expect(
                |k| matches!(k, TokenKind::RightBracket),
                "expected `]` to close slice expression",
            )?;
            let span = recv.span().to(self.previous_span());
            return Ok(Expr::Slice {
                recv: Box::new(recv),
                low,
                high,
                max,
                span,
            });
        }

        let index = low.ok_or_else(|| self.error_here("expected index expression"))?;
        self.expect(
            |k| matches!(k, TokenKind::RightBracket),
            "expected `]` to close index expression",
        )?;
        let span = recv.span().to(self.previous_span());
        Ok(Expr::Index {
            recv: Box::new(recv),
            index,
            span,
        })
    }

    fn parse_primary_expr(&mut self) -> Result<Expr<'a>, ParseError> {
        let span = self.current_span();

        match self.peek_kind() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Expr::Ident(Ident { name, span }))
            }
            TokenKind::Int(value) => {
                self.advance();
                Ok(Expr::BasicLit {
                    kind: LitKind::Int,
                    value,
                    span,
                })
            }
            TokenKind::Float(value) => {
                self.advance();
                Ok(Expr::BasicLit {
                    kind: LitKind::Float,
                    value,
                    span,
                })
            }
            TokenKind::Imag(value) => {
                self.advance();
                Ok(Expr::BasicLit {
                    kind: LitKind::Imag,
                    value,
                    span,
                })
            }
            TokenKind::Rune(value) => {
                self.advance();
                Ok(Expr::BasicLit {
                    kind: LitKind::Rune,
                    value,
                    span,
                })
            }
            TokenKind::String(value) => {
                self.advance();
                Ok(Expr::BasicLit {
                    kind: LitKind::String,
                    value,
                    span,
                })
            }
            TokenKind::LeftParen => {
                self.advance();
                let saved = self.no_composite;
                self.no_composite = false;
                let inner = self.parse_expr()?;
                self.no_composite = saved;
                self.expect(
                    |k| matches!(k, TokenKind::RightParen),
                    "expected `)` to close expression",
                )?;
                let span = span.to(self.previous_span());
                Ok(Expr::Paren {
                    inner: Box::new(inner),
                    span,
                })
            }
            TokenKind::Func => self.parse_func_lit(),
            TokenKind::LeftBracket
            | TokenKind::Map
            | TokenKind::Chan
            | TokenKind::Interface
            | TokenKind::Struct => {
                // A type in expression position: either a composite literal
                // (`[]int{...}`) or a conversion (`[]byte(s)`). The type
                // degrades to an identifier-shaped leaf either way.
                let ty_span = self.parse_type()?;
                if self.check(|k| matches!(k, TokenKind::LeftBrace)) && !self.no_composite {
                    let idents = self.skip_balanced_idents(
                        |k| matches!(k, TokenKind::LeftBrace),
                        |k| matches!(k, TokenKind::RightBrace),
                    );
                    let span = ty_span.to(self.previous_span());
                    return Ok(Expr::Composite { idents, span });
                }
                let text = &self.source[ty_span.start as usize..ty_span.end as usize];
                Ok(Expr::Ident(Ident {
                    name: text,
                    span: ty_span,
                }))
            }
            _ => Err(self.error_here("expected expression")),
        }
    }

    fn parse_func_lit(&mut self) -> Result<Expr<'a>, ParseError> {
        let start = self.current_span();
        self.advance(); // func

        let (params, _) = self.parse_params()?;
        let results_span = self.parse_results()?;

        if !self.check(|k| matches!(k, TokenKind::LeftBrace)) {
            return Err(self.error_here("expected function literal body"));
        }

        let saved = self.no_composite;
        self.no_composite = false;
        let body = self.parse_block()?;
        self.no_composite = saved;

        let span = start.to(self.previous_span());
        Ok(Expr::FuncLit {
            params,
            results_span,
            body: Box::new(body),
            span,
        })
    }

    // ========== Token helpers ==========

    fn is_at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    fn peek_kind(&self) -> TokenKind<'a> {
        self.tokens
            .get(self.current)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn peek_kind_at(&self, offset: usize) -> TokenKind<'a> {
        self.tokens
            .get(self.current + offset)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn current_span(&self) -> Span {
        self.tokens
            .get(self.current)
            .map(|t| t.span)
            .unwrap_or(Span::new(0, 0))
    }

    fn previous_span(&self) -> Span {
        if self.current == 0 {
            return Span::new(0, 0);
        }
        self.tokens
            .get(self.current - 1)
            .map(|t| t.span)
            .unwrap_or(Span::new(0, 0))
    }

    fn advance(&mut self) {
        if self.current < self.tokens.len() {
            self.current += 1;
        }
    }

    fn check(&self, pred: impl Fn(&TokenKind<'a>) -> bool) -> bool {
        pred(&self.peek_kind())
    }

    fn eat(&mut self, pred: impl Fn(&TokenKind<'a>) -> bool) -> bool {
        if self.check(pred) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(
        &mut self,
        pred: impl Fn(&TokenKind<'a>) -> bool,
        message: &str,
    ) -> Result<(), ParseError> {
        if self.eat(pred) {
            Ok(())
        } else {
            Err(self.error_here(message))
        }
    }

    fn expect_ident(&mut self, message: &str) -> Result<Ident<'a>, ParseError> {
        if let TokenKind::Ident(name) = self.peek_kind() {
            let span = self.current_span();
            self.advance();
            Ok(Ident { name, span })
        } else {
            Err(self.error_here(message))
        }
    }

    /// Accept a statement terminator: an explicit or inserted semicolon,
    /// or a closing delimiter that makes the semicolon optional.
    fn expect_semi(&mut self) -> Result<(), ParseError> {
        if self.eat(|k| matches!(k, TokenKind::Semicolon)) {
            return Ok(());
        }
        if self.check(|k| matches!(k, TokenKind::RightBrace | TokenKind::RightParen))
            || self.is_at_end()
        {
            return Ok(());
        }
        Err(self.error_here("expected `;` or newline"))
    }

    fn error_here(&self, message: &str) -> ParseError {
        ParseError::new(message, self.current_span())
    }

    /// Consume a balanced delimiter group, starting at the opening token
    fn skip_balanced(
        &mut self,
        open: impl Fn(&TokenKind<'a>) -> bool,
        close: impl Fn(&TokenKind<'a>) -> bool,
    ) {
        if !self.check(&open) {
            return;
        }
        self.advance();
        let mut depth = 1usize;
        while depth > 0 && !self.is_at_end() {
            let kind = self.peek_kind();
            if open(&kind) {
                depth += 1;
            } else if close(&kind) {
                depth -= 1;
            }
            self.advance();
        }
    }

    /// Like `skip_balanced`, but records every identifier seen inside the
    /// region. Mutation tracking treats those names as potentially written,
    /// since the skipped text may hold address-of operands or function
    /// literal bodies.
    fn skip_balanced_idents(
        &mut self,
        open: impl Fn(&TokenKind<'a>) -> bool,
        close: impl Fn(&TokenKind<'a>) -> bool,
    ) -> Vec<Ident<'a>> {
        let mut idents = Vec::new();
        if !self.check(&open) {
            return idents;
        }
        self.advance();
        let mut depth = 1usize;
        while depth > 0 && !self.is_at_end() {
            let kind = self.peek_kind();
            if open(&kind) {
                depth += 1;
            } else if close(&kind) {
                depth -= 1;
            } else if let TokenKind::Ident(name) = kind {
                idents.push(Ident {
                    name,
                    span: self.current_span(),
                });
            }
            self.advance();
        }
        idents
    }

    /// Skip to the end of the current statement, honoring nested delimiters
    fn skip_to_stmt_end(&mut self) {
        let mut paren = 0i32;
        let mut bracket = 0i32;
        let mut brace = 0i32;
        while !self.is_at_end() {
            match self.peek_kind() {
                TokenKind::LeftParen => paren += 1,
                TokenKind::RightParen => paren -= 1,
                TokenKind::LeftBracket => bracket += 1,
                TokenKind::RightBracket => bracket -= 1,
                TokenKind::LeftBrace => brace += 1,
                TokenKind::RightBrace => brace -= 1,
                TokenKind::Semicolon if paren == 0 && bracket == 0 && brace == 0 => {
                    self.advance();
                    return;
                }
                _ => {}
            }
            if paren < 0 || bracket < 0 || brace < 0 {
                return;
            }
            self.advance();
        }
    }

    /// After a declaration-level error, resynchronize at the next
    /// top-level keyword.
    fn synchronize_decl(&mut self) {
        let mut brace = 0i32;
        while !self.is_at_end() {
            match self.peek_kind() {
                TokenKind::LeftBrace => brace += 1,
                TokenKind::RightBrace => brace = (brace - 1).max(0),
                TokenKind::Func
                | TokenKind::Var
                | TokenKind::Const
                | TokenKind::Type
                | TokenKind::Import
                    if brace == 0 =>
                {
                    return;
                }
                _ => {}
            }
            self.advance();
        }
    }
}

/// Resolve raw parameter items into fields (see `parse_params`)
fn resolve_params(items: Vec<RawItem<'_>>) -> Vec<Param<'_>> {
    let has_named = items.iter().any(|i| !i.names.is_empty());

    let mut params = Vec::with_capacity(items.len());
    let mut pending: Vec<Ident<'_>> = Vec::new();

    for item in items {
        if let Some(bare) = item.bare {
            if has_named {
                pending.push(bare);
            } else {
                params.push(Param {
                    names: Vec::new(),
                    ty_span: bare.span,
                    variadic: false,
                    span: bare.span,
                });
            }
            continue;
        }

        let ty_span = item.ty_span.unwrap_or(Span::new(0, 0));
        let mut names = pending.split_off(0);
        names.extend(item.names);

        let span = names
            .first()
            .map(|n| n.span.to(ty_span))
            .unwrap_or(ty_span);

        params.push(Param {
            names,
            ty_span,
            variadic: item.variadic,
            span,
        });
    }

    // Trailing bare identifiers with no following type: unnamed params
    for bare in pending {
        params.push(Param {
            names: Vec::new(),
            ty_span: bare.span,
            variadic: false,
            span: bare.span,
        });
    }

    params
}

/// Whether a token can begin a type
fn type_starts(kind: &TokenKind<'_>) -> bool {
    matches!(
        kind,
        TokenKind::Ident(_)
            | TokenKind::Star
            | TokenKind::LeftBracket
            | TokenKind::Map
            | TokenKind::Chan
            | TokenKind::Arrow
            | TokenKind::Func
            | TokenKind::Interface
            | TokenKind::Struct
            | TokenKind::LeftParen
            | TokenKind::Ellipsis
    )
}

/// Whether an expression can be followed by a composite literal brace
fn composite_ok(expr: &Expr<'_>) -> bool {
    matches!(
        expr,
        Expr::Ident(_) | Expr::Selector { .. } | Expr::Index { .. }
    )
}

fn assign_op(kind: &TokenKind<'_>) -> Option<AssignOp> {
    let op = match kind {
        TokenKind::Assign => AssignOp::Assign,
        TokenKind::Define => AssignOp::Define,
        TokenKind::PlusAssign => AssignOp::Add,
        TokenKind::MinusAssign => AssignOp::Sub,
        TokenKind::StarAssign => AssignOp::Mul,
        TokenKind::SlashAssign => AssignOp::Div,
        TokenKind::PercentAssign => AssignOp::Rem,
        TokenKind::AmpAssign => AssignOp::And,
        TokenKind::PipeAssign => AssignOp::Or,
        TokenKind::CaretAssign => AssignOp::Xor,
        TokenKind::ShlAssign => AssignOp::Shl,
        TokenKind::ShrAssign => AssignOp::Shr,
        TokenKind::AmpCaretAssign => AssignOp::AndNot,
        _ => return None,
    };
    Some(op)
}

fn binary_op(kind: &TokenKind<'_>) -> Option<(BinaryOp, u8)> {
    let pair = match kind {
        TokenKind::OrOr => (BinaryOp::LOr, 1),
        TokenKind::AndAnd => (BinaryOp::LAnd, 2),
        TokenKind::EqEq => (BinaryOp::Eq, 3),
        TokenKind::NotEq => (BinaryOp::NotEq, 3),
        TokenKind::Lt => (BinaryOp::Lt, 3),
        TokenKind::LtEq => (BinaryOp::LtEq, 3),
        TokenKind::Gt => (BinaryOp::Gt, 3),
        TokenKind::GtEq => (BinaryOp::GtEq, 3),
        TokenKind::Plus => (BinaryOp::Add, 4),
        TokenKind::Minus => (BinaryOp::Sub, 4),
        TokenKind::Pipe => (BinaryOp::Or, 4),
        TokenKind::Caret => (BinaryOp::Xor, 4),
        TokenKind::Star => (BinaryOp::Mul, 5),
        TokenKind::Slash => (BinaryOp::Div, 5),
        TokenKind::Percent => (BinaryOp::Rem, 5),
        TokenKind::Shl => (BinaryOp::Shl, 5),
        TokenKind::Shr => (BinaryOp::Shr, 5),
        TokenKind::Amp => (BinaryOp::And, 5),
        TokenKind::AmpCaret => (BinaryOp::AndNot, 5),
        _ => return None,
    };
    Some(pair)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(source: &str) -> File<'_> {
        match Parser::new(source).parse() {
            Ok(f) => f,
            Err(errors) => panic!("parse errors in test source: {:?}", errors),
        }
    }

    #[test]
    fn parses_package_and_imports() {
        let file = parse_ok(
            "package main\n\nimport (\n\t\"fmt\"\n\tlog \"log\"\n\t. \"strings\"\n)\n",
        );
        assert_eq!(file.package.name, "main");
        let Decl::Import { specs, .. } = &file.decls[0] else {
            panic!("expected import decl");
        };
        assert_eq!(specs.len(), 3);
        assert!(specs[0].alias.is_none());
        assert_eq!(specs[1].alias.unwrap().name, "log");
        assert_eq!(specs[2].alias.unwrap().name, ".");
    }

    #[test]
    fn parses_func_decl_params() {
        let file = parse_ok("package p\n\nfunc add(a, b int, name string) int { return a }\n");
        let Decl::Func(f) = &file.decls[0] else {
            panic!("expected func decl");
        };
        assert_eq!(f.name.name, "add");
        assert_eq!(f.param_count(), 3);
        assert_eq!(f.params[0].names.len(), 2);
        assert!(f.results_span.is_some());
        assert!(f.body.is_some());
    }

    #[test]
    fn parses_unnamed_params() {
        let file = parse_ok("package p\n\nfunc h(int, string) {}\n");
        let Decl::Func(f) = &file.decls[0] else {
            panic!("expected func decl");
        };
        assert_eq!(f.param_count(), 2);
        assert!(f.params.iter().all(|p| p.names.is_empty()));
    }

    #[test]
    fn parses_variadic_param() {
        let file = parse_ok("package p\n\nfunc v(xs ...int) {}\n");
        let Decl::Func(f) = &file.decls[0] else {
            panic!("expected func decl");
        };
        assert_eq!(f.param_count(), 1);
        assert!(f.params[0].variadic);
    }

    #[test]
    fn parses_method_receiver() {
        let file = parse_ok("package p\n\nfunc (s *Server) Run() error { return nil }\n");
        let Decl::Func(f) = &file.decls[0] else {
            panic!("expected func decl");
        };
        assert!(f.recv.is_some());
        assert_eq!(f.name.name, "Run");
    }

    #[test]
    fn parses_var_and_const_specs() {
        let file = parse_ok(
            "package p\n\nvar x = 1\n\nconst (\n\ta = 1\n\tb = 2\n)\n\nvar y, z int = 3, 4\n",
        );
        let Decl::Value { specs, .. } = &file.decls[0] else {
            panic!("expected var decl");
        };
        assert_eq!(specs[0].keyword, ValueKeyword::Var);
        assert!(!specs[0].grouped);

        let Decl::Value { specs, .. } = &file.decls[1] else {
            panic!("expected const decl");
        };
        assert_eq!(specs.len(), 2);
        assert!(specs.iter().all(|s| s.grouped));
        assert!(specs.iter().all(|s| s.keyword == ValueKeyword::Const));

        let Decl::Value { specs, .. } = &file.decls[2] else {
            panic!("expected var decl");
        };
        assert_eq!(specs[0].names.len(), 2);
        assert!(specs[0].ty_span.is_some());
        assert_eq!(specs[0].values.len(), 2);
    }

    #[test]
    fn parses_if_with_init() {
        let file = parse_ok(
            "package p\n\nfunc f() {\n\tif err := g(); err != nil {\n\t\treturn\n\t}\n}\n",
        );
        let Decl::Func(f) = &file.decls[0] else {
            panic!("expected func decl");
        };
        let body = f.body.as_ref().unwrap();
        let Stmt::If { init, els, .. } = &body.stmts[0] else {
            panic!("expected if stmt");
        };
        assert!(init.is_some());
        assert!(els.is_none());
    }

    #[test]
    fn parses_three_clause_for() {
        let file = parse_ok(
            "package p\n\nfunc f() {\n\tfor i := 0; i < 10; i++ {\n\t\tg(i)\n\t}\n}\n",
        );
        let Decl::Func(f) = &file.decls[0] else {
            panic!("expected func decl");
        };
        let Stmt::For {
            init, cond, post, ..
        } = &f.body.as_ref().unwrap().stmts[0]
        else {
            panic!("expected for stmt");
        };
        assert!(init.is_some());
        assert!(cond.is_some());
        assert!(matches!(post.as_deref(), Some(Stmt::IncDec { .. })));
    }

    #[test]
    fn parses_range_loop() {
        let file =
            parse_ok("package p\n\nfunc f(xs []int) {\n\tfor i, x := range xs {\n\t\tg(i, x)\n\t}\n}\n");
        let Decl::Func(f) = &file.decls[0] else {
            panic!("expected func decl");
        };
        let Stmt::Range {
            key, value, define, ..
        } = &f.body.as_ref().unwrap().stmts[0]
        else {
            panic!("expected range stmt");
        };
        assert!(key.is_some());
        assert!(value.is_some());
        assert!(define);
    }

    #[test]
    fn parses_defer_and_go() {
        let file = parse_ok("package p\n\nfunc f() {\n\tdefer c.Close()\n\tgo run()\n}\n");
        let Decl::Func(f) = &file.decls[0] else {
            panic!("expected func decl");
        };
        let stmts = &f.body.as_ref().unwrap().stmts;
        assert!(matches!(stmts[0], Stmt::Defer { .. }));
        assert!(matches!(stmts[1], Stmt::Go { .. }));
    }

    #[test]
    fn parses_assignment_operators() {
        let file = parse_ok("package p\n\nfunc f() {\n\tx := 1\n\tx += 1\n\tx = 2\n\tx <<= 3\n}\n");
        let Decl::Func(f) = &file.decls[0] else {
            panic!("expected func decl");
        };
        let stmts = &f.body.as_ref().unwrap().stmts;
        let ops: Vec<AssignOp> = stmts
            .iter()
            .filter_map(|s| match s {
                Stmt::Assign { op, .. } => Some(*op),
                _ => None,
            })
            .collect();
        assert_eq!(
            ops,
            vec![AssignOp::Define, AssignOp::Add, AssignOp::Assign, AssignOp::Shl]
        );
    }

    #[test]
    fn parses_address_of() {
        let file = parse_ok("package p\n\nfunc f() {\n\tp := &x\n\tg(p)\n}\n");
        let Decl::Func(f) = &file.decls[0] else {
            panic!("expected func decl");
        };
        let Stmt::Assign { rhs, .. } = &f.body.as_ref().unwrap().stmts[0] else {
            panic!("expected assignment");
        };
        assert!(matches!(
            rhs[0],
            Expr::Unary {
                op: UnaryOp::Amp,
                ..
            }
        ));
    }

    #[test]
    fn composite_literals_are_opaque() {
        let file = parse_ok("package p\n\nvar s = []int{1, 2, 3}\n\nvar m = map[string]int{\"a\": 1}\n");
        let Decl::Value { specs, .. } = &file.decls[0] else {
            panic!("expected var decl");
        };
        assert!(matches!(specs[0].values[0], Expr::Composite { .. }));
    }

    #[test]
    fn brace_in_if_condition_opens_body() {
        // `Config{...}` must not be taken as a composite literal here
        let file = parse_ok("package p\n\nfunc f() {\n\tif ready {\n\t\tg()\n\t}\n}\n");
        let Decl::Func(f) = &file.decls[0] else {
            panic!("expected func decl");
        };
        assert!(matches!(
            f.body.as_ref().unwrap().stmts[0],
            Stmt::If { .. }
        ));
    }

    #[test]
    fn parses_switch_with_cases() {
        let file = parse_ok(
            "package p\n\nfunc f(x int) {\n\tswitch x {\n\tcase 1, 2:\n\t\tg()\n\tdefault:\n\t\th()\n\t}\n}\n",
        );
        let Decl::Func(f) = &file.decls[0] else {
            panic!("expected func decl");
        };
        let Stmt::Switch { cases, tag, .. } = &f.body.as_ref().unwrap().stmts[0] else {
            panic!("expected switch stmt");
        };
        assert!(tag.is_some());
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].values.len(), 2);
        assert!(cases[1].values.is_empty());
    }

    #[test]
    fn parses_func_literal() {
        let file = parse_ok("package p\n\nvar h = func(x int) int { return x }\n");
        let Decl::Value { specs, .. } = &file.decls[0] else {
            panic!("expected var decl");
        };
        assert!(matches!(specs[0].values[0], Expr::FuncLit { .. }));
    }

    #[test]
    fn reports_error_for_garbage() {
        let result = Parser::new("package p\n\nfunc f( {\n").parse();
        assert!(result.is_err());
    }

    #[test]
    fn missing_package_clause_is_fatal() {
        let result = Parser::new("func f() {}\n").parse();
        assert!(result.is_err());
    }

    #[test]
    fn parses_select_comm_clauses() {
        let file = parse_ok(
            "package p\n\nfunc f(ch chan int, out chan int) {\n\tn := 0\n\tselect {\n\tcase n = <-ch:\n\t\tuse(n)\n\tcase out <- n:\n\tdefault:\n\t\tn++\n\t}\n}\n",
        );
        let Decl::Func(f) = &file.decls[0] else {
            panic!("expected func decl");
        };
        let Stmt::Select { cases, .. } = &f.body.as_ref().unwrap().stmts[1] else {
            panic!("expected select stmt");
        };
        assert_eq!(cases.len(), 3);
        assert!(matches!(cases[0].comm.as_deref(), Some(Stmt::Assign { .. })));
        assert_eq!(cases[0].body.len(), 1);
        assert!(matches!(cases[1].comm.as_deref(), Some(Stmt::Send { .. })));
        assert!(cases[2].comm.is_none());
        assert!(matches!(cases[2].body[0], Stmt::IncDec { .. }));
    }

    #[test]
    fn parses_select_receive_short_decl() {
        let file = parse_ok(
            "package p\n\nfunc f(ch chan int) {\n\tselect {\n\tcase v, ok := <-ch:\n\t\tuse(v, ok)\n\t}\n}\n",
        );
        let Decl::Func(f) = &file.decls[0] else {
            panic!("expected func decl");
        };
        let Stmt::Select { cases, .. } = &f.body.as_ref().unwrap().stmts[0] else {
            panic!("expected select stmt");
        };
        let Some(Stmt::Assign { lhs, op, .. }) = cases[0].comm.as_deref() else {
            panic!("expected short decl in comm clause");
        };
        assert_eq!(lhs.len(), 2);
        assert!(!op.mutates());
    }

    #[test]
    fn composite_literal_records_inner_idents() {
        let file = parse_ok("package p\n\nvar s = []*int{&a, b}\n");
        let Decl::Value { specs, .. } = &file.decls[0] else {
            panic!("expected var decl");
        };
        let Expr::Composite { idents, .. } = &specs[0].values[0] else {
            panic!("expected composite literal");
        };
        let names: Vec<&str> = idents.iter().map(|id| id.name).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn parses_type_decl_opaquely() {
        let file = parse_ok(
            "package p\n\ntype Server struct {\n\taddr string\n\tport int\n}\n\nfunc f() {}\n",
        );
        assert!(matches!(file.decls[0], Decl::Type { name: Some(_), .. }));
        assert!(matches!(file.decls[1], Decl::Func(_)));
    }
}
