use std::rc::Rc;

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::ast::{
    ArrayLiteral, BlockStatement, CallExpression, Expression, FunctionLiteral, IdentifierLiteral,
    IfExpression, IndexExpression, InfixExpression, MapLiteral, PrefixExpression, Program,
    Statement,
};
use crate::lexer::Lexer;
use crate::span::Span;
use crate::token::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("expected next token to be `{expected}`, got `{got}` instead {}", .span.at_str())]
    ExpectedPeek {
        expected: TokenKind,
        got: String,
        span: Span,
    },
    #[error("no prefix parse function for `{token}` found {}", .span.at_str())]
    NoPrefixParser { token: String, span: Span },
    #[error("could not parse `{literal}` as integer {}", .span.at_str())]
    InvalidInteger { literal: String, span: Span },
}

type ParseResult<T> = Result<T, ParseError>;

type PrefixParseFn<'a> = fn(&mut Parser<'a>) -> ParseResult<Expression>;
type InfixParseFn<'a> = fn(&mut Parser<'a>, Expression) -> ParseResult<Expression>;

/// Binding power of operators, from loosest to tightest.
#[derive(Debug, PartialEq, PartialOrd, Clone, Copy)]
pub enum Precedence {
    Lowest,
    /// `==`, `!=`
    Equals,
    /// `<`, `>`
    LessGreater,
    /// `+`, `-`
    Sum,
    /// `*`, `/`
    Product,
    /// `-x`, `!x`
    Prefix,
    /// `f(x)`, `a[i]`
    Call,
}

impl Precedence {
    fn of(kind: TokenKind) -> Precedence {
        match kind {
            TokenKind::EqualEqual | TokenKind::BangEqual => Precedence::Equals,
            TokenKind::LessThan | TokenKind::GreaterThan => Precedence::LessGreater,
            TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
            TokenKind::Star | TokenKind::Slash => Precedence::Product,
            TokenKind::LeftParen | TokenKind::LeftBracket => Precedence::Call,
            _ => Precedence::Lowest,
        }
    }
}

/// Pratt parser over a [`Lexer`].
///
/// Errors do not stop parsing: each one is recorded and the parser skips to
/// the next statement boundary, so a single pass reports every malformed
/// statement.
pub struct Parser<'a> {
    lexer: Lexer<'a>,

    current_token: Token,
    peek_token: Token,

    errors: Vec<ParseError>,
    /// Number of `{ ... }` blocks currently open
    block_depth: usize,

    prefix_parse_fns: FxHashMap<TokenKind, PrefixParseFn<'a>>,
    infix_parse_fns: FxHashMap<TokenKind, InfixParseFn<'a>>,
}

impl<'a> Parser<'a> {
    pub fn new(mut lexer: Lexer<'a>) -> Parser<'a> {
        let current_token = lexer.next_token();
        let peek_token = lexer.next_token();

        let mut parser = Parser {
            lexer,
            current_token,
            peek_token,
            errors: Vec::new(),
            block_depth: 0,
            prefix_parse_fns: FxHashMap::default(),
            infix_parse_fns: FxHashMap::default(),
        };

        parser.register_prefix(TokenKind::Identifier, Parser::parse_identifier);
        parser.register_prefix(TokenKind::Integer, Parser::parse_integer_literal);
        parser.register_prefix(TokenKind::String, Parser::parse_string_literal);
        parser.register_prefix(TokenKind::True, Parser::parse_boolean);
        parser.register_prefix(TokenKind::False, Parser::parse_boolean);
        parser.register_prefix(TokenKind::Bang, Parser::parse_prefix_expression);
        parser.register_prefix(TokenKind::Minus, Parser::parse_prefix_expression);
        parser.register_prefix(TokenKind::LeftParen, Parser::parse_grouped_expression);
        parser.register_prefix(TokenKind::If, Parser::parse_if_expression);
        parser.register_prefix(TokenKind::Fn, Parser::parse_function_literal);
        parser.register_prefix(TokenKind::LeftBracket, Parser::parse_array_literal);
        parser.register_prefix(TokenKind::LeftBrace, Parser::parse_map_literal);

        for operator in [
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::LessThan,
            TokenKind::GreaterThan,
            TokenKind::EqualEqual,
            TokenKind::BangEqual,
        ] {
            parser.register_infix(operator, Parser::parse_infix_expression);
        }
        parser.register_infix(TokenKind::LeftParen, Parser::parse_call_expression);
        parser.register_infix(TokenKind::LeftBracket, Parser::parse_index_expression);

        parser
    }

    fn register_prefix(&mut self, kind: TokenKind, func: PrefixParseFn<'a>) {
        self.prefix_parse_fns.insert(kind, func);
    }

    fn register_infix(&mut self, kind: TokenKind, func: InfixParseFn<'a>) {
        self.infix_parse_fns.insert(kind, func);
    }

    /// Errors recorded so far.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Parse the whole input. The returned program only contains the
    /// statements that parsed; check [`Parser::errors`] before trusting it.
    pub fn parse(&mut self) -> Program {
        let mut program = Program::new();

        while !self.current_token_is(TokenKind::Eof) {
            if let Some(statement) = self.parse_statement_recovering() {
                program.statements.push(statement);
            }
            self.next_token();
        }

        program
    }

    /// Parse the whole input, treating any error as fatal.
    pub fn parse_program(&mut self) -> Result<Program, Vec<ParseError>> {
        let program = self.parse();

        if !self.errors.is_empty() {
            return Err(self.errors.clone());
        }

        Ok(program)
    }

    /// Parse one statement; on failure record the error and skip ahead to
    /// the next `;`, the end of the enclosing block or the end of input.
    fn parse_statement_recovering(&mut self) -> Option<Statement> {
        match self.parse_statement() {
            Ok(statement) => Some(statement),
            Err(error) => {
                tracing::debug!(%error, "recorded parse error");
                self.errors.push(error);

                // A `}` only ends the skip when it closes a block we are inside of
                while !self.current_token_is(TokenKind::Semicolon)
                    && !self.current_token_is(TokenKind::Eof)
                    && !(self.block_depth > 0 && self.peek_token_is(TokenKind::RightBrace))
                {
                    self.next_token();
                }

                None
            }
        }
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.current_token.kind {
            TokenKind::Let => self.parse_let_statement(),
            TokenKind::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> ParseResult<Statement> {
        self.expect_peek(TokenKind::Identifier)?;
        let name = IdentifierLiteral::from(self.current_token.literal.clone());

        self.expect_peek(TokenKind::Equal)?;
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_optional_semicolon();

        Ok(Statement::Let { name, value })
    }

    fn parse_return_statement(&mut self) -> ParseResult<Statement> {
        // Consume the `return` token
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_optional_semicolon();

        Ok(Statement::Return { value })
    }

    fn parse_expression_statement(&mut self) -> ParseResult<Statement> {
        let expression = self.parse_expression(Precedence::Lowest)?;
        self.skip_optional_semicolon();

        Ok(Statement::Expression { expression })
    }

    fn skip_optional_semicolon(&mut self) {
        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
        }
    }

    /// Parse statements until the closing `}`. The current token is the opening `{`.
    fn parse_block_statement(&mut self) -> BlockStatement {
        let mut block = BlockStatement::default();
        self.block_depth += 1;
        self.next_token();

        while !self.current_token_is(TokenKind::RightBrace)
            && !self.current_token_is(TokenKind::Eof)
        {
            if let Some(statement) = self.parse_statement_recovering() {
                block.statements.push(statement);
            }
            self.next_token();
        }

        self.block_depth -= 1;
        block
    }

    fn parse_expression(&mut self, precedence: Precedence) -> ParseResult<Expression> {
        let prefix = match self.prefix_parse_fns.get(&self.current_token.kind) {
            Some(&prefix) => prefix,
            None => {
                return Err(ParseError::NoPrefixParser {
                    token: self.current_token.to_string(),
                    span: self.current_token.span,
                })
            }
        };

        let mut left = prefix(self)?;

        while precedence < self.peek_precedence() {
            let infix = match self.infix_parse_fns.get(&self.peek_token.kind) {
                Some(&infix) => infix,
                None => return Ok(left),
            };

            self.next_token();
            left = infix(self, left)?;
        }

        Ok(left)
    }

    fn parse_identifier(&mut self) -> ParseResult<Expression> {
        Ok(Expression::Identifier(IdentifierLiteral::from(
            self.current_token.literal.clone(),
        )))
    }

    fn parse_integer_literal(&mut self) -> ParseResult<Expression> {
        match self.current_token.literal.parse() {
            Ok(value) => Ok(Expression::Integer(value)),
            Err(_) => Err(ParseError::InvalidInteger {
                literal: self.current_token.literal.clone(),
                span: self.current_token.span,
            }),
        }
    }

    fn parse_string_literal(&mut self) -> ParseResult<Expression> {
        Ok(Expression::String(self.current_token.literal.clone()))
    }

    fn parse_boolean(&mut self) -> ParseResult<Expression> {
        Ok(Expression::Boolean(self.current_token_is(TokenKind::True)))
    }

    fn parse_prefix_expression(&mut self) -> ParseResult<Expression> {
        let operator = self.current_token.kind;
        self.next_token();

        let right = self.parse_expression(Precedence::Prefix)?;

        Ok(Expression::Prefix(Box::new(PrefixExpression {
            operator,
            right,
        })))
    }

    fn parse_infix_expression(&mut self, left: Expression) -> ParseResult<Expression> {
        let operator = self.current_token.kind;
        let precedence = self.current_precedence();
        self.next_token();

        let right = self.parse_expression(precedence)?;

        Ok(Expression::Infix(Box::new(InfixExpression {
            left,
            operator,
            right,
        })))
    }

    fn parse_grouped_expression(&mut self) -> ParseResult<Expression> {
        self.next_token();

        let expression = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RightParen)?;

        Ok(expression)
    }

    fn parse_if_expression(&mut self) -> ParseResult<Expression> {
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;

        self.expect_peek(TokenKind::LeftBrace)?;
        let consequence = self.parse_block_statement();

        let alternative = if self.peek_token_is(TokenKind::Else) {
            self.next_token();

            if self.peek_token_is(TokenKind::If) {
                // `else if` becomes an else block holding the nested if
                self.next_token();
                let nested = self.parse_if_expression()?;
                Some(BlockStatement {
                    statements: vec![Statement::Expression { expression: nested }],
                })
            } else {
                self.expect_peek(TokenKind::LeftBrace)?;
                Some(self.parse_block_statement())
            }
        } else {
            None
        };

        Ok(Expression::If(Box::new(IfExpression {
            condition,
            consequence,
            alternative,
        })))
    }

    fn parse_function_literal(&mut self) -> ParseResult<Expression> {
        self.expect_peek(TokenKind::LeftParen)?;
        let parameters = self.parse_function_parameters()?;

        self.expect_peek(TokenKind::LeftBrace)?;
        let body = self.parse_block_statement();

        Ok(Expression::Function(Box::new(FunctionLiteral {
            parameters,
            body: Rc::new(body),
        })))
    }

    fn parse_function_parameters(&mut self) -> ParseResult<Vec<IdentifierLiteral>> {
        let mut parameters = Vec::new();

        if self.peek_token_is(TokenKind::RightParen) {
            self.next_token();
            return Ok(parameters);
        }

        self.expect_peek(TokenKind::Identifier)?;
        parameters.push(IdentifierLiteral::from(self.current_token.literal.clone()));

        while self.peek_token_is(TokenKind::Comma) {
            self.next_token();
            self.expect_peek(TokenKind::Identifier)?;
            parameters.push(IdentifierLiteral::from(self.current_token.literal.clone()));
        }

        self.expect_peek(TokenKind::RightParen)?;

        Ok(parameters)
    }

    fn parse_call_expression(&mut self, function: Expression) -> ParseResult<Expression> {
        let arguments = self.parse_expression_list(TokenKind::RightParen)?;

        Ok(Expression::Call(Box::new(CallExpression {
            function,
            arguments,
        })))
    }

    fn parse_array_literal(&mut self) -> ParseResult<Expression> {
        let elements = self.parse_expression_list(TokenKind::RightBracket)?;

        Ok(Expression::Array(Box::new(ArrayLiteral { elements })))
    }

    /// Parse comma-separated expressions up to `end`. The current token is the opening delimiter.
    fn parse_expression_list(&mut self, end: TokenKind) -> ParseResult<Vec<Expression>> {
        let mut list = Vec::new();

        if self.peek_token_is(end) {
            self.next_token();
            return Ok(list);
        }

        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_token_is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }

        self.expect_peek(end)?;

        Ok(list)
    }

    fn parse_index_expression(&mut self, left: Expression) -> ParseResult<Expression> {
        self.next_token();

        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RightBracket)?;

        Ok(Expression::Index(Box::new(IndexExpression { left, index })))
    }

    fn parse_map_literal(&mut self) -> ParseResult<Expression> {
        let mut pairs = Vec::new();

        while !self.peek_token_is(TokenKind::RightBrace) {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;

            self.expect_peek(TokenKind::Colon)?;
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;

            pairs.push((key, value));

            if !self.peek_token_is(TokenKind::RightBrace) {
                self.expect_peek(TokenKind::Comma)?;
            }
        }

        self.expect_peek(TokenKind::RightBrace)?;

        Ok(Expression::Map(Box::new(MapLiteral { pairs })))
    }

    fn next_token(&mut self) {
        let next = self.lexer.next_token();
        self.current_token = std::mem::replace(&mut self.peek_token, next);
    }

    fn current_token_is(&self, kind: TokenKind) -> bool {
        self.current_token.is(kind)
    }

    fn peek_token_is(&self, kind: TokenKind) -> bool {
        self.peek_token.is(kind)
    }

    fn expect_peek(&mut self, kind: TokenKind) -> ParseResult<()> {
        if self.peek_token_is(kind) {
            self.next_token();
            Ok(())
        } else {
            Err(ParseError::ExpectedPeek {
                expected: kind,
                got: self.peek_token.to_string(),
                span: self.peek_token.span,
            })
        }
    }

    fn peek_precedence(&self) -> Precedence {
        Precedence::of(self.peek_token.kind)
    }

    fn current_precedence(&self) -> Precedence {
        Precedence::of(self.current_token.kind)
    }
}
