//! Indentation-driven recursive descent. Block membership comes entirely
//! from indent width: an opener (`function`, `loop`, `if`) owns every record
//! whose indent is strictly greater than its own. There are no hard parse
//! failures — anything unrecognizable becomes an inert `Unknown` node, and a
//! recognized statement whose embedded expression is malformed keeps its
//! structure with the raw text preserved in `Expr::Unparsed`.

use crate::syntax::ast::*;
use crate::syntax::line::LineRecord;
use crate::syntax::token::{self, Token, TokenKind};

pub struct Parser {
    records: Vec<LineRecord>,
    pos: usize,
}

impl Parser {
    pub fn new(records: Vec<LineRecord>) -> Self {
        Self { records, pos: 0 }
    }

    pub fn parse(mut self) -> Program {
        let statements = self.parse_block(-1);
        Program { statements }
    }

    /// Consume consecutive records while their indent is strictly greater
    /// than `parent_indent`. The top level passes -1 so every record counts.
    fn parse_block(&mut self, parent_indent: i64) -> Vec<Stmt> {
        let mut stmts = Vec::new();
        while let Some(rec) = self.records.get(self.pos) {
            if rec.indent as i64 <= parent_indent {
                break;
            }
            stmts.push(self.parse_statement());
        }
        stmts
    }

    fn parse_statement(&mut self) -> Stmt {
        let rec = self.records[self.pos].clone();
        self.pos += 1;
        let text = rec.text.as_str();

        if text.starts_with("CanvasSize") {
            if let Some(stmt) = parse_canvas(text) {
                return stmt;
            }
        }
        if let Some(rest) = text.strip_prefix("function ") {
            return self.parse_function(rest, rec.indent, text);
        }
        if let Some(rest) = text.strip_prefix("loop ") {
            return self.parse_loop(rest, rec.indent, text);
        }
        if let Some(rest) = text.strip_prefix("if ") {
            return self.parse_if(rest, rec.indent);
        }
        if text == "return" {
            return Stmt::Return(None);
        }
        if let Some(rest) = text.strip_prefix("return ") {
            return Stmt::Return(Some(parse_expr_str(rest)));
        }
        if let Some(stmt) = parse_assign_or_call(text) {
            return stmt;
        }
        Stmt::Unknown(text.to_string())
    }

    fn parse_function(&mut self, rest: &str, indent: usize, raw: &str) -> Stmt {
        let Some(header) = rest.trim().strip_suffix(':') else {
            return Stmt::Unknown(raw.to_string());
        };
        let Some((name, params)) = split_signature(header) else {
            return Stmt::Unknown(raw.to_string());
        };
        let body = self.parse_block(indent as i64);
        Stmt::FnDef(FnDef { name, params, body })
    }

    fn parse_loop(&mut self, rest: &str, indent: usize, raw: &str) -> Stmt {
        let Some(head) = rest.trim().strip_suffix(':') else {
            return Stmt::Unknown(raw.to_string());
        };
        let head = head.trim();

        if let Some(cond) = head.strip_prefix("while ") {
            let condition = parse_expr_str(cond);
            let body = self.parse_block(indent as i64);
            return Stmt::LoopWhile { condition, body };
        }

        let Some(count_part) = head.strip_suffix("times") else {
            return Stmt::Unknown(raw.to_string());
        };
        let (var, count_src) = split_loop_counter(count_part.trim());
        let count = parse_expr_str(count_src);
        let body = self.parse_block(indent as i64);
        Stmt::LoopFor { var, count, body }
    }

    fn parse_if(&mut self, rest: &str, indent: usize) -> Stmt {
        // A missing colon still reads as a condition; the structure matters
        // more than the punctuation here.
        let cond_src = rest.trim().strip_suffix(':').unwrap_or(rest.trim());
        let condition = parse_expr_str(cond_src);
        let then_block = self.parse_block(indent as i64);

        // `else:` attaches only at exactly the same indent as the `if`.
        // At any other indent it is unreachable and parses as an inert node.
        let else_block = match self.records.get(self.pos) {
            Some(rec) if rec.text == "else:" && rec.indent == indent => {
                self.pos += 1;
                self.parse_block(indent as i64)
            }
            _ => Vec::new(),
        };

        Stmt::If { condition, then_block, else_block }
    }
}

// ─── Statement helpers ───────────────────────────────────────────────────────

fn parse_canvas(text: &str) -> Option<Stmt> {
    let rest = text.strip_prefix("CanvasSize")?.trim_start().strip_prefix('=')?;
    let tokens = token::scan(rest).ok()?;
    let mut p = ExprParser::new(tokens);
    p.expect(TokenKind::LParen).ok()?;
    let width = p.parse_expr().ok()?;
    p.expect(TokenKind::Comma).ok()?;
    let height = p.parse_expr().ok()?;
    p.expect(TokenKind::RParen).ok()?;
    if !p.check(&TokenKind::Eof) {
        return None;
    }
    Some(Stmt::CanvasSize { width, height })
}

/// `name(a, b)` → name + parameter list. Empty parameter slots are skipped
/// rather than rejected.
fn split_signature(header: &str) -> Option<(String, Vec<String>)> {
    let open = header.find('(')?;
    let close = header.rfind(')')?;
    if close < open {
        return None;
    }
    let name = header[..open].trim();
    if !is_identifier(name) {
        return None;
    }
    let params = header[open + 1..close]
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();
    Some((name.to_string(), params))
}

/// Splits `i=EXPR` into counter name and count source. Anything that is not
/// a plain `IDENT=` prefix (including `==` comparisons) is treated as a bare
/// count expression with no counter variable.
fn split_loop_counter(head: &str) -> (Option<String>, &str) {
    if let Some((lhs, rhs)) = head.split_once('=') {
        if !rhs.starts_with('=') && is_identifier(lhs.trim()) {
            return (Some(lhs.trim().to_string()), rhs);
        }
    }
    (None, head)
}

fn parse_assign_or_call(text: &str) -> Option<Stmt> {
    let tokens = token::scan(text).ok()?;
    if let Some(stmt) = try_assign(text, &tokens) {
        return Some(stmt);
    }
    try_call(&tokens)
}

/// `name = expr` or `name[i][j]... = expr`. If the right-hand side fails to
/// parse, its raw text is preserved so evaluation can report it.
fn try_assign(text: &str, tokens: &[Token]) -> Option<Stmt> {
    let mut p = ExprParser::new(tokens.to_vec());
    let name = p.eat_ident()?;
    let mut indices = Vec::new();
    while p.eat(TokenKind::LBracket) {
        indices.push(p.parse_expr().ok()?);
        if !p.eat(TokenKind::RBracket) {
            return None;
        }
    }
    if !p.eat(TokenKind::Eq) || p.check(&TokenKind::Eof) {
        return None;
    }
    let rhs_start = p.current_offset();
    let value = match p.parse_expr() {
        Ok(e) if p.check(&TokenKind::Eof) => e,
        _ => Expr::Unparsed(text[rhs_start..].trim().to_string()),
    };
    Some(Stmt::Assign { name, indices, value })
}

fn try_call(tokens: &[Token]) -> Option<Stmt> {
    let mut p = ExprParser::new(tokens.to_vec());
    let callee = p.eat_ident()?;
    if !p.eat(TokenKind::LParen) {
        return None;
    }
    let args = p.parse_args().ok()?;
    if !p.check(&TokenKind::Eof) {
        return None;
    }
    Some(Stmt::Call { callee, args })
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ─── Expressions (precedence climbing) ───────────────────────────────────────

/// Parse one expression from raw text. Never fails: malformed input becomes
/// `Expr::Unparsed` carrying the trimmed text.
pub(crate) fn parse_expr_str(src: &str) -> Expr {
    let trimmed = src.trim();
    if let Ok(tokens) = token::scan(trimmed) {
        let mut p = ExprParser::new(tokens);
        if let Ok(expr) = p.parse_expr() {
            if p.check(&TokenKind::Eof) {
                return expr;
            }
        }
    }
    Expr::Unparsed(trimmed.to_string())
}

/// Internal halt marker — expression parse failures never surface, they only
/// steer the caller into a fallback.
struct ExprError;

struct ExprParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl ExprParser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn advance(&mut self) -> TokenKind {
        let kind = self.tokens[self.pos].kind.clone();
        // never step past the trailing Eof
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        kind
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek() == kind
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(&kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), ExprError> {
        if self.eat(kind) { Ok(()) } else { Err(ExprError) }
    }

    fn eat_ident(&mut self) -> Option<String> {
        if let TokenKind::Ident(name) = self.peek() {
            let name = name.clone();
            self.advance();
            Some(name)
        } else {
            None
        }
    }

    /// Byte offset of the next token in the original line.
    fn current_offset(&self) -> usize {
        self.tokens[self.pos].start
    }

    fn parse_expr(&mut self) -> Result<Expr, ExprError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_and()?;
        while self.eat(TokenKind::Or) {
            let right = self.parse_and()?;
            left = binop(left, BinOp::Or, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_equality()?;
        while self.eat(TokenKind::And) {
            let right = self.parse_equality()?;
            left = binop(left, BinOp::And, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.peek() {
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::BangEq => BinOp::NotEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            left = binop(left, op, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                TokenKind::Lt => BinOp::Lt,
                TokenKind::LtEq => BinOp::LtEq,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::GtEq => BinOp::GtEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = binop(left, op, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = binop(left, op, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = binop(left, op, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        if self.eat(TokenKind::Minus) {
            let operand = self.parse_unary()?;
            return Ok(Expr::UnOp { op: UnOp::Neg, operand: Box::new(operand) });
        }
        if self.eat(TokenKind::Not) {
            let operand = self.parse_unary()?;
            return Ok(Expr::UnOp { op: UnOp::Not, operand: Box::new(operand) });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, ExprError> {
        let mut expr = self.parse_primary()?;
        while self.eat(TokenKind::LBracket) {
            let index = self.parse_expr()?;
            self.expect(TokenKind::RBracket)?;
            expr = Expr::Index { target: Box::new(expr), index: Box::new(index) };
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        match self.peek().clone() {
            TokenKind::Num(n) => {
                self.advance();
                Ok(Expr::Num(n))
            }
            TokenKind::Str(s) => {
                self.advance();
                Ok(Expr::Str(s))
            }
            TokenKind::Bool(b) => {
                self.advance();
                Ok(Expr::Bool(b))
            }
            TokenKind::Ident(name) => {
                self.advance();
                if self.eat(TokenKind::LParen) {
                    let args = self.parse_args()?;
                    Ok(Expr::Call { callee: name, args })
                } else {
                    Ok(Expr::Ident(name))
                }
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::LBracket => {
                self.advance();
                let mut items = Vec::new();
                while !self.check(&TokenKind::RBracket) && !self.check(&TokenKind::Eof) {
                    items.push(self.parse_expr()?);
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RBracket)?;
                Ok(Expr::List(items))
            }
            _ => Err(ExprError),
        }
    }

    /// Argument list after the opening paren; consumes the closing paren.
    fn parse_args(&mut self) -> Result<Vec<Expr>, ExprError> {
        let mut args = Vec::new();
        while !self.check(&TokenKind::RParen) && !self.check(&TokenKind::Eof) {
            args.push(self.parse_expr()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(args)
    }
}

fn binop(left: Expr, op: BinOp, right: Expr) -> Expr {
    Expr::BinOp { left: Box::new(left), op, right: Box::new(right) }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::line::logical_lines;

    fn parse_src(src: &str) -> Vec<Stmt> {
        Parser::new(logical_lines(src)).parse().statements
    }

    fn num(n: f64) -> Expr {
        Expr::Num(n)
    }

    #[test]
    fn canvas_declaration() {
        let stmts = parse_src("CanvasSize = (500, 400)");
        assert_eq!(stmts, vec![Stmt::CanvasSize { width: num(500.0), height: num(400.0) }]);
    }

    #[test]
    fn plain_assignment() {
        let stmts = parse_src("x = 3");
        assert_eq!(
            stmts,
            vec![Stmt::Assign { name: "x".into(), indices: vec![], value: num(3.0) }]
        );
    }

    #[test]
    fn indexed_assignment_chain() {
        let stmts = parse_src("board[1][2] = 7");
        assert_eq!(
            stmts,
            vec![Stmt::Assign {
                name: "board".into(),
                indices: vec![num(1.0), num(2.0)],
                value: num(7.0),
            }]
        );
    }

    #[test]
    fn bare_call() {
        let stmts = parse_src("circle(10, 20, 5)");
        assert_eq!(
            stmts,
            vec![Stmt::Call { callee: "circle".into(), args: vec![num(10.0), num(20.0), num(5.0)] }]
        );
    }

    #[test]
    fn function_with_params_and_body() {
        let stmts = parse_src("function draw(a, b):\n    circle(a, b, 3)");
        match &stmts[0] {
            Stmt::FnDef(f) => {
                assert_eq!(f.name, "draw");
                assert_eq!(f.params, vec!["a".to_string(), "b".to_string()]);
                assert_eq!(f.body.len(), 1);
            }
            other => panic!("expected FnDef, got {other:?}"),
        }
    }

    #[test]
    fn counted_loop_with_var() {
        let stmts = parse_src("loop i=3 times:\n    x = 1");
        match &stmts[0] {
            Stmt::LoopFor { var, count, body } => {
                assert_eq!(var.as_deref(), Some("i"));
                assert_eq!(*count, num(3.0));
                assert_eq!(body.len(), 1);
            }
            other => panic!("expected LoopFor, got {other:?}"),
        }
    }

    #[test]
    fn counted_loop_without_var() {
        let stmts = parse_src("loop 4 times:\n    x = 1");
        match &stmts[0] {
            Stmt::LoopFor { var, count, .. } => {
                assert_eq!(*var, None);
                assert_eq!(*count, num(4.0));
            }
            other => panic!("expected LoopFor, got {other:?}"),
        }
    }

    #[test]
    fn while_loop() {
        let stmts = parse_src("loop while x < 5:\n    x = x + 1");
        match &stmts[0] {
            Stmt::LoopWhile { condition, body } => {
                assert_eq!(
                    *condition,
                    Expr::BinOp {
                        left: Box::new(Expr::Ident("x".into())),
                        op: BinOp::Lt,
                        right: Box::new(num(5.0)),
                    }
                );
                assert_eq!(body.len(), 1);
            }
            other => panic!("expected LoopWhile, got {other:?}"),
        }
    }

    #[test]
    fn sibling_by_indent() {
        // b() is back at indent 0, so it terminates the if-block.
        let stmts = parse_src("if x > 0:\n    a()\nb()");
        assert_eq!(stmts.len(), 2);
        match &stmts[0] {
            Stmt::If { then_block, else_block, .. } => {
                assert_eq!(then_block.len(), 1);
                assert!(else_block.is_empty());
            }
            other => panic!("expected If, got {other:?}"),
        }
        assert_eq!(stmts[1], Stmt::Call { callee: "b".into(), args: vec![] });
    }

    #[test]
    fn else_at_same_indent_attaches() {
        let stmts = parse_src("if x > 0:\n    a()\nelse:\n    b()");
        assert_eq!(stmts.len(), 1);
        match &stmts[0] {
            Stmt::If { then_block, else_block, .. } => {
                assert_eq!(then_block.len(), 1);
                assert_eq!(else_block.len(), 1);
            }
            other => panic!("expected If, got {other:?}"),
        }
    }

    #[test]
    fn else_at_other_indent_degenerates() {
        let stmts = parse_src("if x > 0:\n    a()\n    else:\n        b()");
        assert_eq!(stmts.len(), 1);
        match &stmts[0] {
            Stmt::If { then_block, else_block, .. } => {
                assert!(else_block.is_empty());
                // the misplaced else is an inert node inside the then-block
                assert!(then_block.contains(&Stmt::Unknown("else:".into())));
            }
            other => panic!("expected If, got {other:?}"),
        }
    }

    #[test]
    fn nested_openers() {
        let stmts = parse_src("loop i=2 times:\n    if i > 0:\n        a()\n    b()");
        match &stmts[0] {
            Stmt::LoopFor { body, .. } => {
                assert_eq!(body.len(), 2);
                assert!(matches!(body[0], Stmt::If { .. }));
                assert!(matches!(body[1], Stmt::Call { .. }));
            }
            other => panic!("expected LoopFor, got {other:?}"),
        }
    }

    #[test]
    fn return_forms() {
        assert_eq!(parse_src("return"), vec![Stmt::Return(None)]);
        assert_eq!(parse_src("return 5"), vec![Stmt::Return(Some(num(5.0)))]);
    }

    #[test]
    fn unrecognized_line_is_inert() {
        let stmts = parse_src("???");
        assert_eq!(stmts, vec![Stmt::Unknown("???".into())]);
    }

    #[test]
    fn malformed_condition_keeps_block_structure() {
        let stmts = parse_src("if )(:\n    a()");
        match &stmts[0] {
            Stmt::If { condition, then_block, .. } => {
                assert_eq!(*condition, Expr::Unparsed(")(".into()));
                assert_eq!(then_block.len(), 1);
            }
            other => panic!("expected If, got {other:?}"),
        }
    }

    #[test]
    fn malformed_rhs_preserved_as_text() {
        let stmts = parse_src("x = 1 +");
        match &stmts[0] {
            Stmt::Assign { value, .. } => assert_eq!(*value, Expr::Unparsed("1 +".into())),
            other => panic!("expected Assign, got {other:?}"),
        }
    }

    #[test]
    fn operator_precedence() {
        let stmts = parse_src("x = 2 + 3 * 4");
        match &stmts[0] {
            Stmt::Assign { value, .. } => assert_eq!(
                *value,
                Expr::BinOp {
                    left: Box::new(num(2.0)),
                    op: BinOp::Add,
                    right: Box::new(Expr::BinOp {
                        left: Box::new(num(3.0)),
                        op: BinOp::Mul,
                        right: Box::new(num(4.0)),
                    }),
                }
            ),
            other => panic!("expected Assign, got {other:?}"),
        }
    }

    #[test]
    fn logical_keywords_bind_loosest() {
        let stmts = parse_src("x = a > 1 and b < 2");
        match &stmts[0] {
            Stmt::Assign { value, .. } => {
                assert!(matches!(value, Expr::BinOp { op: BinOp::And, .. }));
            }
            other => panic!("expected Assign, got {other:?}"),
        }
    }

    #[test]
    fn list_literal_and_index_expression() {
        let stmts = parse_src("x = rows[i + 1]");
        match &stmts[0] {
            Stmt::Assign { value, .. } => assert!(matches!(value, Expr::Index { .. })),
            other => panic!("expected Assign, got {other:?}"),
        }
        let stmts = parse_src("xs = [1, 2, 3]");
        match &stmts[0] {
            Stmt::Assign { value, .. } => {
                assert_eq!(*value, Expr::List(vec![num(1.0), num(2.0), num(3.0)]));
            }
            other => panic!("expected Assign, got {other:?}"),
        }
    }

    #[test]
    fn parse_is_idempotent() {
        let src = "CanvasSize = (500, 500)\nx = 0\nfunction run():\n    circle(x, 300, 30)\n    x = x + 2\n    if x > 500:\n        x = 0";
        let first = Parser::new(logical_lines(src)).parse();
        let second = Parser::new(logical_lines(src)).parse();
        assert_eq!(first, second);
    }

    #[test]
    fn multi_line_list_parses_as_one_assignment() {
        let stmts = parse_src("xs = [1,\n    2,\n    3]\ny = 4");
        assert_eq!(stmts.len(), 2);
        assert!(matches!(&stmts[0], Stmt::Assign { name, .. } if name == "xs"));
    }
}
