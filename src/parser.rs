//! Chain & Pipeline Parser (§4.F) and Script Interpreter's compound-command
//! grammar (§4.G), combined into one recursive-descent parser over the
//! token stream from [`crate::lexer`].

use crate::ast::*;
use crate::errors::ParseError;
use crate::heredoc::extract_heredocs;
use crate::lexer::{join_continuations, tokenize, Op, Token};
use crate::words::parse_word;

pub fn parse_script(src: &str) -> Result<ScriptNode, ParseError> {
    let joined = join_continuations(src);
    let (stripped, heredocs) = extract_heredocs(&joined)?;
    let tokens = tokenize(&stripped)?;
    let mut p = Parser { tokens, pos: 0, heredocs, heredoc_pos: 0 };
    let script = p.parse_script_top()?;
    Ok(script)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    heredocs: Vec<HereDocNode>,
    heredoc_pos: usize,
}

const UNARY_TEST_OPS: &[&str] = &[
    "-z", "-n", "-e", "-f", "-d", "-r", "-w", "-x", "-s", "-L", "-h", "-p", "-S", "-b", "-c",
    "-u", "-g", "-k", "-O", "-G", "-N", "-t", "-o",
];
const BINARY_TEST_OPS: &[&str] = &[
    "==", "=", "!=", "<", ">", "-eq", "-ne", "-lt", "-le", "-gt", "-ge", "-nt", "-ot", "-ef",
];

impl Parser {
    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn peek_n(&self, n: usize) -> &Token {
        self.tokens.get(self.pos + n).unwrap_or(&Token::Eof)
    }

    fn bump(&mut self) -> Token {
        let t = self.tokens.get(self.pos).cloned().unwrap_or(Token::Eof);
        if matches!(t, Token::Eof) {
            t
        } else {
            self.pos += 1;
            t
        }
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek(), Token::Eof)
    }

    fn skip_newlines(&mut self) {
        while matches!(self.peek(), Token::Newline) {
            self.pos += 1;
        }
    }

    fn skip_separators(&mut self) {
        while matches!(self.peek(), Token::Newline | Token::Op(Op::Semi)) {
            self.pos += 1;
        }
    }

    fn is_word(&self, s: &str) -> bool {
        matches!(self.peek(), Token::Word(w) if w == s)
    }

    fn is_word_at(&self, n: usize, s: &str) -> bool {
        matches!(self.peek_n(n), Token::Word(w) if w == s)
    }

    fn expect_op(&mut self, op: Op) -> Result<(), ParseError> {
        if *self.peek() == Token::Op(op) {
            self.pos += 1;
            Ok(())
        } else {
            Err(ParseError::SyntaxError(format!("expected {op:?}, found {:?}", self.peek())))
        }
    }

    fn expect_word(&mut self, s: &str) -> Result<(), ParseError> {
        if self.is_word(s) {
            self.pos += 1;
            Ok(())
        } else {
            Err(ParseError::SyntaxError(format!("expected `{s}`, found {:?}", self.peek())))
        }
    }

    fn next_heredoc(&mut self) -> Result<HereDocNode, ParseError> {
        let h = self
            .heredocs
            .get(self.heredoc_pos)
            .cloned()
            .ok_or_else(|| ParseError::SyntaxError("heredoc body missing".into()))?;
        self.heredoc_pos += 1;
        Ok(h)
    }

    // ---- top level -------------------------------------------------------

    fn parse_script_top(&mut self) -> Result<ScriptNode, ParseError> {
        let mut statements = Vec::new();
        self.skip_separators();
        while !self.at_eof() {
            let stmt = self.parse_statement()?;
            statements.push(stmt);
            if !self.at_eof() && !matches!(self.peek(), Token::Newline | Token::Op(Op::Semi)) {
                return Err(ParseError::SyntaxError(format!(
                    "unexpected token after statement: {:?}",
                    self.peek()
                )));
            }
            self.skip_separators();
        }
        Ok(ScriptNode { statements })
    }

    /// Parses statements until a reserved closing word or EOF is reached;
    /// used for compound-command bodies.
    fn parse_statements_until(&mut self, stop_words: &[&str]) -> Result<Vec<StatementNode>, ParseError> {
        let mut statements = Vec::new();
        self.skip_separators();
        loop {
            if self.at_eof() {
                return Err(ParseError::UnexpectedEof);
            }
            if stop_words.iter().any(|w| self.is_word(w)) {
                break;
            }
            let stmt = self.parse_statement()?;
            statements.push(stmt);
            self.skip_separators();
        }
        Ok(statements)
    }

    fn parse_statement(&mut self) -> Result<StatementNode, ParseError> {
        let mut pipelines = vec![self.parse_pipeline()?];
        let mut operators = Vec::new();
        loop {
            match self.peek() {
                Token::Op(Op::AndAnd) => {
                    self.pos += 1;
                    self.skip_newlines();
                    operators.push(StatementOperator::And);
                    pipelines.push(self.parse_pipeline()?);
                }
                Token::Op(Op::OrOr) => {
                    self.pos += 1;
                    self.skip_newlines();
                    operators.push(StatementOperator::Or);
                    pipelines.push(self.parse_pipeline()?);
                }
                _ => break,
            }
        }
        let background = matches!(self.peek(), Token::Op(Op::Amp));
        if background {
            self.pos += 1;
        }
        Ok(StatementNode { pipelines, operators, background })
    }

    fn parse_pipeline(&mut self) -> Result<PipelineNode, ParseError> {
        let mut negated = false;
        while matches!(self.peek(), Token::Op(Op::Bang)) {
            negated = !negated;
            self.pos += 1;
        }
        let mut commands = vec![self.parse_command()?];
        while matches!(self.peek(), Token::Op(Op::Pipe)) {
            self.pos += 1;
            self.skip_newlines();
            commands.push(self.parse_command()?);
        }
        Ok(PipelineNode { commands, negated })
    }

    fn parse_command(&mut self) -> Result<CommandNode, ParseError> {
        if self.is_word("if") {
            return Ok(CommandNode::Compound(CompoundCommandNode::If(self.parse_if()?)));
        }
        if self.is_word("while") {
            return Ok(CommandNode::Compound(CompoundCommandNode::While(self.parse_while()?)));
        }
        if self.is_word("until") {
            return Ok(CommandNode::Compound(CompoundCommandNode::Until(self.parse_until()?)));
        }
        if self.is_word("for") {
            return self.parse_for();
        }
        if self.is_word("case") {
            return Ok(CommandNode::Compound(CompoundCommandNode::Case(self.parse_case()?)));
        }
        if self.is_word("function") {
            return Ok(CommandNode::FunctionDef(self.parse_function_keyword()?));
        }
        if matches!(self.peek(), Token::Op(Op::LBrace)) {
            return Ok(CommandNode::Compound(CompoundCommandNode::Group(self.parse_group()?)));
        }
        if matches!(self.peek(), Token::Op(Op::LParen)) {
            return Ok(CommandNode::Compound(CompoundCommandNode::Subshell(self.parse_subshell()?)));
        }
        if matches!(self.peek(), Token::Op(Op::DParenL)) {
            return Ok(CommandNode::Compound(CompoundCommandNode::ArithmeticCommand(
                self.parse_arith_command()?,
            )));
        }
        if matches!(self.peek(), Token::Op(Op::DBrackL)) {
            return Ok(CommandNode::Compound(CompoundCommandNode::ConditionalCommand(
                self.parse_cond_command()?,
            )));
        }
        // NAME() { ... }  or  NAME() ( ... )
        if let Token::Word(name) = self.peek().clone() {
            if is_plain_name(&name) && matches!(self.peek_n(1), Token::Op(Op::LParen)) && matches!(self.peek_n(2), Token::Op(Op::RParen)) {
                self.pos += 3;
                self.skip_newlines();
                let body = self.parse_function_body()?;
                return Ok(CommandNode::FunctionDef(FunctionDefNode { name, body: Box::new(body), redirections: vec![] }));
            }
        }
        Ok(CommandNode::Simple(self.parse_simple_command()?))
    }

    fn parse_function_keyword(&mut self) -> Result<FunctionDefNode, ParseError> {
        self.pos += 1; // 'function'
        let name = match self.bump() {
            Token::Word(w) => w,
            other => return Err(ParseError::SyntaxError(format!("expected function name, found {other:?}"))),
        };
        if matches!(self.peek(), Token::Op(Op::LParen)) && matches!(self.peek_n(1), Token::Op(Op::RParen)) {
            self.pos += 2;
        }
        self.skip_newlines();
        let body = self.parse_function_body()?;
        Ok(FunctionDefNode { name, body: Box::new(body), redirections: vec![] })
    }

    fn parse_function_body(&mut self) -> Result<CompoundCommandNode, ParseError> {
        if matches!(self.peek(), Token::Op(Op::LBrace)) {
            Ok(CompoundCommandNode::Group(self.parse_group()?))
        } else if matches!(self.peek(), Token::Op(Op::LParen)) {
            Ok(CompoundCommandNode::Subshell(self.parse_subshell()?))
        } else {
            Err(ParseError::SyntaxError("expected `{` or `(` for function body".into()))
        }
    }

    fn parse_group(&mut self) -> Result<GroupNode, ParseError> {
        self.expect_op(Op::LBrace)?;
        let body = self.parse_group_body()?;
        self.expect_op(Op::RBrace)?;
        let redirections = self.parse_redirections()?;
        Ok(GroupNode { body, redirections })
    }

    fn parse_group_body(&mut self) -> Result<Vec<StatementNode>, ParseError> {
        let mut statements = Vec::new();
        self.skip_separators();
        loop {
            if matches!(self.peek(), Token::Op(Op::RBrace)) {
                break;
            }
            if self.at_eof() {
                return Err(ParseError::UnexpectedEof);
            }
            statements.push(self.parse_statement()?);
            self.skip_separators();
        }
        Ok(statements)
    }

    fn parse_subshell_body(&mut self) -> Result<Vec<StatementNode>, ParseError> {
        let mut statements = Vec::new();
        self.skip_separators();
        loop {
            if matches!(self.peek(), Token::Op(Op::RParen)) {
                break;
            }
            if self.at_eof() {
                return Err(ParseError::UnexpectedEof);
            }
            statements.push(self.parse_statement()?);
            self.skip_separators();
        }
        Ok(statements)
    }

    fn parse_if(&mut self) -> Result<IfNode, ParseError> {
        self.expect_word("if")?;
        let mut clauses = Vec::new();
        loop {
            let condition = self.parse_statements_until(&["then"])?;
            self.expect_word("then")?;
            let body = self.parse_statements_until(&["elif", "else", "fi"])?;
            clauses.push(IfClause { condition, body });
            if self.is_word("elif") {
                self.pos += 1;
                continue;
            }
            break;
        }
        let else_body = if self.is_word("else") {
            self.pos += 1;
            Some(self.parse_statements_until(&["fi"])?)
        } else {
            None
        };
        self.expect_word("fi")?;
        let redirections = self.parse_redirections()?;
        Ok(IfNode { clauses, else_body, redirections })
    }

    fn parse_while(&mut self) -> Result<WhileNode, ParseError> {
        self.expect_word("while")?;
        let condition = self.parse_statements_until(&["do"])?;
        self.expect_word("do")?;
        let body = self.parse_statements_until(&["done"])?;
        self.expect_word("done")?;
        let redirections = self.parse_redirections()?;
        Ok(WhileNode { condition, body, redirections })
    }

    fn parse_until(&mut self) -> Result<UntilNode, ParseError> {
        self.expect_word("until")?;
        let condition = self.parse_statements_until(&["do"])?;
        self.expect_word("do")?;
        let body = self.parse_statements_until(&["done"])?;
        self.expect_word("done")?;
        let redirections = self.parse_redirections()?;
        Ok(UntilNode { condition, body, redirections })
    }

    fn parse_for(&mut self) -> Result<CommandNode, ParseError> {
        self.expect_word("for")?;
        if matches!(self.peek(), Token::Op(Op::DParenL)) {
            self.pos += 1;
            let init = self.parse_arith_clause_opt()?;
            self.expect_semi_in_cstyle_for()?;
            let condition = self.parse_arith_clause_opt()?;
            self.expect_semi_in_cstyle_for()?;
            let update = self.parse_arith_clause_opt()?;
            self.expect_op(Op::DParenR)?;
            self.skip_separators();
            let body = self.parse_do_done_body()?;
            let redirections = self.parse_redirections()?;
            return Ok(CommandNode::Compound(CompoundCommandNode::CStyleFor(CStyleForNode {
                init,
                condition,
                update,
                body,
                redirections,
            })));
        }
        let variable = match self.bump() {
            Token::Word(w) => w,
            other => return Err(ParseError::SyntaxError(format!("expected loop variable, found {other:?}"))),
        };
        self.skip_newlines();
        let words = if self.is_word("in") {
            self.pos += 1;
            let mut ws = Vec::new();
            while let Token::Word(w) = self.peek().clone() {
                ws.push(parse_word(&w)?);
                self.pos += 1;
            }
            Some(ws)
        } else {
            None
        };
        self.skip_separators();
        let body = self.parse_do_done_body()?;
        let redirections = self.parse_redirections()?;
        Ok(CommandNode::Compound(CompoundCommandNode::For(ForNode { variable, words, body, redirections })))
    }

    fn expect_semi_in_cstyle_for(&mut self) -> Result<(), ParseError> {
        if matches!(self.peek(), Token::Op(Op::Semi)) {
            self.pos += 1;
            Ok(())
        } else {
            Err(ParseError::SyntaxError("expected `;` in C-style for".into()))
        }
    }

    fn parse_arith_clause_opt(&mut self) -> Result<Option<ArithmeticExpressionNode>, ParseError> {
        // Reassemble raw text until the next top-level `;` or `))`, then feed
        // to the arithmetic parser (the main lexer already balanced parens).
        let mut text = String::new();
        loop {
            match self.peek().clone() {
                Token::Op(Op::Semi) | Token::Op(Op::DParenR) => break,
                Token::Word(w) => {
                    if !text.is_empty() {
                        text.push(' ');
                    }
                    text.push_str(&w);
                    self.pos += 1;
                }
                Token::Eof => return Err(ParseError::UnexpectedEof),
                other => return Err(ParseError::SyntaxError(format!("unexpected token in arithmetic clause: {other:?}"))),
            }
        }
        if text.trim().is_empty() {
            return Ok(None);
        }
        let expr = crate::arith::parse_arith(&text).map_err(|e| ParseError::SyntaxError(e.to_string()))?;
        Ok(Some(ArithmeticExpressionNode { expression: expr }))
    }

    fn parse_do_done_body(&mut self) -> Result<Vec<StatementNode>, ParseError> {
        self.expect_word("do")?;
        let body = self.parse_statements_until(&["done"])?;
        self.expect_word("done")?;
        Ok(body)
    }

    fn parse_case(&mut self) -> Result<CaseNode, ParseError> {
        self.expect_word("case")?;
        let word = match self.bump() {
            Token::Word(w) => parse_word(&w)?,
            other => return Err(ParseError::SyntaxError(format!("expected case word, found {other:?}"))),
        };
        self.skip_newlines();
        self.expect_word("in")?;
        self.skip_separators();
        let mut items = Vec::new();
        while !self.is_word("esac") {
            if matches!(self.peek(), Token::Op(Op::LParen)) {
                self.pos += 1;
            }
            let mut patterns = vec![self.bump_pattern_word()?];
            while matches!(self.peek(), Token::Op(Op::Pipe)) {
                self.pos += 1;
                patterns.push(self.bump_pattern_word()?);
            }
            self.expect_op(Op::RParen)?;
            self.skip_separators();
            let body = self.parse_statements_until_case_terminator()?;
            let terminator = match self.peek().clone() {
                Token::Op(Op::DSemi) => {
                    self.pos += 1;
                    CaseTerminator::DoubleSemi
                }
                Token::Op(Op::SemiAnd) => {
                    self.pos += 1;
                    CaseTerminator::SemiAnd
                }
                Token::Op(Op::SemiSemiAnd) => {
                    self.pos += 1;
                    CaseTerminator::SemiSemiAnd
                }
                _ => CaseTerminator::DoubleSemi,
            };
            items.push(CaseItemNode { patterns, body, terminator });
            self.skip_separators();
        }
        self.expect_word("esac")?;
        let redirections = self.parse_redirections()?;
        Ok(CaseNode { word, items, redirections })
    }

    fn bump_pattern_word(&mut self) -> Result<WordNode, ParseError> {
        match self.bump() {
            Token::Word(w) => parse_word(&w),
            other => Err(ParseError::SyntaxError(format!("expected case pattern, found {other:?}"))),
        }
    }

    fn parse_statements_until_case_terminator(&mut self) -> Result<Vec<StatementNode>, ParseError> {
        let mut statements = Vec::new();
        self.skip_separators();
        loop {
            if self.at_eof() || self.is_word("esac") {
                break;
            }
            if matches!(self.peek(), Token::Op(Op::DSemi) | Token::Op(Op::SemiAnd) | Token::Op(Op::SemiSemiAnd)) {
                break;
            }
            statements.push(self.parse_statement()?);
            self.skip_separators();
            if matches!(self.peek(), Token::Op(Op::DSemi) | Token::Op(Op::SemiAnd) | Token::Op(Op::SemiSemiAnd)) {
                break;
            }
        }
        Ok(statements)
    }

    fn parse_subshell(&mut self) -> Result<SubshellNode, ParseError> {
        self.expect_op(Op::LParen)?;
        let body = self.parse_subshell_body()?;
        self.expect_op(Op::RParen)?;
        let redirections = self.parse_redirections()?;
        Ok(SubshellNode { body, redirections })
    }

    fn parse_arith_command(&mut self) -> Result<ArithmeticCommandNode, ParseError> {
        self.expect_op(Op::DParenL)?;
        let mut text = String::new();
        loop {
            match self.peek().clone() {
                Token::Op(Op::DParenR) => break,
                Token::Word(w) => {
                    if !text.is_empty() {
                        text.push(' ');
                    }
                    text.push_str(&w);
                    self.pos += 1;
                }
                Token::Eof => return Err(ParseError::UnexpectedEof),
                other => return Err(ParseError::SyntaxError(format!("unexpected token in (( )): {other:?}"))),
            }
        }
        self.expect_op(Op::DParenR)?;
        let expr = crate::arith::parse_arith(&text).map_err(|e| ParseError::SyntaxError(e.to_string()))?;
        let redirections = self.parse_redirections()?;
        Ok(ArithmeticCommandNode { expression: ArithmeticExpressionNode { expression: expr }, redirections })
    }

    fn parse_cond_command(&mut self) -> Result<ConditionalCommandNode, ParseError> {
        self.expect_op(Op::DBrackL)?;
        let expr = self.parse_cond_or()?;
        self.expect_op(Op::DBrackR)?;
        let redirections = self.parse_redirections()?;
        Ok(ConditionalCommandNode { expression: expr, redirections })
    }

    fn parse_cond_or(&mut self) -> Result<ConditionalExpressionNode, ParseError> {
        let mut left = self.parse_cond_and()?;
        while matches!(self.peek(), Token::Op(Op::OrOr)) {
            self.pos += 1;
            let right = self.parse_cond_and()?;
            left = ConditionalExpressionNode::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_cond_and(&mut self) -> Result<ConditionalExpressionNode, ParseError> {
        let mut left = self.parse_cond_not()?;
        while matches!(self.peek(), Token::Op(Op::AndAnd)) {
            self.pos += 1;
            let right = self.parse_cond_not()?;
            left = ConditionalExpressionNode::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_cond_not(&mut self) -> Result<ConditionalExpressionNode, ParseError> {
        if matches!(self.peek(), Token::Op(Op::Bang)) {
            self.pos += 1;
            let inner = self.parse_cond_not()?;
            return Ok(ConditionalExpressionNode::Not(Box::new(inner)));
        }
        self.parse_cond_primary()
    }

    fn parse_cond_primary(&mut self) -> Result<ConditionalExpressionNode, ParseError> {
        if matches!(self.peek(), Token::Op(Op::LParen)) {
            self.pos += 1;
            let inner = self.parse_cond_or()?;
            self.expect_op(Op::RParen)?;
            return Ok(ConditionalExpressionNode::Group(Box::new(inner)));
        }
        let first = match self.bump() {
            Token::Word(w) => w,
            other => return Err(ParseError::SyntaxError(format!("expected word in [[ ]], found {other:?}"))),
        };
        if let Some(op) = unary_test_op(&first) {
            let operand_raw = match self.bump() {
                Token::Word(w) => w,
                other => return Err(ParseError::SyntaxError(format!("expected operand, found {other:?}"))),
            };
            return Ok(ConditionalExpressionNode::Unary(CondUnaryNode {
                operator: op,
                operand: parse_word(&operand_raw)?,
            }));
        }
        // Peek for a binary operator word.
        if let Token::Word(op_word) = self.peek().clone() {
            if let Some(op) = binary_test_op(&op_word) {
                self.pos += 1;
                let right_raw = match self.bump() {
                    Token::Word(w) => w,
                    other => return Err(ParseError::SyntaxError(format!("expected right operand, found {other:?}"))),
                };
                return Ok(ConditionalExpressionNode::Binary(CondBinaryNode {
                    operator: op,
                    left: parse_word(&first)?,
                    right: parse_word(&right_raw)?,
                }));
            }
        }
        Ok(ConditionalExpressionNode::Word(parse_word(&first)?))
    }

    // ---- simple commands ---------------------------------------------

    fn parse_simple_command(&mut self) -> Result<SimpleCommandNode, ParseError> {
        let mut assignments = Vec::new();
        let mut redirections = Vec::new();
        let mut name: Option<WordNode> = None;
        let mut args = Vec::new();

        // Leading assignment words.
        while let Token::Word(w) = self.peek().clone() {
            if let Some((var, append, value_raw)) = split_assignment(&w) {
                self.pos += 1;
                let value = if value_raw.is_empty() { None } else { Some(parse_word(&value_raw)?) };
                assignments.push(AssignmentNode { name: var, value, append });
            } else {
                break;
            }
        }

        loop {
            match self.peek().clone() {
                Token::Redir { fd, op } => {
                    self.pos += 1;
                    redirections.push(self.parse_one_redirection(fd, op)?);
                }
                Token::Word(w) => {
                    self.pos += 1;
                    let word = parse_word(&w)?;
                    if name.is_none() {
                        name = Some(word);
                    } else {
                        args.push(word);
                    }
                }
                _ => break,
            }
        }

        Ok(SimpleCommandNode { assignments, name, args, redirections, line: None })
    }

    fn parse_redirections(&mut self) -> Result<Vec<RedirectionNode>, ParseError> {
        let mut redirs = Vec::new();
        while let Token::Redir { fd, op } = self.peek().clone() {
            self.pos += 1;
            redirs.push(self.parse_one_redirection(fd, op)?);
        }
        Ok(redirs)
    }

    fn parse_one_redirection(&mut self, fd: Option<i32>, op: RedirectionOperator) -> Result<RedirectionNode, ParseError> {
        if matches!(op, RedirectionOperator::DLess | RedirectionOperator::DLessDash) {
            // consume (and discard) the delimiter word token; the body came
            // from the heredoc pre-pass.
            match self.bump() {
                Token::Word(_) => {}
                other => return Err(ParseError::SyntaxError(format!("expected heredoc delimiter, found {other:?}"))),
            }
            let node = self.next_heredoc()?;
            return Ok(RedirectionNode { fd, operator: op, target: RedirectionTarget::HereDoc(node) });
        }
        let target_raw = match self.bump() {
            Token::Word(w) => w,
            other => return Err(ParseError::SyntaxError(format!("expected redirection target, found {other:?}"))),
        };
        Ok(RedirectionNode { fd, operator: op, target: RedirectionTarget::Word(parse_word(&target_raw)?) })
    }
}

fn unary_test_op(s: &str) -> Option<CondUnaryOperator> {
    if s == "-z" {
        return Some(CondUnaryOperator::StrEmpty);
    }
    if s == "-n" {
        return Some(CondUnaryOperator::StrNonEmpty);
    }
    if UNARY_TEST_OPS.contains(&s) {
        if let Some(op) = crate::interpreter::helpers::file_tests::FileTestOperator::from_str(s) {
            return Some(CondUnaryOperator::FileTest(op));
        }
    }
    None
}

fn binary_test_op(s: &str) -> Option<CondBinaryOperator> {
    if !BINARY_TEST_OPS.contains(&s) {
        return None;
    }
    Some(match s {
        "=" | "==" => CondBinaryOperator::Eq,
        "!=" => CondBinaryOperator::Ne,
        "<" => CondBinaryOperator::Lt,
        ">" => CondBinaryOperator::Gt,
        "-eq" => CondBinaryOperator::NumEq,
        "-ne" => CondBinaryOperator::NumNe,
        "-lt" => CondBinaryOperator::NumLt,
        "-le" => CondBinaryOperator::NumLe,
        "-gt" => CondBinaryOperator::NumGt,
        "-ge" => CondBinaryOperator::NumGe,
        "-nt" => CondBinaryOperator::Nt,
        "-ot" => CondBinaryOperator::Ot,
        "-ef" => CondBinaryOperator::Ef,
        _ => unreachable!(),
    })
}

fn is_plain_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Recognizes `NAME=value` / `NAME+=value` at the top level of a raw word
/// (i.e. before any quoting has started), per spec §4.D assignment-prefix
/// rule. Returns `(name, append, raw_value)`.
fn split_assignment(raw: &str) -> Option<(String, bool, String)> {
    let chars: Vec<char> = raw.chars().collect();
    let mut i = 0;
    match chars.first() {
        Some(c) if c.is_alphabetic() || *c == '_' => {}
        _ => return None,
    }
    while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
        i += 1;
    }
    if i == 0 {
        return None;
    }
    let name: String = chars[..i].iter().collect();
    if chars.get(i) == Some(&'+') && chars.get(i + 1) == Some(&'=') {
        let value: String = chars[i + 2..].iter().collect();
        return Some((name, true, value));
    }
    if chars.get(i) == Some(&'=') {
        let value: String = chars[i + 1..].iter().collect();
        return Some((name, false, value));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_command() {
        let script = parse_script("echo hello world").unwrap();
        assert_eq!(script.statements.len(), 1);
    }

    #[test]
    fn chain_with_shortcircuit() {
        let script = parse_script("false && echo A || echo B").unwrap();
        let stmt = &script.statements[0];
        assert_eq!(stmt.pipelines.len(), 3);
        assert_eq!(stmt.operators, vec![StatementOperator::And, StatementOperator::Or]);
    }

    #[test]
    fn if_statement() {
        let script = parse_script("if true; then echo yes; fi").unwrap();
        match &script.statements[0].pipelines[0].commands[0] {
            CommandNode::Compound(CompoundCommandNode::If(_)) => {}
            other => panic!("expected if, got {other:?}"),
        }
    }

    #[test]
    fn heredoc_extraction() {
        let script = parse_script("cat <<EOF\nhello\nEOF\n").unwrap();
        let cmd = &script.statements[0].pipelines[0].commands[0];
        match cmd {
            CommandNode::Simple(s) => {
                let r = &s.redirections[0];
                match &r.target {
                    RedirectionTarget::HereDoc(h) => assert_eq!(h.content, "hello\n"),
                    _ => panic!("expected heredoc"),
                }
            }
            other => panic!("expected simple command, got {other:?}"),
        }
    }
}
