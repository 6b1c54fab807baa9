//! Script Interpreter (spec §4.F/§4.G): walks the typed AST, owns the
//! Variable Store, function table, alias table, trap table and job table,
//! and implements [`ExpansionContext`] so the expansion pipeline can run
//! command substitutions without depending on this module directly.

pub mod alias;
pub mod conditionals;
pub mod functions;
pub mod helpers;

use crate::ast::{
    CaseTerminator, CommandNode, CompoundCommandNode, PipelineNode, ScriptNode, SimpleCommandNode,
    StatementNode, StatementOperator,
};
use crate::errors::ShellError;
use crate::exec::jobs::JobTable;
use crate::exec::process::{self, SpawnSpec};
use crate::exec::traps::{TrapAction, TrapKey, TrapTable};
use crate::expand::arithmetic::eval_arith;
use crate::expand::word::{expand_word_single, expand_word_splitting};
use crate::expand::ExpansionContext;
use crate::flow::{Flow, LoopAction};
use crate::vars::VarStore;
use alias::AliasTable;
use functions::FunctionTable;

pub struct Interpreter {
    pub vars: VarStore,
    pub functions: FunctionTable,
    pub aliases: AliasTable,
    pub traps: TrapTable,
    pub jobs: JobTable,
    pub function_depth: u32,
    pub subshell_depth: u32,
}

impl ExpansionContext for Interpreter {
    fn vars(&mut self) -> &mut VarStore {
        &mut self.vars
    }

    fn run_capture(&mut self, script: &ScriptNode) -> Result<(String, i32), ShellError> {
        self.capture_script(script)
    }
}

impl Interpreter {
    pub fn new(argv0: String, args: Vec<String>) -> Self {
        let mut vars = VarStore::new(argv0, args);
        vars.import_environment();
        if vars.get("IFS").is_none() {
            let _ = vars.set("IFS", " \t\n");
        }
        Interpreter {
            vars,
            functions: FunctionTable::new(),
            aliases: AliasTable::new(),
            traps: TrapTable::new(),
            jobs: JobTable::new(),
            function_depth: 0,
            subshell_depth: 0,
        }
    }

    /// Top-level driver: runs a whole script, runs the `EXIT` trap, and
    /// returns the shell's final exit status.
    pub fn run_top_level(&mut self, script: &ScriptNode) -> i32 {
        let flow = self.run_script(script).unwrap_or_else(|e| {
            eprintln!("hash: {e}");
            self.vars.last_status = e.exit_code();
            Flow::Normal
        });
        let code = match flow {
            Flow::Exit(n) => n,
            Flow::Return(n) => n,
            _ => self.vars.last_status,
        };
        self.run_exit_trap();
        code
    }

    fn run_exit_trap(&mut self) {
        if let Some(cmd) = self.traps.command_for(TrapKey::Exit).map(|s| s.to_string()) {
            self.traps.set(TrapKey::Exit, TrapAction::Default);
            if let Ok(script) = crate::parser::parse_script(&cmd) {
                let _ = self.run_script(&script);
            }
        }
    }

    pub fn run_script(&mut self, script: &ScriptNode) -> Result<Flow, ShellError> {
        self.run_statements(&script.statements)
    }

    /// Runs a statement list, exiting under `set -e` as each statement
    /// completes (spec §4.G). Used everywhere except inside an `if`/`while`/
    /// `until` condition, where -e is suppressed entirely.
    fn run_statements(&mut self, statements: &[StatementNode]) -> Result<Flow, ShellError> {
        self.run_statement_list(statements, false)
    }

    /// Runs a statement list as an `if`/`while`/`until` condition: -e never
    /// fires here regardless of the condition's exit status (spec §4.G).
    fn run_condition(&mut self, statements: &[StatementNode]) -> Result<Flow, ShellError> {
        self.run_statement_list(statements, true)
    }

    fn run_statement_list(&mut self, statements: &[StatementNode], suppress_errexit: bool) -> Result<Flow, ShellError> {
        let mut flow = Flow::Normal;
        for statement in statements {
            let eligible;
            (flow, eligible) = self.run_statement(statement)?;
            if !flow.is_normal() {
                return Ok(flow);
            }
            if !suppress_errexit && eligible && self.vars.options.errexit && self.vars.last_status != 0 {
                return Ok(Flow::Exit(self.vars.last_status));
            }
        }
        Ok(flow)
    }

    /// Runs one `;`-separated statement (an AND-OR pipeline chain). Returns
    /// whether the *last* pipeline in the chain was the one actually
    /// executed: per spec §4.G, `-e` only ever applies to the last command
    /// of an AND-OR list, so `false && echo A` must not trip `-e` on
    /// `false`'s status even though it is what `$?` ends up holding.
    fn run_statement(&mut self, statement: &StatementNode) -> Result<(Flow, bool), ShellError> {
        if statement.background {
            self.run_background(statement)?;
            self.vars.last_status = 0;
            return Ok((Flow::Normal, false));
        }

        let mut iter = statement.pipelines.iter().enumerate();
        let (first_idx, first) = match iter.next() {
            Some(p) => p,
            None => return Ok((Flow::Normal, false)),
        };
        let mut flow = self.run_pipeline(first)?;
        let mut status = self.vars.last_status;
        let mut last_run_idx = first_idx;

        for (op, (idx, pipeline)) in statement.operators.iter().zip(iter) {
            let should_run = match op {
                StatementOperator::And => status == 0,
                StatementOperator::Or => status != 0,
            };
            if !should_run {
                continue;
            }
            flow = self.run_pipeline(pipeline)?;
            status = self.vars.last_status;
            last_run_idx = idx;
            if !flow.is_normal() {
                break;
            }
        }
        let last_is_eligible = last_run_idx + 1 == statement.pipelines.len();
        Ok((flow, last_is_eligible))
    }

    fn run_background(&mut self, statement: &StatementNode) -> Result<(), ShellError> {
        // Background jobs run in their own process group; this core forks
        // once per statement and lets the child run the whole chain, which
        // keeps the job table's bookkeeping to one pid per `&`.
        let pid = unsafe { libc::fork() };
        if pid < 0 {
            return Err(ShellError::Other("fork failed".to_string()));
        }
        if pid == 0 {
            unsafe {
                libc::setpgid(0, 0);
                libc::signal(libc::SIGINT, libc::SIG_IGN);
                libc::signal(libc::SIGQUIT, libc::SIG_IGN);
            }
            redirect_stdin_from_null();
            self.traps = self.traps.reset_for_subshell();
            let mut flow = Flow::Normal;
            for (i, pipeline) in statement.pipelines.iter().enumerate() {
                if i > 0 {
                    let should_run = match statement.operators.get(i - 1) {
                        Some(StatementOperator::And) => self.vars.last_status == 0,
                        Some(StatementOperator::Or) => self.vars.last_status != 0,
                        None => true,
                    };
                    if !should_run {
                        continue;
                    }
                }
                flow = self.run_pipeline(pipeline).unwrap_or(Flow::Normal);
                if !flow.is_normal() {
                    break;
                }
            }
            let code = match flow {
                Flow::Exit(n) | Flow::Return(n) => n,
                _ => self.vars.last_status,
            };
            unsafe { libc::_exit(code) };
        }
        self.jobs.add(pid, vec![pid], describe_statement(statement));
        self.vars.last_bg_pid = Some(pid);
        Ok(())
    }

    fn run_pipeline(&mut self, pipeline: &PipelineNode) -> Result<Flow, ShellError> {
        let flow = if pipeline.commands.len() == 1 {
            self.run_command(&pipeline.commands[0])?
        } else {
            let status = self.run_piped(&pipeline.commands)?;
            self.vars.last_status = status;
            Flow::Normal
        };
        if pipeline.negated {
            self.vars.last_status = i32::from(self.vars.last_status == 0);
        }
        Ok(flow)
    }

    /// Forks every stage of a multi-command pipeline, wiring each one's
    /// stdin/stdout to its pipe segment; waits for all and reports the last
    /// stage's status (spec §5 ordering guarantee).
    fn run_piped(&mut self, commands: &[CommandNode]) -> Result<i32, ShellError> {
        let mut pids = Vec::new();
        let mut prev_read: Option<libc::c_int> = None;

        for (i, cmd) in commands.iter().enumerate() {
            let is_last = i + 1 == commands.len();
            let mut next_read = None;
            let mut write_fd = None;
            if !is_last {
                let mut fds = [0 as libc::c_int; 2];
                if unsafe { libc::pipe(fds.as_mut_ptr()) } < 0 {
                    return Err(ShellError::Other("pipe failed".to_string()));
                }
                next_read = Some(fds[0]);
                write_fd = Some(fds[1]);
            }

            let pid = unsafe { libc::fork() };
            if pid < 0 {
                return Err(ShellError::Other("fork failed".to_string()));
            }
            if pid == 0 {
                if let Some(fd) = prev_read {
                    unsafe { libc::dup2(fd, 0) };
                }
                if let Some(fd) = write_fd {
                    unsafe { libc::dup2(fd, 1) };
                }
                close_if(prev_read);
                close_if(next_read);
                close_if(write_fd);
                let code = self.run_command_to_exit_code(cmd);
                unsafe { libc::_exit(code) };
            }
            close_if(prev_read);
            close_if(write_fd);
            prev_read = next_read;
            pids.push(pid);
        }

        let mut last_status = 0;
        for pid in pids {
            last_status = process::wait_for(pid)?;
        }
        Ok(last_status)
    }

    /// Runs a single command to completion in the *current* process and
    /// returns its Flow, setting `vars.last_status` along the way.
    fn run_command(&mut self, cmd: &CommandNode) -> Result<Flow, ShellError> {
        if self.vars.options.noexec {
            self.vars.last_status = 0;
            return Ok(Flow::Normal);
        }
        match cmd {
            CommandNode::FunctionDef(def) => {
                self.functions.define(&def.name, (*def.body).clone());
                self.vars.last_status = 0;
                Ok(Flow::Normal)
            }
            CommandNode::Compound(cc) => self.run_compound(cc, &[]),
            CommandNode::Simple(sc) => self.run_simple(sc),
        }
    }

    /// Used inside a forked pipeline stage, where Flow cannot escape the
    /// process: Exit/Return become the process's exit code, Break/Continue
    /// (no enclosing loop in a bare subprocess) are harmless.
    fn run_command_to_exit_code(&mut self, cmd: &CommandNode) -> i32 {
        match self.run_command(cmd) {
            Ok(Flow::Exit(n)) | Ok(Flow::Return(n)) => n,
            Ok(_) => self.vars.last_status,
            Err(e) => {
                eprintln!("hash: {e}");
                e.exit_code()
            }
        }
    }

    fn run_compound(&mut self, cc: &CompoundCommandNode, extra_redirs: &[crate::ast::RedirectionNode]) -> Result<Flow, ShellError> {
        match cc {
            CompoundCommandNode::If(n) => {
                let redirs = merge_redirs(&n.redirections, extra_redirs);
                let _guard = crate::redirect::RedirGuard::apply(&redirs, self)?;
                for clause in &n.clauses {
                    let cond_flow = self.run_condition(&clause.condition)?;
                    if !cond_flow.is_normal() {
                        return Ok(cond_flow);
                    }
                    if self.vars.last_status == 0 {
                        return self.run_statements(&clause.body);
                    }
                }
                if let Some(else_body) = &n.else_body {
                    return self.run_statements(else_body);
                }
                self.vars.last_status = 0;
                Ok(Flow::Normal)
            }
            CompoundCommandNode::For(n) => {
                let redirs = merge_redirs(&n.redirections, extra_redirs);
                let _guard = crate::redirect::RedirGuard::apply(&redirs, self)?;
                let words = match &n.words {
                    Some(words) => {
                        let mut items = Vec::new();
                        for w in words {
                            items.extend(expand_word_splitting(w, self)?);
                        }
                        items
                    }
                    None => self.vars.positional[1..].to_vec(),
                };
                self.vars.last_status = 0;
                for item in words {
                    let _ = self.vars.set(&n.variable, item);
                    let flow = self.run_statements(&n.body)?;
                    match flow.consume_loop_level() {
                        (_, LoopAction::Break) => break,
                        (_, LoopAction::Continue) => continue,
                        (Some(propagate), LoopAction::Propagate) => return Ok(propagate),
                        (None, LoopAction::Propagate) => unreachable!(),
                    }
                }
                Ok(Flow::Normal)
            }
            CompoundCommandNode::CStyleFor(n) => {
                let redirs = merge_redirs(&n.redirections, extra_redirs);
                let _guard = crate::redirect::RedirGuard::apply(&redirs, self)?;
                if let Some(init) = &n.init {
                    eval_arith(&init.expression, self)?;
                }
                self.vars.last_status = 0;
                loop {
                    if let Some(cond) = &n.condition {
                        if eval_arith(&cond.expression, self)? == 0 {
                            break;
                        }
                    }
                    let flow = self.run_statements(&n.body)?;
                    let stop = match flow.consume_loop_level() {
                        (_, LoopAction::Break) => true,
                        (_, LoopAction::Continue) => false,
                        (Some(propagate), LoopAction::Propagate) => return Ok(propagate),
                        (None, LoopAction::Propagate) => unreachable!(),
                    };
                    if stop {
                        break;
                    }
                    if let Some(update) = &n.update {
                        eval_arith(&update.expression, self)?;
                    }
                }
                Ok(Flow::Normal)
            }
            CompoundCommandNode::While(n) => self.run_while_until(n.condition.clone(), n.body.clone(), &n.redirections, extra_redirs, true),
            CompoundCommandNode::Until(n) => self.run_while_until(n.condition.clone(), n.body.clone(), &n.redirections, extra_redirs, false),
            CompoundCommandNode::Case(n) => {
                let redirs = merge_redirs(&n.redirections, extra_redirs);
                let _guard = crate::redirect::RedirGuard::apply(&redirs, self)?;
                let subject = expand_word_single(&n.word, self)?;
                self.vars.last_status = 0;
                let mut fallthrough = false;
                for item in &n.items {
                    if !fallthrough {
                        let matched = item
                            .patterns
                            .iter()
                            .map(|p| expand_word_single(p, self))
                            .collect::<Result<Vec<_>, _>>()?
                            .iter()
                            .any(|p| crate::expand::pattern::matches_whole(p, &subject));
                        if !matched {
                            continue;
                        }
                    }
                    let flow = self.run_statements(&item.body)?;
                    if !flow.is_normal() {
                        return Ok(flow);
                    }
                    match item.terminator {
                        CaseTerminator::DoubleSemi => return Ok(Flow::Normal),
                        CaseTerminator::SemiAnd => {
                            fallthrough = true;
                            continue;
                        }
                        CaseTerminator::SemiSemiAnd => {
                            fallthrough = false;
                            continue;
                        }
                    }
                }
                Ok(Flow::Normal)
            }
            CompoundCommandNode::Subshell(n) => {
                let redirs = merge_redirs(&n.redirections, extra_redirs);
                let status = self.run_in_subshell(&n.body, &redirs)?;
                self.vars.last_status = status;
                Ok(Flow::Normal)
            }
            CompoundCommandNode::Group(n) => {
                let redirs = merge_redirs(&n.redirections, extra_redirs);
                let _guard = crate::redirect::RedirGuard::apply(&redirs, self)?;
                self.run_statements(&n.body)
            }
            CompoundCommandNode::ArithmeticCommand(n) => {
                let redirs = merge_redirs(&n.redirections, extra_redirs);
                let _guard = crate::redirect::RedirGuard::apply(&redirs, self)?;
                let value = eval_arith(&n.expression.expression, self).unwrap_or(0);
                self.vars.last_status = i32::from(value == 0);
                Ok(Flow::Normal)
            }
            CompoundCommandNode::ConditionalCommand(n) => {
                let redirs = merge_redirs(&n.redirections, extra_redirs);
                let _guard = crate::redirect::RedirGuard::apply(&redirs, self)?;
                let truthy = conditionals::evaluate(&n.expression, self)?;
                self.vars.last_status = i32::from(!truthy);
                Ok(Flow::Normal)
            }
        }
    }

    fn run_while_until(
        &mut self,
        condition: Vec<StatementNode>,
        body: Vec<StatementNode>,
        redirs: &[crate::ast::RedirectionNode],
        extra_redirs: &[crate::ast::RedirectionNode],
        while_true: bool,
    ) -> Result<Flow, ShellError> {
        let redirs = merge_redirs(redirs, extra_redirs);
        let _guard = crate::redirect::RedirGuard::apply(&redirs, self)?;
        self.vars.last_status = 0;
        loop {
            let cond_flow = self.run_condition(&condition)?;
            if !cond_flow.is_normal() {
                return Ok(cond_flow);
            }
            let continue_loop = if while_true { self.vars.last_status == 0 } else { self.vars.last_status != 0 };
            if !continue_loop {
                break;
            }
            let flow = self.run_statements(&body)?;
            match flow.consume_loop_level() {
                (_, LoopAction::Break) => break,
                (_, LoopAction::Continue) => continue,
                (Some(propagate), LoopAction::Propagate) => return Ok(propagate),
                (None, LoopAction::Propagate) => unreachable!(),
            }
        }
        Ok(Flow::Normal)
    }

    fn run_simple(&mut self, sc: &SimpleCommandNode) -> Result<Flow, ShellError> {
        for assignment in &sc.assignments {
            let value = match &assignment.value {
                Some(w) => expand_word_single(w, self)?,
                None => String::new(),
            };
            if assignment.append {
                self.vars.append(&assignment.name, value)?;
            } else {
                self.vars.set(&assignment.name, value)?;
            }
        }

        let name_word = match &sc.name {
            Some(n) => n,
            None => {
                self.vars.last_status = 0;
                return Ok(Flow::Normal);
            }
        };

        let mut argv = expand_word_splitting(name_word, self)?;
        for arg in &sc.args {
            argv.extend(expand_word_splitting(arg, self)?);
        }
        if argv.is_empty() {
            self.vars.last_status = 0;
            return Ok(Flow::Normal);
        }

        let mut seen = std::collections::HashSet::new();
        let first = argv.remove(0);
        let expanded = alias::expand_chain(&self.aliases, &first, &argv, &mut seen);
        let name = expanded[0].clone();
        let args = expanded[1..].to_vec();

        if self.vars.options.xtrace {
            let ps4 = self.vars.get("PS4").unwrap_or_else(|| "+ ".to_string());
            let mut line = args.iter().fold(name.clone(), |mut acc, a| {
                acc.push(' ');
                acc.push_str(a);
                acc
            });
            if !sc.assignments.is_empty() {
                line = format!(
                    "{} {line}",
                    sc.assignments.iter().map(|a| a.name.clone()).collect::<Vec<_>>().join(" ")
                );
            }
            eprintln!("{ps4}{line}");
        }

        if let Some(body) = self.functions.get(&name).cloned() {
            return self.call_function(&body, &args, &sc.redirections);
        }

        if let Some(kind) = crate::builtins::classify(&name) {
            return self.run_builtin(kind, &name, &args, &sc.redirections);
        }

        let mut full_argv = vec![name];
        full_argv.extend(args);
        let spec = SpawnSpec { argv: full_argv, redirections: &sc.redirections, env: Vec::new() };
        let status = process::spawn_and_wait(&spec, None, None, self)?;
        self.vars.last_status = status;
        Ok(Flow::Normal)
    }

    fn run_builtin(
        &mut self,
        kind: crate::builtins::BuiltinClass,
        name: &str,
        args: &[String],
        redirs: &[crate::ast::RedirectionNode],
    ) -> Result<Flow, ShellError> {
        use crate::builtins::BuiltinClass;
        match kind {
            BuiltinClass::Special => {
                let _guard = crate::redirect::RedirGuard::apply(redirs, self)?;
                let outcome = crate::builtins::run(name, args, self)?;
                self.vars.last_status = outcome.status;
                Ok(outcome.flow)
            }
            BuiltinClass::Regular => {
                if !redirs.is_empty() {
                    let pid = self.fork_for_builtin(name, args, redirs);
                    let status = process::wait_for(pid)?;
                    self.vars.last_status = status;
                    Ok(Flow::Normal)
                } else {
                    let outcome = crate::builtins::run(name, args, self)?;
                    self.vars.last_status = outcome.status;
                    Ok(Flow::Normal)
                }
            }
        }
    }

    fn fork_for_builtin(&mut self, name: &str, args: &[String], redirs: &[crate::ast::RedirectionNode]) -> libc::pid_t {
        let pid = unsafe { libc::fork() };
        if pid == 0 {
            if let Err(e) = crate::redirect::apply_for_exec(redirs, self) {
                eprintln!("hash: {e}");
                unsafe { libc::_exit(1) };
            }
            let status = crate::builtins::run(name, args, self).map(|o| o.status).unwrap_or(1);
            unsafe { libc::_exit(status) };
        }
        pid
    }

    pub fn call_function(&mut self, body: &CompoundCommandNode, args: &[String], redirs: &[crate::ast::RedirectionNode]) -> Result<Flow, ShellError> {
        let saved_positional = self.vars.positional.clone();
        self.vars.positional = std::iter::once(saved_positional[0].clone()).chain(args.iter().cloned()).collect();
        self.function_depth += 1;
        let result = self.run_compound(body, redirs);
        self.function_depth -= 1;
        self.vars.positional = saved_positional;
        match result? {
            Flow::Return(n) => {
                self.vars.last_status = n;
                Ok(Flow::Normal)
            }
            other => Ok(other),
        }
    }

    /// Runs `body` in a forked child process to completion and waits for it,
    /// returning its exit status. Memory isolation comes from `fork(2)`
    /// itself, so subshell variable/function-table changes never leak back.
    fn run_in_subshell(&mut self, body: &[StatementNode], redirs: &[crate::ast::RedirectionNode]) -> Result<i32, ShellError> {
        let pid = unsafe { libc::fork() };
        if pid < 0 {
            return Err(ShellError::Other("fork failed".to_string()));
        }
        if pid == 0 {
            self.subshell_depth += 1;
            self.traps = self.traps.reset_for_subshell();
            if let Err(e) = crate::redirect::apply_for_exec(redirs, self) {
                eprintln!("hash: {e}");
                unsafe { libc::_exit(1) };
            }
            let flow = self.run_statements(body).unwrap_or_else(|e| {
                eprintln!("hash: {e}");
                self.vars.last_status = e.exit_code();
                Flow::Normal
            });
            let code = match flow {
                Flow::Exit(n) | Flow::Return(n) => n,
                _ => self.vars.last_status,
            };
            self.run_exit_trap();
            unsafe { libc::_exit(code) };
        }
        process::wait_for(pid)
    }

    fn capture_script(&mut self, script: &ScriptNode) -> Result<(String, i32), ShellError> {
        let mut fds = [0 as libc::c_int; 2];
        if unsafe { libc::pipe(fds.as_mut_ptr()) } < 0 {
            return Err(ShellError::Other("pipe failed".to_string()));
        }
        let (read_fd, write_fd) = (fds[0], fds[1]);

        let pid = unsafe { libc::fork() };
        if pid < 0 {
            return Err(ShellError::Other("fork failed".to_string()));
        }
        if pid == 0 {
            unsafe { libc::close(read_fd) };
            unsafe { libc::dup2(write_fd, 1) };
            unsafe { libc::close(write_fd) };
            self.subshell_depth += 1;
            let flow = self.run_script(script).unwrap_or_else(|e| {
                eprintln!("hash: {e}");
                self.vars.last_status = e.exit_code();
                Flow::Normal
            });
            let code = match flow {
                Flow::Exit(n) | Flow::Return(n) => n,
                _ => self.vars.last_status,
            };
            unsafe { libc::_exit(code) };
        }

        unsafe { libc::close(write_fd) };
        let mut output = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = unsafe { libc::read(read_fd, buf.as_mut_ptr() as *mut libc::c_void, buf.len()) };
            if n <= 0 {
                break;
            }
            output.extend_from_slice(&buf[..n as usize]);
        }
        unsafe { libc::close(read_fd) };
        let status = process::wait_for(pid)?;
        Ok((String::from_utf8_lossy(&output).into_owned(), status))
    }
}

fn merge_redirs(base: &[crate::ast::RedirectionNode], extra: &[crate::ast::RedirectionNode]) -> Vec<crate::ast::RedirectionNode> {
    let mut v = base.to_vec();
    v.extend(extra.iter().cloned());
    v
}

fn close_if(fd: Option<libc::c_int>) {
    if let Some(fd) = fd {
        unsafe {
            libc::close(fd);
        }
    }
}

fn redirect_stdin_from_null() {
    unsafe {
        let fd = libc::open(b"/dev/null\0".as_ptr() as *const libc::c_char, libc::O_RDONLY);
        if fd >= 0 {
            libc::dup2(fd, 0);
            libc::close(fd);
        }
    }
}

fn describe_statement(statement: &StatementNode) -> String {
    format!("{} pipeline(s)", statement.pipelines.len())
}
