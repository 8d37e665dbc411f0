//! Mutation tracking pre-pass
//!
//! Before rules run, every file in a unit is scanned for writes: plain and
//! compound assignments, `++`/`--`, and address-taking with `&`. The
//! result is a set of declaration sites whose bindings are ever mutated.
//! Mutation-sensitive rules consult this set instead of re-walking the
//! tree.
//!
//! Resolution is purely lexical. A name that cannot be resolved (a
//! package-level name from another unit, a builtin) is ignored. If the
//! pass did not run at all, `is_mutated` answers `true` for everything so
//! dependent rules degrade to silence rather than false positives.

use gosift_parser::{Block, Decl, Expr, File, FuncDecl, Stmt, UnaryOp};
use rustc_hash::{FxHashMap, FxHashSet};

/// Declaration site of a binding: file index within the unit plus the
/// byte offset of the declared name.
pub type BindingId = (u32, u32);

#[derive(Debug, Default)]
pub struct MutatedBindings {
    analyzed: bool,
    set: FxHashSet<BindingId>,
}

impl MutatedBindings {
    /// A placeholder for units where the pass was skipped
    pub fn unanalyzed() -> Self {
        Self {
            analyzed: false,
            set: FxHashSet::default(),
        }
    }

    /// Run the pass over every parsed file of one unit
    pub fn analyze(files: &[(u32, &File<'_>)]) -> Self {
        let mut tracker = Tracker::new();

        // Package scope spans all files of the unit
        for (file_idx, file) in files {
            for decl in &file.decls {
                if let Decl::Value { specs, .. } = decl {
                    for spec in specs {
                        for name in &spec.names {
                            tracker.declare(name.name, (*file_idx, name.span.start));
                        }
                    }
                }
            }
        }

        for (file_idx, file) in files {
            tracker.file_idx = *file_idx;
            for decl in &file.decls {
                if let Decl::Func(func) = decl {
                    tracker.walk_func(func);
                }
            }
        }

        Self {
            analyzed: true,
            set: tracker.set,
        }
    }

    pub fn is_mutated(&self, binding: BindingId) -> bool {
        !self.analyzed || self.set.contains(&binding)
    }
}

struct Tracker<'a> {
    file_idx: u32,
    scopes: Vec<FxHashMap<&'a str, BindingId>>,
    set: FxHashSet<BindingId>,
}

impl<'a> Tracker<'a> {
    fn new() -> Self {
        Self {
            file_idx: 0,
            scopes: vec![FxHashMap::default()],
            set: FxHashSet::default(),
        }
    }

    fn declare(&mut self, name: &'a str, binding: BindingId) {
        if name == "_" {
            return;
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, binding);
        }
    }

    fn resolve(&self, name: &str) -> Option<BindingId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }

    fn mark(&mut self, name: &str) {
        if let Some(binding) = self.resolve(name) {
            self.set.insert(binding);
        }
    }

    /// Mark the root identifier of an assignment target: `x`, `x.f`,
    /// `x[i]`, `*x`, `(x)` all write through `x`.
    fn mark_target(&mut self, expr: &Expr<'a>) {
        match expr {
            Expr::Ident(id) => self.mark(id.name),
            Expr::Selector { recv, .. }
            | Expr::Index { recv, .. }
            | Expr::Slice { recv, .. } => self.mark_target(recv),
            Expr::Paren { inner, .. } => self.mark_target(inner),
            Expr::Unary {
                op: UnaryOp::Deref,
                operand,
                ..
            } => self.mark_target(operand),
            _ => {}
        }
    }

    fn walk_func(&mut self, func: &'a FuncDecl<'a>) {
        let Some(body) = &func.body else { return };

        self.scopes.push(FxHashMap::default());
        if let Some(recv) = &func.recv {
            for name in &recv.names {
                self.declare(name.name, (self.file_idx, name.span.start));
            }
        }
        for param in &func.params {
            for name in &param.names {
                self.declare(name.name, (self.file_idx, name.span.start));
            }
        }
        self.walk_block(body);
        self.scopes.pop();
    }

    fn walk_block(&mut self, block: &'a Block<'a>) {
        self.scopes.push(FxHashMap::default());
        for stmt in &block.stmts {
            self.walk_stmt(stmt);
        }
        self.scopes.pop();
    }

    fn walk_stmt(&mut self, stmt: &'a Stmt<'a>) {
        match stmt {
            Stmt::Decl(Decl::Value { specs, .. }) => {
                for spec in specs {
                    for value in &spec.values {
                        self.walk_expr(value);
                    }
                    for name in &spec.names {
                        self.declare(name.name, (self.file_idx, name.span.start));
                    }
                }
            }
            Stmt::Decl(_) => {}
            Stmt::Assign { lhs, op, rhs, .. } => {
                for value in rhs {
                    self.walk_expr(value);
                }
                if op.mutates() {
                    for target in lhs {
                        self.mark_target(target);
                        self.walk_expr(target);
                    }
                } else {
                    // `:=` declares; re-declared names shadow
                    for target in lhs {
                        if let Some(id) = target.as_ident() {
                            let binding = (self.file_idx, id.span.start);
                            self.declare_resolved(id.name, binding);
                        }
                    }
                }
            }
            Stmt::IncDec { expr, .. } => {
                self.mark_target(expr);
                self.walk_expr(expr);
            }
            Stmt::If {
                init,
                cond,
                then,
                els,
                ..
            } => {
                self.scopes.push(FxHashMap::default());
                if let Some(init) = init {
                    self.walk_stmt(init);
                }
                self.walk_expr(cond);
                self.walk_block(then);
                if let Some(els) = els {
                    self.walk_stmt(els);
                }
                self.scopes.pop();
            }
            Stmt::For {
                init,
                cond,
                post,
                body,
                ..
            } => {
                self.scopes.push(FxHashMap::default());
                if let Some(init) = init {
                    self.walk_stmt(init);
                }
                if let Some(cond) = cond {
                    self.walk_expr(cond);
                }
                if let Some(post) = post {
                    self.walk_stmt(post);
                }
                self.walk_block(body);
                self.scopes.pop();
            }
            Stmt::Range {
                key,
                value,
                define,
                subject,
                body,
                ..
            } => {
                self.scopes.push(FxHashMap::default());
                self.walk_expr(subject);
                for target in [key, value].into_iter().flatten() {
                    if *define {
                        if let Some(id) = target.as_ident() {
                            self.declare(id.name, (self.file_idx, id.span.start));
                        }
                    } else {
                        self.mark_target(target);
                    }
                }
                self.walk_block(body);
                self.scopes.pop();
            }
            Stmt::Switch {
                init, tag, cases, ..
            } => {
                self.scopes.push(FxHashMap::default());
                if let Some(init) = init {
                    self.walk_stmt(init);
                }
                if let Some(tag) = tag {
                    self.walk_expr(tag);
                }
                for case in cases {
                    for value in &case.values {
                        self.walk_expr(value);
                    }
                    self.scopes.push(FxHashMap::default());
                    for stmt in &case.body {
                        self.walk_stmt(stmt);
                    }
                    self.scopes.pop();
                }
                self.scopes.pop();
            }
            Stmt::Select { cases, .. } => {
                for case in cases {
                    self.scopes.push(FxHashMap::default());
                    if let Some(comm) = &case.comm {
                        self.walk_stmt(comm);
                    }
                    for stmt in &case.body {
                        self.walk_stmt(stmt);
                    }
                    self.scopes.pop();
                }
            }
            Stmt::Return { results, .. } => {
                for value in results {
                    self.walk_expr(value);
                }
            }
            Stmt::Defer { call, .. } | Stmt::Go { call, .. } => self.walk_expr(call),
            Stmt::Send { chan, value, .. } => {
                self.walk_expr(chan);
                self.walk_expr(value);
            }
            Stmt::Block(block) => self.walk_block(block),
            Stmt::Expr { expr, .. } => self.walk_expr(expr),
            Stmt::Branch { .. } | Stmt::Empty { .. } => {}
        }
    }

    /// `:=` with a mix of new and existing names assigns to the existing
    /// ones. A lexical pass cannot tell the cases apart without the full
    /// scope snapshot at the statement, so an already-visible name is
    /// treated as re-declaration only when declared in the current scope.
    fn declare_resolved(&mut self, name: &'a str, binding: BindingId) {
        let in_current = self
            .scopes
            .last()
            .map(|s| s.contains_key(name))
            .unwrap_or(false);
        if in_current {
            if let Some(existing) = self.resolve(name) {
                self.set.insert(existing);
            }
        }
        self.declare(name, binding);
    }

    fn walk_expr(&mut self, expr: &'a Expr<'a>) {
        match expr {
            Expr::Unary {
                op: UnaryOp::Amp,
                operand,
                ..
            } => {
                // Taking an address makes every later write possible
                self.mark_target(operand);
                self.walk_expr(operand);
            }
            Expr::Unary { operand, .. } => self.walk_expr(operand),
            Expr::Binary { left, right, .. } => {
                self.walk_expr(left);
                self.walk_expr(right);
            }
            Expr::Call { fun, args, .. } => {
                self.walk_expr(fun);
                for arg in args {
                    self.walk_expr(arg);
                }
            }
            Expr::Selector { recv, .. } | Expr::TypeAssert { recv, .. } => self.walk_expr(recv),
            Expr::Index { recv, index, .. } => {
                self.walk_expr(recv);
                self.walk_expr(index);
            }
            Expr::Slice {
                recv,
                low,
                high,
                max,
                ..
            } => {
                self.walk_expr(recv);
                for part in [low, high, max].into_iter().flatten() {
                    self.walk_expr(part);
                }
            }
            Expr::Paren { inner, .. } => self.walk_expr(inner),
            Expr::FuncLit { params, body, .. } => {
                self.scopes.push(FxHashMap::default());
                for param in params {
                    for name in &param.names {
                        self.declare(name.name, (self.file_idx, name.span.start));
                    }
                }
                self.walk_block(body);
                self.scopes.pop();
            }
            Expr::Composite { idents, .. } => {
                // Contents are opaque; any name inside may be written
                // through an address-of or a nested function literal, so
                // every one counts as mutated.
                for id in idents {
                    self.mark(id.name);
                }
            }
            Expr::Ident(_) | Expr::BasicLit { .. } => {}
        }
    }
}
