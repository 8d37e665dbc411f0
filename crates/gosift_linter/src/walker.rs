//! Pre-order AST traversal feeding the dispatcher
//!
//! The visitor returns `false` to abort the walk; the checker uses that
//! to stop descending once the issue budget is gone. The abort check
//! happens before every node, so no rule runs after the budget trips.

use gosift_parser::{Block, Decl, Expr, File, FuncDecl, Stmt};

use crate::rule::Node;

pub fn walk_file<'a>(file: &'a File<'a>, visit: &mut dyn FnMut(Node<'a>) -> bool) {
    let mut walker = Walker {
        visit,
        stopped: false,
    };
    walker.file(file);
}

struct Walker<'a, 'v> {
    visit: &'v mut dyn FnMut(Node<'a>) -> bool,
    stopped: bool,
}

impl<'a> Walker<'a, '_> {
    fn emit(&mut self, node: Node<'a>) -> bool {
        if self.stopped {
            return false;
        }
        if !(self.visit)(node) {
            self.stopped = true;
            return false;
        }
        true
    }

    fn file(&mut self, file: &'a File<'a>) {
        if !self.emit(Node::File(file)) {
            return;
        }
        for decl in &file.decls {
            if self.stopped {
                return;
            }
            match decl {
                Decl::Import { specs, .. } => {
                    for spec in specs {
                        if !self.emit(Node::ImportSpec(spec)) {
                            return;
                        }
                    }
                }
                Decl::Value { specs, .. } => {
                    for spec in specs {
                        if !self.emit(Node::ValueSpec(spec)) {
                            return;
                        }
                        for value in &spec.values {
                            self.expr(value);
                        }
                    }
                }
                Decl::Func(func) => self.func(func),
                Decl::Type { .. } => {}
            }
        }
    }

    fn func(&mut self, func: &'a FuncDecl<'a>) {
        if !self.emit(Node::FuncDecl(func)) {
            return;
        }
        if let Some(body) = &func.body {
            self.block(body);
        }
    }

    fn block(&mut self, block: &'a Block<'a>) {
        if !self.emit(Node::Block(block)) {
            return;
        }
        for stmt in &block.stmts {
            self.stmt(stmt);
        }
    }

    fn stmt(&mut self, stmt: &'a Stmt<'a>) {
        if self.stopped {
            return;
        }

        // Declaration statements surface themselves, then their specs
        if let Stmt::Decl(decl) = stmt {
            if !self.emit(Node::Stmt(stmt)) {
                return;
            }
            if let Decl::Value { specs, .. } = decl {
                for spec in specs {
                    if !self.emit(Node::ValueSpec(spec)) {
                        return;
                    }
                    for value in &spec.values {
                        self.expr(value);
                    }
                }
            }
            return;
        }

        if let Stmt::Block(block) = stmt {
            self.block(block);
            return;
        }

        if !self.emit(Node::Stmt(stmt)) {
            return;
        }

        match stmt {
            Stmt::Assign { lhs, rhs, .. } => {
                for expr in lhs.iter().chain(rhs) {
                    self.expr(expr);
                }
            }
            Stmt::IncDec { expr, .. } => self.expr(expr),
            Stmt::If {
                init,
                cond,
                then,
                els,
                ..
            } => {
                if let Some(init) = init {
                    self.stmt(init);
                }
                self.expr(cond);
                self.block(then);
                if let Some(els) = els {
                    self.stmt(els);
                }
            }
            Stmt::For {
                init,
                cond,
                post,
                body,
                ..
            } => {
                if let Some(init) = init {
                    self.stmt(init);
                }
                if let Some(cond) = cond {
                    self.expr(cond);
                }
                if let Some(post) = post {
                    self.stmt(post);
                }
                self.block(body);
            }
            Stmt::Range {
                key,
                value,
                subject,
                body,
                ..
            } => {
                for expr in [key, value].into_iter().flatten() {
                    self.expr(expr);
                }
                self.expr(subject);
                self.block(body);
            }
            Stmt::Switch {
                init, tag, cases, ..
            } => {
                if let Some(init) = init {
                    self.stmt(init);
                }
                if let Some(tag) = tag {
                    self.expr(tag);
                }
                for case in cases {
                    for value in &case.values {
                        self.expr(value);
                    }
                    for stmt in &case.body {
                        self.stmt(stmt);
                    }
                }
            }
            Stmt::Select { cases, .. } => {
                for case in cases {
                    if let Some(comm) = &case.comm {
                        self.stmt(comm);
                    }
                    for stmt in &case.body {
                        self.stmt(stmt);
                    }
                }
            }
            Stmt::Return { results, .. } => {
                for expr in results {
                    self.expr(expr);
                }
            }
            Stmt::Defer { call, .. } | Stmt::Go { call, .. } => self.expr(call),
            Stmt::Send { chan, value, .. } => {
                self.expr(chan);
                self.expr(value);
            }
            Stmt::Expr { expr, .. } => self.expr(expr),
            Stmt::Branch { .. } | Stmt::Empty { .. } => {}
            Stmt::Decl(_) | Stmt::Block(_) => unreachable!("handled above"),
        }
    }

    fn expr(&mut self, expr: &'a Expr<'a>) {
        if self.stopped {
            return;
        }
        if !self.emit(Node::Expr(expr)) {
            return;
        }

        match expr {
            Expr::Unary { operand, .. } => self.expr(operand),
            Expr::Binary { left, right, .. } => {
                self.expr(left);
                self.expr(right);
            }
            Expr::Call { fun, args, .. } => {
                self.expr(fun);
                for arg in args {
                    self.expr(arg);
                }
            }
            Expr::Selector { recv, .. } | Expr::TypeAssert { recv, .. } => self.expr(recv),
            Expr::Index { recv, index, .. } => {
                self.expr(recv);
                self.expr(index);
            }
            Expr::Slice {
                recv,
                low,
                high,
                max,
                ..
            } => {
                self.expr(recv);
                for part in [low, high, max].into_iter().flatten() {
                    self.expr(part);
                }
            }
            Expr::Paren { inner, .. } => self.expr(inner),
            Expr::FuncLit { body, .. } => self.block(body),
            Expr::Ident(_) | Expr::BasicLit { .. } | Expr::Composite { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gosift_parser::{NodeKind, Parser};

    fn kinds(source: &str) -> Vec<NodeKind> {
        let file = Parser::new(source).parse().expect("test source parses");
        let mut seen = Vec::new();
        walk_file(&file, &mut |node| {
            seen.push(node.kind());
            true
        });
        seen
    }

    #[test]
    fn visits_preorder() {
        let seen = kinds("package p\n\nimport \"fmt\"\n\nfunc f() {\n\tx := 1\n\tuse(x)\n}\n");
        assert_eq!(seen[0], NodeKind::File);
        assert_eq!(seen[1], NodeKind::ImportSpec);
        assert_eq!(seen[2], NodeKind::FuncDecl);
        assert_eq!(seen[3], NodeKind::Block);
        assert!(seen.contains(&NodeKind::AssignStmt));
        assert!(seen.contains(&NodeKind::CallExpr));
    }

    #[test]
    fn local_declarations_surface_stmt_and_spec() {
        let seen = kinds("package p\n\nfunc f() {\n\tvar x = 1\n\tuse(x)\n}\n");
        assert!(seen.contains(&NodeKind::DeclStmt));
        assert!(seen.contains(&NodeKind::ValueSpec));
    }

    #[test]
    fn abort_stops_the_walk() {
        let file = Parser::new("package p\n\nfunc a() {}\n\nfunc b() {}\n")
            .parse()
            .unwrap();
        let mut count = 0;
        walk_file(&file, &mut |node| {
            count += 1;
            node.kind() != NodeKind::FuncDecl
        });
        // File, first FuncDecl, nothing after the abort
        assert_eq!(count, 2);
    }

    #[test]
    fn visits_select_clause_statements() {
        let seen = kinds(
            "package p\n\nfunc f(ch chan int) {\n\tselect {\n\tcase v := <-ch:\n\t\tuse(v)\n\tdefault:\n\t}\n}\n",
        );
        assert!(seen.contains(&NodeKind::SelectStmt));
        assert!(seen.contains(&NodeKind::AssignStmt));
        assert!(seen.contains(&NodeKind::CallExpr));
    }

    #[test]
    fn visits_nested_func_literals() {
        let seen = kinds(
            "package p\n\nfunc f() {\n\tgo func() {\n\t\tfor {\n\t\t\twork()\n\t\t}\n\t}()\n}\n",
        );
        assert!(seen.contains(&NodeKind::GoStmt));
        assert!(seen.contains(&NodeKind::FuncLit));
        assert!(seen.contains(&NodeKind::ForStmt));
    }
}
