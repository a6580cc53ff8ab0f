use serde_json::Value;

/// A single rendered condition. `sql` uses `?` markers, one per entry in
/// `params`; markers are rewritten to `$n` placeholders when the whole
/// tree is rendered.
#[derive(Debug, Clone)]
pub struct Leaf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Leaf {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self { sql: sql.into(), params }
    }

    /// A condition with no bound values (IS NULL, 1=1, 1=0, ...).
    pub fn fixed(sql: impl Into<String>) -> Self {
        Self { sql: sql.into(), params: vec![] }
    }
}

/// Boolean predicate tree. Relations are traversed with `Exists`: a
/// correlated sub-query carrying its own inner predicate.
#[derive(Debug, Clone)]
pub enum Expr {
    Leaf(Leaf),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Exists {
        from: String,
        correlation: String,
        inner: Option<Box<Expr>>,
    },
}

/// Mutable predicate accumulator with querydsl-style combination rules:
/// `and`/`or` fold the argument onto whatever has accumulated so far, so
/// an `or` does NOT open an independent disjunctive branch - it attaches
/// an alternative to the entire predicate built up to that point. Filter
/// compatibility depends on this exact behavior.
///
/// An empty builder is trivially true: combining with it is a no-op and
/// it renders as `1=1`.
#[derive(Debug, Clone, Default)]
pub struct BooleanBuilder {
    expr: Option<Expr>,
}

impl BooleanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A predicate matching no rows.
    pub fn match_none() -> Self {
        Self { expr: Some(Expr::Leaf(Leaf::fixed("1=0"))) }
    }

    pub fn is_empty(&self) -> bool {
        self.expr.is_none()
    }

    pub fn and(&mut self, other: BooleanBuilder) -> &mut Self {
        self.and_expr(other.expr)
    }

    pub fn and_leaf(&mut self, leaf: Leaf) -> &mut Self {
        self.and_expr(Some(Expr::Leaf(leaf)))
    }

    pub fn and_expr(&mut self, other: Option<Expr>) -> &mut Self {
        if let Some(rhs) = other {
            self.expr = match self.expr.take() {
                Some(lhs) => Some(Expr::And(Box::new(lhs), Box::new(rhs))),
                None => Some(rhs),
            };
        }
        self
    }

    pub fn or(&mut self, other: BooleanBuilder) -> &mut Self {
        if let Some(rhs) = other.expr {
            self.expr = match self.expr.take() {
                Some(lhs) => Some(Expr::Or(Box::new(lhs), Box::new(rhs))),
                None => Some(rhs),
            };
        }
        self
    }

    pub fn and_not(&mut self, other: BooleanBuilder) -> &mut Self {
        if let Some(rhs) = other.expr {
            self.and_expr(Some(Expr::Not(Box::new(rhs))));
        }
        self
    }

    /// Conjoin an EXISTS sub-query over `from`, correlated to the outer
    /// row by `correlation`, optionally restricted by `inner`.
    pub fn and_exists(&mut self, from: impl Into<String>, correlation: impl Into<String>, inner: BooleanBuilder) -> &mut Self {
        self.and_expr(Some(Expr::Exists {
            from: from.into(),
            correlation: correlation.into(),
            inner: inner.expr.map(Box::new),
        }))
    }

    pub fn into_expr(self) -> Option<Expr> {
        self.expr
    }

    /// Render to a WHERE-clause body plus ordered bind values. Parameter
    /// numbering starts at `starting_param_index + 1`.
    pub fn to_sql(&self, starting_param_index: usize) -> (String, Vec<Value>) {
        match &self.expr {
            None => ("1=1".to_string(), vec![]),
            Some(expr) => {
                let mut out = String::new();
                let mut params = Vec::new();
                let mut index = starting_param_index;
                render(expr, &mut out, &mut params, &mut index);
                (out, params)
            }
        }
    }
}

fn render(expr: &Expr, out: &mut String, params: &mut Vec<Value>, index: &mut usize) {
    match expr {
        Expr::Leaf(leaf) => {
            let mut pieces = leaf.sql.split('?');
            if let Some(first) = pieces.next() {
                out.push_str(first);
            }
            for piece in pieces {
                *index += 1;
                out.push_str(&format!("${}", index));
                out.push_str(piece);
            }
            params.extend(leaf.params.iter().cloned());
        }
        Expr::And(lhs, rhs) => {
            out.push('(');
            render(lhs, out, params, index);
            out.push_str(" AND ");
            render(rhs, out, params, index);
            out.push(')');
        }
        Expr::Or(lhs, rhs) => {
            out.push('(');
            render(lhs, out, params, index);
            out.push_str(" OR ");
            render(rhs, out, params, index);
            out.push(')');
        }
        Expr::Not(inner) => {
            out.push_str("NOT (");
            render(inner, out, params, index);
            out.push(')');
        }
        Expr::Exists { from, correlation, inner } => {
            out.push_str("EXISTS (SELECT 1 FROM ");
            out.push_str(from);
            out.push_str(" WHERE ");
            out.push_str(correlation);
            if let Some(inner) = inner {
                out.push_str(" AND ");
                render(inner, out, params, index);
            }
            out.push(')');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn leaf(sql: &str, params: Vec<Value>) -> BooleanBuilder {
        let mut b = BooleanBuilder::new();
        b.and_leaf(Leaf::new(sql, params));
        b
    }

    #[test]
    fn empty_builder_matches_everything() {
        let b = BooleanBuilder::new();
        let (sql, params) = b.to_sql(0);
        assert_eq!(sql, "1=1");
        assert!(params.is_empty());
    }

    #[test]
    fn match_none_renders_false() {
        let (sql, _) = BooleanBuilder::match_none().to_sql(0);
        assert_eq!(sql, "1=0");
    }

    #[test]
    fn and_with_empty_is_noop() {
        let mut b = leaf("a = ?", vec![json!(1)]);
        b.and(BooleanBuilder::new());
        b.or(BooleanBuilder::new());
        b.and_not(BooleanBuilder::new());
        let (sql, params) = b.to_sql(0);
        assert_eq!(sql, "a = $1");
        assert_eq!(params, vec![json!(1)]);
    }

    #[test]
    fn params_number_sequentially_across_branches() {
        let mut b = leaf("a = ?", vec![json!(1)]);
        b.and(leaf("b IN (?, ?)", vec![json!(2), json!(3)]));
        b.and(leaf("c ILIKE ?", vec![json!("%x%")]));
        let (sql, params) = b.to_sql(0);
        assert_eq!(sql, "((a = $1 AND b IN ($2, $3)) AND c ILIKE $4)");
        assert_eq!(params, vec![json!(1), json!(2), json!(3), json!("%x%")]);
    }

    #[test]
    fn starting_index_offsets_placeholders() {
        let b = leaf("a = ?", vec![json!(1)]);
        let (sql, _) = b.to_sql(5);
        assert_eq!(sql, "a = $6");
    }

    #[test]
    fn or_folds_onto_accumulated_predicate() {
        // (base1 AND base2) OR alt - the OR attaches to everything built
        // so far, not just the last condition.
        let mut b = leaf("a = ?", vec![json!(1)]);
        b.and(leaf("b = ?", vec![json!(2)]));
        b.or(leaf("c = ?", vec![json!(3)]));
        let (sql, _) = b.to_sql(0);
        assert_eq!(sql, "((a = $1 AND b = $2) OR c = $3)");
    }

    #[test]
    fn or_then_and_wraps_the_disjunction() {
        let mut b = leaf("a = ?", vec![json!(1)]);
        b.or(leaf("b = ?", vec![json!(2)]));
        b.and(leaf("c = ?", vec![json!(3)]));
        let (sql, _) = b.to_sql(0);
        assert_eq!(sql, "((a = $1 OR b = $2) AND c = $3)");
    }

    #[test]
    fn and_not_negates_the_argument() {
        let mut b = leaf("a = ?", vec![json!(1)]);
        b.and_not(leaf("b = ?", vec![json!(2)]));
        let (sql, _) = b.to_sql(0);
        assert_eq!(sql, "(a = $1 AND NOT (b = $2))");
    }

    #[test]
    fn exists_renders_correlated_subquery() {
        let mut b = BooleanBuilder::new();
        b.and_exists(
            "kit_volunteers kv JOIN volunteers v ON v.id = kv.volunteer_id",
            "kv.kit_id = k.id",
            leaf("v.\"email\" = ?", vec![json!("a@x.com")]),
        );
        let (sql, params) = b.to_sql(0);
        assert_eq!(
            sql,
            "EXISTS (SELECT 1 FROM kit_volunteers kv JOIN volunteers v ON v.id = kv.volunteer_id \
             WHERE kv.kit_id = k.id AND v.\"email\" = $1)"
        );
        assert_eq!(params, vec![json!("a@x.com")]);
    }

    #[test]
    fn exists_without_inner_predicate() {
        let mut b = BooleanBuilder::new();
        b.and_exists("kits k2", "k2.donor_id = d.id", BooleanBuilder::new());
        let (sql, _) = b.to_sql(0);
        assert_eq!(sql, "EXISTS (SELECT 1 FROM kits k2 WHERE k2.donor_id = d.id)");
    }
}
