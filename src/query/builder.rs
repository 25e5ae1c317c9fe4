use crate::core::collection::Collection;
use crate::core::error::Result;
use crate::core::types::Value;
use crate::query::matcher::{Comparator, Matcher, Operand, Pattern};
use crate::query::operations::Operation;

/// A deferred query awaiting either another `where_` or `run`.
///
/// Matchers accumulate with implicit AND. `run` borrows the query, so the
/// same query can be run again later against the then-current cache; the
/// collected matchers are kept between runs.
pub struct Query<'c, Op> {
    collection: &'c Collection,
    op: Op,
    matchers: Vec<Matcher>,
}

/// A query that has been given a key-chain and awaits its comparator
pub struct Where<'c, Op> {
    query: Query<'c, Op>,
    key: String,
}

impl<'c, Op: Operation> Query<'c, Op> {
    pub(crate) fn new(collection: &'c Collection, op: Op) -> Self {
        Query {
            collection,
            op,
            matchers: Vec::new(),
        }
    }

    #[doc(alias = "where")]
    pub fn where_(self, key: impl Into<String>) -> Where<'c, Op> {
        Where {
            query: self,
            key: key.into(),
        }
    }

    /// Append a prebuilt matcher
    pub fn filter(mut self, matcher: Matcher) -> Self {
        self.matchers.push(matcher);
        self
    }

    pub fn matchers(&self) -> &[Matcher] {
        &self.matchers
    }

    /// Execute against the cache. Mutating operations flush before returning.
    pub async fn run(&self) -> Result<Op::Output> {
        let output = {
            let mut cache = self.collection.cache().lock();
            self.op.execute(&mut cache, &self.matchers)?
        };

        if Op::MUTATES {
            self.collection.flush().await?;
        }

        Ok(output)
    }
}

impl<'c, Op: Operation> Where<'c, Op> {
    pub fn compare(self, comparator: Comparator, operand: Operand) -> Query<'c, Op> {
        let Where { query, key } = self;
        query.filter(Matcher::new(key, comparator, operand))
    }

    pub fn equals(self, value: impl Into<Value>) -> Query<'c, Op> {
        self.compare(Comparator::Equals, Operand::Value(value.into()))
    }

    pub fn not_equal(self, value: impl Into<Value>) -> Query<'c, Op> {
        self.compare(Comparator::NotEqual, Operand::Value(value.into()))
    }

    pub fn greater_than(self, value: impl Into<Value>) -> Query<'c, Op> {
        self.compare(Comparator::GreaterThan, Operand::Value(value.into()))
    }

    pub fn less_than(self, value: impl Into<Value>) -> Query<'c, Op> {
        self.compare(Comparator::LessThan, Operand::Value(value.into()))
    }

    pub fn greater_or_equal(self, value: impl Into<Value>) -> Query<'c, Op> {
        self.compare(Comparator::GreaterOrEqual, Operand::Value(value.into()))
    }

    pub fn less_than_or_equal(self, value: impl Into<Value>) -> Query<'c, Op> {
        self.compare(Comparator::LessThanOrEqual, Operand::Value(value.into()))
    }

    /// Exclusive range: `lo < value < hi`
    pub fn between(self, lo: impl Into<Value>, hi: impl Into<Value>) -> Query<'c, Op> {
        let range = Value::Array(vec![lo.into(), hi.into()]);
        self.compare(Comparator::Between, Operand::Value(range))
    }

    #[doc(alias = "in")]
    pub fn is_in<I, V>(self, values: I) -> Query<'c, Op>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let set = Value::Array(values.into_iter().map(Into::into).collect());
        self.compare(Comparator::In, Operand::Value(set))
    }

    /// Text patterns compile to a regular expression; a `Regex` is used as is
    pub fn matches(self, pattern: impl Into<Pattern>) -> Query<'c, Op> {
        self.compare(Comparator::Matches, Operand::Pattern(pattern.into()))
    }
}
