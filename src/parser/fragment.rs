//! Named grammar fragments with a matching form and a capturing form.
//!
//! Both forms run the same anchored pest rule: `matches` only asks whether
//! the whole text fits, `capture` hands back the matched pair. The two
//! cannot drift apart because there is only one definition per fragment.
use pest::{iterators::Pair, Parser};

use super::raw::{RawParser, Rule};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fragment {
    Variable,
    ItemString,
    ItemNumber,
    ItemBoolean,
    Item,
    ItemMultiple,
    ComparatorSingle,
    ComparatorMultiple,
    ComparatorNumeric,
    ComparatorBoolean,
    ComparatorString,
    Connector,
    Condition,
    Filter,
}

impl Fragment {
    pub const ALL: [Fragment; 14] = [
        Fragment::Variable,
        Fragment::ItemString,
        Fragment::ItemNumber,
        Fragment::ItemBoolean,
        Fragment::Item,
        Fragment::ItemMultiple,
        Fragment::ComparatorSingle,
        Fragment::ComparatorMultiple,
        Fragment::ComparatorNumeric,
        Fragment::ComparatorBoolean,
        Fragment::ComparatorString,
        Fragment::Connector,
        Fragment::Condition,
        Fragment::Filter,
    ];

    /// Anchored rule that wraps this fragment in `SOI ~ .. ~ EOI`
    fn anchored_rule(&self) -> Rule {
        match self {
            Fragment::Variable => Rule::variable_only,
            Fragment::ItemString => Rule::item_string_only,
            Fragment::ItemNumber => Rule::item_number_only,
            Fragment::ItemBoolean => Rule::item_boolean_only,
            Fragment::Item => Rule::item_only,
            Fragment::ItemMultiple => Rule::item_multiple_only,
            Fragment::ComparatorSingle => Rule::comparator_single_only,
            Fragment::ComparatorMultiple => Rule::comparator_multiple_only,
            Fragment::ComparatorNumeric => Rule::comparator_numeric_only,
            Fragment::ComparatorBoolean => Rule::comparator_boolean_only,
            Fragment::ComparatorString => Rule::comparator_string_only,
            Fragment::Connector => Rule::connector_only,
            Fragment::Condition => Rule::condition_only,
            // already anchored
            Fragment::Filter => Rule::filter,
        }
    }

    /// Does `text` consist of exactly this fragment?
    pub fn matches(&self, text: &str) -> bool {
        RawParser::parse(self.anchored_rule(), text).is_ok()
    }

    /// The pair this fragment matched, if `text` consists of exactly it.
    ///
    /// For `Item` the pair is the concrete `item_string`, `item_boolean` or
    /// `item_number` alternative that matched.
    pub fn capture<'a>(&self, text: &'a str) -> Option<Pair<'a, Rule>> {
        let mut pairs = RawParser::parse(self.anchored_rule(), text).ok()?;
        let outer = pairs.next()?;
        match self {
            Fragment::Filter => Some(outer),
            _ => outer.into_inner().next(),
        }
    }
}
