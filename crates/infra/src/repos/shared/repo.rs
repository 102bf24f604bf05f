/// Outcome of a batch conditional update. `matched` counts the rows the
/// query selector hit, `modified` the rows that actually transitioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateResult {
    pub matched: i64,
    pub modified: i64,
}
