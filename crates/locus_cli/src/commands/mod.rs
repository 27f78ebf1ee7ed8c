pub(crate) mod analyze;
pub(crate) mod collect;
