pub(crate) mod iso8601;
pub(crate) mod metadata;
