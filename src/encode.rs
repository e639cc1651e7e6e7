pub(crate) mod archive;
pub(crate) mod png;
pub(crate) mod traits_csv;
