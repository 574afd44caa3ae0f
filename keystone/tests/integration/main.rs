mod codecs;
mod schema_refresh;
pub(crate) mod utils;
