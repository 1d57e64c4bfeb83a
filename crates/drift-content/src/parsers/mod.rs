//! Format parsers

mod ini;
mod json;
mod keyvalue;
mod raw;
mod vault;
mod yaml;

pub use self::ini::IniParser;
pub use self::json::JsonParser;
pub use self::keyvalue::{KeySpaceValueParser, KeyValueParser};
pub use self::raw::RawParser;
pub use self::vault::VaultParser;
pub use self::yaml::{YamlParser, yaml_to_json};
