//! Schema files deserialized with JSON-path context in error messages.
use std::path::Path;
use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;

use crate::schema::VariantSchema;

pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| {
        let path = err.path().to_string();
        anyhow!("at JSON path {path}: {}", err.into_inner())
    })
}

pub fn load_schema(path: &Path) -> Result<VariantSchema> {
    let src = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read schema file {}", path.display()))?;
    from_str_with_path(&src).with_context(|| format!("invalid schema file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_name_the_offending_path() {
        let err = from_str_with_path::<VariantSchema>(r#"{"Open": true, "Data": {"value": {"type": "nope"}}}"#)
            .unwrap_err();
        assert!(err.to_string().starts_with("at JSON path Data"), "{err}");
    }

    #[test]
    fn reads_schema_documents() {
        let s: VariantSchema = from_str_with_path(r#"{"Open": true, "Data": {"value": {"type": "integer", "optional": true}}}"#).unwrap();
        assert_eq!(s.names().collect::<Vec<_>>(), ["Open", "Data"]);
        assert!(s.get("Data").unwrap().all_optional());
    }
}
