//! jq pre-filtering of input documents.
use anyhow::{anyhow, Context, Result};
use jaq_core::{compile::Undefined, load, Compiler, Ctx, RcIter};
use jaq_json::Val;
use serde_json::Value;

/// Runs `filter_src` on `input`; every output of the filter is one document.
pub fn run_jaq(filter_src: &str, input: &Value) -> Result<Vec<Value>> {
    let loader = load::Loader::new(jaq_std::defs().chain(jaq_json::defs()));
    let arena = load::Arena::default();
    let program = load::File { code: filter_src, path: () };

    let modules = loader
        .load(&arena, program)
        .map_err(|errs| parse_failure(filter_src, errs))?;

    let filter = Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .compile(modules)
        .map_err(|errs| undefined_failure(filter_src, errs))?;

    let inputs = RcIter::new(core::iter::empty());
    let mut it = filter.run((Ctx::new([], &inputs), Val::from(input.clone())));

    let mut out = Vec::new();
    while let Some(item) = it.next() {
        let v = item.map_err(|e| anyhow!("jq runtime error: {e:?}"))?;
        let text = format!("{v}");
        let doc = serde_json::from_str(&text)
            .with_context(|| format!("jq produced a non-JSON value: {text}"))?;
        out.push(doc);
    }
    Ok(out)
}

fn parse_failure(
    filter_src: &str,
    errs: Vec<(load::File<&str, ()>, load::Error<&str>)>,
) -> anyhow::Error {
    let details: Vec<String> = errs.into_iter().map(|(_, err)| format!("{err:?}")).collect();
    anyhow!("jq filter `{filter_src}` does not parse: {}", details.join("; "))
}

fn undefined_failure(
    filter_src: &str,
    errs: Vec<(load::File<&str, ()>, Vec<(&str, Undefined)>)>,
) -> anyhow::Error {
    let names: Vec<String> = errs
        .into_iter()
        .flat_map(|(_, list)| list)
        .map(|(name, undef)| format!("`{name}` ({undef:?})"))
        .collect();
    anyhow!("jq filter `{filter_src}` uses undefined {}", names.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn each_output_is_a_document() {
        let input = json!({"events": [{"_type": "Open"}, {"_type": "Close"}]});
        let out = run_jaq(".events[]", &input).unwrap();
        assert_eq!(out, vec![json!({"_type": "Open"}), json!({"_type": "Close"})]);
    }

    #[test]
    fn bad_filters_are_errors() {
        let err = run_jaq(".[", &json!(null)).unwrap_err().to_string();
        assert!(err.starts_with("jq filter `.[` does not parse"), "{err}");
        let err = run_jaq("no_such_fn", &json!(null)).unwrap_err().to_string();
        assert!(err.contains("uses undefined") && err.contains("no_such_fn"), "{err}");
    }
}
