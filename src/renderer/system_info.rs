//! Rendering of system-information payloads (`$sysInfo$`, `$sample$`).

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::renderer::format::{looks_numeric, quote_string};
use crate::renderer::literals::{resolve_literals, LiteralStyle};
use crate::sample::SampleProvider;
use crate::types::{ExpectedType, Value};

pub const SYSINFO_MARKER: &str = "$sysInfo$";
pub const SAMPLE_MARKER: &str = "$sample$";

/// A server variable or expression exposing system information,
/// e.g. `@@version` or `(SELECT user())`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemVariable {
    pub variable: String,
    /// `integer` or `string`.
    #[serde(rename = "type", default = "default_variable_type")]
    pub value_type: String,
    #[serde(default)]
    pub description: String,
}

fn default_variable_type() -> String {
    "string".to_string()
}

impl SystemVariable {
    #[must_use]
    pub fn new(variable: impl Into<String>, value_type: impl Into<String>) -> Self {
        SystemVariable {
            variable: variable.into(),
            value_type: value_type.into(),
            description: String::new(),
        }
    }

    /// Query that reads the variable's current value.
    #[must_use]
    pub fn lookup_sql(variable: &str) -> String {
        if variable.to_uppercase().contains("SELECT") {
            variable.to_string()
        } else {
            format!("SELECT {variable}")
        }
    }
}

/// Fills `$sysInfo$` markers with system variables and `$sample$` with the
/// live value of the last one chosen.
#[derive(Debug, Clone, Default)]
pub struct SystemInformationRenderer {
    variables: Vec<SystemVariable>,
}

impl SystemInformationRenderer {
    #[must_use]
    pub fn new(variables: Vec<SystemVariable>) -> Self {
        SystemInformationRenderer { variables }
    }

    /// Picks a variable whose type matches `tag` (`integer`, `string` or `all`).
    ///
    /// Without a match, `VERSION()` stands in for strings and `1` for
    /// everything else.
    pub fn choose_variable<R: Rng + ?Sized>(&self, tag: &str, rng: &mut R) -> String {
        let candidates: Vec<&SystemVariable> = self
            .variables
            .iter()
            .filter(|v| tag == "all" || v.value_type == tag)
            .collect();
        match candidates.choose(rng) {
            Some(v) => v.variable.clone(),
            None if tag == "string" => "VERSION()".to_string(),
            None => "1".to_string(),
        }
    }

    /// Renders a system-information payload.
    ///
    /// The i-th `$sysInfo$` marker uses the i-th expected tag (`all` past the
    /// end). Literal generators run last, with textual values quoted.
    pub fn render<R: Rng + ?Sized>(
        &self,
        payload: &str,
        expected: &[ExpectedType],
        provider: &SampleProvider<'_>,
        rng: &mut R,
    ) -> String {
        // Markers come from the payload only; inserted variables are not rescanned.
        let mut text = String::with_capacity(payload.len());
        let mut rest = payload;
        let mut last = None;
        let mut index = 0;
        while let Some(pos) = rest.find(SYSINFO_MARKER) {
            let tag = expected.get(index).map_or("all", ExpectedType::tag);
            let variable = self.choose_variable(tag, rng);
            debug!(tag, variable = %variable, "system variable chosen");
            text.push_str(&rest[..pos]);
            text.push_str(&variable);
            rest = &rest[pos + SYSINFO_MARKER.len()..];
            last = Some(variable);
            index += 1;
        }
        text.push_str(rest);

        if let Some(variable) = last.as_deref() {
            if text.contains(SAMPLE_MARKER) {
                let value = sample_literal(provider, variable);
                text = text.replace(SAMPLE_MARKER, &value);
            }
        }

        resolve_literals(&text, LiteralStyle::Quoted, rng).text
    }
}

/// Live value of `variable` as a literal: numbers bare, text quoted, `0` when
/// the lookup fails or is empty.
fn sample_literal(provider: &SampleProvider<'_>, variable: &str) -> String {
    let sql = SystemVariable::lookup_sql(variable);
    let value = match provider.query_scalar(&sql) {
        Ok(Some(Value::Null) | None) => String::new(),
        Ok(Some(v)) => v.to_string(),
        Err(e) => {
            warn!(sql = %sql, error = %e, "system variable lookup failed");
            String::new()
        }
    };
    if value.is_empty() {
        "0".to_string()
    } else if looks_numeric(&value) {
        value
    } else {
        quote_string(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::MemoryStore;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn renderer() -> SystemInformationRenderer {
        SystemInformationRenderer::new(vec![
            SystemVariable::new("@@port", "integer"),
            SystemVariable::new("@@version", "string"),
        ])
    }

    fn tags(names: &[&str]) -> Vec<ExpectedType> {
        names.iter().map(|n| ExpectedType::parse(n)).collect()
    }

    #[test]
    fn test_lookup_sql() {
        assert_eq!(SystemVariable::lookup_sql("@@port"), "SELECT @@port");
        assert_eq!(
            SystemVariable::lookup_sql("(select user())"),
            "(select user())"
        );
    }

    #[test]
    fn test_variables_follow_expected_types() {
        let store = MemoryStore::new();
        let provider = SampleProvider::new(&store, "shop");
        let out = renderer().render(
            "' AND $sysInfo$=$sysInfo$ --",
            &tags(&["string", "integer"]),
            &provider,
            &mut ChaCha8Rng::seed_from_u64(2),
        );
        assert_eq!(out, "' AND @@version=@@port --");
    }

    #[test]
    fn test_fallback_variables() {
        let r = SystemInformationRenderer::default();
        let mut rng = StepRng::new(0, 0);
        assert_eq!(r.choose_variable("string", &mut rng), "VERSION()");
        assert_eq!(r.choose_variable("integer", &mut rng), "1");
        assert_eq!(r.choose_variable("all", &mut rng), "1");
    }

    #[test]
    fn test_sample_uses_last_variable() {
        let store = MemoryStore::new()
            .with_scalar("SELECT @@port", 3306_i64)
            .with_scalar("SELECT @@version", "8.0.36-log");
        let provider = SampleProvider::new(&store, "shop");
        let r = renderer();
        let mut rng = ChaCha8Rng::seed_from_u64(4);

        let out = r.render("$sysInfo$=$sample$", &tags(&["integer"]), &provider, &mut rng);
        assert_eq!(out, "@@port=3306");

        let out = r.render("$sysInfo$=$sample$", &tags(&["string"]), &provider, &mut rng);
        assert_eq!(out, "@@version='8.0.36-log'");
    }

    #[test]
    fn test_failed_sample_is_zero() {
        let store = MemoryStore::new().unreachable();
        let provider = SampleProvider::new(&store, "shop");
        let out = renderer().render(
            "$sysInfo$=$sample$",
            &tags(&["integer"]),
            &provider,
            &mut StepRng::new(0, 0),
        );
        assert_eq!(out, "@@port=0");
    }

    #[test]
    fn test_sample_without_sysinfo_is_left_alone() {
        let store = MemoryStore::new();
        let provider = SampleProvider::new(&store, "shop");
        let out = renderer().render("x=$sample$", &[], &provider, &mut StepRng::new(0, 0));
        assert_eq!(out, "x=$sample$");
    }

    #[test]
    fn test_marker_inside_variable_is_not_expanded() {
        let store = MemoryStore::new();
        let provider = SampleProvider::new(&store, "shop");
        let r = SystemInformationRenderer::new(vec![SystemVariable::new("x$sysInfo$", "string")]);
        let out = r.render("$sysInfo$,$sysInfo$", &[], &provider, &mut StepRng::new(0, 0));
        assert_eq!(out, "x$sysInfo$,x$sysInfo$");
    }

    #[test]
    fn test_deserialize_variable_list() {
        let vars: Vec<SystemVariable> = serde_json::from_str(
            r#"[{"variable": "@@port", "type": "integer", "description": "listening port"},
                {"variable": "user()"}]"#,
        )
        .unwrap();
        assert_eq!(vars[0].value_type, "integer");
        assert_eq!(vars[1].value_type, "string");
    }
}
