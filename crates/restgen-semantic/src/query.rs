//! SPARQL query text for predicate search, support counting and value
//! harvesting.

use std::fmt::Write;

use restgen_core::Parameter;

const PREFIXES: &str = "PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>\n\
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>\n\
PREFIX xsd: <http://www.w3.org/2001/XMLSchema#>\n";

/// Variable bound by [`predicate_search`].
pub const PREDICATE_VAR: &str = "predicate";
/// Variable bound by [`support_count`].
pub const SUPPORT_VAR: &str = "support";
/// Variable bound by the harvest queries.
pub const VALUE_VAR: &str = "value";

/// Keeps only characters that cannot break out of a regex string literal.
pub fn sanitize_term(term: &str) -> String {
    term.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | ' '))
        .collect()
}

/// Properties whose URI contains `term` (case-insensitive), shortest first.
pub fn predicate_search(term: &str) -> String {
    format!(
        "{PREFIXES}\n\
SELECT DISTINCT ?{PREDICATE_VAR} WHERE {{\n    \
?{PREDICATE_VAR} a rdf:Property .\n    \
OPTIONAL {{ ?{PREDICATE_VAR} rdfs:label ?label }}\n    \
FILTER regex(str(?{PREDICATE_VAR}), \"{}\", 'i')\n\
}}\n\
ORDER BY strlen(str(?{PREDICATE_VAR}))\n",
        sanitize_term(term)
    )
}

/// Number of distinct values `predicate` takes that also satisfy the
/// declared constraints of `parameter`.
pub fn support_count(predicate: &str, parameter: &Parameter) -> String {
    let mut query = format!(
        "{PREFIXES}\nSELECT (COUNT(DISTINCT ?{VALUE_VAR}) AS ?{SUPPORT_VAR}) WHERE {{\n    ?subject <{}> ?{VALUE_VAR} .\n",
        iri(predicate)
    );
    if let Some(filter) = constraint_filter(parameter) {
        let _ = writeln!(query, "    FILTER({filter})");
    }
    query.push_str("}\n");
    query
}

/// Values of any of `predicates` that satisfy the constraints of
/// `parameter`.
pub fn harvest_valid(predicates: &[String], parameter: &Parameter, limit: usize) -> String {
    harvest(predicates, constraint_filter(parameter), limit)
}

/// Values of any of `predicates` that violate the constraints of
/// `parameter`, or `None` when the parameter declares no constraint.
pub fn harvest_invalid(predicates: &[String], parameter: &Parameter, limit: usize) -> Option<String> {
    let filter = constraint_filter(parameter)?;
    Some(harvest(predicates, Some(format!("!({filter})")), limit))
}

fn harvest(predicates: &[String], filter: Option<String>, limit: usize) -> String {
    let patterns: Vec<String> = predicates
        .iter()
        .map(|p| format!("{{ ?subject <{}> ?{VALUE_VAR} }}", iri(p)))
        .collect();
    let mut query = format!(
        "{PREFIXES}\nSELECT DISTINCT ?{VALUE_VAR} WHERE {{\n    {}\n",
        patterns.join("\n    UNION\n    ")
    );
    if let Some(filter) = filter {
        let _ = writeln!(query, "    FILTER({filter})");
    }
    let _ = write!(query, "}}\nLIMIT {limit}\n");
    query
}

/// Conjunction of the length and range constraints of `parameter`.
fn constraint_filter(parameter: &Parameter) -> Option<String> {
    let mut terms = Vec::new();
    if let Some(min) = parameter.min_length {
        terms.push(format!("strlen(str(?{VALUE_VAR})) >= {min}"));
    }
    if let Some(max) = parameter.max_length {
        terms.push(format!("strlen(str(?{VALUE_VAR})) <= {max}"));
    }
    if let Some(min) = parameter.minimum {
        terms.push(format!("xsd:double(str(?{VALUE_VAR})) >= {min}"));
    }
    if let Some(max) = parameter.maximum {
        terms.push(format!("xsd:double(str(?{VALUE_VAR})) <= {max}"));
    }
    (!terms.is_empty()).then(|| terms.join(" && "))
}

/// Strips characters that are not allowed inside `<...>`.
fn iri(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\') && !c.is_whitespace())
        .collect()
}
