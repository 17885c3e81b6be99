//! Turtle writer.

use webacl_core::constants::{rdf, xsd};

use crate::graph::{Graph, Term, Triple};

/// Serializes a graph as Turtle, grouping triples by subject and predicate.
///
/// IRIs under one of the `(prefix, namespace)` pairs are written as prefixed
/// names when the remainder is a simple local name.
#[must_use]
pub fn to_turtle(graph: &Graph, prefixes: &[(&str, &str)]) -> String {
    let mut out = String::new();

    for (prefix, namespace) in prefixes {
        out.push_str("@prefix ");
        out.push_str(prefix);
        out.push_str(": <");
        out.push_str(namespace);
        out.push_str("> .\n");
    }
    if !prefixes.is_empty() && !graph.is_empty() {
        out.push('\n');
    }

    for (subject, predicates) in group(graph) {
        out.push_str(&term(subject, prefixes));

        for (i, (predicate, objects)) in predicates.iter().enumerate() {
            out.push_str(if i == 0 { " " } else { " ;\n    " });
            if *predicate == rdf::TYPE {
                out.push('a');
            } else {
                out.push_str(&iri(predicate, prefixes));
            }

            for (j, object) in objects.iter().enumerate() {
                out.push_str(if j == 0 { " " } else { ", " });
                out.push_str(&term(object, prefixes));
            }
        }
        out.push_str(" .\n");
    }

    out
}

type PredicateGroup<'a> = Vec<(&'a str, Vec<&'a Term>)>;

fn group(graph: &Graph) -> Vec<(&Term, PredicateGroup<'_>)> {
    let mut subjects: Vec<(&Term, PredicateGroup<'_>)> = Vec::new();

    for Triple {
        subject,
        predicate,
        object,
    } in graph
    {
        let index = match subjects.iter().position(|(s, _)| *s == subject) {
            Some(index) => index,
            None => {
                subjects.push((subject, Vec::new()));
                subjects.len() - 1
            }
        };
        let predicates = &mut subjects[index].1;
        match predicates.iter_mut().find(|(p, _)| *p == predicate.as_str()) {
            Some((_, objects)) => objects.push(object),
            None => predicates.push((predicate.as_str(), vec![object])),
        }
    }

    subjects
}

fn term(term: &Term, prefixes: &[(&str, &str)]) -> String {
    match term {
        Term::Iri(value) => iri(value, prefixes),
        Term::Blank(_) => term.to_string(),
        Term::Literal(literal) => {
            if literal.language.is_some() || literal.datatype == xsd::STRING {
                return term.to_string();
            }
            let bare = matches!(literal.datatype.as_str(), xsd::INTEGER | xsd::BOOLEAN)
                && is_bare_literal(&literal.value);
            if bare {
                literal.value.clone()
            } else {
                format!(
                    "{}^^{}",
                    Term::literal(literal.value.as_str()),
                    iri(&literal.datatype, prefixes)
                )
            }
        }
    }
}

fn is_bare_literal(value: &str) -> bool {
    if value == "true" || value == "false" {
        return true;
    }
    let digits = value.strip_prefix(['+', '-']).unwrap_or(value);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn iri(value: &str, prefixes: &[(&str, &str)]) -> String {
    for (prefix, namespace) in prefixes {
        if let Some(local) = value.strip_prefix(*namespace)
            && !local.starts_with('-')
            && local
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return format!("{prefix}:{local}");
        }
    }
    format!("<{value}>")
}
