//! Per-candidate match processors.
//!
//! Each candidate carries an ordered list of processors. They run in order
//! against a fresh `RouteValues`, and the first processor to reject the
//! request disqualifies the candidate.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::constraints::{RouteConstraint, RouteDirection};
use crate::routing::complex::match_complex_segment;
use crate::routing::tokenizer::PathSegment;
use crate::routing::values::RouteValues;
use crate::template::Segment;

/// Request data shared by every processor of a match attempt.
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    pub path: &'a str,
    pub method: &'a str,
    pub segments: &'a [PathSegment],
}

#[derive(Clone)]
pub enum MatchProcessor {
    /// Rejects requests whose method differs (ASCII case-insensitive).
    HttpMethod(String),

    /// Binds a simple parameter segment, falling back to its default.
    Parameter {
        segment: usize,
        name: String,
        catch_all: bool,
        default: Option<String>,
    },

    /// Re-parses a multi-part segment against the request text.
    ComplexSegment { segment: usize, pattern: Segment },

    Constraint {
        parameter: String,
        constraint: Arc<dyn RouteConstraint>,
    },

    /// Injects a default whose name has no parameter in the template.
    DefaultValue { name: String, value: String },
}

impl MatchProcessor {
    pub fn process(&self, ctx: &MatchContext<'_>, values: &mut RouteValues) -> bool {
        match self {
            MatchProcessor::HttpMethod(method) => method.eq_ignore_ascii_case(ctx.method),

            MatchProcessor::Parameter {
                segment,
                name,
                catch_all,
                default,
            } => {
                match ctx.segments.get(*segment) {
                    Some(span) if *catch_all => {
                        values.insert(name.as_str(), &ctx.path[span.start..]);
                    }
                    Some(span) => {
                        values.insert(name.as_str(), span.text(ctx.path));
                    }
                    None => {
                        if let Some(default) = default {
                            values.insert(name.as_str(), default.as_str());
                        }
                    }
                }
                true
            }

            MatchProcessor::ComplexSegment { segment, pattern } => ctx
                .segments
                .get(*segment)
                .map(|span| match_complex_segment(pattern, span.text(ctx.path), values))
                .unwrap_or(false),

            MatchProcessor::Constraint {
                parameter,
                constraint,
            } => {
                let matched = constraint.matches(parameter, values, RouteDirection::IncomingRequest);
                if !matched {
                    debug!(
                        parameter = %parameter,
                        value = ?values.get(parameter),
                        constraint = ?constraint,
                        "Route value did not match constraint"
                    );
                }
                matched
            }

            MatchProcessor::DefaultValue { name, value } => {
                values.insert(name.as_str(), value.as_str());
                true
            }
        }
    }
}

impl fmt::Debug for MatchProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchProcessor::HttpMethod(method) => write!(f, "HttpMethod({})", method),
            MatchProcessor::Parameter { segment, name, .. } => {
                write!(f, "Parameter({}@{})", name, segment)
            }
            MatchProcessor::ComplexSegment { segment, pattern } => {
                write!(f, "ComplexSegment({}@{})", pattern, segment)
            }
            MatchProcessor::Constraint {
                parameter,
                constraint,
            } => write!(f, "Constraint({}: {:?})", parameter, constraint),
            MatchProcessor::DefaultValue { name, value } => {
                write!(f, "DefaultValue({}={})", name, value)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::IntConstraint;
    use crate::routing::tokenizer::tokenize;
    use crate::template::RouteTemplate;

    fn run(processor: &MatchProcessor, path: &str, method: &str) -> (bool, RouteValues) {
        let segments = tokenize(path).unwrap();
        let ctx = MatchContext {
            path,
            method,
            segments: &segments,
        };
        let mut values = RouteValues::new();
        let ok = processor.process(&ctx, &mut values);
        (ok, values)
    }

    #[test]
    fn test_http_method() {
        let processor = MatchProcessor::HttpMethod("GET".into());
        assert!(run(&processor, "/", "get").0);
        assert!(!run(&processor, "/", "POST").0);
    }

    #[test]
    fn test_parameter_binding() {
        let processor = MatchProcessor::Parameter {
            segment: 1,
            name: "id".into(),
            catch_all: false,
            default: Some("0".into()),
        };
        let (ok, values) = run(&processor, "/items/7", "GET");
        assert!(ok);
        assert_eq!(values.get("id"), Some("7"));

        let (ok, values) = run(&processor, "/items", "GET");
        assert!(ok);
        assert_eq!(values.get("id"), Some("0"));
    }

    #[test]
    fn test_catch_all_takes_rest_of_path() {
        let processor = MatchProcessor::Parameter {
            segment: 1,
            name: "path".into(),
            catch_all: true,
            default: None,
        };
        let (_, values) = run(&processor, "/files/a/b/c.txt", "GET");
        assert_eq!(values.get("path"), Some("a/b/c.txt"));

        let (ok, values) = run(&processor, "/files", "GET");
        assert!(ok);
        assert!(values.is_empty());
    }

    #[test]
    fn test_complex_segment() {
        let template = RouteTemplate::parse("{name}.{ext}").unwrap();
        let processor = MatchProcessor::ComplexSegment {
            segment: 0,
            pattern: template.segments()[0].clone(),
        };
        let (ok, values) = run(&processor, "/a.txt", "GET");
        assert!(ok);
        assert_eq!(values.get("ext"), Some("txt"));
        assert!(!run(&processor, "/", "GET").0);
    }

    #[test]
    fn test_constraint_and_default_value() {
        let constraint = MatchProcessor::Constraint {
            parameter: "id".into(),
            constraint: Arc::new(IntConstraint),
        };
        let mut values: RouteValues = [("id", "12")].into_iter().collect();
        let segments = tokenize("/").unwrap();
        let ctx = MatchContext {
            path: "/",
            method: "GET",
            segments: &segments,
        };
        assert!(constraint.process(&ctx, &mut values));
        values.insert("id", "twelve");
        assert!(!constraint.process(&ctx, &mut values));

        let inject = MatchProcessor::DefaultValue {
            name: "area".into(),
            value: "admin".into(),
        };
        let (ok, values) = run(&inject, "/", "GET");
        assert!(ok);
        assert_eq!(values.get("area"), Some("admin"));
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[test]
    fn test_constraint_rejection_is_logged() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let constraint = MatchProcessor::Constraint {
            parameter: "id".into(),
            constraint: Arc::new(IntConstraint),
        };
        let segments = tokenize("/").unwrap();
        let ctx = MatchContext {
            path: "/",
            method: "GET",
            segments: &segments,
        };

        tracing::subscriber::with_default(subscriber, || {
            let mut values: RouteValues = [("id", "12")].into_iter().collect();
            assert!(constraint.process(&ctx, &mut values));
            assert!(logs.text().is_empty());

            values.insert("id", "twelve");
            assert!(!constraint.process(&ctx, &mut values));
        });

        let text = logs.text();
        assert!(text.contains("Route value did not match constraint"));
        assert!(text.contains("parameter=id"));
        assert!(text.contains("twelve"));
    }
}
