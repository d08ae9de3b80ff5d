//! Routable endpoints and their builder.

use std::collections::BTreeMap;
use std::fmt;

use crate::template::{RouteTemplate, TemplateError};

/// A routable destination: a display name, a parsed template and the
/// metadata the matcher consults.
///
/// Endpoints are immutable once built and shared by reference between the
/// builder, the compiled matcher and every `RouteMatch` it returns.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    display_name: String,
    template: RouteTemplate,
    order: i32,
    http_method: Option<String>,
    defaults: BTreeMap<String, String>,
    constraints: Vec<(String, String)>,
    metadata: Vec<String>,
}

impl Endpoint {
    /// Start building an endpoint for `template`.
    pub fn builder(display_name: impl Into<String>, template: impl Into<String>) -> EndpointBuilder {
        EndpointBuilder {
            display_name: display_name.into(),
            template: template.into(),
            order: 0,
            http_method: None,
            defaults: BTreeMap::new(),
            constraints: Vec::new(),
            metadata: Vec::new(),
        }
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn template(&self) -> &RouteTemplate {
        &self.template
    }

    /// Explicit priority; lower values win.
    pub fn order(&self) -> i32 {
        self.order
    }

    /// Uppercased HTTP method the endpoint is restricted to, if any.
    pub fn http_method(&self) -> Option<&str> {
        self.http_method.as_deref()
    }

    pub fn defaults(&self) -> &BTreeMap<String, String> {
        &self.defaults
    }

    /// Default value for `name`, compared ASCII case-insensitively.
    pub fn default_value(&self, name: &str) -> Option<&str> {
        self.defaults
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Explicit `(parameter, constraint text)` pairs, in registration order.
    pub fn constraints(&self) -> &[(String, String)] {
        &self.constraints
    }

    pub fn metadata(&self) -> &[String] {
        &self.metadata
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let template = self.template.raw_text().trim_start_matches('~').trim_start_matches('/');
        match &self.http_method {
            Some(method) => write!(f, "{} ({} /{})", self.display_name, method, template),
            None => write!(f, "{} (/{})", self.display_name, template),
        }
    }
}

/// Builder for `Endpoint`. The template is parsed by `build`.
#[derive(Debug, Clone)]
pub struct EndpointBuilder {
    display_name: String,
    template: String,
    order: i32,
    http_method: Option<String>,
    defaults: BTreeMap<String, String>,
    constraints: Vec<(String, String)>,
    metadata: Vec<String>,
}

impl EndpointBuilder {
    pub fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn method(mut self, method: impl AsRef<str>) -> Self {
        self.http_method = Some(method.as_ref().to_ascii_uppercase());
        self
    }

    pub fn default_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(name.into(), value.into());
        self
    }

    pub fn constraint(mut self, parameter: impl Into<String>, constraint: impl Into<String>) -> Self {
        self.constraints.push((parameter.into(), constraint.into()));
        self
    }

    pub fn metadata(mut self, item: impl Into<String>) -> Self {
        self.metadata.push(item.into());
        self
    }

    pub fn build(self) -> Result<Endpoint, TemplateError> {
        let template = RouteTemplate::parse(&self.template)?;
        Ok(Endpoint {
            display_name: self.display_name,
            template,
            order: self.order,
            http_method: self.http_method,
            defaults: self.defaults,
            constraints: self.constraints,
            metadata: self.metadata,
        })
    }
}
