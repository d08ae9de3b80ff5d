//! Name → constraint factory registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::constraints::{
    ConstraintError, IntConstraint, RangeConstraint, RegexConstraint, RegexSettings,
    RouteConstraint, StringConstraint,
};

/// Builds an initialized constraint from its optional argument.
pub type ConstraintFactory =
    Arc<dyn Fn(Option<&str>) -> Result<Arc<dyn RouteConstraint>, ConstraintError> + Send + Sync>;

/// Registry of constraint factories keyed by lowercase name.
#[derive(Clone)]
pub struct ConstraintMap {
    factories: HashMap<String, ConstraintFactory>,
}

impl ConstraintMap {
    /// A registry with no constraints at all.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// A registry with the built-in `string`, `int`, `range` and `regex` constraints.
    pub fn with_defaults(regex: RegexSettings) -> Self {
        let mut map = Self::empty();
        map.register("string", |arg| Ok(Arc::new(StringConstraint::new(arg)?)));
        map.register("int", |arg| Ok(Arc::new(IntConstraint::new(arg)?)));
        map.register("range", |arg| Ok(Arc::new(RangeConstraint::new(arg)?)));
        map.register("regex", move |arg| {
            Ok(Arc::new(RegexConstraint::new(arg, &regex)?))
        });
        map
    }

    /// Register (or replace) a constraint factory. Names are case-insensitive.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(Option<&str>) -> Result<Arc<dyn RouteConstraint>, ConstraintError>
            + Send
            + Sync
            + 'static,
    {
        self.factories
            .insert(name.to_ascii_lowercase(), Arc::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(&name.to_ascii_lowercase())
    }

    /// Resolve `name` or `name(argument)` into an initialized constraint.
    pub fn resolve(&self, text: &str) -> Result<Arc<dyn RouteConstraint>, ConstraintError> {
        let (name, argument) = split_constraint_text(text)?;
        let factory = self
            .factories
            .get(&name.to_ascii_lowercase())
            .ok_or_else(|| ConstraintError::UnknownConstraint(name.to_string()))?;
        factory(argument)
    }
}

impl Default for ConstraintMap {
    fn default() -> Self {
        Self::with_defaults(RegexSettings::default())
    }
}

impl fmt::Debug for ConstraintMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("ConstraintMap").field("names", &names).finish()
    }
}

/// Split `name(argument)` into its name and argument.
fn split_constraint_text(text: &str) -> Result<(&str, Option<&str>), ConstraintError> {
    let text = text.trim();
    let (name, argument) = match text.find('(') {
        Some(open) if text.ends_with(')') => (&text[..open], Some(&text[open + 1..text.len() - 1])),
        Some(_) => return Err(ConstraintError::Malformed(text.to_string())),
        None => (text, None),
    };

    if name.is_empty() || name.contains(')') {
        return Err(ConstraintError::Malformed(text.to_string()));
    }
    Ok((name, argument))
}
