//! The route table.
//!
//! An explicit, linear registry. No global state, no discovery: every route
//! arrives through [`RouteRegistry::register`], is validated eagerly, and is
//! stored in an order fixed before the first request. Lookup scans the table
//! front to back, so more specific templates are simply placed first.

use tracing::debug;

use crate::error::RegistrationError;
use crate::route::{ControllerRoute, ControllerRoutes, RouteEntry};
use crate::template::Template;
use crate::uri::ParsedUri;

/// The application's route table.
///
/// Build one at startup, feed it controller batches, hand it to
/// [`Dispatcher::new`](crate::Dispatcher::new). Registration is the only
/// mutation; dispatch reads the table concurrently without locks.
pub struct RouteRegistry {
    entries: Vec<RouteEntry>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Registers a controller batch.
    ///
    /// Every template is parsed and checked against all earlier routes (and
    /// the rest of its own batch) before anything is inserted, so a rejected
    /// batch leaves the table exactly as it was. Two routes conflict when
    /// they share a verb and a template shape; placeholder names and types
    /// do not differentiate.
    ///
    /// After insertion the table is re-sorted by descending placeholder
    /// count. The sort is stable: routes with equal counts keep their
    /// registration order.
    pub fn register<C: Send + Sync + 'static>(
        &mut self,
        batch: ControllerRoutes<C>,
    ) -> Result<(), RegistrationError> {
        let ControllerRoutes { factory, default_auth, routes } = batch;

        let mut parsed: Vec<(ControllerRoute<C>, Template)> = Vec::new();
        for route in routes {
            let template = Template::parse(&route.template).map_err(|source| {
                RegistrationError::Template { template: route.template.clone(), source }
            })?;
            let conflict = self
                .entries
                .iter()
                .map(|entry| (entry.method(), entry.template()))
                .chain(parsed.iter().map(|(route, template)| (route.method, template)))
                .find(|(method, existing)| {
                    *method == route.method && existing.same_shape(&template)
                });
            if let Some((verb, existing)) = conflict {
                return Err(RegistrationError::Conflict {
                    verb,
                    first: existing.source().to_owned(),
                    second: template.source().to_owned(),
                });
            }
            parsed.push((route, template));
        }

        for (route, template) in parsed {
            let entry = RouteEntry::erase(route, &factory, &default_auth, template);
            debug!(route = %entry, "route registered");
            self.entries.push(entry);
        }

        // Stable sort: equal counts keep registration order.
        self.entries
            .sort_by(|a, b| b.template().param_count().cmp(&a.template().param_count()));
        Ok(())
    }

    /// Every route whose template fits the target's shape, most specific
    /// first, regardless of verb. The dispatcher picks by verb afterwards so
    /// it can tell "no such shape" (400) apart from "shape exists, verb does
    /// not" (405).
    pub fn find_candidates(&self, uri: &ParsedUri) -> Vec<&RouteEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.template().matches(uri))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for RouteRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::HandlerResult;
    use crate::method::Method;
    use crate::params::Args;
    use crate::response::Response;
    use crate::route::Route;

    struct Probe;

    fn ok(_: &Probe, _: Args) -> HandlerResult {
        Ok(Response::text("ok"))
    }

    fn batch() -> ControllerRoutes<Probe> {
        ControllerRoutes::shared(Probe)
    }

    fn uri(raw: &str) -> ParsedUri {
        ParsedUri::parse(raw).unwrap()
    }

    #[test]
    fn candidates_come_most_specific_first() {
        let mut registry = RouteRegistry::new();
        registry
            .register(
                batch()
                    .route(Route::get("/files/{name}").handle(ok))
                    .route(Route::get("/{area}/{name}").handle(ok)),
            )
            .unwrap();

        let candidates = registry.find_candidates(&uri("/files/report"));
        let sources: Vec<&str> = candidates
            .iter()
            .map(|entry| entry.template().source())
            .collect();
        assert_eq!(sources, ["/{area}/{name}", "/files/{name}"]);
    }

    #[test]
    fn equal_placeholder_counts_keep_registration_order() {
        let mut registry = RouteRegistry::new();
        registry
            .register(
                batch()
                    .route(Route::get("/p/{x}").handle(ok))
                    .route(Route::get("/{x}/q").handle(ok)),
            )
            .unwrap();

        let candidates = registry.find_candidates(&uri("/p/q"));
        let sources: Vec<&str> = candidates
            .iter()
            .map(|entry| entry.template().source())
            .collect();
        assert_eq!(sources, ["/p/{x}", "/{x}/q"]);
    }

    #[test]
    fn same_shape_and_verb_is_a_conflict() {
        let mut registry = RouteRegistry::new();
        registry
            .register(batch().route(Route::get("/c/{id:int}").handle(ok)))
            .unwrap();

        let err = registry
            .register(batch().route(Route::get("/c/{name}").handle(ok)))
            .unwrap_err();
        match err {
            RegistrationError::Conflict { verb, first, second } => {
                assert_eq!(verb, Method::Get);
                assert_eq!(first, "/c/{id:int}");
                assert_eq!(second, "/c/{name}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn same_shape_across_verbs_is_fine() {
        let mut registry = RouteRegistry::new();
        registry
            .register(
                batch()
                    .route(Route::get("/c/{id}").handle(ok))
                    .route(Route::put("/c/{id}").handle(ok))
                    .route(Route::delete("/c/{id}").handle(ok)),
            )
            .unwrap();
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn a_rejected_batch_leaves_the_table_untouched() {
        let mut registry = RouteRegistry::new();
        let result = registry.register(
            batch()
                .route(Route::get("/a/{x}").handle(ok))
                .route(Route::get("/a/{y:int}").handle(ok)),
        );
        assert!(result.is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn a_bad_template_is_rejected_at_registration() {
        let mut registry = RouteRegistry::new();
        let err = registry
            .register(batch().route(Route::get("/a/{id").handle(ok)))
            .unwrap_err();
        assert!(matches!(err, RegistrationError::Template { .. }));
        assert!(registry.is_empty());
    }
}
