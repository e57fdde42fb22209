//! Minimal ruta example — CRUD-style JSON endpoints with typed parameters
//! and a role-gated delete.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/items
//!   curl -X POST http://localhost:3000/items \
//!        -H 'content-type: application/json' \
//!        -d '{"name":"lamp"}'
//!   curl http://localhost:3000/items/1
//!   curl -X DELETE http://localhost:3000/items/1                    # 401, no role
//!   curl -X DELETE http://localhost:3000/items/1 -H 'x-role: admin' # 204
//!   curl http://localhost:3000/stats

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use ruta::{
    Args, AuthDecision, AuthRequirement, AuthorizationProvider, ControllerRoutes, Dispatcher,
    HandlerResult, Request, Response, Route, RouteRegistry, Server, Status,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Serialize)]
struct Item {
    id: u64,
    name: String,
}

#[derive(Deserialize)]
struct NewItem {
    name: String,
}

#[derive(Default)]
struct Store {
    items: HashMap<u64, Item>,
    next_id: u64,
}

#[derive(Default)]
struct ItemsController {
    store: Mutex<Store>,
}

impl ItemsController {
    // GET /items
    fn list(&self, _args: Args) -> HandlerResult {
        let store = self.store.lock().unwrap();
        let mut items: Vec<&Item> = store.items.values().collect();
        items.sort_by_key(|item| item.id);
        Ok(Response::json(serde_json::to_vec(&items)?))
    }

    // GET /items/{id:int}
    fn get_one(&self, args: Args) -> HandlerResult {
        let id = args.int("id")? as u64;
        let store = self.store.lock().unwrap();
        match store.items.get(&id) {
            Some(item) => Ok(Response::json(serde_json::to_vec(item)?)),
            None => Ok(Response::status(Status::NotFound)),
        }
    }

    // POST /items — body deserialized into NewItem before the handler runs
    fn create(&self, _args: Args, body: NewItem) -> HandlerResult {
        let mut store = self.store.lock().unwrap();
        store.next_id += 1;
        let item = Item { id: store.next_id, name: body.name };
        store.items.insert(item.id, item.clone());
        Ok(Response::builder()
            .status(Status::Created)
            .header("location", &format!("/items/{}", item.id))
            .json(serde_json::to_vec(&item)?))
    }

    // DELETE /items/{id:int} — requires the admin role
    fn remove(&self, args: Args) -> HandlerResult {
        let id = args.int("id")? as u64;
        let mut store = self.store.lock().unwrap();
        match store.items.remove(&id) {
            Some(_) => Ok(Response::status(Status::NoContent)),
            None => Ok(Response::status(Status::NotFound)),
        }
    }

    // GET /stats — async handler, awaited by the dispatcher
    async fn stats(self: Arc<Self>, _args: Args) -> HandlerResult {
        let count = self.store.lock().unwrap().items.len();
        Ok(Response::json(format!(r#"{{"count":{count}}}"#).into_bytes()))
    }
}

/// Grants access when the `x-role` header carries one of the required roles.
/// A stand-in for a real credential check: the dispatcher only wants the
/// verdict.
struct HeaderRoleProvider;

impl AuthorizationProvider for HeaderRoleProvider {
    fn realm(&self) -> &str {
        "items"
    }

    fn authorize(&self, request: &Request, requirement: &AuthRequirement) -> AuthDecision {
        let Some(role) = request.header("x-role") else {
            return AuthDecision::Denied;
        };
        if requirement.required_roles().is_empty()
            || requirement.required_roles().iter().any(|r| r == role)
        {
            AuthDecision::Granted
        } else {
            AuthDecision::Denied
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let mut registry = RouteRegistry::new();
    registry
        .register(
            ControllerRoutes::shared(ItemsController::default())
                .route(Route::get("/items").handle(ItemsController::list))
                .route(Route::get("/items/{id:int}").handle(ItemsController::get_one))
                .route(Route::post("/items").handle_body(ItemsController::create))
                .route(
                    Route::delete("/items/{id:int}")
                        .authorize(AuthRequirement::roles(["admin"]))
                        .handle(ItemsController::remove),
                )
                .route(Route::get("/stats").handle_async(ItemsController::stats)),
        )
        .expect("route table is valid");

    let dispatcher = Dispatcher::new(registry).with_authorizer(Arc::new(HeaderRoleProvider));

    Server::bind("0.0.0.0:3000")
        .serve(dispatcher)
        .await
        .expect("server error");
}
