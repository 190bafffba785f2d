//! Routing module
//!
//! A plain route table mapping (method, path pattern) to an endpoint. The table is built
//! once at startup; lookups are first-match in declaration order.

mod matcher;

pub use matcher::{match_path, PathPattern};

use hyper::Method;

/// Handler a route dispatches to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    ListPictures,
    GetPicture,
}

/// One row of the route table
#[derive(Debug, Clone)]
pub struct Route {
    pub methods: &'static [Method],
    pub pattern: PathPattern,
    pub endpoint: Endpoint,
}

/// Result of looking up a request in the table
#[derive(Debug, PartialEq, Eq)]
pub enum RouteLookup<'p> {
    /// `param` is the captured tail for prefix routes, empty otherwise
    Matched { endpoint: Endpoint, param: &'p str },
    /// Some route matches the path, none accepts the method
    MethodNotAllowed,
    NotFound,
}

static READ_METHODS: [Method; 2] = [Method::GET, Method::HEAD];

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self {
            routes: vec![
                Route {
                    methods: &READ_METHODS,
                    pattern: PathPattern::Exact("/pictures"),
                    endpoint: Endpoint::ListPictures,
                },
                Route {
                    methods: &READ_METHODS,
                    pattern: PathPattern::Exact("/pictures/"),
                    endpoint: Endpoint::ListPictures,
                },
                Route {
                    methods: &READ_METHODS,
                    pattern: PathPattern::Prefix("/pictures/"),
                    endpoint: Endpoint::GetPicture,
                },
            ],
        }
    }

    pub fn lookup<'p>(&self, method: &Method, path: &'p str) -> RouteLookup<'p> {
        let mut path_matched = false;

        for route in &self.routes {
            let Some(param) = match_path(route.pattern, path) else {
                continue;
            };
            if route.methods.contains(method) {
                return RouteLookup::Matched {
                    endpoint: route.endpoint,
                    param,
                };
            }
            path_matched = true;
        }

        if path_matched {
            RouteLookup::MethodNotAllowed
        } else {
            RouteLookup::NotFound
        }
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}
